use crate::transform::ParseIssue;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("SVG root element has no `{attribute}` attribute")]
    MissingDimension { attribute: &'static str },

    #[error("SVG root `{attribute}` is not a numeric user-unit length: {value:?}")]
    InvalidDimension {
        attribute: &'static str,
        value: String,
    },

    #[error("Malformed transform list {transform:?}: {issue}")]
    Transform { transform: String, issue: ParseIssue },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}
