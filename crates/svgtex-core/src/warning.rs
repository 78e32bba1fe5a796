use crate::transform::ParseIssue;
use serde::Serialize;

/// Non-fatal diagnostics. A run that only produced warnings still produces output.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    #[error("Referenced element with id = {id} doesn't exist")]
    MissingReference { id: String },

    #[error("Only same-document references are supported, ignoring {href:?}")]
    ExternalReference { href: String },

    #[error("Reference to #{id} would expand into itself, ignoring it")]
    CyclicReference { id: String },

    #[error("Stopped expanding references after {limit} copies")]
    ExpansionLimit { limit: usize },

    #[error("Skipped malformed transform on <{element}>: {issue}")]
    Transform { element: String, issue: ParseIssue },

    #[error("Unit of {attribute}={value:?} on <{element}> is not supported, using the bare number")]
    UnsupportedUnit {
        element: String,
        attribute: &'static str,
        value: String,
    },

    #[error("Ignoring unparsable {attribute}={value:?} on <{element}>: {message}")]
    InvalidCoordinate {
        element: String,
        attribute: &'static str,
        value: String,
        message: String,
    },
}

/// Logs `warning` and records it.
pub(crate) fn report(out: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!("{warning}");
    out.push(warning);
}
