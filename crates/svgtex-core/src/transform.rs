//! SVG `transform` list grammar.
//!
//! The scanner labels every chunk of the input as either a primitive or a [`ParseIssue`], so the
//! caller decides whether malformed chunks are fatal ([`TransformPolicy::Strict`]) or skipped and
//! reported ([`TransformPolicy::Lenient`]).

use crate::error::Error;
use crate::matrix::AffineMatrix;
use serde::Serialize;

/// One parsed transform function. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformPrimitive {
    Translate { tx: f64, ty: f64 },
    Scale { sx: f64, sy: f64 },
    Rotate { angle: f64, cx: f64, cy: f64 },
    SkewX { angle: f64 },
    SkewY { angle: f64 },
    Matrix {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
}

impl TransformPrimitive {
    /// Appends the matrices for this primitive in application order.
    ///
    /// `rotate(a, cx, cy)` always expands to three matrices: `translate(cx, cy)`,
    /// `rotate(a)`, `translate(-cx, -cy)`.
    pub fn push_matrices(&self, out: &mut Vec<AffineMatrix>) {
        match *self {
            Self::Translate { tx, ty } => out.push(AffineMatrix::translate(tx, ty)),
            Self::Scale { sx, sy } => out.push(AffineMatrix::scale(sx, sy)),
            Self::Rotate { angle, cx, cy } => {
                out.push(AffineMatrix::translate(cx, cy));
                out.push(AffineMatrix::rotate(angle));
                out.push(AffineMatrix::translate(-cx, -cy));
            }
            // Composed like any other primitive; the LaTeX output has no skew and only ever
            // reflects the resulting baseline angle.
            Self::SkewX { angle } => out.push(AffineMatrix::skew_x(angle)),
            Self::SkewY { angle } => out.push(AffineMatrix::skew_y(angle)),
            Self::Matrix { a, b, c, d, e, f } => out.push(AffineMatrix::new(a, b, c, d, e, f)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParseIssueKind {
    #[error("unknown transform function `{name}`")]
    UnknownFunction { name: String },
    #[error("`{name}` takes {expected} argument(s), found {found}")]
    WrongArity {
        name: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("invalid number in `{name}` arguments: {message}")]
    InvalidNumber { name: String, message: String },
    #[error("expected `(` after `{name}`")]
    MissingParenthesis { name: String },
    #[error("unterminated argument list")]
    Unterminated,
    #[error("unexpected text")]
    UnexpectedText,
}

/// A chunk of a transform list that is not a valid primitive.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind} at byte {offset} (`{text}`)")]
pub struct ParseIssue {
    pub kind: ParseIssueKind,
    /// Byte offset of the chunk in the transform list.
    pub offset: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransformPolicy {
    /// Skip malformed chunks and report them.
    #[default]
    Lenient,
    /// Fail on the first malformed chunk.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledTransform {
    /// Matrices in source order (leftmost function first).
    pub matrices: Vec<AffineMatrix>,
    /// Chunks skipped under [`TransformPolicy::Lenient`].
    pub issues: Vec<ParseIssue>,
}

/// Scans a transform list into labelled chunks, in source order.
pub fn parse_transform_list(input: &str) -> Vec<Result<TransformPrimitive, ParseIssue>> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut pos = 0usize;

    loop {
        while pos < len && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= len {
            break;
        }

        let start = pos;
        while pos < len && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        let name = &input[start..pos];

        if name.is_empty() {
            // Swallow everything up to the next separator or identifier start.
            let end = input[start..]
                .char_indices()
                .skip(1)
                .find(|(_, ch)| ch.is_ascii_alphabetic() || ch.is_whitespace() || *ch == ',')
                .map(|(i, _)| start + i)
                .unwrap_or(len);
            out.push(Err(ParseIssue {
                kind: ParseIssueKind::UnexpectedText,
                offset: start,
                text: input[start..end].to_string(),
            }));
            pos = end;
            continue;
        }

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len || bytes[pos] != b'(' {
            out.push(Err(ParseIssue {
                kind: ParseIssueKind::MissingParenthesis {
                    name: name.to_string(),
                },
                offset: start,
                text: name.to_string(),
            }));
            continue;
        }

        let args_start = pos + 1;
        let Some(rel_close) = input[args_start..].find(')') else {
            out.push(Err(ParseIssue {
                kind: ParseIssueKind::Unterminated,
                offset: start,
                text: input[start..].to_string(),
            }));
            break;
        };
        let close = args_start + rel_close;
        pos = close + 1;

        let chunk = &input[start..pos];
        out.push(
            parse_call(name, &input[args_start..close]).map_err(|kind| ParseIssue {
                kind,
                offset: start,
                text: chunk.to_string(),
            }),
        );
    }

    out
}

fn parse_call(name: &str, args: &str) -> Result<TransformPrimitive, ParseIssueKind> {
    let func = Function::from_name(name).ok_or_else(|| ParseIssueKind::UnknownFunction {
        name: name.to_string(),
    })?;

    let values = svgtypes::NumberListParser::from(args)
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|err| ParseIssueKind::InvalidNumber {
            name: name.to_string(),
            message: err.to_string(),
        })?;

    let arity_error = || ParseIssueKind::WrongArity {
        name: func.canonical_name(),
        expected: func.expected_arity(),
        found: values.len(),
    };

    let primitive = match (func, values.as_slice()) {
        (Function::Translate, [tx]) => TransformPrimitive::Translate { tx: *tx, ty: 0.0 },
        (Function::Translate, [tx, ty]) => TransformPrimitive::Translate { tx: *tx, ty: *ty },
        (Function::Scale, [sx]) => TransformPrimitive::Scale { sx: *sx, sy: *sx },
        (Function::Scale, [sx, sy]) => TransformPrimitive::Scale { sx: *sx, sy: *sy },
        (Function::Rotate, [angle]) => TransformPrimitive::Rotate {
            angle: *angle,
            cx: 0.0,
            cy: 0.0,
        },
        (Function::Rotate, [angle, cx, cy]) => TransformPrimitive::Rotate {
            angle: *angle,
            cx: *cx,
            cy: *cy,
        },
        (Function::SkewX, [angle]) => TransformPrimitive::SkewX { angle: *angle },
        (Function::SkewY, [angle]) => TransformPrimitive::SkewY { angle: *angle },
        (Function::Matrix, [a, b, c, d, e, f]) => TransformPrimitive::Matrix {
            a: *a,
            b: *b,
            c: *c,
            d: *d,
            e: *e,
            f: *f,
        },
        _ => return Err(arity_error()),
    };
    Ok(primitive)
}

#[derive(Debug, Clone, Copy)]
enum Function {
    Translate,
    Scale,
    Rotate,
    SkewX,
    SkewY,
    Matrix,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        [
            Self::Translate,
            Self::Scale,
            Self::Rotate,
            Self::SkewX,
            Self::SkewY,
            Self::Matrix,
        ]
        .into_iter()
        .find(|f| f.canonical_name().eq_ignore_ascii_case(name))
    }

    fn canonical_name(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::SkewX => "skewX",
            Self::SkewY => "skewY",
            Self::Matrix => "matrix",
        }
    }

    fn expected_arity(self) -> &'static str {
        match self {
            Self::Translate | Self::Scale => "1 or 2",
            Self::Rotate => "1 or 3",
            Self::SkewX | Self::SkewY => "1",
            Self::Matrix => "6",
        }
    }
}

/// Parses `input` and compiles it into matrices under `policy`.
pub fn compile_transform_list(
    input: &str,
    policy: TransformPolicy,
) -> crate::error::Result<CompiledTransform> {
    let mut compiled = CompiledTransform::default();
    for chunk in parse_transform_list(input) {
        match chunk {
            Ok(primitive) => primitive.push_matrices(&mut compiled.matrices),
            Err(issue) => match policy {
                TransformPolicy::Strict => {
                    return Err(Error::Transform {
                        transform: input.to_string(),
                        issue,
                    });
                }
                TransformPolicy::Lenient => compiled.issues.push(issue),
            },
        }
    }
    Ok(compiled)
}
