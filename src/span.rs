/*!
This module contains the `Span` struct, the unit of every comparison made by this crate, and the
`ToSpan` trait used to normalize the entity records given by the user.
*/
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::Display;

/// A span represents a named entity mention. It contains a start and an end (i.e. at what index
/// of the document does it start and end) and a label, which is the associated entity (such as
/// `LOC`, `PER`, `ORG`, etc.). The `end` is *inclusive*: a span of a single token has
/// `start == end`.
///
/// When deserialized, any field other than `start`, `end` and `label` is ignored.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    pub fn new<S: Into<String>>(start: usize, end: usize, label: S) -> Self {
        Span {
            start,
            end,
            label: label.into(),
        }
    }

    /// Do the two inclusive ranges `[start, end]` share at least one index?
    pub(crate) fn overlaps(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Are the boundaries of the two spans the same? The labels are not compared.
    pub(crate) fn same_boundaries(&self, other: &Span) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.label, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error returned when an entity record cannot be reduced to a `Span`.
pub enum SpanError {
    /// The record does not contain the attribute.
    MissingAttribute(&'static str),
    /// The attribute exists but has the wrong type (e.g. a negative `start` or a numeric
    /// `label`).
    InvalidAttribute(&'static str),
    /// The record is not an object.
    NotARecord,
}

impl Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAttribute(attr) => {
                write!(f, "The entity record is missing the `{}` attribute", attr)
            }
            Self::InvalidAttribute(attr) => {
                write!(f, "The `{}` attribute of the entity record is invalid", attr)
            }
            Self::NotARecord => write!(f, "The entity is not a record with named attributes"),
        }
    }
}

impl Error for SpanError {}

/// Anything that can be normalized into a `Span`. Only the start, the end and the label of the
/// record are kept.
pub trait ToSpan {
    fn to_span(&self) -> Result<Span, SpanError>;
}

impl ToSpan for Span {
    fn to_span(&self) -> Result<Span, SpanError> {
        Ok(self.clone())
    }
}

impl<S: AsRef<str>> ToSpan for (usize, usize, S) {
    fn to_span(&self) -> Result<Span, SpanError> {
        Ok(Span::new(self.0, self.1, self.2.as_ref()))
    }
}

impl ToSpan for Value {
    fn to_span(&self) -> Result<Span, SpanError> {
        let record = self.as_object().ok_or(SpanError::NotARecord)?;
        let offset = |name: &'static str| -> Result<usize, SpanError> {
            let value = record.get(name).ok_or(SpanError::MissingAttribute(name))?;
            value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .ok_or(SpanError::InvalidAttribute(name))
        };
        let start = offset("start")?;
        let end = offset("end")?;
        let label = record
            .get("label")
            .ok_or(SpanError::MissingAttribute("label"))?
            .as_str()
            .ok_or(SpanError::InvalidAttribute("label"))?;
        Ok(Span::new(start, end, label))
    }
}

impl<T: ToSpan + ?Sized> ToSpan for &T {
    fn to_span(&self) -> Result<Span, SpanError> {
        (**self).to_span()
    }
}
