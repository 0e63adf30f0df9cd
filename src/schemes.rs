/*!
The four evaluation schemes of SemEval-2013 Task 9.1 and the six scenarios a prediction (or a
missed true entity) can fall into. Each scenario is translated into counter updates through a
single table, `Scenario::deltas`.
*/
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Enumeration of the supported evaluation schemes. `&str` can be parsed to create an
/// `EvalScheme`. The names used for parsing and displaying are `strict`, `ent_type`, `partial`
/// and `exact`.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize, Sequence)]
#[serde(rename_all = "snake_case")]
pub enum EvalScheme {
    /// Exact boundary match and same entity type.
    Strict,
    /// Some overlap between the boundaries and same entity type.
    EntType,
    /// Some overlap between the boundaries, regardless of the type. Overlaps get half credit.
    Partial,
    /// Exact boundary match, regardless of the type.
    Exact,
}

impl EvalScheme {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::EntType => "ent_type",
            Self::Partial => "partial",
            Self::Exact => "exact",
        }
    }

    /// Partial-credit schemes count a `partial` match as half a `correct` one when computing the
    /// precision and recall.
    pub const fn partial_credit(&self) -> bool {
        matches!(self, Self::Partial | Self::EntType)
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Strict => 0,
            Self::EntType => 1,
            Self::Partial => 2,
            Self::Exact => 3,
        }
    }
}

impl Display for EvalScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EvalScheme {
    type Err = UnknownSchemeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "ent_type" => Ok(Self::EntType),
            "partial" => Ok(Self::Partial),
            "exact" => Ok(Self::Exact),
            _ => Err(UnknownSchemeError(String::from(s))),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
/// Error returned when a scheme name is not one of `strict`, `ent_type`, `partial` or `exact`.
pub struct UnknownSchemeError(pub String);

impl Display for UnknownSchemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid scheme ({}): must be one of 'strict', 'ent_type', 'partial', 'exact'",
            self.0
        )
    }
}

impl Error for UnknownSchemeError {}

/// The raw counters of a `MetricsRecord`.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub(crate) enum Counter {
    Correct,
    Incorrect,
    Partial,
    Missed,
    Spurious,
}

/// The outcome of the comparison of a prediction with the true entities of a document.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone)]
pub(crate) enum Scenario {
    /// I: same boundaries, same type.
    ExactMatch,
    /// II: the prediction does not overlap any true entity.
    Spurious,
    /// III: the true entity was not found by any prediction.
    Missed,
    /// IV: same boundaries, different type.
    BoundaryMatch,
    /// V: overlapping boundaries, same type.
    OverlapSameType,
    /// VI: overlapping boundaries, different type.
    OverlapDiffType,
}

impl Scenario {
    /// Counter incremented in each scheme, indexed like `EvalScheme::index`: strict, ent_type,
    /// partial, exact.
    pub(crate) const fn deltas(&self) -> [Counter; 4] {
        use Counter::*;
        match self {
            Self::ExactMatch => [Correct, Correct, Correct, Correct],
            Self::Spurious => [Spurious, Spurious, Spurious, Spurious],
            Self::Missed => [Missed, Missed, Missed, Missed],
            Self::BoundaryMatch => [Incorrect, Incorrect, Correct, Correct],
            Self::OverlapSameType => [Incorrect, Correct, Partial, Incorrect],
            Self::OverlapDiffType => [Incorrect, Incorrect, Partial, Incorrect],
        }
    }
}
