/*!
The `Evaluator` owns the running totals of an evaluation session. It pairs the true and predicted
documents, classifies every document with the matcher, accumulates the counters and finally
computes the metrics of the overall results and of every label.
*/
use crate::config::EvaluatorConfig;
use crate::loader::{Annotations, ParsingError};
use crate::matcher::{compute_metrics, DocumentResults};
use crate::metrics::{compute_precision_recall, DivisionByZeroError, SchemeResults};
use crate::reporter::{label_report, overall_report};
use crate::schemes::{EvalScheme, UnknownSchemeError};
use crate::span::{SpanError, ToSpan};
use core::fmt;
use log::debug;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// Results of an evaluation: the overall results and the results of each label.
pub type EvaluationResults = (SchemeResults, BTreeMap<String, SchemeResults>);

#[derive(Debug, PartialEq, Clone, Copy)]
/// Error type to represent when the true and predicted documents are not of the same length
/// (when they should be).
pub struct InconsistentLengthError(pub usize, pub usize);

impl Display for InconsistentLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number of predicted documents does not equal true. `true` is length {}, `pred` is length {}",
            self.0, self.1
        )
    }
}
impl Error for InconsistentLengthError {}

#[derive(Debug, PartialEq)]
/// Enum error encompassing the failures that can happen during an evaluation.
pub enum EvaluationError {
    InconsistentLength(InconsistentLengthError),
    InvalidSpan(SpanError),
    Parsing(ParsingError),
    DivisionByZero(DivisionByZeroError),
    UnknownScheme(UnknownSchemeError),
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentLength(err) => std::fmt::Display::fmt(err, f),
            Self::InvalidSpan(err) => std::fmt::Display::fmt(err, f),
            Self::Parsing(err) => std::fmt::Display::fmt(err, f),
            Self::DivisionByZero(err) => std::fmt::Display::fmt(err, f),
            Self::UnknownScheme(err) => std::fmt::Display::fmt(err, f),
        }
    }
}

impl Error for EvaluationError {}

impl From<InconsistentLengthError> for EvaluationError {
    fn from(value: InconsistentLengthError) -> Self {
        Self::InconsistentLength(value)
    }
}
impl From<SpanError> for EvaluationError {
    fn from(value: SpanError) -> Self {
        Self::InvalidSpan(value)
    }
}
impl From<ParsingError> for EvaluationError {
    fn from(value: ParsingError) -> Self {
        Self::Parsing(value)
    }
}
impl From<DivisionByZeroError> for EvaluationError {
    fn from(value: DivisionByZeroError) -> Self {
        Self::DivisionByZero(value)
    }
}
impl From<UnknownSchemeError> for EvaluationError {
    fn from(value: UnknownSchemeError) -> Self {
        Self::UnknownScheme(value)
    }
}

fn check_consistent_length<T, U>(y_true: &[T], y_pred: &[U]) -> Result<(), InconsistentLengthError> {
    if y_true.len() != y_pred.len() {
        return Err(InconsistentLengthError(y_true.len(), y_pred.len()));
    }
    Ok(())
}

/// An evaluation session. The inputs are given at construction and `evaluate` consumes the
/// session, so the running totals are never counted twice.
///
/// # Example
///
/// ```rust
/// use nereval::{Evaluator, Span};
///
/// let y_true = vec![vec![Span::new(0, 2, "PER"), Span::new(5, 6, "LOC")]];
/// let y_pred = vec![vec![Span::new(0, 2, "PER"), Span::new(5, 7, "LOC")]];
///
/// let evaluator = Evaluator::new(y_true, y_pred, &["PER", "LOC"]);
/// let (overall, by_label) = evaluator.evaluate().unwrap();
///
/// assert_eq!(overall.strict.correct, 1);
/// assert_eq!(overall.strict.incorrect, 1);
/// assert_eq!(overall.partial.precision, 0.75);
/// assert_eq!(by_label["LOC"].ent_type.correct, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    y_true: Annotations<'a>,
    y_pred: Annotations<'a>,
    tags: Vec<&'a str>,
    config: EvaluatorConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new<T, P>(y_true: T, y_pred: P, tags: &[&'a str]) -> Self
    where
        T: Into<Annotations<'a>>,
        P: Into<Annotations<'a>>,
    {
        Self::with_config(y_true, y_pred, tags, EvaluatorConfig::default())
    }

    pub fn with_config<T, P>(y_true: T, y_pred: P, tags: &[&'a str], config: EvaluatorConfig) -> Self
    where
        T: Into<Annotations<'a>>,
        P: Into<Annotations<'a>>,
    {
        Evaluator {
            y_true: y_true.into(),
            y_pred: y_pred.into(),
            tags: tags.to_vec(),
            config,
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Loads the annotations, scores every document and returns the overall results and the
    /// results of every label.
    pub fn evaluate(self) -> Result<EvaluationResults, EvaluationError> {
        if let (Some(t), Some(p)) = (self.y_true.len_hint(), self.y_pred.len_hint()) {
            debug!("Imported {} predictions for {} true examples", p, t);
        }
        let y_true = self.y_true.into_spans()?;
        let y_pred = self.y_pred.into_spans()?;
        evaluate_spans(&y_true, &y_pred, &self.tags, &self.config)
    }

    /// Evaluates and renders the overall table, followed by the table of every label for the
    /// scheme named `scheme`. The floats have as many decimals as the `digits` of the config. The
    /// scheme name is checked before any document is scored.
    pub fn report(self, scheme: &str) -> Result<String, EvaluationError> {
        let scheme: EvalScheme = scheme.parse()?;
        let digits = self.config.digits;
        let (overall, by_label) = self.evaluate()?;
        Ok(format!(
            "{}\n{}",
            overall_report(&overall, digits),
            label_report(&by_label, scheme, digits)
        ))
    }
}

/// Main entrypoint of the library. It computes the metrics of the four schemes (strict, exact,
/// partial and ent_type) for the predicted spans against the true spans, with the default
/// configuration. The records of each document only need to contain a start, an end and a label.
///
/// * `y_true`: True spans, one list per document
/// * `y_pred`: Predicted spans, one list per document
/// * `tags`: Labels to score. Spans with any other label are ignored.
pub fn evaluate<R: ToSpan + Sync>(
    y_true: &[Vec<R>],
    y_pred: &[Vec<R>],
    tags: &[&str],
) -> Result<EvaluationResults, EvaluationError> {
    evaluate_spans(y_true, y_pred, tags, &EvaluatorConfig::default())
}

/// Same as `evaluate`, but with a custom `EvaluatorConfig`.
pub fn evaluate_conf<R: ToSpan + Sync>(
    y_true: &[Vec<R>],
    y_pred: &[Vec<R>],
    tags: &[&str],
    config: EvaluatorConfig,
) -> Result<EvaluationResults, EvaluationError> {
    evaluate_spans(y_true, y_pred, tags, &config)
}

fn evaluate_spans<'t, R: ToSpan + Sync>(
    y_true: &[Vec<R>],
    y_pred: &[Vec<R>],
    tags: &[&'t str],
    config: &EvaluatorConfig,
) -> Result<EvaluationResults, EvaluationError> {
    check_consistent_length(y_true, y_pred)?;
    debug!(
        "Scoring {} documents on {} tags (parallel: {})",
        y_true.len(),
        tags.len(),
        config.parallel
    );
    let totals = if config.parallel {
        y_true
            .par_iter()
            .zip(y_pred.par_iter())
            .map(|(t, p)| compute_metrics(t, p, tags))
            .try_reduce(DocumentResults::default, |acc, doc| Ok(acc.merge(&doc)))?
    } else {
        let mut acc = DocumentResults::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let doc = compute_metrics(t, p, tags)?;
            acc = acc.merge(&doc);
        }
        acc
    };
    finalize(totals, tags, config)
}

/// Computes the derived metrics of the accumulated counters and builds the returned results. Every
/// scored label is present, even the labels never seen in the documents.
fn finalize(
    totals: DocumentResults,
    tags: &[&str],
    config: &EvaluatorConfig,
) -> Result<EvaluationResults, EvaluationError> {
    let mut overall = totals.overall;
    let mut by_label: BTreeMap<String, SchemeResults> = tags
        .iter()
        .map(|t| (String::from(*t), SchemeResults::default()))
        .collect();
    for (label, results) in totals.by_label.iter() {
        if let Some(entry) = by_label.get_mut(*label) {
            *entry += results;
        }
    }
    compute_precision_recall(
        std::iter::once(&mut overall),
        config.zero_division,
        config.parallel,
    )?;
    compute_precision_recall(by_label.values_mut(), config.zero_division, config.parallel)?;
    debug!(
        "Strict: {} correct out of {} possible, {} actual",
        overall.strict.correct, overall.strict.possible, overall.strict.actual
    );
    Ok((overall, by_label))
}
