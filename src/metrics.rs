/*!
This module holds the counters of every scheme and computes the metrics (possible, actual,
precision, recall, f1) derived from them.
*/
use crate::schemes::{Counter, EvalScheme, Scenario};
use enum_iterator::all;
use itertools::multizip;
use ndarray::{prelude::*, Zip};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
    ops::{AddAssign, Index, IndexMut},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// How do we handle a division by zero when computing the precision and the recall? By default,
/// the result is replaced by `0`, which is what SemEval-2013 does. `ReplaceBy1` sets the result
/// to `1` instead. `ReturnError` stops the computation; it can be useful if you believe there
/// should be no `0` in the denominator.
pub enum DivByZeroStrat {
    /// Returns 0 when the denominator is 0
    #[default]
    ReplaceBy0,
    /// Returns 1 when the denominator is 0
    ReplaceBy1,
    /// Returns an error
    ReturnError,
}

#[derive(Debug)]
pub struct ParsingDivisionByZeroStrategyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingDivisionByZeroStrategyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a `DivByZeroStrat`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingDivisionByZeroStrategyError<S> {}

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" | "zero" => Ok(DivByZeroStrat::ReplaceBy0),
            "replaceby1" | "replacebyone" | "one" => Ok(DivByZeroStrat::ReplaceBy1),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionByZeroError;

impl Display for DivisionByZeroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered division by zero")
    }
}

impl Error for DivisionByZeroError {}

/// Counters and metrics of a single scheme. The counters are only modified by the matcher and by
/// accumulation; `possible`, `actual`, `precision`, `recall` and `f1` are always recomputed from
/// the counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub correct: usize,
    pub incorrect: usize,
    pub partial: usize,
    pub missed: usize,
    pub spurious: usize,
    /// Number of annotations in the gold standard which contribute to the final score.
    pub possible: usize,
    /// Number of annotations produced by the NER system.
    pub actual: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricsRecord {
    pub(crate) fn increment(&mut self, counter: Counter, by: usize) {
        match counter {
            Counter::Correct => self.correct += by,
            Counter::Incorrect => self.incorrect += by,
            Counter::Partial => self.partial += by,
            Counter::Missed => self.missed += by,
            Counter::Spurious => self.spurious += by,
        }
    }

    /// Computes `possible` and `actual` according to SemEval-2013 Task 9.1.
    pub(crate) fn compute_actual_possible(&mut self) {
        self.possible = self.correct + self.incorrect + self.partial + self.missed;
        self.actual = self.correct + self.incorrect + self.partial + self.spurious;
    }
}

/// Only the counters are summed. The derived fields must be recomputed afterward.
impl AddAssign<&MetricsRecord> for MetricsRecord {
    fn add_assign(&mut self, rhs: &MetricsRecord) {
        self.correct += rhs.correct;
        self.incorrect += rhs.incorrect;
        self.partial += rhs.partial;
        self.missed += rhs.missed;
        self.spurious += rhs.spurious;
    }
}

/// The metrics of the four schemes. It can be indexed with an `EvalScheme`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemeResults {
    pub strict: MetricsRecord,
    pub ent_type: MetricsRecord,
    pub partial: MetricsRecord,
    pub exact: MetricsRecord,
}

impl SchemeResults {
    /// Applies the counter updates of a scenario to every scheme.
    pub(crate) fn record(&mut self, scenario: Scenario, by: usize) {
        let deltas = scenario.deltas();
        for scheme in all::<EvalScheme>() {
            self[scheme].increment(deltas[scheme.index()], by);
        }
    }

    pub(crate) fn compute_actual_possible(&mut self) {
        for scheme in all::<EvalScheme>() {
            self[scheme].compute_actual_possible();
        }
    }

    /// Iterates over the schemes and their metrics, in the `strict`, `ent_type`, `partial`,
    /// `exact` order.
    pub fn iter(&self) -> impl Iterator<Item = (EvalScheme, &MetricsRecord)> {
        all::<EvalScheme>().map(move |s| (s, &self[s]))
    }
}

impl Index<EvalScheme> for SchemeResults {
    type Output = MetricsRecord;
    fn index(&self, index: EvalScheme) -> &Self::Output {
        match index {
            EvalScheme::Strict => &self.strict,
            EvalScheme::EntType => &self.ent_type,
            EvalScheme::Partial => &self.partial,
            EvalScheme::Exact => &self.exact,
        }
    }
}

impl IndexMut<EvalScheme> for SchemeResults {
    fn index_mut(&mut self, index: EvalScheme) -> &mut Self::Output {
        match index {
            EvalScheme::Strict => &mut self.strict,
            EvalScheme::EntType => &mut self.ent_type,
            EvalScheme::Partial => &mut self.partial,
            EvalScheme::Exact => &mut self.exact,
        }
    }
}

impl AddAssign<&SchemeResults> for SchemeResults {
    fn add_assign(&mut self, rhs: &SchemeResults) {
        for scheme in all::<EvalScheme>() {
            self[scheme] += &rhs[scheme];
        }
    }
}

/// Computes `possible`, `actual`, the precision, the recall and the f1 of every given record, for
/// all schemes. The records are usually the overall results or the results of every label.
///
/// * `results`: Records to update in place
/// * `zero_division`: What to do in case of division by zero
/// * `parallel`: Can we use multiple cores for the array computations?
pub(crate) fn compute_precision_recall<'a, I>(
    results: I,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<(), DivisionByZeroError>
where
    I: IntoIterator<Item = &'a mut SchemeResults>,
{
    let mut results: Vec<&mut SchemeResults> = results.into_iter().collect();
    for r in results.iter_mut() {
        r.compute_actual_possible();
    }
    for scheme in all::<EvalScheme>() {
        let mut column: Vec<&mut MetricsRecord> =
            results.iter_mut().map(|r| &mut r[scheme]).collect();
        compute_scheme_column(&mut column, scheme, zero_division, parallel)?;
    }
    Ok(())
}

/// Computes the metrics of one scheme for many records at once.
fn compute_scheme_column(
    column: &mut [&mut MetricsRecord],
    scheme: EvalScheme,
    zero_division: DivByZeroStrat,
    parallel: bool,
) -> Result<(), DivisionByZeroError> {
    let weight = if scheme.partial_credit() { 0.5 } else { 0.0 };
    let numerator: Array1<f64> = column
        .iter()
        .map(|r| r.correct as f64 + weight * r.partial as f64)
        .collect();
    let actual: Array1<f64> = column.iter().map(|r| r.actual as f64).collect();
    let possible: Array1<f64> = column.iter().map(|r| r.possible as f64).collect();

    let precision = prf_divide(numerator.view(), actual, parallel, zero_division)?;
    let recall = prf_divide(numerator.view(), possible, parallel, zero_division)?;
    let f1 = f_score(precision.view(), recall.view());

    for (record, p, r, f) in multizip((column.iter_mut(), precision, recall, f1)) {
        record.precision = p;
        record.recall = r;
        record.f1 = f;
    }
    Ok(())
}

fn prf_divide(
    numerator: ArrayView1<f64>,
    mut denominator: Array1<f64>,
    parallel: bool,
    zero_division: DivByZeroStrat,
) -> Result<Array1<f64>, DivisionByZeroError> {
    let zero_mask = denominator.mapv(|d| d == 0.0);
    if zero_division == DivByZeroStrat::ReturnError && zero_mask.iter().any(|z| *z) {
        return Err(DivisionByZeroError);
    }
    if parallel {
        denominator.par_mapv_inplace(|d| if d == 0.0 { 1.0 } else { d });
    } else {
        denominator.mapv_inplace(|d| if d == 0.0 { 1.0 } else { d });
    }
    let replacement = match zero_division {
        DivByZeroStrat::ReplaceBy1 => 1.0,
        _ => 0.0,
    };
    let result = Zip::from(&numerator)
        .and(&denominator)
        .and(&zero_mask)
        .map_collect(|n, d, is_zero| if *is_zero { replacement } else { n / d });
    Ok(result)
}

/// Harmonic mean of the precision and the recall. Returns 0 when both are 0.
fn f_score(precision: ArrayView1<f64>, recall: ArrayView1<f64>) -> Array1<f64> {
    Zip::from(&precision).and(&recall).map_collect(|p, r| {
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    })
}
