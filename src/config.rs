/*
 * This modules contains the `EvaluatorConfig` struct, which implements the default trait. This
 * config can be passed to the `Evaluator` or to the `evaluate_conf` function to simplify their
 * arguments.
*/
use crate::metrics::DivByZeroStrat;
use either::Either as LeftOrRight;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
/// Config struct used to simplify the inputs of parameters to the `Evaluator`. It implements the
/// default trait.
pub struct EvaluatorConfig {
    /// This parameter describe what to do when we encounter a division by zero when computing
    /// precision and recall. SemEval-2013 replaces the result by 0.
    pub(crate) zero_division: DivByZeroStrat,
    /// Can we use multiple cores to classify the documents? Each document is classified
    /// independently and the results are merged afterward.
    pub(crate) parallel: bool,
    /// Number of decimals used by the reports.
    pub(crate) digits: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy0,
            parallel: false,
            digits: 2,
        }
    }
}

impl EvaluatorConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division
    }
    pub fn parallel(&self) -> bool {
        self.parallel
    }
    pub fn digits(&self) -> usize {
        self.digits
    }
}

impl From<(DivByZeroStrat, bool, usize)> for EvaluatorConfig {
    fn from(value: (DivByZeroStrat, bool, usize)) -> Self {
        Self {
            zero_division: value.0,
            parallel: value.1,
            digits: value.2,
        }
    }
}

impl Display for EvaluatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Strategy when encountering a division by zero: {:?}\n Using parallel computations: {}\n Digits in reports: {}",
            self.zero_division, self.parallel, self.digits
        )
    }
}

/// This builder can be used to build and customize an `EvaluatorConfig` structure.
pub struct EvaluatorConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    zero_division: LeftOrRight<ZeroDiv, DivByZeroStrat>,
    parallel: bool,
    digits: usize,
}

impl Default for EvaluatorConfigBuilder<DivByZeroStrat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> EvaluatorConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    pub fn division_by_zero(mut self, division_by_zero: ZeroDiv) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn digits(mut self, digits: usize) -> Self {
        self.digits = digits;
        self
    }
    pub fn new() -> Self {
        Self {
            zero_division: LeftOrRight::Right(DivByZeroStrat::ReplaceBy0),
            parallel: false,
            digits: 2,
        }
    }
    pub fn build(self) -> EvaluatorConfig {
        EvaluatorConfig {
            zero_division: self.zero_division.either_into(),
            parallel: self.parallel,
            digits: self.digits,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DivByZeroStrat::ReplaceBy1)]
    #[case(DivByZeroStrat::ReplaceBy0)]
    #[case(DivByZeroStrat::ReturnError)]
    fn test_builder_setters_division_by_zero(#[case] strat: DivByZeroStrat) {
        let builder = EvaluatorConfigBuilder::default();
        let config = builder.division_by_zero(strat).build();
        assert_eq!(config.zero_division, strat)
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_parallel(#[case] parallel: bool) {
        let builder = EvaluatorConfigBuilder::default();
        let config = builder.parallel(parallel).build();
        assert_eq!(config.parallel, parallel)
    }

    #[test]
    fn test_builder_setters_digits() {
        let config = EvaluatorConfigBuilder::default().digits(4).build();
        assert_eq!(config.digits, 4)
    }

    #[test]
    fn test_builder_defaults_match_config_defaults() {
        assert_eq!(EvaluatorConfigBuilder::default().build(), EvaluatorConfig::default());
    }

    #[test]
    fn test_from_tuple() {
        let config = EvaluatorConfig::from((DivByZeroStrat::ReturnError, true, 3));
        assert_eq!(config.zero_division(), DivByZeroStrat::ReturnError);
        assert!(config.parallel());
        assert_eq!(config.digits(), 3);
    }
}
