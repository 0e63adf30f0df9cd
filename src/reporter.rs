use crate::metrics::{MetricsRecord, SchemeResults};
use crate::schemes::{EvalScheme, UnknownSchemeError};
use std::collections::BTreeMap;
use std::fmt::Display;

const HEADERS: [&str; 8] = [
    "correct",
    "incorrect",
    "partial",
    "missed",
    "spurious",
    "precision",
    "recall",
    "f1-score",
];

/// Width of every numeric column.
const COLUMN_WIDTH: usize = 11;

/// Fixed width text table. Each row holds a name and the counters and metrics of a single
/// `MetricsRecord`. The name column is as wide as the longest name (or as `digits`, when larger).
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport<'a> {
    rows: Vec<(&'a str, &'a MetricsRecord)>,
    digits: usize,
}

impl<'a> SummaryReport<'a> {
    fn name_width(&self) -> usize {
        let name_width = self.rows.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        name_width.max(self.digits)
    }
}

impl<'a> Display for SummaryReport<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.name_width();
        write!(f, "{:>width$} ", "", width = width)?;
        for header in HEADERS {
            write!(f, " {:>w$}", header, w = COLUMN_WIDTH)?;
        }
        write!(f, "\n\n")?;
        for (name, r) in self.rows.iter() {
            write!(f, "{:>width$} ", name, width = width)?;
            for count in [r.correct, r.incorrect, r.partial, r.missed, r.spurious] {
                write!(f, " {:>w$}", count, w = COLUMN_WIDTH)?;
            }
            for metric in [r.precision, r.recall, r.f1] {
                write!(f, " {:>w$.d$}", metric, w = COLUMN_WIDTH, d = self.digits)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Builds the table of the overall results, one row per scheme in the order strict, ent_type,
/// partial and exact.
pub fn overall_report(results: &SchemeResults, digits: usize) -> SummaryReport<'_> {
    SummaryReport {
        rows: results.iter().map(|(s, r)| (s.name(), r)).collect(),
        digits,
    }
}

/// Builds the table of a single scheme, one row per label in ascending order.
pub fn label_report<'a>(
    results: &'a BTreeMap<String, SchemeResults>,
    scheme: EvalScheme,
    digits: usize,
) -> SummaryReport<'a> {
    SummaryReport {
        rows: results
            .iter()
            .map(|(label, r)| (label.as_str(), &r[scheme]))
            .collect(),
        digits,
    }
}

/// Formats the overall results as a text table.
pub fn summary_report_overall(results: &SchemeResults, digits: usize) -> String {
    overall_report(results, digits).to_string()
}

/// Formats the results of every label, for the scheme named `scheme`, as a text table. The name
/// must be one of `strict`, `ent_type`, `partial` or `exact`.
pub fn summary_report_ent(
    results: &BTreeMap<String, SchemeResults>,
    scheme: &str,
    digits: usize,
) -> Result<String, UnknownSchemeError> {
    let scheme: EvalScheme = scheme.parse()?;
    Ok(label_report(results, scheme, digits).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(counters: [usize; 5], metrics: [f64; 3]) -> MetricsRecord {
        let [correct, incorrect, partial, missed, spurious] = counters;
        let [precision, recall, f1] = metrics;
        MetricsRecord {
            correct,
            incorrect,
            partial,
            missed,
            spurious,
            possible: correct + incorrect + partial + missed,
            actual: correct + incorrect + partial + spurious,
            precision,
            recall,
            f1,
        }
    }

    fn expected_header(width: usize) -> String {
        format!(
            "{}      correct   incorrect     partial      missed    spurious   precision      recall    f1-score\n\n",
            " ".repeat(width)
        )
    }

    #[test]
    fn test_summary_report_overall() {
        let mut results = SchemeResults::default();
        results.strict = record([1, 1, 0, 0, 0], [0.5, 0.5, 0.5]);
        results.exact = record([2, 0, 0, 0, 0], [1.0, 1.0, 1.0]);
        let report = summary_report_overall(&results, 2);
        let mut expected = expected_header(8);
        expected.push_str("  strict            1           1           0           0           0        0.50        0.50        0.50\n");
        expected.push_str("ent_type            0           0           0           0           0        0.00        0.00        0.00\n");
        expected.push_str(" partial            0           0           0           0           0        0.00        0.00        0.00\n");
        expected.push_str("   exact            2           0           0           0           0        1.00        1.00        1.00\n");
        assert_eq!(report, expected);
    }

    #[test]
    fn test_summary_report_ent() {
        let mut per = SchemeResults::default();
        per.partial = record([1, 0, 1, 0, 0], [0.75, 0.75, 0.75]);
        let mut loc = SchemeResults::default();
        loc.partial = record([0, 0, 0, 1, 2], [0.0, 0.0, 0.0]);
        let results = BTreeMap::from([(String::from("PER"), per), (String::from("LOC"), loc)]);
        let report = summary_report_ent(&results, "partial", 3).unwrap();
        let mut expected = expected_header(3);
        expected.push_str("LOC            0           0           0           1           2       0.000       0.000       0.000\n");
        expected.push_str("PER            1           0           1           0           0       0.750       0.750       0.750\n");
        assert_eq!(report, expected);
    }

    #[rstest]
    #[case("strict", true)]
    #[case("ent_type", true)]
    #[case("partial", true)]
    #[case("exact", true)]
    #[case("type", false)]
    #[case("Strict", false)]
    #[case("", false)]
    fn test_summary_report_ent_scheme_names(#[case] scheme: &str, #[case] valid: bool) {
        let results = BTreeMap::from([(String::from("PER"), SchemeResults::default())]);
        let report = summary_report_ent(&results, scheme, 2);
        assert_eq!(report.is_ok(), valid);
        if !valid {
            assert_eq!(report, Err(UnknownSchemeError(String::from(scheme))));
        }
    }

    #[test]
    fn test_digits_widen_the_name_column() {
        let results = BTreeMap::from([(String::from("X"), SchemeResults::default())]);
        let report = label_report(&results, EvalScheme::Strict, 4).to_string();
        let mut expected = expected_header(4);
        expected.push_str("   X            0           0           0           0           0      0.0000      0.0000      0.0000\n");
        assert_eq!(report, expected);
    }

    #[test]
    fn test_empty_label_report_has_only_the_header() {
        let results = BTreeMap::new();
        let report = summary_report_ent(&results, "exact", 2).unwrap();
        assert_eq!(report, expected_header(2));
    }
}
