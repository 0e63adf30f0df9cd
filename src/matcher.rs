/*!
The matcher compares the predicted spans of a single document with its true spans. Every
prediction falls in exactly one scenario (see `Scenario`) and every true span is consumed by at
most one prediction.

The scenarios are checked in a fixed order: exact match, same boundaries with a different type,
overlap with the same type, overlap with a different type. A prediction matching none of them is
spurious. True spans not consumed after all the predictions are processed are missed.
*/
use crate::metrics::SchemeResults;
use crate::schemes::Scenario;
use crate::span::{Span, SpanError, ToSpan};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use log::{trace, warn};

/// Metrics of a single document: the overall results and the results of each scored label.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct DocumentResults<'t> {
    pub(crate) overall: SchemeResults,
    pub(crate) by_label: AHashMap<&'t str, SchemeResults>,
}

impl<'t> DocumentResults<'t> {
    fn new(tags: &[&'t str]) -> Self {
        Self {
            overall: SchemeResults::default(),
            by_label: tags.iter().map(|t| (*t, SchemeResults::default())).collect(),
        }
    }

    fn record(&mut self, scenario: Scenario, label: &str) {
        self.overall.record(scenario, 1);
        if let Some(results) = self.by_label.get_mut(label) {
            results.record(scenario, 1);
        }
    }

    /// Merges the counters of another document into this one. Only the counters are summed.
    pub(crate) fn merge(mut self, other: &DocumentResults<'t>) -> Self {
        self.overall += &other.overall;
        for (label, results) in other.by_label.iter() {
            *self.by_label.entry(*label).or_default() += results;
        }
        self
    }
}

/// Computes the metrics of one document. The spans whose label is not in `tags` are removed from
/// both the true and the predicted spans before the comparison, and every record is normalized
/// into a `Span`.
///
/// * `true_spans`: True entities of the document
/// * `pred_spans`: Predicted entities of the document
/// * `tags`: Labels to score
pub(crate) fn compute_metrics<'t, R: ToSpan>(
    true_spans: &[R],
    pred_spans: &[R],
    tags: &[&'t str],
) -> Result<DocumentResults<'t>, SpanError> {
    let tag_set: AHashSet<&str> = tags.iter().copied().collect();
    let true_spans = keep_scored(true_spans, &tag_set)?;
    let pred_spans = keep_scored(pred_spans, &tag_set)?;
    let mut results = classify(true_spans, pred_spans, tags);
    results.overall.compute_actual_possible();
    for r in results.by_label.values_mut() {
        r.compute_actual_possible();
    }
    Ok(results)
}

fn keep_scored<R: ToSpan>(spans: &[R], tag_set: &AHashSet<&str>) -> Result<Vec<Span>, SpanError> {
    let mut kept = Vec::with_capacity(spans.len());
    for record in spans {
        let span = record.to_span()?;
        if tag_set.contains(span.label.as_str()) {
            kept.push(span);
        }
    }
    Ok(kept)
}

/// Assigns every prediction, and every true span left unmatched, to a scenario. The spans are
/// expected to be normalized already.
pub(crate) fn classify<'t>(
    true_spans: Vec<Span>,
    pred_spans: Vec<Span>,
    tags: &[&'t str],
) -> DocumentResults<'t> {
    let mut results = DocumentResults::new(tags);
    // Both sorts are stable: ties keep the input order.
    let true_spans: Vec<Span> = true_spans.into_iter().sorted_by_key(|s| s.start).collect();
    let pred_spans: Vec<Span> = pred_spans.into_iter().sorted_by_key(|s| s.end).collect();
    let mut consumed: AHashSet<usize> = AHashSet::with_capacity(true_spans.len());

    for pred in pred_spans.iter() {
        let exact = true_spans
            .iter()
            .enumerate()
            .find(|(i, t)| *t == pred && !consumed.contains(i));
        if let Some((i, _)) = exact {
            consumed.insert(i);
            results.record(Scenario::ExactMatch, &pred.label);
            continue;
        }

        match find_overlap(&true_spans, pred, &consumed) {
            Some((i, scenario)) => {
                consumed.insert(i);
                results.record(scenario, &true_spans[i].label);
            }
            None => record_spurious(&mut results, pred, tags),
        }
    }

    for (i, t) in true_spans.iter().enumerate() {
        if !consumed.contains(&i) {
            results.record(Scenario::Missed, &t.label);
        }
    }
    trace!(
        "Document with {} true and {} predicted spans: {:?}",
        true_spans.len(),
        pred_spans.len(),
        results.overall.strict
    );
    results
}

/// Scans the true spans, ordered by start, for the first one the prediction resolves against.
/// Returns its index and the scenario.
fn find_overlap(
    true_spans: &[Span],
    pred: &Span,
    consumed: &AHashSet<usize>,
) -> Option<(usize, Scenario)> {
    for (i, t) in true_spans.iter().enumerate() {
        if pred.end < t.start {
            // No true span after this one can overlap the prediction.
            break;
        }
        if consumed.contains(&i) || !pred.overlaps(t) {
            continue;
        }
        let scenario = match (pred.same_boundaries(t), pred.label == t.label) {
            (true, false) => Scenario::BoundaryMatch,
            (false, true) => Scenario::OverlapSameType,
            (false, false) => Scenario::OverlapDiffType,
            // Identical to an unconsumed span: caught as an exact match beforehand.
            (true, true) => Scenario::ExactMatch,
        };
        return Some((i, scenario));
    }
    None
}

/// A spurious prediction is attributed to its own label. When its label is not scored, it is
/// attributed to every scored label, so the sum over the labels can exceed the overall count.
fn record_spurious<'t>(results: &mut DocumentResults<'t>, pred: &Span, tags: &[&'t str]) {
    results.overall.record(Scenario::Spurious, 1);
    match results.by_label.get_mut(pred.label.as_str()) {
        Some(r) => r.record(Scenario::Spurious, 1),
        None => {
            warn!(
                "Spurious prediction {} has a label outside the scored tags, counting it for every tag",
                pred
            );
            for tag in tags {
                if let Some(r) = results.by_label.get_mut(tag) {
                    r.record(Scenario::Spurious, 1);
                }
            }
        }
    }
}
