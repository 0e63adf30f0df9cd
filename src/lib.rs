/*!
This library scores the predictions of a named entity recognition (NER) system against the true
annotations, following the SemEval-2013 Task 9.1 evaluation. Unlike a token level evaluation, it
counts partial overlaps between predicted and true entities and reports them under four schemes.
# SCHEMES
* strict: The boundaries and the label of the prediction must both match.
* exact: The boundaries of the prediction must match, whatever its label.
* partial: The boundaries of the prediction must overlap the true entity, whatever its label. A
    partial overlap is given half a point.
* ent_type: The label of the prediction must match and its boundaries must overlap the true
    entity. A partial overlap is given half a point.

# SCENARIOS
Every prediction is compared with the true entities of its document and falls in a single
scenario:
* I: Exact match of the boundaries and the label.
* II: The prediction overlaps no true entity (spurious).
* III: A true entity is matched by no prediction (missed).
* IV: Same boundaries, different label.
* V: Overlapping boundaries, same label.
* VI: Overlapping boundaries, different label.

Each scenario increments one counter (correct, incorrect, partial, missed or spurious) in each
scheme. Precision, recall and F1 are derived from these counters once every document is scored.

# Terminology
* A span is a contiguous range of token indices `[start, end]` (both included) with a label, such
    as `PER`, `LOC` or `ORG`.
* A document is the list of spans of one text. The true and the predicted annotations are lists of
    documents paired by position.
* The tags are the labels being scored. Spans with any other label are ignored.
*/

mod config;
mod evaluator;
mod loader;
mod matcher;
mod metrics;
mod reporter;
mod schemes;
mod span;

// The public api starts here
pub use span::{Span, SpanError, ToSpan};

pub use schemes::{EvalScheme, UnknownSchemeError};

pub use metrics::{
    DivByZeroStrat, DivisionByZeroError, MetricsRecord, ParsingDivisionByZeroStrategyError,
    SchemeResults,
};

pub use config::{EvaluatorConfig, EvaluatorConfigBuilder};

pub use loader::{
    collect_named_entities, conll_to_spans, list_to_spans, spans_from_json_lines, Annotations,
    ParsingError,
};

pub use evaluator::{
    evaluate, evaluate_conf, EvaluationError, EvaluationResults, Evaluator,
    InconsistentLengthError,
};

pub use reporter::{
    label_report, overall_report, summary_report_ent, summary_report_overall, SummaryReport,
};
