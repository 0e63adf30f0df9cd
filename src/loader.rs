/*!
Loaders converting the most common annotation formats into the per-document spans consumed by the
`Evaluator`:
* Lists of IOB/IOB2 tags, one list per document (`list_to_spans`).
* CoNLL text, one `token\ttag` line per token and documents separated by an empty line
  (`conll_to_spans`).
* JSON lines, one JSON array of span records per document (`spans_from_json_lines`).
*/
use crate::span::{Span, SpanError, ToSpan};
use serde_json::Value;
use serde_jsonlines::json_lines;
use std::error::Error;
use std::fmt::Display;
use std::path::Path;

/// The annotations of a corpus, in one of the supported formats. The `Evaluator` converts them
/// into spans before scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotations<'a> {
    /// Spans, one list per document.
    Spans(Vec<Vec<Span>>),
    /// IOB/IOB2 tags, one list per document.
    Tags(Vec<Vec<&'a str>>),
    /// CoNLL formatted text.
    Conll(&'a str),
}

impl<'a> Annotations<'a> {
    pub fn into_spans(self) -> Result<Vec<Vec<Span>>, ParsingError> {
        match self {
            Self::Spans(spans) => Ok(spans),
            Self::Tags(tags) => Ok(list_to_spans(&tags)),
            Self::Conll(text) => conll_to_spans(text),
        }
    }

    /// Number of documents, when it is known without parsing.
    pub(crate) fn len_hint(&self) -> Option<usize> {
        match self {
            Self::Spans(spans) => Some(spans.len()),
            Self::Tags(tags) => Some(tags.len()),
            Self::Conll(_) => None,
        }
    }
}

impl<'a> From<Vec<Vec<Span>>> for Annotations<'a> {
    fn from(value: Vec<Vec<Span>>) -> Self {
        Self::Spans(value)
    }
}

impl<'a> From<Vec<Vec<&'a str>>> for Annotations<'a> {
    fn from(value: Vec<Vec<&'a str>>) -> Self {
        Self::Tags(value)
    }
}

impl<'a> From<&'a str> for Annotations<'a> {
    fn from(value: &'a str) -> Self {
        Self::Conll(value)
    }
}

#[derive(Debug)]
/// Error returned when the annotations cannot be parsed into spans.
pub enum ParsingError {
    /// The line (1-indexed) of the CoNLL text has no tab separated tag.
    MissingTag(usize),
    /// A JSON line could not be read or decoded.
    Io(std::io::Error),
    /// A JSON line is not an array of span records.
    NotAnArray(usize),
    /// A record of a JSON line cannot be reduced to a span.
    InvalidSpan(usize, SpanError),
}

impl PartialEq for ParsingError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingTag(a), Self::MissingTag(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::NotAnArray(a), Self::NotAnArray(b)) => a == b,
            (Self::InvalidSpan(a, e1), Self::InvalidSpan(b, e2)) => a == b && e1 == e2,
            _ => false,
        }
    }
}

impl Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTag(line) => write!(f, "Line {} has no tab separated tag", line),
            Self::Io(err) => std::fmt::Display::fmt(err, f),
            Self::NotAnArray(line) => write!(f, "Line {} is not a JSON array of spans", line),
            Self::InvalidSpan(line, err) => write!(f, "Line {}: {}", line, err),
        }
    }
}

impl Error for ParsingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidSpan(_, err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParsingError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// This struct iterates over the tags of a *single* document and returns the spans found in it.
/// The label of a tag is the tag without its two characters prefix (e.g. `B-`). An entity ends
/// on an `O` tag, on a `B-` tag or when the label changes.
struct SpanIter<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    tags: I,
    /// Label and start of the entity being read
    current: Option<(&'a str, usize)>,
    index: usize,
}

impl<'a, I> SpanIter<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    fn new(tags: I) -> Self {
        SpanIter {
            tags,
            current: None,
            index: 0,
        }
    }
}

impl<'a, I> Iterator for SpanIter<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Span;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let offset = self.index;
            let Some(tag) = self.tags.next() else {
                // Catches an entity that goes up until the last token.
                let (label, start) = self.current.take()?;
                return Some(Span::new(start, offset - 1, label));
            };
            self.index += 1;
            if tag == "O" {
                if let Some((label, start)) = self.current.take() {
                    return Some(Span::new(start, offset - 1, label));
                }
                continue;
            }
            let label = tag.get(2..).unwrap_or("");
            match self.current {
                None => self.current = Some((label, offset)),
                Some((current_label, start))
                    if current_label != label || tag.starts_with('B') =>
                {
                    self.current = Some((label, offset));
                    return Some(Span::new(start, offset - 1, current_label));
                }
                Some(_) => (),
            }
        }
    }
}

/// Collects the spans of a single document from its IOB/IOB2 tags.
///
/// # Example
/// ```rust
/// use nereval::{collect_named_entities, Span};
///
/// let spans = collect_named_entities(&["O", "B-PER", "I-PER", "O", "B-LOC"]);
/// assert_eq!(spans, vec![Span::new(1, 2, "PER"), Span::new(4, 4, "LOC")]);
/// ```
pub fn collect_named_entities<S: AsRef<str>>(tags: &[S]) -> Vec<Span> {
    SpanIter::new(tags.iter().map(|t| t.as_ref())).collect()
}

/// Collects the spans of every document.
pub fn list_to_spans<S: AsRef<str>>(documents: &[Vec<S>]) -> Vec<Vec<Span>> {
    documents
        .iter()
        .map(|tags| collect_named_entities(tags))
        .collect()
}

/// Parses CoNLL formatted text. Each non-empty line holds a token and its tag, separated by a
/// tab. Documents are separated by an empty line.
pub fn conll_to_spans(text: &str) -> Result<Vec<Vec<Span>>, ParsingError> {
    let mut documents: Vec<Vec<&str>> = vec![];
    let mut current: Vec<&str> = vec![];
    let mut lines = text.split('\n').enumerate().peekable();
    while let Some((i, line)) = lines.next() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            documents.push(std::mem::take(&mut current));
            continue;
        }
        let tag = line
            .split('\t')
            .nth(1)
            .ok_or(ParsingError::MissingTag(i + 1))?;
        current.push(tag);
        if lines.peek().is_none() {
            documents.push(std::mem::take(&mut current));
        }
    }
    Ok(list_to_spans(&documents))
}

/// Reads a JSON lines file. Each line holds the spans of one document as a JSON array of records
/// with at least a `start`, an `end` and a `label`.
pub fn spans_from_json_lines<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<Span>>, ParsingError> {
    let mut documents = vec![];
    for (i, line) in json_lines::<Value, P>(path)?.enumerate() {
        let line_number = i + 1;
        let value = line?;
        let records = value
            .as_array()
            .ok_or(ParsingError::NotAnArray(line_number))?;
        let spans: Result<Vec<Span>, SpanError> = records.iter().map(|r| r.to_span()).collect();
        documents.push(spans.map_err(|e| ParsingError::InvalidSpan(line_number, e))?);
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case(vec!["O", "O"], vec![])]
    #[case(vec!["B-PER", "I-PER", "O"], vec![Span::new(0, 1, "PER")])]
    #[case(vec!["O", "B-PER", "I-PER"], vec![Span::new(1, 2, "PER")])]
    #[case(vec!["B-PER", "B-PER"], vec![Span::new(0, 0, "PER"), Span::new(1, 1, "PER")])]
    #[case(vec!["B-PER", "I-LOC", "I-LOC"], vec![Span::new(0, 0, "PER"), Span::new(1, 2, "LOC")])]
    #[case(vec!["I-ORG", "I-ORG", "O", "I-ORG"], vec![Span::new(0, 1, "ORG"), Span::new(3, 3, "ORG")])]
    #[case(vec!["O", "B-MISC", "I-MISC", "I-MISC", "O"], vec![Span::new(1, 3, "MISC")])]
    fn test_collect_named_entities(#[case] tags: Vec<&str>, #[case] expected: Vec<Span>) {
        assert_eq!(collect_named_entities(&tags), expected);
    }

    #[test]
    fn test_list_to_spans() {
        let docs = vec![vec!["B-PER", "O"], vec![], vec!["O", "B-LOC"]];
        assert_eq!(
            list_to_spans(&docs),
            vec![
                vec![Span::new(0, 0, "PER")],
                vec![],
                vec![Span::new(1, 1, "LOC")]
            ]
        );
    }

    #[test]
    fn test_conll_to_spans() {
        let text = "word\tO\nAlex\tB-PER\nGreen\tI-PER\n\nin\tO\nParis\tB-LOC\n";
        let expected = vec![vec![Span::new(1, 2, "PER")], vec![Span::new(1, 1, "LOC")]];
        assert_eq!(conll_to_spans(text).unwrap(), expected);
    }

    #[test]
    fn test_conll_without_trailing_newline() {
        let text = "Alex\tB-PER\n\nParis\tB-LOC";
        let expected = vec![vec![Span::new(0, 0, "PER")], vec![Span::new(0, 0, "LOC")]];
        assert_eq!(conll_to_spans(text).unwrap(), expected);
    }

    #[test]
    fn test_conll_missing_tag() {
        let text = "Alex\tB-PER\nGreen I-PER\n";
        assert_eq!(conll_to_spans(text), Err(ParsingError::MissingTag(2)));
    }

    #[test]
    fn test_annotations_into_spans() {
        let tags = Annotations::from(vec![vec!["B-PER", "I-PER"]]);
        assert_eq!(tags.len_hint(), Some(1));
        assert_eq!(tags.into_spans().unwrap(), vec![vec![Span::new(0, 1, "PER")]]);
        let conll = Annotations::from("Alex\tB-PER");
        assert_eq!(conll.len_hint(), None);
        assert_eq!(conll.into_spans().unwrap(), vec![vec![Span::new(0, 0, "PER")]]);
    }

    #[test]
    fn test_spans_from_json_lines() {
        let path = std::env::temp_dir().join("nereval_loader_test.jsonl");
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(
                file,
                r#"[{{"start": 0, "end": 1, "label": "PER", "text": "Alex Green"}}]"#
            )
            .unwrap();
            writeln!(file, "[]").unwrap();
            writeln!(file, r#"[{{"start": 4, "label": "LOC"}}]"#).unwrap();
        }
        let actual = spans_from_json_lines(&path);
        assert_eq!(
            actual,
            Err(ParsingError::InvalidSpan(3, SpanError::MissingAttribute("end")))
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_spans_from_missing_file() {
        let actual = spans_from_json_lines("this/file/does/not/exist.jsonl");
        assert!(matches!(actual, Err(ParsingError::Io(_))));
    }

    #[test]
    fn test_propertie_spans_are_ordered_and_disjoint() {
        fn property(tags: Vec<u8>) -> TestResult {
            let vocabulary = ["O", "B-PER", "I-PER", "B-LOC", "I-LOC"];
            let tags: Vec<&str> = tags
                .iter()
                .map(|t| vocabulary[*t as usize % vocabulary.len()])
                .collect();
            let spans = collect_named_entities(&tags);
            for s in spans.iter() {
                if s.start > s.end || s.end >= tags.len() || tags[s.start] == "O" {
                    return TestResult::failed();
                }
            }
            for pair in spans.windows(2) {
                if pair[0].end >= pair[1].start {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(2000)
            .quickcheck(property as fn(Vec<u8>) -> TestResult);
    }
}
