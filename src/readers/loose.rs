//! Library handouts: "In <Title> by <Author>, ..." questions with `Answer:` lines.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{answer_reference, origin, Extraction, ReadContext};
use crate::normalize::extract_page;
use crate::text::LineCursor;

static IWB_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Answer:\s*(.*?)\s+by\s+(.*?)\s*\(p\.\s*-?\d+[^)]*\)").unwrap());
static CONTENT_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Answer:\s*(.*?)\s*\(p\.\s*\d+[^)]*\)").unwrap());

fn starts_question(line: &str) -> bool {
    line.starts_with("In ")
}

fn is_answer(line: &str) -> bool {
    line.starts_with("Answer:")
}

pub fn read(path: &Path, raw: &str, ctx: &ReadContext) -> Extraction {
    let mut out = Extraction::default();
    let mut cursor = LineCursor::from_raw(raw);

    while let Some(line) = cursor.next_line() {
        if line.text.is_empty() {
            continue;
        }
        let at = origin(path, line.number);

        if line.text.starts_with("In which book") {
            let Some(answer) = cursor.take_first_matching(is_answer, starts_question) else {
                out.diagnostics.malformed(&at, format!("No answer, skipping: {}", line.text));
                continue;
            };
            if !IWB_ANSWER_RE.is_match(&answer.text) {
                out.diagnostics
                    .malformed(origin(path, answer.number), format!("No match, skipping: {}", answer.text));
                continue;
            }
            let Some(reference) = answer_reference(&answer.text) else {
                continue;
            };
            let Some(key) = ctx.resolve(&reference, &at, &mut out.diagnostics) else {
                continue;
            };
            let page = extract_page(&answer.text);
            if let Some(q) = ctx.in_which_book_record(&at, &line.text, &key, page, &mut out.diagnostics) {
                out.questions.push(q);
            }
        } else if starts_question(&line.text) {
            let Some(reference) = ctx.content_reference(&line.text) else {
                out.diagnostics.malformed(&at, format!("No In match: {}", line.text));
                continue;
            };
            let Some(answer) = cursor.take_first_matching(is_answer, starts_question) else {
                out.diagnostics.malformed(&at, format!("No answer, skipping: {}", line.text));
                continue;
            };
            let Some(caps) = CONTENT_ANSWER_RE.captures(&answer.text) else {
                out.diagnostics
                    .malformed(origin(path, answer.number), format!("No match, skipping: {}", answer.text));
                continue;
            };
            let Some(key) = ctx.resolve(&reference, &at, &mut out.diagnostics) else {
                continue;
            };
            let page = extract_page(&answer.text);
            if let Some(q) = ctx.content_record(&at, &line.text, &caps[1], &key, page, &mut out.diagnostics) {
                out.questions.push(q);
            }
        } else {
            out.diagnostics.malformed(&at, format!("Skipping: {}", line.text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use crate::diagnostics::DiagnosticKind;
    use crate::model::QuestionType;
    use crate::normalize::Normalizer;

    fn run(raw: &str) -> Extraction {
        let catalog = test_catalog();
        let normalizer = Normalizer::default();
        let ctx = ReadContext::new(&catalog, &normalizer);
        read(Path::new("lake_oswego_questions.txt"), raw, &ctx)
    }

    #[test]
    fn holes_scenario() {
        let out = run("In Holes by Louis Sachar, why did Stanley dig?\nAnswer: Because of a curse (p. 12)\n");
        assert_eq!(out.questions.len(), 1);
        assert_eq!(
            serde_json::to_value(&out.questions[0]).unwrap(),
            serde_json::json!({
                "type": "content",
                "text": "why did Stanley dig?",
                "book_key": "holes",
                "answer": "Because of a curse",
                "page": 12
            })
        );
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn unknown_book_is_dropped_with_its_name() {
        let out = run("In Unknown Book by Nobody, who is there?\nAnswer: no one (p. 3)\n");
        assert!(out.questions.is_empty());
        let d = out.diagnostics.iter().next().unwrap();
        assert_eq!(d.kind, DiagnosticKind::UnresolvedBook);
        assert!(d.message.contains("Unknown Book by Nobody"));
    }

    #[test]
    fn fixture_handout() {
        let raw = std::fs::read_to_string("tests/fixtures/loose.txt").unwrap();
        let out = run(&raw);
        let kinds: Vec<_> = out.questions.iter().map(|q| q.kind).collect();
        assert_eq!(
            kinds,
            vec![QuestionType::InWhichBook, QuestionType::Content, QuestionType::Content]
        );
        assert_eq!(out.questions[0].text, "does a robot learn from geese?");
        assert_eq!(out.questions[0].book_key, "wild-robot");
        assert_eq!(out.questions[0].page, Some(101));
        assert_eq!(out.questions[2].text, "who is Mr. Sir?");
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.message.starts_with("No match, skipping: Answer: a lizard")));
        assert!(out.diagnostics.iter().any(|d| d.message.starts_with("Skipping: Practice set")));
    }
}
