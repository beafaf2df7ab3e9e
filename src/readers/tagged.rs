//! `QUESTION N:` / `ANSWER:` / `PAGE:` transcripts with `## <Section> Questions:` headers.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{answer_reference, file_label, origin, Extraction, ReadContext};
use crate::model::QuestionType;
use crate::normalize::{parse_page_field, PageDefault};
use crate::text::LineCursor;

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#{1,6}\s*(.+?)\s+questions\s*:?\s*$").unwrap());
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^question\s*(\d+)\s*[:.]\s*(.*)$").unwrap());
static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^answer\s*:\s*(.*)$").unwrap());
static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^page\s*#?\s*:\s*(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Question,
    Answer,
    Page,
}

#[derive(Debug)]
struct Pending {
    line: usize,
    kind: Option<QuestionType>,
    question: String,
    answer: Option<String>,
    page: Option<String>,
    last: Field,
}

impl Pending {
    fn push(&mut self, text: &str) {
        let target = match self.last {
            Field::Question => &mut self.question,
            Field::Answer => self.answer.get_or_insert_with(String::new),
            Field::Page => self.page.get_or_insert_with(String::new),
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }
}

fn section_kind(name: &str) -> Option<QuestionType> {
    let lower = name.to_lowercase();
    if lower.contains("which book") || lower.contains("iwb") {
        Some(QuestionType::InWhichBook)
    } else if lower.contains("content") {
        Some(QuestionType::Content)
    } else {
        None
    }
}

/// Parse a tagged transcript. `book_key` pins every question to one book;
/// otherwise books resolve from preambles and in-which-book answers.
pub fn read(path: &Path, raw: &str, book_key: Option<&str>, ctx: &ReadContext) -> Extraction {
    let mut out = Extraction::default();
    if let Some(key) = book_key {
        if !ctx.known_key(key, &file_label(path), &mut out.diagnostics) {
            return out;
        }
    }
    let mut cursor = LineCursor::from_raw(raw);
    let mut section: Option<QuestionType> = None;
    let mut pending: Option<Pending> = None;

    while let Some(line) = cursor.next_line() {
        if line.text.is_empty() {
            continue;
        }
        if let Some(caps) = SECTION_RE.captures(&line.text) {
            flush(path, pending.take(), book_key, ctx, &mut out);
            section = section_kind(&caps[1]);
            debug!(line = line.number, ?section, "section header");
            continue;
        }
        if let Some(caps) = QUESTION_RE.captures(&line.text) {
            flush(path, pending.take(), book_key, ctx, &mut out);
            pending = Some(Pending {
                line: line.number,
                kind: section,
                question: caps[2].trim().to_string(),
                answer: None,
                page: None,
                last: Field::Question,
            });
            continue;
        }
        let Some(p) = pending.as_mut() else {
            out.diagnostics
                .malformed(origin(path, line.number), format!("Skipping: {}", line.text));
            continue;
        };
        if let Some(caps) = ANSWER_RE.captures(&line.text) {
            p.answer = Some(caps[1].trim().to_string());
            p.last = Field::Answer;
        } else if let Some(caps) = PAGE_RE.captures(&line.text) {
            p.page = Some(caps[1].trim().to_string());
            p.last = Field::Page;
        } else {
            p.push(&line.text);
        }
    }
    flush(path, pending.take(), book_key, ctx, &mut out);
    out
}

fn flush(path: &Path, pending: Option<Pending>, book_key: Option<&str>, ctx: &ReadContext, out: &mut Extraction) {
    let Some(p) = pending else {
        return;
    };
    let at = origin(path, p.line);
    if p.question.is_empty() {
        out.diagnostics.malformed(&at, "question text missing");
        return;
    }
    let kind = p.kind.unwrap_or_else(|| QuestionType::infer(&p.question));
    let answer = p.answer.unwrap_or_default();
    let page = p
        .page
        .as_deref()
        .and_then(|raw| parse_page_field(raw, PageDefault::Absent));

    let record = match kind {
        QuestionType::Content => {
            let key = match book_key {
                Some(k) => Some(k.to_string()),
                None => match ctx.content_reference(&p.question) {
                    Some(r) => ctx.resolve(&r, &at, &mut out.diagnostics),
                    None => {
                        out.diagnostics
                            .malformed(&at, format!("No In match: {}", p.question));
                        None
                    }
                },
            };
            let Some(key) = key else {
                return;
            };
            ctx.content_record(&at, &p.question, &answer, &key, page, &mut out.diagnostics)
        }
        QuestionType::InWhichBook => {
            let key = match book_key {
                Some(k) => Some(k.to_string()),
                None => match answer_reference(&answer) {
                    Some(r) => ctx.resolve(&r, &at, &mut out.diagnostics),
                    None => {
                        out.diagnostics
                            .malformed(&at, format!("No book in answer: {}", answer));
                        None
                    }
                },
            };
            let Some(key) = key else {
                return;
            };
            let page = page.or_else(|| crate::normalize::extract_page(&answer));
            ctx.in_which_book_record(&at, &p.question, &key, page, &mut out.diagnostics)
        }
    };
    if let Some(q) = record {
        out.questions.push(q);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use crate::diagnostics::DiagnosticKind;
    use crate::normalize::Normalizer;

    fn run(raw: &str, book_key: Option<&str>) -> Extraction {
        let catalog = test_catalog();
        let normalizer = Normalizer::default();
        let ctx = ReadContext::new(&catalog, &normalizer);
        read(Path::new("tagged.txt"), raw, book_key, &ctx)
    }

    #[test]
    fn fixture_transcript() {
        let raw = std::fs::read_to_string("tests/fixtures/tagged.txt").unwrap();
        let out = run(&raw, None);
        assert_eq!(out.questions.len(), 4);

        let first = &out.questions[0];
        assert_eq!(first.kind, QuestionType::Content);
        assert_eq!(first.text, "why did Stanley dig?");
        assert_eq!(first.book_key, "holes");
        assert_eq!(first.answer.as_deref(), Some("Because of a curse"));
        assert_eq!(first.page, Some(12));

        let second = &out.questions[1];
        assert!(second.two_part);
        assert_eq!(second.text, "name Stanley's two friends at camp.");
        assert_eq!(second.page, Some(40));

        let iwb = &out.questions[2];
        assert_eq!(iwb.kind, QuestionType::InWhichBook);
        assert_eq!(iwb.text, "does a boy carry a friend up a mountain?");
        assert!(iwb.answer.is_none());
        assert_eq!(iwb.page, Some(88));

        let robot = &out.questions[3];
        assert_eq!(robot.book_key, "wild-robot");
        assert_eq!(robot.page, Some(5));

        assert_eq!(out.diagnostics.count(DiagnosticKind::UnresolvedBook), 1);
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.message.contains("Unknown Book by Nobody")));
    }

    #[test]
    fn pinned_book_key_and_inferred_kind() {
        let raw = "QUESTION 1: In Candidly Cline, what does Cline play?\nANSWER: Guitar\nQUESTION 2: IWB is there a song contest?\nPAGE: 3\n";
        let out = run(raw, Some("candidly-cline"));
        assert_eq!(out.questions.len(), 2);
        assert_eq!(out.questions[0].text, "what does Cline play?");
        assert_eq!(out.questions[1].kind, QuestionType::InWhichBook);
        assert_eq!(out.questions[1].text, "is there a song contest?");
        assert_eq!(out.questions[1].page, Some(3));
    }

    #[test]
    fn content_without_answer_is_skipped() {
        let raw = "## Content Questions:\nQUESTION 1: In Holes by Louis Sachar, who is Zero?\nPAGE: 4";
        let out = run(raw, None);
        assert!(out.questions.is_empty());
        assert_eq!(out.diagnostics.count(DiagnosticKind::MalformedRecord), 1);
    }

    #[test]
    fn continuation_lines_join_the_answer() {
        let raw = "QUESTION 1: In Holes by Louis Sachar, what did they find?\nANSWER: A lipstick tube\nwith initials KB (p. 70)";
        let out = run(raw, None);
        assert_eq!(out.questions[0].answer.as_deref(), Some("A lipstick tube with initials KB"));
        assert_eq!(out.questions[0].page, Some(70));
    }
}
