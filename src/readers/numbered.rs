//! Single-book handouts: numbered questions under section titles, `a.` answers.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{file_label, origin, Extraction, ReadContext};
use crate::model::QuestionType;
use crate::normalize::extract_page;
use crate::text::LineCursor;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());
static ANSWER_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^a\.\s*").unwrap());

fn section(line: &str) -> Option<QuestionType> {
    match line.trim_end_matches(':').trim() {
        "Content Questions" => Some(QuestionType::Content),
        "In Which Book Questions" => Some(QuestionType::InWhichBook),
        _ => None,
    }
}

fn starts_question(line: &str) -> bool {
    NUMBER_RE.is_match(line) || line.starts_with("In which book")
}

pub fn read(path: &Path, raw: &str, book_key: &str, ctx: &ReadContext) -> Extraction {
    let mut out = Extraction::default();
    if !ctx.known_key(book_key, &file_label(path), &mut out.diagnostics) {
        return out;
    }
    let banner = ctx
        .catalog
        .book(book_key)
        .map(|b| format!("{} by", b.title));
    let mut current: Option<QuestionType> = None;
    let mut cursor = LineCursor::from_raw(raw);

    while let Some(line) = cursor.next_line() {
        let text = line.text.as_str();
        if text.is_empty()
            || text.contains("These questions were developed")
            || banner.as_deref().is_some_and(|b| text.starts_with(b))
        {
            continue;
        }
        if let Some(kind) = section(text) {
            current = Some(kind);
            continue;
        }
        if !starts_question(text) {
            continue;
        }

        let at = origin(path, line.number);
        let question = NUMBER_RE.replace(text, "").into_owned();
        let stop = |l: &str| starts_question(l) || section(l).is_some();
        let Some(answer) = cursor.take_first_matching(|l| l.starts_with("a."), stop) else {
            out.diagnostics.malformed(&at, format!("No answer, skipping: {}", text));
            continue;
        };
        let kind = current.unwrap_or_else(|| QuestionType::infer(&question));
        let page = extract_page(&answer.text);
        let record = match kind {
            QuestionType::Content => {
                let answer = ANSWER_PREFIX_RE.replace(&answer.text, "");
                ctx.content_record(&at, &question, &answer, book_key, page, &mut out.diagnostics)
            }
            QuestionType::InWhichBook => {
                ctx.in_which_book_record(&at, &question, book_key, page, &mut out.diagnostics)
            }
        };
        if let Some(q) = record {
            out.questions.push(q);
        }
    }
    out
}
