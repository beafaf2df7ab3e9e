//! Folder per book: `<book_key>/content.csv` and `<book_key>/iwb.csv`.
//!
//! Page columns in these exports record `0` when blank or non-numeric.

use std::path::Path;

use tracing::info;

use super::{origin, Extraction, ReadContext, ReaderProfile};
use crate::error::ReadError;
use crate::model::QuestionType;
use crate::normalize::{parse_page_field, PageDefault};
use crate::utils::subdirectories;

const CONTENT_FILE: &str = "content.csv";
const IWB_FILE: &str = "iwb.csv";

/// Only explicit markers make a question two-part in these exports.
pub const PROFILE: ReaderProfile = ReaderProfile {
    conjunction_heuristic: false,
    require_answer: true,
};

pub fn read_dir(dir: &Path, ctx: &ReadContext) -> Result<Extraction, ReadError> {
    let mut out = Extraction::default();
    for folder in subdirectories(dir)? {
        let Some(book_key) = folder.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !ctx.known_key(&book_key, &folder.display().to_string(), &mut out.diagnostics) {
            continue;
        }
        for (file, kind) in [(CONTENT_FILE, QuestionType::Content), (IWB_FILE, QuestionType::InWhichBook)] {
            let path = folder.join(file);
            match read_file(&path, kind, &book_key, ctx) {
                Ok(e) => {
                    info!(file = %path.display(), questions = e.questions.len(), "read csv");
                    out.merge(e);
                }
                Err(e) => out.diagnostics.read_failure(&e),
            }
        }
    }
    Ok(out)
}

pub fn read_file(path: &Path, kind: QuestionType, book_key: &str, ctx: &ReadContext) -> Result<Extraction, ReadError> {
    let ctx = ctx.with_profile(PROFILE);
    let csv_err = |source: csv::Error| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(|e| ReadError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let question_col = headers
        .iter()
        .position(|h| h.contains("Question"))
        .ok_or_else(|| ReadError::MissingColumn {
            path: path.to_path_buf(),
            column: "Question".into(),
        })?;
    let answer_col = headers.iter().position(|h| h.trim() == "Answer");
    let page_col = headers.iter().position(|h| h.trim() == "Page #");

    let mut out = Extraction::default();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;
        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let at = origin(path, idx + 2);
        let question = row.get(question_col).unwrap_or_default();
        let page_raw = page_col.and_then(|c| row.get(c)).unwrap_or_default();
        let page = parse_page_field(page_raw, PageDefault::Zero);
        let first_page = page_raw.split(',').next().unwrap_or_default().trim();

        let record = match kind {
            QuestionType::Content => {
                let answer = answer_col.and_then(|c| row.get(c)).unwrap_or_default();
                if question.trim().is_empty() || answer.trim().is_empty() {
                    out.diagnostics.malformed(&at, "content row needs question and answer");
                    continue;
                }
                ctx.content_record(&at, question, answer, book_key, page, &mut out.diagnostics)
            }
            QuestionType::InWhichBook => {
                if question.trim().is_empty() || first_page.is_empty() {
                    out.diagnostics.malformed(&at, "in-which-book row needs question and page");
                    continue;
                }
                ctx.in_which_book_record(&at, question, book_key, page, &mut out.diagnostics)
            }
        };
        if let Some(q) = record {
            out.questions.push(q);
        }
    }
    Ok(out)
}
