//! Two-sheet workbooks (`In Which Book`, `Content`) listed in a `bookkey -> file.xlsx` mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{origin, Extraction, ReadContext, ReaderProfile};
use crate::error::{read_to_string, ReadError};
use crate::model::QuestionType;
use crate::normalize::page::{page_from_float, parse_number};

pub const IWB_SHEET: &str = "In Which Book";
pub const CONTENT_SHEET: &str = "Content";
/// Header the question column gets when its title cell is blank.
const QUESTION_COLUMN: &str = "Unnamed: 1";
const ANSWER_COLUMN: &str = "Answer";
const PAGE_COLUMN: &str = "Page #";

/// Two-part comes from markers only; content rows may lack an answer.
pub const PROFILE: ReaderProfile = ReaderProfile {
    conjunction_heuristic: false,
    require_answer: false,
};

pub fn load_mapping(path: &Path) -> Result<BTreeMap<String, String>, ReadError> {
    let raw = read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| ReadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every workbook in `mapping` from `dir`. Missing or broken workbooks
/// are reported and skipped.
pub fn read_all(mapping: &BTreeMap<String, String>, dir: &Path, ctx: &ReadContext) -> Extraction {
    let mut out = Extraction::default();
    let pb = ProgressBar::new(mapping.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for (book_key, file) in mapping {
        pb.set_message(book_key.clone());
        pb.println(format!("Processing {}: {}", book_key, file));
        let path = dir.join(file);
        if !path.exists() {
            out.diagnostics.read_failure(&ReadError::NotFound { path });
            pb.inc(1);
            continue;
        }
        if !ctx.known_key(book_key, file, &mut out.diagnostics) {
            pb.inc(1);
            continue;
        }
        match read_workbook(&path, book_key, ctx) {
            Ok(e) => {
                info!(file = %path.display(), questions = e.questions.len(), "read workbook");
                out.merge(e);
            }
            Err(e) => out.diagnostics.read_failure(&e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    out
}

pub fn read_workbook(path: &Path, book_key: &str, ctx: &ReadContext) -> Result<Extraction, ReadError> {
    let wb_err = |source: calamine::Error| ReadError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(wb_err)?;
    let names = workbook.sheet_names();
    let mut out = Extraction::default();

    for (sheet, kind) in [(IWB_SHEET, QuestionType::InWhichBook), (CONTENT_SHEET, QuestionType::Content)] {
        if !names.iter().any(|n| n == sheet) {
            continue;
        }
        let range = workbook.worksheet_range(sheet).map_err(wb_err)?;
        let rows = SheetRows::new(&range);
        read_sheet(path, &rows, kind, book_key, ctx, &mut out);
    }
    Ok(out)
}

/// Sheet rows keyed by header, naming blank header cells `Unnamed: N`.
/// Column indices count from sheet column A, not from the used range.
pub struct SheetRows {
    headers: Vec<String>,
    rows: Vec<Vec<Data>>,
}

impl SheetRows {
    pub fn new(range: &Range<Data>) -> Self {
        let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
        let pad = |row: &[Data]| -> Vec<Data> {
            let mut cells = vec![Data::Empty; offset];
            cells.extend_from_slice(row);
            cells
        };
        let mut iter = range.rows();
        let headers = iter
            .next()
            .map(|row| {
                pad(row)
                    .iter()
                    .enumerate()
                    .map(|(i, c)| match cell_text(c) {
                        Some(t) => t,
                        None => format!("Unnamed: {}", i),
                    })
                    .collect()
            })
            .unwrap_or_default();
        SheetRows {
            headers,
            rows: iter.map(pad).collect(),
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    };
    Some(text).filter(|t| !t.is_empty())
}

fn cell_page(cell: &Data) -> Option<u32> {
    match cell {
        Data::Float(f) => page_from_float(*f),
        Data::Int(i) => u32::try_from(*i).ok().filter(|p| *p > 0),
        Data::String(s) => parse_number(s),
        _ => None,
    }
}

fn read_sheet(path: &Path, rows: &SheetRows, kind: QuestionType, book_key: &str, ctx: &ReadContext, out: &mut Extraction) {
    let ctx = ctx.with_profile(PROFILE);
    let Some(question_col) = rows.column(QUESTION_COLUMN) else {
        out.diagnostics.read_failure(&ReadError::MissingColumn {
            path: PathBuf::from(path),
            column: QUESTION_COLUMN.into(),
        });
        return;
    };
    let answer_col = rows.column(ANSWER_COLUMN);
    let page_col = rows.column(PAGE_COLUMN);

    for (idx, row) in rows.rows.iter().enumerate() {
        let Some(question) = row.get(question_col).and_then(cell_text) else {
            continue;
        };
        let at = origin(path, idx + 2);
        let page = page_col.and_then(|c| row.get(c)).and_then(cell_page);
        let record = match kind {
            QuestionType::InWhichBook => ctx.in_which_book_record(&at, &question, book_key, page, &mut out.diagnostics),
            QuestionType::Content => {
                let answer = answer_col.and_then(|c| row.get(c)).and_then(cell_text).unwrap_or_default();
                ctx.content_record(&at, &question, &answer, book_key, page, &mut out.diagnostics)
            }
        };
        if let Some(q) = record {
            out.questions.push(q);
        }
    }
}
