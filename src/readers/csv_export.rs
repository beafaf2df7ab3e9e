//! One CSV per book (`<book_key>.csv`) with `Question`, `Answer` and optional `Page #` columns.

use std::path::Path;

use tracing::info;

use super::{origin, Extraction, ReadContext};
use crate::error::ReadError;
use crate::model::QuestionType;
use crate::normalize::{extract_page, parse_page_field, PageDefault};
use crate::utils::{file_stem, files_with_extension};

/// Read every `*.csv` in `dir`; a broken file is reported and skipped.
pub fn read_dir(dir: &Path, ctx: &ReadContext) -> Result<Extraction, ReadError> {
    let mut out = Extraction::default();
    for path in files_with_extension(dir, "csv")? {
        let Some(book_key) = file_stem(&path) else {
            continue;
        };
        match read_file(&path, &book_key, ctx) {
            Ok(e) => {
                info!(file = %path.display(), questions = e.questions.len(), "read csv");
                out.merge(e);
            }
            Err(e) => out.diagnostics.read_failure(&e),
        }
    }
    Ok(out)
}

pub fn read_file(path: &Path, book_key: &str, ctx: &ReadContext) -> Result<Extraction, ReadError> {
    let csv_err = |source: csv::Error| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(|e| ReadError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let missing = |name: &str| ReadError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    };
    let question_col = column("Question").ok_or_else(|| missing("Question"))?;
    let answer_col = column("Answer").ok_or_else(|| missing("Answer"))?;
    let page_col = column("Page #");

    let mut out = Extraction::default();
    let file_origin = origin(path, 1);
    if !ctx.known_key(book_key, &file_origin, &mut out.diagnostics) {
        return Ok(out);
    }

    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;
        // header is line 1
        let at = origin(path, idx + 2);
        let question = row.get(question_col).unwrap_or_default().trim();
        let answer = row.get(answer_col).unwrap_or_default().trim();
        if question.is_empty() {
            continue;
        }
        let page = page_col
            .and_then(|c| row.get(c))
            .and_then(|raw| parse_page_field(raw, PageDefault::Absent))
            .or_else(|| extract_page(answer));

        let record = match QuestionType::infer(question) {
            QuestionType::Content => ctx.content_record(&at, question, answer, book_key, page, &mut out.diagnostics),
            QuestionType::InWhichBook => {
                ctx.in_which_book_record(&at, question, book_key, page, &mut out.diagnostics)
            }
        };
        if let Some(q) = record {
            out.questions.push(q);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use crate::diagnostics::DiagnosticKind;
    use crate::normalize::Normalizer;

    #[test]
    fn reads_directory_of_book_csvs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("holes.csv"),
            "Question,Answer\n\
             \"In Holes by Louis Sachar, why did Stanley dig?\",Because of a curse (p. 12)\n\
             In which book does a boy find a lipstick tube?,Holes by Louis Sachar (p. 70)\n\
             \"In Holes by Louis Sachar, who are Stanley's friends?\",\"Holes by Louis Sachar, Zero and Squid (p. 40, 41)\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("mystery.csv"), "Question,Answer\nIn which book?,x\n").unwrap();
        std::fs::write(dir.path().join("wild-robot.csv"), "Prompt,Reply\na,b\n").unwrap();

        let catalog = test_catalog();
        let normalizer = Normalizer::default();
        let ctx = ReadContext::new(&catalog, &normalizer);
        let out = read_dir(dir.path(), &ctx).unwrap();

        assert_eq!(out.questions.len(), 3);
        assert_eq!(out.questions[0].text, "why did Stanley dig?");
        assert_eq!(out.questions[0].page, Some(12));

        let iwb = &out.questions[1];
        assert_eq!(iwb.kind, QuestionType::InWhichBook);
        assert_eq!(iwb.text, "does a boy find a lipstick tube?");
        assert!(iwb.answer.is_none());
        assert_eq!(iwb.page, Some(70));

        let friends = &out.questions[2];
        assert_eq!(friends.answer.as_deref(), Some("Zero and Squid"));
        assert_eq!(friends.page, Some(40));
        assert!(friends.two_part);

        assert_eq!(out.diagnostics.count(DiagnosticKind::UnresolvedBook), 1);
        assert_eq!(out.diagnostics.count(DiagnosticKind::InvalidInput), 1);
    }

    #[test]
    fn page_column_wins_over_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holes.csv");
        std::fs::write(&path, "Question,Answer,Page #\n\"In Holes, who is Zero?\",Hector (p. 9),11\n").unwrap();

        let catalog = test_catalog();
        let normalizer = Normalizer::default();
        let ctx = ReadContext::new(&catalog, &normalizer);
        let out = read_file(&path, "holes", &ctx).unwrap();
        assert_eq!(out.questions[0].page, Some(11));
        assert_eq!(out.questions[0].answer.as_deref(), Some("Hector"));
    }
}
