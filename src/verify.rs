//! Cross-check generated documents against the book catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::BookLookup;
use crate::diagnostics::Diagnostics;
use crate::error::{read_to_string, ReadError};

#[derive(Debug, Deserialize)]
struct KeyedDocument {
    #[serde(default)]
    questions: Vec<KeyedQuestion>,
}

#[derive(Debug, Deserialize)]
struct KeyedQuestion {
    #[serde(default)]
    text: String,
    #[serde(default)]
    book_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReference {
    pub source: PathBuf,
    pub text: String,
    pub book_key: String,
}

#[derive(Debug, Default)]
pub struct VerifyReport {
    pub invalid: Vec<InvalidReference>,
    pub total: usize,
    pub diagnostics: Diagnostics,
}

impl VerifyReport {
    pub fn print(&self) {
        if self.invalid.is_empty() {
            println!("\nAll questions have valid book keys!");
        } else {
            println!("\nFound questions with invalid book keys:");
            for r in &self.invalid {
                println!("\nSource: {}", r.source.display());
                println!("Question: {}", r.text);
                println!("Invalid book_key: {}", r.book_key);
            }
            println!("\nTotal invalid questions: {}", self.invalid.len());
        }
        println!("\nTotal questions processed: {}", self.total);
        self.diagnostics.print();
    }
}

fn load(path: &Path) -> Result<KeyedDocument, ReadError> {
    let raw = read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| ReadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn verify(catalog: &dyn BookLookup, sources: &[PathBuf]) -> VerifyReport {
    let mut report = VerifyReport::default();
    for source in sources {
        let doc = match load(source) {
            Ok(doc) => doc,
            Err(e) => {
                report.diagnostics.read_failure(&e);
                continue;
            }
        };
        report.total += doc.questions.len();
        report.invalid.extend(
            doc.questions
                .into_iter()
                .filter(|q| !catalog.contains(&q.book_key))
                .map(|q| InvalidReference {
                    source: source.clone(),
                    text: q.text,
                    book_key: q.book_key,
                }),
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn lists_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("lake_oswego.json");
        std::fs::write(
            &good,
            r#"{"questions": [
                {"type": "content", "text": "who is Zero?", "book_key": "holes", "answer": "Hector"},
                {"type": "in-which-book", "text": "is there a bear?", "book_key": "bear-book"}
            ]}"#,
        )
        .unwrap();
        let broken = dir.path().join("glencoe.json");
        std::fs::write(&broken, "{not json").unwrap();
        let missing = dir.path().join("cedar_mill.json");

        let catalog = test_catalog();
        let report = verify(&catalog, &[good.clone(), missing, broken]);

        assert_eq!(report.total, 2);
        assert_eq!(
            report.invalid,
            vec![InvalidReference {
                source: good,
                text: "is there a bear?".into(),
                book_key: "bear-book".into(),
            }]
        );
        assert_eq!(report.diagnostics.count(DiagnosticKind::MissingInput), 1);
        assert_eq!(report.diagnostics.count(DiagnosticKind::InvalidInput), 1);
    }
}
