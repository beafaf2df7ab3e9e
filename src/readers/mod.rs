pub mod csv_export;
pub mod folders;
pub mod loose;
pub mod numbered;
pub mod tagged;
pub mod workbook;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::BookLookup;
use crate::diagnostics::Diagnostics;
use crate::model::{QuestionRecord, QuestionType};
use crate::normalize::markers::strip_two_part_marker;
use crate::normalize::Normalizer;

static CONTENT_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^in\s+(.+?)\s+by\s+(.+?),\s*(.*)$").unwrap());
static ANSWER_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:answer:\s*)?(.+?)\s+by\s+(.+?)(?:\s*\(p\.[^)]*\))?\s*$").unwrap()
});

/// Per-layout rules layered over the shared normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderProfile {
    /// Let the answer text decide `two_part` when no marker is present.
    pub conjunction_heuristic: bool,
    /// Drop content records that have no answer.
    pub require_answer: bool,
}

impl Default for ReaderProfile {
    fn default() -> Self {
        ReaderProfile {
            conjunction_heuristic: true,
            require_answer: true,
        }
    }
}

/// Everything a reader needs besides its input.
#[derive(Clone, Copy)]
pub struct ReadContext<'a> {
    pub catalog: &'a dyn BookLookup,
    pub normalizer: &'a Normalizer,
    pub profile: ReaderProfile,
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub questions: Vec<QuestionRecord>,
    pub diagnostics: Diagnostics,
}

impl Extraction {
    pub fn merge(&mut self, other: Extraction) {
        self.questions.extend(other.questions);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Title and author as written in a source, e.g. "Holes" / "Louis Sachar".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookReference {
    pub title: String,
    pub author: String,
}

impl BookReference {
    pub fn label(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// "<Title> by <Author> (p. N)" as written in an in-which-book answer.
pub fn answer_reference(answer: &str) -> Option<BookReference> {
    let caps = ANSWER_REF_RE.captures(answer.trim())?;
    Some(BookReference {
        title: caps[1].trim().to_string(),
        author: caps[2].trim().to_string(),
    })
}

pub fn origin(path: &Path, line: usize) -> String {
    format!("{}:{}", file_label(path), line)
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<'a> ReadContext<'a> {
    pub fn new(catalog: &'a dyn BookLookup, normalizer: &'a Normalizer) -> Self {
        ReadContext {
            catalog,
            normalizer,
            profile: ReaderProfile::default(),
        }
    }

    pub fn with_profile(&self, profile: ReaderProfile) -> ReadContext<'a> {
        ReadContext { profile, ..*self }
    }

    /// "In <Title> by <Author>, ..." at the start of a content question, after any two-part marker.
    pub fn content_reference(&self, question: &str) -> Option<BookReference> {
        let (text, _) = strip_two_part_marker(question, self.normalizer.config().two_part_markers.as_slice());
        let caps = CONTENT_REF_RE.captures(text)?;
        Some(BookReference {
            title: caps[1].trim().to_string(),
            author: caps[2].trim().to_string(),
        })
    }

    /// Key for a title/author pair; records an unresolved diagnostic on a miss.
    pub fn resolve(&self, reference: &BookReference, origin: &str, diags: &mut Diagnostics) -> Option<String> {
        match self.catalog.key_for(&reference.title, &reference.author) {
            Some(key) => Some(key.to_string()),
            None => {
                diags.unresolved(origin, &reference.label());
                None
            }
        }
    }

    /// Check that a key taken from a file or folder name exists in the catalog.
    pub fn known_key(&self, key: &str, origin: &str, diags: &mut Diagnostics) -> bool {
        if self.catalog.contains(key) {
            true
        } else {
            diags.unresolved(origin, key);
            false
        }
    }

    fn book_parts(&self, key: &str) -> (String, Option<String>) {
        match self.catalog.title_author(key) {
            Some((title, author)) => (title.to_string(), Some(author.to_string())),
            None => (String::new(), None),
        }
    }

    /// Build a content record. `page` (from an explicit column) wins over the
    /// answer's annotation.
    pub fn content_record(
        &self,
        origin: &str,
        raw_question: &str,
        raw_answer: &str,
        book_key: &str,
        page: Option<u32>,
        diags: &mut Diagnostics,
    ) -> Option<QuestionRecord> {
        let (title, author) = self.book_parts(book_key);
        let normalized = match self.normalizer.normalize(
            raw_question,
            QuestionType::Content,
            &title,
            author.as_deref(),
        ) {
            Ok(n) => n,
            Err(e) => {
                diags.normalize_issue(origin, &e);
                return None;
            }
        };
        if let Some(issue) = &normalized.issue {
            diags.normalize_issue(origin, issue);
        }

        let book = author.as_deref().map(|a| (title.as_str(), a));
        let (answer, answer_page) = self.normalizer.normalize_answer(raw_answer, book);
        if answer.is_empty() && self.profile.require_answer {
            diags.malformed(origin, format!("no answer for: {}", normalized.text));
            return None;
        }
        let heuristic = self.profile.conjunction_heuristic && self.normalizer.answer_is_two_part(&answer);
        let answer = Some(answer).filter(|a| !a.is_empty());
        Some(
            QuestionRecord::content(normalized.text, book_key, answer, page.or(answer_page))
                .with_two_part(normalized.two_part || heuristic),
        )
    }

    /// Build an in-which-book record; never carries an answer.
    pub fn in_which_book_record(
        &self,
        origin: &str,
        raw_question: &str,
        book_key: &str,
        page: Option<u32>,
        diags: &mut Diagnostics,
    ) -> Option<QuestionRecord> {
        let normalized = match self.normalizer.normalize(
            raw_question,
            QuestionType::InWhichBook,
            "",
            None,
        ) {
            Ok(n) => n,
            Err(e) => {
                diags.normalize_issue(origin, &e);
                return None;
            }
        };
        if normalized.text.trim_end_matches('?').is_empty() {
            diags.malformed(origin, format!("empty question: {}", raw_question));
            return None;
        }
        Some(QuestionRecord::in_which_book(normalized.text, book_key, page).with_two_part(normalized.two_part))
    }
}
