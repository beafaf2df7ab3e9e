use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{read_to_string, ReadError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
}

impl Book {
    /// "<Title> by <Author>", the form used in question preambles and answers.
    pub fn title_by_author(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// Read-only access to the book catalog, passed explicitly to readers.
pub trait BookLookup {
    fn book(&self, key: &str) -> Option<&Book>;

    /// Resolve a book key from the title and author as written in a source.
    fn key_for(&self, title: &str, author: &str) -> Option<&str>;

    fn contains(&self, key: &str) -> bool {
        self.book(key).is_some()
    }

    fn title_author(&self, key: &str) -> Option<(&str, &str)> {
        self.book(key).map(|b| (b.title.as_str(), b.author.as_str()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    books: BTreeMap<String, Book>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, ReadError> {
        let raw = read_to_string(path)?;
        Self::from_json(&raw).map_err(|source| ReadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    #[cfg(test)]
    pub fn from_books<I, K>(books: I) -> Self
    where
        I: IntoIterator<Item = (K, Book)>,
        K: Into<String>,
    {
        Catalog {
            books: books.into_iter().map(|(k, b)| (k.into(), b)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl BookLookup for Catalog {
    fn book(&self, key: &str) -> Option<&Book> {
        self.books.get(key)
    }

    fn key_for(&self, title: &str, author: &str) -> Option<&str> {
        let wanted = format!("{} by {}", title.trim(), author.trim());
        // exact first, then case-insensitive
        self.books
            .iter()
            .find(|(_, b)| b.title_by_author() == wanted)
            .or_else(|| {
                let lower = wanted.to_lowercase();
                self.books
                    .iter()
                    .find(|(_, b)| b.title_by_author().to_lowercase() == lower)
            })
            .map(|(k, _)| k.as_str())
    }
}

#[cfg(test)]
pub(crate) fn test_catalog() -> Catalog {
    Catalog::from_books([
        (
            "holes",
            Book {
                title: "Holes".into(),
                author: "Louis Sachar".into(),
            },
        ),
        (
            "candidly-cline",
            Book {
                title: "Candidly Cline".into(),
                author: "Janet Fox".into(),
            },
        ),
        (
            "wild-robot",
            Book {
                title: "The Wild Robot".into(),
                author: "Peter Brown".into(),
            },
        ),
    ])
}
