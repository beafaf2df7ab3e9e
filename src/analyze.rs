//! Statistics over generated question documents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::diagnostics::Diagnostics;
use crate::error::{read_to_string, ReadError};
use crate::utils::{percent, truncate};

const CONTENT: &str = "content";
const IN_WHICH_BOOK: &str = "in-which-book";

/// Question documents are read loosely so older files still count.
#[derive(Debug, Default, Deserialize)]
struct LooseDocument {
    #[serde(default)]
    questions: Vec<LooseQuestion>,
}

#[derive(Debug, Default, Deserialize)]
struct LooseQuestion {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    book_key: Option<String>,
    #[serde(default)]
    answer: Option<serde_json::Value>,
    #[serde(default)]
    page: Option<serde_json::Value>,
}

fn truthy(v: &Option<serde_json::Value>) -> bool {
    match v {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(serde_json::Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileStats {
    pub path: PathBuf,
    pub total: usize,
    pub with_answers: usize,
    pub with_pages: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_book: BTreeMap<String, usize>,
    pub by_book_type: BTreeMap<String, BTreeMap<String, usize>>,
}

impl FileStats {
    pub fn load(path: &Path) -> Result<Self, ReadError> {
        let raw = read_to_string(path)?;
        let doc: LooseDocument = serde_json::from_str(&raw).map_err(|source| ReadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_questions(path, &doc.questions))
    }

    fn from_questions(path: &Path, questions: &[LooseQuestion]) -> Self {
        let mut stats = FileStats {
            path: path.to_path_buf(),
            total: questions.len(),
            with_answers: 0,
            with_pages: 0,
            by_type: BTreeMap::new(),
            by_book: BTreeMap::new(),
            by_book_type: BTreeMap::new(),
        };
        for q in questions {
            let kind = q.kind.as_deref().unwrap_or("unknown");
            let book = q.book_key.as_deref().unwrap_or("unknown");
            *stats.by_type.entry(kind.to_string()).or_default() += 1;
            *stats.by_book.entry(book.to_string()).or_default() += 1;
            *stats
                .by_book_type
                .entry(book.to_string())
                .or_default()
                .entry(kind.to_string())
                .or_default() += 1;
            if truthy(&q.answer) {
                stats.with_answers += 1;
            }
            if truthy(&q.page) {
                stats.with_pages += 1;
            }
        }
        stats
    }

    pub fn num_books(&self) -> usize {
        self.by_book.len()
    }

    pub fn average_per_book(&self) -> f64 {
        if self.by_book.is_empty() {
            0.0
        } else {
            self.total as f64 / self.by_book.len() as f64
        }
    }

    /// Counts sorted descending, ties by name.
    fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
        counts
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)))
            .collect()
    }

    fn type_count(&self, book: &str, kind: &str) -> usize {
        self.by_book_type
            .get(book)
            .and_then(|t| t.get(kind))
            .copied()
            .unwrap_or(0)
    }

    /// Books whose question mix looks off, with the reason.
    pub fn unusual(&self) -> Vec<(String, String)> {
        let avg = self.average_per_book();
        let mut out = Vec::new();
        for book in self.by_book_type.keys() {
            let content = self.type_count(book, CONTENT);
            let iwb = self.type_count(book, IN_WHICH_BOOK);
            let total = content + iwb;
            let issue = if (total as f64) < avg * 0.5 {
                Some(format!("Low question count: {}", total))
            } else if content == 0 {
                Some("No content questions".to_string())
            } else if iwb == 0 {
                Some("No in-which-book questions".to_string())
            } else if content as f64 / total as f64 > 0.8 {
                Some(format!("High content ratio: {:.1}%", percent(content, total)))
            } else if iwb as f64 / total as f64 > 0.8 {
                Some(format!("High in-which-book ratio: {:.1}%", percent(iwb, total)))
            } else {
                None
            };
            if let Some(issue) = issue {
                out.push((book.clone(), issue));
            }
        }
        out
    }

    /// (min, max, median) questions per book.
    pub fn spread(&self) -> Option<(usize, usize, usize)> {
        let counts: Vec<usize> = self.by_book.values().copied().sorted().collect();
        let (min, max) = (*counts.first()?, *counts.last()?);
        Some((min, max, counts[counts.len() / 2]))
    }

    pub fn print(&self) {
        let division = division_label(&self.path)
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{}", "=".repeat(80));
        println!("QUESTIONS ANALYSIS: {}{}", name, division);
        println!("File: {}", self.path.display());
        println!("{}", "=".repeat(80));

        println!("\nOVERALL STATISTICS");
        println!("Total questions: {}", self.total);
        println!(
            "Questions with answers: {} ({:.1}%)",
            self.with_answers,
            percent(self.with_answers, self.total)
        );
        println!(
            "Questions with page numbers: {} ({:.1}%)",
            self.with_pages,
            percent(self.with_pages, self.total)
        );

        println!("\nQUESTIONS BY TYPE");
        for (kind, count) in Self::ranked(&self.by_type) {
            println!("  {}: {} ({:.1}%)", kind, count, percent(count, self.total));
        }

        println!("\nQUESTIONS BY BOOK (sorted by count)");
        for (book, count) in Self::ranked(&self.by_book) {
            println!("  {}: {} ({:.1}%)", book, count, percent(count, self.total));
        }
        println!("\nAverage questions per book: {:.1}", self.average_per_book());

        println!("\nDETAILED BREAKDOWN BY BOOK AND TYPE");
        println!(
            "{:<40} {:<10} {:<15} {:<8} {:<8}",
            "Book", "Content", "In-Which-Book", "Other", "Total"
        );
        println!("{}", "-".repeat(85));
        for (book, total) in &self.by_book {
            let content = self.type_count(book, CONTENT);
            let iwb = self.type_count(book, IN_WHICH_BOOK);
            println!(
                "{:<40} {:<10} {:<15} {:<8} {:<8}",
                truncate(book, 40),
                content,
                iwb,
                total - content - iwb,
                total
            );
        }

        println!("\nBOOKS WITH UNUSUAL DISTRIBUTIONS");
        let unusual = self.unusual();
        if unusual.is_empty() {
            println!("  No unusual distributions found.");
        }
        for (book, issue) in &unusual {
            println!("  - {}: {}", book, issue);
        }

        println!("\nSUMMARY STATISTICS");
        println!("Number of books: {}", self.num_books());
        if let Some((min, max, median)) = self.spread() {
            println!("Min questions per book: {}", min);
            println!("Max questions per book: {}", max);
            println!("Median questions per book: {}", median);
        }
    }
}

/// "2025-2026/6-8" from a path like `public/obob/2025-2026/6-8/questions.json`.
pub fn division_label(path: &Path) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let (year, division) = parts
        .iter()
        .tuple_windows()
        .find(|(year, _)| year.starts_with("202") && year.len() == 9)?;
    Some(format!("{}/{}", year, division))
}

/// Every `questions.json` under `root`, skipping `node_modules` and `.git`.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            name != "node_modules" && name != ".git"
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "questions.json")
        .map(|e| e.into_path())
        .sorted()
        .collect()
}

/// Stats for every readable file; unreadable or empty files go to diagnostics.
pub fn analyze_files(files: &[PathBuf], diags: &mut Diagnostics) -> Vec<FileStats> {
    let mut out = Vec::new();
    for path in files.iter().unique() {
        match FileStats::load(path) {
            Ok(stats) if stats.total == 0 => {
                diags.malformed(path.display().to_string(), "No questions found in the file.");
            }
            Ok(stats) => out.push(stats),
            Err(e) => diags.read_failure(&e),
        }
    }
    out
}

pub fn print_summary(all: &[FileStats]) {
    let grand: usize = all.iter().map(|s| s.total).sum();
    println!("\n{}", "=".repeat(80));
    println!("SUMMARY ACROSS ALL FILES");
    println!("{}", "=".repeat(80));
    println!("\nGRAND TOTALS");
    println!("Total files analyzed: {}", all.len());
    println!("Total questions across all files: {}", grand);

    println!("\nQUESTIONS BY FILE");
    for s in all.iter().sorted_by(|a, b| b.total.cmp(&a.total)) {
        let name = s.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let division = division_label(&s.path).map(|d| format!(" ({})", d)).unwrap_or_default();
        println!("  {}{}: {} ({:.1}%)", name, division, s.total, percent(s.total, grand));
    }
}
