use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Content,
    InWhichBook,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Content => "content",
            QuestionType::InWhichBook => "in-which-book",
        }
    }

    /// Guess the kind from raw question text.
    pub fn infer(question: &str) -> Self {
        let lower = question.trim_start().to_lowercase();
        if lower.starts_with("in which book") || lower.starts_with("iwb") {
            QuestionType::InWhichBook
        } else {
            QuestionType::Content
        }
    }
}

/// One question in the output document. Built once per raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub text: String,
    pub book_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub two_part: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl QuestionRecord {
    pub fn content(text: String, book_key: &str, answer: Option<String>, page: Option<u32>) -> Self {
        QuestionRecord {
            kind: QuestionType::Content,
            text,
            book_key: book_key.to_string(),
            answer,
            page,
            two_part: false,
        }
    }

    pub fn in_which_book(text: String, book_key: &str, page: Option<u32>) -> Self {
        QuestionRecord {
            kind: QuestionType::InWhichBook,
            text,
            book_key: book_key.to_string(),
            answer: None,
            page,
            two_part: false,
        }
    }

    pub fn with_two_part(mut self, two_part: bool) -> Self {
        self.two_part = two_part;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionDocument {
    pub questions: Vec<QuestionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl QuestionDocument {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        QuestionDocument {
            questions,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<Source>) -> Self {
        self.source = source;
        self
    }

    pub fn count(&self, kind: QuestionType) -> usize {
        self.questions.iter().filter(|q| q.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_which_book_serializes_without_answer() {
        let q = QuestionRecord::in_which_book("does a dog bark?".into(), "holes", Some(3));
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["type"], "in-which-book");
        assert!(v.get("answer").is_none());
        assert!(v.get("two_part").is_none());
        assert_eq!(v["page"], 3);
    }

    #[test]
    fn two_part_only_emitted_when_true() {
        let q = QuestionRecord::content("who?".into(), "holes", Some("red and blue".into()), None)
            .with_two_part(true);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(v["two_part"], true);
        assert!(v.get("page").is_none());

        let q = q.with_two_part(false);
        let v = serde_json::to_value(&q).unwrap();
        assert!(v.get("two_part").is_none());
    }

    #[test]
    fn document_source_block_is_optional() {
        let doc = QuestionDocument::new(vec![]);
        let v = serde_json::to_value(&doc).unwrap();
        assert!(v.get("source").is_none());

        let doc = doc.with_source(Some(Source {
            name: "Lake Oswego Public Library".into(),
            link: "https://example.org".into(),
        }));
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["source"]["name"], "Lake Oswego Public Library");
    }

    #[test]
    fn infer_kind_from_prefix() {
        assert_eq!(QuestionType::infer("In which book is there a cat?"), QuestionType::InWhichBook);
        assert_eq!(QuestionType::infer("IWB a dog barks"), QuestionType::InWhichBook);
        assert_eq!(QuestionType::infer("In Holes, who digs?"), QuestionType::Content);
    }
}
