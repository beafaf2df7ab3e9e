pub mod markers;
pub mod page;

use serde::Deserialize;

use crate::error::NormalizeError;
use crate::model::QuestionType;
use markers::{strip_prefix_ci, strip_prefix_unicode_ci, strip_two_part_marker};

pub use page::{extract_page, parse_page_field, PageDefault};

/// Which markers and preambles apply.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub two_part_markers: Vec<String>,
    pub in_which_book_prefixes: Vec<String>,
    pub content_templates: Vec<String>,
    /// Treat answers containing " and ", a comma or "Any two:" as two-part.
    pub conjunction_heuristic: bool,
    /// Unmatched content preambles become errors instead of diagnostics.
    pub strict: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        let owned = |xs: &[&str]| -> Vec<String> { xs.iter().map(|s| s.to_string()).collect() };
        NormalizerConfig {
            two_part_markers: owned(markers::TWO_PART_MARKERS),
            in_which_book_prefixes: owned(markers::IN_WHICH_BOOK_PREFIXES),
            content_templates: owned(markers::CONTENT_TEMPLATES),
            conjunction_heuristic: true,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub two_part: bool,
    /// Set when a content preamble could not be removed; `text` keeps it.
    pub issue: Option<NormalizeError>,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Normalizer { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Clean a raw question: two-part marker, preamble, whitespace, trailing `?`.
    pub fn normalize(
        &self,
        raw: &str,
        kind: QuestionType,
        title: &str,
        author: Option<&str>,
    ) -> Result<Normalized, NormalizeError> {
        let raw = page::strip_annotations(raw);
        let had_question_mark = raw.trim_end().ends_with('?');
        let (text, two_part) = strip_two_part_marker(&raw, self.config.two_part_markers.as_slice());
        let text = collapse_whitespace(text);

        let (body, issue) = match kind {
            QuestionType::InWhichBook => (self.strip_iwb_prefix(&text).to_string(), None),
            QuestionType::Content => match self.strip_content_preamble(&text, title, author) {
                Ok(rest) => (rest.to_string(), None),
                Err(e) if self.config.strict => return Err(e),
                Err(e) => (text.clone(), Some(e)),
            },
        };

        Ok(Normalized {
            text: finish_question_mark(&body, had_question_mark),
            two_part,
            issue,
        })
    }

    fn strip_iwb_prefix<'a>(&self, text: &'a str) -> &'a str {
        for prefix in &self.config.in_which_book_prefixes {
            if let Some(rest) = strip_prefix_ci(text, prefix) {
                return rest.trim_start().trim_start_matches('.').trim_start();
            }
        }
        text
    }

    fn strip_content_preamble<'a>(
        &self,
        text: &'a str,
        title: &str,
        author: Option<&str>,
    ) -> Result<&'a str, NormalizeError> {
        if strip_prefix_ci(text, "in").is_none() {
            return Err(NormalizeError::NotAPreamble(text.to_string()));
        }
        let title = collapse_whitespace(title);
        if title.is_empty() {
            return Err(NormalizeError::PreambleMismatch {
                text: text.to_string(),
                title,
            });
        }
        let author = author.map(collapse_whitespace).filter(|a| !a.is_empty());

        for template in &self.config.content_templates {
            let bare = template.replace("{title}", &title);
            let candidates = author
                .as_ref()
                .map(|a| format!("{} by {}", bare, a))
                .into_iter()
                .chain(std::iter::once(bare.clone()));
            for candidate in candidates {
                if let Some(rest) = strip_prefix_unicode_ci(text, &candidate) {
                    if rest.starts_with(|c: char| c.is_alphanumeric()) {
                        continue;
                    }
                    let rest = rest.trim_start();
                    return Ok(rest.strip_prefix(',').unwrap_or(rest).trim_start());
                }
            }
        }
        Err(NormalizeError::PreambleMismatch {
            text: text.to_string(),
            title,
        })
    }

    /// Clean a content answer and pull its page number.
    pub fn normalize_answer(&self, raw: &str, book: Option<(&str, &str)>) -> (String, Option<u32>) {
        let page = extract_page(raw);
        let stripped = page::strip_annotations(raw);
        let mut text = stripped.trim();
        if let Some((title, author)) = book {
            let reference = format!("{} by {}", title.trim(), author.trim());
            if let Some(rest) = strip_prefix_unicode_ci(text, &reference) {
                text = rest;
            }
        }
        let collapsed = collapse_whitespace(text);
        let clean = collapsed
            .trim_matches(|c: char| c == ',' || c == '(' || c == ')' || c.is_whitespace())
            .to_string();
        (clean, page)
    }

    pub fn answer_is_two_part(&self, answer: &str) -> bool {
        self.config.conjunction_heuristic && answer_is_two_part(answer)
    }
}

/// Heuristic two-part check on an answer.
pub fn answer_is_two_part(answer: &str) -> bool {
    answer.contains(" and ") || answer.contains(',') || answer.contains("Any two:")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn finish_question_mark(text: &str, had_question_mark: bool) -> String {
    let mut out = text
        .trim_end_matches(|c: char| c == '?' || c.is_whitespace())
        .trim_start()
        .to_string();
    if had_question_mark {
        out.push('?');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Normalizer {
        Normalizer::default()
    }

    #[test]
    fn content_preamble_with_author() {
        let out = n()
            .normalize(
                "In Holes by Louis Sachar, why did Stanley dig?",
                QuestionType::Content,
                "Holes",
                Some("Louis Sachar"),
            )
            .unwrap();
        assert_eq!(out.text, "why did Stanley dig?");
        assert!(!out.two_part);
        assert!(out.issue.is_none());
    }

    #[test]
    fn content_preamble_templates() {
        for raw in [
            "In the book, Holes, who is Zero?",
            "in the book Holes who is Zero?",
            "IN HOLES, who is Zero??",
            "In Holes who is Zero ?",
        ] {
            let out = n().normalize(raw, QuestionType::Content, "Holes", None).unwrap();
            assert_eq!(out.text, "who is Zero?", "{raw}");
        }
    }

    #[test]
    fn page_annotation_is_removed_from_question() {
        let out = n()
            .normalize("In Holes, who is Zero? (p. 9)", QuestionType::Content, "Holes", None)
            .unwrap();
        assert_eq!(out.text, "who is Zero?");

        let out = n()
            .normalize("IWB is there a dry lake (p. 3, 4)?", QuestionType::InWhichBook, "", None)
            .unwrap();
        assert_eq!(out.text, "is there a dry lake?");
    }

    #[test]
    fn title_must_end_at_word_boundary() {
        let out = n()
            .normalize("In Holesome Acres, who farms?", QuestionType::Content, "Holes", None)
            .unwrap();
        assert!(matches!(out.issue, Some(NormalizeError::PreambleMismatch { .. })));
        assert_eq!(out.text, "In Holesome Acres, who farms?");
    }

    #[test]
    fn content_without_in_is_flagged() {
        let out = n()
            .normalize("Who is Zero?", QuestionType::Content, "Holes", None)
            .unwrap();
        assert_eq!(out.text, "Who is Zero?");
        assert_eq!(out.issue, Some(NormalizeError::NotAPreamble("Who is Zero?".into())));
    }

    #[test]
    fn strict_mode_raises() {
        let strict = Normalizer::new(NormalizerConfig {
            strict: true,
            ..NormalizerConfig::default()
        });
        let err = strict
            .normalize("In Wonder, who is Auggie?", QuestionType::Content, "Holes", None)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::PreambleMismatch { .. }));
    }

    #[test]
    fn in_which_book_prefixes() {
        for raw in [
            "In which book does a boy dig holes?",
            "in which book. does a boy dig holes?",
            "IWB does a boy dig holes?",
            "iwb.  does a boy   dig holes",
        ] {
            let out = n().normalize(raw, QuestionType::InWhichBook, "", None).unwrap();
            assert!(out.text.starts_with("does a boy dig holes"), "{raw}");
            assert!(!out.text.to_lowercase().contains("which book"));
        }
    }

    #[test]
    fn question_mark_only_kept_when_present() {
        let out = n()
            .normalize("In which book is a boy cursed", QuestionType::InWhichBook, "", None)
            .unwrap();
        assert_eq!(out.text, "is a boy cursed");
        let out = n()
            .normalize("In which book is a boy cursed ? ?", QuestionType::InWhichBook, "", None)
            .unwrap();
        assert_eq!(out.text, "is a boy cursed?");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            ("In which book   does a boy dig??", QuestionType::InWhichBook),
            ("[Two Part]: In which book do two   friends fight", QuestionType::InWhichBook),
            ("In Holes, why  is there no lake? ", QuestionType::Content),
        ];
        for (raw, kind) in inputs {
            let once = n().normalize(raw, kind, "Holes", None).unwrap().text;
            let twice = n().normalize(&once, kind, "Holes", None).unwrap().text;
            assert_eq!(once, twice, "{raw}");
        }
    }

    #[test]
    fn two_part_marker_removed_before_preamble() {
        let out = n()
            .normalize(
                "(2 PARTS): In Holes, name the two camp counselors.",
                QuestionType::Content,
                "Holes",
                None,
            )
            .unwrap();
        assert!(out.two_part);
        assert_eq!(out.text, "name the two camp counselors.");
    }

    #[test]
    fn answer_cleanup() {
        let (answer, page) = n().normalize_answer("Because of a curse (p. 12)", None);
        assert_eq!(answer, "Because of a curse");
        assert_eq!(page, Some(12));

        let (answer, page) = n().normalize_answer(
            "Holes by Louis Sachar, the yellow-spotted lizard (p. 7, 9)",
            Some(("Holes", "Louis Sachar")),
        );
        assert_eq!(answer, "the yellow-spotted lizard");
        assert_eq!(page, Some(7));

        let (answer, page) = n().normalize_answer("  (a   peach) ", None);
        assert_eq!(answer, "a peach");
        assert_eq!(page, None);
    }

    #[test]
    fn conjunction_heuristic() {
        assert!(n().answer_is_two_part("red and blue"));
        assert!(n().answer_is_two_part("Paris, France"));
        assert!(n().answer_is_two_part("Any two: a cat, a dog, a fish"));
        assert!(!n().answer_is_two_part("red"));
        assert!(!n().answer_is_two_part("Sandy"));

        let off = Normalizer::new(NormalizerConfig {
            conjunction_heuristic: false,
            ..NormalizerConfig::default()
        });
        assert!(!off.answer_is_two_part("red and blue"));
    }
}
