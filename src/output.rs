use std::path::Path;

use anyhow::Context;

use crate::model::QuestionDocument;

/// Write the document as pretty-printed JSON, creating parent directories.
pub fn write_document(path: &Path, doc: &QuestionDocument) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(doc).context("serializing questions")?;
    std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionRecord, Source};

    #[test]
    fn writes_pretty_json_with_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("questions.json");
        let doc = QuestionDocument::new(vec![QuestionRecord::in_which_book(
            "is there a café?".into(),
            "holes",
            Some(3),
        )])
        .with_source(Some(Source {
            name: "Lake Oswego".into(),
            link: "https://example.org/list".into(),
        }));
        write_document(&path, &doc).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"questions\": ["));
        assert!(raw.contains("café"));
        let back: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(back["questions"][0]["type"], "in-which-book");
        assert_eq!(back["source"]["name"], "Lake Oswego");
        assert!(back["questions"][0].get("answer").is_none());
    }
}
