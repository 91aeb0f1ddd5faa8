//! Document loading from text and JSON sources.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::AgentError;

/// One loaded document: content plus string metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub page_content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Loaders for the formats the interpreter ingests.
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load one whole text file as a single document.
    pub fn from_text(path: &Path) -> Result<Vec<Document>, AgentError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::DocumentError(format!("{}: {}", path.display(), e)))?;
        let mut document = Document::new(content);
        document
            .metadata
            .insert("source".to_string(), path.display().to_string());
        Ok(vec![document])
    }

    /// Load documents from a JSON file. `pointer` selects the content root
    /// (JSON Pointer syntax, "" for the whole document); an array yields one
    /// document per element, anything else a single document. `content_key`
    /// picks a field out of object elements.
    pub fn from_json(
        path: &Path,
        pointer: &str,
        content_key: Option<&str>,
    ) -> Result<Vec<Document>, AgentError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AgentError::DocumentError(format!("{}: {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| AgentError::DocumentError(format!("{}: {}", path.display(), e)))?;
        let root = value.pointer(pointer).ok_or_else(|| {
            AgentError::DocumentError(format!(
                "{}: no value at pointer '{}'",
                path.display(),
                pointer
            ))
        })?;

        let elements: Vec<&Value> = match root {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut documents = Vec::with_capacity(elements.len());
        for (position, element) in elements.into_iter().enumerate() {
            let text = match (content_key, element) {
                (Some(key), Value::Object(map)) => match map.get(key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => {
                        return Err(AgentError::DocumentError(format!(
                            "{}: element {} has no key '{}'",
                            path.display(),
                            position,
                            key
                        )))
                    }
                },
                (_, Value::String(s)) => s.clone(),
                (_, other) => other.to_string(),
            };
            let mut document = Document::new(text);
            document
                .metadata
                .insert("source".to_string(), path.display().to_string());
            document
                .metadata
                .insert("seq_num".to_string(), (position + 1).to_string());
            documents.push(document);
        }
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "robot manual").unwrap();
        let documents = DocumentLoader::from_text(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].page_content, "robot manual");
        assert!(documents[0].metadata["source"].ends_with("doc.txt"));
    }

    #[test]
    fn test_from_text_missing_file_errors() {
        let err = DocumentLoader::from_text(Path::new("/nonexistent/doc.txt")).unwrap_err();
        assert!(matches!(err, AgentError::DocumentError(_)));
    }

    #[test]
    fn test_from_json_array_with_content_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(
            &path,
            r#"{"items": [{"text": "pick", "id": 1}, {"text": "place", "id": 2}]}"#,
        )
        .unwrap();
        let documents = DocumentLoader::from_json(&path, "/items", Some("text")).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].page_content, "pick");
        assert_eq!(documents[1].metadata["seq_num"], "2");
    }

    #[test]
    fn test_from_json_missing_pointer_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        fs::write(&path, r#"{"items": []}"#).unwrap();
        let err = DocumentLoader::from_json(&path, "/missing", None).unwrap_err();
        assert!(matches!(err, AgentError::DocumentError(_)));
    }
}
