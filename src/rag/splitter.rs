//! Character-based text splitting.

use crate::rag::Document;

/// Split on one separator, then pack pieces into chunks of at most
/// `chunk_size` characters with `chunk_overlap` characters carried between
/// adjacent chunks.
pub struct CharacterTextSplitter {
    pub separator: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for CharacterTextSplitter {
    fn default() -> Self {
        Self {
            separator: "\n\n".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl CharacterTextSplitter {
    pub fn new(separator: impl Into<String>, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            separator: separator.into(),
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            vec![text]
        } else {
            text.split(self.separator.as_str()).collect()
        };
        pack_pieces(&pieces, &self.separator, self.chunk_size, self.chunk_overlap)
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        split_documents_with(documents, |text| self.split_text(text))
    }
}

/// Try separators in order, recursing into finer separators for oversized
/// pieces.
pub struct RecursiveCharacterTextSplitter {
    pub separators: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for RecursiveCharacterTextSplitter {
    fn default() -> Self {
        Self {
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl RecursiveCharacterTextSplitter {
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, 0)
    }

    fn split_with(&self, text: &str, level: usize) -> Vec<String> {
        if text.chars().count() <= self.chunk_size || level >= self.separators.len() {
            if text.is_empty() {
                return Vec::new();
            }
            return vec![text.to_string()];
        }
        let separator = &self.separators[level];
        if separator.is_empty() {
            // Final level: hard split by characters.
            let chars: Vec<char> = text.chars().collect();
            return chars
                .chunks(self.chunk_size.max(1))
                .map(|chunk| chunk.iter().collect())
                .collect();
        }

        let pieces: Vec<&str> = text.split(separator.as_str()).collect();
        let mut out = Vec::new();
        for packed in pack_pieces(&pieces, separator, self.chunk_size, self.chunk_overlap) {
            if packed.chars().count() > self.chunk_size {
                out.extend(self.split_with(&packed, level + 1));
            } else {
                out.push(packed);
            }
        }
        out
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        split_documents_with(documents, |text| self.split_text(text))
    }
}

fn split_documents_with(
    documents: &[Document],
    split: impl Fn(&str) -> Vec<String>,
) -> Vec<Document> {
    let mut out = Vec::new();
    for document in documents {
        for chunk in split(&document.page_content) {
            out.push(Document {
                page_content: chunk,
                metadata: document.metadata.clone(),
            });
        }
    }
    out
}

fn pack_pieces(
    pieces: &[&str],
    separator: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if piece.is_empty() {
            continue;
        }
        let candidate_len = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + separator.chars().count() + piece.chars().count()
        };
        if !current.is_empty() && candidate_len > chunk_size {
            chunks.push(current.clone());
            let overlap: String = current
                .chars()
                .skip(current.chars().count().saturating_sub(chunk_overlap))
                .collect();
            current = overlap;
        }
        if !current.is_empty() {
            current.push_str(separator);
        }
        current.push_str(piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
