pub mod docx;
pub mod encoding;
pub mod pdf;

use std::path::Path;

use crate::ops::ReadError;

/// Supported document kinds, dispatched by file extension. The set is small
/// and closed; everything unrecognized is treated as text and run through
/// encoding detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    LegacyDoc,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => FileKind::Pdf,
            Some("docx") => FileKind::Docx,
            Some("doc") => FileKind::LegacyDoc,
            _ => FileKind::Text,
        }
    }
}

/// Produce the text representation of a file's raw bytes. The whole file is
/// already in memory at this point; there is no streaming extraction.
pub fn extract(
    path: &Path,
    bytes: &[u8],
    forced: Option<&'static encoding_rs::Encoding>,
) -> Result<String, ReadError> {
    match FileKind::from_path(path) {
        FileKind::Text => Ok(encoding::decode(bytes, forced)),
        FileKind::Pdf => Ok(pdf::extract_text(bytes)),
        FileKind::Docx => docx::extract_text(bytes),
        FileKind::LegacyDoc => Err(ReadError::UnsupportedFormat(
            "legacy .doc files are not supported; save the document as .docx and try again".into(),
        )),
    }
}
