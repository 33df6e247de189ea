use tracing::debug;

/// Pull the embedded text layer out of a PDF. Scanned/image-only PDFs have
/// no text layer; that yields an empty string rather than an error, so a
/// chunk read of such a file still succeeds (with zero total characters).
pub fn extract_text(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("no extractable PDF text layer: {e}");
            String::new()
        }
    }
}
