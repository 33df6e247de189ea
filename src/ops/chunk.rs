use super::{ReadError, sandbox};
use crate::extract;
use crate::server::state::Config;

/// One extraction pass over a file: read, decode/extract, truncate.
/// Recomputed on every request; the server holds no cursor or cache, the
/// client owns the read offset.
struct Extraction {
    size_bytes: u64,
    text: String,
    truncated: bool,
}

#[derive(Debug)]
pub struct FullRead {
    pub size: u64,
    pub truncated: bool,
    pub text: String,
}

#[derive(Debug)]
pub struct ChunkRead {
    pub size: u64,
    pub offset: usize,
    pub length: usize,
    pub total_chars: usize,
    pub done: bool,
    pub next_offset: usize,
    pub chunk: String,
}

/// Cap text to `max_chars` characters (not bytes). Returns the text and
/// whether anything was cut.
pub fn truncate(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text, false),
    }
}

fn extract_file(cfg: &Config, rel: &str, enc: Option<&str>) -> Result<Extraction, ReadError> {
    let path = sandbox::resolve(&cfg.root, rel)?;
    if path.is_dir() {
        return Err(ReadError::NotAFile(rel.to_string()));
    }

    let bytes = std::fs::read(&path)?;
    let forced = enc.and_then(extract::encoding::forced_encoding);
    let text = extract::extract(&path, &bytes, forced)?;
    let (text, truncated) = truncate(text, cfg.max_file_chars);

    Ok(Extraction {
        size_bytes: bytes.len() as u64,
        text,
        truncated,
    })
}

/// Unchunked read: the whole (possibly truncated) extracted text at once.
pub fn read_full(cfg: &Config, rel: &str, enc: Option<&str>) -> Result<FullRead, ReadError> {
    let ex = extract_file(cfg, rel, enc)?;
    Ok(FullRead {
        size: ex.size_bytes,
        truncated: ex.truncated,
        text: ex.text,
    })
}

/// Paginated read of one character window `[offset, offset+length)` of the
/// extracted text, clipped at the end. Offsets are character positions in
/// the extracted string, not byte positions in the file, and are only
/// stable while the file is unchanged between calls.
pub fn read_chunk(
    cfg: &Config,
    rel: &str,
    offset: usize,
    length: usize,
    enc: Option<&str>,
) -> Result<ChunkRead, ReadError> {
    if length == 0 {
        return Err(ReadError::InvalidArgument(
            "length must be greater than zero".into(),
        ));
    }
    if length > cfg.max_chunk_len {
        return Err(ReadError::InvalidArgument(format!(
            "length must not exceed {}",
            cfg.max_chunk_len
        )));
    }

    let ex = extract_file(cfg, rel, enc)?;
    let total_chars = ex.text.chars().count();
    let chunk: String = ex.text.chars().skip(offset).take(length).collect();
    let next_offset = offset + chunk.chars().count();

    Ok(ChunkRead {
        size: ex.size_bytes,
        offset,
        length,
        total_chars,
        done: next_offset >= total_chars,
        next_offset,
        chunk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(root: &std::path::Path) -> Config {
        Config {
            root: root.to_path_buf(),
            max_file_chars: 1_000_000,
            max_chunk_len: 200_000,
            default_model: "llama-3.1-8b-instant".into(),
            api_key: None,
            api_base: String::new(),
        }
    }

    #[test]
    fn truncate_is_a_noop_under_the_ceiling() {
        let (text, truncated) = truncate("short".into(), 100);
        assert_eq!(text, "short");
        assert!(!truncated);

        // Exactly at the ceiling still counts as untruncated.
        let (text, truncated) = truncate("12345".into(), 5);
        assert_eq!(text, "12345");
        assert!(!truncated);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let (text, truncated) = truncate("日本語テキスト".into(), 3);
        assert_eq!(text, "日本語");
        assert!(truncated);
    }

    #[test]
    fn chunk_reads_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "abcdefghij").unwrap();
        let cfg = test_config(dir.path());

        let a = read_chunk(&cfg, "f.txt", 2, 4, None).unwrap();
        let b = read_chunk(&cfg, "f.txt", 2, 4, None).unwrap();
        assert_eq!(a.chunk, "cdef");
        assert_eq!(a.chunk, b.chunk);
        assert_eq!(a.next_offset, 6);
        assert!(!a.done);
    }

    #[test]
    fn sequential_chunks_reconstruct_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let content = "héllo wörld, chunked réads über multibyte text";
        std::fs::write(dir.path().join("f.txt"), content).unwrap();
        let cfg = test_config(dir.path());

        let mut offset = 0;
        let mut rebuilt = String::new();
        loop {
            let r = read_chunk(&cfg, "f.txt", offset, 7, None).unwrap();
            assert_eq!(r.next_offset, offset + r.chunk.chars().count());
            rebuilt.push_str(&r.chunk);
            offset = r.next_offset;
            if r.done {
                break;
            }
        }
        assert_eq!(rebuilt, content);
        assert_eq!(offset, content.chars().count());
    }

    #[test]
    fn offset_past_the_end_is_done_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "abc").unwrap();
        let cfg = test_config(dir.path());

        let r = read_chunk(&cfg, "f.txt", 100, 10, None).unwrap();
        assert_eq!(r.chunk, "");
        assert!(r.done);
        assert_eq!(r.next_offset, 100);
        assert_eq!(r.total_chars, 3);
    }

    #[test]
    fn length_bounds_are_enforced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "abc").unwrap();
        let cfg = test_config(dir.path());

        let err = read_chunk(&cfg, "f.txt", 0, 0, None).unwrap_err();
        assert!(matches!(err, ReadError::InvalidArgument(_)));

        let err = read_chunk(&cfg, "f.txt", 0, cfg.max_chunk_len + 1, None).unwrap_err();
        assert!(matches!(err, ReadError::InvalidArgument(_)));

        // Exactly at the ceiling is allowed.
        assert!(read_chunk(&cfg, "f.txt", 0, cfg.max_chunk_len, None).is_ok());
    }

    #[test]
    fn directory_target_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let cfg = test_config(dir.path());

        let err = read_chunk(&cfg, "sub", 0, 10, None).unwrap_err();
        assert!(matches!(err, ReadError::NotAFile(_)));
    }

    #[test]
    fn truncation_caps_total_chars_at_the_ceiling() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.txt"), "x".repeat(500)).unwrap();
        let mut cfg = test_config(dir.path());
        cfg.max_file_chars = 100;

        let full = read_full(&cfg, "big.txt", None).unwrap();
        assert!(full.truncated);
        assert_eq!(full.text.chars().count(), 100);

        let r = read_chunk(&cfg, "big.txt", 0, 200, None).unwrap();
        assert_eq!(r.total_chars, 100);
        assert!(r.done);
        assert_eq!(r.size, 500);
    }

    #[test]
    fn full_read_reports_byte_size_and_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "héllo").unwrap();
        let cfg = test_config(dir.path());

        let full = read_full(&cfg, "f.txt", None).unwrap();
        assert_eq!(full.text, "héllo");
        assert_eq!(full.size, "héllo".len() as u64);
        assert!(!full.truncated);
    }
}
