use encoding_rs::{Encoding, IBM866, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};

/// How many leading bytes to inspect when sniffing for BOM-less UTF-16.
pub const DETECTION_SAMPLE_BYTES: usize = 4096;

/// Zero-byte fraction above which a BOM-less buffer is treated as UTF-16LE.
pub const NUL_FRACTION_THRESHOLD: f64 = 0.20;

/// How many decoded characters each candidate is scored over.
pub const SCORING_WINDOW_CHARS: usize = 12_000;

/// Candidate single-pass decodings, tried in order when no BOM or UTF-16
/// signature is present. Ties go to the earlier candidate.
const CANDIDATES: &[&Encoding] = &[UTF_8, WINDOWS_1252, IBM866];

/// Map an `enc` query value to a supported forced encoding. Unrecognized
/// names return `None`, which falls back to heuristic detection.
pub fn forced_encoding(name: &str) -> Option<&'static Encoding> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some(UTF_8),
        "windows-1252" | "cp1252" | "latin1" | "iso-8859-1" => Some(WINDOWS_1252),
        "ibm866" | "cp866" => Some(IBM866),
        _ => None,
    }
}

/// Decode raw bytes to a string, best effort. Never fails: undecodable
/// sequences come back as replacement characters, not errors.
pub fn decode(bytes: &[u8], forced: Option<&'static Encoding>) -> String {
    if let Some(enc) = forced {
        // No BOM sniffing here: a BOM-bearing buffer must still decode
        // under the operator's chosen encoding.
        let (text, _) = enc.decode_without_bom_handling(bytes);
        return text.into_owned();
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (text, _, _) = UTF_16LE.decode(bytes);
        return text.into_owned();
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (text, _, _) = UTF_16BE.decode(bytes);
        return text.into_owned();
    }

    // BOM-less UTF-16LE of mostly-ASCII text shows up as every other byte
    // being zero, so a high NUL density is a strong signature.
    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE_BYTES)];
    if !sample.is_empty() {
        let nuls = sample.iter().filter(|&&b| b == 0).count();
        if nuls as f64 / sample.len() as f64 > NUL_FRACTION_THRESHOLD {
            let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
            return text.into_owned();
        }
    }

    best_candidate(bytes)
}

/// Decode under every candidate encoding and keep the least garbled result.
fn best_candidate(bytes: &[u8]) -> String {
    let mut best: Option<(usize, String)> = None;
    for enc in CANDIDATES {
        // Strips the candidate's own BOM when present (UTF-8's EF BB BF),
        // so a leading U+FEFF never shifts downstream chunk offsets.
        let (text, _) = enc.decode_with_bom_removal(bytes);
        let score = garbage_score(&text);
        if best.as_ref().is_none_or(|(s, _)| score < *s) {
            best = Some((score, text.into_owned()));
        }
    }
    best.map(|(_, text)| text).unwrap_or_default()
}

/// Count decode artifacts over the scoring window: replacement characters,
/// embedded NULs, and control characters that are not whitespace.
pub fn garbage_score(text: &str) -> usize {
    text.chars()
        .take(SCORING_WINDOW_CHARS)
        .filter(|&c| c == '\u{FFFD}' || c == '\0' || (c.is_control() && !c.is_whitespace()))
        .count()
}
