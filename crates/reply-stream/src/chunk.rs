//! Chunker: rendered text → size-bounded segments.
//!
//! A plain fixed-width split by character count. It is not word-, line- or markdown-aware, so a split can
//! fall inside a word, an emphasis marker or a code fence. Joining the segments gives back the input.

/// Splits `text` into consecutive segments of at most `limit` characters. Empty text gives no segments.
pub fn split_segments(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut segments = Vec::with_capacity(text.len() / limit + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == limit {
            segments.push(text[start..idx].to_string());
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        segments.push(text[start..].to_string());
    }
    segments
}
