//! Document chunking: split long extracted text into bounded windows.
//!
//! Each chunk becomes one model call, so chunking is what keeps an
//! arbitrarily long paper inside a fixed input budget. Windows overlap so a
//! sentence or table cut by one boundary is seen whole by the next chunk.
//!
//! The function never trims or drops a window: every character index of the
//! source text lands in at least one chunk, and concatenating the chunks
//! with the overlap regions removed reproduces the source exactly. Chunking
//! operates on `char` boundaries, so multi-byte text never splits mid-glyph.

/// Split `text` into ordered chunks of at most `size` characters, where each
/// chunk after the first starts `overlap` characters before the previous
/// chunk's end.
///
/// Returns a single chunk when `text` fits in `size`. The final chunk may be
/// shorter than `size`. Callers guarantee `overlap < size`; the config
/// builder enforces this before any chunking happens.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size, "overlap must be smaller than chunk size");

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= size {
        return vec![text.to_string()];
    }

    let step = size - overlap;
    let mut chunks = Vec::with_capacity(chars.len() / step + 1);
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
