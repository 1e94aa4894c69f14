//! Word-window chunking

/// Split text into overlapping word windows.
///
/// `overlap` must be smaller than `chunk_size`; it is clamped if not, so the
/// loop always advances.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));

        if end >= words.len() {
            break;
        }

        start += chunk_size - overlap;
    }

    chunks
}
