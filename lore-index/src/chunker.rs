//! Paragraph-aware text chunking.
//!
//! Chunks aim for the configured target length, never split inside a
//! paragraph unless a single paragraph exceeds the target, and carry a tail
//! overlap so entity mentions near a boundary appear in both chunks.

/// Split text into chunks of roughly `target` characters with `overlap`
/// characters carried from the previous chunk.
pub fn chunk_text(text: &str, target: usize, overlap: usize) -> Vec<String> {
    let target = target.max(64);
    let overlap = overlap.min(target / 2);

    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs {
        if paragraph.len() > target {
            // Oversized paragraph: flush, then hard-split on char
            // boundaries.
            flush(&mut chunks, &mut current, overlap);
            let mut rest = paragraph;
            while rest.len() > target {
                let cut = floor_char_boundary(rest, target);
                chunks.push(rest[..cut].to_string());
                rest = &rest[cut.saturating_sub(overlap_boundary(rest, cut, overlap))..];
            }
            current = rest.to_string();
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() + 2 > target {
            flush(&mut chunks, &mut current, overlap);
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

/// Push the current chunk and seed the next with its tail overlap.
fn flush(chunks: &mut Vec<String>, current: &mut String, overlap: usize) {
    if current.trim().is_empty() {
        current.clear();
        return;
    }
    let finished = std::mem::take(current);
    let tail_start = floor_char_boundary(&finished, finished.len().saturating_sub(overlap));
    let tail = finished[tail_start..].trim_start().to_string();
    chunks.push(finished.trim().to_string());
    *current = tail;
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Overlap length adjusted to land on a char boundary at `cut`.
fn overlap_boundary(s: &str, cut: usize, overlap: usize) -> usize {
    let want = cut.saturating_sub(overlap);
    cut - floor_char_boundary(s, want)
}
