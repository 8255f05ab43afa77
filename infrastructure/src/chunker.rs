//! Splits extracted page text into overlapping bounded-size passages.
//!
//! Cleaning happens before chunking so boundaries are computed on the
//! cleaned text. Splitting tries a priority-ordered separator list and
//! only falls back to character-level cuts when nothing coarser yields
//! small-enough pieces, keeping paragraphs, then lines, then words
//! intact as long as possible.

use crate::document_loader::PageText;
use domain::models::Passage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

/// Separator priority: paragraph break, line break, word break, then
/// character-level fallback.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Everything outside letters, digits, whitespace and a small set of
/// punctuation and financial symbols is dropped.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s$%.,\-():;/]").unwrap());

pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Chunk a document's extracted pages into passages. Each passage
    /// carries the page it was cut from, so citations never point at a
    /// page that did not exist in the source.
    pub fn chunk(&self, pages: &[PageText], source_id: &str) -> Vec<Passage> {
        let mut passages = Vec::new();
        for page in pages {
            let cleaned = clean_text(&page.text);
            if cleaned.is_empty() {
                continue;
            }
            for piece in self.split_text(&cleaned) {
                passages.push(Passage {
                    text: piece,
                    page: page.page,
                    source_id: source_id.to_string(),
                });
            }
        }
        passages
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator that occurs in the text wins; "" always does.
        let mut separator = *separators.last().unwrap_or(&"");
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator).map(String::from).collect()
        };

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();
        for split in splits {
            if split.len() < self.chunk_size {
                good_splits.push(split);
            } else {
                if !good_splits.is_empty() {
                    let merged = self.merge_splits(std::mem::take(&mut good_splits), separator);
                    final_chunks.extend(merged);
                }
                if remaining.is_empty() {
                    // Single unsplittable token longer than the chunk
                    // size passes through whole.
                    final_chunks.push(split);
                } else {
                    final_chunks.extend(self.split_recursive(&split, remaining));
                }
            }
        }
        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(good_splits, separator));
        }
        final_chunks
    }

    /// Accumulate splits until adding one would exceed the chunk size,
    /// emit the joined chunk, then drop leading splits until the carried
    /// tail fits inside the overlap budget.
    fn merge_splits(&self, splits: Vec<String>, separator: &str) -> Vec<String> {
        let sep_len = separator.len();
        let mut chunks = Vec::new();
        let mut current: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = split.len();
            let join_cost = if current.is_empty() { 0 } else { sep_len };
            if total + len + join_cost > self.chunk_size && !current.is_empty() {
                if let Some(chunk) = join_chunk(&current, separator) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap
                    || (total + len + if current.is_empty() { 0 } else { sep_len }
                        > self.chunk_size
                        && total > 0)
                {
                    let first = match current.pop_front() {
                        Some(first) => first,
                        None => break,
                    };
                    total -= first.len() + if current.is_empty() { 0 } else { sep_len };
                }
            }
            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push_back(split);
        }
        if let Some(chunk) = join_chunk(&current, separator) {
            chunks.push(chunk);
        }
        chunks
    }
}

fn join_chunk(parts: &VecDeque<String>, separator: &str) -> Option<String> {
    let joined = parts
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Collapse whitespace runs to a single space and drop characters
/// outside the whitelist. Applied before chunking, never after.
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RUNS.replace_all(text, " ");
    let filtered = DISALLOWED.replace_all(&collapsed, "");
    filtered.trim().to_string()
}
