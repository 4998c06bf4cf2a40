//! Overlapping text chunker.
//!
//! Splits text into windows of at most `chunk_size` characters where each
//! window starts exactly `chunk_overlap` characters before the previous one
//! ended. Cut points prefer natural boundaries, in order: paragraph break,
//! sentence break, word break, then a hard cut at `chunk_size`.
//!
//! Lengths and offsets are counted in `char`s, never bytes.

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
}

/// Validated chunk size / overlap pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkingError> {
        if chunk_size == 0 {
            return Err(ChunkingError::ZeroChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// A window of the source text. Offsets are char positions, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// Boundary kinds, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Sentence,
    Word,
}

const BOUNDARY_PRIORITY: [Boundary; 3] = [Boundary::Paragraph, Boundary::Sentence, Boundary::Word];

/// Splits `text` into overlapping chunks according to `config`.
///
/// Empty input yields no chunks. Every consecutive pair of chunks shares
/// exactly `chunk_overlap` characters and no chunk is longer than
/// `chunk_size`.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    // Byte offset of every char, plus the end of the string.
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let size = config.chunk_size;
    let overlap = config.chunk_overlap;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total {
        let end = if total - start <= size {
            total
        } else {
            let min_end = start + (overlap + 1).max(size / 2);
            let max_end = start + size;
            find_cut(&chars, min_end, max_end).unwrap_or(max_end)
        };

        chunks.push(Chunk {
            index: chunks.len(),
            text: text[offsets[start]..offsets[end]].to_string(),
            char_start: start,
            char_end: end,
        });

        if end == total {
            break;
        }
        start = end - overlap;
    }

    chunks
}

/// Last cut position in `[min_end, max_end]` of the highest-priority
/// boundary kind present.
fn find_cut(chars: &[char], min_end: usize, max_end: usize) -> Option<usize> {
    BOUNDARY_PRIORITY.iter().find_map(|&kind| {
        (min_end..=max_end)
            .rev()
            .find(|&pos| is_boundary(chars, pos, kind))
    })
}

/// Whether cutting right before `chars[pos]` lands on a `kind` boundary.
fn is_boundary(chars: &[char], pos: usize, kind: Boundary) -> bool {
    if pos == 0 || pos > chars.len() {
        return false;
    }
    let prev = chars[pos - 1];
    match kind {
        Boundary::Paragraph => {
            pos >= 2 && prev == '\n' && chars[pos - 2] == '\n' && chars.get(pos) != Some(&'\n')
        }
        Boundary::Sentence => {
            if prev == '\n' {
                return true;
            }
            pos >= 2 && prev.is_whitespace() && matches!(chars[pos - 2], '.' | '!' | '?')
        }
        Boundary::Word => prev.is_whitespace(),
    }
}
