use crate::error::{BridgeError, Result};

/// Default chunk width in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// A bounded slice of the input text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Character offset of the chunk's first character in the input.
    pub start_offset: usize,
}

/// Lazy iterator over the chunks of one input text.
///
/// Pure function of its inputs: no I/O, deterministic, restartable by
/// constructing it again.
pub struct Chunks {
    chars: Vec<char>,
    size: usize,
    stride: usize,
    position: usize,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.position >= self.chars.len() {
            return None;
        }
        let end = (self.position + self.size).min(self.chars.len());
        let chunk = Chunk {
            text: self.chars[self.position..end].iter().collect(),
            start_offset: self.position,
        };
        self.position += self.stride;
        Some(chunk)
    }
}

/// Split `text` into windows of at most `max_chunk_size` characters.
///
/// Successive windows overlap by `floor(max_chunk_size * overlap)` characters;
/// the final window may be shorter. `overlap` must lie in [0, 1) — at 1.0 the
/// scan would never advance.
pub fn chunk_text(text: &str, max_chunk_size: usize, overlap: Option<f32>) -> Result<Chunks> {
    if max_chunk_size == 0 {
        return Err(BridgeError::InvalidChunkSize);
    }
    let overlap = overlap.unwrap_or(0.0);
    if !(0.0..1.0).contains(&overlap) {
        return Err(BridgeError::InvalidOverlap(overlap));
    }

    let shared = (max_chunk_size as f32 * overlap).floor() as usize;
    Ok(Chunks {
        chars: text.chars().collect(),
        size: max_chunk_size,
        stride: max_chunk_size - shared,
        position: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 326 characters across two markdown paragraphs.
    const SAMPLE: &str = "## Retrieval\n\nSaved snippets are embedded and indexed so that later prompts can pull them back in as extra context for the model.\n\n## Chunking\n\nLong documents are split into bounded windows before embedding. Neighbouring windows may share a configurable fraction of their text so that no sentence is lost at a window boundary.";

    #[test]
    fn sample_chunk_counts_match_the_fixture() {
        assert_eq!(SAMPLE.chars().count(), 326);
        assert_eq!(chunk_text(SAMPLE, 40, None).unwrap().count(), 9);
        assert_eq!(chunk_text(SAMPLE, 40, Some(0.1)).unwrap().count(), 10);
        assert_eq!(chunk_text(SAMPLE, DEFAULT_CHUNK_SIZE, None).unwrap().count(), 2);
    }

    #[test]
    fn every_chunk_is_bounded_and_offsets_advance_by_the_stride() {
        let chunks: Vec<Chunk> = chunk_text(SAMPLE, 40, Some(0.1)).unwrap().collect();
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 40);
        }
        for pair in chunks.windows(2) {
            // overlap of floor(40 * 0.1) = 4 characters
            assert_eq!(pair[1].start_offset - pair[0].start_offset, 36);
        }
    }

    #[test]
    fn chunks_reassemble_to_the_input_when_overlap_is_zero() {
        let rebuilt: String = chunk_text(SAMPLE, 40, None)
            .unwrap()
            .map(|chunk| chunk.text)
            .collect();
        assert_eq!(rebuilt, SAMPLE);
    }

    #[test]
    fn overlap_of_one_or_more_is_rejected() {
        assert!(matches!(
            chunk_text(SAMPLE, 40, Some(1.0)),
            Err(BridgeError::InvalidOverlap(_))
        ));
        assert!(matches!(
            chunk_text(SAMPLE, 40, Some(1.5)),
            Err(BridgeError::InvalidOverlap(_))
        ));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_text(SAMPLE, 0, None),
            Err(BridgeError::InvalidChunkSize)
        ));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert_eq!(chunk_text("", 40, None).unwrap().count(), 0);
    }
}
