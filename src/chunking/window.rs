//! Sliding token window chunker.

use super::{CharSpan, Chunk, ChunkMetadata, ChunkingConfig};
use crate::error::{Result, TubeQueryError};
use crate::transcript::PositionMap;
use tracing::debug;

/// A whitespace-delimited token and its byte offset in the buffer.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    offset: usize,
    text: &'a str,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

fn tokenize(buffer: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (idx, c) in buffer.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    offset: s,
                    text: &buffer[s..idx],
                });
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            offset: s,
            text: &buffer[s..],
        });
    }

    tokens
}

/// Pull the window end back to the last sentence terminator in its trailing
/// half, as long as the chunk keeps at least half its nominal size.
fn sentence_end(tokens: &[Token<'_>], start: usize, end: usize, chunk_size: usize) -> usize {
    let min_end = start + chunk_size.div_ceil(2).max(1);
    (min_end..=end)
        .rev()
        .find(|&e| tokens[e - 1].text.ends_with('.'))
        .unwrap_or(end)
}

/// Timestamp for a chunk starting at `offset`.
///
/// A lookup miss falls back to the last known timestamp in the map.
fn resolve_timestamp(position_map: &PositionMap, offset: usize) -> f64 {
    match position_map.timestamp_at(offset) {
        Some(timestamp) => timestamp,
        None => {
            let fallback = position_map.last_timestamp().unwrap_or(0.0);
            debug!(
                "No position entry contains offset {}, using last timestamp {}",
                offset, fallback
            );
            fallback
        }
    }
}

/// Split a normalized transcript into overlapping chunks.
///
/// Output is ordered by span start and fully determined by the inputs.
pub fn chunk(
    buffer: &str,
    position_map: &PositionMap,
    config: &ChunkingConfig,
    metadata: &ChunkMetadata,
) -> Result<Vec<Chunk>> {
    config.validate()?;

    let tokens = tokenize(buffer);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    if position_map.is_empty() {
        return Err(TubeQueryError::DataIntegrity(format!(
            "position map is empty for a {}-byte transcript of {}",
            buffer.len(),
            metadata.video_id
        )));
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let mut end = (start + config.chunk_size).min(tokens.len());
        if config.sentence_boundaries && end < tokens.len() {
            end = sentence_end(&tokens, start, end, config.chunk_size);
        }

        let span = CharSpan {
            start: tokens[start].offset,
            end: tokens[end - 1].end(),
        };
        let order = chunks.len();

        chunks.push(Chunk {
            chunk_id: Chunk::make_id(&metadata.video_id, order),
            order,
            text: buffer[span.start..span.end].to_string(),
            char_span: span,
            timestamp: resolve_timestamp(position_map, span.start),
            metadata: metadata.clone(),
        });

        if end == tokens.len() {
            break;
        }
        start = end.saturating_sub(config.overlap).max(start + 1);
    }

    debug!(
        "Chunked {} tokens into {} chunks for {}",
        tokens.len(),
        chunks.len(),
        metadata.video_id
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{normalize, PositionEntry, TranscriptSegment};

    fn metadata() -> ChunkMetadata {
        ChunkMetadata {
            video_id: "vid".to_string(),
            source: "test".to_string(),
        }
    }

    fn example() -> (String, PositionMap) {
        let normalized = normalize(&[
            TranscriptSegment::new("Hello world", 0.0, 2.0),
            TranscriptSegment::new("this is a test", 2.0, 3.0),
        ])
        .unwrap();
        (normalized.buffer, normalized.position_map)
    }

    fn long_transcript() -> (String, PositionMap) {
        let segments: Vec<TranscriptSegment> = (0..40)
            .map(|i| {
                TranscriptSegment::new(
                    format!("segment {} says something quite specific here.", i),
                    i as f64 * 4.0,
                    4.0,
                )
            })
            .collect();
        let normalized = normalize(&segments).unwrap();
        (normalized.buffer, normalized.position_map)
    }

    #[test]
    fn test_example_transcript() {
        let (buffer, map) = example();
        let config = ChunkingConfig::new(3, 1).unwrap();
        let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Hello world this");
        assert_eq!(chunks[0].timestamp, 0.0);
        assert_eq!(chunks[0].char_span, CharSpan { start: 0, end: 16 });
        assert_eq!(chunks[1].text, "this is a");
        assert_eq!(chunks[1].timestamp, 2.0);
        assert_eq!(chunks[2].text, "a test");
        assert_eq!(chunks[2].timestamp, 2.0);
        assert_eq!(chunks[0].chunk_id, "vid:0000");
        assert_eq!(chunks[2].chunk_id, "vid:0002");
    }

    #[test]
    fn test_chunk_starting_in_second_segment_gets_its_timestamp() {
        let (buffer, map) = example();
        let config = ChunkingConfig::new(3, 0).unwrap();
        let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "is a test");
        assert_eq!(chunks[1].timestamp, 2.0);
    }

    #[test]
    fn test_timestamp_matches_containing_entry() {
        let (buffer, map) = long_transcript();
        let config = ChunkingConfig::new(10, 3).unwrap();
        let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

        for c in &chunks {
            let entry = map
                .entries()
                .iter()
                .find(|e| e.char_start <= c.char_span.start && c.char_span.start < e.char_end)
                .unwrap();
            assert_eq!(c.timestamp, entry.timestamp);
        }
    }

    #[test]
    fn test_text_matches_span() {
        let (buffer, map) = long_transcript();
        let config = ChunkingConfig::new(12, 4).unwrap().with_sentence_boundaries(true);
        for c in chunk(&buffer, &map, &config, &metadata()).unwrap() {
            assert_eq!(c.text, &buffer[c.char_span.start..c.char_span.end]);
        }
    }

    #[test]
    fn test_ordering_overlap_and_coverage() {
        let (buffer, map) = long_transcript();
        let tokens = tokenize(&buffer);

        for (size, overlap) in [(1, 0), (5, 0), (5, 4), (10, 3), (50, 10), (1000, 999)] {
            for boundaries in [false, true] {
                let config = ChunkingConfig::new(size, overlap)
                    .unwrap()
                    .with_sentence_boundaries(boundaries);
                let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

                assert_eq!(chunks[0].char_span.start, tokens[0].offset);
                assert_eq!(chunks.last().unwrap().char_span.end, buffer.len());

                for pair in chunks.windows(2) {
                    let (prev, next) = (&pair[0], &pair[1]);
                    assert!(prev.char_span.start < next.char_span.start);

                    let shared = tokens
                        .iter()
                        .filter(|t| t.offset >= next.char_span.start && t.offset < prev.char_span.end)
                        .count();
                    assert!(shared <= overlap, "size={} overlap={}", size, overlap);
                }

                for token in &tokens {
                    assert!(chunks.iter().any(|c| {
                        c.char_span.start <= token.offset && token.end() <= c.char_span.end
                    }));
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let (buffer, map) = long_transcript();
        let config = ChunkingConfig::new(20, 5).unwrap().with_sentence_boundaries(true);
        let first = chunk(&buffer, &map, &config, &metadata()).unwrap();
        let second = chunk(&buffer, &map, &config, &metadata()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_never_clamped() {
        let (buffer, map) = example();
        for (size, overlap) in [(0, 0), (3, 3), (3, 5)] {
            let config = ChunkingConfig {
                chunk_size: size,
                overlap,
                sentence_boundaries: false,
            };
            assert!(matches!(
                chunk(&buffer, &map, &config, &metadata()),
                Err(TubeQueryError::InvalidChunkConfig(_))
            ));
        }
    }

    #[test]
    fn test_empty_buffer() {
        let config = ChunkingConfig::new(3, 1).unwrap();
        let empty = PositionMap::default();
        assert!(chunk("", &empty, &config, &metadata()).unwrap().is_empty());
        assert!(chunk("  \n ", &empty, &config, &metadata()).unwrap().is_empty());
    }

    #[test]
    fn test_short_buffer_single_chunk() {
        let (buffer, map) = example();
        let config = ChunkingConfig::new(100, 10).unwrap();
        let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, buffer);
        assert_eq!(chunks[0].char_span, CharSpan { start: 0, end: buffer.len() });
    }

    #[test]
    fn test_no_dangling_final_window() {
        let (buffer, map) = example();
        // Six tokens, windows of four with step two: the second window reaches the end.
        let config = ChunkingConfig::new(4, 2).unwrap();
        let chunks = chunk(&buffer, &map, &config, &metadata()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "this is a test");
    }

    #[test]
    fn test_sentence_boundary_preferred() {
        let normalized = normalize(&[
            TranscriptSegment::new("One two three.", 0.0, 3.0),
            TranscriptSegment::new("Four five six seven eight nine ten.", 3.0, 5.0),
        ])
        .unwrap();
        let config = ChunkingConfig::new(6, 1).unwrap().with_sentence_boundaries(true);
        let chunks = chunk(&normalized.buffer, &normalized.position_map, &config, &metadata()).unwrap();

        assert_eq!(chunks[0].text, "One two three.");
        assert_eq!(chunks[1].text, "three. Four five six seven eight");
        assert_eq!(chunks[2].text, "eight nine ten.");
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_sentence_boundary_keeps_half_size() {
        let normalized = normalize(&[TranscriptSegment::new("Hi. a b c d e f g", 0.0, 5.0)]).unwrap();
        let config = ChunkingConfig::new(6, 0).unwrap().with_sentence_boundaries(true);
        let chunks = chunk(&normalized.buffer, &normalized.position_map, &config, &metadata()).unwrap();

        assert_eq!(chunks[0].text, "Hi. a b c d e");
        assert_eq!(chunks[1].text, "f g");
    }

    #[test]
    fn test_lookup_miss_falls_back_to_last_timestamp() {
        let buffer = "Hello world again";
        let map = PositionMap::from_entries(vec![
            PositionEntry {
                char_start: 0,
                char_end: 5,
                timestamp: 1.0,
                text: "Hello".to_string(),
            },
            PositionEntry {
                char_start: 6,
                char_end: 11,
                timestamp: 4.0,
                text: "world".to_string(),
            },
        ])
        .unwrap();
        let config = ChunkingConfig::new(1, 0).unwrap();
        let chunks = chunk(buffer, &map, &config, &metadata()).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].timestamp, 1.0);
        assert_eq!(chunks[1].timestamp, 4.0);
        // "again" is not covered by any entry.
        assert_eq!(chunks[2].timestamp, 4.0);
    }

    #[test]
    fn test_empty_map_with_text_is_integrity_error() {
        let config = ChunkingConfig::new(3, 1).unwrap();
        let result = chunk("some text", &PositionMap::default(), &config, &metadata());
        assert!(matches!(result, Err(TubeQueryError::DataIntegrity(_))));
    }

    #[test]
    fn test_multibyte_text() {
        let normalized = normalize(&[
            TranscriptSegment::new("café naïve", 0.0, 1.0),
            TranscriptSegment::new("日本語 テキスト", 1.0, 1.0),
        ])
        .unwrap();
        let config = ChunkingConfig::new(2, 0).unwrap();
        let chunks = chunk(&normalized.buffer, &normalized.position_map, &config, &metadata()).unwrap();

        assert_eq!(chunks[0].text, "café naïve");
        assert_eq!(chunks[1].text, "日本語 テキスト");
        assert_eq!(chunks[1].timestamp, 1.0);
    }
}
