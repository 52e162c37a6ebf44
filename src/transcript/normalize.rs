//! Flattening of caption segments into a single searchable buffer.

use super::TranscriptSegment;
use crate::error::{Result, TubeQueryError};
use serde::{Deserialize, Serialize};

/// Binds a half-open byte range of the normalized buffer to a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub char_start: usize,
    pub char_end: usize,
    /// Start time of the segment that produced this range.
    pub timestamp: f64,
    pub text: String,
}

impl PositionEntry {
    fn contains(&self, offset: usize) -> bool {
        self.char_start <= offset && offset < self.char_end
    }
}

/// Ordered index from buffer offsets to timestamps.
///
/// Entries are sorted by `char_start` and never overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionMap {
    entries: Vec<PositionEntry>,
}

impl PositionMap {
    /// Build a map from entries, rejecting unsorted or overlapping ranges.
    pub fn from_entries(entries: Vec<PositionEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.char_end < entry.char_start {
                return Err(TubeQueryError::DataIntegrity(format!(
                    "position entry has inverted range {}..{}",
                    entry.char_start, entry.char_end
                )));
            }
        }
        for pair in entries.windows(2) {
            if pair[1].char_start < pair[0].char_end {
                return Err(TubeQueryError::DataIntegrity(format!(
                    "position entries overlap or are unsorted at offset {}",
                    pair[1].char_start
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the entry whose range contains `offset`.
    pub fn timestamp_at(&self, offset: usize) -> Option<f64> {
        let idx = self.entries.partition_point(|e| e.char_start <= offset);
        let entry = self.entries.get(idx.checked_sub(1)?)?;
        entry.contains(offset).then_some(entry.timestamp)
    }

    /// Timestamp of the last entry, used when a lookup misses.
    pub fn last_timestamp(&self) -> Option<f64> {
        self.entries.last().map(|e| e.timestamp)
    }
}

/// A transcript flattened into one buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTranscript {
    pub buffer: String,
    pub position_map: PositionMap,
}

/// Concatenate segment texts into one buffer and record where each landed.
///
/// A single ASCII space is inserted between segments unless the buffer already
/// ends in whitespace. Segments with empty text are skipped. An empty input
/// yields an empty buffer; callers decide whether that is an error.
pub fn normalize(segments: &[TranscriptSegment]) -> Result<NormalizedTranscript> {
    let mut buffer = String::new();
    let mut entries = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        if !segment.start.is_finite() || segment.start < 0.0 {
            return Err(TubeQueryError::InvalidInput(format!(
                "segment {} has invalid start time {}",
                i, segment.start
            )));
        }
        if !segment.duration.is_finite() || segment.duration <= 0.0 {
            return Err(TubeQueryError::InvalidInput(format!(
                "segment {} has invalid duration {}",
                i, segment.duration
            )));
        }
        if segment.text.is_empty() {
            continue;
        }

        if buffer.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
            buffer.push(' ');
        }

        let char_start = buffer.len();
        buffer.push_str(&segment.text);
        entries.push(PositionEntry {
            char_start,
            char_end: buffer.len(),
            timestamp: segment.start,
            text: segment.text.clone(),
        });
    }

    Ok(NormalizedTranscript {
        buffer,
        position_map: PositionMap { entries },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new("Hello world", 0.0, 2.0),
            TranscriptSegment::new("this is a test", 2.0, 3.0),
        ]
    }

    #[test]
    fn test_normalize_inserts_single_separator() {
        let normalized = normalize(&segments()).unwrap();
        assert_eq!(normalized.buffer, "Hello world this is a test");

        let entries = normalized.position_map.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].char_start, entries[0].char_end), (0, 11));
        assert_eq!((entries[1].char_start, entries[1].char_end), (12, 26));
        assert_eq!(entries[1].timestamp, 2.0);
    }

    #[test]
    fn test_normalize_no_double_space() {
        let segments = vec![
            TranscriptSegment::new("ends with space ", 0.0, 1.0),
            TranscriptSegment::new("next", 1.0, 1.0),
            TranscriptSegment::new("line\n", 2.0, 1.0),
            TranscriptSegment::new("after newline", 3.0, 1.0),
        ];
        let normalized = normalize(&segments).unwrap();
        assert_eq!(normalized.buffer, "ends with space next line\nafter newline");
        assert!(!normalized.buffer.contains("  "));
    }

    #[test]
    fn test_entries_partition_buffer() {
        let segments = vec![
            TranscriptSegment::new("first", 0.0, 1.0),
            TranscriptSegment::new("second ", 1.0, 1.0),
            TranscriptSegment::new("third", 2.0, 1.0),
            TranscriptSegment::new("fourth", 3.0, 1.0),
        ];
        let total_text: usize = segments.iter().map(|s| s.text.len()).sum();
        let normalized = normalize(&segments).unwrap();
        assert!(normalized.buffer.len() >= total_text);

        let entries = normalized.position_map.entries();
        assert_eq!(entries[0].char_start, 0);
        assert_eq!(entries.last().unwrap().char_end, normalized.buffer.len());
        for pair in entries.windows(2) {
            let gap = pair[1].char_start - pair[0].char_end;
            assert!(gap <= 1);
            if gap == 1 {
                assert_eq!(&normalized.buffer[pair[0].char_end..pair[1].char_start], " ");
            }
        }
        for entry in entries {
            assert_eq!(&normalized.buffer[entry.char_start..entry.char_end], entry.text);
        }
    }

    #[test]
    fn test_empty_input() {
        let normalized = normalize(&[]).unwrap();
        assert!(normalized.buffer.is_empty());
        assert!(normalized.position_map.is_empty());
    }

    #[test]
    fn test_empty_segment_text_skipped() {
        let segments = vec![
            TranscriptSegment::new("a", 0.0, 1.0),
            TranscriptSegment::new("", 1.0, 1.0),
            TranscriptSegment::new("b", 2.0, 1.0),
        ];
        let normalized = normalize(&segments).unwrap();
        assert_eq!(normalized.buffer, "a b");
        assert_eq!(normalized.position_map.len(), 2);
    }

    #[test]
    fn test_invalid_segments_rejected() {
        let negative = vec![TranscriptSegment::new("x", -1.0, 1.0)];
        assert!(matches!(normalize(&negative), Err(TubeQueryError::InvalidInput(_))));

        let zero = vec![TranscriptSegment::new("x", 0.0, 0.0)];
        assert!(matches!(normalize(&zero), Err(TubeQueryError::InvalidInput(_))));

        let nan = vec![TranscriptSegment::new("x", f64::NAN, 1.0)];
        assert!(matches!(normalize(&nan), Err(TubeQueryError::InvalidInput(_))));
    }

    #[test]
    fn test_timestamp_lookup() {
        let map = normalize(&segments()).unwrap().position_map;
        assert_eq!(map.timestamp_at(0), Some(0.0));
        assert_eq!(map.timestamp_at(10), Some(0.0));
        // Inserted separator belongs to no segment.
        assert_eq!(map.timestamp_at(11), None);
        assert_eq!(map.timestamp_at(12), Some(2.0));
        assert_eq!(map.timestamp_at(25), Some(2.0));
        assert_eq!(map.timestamp_at(26), None);
        assert_eq!(map.last_timestamp(), Some(2.0));
    }

    #[test]
    fn test_from_entries_rejects_overlap() {
        let entries = vec![
            PositionEntry {
                char_start: 0,
                char_end: 5,
                timestamp: 0.0,
                text: "hello".to_string(),
            },
            PositionEntry {
                char_start: 3,
                char_end: 8,
                timestamp: 1.0,
                text: "lo wo".to_string(),
            },
        ];
        assert!(matches!(
            PositionMap::from_entries(entries),
            Err(TubeQueryError::DataIntegrity(_))
        ));
    }
}
