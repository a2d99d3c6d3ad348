use remex_types::{Chunk, ChunkId};
use tracing::debug;

/// Minimum elements per chunk; the chunk count shrinks before this does.
const MIN_CHUNK_LEN: usize = 2;

/// Split `source` into `requested` contiguous disjoint chunks.
///
/// elements_per_chunk = L / K by integer division; if that falls below the
/// minimum, the minimum wins and K is recomputed (never below 1). The last
/// chunk absorbs the remainder, so the chunks cover the array exactly.
/// Deterministic in (L, K).
pub fn partition(source: &[i64], requested: usize) -> Vec<Chunk> {
    let len = source.len();
    let requested = requested.max(1);

    let mut per_chunk = len / requested;
    let mut count = requested;
    if per_chunk < MIN_CHUNK_LEN {
        per_chunk = MIN_CHUNK_LEN;
        count = (len / per_chunk).max(1);
    }

    let mut chunks = Vec::with_capacity(count);
    for i in 0..count {
        let start = i * per_chunk;
        let end = if i == count - 1 { len } else { start + per_chunk };
        chunks.push(Chunk::new(ChunkId(i as u32), source[start..end].to_vec()));
    }

    debug!(
        array_len = len,
        requested,
        produced = chunks.len(),
        per_chunk,
        "Partitioned source array"
    );
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(len: usize) -> Vec<i64> {
        (0..len as i64).collect()
    }

    #[test]
    fn test_even_split() {
        let chunks = partition(&source(10), 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 5);
        assert_eq!(chunks[1].len(), 5);
    }

    #[test]
    fn test_remainder_folds_into_last_chunk() {
        let chunks = partition(&source(11), 3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 3);
        assert_eq!(chunks[1].len(), 3);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn test_chunk_count_reduced_for_small_arrays() {
        // 5 / 4 = 1 < 2, so per-chunk is forced to 2 and K becomes 5 / 2 = 2
        let chunks = partition(&source(5), 4);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1].len(), 3);
    }

    #[test]
    fn test_at_least_one_chunk() {
        let chunks = partition(&source(3), 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }

    #[test]
    fn test_partition_invariants_over_grid() {
        for len in 4..40 {
            let src = source(len);
            for requested in 1..12 {
                let chunks = partition(&src, requested);
                let total: usize = chunks.iter().map(|c| c.len()).sum();
                assert_eq!(total, len, "L={} K={}", len, requested);
                for chunk in &chunks {
                    assert!(chunk.len() >= 2, "L={} K={}", len, requested);
                }
                // Chunks are contiguous and disjoint: concatenation
                // reproduces the source.
                let flat: Vec<i64> = chunks.iter().flat_map(|c| c.values.clone()).collect();
                assert_eq!(flat, src);
            }
        }
    }
}
