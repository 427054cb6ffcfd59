use chrono::DateTime;
use chrono::Utc;

use recap_store::Artifact;

/// One unit of encoded media emitted by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Ordered, in-memory sequence of captured chunks.
///
/// Appended in arrival order during capture and consumed exactly once at
/// finalize. There is no spill-to-disk; the recording is bounded by memory.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Chunk>,
    total: u64,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the cumulative byte total, which is what
    /// progress events must report. Empty chunks are discarded.
    pub fn push(&mut self, chunk: Chunk) -> u64 {
        if !chunk.is_empty() {
            self.total += chunk.len() as u64;
            self.chunks.push(chunk);
        }
        self.total
    }

    pub fn total_size(&self) -> u64 {
        self.total
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Assembles the buffered chunks into one artifact, consuming the
    /// buffer: the sequence is single-use.
    pub fn into_artifact(self, at: DateTime<Utc>) -> Artifact {
        let mut bytes = Vec::with_capacity(self.total as usize);
        for chunk in self.chunks {
            bytes.extend_from_slice(&chunk.into_bytes());
        }
        Artifact::new(bytes, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_reports_cumulative_totals() {
        let mut buffer = ChunkBuffer::new();
        assert_eq!(buffer.push(Chunk::new(vec![1; 100])), 100);
        assert_eq!(buffer.push(Chunk::new(vec![2; 200])), 300);
        assert_eq!(buffer.push(Chunk::new(vec![3; 150])), 450);
        assert_eq!(buffer.chunk_count(), 3);
    }

    #[test]
    fn empty_chunks_are_discarded() {
        let mut buffer = ChunkBuffer::new();
        buffer.push(Chunk::new(vec![1; 10]));
        assert_eq!(buffer.push(Chunk::new(Vec::new())), 10);
        assert_eq!(buffer.chunk_count(), 1);
    }

    #[test]
    fn artifact_preserves_arrival_order() {
        let mut buffer = ChunkBuffer::new();
        buffer.push(Chunk::new(vec![1, 1]));
        buffer.push(Chunk::new(vec![2]));
        buffer.push(Chunk::new(vec![3, 3, 3]));

        let artifact = buffer.into_artifact(Utc::now());
        assert_eq!(artifact.size(), 6);
        assert_eq!(artifact.bytes(), &[1, 1, 2, 3, 3, 3]);
    }
}
