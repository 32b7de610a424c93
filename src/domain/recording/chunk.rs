//! Recorded data fragments

/// One binary fragment emitted by a recorder while a session is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    data: Vec<u8>,
}

impl Chunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_bytes() {
        assert_eq!(Chunk::new(vec![1, 2, 3]).size(), 3);
        assert!(Chunk::new(Vec::new()).is_empty());
    }

    #[test]
    fn from_bytes_copies() {
        let chunk = Chunk::from_bytes(&[9, 8]);
        assert_eq!(chunk.data(), &[9, 8]);
        assert_eq!(chunk.size(), 2);
    }
}
