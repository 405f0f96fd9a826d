/// Incremental newline splitter for NDJSON arriving in arbitrary chunks.
///
/// The carry buffer holds bytes, not text: a chunk may end in the middle of a
/// multi-byte UTF-8 sequence, and `\n` can never appear inside one, so lines
/// are cut on raw bytes and decoded only once complete.
///
/// Invariant: between calls `carry` never contains `\n`.
#[derive(Debug, Default)]
pub struct LineAssembler {
    carry: Vec<u8>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completed, without the
    /// trailing newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut search_from = self.carry.len();
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut consumed = 0usize;
        while let Some(pos) = self.carry[search_from..].iter().position(|b| *b == b'\n') {
            let end = search_from + pos;
            lines.push(self.carry[consumed..end].to_vec());
            consumed = end + 1;
            search_from = consumed;
        }

        if consumed > 0 {
            self.carry.drain(..consumed);
        }
        lines
    }

    /// Bytes of the current incomplete line.
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    /// Ends the stream. A final line without a newline is never emitted; the
    /// number of discarded bytes is returned.
    pub fn finish(self) -> usize {
        self.carry.len()
    }
}
