//! Splitting large writes into frame-sized pieces

use std::slice::Chunks;

/// Iterator over `(offset, piece)` pairs covering a payload
///
/// Each piece is at most `chunk_size` bytes and offsets increase from the
/// base offset. Re-sending a piece at its offset is an idempotent overwrite,
/// so a caller may retry a single piece after a transient failure.
#[derive(Debug, Clone)]
pub struct WriteChunks<'a> {
    inner: Chunks<'a, u8>,
    offset: u32,
}

impl<'a> WriteChunks<'a> {
    /// Split `data`, to be written starting at `offset`, into pieces of `chunk_size`
    ///
    /// A `chunk_size` of zero is treated as one.
    pub fn new(data: &'a [u8], offset: u32, chunk_size: usize) -> Self {
        Self {
            inner: data.chunks(chunk_size.max(1)),
            offset,
        }
    }
}

impl<'a> Iterator for WriteChunks<'a> {
    type Item = (u32, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let piece = self.inner.next()?;
        let offset = self.offset;
        self.offset = self.offset.saturating_add(piece.len() as u32);
        Some((offset, piece))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for WriteChunks<'_> {}
