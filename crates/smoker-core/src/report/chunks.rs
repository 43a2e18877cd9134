use heapless::Vec;

use super::pieces::{Piece, Pieces};

/// Size of the transmit buffer a page is streamed through.
pub const CHUNK_SIZE: usize = 1024;

pub type Chunk = Vec<u8, CHUNK_SIZE>;

/// Packs the pieces of a page into full transmit buffers
///
/// Every chunk except the last is exactly [`CHUNK_SIZE`] bytes long. A piece
/// larger than the space left is split across chunk boundaries.
pub struct Chunks<'a> {
    pieces: Pieces<'a>,
    pending: Option<Piece<'a>>,
    offset: usize,
}

impl<'a> Chunks<'a> {
    pub fn new(pieces: Pieces<'a>) -> Self {
        Self {
            pieces,
            pending: None,
            offset: 0,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let mut chunk = Chunk::new();
        while chunk.len() < CHUNK_SIZE {
            if self.pending.is_none() {
                self.pending = self.pieces.next();
                self.offset = 0;
            }
            let Some(piece) = self.pending.as_ref() else {
                break;
            };
            let rest = &piece.as_bytes()[self.offset..];
            let take = rest.len().min(CHUNK_SIZE - chunk.len());
            // `take` never exceeds the remaining capacity
            let _ = chunk.extend_from_slice(&rest[..take]);
            self.offset += take;
            if self.offset == piece.as_bytes().len() {
                self.pending = None;
            }
        }
        (!chunk.is_empty()).then_some(chunk)
    }
}
