//! Append-only write buffer built from fixed-size blocks.

use bytes::buf::UninitSlice;
use bytes::{BufMut, Bytes, BytesMut};

/// Default block size in bytes.
pub const BLOCK_SIZE: usize = 128;

/// Collects encoded bytes in fixed-capacity blocks.
///
/// Appending never moves bytes that were already written; a full block is
/// left in place and a fresh one is started. The blocks are flattened once,
/// by [`WriteBuffer::finalize`].
///
/// Implements [`BufMut`], so fixed-width writes (`put_u16_ne`, `put_i64_ne`,
/// ...) split across block boundaries like any other append.
#[derive(Debug)]
pub struct WriteBuffer {
    blocks: Vec<BytesMut>,
    block_size: usize,
    len: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::with_block_size(BLOCK_SIZE)
    }

    /// Creates a buffer whose blocks hold `block_size` bytes each (at least 1).
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            blocks: Vec::new(),
            block_size: block_size.max(1),
            len: 0,
        }
    }

    /// Total number of bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks currently allocated.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Copies `data` into the buffer, splitting it across block boundaries.
    pub fn append(&mut self, data: &[u8]) {
        self.put_slice(data);
    }

    /// Flattens all blocks into one contiguous buffer of exactly `len` bytes.
    pub fn finalize(mut self) -> Bytes {
        if self.blocks.len() == 1 {
            if let Some(block) = self.blocks.pop() {
                return block.freeze();
            }
        }

        let mut out = BytesMut::with_capacity(self.len);
        for block in &self.blocks {
            out.extend_from_slice(block);
        }
        out.freeze()
    }

    /// Drops every block without producing output.
    pub fn release(self) {
        tracing::trace!(blocks = self.blocks.len(), len = self.len, "released write buffer");
    }

    // Returns the block to write into, starting a new one if the last is full.
    fn current_block(&mut self) -> &mut BytesMut {
        let full = self
            .blocks
            .last()
            .is_none_or(|block| block.len() >= self.block_size);
        if full {
            tracing::trace!(block = self.blocks.len(), "allocating write block");
            self.blocks.push(BytesMut::with_capacity(self.block_size));
        }
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }
}

// SAFETY: `chunk_mut` only exposes the unwritten tail of the current block,
// capped at the block size, and `advance_mut` commits exactly that many bytes.
unsafe impl BufMut for WriteBuffer {
    fn remaining_mut(&self) -> usize {
        usize::MAX - self.len
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        if let Some(block) = self.blocks.last_mut() {
            // SAFETY: the caller initialized `cnt` bytes of the last `chunk_mut`.
            unsafe { block.advance_mut(cnt) };
            self.len += cnt;
        }
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        let block_size = self.block_size;
        let block = self.current_block();
        let room = block_size - block.len();
        &mut block.chunk_mut()[..room]
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
