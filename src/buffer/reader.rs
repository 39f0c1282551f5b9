//! Bounded forward-only cursor over a borrowed byte slice.

use bytes::Buf;

/// Returned when a read asks for more bytes than remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("need {needed} bytes at offset {offset} but only {remaining} remaining")]
pub struct Underflow {
    pub needed: usize,
    pub remaining: usize,
    pub offset: usize,
}

/// Reads from caller-owned bytes without copying or allocating.
///
/// The cursor also implements [`Buf`]. Its `get_*` readers panic when short,
/// so callers check [`ReadCursor::ensure`] first.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Checks that at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<(), Underflow> {
        if self.remaining() < n {
            return Err(Underflow {
                needed: n,
                remaining: self.remaining(),
                offset: self.offset,
            });
        }
        Ok(())
    }

    /// Returns the next `n` bytes and advances past them.
    ///
    /// Fails without advancing if fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Underflow> {
        self.ensure(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.buf[start..self.offset])
    }

    /// Reads exactly `N` bytes into an array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], Underflow> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

impl Buf for ReadCursor<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn chunk(&self) -> &[u8] {
        &self.buf[self.offset..]
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.buf.len() - self.offset,
            "cannot advance {cnt} bytes past the end of the cursor"
        );
        self.offset += cnt;
    }
}
