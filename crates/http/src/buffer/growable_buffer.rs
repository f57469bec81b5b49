//! An owned, resizable byte buffer with amortized doubling growth.
//!
//! [`GrowableBuffer`] stores both the raw bytes received from a socket and the
//! text fields (URI, header keys and values) parsed out of them. It keeps its
//! own notion of capacity instead of relying on `Vec`'s, so growth follows a
//! fixed, observable rule:
//!
//! - an unallocated buffer grows to exactly the requested capacity
//! - an allocated buffer grows to `max(size + n, 2 * capacity)`
//!
//! The storage always holds one extra terminator slot after `capacity`, and
//! every byte past `size` is zero. An empty buffer still yields a valid,
//! zero-length view.
//!
//! Allocation goes through `try_reserve_exact`, so an out-of-memory condition
//! surfaces as [`BufferError::AllocationFailed`] instead of aborting.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::str::Utf8Error;

use crate::protocol::BufferError;
use crate::utils::is_space;

const NUL_TERMINATED_EMPTY: &[u8] = b"\0";

/// Owned byte storage with explicit size and capacity.
///
/// Invariant: `size <= capacity`, and `bytes[size..]` is zero-filled.
#[derive(Clone, Default)]
pub struct GrowableBuffer {
    /// `capacity + 1` bytes once allocated, empty before.
    bytes: Vec<u8>,
    size: usize,
}

impl GrowableBuffer {
    /// Creates an empty buffer without allocating.
    pub const fn new() -> Self {
        Self { bytes: Vec::new(), size: 0 }
    }

    /// Creates an empty buffer with exactly `capacity` bytes of room.
    pub fn with_capacity(capacity: usize) -> Result<Self, BufferError> {
        let mut buf = Self::new();
        buf.reserve_exact(capacity)?;
        Ok(buf)
    }

    /// Creates a buffer holding a copy of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, BufferError> {
        let mut buf = Self::new();
        buf.append_bytes(data)?;
        Ok(buf)
    }

    /// Number of bytes in use.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Allocated length, excluding the terminator slot.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len().saturating_sub(1)
    }

    /// The used bytes. Never fails, even on a buffer that was never allocated.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size]
    }

    /// The used bytes followed by the zero terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        if self.bytes.is_empty() { NUL_TERMINATED_EMPTY } else { &self.bytes[..=self.size] }
    }

    /// The used bytes as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Copies the used bytes out into a `Vec`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Overwrites the contents with `text`.
    ///
    /// Does nothing when both the buffer and `text` are empty. Never shrinks
    /// the capacity; when the capacity is too small the storage is replaced by
    /// one of exactly `text.len()`.
    pub fn set(&mut self, text: &[u8]) -> Result<(), BufferError> {
        if text.is_empty() && self.size == 0 {
            return Ok(());
        }

        if self.capacity() < text.len() {
            let mut bytes = zeroed(text.len())?;
            bytes[..text.len()].copy_from_slice(text);
            self.bytes = bytes;
        } else {
            let old_size = self.size;
            self.bytes[..text.len()].copy_from_slice(text);
            if old_size > text.len() {
                self.bytes[text.len()..old_size].fill(0);
            }
        }

        self.size = text.len();
        Ok(())
    }

    /// Sets the size to zero and zeroes the used region, keeping the capacity.
    pub fn clear(&mut self) {
        self.bytes[..self.size].fill(0);
        self.size = 0;
    }

    /// Drops the storage, leaving size and capacity at zero.
    pub fn release(&mut self) {
        self.bytes = Vec::new();
        self.size = 0;
    }

    /// Ensures `capacity() >= n`.
    ///
    /// An unallocated buffer gets exactly `n`; otherwise the new capacity is
    /// `max(size + n, 2 * capacity)`, which is never smaller than `n`.
    pub fn reserve(&mut self, n: usize) -> Result<(), BufferError> {
        let capacity = self.capacity();
        if capacity >= n {
            return Ok(());
        }

        let new_capacity = if capacity == 0 {
            n
        } else {
            self.size.saturating_add(n).max(capacity.saturating_mul(2))
        };

        self.reallocate(new_capacity)
    }

    /// Ensures `capacity() >= n`, growing to exactly `n` when needed.
    pub fn reserve_exact(&mut self, n: usize) -> Result<(), BufferError> {
        if self.capacity() >= n {
            return Ok(());
        }
        self.reallocate(n)
    }

    /// Sets the size to `n`.
    ///
    /// Growing pads the new region with spaces. Shrinking zeroes the dropped
    /// tail but keeps the capacity.
    pub fn resize(&mut self, n: usize) -> Result<(), BufferError> {
        if n > self.size {
            self.reserve(n)?;
            self.bytes[self.size..n].fill(b' ');
            self.size = n;
        } else {
            self.truncate(n);
        }
        Ok(())
    }

    /// Appends `data`. An empty slice is a no-op.
    pub fn append_bytes(&mut self, data: &[u8]) -> Result<(), BufferError> {
        if data.is_empty() {
            return Ok(());
        }

        let needed = self.size.checked_add(data.len()).ok_or(BufferError::allocation_failed(usize::MAX))?;
        if needed > self.capacity() {
            self.reserve(needed)?;
        }

        self.bytes[self.size..needed].copy_from_slice(data);
        self.size = needed;
        Ok(())
    }

    pub fn append_str(&mut self, text: &str) -> Result<(), BufferError> {
        self.append_bytes(text.as_bytes())
    }

    /// Appends one byte. A zero byte is ignored, it would collide with the terminator.
    pub fn append_byte(&mut self, b: u8) -> Result<(), BufferError> {
        if b == 0 {
            return Ok(());
        }
        self.append_bytes(&[b])
    }

    pub fn append_buffer(&mut self, other: &GrowableBuffer) -> Result<(), BufferError> {
        self.append_bytes(other.as_bytes())
    }

    /// Removes leading and trailing whitespace in place.
    pub fn trim(&mut self) {
        self.ltrim();
        self.rtrim();
    }

    /// Removes leading whitespace, shifting the rest down. Capacity is kept.
    pub fn ltrim(&mut self) {
        let leading = self.as_bytes().iter().take_while(|b| is_space(**b)).count();
        if leading == 0 {
            return;
        }

        let new_size = self.size - leading;
        self.bytes.copy_within(leading..self.size, 0);
        self.bytes[new_size..self.size].fill(0);
        self.size = new_size;
    }

    /// Removes trailing whitespace. Capacity is kept.
    pub fn rtrim(&mut self) {
        let keep = self.as_bytes().iter().rposition(|b| !is_space(*b)).map_or(0, |i| i + 1);
        self.truncate(keep);
    }

    pub fn upcase(&mut self) {
        self.bytes[..self.size].make_ascii_uppercase();
    }

    pub fn downcase(&mut self) {
        self.bytes[..self.size].make_ascii_lowercase();
    }

    /// The zeroed region between `size` and `capacity`, for reading into.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        let capacity = self.capacity();
        &mut self.bytes[self.size..capacity]
    }

    /// Marks `amount` bytes of the [`unfilled_mut`](Self::unfilled_mut) region as used.
    ///
    /// # Panics
    ///
    /// Panics if `amount` exceeds the unfilled region.
    pub fn advance(&mut self, amount: usize) {
        let new_size = self.size + amount;
        assert!(new_size <= self.capacity(), "GrowableBuffer::advance past capacity");
        self.size = new_size;
        // readers may have scribbled past what they reported
        self.bytes[new_size..].fill(0);
    }

    fn truncate(&mut self, n: usize) {
        if n < self.size {
            self.bytes[n..self.size].fill(0);
            self.size = n;
        }
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<(), BufferError> {
        let target = new_capacity.checked_add(1).ok_or(BufferError::allocation_failed(new_capacity))?;
        let additional = target.saturating_sub(self.bytes.len());
        self.bytes
            .try_reserve_exact(additional)
            .map_err(|_e| BufferError::allocation_failed(new_capacity))?;
        self.bytes.resize(target, 0);
        Ok(())
    }
}

fn zeroed(capacity: usize) -> Result<Vec<u8>, BufferError> {
    let target = capacity.checked_add(1).ok_or(BufferError::allocation_failed(capacity))?;
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(target).map_err(|_e| BufferError::allocation_failed(capacity))?;
    bytes.resize(target, 0);
    Ok(bytes)
}

impl Deref for GrowableBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TryFrom<&[u8]> for GrowableBuffer {
    type Error = BufferError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

impl TryFrom<&str> for GrowableBuffer {
    type Error = BufferError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(text.as_bytes())
    }
}

/// Equal iff same size and identical bytes; capacity is ignored.
impl PartialEq for GrowableBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for GrowableBuffer {}

impl PartialEq<[u8]> for GrowableBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for GrowableBuffer {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl PartialEq<str> for GrowableBuffer {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for GrowableBuffer {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("text", &self.to_string_lossy())
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl fmt::Display for GrowableBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
