//! Request header storage.
//!
//! A parsed request keeps its headers in a [`HeaderTable`]: an ordered array of
//! [`Header`] key/value pairs that preserves insertion order and duplicates.
//! The table grows by doubling from an initial capacity of 4 and supports
//! [`pop`](HeaderTable::pop), which the parser uses to roll back an entry it
//! appended for a line that turned out to be malformed.

use std::mem;
use std::slice;

use crate::buffer::GrowableBuffer;
use crate::protocol::BufferError;

/// Capacity allocated on the first push.
pub const INITIAL_HEADER_CAPACITY: usize = 4;

/// One header line, split on its first `:`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    key: GrowableBuffer,
    value: GrowableBuffer,
}

impl Header {
    /// An entry with empty key and value.
    pub const fn new() -> Self {
        Self { key: GrowableBuffer::new(), value: GrowableBuffer::new() }
    }

    /// Builds a header from raw key and value bytes, trimming both.
    pub fn from_parts(key: &[u8], value: &[u8]) -> Result<Self, BufferError> {
        let mut header = Self::new();
        header.set_key(key)?;
        header.set_value(value)?;
        Ok(header)
    }

    pub fn key(&self) -> &GrowableBuffer {
        &self.key
    }

    pub fn value(&self) -> &GrowableBuffer {
        &self.value
    }

    /// Stores `key` with surrounding whitespace removed.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), BufferError> {
        self.key.set(key)?;
        self.key.trim();
        Ok(())
    }

    /// Stores `value` with surrounding whitespace removed.
    pub fn set_value(&mut self, value: &[u8]) -> Result<(), BufferError> {
        self.value.set(value)?;
        self.value.trim();
        Ok(())
    }

    /// Case-insensitive comparison of the key against `name`.
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name.as_bytes())
    }

    /// Releases both strings, returning the entry to its `new()` state.
    pub fn release(&mut self) {
        self.key.release();
        self.value.release();
    }
}

/// Ordered, growable array of headers.
#[derive(Debug, Clone, Default)]
pub struct HeaderTable {
    entries: Vec<Header>,
    capacity: usize,
}

impl HeaderTable {
    pub const fn new() -> Self {
        Self { entries: Vec::new(), capacity: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries the table holds before it has to grow again.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `header`, doubling the capacity when full.
    pub fn push(&mut self, header: Header) -> Result<(), BufferError> {
        self.grow_if_full()?;
        self.entries.push(header);
        Ok(())
    }

    /// Appends an empty entry and hands it back for filling in.
    pub fn push_empty(&mut self) -> Result<&mut Header, BufferError> {
        self.push(Header::new())?;
        let last = self.entries.len() - 1;
        Ok(&mut self.entries[last])
    }

    /// Removes the last entry and releases its strings. Empty table: `None`.
    pub fn pop(&mut self) -> Option<Header> {
        self.entries.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Header> {
        self.entries.get(index)
    }

    /// The value of the first header whose key matches `name`, ignoring case.
    pub fn get_value(&self, name: &str) -> Option<&GrowableBuffer> {
        self.entries.iter().find(|h| h.is(name)).map(Header::value)
    }

    pub fn iter(&self) -> slice::Iter<'_, Header> {
        self.entries.iter()
    }

    /// Frees every entry and the table storage itself.
    pub fn release(&mut self) {
        drop(mem::take(&mut self.entries));
        self.capacity = 0;
    }

    fn grow_if_full(&mut self) -> Result<(), BufferError> {
        if self.entries.len() < self.capacity {
            return Ok(());
        }

        let new_capacity = if self.capacity == 0 { INITIAL_HEADER_CAPACITY } else { self.capacity.saturating_mul(2) };

        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())
            .map_err(|_e| BufferError::allocation_failed(new_capacity.saturating_mul(mem::size_of::<Header>())))?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a Header;
    type IntoIter = slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for HeaderTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for HeaderTable {}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(key: &str, value: &str) -> Header {
        Header::from_parts(key.as_bytes(), value.as_bytes()).unwrap()
    }

    #[test]
    fn new_header_is_empty() {
        let h = Header::new();
        assert!(h.key().is_empty());
        assert!(h.value().is_empty());
    }

    #[test]
    fn from_parts_trims() {
        let h = header("  User-Agent", "    curl/7.24.0  ");
        assert_eq!(h.key(), "User-Agent");
        assert_eq!(h.value(), "curl/7.24.0");
    }

    #[test]
    fn table_capacity_doubles_from_four() {
        let mut table = HeaderTable::new();
        assert_eq!(table.capacity(), 0);

        table.push(header("a", "1")).unwrap();
        assert_eq!(table.capacity(), 4);

        for i in 1..4 {
            table.push(header("k", &i.to_string())).unwrap();
        }
        assert_eq!(table.capacity(), 4);

        table.push(header("e", "5")).unwrap();
        assert_eq!(table.capacity(), 8);

        for _ in 5..9 {
            table.push(header("x", "y")).unwrap();
        }
        assert_eq!(table.len(), 9);
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn table_preserves_insertion_order_and_duplicates() {
        let mut table = HeaderTable::new();
        table.push(header("Accept", "text/html")).unwrap();
        table.push(header("Host", "localhost")).unwrap();
        table.push(header("Accept", "*/*")).unwrap();

        let keys: Vec<_> = table.iter().map(|h| h.key().to_string()).collect();
        assert_eq!(keys, ["Accept", "Host", "Accept"]);
        assert_eq!(table.get_value("accept").unwrap(), "text/html");
        assert!(table.get_value("Cookie").is_none());
    }

    #[test]
    fn pop_removes_last_entry() {
        let mut table = HeaderTable::new();
        table.push(header("Host", "localhost")).unwrap();
        table.push_empty().unwrap().set_key(b"Broken").unwrap();

        let popped = table.pop().unwrap();
        assert_eq!(popped.key(), "Broken");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().key(), "Host");
    }

    #[test]
    fn pop_on_empty_table_is_noop() {
        let mut table = HeaderTable::new();
        assert!(table.pop().is_none());
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
    }

    #[test]
    fn release_returns_to_new_state() {
        let mut table = HeaderTable::new();
        for _ in 0..6 {
            table.push(header("k", "v")).unwrap();
        }
        table.release();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), 0);
        assert_eq!(table, HeaderTable::new());
    }
}
