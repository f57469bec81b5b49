//! Reads one request's worth of bytes off a connected socket.
//!
//! [`SocketReceiver`] issues single reads into the unused tail of a
//! [`GrowableBuffer`]. A read that fills the offered space doubles the buffer
//! and reads again; a short read marks the message as complete. A peer that
//! closes before sending anything yields an empty buffer, which callers must
//! treat as "no request".
//!
//! The short-read rule assumes the peer's send lands in a single read. Requests
//! split across several TCP segments, or pipelined requests, are not detected.
//! A message that exactly fills the buffer is followed by one more read, which
//! only returns once the peer sends more or shuts down its write side.

use std::io;
use std::io::Read;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::buffer::GrowableBuffer;
use crate::protocol::TransportError;

/// Capacity of the first read buffer.
pub const DEFAULT_RECV_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct SocketReceiver<R> {
    io: R,
    initial_capacity: usize,
}

impl<R> SocketReceiver<R> {
    pub fn new(io: R) -> Self {
        Self::with_capacity(DEFAULT_RECV_CAPACITY, io)
    }

    /// A zero capacity is bumped to one so the first read can make progress.
    pub fn with_capacity(initial_capacity: usize, io: R) -> Self {
        Self { io, initial_capacity: initial_capacity.max(1) }
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn get_ref(&self) -> &R {
        &self.io
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.io
    }

    pub fn into_inner(self) -> R {
        self.io
    }

    /// Records a completed read. Returns `true` once the message is complete.
    fn filled(buffer: &mut GrowableBuffer, offered: usize, read: usize) -> Result<bool, TransportError> {
        buffer.advance(read);
        if read < offered {
            trace!(size = buffer.size(), capacity = buffer.capacity(), "short read, message complete");
            return Ok(true);
        }

        let doubled = buffer.capacity().saturating_mul(2);
        trace!(size = buffer.size(), new_capacity = doubled, "read filled the buffer, growing");
        buffer.reserve_exact(doubled)?;
        Ok(false)
    }
}

impl<R: AsyncRead + Unpin> SocketReceiver<R> {
    /// Reads until a short read and returns everything received.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] if a read fails, [`TransportError::Buffer`] if
    /// the buffer cannot grow.
    pub async fn receive(&mut self) -> Result<GrowableBuffer, TransportError> {
        let mut buffer = GrowableBuffer::with_capacity(self.initial_capacity)?;
        loop {
            let unfilled = buffer.unfilled_mut();
            let offered = unfilled.len();
            let read = self.io.read(unfilled).await?;
            if Self::filled(&mut buffer, offered, read)? {
                return Ok(buffer);
            }
        }
    }
}

impl<R: Read> SocketReceiver<R> {
    /// Blocking counterpart of [`receive`](Self::receive) over [`std::io::Read`].
    ///
    /// Reads interrupted by a signal are retried.
    pub fn receive_blocking(&mut self) -> Result<GrowableBuffer, TransportError> {
        let mut buffer = GrowableBuffer::with_capacity(self.initial_capacity)?;
        loop {
            let unfilled = buffer.unfilled_mut();
            let offered = unfilled.len();
            let read = match self.io.read(unfilled) {
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if Self::filled(&mut buffer, offered, read)? {
                return Ok(buffer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Hands out scripted read results, one per call.
    struct Scripted {
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Scripted {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self { reads: reads.into() }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(chunk)) => {
                    assert!(chunk.len() <= buf.len(), "scripted chunk larger than offered space");
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from_raw_os_error(104)))
        }
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[tokio::test]
    async fn short_read_completes_message() {
        let data = b"GET / HTTP/1.0\r\n\r\n";
        let mut receiver = SocketReceiver::new(&data[..]);

        let buffer = receiver.receive().await.unwrap();
        assert_eq!(buffer, &data[..]);
        assert_eq!(buffer.capacity(), DEFAULT_RECV_CAPACITY);
    }

    #[tokio::test]
    async fn full_reads_double_the_buffer() {
        let data = payload(2047);
        let mut receiver = SocketReceiver::with_capacity(16, &data[..]);

        let buffer = receiver.receive().await.unwrap();
        assert_eq!(buffer.as_bytes(), &data[..]);
        assert_eq!(buffer.capacity(), 2048);
    }

    #[tokio::test]
    async fn exact_fit_needs_one_more_read() {
        let data = payload(64);
        let mut receiver = SocketReceiver::with_capacity(64, &data[..]);

        let buffer = receiver.receive().await.unwrap();
        assert_eq!(buffer.size(), 64);
        assert_eq!(buffer.capacity(), 128);
    }

    #[tokio::test]
    async fn closed_peer_yields_empty_buffer() {
        let mut receiver = SocketReceiver::new(&b""[..]);
        let buffer = receiver.receive().await.unwrap();
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn read_error_carries_os_code() {
        let mut receiver = SocketReceiver::new(Failing);
        let err = receiver.receive().await.unwrap_err();
        assert_eq!(err.os_code(), Some(104));
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let receiver = SocketReceiver::with_capacity(0, &b""[..]);
        assert_eq!(receiver.initial_capacity(), 1);
    }

    #[test]
    fn blocking_receive_grows_across_reads() {
        let mut receiver =
            SocketReceiver::with_capacity(4, Scripted::new(vec![Ok(b"abcd".to_vec()), Ok(b"efgh".to_vec()), Ok(b"ij".to_vec())]));

        let buffer = receiver.receive_blocking().unwrap();
        assert_eq!(buffer, "abcdefghij");
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn blocking_receive_retries_interrupted() {
        let mut receiver = SocketReceiver::with_capacity(
            8,
            Scripted::new(vec![Err(io::ErrorKind::Interrupted.into()), Ok(b"hello".to_vec())]),
        );

        assert_eq!(receiver.receive_blocking().unwrap(), "hello");
    }

    #[test]
    fn blocking_receive_reports_io_error() {
        let mut receiver = SocketReceiver::with_capacity(
            4,
            Scripted::new(vec![Ok(b"abcd".to_vec()), Err(io::Error::from_raw_os_error(32))]),
        );

        let err = receiver.receive_blocking().unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));
        assert_eq!(err.os_code(), Some(32));
    }
}
