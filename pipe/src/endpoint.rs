//! Stream endpoints over ring buffers.

use std::error::Error as StdError;
use std::io;

use tracing::debug;

use crate::error::{Error, Result};
use crate::ring_buffer::RingBuffer;

/// What an [`Endpoint`] is allowed to do. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Capability {
    pub fn can_read(self) -> bool {
        matches!(self, Capability::ReadOnly | Capability::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Capability::WriteOnly | Capability::ReadWrite)
    }
}

/// A sequential byte-stream handle over one or two [`RingBuffer`]s.
///
/// Reads come from the read buffer, writes go to the write buffer; the two
/// may be the same ring (loopback). All methods take `&self`, so an endpoint
/// can be shared between threads through `Arc` or scoped threads and called
/// concurrently.
///
/// Dropping an endpoint closes its write buffer, so the reader on the other
/// side always sees end-of-stream eventually. Endpoints are deliberately not
/// `Clone` for that reason.
///
/// `Endpoint` and `&Endpoint` implement [`io::Read`] and [`io::Write`].
/// Seeking is not supported.
#[derive(Debug)]
pub struct Endpoint {
    reader: Option<RingBuffer>,
    writer: Option<RingBuffer>,
}

impl Endpoint {
    /// Creates an endpoint that only reads from `ring`.
    pub fn read_only(ring: RingBuffer) -> Self {
        Endpoint {
            reader: Some(ring),
            writer: None,
        }
    }

    /// Creates an endpoint that only writes to `ring`.
    pub fn write_only(ring: RingBuffer) -> Self {
        Endpoint {
            reader: None,
            writer: Some(ring),
        }
    }

    /// Creates an endpoint that reads from `read` and writes to `write`.
    ///
    /// Passing clones of the same ring gives a loopback endpoint; see
    /// [`loopback`](crate::loopback) for the threading caveat.
    pub fn read_write(read: RingBuffer, write: RingBuffer) -> Self {
        Endpoint {
            reader: Some(read),
            writer: Some(write),
        }
    }

    pub fn capability(&self) -> Capability {
        match (self.reader.is_some(), self.writer.is_some()) {
            (true, true) => Capability::ReadWrite,
            (true, false) => Capability::ReadOnly,
            _ => Capability::WriteOnly,
        }
    }

    pub fn can_read(&self) -> bool {
        self.reader.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.writer.is_some()
    }

    pub fn read_buffer(&self) -> Option<&RingBuffer> {
        self.reader.as_ref()
    }

    pub fn write_buffer(&self) -> Option<&RingBuffer> {
        self.writer.as_ref()
    }

    fn reader(&self) -> Result<&RingBuffer> {
        self.reader
            .as_ref()
            .ok_or(Error::Unsupported("read on write-only endpoint"))
    }

    fn writer(&self) -> Result<&RingBuffer> {
        self.writer
            .as_ref()
            .ok_or(Error::Unsupported("write on read-only endpoint"))
    }

    /// Reads up to `dest.len()` bytes.
    ///
    /// Blocks until at least one byte is available. Returns `Ok(0)` only at
    /// end-of-stream. An empty `dest` is an `InvalidArgument`.
    pub fn read(&self, dest: &mut [u8]) -> Result<usize> {
        self.reader()?.get(dest)
    }

    /// Writes all of `src`, blocking until every byte has been accepted.
    ///
    /// Payloads larger than the write buffer go in capacity-sized chunks, so
    /// concurrent writers may interleave between chunks. If the buffer is
    /// closed part-way, the chunks already put stay put and `Closed` is
    /// returned.
    pub fn write(&self, src: &[u8]) -> Result<()> {
        let ring = self.writer()?;
        if src.is_empty() {
            return ring.put(src);
        }
        for chunk in src.chunks(ring.capacity()) {
            ring.put(chunk)?;
        }
        Ok(())
    }

    /// Reads into `buf[offset..offset + count]`.
    ///
    /// The range is validated before anything blocks.
    pub fn read_at(&self, buf: &mut [u8], offset: usize, count: usize) -> Result<usize> {
        let end = check_range(buf.len(), offset, count)?;
        self.read(&mut buf[offset..end])
    }

    /// Writes `buf[offset..offset + count]`.
    ///
    /// The range is validated before anything blocks.
    pub fn write_at(&self, buf: &[u8], offset: usize, count: usize) -> Result<()> {
        let end = check_range(buf.len(), offset, count)?;
        self.write(&buf[offset..end])
    }

    /// Closes the write side, signalling end-of-stream to the peer reader.
    ///
    /// A no-op on read-only endpoints; the buffer they read from is closed by
    /// its writer.
    pub fn close(&self) {
        if let Some(ring) = &self.writer {
            if !ring.is_closed() {
                debug!("endpoint closing write side {}", ring.name());
            }
            ring.close();
        }
    }

    /// Aborts the write side with `err`. Readers on the other side fail with
    /// `ClosedWithError` instead of draining.
    pub fn abort<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        if let Some(ring) = &self.writer {
            ring.close_with_error(err);
        }
    }
}

fn check_range(len: usize, offset: usize, count: usize) -> Result<usize> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(end),
        _ => Err(Error::invalid(format!(
            "range {}+{} out of bounds for buffer of {} bytes",
            offset, count, len
        ))),
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.close();
    }
}

impl io::Read for &Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(Endpoint::read(*self, buf)?)
    }
}

impl io::Write for &Endpoint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Endpoint::write(*self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for Endpoint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
