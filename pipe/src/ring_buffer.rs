//! Fixed-capacity blocking byte ring.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A thread-safe fixed-capacity byte ring with blocking put/get.
///
/// `RingBuffer` moves bytes between threads through a circular storage area
/// addressed by two monotonically increasing cursors. The physical offset of
/// a cursor is `cursor % capacity`; the occupied size is always
/// `write_pos - read_pos` and stays within `[0, capacity]`.
///
/// # Semantics
///
/// - **Put**: Blocks until the whole slice fits, then copies it in one step
/// - **Get**: Blocks while empty, then returns whatever is available (up to
///   the destination length)
/// - **Close**: Writes fail afterwards; reads drain what is left and then
///   return `Ok(0)` (end-of-stream)
///
/// Every state change wakes all blocked threads, and each of them re-checks
/// its own condition. Any number of readers and writers may share one ring;
/// a single `put` is the unit of atomicity.
///
/// Cloning a `RingBuffer` yields another handle to the same storage.
///
/// # Example
///
/// ```
/// use giztoy_pipe::RingBuffer;
/// use std::thread;
///
/// let ring = RingBuffer::new(16).unwrap();
/// let writer = ring.clone();
///
/// let producer = thread::spawn(move || {
///     for chunk in b"hello, ring buffer".chunks(4) {
///         writer.put(chunk).unwrap();
///     }
///     writer.close();
/// });
///
/// let mut received = Vec::new();
/// let mut buf = [0u8; 5];
/// loop {
///     let n = ring.get(&mut buf).unwrap();
///     if n == 0 {
///         break;
///     }
///     received.extend_from_slice(&buf[..n]);
/// }
///
/// producer.join().unwrap();
/// assert_eq!(received, b"hello, ring buffer");
/// ```
pub struct RingBuffer {
    inner: Arc<RingBufferInner>,
}

struct RingBufferInner {
    name: String,
    capacity: usize,
    state: Mutex<RingBufferState>,
    changed: Condvar,
}

struct RingBufferState {
    storage: Box<[u8]>,
    write_pos: u64,
    read_pos: u64,
    closed: bool,
    close_err: Option<Arc<dyn StdError + Send + Sync>>,
}

impl RingBufferState {
    fn len(&self) -> usize {
        (self.write_pos - self.read_pos) as usize
    }

    fn free(&self) -> usize {
        self.storage.len() - self.len()
    }

    fn offset(&self, cursor: u64) -> usize {
        (cursor % self.storage.len() as u64) as usize
    }

    fn check_error(&self) -> Result<()> {
        match self.close_err {
            Some(ref err) => Err(Error::ClosedWithError(Arc::clone(err))),
            None => Ok(()),
        }
    }

    /// Copies `data` in at the write cursor. Caller guarantees it fits.
    fn copy_in(&mut self, data: &[u8]) {
        let capacity = self.storage.len();
        let start = self.offset(self.write_pos);
        let first = data.len().min(capacity - start);

        // [start, capacity) then [0, rest)
        self.storage[start..start + first].copy_from_slice(&data[..first]);
        let rest = data.len() - first;
        self.storage[..rest].copy_from_slice(&data[first..]);

        self.write_pos += data.len() as u64;
    }

    /// Copies up to `dest.len()` occupied bytes out at the read cursor.
    fn copy_out(&mut self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.len());
        let capacity = self.storage.len();
        let start = self.offset(self.read_pos);
        let first = n.min(capacity - start);

        dest[..first].copy_from_slice(&self.storage[start..start + first]);
        let rest = n - first;
        dest[first..n].copy_from_slice(&self.storage[..rest]);

        self.read_pos += n as u64;
        n
    }
}

impl Clone for RingBuffer {
    fn clone(&self) -> Self {
        RingBuffer {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RingBuffer")
            .field("name", &self.inner.name)
            .field("capacity", &self.inner.capacity)
            .field("len", &state.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl RingBuffer {
    /// Creates a new RingBuffer with the specified capacity in bytes.
    ///
    /// Returns `InvalidArgument` when `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_name("ring", capacity)
    }

    /// Creates a new named RingBuffer. The name only shows up in logs and
    /// `Debug` output.
    pub fn with_name(name: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid("capacity must be greater than 0"));
        }
        let name = name.into();
        debug!("ring buffer {} created, capacity={}", name, capacity);

        Ok(RingBuffer {
            inner: Arc::new(RingBufferInner {
                name,
                capacity,
                state: Mutex::new(RingBufferState {
                    storage: vec![0u8; capacity].into_boxed_slice(),
                    write_pos: 0,
                    read_pos: 0,
                    closed: false,
                    close_err: None,
                }),
                changed: Condvar::new(),
            }),
        })
    }

    /// Returns the name given at construction.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the buffer capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Returns the number of bytes written but not yet read.
    pub fn len(&self) -> usize {
        self.inner.state.lock().len()
    }

    /// Returns the number of bytes that can be put without blocking.
    pub fn available(&self) -> usize {
        self.inner.state.lock().free()
    }

    /// Returns true if no bytes are occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if no free space is left.
    pub fn is_full(&self) -> bool {
        self.available() == 0
    }

    /// Returns true once the buffer has been closed, gracefully or not.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Returns the error the buffer was aborted with, if any.
    pub fn error(&self) -> Option<Arc<dyn StdError + Send + Sync>> {
        self.inner.state.lock().close_err.clone()
    }

    /// Puts all of `data` into the buffer.
    ///
    /// `data.len()` must not exceed the capacity; callers with larger payloads
    /// split them (the endpoint layer does this). Blocks until enough free
    /// space exists. Fails with `Closed` if the buffer is closed before or
    /// while waiting, in which case nothing is written.
    pub fn put(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.inner.capacity {
            return Err(Error::invalid(format!(
                "put of {} bytes exceeds capacity {}",
                data.len(),
                self.inner.capacity
            )));
        }

        let mut state = self.inner.state.lock();
        loop {
            state.check_error()?;
            if state.closed {
                return Err(Error::Closed);
            }
            if state.free() >= data.len() {
                break;
            }
            trace!(
                "ring buffer {} put waiting: need={} free={}",
                self.inner.name,
                data.len(),
                state.free()
            );
            self.inner.changed.wait(&mut state);
        }

        if !data.is_empty() {
            state.copy_in(data);
            self.inner.changed.notify_all();
        }
        Ok(())
    }

    /// Gets up to `dest.len()` bytes from the buffer.
    ///
    /// Blocks while the buffer is empty and open. Returns the number of bytes
    /// copied, which may be fewer than requested. Returns `Ok(0)` only when
    /// the buffer is closed and fully drained.
    pub fn get(&self, dest: &mut [u8]) -> Result<usize> {
        if dest.is_empty() {
            return Err(Error::invalid("read length must be greater than 0"));
        }

        let mut state = self.inner.state.lock();
        loop {
            state.check_error()?;
            if state.len() > 0 {
                break;
            }
            if state.closed {
                return Ok(0);
            }
            trace!("ring buffer {} get waiting: empty", self.inner.name);
            self.inner.changed.wait(&mut state);
        }

        let n = state.copy_out(dest);
        self.inner.changed.notify_all();
        Ok(n)
    }

    /// Closes the buffer for writing.
    ///
    /// Pending and future puts fail with `Closed`. Readers drain the remaining
    /// bytes and then see end-of-stream. Closing twice is a no-op.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!(
            "ring buffer {} closed, {} bytes left to drain",
            self.inner.name,
            state.len()
        );
        self.inner.changed.notify_all();
    }

    /// Aborts the buffer with the specified error.
    ///
    /// Unlike [`close`](Self::close), readers do not drain: every blocked and
    /// future put or get fails with `ClosedWithError`. The first recorded error
    /// wins; aborting an already gracefully closed buffer still records it.
    pub fn close_with_error<E>(&self, err: E)
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.close_err.is_some() {
            return;
        }
        debug!("ring buffer {} aborted: {}", self.inner.name, err);
        state.close_err = Some(Arc::new(err));
        state.closed = true;
        self.inner.changed.notify_all();
    }
}
