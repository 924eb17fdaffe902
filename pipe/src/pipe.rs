//! Channel topologies built from ring buffers and endpoints.

use tracing::debug;

use crate::config::PipeConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::ring_buffer::RingBuffer;

impl PipeConfig {
    /// Builds a single-buffer duplex endpoint: everything written to it can
    /// be read back from it.
    ///
    /// The writer and the reader must run on different threads. A thread that
    /// writes more than fits, or reads from an empty ring, blocks with nobody
    /// left to wake it. Single-threaded callers should poll
    /// [`RingBuffer::len`] and [`RingBuffer::available`] through
    /// [`Endpoint::read_buffer`] before each call.
    pub fn loopback(&self) -> Result<Endpoint> {
        self.validate()?;
        let ring = RingBuffer::with_name(self.name.clone(), self.capacity)?;
        debug!("loopback {} ready", self.name);
        Ok(Endpoint::read_write(ring.clone(), ring))
    }

    /// Builds a unidirectional pipe, returning `(writer, reader)`.
    ///
    /// The writer is write-only and the reader is read-only. Closing or
    /// dropping the writer lets the reader drain and then see end-of-stream.
    pub fn pipe(&self) -> Result<(Endpoint, Endpoint)> {
        self.validate()?;
        let ring = RingBuffer::with_name(self.name.clone(), self.capacity)?;
        debug!("pipe {} ready", self.name);
        Ok((Endpoint::write_only(ring.clone()), Endpoint::read_only(ring)))
    }

    /// Builds a bidirectional pair `(a, b)` over two cross-wired rings.
    ///
    /// Bytes written on `a` are read on `b` and vice versa; neither side ever
    /// reads its own writes. Each side half-closes independently.
    pub fn pair(&self) -> Result<(Endpoint, Endpoint)> {
        self.validate()?;
        let a_to_b = RingBuffer::with_name(format!("{}/a->b", self.name), self.capacity)?;
        let b_to_a = RingBuffer::with_name(format!("{}/b->a", self.name), self.capacity)?;
        debug!("pair {} ready", self.name);
        Ok((
            Endpoint::read_write(b_to_a.clone(), a_to_b.clone()),
            Endpoint::read_write(a_to_b, b_to_a),
        ))
    }
}

/// Creates a single-buffer duplex endpoint with the given capacity.
///
/// See [`PipeConfig::loopback`].
pub fn loopback(capacity: usize) -> Result<Endpoint> {
    PipeConfig::new(capacity).with_name("loopback").loopback()
}

/// Creates a unidirectional `(writer, reader)` pipe with the given capacity.
///
/// See [`PipeConfig::pipe`].
pub fn pipe(capacity: usize) -> Result<(Endpoint, Endpoint)> {
    PipeConfig::new(capacity).pipe()
}

/// Creates a bidirectional endpoint pair with the given capacity per
/// direction.
///
/// See [`PipeConfig::pair`].
pub fn pair(capacity: usize) -> Result<(Endpoint, Endpoint)> {
    PipeConfig::new(capacity).with_name("pair").pair()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Capability;
    use crate::error::Error;
    use std::thread;

    #[test]
    fn test_loopback_shares_one_ring() {
        let ep = loopback(16).unwrap();
        assert_eq!(ep.capability(), Capability::ReadWrite);

        ep.write(b"echo").unwrap();
        let mut buf = [0u8; 16];
        let n = ep.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"echo");
    }

    #[test]
    fn test_loopback_across_threads() {
        let ep = loopback(8).unwrap();
        let payload: Vec<u8> = (0..100u8).collect();

        let received = thread::scope(|s| {
            s.spawn(|| {
                ep.write(&payload).unwrap();
                ep.close();
            });

            let mut received = Vec::new();
            let mut buf = [0u8; 5];
            loop {
                let n = ep.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            received
        });

        assert_eq!(received, payload);
    }

    #[test]
    fn test_pipe_directions() {
        let (w, r) = pipe(16).unwrap();
        assert_eq!(w.capability(), Capability::WriteOnly);
        assert_eq!(r.capability(), Capability::ReadOnly);

        assert!(matches!(w.read(&mut [0; 4]), Err(Error::Unsupported(_))));
        assert!(matches!(r.write(b"x"), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_pipe_close_drains() {
        let (w, r) = pipe(16).unwrap();
        w.write(b"last words").unwrap();
        w.close();

        assert!(matches!(w.write(b"more"), Err(Error::Closed)));

        let mut buf = [0u8; 16];
        let n = r.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"last words");
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_pipe_reader_close_keeps_writer_open() {
        let (w, r) = pipe(16).unwrap();
        r.close();
        w.write(b"still open").unwrap();
    }

    #[test]
    fn test_pair_cross_wired() {
        let (a, b) = pair(16).unwrap();

        a.write(b"ping").unwrap();
        b.write(b"pong").unwrap();

        let mut buf = [0u8; 16];
        let n = b.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
        let n = a.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"pong");

        // Nothing echoes back to the writer
        assert!(a.read_buffer().unwrap().is_empty());
        assert!(b.read_buffer().unwrap().is_empty());
    }

    #[test]
    fn test_pair_half_close() {
        let (a, b) = pair(16).unwrap();
        a.write(b"bye").unwrap();
        a.close();

        let mut buf = [0u8; 16];
        assert_eq!(b.read(&mut buf).unwrap(), 3);
        assert_eq!(b.read(&mut buf).unwrap(), 0);

        // The other direction is still usable
        b.write(b"ack").unwrap();
        let n = a.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ack");
        assert!(matches!(a.write(b"x"), Err(Error::Closed)));
    }

    #[test]
    fn test_pair_ring_names() {
        let (a, b) = PipeConfig::new(32).with_name("tls").pair().unwrap();
        assert_eq!(a.write_buffer().unwrap().name(), "tls/a->b");
        assert_eq!(a.read_buffer().unwrap().name(), "tls/b->a");
        assert_eq!(b.write_buffer().unwrap().name(), "tls/b->a");
        assert_eq!(b.read_buffer().unwrap().name(), "tls/a->b");
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(loopback(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(pipe(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(pair(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_default_config_capacity() {
        let (w, _r) = PipeConfig::default().pipe().unwrap();
        assert_eq!(w.write_buffer().unwrap().capacity(), 4 * 1024 * 1024);
    }
}
