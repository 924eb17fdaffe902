//! Thread-to-thread byte pipes over blocking ring buffers.
//!
//! This crate moves byte streams between threads of the same process without
//! any kernel I/O. It stands in for a socket or OS pipe, for example underneath
//! a secure-channel layer under test.
//!
//! - [`RingBuffer`]: A fixed-capacity byte ring with blocking put/get and close
//! - [`Endpoint`]: A read-only, write-only or read-write stream handle over
//!   one or two rings
//!
//! # Topologies
//!
//! ## Loopback
//!
//! [`loopback`] returns one endpoint that reads back what it writes. Reader and
//! writer must be different threads.
//!
//! ```
//! use std::thread;
//!
//! let ep = giztoy_pipe::loopback(64).unwrap();
//! thread::scope(|s| {
//!     s.spawn(|| ep.write(b"hello").unwrap());
//!     let mut buf = [0u8; 5];
//!     let mut got = 0;
//!     while got < 5 {
//!         got += ep.read(&mut buf[got..]).unwrap();
//!     }
//!     assert_eq!(&buf, b"hello");
//! });
//! ```
//!
//! ## Unidirectional pipe
//!
//! [`pipe`] returns a write-only and a read-only endpoint over one ring.
//!
//! ```
//! use std::io::Read;
//! use std::thread;
//!
//! let (writer, reader) = giztoy_pipe::pipe(4096).unwrap();
//! let producer = thread::spawn(move || {
//!     writer.write(&[7u8; 10_000]).unwrap();
//!     // dropping the writer closes the pipe
//! });
//!
//! let mut data = Vec::new();
//! (&reader).read_to_end(&mut data).unwrap();
//! producer.join().unwrap();
//! assert_eq!(data.len(), 10_000);
//! ```
//!
//! ## Bidirectional pair
//!
//! [`pair`] returns two read-write endpoints over two cross-wired rings.
//!
//! ```
//! let (a, b) = giztoy_pipe::pair(1024).unwrap();
//! a.write(b"ping").unwrap();
//! b.write(b"pong").unwrap();
//!
//! let mut buf = [0u8; 4];
//! assert_eq!(b.read(&mut buf).unwrap(), 4);
//! assert_eq!(&buf, b"ping");
//! assert_eq!(a.read(&mut buf).unwrap(), 4);
//! assert_eq!(&buf, b"pong");
//! ```
//!
//! # Closing
//!
//! - `close()`: Prevents new writes; readers drain what is left, then read 0
//! - `close_with_error()` / `abort()`: Both sides fail at once with the error
//!
//! # Thread Safety
//!
//! [`RingBuffer`] and [`Endpoint`] are `Send + Sync`. Any number of threads may
//! read or write concurrently; a single ring `put` is the unit of atomicity.

mod config;
mod endpoint;
mod error;
mod pipe;
mod ring_buffer;

pub use config::{DEFAULT_CAPACITY, PipeConfig};
pub use endpoint::{Capability, Endpoint};
pub use error::{Error, Result};
pub use pipe::{loopback, pair, pipe};
pub use ring_buffer::RingBuffer;
