//! A single, blocking network connection carrying one TACACS+ session.
//!
//! Generic over the underlying stream so tests can substitute an in-memory duplex in place
//! of a real [`TcpStream`], the same way the teacher project substitutes async runtimes in
//! its dev-dependencies.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tacacs_plus_protocol::DeserializeError;

use crate::error::ClientError;

/// The default TCP port TACACS+ servers listen on.
pub const DEFAULT_PORT: u16 = 49;

/// A transport carrying exactly one TACACS+ session's worth of traffic.
pub struct Transport<S> {
    stream: S,
}

impl<S: Read + Write> Transport<S> {
    /// Wraps an already-established stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    fn read_exact_retrying(&mut self, buf: &mut [u8], on_eof: DeserializeError) -> Result<(), ClientError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(ClientError::InvalidPacketReceived(on_eof)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    return Err(ClientError::ReadTimeout)
                }
                Err(e) => return Err(ClientError::Io(e)),
            }
        }
        Ok(())
    }

    /// Reads the fixed 12-byte header.
    pub fn read_header(&mut self, buf: &mut [u8]) -> Result<(), ClientError> {
        self.read_exact_retrying(buf, DeserializeError::ShortHeader)
    }

    /// Reads the body, once its length has been learned from the header.
    pub fn read_body(&mut self, buf: &mut [u8]) -> Result<(), ClientError> {
        self.read_exact_retrying(buf, DeserializeError::ShortBody)
    }

    /// Writes a fully-assembled packet in one call.
    ///
    /// A short write is reported rather than retried: TACACS+ packets are written as a
    /// single buffer, and a partial write indicates the connection is no longer usable.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), ClientError> {
        let written = self.stream.write(buf).map_err(ClientError::Io)?;
        if written != buf.len() {
            return Err(ClientError::WriteError);
        }
        self.stream.flush().map_err(ClientError::Io)
    }
}

impl Transport<TcpStream> {
    /// Connects to `address` (`host` or `host:port`, defaulting to port 49), applying
    /// `timeout` to both the connection attempt and every subsequent read.
    pub fn connect(address: &str, timeout: Duration) -> Result<Self, ClientError> {
        let normalized = normalize_address(address);
        let addr = normalized
            .to_socket_addrs()
            .map_err(|_| ClientError::ConnectFailed)?
            .next()
            .ok_or(ClientError::ConnectFailed)?;

        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|_| ClientError::ConnectFailed)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|_| ClientError::ConnectFailed)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|_| ClientError::ConnectFailed)?;
        // best-effort; a NODELAY failure shouldn't prevent using an otherwise-good connection
        let _ = stream.set_nodelay(true);

        Ok(Self::new(stream))
    }
}

fn normalize_address(address: &str) -> String {
    if address.contains(':') {
        address.to_owned()
    } else {
        format!("{address}:{DEFAULT_PORT}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyReader {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }
    impl Write for FlakyReader {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn read_header_reassembles_partial_reads() {
        let stream = FlakyReader {
            chunks: vec![vec![1, 2, 3], vec![4, 5, 6, 7, 8, 9, 10, 11, 12]],
        };
        let mut transport = Transport::new(stream);

        let mut buf = [0u8; 12];
        transport.read_header(&mut buf).expect("reassembled read should succeed");
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn read_header_reports_short_header_on_eof() {
        let stream = FlakyReader {
            chunks: vec![vec![1, 2, 3]],
        };
        let mut transport = Transport::new(stream);

        let mut buf = [0u8; 12];
        let err = transport.read_header(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidPacketReceived(DeserializeError::ShortHeader)
        ));
    }

    #[test]
    fn write_all_reports_short_write() {
        struct ShortWriter;
        impl Read for ShortWriter {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Ok(0)
            }
        }
        impl Write for ShortWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len().saturating_sub(1))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut transport = Transport::new(ShortWriter);
        let err = transport.write_all(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ClientError::WriteError));
    }
}
