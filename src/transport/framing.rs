//! Newline-delimited framing over a byte stream.
//!
//! # Wire Format
//!
//! ```text
//! <compact JSON object>\n
//! ```
//!
//! One request line out, one response line back. The reader applies two
//! deadlines: a long one for the first bytes of a response (the server may
//! be busy) and a short one for every later chunk, so a peer that stalls
//! mid-line is detected quickly.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::{trace, warn};

use crate::config::ReadTimeouts;
use crate::error::ClientError;
use crate::transport::stream::SocketStream;

/// Maximum response line (64MB) before the stream is considered corrupt.
pub const MAX_LINE_LENGTH: usize = 64 * 1024 * 1024;

/// Byte stream whose read deadline and blocking mode can be changed.
pub trait LineStream: Read + Write {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()>;
}

impl LineStream for SocketStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        SocketStream::set_read_timeout(self, timeout)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        SocketStream::set_nonblocking(self, nonblocking)
    }
}

impl LineStream for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        TcpStream::set_nonblocking(self, nonblocking)
    }
}

/// Terminate `line` with a newline if it lacks one.
pub fn frame(line: &str) -> String {
    let mut framed = String::with_capacity(line.len() + 1);
    framed.push_str(line);
    if !framed.ends_with('\n') {
        framed.push('\n');
    }
    framed
}

/// Write one request line and flush it.
///
/// # Errors
///
/// Returns the underlying socket error as a [`ClientError`].
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<(), ClientError> {
    writer.write_all(frame(line).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one response line, without its terminating newline.
///
/// # Errors
///
/// - [`ClientError::Timeout`] if no data arrives within the first-byte
///   deadline, or a started line stalls longer than the inter-byte deadline
/// - [`ClientError::Closed`] if the peer closes before the newline
/// - [`ClientError::Io`] on socket errors, an oversized line, or a line that
///   is not valid UTF-8
pub fn read_line<S: LineStream>(
    reader: &mut BufReader<S>,
    timeouts: &ReadTimeouts,
) -> Result<String, ClientError> {
    let mut line = Vec::new();
    let mut deadline = timeouts.first_byte();

    loop {
        // Buffered bytes are consumed without touching the socket, so the
        // deadline only matters when fill_buf actually reads.
        if reader.buffer().is_empty() {
            reader.get_ref().set_read_timeout(Some(deadline))?;
        }

        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(ClientError::Timeout(deadline));
            }
            Err(err) => return Err(err.into()),
        };

        if available.is_empty() {
            return Err(ClientError::Closed);
        }

        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                line.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                break;
            }
            None => {
                let n = available.len();
                line.extend_from_slice(available);
                reader.consume(n);
            }
        }

        if line.len() > MAX_LINE_LENGTH {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("response line exceeds {} bytes", MAX_LINE_LENGTH),
            )));
        }

        deadline = timeouts.inter_byte();
    }

    String::from_utf8(line)
        .map_err(|e| ClientError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Throw away anything the server sent that nobody asked for.
///
/// Discards the reader's buffer, then drains the socket in non-blocking
/// mode until it would block. Errors and EOF end the drain silently; a dead
/// stream is reported by the next read instead. Returns the number of bytes
/// discarded.
pub fn discard_stale_input<S: LineStream>(reader: &mut BufReader<S>) -> usize {
    let mut discarded = reader.buffer().len();
    reader.consume(discarded);

    if reader.get_ref().set_nonblocking(true).is_err() {
        return discarded;
    }

    let mut scratch = [0u8; 1024];
    while discarded <= MAX_LINE_LENGTH {
        match reader.get_mut().read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }

    if let Err(err) = reader.get_ref().set_nonblocking(false) {
        warn!("Failed to restore blocking mode after drain: {}", err);
    }

    if discarded > 0 {
        trace!(bytes = discarded, "Discarded stale inbound data");
    }
    discarded
}
