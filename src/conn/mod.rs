//! The byte stream carrying RSP traffic to and from GDB.

mod impls;

/// The GDB side of the stub as a plain byte sink.
///
/// In practice this is always a [`TcpStream`](std::net::TcpStream); the
/// trait exists so the dispatcher and [`ResponseWriter`] can be driven
/// against an in-memory buffer in tests.
///
/// [`ResponseWriter`]: crate::protocol::ResponseWriter
pub trait Connection {
    /// Transport-specific error type.
    type Error;

    /// Write a single byte.
    fn write(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write the entire buffer, blocking until complete.
    ///
    /// Defaults to a byte-at-a-time loop over `write`; the `TcpStream`
    /// impl replaces it with one `io::Write::write_all` call.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        for b in buf {
            self.write(*b)?;
        }
        Ok(())
    }

    /// Flush any buffered bytes out to the peer.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Hook invoked once per session, before the first packet is read.
    /// The `TcpStream` impl uses it to enable `TCP_NODELAY`; the default
    /// does nothing.
    fn on_session_start(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Extends [`Connection`] with a buffered read, used by the session
/// driver's read/dispatch loop.
pub trait ConnectionExt: Connection {
    /// Read up to `buf.len()` bytes, blocking until at least one is
    /// available. Returns `Ok(0)` once the peer has disconnected.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

#[cfg(test)]
impl Connection for Vec<u8> {
    type Error = core::convert::Infallible;

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
