use crate::conn::Connection;

/// Error value returned when writing a response fails at the connection
/// layer.
#[derive(Debug)]
pub struct Error<C>(pub C);

/// A wrapper around [`Connection`] that frames an outgoing packet,
/// computing the running checksum as bytes are written.
///
/// The `$` header is emitted lazily on the first byte (or on flush, for
/// an empty reply), and `flush` appends the `#xx` trailer.
pub struct ResponseWriter<'a, C: 'a> {
    inner: &'a mut C,
    started: bool,
    checksum: u8,
    msg: String,
}

impl<'a, C: Connection + 'a> ResponseWriter<'a, C> {
    pub fn new(inner: &'a mut C) -> Self {
        Self {
            inner,
            started: false,
            checksum: 0,
            msg: String::new(),
        }
    }

    /// Consumes self, writing out the final `#` and checksum.
    pub fn flush(mut self) -> Result<(), Error<C::Error>> {
        // don't include '#' in checksum calculation
        let checksum = self.checksum;

        log::trace!("--> ${}#{:02x}", self.msg, checksum);

        self.write(b'#')?;
        self.write_hex(checksum)?;

        self.inner.flush().map_err(Error)
    }

    /// Write a single byte.
    pub fn write(&mut self, byte: u8) -> Result<(), Error<C::Error>> {
        self.msg.push(byte as char);

        if !self.started {
            self.started = true;
            self.inner.write(b'$').map_err(Error)?;
        }

        self.checksum = self.checksum.wrapping_add(byte);
        self.inner.write(byte).map_err(Error)
    }

    /// Write an entire buffer over the connection.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), Error<C::Error>> {
        data.iter().try_for_each(|b| self.write(*b))
    }

    /// Write an entire string over the connection.
    pub fn write_str(&mut self, s: &str) -> Result<(), Error<C::Error>> {
        self.write_all(s.as_bytes())
    }

    /// Write a single byte as a hex string (two ascii chars).
    pub fn write_hex(&mut self, byte: u8) -> Result<(), Error<C::Error>> {
        let hex_str = format!("{:02x}", byte);
        self.write(hex_str.as_bytes()[0])?;
        self.write(hex_str.as_bytes()[1])?;
        Ok(())
    }
}
