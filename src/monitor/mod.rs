//! Request/response transactions with the debug monitor on the console.
//!
//! Every command is a single letter followed by little-endian 32-bit
//! argument words. The monitor terminates each reply with a `+` byte; the
//! sole exception is `c`/`s`, which produce no immediate reply — the
//! monitor emits a `%` byte whenever the target next drops back into its
//! debug loop.
//!
//! Callers are expected to hold the session lock across a full
//! transaction, so a `Monitor` never sees interleaved requests.

use std::fmt::{self, Display};
use std::io::{self, Read, Write};

use log::trace;

#[cfg(test)]
pub(crate) mod fake;

/// An error during a serial transaction.
///
/// These degrade the RSP request that triggered them (GDB sees `E01` or
/// an empty reply); they never tear down the stub.
#[derive(Debug)]
pub enum MonitorError {
    /// Serial I/O failed outright.
    Io(io::Error),
    /// The monitor did not terminate a reply within the serial timeout.
    Timeout,
    /// A `g` dump arrived without the `00000000` r0 marker.
    MissingRegisterMarker,
}

impl Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Io(e) => write!(f, "serial i/o error: {}", e),
            MonitorError::Timeout => write!(f, "monitor did not answer within the serial timeout"),
            MonitorError::MissingRegisterMarker => {
                write!(f, "register dump is missing the r0 marker")
            }
        }
    }
}

impl From<io::Error> for MonitorError {
    fn from(e: io::Error) -> MonitorError {
        MonitorError::Io(e)
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A handle on the serial line to the on-target debug monitor.
///
/// Generic over the underlying byte stream so tests can substitute a
/// scripted port for real hardware.
pub struct Monitor<P> {
    pub(crate) port: P,
}

impl<P: Read + Write> Monitor<P> {
    pub fn new(port: P) -> Monitor<P> {
        Monitor { port }
    }

    /// Read bytes up to (but not including) `terminator`.
    ///
    /// Synchronous transactions treat a read timeout as a dead monitor.
    /// When waiting on the `%` halt sentinel the target may legitimately
    /// run for minutes, so timeouts are retried instead.
    fn read_until(&mut self, terminator: u8, retry_timeouts: bool) -> Result<Vec<u8>, MonitorError> {
        let mut reply = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => {
                    return Err(MonitorError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "serial port closed",
                    )))
                }
                Ok(_) => {
                    if byte[0] == terminator {
                        return Ok(reply);
                    }
                    reply.push(byte[0]);
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    if !retry_timeouts {
                        return Err(MonitorError::Timeout);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn transact(&mut self, request: &[u8]) -> Result<Vec<u8>, MonitorError> {
        self.port.write_all(request)?;
        self.port.flush()?;
        self.read_until(b'+', false)
    }

    /// Dump all registers (`g`).
    ///
    /// The monitor prefixes the dump with console chatter; the register
    /// block proper starts at the first `00000000` (r0 is hardwired to
    /// zero), so everything before that marker is discarded.
    pub fn read_registers(&mut self) -> Result<Vec<u8>, MonitorError> {
        trace!("serial --> g");
        let reply = self.transact(b"g")?;
        let start =
            find_subslice(&reply, b"00000000").ok_or(MonitorError::MissingRegisterMarker)?;
        Ok(reply[start..].to_vec())
    }

    /// Read a single register (`p`), returning its ascii-hex value.
    pub fn read_register(&mut self, regnum: u32) -> Result<Vec<u8>, MonitorError> {
        trace!("serial --> p {:#x}", regnum);
        let mut request = Vec::with_capacity(5);
        request.push(b'p');
        request.extend_from_slice(&regnum.to_le_bytes());
        self.transact(&request)
    }

    /// Write a single register (`P`). `value` is already in target byte
    /// order. The monitor echoes the value; the echo is discarded.
    pub fn write_register(&mut self, value: [u8; 4]) -> Result<(), MonitorError> {
        trace!("serial --> P {:02x?}", value);
        let mut request = Vec::with_capacity(5);
        request.push(b'P');
        request.extend_from_slice(&value);
        self.transact(&request).map(drop)
    }

    /// Read `len` bytes of target memory (`m`), returned as ascii hex.
    pub fn read_memory(&mut self, addr: u32, len: u32) -> Result<Vec<u8>, MonitorError> {
        trace!("serial --> m {:#010x} len {}", addr, len);
        let mut request = Vec::with_capacity(9);
        request.push(b'm');
        request.extend_from_slice(&addr.to_le_bytes());
        request.extend_from_slice(&len.to_le_bytes());
        self.transact(&request)
    }

    /// Write raw bytes into target memory (`M`). The trailing checksum
    /// word lets the monitor reject a corrupted transfer.
    pub fn write_memory(&mut self, addr: u32, len: u32, data: &[u8]) -> Result<(), MonitorError> {
        trace!("serial --> M {:#010x} len {}", addr, len);
        let checksum = data.iter().fold(0u8, |a, x| a.wrapping_add(*x));
        let mut request = Vec::with_capacity(13 + data.len());
        request.push(b'M');
        request.extend_from_slice(&addr.to_le_bytes());
        request.extend_from_slice(&len.to_le_bytes());
        request.extend_from_slice(&(checksum as u32).to_le_bytes());
        request.extend_from_slice(data);
        self.transact(&request).map(drop)
    }

    /// Register a breakpoint address in the monitor's own table (`Z`).
    pub fn insert_breakpoint(&mut self, addr: u32) -> Result<(), MonitorError> {
        trace!("serial --> Z {:#010x}", addr);
        let mut request = Vec::with_capacity(5);
        request.push(b'Z');
        request.extend_from_slice(&addr.to_le_bytes());
        self.transact(&request).map(drop)
    }

    /// Drop a breakpoint address from the monitor's table (`z`).
    pub fn remove_breakpoint(&mut self, addr: u32) -> Result<(), MonitorError> {
        trace!("serial --> z {:#010x}", addr);
        let mut request = Vec::with_capacity(5);
        request.push(b'z');
        request.extend_from_slice(&addr.to_le_bytes());
        self.transact(&request).map(drop)
    }

    /// Resume execution (`c`). No reply; pair with [`Monitor::wait_halt`].
    pub fn resume(&mut self) -> Result<(), MonitorError> {
        trace!("serial --> c");
        self.port.write_all(b"c")?;
        self.port.flush()?;
        Ok(())
    }

    /// Execute a single instruction (`s`). No reply; pair with
    /// [`Monitor::wait_halt`].
    pub fn step(&mut self) -> Result<(), MonitorError> {
        trace!("serial --> s");
        self.port.write_all(b"s")?;
        self.port.flush()?;
        Ok(())
    }

    /// Block until the monitor emits the `%` halt sentinel.
    pub fn wait_halt(&mut self) -> Result<(), MonitorError> {
        self.read_until(b'%', true).map(drop)
    }
}
