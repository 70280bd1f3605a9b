use std::fmt::{self, Debug, Display};

use crate::protocol::ResponseWriterError;

/// An error which may occur during a GDB debugging session.
///
/// Only connection-level failures end a session; serial-side problems
/// are reported to GDB in-band (`E01` or an empty reply) and the session
/// continues.
#[derive(Debug)]
pub enum GdbStubError<C> {
    /// Connection error while initializing the session.
    ConnectionInit(C),
    /// Connection error while reading a request.
    ConnectionRead(C),
    /// Connection error while writing a response.
    ConnectionWrite(C),
}

impl<C: Display> Display for GdbStubError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdbStubError::ConnectionInit(e) => {
                write!(f, "connection error while initializing the session: {}", e)
            }
            GdbStubError::ConnectionRead(e) => {
                write!(f, "connection error while reading request: {}", e)
            }
            GdbStubError::ConnectionWrite(e) => {
                write!(f, "connection error while writing response: {}", e)
            }
        }
    }
}

impl<C: Debug + Display> std::error::Error for GdbStubError<C> {}

impl<C> From<ResponseWriterError<C>> for GdbStubError<C> {
    fn from(e: ResponseWriterError<C>) -> Self {
        GdbStubError::ConnectionWrite(e.0)
    }
}
