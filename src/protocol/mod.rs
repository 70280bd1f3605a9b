//! The GDB Remote Serial Protocol wire format.

pub mod commands;
pub mod common;
mod packet;
mod response_writer;

pub use packet::{checksum, frame, Deframer};
pub use response_writer::{Error as ResponseWriterError, ResponseWriter};
