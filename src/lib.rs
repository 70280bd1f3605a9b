//! A GDB Remote Serial Protocol stub for debugging code on a real
//! PlayStation over a serial cable.
//!
//! The stub sits between two protocols: GDB connects over TCP and speaks
//! the ASCII-framed Remote Serial Protocol, while the debug monitor
//! running on the console speaks a single-letter binary command set over
//! the serial line. Each RSP request is translated into one or more
//! monitor transactions, and software breakpoints are implemented here by
//! patching the target's instruction stream with the MIPS `BREAK` opcode
//! (keeping a shadow copy of every overwritten instruction).
//!
//! Module layout:
//!
//! - [`protocol`] — RSP framing, command classification, hex conversions
//! - [`conn`] — byte-stream connection trait (implemented for `TcpStream`)
//! - [`monitor`] — request/response transactions with the on-target monitor
//! - [`breakpoints`] — the shadow opcode cache
//! - [`arch`] — the MIPS R3000 target description served to GDB
//! - [`stub`] — the per-connection session driver and packet dispatcher

pub mod arch;
pub mod breakpoints;
pub mod conn;
pub mod monitor;
pub mod protocol;
pub mod stub;

pub use stub::{Debugger, GdbStub, GdbStubError};
