//! The per-connection session driver: reads RSP packets off the TCP
//! socket and dispatches them against the shared debugger state.

mod core_impl;
mod error;

pub use error::GdbStubError;

use std::io::{Read, Write};
use std::sync::Mutex;

use log::warn;

use crate::breakpoints::BreakpointManager;
use crate::conn::{Connection, ConnectionExt};
use crate::monitor::Monitor;
use crate::protocol::Deframer;

/// Execution state of the target as the stub last observed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The target sits in the monitor's debug loop, answering commands.
    Halted,
    /// User code is executing; the monitor will announce the next halt
    /// with a `%` sentinel.
    Running,
}

/// Everything shared between GDB sessions: the serial line, the shadow
/// opcode cache, and the run-state flag.
///
/// Wrapped in one mutex so every dispatched command — including the
/// three serial transactions behind a breakpoint `set` — is atomic with
/// respect to other connections.
pub struct Debugger<P> {
    pub(crate) monitor: Monitor<P>,
    pub(crate) breakpoints: BreakpointManager,
    pub(crate) state: RunState,
}

impl<P: Read + Write> Debugger<P> {
    pub fn new(monitor: Monitor<P>) -> Debugger<P> {
        Debugger {
            monitor,
            breakpoints: BreakpointManager::new(),
            state: RunState::Halted,
        }
    }

    /// Number of breakpoints currently patched into target memory.
    pub fn installed_breakpoints(&self) -> usize {
        self.breakpoints.installed()
    }
}

/// Drives one GDB session over a [`Connection`].
pub struct GdbStub<C> {
    pub(crate) conn: C,
    deframer: Deframer,
}

impl<C: Connection> GdbStub<C> {
    pub fn new(conn: C) -> GdbStub<C> {
        GdbStub {
            conn,
            deframer: Deframer::new(),
        }
    }
}

impl<C: ConnectionExt> GdbStub<C> {
    /// Run the session until the client disconnects.
    ///
    /// Returns `Ok(())` on a clean disconnect. The debugger (and with it
    /// the serial port and opcode cache) outlives the session — the cache
    /// mirrors target state, so breakpoints left patched by a dropped
    /// connection stay patched for the next one.
    pub fn run<P: Read + Write>(
        mut self,
        debugger: &Mutex<Debugger<P>>,
    ) -> Result<(), GdbStubError<C::Error>> {
        self.conn
            .on_session_start()
            .map_err(GdbStubError::ConnectionInit)?;

        // comfortably holds a TCP segment's worth of the advertised
        // PacketSize=800
        let mut buf = [0u8; 2048];

        loop {
            let n = self
                .conn
                .read(&mut buf)
                .map_err(GdbStubError::ConnectionRead)?;

            if n == 0 {
                let debugger = debugger.lock().unwrap_or_else(|e| e.into_inner());
                let patched = debugger.installed_breakpoints();
                if patched > 0 {
                    warn!(
                        "client disconnected with {} breakpoint(s) still patched on the target",
                        patched
                    );
                }
                return Ok(());
            }

            for &byte in &buf[..n] {
                if let Some(body) = self.deframer.pump(byte) {
                    let mut debugger = debugger.lock().unwrap_or_else(|e| e.into_inner());
                    self.handle_packet(&mut debugger, &body)?;
                }
            }
        }
    }
}
