//! Packet dispatch: one handler per RSP command class, each producing a
//! single acked response.

use std::io::{Read, Write};

use log::{debug, error, warn};

use crate::arch::{MipsRegId, TARGET_DESCRIPTION_XML};
use crate::conn::Connection;
use crate::monitor::MonitorError;
use crate::protocol::commands::Command;
use crate::protocol::ResponseWriter;

use super::{Debugger, GdbStub, GdbStubError, RunState};

/// Exclusive bounds of the RAM window the stub will touch: above the
/// kernel/monitor area, below the default stack. Requests outside the
/// window are answered empty without querying the target.
const RAM_WINDOW_START: u32 = 0x8001_0000;
const RAM_WINDOW_END: u32 = 0x801f_ff00;

const SUPPORTED_FEATURES: &str = "PacketSize=800;qXfer:features:read+";

/// Terminal `qXfer:threads:read` chunk: one bare process, no threads.
const EMPTY_THREADS_XML: &str = "l<?xml version=\"1.0\"?><threads></threads>";

fn memory_in_valid_range(addr: u32) -> bool {
    addr > RAM_WINDOW_START && addr < RAM_WINDOW_END
}

impl<C: Connection> GdbStub<C> {
    pub(crate) fn handle_packet<P: Read + Write>(
        &mut self,
        dbg: &mut Debugger<P>,
        body: &[u8],
    ) -> Result<(), GdbStubError<C::Error>> {
        match Command::from_body(body) {
            Command::ReplyEmpty => self.reply_empty(),
            Command::ReplyOk => self.reply_ok(),

            Command::FeaturesRead { offset, length } => self.handle_features_read(offset, length),
            Command::ThreadsRead => self.reply_str(EMPTY_THREADS_XML),

            Command::ReadRegisters => match dbg.monitor.read_registers() {
                Ok(dump) => self.reply(&[&dump]),
                Err(e) => self.monitor_error(e),
            },

            Command::ReadMemory { addr, len } => {
                if !memory_in_valid_range(addr) {
                    debug!("memory read at {:#010x} is outside the RAM window", addr);
                    return self.reply_empty();
                }
                match dbg.monitor.read_memory(addr, len) {
                    Ok(data) => self.reply(&[&data]),
                    Err(e) => self.monitor_error(e),
                }
            }

            Command::WriteMemory { addr, len, data } => {
                match dbg.monitor.write_memory(addr, len, &data) {
                    Ok(()) => self.reply_ok(),
                    Err(e) => self.monitor_error(e),
                }
            }

            Command::ReadRegister(regnum) => self.handle_read_register(dbg, regnum),

            Command::WriteRegister(value) => match dbg.monitor.write_register(value) {
                Ok(()) => self.reply_ok(),
                Err(e) => self.monitor_error(e),
            },

            // binary memory writes are not supported; an empty reply
            // makes GDB fall back to `M`
            Command::WriteMemoryBinary => self.reply_empty(),

            Command::Resume => self.handle_resume(dbg, false),
            Command::Step => self.handle_resume(dbg, true),

            Command::InsertBreakpoint(addr) => {
                let Debugger {
                    monitor,
                    breakpoints,
                    ..
                } = dbg;
                match breakpoints.set(monitor, addr) {
                    Ok(()) => self.reply_ok(),
                    Err(e) => {
                        error!("failed to set breakpoint at {:#010x}: {}", addr, e);
                        self.reply_str("E01")
                    }
                }
            }

            Command::RemoveBreakpoint(addr) => {
                let Debugger {
                    monitor,
                    breakpoints,
                    ..
                } = dbg;
                match breakpoints.clear(monitor, addr) {
                    Ok(()) => self.reply_ok(),
                    Err(e) => {
                        error!("failed to clear breakpoint at {:#010x}: {}", addr, e);
                        self.reply_str("E01")
                    }
                }
            }

            Command::QSupported => self.reply_str(SUPPORTED_FEATURES),
            Command::HaltReason => self.reply_str("S00"),
            Command::QOffsets => self.reply_str("Text=0;Data=0;Bss=0"),
            Command::QAttached => self.reply_str("1"),

            Command::Malformed => {
                warn!(
                    "malformed arguments in packet: {}",
                    String::from_utf8_lossy(body)
                );
                self.reply_empty()
            }

            Command::Unknown(pkt) => {
                warn!("ignoring unsupported packet: {}", String::from_utf8_lossy(pkt));
                Ok(())
            }
        }
    }

    /// Serve a chunk of the target description XML.
    fn handle_features_read(
        &mut self,
        offset: u32,
        length: u32,
    ) -> Result<(), GdbStubError<C::Error>> {
        let xml = TARGET_DESCRIPTION_XML.as_bytes();
        let total = xml.len() as u64;
        let (offset, length) = (offset as u64, length as u64);

        if offset + length < total {
            let chunk = &xml[offset as usize..(offset + length) as usize];
            self.reply(&[b"m", chunk])
        } else if offset < total {
            self.reply(&[b"l", &xml[offset as usize..]])
        } else {
            // GDB should never read past the end; ack and stay silent
            self.ack()
        }
    }

    fn handle_read_register<P: Read + Write>(
        &mut self,
        dbg: &mut Debugger<P>,
        regnum: u32,
    ) -> Result<(), GdbStubError<C::Error>> {
        match MipsRegId::from_raw_id(regnum) {
            // no FPU on this hardware; GDB insists on asking anyway
            Some(MipsRegId::Fcsr) | Some(MipsRegId::Fir) => self.reply_str("00000000"),

            Some(MipsRegId::Dcic) | Some(MipsRegId::Bpc) | Some(MipsRegId::Tar) => {
                match dbg.monitor.read_register(regnum) {
                    Ok(value) => self.reply(&[&value]),
                    Err(e) => self.monitor_error(e),
                }
            }

            // every other slot arrives via the `g` dump; no
            // single-register answer
            _ => self.ack(),
        }
    }

    /// `c`/`s`: hand control back to user code, then block until the
    /// monitor announces the next halt with its `%` sentinel. GDB must
    /// not see the stop reply before the target has actually stopped.
    fn handle_resume<P: Read + Write>(
        &mut self,
        dbg: &mut Debugger<P>,
        step: bool,
    ) -> Result<(), GdbStubError<C::Error>> {
        dbg.state = RunState::Running;
        debug!("target {}", if step { "stepping" } else { "running" });

        let launched = if step {
            dbg.monitor.step()
        } else {
            dbg.monitor.resume()
        };
        let result = launched.and_then(|()| dbg.monitor.wait_halt());

        dbg.state = RunState::Halted;

        match result {
            Ok(()) => {
                debug!("target halted");
                self.reply_str("S05")
            }
            Err(e) => self.monitor_error(e),
        }
    }

    fn monitor_error(&mut self, e: MonitorError) -> Result<(), GdbStubError<C::Error>> {
        error!("serial transaction failed: {}", e);
        self.reply_str("E01")
    }

    fn ack(&mut self) -> Result<(), GdbStubError<C::Error>> {
        self.conn.write(b'+').map_err(GdbStubError::ConnectionWrite)
    }

    /// Ack, then emit `parts` as one framed packet.
    fn reply(&mut self, parts: &[&[u8]]) -> Result<(), GdbStubError<C::Error>> {
        self.ack()?;
        let mut res = ResponseWriter::new(&mut self.conn);
        for part in parts {
            res.write_all(part)?;
        }
        res.flush()?;
        Ok(())
    }

    fn reply_str(&mut self, s: &str) -> Result<(), GdbStubError<C::Error>> {
        self.reply(&[s.as_bytes()])
    }

    fn reply_ok(&mut self) -> Result<(), GdbStubError<C::Error>> {
        self.reply_str("OK")
    }

    fn reply_empty(&mut self) -> Result<(), GdbStubError<C::Error>> {
        self.reply(&[])
    }
}
