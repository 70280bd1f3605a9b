//! Software breakpoints by instruction patching.
//!
//! The R3000 offers no usable breakpoint instruction for this setup, so a
//! trap is synthesised by overwriting the instruction word at the target
//! address with `BREAK` (0x0000000d) and keeping the displaced opcode in
//! a shadow cache. The cache mirrors *target* state, not client state: it
//! lives for the whole process and survives GDB reconnects.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::io::{Read, Write};

use log::debug;

use crate::monitor::{Monitor, MonitorError};
use crate::protocol::common::hex::{decode_hex_buf, DecodeHexError};

/// The MIPS `BREAK` instruction, used as the trap opcode.
pub const TRAP_OPCODE: u32 = 0x0000_000d;

#[derive(Debug)]
pub enum BreakpointError {
    Monitor(MonitorError),
    /// The opcode read back from the target was not a 4-byte hex string.
    MalformedOpcode(DecodeHexError),
    /// `clear` for an address with no cached opcode. Nothing is restored
    /// and the monitor is left untouched: writing anything else back
    /// would corrupt the target's instruction stream.
    UnknownBreakpoint(u32),
}

impl Display for BreakpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointError::Monitor(e) => write!(f, "{}", e),
            BreakpointError::MalformedOpcode(e) => {
                write!(f, "target returned a malformed opcode: {:?}", e)
            }
            BreakpointError::UnknownBreakpoint(addr) => {
                write!(f, "no cached opcode for breakpoint at {:#010x}", addr)
            }
        }
    }
}

impl From<MonitorError> for BreakpointError {
    fn from(e: MonitorError) -> BreakpointError {
        BreakpointError::Monitor(e)
    }
}

/// Shadow cache of displaced instruction words, keyed by address.
///
/// An entry exists exactly while a breakpoint is installed at that
/// address.
pub struct BreakpointManager {
    cache: HashMap<u32, [u8; 4]>,
}

impl BreakpointManager {
    pub fn new() -> BreakpointManager {
        BreakpointManager {
            cache: HashMap::new(),
        }
    }

    /// Number of breakpoints currently patched into target memory.
    pub fn installed(&self) -> usize {
        self.cache.len()
    }

    /// Install a breakpoint: read and cache the original instruction,
    /// patch in the trap opcode, and register the address with the
    /// monitor.
    ///
    /// A duplicate `set` at an address that is already patched must not
    /// re-cache: the word in target memory is the trap by then, and
    /// overwriting the entry would lose the real instruction for good.
    pub fn set<P: Read + Write>(
        &mut self,
        monitor: &mut Monitor<P>,
        addr: u32,
    ) -> Result<(), BreakpointError> {
        let reply = monitor.read_memory(addr, 4)?;
        let opcode: [u8; 4] = decode_hex_buf(&reply)
            .map_err(BreakpointError::MalformedOpcode)?
            .try_into()
            .map_err(|_| BreakpointError::MalformedOpcode(DecodeHexError::NotEvenLen))?;

        self.cache.entry(addr).or_insert_with(|| {
            debug!("caching opcode {:02x?} displaced from {:#010x}", opcode, addr);
            opcode
        });

        monitor.write_memory(addr, 4, &TRAP_OPCODE.to_le_bytes())?;
        monitor.insert_breakpoint(addr)?;
        Ok(())
    }

    /// Remove a breakpoint: restore the displaced instruction, drop the
    /// address from the monitor's table, and consume the cache entry.
    pub fn clear<P: Read + Write>(
        &mut self,
        monitor: &mut Monitor<P>,
        addr: u32,
    ) -> Result<(), BreakpointError> {
        let opcode = *self
            .cache
            .get(&addr)
            .ok_or(BreakpointError::UnknownBreakpoint(addr))?;

        monitor.write_memory(addr, 4, &opcode)?;
        monitor.remove_breakpoint(addr)?;
        self.cache.remove(&addr);
        debug!("restored opcode {:02x?} at {:#010x}", opcode, addr);
        Ok(())
    }
}

impl Default for BreakpointManager {
    fn default() -> Self {
        BreakpointManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fake::FakePort;

    fn patched_monitor() -> (Monitor<FakePort>, BreakpointManager, u32, u32) {
        let mut port = FakePort::new();
        let addr = 0x8010_0018;
        let original = 0x27bd_ffe8; // addiu sp, sp, -24
        port.poke_word(addr, original);
        (Monitor::new(port), BreakpointManager::new(), addr, original)
    }

    #[test]
    fn set_patches_trap_and_registers_with_monitor() {
        let (mut mon, mut bps, addr, _) = patched_monitor();
        bps.set(&mut mon, addr).unwrap();

        assert_eq!(mon.port.peek_word(addr), TRAP_OPCODE);
        assert_eq!(mon.port.breakpoints, vec![addr]);
        assert_eq!(bps.installed(), 1);
    }

    #[test]
    fn clear_restores_the_original_word() {
        let (mut mon, mut bps, addr, original) = patched_monitor();
        bps.set(&mut mon, addr).unwrap();
        bps.clear(&mut mon, addr).unwrap();

        assert_eq!(mon.port.peek_word(addr), original);
        assert!(mon.port.breakpoints.is_empty());
        assert_eq!(bps.installed(), 0);
    }

    #[test]
    fn duplicate_set_keeps_the_first_cached_opcode() {
        let (mut mon, mut bps, addr, original) = patched_monitor();
        bps.set(&mut mon, addr).unwrap();
        // memory now holds the trap; a second set must not cache it
        bps.set(&mut mon, addr).unwrap();
        bps.clear(&mut mon, addr).unwrap();

        assert_eq!(mon.port.peek_word(addr), original);
        assert_ne!(mon.port.peek_word(addr), TRAP_OPCODE);
    }

    #[test]
    fn clear_without_entry_leaves_memory_untouched() {
        let (mut mon, mut bps, addr, original) = patched_monitor();
        let err = bps.clear(&mut mon, addr).unwrap_err();

        assert!(matches!(err, BreakpointError::UnknownBreakpoint(a) if a == addr));
        assert_eq!(mon.port.peek_word(addr), original);
        assert!(mon.port.commands.is_empty());
    }

    #[test]
    fn reinstall_after_clear_rereads_memory() {
        let (mut mon, mut bps, addr, original) = patched_monitor();
        bps.set(&mut mon, addr).unwrap();
        bps.clear(&mut mon, addr).unwrap();
        bps.set(&mut mon, addr).unwrap();
        bps.clear(&mut mon, addr).unwrap();

        assert_eq!(mon.port.peek_word(addr), original);
    }
}
