//! A scripted stand-in for the on-target debug monitor.
//!
//! Implements `Read`/`Write` the way a `serialport` handle does:
//! commands written to the port are parsed per the monitor's wire
//! protocol and answered from a fake RAM/register file, and reads with
//! nothing pending fail with `TimedOut`, matching real serial timeout
//! behaviour.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};

pub(crate) struct FakePort {
    /// Sparse target RAM; unwritten bytes read as zero.
    pub ram: HashMap<u32, u8>,
    /// Register file backing `p` replies.
    pub regs: HashMap<u32, u32>,
    /// Raw body of a `g` reply (before the `+` terminator).
    pub reg_dump: Vec<u8>,
    /// Addresses currently registered via `Z`.
    pub breakpoints: Vec<u32>,
    /// Every complete command consumed, for wire-level assertions.
    pub commands: Vec<Vec<u8>>,
    /// Values written via `P`.
    pub reg_writes: Vec<[u8; 4]>,
    /// Emit `%` as soon as `c`/`s` is received.
    pub halt_immediately: bool,
    /// Swallow all commands without replying (dead-target simulation).
    pub mute: bool,

    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
}

impl FakePort {
    pub fn new() -> FakePort {
        FakePort {
            ram: HashMap::new(),
            regs: HashMap::new(),
            reg_dump: b"00000000".to_vec(),
            breakpoints: Vec::new(),
            commands: Vec::new(),
            reg_writes: Vec::new(),
            halt_immediately: true,
            mute: false,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    pub fn poke_word(&mut self, addr: u32, word: u32) {
        for (i, b) in word.to_le_bytes().iter().enumerate() {
            self.ram.insert(addr + i as u32, *b);
        }
    }

    pub fn peek_word(&self, addr: u32) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = *self.ram.get(&(addr + i as u32)).unwrap_or(&0);
        }
        u32::from_le_bytes(bytes)
    }

    fn word_arg(&self, at: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.inbox[at..at + 4]);
        u32::from_le_bytes(bytes)
    }

    fn reply(&mut self, bytes: &[u8]) {
        self.outbox.extend(bytes);
    }

    /// Consume complete commands from the inbox, queueing replies.
    fn process(&mut self) {
        loop {
            let consumed = match self.inbox.first().copied() {
                None => 0,
                Some(b'g') => {
                    let dump = self.reg_dump.clone();
                    self.reply(&dump);
                    self.reply(b"+");
                    1
                }
                Some(b'c') | Some(b's') => {
                    if self.halt_immediately {
                        self.reply(b"%");
                    }
                    1
                }
                Some(b'p') if self.inbox.len() >= 5 => {
                    let regnum = self.word_arg(1);
                    let value = self.regs.get(&regnum).copied().unwrap_or(0);
                    self.reply(format!("{:08x}", value).as_bytes());
                    self.reply(b"+");
                    5
                }
                Some(b'P') if self.inbox.len() >= 5 => {
                    let mut value = [0u8; 4];
                    value.copy_from_slice(&self.inbox[1..5]);
                    self.reg_writes.push(value);
                    self.reply(b"00000000+");
                    5
                }
                Some(b'm') if self.inbox.len() >= 9 => {
                    let addr = self.word_arg(1);
                    let len = self.word_arg(5);
                    let hex: String = (0..len)
                        .map(|i| {
                            format!("{:02x}", self.ram.get(&(addr + i)).copied().unwrap_or(0))
                        })
                        .collect();
                    self.reply(hex.as_bytes());
                    self.reply(b"+");
                    9
                }
                Some(b'M') if self.inbox.len() >= 13 => {
                    let addr = self.word_arg(1);
                    let len = self.word_arg(5) as usize;
                    if self.inbox.len() < 13 + len {
                        0
                    } else {
                        let data = self.inbox[13..13 + len].to_vec();
                        for (i, b) in data.iter().enumerate() {
                            self.ram.insert(addr + i as u32, *b);
                        }
                        self.reply(b"+");
                        13 + len
                    }
                }
                Some(b'Z') if self.inbox.len() >= 5 => {
                    let addr = self.word_arg(1);
                    self.breakpoints.push(addr);
                    self.reply(b"+");
                    5
                }
                Some(b'z') if self.inbox.len() >= 5 => {
                    let addr = self.word_arg(1);
                    self.breakpoints.retain(|a| *a != addr);
                    self.reply(b"+");
                    5
                }
                // partial command; wait for the rest
                Some(_) => 0,
            };

            if consumed == 0 {
                return;
            }
            self.commands.push(self.inbox[..consumed].to_vec());
            self.inbox.drain(..consumed);
        }
    }
}

impl Read for FakePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.outbox.pop_front() {
            Some(b) => {
                buf[0] = b;
                Ok(1)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "fake serial timeout")),
        }
    }
}

impl Write for FakePort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbox.extend_from_slice(buf);
        if self.mute {
            self.inbox.clear();
        } else {
            self.process();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
