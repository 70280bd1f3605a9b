//! Classification of inbound RSP packet bodies.
//!
//! GDB's packet namespace is a mix of single-letter prefixes (`m`, `Z`,
//! `c`, ...) and longer `q`/`v` query names, so classification runs in a
//! fixed order with first-match-wins semantics: substring-matched groups
//! with canned replies, the two `qXfer` transfers, the single-letter
//! commands, and finally the remaining `q` queries.

use crate::protocol::common::hex::{decode_hex, decode_hex_buf, target_word};

/// Packets answered with an empty reply, without touching the target.
const EMPTY_RESPONSE_PACKETS: &[&[u8]] = &[
    b"qTStatus",
    b"vMustReplyEmpty",
    b"qC",
    b"vCont?",
    b"qSymbol::",
];

/// Thread-related packets answered `OK`: the target runs exactly one
/// thread of execution, so every Hg/Hc selector is trivially satisfied.
const OK_RESPONSE_PACKETS: &[&[u8]] = &[
    b"Hg0",
    b"Hg1",
    b"Hc-1",
    b"Hc0",
    b"Hc1",
    b"qThreadExtraInfo",
    b"qfThreadInfo",
    b"qsThreadInfo",
];

/// A classified RSP request.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Canned empty reply.
    ReplyEmpty,
    /// Canned `OK` reply.
    ReplyOk,
    /// `qXfer:features:read:target.xml:<offset>,<length>`
    FeaturesRead { offset: u32, length: u32 },
    /// `qXfer:threads:read::<offset>,<length>`
    ThreadsRead,
    /// `g`
    ReadRegisters,
    /// `m<addr>,<len>`
    ReadMemory { addr: u32, len: u32 },
    /// `M<addr>,<len>:<hex-data>`
    WriteMemory { addr: u32, len: u32, data: Vec<u8> },
    /// `p<regnum>`
    ReadRegister(u32),
    /// `P<regnum>=<value>`, value already converted to target byte order
    WriteRegister([u8; 4]),
    /// `X...` — binary memory writes are not supported
    WriteMemoryBinary,
    /// `c`
    Resume,
    /// `s`
    Step,
    /// `Z<type>,<addr>,<kind>`
    InsertBreakpoint(u32),
    /// `z<type>,<addr>,<kind>`
    RemoveBreakpoint(u32),
    /// `qSupported:...`
    QSupported,
    /// `?`
    HaltReason,
    /// `qOffsets`
    QOffsets,
    /// `qAttached`
    QAttached,
    /// A recognised prefix with arguments that failed to parse.
    Malformed,
    /// Anything else; ignored without a reply.
    Unknown(&'a [u8]),
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl<'a> Command<'a> {
    pub fn from_body(body: &'a [u8]) -> Command<'a> {
        if EMPTY_RESPONSE_PACKETS.iter().any(|p| contains(body, p)) {
            return Command::ReplyEmpty;
        }
        if OK_RESPONSE_PACKETS.iter().any(|p| contains(body, p)) {
            return Command::ReplyOk;
        }

        if let Some(at) = find(body, b"qXfer:features:read:target.xml:") {
            let args = &body[at + b"qXfer:features:read:target.xml:".len()..];
            return parse_xfer_args(args)
                .map(|(offset, length)| Command::FeaturesRead { offset, length })
                .unwrap_or(Command::Malformed);
        }
        if contains(body, b"qXfer:threads:read::") {
            return Command::ThreadsRead;
        }

        match body.first().copied() {
            Some(b'g') => Command::ReadRegisters,
            Some(b'm') => parse_mem_region(&body[1..])
                .map(|(addr, len)| Command::ReadMemory { addr, len })
                .unwrap_or(Command::Malformed),
            Some(b'M') => parse_mem_write(&body[1..]).unwrap_or(Command::Malformed),
            Some(b'p') => decode_hex(&body[1..])
                .map(Command::ReadRegister)
                .unwrap_or(Command::Malformed),
            Some(b'X') => Command::WriteMemoryBinary,
            Some(b'P') => parse_reg_write(body).unwrap_or(Command::Malformed),
            Some(b'c') => Command::Resume,
            Some(b's') => Command::Step,
            Some(b'Z') => parse_breakpoint_addr(body)
                .map(Command::InsertBreakpoint)
                .unwrap_or(Command::Malformed),
            Some(b'z') => parse_breakpoint_addr(body)
                .map(Command::RemoveBreakpoint)
                .unwrap_or(Command::Malformed),
            Some(b'?') => Command::HaltReason,
            _ if contains(body, b"qSupported") => Command::QSupported,
            _ if contains(body, b"qOffsets") => Command::QOffsets,
            _ if contains(body, b"qAttached") => Command::QAttached,
            _ => Command::Unknown(body),
        }
    }
}

/// `<offset>,<length>`, both ascii hex in big-endian digit order.
fn parse_xfer_args(args: &[u8]) -> Option<(u32, u32)> {
    let comma = args.iter().position(|b| *b == b',')?;
    let offset = decode_hex(&args[..comma]).ok()?;
    let length = decode_hex(&args[comma + 1..]).ok()?;
    Some((offset, length))
}

/// `<addr>,<len>` following the `m` prefix.
fn parse_mem_region(args: &[u8]) -> Option<(u32, u32)> {
    let comma = args.iter().position(|b| *b == b',')?;
    let addr = decode_hex(&args[..comma]).ok()?;
    let len = decode_hex(&args[comma + 1..]).ok()?;
    Some((addr, len))
}

/// `<addr>,<len>:<hex-data>` following the `M` prefix.
fn parse_mem_write(args: &[u8]) -> Option<Command<'static>> {
    let comma = args.iter().position(|b| *b == b',')?;
    let colon = args.iter().position(|b| *b == b':')?;
    let addr = decode_hex(&args[..comma]).ok()?;
    let len = decode_hex(&args[comma + 1..colon]).ok()?;
    let data = decode_hex_buf(&args[colon + 1..]).ok()?;
    Some(Command::WriteMemory { addr, len, data })
}

/// The register value is always the 8 hex digits following `=`; the
/// payload is already little-endian text, so it passes through to target
/// byte order unchanged. The register number itself never goes on the
/// wire (the monitor's own `P` command carries only the value).
fn parse_reg_write(body: &[u8]) -> Option<Command<'static>> {
    let eq = body.iter().position(|b| *b == b'=')?;
    let value = body.get(eq + 1..eq + 9)?;
    let word = target_word(value, false).ok()?;
    Some(Command::WriteRegister(word))
}

/// Breakpoint address: exactly 8 hex digits after the first `,`. The
/// `<type>` and `<kind>` fields are ignored (GDB only ever asks for
/// software breakpoints of kind 4 on this target).
fn parse_breakpoint_addr(body: &[u8]) -> Option<u32> {
    let comma = body.iter().position(|b| *b == b',')?;
    let addr = body.get(comma + 1..comma + 9)?;
    decode_hex(addr).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_groups_match_by_substring() {
        assert_eq!(Command::from_body(b"qTStatus"), Command::ReplyEmpty);
        assert_eq!(Command::from_body(b"vMustReplyEmpty"), Command::ReplyEmpty);
        assert_eq!(Command::from_body(b"vCont?"), Command::ReplyEmpty);
        assert_eq!(Command::from_body(b"qSymbol::"), Command::ReplyEmpty);
        assert_eq!(Command::from_body(b"Hg0"), Command::ReplyOk);
        assert_eq!(Command::from_body(b"Hc-1"), Command::ReplyOk);
        assert_eq!(Command::from_body(b"qfThreadInfo"), Command::ReplyOk);
    }

    #[test]
    fn canned_groups_win_over_prefix_dispatch() {
        // starts with 'q' but must hit the empty-response group, and the
        // 'H' packets must never fall through to Unknown
        assert_eq!(Command::from_body(b"qC"), Command::ReplyEmpty);
        assert_eq!(Command::from_body(b"Hc0"), Command::ReplyOk);
    }

    #[test]
    fn xfer_features() {
        assert_eq!(
            Command::from_body(b"qXfer:features:read:target.xml:0,ffb"),
            Command::FeaturesRead {
                offset: 0,
                length: 0xffb
            }
        );
        assert_eq!(
            Command::from_body(b"qXfer:features:read:target.xml:7f2,800"),
            Command::FeaturesRead {
                offset: 0x7f2,
                length: 0x800
            }
        );
        assert_eq!(
            Command::from_body(b"qXfer:features:read:target.xml:zz,1"),
            Command::Malformed
        );
    }

    #[test]
    fn xfer_threads() {
        assert_eq!(
            Command::from_body(b"qXfer:threads:read::0,1000"),
            Command::ThreadsRead
        );
    }

    #[test]
    fn memory_read() {
        assert_eq!(
            Command::from_body(b"m80010100,4"),
            Command::ReadMemory {
                addr: 0x8001_0100,
                len: 4
            }
        );
        assert_eq!(Command::from_body(b"m80010100"), Command::Malformed);
        assert_eq!(Command::from_body(b"mzz,4"), Command::Malformed);
    }

    #[test]
    fn memory_write() {
        assert_eq!(
            Command::from_body(b"M801ff000,4:0d000000"),
            Command::WriteMemory {
                addr: 0x801f_f000,
                len: 4,
                data: vec![0x0d, 0, 0, 0]
            }
        );
        assert_eq!(Command::from_body(b"M801ff000,4"), Command::Malformed);
    }

    #[test]
    fn register_read() {
        assert_eq!(Command::from_body(b"p26"), Command::ReadRegister(0x26));
        assert_eq!(Command::from_body(b"p4a"), Command::ReadRegister(0x4a));
        assert_eq!(Command::from_body(b"p"), Command::Malformed);
    }

    #[test]
    fn register_write_takes_exactly_eight_digits() {
        assert_eq!(
            Command::from_body(b"P25=12345678"),
            Command::WriteRegister([0x12, 0x34, 0x56, 0x78])
        );
        assert_eq!(Command::from_body(b"P25=1234"), Command::Malformed);
    }

    #[test]
    fn breakpoints_ignore_type_and_kind() {
        assert_eq!(
            Command::from_body(b"Z0,80100018,4"),
            Command::InsertBreakpoint(0x8010_0018)
        );
        assert_eq!(
            Command::from_body(b"z0,80100018,4"),
            Command::RemoveBreakpoint(0x8010_0018)
        );
        assert_eq!(Command::from_body(b"Z0,8010,4"), Command::Malformed);
    }

    #[test]
    fn resume_step_halt() {
        assert_eq!(Command::from_body(b"c"), Command::Resume);
        assert_eq!(Command::from_body(b"s"), Command::Step);
        assert_eq!(Command::from_body(b"?"), Command::HaltReason);
    }

    #[test]
    fn late_query_group() {
        assert_eq!(
            Command::from_body(b"qSupported:multiprocess+;xmlRegisters=mips"),
            Command::QSupported
        );
        assert_eq!(Command::from_body(b"qOffsets"), Command::QOffsets);
        assert_eq!(Command::from_body(b"qAttached"), Command::QAttached);
    }

    #[test]
    fn unknown_and_empty_bodies_are_ignored() {
        assert_eq!(Command::from_body(b"vKill;1"), Command::Unknown(&b"vKill;1"[..]));
        assert_eq!(Command::from_body(b""), Command::Unknown(&b""[..]));
    }
}
