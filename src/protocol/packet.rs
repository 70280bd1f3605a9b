/// Compute the single-byte RSP checksum of a packet payload: the sum of
/// all payload bytes, modulo 256.
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |a, x| a.wrapping_add(*x))
}

/// Frame a payload as `$<payload>#<checksum>`, with the checksum rendered
/// as two lowercase hex digits.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut pkt = Vec::with_capacity(payload.len() + 4);
    pkt.push(b'$');
    pkt.extend_from_slice(payload);
    pkt.push(b'#');
    pkt.extend_from_slice(format!("{:02x}", checksum(payload)).as_bytes());
    pkt
}

/// Upper bound on a single packet body. GDB is told `PacketSize=800`, so
/// anything larger is either line noise or a misbehaving client.
const MAX_BODY_LEN: usize = 4096;

enum State {
    Ready,
    Body,
    Checksum1,
    Checksum2,
}

/// Extracts packet bodies incrementally from a TCP byte stream.
///
/// GDB may coalesce several packets into one segment or split a single
/// packet across segments, so the deframer holds partial frames across
/// reads and yields one complete body per closing checksum digit.
/// `+`/`-` acknowledgement bytes and any garbage preceding a `$` header
/// are consumed without producing a packet.
///
/// Inbound checksums are accepted unconditionally: GDB only ever sends
/// well-formed packets, and the stub never requests retransmission.
pub struct Deframer {
    state: State,
    body: Vec<u8>,
}

impl Deframer {
    pub fn new() -> Deframer {
        Deframer {
            state: State::Ready,
            body: Vec::new(),
        }
    }

    /// Feed a single byte. Returns the packet body (the bytes between `$`
    /// and `#`) once the frame is complete.
    pub fn pump(&mut self, byte: u8) -> Option<Vec<u8>> {
        match self.state {
            State::Ready => {
                match byte {
                    b'$' => self.state = State::Body,
                    b'-' => log::trace!("client nak'd the last response"),
                    _ => {}
                }
                None
            }
            State::Body => {
                if byte == b'#' {
                    self.state = State::Checksum1;
                } else {
                    if self.body.len() >= MAX_BODY_LEN {
                        log::warn!("dropping oversized packet ({}+ bytes)", MAX_BODY_LEN);
                        self.body.clear();
                        self.state = State::Ready;
                        return None;
                    }
                    self.body.push(byte);
                }
                None
            }
            State::Checksum1 => {
                self.state = State::Checksum2;
                None
            }
            State::Checksum2 => {
                self.state = State::Ready;
                let body = core::mem::take(&mut self.body);
                log::trace!(
                    "<-- ${}",
                    core::str::from_utf8(&body).unwrap_or("<invalid packet>")
                );
                Some(body)
            }
        }
    }
}

impl Default for Deframer {
    fn default() -> Self {
        Deframer::new()
    }
}
