// ABOUTME: Transport chunk de-framing for chunked container streams
// ABOUTME: Strips chunk headers, learns the packet length from the header chunk, zero-pads short data packets

use crate::stream::asf;
use crate::stream::buffer::RingBuffer;

/// Chunk header: type, length, 8 bytes of transport metadata
pub const CHUNK_HEADER_LEN: usize = 12;
/// Declared chunk length counts the metadata bytes as well as the payload
const CHUNK_METADATA_LEN: usize = 8;

/// Chunk carrying the container header
pub const CHUNK_TYPE_HEADER: u16 = 0x4824;
/// Chunk carrying one container data packet
pub const CHUNK_TYPE_DATA: u16 = 0x4424;

/// Decoded transport chunk header
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_type: u16,
    pub length: u16,
}

impl ChunkHeader {
    /// Parse a raw header; the top bit of the type field is reserved
    pub fn parse(raw: &[u8; CHUNK_HEADER_LEN]) -> Self {
        Self {
            chunk_type: u16::from_le_bytes([raw[0], raw[1]]) & 0x7fff,
            length: u16::from_le_bytes([raw[2], raw[3]]),
        }
    }

    /// Bytes of container data following the header
    pub fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(CHUNK_METADATA_LEN)
    }
}

/// Per-family framing parameters negotiated at open
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FramingParams {
    /// Input is wrapped in transport chunks
    pub chunking: bool,
    /// Stream the server asked us to play, if any
    pub play_stream: Option<usize>,
    /// Stream carrying metadata
    pub metadata_stream: u8,
}

/// De-chunking state for one stream
#[derive(Debug, Default)]
pub struct Dechunker {
    bytes_left: usize,
    pending_padding: usize,
    packet_len: usize,
    stalls: u32,
}

impl Dechunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any chunk in progress and the negotiated packet length
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Payload bytes of the current chunk not yet delivered
    pub fn bytes_left(&self) -> usize {
        self.bytes_left
    }

    /// Zero bytes still owed for the current data packet
    pub fn pending_padding(&self) -> usize {
        self.pending_padding
    }

    /// Packet length recovered from the container header, 0 if unknown
    pub fn packet_len(&self) -> usize {
        self.packet_len
    }

    /// Consecutive pulls that found a partial chunk header
    pub fn stalls(&self) -> u32 {
        self.stalls
    }

    /// Fill `dest` with de-framed container bytes from `input`.
    ///
    /// Never blocks. Returns 0 when nothing can be produced right now.
    pub fn pull(&mut self, input: &mut RingBuffer, dest: &mut [u8]) -> usize {
        let mut bytes = input.cont_read().min(dest.len());

        if self.bytes_left > 0 {
            bytes = bytes.min(self.bytes_left);
            self.bytes_left -= bytes;
        } else if self.pending_padding > 0 {
            let n = self.pending_padding.min(dest.len());
            dest[..n].fill(0);
            self.pending_padding -= n;
            return n;
        } else {
            let header = match read_header(input) {
                Some(header) => header,
                None => {
                    if !input.is_empty() {
                        self.stalls += 1;
                        log::error!(
                            "chunk parser stalled bytes: {} {}",
                            bytes,
                            input.used()
                        );
                    }
                    return 0;
                }
            };
            self.stalls = 0;
            self.start_chunk(header, input);

            let payload = header.payload_len();
            bytes = input.cont_read().min(dest.len());
            if payload <= bytes {
                bytes = payload;
                self.bytes_left = 0;
            } else {
                self.bytes_left = payload - bytes;
            }
        }

        dest[..bytes].copy_from_slice(&input.readable()[..bytes]);
        input.advance_read(bytes);

        if self.bytes_left == 0
            && self.pending_padding > 0
            && bytes + self.pending_padding <= dest.len()
        {
            dest[bytes..bytes + self.pending_padding].fill(0);
            bytes += self.pending_padding;
            self.pending_padding = 0;
        }

        bytes
    }

    fn start_chunk(&mut self, header: ChunkHeader, input: &RingBuffer) {
        match header.chunk_type {
            CHUNK_TYPE_HEADER => {
                let visible = input.cont_read().min(header.payload_len());
                self.packet_len = asf::parse_packet_len(&input.readable()[..visible])
                    .map_or(0, |len| len as usize);
                self.pending_padding = 0;
            }
            CHUNK_TYPE_DATA if self.packet_len > 0 => {
                self.pending_padding = self.packet_len.saturating_sub(header.payload_len());
            }
            other => {
                if other != CHUNK_TYPE_DATA {
                    log::info!("unknown chunk: {:04x}", other);
                }
                self.pending_padding = 0;
            }
        }
    }
}

/// Read a chunk header, in two pieces when it straddles the wrap point
fn read_header(input: &mut RingBuffer) -> Option<ChunkHeader> {
    if input.used() < CHUNK_HEADER_LEN {
        return None;
    }

    let mut raw = [0u8; CHUNK_HEADER_LEN];
    let first = input.cont_read().min(CHUNK_HEADER_LEN);
    raw[..first].copy_from_slice(&input.readable()[..first]);
    input.advance_read(first);

    if first < CHUNK_HEADER_LEN {
        let rest = CHUNK_HEADER_LEN - first;
        raw[first..].copy_from_slice(&input.readable()[..rest]);
        input.advance_read(rest);
    }

    Some(ChunkHeader::parse(&raw))
}
