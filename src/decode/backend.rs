// ABOUTME: Codec backend abstraction
// ABOUTME: Pull-based byte source plus the open/probe/read/decode/free capability set a backend provides

use crate::audio::types::{DecodedFrame, StreamFormat};
use thiserror::Error;

/// Errors reported by a codec backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The byte source has nothing more to give right now
    #[error("End of data")]
    EndOfData,

    /// No demuxer for the requested container
    #[error("Unsupported container: {0}")]
    UnsupportedContainer(String),

    /// Opening the input or a decoder failed
    #[error("Open failed: {0}")]
    Open(String),

    /// A single packet could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Other(String),
}

/// Forward-only, non-blocking byte source the backend pulls container bytes from
pub trait ByteSource: Send {
    /// Fill `buf` with up to `buf.len()` bytes; 0 means nothing is available right now
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Container demuxer hint passed when opening the input
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerHint {
    Asf,
    Mp4,
}

impl ContainerHint {
    /// Demuxer short name
    pub fn name(self) -> &'static str {
        match self {
            Self::Asf => "asf",
            Self::Mp4 => "mp4",
        }
    }
}

/// Kind of an elementary stream found by probing
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Data,
    Other,
}

/// One elementary stream in the container, in declared order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: MediaKind,
}

/// One container packet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    pub stream_index: usize,
    pub data: Vec<u8>,
}

/// Result of one decode call
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeOutput {
    /// Packet bytes consumed by this call
    pub consumed: usize,
    pub frame: Option<DecodedFrame>,
}

/// Codec backend driven by the decode session.
///
/// Implementations wrap a demuxer and entropy decoder. Calls happen on the
/// decode thread; the backend pulls input through the [`ByteSource`] given to
/// [`Backend::open_input`], which takes the input buffer lock itself, so no
/// core lock is held while the backend runs.
pub trait Backend: Send {
    /// Bind a fresh container context to `source`
    fn open_input(
        &mut self,
        source: Box<dyn ByteSource>,
        hint: ContainerHint,
    ) -> Result<(), BackendError>;

    /// Discover elementary streams
    fn probe_streams(&mut self) -> Result<Vec<StreamInfo>, BackendError>;

    /// Open a decoder for stream `index` and report its format
    fn open_stream(&mut self, index: usize) -> Result<StreamFormat, BackendError>;

    /// Read the next container packet of the opened stream
    fn read_packet(&mut self) -> Result<Packet, BackendError>;

    /// Decode from `data`; called with an empty slice to drain buffered frames
    fn decode_frame(&mut self, data: &[u8]) -> Result<DecodeOutput, BackendError>;

    /// Hand a packet back to the backend's allocator
    fn free_packet(&mut self, packet: Packet) {
        drop(packet);
    }

    /// Release the container context, decoder and working storage
    fn close(&mut self);
}
