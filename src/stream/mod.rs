// ABOUTME: Input side of the decode core
// ABOUTME: Ring buffers, container header scanning, chunk de-framing and the backend read adapter

/// Container header scanning for the data packet length
pub mod asf;
/// Byte ring buffers and their shared wrappers
pub mod buffer;
/// Transport chunk de-framing
pub mod chunk;
/// Read adapter bridging backend pulls onto the input buffer
pub mod reader;

pub use buffer::{InputBuffer, OutputBuffer, RingBuffer, SharedInput, SharedOutput};
pub use chunk::{ChunkHeader, Dechunker, FramingParams};
pub use reader::StreamReader;
