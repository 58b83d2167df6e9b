// ABOUTME: Audio types and processing for streamcore
// ABOUTME: Contains stream format types, the sample converter and the scratch buffer pool

/// Conversion of decoded frames to interleaved stereo 32-bit PCM
pub mod convert;
/// Buffer pool for reusing converted sample buffers
pub mod pool;
/// Core audio type definitions (SampleEncoding, StreamFormat, DecodedFrame)
pub mod types;

pub use convert::{ConversionRule, ConvertError, Layout};
pub use pool::BufferPool;
pub use types::{
    DecodedFrame, FrameData, SampleEncoding, StreamFormat, BYTES_PER_FRAME, OUTPUT_CHANNELS,
};
