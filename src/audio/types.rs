// ABOUTME: Core audio type definitions
// ABOUTME: SampleEncoding, StreamFormat and the typed decoded-frame payload handed over by backends

/// Output frames are interleaved stereo
pub const OUTPUT_CHANNELS: usize = 2;

/// Bytes per output frame (two 32-bit samples)
pub const BYTES_PER_FRAME: usize = OUTPUT_CHANNELS * std::mem::size_of::<i32>();

/// Sample encoding reported by the backend for a stream
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleEncoding {
    /// Signed 16-bit, interleaved
    S16,
    /// Signed 32-bit, interleaved
    S32,
    /// Signed 16-bit, one plane per channel
    S16Planar,
    /// Signed 32-bit, one plane per channel
    S32Planar,
    /// 32-bit float, one plane per channel
    F32Planar,
    /// Backend-specific code with no conversion rule
    Other(u32),
}

impl SampleEncoding {
    /// Whether channels are stored in separate planes
    pub fn is_planar(self) -> bool {
        matches!(self, Self::S16Planar | Self::S32Planar | Self::F32Planar)
    }
}

/// Format of the selected elementary stream, fixed for the stream's lifetime
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u8,
    pub encoding: SampleEncoding,
    /// Typical number of frames produced per decode call
    pub frames_per_call: usize,
}

/// Decoded samples, tagged by their encoding
#[derive(Clone, Debug, PartialEq)]
pub enum FrameData {
    S16(Vec<i16>),
    S32(Vec<i32>),
    S16Planar(Vec<Vec<i16>>),
    S32Planar(Vec<Vec<i32>>),
    F32Planar(Vec<Vec<f32>>),
}

impl FrameData {
    /// Encoding carried by this payload
    pub fn encoding(&self) -> SampleEncoding {
        match self {
            Self::S16(_) => SampleEncoding::S16,
            Self::S32(_) => SampleEncoding::S32,
            Self::S16Planar(_) => SampleEncoding::S16Planar,
            Self::S32Planar(_) => SampleEncoding::S32Planar,
            Self::F32Planar(_) => SampleEncoding::F32Planar,
        }
    }
}

/// One frame as returned by a backend decode call
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    /// Samples per channel
    pub frames: usize,
    pub data: FrameData,
}
