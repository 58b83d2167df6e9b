// ABOUTME: Sample conversion to interleaved stereo 32-bit PCM
// ABOUTME: Rule selection by (channels, encoding) and per-sample shifting, pass-through and float saturation

use crate::audio::types::{FrameData, SampleEncoding, OUTPUT_CHANNELS};
use thiserror::Error;

/// Errors raised while converting a single frame
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConvertError {
    /// Frame payload does not carry the encoding the rule was selected for
    #[error("Frame encoding {found:?} does not match stream encoding {expected:?}")]
    EncodingMismatch {
        expected: SampleEncoding,
        found: SampleEncoding,
    },

    /// Frame payload holds fewer samples than its frame count requires
    #[error("Short frame: need {needed} samples, have {available}")]
    ShortFrame { needed: usize, available: usize },
}

/// Source channel layout
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    Mono,
    Stereo,
}

impl Layout {
    fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Conversion selected once per stream from its format
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConversionRule {
    layout: Layout,
    encoding: SampleEncoding,
}

impl ConversionRule {
    /// Select the rule for a channel count and encoding.
    ///
    /// Returns `None` (and logs) for layouts the converter cannot handle; the
    /// caller skips frames of such streams.
    pub fn select(channels: u8, encoding: SampleEncoding) -> Option<Self> {
        let layout = match channels {
            1 => Layout::Mono,
            2 => Layout::Stereo,
            n => {
                log::warn!("unsupported number of channels: {}", n);
                return None;
            }
        };
        if let SampleEncoding::Other(code) = encoding {
            log::warn!("unsupported sample format: {}", code);
            return None;
        }
        Some(Self { layout, encoding })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    /// Convert `frames` frames of `data`, appending `frames * 2` samples to `out`
    pub fn convert(
        &self,
        data: &FrameData,
        frames: usize,
        out: &mut Vec<i32>,
    ) -> Result<(), ConvertError> {
        if data.encoding() != self.encoding {
            return Err(ConvertError::EncodingMismatch {
                expected: self.encoding,
                found: data.encoding(),
            });
        }

        out.reserve(frames * OUTPUT_CHANNELS);
        match data {
            FrameData::S16(src) => self.interleaved(src, frames, from_s16, out),
            FrameData::S32(src) => self.interleaved(src, frames, |s| s, out),
            FrameData::S16Planar(planes) => self.planar(planes, frames, from_s16, out),
            FrameData::S32Planar(planes) => self.planar(planes, frames, |s| s, out),
            FrameData::F32Planar(planes) => self.planar(planes, frames, from_f32, out),
        }
    }

    fn interleaved<T: Copy>(
        &self,
        src: &[T],
        frames: usize,
        map: impl Fn(T) -> i32,
        out: &mut Vec<i32>,
    ) -> Result<(), ConvertError> {
        let needed = frames * self.layout.channels();
        let src = src.get(..needed).ok_or(ConvertError::ShortFrame {
            needed,
            available: src.len(),
        })?;

        match self.layout {
            Layout::Stereo => {
                for pair in src.chunks_exact(2) {
                    out.push(map(pair[0]));
                    out.push(map(pair[1]));
                }
            }
            Layout::Mono => {
                for &s in src {
                    let v = map(s);
                    out.push(v);
                    out.push(v);
                }
            }
        }
        Ok(())
    }

    fn planar<T: Copy>(
        &self,
        planes: &[Vec<T>],
        frames: usize,
        map: impl Fn(T) -> i32,
        out: &mut Vec<i32>,
    ) -> Result<(), ConvertError> {
        match self.layout {
            Layout::Stereo => {
                let (left, right) = (plane(planes, 0, frames)?, plane(planes, 1, frames)?);
                for (&l, &r) in left.iter().zip(right) {
                    out.push(map(l));
                    out.push(map(r));
                }
            }
            Layout::Mono => {
                for &s in plane(planes, 0, frames)? {
                    let v = map(s);
                    out.push(v);
                    out.push(v);
                }
            }
        }
        Ok(())
    }
}

fn plane<T>(planes: &[Vec<T>], index: usize, frames: usize) -> Result<&[T], ConvertError> {
    let p = planes.get(index).map(Vec::as_slice).unwrap_or(&[]);
    p.get(..frames).ok_or(ConvertError::ShortFrame {
        needed: frames,
        available: p.len(),
    })
}

/// Place a 16-bit sample in the high half of a 32-bit slot
#[inline]
pub fn from_s16(s: i16) -> i32 {
    (s as i32) << 16
}

/// Scale a float sample by 2^31-1, saturating to the i32 range
#[inline]
pub fn from_f32(s: f32) -> i32 {
    let scaled = s as f64 * i32::MAX as f64;
    scaled.clamp(i32::MIN as f64, i32::MAX as f64) as i32
}
