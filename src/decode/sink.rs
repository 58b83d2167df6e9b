// ABOUTME: Delivery strategies for converted frames
// ABOUTME: DirectSink writes to the output ring buffer, StagedSink fills a bounded staging buffer

use crate::audio::types::OUTPUT_CHANNELS;
use crate::stream::buffer::SharedOutput;
use parking_lot::Mutex;
use std::sync::Arc;

/// Destination for converted interleaved stereo samples
pub trait FrameSink: Send {
    /// Called before the frames of a new packet are delivered
    fn begin_packet(&mut self) {}

    /// Accept converted samples; returns frames taken now
    fn deliver(&mut self, samples: &[i32]) -> usize;

    /// Push out anything held back; true once nothing is pending
    fn flush(&mut self) -> bool {
        true
    }
}

/// Writes straight to the output ring buffer.
///
/// Frames that do not fit are held and written, in order, before anything else.
pub struct DirectSink {
    output: SharedOutput,
    pending: Vec<i32>,
}

impl DirectSink {
    pub fn new(output: SharedOutput) -> Self {
        Self {
            output,
            pending: Vec::new(),
        }
    }

    /// Frames waiting for output space
    pub fn pending_frames(&self) -> usize {
        self.pending.len() / OUTPUT_CHANNELS
    }
}

impl FrameSink for DirectSink {
    fn deliver(&mut self, samples: &[i32]) -> usize {
        if !self.pending.is_empty() {
            self.pending.extend_from_slice(samples);
            return 0;
        }

        let written = self.output.lock().write_frames(samples);
        if written * OUTPUT_CHANNELS < samples.len() {
            log::debug!(
                "output full, holding {} frames",
                samples.len() / OUTPUT_CHANNELS - written
            );
            self.pending
                .extend_from_slice(&samples[written * OUTPUT_CHANNELS..]);
        }
        written
    }

    fn flush(&mut self) -> bool {
        if self.pending.is_empty() {
            return true;
        }
        let written = self.output.lock().write_frames(&self.pending);
        self.pending.drain(..written * OUTPUT_CHANNELS);
        self.pending.is_empty()
    }
}

/// Bounded buffer of frames awaiting post-processing
#[derive(Debug)]
pub struct StagingBuffer {
    samples: Vec<i32>,
    max_frames: usize,
}

impl StagingBuffer {
    pub fn new(max_frames: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_frames * OUTPUT_CHANNELS),
            max_frames,
        }
    }

    /// Create a buffer wrapped for sharing with the post-processing stage
    pub fn shared(max_frames: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new(max_frames)))
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / OUTPUT_CHANNELS
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Collects a packet's frames into a [`StagingBuffer`].
///
/// The staging buffer is reset at the start of every packet, so the
/// post-processing stage consumes it after each decode call.
pub struct StagedSink {
    staging: Arc<Mutex<StagingBuffer>>,
}

impl StagedSink {
    pub fn new(staging: Arc<Mutex<StagingBuffer>>) -> Self {
        Self { staging }
    }
}

impl FrameSink for StagedSink {
    fn begin_packet(&mut self) {
        self.staging.lock().clear();
    }

    fn deliver(&mut self, samples: &[i32]) -> usize {
        let frames = samples.len() / OUTPUT_CHANNELS;
        let mut staging = self.staging.lock();
        if staging.frames() + frames > staging.max_frames {
            log::warn!("exceeded process buffer size - dropping frames");
            return 0;
        }
        staging
            .samples
            .extend_from_slice(&samples[..frames * OUTPUT_CHANNELS]);
        frames
    }
}
