// ABOUTME: Byte ring buffers shared between the decode core and its producer/consumer threads
// ABOUTME: InputBuffer carries the upstream disconnect flag, OutputBuffer carries track bookkeeping

use crate::audio::types::{BYTES_PER_FRAME, OUTPUT_CHANNELS};
use parking_lot::Mutex;
use ringbuf::traits::{Consumer as _, Observer as _, Producer as _};
use ringbuf::HeapRb;
use std::fmt;
use std::sync::Arc;

/// Input buffer shared with the network reader
pub type SharedInput = Arc<Mutex<InputBuffer>>;
/// Output buffer shared with the audio sink
pub type SharedOutput = Arc<Mutex<OutputBuffer>>;

/// Fixed-capacity byte ring buffer.
///
/// The ring is kept unsplit: producer and consumer share it through the
/// owning mutex, which callers hold for every access.
pub struct RingBuffer {
    inner: HeapRb<u8>,
}

impl RingBuffer {
    /// Create a ring buffer holding up to `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: HeapRb::new(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity().get()
    }

    /// Bytes available to read
    pub fn used(&self) -> usize {
        self.inner.occupied_len()
    }

    /// Bytes free for writing
    pub fn space(&self) -> usize {
        self.inner.vacant_len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Readable bytes before the wrap point
    pub fn cont_read(&self) -> usize {
        self.readable().len()
    }

    /// Writable bytes before the wrap point
    pub fn cont_write(&self) -> usize {
        self.space().min(self.capacity() - self.write_pos())
    }

    /// Read cursor offset
    pub fn read_pos(&self) -> usize {
        self.inner.read_index() % self.capacity()
    }

    /// Write cursor offset
    pub fn write_pos(&self) -> usize {
        self.inner.write_index() % self.capacity()
    }

    /// Contiguous readable run starting at the read cursor
    pub fn readable(&self) -> &[u8] {
        self.inner.as_slices().0
    }

    /// Consume `n` bytes; clamped to what is readable
    pub fn advance_read(&mut self, n: usize) {
        self.inner.skip(n);
    }

    /// Copy as much of `data` as fits, wrapping as needed
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.inner.push_slice(data)
    }

    /// Copy up to `out.len()` bytes out, wrapping as needed
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        self.inner.pop_slice(out)
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("read_pos", &self.read_pos())
            .field("write_pos", &self.write_pos())
            .finish()
    }
}

/// Compressed input fed by the network reader
#[derive(Debug)]
pub struct InputBuffer {
    ring: RingBuffer,
    disconnected: bool,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RingBuffer::new(capacity),
            disconnected: false,
        }
    }

    /// Create a buffer wrapped for sharing with the producer
    pub fn shared(capacity: usize) -> SharedInput {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    pub fn ring_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring
    }

    /// Append bytes received from upstream
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.ring.write(data)
    }

    /// Record whether the upstream connection has closed
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

/// Interleaved stereo 32-bit PCM drained by the audio sink
#[derive(Debug)]
pub struct OutputBuffer {
    ring: RingBuffer,
    track_start: Option<usize>,
    next_sample_rate: u32,
    tracks_started: u64,
}

impl OutputBuffer {
    /// Capacity is rounded up to whole output frames so frames never straddle the wrap point
    pub fn new(capacity: usize) -> Self {
        let frames = capacity.div_ceil(BYTES_PER_FRAME).max(1);
        Self {
            ring: RingBuffer::new(frames * BYTES_PER_FRAME),
            track_start: None,
            next_sample_rate: 0,
            tracks_started: 0,
        }
    }

    /// Create a buffer wrapped for sharing with the sink
    pub fn shared(capacity: usize) -> SharedOutput {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    pub fn ring_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring
    }

    /// Whole frames that fit right now
    pub fn space_frames(&self) -> usize {
        self.ring.space() / BYTES_PER_FRAME
    }

    /// Whole frames buffered
    pub fn used_frames(&self) -> usize {
        self.ring.used() / BYTES_PER_FRAME
    }

    /// Mark the current write cursor as the first sample of a new track
    pub fn begin_track(&mut self, sample_rate: u32) {
        self.next_sample_rate = sample_rate;
        self.track_start = Some(self.ring.write_pos());
        self.tracks_started += 1;
    }

    /// Write cursor offset recorded by the last `begin_track`
    pub fn track_start(&self) -> Option<usize> {
        self.track_start
    }

    /// Sample rate announced by the last `begin_track`
    pub fn next_sample_rate(&self) -> u32 {
        self.next_sample_rate
    }

    pub fn tracks_started(&self) -> u64 {
        self.tracks_started
    }

    /// Write interleaved stereo samples, whole frames only.
    ///
    /// Returns the number of frames written; stops when the buffer is full.
    pub fn write_frames(&mut self, samples: &[i32]) -> usize {
        let frames = (samples.len() / OUTPUT_CHANNELS).min(self.space_frames());
        for sample in &samples[..frames * OUTPUT_CHANNELS] {
            self.ring.write(&sample.to_ne_bytes());
        }
        frames
    }

    /// Drain up to `out.len() / 2` frames as samples, returning frames read
    pub fn read_frames(&mut self, out: &mut [i32]) -> usize {
        let frames = (out.len() / OUTPUT_CHANNELS).min(self.used_frames());
        let mut raw = [0u8; 4];
        for sample in out.iter_mut().take(frames * OUTPUT_CHANNELS) {
            self.ring.read(&mut raw);
            *sample = i32::from_ne_bytes(raw);
        }
        frames
    }
}
