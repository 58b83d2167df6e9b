// ABOUTME: Scratch buffers for converted frames, sized from the stream format
// ABOUTME: Keeps per-frame conversion out of the allocator once a stream is set up

use crate::audio::types::{StreamFormat, OUTPUT_CHANNELS};
use crossbeam::queue::ArrayQueue;

/// Bounded pool of interleaved stereo sample buffers.
///
/// Each buffer holds one decode call's worth of converted output. Buffers that
/// had to grow past that (an oversized frame) are still returned, so the pool
/// converges on the largest frame the stream produces.
pub struct BufferPool {
    queue: ArrayQueue<Vec<i32>>,
    samples_per_buffer: usize,
}

impl BufferPool {
    /// Pre-allocate `buffers` buffers of `samples_per_buffer` samples each
    pub fn new(buffers: usize, samples_per_buffer: usize) -> Self {
        let queue = ArrayQueue::new(buffers.max(1));
        for _ in 0..buffers {
            let _ = queue.push(Vec::with_capacity(samples_per_buffer));
        }
        Self {
            queue,
            samples_per_buffer,
        }
    }

    /// Pool sized for the frames a stream yields per decode call
    pub fn for_format(buffers: usize, format: &StreamFormat) -> Self {
        Self::new(buffers, format.frames_per_call.max(1) * OUTPUT_CHANNELS)
    }

    /// Take an empty buffer, allocating when all are in use
    pub fn get(&self) -> Vec<i32> {
        self.queue
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.samples_per_buffer))
    }

    /// Hand a buffer back; dropped when the pool is already full
    pub fn put(&self, mut buf: Vec<i32>) {
        buf.clear();
        let _ = self.queue.push(buf);
    }

    pub fn samples_per_buffer(&self) -> usize {
        self.samples_per_buffer
    }

    /// Buffers currently idle
    pub fn available(&self) -> usize {
        self.queue.len()
    }
}
