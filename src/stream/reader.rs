// ABOUTME: Backend read adapter over the shared input buffer
// ABOUTME: Non-blocking pulls, optional de-chunking, and the end-of-stream flag seen by the decode session

use crate::decode::backend::ByteSource;
use crate::stream::buffer::SharedInput;
use crate::stream::chunk::{Dechunker, FramingParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Byte source handed to the backend for one stream
pub struct StreamReader {
    input: SharedInput,
    dechunker: Option<Dechunker>,
    end_of_stream: Arc<AtomicBool>,
}

impl StreamReader {
    /// Create a reader with fresh framing state
    pub fn new(input: SharedInput, params: &FramingParams) -> Self {
        Self {
            input,
            dechunker: params.chunking.then(Dechunker::new),
            end_of_stream: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set when upstream has disconnected and the input is drained
    pub fn end_of_stream_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.end_of_stream)
    }

    pub fn dechunker(&self) -> Option<&Dechunker> {
        self.dechunker.as_ref()
    }
}

impl ByteSource for StreamReader {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock();

        let available = input.ring().cont_read();
        self.end_of_stream
            .store(input.is_disconnected() && available == 0, Ordering::Release);

        match self.dechunker.as_mut() {
            Some(dechunker) => dechunker.pull(input.ring_mut(), buf),
            None => {
                let n = available.min(buf.len());
                buf[..n].copy_from_slice(&input.ring().readable()[..n]);
                input.ring_mut().advance_read(n);
                n
            }
        }
    }
}
