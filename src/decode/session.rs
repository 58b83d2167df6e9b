// ABOUTME: Decode session state machine
// ABOUTME: First-call stream setup, then one container packet per call through decode, conversion and the sink

use crate::audio::convert::ConversionRule;
use crate::audio::pool::BufferPool;
use crate::audio::types::{DecodedFrame, StreamFormat};
use crate::decode::backend::{Backend, BackendError, ContainerHint, MediaKind, Packet, StreamInfo};
use crate::decode::sink::FrameSink;
use crate::error::Error;
use crate::stream::buffer::{SharedInput, SharedOutput};
use crate::stream::chunk::FramingParams;
use crate::stream::reader::StreamReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where a session is in its lifetime
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Opened, stream not yet set up
    AwaitingNewStream,
    Streaming,
    EndOfStream,
    /// Setup failed; the codec must be closed and reopened
    Error,
}

/// Status returned from each decode call
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    Running,
    Complete,
    Error,
}

/// Backend failure counters; failures never end a session on their own
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorStats {
    /// Failed packet reads or decodes since the last clean packet
    pub consecutive: u32,
    pub total: u64,
    /// Frames dropped because they could not be converted
    pub skipped_frames: u64,
}

/// Fixed per-session parameters chosen at open
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionParams {
    pub hint: ContainerHint,
    pub framing: FramingParams,
}

/// Pick the audio stream to decode.
///
/// A pre-negotiated index wins when it names an audio stream, otherwise the
/// first audio stream in declared order.
pub fn select_audio_stream(streams: &[StreamInfo], preferred: Option<usize>) -> Option<usize> {
    if let Some(stream) = preferred.and_then(|i| streams.get(i)) {
        if stream.kind == MediaKind::Audio {
            log::info!("using stream sent from server: {}", stream.index);
            return Some(stream.index);
        }
    }

    let found = streams.iter().find(|s| s.kind == MediaKind::Audio)?;
    log::info!("found stream: {}", found.index);
    Some(found.index)
}

/// One open decode session
pub struct DecodeSession {
    state: SessionState,
    params: SessionParams,
    input: SharedInput,
    output: SharedOutput,
    sink: Box<dyn FrameSink>,
    pool_size: usize,
    pool: Option<BufferPool>,
    end_of_stream: Arc<AtomicBool>,
    backend_opened: bool,
    stream_index: Option<usize>,
    format: Option<StreamFormat>,
    rule: Option<ConversionRule>,
    errors: ErrorStats,
}

impl DecodeSession {
    pub fn new(
        params: SessionParams,
        input: SharedInput,
        output: SharedOutput,
        sink: Box<dyn FrameSink>,
        pool_size: usize,
    ) -> Self {
        Self {
            state: SessionState::AwaitingNewStream,
            params,
            input,
            output,
            sink,
            pool_size,
            pool: None,
            end_of_stream: Arc::new(AtomicBool::new(false)),
            backend_opened: false,
            stream_index: None,
            format: None,
            rule: None,
            errors: ErrorStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Format of the selected stream, once set up
    pub fn format(&self) -> Option<&StreamFormat> {
        self.format.as_ref()
    }

    pub fn stream_index(&self) -> Option<usize> {
        self.stream_index
    }

    /// Scratch pool sized for the selected stream, once set up
    pub fn pool(&self) -> Option<&BufferPool> {
        self.pool.as_ref()
    }

    pub fn errors(&self) -> ErrorStats {
        self.errors
    }

    /// Whether the backend holds a container context for this session
    pub fn backend_opened(&self) -> bool {
        self.backend_opened
    }

    /// Upstream closed and the input buffer was empty at the last pull
    pub fn end_of_stream(&self) -> bool {
        self.end_of_stream.load(Ordering::Acquire)
    }

    /// Advance the session by one step
    pub fn decode<B: Backend + ?Sized>(&mut self, backend: &mut B) -> DecodeStatus {
        match self.state {
            SessionState::EndOfStream => return DecodeStatus::Complete,
            SessionState::Error => return DecodeStatus::Error,
            SessionState::AwaitingNewStream => {
                if let Err(e) = self.start_stream(backend) {
                    log::warn!("stream setup failed: {}", e);
                    self.state = SessionState::Error;
                    return DecodeStatus::Error;
                }
            }
            SessionState::Streaming => {}
        }

        if !self.sink.flush() {
            return DecodeStatus::Running;
        }

        let packet = match backend.read_packet() {
            Ok(packet) => packet,
            Err(BackendError::EndOfData) => {
                if self.end_of_stream() {
                    log::info!("decode complete");
                    self.state = SessionState::EndOfStream;
                    return DecodeStatus::Complete;
                }
                log::info!("codec end of file");
                return DecodeStatus::Running;
            }
            Err(e) => {
                log::error!("read packet error: {}", e);
                self.record_error();
                return DecodeStatus::Running;
            }
        };

        self.decode_packet(backend, &packet);
        backend.free_packet(packet);

        DecodeStatus::Running
    }

    fn start_stream<B: Backend + ?Sized>(&mut self, backend: &mut B) -> crate::Result<()> {
        let reader = StreamReader::new(Arc::clone(&self.input), &self.params.framing);
        self.end_of_stream = reader.end_of_stream_flag();

        self.backend_opened = true;
        backend.open_input(Box::new(reader), self.params.hint)?;

        let streams = backend.probe_streams()?;
        let index = select_audio_stream(&streams, self.params.framing.play_stream)
            .ok_or(Error::NoAudioStream)?;

        let format = backend.open_stream(index)?;
        log::info!(
            "format: {} rate: {} channels: {} encoding: {:?}",
            self.params.hint.name(),
            format.sample_rate,
            format.channels,
            format.encoding
        );
        self.rule = ConversionRule::select(format.channels, format.encoding);
        self.pool = Some(BufferPool::for_format(self.pool_size, &format));

        {
            let mut output = self.output.lock();
            log::info!("setting track_start");
            output.begin_track(format.sample_rate);
        }

        self.stream_index = Some(index);
        self.format = Some(format);
        self.state = SessionState::Streaming;
        Ok(())
    }

    fn decode_packet<B: Backend + ?Sized>(&mut self, backend: &mut B, packet: &Packet) {
        self.sink.begin_packet();

        let mut remaining: &[u8] = &packet.data;
        let mut got_frame = false;

        while !remaining.is_empty() || got_frame {
            let out = match backend.decode_frame(remaining) {
                Ok(out) => out,
                Err(e) => {
                    log::error!("decode error: {}", e);
                    self.record_error();
                    return;
                }
            };

            let consumed = out.consumed.min(remaining.len());
            remaining = &remaining[consumed..];
            got_frame = out.frame.is_some();

            match out.frame {
                Some(frame) => self.deliver_frame(&frame),
                None if consumed == 0 => break,
                None => {}
            }
        }

        self.errors.consecutive = 0;
    }

    fn deliver_frame(&mut self, frame: &DecodedFrame) {
        let (Some(rule), Some(pool)) = (self.rule, self.pool.as_ref()) else {
            self.errors.skipped_frames += 1;
            return;
        };

        let mut scratch = pool.get();
        match rule.convert(&frame.data, frame.frames, &mut scratch) {
            Ok(()) => {
                let taken = self.sink.deliver(&scratch);
                log::trace!("frames: {} delivered: {}", frame.frames, taken);
            }
            Err(e) => {
                log::warn!("skipping frame: {}", e);
                self.errors.skipped_frames += 1;
            }
        }
        pool.put(scratch);
    }

    fn record_error(&mut self) {
        self.errors.consecutive += 1;
        self.errors.total += 1;
    }
}
