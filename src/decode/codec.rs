// ABOUTME: Codec registration and session lifecycle
// ABOUTME: Per-family open entry points, close, and decode dispatch to the live session

use crate::config::DecoderConfig;
use crate::decode::backend::{Backend, ContainerHint};
use crate::decode::session::{DecodeSession, DecodeStatus, SessionParams};
use crate::decode::sink::{DirectSink, FrameSink, StagedSink, StagingBuffer};
use crate::stream::buffer::{SharedInput, SharedOutput};
use crate::stream::chunk::FramingParams;
use parking_lot::Mutex;
use std::sync::Arc;

/// Container families this codec decodes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContainerFamily {
    Wma,
    Alac,
}

impl ContainerFamily {
    pub fn hint(self) -> ContainerHint {
        match self {
            Self::Wma => ContainerHint::Asf,
            Self::Alac => ContainerHint::Mp4,
        }
    }
}

/// Registration record for one codec family
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecDescriptor {
    pub id: char,
    /// Comma-separated type names
    pub types: &'static str,
    pub min_read_bytes: usize,
    pub min_space_bytes: usize,
    pub family: ContainerFamily,
}

impl CodecDescriptor {
    /// Look up the record registered under `name`
    pub fn register(name: &str, config: &DecoderConfig) -> Option<Self> {
        let (id, types, family) = match name {
            "wma" => ('w', "wma,wmap,wmal", ContainerFamily::Wma),
            "alc" => ('l', "alc", ContainerFamily::Alac),
            _ => return None,
        };
        Some(Self {
            id,
            types,
            min_read_bytes: config.read_size,
            min_space_bytes: config.write_size,
            family,
        })
    }

    /// Whether `type_name` is one of this codec's types
    pub fn handles(&self, type_name: &str) -> bool {
        self.types.split(',').any(|t| t == type_name)
    }
}

/// Format parameters from the stream start request, one byte each
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatParams {
    pub size: u8,
    pub rate: u8,
    pub channels: u8,
    pub endianness: u8,
}

/// How decoded frames leave the session
#[derive(Clone)]
pub enum OutputMode {
    /// Straight into the output ring buffer
    Direct,
    /// Into a staging buffer read by a post-processing stage
    Staged(Arc<Mutex<StagingBuffer>>),
}

impl OutputMode {
    /// Staged mode with a buffer sized from `config`
    pub fn staged(config: &DecoderConfig) -> Self {
        Self::Staged(StagingBuffer::shared(config.staging_frames))
    }
}

/// A backend plus the session it is currently decoding
pub struct StreamCodec<B: Backend> {
    backend: B,
    input: SharedInput,
    output: SharedOutput,
    mode: OutputMode,
    pool_size: usize,
    session: Option<DecodeSession>,
}

impl<B: Backend> StreamCodec<B> {
    pub fn new(
        backend: B,
        input: SharedInput,
        output: SharedOutput,
        mode: OutputMode,
        config: &DecoderConfig,
    ) -> Self {
        Self {
            backend,
            input,
            output,
            mode,
            pool_size: config.pool_size,
            session: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> Option<&DecodeSession> {
        self.session.as_ref()
    }

    /// Open for chunked or plain ASF input.
    ///
    /// `size` is `'1'` for chunked transport, `rate` carries the server's
    /// stream number (1-based) and `channels` the metadata stream or `'?'`.
    pub fn open_wma(&mut self, params: FormatParams) {
        let framing = FramingParams {
            chunking: params.size.wrapping_sub(b'0') != 0,
            play_stream: (params.rate as usize).checked_sub(1),
            metadata_stream: if params.channels != b'?' {
                params.channels
            } else {
                0
            },
        };
        log::info!(
            "open wma chunking: {} playstream: {:?} metadatastream: {}",
            framing.chunking,
            framing.play_stream,
            framing.metadata_stream
        );
        self.open_session(ContainerFamily::Wma, framing);
    }

    /// Open for MP4/ALAC input; never chunked
    pub fn open_alac(&mut self, _params: FormatParams) {
        log::info!("open alac");
        self.open_session(ContainerFamily::Alac, FramingParams::default());
    }

    /// Open by family
    pub fn open(&mut self, family: ContainerFamily, params: FormatParams) {
        match family {
            ContainerFamily::Wma => self.open_wma(params),
            ContainerFamily::Alac => self.open_alac(params),
        }
    }

    /// Release the session and backend state; a no-op when nothing is open
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            if session.backend_opened() {
                self.backend.close();
            }
        }
    }

    /// Run one decode step of the open session
    pub fn decode(&mut self) -> DecodeStatus {
        match self.session.as_mut() {
            Some(session) => session.decode(&mut self.backend),
            None => {
                log::error!("decode called with no open session");
                DecodeStatus::Error
            }
        }
    }

    fn open_session(&mut self, family: ContainerFamily, framing: FramingParams) {
        self.close();

        let sink: Box<dyn FrameSink> = match &self.mode {
            OutputMode::Direct => Box::new(DirectSink::new(Arc::clone(&self.output))),
            OutputMode::Staged(staging) => Box::new(StagedSink::new(Arc::clone(staging))),
        };
        let params = SessionParams {
            hint: family.hint(),
            framing,
        };
        self.session = Some(DecodeSession::new(
            params,
            Arc::clone(&self.input),
            Arc::clone(&self.output),
            sink,
            self.pool_size,
        ));
    }
}
