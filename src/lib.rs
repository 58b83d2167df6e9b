// ABOUTME: Main library entry point for streamcore
// ABOUTME: Exports the decode core: ring buffers, chunk de-framing, backend orchestration, PCM conversion

//! # streamcore
//!
//! Streaming audio decode core for a headless player.
//!
//! Compressed audio is pulled from a network-fed input ring buffer, optionally
//! de-framed from a chunked transport, handed to a pluggable codec backend and
//! the decoded frames are converted to interleaved stereo 32-bit PCM written to
//! an output ring buffer (or a staging buffer for post-processing).

#![warn(missing_docs)]

/// Sample formats, conversion and scratch buffer pooling
pub mod audio;
/// Decoder configuration
pub mod config;
/// Backend seam, decode orchestration and codec lifecycle
pub mod decode;
/// Ring buffers, chunk de-framing and the backend read adapter
pub mod stream;

pub use audio::{ConversionRule, SampleEncoding, StreamFormat};
pub use config::DecoderConfig;
pub use decode::{Backend, CodecDescriptor, DecodeStatus, OutputMode, StreamCodec};
pub use stream::{InputBuffer, OutputBuffer, RingBuffer};

/// Result type for streamcore operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for streamcore
pub mod error {
    use crate::decode::BackendError;
    use thiserror::Error;

    /// Error types for session setup and configuration
    #[derive(Error, Debug)]
    pub enum Error {
        /// The backend failed while opening or probing the input
        #[error("Backend error: {0}")]
        Backend(#[from] BackendError),

        /// Probing finished without an audio-typed stream
        #[error("No audio stream found")]
        NoAudioStream,

        /// Decode was requested without an open codec
        #[error("Codec not open")]
        NotOpen,

        /// Configuration could not be parsed
        #[error("Config error: {0}")]
        Config(String),
    }
}
