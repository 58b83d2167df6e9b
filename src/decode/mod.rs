// ABOUTME: Decode side of the core
// ABOUTME: Backend trait, frame sinks, session state machine and codec lifecycle

/// Codec backend abstraction
pub mod backend;
/// Codec registration and open/close lifecycle
pub mod codec;
/// Decode session state machine
pub mod session;
/// Direct and staged frame delivery
pub mod sink;

pub use backend::{
    Backend, BackendError, ByteSource, ContainerHint, DecodeOutput, MediaKind, Packet, StreamInfo,
};
pub use codec::{CodecDescriptor, ContainerFamily, FormatParams, OutputMode, StreamCodec};
pub use session::{DecodeSession, DecodeStatus, ErrorStats, SessionParams, SessionState};
pub use sink::{DirectSink, FrameSink, StagedSink, StagingBuffer};
