#![allow(dead_code)]

use streamcore::audio::{DecodedFrame, FrameData, SampleEncoding, StreamFormat};
use streamcore::decode::{
    Backend, BackendError, ByteSource, ContainerHint, DecodeOutput, MediaKind, OutputMode, Packet,
    StreamCodec, StreamInfo,
};
use streamcore::stream::asf::{FILE_PROPERTIES_GUID, HEADER_OBJECT_GUID};
use streamcore::stream::{InputBuffer, OutputBuffer, SharedInput, SharedOutput};
use streamcore::DecoderConfig;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn format(channels: u8, encoding: SampleEncoding) -> StreamFormat {
    StreamFormat {
        sample_rate: 44100,
        channels,
        encoding,
        frames_per_call: 1024,
    }
}

pub fn s16_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Transport chunk with an empty metadata block
pub fn chunk(chunk_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(12 + payload.len());
    v.extend_from_slice(&chunk_type.to_le_bytes());
    v.extend_from_slice(&((payload.len() + 8) as u16).to_le_bytes());
    v.extend_from_slice(&[0u8; 8]);
    v.extend_from_slice(payload);
    v
}

pub fn file_properties(packet_len: u32) -> Vec<u8> {
    let mut v = FILE_PROPERTIES_GUID.to_vec();
    v.extend_from_slice(&104u64.to_le_bytes());
    v.resize(104, 0);
    v[92..96].copy_from_slice(&packet_len.to_le_bytes());
    v
}

/// Header object wrapping a single file properties record
pub fn asf_header(packet_len: u32) -> Vec<u8> {
    let mut v = HEADER_OBJECT_GUID.to_vec();
    v.extend_from_slice(&(30u64 + 104).to_le_bytes());
    v.extend_from_slice(&1u32.to_le_bytes());
    v.extend_from_slice(&[0x01, 0x02]);
    v.extend(file_properties(packet_len));
    v
}

/// Backend that treats every pulled read as one packet of S16 little-endian samples
pub struct ScriptedBackend {
    pub streams: Vec<StreamInfo>,
    pub format: StreamFormat,
    pub packet_size: usize,
    pub fail_open: bool,
    /// Zero-based packet numbers whose decode fails
    pub failing_packets: Vec<usize>,
    pub hint: Option<ContainerHint>,
    pub opened_stream: Option<usize>,
    pub packets_read: usize,
    pub packets_freed: usize,
    pub closes: usize,
    source: Option<Box<dyn ByteSource>>,
}

impl ScriptedBackend {
    pub fn new(format: StreamFormat) -> Self {
        Self {
            streams: vec![StreamInfo {
                index: 0,
                kind: MediaKind::Audio,
            }],
            format,
            packet_size: 4096,
            fail_open: false,
            failing_packets: Vec::new(),
            hint: None,
            opened_stream: None,
            packets_read: 0,
            packets_freed: 0,
            closes: 0,
            source: None,
        }
    }

    pub fn with_streams(mut self, kinds: &[MediaKind]) -> Self {
        self.streams = kinds
            .iter()
            .enumerate()
            .map(|(index, &kind)| StreamInfo { index, kind })
            .collect();
        self
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }
}

impl Backend for ScriptedBackend {
    fn open_input(
        &mut self,
        source: Box<dyn ByteSource>,
        hint: ContainerHint,
    ) -> Result<(), BackendError> {
        if self.fail_open {
            return Err(BackendError::Open("scripted failure".into()));
        }
        self.source = Some(source);
        self.hint = Some(hint);
        Ok(())
    }

    fn probe_streams(&mut self) -> Result<Vec<StreamInfo>, BackendError> {
        Ok(self.streams.clone())
    }

    fn open_stream(&mut self, index: usize) -> Result<StreamFormat, BackendError> {
        self.opened_stream = Some(index);
        Ok(self.format.clone())
    }

    fn read_packet(&mut self) -> Result<Packet, BackendError> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| BackendError::Other("not open".into()))?;
        let mut buf = vec![0u8; self.packet_size];
        let n = source.read(&mut buf);
        if n == 0 {
            return Err(BackendError::EndOfData);
        }
        buf.truncate(n);
        self.packets_read += 1;
        Ok(Packet {
            stream_index: self.opened_stream.unwrap_or(0),
            data: buf,
        })
    }

    fn decode_frame(&mut self, data: &[u8]) -> Result<DecodeOutput, BackendError> {
        if data.is_empty() {
            return Ok(DecodeOutput {
                consumed: 0,
                frame: None,
            });
        }
        if self.failing_packets.contains(&(self.packets_read - 1)) {
            return Err(BackendError::Decode("scripted failure".into()));
        }

        let samples: Vec<i16> = data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        let channels = self.format.channels.max(1) as usize;
        Ok(DecodeOutput {
            consumed: data.len(),
            frame: Some(DecodedFrame {
                frames: samples.len() / channels,
                data: FrameData::S16(samples),
            }),
        })
    }

    fn free_packet(&mut self, packet: Packet) {
        self.packets_freed += 1;
        drop(packet);
    }

    fn close(&mut self) {
        self.closes += 1;
        self.source = None;
    }
}

pub struct Harness {
    pub codec: StreamCodec<ScriptedBackend>,
    pub input: SharedInput,
    pub output: SharedOutput,
}

pub fn harness(backend: ScriptedBackend, output_bytes: usize, mode: OutputMode) -> Harness {
    init_logging();
    let input = InputBuffer::shared(64 * 1024);
    let output = OutputBuffer::shared(output_bytes);
    let codec = StreamCodec::new(
        backend,
        input.clone(),
        output.clone(),
        mode,
        &DecoderConfig::default(),
    );
    Harness {
        codec,
        input,
        output,
    }
}
