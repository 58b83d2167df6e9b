mod common;

use common::{asf_header, chunk};
use std::sync::atomic::Ordering;
use streamcore::decode::ByteSource;
use streamcore::stream::chunk::{CHUNK_TYPE_DATA, CHUNK_TYPE_HEADER};
use streamcore::stream::{FramingParams, InputBuffer, StreamReader};

fn chunked() -> FramingParams {
    FramingParams {
        chunking: true,
        ..FramingParams::default()
    }
}

#[test]
fn test_plain_read_is_capped_by_request() {
    let input = InputBuffer::shared(64);
    input.lock().push(&[1, 2, 3, 4, 5, 6]);
    let mut reader = StreamReader::new(input.clone(), &FramingParams::default());

    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf), 4);
    assert_eq!(buf, [1, 2, 3, 4]);
    assert_eq!(input.lock().ring().used(), 2);
    assert!(reader.dechunker().is_none());
}

#[test]
fn test_plain_read_is_capped_by_contiguous_run() {
    let input = InputBuffer::shared(8);
    {
        let mut guard = input.lock();
        guard.push(&[0; 6]);
        guard.ring_mut().advance_read(6);
        guard.push(&[1, 2, 3, 4]);
    }
    let mut reader = StreamReader::new(input.clone(), &FramingParams::default());

    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf), 2);
    assert_eq!(reader.read(&mut buf), 2);
    assert_eq!(&buf[..2], &[3, 4]);
}

#[test]
fn test_empty_read_returns_zero_without_waiting() {
    let input = InputBuffer::shared(64);
    let mut reader = StreamReader::new(input, &FramingParams::default());
    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf), 0);
}

#[test]
fn test_end_of_stream_needs_disconnect_and_empty_input() {
    let input = InputBuffer::shared(64);
    input.lock().push(&[9; 4]);
    let mut reader = StreamReader::new(input.clone(), &FramingParams::default());
    let eos = reader.end_of_stream_flag();
    let mut buf = [0u8; 2];

    input.lock().set_disconnected(true);
    reader.read(&mut buf);
    assert!(!eos.load(Ordering::Acquire), "data still buffered");

    reader.read(&mut buf);
    assert!(!eos.load(Ordering::Acquire), "flag reflects state at pull start");

    assert_eq!(reader.read(&mut buf), 0);
    assert!(eos.load(Ordering::Acquire));
}

#[test]
fn test_empty_but_connected_is_not_end_of_stream() {
    let input = InputBuffer::shared(64);
    let mut reader = StreamReader::new(input, &FramingParams::default());
    let mut buf = [0u8; 2];
    reader.read(&mut buf);
    assert!(!reader.end_of_stream_flag().load(Ordering::Acquire));
}

#[test]
fn test_chunked_read_strips_framing_and_pads() {
    let input = InputBuffer::shared(8192);
    let header = asf_header(1024);
    {
        let mut guard = input.lock();
        guard.push(&chunk(CHUNK_TYPE_HEADER, &header));
        guard.push(&chunk(CHUNK_TYPE_DATA, &[0x42; 800]));
    }
    let mut reader = StreamReader::new(input.clone(), &chunked());
    let mut buf = vec![0u8; 4096];

    let n = reader.read(&mut buf);
    assert_eq!(&buf[..n], &header[..]);

    let n = reader.read(&mut buf);
    assert_eq!(n, 1024);
    assert!(buf[..800].iter().all(|&b| b == 0x42));
    assert!(buf[800..1024].iter().all(|&b| b == 0));

    let dechunker = reader.dechunker().unwrap();
    assert_eq!(dechunker.packet_len(), 1024);
    assert!(input.lock().ring().is_empty());
}
