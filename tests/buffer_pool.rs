use streamcore::audio::{BufferPool, SampleEncoding, StreamFormat};

fn stream(frames_per_call: usize) -> StreamFormat {
    StreamFormat {
        sample_rate: 48000,
        channels: 2,
        encoding: SampleEncoding::F32Planar,
        frames_per_call,
    }
}

#[test]
fn test_pool_sized_for_one_decode_call() {
    let pool = BufferPool::for_format(3, &stream(2048));
    assert_eq!(pool.samples_per_buffer(), 4096);
    assert_eq!(pool.available(), 3);
    assert!(pool.get().capacity() >= 4096);
}

#[test]
fn test_unknown_frame_count_still_holds_a_frame() {
    let pool = BufferPool::for_format(1, &stream(0));
    assert_eq!(pool.samples_per_buffer(), 2);
}

#[test]
fn test_returned_buffers_are_cleared_and_keep_growth() {
    let pool = BufferPool::for_format(1, &stream(4));

    let mut buf = pool.get();
    assert_eq!(pool.available(), 0);
    buf.extend_from_slice(&[1 << 16; 64]);
    pool.put(buf);

    let buf = pool.get();
    assert!(buf.is_empty());
    assert!(buf.capacity() >= 64);
}

#[test]
fn test_exhausted_pool_allocates_and_drops_extras() {
    let pool = BufferPool::new(1, 16);
    let a = pool.get();
    let b = pool.get();
    assert!(b.capacity() >= 16);

    pool.put(a);
    pool.put(b);
    assert_eq!(pool.available(), 1);
}
