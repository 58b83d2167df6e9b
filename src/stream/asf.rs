// ABOUTME: Container header scanner recovering the fixed data packet length
// ABOUTME: Walks GUID-tagged header records to the file properties record

/// Tag of the top-level header object
pub const HEADER_OBJECT_GUID: [u8; 16] = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];

/// Tag of the file properties record
pub const FILE_PROPERTIES_GUID: [u8; 16] = [
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];

/// Tag plus the low 32 bits of the record size
const RECORD_PREFIX_LEN: usize = 24;
/// Header object prefix: tag, size, record count, two reserved bytes
const HEADER_OBJECT_LEN: usize = 30;
const FILE_PROPERTIES_LEN: usize = 104;
const PACKET_LEN_OFFSET: usize = 92;

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Scan header records in `data` for the data packet length.
///
/// Record sizes are read as their low 32 bits. Scanning ends once the header
/// object's declared size is used up, fewer than 24 bytes remain, or a record
/// runs past `data`.
pub fn parse_packet_len(data: &[u8]) -> Option<u32> {
    let mut pos = 0usize;
    let mut remain: i64 = 1;

    while data.len() - pos >= RECORD_PREFIX_LEN && remain > 0 {
        let record = &data[pos..];
        let tag = &record[..16];
        let len = le_u32(&record[16..20]) as usize;

        if tag == HEADER_OBJECT_GUID && record.len() >= HEADER_OBJECT_LEN {
            pos += HEADER_OBJECT_LEN;
            remain = len as i64 - HEADER_OBJECT_LEN as i64;
            continue;
        }

        if tag == FILE_PROPERTIES_GUID && len == FILE_PROPERTIES_LEN {
            if record.len() < PACKET_LEN_OFFSET + 4 {
                break;
            }
            let packet_len = le_u32(&record[PACKET_LEN_OFFSET..]);
            log::info!("asf packet len: {}", packet_len);
            return Some(packet_len);
        }

        if len < RECORD_PREFIX_LEN || len > record.len() {
            break;
        }
        pos += len;
        remain -= len as i64;
    }

    log::warn!("could not parse packet length");
    None
}
