use dlnadir::media::container::{detect, sniff_mpeg, ContainerType, SNIFF_WINDOW};

const FILLER: u8 = 0xFF;

/// Two 188-byte packets, each starting with a sync byte.
fn ts_header() -> Vec<u8> {
    let mut header = vec![FILLER; SNIFF_WINDOW];
    header[0] = 0x47;
    header[188] = 0x47;
    header
}

/// Two 192-byte packets: a 4-byte timestamp followed by a 188-byte TS packet.
fn dlna_ts_header(timestamp: [u8; 4]) -> Vec<u8> {
    let mut header = vec![FILLER; SNIFF_WINDOW];
    for packet in [0usize, 192] {
        header[packet..packet + 4].copy_from_slice(&timestamp);
        header[packet + 4] = 0x47;
    }
    header
}

#[test]
fn test_188_stride_is_transport_stream() {
    assert_eq!(sniff_mpeg(&ts_header()), ContainerType::MpegTransportStream);
}

#[test]
fn test_188_stride_with_leading_garbage() {
    let mut header = vec![FILLER; SNIFF_WINDOW];
    header[17] = 0x47;
    header[17 + 188] = 0x47;
    assert_eq!(sniff_mpeg(&header), ContainerType::MpegTransportStream);
}

#[test]
fn test_192_stride_with_timestamp_is_dlna() {
    let header = dlna_ts_header([0x00, 0x12, 0x34, 0x56]);
    assert_eq!(sniff_mpeg(&header), ContainerType::MpegTransportStreamDlna);
}

#[test]
fn test_192_stride_with_zero_timestamp() {
    let header = dlna_ts_header([0, 0, 0, 0]);
    assert_eq!(
        sniff_mpeg(&header),
        ContainerType::MpegTransportStreamDlnaNoTimestamp
    );
}

#[test]
fn test_192_stride_starting_mid_timestamp_uses_second_packet() {
    // Sync at offset 2: the first timestamp is cut off, the second one is whole.
    let mut header = vec![FILLER; SNIFF_WINDOW];
    header[2] = 0x47;
    header[190..194].copy_from_slice(&[0, 0, 0, 0]);
    header[194] = 0x47;
    assert_eq!(
        sniff_mpeg(&header),
        ContainerType::MpegTransportStreamDlnaNoTimestamp
    );

    header[191] = 0x01;
    assert_eq!(sniff_mpeg(&header), ContainerType::MpegTransportStreamDlna);
}

#[test]
fn test_pack_header_is_program_stream() {
    let mut header = vec![0x00, 0x00, 0x01, 0xBA];
    header.resize(64, FILLER);
    assert_eq!(sniff_mpeg(&header), ContainerType::Mpeg1System);
}

#[test]
fn test_start_code_without_pack_is_elementary_stream() {
    let mut header = vec![0x00, 0x00, 0x01, 0xB3];
    header.resize(64, FILLER);
    assert_eq!(sniff_mpeg(&header), ContainerType::MpegElementaryStream);
}

#[test]
fn test_unrecognized_bytes_are_unknown() {
    assert_eq!(sniff_mpeg(&[FILLER; SNIFF_WINDOW]), ContainerType::Unknown);
    assert_eq!(sniff_mpeg(&[]), ContainerType::Unknown);
}

#[test]
fn test_short_header_never_matches_transport_stream() {
    // Only the first sync byte is present.
    let header = [0x47u8; 100];
    assert_eq!(sniff_mpeg(&header), ContainerType::Unknown);
}

#[test]
fn test_detect_uses_format_name_before_bytes() {
    let header = ts_header();
    assert_eq!(detect("mp3", "mp3", &header), ContainerType::Mp3);
    assert_eq!(detect("asf", "wmv", &header), ContainerType::Asf);
    assert_eq!(detect("image2", "jpg", &header), ContainerType::Image);
    assert_eq!(detect("mpegts", "ts", &header), ContainerType::MpegTransportStream);
    assert_eq!(detect("matroska", "mkv", &header), ContainerType::Unknown);
}

#[test]
fn test_detect_mov_family_by_extension() {
    let format = dlnadir::media::mime::FORMAT_MOV_FAMILY;
    assert_eq!(detect(format, "3gp", &[]), ContainerType::ThreeGpp);
    assert_eq!(detect(format, "3G2", &[]), ContainerType::ThreeGpp);
    assert_eq!(detect(format, "mp4", &[]), ContainerType::Mp4);
    assert_eq!(detect(format, "m4a", &[]), ContainerType::Mp4);
}

#[test]
fn test_transport_stream_predicate() {
    assert!(ContainerType::MpegTransportStream.is_transport_stream());
    assert!(ContainerType::MpegTransportStreamDlna.is_transport_stream());
    assert!(ContainerType::MpegTransportStreamDlnaNoTimestamp.is_transport_stream());
    assert!(!ContainerType::Mpeg1System.is_transport_stream());
}
