use std::io::{BufReader, Cursor};

use dlnadir::media::codecs::{AacObject, AudioCodec, VideoCodec};
use dlnadir::media::elementary::{id3v2_len, scan_frames};
use dlnadir::media::headers::{
    h264_sequence, mpeg_video_sequence, Ac3Header, AdtsHeader, AudioSpecificConfig, Frame, MpegAudioHeader,
};

/// Pack a string of `0`/`1` digits, spaces ignored, into bytes.
fn pack(bits: &str) -> Vec<u8> {
    let bits: Vec<u8> = bits.bytes().filter(|b| *b != b' ').map(|b| b - b'0').collect();
    bits.chunks(8)
        .map(|c| c.iter().enumerate().fold(0u8, |acc, (i, b)| acc | (b << (7 - i))))
        .collect()
}

#[test]
fn test_mpeg_audio_header() {
    let h = MpegAudioHeader::parse(&[0xFF, 0xFB, 0x10, 0xC0]).unwrap();
    assert_eq!(h.codec, AudioCodec::Mp3);
    assert_eq!(h.sample_rate, 44100);
    assert_eq!(h.bit_rate, 32_000);
    assert_eq!(h.channels, 1);
    assert_eq!(h.frame_len(), 104);
    assert_eq!(h.samples(), 1152);

    // MPEG-2 Layer III, 64 kb/s, 22.05 kHz, stereo
    let h = MpegAudioHeader::parse(&[0xFF, 0xF3, 0x80, 0x00]).unwrap();
    assert_eq!(h.sample_rate, 22050);
    assert_eq!(h.bit_rate, 64_000);
    assert_eq!(h.channels, 2);
    assert_eq!(h.frame_len(), 208);
    assert_eq!(h.samples(), 576);

    assert!(MpegAudioHeader::parse(&[0xFF, 0xFB, 0xF0, 0x00]).is_none(), "bad bit rate index");
    assert!(MpegAudioHeader::parse(&[0xFF, 0xEB, 0x10, 0x00]).is_none(), "reserved version");
}

#[test]
fn test_adts_header() {
    // LC, 48 kHz, 6 channels, 400 bytes, two raw blocks
    let b = [0xFF, 0xF1, 0x4D, 0x80, 0x32, 0x1F, 0xFD];
    let h = AdtsHeader::parse(&b).unwrap();
    assert_eq!(h.object_type, 2);
    assert_eq!(h.sample_rate, 48000);
    assert_eq!(h.channels, 6);
    assert_eq!(h.frame_len(), 400);
    assert_eq!(h.samples(), 2048);
    assert_eq!(h.params().codec, AudioCodec::Aac(AacObject::LowComplexity));
}

#[test]
fn test_audio_specific_config() {
    let lc = AudioSpecificConfig::parse(&[0x12, 0x10]).unwrap();
    assert_eq!(lc.object_type, 2);
    assert_eq!(lc.sample_rate, 44100);
    assert_eq!(lc.channels, 2);
    assert_eq!(lc.extension_sample_rate, None);
    assert_eq!(lc.codec(), AudioCodec::Aac(AacObject::LowComplexity));

    // explicit SBR: 24 kHz core, 48 kHz output
    let he = AudioSpecificConfig::parse(&[0x2B, 0x11, 0x88]).unwrap();
    assert_eq!(he.object_type, 5);
    assert_eq!(he.sample_rate, 24000);
    assert_eq!(he.channels, 2);
    assert_eq!(he.extension_sample_rate, Some(48000));
    assert_eq!(he.codec(), AudioCodec::Aac(AacObject::HighEfficiency));

    // escaped object type 42 and an explicit 24-bit sample rate
    let escaped = pack("11111 001010 1111 000000001011101110000000 0001 000");
    let usac = AudioSpecificConfig::parse(&escaped).unwrap();
    assert_eq!(usac.object_type, 42);
    assert_eq!(usac.sample_rate, 48000);
    assert_eq!(usac.channels, 1);
    assert_eq!(usac.codec(), AudioCodec::Other);

    assert!(AudioSpecificConfig::parse(&[0x12]).is_none(), "truncated");
}

#[test]
fn test_ac3_header() {
    // 48 kHz, 448 kb/s, 3/2 with LFE
    let h = Ac3Header::parse(&[0x0B, 0x77, 0, 0, 30, 0x40, 0xE1, 0]).unwrap();
    assert_eq!(h.sample_rate, 48000);
    assert_eq!(h.bit_rate, 448_000);
    assert_eq!(h.channels, 6);
    assert_eq!(h.frame_len(), 1792);

    // 44.1 kHz frames alternate in size; the odd code carries the extra word
    let h = Ac3Header::parse(&[0x0B, 0x77, 0, 0, 0x40 | 21, 0x40, 0x40, 0]).unwrap();
    assert_eq!(h.sample_rate, 44100);
    assert_eq!(h.frame_len(), 836);
    assert_eq!(h.channels, 2);

    assert!(Ac3Header::parse(&[0x0B, 0x77, 0, 0, 30, 0x80, 0xE1, 0]).is_none(), "E-AC-3 bsid");
}

#[test]
fn test_mpeg_video_sequence() {
    let mpeg2 = [
        0x00, 0x00, 0x01, 0xB3, 0x2D, 0x01, 0xE0, 0x24, 0x13, 0x88, 0x20, 0x80, //
        0x00, 0x00, 0x01, 0xB5, 0x14, 0x82, 0x00, 0x01, 0x00, 0x00,
    ];
    let v = mpeg_video_sequence(&mpeg2).unwrap();
    assert_eq!(v.codec, VideoCodec::Mpeg2);
    assert_eq!((v.width, v.height), (720, 480));
    assert_eq!(v.frame_rate, Some((30000, 1001)));
    assert_eq!(v.bit_rate, 8_000_000);

    // no sequence extension, variable rate marker
    let mpeg1 = [0x00, 0x00, 0x01, 0xB3, 0x16, 0x00, 0xF0, 0x14, 0xFF, 0xFF, 0xE0, 0x00];
    let v = mpeg_video_sequence(&mpeg1).unwrap();
    assert_eq!(v.codec, VideoCodec::Mpeg1);
    assert_eq!((v.width, v.height), (352, 240));
    assert_eq!(v.bit_rate, 0);

    assert!(mpeg_video_sequence(&[0x00, 0x00, 0x01, 0x00, 0x12]).is_none());
}

#[test]
fn test_h264_sequence_parameter_set() {
    // Baseline 3.1, 1280x720, no VUI
    let mut es = vec![0x00, 0x00, 0x00, 0x01, 0x67];
    es.extend(pack(
        "01000010 00000000 00011111 1 1 011 010 0 0000001010000 00000101101 1 1 0 0 1 00",
    ));
    let v = h264_sequence(&es).unwrap();
    assert_eq!(v.codec, VideoCodec::H264);
    assert_eq!((v.width, v.height), (1280, 720));
    assert_eq!(v.frame_rate, None);
}

#[test]
fn test_frame_scan_stops_at_trailing_bytes() {
    let mut frame = vec![0xFF, 0xFB, 0x10, 0xC0];
    frame.resize(104, 0);
    let mut data = vec![0u8; 13];
    data.extend(frame.repeat(10));
    data.extend(b"TAG trailing bytes");

    let mut reader = BufReader::new(Cursor::new(data));
    let scan = scan_frames::<MpegAudioHeader, _>(&mut reader).unwrap().unwrap();
    assert_eq!(scan.frames, 10);
    assert_eq!(scan.samples, 11520);
    assert_eq!(scan.bytes, 1040);
    assert!(!scan.variable);
}

#[test]
fn test_id3v2_length() {
    let mut tag = b"ID3\x04\x00\x00\x00\x00\x02\x01".to_vec();
    assert_eq!(id3v2_len(&tag), 10 + 257);
    tag[5] = 0x10;
    assert_eq!(id3v2_len(&tag), 10 + 257 + 10, "footer present");
    assert_eq!(id3v2_len(&[0xFF, 0xFB, 0x10, 0xC0]), 0);
}
