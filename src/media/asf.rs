//! ASF (WMA/WMV) header object parsing.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use crate::error::ClassifyError;
use crate::media::bits::{le_u16, le_u32, le_u64};
use crate::media::codecs::{AudioCodec, AudioParams, StreamInfo, VideoCodec, VideoParams};
use crate::media::demux::ProbedMedia;

type Guid = [u8; 16];

// GUIDs in their on-disk (mixed-endian) byte order.
const HEADER_OBJECT: Guid = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
const FILE_PROPERTIES: Guid = [
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
const STREAM_PROPERTIES: Guid = [
    0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
const CONTENT_DESCRIPTION: Guid = [
    0x33, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
const EXTENDED_CONTENT_DESCRIPTION: Guid = [
    0x40, 0xA4, 0xD0, 0xD2, 0x07, 0xE3, 0xD2, 0x11, 0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50,
];
const AUDIO_MEDIA: Guid = [
    0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];
const VIDEO_MEDIA: Guid = [
    0xC0, 0xEF, 0x19, 0xBC, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];

/// GUID, size.
const OBJECT_HEADER_LEN: usize = 24;
/// Object header, child count, two reserved bytes.
const HEADER_OBJECT_LEN: usize = 30;
/// Upper bound on the header object bytes read.
const HEADER_LIMIT: u64 = 1024 * 1024;

/// Audio codec for a WAVEFORMATEX format tag.
pub fn audio_codec(format_tag: u16) -> AudioCodec {
    match format_tag {
        0x0001 => AudioCodec::PcmS16Le,
        0x0045 | 0x0064 => AudioCodec::G726,
        0x0050 => AudioCodec::Mp2,
        0x0055 => AudioCodec::Mp3,
        0x0160 => AudioCodec::WmaV1,
        0x0161 => AudioCodec::WmaV2,
        0x0162 => AudioCodec::WmaPro,
        0x2000 => AudioCodec::Ac3,
        _ => AudioCodec::Other,
    }
}

/// Video codec for a BITMAPINFOHEADER compression fourcc.
pub fn video_codec(fourcc: &[u8]) -> VideoCodec {
    match fourcc {
        b"WMV3" => VideoCodec::Wmv3,
        b"WVC1" | b"WMVA" => VideoCodec::Vc1,
        b"MP4S" | b"M4S2" => VideoCodec::Mpeg4Part2,
        _ => VideoCodec::Other,
    }
}

/// Read the header object of an ASF file.
pub fn probe(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    let io_err = |e| ClassifyError::io(path, e);
    let mut header = Vec::new();
    File::open(path)
        .map_err(io_err)?
        .take(HEADER_LIMIT)
        .read_to_end(&mut header)
        .map_err(io_err)?;

    let parsed = parse_header(&header, format_name);
    if parsed.is_none() {
        tracing::debug!("No ASF header object in {}", path.display());
    }
    parsed.ok_or_else(|| ClassifyError::UnsupportedContent(path.to_owned()))
}

/// Walk the children of a header object held in `data`.
pub fn parse_header(data: &[u8], format_name: &str) -> Option<ProbedMedia> {
    if data.get(..16)? != HEADER_OBJECT {
        return None;
    }
    let header_len = usize::try_from(le_u64(data, 16)?).ok()?.min(data.len());
    let children = le_u32(data, 24)?;

    let mut probed = ProbedMedia {
        format_name: format_name.to_string(),
        ..ProbedMedia::default()
    };
    let mut at = HEADER_OBJECT_LEN;
    for _ in 0..children {
        let Some(guid) = data.get(at..at + 16) else {
            break;
        };
        let size = usize::try_from(le_u64(data, at + 16)?).ok()?;
        if size < OBJECT_HEADER_LEN {
            break;
        }
        let body = data.get(at + OBJECT_HEADER_LEN..(at + size).min(header_len)).unwrap_or_default();
        if guid == FILE_PROPERTIES {
            file_properties(body, &mut probed);
        } else if guid == STREAM_PROPERTIES {
            if let Some(stream) = stream_properties(body) {
                probed.streams.push(stream);
            }
        } else if guid == CONTENT_DESCRIPTION {
            content_description(body, &mut probed.tags);
        } else if guid == EXTENDED_CONTENT_DESCRIPTION {
            extended_content_description(body, &mut probed.tags);
        }
        at += size;
    }
    Some(probed)
}

fn file_properties(body: &[u8], probed: &mut ProbedMedia) {
    // 100 ns units, preroll in milliseconds
    let play_duration = le_u64(body, 40).unwrap_or(0);
    let preroll = le_u64(body, 56).unwrap_or(0);
    let play = Duration::from_nanos(play_duration.saturating_mul(100));
    let duration = play.saturating_sub(Duration::from_millis(preroll));
    probed.duration = (!duration.is_zero()).then_some(duration);
    probed.bit_rate = le_u32(body, 76).filter(|&b| b > 0).map(u64::from);
}

fn stream_properties(body: &[u8]) -> Option<StreamInfo> {
    let stream_type = body.get(..16)?;
    let specific_len = le_u32(body, 40)? as usize;
    let specific = body.get(54..54 + specific_len)?;

    if stream_type == AUDIO_MEDIA {
        let format_tag = le_u16(specific, 0)?;
        return Some(StreamInfo::Audio {
            params: AudioParams {
                codec: audio_codec(format_tag),
                channels: u32::from(le_u16(specific, 2)?),
                sample_rate: le_u32(specific, 4)?,
                bit_rate: le_u32(specific, 8)?.saturating_mul(8),
                bits_per_sample: u32::from(le_u16(specific, 14)?),
            },
            sample_count: None,
        });
    }
    if stream_type == VIDEO_MEDIA {
        // encoded size, flags, format data size, then a BITMAPINFOHEADER
        return Some(StreamInfo::Video(VideoParams {
            codec: video_codec(specific.get(27..31)?),
            width: le_u32(specific, 0)?,
            height: le_u32(specific, 4)?,
            frame_rate: None,
            bit_rate: 0,
        }));
    }
    Some(StreamInfo::Other)
}

/// UTF-16LE string without its terminating NULs.
fn utf16_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

fn content_description(body: &[u8], tags: &mut BTreeMap<String, String>) {
    const KEYS: [Option<&str>; 5] = [Some("title"), Some("author"), None, Some("comment"), None];

    let mut at = 10;
    for (i, key) in KEYS.iter().enumerate() {
        let Some(len) = le_u16(body, i * 2) else {
            return;
        };
        let len = usize::from(len);
        let Some(bytes) = body.get(at..at + len) else {
            return;
        };
        let value = utf16_string(bytes);
        if let Some(key) = key {
            if !value.is_empty() {
                tags.insert(key.to_string(), value);
            }
        }
        at += len;
    }
}

fn extended_content_description(body: &[u8], tags: &mut BTreeMap<String, String>) {
    let Some(count) = le_u16(body, 0) else {
        return;
    };
    let mut at = 2;
    for _ in 0..count {
        let Some(name_len) = le_u16(body, at).map(usize::from) else {
            return;
        };
        let name = body.get(at + 2..at + 2 + name_len).map(utf16_string);
        at += 2 + name_len;
        let (Some(value_type), Some(value_len)) = (le_u16(body, at), le_u16(body, at + 2)) else {
            return;
        };
        let value_len = usize::from(value_len);
        let raw = body.get(at + 4..at + 4 + value_len).unwrap_or_default();
        at += 4 + value_len;

        let key = match name.as_deref() {
            Some("WM/AlbumTitle") => "album",
            Some("WM/AlbumArtist") => "album_artist",
            Some("WM/Genre") => "genre",
            Some("WM/TrackNumber") => "track",
            _ => continue,
        };
        let value = match value_type {
            0 => utf16_string(raw),
            3 => match le_u32(raw, 0) {
                Some(n) => n.to_string(),
                None => continue,
            },
            _ => continue,
        };
        if !value.is_empty() {
            tags.entry(key.to_string()).or_insert(value);
        }
    }
}
