//! Container sniffing: decide which wrapping format a file uses from the
//! demuxer's logical format name, the file extension and, for the MPEG
//! family, the first bytes of the stream.

use serde::Serialize;

use crate::media::mime::FORMAT_MOV_FAMILY;

const MPEG_PACK_HEADER: u8 = 0xBA;
const MPEG_TS_SYNC_CODE: u8 = 0x47;
const MPEG_TS_PACKET_LENGTH: usize = 188;
/// DLNA transport streams prepend a 4-byte timestamp to each TS packet.
const MPEG_TS_PACKET_LENGTH_DLNA: usize = 192;
const DLNA_TIMESTAMP_LENGTH: usize = MPEG_TS_PACKET_LENGTH_DLNA - MPEG_TS_PACKET_LENGTH;

/// Number of leading bytes the sniffer needs to see.
pub const SNIFF_WINDOW: usize = 2 * MPEG_TS_PACKET_LENGTH_DLNA + 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ContainerType {
    Unknown,
    Image,
    /// MPEG-1/2 program stream (pack header present).
    Mpeg1System,
    MpegElementaryStream,
    MpegTransportStream,
    MpegTransportStreamDlna,
    MpegTransportStreamDlnaNoTimestamp,
    Asf,
    Amr,
    Aac,
    Ac3,
    Mp3,
    Wav,
    Mp4,
    ThreeGpp,
    /// Unresolved ISO base media family, before looking at the extension.
    Mov,
    /// Unresolved "mpeg" demuxer family, before byte sniffing.
    FfmpegMpeg,
    /// Unresolved "mpegts" demuxer family, before byte sniffing.
    FfmpegMpegTs,
}

impl ContainerType {
    /// Map a demuxer format name onto a container type without looking at
    /// any bytes. Ambiguous families come back unresolved.
    pub fn from_format_name(name: &str) -> ContainerType {
        match name {
            "image2" => ContainerType::Image,
            "asf" => ContainerType::Asf,
            "amr" => ContainerType::Amr,
            "aac" => ContainerType::Aac,
            "ac3" => ContainerType::Ac3,
            "mp3" => ContainerType::Mp3,
            "wav" => ContainerType::Wav,
            FORMAT_MOV_FAMILY => ContainerType::Mov,
            "mpeg" => ContainerType::FfmpegMpeg,
            "mpegts" => ContainerType::FfmpegMpegTs,
            _ => ContainerType::Unknown,
        }
    }

    pub fn is_transport_stream(self) -> bool {
        matches!(
            self,
            ContainerType::MpegTransportStream
                | ContainerType::MpegTransportStreamDlna
                | ContainerType::MpegTransportStreamDlnaNoTimestamp
        )
    }
}

/// Resolve the container of a file.
///
/// `header` should hold at least [`SNIFF_WINDOW`] bytes from the start of
/// the file; shorter headers are accepted and the missing bytes never match.
pub fn detect(format_name: &str, extension: &str, header: &[u8]) -> ContainerType {
    match ContainerType::from_format_name(format_name) {
        ContainerType::FfmpegMpeg | ContainerType::FfmpegMpegTs => sniff_mpeg(header),
        ContainerType::Mov => mov_variant(extension),
        other => other,
    }
}

/// Byte-level MPEG sniffing. Transport stream checks run first: a sync
/// byte can appear by chance inside PES payloads, never the other way round.
pub fn sniff_mpeg(header: &[u8]) -> ContainerType {
    let at = |i: usize| header.get(i).copied();

    for i in 0..MPEG_TS_PACKET_LENGTH {
        if at(i) == Some(MPEG_TS_SYNC_CODE) && at(i + MPEG_TS_PACKET_LENGTH) == Some(MPEG_TS_SYNC_CODE) {
            return ContainerType::MpegTransportStream;
        }
    }

    for i in 0..MPEG_TS_PACKET_LENGTH_DLNA {
        let second = i + MPEG_TS_PACKET_LENGTH_DLNA;
        if at(i) == Some(MPEG_TS_SYNC_CODE) && at(second) == Some(MPEG_TS_SYNC_CODE) {
            // The first packet may start before its timestamp is in the
            // window; the second packet's timestamp always is.
            let sync = if i >= DLNA_TIMESTAMP_LENGTH { i } else { second };
            let timestamp = &header[sync - DLNA_TIMESTAMP_LENGTH..sync];
            return if timestamp.iter().all(|&b| b == 0) {
                ContainerType::MpegTransportStreamDlnaNoTimestamp
            } else {
                ContainerType::MpegTransportStreamDlna
            };
        }
    }

    if header.starts_with(&[0x00, 0x00, 0x01]) {
        return if at(3) == Some(MPEG_PACK_HEADER) {
            ContainerType::Mpeg1System
        } else {
            ContainerType::MpegElementaryStream
        };
    }

    ContainerType::Unknown
}

/// ISO base media files are told apart by extension only.
pub fn mov_variant(extension: &str) -> ContainerType {
    if ["3gp", "3gpp", "3g2"]
        .iter()
        .any(|e| e.eq_ignore_ascii_case(extension))
    {
        ContainerType::ThreeGpp
    } else {
        ContainerType::Mp4
    }
}
