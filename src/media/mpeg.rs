//! MPEG system streams: transport streams (plain and DLNA timestamped),
//! program streams and bare video elementary streams.
//!
//! Only the head of the file is demuxed. Stream parameters come from the
//! first headers of each elementary stream, the duration from the first
//! presentation timestamp in the head and the last one in the tail.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use crate::error::ClassifyError;
use crate::media::bits::{be_u16, find_start_code, next_start_code};
use crate::media::codecs::{AudioCodec, AudioParams, StreamInfo, VideoCodec, VideoParams};
use crate::media::container::{self, ContainerType};
use crate::media::demux::ProbedMedia;
use crate::media::headers::{self, find_frame, Ac3Header, AdtsHeader, Frame, MpegAudioHeader};

const HEAD_LIMIT: u64 = 4 * 1024 * 1024;
const TAIL_LIMIT: u64 = 512 * 1024;
/// Elementary stream bytes kept per stream for header parsing.
const ES_SAMPLE_LIMIT: usize = 256 * 1024;

const PTS_CLOCK: u64 = 90_000;
const PTS_WRAP: u64 = 1 << 33;

const TS_PACKET: usize = 188;
const TS_PACKET_DLNA: usize = 192;
const TS_SYNC: u8 = 0x47;
const PAT_PID: u16 = 0x0000;
const TABLE_PAT: u8 = 0x00;
const TABLE_PMT: u8 = 0x02;

const PACK_START: u8 = 0xBA;
const PROGRAM_END: u8 = 0xB9;
const PRIVATE_STREAM_1: u8 = 0xBD;

/// Payload type of one elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EsKind {
    MpegVideo,
    Mpeg4Video,
    H264,
    MpegAudio,
    Adts,
    Ac3,
    /// DVD LPCM; the parameters sit in each private stream header.
    Lpcm,
    Other,
}

/// One elementary stream and the bytes collected for it.
#[derive(Debug)]
struct EsTrack {
    /// PID in a transport stream; stream id, or `0xBD00 | substream`, in a
    /// program stream.
    key: u16,
    kind: EsKind,
    started: bool,
    sample: Vec<u8>,
    first_pts: Option<u64>,
    last_pts: Option<u64>,
    lpcm: Option<AudioParams>,
}

impl EsTrack {
    fn new(key: u16, kind: EsKind) -> Self {
        EsTrack {
            key,
            kind,
            started: false,
            sample: Vec::new(),
            first_pts: None,
            last_pts: None,
            lpcm: None,
        }
    }

    fn push(&mut self, pts: Option<u64>, payload: &[u8]) {
        self.started = true;
        if let Some(pts) = pts {
            self.first_pts.get_or_insert(pts);
            self.last_pts = Some(pts);
        }
        let room = ES_SAMPLE_LIMIT.saturating_sub(self.sample.len());
        self.sample.extend_from_slice(&payload[..payload.len().min(room)]);
    }

    fn is_video(&self) -> bool {
        matches!(self.kind, EsKind::MpegVideo | EsKind::Mpeg4Video | EsKind::H264)
    }

    fn describe(&self) -> StreamInfo {
        let video = |parsed: Option<VideoParams>, codec: VideoCodec| {
            StreamInfo::Video(parsed.unwrap_or(VideoParams {
                codec,
                width: 0,
                height: 0,
                frame_rate: None,
                bit_rate: 0,
            }))
        };
        match self.kind {
            EsKind::MpegVideo => video(headers::mpeg_video_sequence(&self.sample), VideoCodec::Mpeg2),
            EsKind::Mpeg4Video => video(headers::mpeg4_video_object_layer(&self.sample), VideoCodec::Mpeg4Part2),
            EsKind::H264 => video(headers::h264_sequence(&self.sample), VideoCodec::H264),
            EsKind::MpegAudio => audio_stream::<MpegAudioHeader>(&self.sample),
            EsKind::Adts => audio_stream::<AdtsHeader>(&self.sample),
            EsKind::Ac3 => audio_stream::<Ac3Header>(&self.sample),
            EsKind::Lpcm => match &self.lpcm {
                Some(params) => StreamInfo::Audio {
                    params: params.clone(),
                    sample_count: None,
                },
                None => StreamInfo::Other,
            },
            EsKind::Other => StreamInfo::Other,
        }
    }
}

fn audio_stream<F: Frame>(sample: &[u8]) -> StreamInfo {
    match find_frame::<F>(sample) {
        Some((_, frame)) => StreamInfo::Audio {
            params: frame.params(),
            sample_count: None,
        },
        None => StreamInfo::Other,
    }
}

/// Demux the head of an MPEG system or video elementary stream file.
pub fn probe(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    let io_err = |e| ClassifyError::io(path, e);
    let mut file = File::open(path).map_err(io_err)?;
    let file_len = file.metadata().map_err(io_err)?.len();
    let head = read_span(&mut file, 0, HEAD_LIMIT).map_err(io_err)?;
    let tail = if file_len > HEAD_LIMIT {
        read_span(&mut file, file_len.saturating_sub(TAIL_LIMIT), TAIL_LIMIT).map_err(io_err)?
    } else {
        Vec::new()
    };

    let layout = container::sniff_mpeg(&head);
    let tracks = match layout {
        ContainerType::MpegTransportStream => demux_transport(&head, TS_PACKET),
        ContainerType::MpegTransportStreamDlna | ContainerType::MpegTransportStreamDlnaNoTimestamp => {
            demux_transport(&head, TS_PACKET_DLNA)
        }
        ContainerType::Mpeg1System => demux_program(&head),
        ContainerType::MpegElementaryStream => {
            let mut track = EsTrack::new(0, EsKind::MpegVideo);
            track.push(None, &head);
            vec![track]
        }
        _ => {
            tracing::debug!("{} does not look like an MPEG stream", path.display());
            return Err(ClassifyError::UnsupportedContent(path.to_owned()));
        }
    };
    let tail_pts = |track: &EsTrack| match layout {
        ContainerType::MpegTransportStream => transport_last_pts(&tail, TS_PACKET, track.key),
        ContainerType::Mpeg1System => program_last_pts(&tail, track.key),
        ContainerType::MpegElementaryStream => None,
        _ => transport_last_pts(&tail, TS_PACKET_DLNA, track.key),
    };
    tracing::debug!("{}: {:?} with {} streams", path.display(), layout, tracks.len());

    let streams: Vec<StreamInfo> = tracks.iter().map(EsTrack::describe).collect();

    // Timed on the first video stream when there is one.
    let timed = tracks
        .iter()
        .filter(|t| t.first_pts.is_some())
        .min_by_key(|t| !t.is_video());
    let mut duration = timed.and_then(|t| {
        let first = t.first_pts?;
        let last = tail_pts(t).or(t.last_pts)?;
        pts_span(first, last)
    });
    if duration.is_none() && layout == ContainerType::MpegElementaryStream {
        duration = match streams.first() {
            Some(StreamInfo::Video(v)) if v.bit_rate > 0 => Some(Duration::from_secs_f64(
                file_len as f64 * 8.0 / f64::from(v.bit_rate),
            )),
            _ => None,
        };
    }
    let bit_rate = duration
        .filter(|d| !d.is_zero())
        .map(|d| (file_len as f64 * 8.0 / d.as_secs_f64()) as u64);

    Ok(ProbedMedia {
        format_name: format_name.to_string(),
        streams,
        tags: BTreeMap::new(),
        duration,
        bit_rate,
    })
}

fn read_span(file: &mut File, start: u64, limit: u64) -> std::io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::new();
    file.by_ref().take(limit).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Time between two 33-bit timestamps, allowing for one wrap.
fn pts_span(first: u64, last: u64) -> Option<Duration> {
    let ticks = (last + PTS_WRAP - first) % PTS_WRAP;
    (ticks > 0).then(|| Duration::from_millis(ticks * 1000 / PTS_CLOCK))
}

// ── PES ──────────────────────────────────────────────────────────────────────

/// Presentation timestamp and payload of the PES packet at the start of
/// `packet`. Handles both the MPEG-2 and the MPEG-1 packet header.
fn pes_payload(packet: &[u8]) -> Option<(Option<u64>, &[u8])> {
    if packet.get(..3)? != [0, 0, 1] {
        return None;
    }
    let body = packet.get(6..)?;
    if body.first()? & 0xC0 == 0x80 {
        let header_len = usize::from(*body.get(2)?);
        let pts = if body[1] & 0x80 != 0 {
            body.get(3..8).map(parse_pts)
        } else {
            None
        };
        return Some((pts, body.get(3 + header_len..)?));
    }

    let mut at = body.iter().take_while(|&&b| b == 0xFF).count();
    if body.get(at)? & 0xC0 == 0x40 {
        at += 2; // STD buffer
    }
    let (pts, skip) = match body.get(at)? >> 4 {
        0x2 => (body.get(at..at + 5).map(parse_pts), 5),
        0x3 => (body.get(at..at + 5).map(parse_pts), 10),
        _ => (None, 1),
    };
    Some((pts, body.get(at + skip..)?))
}

fn parse_pts(b: &[u8]) -> u64 {
    ((u64::from(b[0] >> 1) & 0x07) << 30)
        | (u64::from(b[1]) << 22)
        | (u64::from(b[2] >> 1) << 15)
        | (u64::from(b[3]) << 7)
        | u64::from(b[4] >> 1)
}

// ── Transport stream ─────────────────────────────────────────────────────────

struct TsPacket<'a> {
    pid: u16,
    unit_start: bool,
    payload: &'a [u8],
}

/// 188-byte packets, aligned on the first pair of sync bytes `stride` apart.
fn ts_packets(data: &[u8], stride: usize) -> impl Iterator<Item = &[u8]> + '_ {
    let start = (0..stride.min(data.len()))
        .find(|&i| data[i] == TS_SYNC && data.get(i + stride) == Some(&TS_SYNC));
    start
        .into_iter()
        .flat_map(move |s| data[s..].chunks(stride))
        .filter(|p| p.len() >= TS_PACKET && p[0] == TS_SYNC)
        .map(|p| &p[..TS_PACKET])
}

fn parse_ts_packet(p: &[u8]) -> Option<TsPacket<'_>> {
    let pid = (u16::from(p[1] & 0x1F) << 8) | u16::from(p[2]);
    let control = (p[3] >> 4) & 0x03;
    if control & 0x01 == 0 {
        return None;
    }
    let offset = if control & 0x02 != 0 { 5 + usize::from(p[4]) } else { 4 };
    Some(TsPacket {
        pid,
        unit_start: p[1] & 0x40 != 0,
        payload: p.get(offset..)?,
    })
}

fn demux_transport(data: &[u8], stride: usize) -> Vec<EsTrack> {
    let mut pmt_pid = None;
    let mut tracks: Option<Vec<EsTrack>> = None;

    for packet in ts_packets(data, stride).filter_map(parse_ts_packet) {
        if packet.pid == PAT_PID {
            if pmt_pid.is_none() && packet.unit_start {
                pmt_pid = first_program_map(packet.payload);
            }
            continue;
        }
        if Some(packet.pid) == pmt_pid {
            if tracks.is_none() && packet.unit_start {
                tracks = program_streams(packet.payload);
            }
            continue;
        }
        let Some(track) = tracks
            .as_mut()
            .and_then(|ts| ts.iter_mut().find(|t| t.key == packet.pid))
        else {
            continue;
        };
        if packet.unit_start {
            if let Some((pts, payload)) = pes_payload(packet.payload) {
                track.push(pts, payload);
            }
        } else if track.started {
            track.push(None, packet.payload);
        }
    }

    if tracks.is_none() {
        tracing::debug!("No program map table in the first {} bytes", data.len());
    }
    tracks.unwrap_or_default()
}

/// Last timestamp on `pid` within `data`.
fn transport_last_pts(data: &[u8], stride: usize, pid: u16) -> Option<u64> {
    ts_packets(data, stride)
        .filter_map(parse_ts_packet)
        .filter(|p| p.pid == pid && p.unit_start)
        .filter_map(|p| pes_payload(p.payload)?.0)
        .last()
}

/// Body of a long-form PSI section: after the five syntax bytes, before
/// the CRC.
fn psi_section(payload: &[u8], table_id: u8) -> Option<&[u8]> {
    let pointer = usize::from(*payload.first()?);
    let section = payload.get(1 + pointer..)?;
    if *section.first()? != table_id {
        return None;
    }
    let length = usize::from(be_u16(section, 1)? & 0x0FFF);
    let end = (3 + length).checked_sub(4)?.min(section.len());
    section.get(8..end)
}

fn first_program_map(payload: &[u8]) -> Option<u16> {
    psi_section(payload, TABLE_PAT)?
        .chunks_exact(4)
        .find(|entry| be_u16(entry, 0) != Some(0))
        .and_then(|entry| be_u16(entry, 2))
        .map(|pid| pid & 0x1FFF)
}

fn program_streams(payload: &[u8]) -> Option<Vec<EsTrack>> {
    let body = psi_section(payload, TABLE_PMT)?;
    let info_len = usize::from(be_u16(body, 2)? & 0x0FFF);
    let mut tracks = Vec::new();
    let mut at = 4 + info_len;
    while let (Some(&stream_type), Some(pid), Some(es_info)) =
        (body.get(at), be_u16(body, at + 1), be_u16(body, at + 3))
    {
        let es_info = usize::from(es_info & 0x0FFF);
        let descriptors = body.get(at + 5..at + 5 + es_info).unwrap_or_default();
        tracks.push(EsTrack::new(pid & 0x1FFF, stream_kind(stream_type, descriptors)));
        at += 5 + es_info;
    }
    Some(tracks)
}

fn stream_kind(stream_type: u8, descriptors: &[u8]) -> EsKind {
    match stream_type {
        0x01 | 0x02 => EsKind::MpegVideo,
        0x10 => EsKind::Mpeg4Video,
        0x1B => EsKind::H264,
        0x03 | 0x04 => EsKind::MpegAudio,
        0x0F => EsKind::Adts,
        0x81 => EsKind::Ac3,
        0x06 if has_ac3_descriptor(descriptors) => EsKind::Ac3,
        _ => EsKind::Other,
    }
}

/// DVB AC-3 descriptor, or a registration descriptor naming `AC-3`.
fn has_ac3_descriptor(mut descriptors: &[u8]) -> bool {
    while let [tag, len, rest @ ..] = descriptors {
        let len = usize::from(*len);
        let Some(body) = rest.get(..len) else {
            break;
        };
        if *tag == 0x6A || (*tag == 0x05 && body.starts_with(b"AC-3")) {
            return true;
        }
        descriptors = &rest[len..];
    }
    false
}

// ── Program stream ───────────────────────────────────────────────────────────

fn pack_header_len(pack: &[u8]) -> Option<usize> {
    let marker = *pack.get(4)?;
    if marker >> 6 == 0x01 {
        Some(14 + usize::from(pack.get(13)? & 0x07))
    } else if marker >> 4 == 0x02 {
        Some(12)
    } else {
        None
    }
}

fn demux_program(data: &[u8]) -> Vec<EsTrack> {
    let mut tracks = Vec::new();
    let mut at = 0;
    while let Some(found) = next_start_code(&data[at..]) {
        at += found;
        let Some(&code) = data.get(at + 3) else {
            break;
        };
        match code {
            PACK_START => at += pack_header_len(&data[at..]).unwrap_or(4),
            PROGRAM_END => break,
            PRIVATE_STREAM_1 | 0xC0..=0xEF => {
                let Some(len) = be_u16(data, at + 4) else {
                    break;
                };
                let end = (at + 6 + usize::from(len)).min(data.len());
                if let Some((pts, payload)) = pes_payload(&data[at..end]) {
                    add_program_packet(&mut tracks, code, pts, payload);
                }
                at = end;
            }
            // system header, padding, private stream 2 and the like
            0xBB..=0xFF => at += 6 + be_u16(data, at + 4).map_or(0, usize::from),
            _ => at += 4,
        }
    }
    tracks
}

fn add_program_packet(tracks: &mut Vec<EsTrack>, stream_id: u8, pts: Option<u64>, payload: &[u8]) {
    let (key, kind, data, lpcm) = match (stream_id, payload.first()) {
        (0xE0..=0xEF, _) => (u16::from(stream_id), EsKind::MpegVideo, payload, None),
        (0xC0..=0xDF, _) => (u16::from(stream_id), EsKind::MpegAudio, payload, None),
        (PRIVATE_STREAM_1, Some(&sub)) if (0x80..=0x87).contains(&sub) => (
            0xBD00 | u16::from(sub),
            EsKind::Ac3,
            payload.get(4..).unwrap_or_default(),
            None,
        ),
        (PRIVATE_STREAM_1, Some(&sub)) if (0xA0..=0xA7).contains(&sub) => (
            0xBD00 | u16::from(sub),
            EsKind::Lpcm,
            payload.get(7..).unwrap_or_default(),
            lpcm_params(payload),
        ),
        _ => return,
    };

    let index = match tracks.iter().position(|t| t.key == key) {
        Some(index) => index,
        None => {
            tracks.push(EsTrack::new(key, kind));
            tracks.len() - 1
        }
    };
    let track = &mut tracks[index];
    if track.lpcm.is_none() {
        track.lpcm = lpcm;
    }
    track.push(pts, data);
}

/// Parameters from a DVD LPCM private stream header.
fn lpcm_params(payload: &[u8]) -> Option<AudioParams> {
    let format = *payload.get(5)?;
    let bits_per_sample = match format >> 6 {
        0 => 16,
        1 => 20,
        2 => 24,
        _ => return None,
    };
    let sample_rate = if (format >> 4) & 0x03 == 1 { 96000 } else { 48000 };
    let channels = u32::from(format & 0x07) + 1;
    Some(AudioParams {
        codec: if bits_per_sample == 16 {
            AudioCodec::PcmS16Be
        } else {
            AudioCodec::Other
        },
        channels,
        sample_rate,
        bit_rate: sample_rate * channels * bits_per_sample,
        bits_per_sample,
    })
}

/// Last timestamp of the stream `key` within `data`.
fn program_last_pts(data: &[u8], key: u16) -> Option<u64> {
    let (stream_id, substream) = match key {
        0..=0xFF => (key as u8, None),
        _ => (PRIVATE_STREAM_1, Some(key as u8)),
    };
    let mut last = None;
    let mut at = 0;
    while let Some(found) = find_start_code(&data[at..], stream_id) {
        at += found;
        if let Some((Some(pts), payload)) = pes_payload(&data[at..]) {
            if substream.is_none() || payload.first().copied() == substream {
                last = Some(pts);
            }
        }
        at += 4;
    }
    last
}
