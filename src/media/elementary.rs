//! Bare audio elementary streams: MPEG audio, ADTS, AC-3 and AMR files.
//!
//! Frame-based streams are walked header to header, so the duration and
//! the average bit rate come from the frames actually present.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::Duration;

use crate::error::ClassifyError;
use crate::media::codecs::{AudioCodec, AudioParams, StreamInfo};
use crate::media::demux::ProbedMedia;
use crate::media::headers::{find_frame, Frame};

/// How far into the stream the first frame is searched for.
const SYNC_SEARCH: u64 = 64 * 1024;

/// Totals gathered by walking every frame of a stream.
#[derive(Debug, Clone, Copy)]
pub struct FrameScan<F> {
    pub first: F,
    pub frames: u64,
    pub samples: u64,
    pub bytes: u64,
    /// Set when frames disagree on their header bit rate.
    pub variable: bool,
}

impl<F: Frame> FrameScan<F> {
    pub fn duration(&self) -> Option<Duration> {
        let sample_rate = self.first.params().sample_rate;
        (sample_rate > 0 && self.samples > 0)
            .then(|| Duration::from_secs_f64(self.samples as f64 / f64::from(sample_rate)))
    }

    /// Bits per second over the whole walk.
    pub fn average_bit_rate(&self) -> Option<u32> {
        let secs = self.duration()?.as_secs_f64();
        Some((self.bytes as f64 * 8.0 / secs).round() as u32)
    }

    fn into_probed(self, format_name: &str) -> ProbedMedia {
        let mut params = self.first.params();
        if params.bit_rate == 0 || self.variable {
            params.bit_rate = self.average_bit_rate().unwrap_or(0);
        }
        ProbedMedia {
            format_name: format_name.to_string(),
            streams: vec![StreamInfo::Audio {
                params,
                sample_count: Some(self.samples),
            }],
            tags: BTreeMap::new(),
            duration: self.duration(),
            bit_rate: None,
        }
    }
}

/// Walk frame headers from the reader's position until the data ends or a
/// header fails to parse. `None` when no frame is found near the start.
pub fn scan_frames<F: Frame, R: Read + Seek>(reader: &mut BufReader<R>) -> io::Result<Option<FrameScan<F>>> {
    let origin = reader.stream_position()?;
    let mut window = Vec::new();
    reader.by_ref().take(SYNC_SEARCH).read_to_end(&mut window)?;
    let Some((offset, first)) = find_frame::<F>(&window) else {
        return Ok(None);
    };
    reader.seek(SeekFrom::Start(origin + offset as u64))?;

    let first_bit_rate = first.params().bit_rate;
    let mut scan = FrameScan {
        first,
        frames: 0,
        samples: 0,
        bytes: 0,
        variable: false,
    };
    let mut header = vec![0u8; F::HEADER_LEN];
    loop {
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        let Some(frame) = F::parse(&header) else {
            break;
        };
        scan.frames += 1;
        scan.samples += u64::from(frame.samples());
        scan.bytes += frame.frame_len() as u64;
        scan.variable |= frame.params().bit_rate != first_bit_rate;
        reader.seek_relative(frame.frame_len().saturating_sub(F::HEADER_LEN) as i64)?;
    }
    Ok(Some(scan))
}

/// Length of a leading ID3v2 tag, footer included; `0` when there is none.
pub fn id3v2_len(head: &[u8]) -> u64 {
    if head.len() < 10 || &head[..3] != b"ID3" {
        return 0;
    }
    // synchsafe: seven bits per byte
    let size = head[6..10]
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F));
    let footer = if head[5] & 0x10 != 0 { 10 } else { 0 };
    10 + size + footer
}

/// Probe a file made of back-to-back frames of type `F`, skipping any
/// leading ID3v2 tag.
pub fn probe_framed<F: Frame>(path: &Path, format_name: &str) -> Result<Option<ProbedMedia>, ClassifyError> {
    let io_err = |e| ClassifyError::io(path, e);
    let file = File::open(path).map_err(io_err)?;
    let mut reader = BufReader::new(file);
    let skip = id3v2_len(reader.fill_buf().map_err(io_err)?);
    reader.seek(SeekFrom::Start(skip)).map_err(io_err)?;

    let Some(scan) = scan_frames::<F, _>(&mut reader).map_err(io_err)? else {
        tracing::debug!("No {} frames in {}", format_name, path.display());
        return Ok(None);
    };
    tracing::debug!(
        "{}: {} {} frames, {} samples",
        path.display(),
        scan.frames,
        format_name,
        scan.samples
    );
    Ok(Some(scan.into_probed(format_name)))
}

// ── AMR ──────────────────────────────────────────────────────────────────────

const AMR_NB_MAGIC: &[u8] = b"#!AMR\n";
const AMR_WB_MAGIC: &[u8] = b"#!AMR-WB\n";

/// Frame sizes by frame type, header byte included. `0` marks reserved types.
const AMR_NB_FRAME_SIZES: [usize; 16] = [13, 14, 16, 18, 20, 21, 27, 32, 6, 0, 0, 0, 0, 0, 0, 1];
const AMR_WB_FRAME_SIZES: [usize; 16] = [18, 24, 33, 37, 41, 47, 51, 59, 61, 6, 0, 0, 0, 0, 1, 1];

/// Codec mode bit rates, speech frame types only.
const AMR_NB_BIT_RATES: [u32; 8] = [4750, 5150, 5900, 6700, 7400, 7950, 10200, 12200];
const AMR_WB_BIT_RATES: [u32; 9] = [6600, 8850, 12650, 14250, 15850, 18250, 19850, 23050, 23850];

/// Every AMR frame carries 20 ms of speech.
const AMR_FRAMES_PER_SECOND: u32 = 50;

struct AmrVariant {
    codec: AudioCodec,
    sample_rate: u32,
    frame_sizes: &'static [usize; 16],
    bit_rates: &'static [u32],
}

const AMR_NB: AmrVariant = AmrVariant {
    codec: AudioCodec::AmrNb,
    sample_rate: 8000,
    frame_sizes: &AMR_NB_FRAME_SIZES,
    bit_rates: &AMR_NB_BIT_RATES,
};

const AMR_WB: AmrVariant = AmrVariant {
    codec: AudioCodec::AmrWb,
    sample_rate: 16000,
    frame_sizes: &AMR_WB_FRAME_SIZES,
    bit_rates: &AMR_WB_BIT_RATES,
};

/// Probe an RFC 4867 single-channel AMR storage file. `None` when the magic
/// is missing.
pub fn probe_amr(path: &Path, format_name: &str) -> Result<Option<ProbedMedia>, ClassifyError> {
    let data = std::fs::read(path).map_err(|e| ClassifyError::io(path, e))?;
    let (variant, body) = if let Some(body) = data.strip_prefix(AMR_WB_MAGIC) {
        (&AMR_WB, body)
    } else if let Some(body) = data.strip_prefix(AMR_NB_MAGIC) {
        (&AMR_NB, body)
    } else {
        tracing::debug!("No AMR magic in {}", path.display());
        return Ok(None);
    };

    let mut frames = 0u64;
    let mut bit_rate = 0;
    let mut at = 0;
    while let Some(&header) = body.get(at) {
        let frame_type = usize::from((header >> 3) & 0x0F);
        let size = variant.frame_sizes[frame_type];
        if size == 0 {
            break;
        }
        if bit_rate == 0 {
            bit_rate = variant.bit_rates.get(frame_type).copied().unwrap_or(0);
        }
        frames += 1;
        at += size;
    }
    if frames == 0 {
        return Ok(None);
    }

    let samples_per_frame = u64::from(variant.sample_rate / AMR_FRAMES_PER_SECOND);
    Ok(Some(ProbedMedia {
        format_name: format_name.to_string(),
        streams: vec![StreamInfo::Audio {
            params: AudioParams {
                codec: variant.codec,
                channels: 1,
                sample_rate: variant.sample_rate,
                bit_rate,
                bits_per_sample: 0,
            },
            sample_count: Some(frames * samples_per_frame),
        }],
        tags: BTreeMap::new(),
        duration: Some(Duration::from_millis(frames * 1000 / u64::from(AMR_FRAMES_PER_SECOND))),
        bit_rate: None,
    }))
}

