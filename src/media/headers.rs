//! Frame and sequence headers of the elementary streams the native
//! demuxers read: MPEG audio, ADTS, AC-3, the MPEG-4 AudioSpecificConfig,
//! MPEG-1/2 video, MPEG-4 Part 2 and H.264.

use crate::media::bits::{find_start_code, next_start_code, strip_emulation_prevention, BitReader};
use crate::media::codecs::{AacObject, AudioCodec, AudioParams, VideoCodec, VideoParams};

/// A self-delimiting audio frame header.
pub trait Frame: Sized {
    /// Bytes needed to parse one header.
    const HEADER_LEN: usize;

    fn parse(bytes: &[u8]) -> Option<Self>;

    /// Whole frame size, header included.
    fn frame_len(&self) -> usize;

    /// Decoded samples per channel.
    fn samples(&self) -> u32;

    fn params(&self) -> AudioParams;
}

/// First header in `data` that is followed by another valid header, or by
/// the end of the data.
pub fn find_frame<F: Frame>(data: &[u8]) -> Option<(usize, F)> {
    (0..data.len()).find_map(|i| {
        let frame = F::parse(&data[i..])?;
        let next = i + frame.frame_len();
        let confirmed = next + F::HEADER_LEN > data.len() || F::parse(&data[next..]).is_some();
        confirmed.then_some((i, frame))
    })
}

// ── MPEG audio ───────────────────────────────────────────────────────────────

const MPEG_AUDIO_SAMPLE_RATES: [u32; 3] = [44100, 48000, 32000];

/// kbps by layer, MPEG-1.
const MPEG1_BIT_RATES: [[u32; 15]; 3] = [
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
];

/// kbps for layer I, then layers II and III, MPEG-2 and 2.5.
const MPEG2_BIT_RATES: [[u32; 15]; 2] = [
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

/// MPEG-1/2/2.5 audio frame header, layers I to III.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpegAudioHeader {
    pub codec: AudioCodec,
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub channels: u32,
    frame_len: usize,
    samples: u32,
}

impl Frame for MpegAudioHeader {
    const HEADER_LEN: usize = 4;

    fn parse(bytes: &[u8]) -> Option<Self> {
        let b = bytes.get(..4)?;
        if b[0] != 0xFF || b[1] & 0xE0 != 0xE0 {
            return None;
        }
        // 0 = MPEG-2.5, 1 reserved, 2 = MPEG-2, 3 = MPEG-1
        let version = (b[1] >> 3) & 0x03;
        let layer = 4 - ((b[1] >> 1) & 0x03);
        let bit_rate_index = usize::from(b[2] >> 4);
        let rate_index = usize::from((b[2] >> 2) & 0x03);
        if version == 1 || layer == 4 || bit_rate_index == 0 || bit_rate_index == 15 || rate_index == 3 {
            return None;
        }

        let mpeg1 = version == 3;
        let sample_rate = MPEG_AUDIO_SAMPLE_RATES[rate_index]
            >> match version {
                3 => 0,
                2 => 1,
                _ => 2,
            };
        let kbps = if mpeg1 {
            MPEG1_BIT_RATES[usize::from(layer) - 1][bit_rate_index]
        } else {
            MPEG2_BIT_RATES[usize::from(layer != 1)][bit_rate_index]
        };
        let bit_rate = kbps * 1000;

        let padding = usize::from((b[2] >> 1) & 1);
        let scaled = |slots: usize| slots * bit_rate as usize / sample_rate as usize;
        let (codec, samples, frame_len) = match layer {
            1 => (AudioCodec::Mp1, 384, (scaled(12) + padding) * 4),
            2 => (AudioCodec::Mp2, 1152, scaled(144) + padding),
            _ if mpeg1 => (AudioCodec::Mp3, 1152, scaled(144) + padding),
            _ => (AudioCodec::Mp3, 576, scaled(72) + padding),
        };

        Some(MpegAudioHeader {
            codec,
            sample_rate,
            bit_rate,
            channels: if b[3] >> 6 == 3 { 1 } else { 2 },
            frame_len,
            samples,
        })
    }

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn samples(&self) -> u32 {
        self.samples
    }

    fn params(&self) -> AudioParams {
        AudioParams {
            codec: self.codec,
            channels: self.channels,
            sample_rate: self.sample_rate,
            bit_rate: self.bit_rate,
            bits_per_sample: 0,
        }
    }
}

// ── AAC ──────────────────────────────────────────────────────────────────────

pub const AAC_SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// Channel count for an MPEG-4 channel configuration. `0` means the layout
/// lives in a program config element and is reported as unknown.
pub fn aac_channels(config: u8) -> u32 {
    match config {
        7 => 8,
        n => u32::from(n),
    }
}

fn aac_codec(object_type: u8) -> AudioCodec {
    AacObject::from_object_type(object_type).map_or(AudioCodec::Other, AudioCodec::Aac)
}

/// ADTS frame header. The bit rate is not stored in the header; frame
/// walkers average it over the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// Audio object type: the 2-bit profile field plus one.
    pub object_type: u8,
    pub sample_rate: u32,
    pub channels: u32,
    frame_len: usize,
    blocks: u32,
}

impl Frame for AdtsHeader {
    const HEADER_LEN: usize = 7;

    fn parse(bytes: &[u8]) -> Option<Self> {
        let b = bytes.get(..7)?;
        if b[0] != 0xFF || b[1] & 0xF6 != 0xF0 {
            return None;
        }
        let header_len = if b[1] & 0x01 == 1 { 7 } else { 9 };
        let frame_len = (usize::from(b[3] & 0x03) << 11) | (usize::from(b[4]) << 3) | usize::from(b[5] >> 5);
        if frame_len < header_len {
            return None;
        }
        let sample_rate = AAC_SAMPLE_RATES.get(usize::from((b[2] & 0x3C) >> 2)).copied()?;
        let channel_config = ((b[2] & 0x01) << 2) | (b[3] >> 6);

        Some(AdtsHeader {
            object_type: (b[2] >> 6) + 1,
            sample_rate,
            channels: aac_channels(channel_config),
            frame_len,
            blocks: u32::from(b[6] & 0x03) + 1,
        })
    }

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn samples(&self) -> u32 {
        1024 * self.blocks
    }

    fn params(&self) -> AudioParams {
        AudioParams {
            codec: aac_codec(self.object_type),
            channels: self.channels,
            sample_rate: self.sample_rate,
            bit_rate: 0,
            bits_per_sample: 0,
        }
    }
}

/// MPEG-4 AudioSpecificConfig, as carried in `esds` boxes and decoder
/// extra data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    pub object_type: u8,
    /// Core sample rate. For explicitly signalled SBR this is the rate
    /// before the SBR upsampling.
    pub sample_rate: u32,
    pub channels: u32,
    /// Output rate of an explicitly signalled SBR or PS stream.
    pub extension_sample_rate: Option<u32>,
}

impl AudioSpecificConfig {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut r = BitReader::new(data);
        let object_type = read_object_type(&mut r)?;
        let sample_rate = read_sample_rate(&mut r)?;
        let channel_config = r.read_bits(4)? as u8;

        let extension_sample_rate = match object_type {
            5 | 29 => Some(read_sample_rate(&mut r)?),
            _ => None,
        };
        Some(AudioSpecificConfig {
            object_type,
            sample_rate,
            channels: aac_channels(channel_config),
            extension_sample_rate,
        })
    }

    pub fn codec(&self) -> AudioCodec {
        aac_codec(self.object_type)
    }
}

fn read_object_type(r: &mut BitReader<'_>) -> Option<u8> {
    match r.read_bits(5)? {
        31 => Some((32 + r.read_bits(6)?) as u8),
        aot => Some(aot as u8),
    }
}

fn read_sample_rate(r: &mut BitReader<'_>) -> Option<u32> {
    match r.read_bits(4)? {
        15 => r.read_bits(24),
        index => AAC_SAMPLE_RATES.get(index as usize).copied(),
    }
}

// ── AC-3 ─────────────────────────────────────────────────────────────────────

const AC3_SAMPLE_RATES: [u32; 3] = [48000, 44100, 32000];
const AC3_BIT_RATES: [u32; 19] = [
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 448, 512, 576, 640,
];
/// Full-bandwidth channels per `acmod`.
const AC3_CHANNELS: [u32; 8] = [2, 1, 2, 3, 3, 4, 4, 5];

/// AC-3 sync frame header (syncinfo plus the start of bsi).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ac3Header {
    pub sample_rate: u32,
    pub bit_rate: u32,
    /// Including the LFE channel.
    pub channels: u32,
    frame_len: usize,
}

impl Frame for Ac3Header {
    const HEADER_LEN: usize = 8;

    fn parse(bytes: &[u8]) -> Option<Self> {
        let b = bytes.get(..8)?;
        if b[..2] != [0x0B, 0x77] {
            return None;
        }
        let fscod = usize::from(b[4] >> 6);
        let frmsizecod = usize::from(b[4] & 0x3F);
        let sample_rate = AC3_SAMPLE_RATES.get(fscod).copied()?;
        let kbps = AC3_BIT_RATES.get(frmsizecod / 2).copied()?;
        // bsid above 8 is E-AC-3 or newer
        if b[5] >> 3 > 8 {
            return None;
        }

        let mut r = BitReader::new(&b[6..]);
        let acmod = r.read_bits(3)? as usize;
        if acmod & 1 != 0 && acmod != 1 {
            r.skip(2)?; // cmixlev
        }
        if acmod & 4 != 0 {
            r.skip(2)?; // surmixlev
        }
        if acmod == 2 {
            r.skip(2)?; // dsurmod
        }
        let lfe = r.read_bits(1)?;

        let words = match fscod {
            0 => kbps as usize * 2,
            1 => kbps as usize * 320 / 147 + (frmsizecod & 1),
            _ => kbps as usize * 3,
        };
        Some(Ac3Header {
            sample_rate,
            bit_rate: kbps * 1000,
            channels: AC3_CHANNELS[acmod] + lfe,
            frame_len: words * 2,
        })
    }

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn samples(&self) -> u32 {
        1536
    }

    fn params(&self) -> AudioParams {
        AudioParams {
            codec: AudioCodec::Ac3,
            channels: self.channels,
            sample_rate: self.sample_rate,
            bit_rate: self.bit_rate,
            bits_per_sample: 0,
        }
    }
}

// ── MPEG-1/2 video ───────────────────────────────────────────────────────────

const MPEG_FRAME_RATES: [(u32, u32); 8] = [
    (24000, 1001),
    (24, 1),
    (25, 1),
    (30000, 1001),
    (30, 1),
    (50, 1),
    (60000, 1001),
    (60, 1),
];

/// Picture parameters from the first sequence header. A sequence extension
/// right after it marks the stream as MPEG-2.
pub fn mpeg_video_sequence(es: &[u8]) -> Option<VideoParams> {
    let at = find_start_code(es, 0xB3)?;
    let mut r = BitReader::new(es.get(at + 4..)?);
    let mut width = r.read_bits(12)?;
    let mut height = r.read_bits(12)?;
    r.skip(4)?; // aspect ratio
    let frame_rate_code = r.read_bits(4)? as usize;
    let mut bit_rate_value = r.read_bits(18)?;
    let mut frame_rate = frame_rate_code
        .checked_sub(1)
        .and_then(|i| MPEG_FRAME_RATES.get(i))
        .copied();

    let mut codec = VideoCodec::Mpeg1;
    let rest = &es[at + 4..];
    if let Some(next) = next_start_code(rest) {
        let ext = rest.get(next + 3..).unwrap_or_default();
        if ext.first() == Some(&0xB5) && ext.get(1).is_some_and(|b| b >> 4 == 1) {
            let mut r = BitReader::new(&ext[1..]);
            r.skip(4 + 8 + 1 + 2)?; // id, profile and level, progressive, chroma
            width |= r.read_bits(2)? << 12;
            height |= r.read_bits(2)? << 12;
            bit_rate_value |= r.read_bits(12)? << 18;
            r.skip(1 + 8 + 1)?; // marker, vbv buffer extension, low delay
            let n = r.read_bits(2)? + 1;
            let d = r.read_bits(5)? + 1;
            frame_rate = frame_rate.map(|(num, den)| (num * n, den * d));
            codec = VideoCodec::Mpeg2;
        }
    }

    // 0x3FFFF marks a variable-rate MPEG-1 stream
    let bit_rate = if bit_rate_value == 0x3FFFF { 0 } else { bit_rate_value.saturating_mul(400) };
    Some(VideoParams {
        codec,
        width,
        height,
        frame_rate,
        bit_rate,
    })
}

// ── MPEG-4 Part 2 ────────────────────────────────────────────────────────────

/// Picture size and fixed frame rate from the first video object layer
/// header. Non-rectangular layers yield no size.
pub fn mpeg4_video_object_layer(es: &[u8]) -> Option<VideoParams> {
    let at = (0..es.len().saturating_sub(3))
        .find(|&i| es[i..i + 3] == [0, 0, 1] && (0x20..=0x2F).contains(&es[i + 3]))?;
    let mut r = BitReader::new(es.get(at + 4..)?);

    r.skip(1 + 8)?; // random_accessible_vol, video_object_type_indication
    let mut verid = 1;
    if r.read_flag()? {
        verid = r.read_bits(4)?;
        r.skip(3)?;
    }
    if r.read_bits(4)? == 15 {
        r.skip(16)?; // extended pixel aspect ratio
    }
    if r.read_flag()? {
        r.skip(2 + 1)?; // chroma_format, low_delay
        if r.read_flag()? {
            r.skip(15 + 1 + 15 + 1 + 15 + 1 + 3 + 11 + 1 + 15 + 1)?; // vbv parameters
        }
    }
    let shape = r.read_bits(2)?;
    if shape == 3 && verid != 1 {
        r.skip(4)?;
    }
    r.skip(1)?;
    let resolution = r.read_bits(16)?;
    r.skip(1)?;
    let mut frame_rate = None;
    if r.read_flag()? {
        let bits = (32 - resolution.saturating_sub(1).leading_zeros()).max(1) as usize;
        let increment = r.read_bits(bits)?;
        if increment > 0 && resolution > 0 {
            frame_rate = Some((resolution, increment));
        }
    }
    if shape != 0 {
        return None;
    }
    r.skip(1)?;
    let width = r.read_bits(13)?;
    r.skip(1)?;
    let height = r.read_bits(13)?;

    Some(VideoParams {
        codec: VideoCodec::Mpeg4Part2,
        width,
        height,
        frame_rate,
        bit_rate: 0,
    })
}

// ── H.264 ────────────────────────────────────────────────────────────────────

const HIGH_PROFILES: [u32; 12] = [100, 110, 122, 244, 44, 83, 86, 118, 128, 138, 139, 134];

/// Picture size and VUI frame rate from the first sequence parameter set of
/// an Annex B stream.
pub fn h264_sequence(es: &[u8]) -> Option<VideoParams> {
    let mut offset = 0;
    while let Some(start) = next_start_code(&es[offset..]) {
        let nal = offset + start + 3;
        let header = *es.get(nal)?;
        if header & 0x1F == 7 {
            let end = next_start_code(&es[nal..]).map_or(es.len(), |e| nal + e);
            let (width, height, frame_rate) = parse_sps(&es[nal + 1..end])?;
            return Some(VideoParams {
                codec: VideoCodec::H264,
                width,
                height,
                frame_rate,
                bit_rate: 0,
            });
        }
        offset = nal;
    }
    None
}

fn parse_sps(payload: &[u8]) -> Option<(u32, u32, Option<(u32, u32)>)> {
    let rbsp = strip_emulation_prevention(payload);
    let mut r = BitReader::new(&rbsp);
    let profile_idc = r.read_bits(8)?;
    r.skip(16)?; // constraint flags, level
    r.read_ue()?; // seq_parameter_set_id

    let mut chroma_format_idc = 1;
    if HIGH_PROFILES.contains(&profile_idc) {
        chroma_format_idc = r.read_ue()?;
        if chroma_format_idc == 3 {
            r.skip(1)?;
        }
        r.read_ue()?;
        r.read_ue()?;
        r.skip(1)?;
        if r.read_flag()? {
            let lists = if chroma_format_idc == 3 { 12 } else { 8 };
            for i in 0..lists {
                if r.read_flag()? {
                    skip_scaling_list(&mut r, if i < 6 { 16 } else { 64 })?;
                }
            }
        }
    }

    r.read_ue()?; // log2_max_frame_num_minus4
    match r.read_ue()? {
        0 => {
            r.read_ue()?;
        }
        1 => {
            r.skip(1)?;
            r.read_se()?;
            r.read_se()?;
            for _ in 0..r.read_ue()? {
                r.read_se()?;
            }
        }
        _ => {}
    }
    r.read_ue()?; // max_num_ref_frames
    r.skip(1)?;
    let width_mbs = r.read_ue()? + 1;
    let height_units = r.read_ue()? + 1;
    let frame_mbs_only = r.read_bits(1)?;
    if frame_mbs_only == 0 {
        r.skip(1)?;
    }
    r.skip(1)?;
    let mut crop = [0u32; 4];
    if r.read_flag()? {
        for c in &mut crop {
            *c = r.read_ue()?;
        }
    }

    let (unit_x, unit_y) = match chroma_format_idc {
        0 | 3 => (1, 2 - frame_mbs_only),
        _ => (2, 2 * (2 - frame_mbs_only)),
    };
    let width = (width_mbs * 16).saturating_sub((crop[0] + crop[1]) * unit_x);
    let height = (height_units * 16 * (2 - frame_mbs_only)).saturating_sub((crop[2] + crop[3]) * unit_y);

    Some((width, height, vui_frame_rate(&mut r)))
}

fn vui_frame_rate(r: &mut BitReader<'_>) -> Option<(u32, u32)> {
    if !r.read_flag()? {
        return None;
    }
    if r.read_flag()? && r.read_bits(8)? == 255 {
        r.skip(32)?; // extended sample aspect ratio
    }
    if r.read_flag()? {
        r.skip(1)?;
    }
    if r.read_flag()? {
        r.skip(4)?;
        if r.read_flag()? {
            r.skip(24)?;
        }
    }
    if r.read_flag()? {
        r.read_ue()?;
        r.read_ue()?;
    }
    if !r.read_flag()? {
        return None;
    }
    let units_in_tick = r.read_bits(32)?;
    let time_scale = r.read_bits(32)?;
    if units_in_tick == 0 || time_scale == 0 {
        return None;
    }
    // one frame is two field ticks
    Some((time_scale, units_in_tick.saturating_mul(2)))
}

fn skip_scaling_list(r: &mut BitReader<'_>, size: usize) -> Option<()> {
    let mut last = 8i32;
    let mut next = 8i32;
    for _ in 0..size {
        if next != 0 {
            next = (last + r.read_se()? + 256) % 256;
        }
        if next != 0 {
            last = next;
        }
    }
    Some(())
}
