//! Audio codec conformance tables and the audio-only profile families.

use crate::media::codecs::{AacObject, AudioCodec, AudioParams};
use crate::media::container::ContainerType;
use crate::media::mime::{
    LABEL_AUDIO_2CH, LABEL_AUDIO_2CH_MULTI, LABEL_AUDIO_MONO, LABEL_AUDIO_MULTI, MIME_AUDIO_3GP,
    MIME_AUDIO_ADTS, MIME_AUDIO_ATRAC, MIME_AUDIO_DOLBY_DIGITAL, MIME_AUDIO_LPCM, MIME_AUDIO_MPEG,
    MIME_AUDIO_MPEG_4, MIME_AUDIO_WMA,
};
use crate::profiles::{lookup, MediaClass, ProbeContext, ProfileDescriptor, ProfileRule};

/// Sub-profile a single audio stream conforms to.
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AudioProfile {
    Aac,
    Aac320,
    AacMult5,
    Bsac,
    BsacMult5,
    HeAacL2,
    HeAacL2_320,
    HeAacL3,
    HeAacMult5,
    HeAacV2L2,
    HeAacV2L2_320,
    HeAacV2L3,
    HeAacV2Mult5,
    AacLtp,
    AacLtpMult5,
    AacLtpMult7,
    Ac3,
    Amr,
    AmrWb,
    Atrac,
    G726,
    Lpcm,
    Mp2,
    Mp3,
    Mp3Extended,
    WmaBaseline,
    WmaFull,
    WmaPro,
}

impl AudioProfile {
    /// First sub-profile the stream satisfies, trying AAC, AC-3, AMR,
    /// ATRAC, G.726, LPCM, MP2, MP3 and WMA in that order.
    pub fn guess(a: &AudioParams) -> Option<AudioProfile> {
        guess_aac(a)
            .or_else(|| guess_ac3(a))
            .or_else(|| guess_amr(a))
            .or_else(|| guess_atrac(a))
            .or_else(|| guess_g726(a))
            .or_else(|| guess_lpcm(a))
            .or_else(|| guess_mp2(a))
            .or_else(|| guess_mp3(a))
            .or_else(|| guess_wma(a))
    }
}

/// `0` means the demuxer did not report a bit rate.
fn bit_rate_within(bit_rate: u32, min: u32, max: u32) -> bool {
    bit_rate == 0 || (min..=max).contains(&bit_rate)
}

// ── AMR ──────────────────────────────────────────────────────────────────────

const AMR_NB_BIT_RATES: [u32; 8] = [4750, 5150, 5900, 6700, 7400, 7950, 10200, 12200];
const AMR_WB_SAMPLE_RATES: [u32; 5] = [8000, 16000, 24000, 32000, 48000];

/// AMR narrowband: mono, 8 kHz, one of the eight CBR modes.
pub fn is_valid_amr(a: &AudioParams) -> bool {
    a.codec == AudioCodec::AmrNb
        && a.channels == 1
        && a.sample_rate == 8000
        && AMR_NB_BIT_RATES.contains(&a.bit_rate)
}

/// AMR wideband: mono or stereo at 5.2 to 48 kbps.
pub fn is_valid_amr_wb(a: &AudioParams) -> bool {
    a.codec == AudioCodec::AmrWb
        && AMR_WB_SAMPLE_RATES.contains(&a.sample_rate)
        && (5200..=48000).contains(&a.bit_rate)
        && a.channels <= 2
}

pub fn guess_amr(a: &AudioParams) -> Option<AudioProfile> {
    if is_valid_amr(a) {
        Some(AudioProfile::Amr)
    } else if is_valid_amr_wb(a) {
        Some(AudioProfile::AmrWb)
    } else {
        None
    }
}

// ── AAC ──────────────────────────────────────────────────────────────────────

pub fn guess_aac(a: &AudioParams) -> Option<AudioProfile> {
    let AudioCodec::Aac(object) = a.codec else {
        return None;
    };
    if !(8000..=48000).contains(&a.sample_rate) || a.channels == 0 {
        return None;
    }

    let stereo = a.channels <= 2;
    let mult5 = a.channels <= 6;
    match object {
        AacObject::LowComplexity | AacObject::Main => {
            if stereo && bit_rate_within(a.bit_rate, 0, 320_000) {
                Some(AudioProfile::Aac320)
            } else if stereo && a.bit_rate <= 576_000 {
                Some(AudioProfile::Aac)
            } else if mult5 && a.bit_rate <= 1_440_000 {
                Some(AudioProfile::AacMult5)
            } else {
                None
            }
        }
        AacObject::HighEfficiency => {
            if stereo && a.sample_rate <= 24000 {
                if bit_rate_within(a.bit_rate, 0, 320_000) {
                    Some(AudioProfile::HeAacL2_320)
                } else if a.bit_rate <= 576_000 {
                    Some(AudioProfile::HeAacL2)
                } else {
                    None
                }
            } else if stereo {
                Some(AudioProfile::HeAacL3)
            } else if mult5 {
                Some(AudioProfile::HeAacMult5)
            } else {
                None
            }
        }
        AacObject::HighEfficiencyV2 => {
            if stereo && a.sample_rate <= 24000 {
                if bit_rate_within(a.bit_rate, 0, 320_000) {
                    Some(AudioProfile::HeAacV2L2_320)
                } else if a.bit_rate <= 576_000 {
                    Some(AudioProfile::HeAacV2L2)
                } else {
                    None
                }
            } else if stereo {
                Some(AudioProfile::HeAacV2L3)
            } else if mult5 {
                Some(AudioProfile::HeAacV2Mult5)
            } else {
                None
            }
        }
        AacObject::LongTermPrediction => match a.channels {
            1..=2 => Some(AudioProfile::AacLtp),
            3..=6 => Some(AudioProfile::AacLtpMult5),
            7..=8 => Some(AudioProfile::AacLtpMult7),
            _ => None,
        },
        AacObject::Bsac => match a.channels {
            1..=2 => Some(AudioProfile::Bsac),
            3..=6 => Some(AudioProfile::BsacMult5),
            _ => None,
        },
    }
}

// ── Dolby Digital, ATRAC, G.726, LPCM ────────────────────────────────────────

const AC3_SAMPLE_RATES: [u32; 3] = [32000, 44100, 48000];

pub fn guess_ac3(a: &AudioParams) -> Option<AudioProfile> {
    let ok = a.codec == AudioCodec::Ac3
        && (1..=6).contains(&a.channels)
        && AC3_SAMPLE_RATES.contains(&a.sample_rate)
        && (32_000..=640_000).contains(&a.bit_rate);
    ok.then_some(AudioProfile::Ac3)
}

pub fn guess_atrac(a: &AudioParams) -> Option<AudioProfile> {
    (a.codec == AudioCodec::Atrac3).then_some(AudioProfile::Atrac)
}

const G726_BIT_RATES: [u32; 4] = [16_000, 24_000, 32_000, 40_000];

/// G.726 ADPCM: mono, 8 kHz, one of the four code rates. Recognized, but
/// no audio-only family maps it to a profile id.
pub fn guess_g726(a: &AudioParams) -> Option<AudioProfile> {
    let ok = a.codec == AudioCodec::G726
        && a.channels == 1
        && a.sample_rate == 8000
        && G726_BIT_RATES.contains(&a.bit_rate);
    ok.then_some(AudioProfile::G726)
}

pub fn guess_lpcm(a: &AudioParams) -> Option<AudioProfile> {
    let ok = matches!(a.codec, AudioCodec::PcmS16Le | AudioCodec::PcmS16Be)
        && (1..=2).contains(&a.channels)
        && (a.sample_rate == 44100 || a.sample_rate == 48000);
    ok.then_some(AudioProfile::Lpcm)
}

// ── MPEG audio ───────────────────────────────────────────────────────────────

const MPEG1_SAMPLE_RATES: [u32; 3] = [32000, 44100, 48000];
const MP3X_SAMPLE_RATES: [u32; 6] = [16000, 22050, 24000, 32000, 44100, 48000];

pub fn guess_mp2(a: &AudioParams) -> Option<AudioProfile> {
    let ok = a.codec == AudioCodec::Mp2
        && (1..=2).contains(&a.channels)
        && MPEG1_SAMPLE_RATES.contains(&a.sample_rate)
        && bit_rate_within(a.bit_rate, 32_000, 384_000);
    ok.then_some(AudioProfile::Mp2)
}

pub fn guess_mp3(a: &AudioParams) -> Option<AudioProfile> {
    if a.codec != AudioCodec::Mp3 || !(1..=2).contains(&a.channels) {
        return None;
    }
    if MPEG1_SAMPLE_RATES.contains(&a.sample_rate) && bit_rate_within(a.bit_rate, 32_000, 320_000) {
        return Some(AudioProfile::Mp3);
    }
    if MP3X_SAMPLE_RATES.contains(&a.sample_rate) && bit_rate_within(a.bit_rate, 8_000, 320_000) {
        return Some(AudioProfile::Mp3Extended);
    }
    None
}

// ── Windows Media Audio ──────────────────────────────────────────────────────

pub fn guess_wma(a: &AudioParams) -> Option<AudioProfile> {
    match a.codec {
        AudioCodec::WmaV1 | AudioCodec::WmaV2 => {
            if a.sample_rate > 48000 || a.channels > 2 {
                None
            } else if a.bit_rate <= 193_000 {
                Some(AudioProfile::WmaBaseline)
            } else if a.bit_rate <= 385_000 {
                Some(AudioProfile::WmaFull)
            } else {
                None
            }
        }
        AudioCodec::WmaPro => {
            let ok = a.sample_rate <= 96000 && a.channels <= 8 && a.bit_rate <= 1_500_000;
            ok.then_some(AudioProfile::WmaPro)
        }
        _ => None,
    }
}

// ── Families ─────────────────────────────────────────────────────────────────

fn audio_only<'a>(ctx: &ProbeContext<'a>) -> Option<&'a AudioParams> {
    if ctx.codecs.is_audio() {
        ctx.codecs.audio.as_ref()
    } else {
        None
    }
}

const AC3: ProfileDescriptor =
    ProfileDescriptor::new("AC3", MIME_AUDIO_DOLBY_DIGITAL, Some(LABEL_AUDIO_2CH_MULTI));

static AC3_PROFILES: [ProfileDescriptor; 1] = [AC3];

fn probe_ac3(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let a = audio_only(ctx)?;
    guess_ac3(a).map(|_| AC3)
}

pub fn ac3_rule() -> ProfileRule {
    ProfileRule {
        id: "ac3",
        class: MediaClass::Audio,
        extensions: Some("ac3"),
        profiles: &AC3_PROFILES,
        probe: probe_ac3,
    }
}

const AMR_MP4: ProfileDescriptor =
    ProfileDescriptor::new("AMR_3GPP", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MONO));
const AMR_3GPP: ProfileDescriptor =
    ProfileDescriptor::new("AMR_3GPP", MIME_AUDIO_3GP, Some(LABEL_AUDIO_MONO));
const AMR_WBPLUS: ProfileDescriptor =
    ProfileDescriptor::new("AMR_WBplus", MIME_AUDIO_3GP, Some(LABEL_AUDIO_2CH));

static AMR_PROFILES: [ProfileDescriptor; 3] = [AMR_MP4, AMR_3GPP, AMR_WBPLUS];

fn probe_amr(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let a = audio_only(ctx)?;
    if is_valid_amr(a) {
        if ctx.extension.eq_ignore_ascii_case("3gp") {
            return Some(AMR_3GPP);
        }
        return Some(AMR_MP4);
    }
    is_valid_amr_wb(a).then_some(AMR_WBPLUS)
}

pub fn amr_rule() -> ProfileRule {
    ProfileRule {
        id: "amr",
        class: MediaClass::Audio,
        extensions: Some("amr,3gp,mp4"),
        profiles: &AMR_PROFILES,
        probe: probe_amr,
    }
}

const ATRAC3: ProfileDescriptor =
    ProfileDescriptor::new("ATRAC3plus", MIME_AUDIO_ATRAC, Some(LABEL_AUDIO_2CH_MULTI));

static ATRAC3_PROFILES: [ProfileDescriptor; 1] = [ATRAC3];

fn probe_atrac3(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    // a bare ATRAC3 stream, nothing else in the file
    if ctx.codecs.stream_count > 1 {
        return None;
    }
    let a = audio_only(ctx)?;
    guess_atrac(a).map(|_| ATRAC3)
}

pub fn atrac3_rule() -> ProfileRule {
    ProfileRule {
        id: "atrac3",
        class: MediaClass::Audio,
        extensions: Some("acm,wav"),
        profiles: &ATRAC3_PROFILES,
        probe: probe_atrac3,
    }
}

const LPCM: ProfileDescriptor =
    ProfileDescriptor::new("LPCM", MIME_AUDIO_LPCM, Some(LABEL_AUDIO_2CH));

static LPCM_PROFILES: [ProfileDescriptor; 1] = [LPCM];

fn probe_lpcm(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let a = audio_only(ctx)?;
    guess_lpcm(a).map(|_| LPCM)
}

pub fn lpcm_rule() -> ProfileRule {
    ProfileRule {
        id: "lpcm",
        class: MediaClass::Audio,
        extensions: Some("pcm,lpcm,wav,aiff"),
        profiles: &LPCM_PROFILES,
        probe: probe_lpcm,
    }
}

const MP3: ProfileDescriptor = ProfileDescriptor::new("MP3", MIME_AUDIO_MPEG, Some(LABEL_AUDIO_2CH));
const MP3X: ProfileDescriptor = ProfileDescriptor::new("MP3X", MIME_AUDIO_MPEG, Some(LABEL_AUDIO_2CH));

static MP3_PROFILES: [ProfileDescriptor; 2] = [MP3, MP3X];

fn probe_mp3(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    if ctx.container != ContainerType::Mp3 {
        return None;
    }
    let a = audio_only(ctx)?;
    match guess_mp3(a)? {
        AudioProfile::Mp3 => Some(MP3),
        AudioProfile::Mp3Extended => Some(MP3X),
        _ => None,
    }
}

pub fn mp3_rule() -> ProfileRule {
    ProfileRule {
        id: "mp3",
        class: MediaClass::Audio,
        extensions: Some("mp3"),
        profiles: &MP3_PROFILES,
        probe: probe_mp3,
    }
}

static AAC_PROFILES: [ProfileDescriptor; 28] = [
    // ADTS elementary streams
    ProfileDescriptor::new("AAC_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("AAC_ADTS_320", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("AAC_MULT5_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("HEAAC_L2_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_L2_ADTS_320", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_L3_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_MULT5_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("HEAAC_V2_L2_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_L2_320_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_L3_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_MULT5_ADTS", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_MULTI)),
    // MP4 / 3GPP wrapped
    ProfileDescriptor::new("AAC_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("AAC_ISO_320", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("AAC_MULT5_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("HEAAC_L2_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_L2_ISO_320", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_L3_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_MULT5_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("HEAAC_V2_L2", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_L2_320", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_L3", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("HEAAC_V2_MULT5", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("AAC_LTP_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("AAC_LTP_MULT5_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("AAC_LTP_MULT7_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("BSAC_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_2CH)),
    ProfileDescriptor::new("BSAC_MULT5_ISO", MIME_AUDIO_MPEG_4, Some(LABEL_AUDIO_MULTI)),
    ProfileDescriptor::new("AAC_RAW", MIME_AUDIO_ADTS, Some(LABEL_AUDIO_2CH)),
];

fn aac_adts_id(profile: AudioProfile) -> Option<&'static str> {
    Some(match profile {
        AudioProfile::Aac => "AAC_ADTS",
        AudioProfile::Aac320 => "AAC_ADTS_320",
        AudioProfile::AacMult5 => "AAC_MULT5_ADTS",
        AudioProfile::HeAacL2 => "HEAAC_L2_ADTS",
        AudioProfile::HeAacL2_320 => "HEAAC_L2_ADTS_320",
        AudioProfile::HeAacL3 => "HEAAC_L3_ADTS",
        AudioProfile::HeAacMult5 => "HEAAC_MULT5_ADTS",
        AudioProfile::HeAacV2L2 => "HEAAC_V2_L2_ADTS",
        AudioProfile::HeAacV2L2_320 => "HEAAC_V2_L2_320_ADTS",
        AudioProfile::HeAacV2L3 => "HEAAC_V2_L3_ADTS",
        AudioProfile::HeAacV2Mult5 => "HEAAC_V2_MULT5_ADTS",
        _ => return None,
    })
}

fn aac_iso_id(profile: AudioProfile) -> Option<&'static str> {
    Some(match profile {
        AudioProfile::Aac => "AAC_ISO",
        AudioProfile::Aac320 => "AAC_ISO_320",
        AudioProfile::AacMult5 => "AAC_MULT5_ISO",
        AudioProfile::HeAacL2 => "HEAAC_L2_ISO",
        AudioProfile::HeAacL2_320 => "HEAAC_L2_ISO_320",
        AudioProfile::HeAacL3 => "HEAAC_L3_ISO",
        AudioProfile::HeAacMult5 => "HEAAC_MULT5_ISO",
        AudioProfile::HeAacV2L2 => "HEAAC_V2_L2",
        AudioProfile::HeAacV2L2_320 => "HEAAC_V2_L2_320",
        AudioProfile::HeAacV2L3 => "HEAAC_V2_L3",
        AudioProfile::HeAacV2Mult5 => "HEAAC_V2_MULT5",
        AudioProfile::AacLtp => "AAC_LTP_ISO",
        AudioProfile::AacLtpMult5 => "AAC_LTP_MULT5_ISO",
        AudioProfile::AacLtpMult7 => "AAC_LTP_MULT7_ISO",
        AudioProfile::Bsac => "BSAC_ISO",
        AudioProfile::BsacMult5 => "BSAC_MULT5_ISO",
        _ => return None,
    })
}

fn probe_aac(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let a = audio_only(ctx)?;
    let profile = guess_aac(a)?;
    let id = match ctx.container {
        ContainerType::Aac => aac_adts_id(profile)?,
        ContainerType::Mp4 | ContainerType::ThreeGpp => aac_iso_id(profile)?,
        // headerless AAC-LC
        ContainerType::Unknown if matches!(profile, AudioProfile::Aac | AudioProfile::Aac320) => "AAC_RAW",
        _ => return None,
    };
    lookup(&AAC_PROFILES, id)
}

pub fn aac_rule() -> ProfileRule {
    ProfileRule {
        id: "mpeg4_audio",
        class: MediaClass::Audio,
        extensions: Some("aac,adts,3gp,mp4,mov,qt,m4a"),
        profiles: &AAC_PROFILES,
        probe: probe_aac,
    }
}

const WMA_BASE: ProfileDescriptor =
    ProfileDescriptor::new("WMABASE", MIME_AUDIO_WMA, Some(LABEL_AUDIO_2CH));
const WMA_FULL: ProfileDescriptor =
    ProfileDescriptor::new("WMAFULL", MIME_AUDIO_WMA, Some(LABEL_AUDIO_2CH));
const WMA_PRO: ProfileDescriptor =
    ProfileDescriptor::new("WMAPRO", MIME_AUDIO_WMA, Some(LABEL_AUDIO_MULTI));

static WMA_PROFILES: [ProfileDescriptor; 3] = [WMA_BASE, WMA_FULL, WMA_PRO];

fn probe_wma(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    if ctx.container != ContainerType::Asf {
        return None;
    }
    let a = audio_only(ctx)?;
    match guess_wma(a)? {
        AudioProfile::WmaBaseline => Some(WMA_BASE),
        AudioProfile::WmaFull => Some(WMA_FULL),
        AudioProfile::WmaPro => Some(WMA_PRO),
        _ => None,
    }
}

pub fn wma_rule() -> ProfileRule {
    ProfileRule {
        id: "wma",
        class: MediaClass::Audio,
        extensions: Some("wma,asf"),
        profiles: &WMA_PROFILES,
        probe: probe_wma,
    }
}
