//! Audio/video profile families: MPEG-1, MPEG-2, MPEG-4 Part 2,
//! MPEG-4 Part 10 (AVC) and WMV9.

use crate::media::codecs::{VideoCodec, VideoParams};
use crate::media::container::ContainerType;
use crate::media::mime::{
    LABEL_VIDEO_CIF15, LABEL_VIDEO_CIF30, LABEL_VIDEO_HD, LABEL_VIDEO_QCIF15, LABEL_VIDEO_SD,
    MIME_VIDEO_3GP, MIME_VIDEO_MPEG, MIME_VIDEO_MPEG_4, MIME_VIDEO_MPEG_TS, MIME_VIDEO_WMV,
};
use crate::profiles::audio::AudioProfile;
use crate::profiles::{lookup, MediaClass, ProbeContext, ProfileDescriptor, ProfileRule};

const fn ts(id: &'static str, label: &'static str) -> ProfileDescriptor {
    ProfileDescriptor::new(id, MIME_VIDEO_MPEG_TS, Some(label))
}

const fn ps(id: &'static str, label: &'static str) -> ProfileDescriptor {
    ProfileDescriptor::new(id, MIME_VIDEO_MPEG, Some(label))
}

const fn mp4(id: &'static str, label: &'static str) -> ProfileDescriptor {
    ProfileDescriptor::new(id, MIME_VIDEO_MPEG_4, Some(label))
}

const fn gpp(id: &'static str, label: &'static str) -> ProfileDescriptor {
    ProfileDescriptor::new(id, MIME_VIDEO_3GP, Some(label))
}

const fn wmv(id: &'static str, label: &'static str) -> ProfileDescriptor {
    ProfileDescriptor::new(id, MIME_VIDEO_WMV, Some(label))
}

fn fits(v: &VideoParams, width: u32, height: u32) -> bool {
    v.width > 0 && v.height > 0 && v.width <= width && v.height <= height
}

/// The first video stream, when it uses `codec` and the file also carries audio.
fn av_video<'a>(ctx: &ProbeContext<'a>, codec: VideoCodec) -> Option<&'a VideoParams> {
    if !ctx.codecs.is_av() {
        return None;
    }
    ctx.codecs.video.as_ref().filter(|v| v.codec == codec)
}

fn audio_profile(ctx: &ProbeContext<'_>) -> Option<AudioProfile> {
    ctx.codecs.audio.as_ref().and_then(AudioProfile::guess)
}

// ── MPEG-1 ───────────────────────────────────────────────────────────────────

const MPEG1: ProfileDescriptor = ps("MPEG1", LABEL_VIDEO_CIF30);

static MPEG1_PROFILES: [ProfileDescriptor; 1] = [MPEG1];

fn probe_mpeg1(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    if ctx.container != ContainerType::Mpeg1System {
        return None;
    }
    let v = av_video(ctx, VideoCodec::Mpeg1)?;
    // VCD resolutions only
    if !matches!((v.width, v.height), (352, 288) | (352, 240)) {
        return None;
    }
    (audio_profile(ctx)? == AudioProfile::Mp2).then_some(MPEG1)
}

pub fn mpeg1_rule() -> ProfileRule {
    ProfileRule {
        id: "mpeg1",
        class: MediaClass::AudioVideo,
        extensions: Some("mpg,mpeg,mpe,m1v"),
        profiles: &MPEG1_PROFILES,
        probe: probe_mpeg1,
    }
}

// ── MPEG-2 ───────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mpeg2Resolution {
    Ntsc,
    Pal,
    Hd,
}

const MPEG2_NTSC: [(u32, u32); 6] = [(720, 480), (704, 480), (544, 480), (480, 480), (352, 480), (352, 240)];
const MPEG2_PAL: [(u32, u32); 6] = [(720, 576), (704, 576), (544, 576), (480, 576), (352, 576), (352, 288)];
const MPEG2_HD: [(u32, u32); 3] = [(1920, 1080), (1440, 1080), (1280, 720)];

pub fn mpeg2_resolution(width: u32, height: u32) -> Option<Mpeg2Resolution> {
    let size = (width, height);
    if MPEG2_NTSC.contains(&size) {
        Some(Mpeg2Resolution::Ntsc)
    } else if MPEG2_PAL.contains(&size) {
        Some(Mpeg2Resolution::Pal)
    } else if MPEG2_HD.contains(&size) {
        Some(Mpeg2Resolution::Hd)
    } else {
        None
    }
}

static MPEG2_PROFILES: [ProfileDescriptor; 7] = [
    ps("MPEG_PS_NTSC", LABEL_VIDEO_SD),
    ps("MPEG_PS_PAL", LABEL_VIDEO_SD),
    ps("MPEG_ES_NTSC", LABEL_VIDEO_SD),
    ps("MPEG_ES_PAL", LABEL_VIDEO_SD),
    ts("MPEG_TS_SD_NA", LABEL_VIDEO_SD),
    ts("MPEG_TS_SD_EU", LABEL_VIDEO_SD),
    ts("MPEG_TS_HD_NA", LABEL_VIDEO_HD),
];

fn probe_mpeg2(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    use AudioProfile::{Ac3, Lpcm, Mp2};
    use Mpeg2Resolution::{Hd, Ntsc, Pal};

    let v = ctx
        .codecs
        .video
        .as_ref()
        .filter(|v| v.codec == VideoCodec::Mpeg2)?;
    let res = mpeg2_resolution(v.width, v.height)?;

    // Elementary streams carry the picture alone.
    if ctx.container == ContainerType::MpegElementaryStream {
        let id = match res {
            Ntsc => "MPEG_ES_NTSC",
            Pal => "MPEG_ES_PAL",
            Hd => return None,
        };
        return lookup(&MPEG2_PROFILES, id);
    }

    let audio = audio_profile(ctx)?;
    if ctx.container == ContainerType::Mpeg1System {
        if !matches!(audio, Ac3 | Mp2 | Lpcm) {
            return None;
        }
        let id = match res {
            Ntsc => "MPEG_PS_NTSC",
            Pal => "MPEG_PS_PAL",
            Hd => return None,
        };
        return lookup(&MPEG2_PROFILES, id);
    }

    if !ctx.container.is_transport_stream() {
        return None;
    }
    let id = match (res, audio) {
        (Ntsc, Ac3) => "MPEG_TS_SD_NA",
        (Pal, Ac3 | Mp2) => "MPEG_TS_SD_EU",
        (Hd, Ac3) => "MPEG_TS_HD_NA",
        _ => return None,
    };
    lookup(&MPEG2_PROFILES, id).map(|p| p.for_transport_stream(ctx.container))
}

pub fn mpeg2_rule() -> ProfileRule {
    ProfileRule {
        id: "mpeg2",
        class: MediaClass::AudioVideo,
        extensions: Some("mpg,mpeg,mpe,m2v,mp2p,mp2t,ts,ps,pes,vob"),
        profiles: &MPEG2_PROFILES,
        probe: probe_mpeg2,
    }
}

// ── MPEG-4 Part 2 ────────────────────────────────────────────────────────────

static MPEG4_P2_PROFILES: [ProfileDescriptor; 9] = [
    mp4("MPEG4_P2_MP4_SP_AAC", LABEL_VIDEO_CIF30),
    mp4("MPEG4_P2_MP4_SP_HEAAC", LABEL_VIDEO_CIF30),
    mp4("MPEG4_P2_MP4_ASP_AAC", LABEL_VIDEO_SD),
    mp4("MPEG4_P2_MP4_ASP_HEAAC", LABEL_VIDEO_SD),
    gpp("MPEG4_P2_3GPP_SP_L0B_AAC", LABEL_VIDEO_QCIF15),
    gpp("MPEG4_P2_3GPP_SP_L0B_AMR", LABEL_VIDEO_QCIF15),
    ts("MPEG4_P2_TS_ASP_AAC", LABEL_VIDEO_SD),
    ts("MPEG4_P2_TS_ASP_MPEG1_L3", LABEL_VIDEO_SD),
    ts("MPEG4_P2_TS_ASP_AC3", LABEL_VIDEO_SD),
];

fn is_plain_aac(p: AudioProfile) -> bool {
    matches!(p, AudioProfile::Aac | AudioProfile::Aac320)
}

fn is_heaac_l2(p: AudioProfile) -> bool {
    matches!(p, AudioProfile::HeAacL2 | AudioProfile::HeAacL2_320)
}

fn probe_mpeg4_part2(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let v = av_video(ctx, VideoCodec::Mpeg4Part2)?;
    let audio = audio_profile(ctx)?;

    let id = match ctx.container {
        ContainerType::Mp4 => {
            let simple = fits(v, 352, 288);
            if !simple && !fits(v, 720, 576) {
                return None;
            }
            match (simple, audio) {
                (true, a) if is_plain_aac(a) => "MPEG4_P2_MP4_SP_AAC",
                (true, a) if is_heaac_l2(a) => "MPEG4_P2_MP4_SP_HEAAC",
                (false, a) if is_plain_aac(a) => "MPEG4_P2_MP4_ASP_AAC",
                (false, a) if is_heaac_l2(a) => "MPEG4_P2_MP4_ASP_HEAAC",
                _ => return None,
            }
        }
        ContainerType::ThreeGpp => {
            if !fits(v, 176, 144) {
                return None;
            }
            match audio {
                a if is_plain_aac(a) => "MPEG4_P2_3GPP_SP_L0B_AAC",
                AudioProfile::Amr => "MPEG4_P2_3GPP_SP_L0B_AMR",
                _ => return None,
            }
        }
        c if c.is_transport_stream() => {
            if !fits(v, 720, 576) {
                return None;
            }
            let id = match audio {
                a if is_plain_aac(a) || a == AudioProfile::AacMult5 => "MPEG4_P2_TS_ASP_AAC",
                AudioProfile::Mp3 => "MPEG4_P2_TS_ASP_MPEG1_L3",
                AudioProfile::Ac3 => "MPEG4_P2_TS_ASP_AC3",
                _ => return None,
            };
            return lookup(&MPEG4_P2_PROFILES, id).map(|p| p.for_transport_stream(c));
        }
        _ => return None,
    };
    lookup(&MPEG4_P2_PROFILES, id)
}

pub fn mpeg4_part2_rule() -> ProfileRule {
    ProfileRule {
        id: "mpeg4_part2",
        class: MediaClass::AudioVideo,
        extensions: Some("mp4,3gp,3gpp,mpg,mpeg,mpe,mp2t,ts"),
        profiles: &MPEG4_P2_PROFILES,
        probe: probe_mpeg4_part2,
    }
}

// ── MPEG-4 Part 10 (AVC) ─────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AvcVideoProfile {
    BaselineQcif15,
    BaselineCif15,
    BaselineCif30,
    MainSd,
    MainHd,
}

/// Bucket an H.264 stream by picture size and frame rate. Streams with an
/// unknown frame rate are treated as 30 fps.
pub fn avc_video_profile(v: &VideoParams) -> Option<AvcVideoProfile> {
    let fps = v.fps().unwrap_or(30);
    if fits(v, 176, 144) && fps <= 15 {
        Some(AvcVideoProfile::BaselineQcif15)
    } else if fits(v, 352, 288) {
        if fps <= 15 {
            Some(AvcVideoProfile::BaselineCif15)
        } else {
            Some(AvcVideoProfile::BaselineCif30)
        }
    } else if fits(v, 720, 576) {
        Some(AvcVideoProfile::MainSd)
    } else if fits(v, 1920, 1080) {
        Some(AvcVideoProfile::MainHd)
    } else {
        None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum AvcAudio {
    Aac,
    AacMult5,
    HeAac,
    AacLtp,
    AacLtpMult5,
    AacLtpMult7,
    Bsac,
    Ac3,
    Mp3,
    Amr,
    AmrWb,
}

fn avc_audio(p: AudioProfile) -> Option<AvcAudio> {
    Some(match p {
        AudioProfile::Aac | AudioProfile::Aac320 => AvcAudio::Aac,
        AudioProfile::AacMult5 => AvcAudio::AacMult5,
        AudioProfile::HeAacL2 | AudioProfile::HeAacL2_320 => AvcAudio::HeAac,
        AudioProfile::AacLtp => AvcAudio::AacLtp,
        AudioProfile::AacLtpMult5 => AvcAudio::AacLtpMult5,
        AudioProfile::AacLtpMult7 => AvcAudio::AacLtpMult7,
        AudioProfile::Bsac | AudioProfile::BsacMult5 => AvcAudio::Bsac,
        AudioProfile::Ac3 => AvcAudio::Ac3,
        AudioProfile::Mp3 => AvcAudio::Mp3,
        AudioProfile::Amr => AvcAudio::Amr,
        AudioProfile::AmrWb => AvcAudio::AmrWb,
        _ => return None,
    })
}

static AVC_PROFILES: [ProfileDescriptor; 53] = [
    // MPEG-TS, main profile SD
    ts("AVC_TS_MP_SD_AAC_MULT5", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_HEAAC_L2", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_MPEG1_L3", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_AC3", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_AAC_LTP", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_AAC_LTP_MULT5", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_AAC_LTP_MULT7", LABEL_VIDEO_SD),
    ts("AVC_TS_MP_SD_BSAC", LABEL_VIDEO_SD),
    // MPEG-TS, baseline CIF30
    ts("AVC_TS_BL_CIF30_AAC_MULT5", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_HEAAC_L2", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_MPEG1_L3", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_AC3", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_AAC_LTP", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_AAC_LTP_MULT5", LABEL_VIDEO_CIF30),
    ts("AVC_TS_BL_CIF30_AAC_940", LABEL_VIDEO_CIF30),
    // MPEG-TS, main profile HD
    ts("AVC_TS_MP_HD_AAC_MULT5", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_HEAAC_L2", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_MPEG1_L3", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_AC3", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_AAC", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_AAC_LTP", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_AAC_LTP_MULT5", LABEL_VIDEO_HD),
    ts("AVC_TS_MP_HD_AAC_LTP_MULT7", LABEL_VIDEO_HD),
    // MPEG-TS, baseline CIF15
    ts("AVC_TS_BL_CIF15_AAC", LABEL_VIDEO_CIF15),
    ts("AVC_TS_BL_CIF15_AAC_540", LABEL_VIDEO_CIF15),
    ts("AVC_TS_BL_CIF15_AAC_LTP", LABEL_VIDEO_CIF15),
    ts("AVC_TS_BL_CIF15_BSAC", LABEL_VIDEO_CIF15),
    // 3GPP
    gpp("AVC_3GPP_BL_CIF30_AMR_WBplus", LABEL_VIDEO_CIF30),
    gpp("AVC_3GPP_BL_CIF15_AMR_WBplus", LABEL_VIDEO_CIF15),
    gpp("AVC_3GPP_BL_QCIF15_AAC", LABEL_VIDEO_QCIF15),
    gpp("AVC_3GPP_BL_QCIF15_AAC_LTP", LABEL_VIDEO_QCIF15),
    gpp("AVC_3GPP_BL_QCIF15_HEAAC", LABEL_VIDEO_QCIF15),
    gpp("AVC_3GPP_BL_QCIF15_AMR_WBplus", LABEL_VIDEO_QCIF15),
    gpp("AVC_3GPP_BL_QCIF15_AMR", LABEL_VIDEO_QCIF15),
    // MP4
    mp4("AVC_MP4_MP_SD_AAC_MULT5", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_HEAAC_L2", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_MPEG1_L3", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_AC3", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_AAC_LTP", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_AAC_LTP_MULT5", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_AAC_LTP_MULT7", LABEL_VIDEO_SD),
    mp4("AVC_MP4_MP_SD_BSAC", LABEL_VIDEO_SD),
    mp4("AVC_MP4_BL_CIF30_AAC_MULT5", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF30_HEAAC_L2", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF30_MPEG1_L3", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF30_AC3", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF30_AAC_LTP", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF30_AAC_LTP_MULT5", LABEL_VIDEO_CIF30),
    mp4("AVC_MP4_BL_CIF15_AAC", LABEL_VIDEO_CIF15),
    mp4("AVC_MP4_BL_CIF15_AAC_LTP", LABEL_VIDEO_CIF15),
    mp4("AVC_MP4_BL_CIF15_HEAAC", LABEL_VIDEO_CIF15),
    mp4("AVC_MP4_BL_CIF15_AMR", LABEL_VIDEO_CIF15),
    mp4("AVC_MP4_BL_CIF15_BSAC", LABEL_VIDEO_CIF15),
];

fn avc_ts_id(video: AvcVideoProfile, audio: AvcAudio, video_bit_rate: u32) -> Option<&'static str> {
    use AvcAudio as A;
    use AvcVideoProfile as V;

    Some(match (video, audio) {
        (V::MainSd, A::Aac | A::AacMult5) => "AVC_TS_MP_SD_AAC_MULT5",
        (V::MainSd, A::HeAac) => "AVC_TS_MP_SD_HEAAC_L2",
        (V::MainSd, A::Mp3) => "AVC_TS_MP_SD_MPEG1_L3",
        (V::MainSd, A::Ac3) => "AVC_TS_MP_SD_AC3",
        (V::MainSd, A::AacLtp) => "AVC_TS_MP_SD_AAC_LTP",
        (V::MainSd, A::AacLtpMult5) => "AVC_TS_MP_SD_AAC_LTP_MULT5",
        (V::MainSd, A::AacLtpMult7) => "AVC_TS_MP_SD_AAC_LTP_MULT7",
        (V::MainSd, A::Bsac) => "AVC_TS_MP_SD_BSAC",

        (V::BaselineCif30, A::Aac) if (1..=940_000).contains(&video_bit_rate) => "AVC_TS_BL_CIF30_AAC_940",
        (V::BaselineCif30, A::Aac | A::AacMult5) => "AVC_TS_BL_CIF30_AAC_MULT5",
        (V::BaselineCif30, A::HeAac) => "AVC_TS_BL_CIF30_HEAAC_L2",
        (V::BaselineCif30, A::Mp3) => "AVC_TS_BL_CIF30_MPEG1_L3",
        (V::BaselineCif30, A::Ac3) => "AVC_TS_BL_CIF30_AC3",
        (V::BaselineCif30, A::AacLtp) => "AVC_TS_BL_CIF30_AAC_LTP",
        (V::BaselineCif30, A::AacLtpMult5) => "AVC_TS_BL_CIF30_AAC_LTP_MULT5",

        (V::MainHd, A::Aac) => "AVC_TS_MP_HD_AAC",
        (V::MainHd, A::AacMult5) => "AVC_TS_MP_HD_AAC_MULT5",
        (V::MainHd, A::HeAac) => "AVC_TS_MP_HD_HEAAC_L2",
        (V::MainHd, A::Mp3) => "AVC_TS_MP_HD_MPEG1_L3",
        (V::MainHd, A::Ac3) => "AVC_TS_MP_HD_AC3",
        (V::MainHd, A::AacLtp) => "AVC_TS_MP_HD_AAC_LTP",
        (V::MainHd, A::AacLtpMult5) => "AVC_TS_MP_HD_AAC_LTP_MULT5",
        (V::MainHd, A::AacLtpMult7) => "AVC_TS_MP_HD_AAC_LTP_MULT7",

        (V::BaselineCif15, A::Aac) if (1..=540_000).contains(&video_bit_rate) => "AVC_TS_BL_CIF15_AAC_540",
        (V::BaselineCif15, A::Aac) => "AVC_TS_BL_CIF15_AAC",
        (V::BaselineCif15, A::AacLtp) => "AVC_TS_BL_CIF15_AAC_LTP",
        (V::BaselineCif15, A::Bsac) => "AVC_TS_BL_CIF15_BSAC",
        _ => return None,
    })
}

fn avc_3gpp_id(video: AvcVideoProfile, audio: AvcAudio) -> Option<&'static str> {
    use AvcAudio as A;
    use AvcVideoProfile as V;

    Some(match (video, audio) {
        (V::BaselineCif30, A::AmrWb) => "AVC_3GPP_BL_CIF30_AMR_WBplus",
        (V::BaselineCif15, A::AmrWb) => "AVC_3GPP_BL_CIF15_AMR_WBplus",
        (V::BaselineQcif15, A::Aac) => "AVC_3GPP_BL_QCIF15_AAC",
        (V::BaselineQcif15, A::AacLtp) => "AVC_3GPP_BL_QCIF15_AAC_LTP",
        (V::BaselineQcif15, A::HeAac) => "AVC_3GPP_BL_QCIF15_HEAAC",
        (V::BaselineQcif15, A::AmrWb) => "AVC_3GPP_BL_QCIF15_AMR_WBplus",
        (V::BaselineQcif15, A::Amr) => "AVC_3GPP_BL_QCIF15_AMR",
        _ => return None,
    })
}

fn avc_mp4_id(video: AvcVideoProfile, audio: AvcAudio) -> Option<&'static str> {
    use AvcAudio as A;
    use AvcVideoProfile as V;

    Some(match (video, audio) {
        (V::MainSd, A::Aac | A::AacMult5) => "AVC_MP4_MP_SD_AAC_MULT5",
        (V::MainSd, A::HeAac) => "AVC_MP4_MP_SD_HEAAC_L2",
        (V::MainSd, A::Mp3) => "AVC_MP4_MP_SD_MPEG1_L3",
        (V::MainSd, A::Ac3) => "AVC_MP4_MP_SD_AC3",
        (V::MainSd, A::AacLtp) => "AVC_MP4_MP_SD_AAC_LTP",
        (V::MainSd, A::AacLtpMult5) => "AVC_MP4_MP_SD_AAC_LTP_MULT5",
        (V::MainSd, A::AacLtpMult7) => "AVC_MP4_MP_SD_AAC_LTP_MULT7",
        (V::MainSd, A::Bsac) => "AVC_MP4_MP_SD_BSAC",
        (V::BaselineCif30, A::Aac | A::AacMult5) => "AVC_MP4_BL_CIF30_AAC_MULT5",
        (V::BaselineCif30, A::HeAac) => "AVC_MP4_BL_CIF30_HEAAC_L2",
        (V::BaselineCif30, A::Mp3) => "AVC_MP4_BL_CIF30_MPEG1_L3",
        (V::BaselineCif30, A::Ac3) => "AVC_MP4_BL_CIF30_AC3",
        (V::BaselineCif30, A::AacLtp) => "AVC_MP4_BL_CIF30_AAC_LTP",
        (V::BaselineCif30, A::AacLtpMult5) => "AVC_MP4_BL_CIF30_AAC_LTP_MULT5",
        (V::BaselineCif15 | V::BaselineQcif15, A::Aac) => "AVC_MP4_BL_CIF15_AAC",
        (V::BaselineCif15 | V::BaselineQcif15, A::AacLtp) => "AVC_MP4_BL_CIF15_AAC_LTP",
        (V::BaselineCif15 | V::BaselineQcif15, A::HeAac) => "AVC_MP4_BL_CIF15_HEAAC",
        (V::BaselineCif15 | V::BaselineQcif15, A::Amr) => "AVC_MP4_BL_CIF15_AMR",
        (V::BaselineCif15 | V::BaselineQcif15, A::Bsac) => "AVC_MP4_BL_CIF15_BSAC",
        _ => return None,
    })
}

fn probe_avc(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let v = av_video(ctx, VideoCodec::H264)?;
    let video = avc_video_profile(v)?;
    let audio = avc_audio(audio_profile(ctx)?)?;

    match ctx.container {
        c if c.is_transport_stream() => {
            let id = avc_ts_id(video, audio, v.bit_rate)?;
            lookup(&AVC_PROFILES, id).map(|p| p.for_transport_stream(c))
        }
        ContainerType::ThreeGpp => lookup(&AVC_PROFILES, avc_3gpp_id(video, audio)?),
        ContainerType::Mp4 => lookup(&AVC_PROFILES, avc_mp4_id(video, audio)?),
        _ => None,
    }
}

pub fn avc_rule() -> ProfileRule {
    ProfileRule {
        id: "mpeg4_part10",
        class: MediaClass::AudioVideo,
        extensions: Some("mp4,3gp,3gpp,mpg,mpeg,mpe,mp2t,ts"),
        profiles: &AVC_PROFILES,
        probe: probe_avc,
    }
}

// ── WMV9 ─────────────────────────────────────────────────────────────────────

static WMV9_PROFILES: [ProfileDescriptor; 8] = [
    wmv("WMVSPLL_BASE", LABEL_VIDEO_QCIF15),
    wmv("WMVSPML_BASE", LABEL_VIDEO_CIF30),
    wmv("WMVSPML_MP3", LABEL_VIDEO_CIF30),
    wmv("WMVMED_BASE", LABEL_VIDEO_SD),
    wmv("WMVMED_FULL", LABEL_VIDEO_SD),
    wmv("WMVMED_PRO", LABEL_VIDEO_SD),
    wmv("WMVHIGH_FULL", LABEL_VIDEO_HD),
    wmv("WMVHIGH_PRO", LABEL_VIDEO_HD),
];

fn probe_wmv9(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    use AudioProfile::{Mp3, WmaBaseline, WmaFull, WmaPro};

    if ctx.container != ContainerType::Asf || !ctx.codecs.is_av() {
        return None;
    }
    let v = ctx
        .codecs
        .video
        .as_ref()
        .filter(|v| matches!(v.codec, VideoCodec::Wmv3 | VideoCodec::Vc1))?;
    let audio = audio_profile(ctx)?;

    let id = if fits(v, 176, 144) {
        match audio {
            WmaBaseline => "WMVSPLL_BASE",
            _ => return None,
        }
    } else if fits(v, 352, 288) {
        match audio {
            WmaBaseline => "WMVSPML_BASE",
            Mp3 => "WMVSPML_MP3",
            _ => return None,
        }
    } else if fits(v, 720, 576) {
        match audio {
            WmaBaseline => "WMVMED_BASE",
            WmaFull => "WMVMED_FULL",
            WmaPro => "WMVMED_PRO",
            _ => return None,
        }
    } else if fits(v, 1920, 1080) {
        match audio {
            WmaFull => "WMVHIGH_FULL",
            WmaPro => "WMVHIGH_PRO",
            _ => return None,
        }
    } else {
        return None;
    };
    lookup(&WMV9_PROFILES, id)
}

pub fn wmv9_rule() -> ProfileRule {
    ProfileRule {
        id: "wmv9",
        class: MediaClass::AudioVideo,
        extensions: Some("wmv,asf"),
        profiles: &WMV9_PROFILES,
        probe: probe_wmv9,
    }
}
