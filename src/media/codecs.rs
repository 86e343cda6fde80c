use serde::Serialize;

/// MPEG-4 audio object type carried by an AAC stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum AacObject {
    Main,
    LowComplexity,
    LongTermPrediction,
    /// HE-AAC (LC + SBR).
    HighEfficiency,
    /// HE-AAC v2 (LC + SBR + PS).
    HighEfficiencyV2,
    Bsac,
}

impl AacObject {
    /// Map an ISO 14496-3 audio object type number.
    pub fn from_object_type(aot: u8) -> Option<AacObject> {
        match aot {
            1 => Some(AacObject::Main),
            2 => Some(AacObject::LowComplexity),
            4 => Some(AacObject::LongTermPrediction),
            5 => Some(AacObject::HighEfficiency),
            22 => Some(AacObject::Bsac),
            29 => Some(AacObject::HighEfficiencyV2),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum AudioCodec {
    Mp1,
    Mp2,
    Mp3,
    Aac(AacObject),
    Ac3,
    AmrNb,
    AmrWb,
    Atrac3,
    /// ITU-T G.726 ADPCM.
    G726,
    PcmS16Le,
    PcmS16Be,
    WmaV1,
    WmaV2,
    WmaPro,
    Flac,
    Vorbis,
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum VideoCodec {
    Mpeg1,
    Mpeg2,
    Mpeg4Part2,
    H264,
    Wmv3,
    Vc1,
    /// Still JPEG picture (the image demuxer reports pictures as video).
    Jpeg,
    Png,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioParams {
    pub codec: AudioCodec,
    pub channels: u32,
    pub sample_rate: u32,
    /// Bits per second; `0` when the demuxer could not tell.
    pub bit_rate: u32,
    pub bits_per_sample: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoParams {
    pub codec: VideoCodec,
    pub width: u32,
    pub height: u32,
    /// Frames per second as a `(numerator, denominator)` pair.
    pub frame_rate: Option<(u32, u32)>,
    pub bit_rate: u32,
}

impl VideoParams {
    /// Whole frames per second, rounded up; `None` when unknown.
    pub fn fps(&self) -> Option<u32> {
        match self.frame_rate {
            Some((num, den)) if den > 0 => Some(num.div_ceil(den)),
            _ => None,
        }
    }
}

/// One elementary stream as reported by the demuxer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamInfo {
    Audio {
        params: AudioParams,
        /// Total decoded samples per channel, when the container states it.
        sample_count: Option<u64>,
    },
    Video(VideoParams),
    /// Subtitle, data or attachment streams. Counted, never profiled.
    Other,
}

/// Codec summary of a file: the first audio stream, the first video stream
/// and how many streams the container holds in total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CodecParams {
    pub audio: Option<AudioParams>,
    pub video: Option<VideoParams>,
    pub stream_count: usize,
}

impl CodecParams {
    /// Reduce a stream list to its primary streams. Returns `None` when
    /// there is neither an audio nor a video stream.
    pub fn from_streams(streams: &[StreamInfo]) -> Option<CodecParams> {
        let mut params = CodecParams {
            stream_count: streams.len(),
            ..CodecParams::default()
        };
        for stream in streams {
            match stream {
                StreamInfo::Audio { params: a, .. } if params.audio.is_none() => {
                    params.audio = Some(a.clone());
                }
                StreamInfo::Video(v) if params.video.is_none() => {
                    params.video = Some(v.clone());
                }
                _ => {}
            }
        }
        if params.audio.is_none() && params.video.is_none() {
            return None;
        }
        Some(params)
    }

    /// Audio only: an audio stream and no video stream.
    pub fn is_audio(&self) -> bool {
        self.audio.is_some() && self.video.is_none()
    }

    /// Audio/video: both an audio and a video stream.
    pub fn is_av(&self) -> bool {
        self.audio.is_some() && self.video.is_some()
    }
}
