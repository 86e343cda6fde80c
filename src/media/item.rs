use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::media::codecs::{CodecParams, StreamInfo};
use crate::media::demux::ProbedMedia;
use crate::profiles::{MediaClass, ProfileDescriptor};

/// Genre reported when the container carries no genre tag.
pub const DEFAULT_GENRE: &str = "default";

/// Classification result for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaItem {
    pub path: PathBuf,
    pub file_size: u64,
    pub properties: MediaProperties,
    pub metadata: MediaMetadata,
    pub profile: Option<ProfileDescriptor>,
}

impl MediaItem {
    pub fn new(
        path: PathBuf,
        file_size: u64,
        probed: &ProbedMedia,
        codecs: &CodecParams,
        profile: Option<ProfileDescriptor>,
    ) -> Self {
        MediaItem {
            path,
            file_size,
            properties: MediaProperties::from_probe(probed, codecs),
            metadata: MediaMetadata::from_tags(probed),
            profile,
        }
    }

    pub fn media_class(&self) -> MediaClass {
        self.profile
            .as_ref()
            .map(|p| p.class)
            .unwrap_or(MediaClass::Unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaProperties {
    /// `HH:MM:SS`, whole seconds.
    pub duration: Option<String>,
    /// Bytes per second.
    pub bitrate: u32,
    pub sample_frequency: u32,
    pub bits_per_sample: u32,
    pub channels: u32,
    /// `WxH` of the first video stream.
    pub resolution: Option<String>,
}

impl MediaProperties {
    pub fn from_probe(probed: &ProbedMedia, codecs: &CodecParams) -> Self {
        let audio = codecs.audio.as_ref();
        let bit_rate = probed.bit_rate.unwrap_or_else(|| {
            u64::from(audio.map(|a| a.bit_rate).unwrap_or(0))
                + u64::from(codecs.video.as_ref().map(|v| v.bit_rate).unwrap_or(0))
        });

        MediaProperties {
            duration: media_duration(probed).map(format_duration),
            bitrate: u32::try_from(bit_rate / 8).unwrap_or(u32::MAX),
            sample_frequency: audio.map(|a| a.sample_rate).unwrap_or(0),
            bits_per_sample: audio.map(|a| a.bits_per_sample).unwrap_or(0),
            channels: audio.map(|a| a.channels).unwrap_or(0),
            resolution: codecs
                .video
                .as_ref()
                .map(|v| format!("{}x{}", v.width, v.height)),
        }
    }
}

/// Container duration when known, otherwise the first audio stream's
/// sample count over its sample rate.
fn media_duration(probed: &ProbedMedia) -> Option<Duration> {
    if let Some(d) = probed.duration {
        return Some(d);
    }
    probed.streams.iter().find_map(|s| match s {
        StreamInfo::Audio {
            params,
            sample_count: Some(samples),
        } if params.sample_rate > 0 => Some(Duration::from_secs(samples / u64::from(params.sample_rate))),
        _ => None,
    })
}

/// Format as `HH:MM:SS`, dropping any fractional second.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub album: Option<String>,
    pub comment: Option<String>,
    pub genre: String,
    pub track: Option<u32>,
}

impl Default for MediaMetadata {
    fn default() -> Self {
        MediaMetadata {
            title: None,
            author: None,
            album: None,
            comment: None,
            genre: DEFAULT_GENRE.to_string(),
            track: None,
        }
    }
}

impl MediaMetadata {
    pub fn from_tags(probed: &ProbedMedia) -> Self {
        let tag = |key: &str| {
            probed
                .tags
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        MediaMetadata {
            title: tag("title"),
            author: tag("author").or_else(|| tag("artist")),
            album: tag("album"),
            comment: tag("comment"),
            genre: tag("genre").unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            track: tag("track").and_then(|t| leading_number(&t)),
        }
    }
}

/// Parse the leading decimal digits of `s`: `"3/12"` gives 3.
fn leading_number(s: &str) -> Option<u32> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
