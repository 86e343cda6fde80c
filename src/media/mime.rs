use std::path::Path;

// DLNA MIME types
pub const MIME_IMAGE_JPEG: &str = "image/jpeg";
pub const MIME_IMAGE_PNG: &str = "image/png";

pub const MIME_AUDIO_3GP: &str = "audio/3gpp";
pub const MIME_AUDIO_ADTS: &str = "audio/vnd.dlna.adts";
pub const MIME_AUDIO_ATRAC: &str = "audio/x-sony-oma";
pub const MIME_AUDIO_DOLBY_DIGITAL: &str = "audio/vnd.dolby.dd-raw";
pub const MIME_AUDIO_LPCM: &str = "audio/L16";
pub const MIME_AUDIO_MPEG: &str = "audio/mpeg";
pub const MIME_AUDIO_MPEG_4: &str = "audio/mp4";
pub const MIME_AUDIO_WMA: &str = "audio/x-ms-wma";

pub const MIME_VIDEO_3GP: &str = "video/3gpp";
pub const MIME_VIDEO_ASF: &str = "video/x-ms-asf";
pub const MIME_VIDEO_MPEG: &str = "video/mpeg";
pub const MIME_VIDEO_MPEG_4: &str = "video/mp4";
pub const MIME_VIDEO_MPEG_TS: &str = "video/vnd.dlna.mpeg-tts";
pub const MIME_VIDEO_WMV: &str = "video/x-ms-wmv";

// DLNA labels
pub const LABEL_AUDIO_MONO: &str = "mono";
pub const LABEL_AUDIO_2CH: &str = "2-ch";
pub const LABEL_AUDIO_2CH_MULTI: &str = "2-ch multi";
pub const LABEL_AUDIO_MULTI: &str = "multi";

pub const LABEL_VIDEO_CIF15: &str = "CIF15";
pub const LABEL_VIDEO_CIF30: &str = "CIF30";
pub const LABEL_VIDEO_QCIF15: &str = "QCIF15";
pub const LABEL_VIDEO_SD: &str = "SD";
pub const LABEL_VIDEO_HD: &str = "HD";

/// Demuxer format name shared by the whole ISO base media family.
pub const FORMAT_MOV_FAMILY: &str = "mov,mp4,m4a,3gp,3g2,mj2";

/// Coarse media kind, decided from the file name alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// Lowercased extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classify a file path by its extension into a (MediaKind, demuxer format name) pair.
///
/// Returns `None` for extensions the catalog does not index.
/// Format names follow the demuxer naming the container sniffer understands.
pub fn classify(path: &Path) -> Option<(MediaKind, &'static str)> {
    let ext = extension_of(path);

    let result = match ext.as_str() {
        // Video
        "mp4" | "m4v" | "mov" | "3gp" | "3gpp" | "3g2" => (MediaKind::Video, FORMAT_MOV_FAMILY),
        "ts" | "m2ts" | "mts" | "mp2t" | "tts" => (MediaKind::Video, "mpegts"),
        "mpg" | "mpeg" | "mpe" | "m2v" | "vob" => (MediaKind::Video, "mpeg"),
        "wmv" | "asf" => (MediaKind::Video, "asf"),

        // Audio
        "mp3" => (MediaKind::Audio, "mp3"),
        "m4a" => (MediaKind::Audio, FORMAT_MOV_FAMILY),
        "aac" | "adts" => (MediaKind::Audio, "aac"),
        "ac3" => (MediaKind::Audio, "ac3"),
        "amr" => (MediaKind::Audio, "amr"),
        "wav" | "pcm" | "lpcm" => (MediaKind::Audio, "wav"),
        "wma" => (MediaKind::Audio, "asf"),

        // Image
        "jpg" | "jpeg" | "jpe" | "png" => (MediaKind::Image, "image2"),

        _ => return None,
    };

    Some(result)
}

/// Case-insensitive membership test against a comma-separated extension list.
pub fn match_extension(ext: &str, extensions: &str) -> bool {
    !ext.is_empty()
        && extensions
            .split(',')
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(ext))
}
