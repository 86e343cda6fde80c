use crate::media::codecs::{VideoCodec, VideoParams};
use crate::media::mime::{MIME_IMAGE_JPEG, MIME_IMAGE_PNG};
use crate::profiles::{MediaClass, ProbeContext, ProfileDescriptor, ProfileRule};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageSize {
    SmallIcon,
    LargeIcon,
    Thumbnail,
    Small,
    Medium,
    Large,
}

/// Icons must match exactly; the other classes are upper bounds.
pub fn jpeg_size(width: u32, height: u32) -> Option<ImageSize> {
    match (width, height) {
        (48, 48) => Some(ImageSize::SmallIcon),
        (120, 120) => Some(ImageSize::LargeIcon),
        (w, h) if w <= 160 && h <= 160 => Some(ImageSize::Thumbnail),
        (w, h) if w <= 640 && h <= 480 => Some(ImageSize::Small),
        (w, h) if w <= 1024 && h <= 768 => Some(ImageSize::Medium),
        (w, h) if w <= 4096 && h <= 4096 => Some(ImageSize::Large),
        _ => None,
    }
}

/// PNG has no small/medium classes.
pub fn png_size(width: u32, height: u32) -> Option<ImageSize> {
    match (width, height) {
        (48, 48) => Some(ImageSize::SmallIcon),
        (120, 120) => Some(ImageSize::LargeIcon),
        (w, h) if w <= 160 && h <= 160 => Some(ImageSize::Thumbnail),
        (w, h) if w <= 4096 && h <= 4096 => Some(ImageSize::Large),
        _ => None,
    }
}

fn picture<'a>(ctx: &ProbeContext<'a>, codec: VideoCodec) -> Option<&'a VideoParams> {
    if !ctx.is_image() {
        return None;
    }
    ctx.codecs
        .video
        .as_ref()
        .filter(|v| v.codec == codec && v.width > 0 && v.height > 0)
}

const JPEG_SM_ICO: ProfileDescriptor = ProfileDescriptor::new("JPEG_SM_ICO", MIME_IMAGE_JPEG, None);
const JPEG_LRG_ICO: ProfileDescriptor = ProfileDescriptor::new("JPEG_LRG_ICO", MIME_IMAGE_JPEG, None);
const JPEG_TN: ProfileDescriptor = ProfileDescriptor::new("JPEG_TN", MIME_IMAGE_JPEG, None);
const JPEG_SM: ProfileDescriptor = ProfileDescriptor::new("JPEG_SM", MIME_IMAGE_JPEG, None);
const JPEG_MED: ProfileDescriptor = ProfileDescriptor::new("JPEG_MED", MIME_IMAGE_JPEG, None);
const JPEG_LRG: ProfileDescriptor = ProfileDescriptor::new("JPEG_LRG", MIME_IMAGE_JPEG, None);

static JPEG_PROFILES: [ProfileDescriptor; 6] =
    [JPEG_SM_ICO, JPEG_LRG_ICO, JPEG_TN, JPEG_SM, JPEG_MED, JPEG_LRG];

fn probe_jpeg(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let v = picture(ctx, VideoCodec::Jpeg)?;
    Some(match jpeg_size(v.width, v.height)? {
        ImageSize::SmallIcon => JPEG_SM_ICO,
        ImageSize::LargeIcon => JPEG_LRG_ICO,
        ImageSize::Thumbnail => JPEG_TN,
        ImageSize::Small => JPEG_SM,
        ImageSize::Medium => JPEG_MED,
        ImageSize::Large => JPEG_LRG,
    })
}

pub fn jpeg_rule() -> ProfileRule {
    ProfileRule {
        id: "jpeg",
        class: MediaClass::Image,
        extensions: Some("jpg,jpe,jpeg"),
        profiles: &JPEG_PROFILES,
        probe: probe_jpeg,
    }
}

const PNG_SM_ICO: ProfileDescriptor = ProfileDescriptor::new("PNG_SM_ICO", MIME_IMAGE_PNG, None);
const PNG_LRG_ICO: ProfileDescriptor = ProfileDescriptor::new("PNG_LRG_ICO", MIME_IMAGE_PNG, None);
const PNG_TN: ProfileDescriptor = ProfileDescriptor::new("PNG_TN", MIME_IMAGE_PNG, None);
const PNG_LRG: ProfileDescriptor = ProfileDescriptor::new("PNG_LRG", MIME_IMAGE_PNG, None);

static PNG_PROFILES: [ProfileDescriptor; 4] = [PNG_SM_ICO, PNG_LRG_ICO, PNG_TN, PNG_LRG];

fn probe_png(ctx: &ProbeContext<'_>) -> Option<ProfileDescriptor> {
    let v = picture(ctx, VideoCodec::Png)?;
    match png_size(v.width, v.height)? {
        ImageSize::SmallIcon => Some(PNG_SM_ICO),
        ImageSize::LargeIcon => Some(PNG_LRG_ICO),
        ImageSize::Thumbnail => Some(PNG_TN),
        ImageSize::Large => Some(PNG_LRG),
        ImageSize::Small | ImageSize::Medium => None,
    }
}

pub fn png_rule() -> ProfileRule {
    ProfileRule {
        id: "png",
        class: MediaClass::Image,
        extensions: Some("png"),
        profiles: &PNG_PROFILES,
        probe: probe_png,
    }
}
