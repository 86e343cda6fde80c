//! DLNA media profiles: descriptors, per-family matching rules and the
//! ordered registry that classifies files against them.

pub mod audio;
pub mod image;
pub mod protocol;
pub mod video;

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ClassifyError;
use crate::media::codecs::CodecParams;
use crate::media::container::{self, ContainerType, SNIFF_WINDOW};
use crate::media::demux::Demuxer;
use crate::media::item::MediaItem;
use crate::media::mime::{self, MIME_VIDEO_MPEG, MIME_VIDEO_MPEG_TS};

// ── Media class ──────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MediaClass {
    Image,
    Audio,
    AudioVideo,
    Unknown,
}

impl MediaClass {
    /// UPnP object class advertised for items of this class.
    pub fn upnp_class(self) -> Option<&'static str> {
        match self {
            MediaClass::Image => Some("object.item.imageItem.photo"),
            MediaClass::Audio => Some("object.item.audioItem.musicTrack"),
            MediaClass::AudioVideo => Some("object.item.videoItem.movie"),
            MediaClass::Unknown => None,
        }
    }
}

// ── Profile descriptor ───────────────────────────────────────────────────────

/// A named DLNA profile such as `"AVC_TS_MP_SD_AAC_MULT5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProfileDescriptor {
    pub id: Cow<'static, str>,
    pub mime: &'static str,
    pub label: Option<&'static str>,
    pub class: MediaClass,
}

impl ProfileDescriptor {
    pub const fn new(id: &'static str, mime: &'static str, label: Option<&'static str>) -> Self {
        ProfileDescriptor {
            id: Cow::Borrowed(id),
            mime,
            label,
            class: MediaClass::Unknown,
        }
    }

    /// Derive the variant used inside a given transport stream flavour.
    ///
    /// Plain 188-byte streams get `_ISO` and `video/mpeg`, timestamped DLNA
    /// streams get `_T`, zero-timestamp DLNA streams keep the base id.
    pub fn for_transport_stream(&self, container: ContainerType) -> ProfileDescriptor {
        match container {
            ContainerType::MpegTransportStream => ProfileDescriptor {
                id: Cow::Owned(format!("{}_ISO", self.id)),
                mime: MIME_VIDEO_MPEG,
                ..self.clone()
            },
            ContainerType::MpegTransportStreamDlna => ProfileDescriptor {
                id: Cow::Owned(format!("{}_T", self.id)),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ProfileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.mime)
    }
}

/// Look a descriptor up by id in a static table.
pub(crate) fn lookup(table: &[ProfileDescriptor], id: &str) -> Option<ProfileDescriptor> {
    table.iter().find(|p| p.id == id).cloned()
}

// ── Rules ────────────────────────────────────────────────────────────────────

/// Everything a probe function gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'a> {
    pub container: ContainerType,
    pub codecs: &'a CodecParams,
    /// Lowercased file extension, or empty.
    pub extension: &'a str,
}

impl ProbeContext<'_> {
    /// A single picture inside an image container.
    pub fn is_image(&self) -> bool {
        self.codecs.stream_count == 1
            && self.container == ContainerType::Image
            && self.codecs.video.is_some()
    }
}

pub type ProbeFn = fn(&ProbeContext<'_>) -> Option<ProfileDescriptor>;

/// A registered profile family matcher.
#[derive(Clone, Copy)]
pub struct ProfileRule {
    pub id: &'static str,
    pub class: MediaClass,
    /// Comma-separated extensions the family accepts; `None` disables the filter.
    pub extensions: Option<&'static str>,
    /// Every descriptor the probe can produce, before transport stream suffixing.
    pub profiles: &'static [ProfileDescriptor],
    pub probe: ProbeFn,
}

impl fmt::Debug for ProfileRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRule")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("extensions", &self.extensions)
            .field("profiles", &self.profiles.len())
            .finish_non_exhaustive()
    }
}

/// Built-in profile families.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ProfileFamily {
    Jpeg,
    Png,
    Ac3,
    Amr,
    Atrac3,
    Lpcm,
    Mp3,
    Mpeg4Audio,
    Wma,
    Mpeg1,
    Mpeg2,
    Mpeg4Part2,
    Mpeg4Part10,
    Wmv9,
}

impl ProfileFamily {
    /// Canonical registration order: images, then audio, then audio/video.
    pub const ALL: [ProfileFamily; 14] = [
        ProfileFamily::Jpeg,
        ProfileFamily::Png,
        ProfileFamily::Ac3,
        ProfileFamily::Amr,
        ProfileFamily::Atrac3,
        ProfileFamily::Lpcm,
        ProfileFamily::Mp3,
        ProfileFamily::Mpeg4Audio,
        ProfileFamily::Wma,
        ProfileFamily::Mpeg1,
        ProfileFamily::Mpeg2,
        ProfileFamily::Mpeg4Part2,
        ProfileFamily::Mpeg4Part10,
        ProfileFamily::Wmv9,
    ];

    pub fn rule(self) -> ProfileRule {
        match self {
            ProfileFamily::Jpeg => image::jpeg_rule(),
            ProfileFamily::Png => image::png_rule(),
            ProfileFamily::Ac3 => audio::ac3_rule(),
            ProfileFamily::Amr => audio::amr_rule(),
            ProfileFamily::Atrac3 => audio::atrac3_rule(),
            ProfileFamily::Lpcm => audio::lpcm_rule(),
            ProfileFamily::Mp3 => audio::mp3_rule(),
            ProfileFamily::Mpeg4Audio => audio::aac_rule(),
            ProfileFamily::Wma => audio::wma_rule(),
            ProfileFamily::Mpeg1 => video::mpeg1_rule(),
            ProfileFamily::Mpeg2 => video::mpeg2_rule(),
            ProfileFamily::Mpeg4Part2 => video::mpeg4_part2_rule(),
            ProfileFamily::Mpeg4Part10 => video::avc_rule(),
            ProfileFamily::Wmv9 => video::wmv9_rule(),
        }
    }

    pub fn name(self) -> &'static str {
        self.rule().id
    }
}

impl FromStr for ProfileFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        let alias = match wanted.as_str() {
            "aac" | "mpeg4" => "mpeg4_audio",
            "avc" | "h264" => "mpeg4_part10",
            other => other,
        };
        ProfileFamily::ALL
            .into_iter()
            .find(|f| f.name() == alias)
            .ok_or_else(|| format!("unknown profile family: {s}"))
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Ordered chain of profile rules. The first rule whose probe matches wins.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<ProfileRule>,
    check_extensions: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    /// An empty registry with extension checking enabled.
    pub fn new() -> Self {
        Registry {
            rules: Vec::new(),
            check_extensions: true,
        }
    }

    /// A registry holding every built-in family.
    pub fn with_all() -> Self {
        let mut registry = Registry::new();
        registry.register_all();
        registry
    }

    /// Append `rule` unless a rule with the same id is already registered.
    /// Returns whether the rule was added.
    pub fn register(&mut self, rule: ProfileRule) -> bool {
        if self.is_registered(rule.id) {
            return false;
        }
        tracing::debug!("Registered profile family {}", rule.id);
        self.rules.push(rule);
        true
    }

    pub fn register_family(&mut self, family: ProfileFamily) -> bool {
        self.register(family.rule())
    }

    pub fn register_all(&mut self) {
        for family in ProfileFamily::ALL {
            self.register_family(family);
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.rules.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &ProfileRule> {
        self.rules.iter()
    }

    pub fn check_extensions(&self) -> bool {
        self.check_extensions
    }

    pub fn set_check_extensions(&mut self, check: bool) {
        self.check_extensions = check;
    }

    /// Walk the chain for an already probed file. Rules whose extension
    /// filter rejects `extension` are skipped without running their probe.
    pub fn match_profile(
        &self,
        container: ContainerType,
        codecs: &CodecParams,
        extension: &str,
    ) -> Option<ProfileDescriptor> {
        let ctx = ProbeContext {
            container,
            codecs,
            extension,
        };
        for rule in &self.rules {
            if self.check_extensions {
                if let Some(exts) = rule.extensions {
                    if !mime::match_extension(extension, exts) {
                        continue;
                    }
                }
            }
            if let Some(mut profile) = (rule.probe)(&ctx) {
                profile.class = rule.class;
                return Some(profile);
            }
        }
        None
    }

    /// Probe `path` with `demuxer`, sniff its container and run the chain.
    pub fn classify(&self, demuxer: &dyn Demuxer, path: &Path) -> Result<MediaItem, ClassifyError> {
        let mut file = File::open(path).map_err(|e| ClassifyError::io(path, e))?;
        let file_size = file
            .metadata()
            .map_err(|e| ClassifyError::io(path, e))?
            .len();
        let mut header = Vec::with_capacity(SNIFF_WINDOW);
        file.by_ref()
            .take(SNIFF_WINDOW as u64)
            .read_to_end(&mut header)
            .map_err(|e| ClassifyError::io(path, e))?;
        drop(file);

        let probed = demuxer.probe(path)?;
        let codecs = CodecParams::from_streams(&probed.streams)
            .ok_or_else(|| ClassifyError::UnsupportedContent(path.to_owned()))?;

        let extension = mime::extension_of(path);
        let container = container::detect(&probed.format_name, &extension, &header);

        let Some(profile) = self.match_profile(container, &codecs, &extension) else {
            tracing::debug!("No profile for {} ({:?})", path.display(), container);
            return Err(ClassifyError::NoProfileMatched(path.to_owned()));
        };
        tracing::debug!("{} -> {}", path.display(), profile);

        Ok(MediaItem::new(
            path.to_owned(),
            file_size,
            &probed,
            &codecs,
            Some(profile),
        ))
    }

    /// De-duplicated MIME types of every registered family, in registration order.
    pub fn supported_mime_types(&self) -> Vec<&'static str> {
        let mut mimes: Vec<&'static str> = Vec::new();
        let mut push = |m: &'static str| {
            if !mimes.contains(&m) {
                mimes.push(m);
            }
        };
        for rule in &self.rules {
            for profile in rule.profiles {
                push(profile.mime);
                // `_ISO` transport stream variants are served as video/mpeg.
                if profile.mime == MIME_VIDEO_MPEG_TS {
                    push(MIME_VIDEO_MPEG);
                }
            }
        }
        mimes
    }

    /// Find a descriptor by id among the registered families, including the
    /// `_T` and `_ISO` transport stream variants.
    pub fn find_profile(&self, id: &str) -> Option<ProfileDescriptor> {
        for rule in &self.rules {
            let found = lookup(rule.profiles, id)
                .or_else(|| {
                    let base = id.strip_suffix("_T")?;
                    lookup(rule.profiles, base)
                        .filter(|p| p.mime == MIME_VIDEO_MPEG_TS)
                        .map(|p| p.for_transport_stream(ContainerType::MpegTransportStreamDlna))
                })
                .or_else(|| {
                    let base = id.strip_suffix("_ISO")?;
                    lookup(rule.profiles, base)
                        .filter(|p| p.mime == MIME_VIDEO_MPEG_TS)
                        .map(|p| p.for_transport_stream(ContainerType::MpegTransportStream))
                });
            if let Some(mut profile) = found {
                profile.class = rule.class;
                return Some(profile);
            }
        }
        None
    }
}
