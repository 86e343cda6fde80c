use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::error::ClassifyError;
use crate::media::codecs::{AacObject, AudioCodec, AudioParams, StreamInfo, VideoCodec, VideoParams};
use crate::media::headers::{aac_channels, Ac3Header, AdtsHeader, AudioSpecificConfig, Frame, MpegAudioHeader};
use crate::media::mime::{self, MediaKind, FORMAT_MOV_FAMILY};
use crate::media::{asf, elementary, mpeg};

/// Per-file summary produced by a demuxer: the logical container format
/// name, every stream, container-level tags and the overall duration.
#[derive(Debug, Clone, Default)]
pub struct ProbedMedia {
    /// Demuxer format name, e.g. `"mp3"`, `"mpegts"` or `"image2"`.
    pub format_name: String,
    pub streams: Vec<StreamInfo>,
    /// Tag dictionary with lowercase keys (`title`, `artist`, `author`,
    /// `album`, `comment`, `genre`, `track`).
    pub tags: BTreeMap<String, String>,
    pub duration: Option<Duration>,
    /// Overall container bit rate in bits per second.
    pub bit_rate: Option<u64>,
}

/// Source of stream and tag information for a media file.
///
/// Implementations must be usable from several classification threads at once.
pub trait Demuxer: Send + Sync {
    fn probe(&self, path: &Path) -> Result<ProbedMedia, ClassifyError>;
}

/// The stock demuxer.
///
/// MPEG system streams, ASF, AMR, AC-3 and framed MP3/ADTS audio are parsed
/// natively. `symphonia` supplies tags and reads WAV, `mp4` reads the ISO
/// base media family and `imagesize` still pictures.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDemuxer;

impl Demuxer for FileDemuxer {
    fn probe(&self, path: &Path) -> Result<ProbedMedia, ClassifyError> {
        let Some((kind, format_name)) = mime::classify(path) else {
            return Err(ClassifyError::UnsupportedContent(path.to_owned()));
        };

        match (kind, format_name) {
            (MediaKind::Image, _) => probe_image(path, format_name),
            (_, FORMAT_MOV_FAMILY) => probe_mp4(path, format_name),
            (_, "mp3") => probe_tagged_frames::<MpegAudioHeader>(path, format_name),
            (_, "aac") => probe_tagged_frames::<AdtsHeader>(path, format_name),
            (_, "ac3") => elementary::probe_framed::<Ac3Header>(path, format_name)?
                .ok_or_else(|| ClassifyError::UnsupportedContent(path.to_owned())),
            (_, "amr") => elementary::probe_amr(path, format_name)?
                .ok_or_else(|| ClassifyError::UnsupportedContent(path.to_owned())),
            (_, "mpeg" | "mpegts") => mpeg::probe(path, format_name),
            (_, "asf") => asf::probe(path, format_name),
            (_, "wav") => probe_symphonia(path, format_name),
            _ => {
                tracing::debug!("No demuxer for {} ({})", path.display(), format_name);
                Err(ClassifyError::UnsupportedContent(path.to_owned()))
            }
        }
    }
}

/// Walk the frames natively and take the tags from `symphonia`. Streams
/// without a recognisable frame go to `symphonia` alone.
fn probe_tagged_frames<F: Frame>(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    let Some(mut probed) = elementary::probe_framed::<F>(path, format_name)? else {
        return probe_symphonia(path, format_name);
    };
    match probe_symphonia(path, format_name) {
        Ok(tagged) => probed.tags = tagged.tags,
        Err(e) => tracing::debug!("No tags for {}: {}", path.display(), e),
    }
    Ok(probed)
}

fn probe_image(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    let dim = imagesize::size(path).map_err(|e| match e {
        imagesize::ImageError::IoError(source) => ClassifyError::io(path, source),
        other => {
            tracing::debug!("Cannot read image dimensions for {}: {}", path.display(), other);
            ClassifyError::UnsupportedContent(path.to_owned())
        }
    })?;

    let codec = match mime::extension_of(path).as_str() {
        "png" => VideoCodec::Png,
        _ => VideoCodec::Jpeg,
    };

    Ok(ProbedMedia {
        format_name: format_name.to_string(),
        streams: vec![StreamInfo::Video(VideoParams {
            codec,
            width: dim.width as u32,
            height: dim.height as u32,
            frame_rate: None,
            bit_rate: 0,
        })],
        ..ProbedMedia::default()
    })
}

fn probe_mp4(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    use mp4::{MediaType, TrackType};

    let file = File::open(path).map_err(|e| ClassifyError::io(path, e))?;
    let file_len = file
        .metadata()
        .map_err(|e| ClassifyError::io(path, e))?
        .len();

    let mp4 = match mp4::Mp4Reader::read_header(BufReader::new(file), file_len) {
        Ok(mp4) => mp4,
        Err(e) => {
            tracing::debug!("Cannot read MP4 header of {}: {}, trying symphonia", path.display(), e);
            return probe_symphonia(path, format_name);
        }
    };

    // Track order decides which stream is "first".
    let mut track_ids: Vec<u32> = mp4.tracks().keys().copied().collect();
    track_ids.sort_unstable();

    let mut streams = Vec::with_capacity(track_ids.len());
    let mut total_bit_rate = 0u64;
    for id in track_ids {
        let Some(track) = mp4.tracks().get(&id) else {
            continue;
        };
        total_bit_rate += u64::from(track.bitrate());
        let stream = match track.track_type() {
            Ok(TrackType::Video) => StreamInfo::Video(VideoParams {
                codec: match track.media_type() {
                    Ok(MediaType::H264) => VideoCodec::H264,
                    _ => VideoCodec::Other,
                },
                width: u32::from(track.width()),
                height: u32::from(track.height()),
                frame_rate: Some(((track.frame_rate() * 1000.0).round() as u32, 1000)),
                bit_rate: track.bitrate(),
            }),
            Ok(TrackType::Audio) => {
                // The object type comes from the esds decoder config; LC when the
                // track has none.
                let codec = match track.media_type() {
                    Ok(MediaType::AAC) => match track.audio_profile() {
                        Ok(aot) => AacObject::from_object_type(aot as u8).map_or(AudioCodec::Other, AudioCodec::Aac),
                        Err(_) => AudioCodec::Aac(AacObject::LowComplexity),
                    },
                    _ => AudioCodec::Other,
                };
                StreamInfo::Audio {
                    params: AudioParams {
                        codec,
                        channels: track.channel_config().map(|c| aac_channels(c as u8)).unwrap_or(0),
                        sample_rate: track.sample_freq_index().map(|f| f.freq()).unwrap_or(0),
                        bit_rate: track.bitrate(),
                        bits_per_sample: 0,
                    },
                    sample_count: None,
                }
            }
            _ => StreamInfo::Other,
        };
        streams.push(stream);
    }

    let duration = mp4.duration();
    Ok(ProbedMedia {
        format_name: format_name.to_string(),
        streams,
        tags: BTreeMap::new(),
        duration: (!duration.is_zero()).then_some(duration),
        bit_rate: (total_bit_rate > 0).then_some(total_bit_rate),
    })
}

fn probe_symphonia(path: &Path, format_name: &str) -> Result<ProbedMedia, ClassifyError> {
    use symphonia::core::codecs::{
        CODEC_TYPE_AAC, CODEC_TYPE_FLAC, CODEC_TYPE_MP1, CODEC_TYPE_MP2, CODEC_TYPE_MP3,
        CODEC_TYPE_NULL, CODEC_TYPE_PCM_S16BE, CODEC_TYPE_PCM_S16LE, CODEC_TYPE_VORBIS,
    };
    use symphonia::core::errors::Error as SymphoniaError;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::probe::Hint;

    let file = File::open(path).map_err(|e| ClassifyError::io(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(&hint, mss, &Default::default(), &Default::default())
        .map_err(|e| match e {
            SymphoniaError::IoError(source) => ClassifyError::io(path, source),
            other => {
                tracing::debug!("Cannot probe {}: {}", path.display(), other);
                ClassifyError::UnsupportedContent(path.to_owned())
            }
        })?;

    let mut tags = BTreeMap::new();
    if let Some(meta) = probed.metadata.get() {
        if let Some(revision) = meta.current() {
            collect_tags(revision, &mut tags);
        }
    }
    if let Some(revision) = probed.format.metadata().current() {
        collect_tags(revision, &mut tags);
    }

    let mut duration = None;
    let mut streams = Vec::new();
    for track in probed.format.tracks() {
        let cp = &track.codec_params;
        if cp.codec == CODEC_TYPE_NULL {
            streams.push(StreamInfo::Other);
            continue;
        }
        let codec = match cp.codec {
            c if c == CODEC_TYPE_MP1 => AudioCodec::Mp1,
            c if c == CODEC_TYPE_MP2 => AudioCodec::Mp2,
            c if c == CODEC_TYPE_MP3 => AudioCodec::Mp3,
            c if c == CODEC_TYPE_AAC => cp
                .extra_data
                .as_deref()
                .and_then(AudioSpecificConfig::parse)
                .map_or(AudioCodec::Aac(AacObject::LowComplexity), |asc| asc.codec()),
            c if c == CODEC_TYPE_PCM_S16LE => AudioCodec::PcmS16Le,
            c if c == CODEC_TYPE_PCM_S16BE => AudioCodec::PcmS16Be,
            c if c == CODEC_TYPE_FLAC => AudioCodec::Flac,
            c if c == CODEC_TYPE_VORBIS => AudioCodec::Vorbis,
            _ => AudioCodec::Other,
        };

        if duration.is_none() {
            duration = cp.time_base.zip(cp.n_frames).map(|(tb, n)| {
                let t = tb.calc_time(n);
                Duration::from_secs(t.seconds) + Duration::from_secs_f64(t.frac)
            });
        }

        streams.push(StreamInfo::Audio {
            params: AudioParams {
                codec,
                channels: cp.channels.map(|c| c.count() as u32).unwrap_or(0),
                sample_rate: cp.sample_rate.unwrap_or(0),
                bit_rate: 0,
                bits_per_sample: cp.bits_per_sample.unwrap_or(0),
            },
            sample_count: cp.n_frames,
        });
    }

    if duration.is_none() {
        tracing::debug!("No duration for {} (n_frames unavailable)", path.display());
    }

    Ok(ProbedMedia {
        format_name: format_name.to_string(),
        streams,
        tags,
        duration,
        bit_rate: None,
    })
}

fn collect_tags(revision: &symphonia::core::meta::MetadataRevision, tags: &mut BTreeMap<String, String>) {
    use symphonia::core::meta::StandardTagKey;

    for tag in revision.tags() {
        let key = match tag.std_key {
            Some(StandardTagKey::TrackTitle) => "title",
            Some(StandardTagKey::Artist) => "artist",
            Some(StandardTagKey::AlbumArtist) => "album_artist",
            Some(StandardTagKey::Album) => "album",
            Some(StandardTagKey::Comment) => "comment",
            Some(StandardTagKey::Genre) => "genre",
            Some(StandardTagKey::TrackNumber) => "track",
            _ => continue,
        };
        tags.entry(key.to_string())
            .or_insert_with(|| tag.value.to_string());
    }
}
