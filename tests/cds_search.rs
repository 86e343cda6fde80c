use std::path::{Path, PathBuf};
use std::sync::Arc;

use dlnadir::cds::search::{matches, Clause, SearchTarget};
use dlnadir::cds::{CdsView, ContentDirectory};
use dlnadir::error::{CdsError, ClassifyError};
use dlnadir::media::codecs::{AudioCodec, AudioParams, StreamInfo, VideoCodec, VideoParams};
use dlnadir::media::demux::{Demuxer, ProbedMedia};
use dlnadir::profiles::Registry;
use dlnadir::vfs::{VfsTree, ROOT_ID};

const MUSIC_TRACK: &str = "(upnp:class = \"object.item.audioItem.musicTrack\")";

/// `.mp3` files are MP3 audio, `.jpg` files are 640x480 JPEG pictures.
struct Stub;

impl Demuxer for Stub {
    fn probe(&self, path: &Path) -> Result<ProbedMedia, ClassifyError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("mp3") => Ok(ProbedMedia {
                format_name: "mp3".to_string(),
                streams: vec![StreamInfo::Audio {
                    params: AudioParams {
                        codec: AudioCodec::Mp3,
                        channels: 2,
                        sample_rate: 48000,
                        bit_rate: 192_000,
                        bits_per_sample: 16,
                    },
                    sample_count: None,
                }],
                ..ProbedMedia::default()
            }),
            Some("jpg") => Ok(ProbedMedia {
                format_name: "image2".to_string(),
                streams: vec![StreamInfo::Video(VideoParams {
                    codec: VideoCodec::Jpeg,
                    width: 640,
                    height: 480,
                    frame_rate: None,
                    bit_rate: 0,
                })],
                ..ProbedMedia::default()
            }),
            _ => Err(ClassifyError::UnsupportedContent(path.to_owned())),
        }
    }
}

fn write_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"stub").unwrap();
    path
}

/// root
/// ├── one.mp3
/// ├── Music/
/// │   ├── Deep/
/// │   │   └── three.mp3
/// │   └── two.mp3
/// └── photo.jpg
fn library(dir: &Path) -> (VfsTree, [u32; 3]) {
    let mut tree = VfsTree::new("root");
    let one = tree.add_resource(ROOT_ID, "one", write_file(dir, "one.mp3")).unwrap();
    let music = tree.add_container(ROOT_ID, "Music").unwrap();
    let deep = tree.add_container(music, "Deep").unwrap();
    let three = tree.add_resource(deep, "three", write_file(dir, "three.mp3")).unwrap();
    let two = tree.add_resource(music, "two", write_file(dir, "two.mp3")).unwrap();
    tree.add_resource(ROOT_ID, "photo", write_file(dir, "photo.jpg")).unwrap();
    (tree, [one, three, two])
}

fn ids(result: &dlnadir::cds::SearchResult) -> Vec<u32> {
    result.objects.iter().map(|o| o.id()).collect()
}

#[test]
fn test_class_equals_finds_audio_at_any_depth() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, audio) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let result = view.search(ROOT_ID, MUSIC_TRACK, 0, 0).unwrap();
    assert_eq!(ids(&result), audio.to_vec(), "pre-order walk, resources only");
    assert_eq!(result.number_returned, 3);
    assert_eq!(result.total_matches, 3);
}

#[test]
fn test_derivedfrom_is_a_prefix_match() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let items = view
        .search(ROOT_ID, "(upnp:class derivedfrom \"object.item\")", 0, 0)
        .unwrap();
    assert_eq!(items.number_returned, 4);

    let images = view
        .search(ROOT_ID, "(upnp:class derivedfrom \"object.item.imageItem\")", 0, 0)
        .unwrap();
    assert_eq!(images.number_returned, 1);
    assert_eq!(images.objects[0].title(), "photo");
}

#[test]
fn test_protocol_info_contains() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let result = view
        .search(ROOT_ID, "(res@protocolInfo contains \"DLNA.ORG_PN=JPEG_SM\")", 0, 0)
        .unwrap();
    assert_eq!(result.number_returned, 1);
}

#[test]
fn test_conjunction_requires_every_clause() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let both = "(upnp:class derivedfrom \"object.item.audioItem\") and (res@protocolInfo contains \"audio/mpeg\")";
    assert_eq!(view.search(ROOT_ID, both, 0, 0).unwrap().number_returned, 3);

    let contradiction = "(upnp:class derivedfrom \"object.item.audioItem\") and (res@protocolInfo contains \"image/jpeg\")";
    assert_eq!(view.search(ROOT_ID, contradiction, 0, 0).unwrap().number_returned, 0);
}

#[test]
fn test_unmatchable_criteria_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    for criteria in ["(upnp:class = \"object.item.videoItem.movie\")", "dc:title contains \"x\"", ""] {
        let result = view.search(ROOT_ID, criteria, 0, 0).unwrap();
        assert_eq!(result.number_returned, 0, "criteria {:?} should match nothing", criteria);
        assert_eq!(result.total_matches, 0);
    }
}

#[test]
fn test_requested_count_caps_results() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, audio) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let result = view.search(ROOT_ID, MUSIC_TRACK, 0, 2).unwrap();
    assert_eq!(ids(&result), audio[..2].to_vec());
    assert_eq!(result.total_matches, 2, "total matches equals what was returned");
}

#[test]
fn test_search_scope_and_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, audio) = library(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let music = tree.find_container(ROOT_ID, "Music").unwrap();
    let scoped = view.search(music, MUSIC_TRACK, 0, 0).unwrap();
    assert_eq!(ids(&scoped), vec![audio[1], audio[2]]);

    let unknown = view.search(4242, MUSIC_TRACK, 0, 0).unwrap();
    assert_eq!(unknown.number_returned, 3, "unknown ids search from the root");

    assert_eq!(
        view.search(audio[0], MUSIC_TRACK, 0, 0).unwrap_err(),
        CdsError::InvalidContainer(audio[0])
    );
}

#[test]
fn test_clause_parsing() {
    assert_eq!(Clause::parse(MUSIC_TRACK), Clause::ClassEquals("object.item.audioItem.musicTrack"));
    assert_eq!(
        Clause::parse("(upnp:class derivedfrom \"object.item\") and (x)"),
        Clause::ClassDerivedFrom("object.item")
    );
    assert_eq!(
        Clause::parse("(res@protocolInfo contains \"MP3\")"),
        Clause::ProtocolContains("MP3")
    );
    assert_eq!(Clause::parse("*"), Clause::Any);
    assert_eq!(Clause::parse(" * "), Clause::Any);
    assert_eq!(Clause::parse("dc:title = \"*\""), Clause::Object);
}

#[test]
fn test_wildcard_selects_every_resource() {
    let dir = tempfile::tempdir().unwrap();
    let (mut tree, audio) = library(dir.path());
    let notes = tree.add_resource(ROOT_ID, "notes", write_file(dir.path(), "notes.txt")).unwrap();
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Stub);

    let result = view.search(ROOT_ID, "*", 0, 0).unwrap();
    assert_eq!(result.number_returned, 5, "wildcard should return every resource");
    assert_eq!(ids(&result)[..3], audio, "pre-order walk");
    assert_eq!(ids(&result)[4], notes, "unclassified resources are included");
    assert!(result.objects[4].as_item().unwrap().media.is_none());

    assert!(matches("*", &SearchTarget::default()));
    assert!(!matches("**", &SearchTarget::default()));
}

#[test]
fn test_object_keyword_fallback() {
    let object = SearchTarget { class: Some("object"), protocol_info: None };
    let track = SearchTarget {
        class: Some("object.item.audioItem.musicTrack"),
        protocol_info: None,
    };
    assert!(matches("anything at all", &object));
    assert!(!matches("anything at all", &track));
    assert!(!matches(MUSIC_TRACK, &SearchTarget::default()));
}

#[tokio::test]
async fn test_shared_directory_search_after_preload() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, audio) = library(dir.path());
    let directory = Arc::new(ContentDirectory::new(
        tree,
        Arc::new(Registry::with_all()),
        Arc::new(Stub),
    ));

    let tasks: Vec<_> = directory
        .read()
        .resource_ids()
        .into_iter()
        .map(|id| {
            let directory = Arc::clone(&directory);
            tokio::task::spawn_blocking(move || directory.classify_resource(id))
        })
        .collect();
    for task in tasks {
        let outcome = task.await.unwrap().expect("every id is a resource");
        assert!(outcome.is_ok());
    }

    let result = directory.search(ROOT_ID, MUSIC_TRACK, 0, 0).unwrap();
    assert_eq!(ids(&result), audio.to_vec());
    assert!(directory.classify_resource(ROOT_ID).is_none());
}

#[test]
fn test_directory_flags_reach_protocol_info() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, audio) = library(dir.path());
    let directory = ContentDirectory::new(tree, Arc::new(Registry::with_all()), Arc::new(Stub))
        .with_flags(dlnadir::profiles::protocol::flags::DLNA_V15);

    let result = directory.search(ROOT_ID, MUSIC_TRACK, 0, 1).unwrap();
    let item = result.objects[0].as_item().unwrap();
    assert_eq!(item.id, audio[0]);
    let info = item.protocol_info.as_deref().unwrap();
    assert!(
        info.ends_with(&format!("DLNA.ORG_FLAGS=00100000{}", "0".repeat(24))),
        "unexpected protocol info {info}"
    );
    assert_eq!(directory.system_update_id(), directory.read().system_update_id());
}
