use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dlnadir::cds::{search_capabilities, sort_capabilities, BrowseFlag, CdsView, DidlObject, Page, CONTAINER_CLASS};
use dlnadir::error::{CdsError, ClassifyError};
use dlnadir::media::codecs::{AudioCodec, AudioParams, StreamInfo};
use dlnadir::media::demux::{Demuxer, ProbedMedia};
use dlnadir::profiles::Registry;
use dlnadir::vfs::{VfsTree, ROOT_ID};

/// Reports every `.mp3` file as a 44.1 kHz stereo MP3 stream.
struct Mp3Stub;

impl Demuxer for Mp3Stub {
    fn probe(&self, path: &Path) -> Result<ProbedMedia, ClassifyError> {
        if path.extension().and_then(|e| e.to_str()) != Some("mp3") {
            return Err(ClassifyError::UnsupportedContent(path.to_owned()));
        }
        Ok(ProbedMedia {
            format_name: "mp3".to_string(),
            streams: vec![StreamInfo::Audio {
                params: AudioParams {
                    codec: AudioCodec::Mp3,
                    channels: 2,
                    sample_rate: 44100,
                    bit_rate: 128_000,
                    bits_per_sample: 16,
                },
                sample_count: Some(44100 * 3),
            }],
            tags: BTreeMap::from([("title".to_string(), "Stub".to_string())]),
            duration: None,
            bit_rate: None,
        })
    }
}

fn write_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; 512]).unwrap();
    path
}

/// Root with five children: two folders and three songs, one song nested.
fn five_child_tree(dir: &Path) -> (VfsTree, Vec<u32>) {
    let mut tree = VfsTree::new("root");
    let mut ids = Vec::new();
    ids.push(tree.add_container(ROOT_ID, "Albums").unwrap());
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        let path = write_file(dir, name);
        ids.push(tree.add_resource(ROOT_ID, name, path).unwrap());
    }
    ids.push(tree.add_container(ROOT_ID, "Singles").unwrap());
    let nested = write_file(dir, "nested.mp3");
    tree.add_resource(ids[0], "nested", nested).unwrap();
    (tree, ids)
}

#[test]
fn test_browse_children_zero_zero_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, ids) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let result = view.browse_children(ROOT_ID, 0, 0).unwrap();
    let returned: Vec<u32> = result.objects.iter().map(DidlObject::id).collect();
    assert_eq!(returned, ids);
    assert_eq!(result.number_returned, 5);
    assert_eq!(result.total_matches, 5);
}

#[test]
fn test_browse_children_pagination_window() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, ids) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let result = view.browse_children(ROOT_ID, 2, 1).unwrap();
    assert_eq!(result.objects.len(), 1);
    assert_eq!(result.objects[0].id(), ids[2], "should return exactly the 3rd child");
    assert_eq!(result.number_returned, 1);
    assert_eq!(result.total_matches, 5);
}

#[test]
fn test_browse_children_past_the_end() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let result = view.browse_children(ROOT_ID, 10, 3).unwrap();
    assert!(result.objects.is_empty());
    assert_eq!(result.total_matches, 5);

    let tail = view.browse_children(ROOT_ID, 3, 0).unwrap();
    assert_eq!(tail.number_returned, 2, "count 0 returns the rest");
}

#[test]
fn test_page_window_and_total() {
    let children = [10, 11, 12, 13, 14];
    let page = Page::of(&children, 1, 2);
    assert_eq!(page.ids, &[11, 12]);
    assert_eq!(page.total_matches, 5);

    assert_eq!(Page::of(&children, 0, 0).ids, &children);
    assert_eq!(Page::of(&children, 4, 9).ids, &[14]);
    let past = Page::of(&children, 6, 1);
    assert!(past.ids.is_empty());
    assert_eq!(past.total_matches, 5, "total ignores the window");
    assert!(Page::of(&[], 0, 0).ids.is_empty());
}

#[test]
fn test_children_describe_containers_and_items() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let result = view.browse_children(ROOT_ID, 0, 2).unwrap();
    let DidlObject::Container(albums) = &result.objects[0] else {
        panic!("first child should be a container");
    };
    assert_eq!(albums.title, "Albums");
    assert_eq!(albums.child_count, 1);
    assert_eq!(albums.class, CONTAINER_CLASS);
    assert_eq!(albums.parent_id, Some(ROOT_ID));

    let song = result.objects[1].as_item().expect("second child should be an item");
    assert_eq!(song.class, Some("object.item.audioItem.musicTrack"));
    let media = song.media.as_ref().expect("song should be classified");
    assert_eq!(media.profile.as_ref().unwrap().id, "MP3");
    assert_eq!(media.properties.duration.as_deref(), Some("00:00:03"));
    assert_eq!(media.metadata.title.as_deref(), Some("Stub"));
    assert!(song
        .protocol_info
        .as_deref()
        .unwrap()
        .starts_with("http-get:*:audio/mpeg:DLNA.ORG_PS=1;DLNA.ORG_CI=0;DLNA.ORG_OP=01;DLNA.ORG_PN=MP3;"));
}

#[test]
fn test_browse_metadata_of_container() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let result = view.browse_metadata(ROOT_ID).unwrap();
    assert_eq!(result.number_returned, 1);
    assert_eq!(result.total_matches, 1);
    assert_eq!(result.update_id, tree.root().as_container().unwrap().update_id());
    let DidlObject::Container(root) = &result.objects[0] else {
        panic!("root should be a container");
    };
    assert_eq!(root.parent_id, None);
    assert_eq!(root.child_count, 5);
    assert!(root.restricted);
}

#[test]
fn test_browse_metadata_of_resource_reports_parent_update_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = VfsTree::new("root");
    let folder = tree.add_container(ROOT_ID, "folder").unwrap();
    let song = tree.add_resource(folder, "song", write_file(dir.path(), "song.mp3")).unwrap();
    tree.add_container(folder, "extra").unwrap();
    tree.add_container(folder, "more").unwrap();

    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);
    let result = view.browse_metadata(song).unwrap();

    let folder_update = tree.get(folder).unwrap().as_container().unwrap().update_id();
    assert_eq!(result.update_id, folder_update);
    assert_eq!(result.objects[0].as_item().unwrap().parent_id, Some(folder));
}

#[test]
fn test_unclassifiable_resource_is_still_browsable() {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = VfsTree::new("root");
    let notes = tree.add_resource(ROOT_ID, "notes", write_file(dir.path(), "notes.ogg")).unwrap();
    let missing = tree.add_resource(ROOT_ID, "gone", dir.path().join("gone.mp3")).unwrap();

    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);
    let result = view.browse_children(ROOT_ID, 0, 0).unwrap();
    assert_eq!(result.number_returned, 2);
    for object in &result.objects {
        let item = object.as_item().unwrap();
        assert!(item.media.is_none());
        assert!(item.class.is_none());
        assert!(item.protocol_info.is_none());
    }

    let cached = tree.get(missing).unwrap().as_resource().unwrap().media().unwrap();
    assert!(matches!(cached.as_ref().unwrap_err().as_ref(), ClassifyError::Io { .. }));
    let cached = tree.get(notes).unwrap().as_resource().unwrap().media().unwrap();
    assert!(matches!(
        cached.as_ref().unwrap_err().as_ref(),
        ClassifyError::UnsupportedContent(_)
    ));
}

#[test]
fn test_browse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, ids) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let missing = view.browse_metadata(999).unwrap_err();
    assert_eq!(missing, CdsError::NoSuchObject(999));
    assert_eq!(missing.upnp_code(), 701);

    assert_eq!(
        view.browse_children(999, 0, 0).unwrap_err(),
        CdsError::NoSuchObject(999)
    );

    let on_item = view.browse_children(ids[1], 0, 0).unwrap_err();
    assert!(matches!(on_item, CdsError::ModeError(_)));
    assert_eq!(on_item.upnp_code(), 720);
}

#[test]
fn test_browse_dispatch_by_flag() {
    let dir = tempfile::tempdir().unwrap();
    let (tree, _) = five_child_tree(dir.path());
    let registry = Registry::with_all();
    let view = CdsView::new(&tree, &registry, &Mp3Stub);

    let flag: BrowseFlag = "BrowseDirectChildren".parse().unwrap();
    assert_eq!(view.browse(ROOT_ID, flag, 0, 0).unwrap().number_returned, 5);

    let flag: BrowseFlag = "BrowseMetadata".parse().unwrap();
    assert_eq!(view.browse(ROOT_ID, flag, 0, 0).unwrap().number_returned, 1);
    assert!(matches!(
        view.browse(ROOT_ID, flag, 1, 0),
        Err(CdsError::ModeError(_))
    ));

    let bad = "BrowseEverything".parse::<BrowseFlag>().unwrap_err();
    assert!(matches!(bad, CdsError::InvalidArgs(_)));
    assert_eq!(bad.upnp_code(), 402);
}

#[test]
fn test_capabilities_are_empty() {
    assert_eq!(search_capabilities(), "");
    assert_eq!(sort_capabilities(), "");
}
