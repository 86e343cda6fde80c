use std::path::PathBuf;

use dlnadir::media::scanner::scan;
use dlnadir::vfs::{VfsTree, ROOT_ID};

#[test]
fn test_scan_nonexistent_path_leaves_tree_empty() {
    let mut tree = VfsTree::default();
    let paths = vec![PathBuf::from("/nonexistent/path/does/not/exist")];
    let stats = scan(&paths, &mut tree, true);
    assert_eq!(stats.resources(), 0);
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_scan_empty_paths() {
    let mut tree = VfsTree::default();
    let stats = scan(&[], &mut tree, true);
    assert_eq!(stats, Default::default());
}

#[test]
fn test_scan_builds_folders_and_resources() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("media");
    std::fs::create_dir_all(root.join("Albums/Blue")).unwrap();
    std::fs::create_dir_all(root.join("Photos")).unwrap();
    std::fs::write(root.join("Albums/Blue/01 Intro.mp3"), b"x").unwrap();
    std::fs::write(root.join("Albums/Blue/02 Outro.MP3"), b"x").unwrap();
    std::fs::write(root.join("Albums/Blue/cover.txt"), b"x").unwrap();
    std::fs::write(root.join("Photos/beach.jpg"), b"x").unwrap();
    std::fs::write(root.join("clip.mp4"), b"x").unwrap();

    let mut tree = VfsTree::new("root");
    let stats = scan(&[root.clone()], &mut tree, true);

    assert_eq!(stats.audio, 2);
    assert_eq!(stats.image, 1);
    assert_eq!(stats.video, 1);
    assert_eq!(stats.containers, 4, "media, Albums, Blue, Photos");

    let media = tree.find_container(ROOT_ID, "media").expect("scan root becomes a container");
    let albums = tree.find_container(media, "Albums").unwrap();
    let blue = tree.find_container(albums, "Blue").unwrap();
    let titles: Vec<String> = tree
        .children_of(blue)
        .unwrap()
        .iter()
        .map(|n| n.title.clone())
        .collect();
    assert_eq!(titles, vec!["01 Intro", "02 Outro"], "sorted, extension dropped, non-media skipped");

    let top: Vec<String> = tree
        .children_of(media)
        .unwrap()
        .iter()
        .map(|n| n.title.clone())
        .collect();
    assert_eq!(top, vec!["Albums", "Photos", "clip"]);

    let intro = tree.children_of(blue).unwrap()[0].id;
    let resource = tree.get(intro).unwrap().as_resource().unwrap();
    assert_eq!(resource.path(), root.join("Albums/Blue/01 Intro.mp3"));
    assert!(resource.media().is_none(), "scanning does not classify");
}

#[test]
fn test_scan_several_roots() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    std::fs::write(a.path().join("one.mp3"), b"x").unwrap();
    std::fs::write(b.path().join("two.png"), b"x").unwrap();

    let mut tree = VfsTree::default();
    let stats = scan(&[a.path().to_path_buf(), b.path().to_path_buf()], &mut tree, false);
    assert_eq!(stats.resources(), 2);
    assert_eq!(tree.root().as_container().unwrap().children_count(), 2);
    assert_eq!(tree.resource_ids().len(), 2);
}
