use dlnadir::error::VfsError;
use dlnadir::vfs::{TransportBinding, VfsTree, ROOT_ID};

fn root_update_id(tree: &VfsTree) -> u32 {
    tree.root().as_container().unwrap().update_id()
}

#[test]
fn test_new_tree_has_only_root() {
    let tree = VfsTree::new("Media");
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.root().id, ROOT_ID);
    assert_eq!(tree.root().title, "Media");
    assert!(tree.root().parent.is_none());
    assert_eq!(tree.root().as_container().unwrap().children_count(), 0);
    assert!(tree.is_empty());
}

#[test]
fn test_adding_children_bumps_update_id() {
    let mut tree = VfsTree::default();
    let before = root_update_id(&tree);

    for i in 0..7 {
        tree.add_resource(ROOT_ID, &format!("track {i}"), format!("/music/{i}.mp3"))
            .unwrap();
    }

    let root = tree.root().as_container().unwrap();
    assert_eq!(root.children_count(), 7);
    assert_eq!(root.children().len(), root.children_count());
    assert!(root.update_id() > before, "update id must increase after adds");
}

#[test]
fn test_children_keep_insertion_order() {
    let mut tree = VfsTree::default();
    let b = tree.add_container(ROOT_ID, "b").unwrap();
    let a = tree.add_container(ROOT_ID, "a").unwrap();
    let c = tree.add_resource(ROOT_ID, "c", "/c.mp3").unwrap();

    let ids: Vec<u32> = tree.children_of(ROOT_ID).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![b, a, c]);
    assert_eq!(tree.get(c).unwrap().parent, Some(ROOT_ID));
}

#[test]
fn test_remove_child_decrements_count_and_bumps_update_id() {
    let mut tree = VfsTree::default();
    let first = tree.add_resource(ROOT_ID, "one", "/1.mp3").unwrap();
    tree.add_resource(ROOT_ID, "two", "/2.mp3").unwrap();
    let before = root_update_id(&tree);

    tree.remove(first).unwrap();

    let root = tree.root().as_container().unwrap();
    assert_eq!(root.children_count(), 1);
    assert!(root.update_id() > before);
    assert!(tree.get(first).is_none());
}

#[test]
fn test_remove_container_drops_subtree() {
    let mut tree = VfsTree::default();
    let albums = tree.add_container(ROOT_ID, "Albums").unwrap();
    let album = tree.add_container(albums, "Blue").unwrap();
    let track = tree.add_resource(album, "Intro", "/blue/01.mp3").unwrap();
    assert_eq!(tree.node_count(), 4);

    assert!(!tree.is_empty());

    tree.remove(albums).unwrap();
    assert_eq!(tree.node_count(), 1);
    assert!(tree.is_empty(), "a root without children is empty again");
    assert!(tree.get(album).is_none());
    assert!(tree.get(track).is_none());
}

#[test]
fn test_ids_are_never_reused() {
    let mut tree = VfsTree::default();
    let first = tree.add_resource(ROOT_ID, "one", "/1.mp3").unwrap();
    tree.remove(first).unwrap();
    let second = tree.add_resource(ROOT_ID, "two", "/2.mp3").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_mutation_errors() {
    let mut tree = VfsTree::default();
    let song = tree.add_resource(ROOT_ID, "song", "/song.mp3").unwrap();

    assert_eq!(tree.remove(ROOT_ID), Err(VfsError::RootRemoval));
    assert_eq!(tree.remove(99), Err(VfsError::NoSuchNode(99)));
    assert_eq!(
        tree.add_resource(song, "nested", "/x.mp3"),
        Err(VfsError::NotAContainer(song))
    );
    assert_eq!(tree.add_container(42, "orphan"), Err(VfsError::NoSuchNode(42)));
    assert!(matches!(tree.children_of(song), Err(VfsError::NotAContainer(_))));
}

#[test]
fn test_system_update_id_tracks_every_mutation() {
    let mut tree = VfsTree::default();
    let start = tree.system_update_id();
    let folder = tree.add_container(ROOT_ID, "folder").unwrap();
    let song = tree.add_resource(folder, "song", "/song.mp3").unwrap();
    tree.relocate_resource(song, "/moved.mp3").unwrap();
    tree.remove(folder).unwrap();
    assert_eq!(tree.system_update_id(), start + 4);
}

#[test]
fn test_relocate_resource() {
    let mut tree = VfsTree::default();
    let folder = tree.add_container(ROOT_ID, "folder").unwrap();
    let song = tree.add_resource(folder, "song", "/old.mp3").unwrap();

    tree.relocate_resource(song, "/new.mp3").unwrap();
    let resource = tree.get(song).unwrap().as_resource().unwrap();
    assert_eq!(resource.path(), std::path::Path::new("/new.mp3"));
    assert!(resource.media().is_none(), "classification cache must be dropped");

    assert_eq!(
        tree.relocate_resource(folder, "/x"),
        Err(VfsError::NotAResource(folder))
    );
}

#[test]
fn test_resource_ids_in_pre_order() {
    let mut tree = VfsTree::default();
    let a = tree.add_container(ROOT_ID, "a").unwrap();
    let a1 = tree.add_resource(a, "a1", "/a1.mp3").unwrap();
    let top = tree.add_resource(ROOT_ID, "top", "/top.mp3").unwrap();
    let b = tree.add_container(a, "b").unwrap();
    let b1 = tree.add_resource(b, "b1", "/b1.mp3").unwrap();

    assert_eq!(tree.resource_ids(), vec![a1, b1, top]);
    assert_eq!(tree.find_container(ROOT_ID, "a"), Some(a));
    assert_eq!(tree.find_container(a, "b"), Some(b));
    assert_eq!(tree.find_container(ROOT_ID, "top"), None);
}

#[test]
fn test_bindings_survive_relocation() {
    let mut tree = VfsTree::default();
    let folder = tree.add_container(ROOT_ID, "folder").unwrap();
    let song = tree.add_resource(folder, "song", "/old.mp3").unwrap();
    let binding = TransportBinding {
        url: "http://127.0.0.1:8200/media/1".to_string(),
        flags: 0x01,
    };

    tree.add_binding(song, binding.clone()).unwrap();
    tree.relocate_resource(song, "/new.mp3").unwrap();
    let resource = tree.get(song).unwrap().as_resource().unwrap();
    assert_eq!(resource.bindings, vec![binding.clone()], "bindings must be kept");

    assert_eq!(
        tree.add_binding(folder, binding.clone()),
        Err(VfsError::NotAResource(folder))
    );
    assert_eq!(tree.add_binding(999, binding), Err(VfsError::NoSuchNode(999)));
}
