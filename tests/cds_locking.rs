use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use dlnadir::cds::{BrowseFlag, ContentDirectory, DidlObject};
use dlnadir::error::ClassifyError;
use dlnadir::media::codecs::{AudioCodec, AudioParams, StreamInfo};
use dlnadir::media::demux::{Demuxer, ProbedMedia};
use dlnadir::profiles::Registry;
use dlnadir::vfs::{VfsTree, ROOT_ID};

/// A demuxer that announces each probe and then stalls until released.
struct Stalled {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl Demuxer for Stalled {
    fn probe(&self, _path: &Path) -> Result<ProbedMedia, ClassifyError> {
        let _ = self.entered.lock().unwrap().send(());
        // Returns once the sending half is dropped.
        let _ = self.release.lock().unwrap().recv();
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
                sample_count: None,
            }],
            ..ProbedMedia::default()
        })
    }
}

#[test]
fn test_slow_classification_does_not_hold_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let song = dir.path().join("slow.mp3");
    std::fs::write(&song, vec![0u8; 64]).unwrap();
    let mut tree = VfsTree::new("root");
    let song_id = tree.add_resource(ROOT_ID, "slow", song).unwrap();

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let demuxer = Stalled {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let directory = Arc::new(ContentDirectory::new(
        tree,
        Arc::new(Registry::with_all()),
        Arc::new(demuxer),
    ));

    let slow_browse = {
        let directory = Arc::clone(&directory);
        thread::spawn(move || directory.browse(ROOT_ID, BrowseFlag::DirectChildren, 0, 0))
    };
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("first browse should reach the demuxer");

    let (done_tx, done_rx) = mpsc::channel();
    let writer = {
        let directory = Arc::clone(&directory);
        thread::spawn(move || {
            let added = directory.write().add_container(ROOT_ID, "Incoming").unwrap();
            let root = directory.browse(ROOT_ID, BrowseFlag::Metadata, 0, 0).unwrap();
            let _ = done_tx.send(());
            (added, root)
        })
    };
    let finished = done_rx.recv_timeout(Duration::from_secs(5));

    drop(release_tx);
    let (added, root) = writer.join().unwrap();
    let slow = slow_browse.join().unwrap().unwrap();

    assert!(
        finished.is_ok(),
        "the writer and a second browse should finish while classification is stalled"
    );
    match &root.objects[0] {
        DidlObject::Container(c) => assert_eq!(c.child_count, 2),
        other => panic!("expected the root container, got {other:?}"),
    }

    // The stalled browse answers from the tree as it was before the insert.
    assert_eq!(slow.number_returned, 1);
    assert_eq!(slow.objects[0].id(), song_id);
    assert!(slow.objects[0].as_item().unwrap().media.is_some());
    assert_ne!(added, song_id);

    // The classification made outside the lock is cached in the tree.
    let cached = directory.read().get(song_id).unwrap().as_resource().unwrap().media().cloned();
    assert!(matches!(cached, Some(Ok(_))));
}
