use std::path::Path;

use dlnadir::media::mime::{classify, extension_of, match_extension, MediaKind, FORMAT_MOV_FAMILY};

#[test]
fn test_mp4_classified_as_video() {
    let (kind, format) = classify(Path::new("movie.mp4")).unwrap();
    assert_eq!(kind, MediaKind::Video);
    assert_eq!(format, FORMAT_MOV_FAMILY);
}

#[test]
fn test_transport_streams_use_mpegts_format() {
    for name in ["a.ts", "b.m2ts", "c.tts"] {
        let (kind, format) = classify(Path::new(name)).unwrap();
        assert_eq!(kind, MediaKind::Video);
        assert_eq!(format, "mpegts", "{} should sniff as mpegts", name);
    }
}

#[test]
fn test_txt_returns_none() {
    assert!(classify(Path::new("readme.txt")).is_none());
}

#[test]
fn test_no_extension_returns_none() {
    assert!(classify(Path::new("Makefile")).is_none());
}

#[test]
fn test_case_insensitive() {
    // Extensions should be lowercased before matching
    let result = classify(Path::new("MOVIE.MP4"));
    assert!(result.is_some());
    assert_eq!(extension_of(Path::new("MOVIE.MP4")), "mp4");
}

#[test]
fn test_mp3_classified_as_audio() {
    let (kind, format) = classify(Path::new("song.mp3")).unwrap();
    assert_eq!(kind, MediaKind::Audio);
    assert_eq!(format, "mp3");
}

#[test]
fn test_jpeg_classified_as_image() {
    let (kind, format) = classify(Path::new("photo.jpg")).unwrap();
    assert_eq!(kind, MediaKind::Image);
    assert_eq!(format, "image2");
}

#[test]
fn test_mkv_is_not_indexed() {
    assert!(classify(Path::new("video.mkv")).is_none());
}

#[test]
fn test_extension_lists() {
    assert!(match_extension("mp3", "mp3"));
    assert!(match_extension("M4A", "aac,adts,m4a"));
    assert!(match_extension("ts", "mpg, ts"));
    assert!(!match_extension("mp", "mp3,mp4"));
    assert!(!match_extension("", "mp3"));
}
