use dlnadir::profiles::protocol::{flags, operation, protocol_info_string, Conversion, PlaySpeed};
use dlnadir::profiles::{ProfileDescriptor, Registry};

#[test]
fn test_layout_matches_dlna_protocol_info() {
    let profile = ProfileDescriptor::new("MP3", "audio/mpeg", None);
    let info = protocol_info_string(
        &profile,
        PlaySpeed::Normal,
        Conversion::None,
        operation::RANGE,
        flags::DEFAULT,
    );
    assert_eq!(
        info,
        "http-get:*:audio/mpeg:DLNA.ORG_PS=1;DLNA.ORG_CI=0;DLNA.ORG_OP=01;DLNA.ORG_PN=MP3;\
         DLNA.ORG_FLAGS=01700000000000000000000000000000"
    );
}

#[test]
fn test_flags_field_is_32_hex_digits() {
    let profile = ProfileDescriptor::new("JPEG_TN", "image/jpeg", None);
    let info = protocol_info_string(
        &profile,
        PlaySpeed::Invalid,
        Conversion::Transcoded,
        operation::TIMESEEK | operation::RANGE,
        flags::SENDER_PACED | flags::DLNA_V15,
    );
    let flags_field = info.rsplit("DLNA.ORG_FLAGS=").next().unwrap();
    assert_eq!(flags_field.len(), 32);
    assert_eq!(flags_field, "80100000000000000000000000000000");
    assert!(info.contains("DLNA.ORG_PS=0;DLNA.ORG_CI=1;DLNA.ORG_OP=11;"));
}

#[test]
fn test_transport_stream_variant_uses_its_own_mime_and_id() {
    let registry = Registry::with_all();
    let iso = registry.find_profile("MPEG_TS_SD_EU_ISO").unwrap();
    let info = protocol_info_string(&iso, PlaySpeed::Normal, Conversion::None, operation::NONE, 0);
    assert!(info.starts_with("http-get:*:video/mpeg:"));
    assert!(info.contains("DLNA.ORG_OP=00;DLNA.ORG_PN=MPEG_TS_SD_EU_ISO;"));
}
