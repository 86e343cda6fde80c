//! DLNA `protocolInfo` strings.

use crate::profiles::ProfileDescriptor;

/// `DLNA.ORG_PS`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaySpeed {
    Invalid = 0,
    Normal = 1,
}

/// `DLNA.ORG_CI`: whether the resource is served as stored or converted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub enum Conversion {
    #[default]
    None = 0,
    Transcoded = 1,
}

/// `DLNA.ORG_OP` bits.
pub mod operation {
    pub const NONE: u8 = 0x00;
    pub const RANGE: u8 = 0x01;
    pub const TIMESEEK: u8 = 0x10;
}

/// `DLNA.ORG_FLAGS` primary flag bits.
pub mod flags {
    pub const SENDER_PACED: u32 = 1 << 31;
    pub const TIME_BASED_SEEK: u32 = 1 << 30;
    pub const BYTE_BASED_SEEK: u32 = 1 << 29;
    pub const PLAY_CONTAINER: u32 = 1 << 28;
    pub const S0_INCREASE: u32 = 1 << 27;
    pub const SN_INCREASE: u32 = 1 << 26;
    pub const RTSP_PAUSE: u32 = 1 << 25;
    pub const STREAMING_TRANSFER_MODE: u32 = 1 << 24;
    pub const INTERACTIVE_TRANSFER_MODE: u32 = 1 << 23;
    pub const BACKGROUND_TRANSFER_MODE: u32 = 1 << 22;
    pub const CONNECTION_STALL: u32 = 1 << 21;
    pub const DLNA_V15: u32 = 1 << 20;

    /// Streaming + background transfer, connection stall, DLNA 1.5.
    pub const DEFAULT: u32 =
        STREAMING_TRANSFER_MODE | BACKGROUND_TRANSFER_MODE | CONNECTION_STALL | DLNA_V15;
}

/// `http-get:*:<mime>:DLNA.ORG_PS=..;DLNA.ORG_CI=..;DLNA.ORG_OP=..;DLNA.ORG_PN=..;DLNA.ORG_FLAGS=..`
///
/// The flags field is the 8 hex digit primary flag word followed by 24
/// reserved zero digits.
pub fn protocol_info_string(
    profile: &ProfileDescriptor,
    speed: PlaySpeed,
    conversion: Conversion,
    operation: u8,
    flags: u32,
) -> String {
    format!(
        "http-get:*:{}:DLNA.ORG_PS={};DLNA.ORG_CI={};DLNA.ORG_OP={:02x};DLNA.ORG_PN={};DLNA.ORG_FLAGS={:08x}{:024x}",
        profile.mime, speed as u8, conversion as u8, operation, profile.id, flags, 0
    )
}
