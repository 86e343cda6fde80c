use std::path::PathBuf;

/// Why a file could not be given a DLNA profile.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The demuxer found no audio or video stream it could describe.
    #[error("no usable audio or video stream in {0}")]
    UnsupportedContent(PathBuf),
    /// Probing succeeded but no registered rule accepted the file.
    /// This is an expected outcome for non-DLNA media, not a fault.
    #[error("no DLNA profile matches {0}")]
    NoProfileMatched(PathBuf),
}

impl ClassifyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClassifyError::Io { path: path.into(), source }
    }
}

/// ContentDirectory failures. Each maps onto a UPnP fault code at the
/// transport boundary via [`CdsError::upnp_code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CdsError {
    #[error("no such object: {0}")]
    NoSuchObject(u32),
    #[error("invalid container: {0}")]
    InvalidContainer(u32),
    #[error("cannot process the request: {0}")]
    ModeError(&'static str),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CdsError {
    pub fn upnp_code(&self) -> u32 {
        match self {
            CdsError::NoSuchObject(_) => 701,
            CdsError::InvalidContainer(_) => 710,
            CdsError::ModeError(_) => 720,
            CdsError::InvalidArgs(_) => 402,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VfsError {
    #[error("no such node: {0}")]
    NoSuchNode(u32),
    #[error("node {0} is not a container")]
    NotAContainer(u32),
    #[error("node {0} is not a resource")]
    NotAResource(u32),
    #[error("the root container cannot be removed")]
    RootRemoval,
}
