//! DLNA media profiling and ContentDirectory browsing: classify media files
//! into DLNA profiles, catalog them in an in-memory tree, browse and search it.

pub mod cds;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod profiles;
pub mod vfs;
