use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::profiles::ProfileFamily;

#[derive(Parser, Debug)]
#[command(
    name = "dlnadir",
    about = "Classify media files into DLNA profiles and browse them as a ContentDirectory",
    long_about = None,
    version,
    arg_required_else_help = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub args: Args,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Default)]
pub struct Args {
    /// Path to TOML config file (overrides default search: ./dlnadir.toml, ~/.config/dlnadir/config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Run every profile rule regardless of the file extension
    #[arg(long, global = true)]
    pub no_check_extensions: bool,

    /// Title of the root container [default: root]
    #[arg(long, global = true)]
    pub root_title: Option<String>,

    /// Do not follow symbolic links while scanning
    #[arg(long, global = true)]
    pub no_follow_links: bool,

    /// Comma-separated profile families to register, in order [default: all]
    #[arg(long, value_delimiter = ',', global = true)]
    pub profiles: Option<Vec<ProfileFamily>>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify files and print their DLNA profile
    Classify {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Scan directories and browse the resulting tree
    Browse {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Object id to browse
        #[arg(long, default_value_t = 0)]
        id: u32,

        /// BrowseMetadata or BrowseDirectChildren
        #[arg(long, default_value = "BrowseDirectChildren")]
        flag: String,

        #[arg(long, default_value_t = 0)]
        start: u32,

        /// 0 returns every remaining child
        #[arg(long, default_value_t = 0)]
        count: u32,
    },

    /// Scan directories and search the resulting tree
    Search {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// e.g. (upnp:class derivedfrom "object.item.audioItem")
        #[arg(long)]
        criteria: String,

        /// Container to search under
        #[arg(long, default_value_t = 0)]
        id: u32,

        #[arg(long, default_value_t = 0)]
        start: u32,

        /// 0 returns every match
        #[arg(long, default_value_t = 0)]
        count: u32,
    },

    /// List the MIME types the registered profiles can serve
    Mimes,
}
