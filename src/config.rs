use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::profiles::{ProfileFamily, Registry};

const DEFAULT_ROOT_TITLE: &str = "root";

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub check_extensions: Option<bool>,
    pub root_title: Option<String>,
    pub follow_links: Option<bool>,
    /// Profile family names, registered in the listed order.
    pub profiles: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct Config {
    pub check_extensions: bool,
    pub root_title: String,
    pub follow_links: bool,
    pub profiles: Vec<ProfileFamily>,
}

impl Config {
    /// CLI flags win over the file, the file wins over the defaults.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let profiles = match (&args.profiles, file.profiles) {
            (Some(families), _) => families.clone(),
            (None, Some(names)) => names
                .iter()
                .map(|name| ProfileFamily::from_str(name).map_err(ConfigError::UnknownProfile))
                .collect::<Result<_, _>>()?,
            (None, None) => ProfileFamily::ALL.to_vec(),
        };
        Ok(Config {
            check_extensions: !args.no_check_extensions && file.check_extensions.unwrap_or(true),
            root_title: args
                .root_title
                .clone()
                .or(file.root_title)
                .unwrap_or_else(|| DEFAULT_ROOT_TITLE.to_string()),
            follow_links: !args.no_follow_links && file.follow_links.unwrap_or(true),
            profiles,
        })
    }

    /// A registry holding the configured families in order.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for family in &self.profiles {
            registry.register_family(*family);
        }
        registry.set_check_extensions(self.check_extensions);
        registry
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("dlnadir.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("dlnadir").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    UnknownProfile(String),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
