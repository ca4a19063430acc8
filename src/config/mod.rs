use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub search_path: Option<String>,
    pub availability_path: Option<String>,
    pub load_availability: Option<bool>,
    pub city_id: Option<String>,
    pub limit: Option<u32>,
    #[serde(alias = "sort_column")]
    pub sort: Option<String>,
    pub sort_direction: Option<String>,
    pub sort_mode: Option<String>,
    /// Default filters as `key=value` entries, applied before CLI filters.
    pub filters: Option<Vec<String>>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".product-lister").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound {
            path: path.display().to_string(),
        }),
        Err(e) => Err(ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

fn default_config_yaml() -> &'static str {
    r#"# product-lister config
#
# Location (default):
#   ~/.product-lister/config.yml

# Backend
base_url: http://localhost:8000
search_path: /api/search
availability_path: /api/availability
load_availability: true
timeout: 10
# proxy: http://127.0.0.1:8080

# Listing
city_id: "1"
limit: 20
sort: name
sort_direction: asc
# column: send the sort column as-is; api: send price_asc/price_desc/name/relevance
sort_mode: column
# filters:
#   - brand=X
#   - category=dairy

# Output
output_format: text
no_color: false
"#
}

pub fn ensure_default_config_file(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Ok(());
    }
    let parent = path.parent().ok_or_else(|| ConfigError::InvalidPath {
        path: path.display().to_string(),
    })?;
    std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
        path: parent.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, default_config_yaml()).map_err(|e| ConfigError::Write {
        path: path.display().to_string(),
        source: e,
    })
}
