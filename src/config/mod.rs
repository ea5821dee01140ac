use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    /// JSON dataset. The built-in sample is used when unset.
    #[serde(alias = "dataset")]
    pub input: Option<String>,
    pub view: Option<String>,
    #[serde(alias = "start_date")]
    pub start: Option<String>,
    #[serde(alias = "end_date")]
    pub end: Option<String>,
    pub days: Option<u64>,
    pub category: Option<String>,
    pub product: Option<String>,
    #[serde(alias = "class")]
    pub letter: Option<String>,
    pub search: Option<String>,
    pub page_size: Option<usize>,
    pub page: Option<i64>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub logo: Option<String>,
    pub brand_name: Option<String>,
    pub report_title: Option<String>,
    pub timeout: Option<u64>,
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
    Some(home_dir()?.join(".patchplan").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

/// An empty document is an empty config.
fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# patchplan config
#
# Location (default):
#   ~/.patchplan/config.yml
#
# Command-line flags override every value here.

# Data (optional, the built-in sample dataset is used otherwise)
# input: ./dataset.json

# View: plan, products, classification, dashboard
view: plan

# Date window. Without start/end the window is the last `days` days.
# start: 2024-01-01
# end: 2024-01-31
days: 9

# Filters (empty = no filter)
# category: Paints
# product: Paints Product 3
# letter: A
# search: ITM-10

# Paging
page_size: 10

# Export (optional). Format is inferred from the extension when unset.
# output: ./plan.xlsx
# output_format: xlsx

# Report branding
# logo: https://example.com/logo.png
brand_name: PATCHPLAN
report_title: PATCHING PLAN REPORT
timeout: 10

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
