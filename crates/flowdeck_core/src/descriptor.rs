//! Plugin descriptor model and one-shot loader.
//!
//! # Responsibility
//! - Read the static `plugin.json` descriptor shipped next to the plugin.
//! - Resolve the documentation repository URL from descriptor links.
//!
//! # Invariants
//! - Loading is one blocking read at context construction; no retry, no cache.
//! - Read and parse failures surface as `DescriptorError`, never as panics.

use crate::paths::join_segment;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Well-known descriptor file name under the plugin root.
pub const DESCRIPTOR_FILE_NAME: &str = "plugin.json";
/// Link name that marks the documentation repository entry.
pub const DOCUMENTATION_LINK_NAME: &str = "Documentation";

const MAX_DESCRIPTOR_BYTES: u64 = 64 * 1024;
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub type DescriptorResult<T> = Result<T, DescriptorError>;

/// Descriptor read/parse errors.
#[derive(Debug)]
pub enum DescriptorError {
    Io(std::io::Error),
    Http(reqwest::Error),
    Parse(serde_json::Error),
    TooLarge { size: u64, limit: u64 },
}

impl Display for DescriptorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "descriptor read failed: {err}"),
            Self::Http(err) => write!(f, "descriptor fetch failed: {err}"),
            Self::Parse(err) => write!(f, "descriptor is not valid JSON: {err}"),
            Self::TooLarge { size, limit } => {
                write!(f, "descriptor file is {size} bytes, limit is {limit}")
            }
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<std::io::Error> for DescriptorError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<reqwest::Error> for DescriptorError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for DescriptorError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Static metadata record identifying the plugin.
///
/// Read once at context construction and never refreshed. Unknown JSON
/// fields in `plugin.json` are ignored so host-side descriptor additions do
/// not break loading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginDescriptor {
    /// Stable plugin identifier, e.g. `flowdeck-panel`.
    pub id: String,
    pub info: DescriptorInfo,
}

/// Version and link metadata nested under `info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescriptorInfo {
    /// Semantic version string.
    pub version: String,
    /// Ordered link entries; at most one is expected to be `Documentation`.
    #[serde(default)]
    pub links: Vec<DescriptorLink>,
}

/// One named link entry from the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescriptorLink {
    pub name: String,
    pub url: String,
}

impl PluginDescriptor {
    /// Returns the documentation repository URL, when declared.
    ///
    /// When several `Documentation` links are present the last one wins,
    /// matching the link-scan order the help renderer was built against.
    pub fn repository_url(&self) -> Option<&str> {
        self.info
            .links
            .iter()
            .rev()
            .find(|link| link.name == DOCUMENTATION_LINK_NAME)
            .map(|link| link.url.as_str())
    }
}

/// Loads the descriptor from `<root>/plugin.json`.
///
/// HTTP(S) roots are fetched with a blocking GET bounded by a request
/// timeout; every other root is treated as a filesystem directory and read
/// with a size cap. The call suspends the caller until the read resolves.
pub fn load_descriptor(root_path: &str) -> DescriptorResult<PluginDescriptor> {
    let location = join_segment(root_path, DESCRIPTOR_FILE_NAME);
    if is_url_root(root_path) {
        fetch_descriptor(&location)
    } else {
        read_descriptor(&location)
    }
}

/// Returns whether the root names an HTTP(S) origin rather than a directory.
pub(crate) fn is_url_root(root_path: &str) -> bool {
    root_path.starts_with("http://") || root_path.starts_with("https://")
}

fn read_descriptor(path: &str) -> DescriptorResult<PluginDescriptor> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_DESCRIPTOR_BYTES {
        return Err(DescriptorError::TooLarge {
            size: metadata.len(),
            limit: MAX_DESCRIPTOR_BYTES,
        });
    }

    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn fetch_descriptor(url: &str) -> DescriptorResult<PluginDescriptor> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let descriptor = client.get(url).send()?.error_for_status()?.json()?;
    Ok(descriptor)
}
