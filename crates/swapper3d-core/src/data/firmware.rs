//! Firmware version bookkeeping
//!
//! Installed and latest versions arrive independently from the host. The
//! only operation on them is comparison; downloading and flashing firmware
//! is the host's business.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Installed and latest firmware versions as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FirmwareInfo {
    /// Version running on the device
    pub installed_version: Option<String>,
    /// Newest published version
    pub latest_version: Option<String>,
}

impl FirmwareInfo {
    /// Whether the latest version is newer than the installed one
    ///
    /// Returns `None` while either version is unknown or unparseable.
    pub fn update_available(&self) -> Option<bool> {
        let installed = FirmwareVersion::parse(self.installed_version.as_deref()?)?;
        let latest = FirmwareVersion::parse(self.latest_version.as_deref()?)?;
        Some(latest > installed)
    }
}

/// Dotted numeric version such as `1.2.0` or `v2.10`
///
/// Missing trailing components compare as zero, so `1.2` == `1.2.0`.
#[derive(Debug, Clone)]
pub struct FirmwareVersion {
    components: Vec<u32>,
}

impl FirmwareVersion {
    /// Parse a version string, tolerating a leading `v` and non-numeric
    /// suffixes on each component (`1.2.0-beta` parses as `1.2.0`)
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        if trimmed.is_empty() {
            return None;
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .collect::<Option<Vec<u32>>>()?;

        Some(Self { components })
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    fn component(&self, index: usize) -> u32 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for FirmwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FirmwareVersion {}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}
