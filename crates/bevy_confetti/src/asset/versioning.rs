const CURRENT_FORMAT_VERSION: &str = "0.1";

/// The result of validating an asset's `confetti_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// The asset version matches the current format version.
    Current,
    /// The asset version is not recognized (might be from a newer Confetti version).
    Unknown {
        /// The version found in the asset.
        found: String,
    },
}

/// Returns the current asset format version string.
pub fn current_format_version() -> &'static str {
    CURRENT_FORMAT_VERSION
}

/// Validates a version string against the current format version.
pub fn validate_version(version: &str) -> VersionStatus {
    if version == CURRENT_FORMAT_VERSION {
        VersionStatus::Current
    } else {
        VersionStatus::Unknown {
            found: version.to_string(),
        }
    }
}
