//! Decoding the frontend's `-print-target-info` output.

use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// One target description inside the frontend's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub triple: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unversioned_triple: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_triple: Option<String>,
    /// The Swift runtime version this target deploys against. The driver
    /// may override it after decoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swift_runtime_compatibility_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries_require_r_path: Option<bool>,
}

/// Everything the frontend reports for `-print-target-info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendTargetInfo {
    pub compiler_version: String,
    pub target: TargetInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_variant: Option<TargetInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_path: Option<String>,
}

impl FrontendTargetInfo {
    /// Decode the frontend's stdout. Failures carry a human-readable detail
    /// that distinguishes the broad decode-failure classes.
    pub fn decode(output: &[u8], arguments: &[String]) -> Result<FrontendTargetInfo, DriverError> {
        let text = std::str::from_utf8(output)
            .map_err(|_| DriverError::UnableToReadFrontendTargetInfo)?;
        serde_json::from_str(text).map_err(|err| DriverError::UnableToDecodeFrontendTargetInfo {
            output: text.to_string(),
            arguments: arguments.to_vec(),
            detail: decode_failure_detail(&err),
        })
    }
}

/// Classify a JSON decode failure the way a user needs to read it.
fn decode_failure_detail(err: &serde_json::Error) -> String {
    use serde_json::error::Category;
    let message = err.to_string();
    match err.classify() {
        Category::Data => {
            if message.contains("missing field") {
                format!("missing key: {message}")
            } else if message.contains("null") {
                format!("missing value: {message}")
            } else {
                format!("type mismatch: {message}")
            }
        }
        Category::Syntax | Category::Eof => format!("corrupted data: {message}"),
        Category::Io => format!("unreadable data: {message}"),
    }
}
