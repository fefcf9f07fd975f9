// SkillForgeOptions — the main configuration struct.
//
// Everything an embedder can tune: the API base path, upload handling,
// certificate numbering, and pagination defaults. Nested option groups
// carry their own serde defaults so a partial JSON config deserializes
// into a fully-populated struct.

use serde::{Deserialize, Serialize};

/// Top-level configuration for a SkillForge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillForgeOptions {
    /// Path prefix for all API routes (default: "/api").
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// App name for branding in logs and certificate snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Video upload configuration.
    #[serde(default)]
    pub upload: UploadOptions,

    /// Certificate issuance configuration.
    #[serde(default)]
    pub certificate: CertificateOptions,

    /// List/pagination defaults.
    #[serde(default)]
    pub pagination: PaginationOptions,
}

impl SkillForgeOptions {
    pub fn new() -> Self {
        Self {
            base_path: default_base_path(),
            app_name: None,
            upload: UploadOptions::default(),
            certificate: CertificateOptions::default(),
            pagination: PaginationOptions::default(),
        }
    }
}

impl Default for SkillForgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn default_base_path() -> String {
    "/api".to_string()
}

/// Video upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    /// Directory uploaded videos are stored in.
    #[serde(default = "default_upload_dir")]
    pub dir: String,

    /// Maximum upload size in bytes (default: 500 MB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Allowed video file extensions (lowercase, no dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadOptions {
    /// Whether a lowercase extension (without dot) is an accepted video type.
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == ext)
    }
}

fn default_upload_dir() -> String {
    "public/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    500 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    ["mp4", "mov", "avi", "mkv", "webm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Certificate issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateOptions {
    /// Prefix for certificate numbers (default: "SF").
    #[serde(default = "default_certificate_prefix")]
    pub number_prefix: String,

    /// Validity window in years from the issue date (default: 2).
    #[serde(default = "default_validity_years")]
    pub validity_years: i32,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        Self {
            number_prefix: default_certificate_prefix(),
            validity_years: default_validity_years(),
        }
    }
}

fn default_certificate_prefix() -> String {
    "SF".to_string()
}

fn default_validity_years() -> i32 {
    2
}

/// List/pagination defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
    /// Default page size when the client does not specify one.
    #[serde(default = "default_page_size")]
    pub default_limit: i64,

    /// Hard ceiling on the page size a client may request.
    #[serde(default = "default_max_page_size")]
    pub max_limit: i64,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            default_limit: default_page_size(),
            max_limit: default_max_page_size(),
        }
    }
}

fn default_page_size() -> i64 {
    10
}

fn default_max_page_size() -> i64 {
    100
}
