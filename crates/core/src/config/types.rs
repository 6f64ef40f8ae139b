use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::converter::ConverterConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8000
}

/// Where per-request scratch directories are created
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_root")]
    pub root_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_dir: default_workspace_root(),
        }
    }
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("mediacut")
}

/// Upload limits and checks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Maximum request body size in MiB.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
    /// Reject uploads whose part content type is not `video/*`.
    #[serde(default)]
    pub require_video_content_type: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: default_max_upload_mb(),
            require_video_content_type: false,
        }
    }
}

impl UploadConfig {
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

fn default_max_upload_mb() -> u64 {
    512
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.upload.max_upload_mb, 512);
        assert!(!config.upload.require_video_content_type);
        assert_eq!(config.converter.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.workspace.root_dir.ends_with("mediacut"));
    }

    #[test]
    fn test_deserialize_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[converter]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
mp3_bitrate_kbps = 192

[workspace]
root_dir = "/var/tmp/mediacut"

[upload]
max_upload_mb = 64
require_video_content_type = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(
            config.converter.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.converter.mp3_bitrate_kbps, Some(192));
        assert_eq!(config.workspace.root_dir, PathBuf::from("/var/tmp/mediacut"));
        assert_eq!(config.upload.max_upload_mb, 64);
        assert!(config.upload.require_video_content_type);
    }

    #[test]
    fn test_max_upload_bytes() {
        let upload = UploadConfig {
            max_upload_mb: 2,
            require_video_content_type: false,
        };
        assert_eq!(upload.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
