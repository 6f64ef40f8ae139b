use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Tool timeout is not 0
/// - Upload limit is not 0
/// - ffmpeg/ffprobe paths are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.converter.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "converter.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.upload.max_upload_mb == 0 {
        return Err(ConfigError::ValidationError(
            "upload.max_upload_mb cannot be 0".to_string(),
        ));
    }

    if config.converter.ffmpeg_path.as_os_str().is_empty()
        || config.converter.ffprobe_path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "converter.ffmpeg_path and converter.ffprobe_path must be set".to_string(),
        ));
    }

    Ok(())
}
