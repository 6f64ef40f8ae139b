pub mod clip;
pub mod config;
pub mod converter;
pub mod metrics;
pub mod processor;
pub mod testing;
pub mod workspace;

pub use clip::{parse_clip_specs, ClipField, ClipSpec, ClipSpecError, ClipViolation};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
    UploadConfig, WorkspaceConfig,
};
pub use converter::{Converter, ConverterConfig, ConverterError, FfmpegConverter, MediaInfo};
pub use processor::{
    ClipArchive, ConvertedAudio, MediaProcessor, ProcessError, ProcessorConfig, UploadedVideo,
};
pub use workspace::Workspace;
