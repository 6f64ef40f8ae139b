//! Configuration for the media processor.

use std::path::PathBuf;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Directory under which per-request workspaces are created.
    pub workspace_root: PathBuf,
    /// Reject uploads whose content type is not `video/*`.
    pub require_video_content_type: bool,
}

impl ProcessorConfig {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self {
            workspace_root,
            require_video_content_type: false,
        }
    }

    pub fn with_video_content_type_check(mut self, required: bool) -> Self {
        self.require_video_content_type = required;
        self
    }
}

impl From<&Config> for ProcessorConfig {
    fn from(config: &Config) -> Self {
        Self::new(config.workspace.root_dir.clone())
            .with_video_content_type_check(config.upload.require_video_content_type)
    }
}
