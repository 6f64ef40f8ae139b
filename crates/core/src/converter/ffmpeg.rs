//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionResult, ConversionTask, MediaInfo};
use crate::metrics::TOOL_INVOCATIONS;

fn record_invocation<T>(task: &str, result: &Result<T, ConverterError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(ConverterError::Timeout { .. }) => "timeout",
        Err(_) => "failed",
    };
    TOOL_INVOCATIONS.with_label_values(&[task, outcome]).inc();
}

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for extracting the audio track as MP3.
    fn build_audio_args(&self, input_path: &Path, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-c:a".to_string(),
            "libmp3lame".to_string(),
        ];

        if let Some(bitrate) = self.config.mp3_bitrate_kbps {
            args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
        }

        self.push_common_args(&mut args, output_path);
        args
    }

    /// Builds ffmpeg arguments for a start/duration trim.
    ///
    /// `-ss` goes before `-i` so the tool seeks the input instead of decoding
    /// everything up to `start`.
    fn build_clip_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        start_secs: f64,
        end_secs: f64,
    ) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            format_secs(start_secs),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-t".to_string(),
            format_secs(end_secs - start_secs),
            "-map".to_string(),
            "0:v?".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
        ];

        if self.config.clip_reencode {
            args.extend([
                "-c:v".to_string(),
                "libx264".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
            ]);
        } else {
            args.extend([
                "-c".to_string(),
                "copy".to_string(),
                "-avoid_negative_ts".to_string(),
                "make_zero".to_string(),
            ]);
        }

        self.push_common_args(&mut args, output_path);
        args
    }

    fn push_common_args(&self, args: &mut Vec<String>, output_path: &Path) {
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output_path.to_string_lossy().to_string());
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, ConverterError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| ConverterError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let duration_secs = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(0.0);

        let size_bytes = probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");
        let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");

        let format_name = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            format: format_name.to_string(),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
            video_codec: video_stream.and_then(|s| s.codec_name.clone()),
            video_width: video_stream.and_then(|s| s.width),
            video_height: video_stream.and_then(|s| s.height),
        })
    }

    /// Runs ffmpeg with the given arguments and waits for it to exit.
    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), ConverterError> {
        let child = Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        // Dropping the child on timeout kills the process.
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ConverterError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(ConverterError::conversion_failed(
                match output.status.code() {
                    Some(code) => format!("FFmpeg exited with code {}", code),
                    None => "FFmpeg was terminated by a signal".to_string(),
                },
                if stderr.trim().is_empty() {
                    None
                } else {
                    Some(stderr)
                },
            ));
        }

        Ok(())
    }

    async fn run_conversion(&self, job: &ConversionJob) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();

        if !job.input_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let args = match job.task {
            ConversionTask::Audio => self.build_audio_args(&job.input_path, &job.output_path),
            ConversionTask::Clip {
                start_secs,
                end_secs,
            } => {
                if !start_secs.is_finite() || !end_secs.is_finite() {
                    return Err(ConverterError::invalid_job("clip bounds must be finite"));
                }
                if start_secs < 0.0 || end_secs <= start_secs {
                    return Err(ConverterError::invalid_job(format!(
                        "clip bounds out of order: start={} end={}",
                        start_secs, end_secs
                    )));
                }
                self.build_clip_args(&job.input_path, &job.output_path, start_secs, end_secs)
            }
        };

        debug!(job_id = %job.job_id, task = job.task.label(), ?args, "Running ffmpeg");

        let output_size_bytes = match self.run_ffmpeg(&args).await {
            Ok(()) => match tokio::fs::metadata(&job.output_path).await {
                Ok(meta) if meta.len() > 0 => Ok(meta.len()),
                Ok(_) => Err(ConverterError::conversion_failed(
                    "Output file is empty",
                    None,
                )),
                Err(_) => Err(ConverterError::conversion_failed(
                    "Output file not created",
                    None,
                )),
            },
            Err(e) => Err(e),
        };

        let output_size_bytes = match output_size_bytes {
            Ok(size) => size,
            Err(e) => {
                remove_partial_output(&job.output_path).await;
                return Err(e);
            }
        };

        Ok(ConversionResult {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Formats seconds at microsecond precision, the finest ffmpeg parses.
fn format_secs(secs: f64) -> String {
    format!("{:.6}", secs)
}

async fn remove_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        let result = self.run_probe(path).await;
        record_invocation("probe", &result);
        result
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let result = self.run_conversion(&job).await;
        record_invocation(job.task.label(), &result);
        result
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        self.check_tools().await
    }
}

impl FfmpegConverter {
    async fn run_probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        if !path.exists() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let probe = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = timeout(timeout_duration, probe)
            .await
            .map_err(|_| ConverterError::Timeout {
                timeout_secs: self.config.timeout_secs,
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ConverterError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn check_tools(&self) -> Result<(), ConverterError> {
        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        match ffmpeg_result {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if let Some(version_line) = stdout.lines().next() {
                    debug!("{}", version_line);
                }
            }
            Ok(output) => {
                return Err(ConverterError::conversion_failed(
                    "ffmpeg -version failed",
                    Some(String::from_utf8_lossy(&output.stderr).to_string()),
                ))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConverterError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            Err(e) => return Err(ConverterError::Io(e)),
        }

        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffprobe_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(ConverterError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(ConverterError::Io(e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_audio_args_default_quality() {
        let converter = FfmpegConverter::with_defaults();
        let args = converter.build_audio_args(Path::new("/in.mp4"), Path::new("/out.mp3"));

        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"libmp3lame".to_string()));
        assert!(!args.contains(&"-b:a".to_string()));
        assert_eq!(args.first().unwrap(), "-y");
        assert_eq!(args.last().unwrap(), "/out.mp3");
    }

    #[test]
    fn test_build_audio_args_with_bitrate() {
        let converter = FfmpegConverter::new(ConverterConfig::default().with_mp3_bitrate(192));
        let args = converter.build_audio_args(Path::new("/in.mp4"), Path::new("/out.mp3"));

        let pos = args.iter().position(|a| a == "-b:a").unwrap();
        assert_eq!(args[pos + 1], "192k");
    }

    #[test]
    fn test_build_clip_args_stream_copy() {
        let converter = FfmpegConverter::with_defaults();
        let args =
            converter.build_clip_args(Path::new("/in.mp4"), Path::new("/clip.mp4"), 10.0, 20.5);

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input, "seek must precede the input");
        assert_eq!(args[ss + 1], "10.000000");

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "10.500000");

        assert!(args.contains(&"copy".to_string()));
        assert!(!args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "/clip.mp4");
    }

    #[test]
    fn test_build_clip_args_keep_sub_millisecond_range() {
        let converter = FfmpegConverter::with_defaults();
        let args =
            converter.build_clip_args(Path::new("/in.mp4"), Path::new("/clip.mp4"), 10.0, 10.0004);

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "10.000000");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "0.000400");
    }

    #[test]
    fn test_build_clip_args_reencode() {
        let converter = FfmpegConverter::new(ConverterConfig::default().with_clip_reencode(true));
        let args =
            converter.build_clip_args(Path::new("/in.mp4"), Path::new("/clip.mp4"), 0.0, 5.0);

        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(!args.contains(&"copy".to_string()));
    }

    #[test]
    fn test_extra_args_precede_output() {
        let mut config = ConverterConfig::default();
        config.extra_ffmpeg_args = vec!["-threads".to_string(), "2".to_string()];
        let converter = FfmpegConverter::new(config);
        let args = converter.build_audio_args(Path::new("/in.mp4"), Path::new("/out.mp3"));

        let n = args.len();
        assert_eq!(args[n - 3], "-threads");
        assert_eq!(args[n - 2], "2");
        assert_eq!(args[n - 1], "/out.mp3");
    }

    #[test]
    fn test_parse_probe_output_video() {
        let json = r#"{
            "format": {
                "filename": "sample.mp4",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "100.000000",
                "size": "5000000"
            },
            "streams": [
                {
                    "codec_type": "video",
                    "codec_name": "h264",
                    "width": 1920,
                    "height": 1080
                },
                {
                    "codec_type": "audio",
                    "codec_name": "aac"
                }
            ]
        }"#;

        let info = FfmpegConverter::parse_probe_output(Path::new("sample.mp4"), json).unwrap();
        assert_eq!(info.format, "mov");
        assert!((info.duration_secs - 100.0).abs() < 0.001);
        assert_eq!(info.size_bytes, 5000000);
        assert_eq!(info.video_codec, Some("h264".to_string()));
        assert_eq!(info.video_width, Some(1920));
        assert_eq!(info.audio_codec, Some("aac".to_string()));
    }

    #[test]
    fn test_parse_probe_output_missing_duration() {
        let json = r#"{
            "format": { "format_name": "image2" },
            "streams": []
        }"#;

        let info = FfmpegConverter::parse_probe_output(Path::new("x.png"), json).unwrap();
        assert_eq!(info.duration_secs, 0.0);
        assert!(!info.has_audio());
        assert!(!info.has_video());
    }

    #[test]
    fn test_parse_probe_output_invalid_json() {
        let result = FfmpegConverter::parse_probe_output(Path::new("x"), "not json");
        assert!(matches!(result, Err(ConverterError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_convert_missing_input() {
        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob {
            job_id: "missing".to_string(),
            input_path: PathBuf::from("/nonexistent/input.mp4"),
            output_path: PathBuf::from("/nonexistent/out.mp3"),
            task: ConversionTask::Audio,
        };
        let result = converter.convert(job).await;
        assert!(matches!(result, Err(ConverterError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_convert_rejects_inverted_clip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.mp4");
        std::fs::write(&input, b"not really a video").unwrap();

        let converter = FfmpegConverter::with_defaults();
        let job = ConversionJob {
            job_id: "inverted".to_string(),
            input_path: input,
            output_path: dir.path().join("clip.mp4"),
            task: ConversionTask::Clip {
                start_secs: 20.0,
                end_secs: 10.0,
            },
        };
        let result = converter.convert(job).await;
        assert!(matches!(result, Err(ConverterError::InvalidJob { .. })));
    }

    #[tokio::test]
    async fn test_missing_binary_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.mp4");
        std::fs::write(&input, b"data").unwrap();

        let converter = FfmpegConverter::new(ConverterConfig::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        ));

        let job = ConversionJob {
            job_id: "no-ffmpeg".to_string(),
            input_path: input.clone(),
            output_path: dir.path().join("out.mp3"),
            task: ConversionTask::Audio,
        };
        assert!(matches!(
            converter.convert(job).await,
            Err(ConverterError::FfmpegNotFound { .. })
        ));
        assert!(matches!(
            converter.probe(&input).await,
            Err(ConverterError::FfprobeNotFound { .. })
        ));
        assert!(converter.validate().await.is_err());
    }

    /// Writes an executable shell script standing in for ffmpeg.
    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg.sh");
        std::fs::write(&path, format!("#!/bin/sh\nfor last; do :; done\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn audio_job(dir: &Path) -> ConversionJob {
        let input = dir.join("input.mp4");
        std::fs::write(&input, b"video bytes").unwrap();
        ConversionJob {
            job_id: "audio".to_string(),
            input_path: input,
            output_path: dir.join("audio.mp3"),
            task: ConversionTask::Audio,
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run_reports_stderr_and_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ffmpeg(
            dir.path(),
            "printf partial > \"$last\"\necho 'moov atom not found' >&2\nexit 1",
        );
        let converter =
            FfmpegConverter::new(ConverterConfig::with_paths(script, PathBuf::from("ffprobe")));
        let job = audio_job(dir.path());
        let output = job.output_path.clone();

        let err = converter.convert(job).await.unwrap_err();
        match &err {
            ConverterError::ConversionFailed { reason, stderr } => {
                assert_eq!(reason, "FFmpeg exited with code 1");
                assert!(stderr.as_deref().unwrap().contains("moov atom not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("moov atom not found"));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ffmpeg(dir.path(), ": > \"$last\"\nexit 0");
        let converter =
            FfmpegConverter::new(ConverterConfig::with_paths(script, PathBuf::from("ffprobe")));
        let job = audio_job(dir.path());
        let output = job.output_path.clone();

        let err = converter.convert(job).await.unwrap_err();
        assert!(matches!(
            err,
            ConverterError::ConversionFailed { ref reason, .. } if reason == "Output file is empty"
        ));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_tool_times_out_and_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ffmpeg(dir.path(), "printf partial > \"$last\"\nexec sleep 30");
        let converter = FfmpegConverter::new(
            ConverterConfig::with_paths(script, PathBuf::from("ffprobe")).with_timeout(1),
        );
        let job = audio_job(dir.path());
        let output = job.output_path.clone();

        let started = Instant::now();
        let err = converter.convert(job).await.unwrap_err();
        assert!(matches!(err, ConverterError::Timeout { timeout_secs: 1 }));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_run_reports_output_size() {
        let dir = tempfile::tempdir().unwrap();
        let script = fake_ffmpeg(dir.path(), "printf 'ID3 frames' > \"$last\"");
        let converter =
            FfmpegConverter::new(ConverterConfig::with_paths(script, PathBuf::from("ffprobe")));
        let job = audio_job(dir.path());

        let result = converter.convert(job).await.unwrap();
        assert_eq!(result.output_size_bytes, 10);
        assert_eq!(std::fs::read(&result.output_path).unwrap(), b"ID3 frames");
    }
}
