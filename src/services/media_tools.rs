use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use uuid::Uuid;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::MediaMetadata,
};

/// Audio file handed to transcription. Temporary artifacts are removed by
/// the transcription engine once it reaches a terminal state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub temporary: bool,
}

impl AudioArtifact {
    pub fn temporary(path: PathBuf) -> Self {
        Self {
            path,
            temporary: true,
        }
    }

    pub async fn byte_len(&self) -> u64 {
        tokio::fs::metadata(&self.path)
            .await
            .map(|m| m.len())
            .unwrap_or(0)
    }

    pub async fn cleanup(&self) {
        if self.temporary {
            remove_scratch(&self.path).await;
        }
    }
}

/// Removes a scratch file if it exists.
pub async fn remove_scratch(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed scratch file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove scratch file {}: {}", path.display(), e),
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    duration: Option<f64>,
    #[serde(default)]
    categories: Vec<String>,
    view_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Thin wrapper over the external media binaries (ffmpeg, ffprobe, yt-dlp
/// and a fallback downloader).
#[derive(Clone, Debug)]
pub struct MediaToolkit {
    pub work_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub ytdlp_bin: String,
    pub fallback_downloader_bin: String,
}

impl MediaToolkit {
    pub fn from_config(config: &Config) -> Self {
        Self {
            work_dir: config.media_work_dir.clone(),
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            ffprobe_bin: config.ffprobe_bin.clone(),
            ytdlp_bin: config.ytdlp_bin.clone(),
            fallback_downloader_bin: config.fallback_downloader_bin.clone(),
        }
    }

    /// True when `binary -version` (or `--version`) runs successfully.
    pub async fn is_available(&self, binary: &str) -> bool {
        for flag in ["-version", "--version"] {
            let status = Command::new(binary)
                .arg(flag)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if matches!(status, Ok(s) if s.success()) {
                return true;
            }
        }
        false
    }

    /// Fresh per-request scratch path inside the work directory.
    pub async fn scratch_path(&self, extension: &str) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        Ok(self
            .work_dir
            .join(format!("{}.{}", Uuid::new_v4(), extension)))
    }

    pub async fn download_video(&self, url: &str) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let stem = Uuid::new_v4().to_string();
        let downloaded = self.run_download(url, &stem).await;
        if downloaded.is_err() {
            self.remove_with_stem(&stem).await;
        }
        downloaded
    }

    async fn run_download(&self, url: &str, stem: &str) -> AppResult<PathBuf> {
        let output_template = self.work_dir.join(format!("{}.%(ext)s", stem));
        let output = Command::new(&self.ytdlp_bin)
            .arg(url)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--no-playlist")
            .arg("-f")
            .arg("best")
            .arg("-o")
            .arg(&output_template)
            .output()
            .await
            .map_err(|e| self.tool_error(&self.ytdlp_bin, e))?;

        if !output.status.success() {
            return Err(AppError::AcquisitionFailed {
                strategy: "download".to_string(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.ytdlp_bin,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let filepath = stdout.lines().last().unwrap_or_default().trim();
        if filepath.is_empty() {
            return Err(AppError::AcquisitionFailed {
                strategy: "download".to_string(),
                reason: "downloader did not report an output file".to_string(),
            });
        }
        Ok(PathBuf::from(filepath))
    }

    /// Drops every work-dir entry named `<stem>.*`, including downloader
    /// `.part` leftovers.
    async fn remove_with_stem(&self, stem: &str) {
        let prefix = format!("{}.", stem);
        let Ok(mut entries) = tokio::fs::read_dir(&self.work_dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                remove_scratch(&entry.path()).await;
            }
        }
    }

    /// 16 kHz mono WAV, the format speech-to-text providers handle best.
    pub async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> AppResult<()> {
        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i")
            .arg(video_path)
            .arg("-vn")
            .arg("-ar")
            .arg("16000")
            .arg("-ac")
            .arg("1")
            .arg(audio_path)
            .output()
            .await
            .map_err(|e| self.tool_error(&self.ffmpeg_bin, e))?;

        if !output.status.success() {
            return Err(AppError::AcquisitionFailed {
                strategy: "extract_audio".to_string(),
                reason: format!(
                    "Failed to extract audio from {}: {}",
                    video_path.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }

    /// Audio-only download through the more tolerant fallback downloader.
    pub async fn download_audio_tolerant(&self, url: &str) -> AppResult<PathBuf> {
        let audio_path = self.scratch_path("mp3").await?;
        let downloaded = self.run_tolerant_download(url, &audio_path).await;
        if downloaded.is_err() {
            remove_scratch(&audio_path).await;
        }
        downloaded.map(|()| audio_path)
    }

    async fn run_tolerant_download(&self, url: &str, audio_path: &Path) -> AppResult<()> {
        let output = Command::new(&self.fallback_downloader_bin)
            .arg(url)
            .arg("--no-playlist")
            .arg("--no-check-certificate")
            .arg("--ignore-errors")
            .arg("--geo-bypass")
            .arg("-x")
            .arg("--audio-format")
            .arg("mp3")
            .arg("-o")
            .arg(audio_path)
            .output()
            .await
            .map_err(|e| self.tool_error(&self.fallback_downloader_bin, e))?;

        if !output.status.success() || !audio_path.exists() {
            return Err(AppError::AcquisitionFailed {
                strategy: "fallback_downloader".to_string(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.fallback_downloader_bin,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }

    /// Duration, category and view count from `yt-dlp --dump-json`.
    pub async fn probe_remote(&self, url: &str) -> AppResult<MediaMetadata> {
        let output = Command::new(&self.ytdlp_bin)
            .arg("--dump-json")
            .arg("--skip-download")
            .arg("--no-playlist")
            .arg(url)
            .output()
            .await
            .map_err(|e| self.tool_error(&self.ytdlp_bin, e))?;

        if !output.status.success() {
            return Err(AppError::AcquisitionFailed {
                strategy: "probe".to_string(),
                reason: format!("{} exited with {}", self.ytdlp_bin, output.status),
            });
        }

        let info: YtDlpInfo = serde_json::from_slice(&output.stdout)?;
        Ok(MediaMetadata {
            duration_secs: info.duration,
            category: info.categories.into_iter().next(),
            view_count: info.view_count,
        })
    }

    pub async fn probe_local(&self, path: &Path) -> AppResult<MediaMetadata> {
        let output = Command::new(&self.ffprobe_bin)
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg(path)
            .output()
            .await
            .map_err(|e| self.tool_error(&self.ffprobe_bin, e))?;

        if !output.status.success() {
            return Err(AppError::AcquisitionFailed {
                strategy: "probe".to_string(),
                reason: format!("{} exited with {}", self.ffprobe_bin, output.status),
            });
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
        Ok(MediaMetadata {
            duration_secs: probe
                .format
                .and_then(|f| f.duration)
                .and_then(|d| d.parse().ok()),
            ..MediaMetadata::default()
        })
    }

    fn tool_error(&self, binary: &str, err: std::io::Error) -> AppError {
        AppError::AcquisitionFailed {
            strategy: binary.to_string(),
            reason: format!("could not run {}: {}", binary, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit(dir: &Path) -> MediaToolkit {
        MediaToolkit {
            work_dir: dir.to_path_buf(),
            ffmpeg_bin: "ffmpeg-not-installed".to_string(),
            ffprobe_bin: "ffprobe-not-installed".to_string(),
            ytdlp_bin: "yt-dlp-not-installed".to_string(),
            fallback_downloader_bin: "youtube-dl-not-installed".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools = toolkit(dir.path());
        assert!(!tools.is_available(&tools.ffmpeg_bin).await);
    }

    #[tokio::test]
    async fn missing_binary_maps_to_acquisition_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools = toolkit(dir.path());

        let err = tools
            .extract_audio(Path::new("in.mp4"), &dir.path().join("out.wav"))
            .await
            .expect_err("ffmpeg is not installed");
        assert!(matches!(err, AppError::AcquisitionFailed { .. }));

        let err = tools
            .download_video("https://youtu.be/dQw4w9WgXcQ")
            .await
            .expect_err("yt-dlp is not installed");
        assert_eq!(err.stage(), "acquisition");
    }

    #[tokio::test]
    async fn scratch_paths_are_unique_and_inside_work_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools = toolkit(&dir.path().join("nested"));

        let a = tools.scratch_path("wav").await.expect("scratch path");
        let b = tools.scratch_path("wav").await.expect("scratch path");
        assert_ne!(a, b);
        assert!(a.starts_with(dir.path().join("nested")));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("wav"));
    }

    #[tokio::test]
    async fn cleanup_removes_only_temporary_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let temp_path = dir.path().join("temp.wav");
        let kept_path = dir.path().join("kept.wav");
        tokio::fs::write(&temp_path, b"RIFF").await.unwrap();
        tokio::fs::write(&kept_path, b"RIFF").await.unwrap();

        AudioArtifact::temporary(temp_path.clone()).cleanup().await;
        AudioArtifact {
            path: kept_path.clone(),
            temporary: false,
        }
        .cleanup()
        .await;

        assert!(!temp_path.exists());
        assert!(kept_path.exists());
    }
}
