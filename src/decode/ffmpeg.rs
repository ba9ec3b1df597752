use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::decode::source::{FrameSource, SourceInfo};
use crate::encode::ffmpeg::{StderrDrain, check_exit, reap, tool_on_path};
use crate::foundation::core::{FrameRgb, Fps, rgb_len};
use crate::foundation::error::{ReliefError, ReliefResult};

/// Source that probes a video with `ffprobe` and streams RGB24 frames out of `ffmpeg`.
pub struct FfmpegSource {
    path: PathBuf,
    info: SourceInfo,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr: Option<StderrDrain>,
    frame_len: usize,
}

impl FfmpegSource {
    /// Probe `path` and start decoding. Fails before any frame is read if the file or the
    /// `ffmpeg`/`ffprobe` tools are unusable.
    pub fn open(path: impl Into<PathBuf>) -> ReliefResult<Self> {
        let path = path.into();
        if !tool_on_path("ffprobe") || !tool_on_path("ffmpeg") {
            return Err(ReliefError::media(
                "ffmpeg and ffprobe are required for video decoding, but were not found on PATH",
            ));
        }
        let info = probe_video(&path)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&path)
            .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReliefError::media(format!("failed to spawn ffmpeg for decode: {e}")))?;

        let Some(stdout) = child.stdout.take() else {
            reap(child);
            return Err(ReliefError::media("ffmpeg decoder has no stdout pipe"));
        };
        let stderr = match StderrDrain::start(&mut child) {
            Ok(drain) => drain,
            Err(e) => {
                reap(child);
                return Err(e);
            }
        };

        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps.as_f64(),
            "ffmpeg decoder started"
        );
        Ok(Self {
            frame_len: rgb_len(info.width, info.height),
            path,
            info,
            child: Some(child),
            stdout: Some(BufReader::new(stdout)),
            stderr: Some(stderr),
        })
    }

    fn finish(&mut self) -> ReliefResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| ReliefError::media(format!("failed to wait for ffmpeg decode: {e}")))?;
        let log = match self.stderr.take() {
            Some(drain) => drain.collect()?,
            None => String::new(),
        };
        check_exit(
            &format!("ffmpeg decode of '{}'", self.path.display()),
            status,
            &log,
        )
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> ReliefResult<Option<FrameRgb>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let got = read_full(stdout, &mut buf)
            .map_err(|e| ReliefError::media(format!("failed to read decoded frame: {e}")))?;
        if got == 0 {
            self.finish()?;
            return Ok(None);
        }
        if got < self.frame_len {
            self.finish()?;
            return Err(ReliefError::media(format!(
                "truncated frame from ffmpeg: got {got} of {} bytes",
                self.frame_len
            )));
        }
        FrameRgb::new(self.info.width, self.info.height, buf).map(Some)
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        // Early stop (cancellation, downstream error): don't leave the decoder blocked on a pipe.
        drop(self.stdout.take());
        if let Some(child) = self.child.take() {
            reap(child);
        }
    }
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Probe width, height and frame rate of the first video stream through `ffprobe`.
pub fn probe_video(path: &Path) -> ReliefResult<SourceInfo> {
    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| ReliefError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReliefError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout)
}

pub(crate) fn parse_probe_json(json: &[u8]) -> ReliefResult<SourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        avg_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReliefError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReliefError::media("no video stream found"))?;
    let width = video
        .width
        .filter(|&w| w > 0)
        .ok_or_else(|| ReliefError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|&h| h > 0)
        .ok_or_else(|| ReliefError::media("missing video height from ffprobe"))?;

    // `r_frame_rate` is the container's base rate; some streams report 0/0 there and only carry
    // `avg_frame_rate`.
    let fps = [video.r_frame_rate.as_deref(), video.avg_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|s| Fps::parse_rational(s).ok())
        .ok_or_else(|| ReliefError::media("missing or zero video frame rate from ffprobe"))?;

    Ok(SourceInfo { width, height, fps })
}

#[cfg(test)]
#[path = "../../tests/unit/decode/ffmpeg.rs"]
mod tests;
