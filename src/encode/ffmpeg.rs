use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameRgb, FrameSeq, rgb_len};
use crate::foundation::error::{ReliefError, ReliefResult};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that pipes raw RGB24 frames into a system `ffmpeg` producing H.264 MP4.
///
/// Dropping a sink that was started but never ended kills the encoder and deletes the partial
/// output, so a failed run leaves no unplayable file behind.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    last_seq: Option<FrameSeq>,
}

struct Encoder {
    cfg: SinkConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: StderrDrain,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            last_seq: None,
        }
    }

    fn encoder_args(&self, cfg: SinkConfig) -> Vec<String> {
        let size = format!("{}x{}", cfg.width, cfg.height);
        let rate = format!("{}/{}", cfg.fps.num, cfg.fps.den);
        let mut args: Vec<String> = Vec::with_capacity(24);
        args.push(if self.opts.overwrite { "-y" } else { "-n" }.into());
        // Input options: raw packed RGB at the source rate, read from stdin.
        for a in ["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s"] {
            args.push(a.into());
        }
        args.extend([size, "-r".into(), rate, "-i".into(), "pipe:0".into()]);
        // yuv420p needs even dimensions; odd canvases get one padding row/column.
        for a in [
            "-an",
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ] {
            args.push(a.into());
        }
        args
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReliefResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReliefError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReliefError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.encoder.is_some() {
            return Err(ReliefError::validation("ffmpeg sink already started"));
        }
        let out = &self.opts.out_path;
        ensure_parent_dir(out)?;
        if !self.opts.overwrite && out.exists() {
            return Err(ReliefError::validation(format!(
                "output file '{}' already exists",
                out.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReliefError::media(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(self.encoder_args(cfg))
            .arg(out)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReliefError::media(format!("failed to spawn ffmpeg for encode: {e}")))?;
        let stdin = child.stdin.take();
        let stderr = StderrDrain::start(&mut child);
        let (stdin, stderr) = match (stdin, stderr) {
            (Some(stdin), Ok(stderr)) => (stdin, stderr),
            (_, Err(e)) => {
                reap(child);
                return Err(e);
            }
            (None, Ok(_)) => {
                reap(child);
                return Err(ReliefError::media("ffmpeg encoder has no stdin pipe"));
            }
        };

        tracing::debug!(
            out = %out.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "ffmpeg encoder started"
        );
        self.encoder = Some(Encoder {
            cfg,
            child,
            stdin: Some(stdin),
            stderr,
        });
        self.last_seq = None;
        Ok(())
    }

    fn push_frame(&mut self, seq: FrameSeq, frame: &FrameRgb) -> ReliefResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| ReliefError::media("ffmpeg sink not started"))?;
        if let Some(last) = self.last_seq
            && seq <= last
        {
            return Err(ReliefError::validation(format!(
                "ffmpeg sink received out-of-order frame {seq} after {last}"
            )));
        }
        let cfg = enc.cfg;
        if frame.width != cfg.width
            || frame.height != cfg.height
            || frame.data.len() != rgb_len(cfg.width, cfg.height)
        {
            return Err(ReliefError::validation(format!(
                "frame {seq} is {}x{} ({} bytes), encoder expects {}x{}",
                frame.width,
                frame.height,
                frame.data.len(),
                cfg.width,
                cfg.height
            )));
        }
        self.last_seq = Some(seq);

        let stdin = enc
            .stdin
            .as_mut()
            .ok_or_else(|| ReliefError::media("ffmpeg encoder input already closed"))?;
        stdin
            .write_all(&frame.data)
            .map_err(|e| ReliefError::media(format!("failed to write frame {seq} to ffmpeg: {e}")))
    }

    fn end(&mut self) -> ReliefResult<()> {
        let mut enc = self
            .encoder
            .take()
            .ok_or_else(|| ReliefError::media("ffmpeg sink not started"))?;
        // Closing stdin is the end-of-stream signal for rawvideo input.
        drop(enc.stdin.take());
        let status = enc
            .child
            .wait()
            .map_err(|e| ReliefError::media(format!("failed to wait for ffmpeg encode: {e}")))?;
        let log = enc.stderr.collect()?;
        check_exit("ffmpeg encode", status, &log)?;
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg encoder finished");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        let Some(mut enc) = self.encoder.take() else {
            return;
        };
        drop(enc.stdin.take());
        reap(enc.child);
        let path = &self.opts.out_path;
        match std::fs::remove_file(path) {
            Ok(()) => tracing::warn!(out = %path.display(), "removed unfinished output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(out = %path.display(), error = %e, "could not remove unfinished output")
            }
        }
    }
}

/// Background reader that keeps a child's stderr pipe from filling up.
pub(crate) struct StderrDrain(JoinHandle<std::io::Result<Vec<u8>>>);

impl StderrDrain {
    pub(crate) fn start(child: &mut Child) -> ReliefResult<Self> {
        let mut pipe: ChildStderr = child
            .stderr
            .take()
            .ok_or_else(|| ReliefError::media("child process has no stderr pipe"))?;
        Ok(Self(std::thread::spawn(move || {
            let mut bytes = Vec::new();
            pipe.read_to_end(&mut bytes)?;
            Ok(bytes)
        })))
    }

    /// Wait for the child's stderr to close and return it as text.
    pub(crate) fn collect(self) -> ReliefResult<String> {
        let bytes = self
            .0
            .join()
            .map_err(|_| ReliefError::media("stderr reader thread panicked"))?
            .map_err(|e| ReliefError::media(format!("failed to read child stderr: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_owned())
    }
}

/// Map a non-zero exit into a media error carrying the tool's stderr.
pub(crate) fn check_exit(what: &str, status: ExitStatus, stderr: &str) -> ReliefResult<()> {
    if status.success() {
        return Ok(());
    }
    Err(ReliefError::media(format!(
        "{what} exited with {status}: {stderr}"
    )))
}

/// Kill a child that is no longer wanted and wait for it so it does not linger as a zombie.
pub(crate) fn reap(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReliefResult<()> {
    use anyhow::Context as _;

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

pub(crate) fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
