//! External media tool discovery and invocation.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::config::{ToolKind, ToolsConfig};
use crate::error::{Error, Result};
use crate::fs::working_dir;

/// Number of stderr lines kept to explain a failed run.
const STDERR_TAIL_LINES: usize = 5;

/// Media tools found on this machine.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<(ToolKind, PathBuf)>,
}

impl ToolSet {
    /// Look up every known tool on PATH.
    ///
    /// Fails with [`Error::ToolUnavailable`] when none is installed.
    pub fn detect() -> Result<Self> {
        let mut tools = Vec::new();

        for kind in [ToolKind::YtDlp, ToolKind::Ffmpeg] {
            match which::which(kind.binary()) {
                Ok(path) => {
                    tracing::debug!("Found {} at {}", kind, path.display());
                    tools.push((kind, path));
                }
                Err(_) => tracing::debug!("{} not found on PATH", kind),
            }
        }

        let set = Self { tools };
        if set.is_empty() {
            return Err(Error::ToolUnavailable);
        }
        Ok(set)
    }

    /// Build a set from known paths.
    pub fn from_paths(tools: impl IntoIterator<Item = (ToolKind, PathBuf)>) -> Self {
        Self {
            tools: tools.into_iter().collect(),
        }
    }

    pub fn get(&self, kind: ToolKind) -> Option<&Path> {
        self.tools
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, path)| path.as_path())
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.tools.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// One planned external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: ToolKind,
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Exit status and the last stderr lines of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stderr_tail: Vec<String>,
}

/// Drives yt-dlp or ffmpeg to turn a stream URL into a local file.
///
/// Tools are tried in the configured preference order. yt-dlp is run once
/// per configured format selector until one succeeds; ffmpeg remuxes the
/// stream with copied codecs.
#[derive(Debug, Clone)]
pub struct ToolInvoker {
    tools: ToolSet,
    preferred: Vec<ToolKind>,
    formats: Vec<String>,
    container: String,
    user_agent: String,
}

impl ToolInvoker {
    pub fn new(tools: ToolSet, config: &ToolsConfig, user_agent: &str) -> Self {
        Self {
            tools,
            preferred: config.preferred.clone(),
            formats: config
                .formats
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            container: config.container.trim_start_matches('.').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Ordered list of process runs that may produce `output` from `media_url`.
    pub fn plan(&self, media_url: &str, output: &Path) -> Vec<Invocation> {
        let file_name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.to_string_lossy().into_owned());
        // yt-dlp names a merged file after its merge format, so it must match `output`
        let container = output
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or(self.container.as_str());

        let mut plan = Vec::new();
        for kind in &self.preferred {
            let Some(program) = self.tools.get(*kind) else {
                continue;
            };

            match kind {
                ToolKind::YtDlp => {
                    for format in &self.formats {
                        plan.push(Invocation {
                            tool: *kind,
                            program: program.to_path_buf(),
                            args: self.ytdlp_args(format, container, media_url, &file_name),
                        });
                    }
                }
                ToolKind::Ffmpeg => plan.push(Invocation {
                    tool: *kind,
                    program: program.to_path_buf(),
                    args: self.ffmpeg_args(media_url, &file_name),
                }),
            }
        }
        plan
    }

    fn ytdlp_args(
        &self,
        format: &str,
        container: &str,
        media_url: &str,
        file_name: &str,
    ) -> Vec<String> {
        [
            "--newline",
            "--no-playlist",
            "--no-part",
            "--force-overwrites",
            "-f",
            format,
            "--merge-output-format",
            container,
            "--user-agent",
            self.user_agent.as_str(),
            "-o",
            file_name,
            media_url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn ffmpeg_args(&self, media_url: &str, file_name: &str) -> Vec<String> {
        [
            "-y",
            "-hide_banner",
            "-loglevel",
            "warning",
            "-user_agent",
            self.user_agent.as_str(),
            "-i",
            media_url,
            "-c",
            "copy",
            "-bsf:a",
            "aac_adtstoasc",
            file_name,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Produce `output` from `media_url`, trying each planned run in turn.
    ///
    /// Any file left at `output` by an earlier attempt is removed first.
    pub async fn download(&self, media_url: &str, output: &Path) -> Result<PathBuf> {
        let plan = self.plan(media_url, output);
        if plan.is_empty() {
            return Err(Error::ToolUnavailable);
        }

        let cwd = working_dir(output);
        let mut last_error = None;

        for invocation in &plan {
            remove_stale_output(output).await?;
            tracing::debug!("Running {} {:?}", invocation.tool, invocation.args);

            let result = run_process(&invocation.program, &invocation.args, &cwd).await;
            match result {
                Ok(out) if out.status.success() => {
                    if tokio::fs::try_exists(output).await.unwrap_or(false) {
                        return Ok(output.to_path_buf());
                    }
                    last_error = Some(Error::Tool {
                        tool: invocation.tool.to_string(),
                        message: format!("finished but {} was not created", output.display()),
                    });
                }
                Ok(out) => {
                    let message = if out.stderr_tail.is_empty() {
                        format!("exited with {}", out.status)
                    } else {
                        format!("exited with {}: {}", out.status, out.stderr_tail.join(" | "))
                    };
                    tracing::debug!("{} {}", invocation.tool, message);
                    last_error = Some(Error::Tool {
                        tool: invocation.tool.to_string(),
                        message,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(Error::ToolUnavailable))
    }
}

async fn remove_stale_output(output: &Path) -> Result<()> {
    match tokio::fs::remove_file(output).await {
        Ok(()) => {
            tracing::debug!("Removed partial output {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Run a program in `cwd`, forwarding its output to the log as it arrives.
pub async fn run_process(program: &Path, args: &[String], cwd: &Path) -> Result<ProcessOutput> {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolUnavailable
            } else {
                Error::Tool {
                    tool: name.clone(),
                    message: format!("failed to start: {}", e),
                }
            }
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let forward_stdout = async {
        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!("[{}] {}", name, line);
            }
        }
    };

    let forward_stderr = async {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!("[{} stderr] {}", name, line);
                if line.trim().is_empty() {
                    continue;
                }
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
        tail
    };

    let ((), tail, status) = tokio::join!(forward_stdout, forward_stderr, child.wait());

    Ok(ProcessOutput {
        status: status?,
        stderr_tail: tail.into_iter().collect(),
    })
}
