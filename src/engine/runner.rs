//! Child process execution for the external engines
//!
//! One call spawns one child, feeds its stdin (if any) and closes it, and
//! collects stdout and stderr fully. Engine payloads are small JSON documents,
//! never file contents, so buffering them is fine.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{excerpt, EngineError};

/// How much engine stderr goes to the host log
const STDERR_LOG_LIMIT: usize = 2000;

/// Everything needed to start one engine run
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<Vec<u8>>,
    pub cwd: Option<PathBuf>,
    /// Overlaid on the host environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, payload: Vec<u8>) -> Self {
        self.stdin = Some(payload);
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// # Arguments
    /// * `timeout` - Upper bound for one run; `None` waits as long as the child lives
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Run the child to completion and return its raw stdout
    ///
    /// Decoding stdout is the caller's job.
    ///
    /// # Errors
    /// * `EngineError::Spawn` - the OS could not start or wait on the child
    /// * `EngineError::Process` - non-zero exit, with a stderr excerpt
    /// * `EngineError::Timeout` - the configured bound elapsed; the child is killed
    pub async fn run(&self, invocation: &Invocation) -> Result<Vec<u8>, EngineError> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        #[cfg(windows)]
        command.creation_flags(super::CREATE_NO_WINDOW);

        log::info!(
            "[engine] spawn: {} {}",
            invocation.program,
            invocation.args.join(" ")
        );

        let spawn_error = |source| EngineError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let mut child = command.spawn().map_err(spawn_error)?;

        // Stdin is fed while output is drained so a chatty child can't block us
        let pipe = child.stdin.take();
        let payload = invocation.stdin.clone();
        let feed = async move {
            if let (Some(mut pipe), Some(payload)) = (pipe, payload) {
                pipe.write_all(&payload).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let run = async { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                log::warn!("[engine] {} timed out after {:?}", invocation.program, limit);
                EngineError::Timeout(limit)
            })?,
            None => run.await,
        };

        if let Err(e) = fed {
            // The exit status decides; a child that ignores stdin is not an error by itself
            log::debug!("[engine] stdin not fully delivered: {}", e);
        }

        let output = output.map_err(spawn_error)?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        log::info!("[engine] exit {:?}", output.status.code());
        if !stderr.is_empty() {
            log::debug!("[engine][stderr]\n{}", excerpt(&stderr, STDERR_LOG_LIMIT));
        }

        if !output.status.success() {
            return Err(EngineError::process(output.status.code(), &stderr));
        }

        Ok(output.stdout)
    }
}
