//! Compiles embedded JXA scripts with `osacompile` and runs them with `osascript`.
//!
//! Compiled scripts are cached per name for the life of the runner. A cached script whose file
//! has disappeared (temp directories get cleaned) is compiled again on next use.

use hoist_engine::config::JxaSettings;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

/// A JXA script embedded in the binary.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub name: &'static str,
    pub source: &'static str,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiling script '{name}' took longer than {timeout:?}")]
    CompileTimeout { name: String, timeout: Duration },

    #[error("Couldn't compile script '{name}': {stderr}")]
    Compile { name: String, stderr: String },

    #[error("Script '{name}' exited with {status}: {stderr}")]
    Script {
        name: String,
        status: String,
        stderr: String,
    },

    #[error("Couldn't parse output of script '{name}': {source}")]
    Output {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Script '{name}' returned {found}, expected {expected}")]
    UnexpectedShape {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct OsaRunner {
    osascript: PathBuf,
    osacompile: PathBuf,
    compile_timeout: Duration,
    scratch: Option<PathBuf>,
    compiled: HashMap<String, PathBuf>,
}

impl OsaRunner {
    pub fn new(osascript: PathBuf, osacompile: PathBuf, compile_timeout: Duration) -> Self {
        Self {
            osascript,
            osacompile,
            compile_timeout,
            scratch: None,
            compiled: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &JxaSettings) -> Self {
        Self::new(
            settings.osascript.clone(),
            settings.osacompile.clone(),
            Duration::from_secs(settings.compile_timeout_secs),
        )
    }

    /// Path of the compiled script, if it has been compiled.
    pub fn compiled_path(&self, name: &str) -> Option<&Path> {
        self.compiled.get(name).map(PathBuf::as_path)
    }

    /// Compile `script` unless a compiled copy is cached and still on disk.
    pub async fn prepare(&mut self, script: &Script) -> Result<PathBuf, RunnerError> {
        if let Some(path) = self.compiled.get(script.name) {
            if path.exists() {
                trace!("Reusing compiled script '{}' from {}", script.name, path.display());
                return Ok(path.clone());
            }
            warn!(
                "Compiled script '{}' vanished from {}; recompiling",
                script.name,
                path.display()
            );
            self.compiled.remove(script.name);
        }

        let path = self.compile(script).await?;
        self.compiled.insert(script.name.to_string(), path.clone());
        Ok(path)
    }

    async fn compile(&mut self, script: &Script) -> Result<PathBuf, RunnerError> {
        let output_path = self.scratch_dir().await?.join(format!("{}.scpt", script.name));
        info!("Compiling script '{}' to {}", script.name, output_path.display());

        let mut child = Command::new(&self.osacompile)
            .arg("-l")
            .arg("JavaScript")
            .arg("-o")
            .arg(&output_path)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.osacompile.display().to_string(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.source.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = tokio::time::timeout(self.compile_timeout, child.wait_with_output())
            .await
            .map_err(|_| RunnerError::CompileTimeout {
                name: script.name.to_string(),
                timeout: self.compile_timeout,
            })??;

        if !output.status.success() || !output_path.exists() {
            return Err(RunnerError::Compile {
                name: script.name.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output_path)
    }

    /// Run `script` with `args` and parse its stdout as JSON.
    pub async fn run(&mut self, script: &Script, args: &[String]) -> Result<Value, RunnerError> {
        let path = self.prepare(script).await?;
        debug!("Running compiled script '{}' from {}", script.name, path.display());

        let output = Command::new(&self.osascript)
            .arg(&path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RunnerError::Spawn {
                program: self.osascript.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Script {
                name: script.name.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| RunnerError::Output {
            name: script.name.to_string(),
            source,
        })
    }

    pub async fn run_for_object(
        &mut self,
        script: &Script,
        args: &[String],
    ) -> Result<Value, RunnerError> {
        let value = self.run(script, args).await?;
        if value.is_object() {
            Ok(value)
        } else {
            Err(unexpected(script, "an object", &value))
        }
    }

    pub async fn run_for_array(
        &mut self,
        script: &Script,
        args: &[String],
    ) -> Result<Vec<Value>, RunnerError> {
        match self.run(script, args).await? {
            Value::Array(values) => Ok(values),
            other => Err(unexpected(script, "an array", &other)),
        }
    }

    /// Remove every compiled script.
    pub async fn cleanup(&mut self) -> Result<(), RunnerError> {
        self.compiled.clear();
        if let Some(dir) = self.scratch.take() {
            debug!("Removing {}", dir.display());
            tokio::fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    async fn scratch_dir(&mut self) -> Result<PathBuf, RunnerError> {
        if let Some(dir) = &self.scratch
            && dir.exists()
        {
            return Ok(dir.clone());
        }
        let dir = std::env::temp_dir().join(format!("hoist-jxa-{}", unique_id()));
        tokio::fs::create_dir_all(&dir).await?;
        self.scratch = Some(dir.clone());
        Ok(dir)
    }
}

impl Drop for OsaRunner {
    fn drop(&mut self) {
        if let Some(dir) = self.scratch.take() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

/// PID + counter + timestamp, unique across runners and parallel tests.
fn unique_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    format!(
        "{}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    )
}

fn unexpected(script: &Script, expected: &'static str, found: &Value) -> RunnerError {
    RunnerError::UnexpectedShape {
        name: script.name.to_string(),
        expected,
        found: match found {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        },
    }
}
