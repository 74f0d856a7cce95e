use crate::BRIDGE_JS;
use crate::runner::{OsaRunner, RunnerError, Script};
use async_trait::async_trait;
use hoist_engine::backend::{Bridge, BridgeError};
use hoist_engine::config::JxaSettings;
use hoist_engine::protocol::{BridgeRequest, BridgeResponse};
use tracing::{debug, info};

pub const BRIDGE_SCRIPT: Script = Script {
    name: "hoist-bridge",
    source: BRIDGE_JS,
};

/// Bridge to scriptable macOS applications through `osascript`.
///
/// Every request is one run of the compiled bridge script. Object specifiers travel with each
/// request, so no state is held on the application side between runs.
pub struct JxaBridge {
    settings: JxaSettings,
    runner: Option<OsaRunner>,
}

impl JxaBridge {
    pub fn new(settings: JxaSettings) -> Self {
        Self {
            settings,
            runner: None,
        }
    }
}

impl Default for JxaBridge {
    fn default() -> Self {
        Self::new(JxaSettings::default())
    }
}

/// Failures of the runner itself end the session; only faults reported by the script are
/// per-item.
impl From<RunnerError> for BridgeError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Spawn { source, .. } => BridgeError::Io(source.to_string()),
            RunnerError::Io(e) => BridgeError::Io(e.to_string()),
            RunnerError::Output { source, .. } => BridgeError::Serialization(source.to_string()),
            other => BridgeError::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl Bridge for JxaBridge {
    async fn launch(&mut self) -> Result<(), BridgeError> {
        info!("Preparing JXA bridge ({})", self.settings.osascript.display());
        let mut runner = OsaRunner::from_settings(&self.settings);
        runner.prepare(&BRIDGE_SCRIPT).await?;
        self.runner = Some(runner);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BridgeError> {
        if let Some(mut runner) = self.runner.take() {
            runner.cleanup().await?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.runner.is_some()
    }

    async fn execute(&mut self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        let runner = self.runner.as_mut().ok_or(BridgeError::NotReady)?;

        debug!("JXA {} request", request.op());
        let payload = serde_json::to_string(&request)?;
        let value = runner.run_for_object(&BRIDGE_SCRIPT, &[payload]).await?;
        let response: BridgeResponse = serde_json::from_value(value)?;
        Ok(response)
    }
}
