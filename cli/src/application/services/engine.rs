//! The lifecycle engine: every port an operation needs plus the resolved
//! configuration, threaded explicitly instead of read from the environment.

use anyhow::Result;
use hive_common::BusMessage;

use crate::application::ports::{
    Authorizer, BusPublisher, CommandRunner, LocalFs, ProcessControl, ProgressReporter,
    SourceFetcher,
};
use crate::domain::config::HiveConfig;
use crate::domain::error::LifecycleError;
use crate::domain::paths::HivePaths;

/// Who asked for an operation. A terminal user has no sender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// Bus identity of the requesting user.
    pub sender: Option<String>,
    /// Channel to relay feedback on.
    pub channel: Option<String>,
}

impl Caller {
    #[must_use]
    pub fn local() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn remote(sender: &str, channel: Option<&str>) -> Self {
        Self {
            sender: Some(sender.to_string()),
            channel: channel.map(String::from),
        }
    }
}

/// Borrowed ports and configuration for one invocation.
pub struct Engine<'a, F, R, S, P, B, A, O> {
    pub fs: &'a F,
    pub runner: &'a R,
    pub fetcher: &'a S,
    pub process: &'a P,
    pub bus: &'a B,
    pub auth: &'a A,
    pub reporter: &'a O,
    pub config: &'a HiveConfig,
    pub paths: &'a HivePaths,
}

impl<F, R, S, P, B, A, O> Engine<'_, F, R, S, P, B, A, O>
where
    F: LocalFs,
    R: CommandRunner,
    S: SourceFetcher,
    P: ProcessControl,
    B: BusPublisher,
    A: Authorizer,
    O: ProgressReporter,
{
    /// # Errors
    ///
    /// Returns [`LifecycleError::PermissionDenied`] if the sender is not an
    /// admin.
    pub fn authorize(&self, caller: &Caller) -> Result<()> {
        if self.auth.is_authorized(caller.sender.as_deref()) {
            return Ok(());
        }
        tracing::info!(sender = ?caller.sender, "permission denied");
        Err(LifecycleError::PermissionDenied.into())
    }

    /// Relay `message` to a remote caller on its channel. Local callers and
    /// remote callers without a channel get nothing.
    pub async fn feedback(&self, caller: &Caller, message: &str) {
        let Some(sender) = caller.sender.as_deref() else {
            return;
        };
        let Some(channel) = caller.channel.as_deref() else {
            tracing::debug!(sender, "no channel to relay feedback on");
            return;
        };
        let msg = BusMessage::feedback(channel, sender, message);
        if let Err(e) = self.bus.send(&msg).await {
            tracing::warn!(error = %e, "could not relay feedback");
        }
    }

    /// Echo the outcome of an operation to the caller, success or error,
    /// then hand the result back.
    pub(crate) async fn echo<T>(
        &self,
        caller: &Caller,
        result: Result<T>,
        success: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        let message = match &result {
            Ok(value) => success(value),
            Err(e) => error_text(e),
        };
        self.feedback(caller, &message).await;
        result
    }
}

fn error_text(e: &anyhow::Error) -> String {
    e.downcast_ref::<LifecycleError>()
        .map_or_else(|| format!("{e:#}"), ToString::to_string)
}

