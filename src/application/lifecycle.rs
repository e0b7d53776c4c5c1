// Lifecycle - Owns the poller and emitter tasks and drains them in order
//
// The emitter queries the poller, so it is always stopped first: once the
// poller acknowledges shutdown nobody is left to send it a query.
use crate::application::emitter::Emitter;
use crate::application::poller::Poller;
use std::future::Future;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("{task} task did not exit cleanly")]
    TaskFailed {
        task: &'static str,
        #[source]
        source: JoinError,
    },
}

/// Tasks in the order they acknowledged shutdown.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub stopped: Vec<&'static str>,
}

struct ManagedTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ManagedTask {
    fn spawn<F>(name: &'static str, run: impl FnOnce(CancellationToken) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(cancel.clone()));
        Self {
            name,
            cancel,
            handle,
        }
    }

    /// Signal the task and wait until it has actually exited.
    async fn stop(self) -> Result<&'static str, ShutdownError> {
        let Self {
            name,
            cancel,
            handle,
        } = self;

        tracing::info!("Stopping {}", name);
        cancel.cancel();
        handle
            .await
            .map_err(|source| ShutdownError::TaskFailed { task: name, source })?;
        tracing::info!("{} acknowledged shutdown", name);
        Ok(name)
    }
}

pub struct Lifecycle {
    emitter: ManagedTask,
    poller: ManagedTask,
}

impl Lifecycle {
    /// Spawn both tasks, each with its own cancellation token.
    pub fn start(poller: Poller, emitter: Emitter) -> Self {
        let poller = ManagedTask::spawn("poller", |cancel| poller.run(cancel));
        let emitter = ManagedTask::spawn("emitter", |cancel| emitter.run(cancel));
        Self { emitter, poller }
    }

    /// Stop the emitter, wait for it, then stop the poller and wait for it.
    ///
    /// The poller is stopped even when the emitter failed; the first failure
    /// is returned after both tasks are gone.
    pub async fn shutdown(self) -> Result<ShutdownReport, ShutdownError> {
        let mut report = ShutdownReport::default();

        let emitter = self.emitter.stop().await;
        if let Ok(name) = &emitter {
            report.stopped.push(*name);
        }
        let poller = self.poller.stop().await;
        if let Ok(name) = &poller {
            report.stopped.push(*name);
        }

        emitter?;
        poller?;
        Ok(report)
    }
}
