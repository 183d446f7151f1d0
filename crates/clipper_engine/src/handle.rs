use std::sync::{mpsc, Arc};
use std::thread;

use crate::{ClipError, DispatchOutcome, Dispatcher, DispatcherConfig};

enum DispatchCommand {
    ProbeHealth,
    Clip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    HealthProbed { reachable: bool },
    DispatchFinished { outcome: DispatchOutcome },
}

/// Thread-owned runtime for synchronous shells: commands go in over a
/// channel, events come back out through [`DispatchHandle::try_recv`].
///
/// Each `clip` command runs as its own task; overlapping dispatches are
/// not serialized.
pub struct DispatchHandle {
    cmd_tx: mpsc::Sender<DispatchCommand>,
    event_rx: mpsc::Receiver<DispatchEvent>,
}

impl DispatchHandle {
    /// Fails fast on configuration errors; only a valid dispatcher gets a
    /// runtime thread.
    pub fn new(config: DispatcherConfig) -> Result<Self, ClipError> {
        let dispatcher = Arc::new(Dispatcher::new(config)?);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let dispatcher = dispatcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(dispatcher.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn probe_health(&self) {
        let _ = self.cmd_tx.send(DispatchCommand::ProbeHealth);
    }

    pub fn clip(&self) {
        let _ = self.cmd_tx.send(DispatchCommand::Clip);
    }

    pub fn try_recv(&self) -> Option<DispatchEvent> {
        self.event_rx.try_recv().ok()
    }
}

async fn handle_command(
    dispatcher: &Dispatcher,
    command: DispatchCommand,
    event_tx: mpsc::Sender<DispatchEvent>,
) {
    match command {
        DispatchCommand::ProbeHealth => {
            let reachable = dispatcher.health().await;
            let _ = event_tx.send(DispatchEvent::HealthProbed { reachable });
        }
        DispatchCommand::Clip => {
            let outcome = dispatcher.dispatch().await;
            let _ = event_tx.send(DispatchEvent::DispatchFinished { outcome });
        }
    }
}
