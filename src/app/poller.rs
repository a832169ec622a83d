use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;

/// Lifecycle of the background poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Created but not started, or stopped explicitly.
    Stopped,
    Running,
    /// Window hidden; resumes when it is shown again.
    Paused,
    /// Terminal. The poll task has exited or is about to.
    Shutdown,
}

impl PollState {
    pub fn start(self, visible: bool) -> Self {
        match self {
            PollState::Stopped if visible => PollState::Running,
            PollState::Stopped => PollState::Paused,
            other => other,
        }
    }

    pub fn stop(self) -> Self {
        match self {
            PollState::Running | PollState::Paused => PollState::Stopped,
            other => other,
        }
    }

    pub fn on_visibility(self, visible: bool) -> Self {
        match (self, visible) {
            (PollState::Running, false) => PollState::Paused,
            (PollState::Paused, true) => PollState::Running,
            (other, _) => other,
        }
    }
}

/// Fixed-interval poll running on the tokio runtime.
///
/// Each tick is awaited before the next interval starts, so ticks never
/// overlap. Pausing or stopping does not abort a tick already running; its
/// result is still delivered.
pub struct Poller {
    state: watch::Sender<PollState>,
    visible: bool,
}

impl Poller {
    pub fn spawn<F, Fut>(runtime: &Handle, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (state, rx) = watch::channel(PollState::Stopped);
        runtime.spawn(run(rx, period, tick));
        Self {
            state,
            visible: true,
        }
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn start(&mut self) {
        let visible = self.visible;
        self.transition(|s| s.start(visible));
    }

    pub fn stop(&mut self) {
        self.transition(PollState::stop);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.transition(|s| s.on_visibility(visible));
    }

    /// Stop for good. Later calls to `start` or `set_visible` have no effect.
    pub fn shutdown(&mut self) {
        self.transition(|_| PollState::Shutdown);
    }

    fn transition(&mut self, f: impl FnOnce(PollState) -> PollState) {
        self.state.send_if_modified(|state| {
            if *state == PollState::Shutdown {
                return false;
            }
            let next = f(*state);
            if next == *state {
                return false;
            }
            log::debug!("Poller {:?} -> {:?}", state, next);
            *state = next;
            true
        });
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run<F, Fut>(mut rx: watch::Receiver<PollState>, period: Duration, mut tick: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        let state = *rx.borrow_and_update();
        match state {
            PollState::Shutdown => break,
            PollState::Stopped | PollState::Paused => {
                if rx.changed().await.is_err() {
                    break;
                }
            }
            PollState::Running => {
                tokio::select! {
                    _ = tokio::time::sleep(period) => tick().await,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
    log::debug!("Poll task finished");
}
