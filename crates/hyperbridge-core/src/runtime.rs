//! Execution-context ownership for one adapter instance.
//!
//! The adapter schedules every request on a tokio runtime. Where that
//! runtime comes from is a tagged variant, not a flag: a *borrowed* handle
//! was supplied by the caller and must never be terminated here; an *owned*
//! runtime is created by the adapter and must be terminated by it, at most
//! once. Owned runtimes are created lazily on first use, so an adapter that
//! never carries traffic never starts scheduling threads.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use hyperbridge_model::{BridgeError, BridgeResult};

/// Who owns the runtime the adapter schedules on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOwnership {
    /// Caller-supplied; the adapter never terminates it.
    Borrowed,
    /// Adapter-created; terminated exactly once at close.
    Owned,
}

/// The runtime slot of one adapter instance.
pub struct RuntimeContext {
    mode: Mode,
}

enum Mode {
    Borrowed(Handle),
    Owned(Mutex<OwnedState>),
}

enum OwnedState {
    Idle,
    Running(Runtime),
    Terminated,
}

impl RuntimeContext {
    /// Wrap an external handle as borrowed, or prepare an empty owned slot.
    #[must_use]
    pub fn new(external: Option<Handle>) -> Self {
        match external {
            Some(handle) => Self {
                mode: Mode::Borrowed(handle),
            },
            None => Self {
                mode: Mode::Owned(Mutex::new(OwnedState::Idle)),
            },
        }
    }

    /// Which side owns the runtime.
    #[must_use]
    pub fn ownership(&self) -> RuntimeOwnership {
        match &self.mode {
            Mode::Borrowed(_) => RuntimeOwnership::Borrowed,
            Mode::Owned(_) => RuntimeOwnership::Owned,
        }
    }

    /// A handle for spawning request tasks.
    ///
    /// For an owned context this is the creation point: the runtime is
    /// built on the first call, not at adapter construction. Fails with
    /// [`BridgeError::Closed`] once the owned runtime has been terminated.
    pub fn handle(&self) -> BridgeResult<Handle> {
        match &self.mode {
            Mode::Borrowed(handle) => Ok(handle.clone()),
            Mode::Owned(state) => {
                let mut state = state.lock();
                match &*state {
                    OwnedState::Running(runtime) => Ok(runtime.handle().clone()),
                    OwnedState::Terminated => Err(BridgeError::Closed),
                    OwnedState::Idle => {
                        let runtime = Builder::new_multi_thread()
                            .enable_all()
                            .thread_name("hyperbridge-io")
                            .build()
                            .map_err(BridgeError::transport)?;
                        let handle = runtime.handle().clone();
                        debug!("started owned runtime");
                        *state = OwnedState::Running(runtime);
                        Ok(handle)
                    }
                }
            }
        }
    }

    /// The current handle, without creating anything.
    #[must_use]
    pub fn current(&self) -> Option<Handle> {
        match &self.mode {
            Mode::Borrowed(handle) => Some(handle.clone()),
            Mode::Owned(state) => match &*state.lock() {
                OwnedState::Running(runtime) => Some(runtime.handle().clone()),
                OwnedState::Idle | OwnedState::Terminated => None,
            },
        }
    }

    /// Release the context.
    ///
    /// Idempotent. Borrowed runtimes are left untouched. An owned runtime is
    /// taken out of its slot (single writer: the slot mutex) and shut down
    /// on a dedicated thread with `shutdown_timeout`, so no scheduling
    /// thread ever blocks on teardown; the wait for confirmation is bounded
    /// by that same timeout.
    pub async fn release(&self, timeout: Duration) {
        let runtime = match &self.mode {
            Mode::Borrowed(_) => None,
            Mode::Owned(state) => {
                let mut state = state.lock();
                match std::mem::replace(&mut *state, OwnedState::Terminated) {
                    OwnedState::Running(runtime) => Some(runtime),
                    OwnedState::Idle | OwnedState::Terminated => None,
                }
            }
        };
        let Some(runtime) = runtime else {
            return;
        };

        let (done_tx, done_rx) = oneshot::channel();
        let (runtime_tx, runtime_rx) = std::sync::mpsc::channel::<Runtime>();
        let spawned = std::thread::Builder::new()
            .name("hyperbridge-runtime-shutdown".to_owned())
            .spawn(move || {
                if let Ok(runtime) = runtime_rx.recv() {
                    runtime.shutdown_timeout(timeout);
                }
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(_) => {
                let _ = runtime_tx.send(runtime);
                if done_rx.await.is_err() {
                    warn!("runtime shutdown thread exited without confirmation");
                } else {
                    debug!("owned runtime terminated");
                }
            }
            Err(error) => {
                // A runtime must not be dropped on an async thread; with no
                // shutdown thread available, leaking it is the remaining
                // safe option.
                warn!(%error, "failed to spawn runtime shutdown thread; leaking runtime");
                std::mem::forget(runtime);
            }
        }
    }
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("ownership", &self.ownership())
            .finish_non_exhaustive()
    }
}
