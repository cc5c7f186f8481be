//! The adapter instance: request admission, execution, and ordered teardown.
//!
//! [`BridgeClient`] ties the pieces together: one pooled engine client, one
//! runtime context, and a task tracker of in-flight bridges. `execute`
//! admits a request and returns its completion signal; `close` performs the
//! idempotent, ordered teardown — stop admitting, drain or cancel in-flight
//! requests, release the pool, terminate an owned runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use hyperbridge_http::bridge::ResponseBridge;
use hyperbridge_http::connector::{EngineClient, build_client};
use hyperbridge_http::translate;
use hyperbridge_model::{
    BridgeResult, BridgeError, CollectedResponse, CompletionSignal, EnvelopeHandler,
    HttpRequestSpec, ResponseHandler,
};

use crate::config::BridgeConfig;
use crate::runtime::{RuntimeContext, RuntimeOwnership};

/// An adapter instance bridging the SDK contract onto the engine.
///
/// Cheap to clone; all clones share the same engine pool, runtime context,
/// and lifecycle state.
#[derive(Clone)]
pub struct BridgeClient {
    inner: Arc<Inner>,
}

struct Inner {
    engine: Mutex<Option<EngineClient>>,
    runtime: RuntimeContext,
    config: BridgeConfig,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    closed: AtomicBool,
    close_done: AtomicBool,
    close_lock: tokio::sync::Mutex<()>,
    next_request_id: AtomicU64,
}

impl BridgeClient {
    /// Build an adapter instance from configuration.
    ///
    /// The engine client is built here, so configuration errors surface at
    /// construction, before any network call. An owned runtime, by
    /// contrast, is only created on the first `execute`.
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let engine = build_client(&config.client)?;
        let runtime = RuntimeContext::new(config.runtime.clone());
        Ok(Self {
            inner: Arc::new(Inner {
                engine: Mutex::new(Some(engine)),
                runtime,
                config,
                tracker: TaskTracker::new(),
                shutdown: CancellationToken::new(),
                closed: AtomicBool::new(false),
                close_done: AtomicBool::new(false),
                close_lock: tokio::sync::Mutex::new(()),
                next_request_id: AtomicU64::new(1),
            }),
        })
    }

    /// The configuration this instance was built from.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Who owns the runtime this instance schedules on.
    #[must_use]
    pub fn runtime_ownership(&self) -> RuntimeOwnership {
        self.inner.runtime.ownership()
    }

    /// Whether `close` has been initiated.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Execute one request, pushing the response into `handler`.
    ///
    /// Translation and admission failures surface synchronously, before any
    /// network I/O; everything later arrives through the handler and the
    /// returned [`CompletionSignal`], which resolves exactly once.
    pub fn execute(
        &self,
        request: HttpRequestSpec,
        handler: Box<dyn ResponseHandler>,
    ) -> BridgeResult<CompletionSignal> {
        if self.is_closed() {
            return Err(BridgeError::Closed);
        }
        let engine = self
            .inner
            .engine
            .lock()
            .clone()
            .ok_or(BridgeError::Closed)?;

        let engine_request = translate(request)?;
        let method = engine_request.method().clone();

        let handle = self.inner.runtime.handle()?;
        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            request_id,
            method = %method,
            uri = %engine_request.uri(),
            "request accepted"
        );

        let cancel = self.inner.shutdown.child_token();
        let (done_tx, done_rx) = oneshot::channel();
        let bridge = ResponseBridge::new(
            handler,
            done_tx,
            cancel.clone(),
            method,
            self.inner.config.client.checksum_validation,
            request_id,
        );

        let response_future = engine.request(engine_request);
        let _task = self
            .inner
            .tracker
            .spawn_on(bridge.run(response_future), &handle);

        Ok(CompletionSignal::new(done_rx, cancel))
    }

    /// Execute one request and buffer the whole response.
    ///
    /// Convenience over [`execute`](Self::execute) for callers that do not
    /// need streaming consumption.
    pub async fn execute_collect(
        &self,
        request: HttpRequestSpec,
    ) -> BridgeResult<CollectedResponse> {
        let (handler, envelope) = EnvelopeHandler::new();
        let _completion = self.execute(request, Box::new(handler))?;
        let envelope = envelope.await?;
        envelope.collect().await
    }

    /// Close the adapter: idempotent and ordered.
    ///
    /// 1. Stop admitting new requests (`execute` fails with `Closed`).
    /// 2. Wait up to `shutdown_grace` for in-flight requests to finish,
    ///    then cancel the stragglers and wait once more, bounded.
    /// 3. Release the engine client; the pool drains as clones drop.
    /// 4. Terminate an owned runtime within its bound; a borrowed runtime
    ///    is never touched. Overrunning the bound is a logged warning, not
    ///    a close failure.
    pub async fn close(&self) -> BridgeResult<()> {
        self.inner.closed.store(true, Ordering::Release);
        let _guard = self.inner.close_lock.lock().await;
        if self.inner.close_done.load(Ordering::Acquire) {
            debug!("close already completed");
            return Ok(());
        }
        info!("closing adapter");

        self.inner.tracker.close();
        self.drain_in_flight().await;

        let engine = self.inner.engine.lock().take();
        drop(engine);

        self.inner
            .runtime
            .release(self.inner.config.runtime_termination_timeout)
            .await;

        self.inner.close_done.store(true, Ordering::Release);
        info!("adapter closed");
        Ok(())
    }

    /// Bounded drain of in-flight bridges, then forced cancellation.
    ///
    /// The waiting itself runs on the adapter's runtime so the timeout has
    /// a timer to run on even when `close` is awaited from a plain thread.
    async fn drain_in_flight(&self) {
        let Some(handle) = self.inner.runtime.current() else {
            // No runtime was ever created, so nothing was ever spawned.
            return;
        };
        let tracker = self.inner.tracker.clone();
        let shutdown = self.inner.shutdown.clone();
        let grace = self.inner.config.shutdown_grace;
        let drain = handle.spawn(async move {
            if tokio::time::timeout(grace, tracker.wait()).await.is_ok() {
                return;
            }
            warn!("in-flight requests exceeded shutdown grace; cancelling them");
            shutdown.cancel();
            if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
                warn!("requests still pending after forced cancellation");
            }
        });
        if drain.await.is_err() {
            warn!("drain task did not complete");
        }
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("runtime", &self.inner.runtime)
            .field("closed", &self.is_closed())
            .field("in_flight", &self.inner.tracker.len())
            .finish_non_exhaustive()
    }
}
