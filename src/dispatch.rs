//! Background application of the shelf property
//!
//! The UI thread hands `(visible, height)` pairs to a [`PropertyDispatcher`];
//! a [`PropertyWorker`] registered on a calloop event loop applies them off
//! the UI thread. There is a single pending slot: a dispatch that arrives
//! before the previous one was applied replaces it, so only the latest pair
//! is ever applied.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use calloop::channel::{self, Channel, Sender};
use calloop::{EventLoop, LoopHandle, LoopSignal, RegistrationToken};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};

/// Hotseat shelf as seen by the system UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfState {
    pub visible: bool,
    pub height_px: i32,
}

/// Receiver of applied shelf states, called on the background loop
pub trait PropertySink: Send + 'static {
    fn apply(&mut self, state: ShelfState);
}

type Slot = Arc<Mutex<Option<ShelfState>>>;

fn take_pending(slot: &Slot) -> Option<ShelfState> {
    match slot.lock() {
        Ok(mut pending) => pending.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

/// UI-thread side of the shelf channel
#[derive(Clone)]
pub struct PropertyDispatcher {
    slot: Slot,
    wake: Sender<()>,
    rejected: Arc<AtomicU64>,
}

/// Background side of the shelf channel
pub struct PropertyWorker<S> {
    slot: Slot,
    channel: Channel<()>,
    sink: S,
}

/// Create a connected dispatcher/worker pair
pub fn property_channel<S: PropertySink>(sink: S) -> (PropertyDispatcher, PropertyWorker<S>) {
    let (wake, channel) = channel::channel();
    let slot: Slot = Arc::new(Mutex::new(None));

    let dispatcher = PropertyDispatcher {
        slot: slot.clone(),
        wake,
        rejected: Arc::new(AtomicU64::new(0)),
    };
    let worker = PropertyWorker { slot, channel, sink };
    (dispatcher, worker)
}

impl PropertyDispatcher {
    /// Schedule `(visible, height_px)` for application and return immediately
    ///
    /// Submission failures are reported here and never reach the caller.
    pub fn dispatch(&self, visible: bool, height_px: i32) {
        let state = ShelfState { visible, height_px };
        if let Err(e) = self.submit(state) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            error!(visible, height_px, "Shelf state dispatch failed: {}", e);
        }
    }

    fn submit(&self, state: ShelfState) -> Result<()> {
        {
            let mut pending = self
                .slot
                .lock()
                .map_err(|_| Error::Executor("shelf slot poisoned".to_string()))?;
            if let Some(previous) = pending.replace(state) {
                debug!(?previous, ?state, "Superseding pending shelf state");
            }
        }

        self.wake.send(()).map_err(|_| {
            // Nobody will ever apply it
            take_pending(&self.slot);
            Error::SubmissionRejected
        })
    }

    /// Number of dispatches the background loop could not accept
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl<S: PropertySink> PropertyWorker<S> {
    /// Register on an event loop owned by the caller
    pub fn register<D>(self, handle: &LoopHandle<'static, D>) -> Result<RegistrationToken> {
        self.insert(handle, None)
    }

    fn insert<D>(
        self,
        handle: &LoopHandle<'static, D>,
        stop_on_close: Option<LoopSignal>,
    ) -> Result<RegistrationToken> {
        let PropertyWorker { slot, channel, mut sink } = self;

        handle
            .insert_source(channel, move |event, _, _| match event {
                channel::Event::Msg(()) => {
                    // Earlier wakeups may already have consumed the slot
                    if let Some(state) = take_pending(&slot) {
                        debug!(?state, "Applying shelf state");
                        sink.apply(state);
                    }
                }
                channel::Event::Closed => {
                    debug!("All shelf dispatchers dropped");
                    if let Some(signal) = &stop_on_close {
                        signal.stop();
                    }
                }
            })
            .map_err(|e| Error::Executor(e.error.to_string()))
    }
}

/// Dedicated thread running the shelf worker on its own event loop
pub struct BackgroundApplier {
    signal: LoopSignal,
    thread: Option<JoinHandle<()>>,
}

/// Spawn the background thread and return the dispatcher feeding it
pub fn spawn_background<S: PropertySink>(sink: S) -> Result<(PropertyDispatcher, BackgroundApplier)> {
    let (dispatcher, worker) = property_channel(sink);
    let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<LoopSignal>>(1);

    let thread = std::thread::Builder::new()
        .name("flick-shelf".to_string())
        .spawn(move || {
            let mut event_loop: EventLoop<'static, ()> = match EventLoop::try_new() {
                Ok(event_loop) => event_loop,
                Err(e) => {
                    let _ = ready_tx.send(Err(Error::Executor(e.to_string())));
                    return;
                }
            };
            let signal = event_loop.get_signal();

            if let Err(e) = worker.insert(&event_loop.handle(), Some(signal.clone())) {
                let _ = ready_tx.send(Err(e));
                return;
            }
            let _ = ready_tx.send(Ok(signal));

            if let Err(e) = event_loop.run(None, &mut (), |_| {}) {
                error!("Shelf event loop failed: {}", e);
            }
            debug!("Shelf event loop stopped");
        })?;

    let signal = ready_rx
        .recv()
        .map_err(|_| Error::Executor("shelf thread exited during startup".to_string()))??;

    info!("Shelf applier running on background thread");
    Ok((dispatcher, BackgroundApplier { signal, thread: Some(thread) }))
}

impl BackgroundApplier {
    /// Stop the loop and wait for the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.signal.stop();
            self.signal.wakeup();
            if thread.join().is_err() {
                error!("Shelf thread panicked");
            }
        }
    }
}

impl Drop for BackgroundApplier {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Publishes the shelf state as JSON for the system UI to pick up
pub struct ShelfStateFile {
    path: PathBuf,
}

impl ShelfStateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `$XDG_RUNTIME_DIR/flick/shelf.json`, or under /tmp
    pub fn default_path() -> PathBuf {
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("flick/shelf.json")
    }

    fn write(&self, state: ShelfState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PropertySink for ShelfStateFile {
    fn apply(&mut self, state: ShelfState) {
        match self.write(state) {
            Ok(()) => info!(visible = state.visible, height_px = state.height_px, "Shelf state applied"),
            Err(e) => warn!("Failed to write shelf state to {:?}: {}", self.path, e),
        }
    }
}
