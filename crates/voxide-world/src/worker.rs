//! The background stream worker: keeps the set of resident chunks matching
//! a radius around the player.
//!
//! One worker thread per store, spawned at construction and joined on drop
//! via a cooperative stop flag. Each pass diffs the in-range coordinate set
//! against the resident set and applies the difference one chunk at a time,
//! taking the map lock per transaction rather than across the whole diff.
//! The in-range set may change again mid-pass; the worker simply recomputes
//! on its next iteration.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::Vec3;
use rustc_hash::FxHashSet;

use voxide_coords::{CHUNK_WORLD_SIZE, GridCoord};

use crate::error::WorldError;
use crate::store::ChunkStore;

/// Step-lock state of the stream worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepState {
    /// Streaming runs freely every pass.
    Running,
    /// Step lock engaged; the worker performs no create/unload work.
    LockedIdle,
    /// Step lock engaged with one pass requested; the worker performs
    /// exactly one full diff-and-apply pass and returns to `LockedIdle`.
    LockedStepPending,
}

/// State shared between the owning thread and the stream worker.
#[derive(Debug)]
pub struct StreamShared {
    running: AtomicBool,
    step: Mutex<StepState>,
    player: Mutex<Vec3>,
    radius: Mutex<f32>,
    passes: AtomicU64,
}

impl StreamShared {
    /// Creates shared state with the given loader radius (world units) and
    /// initial step-lock setting.
    pub fn new(loader_radius: f32, step_lock: bool) -> Self {
        Self {
            running: AtomicBool::new(true),
            step: Mutex::new(if step_lock {
                StepState::LockedIdle
            } else {
                StepState::Running
            }),
            player: Mutex::new(Vec3::ZERO),
            radius: Mutex::new(loader_radius),
            passes: AtomicU64::new(0),
        }
    }

    /// Records the player's current world position for the next pass.
    pub fn set_player_position(&self, pos: Vec3) {
        *self.player.lock().unwrap() = pos;
    }

    /// The most recently recorded player position.
    pub fn player_position(&self) -> Vec3 {
        *self.player.lock().unwrap()
    }

    /// Sets the loader radius in world units.
    pub fn set_loader_radius(&self, radius: f32) {
        *self.radius.lock().unwrap() = radius.max(0.0);
    }

    /// The loader radius in world units.
    pub fn loader_radius(&self) -> f32 {
        *self.radius.lock().unwrap()
    }

    /// Engages or releases the step lock.
    ///
    /// Enabling from `Running` moves to `LockedIdle` (a pending step
    /// survives re-enabling); disabling returns to `Running` from any
    /// locked state.
    pub fn set_step_lock_enabled(&self, enabled: bool) {
        let mut step = self.step.lock().unwrap();
        *step = match (*step, enabled) {
            (StepState::Running, true) => StepState::LockedIdle,
            (state, true) => state,
            (_, false) => StepState::Running,
        };
    }

    /// Requests exactly one pass while step-locked.
    ///
    /// No-op unless the worker is in `LockedIdle`.
    pub fn step_next_update(&self) {
        let mut step = self.step.lock().unwrap();
        if *step == StepState::LockedIdle {
            *step = StepState::LockedStepPending;
        }
    }

    /// The current step-lock state.
    pub fn step_state(&self) -> StepState {
        *self.step.lock().unwrap()
    }

    /// Number of completed diff-and-apply passes.
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Acquire)
    }

    /// Whether this state is step-locked (in either locked sub-state).
    pub fn step_locked(&self) -> bool {
        self.step_state() != StepState::Running
    }

    fn should_run_pass(&self) -> bool {
        let mut step = self.step.lock().unwrap();
        match *step {
            StepState::Running => true,
            StepState::LockedIdle => false,
            StepState::LockedStepPending => {
                *step = StepState::LockedIdle;
                true
            }
        }
    }
}

/// Handle to the stream worker thread.
///
/// Dropping the worker stops the thread cooperatively and joins it, so no
/// store access can outlive the store's owner.
pub struct StreamWorker {
    shared: Arc<StreamShared>,
    wake_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl StreamWorker {
    /// Spawns the worker thread for `store`.
    ///
    /// `tick_interval` bounds how long the worker sleeps between passes when
    /// no frame update signal arrives.
    pub fn spawn(
        store: Arc<ChunkStore>,
        shared: Arc<StreamShared>,
        tick_interval: Duration,
    ) -> Result<Self, WorldError> {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("voxide-stream".to_string())
            .spawn(move || run(store, thread_shared, wake_rx, tick_interval))
            .map_err(WorldError::WorkerSpawn)?;

        Ok(Self {
            shared,
            wake_tx,
            handle: Some(handle),
        })
    }

    /// Wakes the worker for another iteration (called once per frame).
    ///
    /// A wakeup already queued is enough; extra signals are dropped.
    pub fn signal(&self) {
        match self.wake_tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                tracing::warn!("stream worker is gone; update signal dropped");
            }
        }
    }

    /// Whether the worker thread is still running.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the worker cooperatively and joins it.
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        let _ = self.wake_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StreamWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    store: Arc<ChunkStore>,
    shared: Arc<StreamShared>,
    wake_rx: Receiver<()>,
    tick_interval: Duration,
) {
    tracing::debug!("stream worker started");
    while shared.running.load(Ordering::Acquire) {
        match wake_rx.recv_timeout(tick_interval) {
            Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        if !shared.should_run_pass() {
            continue;
        }
        run_pass(&store, &shared);
    }
    tracing::debug!("stream worker stopped");
}

/// One full diff-and-apply pass.
///
/// Computes the in-range grid coordinate set around the player's current
/// position, then creates missing chunks and unloads out-of-range ones, each
/// as its own map transaction.
fn run_pass(store: &ChunkStore, shared: &StreamShared) {
    let centre = GridCoord::from_world(shared.player_position());
    let radius_chunks = shared.loader_radius() / CHUNK_WORLD_SIZE;
    let wanted = coords_in_radius(centre, radius_chunks);

    let loaded: FxHashSet<GridCoord> = store.loaded_coords().into_iter().collect();

    let mut unloaded = 0u32;
    for &coord in &loaded {
        if !wanted.contains(&coord) {
            store.unload(coord);
            unloaded += 1;
        }
    }

    let mut created = 0u32;
    for &coord in &wanted {
        if !loaded.contains(&coord) {
            store.create(coord);
            created += 1;
        }
    }

    shared.passes.fetch_add(1, Ordering::Release);
    if created > 0 || unloaded > 0 {
        tracing::debug!(?centre, created, unloaded, "stream pass applied");
    }
}

/// The set of grid coordinates within `radius_chunks` of `centre` (sphere
/// test in chunk units).
fn coords_in_radius(centre: GridCoord, radius_chunks: f32) -> FxHashSet<GridCoord> {
    let mut wanted = FxHashSet::default();
    if radius_chunks < 0.0 {
        return wanted;
    }
    let r = radius_chunks.ceil() as i32;
    let r_sq = f64::from(radius_chunks) * f64::from(radius_chunks);
    for dx in -r..=r {
        for dy in -r..=r {
            for dz in -r..=r {
                let dist_sq = f64::from(dx * dx + dy * dy + dz * dz);
                if dist_sq <= r_sq {
                    wanted.insert(centre.offset(dx, dy, dz));
                }
            }
        }
    }
    wanted
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
