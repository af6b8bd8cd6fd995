//! Per-key fallback chain state machine
//!
//! Each key moves through `Unresolved -> Trying(i) -> Resolved | Failed`. Resolved
//! and failed keys short-circuit every later lookup until `reset` or `clear_all`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::attempt::{Attempt, FnAttempt};

/// Default per-key budget for `preload`
const DEFAULT_PRELOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Observable resolution state of one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState<C> {
    /// No attempt has been made, or the key was reset
    Unresolved,
    /// The candidate at this index is being attempted
    Trying(usize),
    /// This candidate succeeded and is returned without further attempts
    Resolved(C),
    /// Every candidate failed; no attempts are made until reset
    Failed,
}

/// Counts of keys per resolution state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Keys with any recorded state
    pub tracked: usize,
    /// Keys memoized with a working candidate
    pub resolved: usize,
    /// Keys whose whole chain failed
    pub failed: usize,
    /// Keys with an attempt in progress
    pub in_flight: usize,
}

/// Summary of a `preload` batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    /// Keys that settled on a candidate
    pub resolved: usize,
    /// Keys with no working candidate, including keys with an empty chain
    pub failed: usize,
    /// Keys whose resolution did not settle within the per-key timeout
    pub timed_out: usize,
}

enum PreloadOutcome {
    Resolved,
    Failed,
    TimedOut,
}

/// Recorded state for one key
struct Slot<C> {
    state: Mutex<ResolutionState<C>>,
}

impl<C: Clone> Slot<C> {
    fn new() -> Self {
        Self {
            state: Mutex::new(ResolutionState::Unresolved),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ResolutionState<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> ResolutionState<C> {
        self.lock_state().clone()
    }

    fn set(&self, state: ResolutionState<C>) {
        *self.lock_state() = state;
    }
}

/// Puts a slot back to `Unresolved` if a chain is abandoned before it settles
///
/// Dropping a `resolve` future mid-attempt drops this guard with `settled` unset.
struct ChainGuard<'a, C: Clone> {
    slot: &'a Slot<C>,
    settled: bool,
}

impl<'a, C: Clone> ChainGuard<'a, C> {
    fn new(slot: &'a Slot<C>) -> Self {
        Self {
            slot,
            settled: false,
        }
    }

    fn settle(&mut self, state: ResolutionState<C>) {
        self.slot.set(state);
        self.settled = true;
    }
}

impl<C: Clone> Drop for ChainGuard<'_, C> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.slot.lock_state();
        if matches!(*state, ResolutionState::Trying(_)) {
            *state = ResolutionState::Unresolved;
        }
    }
}

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Resolves keys against ordered candidate lists with memoized outcomes
///
/// Slots live for the lifetime of the resolver; there is no expiry. `reset`
/// detaches a key's slot, so an in-flight resolution that started before the
/// reset still returns its result to its own caller but records it in the
/// detached slot, leaving the key unresolved.
///
/// Each key also has a gate that serializes its resolutions: candidate `i + 1`
/// is never tried before candidate `i` has settled, and a second caller sees
/// the first caller's memoized outcome instead of starting its own chain.
/// Gates are never removed, so a resolve issued after `reset` or `clear_all`
/// waits for a chain that is still running on the detached slot.
pub struct FallbackResolver<C> {
    attempt: Arc<dyn Attempt<C>>,
    slots: Mutex<HashMap<String, Arc<Slot<C>>>>,
    gates: Mutex<HashMap<String, Gate>>,
    preload_timeout: Duration,
}

impl<C> FallbackResolver<C>
where
    C: Clone + Debug + Send + Sync + 'static,
{
    /// Creates a resolver that uses `attempt` to try each candidate
    pub fn new<A>(attempt: A) -> Self
    where
        A: Attempt<C> + 'static,
    {
        Self {
            attempt: Arc::new(attempt),
            slots: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            preload_timeout: DEFAULT_PRELOAD_TIMEOUT,
        }
    }

    /// Creates a resolver from an async predicate closure
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::new(FnAttempt::new(f))
    }

    /// Sets how long each key may take during `preload` before it is abandoned
    pub fn with_preload_timeout(mut self, timeout: Duration) -> Self {
        self.preload_timeout = timeout;
        self
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Arc<Slot<C>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Arc<Slot<C>> {
        self.lock_slots()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }

    fn gate(&self, key: &str) -> Gate {
        self.gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Returns the first candidate for `key` that passes the attempt check
    ///
    /// A key that already resolved returns its memoized candidate without any
    /// attempt; a key whose chain was exhausted returns `None` without any
    /// attempt, whatever `candidates` is passed now. An empty candidate list
    /// returns `None` immediately and records nothing.
    ///
    /// If the returned future is dropped before the chain settles, the key goes
    /// back to `Unresolved`.
    pub async fn resolve(&self, key: &str, candidates: &[C]) -> Option<C> {
        if candidates.is_empty() {
            return None;
        }

        let gate = self.gate(key);
        let _turn = gate.lock().await;
        // Looked up under the gate so a reset while waiting is honored
        let slot = self.slot(key);

        match slot.current() {
            ResolutionState::Resolved(candidate) => return Some(candidate),
            ResolutionState::Failed => return None,
            ResolutionState::Unresolved | ResolutionState::Trying(_) => {}
        }

        let mut guard = ChainGuard::new(&slot);
        for (index, candidate) in candidates.iter().enumerate() {
            slot.set(ResolutionState::Trying(index));

            if self.attempt.attempt(candidate).await.is_success() {
                debug!(key, index, ?candidate, "candidate resolved");
                guard.settle(ResolutionState::Resolved(candidate.clone()));
                return Some(candidate.clone());
            }

            debug!(key, index, ?candidate, "candidate failed");
        }

        info!(key, attempted = candidates.len(), "fallback chain exhausted");
        guard.settle(ResolutionState::Failed);
        None
    }

    /// Forgets any memoized outcome for `key` and resolves it again from candidate 0
    pub async fn refresh(&self, key: &str, candidates: &[C]) -> Option<C> {
        self.reset(key);
        self.resolve(key, candidates).await
    }

    /// Clears the resolution or failure state of one key
    ///
    /// A chain already running for `key` finishes on its own, and the next
    /// `resolve` of `key` starts only after it has.
    pub fn reset(&self, key: &str) {
        if self.lock_slots().remove(key).is_some() {
            debug!(key, "reset resolution state");
        }
    }

    /// Clears the state of every key
    pub fn clear_all(&self) {
        let mut slots = self.lock_slots();
        let cleared = slots.len();
        slots.clear();
        debug!(cleared, "cleared all resolution state");
    }

    /// Returns the current state of `key`
    ///
    /// Keys never seen, or reset since, are `Unresolved`.
    pub fn state(&self, key: &str) -> ResolutionState<C> {
        let slot = self.lock_slots().get(key).cloned();
        slot.map(|slot| slot.current())
            .unwrap_or(ResolutionState::Unresolved)
    }

    /// Counts tracked keys by state
    pub fn stats(&self) -> ResolverStats {
        let slots: Vec<Arc<Slot<C>>> = self.lock_slots().values().cloned().collect();

        let mut stats = ResolverStats {
            tracked: slots.len(),
            ..Default::default()
        };
        for slot in slots {
            match slot.current() {
                ResolutionState::Resolved(_) => stats.resolved += 1,
                ResolutionState::Failed => stats.failed += 1,
                ResolutionState::Trying(_) => stats.in_flight += 1,
                ResolutionState::Unresolved => {}
            }
        }
        stats
    }

    /// Resolves a batch of keys concurrently
    ///
    /// `candidate_fn` builds the chain for each key. Every key runs under its own
    /// timeout and settles independently, so one slow or failing key never holds
    /// up another. A key that times out is left to be retried by a later `resolve`.
    pub async fn preload<S, F>(&self, keys: &[S], candidate_fn: F) -> PreloadReport
    where
        S: AsRef<str>,
        F: Fn(&str) -> Vec<C>,
    {
        let timeout = self.preload_timeout;

        let resolutions = keys.iter().map(|key| {
            let key = key.as_ref();
            let candidates = candidate_fn(key);
            async move {
                match tokio::time::timeout(timeout, self.resolve(key, &candidates)).await {
                    Ok(Some(_)) => PreloadOutcome::Resolved,
                    Ok(None) => PreloadOutcome::Failed,
                    Err(_) => {
                        warn!(key, ?timeout, "preload timed out");
                        PreloadOutcome::TimedOut
                    }
                }
            }
        });

        let mut report = PreloadReport::default();
        for outcome in join_all(resolutions).await {
            match outcome {
                PreloadOutcome::Resolved => report.resolved += 1,
                PreloadOutcome::Failed => report.failed += 1,
                PreloadOutcome::TimedOut => report.timed_out += 1,
            }
        }

        info!(
            resolved = report.resolved,
            failed = report.failed,
            timed_out = report.timed_out,
            "preload settled"
        );
        report
    }
}
