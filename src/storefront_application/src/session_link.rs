use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use arc_swap::ArcSwapOption;
use storefront_core::{BearerToken, SessionState, TokenStorage};
use tokio::sync::watch;

/// What a committed transition does to the bearer token.
pub(crate) enum BearerUpdate {
    Keep,
    Set(BearerToken),
    Clear,
}

/// Shared session cell. Every write goes through the `watch` sender's lock, so
/// transitions, bearer swaps, storage writes and generation bumps never
/// interleave.
struct SessionCell {
    state: watch::Sender<SessionState>,
    bearer: ArcSwapOption<BearerToken>,
    pending_display_name: ArcSwapOption<String>,
    generation: AtomicU64,
    storage: Arc<dyn TokenStorage>,
}

/// Handle to the live session.
///
/// Readers get snapshots, subscriptions and the current bearer. The only
/// mutations available outside this crate are the forced reset after a
/// rejected bearer and a local logout.
#[derive(Clone)]
pub struct SessionLink {
    cell: Arc<SessionCell>,
}

/// Proof that a submission acquired the loading flag.
#[derive(Debug)]
pub(crate) struct Submission {
    pub generation: u64,
    pub previous: SessionState,
}

impl SessionLink {
    pub(crate) fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::uninitialized());
        Self {
            cell: Arc::new(SessionCell {
                state,
                bearer: ArcSwapOption::empty(),
                pending_display_name: ArcSwapOption::empty(),
                generation: AtomicU64::new(0),
                storage,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.cell.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.cell.state.subscribe()
    }

    /// Current bearer token, present only while authenticated.
    pub fn bearer(&self) -> Option<BearerToken> {
        self.cell.bearer.load_full().map(|token| (*token).clone())
    }

    /// Drop the session because the backend rejected `rejected`.
    ///
    /// Only resets when `rejected` is still the live bearer, so a late
    /// response cannot end a session started after it. Returns whether a
    /// reset happened.
    pub fn reset_after_rejection(&self, rejected: &BearerToken) -> bool {
        let cell = &self.cell;
        cell.state.send_if_modified(|state| {
            let live = cell.bearer.load();
            if live.as_deref() != Some(rejected) {
                return false;
            }
            tracing::warn!("Backend rejected the bearer token, resetting session");
            cell.end_session(state);
            true
        })
    }

    /// Local logout. Synchronous, infallible and idempotent.
    pub fn invalidate(&self) {
        let cell = &self.cell;
        cell.state.send_if_modified(|state| {
            let before = state.clone();
            cell.end_session(state);
            *state != before
        });
    }

    pub(crate) fn storage(&self) -> &dyn TokenStorage {
        self.cell.storage.as_ref()
    }

    pub(crate) fn pending_display_name(&self) -> Option<String> {
        self.cell
            .pending_display_name
            .load_full()
            .map(|name| (*name).clone())
    }

    pub(crate) fn set_pending_display_name(&self, name: Option<String>) {
        self.cell.pending_display_name.store(name.map(Arc::new));
    }

    /// Raise the loading flag unless a submission is already in flight.
    pub(crate) fn begin(&self) -> Option<Submission> {
        let mut submission = None;
        let generation = &self.cell.generation;
        self.cell.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            submission = Some(Submission {
                generation: generation.load(Ordering::SeqCst),
                previous: state.clone(),
            });
            *state = state.clone().with_loading(true);
            true
        });
        submission
    }

    /// Publish the result of a submission. Discarded, returning `false`, when
    /// a logout happened since [`SessionLink::begin`].
    pub(crate) fn commit(
        &self,
        generation: u64,
        next: SessionState,
        bearer: BearerUpdate,
    ) -> bool {
        let cell = &self.cell;
        cell.state.send_if_modified(|state| {
            if cell.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale session transition");
                return false;
            }
            cell.apply_bearer(bearer);
            *state = next;
            true
        })
    }

    /// Unconditional transition, used at boot.
    pub(crate) fn replace(&self, next: SessionState, bearer: BearerUpdate) {
        let cell = &self.cell;
        cell.state.send_modify(|state| {
            cell.apply_bearer(bearer);
            *state = next;
        });
    }

    pub(crate) fn patch(&self, modify: impl FnOnce(&mut SessionState) -> bool) -> bool {
        self.cell.state.send_if_modified(modify)
    }
}

impl SessionCell {
    fn end_session(&self, state: &mut SessionState) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending_display_name.store(None);
        self.apply_bearer(BearerUpdate::Clear);
        *state = SessionState::anonymous();
    }

    fn apply_bearer(&self, update: BearerUpdate) {
        match update {
            BearerUpdate::Keep => {}
            BearerUpdate::Set(token) => {
                if let Err(e) = self.storage.store(&token) {
                    tracing::warn!(error = %e, "Failed to persist bearer token");
                }
                self.bearer.store(Some(Arc::new(token)));
            }
            BearerUpdate::Clear => {
                self.bearer.store(None);
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "Failed to clear persisted bearer token");
                }
            }
        }
    }
}
