//! Optimistic-update reconciliation between local actions and polled state.
//!
//! The [`Reconciler`] is pure bookkeeping: it never performs I/O and takes
//! the current instant as an argument, so the session drives it and tests
//! can step time explicitly.

use crate::error::ClientError;
use derive_getters::Getters;
use derive_setters::Setters;
use parlor_server::RoomSnapshot;
use parlor_tictactoe::{GameState, MoveError, PlayerId};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

/// Content hash of a [`GameState`], used to skip redundant redraws.
pub type Fingerprint = u64;

/// Hashes every field of `state`, including tallies.
pub fn fingerprint(state: &GameState) -> Fingerprint {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    hasher.finish()
}

/// Timing knobs for polling and the post-confirmation grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct SyncConfig {
    /// Minimum spacing between two state reads.
    poll_interval: Duration,
    /// How long poll results stay suppressed after a local action settles.
    pending_grace: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(300),
            pending_grace: Duration::from_millis(50),
        }
    }
}

/// Whether polled snapshots may currently replace the displayed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SyncPhase {
    /// Polls are applied.
    Authoritative,
    /// A local action is in flight or just settled; polls are discarded.
    OptimisticPending,
}

/// What happened to one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The snapshot replaced the authoritative state.
    Applied,
    /// Same fingerprint as last time; nothing changed.
    Unchanged,
    /// Discarded because a local action was pending or started meanwhile.
    Suppressed,
    /// Not issued: too soon after the previous read, or pending.
    Skipped,
}

/// Receipt for a poll that was allowed to start.
///
/// Carries the local action epoch at send time. A response whose epoch is
/// older than the current one predates a local action and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    epoch: u64,
}

/// Client-side view of one room with optimistic overlay.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: SyncConfig,
    player_id: PlayerId,
    authoritative: RoomSnapshot,
    optimistic: Option<GameState>,
    pending: bool,
    release_at: Option<Instant>,
    last_seen: Option<Fingerprint>,
    last_poll: Option<Instant>,
    epoch: u64,
}

impl Reconciler {
    /// Starts from the snapshot returned by a join.
    pub fn new(player_id: impl Into<PlayerId>, snapshot: RoomSnapshot, config: SyncConfig) -> Self {
        let last_seen = Some(fingerprint(&snapshot.state));
        Self {
            config,
            player_id: player_id.into(),
            authoritative: snapshot,
            optimistic: None,
            pending: false,
            release_at: None,
            last_seen,
            last_poll: None,
            epoch: 0,
        }
    }

    /// Local player's id.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Timing configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Last room snapshot accepted from the server, with the latest
    /// confirmed game state.
    pub fn authoritative(&self) -> &RoomSnapshot {
        &self.authoritative
    }

    /// State to render: the optimistic preview while one exists.
    pub fn displayed(&self) -> &GameState {
        self.optimistic.as_ref().unwrap_or(&self.authoritative.state)
    }

    /// Fingerprint of the last applied snapshot, if any.
    pub fn last_seen(&self) -> Option<Fingerprint> {
        self.last_seen
    }

    /// Phase as of `now`, releasing an expired grace window first.
    pub fn phase(&mut self, now: Instant) -> SyncPhase {
        self.settle(now);
        if self.pending {
            SyncPhase::OptimisticPending
        } else {
            SyncPhase::Authoritative
        }
    }

    /// Checks if a local action is still pending at `now`.
    pub fn is_pending(&mut self, now: Instant) -> bool {
        self.phase(now) == SyncPhase::OptimisticPending
    }

    fn settle(&mut self, now: Instant) {
        if self.release_at.is_some_and(|release_at| now >= release_at) {
            self.pending = false;
            self.release_at = None;
            trace!("Pending window released");
        }
    }

    /// Checks if a poll may be sent at `now`.
    ///
    /// Polls are skipped while pending and when the previous one started
    /// less than the poll interval ago.
    pub fn should_poll(&mut self, now: Instant) -> bool {
        if self.is_pending(now) {
            return false;
        }
        match self.last_poll {
            Some(last) => now.saturating_duration_since(last) >= self.config.poll_interval,
            None => true,
        }
    }

    /// Records that a poll is being sent at `now`.
    pub fn begin_poll(&mut self, now: Instant) -> PollTicket {
        self.last_poll = Some(now);
        PollTicket { epoch: self.epoch }
    }

    /// Offers a polled snapshot.
    #[instrument(level = "debug", skip(self, snapshot), fields(room_id = %snapshot.id))]
    pub fn apply_poll(
        &mut self,
        ticket: PollTicket,
        snapshot: RoomSnapshot,
        now: Instant,
    ) -> PollOutcome {
        if self.is_pending(now) || ticket.epoch != self.epoch {
            debug!("Poll result discarded while local action pending");
            return PollOutcome::Suppressed;
        }

        let print = fingerprint(&snapshot.state);
        if self.last_seen == Some(print) {
            return PollOutcome::Unchanged;
        }

        self.last_seen = Some(print);
        self.authoritative = snapshot;
        debug!(fingerprint = print, "Applied polled snapshot");
        PollOutcome::Applied
    }

    /// Validates `cell` against the displayed state and shows the preview.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Local`] when the move is illegal on what the
    /// player currently sees; nothing changes in that case.
    #[instrument(skip(self), fields(player_id = %self.player_id))]
    pub fn begin_move(&mut self, cell: usize) -> Result<GameState, ClientError> {
        let current = self.displayed();
        current.check_move(&self.authoritative.seats, &self.player_id, cell)?;
        let preview = current.preview_move(cell)?;
        self.enter_pending(preview.clone());
        Ok(preview)
    }

    /// Shows an empty board with the same tallies.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Local`] with [`MoveError::InvalidTurn`] when
    /// the local player holds no seat.
    #[instrument(skip(self), fields(player_id = %self.player_id))]
    pub fn begin_reset(&mut self) -> Result<GameState, ClientError> {
        if self.authoritative.seat_of(&self.player_id).is_none() {
            return Err(MoveError::InvalidTurn.into());
        }
        let preview = self.displayed().preview_reset();
        self.enter_pending(preview.clone());
        Ok(preview)
    }

    fn enter_pending(&mut self, preview: GameState) {
        self.optimistic = Some(preview);
        self.pending = true;
        self.release_at = None;
        self.last_seen = None;
        self.epoch += 1;
    }

    /// Epoch of the most recent local action.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Rolls back the action started at `epoch` if it never got an answer.
    ///
    /// Does nothing once that action is confirmed or a newer one began.
    /// Returns whether a rollback happened.
    #[instrument(skip(self))]
    pub fn abandon(&mut self, epoch: u64, now: Instant) -> bool {
        if epoch != self.epoch || !self.pending || self.release_at.is_some() {
            return false;
        }
        let _ = self.confirm(Err(ClientError::transport("cancelled")), now);
        debug!("Abandoned local action rolled back");
        true
    }

    /// Settles the in-flight action with the server's answer.
    ///
    /// Success adopts the returned state as authoritative. Failure drops
    /// the whole preview and clears the fingerprint so the next poll
    /// redraws. Either way polls stay suppressed for the grace window.
    ///
    /// # Errors
    ///
    /// Passes the server's error back after rolling back.
    #[instrument(skip(self, result), fields(ok = result.is_ok()))]
    pub fn confirm(
        &mut self,
        result: Result<GameState, ClientError>,
        now: Instant,
    ) -> Result<GameState, ClientError> {
        self.optimistic = None;
        self.release_at = Some(now + self.config.pending_grace);
        match result {
            Ok(state) => {
                self.last_seen = Some(fingerprint(&state));
                self.authoritative.state = state.clone();
                debug!("Local action confirmed");
                Ok(state)
            }
            Err(err) => {
                self.last_seen = None;
                debug!(error = %err, "Local action rolled back");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_server::ErrorCode;
    use parlor_tictactoe::Symbol;
    use std::collections::BTreeMap;

    fn snapshot(state: GameState) -> RoomSnapshot {
        RoomSnapshot {
            id: "room1".to_string(),
            name: "Thunder Arena".to_string(),
            seats: vec!["p1".to_string(), "p2".to_string()],
            display_names: BTreeMap::new(),
            is_full: true,
            state,
        }
    }

    fn played(moves: &[(&str, usize)]) -> GameState {
        let seats = vec!["p1".to_string(), "p2".to_string()];
        let mut state = GameState::new();
        for (player, cell) in moves {
            state.apply_move(&seats, player, *cell).unwrap();
        }
        state
    }

    fn reconciler(player: &str) -> Reconciler {
        Reconciler::new(player, snapshot(GameState::new()), SyncConfig::default())
    }

    #[test]
    fn test_default_timings() {
        let config = SyncConfig::default();
        assert_eq!(*config.poll_interval(), Duration::from_millis(300));
        assert_eq!(*config.pending_grace(), Duration::from_millis(50));
        let tuned = config.with_poll_interval(Duration::ZERO);
        assert_eq!(*tuned.poll_interval(), Duration::ZERO);
    }

    #[test]
    fn test_fingerprint_tracks_tallies() {
        let a = played(&[("p1", 0)]);
        let mut b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        b.ensure_tally("p3");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[tokio::test]
    async fn test_poll_debounce() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        assert!(rec.should_poll(t0));
        rec.begin_poll(t0);
        assert!(!rec.should_poll(t0 + Duration::from_millis(299)));
        assert!(rec.should_poll(t0 + Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn test_identical_poll_is_unchanged() {
        let mut rec = reconciler("p1");
        let now = Instant::now();
        let ticket = rec.begin_poll(now);
        assert_eq!(
            rec.apply_poll(ticket, snapshot(GameState::new()), now),
            PollOutcome::Unchanged
        );

        let ticket = rec.begin_poll(now);
        let moved = played(&[("p1", 4)]);
        assert_eq!(rec.apply_poll(ticket, snapshot(moved.clone()), now), PollOutcome::Applied);
        assert_eq!(rec.displayed(), &moved);
    }

    #[tokio::test]
    async fn test_move_previews_immediately() {
        let mut rec = reconciler("p1");
        let now = Instant::now();
        let preview = rec.begin_move(4).unwrap();
        assert_eq!(preview.cells().get(4), Some(Some(Symbol::A)));
        assert!(!preview.next_symbol_is_a());
        assert_eq!(rec.displayed(), &preview);
        assert_eq!(rec.authoritative().state, GameState::new());
        assert!(rec.is_pending(now));
        assert!(!rec.should_poll(now));
    }

    #[tokio::test]
    async fn test_local_validation_blocks_request() {
        let mut rec = reconciler("p2");
        let err = rec.begin_move(0).unwrap_err();
        assert_eq!(err, ClientError::Local { error: MoveError::InvalidTurn });
        assert!(!rec.is_pending(Instant::now()));
        assert_eq!(rec.displayed(), &GameState::new());

        let mut rec = reconciler("p1");
        rec.begin_move(0).unwrap();
        let err = rec.begin_move(1).unwrap_err();
        assert_eq!(err, ClientError::Local { error: MoveError::InvalidTurn });
    }

    #[tokio::test]
    async fn test_poll_during_pending_is_suppressed() {
        let mut rec = reconciler("p1");
        let now = Instant::now();
        let ticket = rec.begin_poll(now);
        let preview = rec.begin_move(4).unwrap();

        let outcome = rec.apply_poll(ticket, snapshot(GameState::new()), now);
        assert_eq!(outcome, PollOutcome::Suppressed);
        assert_eq!(rec.displayed(), &preview);
    }

    #[tokio::test]
    async fn test_confirm_then_grace_release() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        rec.begin_move(4).unwrap();
        let server = played(&[("p1", 4)]);
        let confirmed = rec.confirm(Ok(server.clone()), t0).unwrap();
        assert_eq!(confirmed, server);
        assert_eq!(rec.displayed(), &server);
        assert_eq!(rec.last_seen(), Some(fingerprint(&server)));

        assert!(rec.is_pending(t0 + Duration::from_millis(49)));
        assert_eq!(rec.phase(t0 + Duration::from_millis(50)), SyncPhase::Authoritative);

        let later = t0 + Duration::from_millis(400);
        let ticket = rec.begin_poll(later);
        assert_eq!(rec.apply_poll(ticket, snapshot(server), later), PollOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_stale_poll_started_before_move_is_discarded() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        let stale = rec.begin_poll(t0);
        rec.begin_move(4).unwrap();
        rec.confirm(Ok(played(&[("p1", 4)])), t0).unwrap();

        let later = t0 + Duration::from_millis(100);
        let outcome = rec.apply_poll(stale, snapshot(GameState::new()), later);
        assert_eq!(outcome, PollOutcome::Suppressed);
        assert_eq!(rec.displayed(), &played(&[("p1", 4)]));
    }

    #[tokio::test]
    async fn test_rejection_rolls_back_whole_preview() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        rec.begin_move(4).unwrap();
        let rejection = ClientError::Rejected {
            code: ErrorCode::InvalidTurn,
            message: "Not your turn".to_string(),
        };
        let err = rec.confirm(Err(rejection.clone()), t0).unwrap_err();
        assert_eq!(err, rejection);
        assert_eq!(rec.displayed(), &GameState::new());
        assert_eq!(rec.last_seen(), None);

        let later = t0 + Duration::from_millis(60);
        let ticket = rec.begin_poll(later);
        assert_eq!(
            rec.apply_poll(ticket, snapshot(GameState::new()), later),
            PollOutcome::Applied
        );
    }

    #[tokio::test]
    async fn test_begin_move_clears_fingerprint() {
        let mut rec = reconciler("p1");
        assert!(rec.last_seen().is_some());
        rec.begin_move(4).unwrap();
        assert_eq!(rec.last_seen(), None);
    }

    #[tokio::test]
    async fn test_abandon_rolls_back_unanswered_action() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        rec.begin_move(4).unwrap();
        let epoch = rec.epoch();
        assert!(rec.abandon(epoch, t0));
        assert_eq!(rec.displayed(), &GameState::new());
        assert!(rec.is_pending(t0 + Duration::from_millis(49)));
        assert!(!rec.is_pending(t0 + Duration::from_millis(50)));
        assert!(!rec.abandon(epoch, t0));
    }

    #[tokio::test]
    async fn test_abandon_ignores_settled_or_newer_action() {
        let mut rec = reconciler("p1");
        let t0 = Instant::now();
        rec.begin_move(4).unwrap();
        let stale = rec.epoch();
        let server = played(&[("p1", 4)]);
        rec.confirm(Ok(server.clone()), t0).unwrap();
        assert!(!rec.abandon(stale, t0));
        assert_eq!(rec.displayed(), &server);

        let later = t0 + Duration::from_millis(60);
        let mut rec = reconciler("p1");
        rec.begin_move(0).unwrap();
        let first = rec.epoch();
        rec.confirm(Err(ClientError::transport("down")), later).unwrap_err();
        rec.begin_move(0).unwrap();
        assert!(!rec.abandon(first, later));
        assert!(rec.is_pending(later));
    }

    #[tokio::test]
    async fn test_reset_preview_keeps_tallies() {
        let won = played(&[("p1", 0), ("p2", 4), ("p1", 1), ("p2", 5), ("p1", 2)]);
        let mut rec = Reconciler::new("p2", snapshot(won), SyncConfig::default());
        let preview = rec.begin_reset().unwrap();
        assert_eq!(preview.winner(), None);
        assert_eq!(preview.win_counts().get("p1"), Some(&1));
        assert!(preview.next_symbol_is_a());

        let mut watcher = Reconciler::new("p9", snapshot(GameState::new()), SyncConfig::default());
        let err = watcher.begin_reset().unwrap_err();
        assert_eq!(err.code(), None);
    }
}
