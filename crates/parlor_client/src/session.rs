//! A seated player's session: actions, polling and the background poller.

use crate::error::ClientError;
use crate::reconcile::{PollOutcome, Reconciler, SyncConfig, SyncPhase};
use crate::transport::GameTransport;
use parlor_server::RoomSnapshot;
use parlor_tictactoe::{GameState, PlayerId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

const TICKS_PER_INTERVAL: u32 = 4;
const MIN_TICK: Duration = Duration::from_millis(1);

/// Notification from the background poller.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A polled snapshot replaced the displayed state.
    StateChanged(RoomSnapshot),
    /// A poll failed; the displayed state is unchanged.
    PollFailed {
        /// Failure description.
        reason: String,
    },
}

/// One player's connection to one room.
///
/// Cloning is cheap and every clone shares the same reconciler.
#[derive(Debug)]
pub struct ClientSession<T> {
    transport: Arc<T>,
    room_id: String,
    player_id: PlayerId,
    reconciler: Arc<Mutex<Reconciler>>,
}

impl<T> Clone for ClientSession<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            room_id: self.room_id.clone(),
            player_id: self.player_id.clone(),
            reconciler: Arc::clone(&self.reconciler),
        }
    }
}

impl<T: GameTransport + 'static> ClientSession<T> {
    /// Joins `room_id` and starts tracking it.
    ///
    /// # Errors
    ///
    /// Any rejection from the server (`RoomFull`, `RoomNotFound`, ...) or
    /// transport failure.
    #[instrument(skip(transport, config))]
    pub async fn join(
        transport: Arc<T>,
        room_id: &str,
        player_id: &str,
        display_name: &str,
        config: SyncConfig,
    ) -> Result<Self, ClientError> {
        let snapshot = transport.join_room(room_id, player_id, display_name).await?;
        info!(seats = ?snapshot.seats, "Joined room");
        Ok(Self {
            transport,
            room_id: room_id.to_string(),
            player_id: player_id.to_string(),
            reconciler: Arc::new(Mutex::new(Reconciler::new(player_id, snapshot, config))),
        })
    }

    /// Room this session tracks.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Local player's id.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// State to render right now.
    pub async fn displayed(&self) -> GameState {
        self.reconciler.lock().await.displayed().clone()
    }

    /// Last snapshot accepted from the server.
    pub async fn room(&self) -> RoomSnapshot {
        self.reconciler.lock().await.authoritative().clone()
    }

    /// Current sync phase.
    pub async fn phase(&self) -> SyncPhase {
        self.reconciler.lock().await.phase(Instant::now())
    }

    /// Plays `cell` with an immediate local preview.
    ///
    /// The preview shows until the server answers. On rejection it is
    /// rolled back entirely and the server's error is returned. Dropping
    /// the future before the answer arrives rolls the preview back too.
    ///
    /// # Errors
    ///
    /// [`ClientError::Local`] if refused before sending, otherwise the
    /// server's rejection or a transport failure.
    #[instrument(skip(self), fields(room_id = %self.room_id, player_id = %self.player_id))]
    pub async fn make_move(&self, cell: usize) -> Result<GameState, ClientError> {
        let in_flight = {
            let mut reconciler = self.reconciler.lock().await;
            reconciler.begin_move(cell)?;
            InFlight::new(Arc::clone(&self.reconciler), reconciler.epoch())
        };
        let result = self
            .transport
            .make_move(&self.room_id, &self.player_id, cell)
            .await;
        in_flight.confirm(result).await
    }

    /// Resets the board with an immediate local preview.
    ///
    /// # Errors
    ///
    /// Same as [`ClientSession::make_move`].
    #[instrument(skip(self), fields(room_id = %self.room_id, player_id = %self.player_id))]
    pub async fn reset(&self) -> Result<GameState, ClientError> {
        let in_flight = {
            let mut reconciler = self.reconciler.lock().await;
            reconciler.begin_reset()?;
            InFlight::new(Arc::clone(&self.reconciler), reconciler.epoch())
        };
        let result = self
            .transport
            .reset_game(&self.room_id, &self.player_id)
            .await;
        in_flight.confirm(result).await
    }

    /// Reads the room once if the debounce and pending rules allow it.
    ///
    /// The reconciler lock is released while the request is in flight, so
    /// local actions are never blocked by a slow poll.
    ///
    /// # Errors
    ///
    /// Transport failure or a rejection of the read.
    pub async fn poll_once(&self) -> Result<PollOutcome, ClientError> {
        Ok(self.poll_for_change().await?.0)
    }

    /// Like [`ClientSession::poll_once`], also returning the snapshot when
    /// it was applied.
    ///
    /// The snapshot is cloned under the same lock that applied it, so it is
    /// exactly what the poll installed.
    ///
    /// # Errors
    ///
    /// Transport failure or a rejection of the read.
    pub async fn poll_for_change(
        &self,
    ) -> Result<(PollOutcome, Option<RoomSnapshot>), ClientError> {
        let ticket = {
            let mut reconciler = self.reconciler.lock().await;
            let now = Instant::now();
            if !reconciler.should_poll(now) {
                return Ok((PollOutcome::Skipped, None));
            }
            reconciler.begin_poll(now)
        };

        let snapshot = self.transport.fetch_room(&self.room_id).await?;
        let mut reconciler = self.reconciler.lock().await;
        let outcome = reconciler.apply_poll(ticket, snapshot, Instant::now());
        let applied = (outcome == PollOutcome::Applied).then(|| reconciler.authoritative().clone());
        Ok((outcome, applied))
    }

    /// Starts polling in the background, reporting changes on `events`.
    ///
    /// The task ends when the handle is stopped or dropped, or when the
    /// receiver goes away. Stopping never waits on an outstanding read.
    pub fn spawn_poller(&self, events: mpsc::UnboundedSender<SyncEvent>) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let session = self.clone();
        let task = tokio::spawn(async move {
            let interval = *session.reconciler.lock().await.config().poll_interval();
            // Tick faster than the debounce so scheduling jitter never skips a whole interval.
            let period = (interval / TICKS_PER_INTERVAL).max(MIN_TICK);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(room_id = %session.room_id, ?period, "Poller started");

            loop {
                // The stop signal also cancels a request already in flight.
                let polled = tokio::select! {
                    _ = stop_rx.changed() => break,
                    polled = async {
                        ticker.tick().await;
                        session.poll_for_change().await
                    } => polled,
                };

                let event = match polled {
                    Ok((_, Some(snapshot))) => SyncEvent::StateChanged(snapshot),
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(error = %e, "Poll failed");
                        SyncEvent::PollFailed {
                            reason: e.to_string(),
                        }
                    }
                };
                if events.send(event).is_err() {
                    debug!("Event receiver dropped");
                    break;
                }
            }
            debug!(room_id = %session.room_id, "Poller stopped");
        });

        PollerHandle {
            stop: stop_tx,
            task: Some(task),
        }
    }

    /// Gives up the seat, stopping `poller` first if given.
    ///
    /// # Errors
    ///
    /// Transport failure or a rejection of the leave.
    #[instrument(skip(self, poller), fields(room_id = %self.room_id, player_id = %self.player_id))]
    pub async fn leave(self, poller: Option<PollerHandle>) -> Result<(), ClientError> {
        if let Some(poller) = poller {
            poller.stop().await;
        }
        self.transport
            .leave_room(&self.room_id, &self.player_id)
            .await?;
        info!("Left room");
        Ok(())
    }
}

/// Local action awaiting the server's answer.
///
/// Dropped without [`InFlight::confirm`], it rolls the action back so the
/// reconciler never stays pending.
struct InFlight {
    reconciler: Arc<Mutex<Reconciler>>,
    epoch: u64,
    settled: bool,
}

impl InFlight {
    fn new(reconciler: Arc<Mutex<Reconciler>>, epoch: u64) -> Self {
        Self {
            reconciler,
            epoch,
            settled: false,
        }
    }

    async fn confirm(
        mut self,
        result: Result<GameState, ClientError>,
    ) -> Result<GameState, ClientError> {
        let mut reconciler = self.reconciler.lock().await;
        self.settled = true;
        reconciler.confirm(result, Instant::now())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let epoch = self.epoch;
        if let Ok(mut reconciler) = self.reconciler.try_lock() {
            reconciler.abandon(epoch, Instant::now());
            return;
        }
        let reconciler = Arc::clone(&self.reconciler);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    reconciler.lock().await.abandon(epoch, Instant::now());
                });
            }
            Err(_) => warn!(epoch, "No runtime to roll back a cancelled action"),
        }
    }
}

/// Owner of a running poller task. Dropping it aborts the task.
#[derive(Debug)]
pub struct PollerHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signals the poller and waits for it to finish.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Poller task ended abnormally");
            }
        }
    }

    /// Checks if the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
