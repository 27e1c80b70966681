//! Round Lifecycle and Scheduling
//!
//! `GameSession` owns the counters, the started flag, the round timer,
//! and the engine for the current board, and it is the only place that
//! knows about rounds superseding each other. Every scheduled
//! continuation (deck install, mismatch unflip, timer tick) carries the
//! `RoundId` it was created under; anything tagged with an old round is
//! detected and dropped without touching the new board.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::deck::catalog::{CatalogSource, DataSourceError};
use crate::deck::provider::RandomDeckProvider;
use crate::game::board::{Board, BoardError, Difficulty};
use crate::game::card::{CardFace, CardId};
use crate::game::engine::{EnginePhase, MatchEngine, SelectOutcome};
use crate::game::events::GameEvent;
use crate::game::timer::RoundTimer;
use crate::MISMATCH_DELAY_MS;

// =============================================================================
// TYPES
// =============================================================================

/// Round generation tag. Bumped on every reset; scheduled callbacks from
/// earlier generations are stale and must not mutate the session.
pub type RoundId = u64;

/// Read-only counters for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Pairs found this round.
    pub matches: u32,
    /// Completed selection pairs (one click per two flips).
    pub clicks: u32,
    /// Pairs still on the board.
    pub pairs_left: u32,
}

/// Session errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// A scheduled continuation outlived its round.
    #[error("stale callback for round {round}, current round is {current}")]
    StaleRound {
        /// Round the callback was scheduled in.
        round: RoundId,
        /// The session's current round.
        current: RoundId,
    },

    /// No board installed yet.
    #[error("no board installed")]
    NoBoard,

    /// Deck fetch failed; the round was not started.
    #[error(transparent)]
    Fetch(#[from] DataSourceError),

    /// The fetched deck had the wrong shape.
    #[error(transparent)]
    BadDeck(#[from] BoardError),
}

// =============================================================================
// GAME SESSION
// =============================================================================

/// One player's game session across rounds.
pub struct GameSession {
    round: RoundId,
    difficulty: Difficulty,
    engine: Option<MatchEngine>,
    timer: RoundTimer,
    stats: GameStats,
    started: bool,
}

impl GameSession {
    /// Create a session. No board is dealt until a round begins.
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            round: 0,
            difficulty,
            engine: None,
            timer: RoundTimer::count_down(difficulty.time_limit_secs()),
            stats: GameStats::default(),
            started: false,
        }
    }

    // -------------------------------------------------------------------------
    // Read-only accessors
    // -------------------------------------------------------------------------

    /// Current round generation.
    pub fn round(&self) -> RoundId {
        self.round
    }

    /// Current difficulty.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Counter snapshot for presentation.
    pub fn stats(&self) -> GameStats {
        self.stats
    }

    /// Has `start()` been called for the current round?
    pub fn started(&self) -> bool {
        self.started
    }

    /// The dealt board, if any, for presentation reads.
    pub fn board(&self) -> Option<&Board> {
        self.engine.as_ref().map(|e| e.board())
    }

    /// The round timer.
    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    /// Engine phase, `Idle` before any board exists.
    pub fn phase(&self) -> EnginePhase {
        self.engine.as_ref().map(|e| e.phase()).unwrap_or_default()
    }

    /// Is the engine inside the mismatch lock window?
    pub fn is_locked(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.is_locked())
    }

    /// The fixed mismatch unflip delay.
    pub fn mismatch_delay() -> Duration {
        Duration::from_millis(MISMATCH_DELAY_MS)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Tear down the current round and open a new generation.
    ///
    /// The previous board and timer are gone immediately; any in-flight
    /// deck fetch or pending unflip from the old round is now stale and
    /// will be rejected. Returns the new round's id, which tags the deck
    /// fetch and every continuation scheduled for this round.
    pub fn begin_round(&mut self, difficulty: Difficulty) -> RoundId {
        self.round += 1;
        self.difficulty = difficulty;
        self.engine = None;
        self.started = false;
        self.stats = GameStats::default();
        self.timer = RoundTimer::count_down(difficulty.time_limit_secs());

        info!(round = self.round, ?difficulty, "round reset");
        self.round
    }

    /// Begin a round from a difficulty name, falling back to easy on
    /// unknown input.
    pub fn begin_round_named(&mut self, name: &str) -> RoundId {
        let difficulty = Difficulty::parse(name).unwrap_or_else(|e| {
            warn!("{e}, falling back to easy");
            Difficulty::Easy
        });
        self.begin_round(difficulty)
    }

    /// Install a fetched deck as the round's board.
    ///
    /// Rejects decks from superseded rounds (`StaleRound`) so a slow
    /// fetch can never populate a board it no longer owns. The deck's
    /// shape is validated; on any error no board is installed.
    pub fn install_board(
        &mut self,
        round: RoundId,
        faces: Vec<CardFace>,
    ) -> Result<GameEvent, SessionError> {
        self.guard_round(round)?;

        let board = Board::deal(self.difficulty, faces)?;
        let event = GameEvent::board_dealt(board.rows(), board.cols());
        self.engine = Some(MatchEngine::new(board));

        debug!(round, "board installed");
        Ok(event)
    }

    /// Fetch a deck and deal a new round, in one step.
    ///
    /// Fetches before tearing anything down: on failure the prior board,
    /// if any, is untouched and the session never holds a half-populated
    /// one. The error surfaces to the caller for a user-visible message;
    /// retry is user-initiated only.
    pub async fn deal<S: CatalogSource>(
        &mut self,
        difficulty: Difficulty,
        provider: &RandomDeckProvider<S>,
    ) -> Result<GameEvent, SessionError> {
        // Seeded with the round this deck becomes once the fetch lands.
        let next_round = self.round + 1;
        let faces = provider.fetch_deck(difficulty, next_round).await?;

        let round = self.begin_round(difficulty);
        self.install_board(round, faces)
    }

    /// Start the round: zero the counters, arm the timer.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.engine.is_none() {
            return Err(SessionError::NoBoard);
        }
        self.stats = GameStats {
            matches: 0,
            clicks: 0,
            pairs_left: self.difficulty.pair_count(),
        };
        self.timer.reset();
        self.timer.start();
        self.started = true;

        info!(round = self.round, "round started");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Commands (forwarded from the presentation layer)
    // -------------------------------------------------------------------------

    /// Select a card.
    ///
    /// Silent no-op (empty event list) when the round has not started or
    /// the engine rejects the selection. Bookkeeping happens here: the
    /// click counter bumps once per completed pair of selections - on the
    /// transition into resolution, never per single flip.
    pub fn select_card(&mut self, card: CardId) -> Vec<GameEvent> {
        if !self.started {
            return Vec::new();
        }
        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return Vec::new(),
        };

        match engine.select_card(card) {
            SelectOutcome::Ignored => Vec::new(),

            SelectOutcome::FirstFlipped { card } => {
                self.record_flip(card);
                vec![GameEvent::CardFlipped { card }]
            }

            SelectOutcome::Matched {
                first,
                second,
                species,
                complete,
            } => {
                self.record_flip(second);
                self.record_match();

                let mut events = vec![
                    GameEvent::CardFlipped { card: second },
                    GameEvent::PairMatched {
                        first,
                        second,
                        species,
                        pairs_left: self.stats.pairs_left,
                    },
                ];
                if complete {
                    // Fires exactly once: the engine is terminal now.
                    self.timer.stop();
                    info!(round = self.round, clicks = self.stats.clicks, "round complete");
                    events.push(GameEvent::GameComplete {
                        matches: self.stats.matches,
                        clicks: self.stats.clicks,
                    });
                }
                events
            }

            SelectOutcome::Mismatched { first, second } => {
                self.record_flip(second);
                self.record_mismatch();
                vec![
                    GameEvent::CardFlipped { card: second },
                    GameEvent::MismatchLocked { first, second },
                ]
            }
        }
    }

    /// The scheduled mismatch continuation: flip the pair back down.
    ///
    /// Stale rounds and spurious calls are dropped silently - per the
    /// error design they are not faults, just superseded work.
    pub fn resolve_unflip(&mut self, round: RoundId) -> Vec<GameEvent> {
        if round != self.round {
            debug!(round, current = self.round, "dropping stale unflip");
            return Vec::new();
        }
        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return Vec::new(),
        };

        match engine.resolve_mismatch() {
            Some((first, second)) => vec![GameEvent::CardsUnflipped { first, second }],
            None => Vec::new(),
        }
    }

    /// Sleep out the mismatch delay, then unflip.
    ///
    /// Convenience for single-task drivers; the delay is a scheduled
    /// continuation, so everything else on the runtime keeps running.
    pub async fn unflip_after_delay(&mut self, round: RoundId) -> Vec<GameEvent> {
        tokio::time::sleep(Self::mismatch_delay()).await;
        self.resolve_unflip(round)
    }

    /// Advance the round timer one second.
    ///
    /// Drivers call this from a 1 Hz interval scheduled for `round`; a
    /// tick from a superseded round is dropped silently so an interval
    /// surviving a reset cannot drive the new round's clock. Returns
    /// `None` when stale or when the timer is stopped (round over, not
    /// started, or reset). On count-down expiry the round ends: the
    /// engine goes terminal and `TimeExpired` is returned instead of a
    /// tick.
    pub fn timer_tick(&mut self, round: RoundId) -> Option<GameEvent> {
        if round != self.round {
            debug!(round, current = self.round, "dropping stale timer tick");
            return None;
        }
        if !self.started {
            return None;
        }
        let tick = self.timer.tick()?;

        if tick.expired {
            if let Some(engine) = self.engine.as_mut() {
                engine.expire();
            }
            self.started = false;
            info!(round = self.round, "time expired");
            return Some(GameEvent::TimeExpired);
        }

        Some(GameEvent::TimerTick {
            display: tick.display,
        })
    }

    // -------------------------------------------------------------------------
    // Bookkeeping (pure, always succeeds)
    // -------------------------------------------------------------------------

    fn record_flip(&mut self, card: CardId) {
        debug!(round = self.round, %card, "card flipped");
    }

    fn record_match(&mut self) {
        self.stats.clicks += 1;
        self.stats.matches += 1;
        self.stats.pairs_left = self.stats.pairs_left.saturating_sub(1);
    }

    fn record_mismatch(&mut self) {
        self.stats.clicks += 1;
    }

    fn guard_round(&self, round: RoundId) -> Result<(), SessionError> {
        if round != self.round {
            return Err(SessionError::StaleRound {
                round,
                current: self.round,
            });
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::catalog::MemoryCatalog;
    use crate::game::card::SpeciesKey;

    fn id(i: u8) -> CardId {
        CardId::new(i)
    }

    /// Session with a fixed easy board: [a, a, b, b, c, c], started.
    fn fixed_session() -> GameSession {
        let mut session = GameSession::new(Difficulty::Easy);
        let round = session.begin_round(Difficulty::Easy);

        let mut faces = Vec::new();
        for name in ["abra", "abra", "bellsprout", "bellsprout", "cubone", "cubone"] {
            faces.push(CardFace::new(name, format!("mem://{name}")));
        }
        session.install_board(round, faces).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn test_selection_before_start_is_noop() {
        let mut session = GameSession::new(Difficulty::Easy);
        assert!(session.select_card(id(0)).is_empty());

        let round = session.begin_round(Difficulty::Easy);
        let mut faces = Vec::new();
        for name in ["a", "a", "b", "b", "c", "c"] {
            faces.push(CardFace::new(name, "mem://x"));
        }
        session.install_board(round, faces).unwrap();

        // Board dealt but start() not called yet
        assert!(session.select_card(id(0)).is_empty());
    }

    #[test]
    fn test_start_without_board_fails() {
        let mut session = GameSession::new(Difficulty::Easy);
        session.begin_round(Difficulty::Easy);
        assert!(matches!(session.start(), Err(SessionError::NoBoard)));
    }

    #[test]
    fn test_stale_deck_install_rejected() {
        let mut session = GameSession::new(Difficulty::Easy);
        let old_round = session.begin_round(Difficulty::Easy);

        // A reset supersedes the in-flight fetch
        session.begin_round(Difficulty::Medium);

        let mut faces = Vec::new();
        for name in ["a", "a", "b", "b", "c", "c"] {
            faces.push(CardFace::new(name, "mem://x"));
        }
        let err = session.install_board(old_round, faces).unwrap_err();
        assert!(matches!(err, SessionError::StaleRound { .. }));
        assert!(session.board().is_none(), "stale deck must not land");
    }

    #[test]
    fn test_worked_easy_round_example() {
        // Mismatch [A, B], then match [C, C'].
        let mut session = fixed_session();
        let round = session.round();

        // A = card 0 (abra), B = card 2 (bellsprout)
        session.select_card(id(0));
        let events = session.select_card(id(2));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::MismatchLocked { .. })));
        assert!(session.is_locked());

        // During the lock window nothing is accepted
        assert!(session.select_card(id(4)).is_empty());

        let events = session.resolve_unflip(round);
        assert_eq!(
            events,
            vec![GameEvent::CardsUnflipped {
                first: id(0),
                second: id(2)
            }]
        );
        assert_eq!(
            session.stats(),
            GameStats {
                matches: 0,
                clicks: 1,
                pairs_left: 3
            }
        );

        // C / C' share an identity
        session.select_card(id(0));
        let events = session.select_card(id(1));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PairMatched { species, .. } if *species == SpeciesKey::new("abra")
        )));
        assert_eq!(
            session.stats(),
            GameStats {
                matches: 1,
                clicks: 2,
                pairs_left: 2
            }
        );

        // Both matched cards locked
        assert!(session.select_card(id(0)).is_empty());
        assert!(session.select_card(id(1)).is_empty());
    }

    #[test]
    fn test_click_counts_once_per_pair() {
        let mut session = fixed_session();
        session.select_card(id(0));
        assert_eq!(session.stats().clicks, 0, "single flip is not a click");

        session.select_card(id(1));
        assert_eq!(session.stats().clicks, 1);
    }

    #[test]
    fn test_game_complete_fires_once_and_stops_timer() {
        let mut session = fixed_session();
        session.select_card(id(0));
        session.select_card(id(1));
        session.select_card(id(2));
        session.select_card(id(3));
        session.select_card(id(4));
        let events = session.select_card(id(5));

        let completes = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameComplete { .. }))
            .count();
        assert_eq!(completes, 1);
        assert_eq!(
            session.stats(),
            GameStats {
                matches: 3,
                clicks: 3,
                pairs_left: 0
            }
        );
        assert!(!session.timer().is_running());

        // Terminal: nothing more fires
        assert!(session.select_card(id(0)).is_empty());
        assert!(session.timer_tick(session.round()).is_none());
    }

    #[test]
    fn test_time_expiry_ends_round() {
        let mut session = fixed_session();
        let round = session.round();

        // Easy limit is 100 seconds
        for _ in 0..99 {
            assert!(matches!(
                session.timer_tick(round),
                Some(GameEvent::TimerTick { .. })
            ));
        }
        assert_eq!(session.timer_tick(round), Some(GameEvent::TimeExpired));

        // Round is over: no selections, no more ticks
        assert!(session.select_card(id(0)).is_empty());
        assert!(session.timer_tick(round).is_none());
        assert_eq!(session.phase(), EnginePhase::Complete);
    }

    #[test]
    fn test_stale_timer_tick_dropped_after_reset() {
        let mut session = fixed_session();
        let old_round = session.round();
        session.timer_tick(old_round);

        // Reset; the old round's 1 Hz interval is still firing
        let round = session.begin_round(Difficulty::Easy);
        let mut faces = Vec::new();
        for name in ["x", "x", "y", "y", "z", "z"] {
            faces.push(CardFace::new(name, "mem://x"));
        }
        session.install_board(round, faces).unwrap();
        session.start().unwrap();

        // Stale ticks must not advance the new round's clock
        assert!(session.timer_tick(old_round).is_none());
        assert_eq!(session.timer().elapsed_secs(), 0);

        // One current tick plus one stale tick is still one second
        assert!(matches!(
            session.timer_tick(round),
            Some(GameEvent::TimerTick { .. })
        ));
        assert!(session.timer_tick(old_round).is_none());
        assert_eq!(session.timer().elapsed_secs(), 1);
    }

    #[test]
    fn test_stale_unflip_dropped_after_reset() {
        let mut session = fixed_session();
        let old_round = session.round();

        session.select_card(id(0));
        session.select_card(id(2)); // mismatch, lock pending
        assert!(session.is_locked());

        // Reset supersedes the pending unflip
        let round = session.begin_round(Difficulty::Easy);
        let mut faces = Vec::new();
        for name in ["x", "x", "y", "y", "z", "z"] {
            faces.push(CardFace::new(name, "mem://x"));
        }
        session.install_board(round, faces).unwrap();
        session.start().unwrap();
        session.select_card(id(0));

        // The old round's continuation fires late: dropped silently
        assert!(session.resolve_unflip(old_round).is_empty());
        assert!(
            session.board().unwrap().card(id(0)).unwrap().face_up,
            "stale unflip must not touch the new board"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_lock_window_is_1000ms() {
        let mut session = fixed_session();
        let round = session.round();

        session.select_card(id(0));
        session.select_card(id(2));
        assert!(session.is_locked());

        // Exactly the delay later the cards are down and the lock is gone
        let events = session.unflip_after_delay(round).await;
        assert_eq!(
            events,
            vec![GameEvent::CardsUnflipped {
                first: id(0),
                second: id(2)
            }]
        );
        assert!(!session.is_locked());
        assert!(!session.board().unwrap().card(id(0)).unwrap().face_up);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deal_via_provider() {
        let provider = RandomDeckProvider::new(MemoryCatalog::sample(), 42);
        let mut session = GameSession::new(Difficulty::Easy);

        let event = session.deal(Difficulty::Medium, &provider).await.unwrap();
        assert_eq!(
            event,
            GameEvent::BoardDealt {
                rows: 3,
                cols: 4,
                cards: 12
            }
        );
        session.start().unwrap();
        assert_eq!(session.stats().pairs_left, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_deal_leaves_no_board() {
        let provider = RandomDeckProvider::new(MemoryCatalog::new(Vec::new()), 42);
        let mut session = GameSession::new(Difficulty::Easy);

        let err = session.deal(Difficulty::Easy, &provider).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Fetch(DataSourceError::PoolTooSmall { .. })
        ));
        assert!(session.board().is_none());
        assert!(matches!(session.start(), Err(SessionError::NoBoard)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_deal_keeps_prior_board() {
        let mut session = fixed_session();
        let prior_round = session.round();

        let down = RandomDeckProvider::new(MemoryCatalog::new(Vec::new()), 42);
        assert!(session.deal(Difficulty::Medium, &down).await.is_err());

        // Prior round is still live and playable
        assert_eq!(session.round(), prior_round);
        assert_eq!(session.board().unwrap().len(), 6);
        assert!(!session.select_card(id(0)).is_empty());
    }
}
