//! Pokepairs Demo
//!
//! Plays one scripted easy round against the in-memory catalog and logs
//! every event, standing in for a real presentation layer.

use std::collections::BTreeMap;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pokepairs::{
    CardId, Difficulty, GameEvent, GameSession, MemoryCatalog, RandomDeckProvider, SpeciesKey,
    VERSION,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Pokepairs v{}", VERSION);

    demo_round().await;
}

/// Demo function to play one round end to end.
async fn demo_round() {
    info!("=== Starting Demo Round ===");

    let session_seed = 12345u64;
    let provider = RandomDeckProvider::new(MemoryCatalog::sample(), session_seed);
    let mut session = GameSession::new(Difficulty::Easy);

    info!("Session seed: {}", session_seed);

    let dealt = session
        .deal(Difficulty::Easy, &provider)
        .await
        .expect("deck fetch failed");
    log_events(&[dealt]);

    session.start().expect("board was just dealt");
    let round = session.round();

    // Peek at the board to script the play. A real UI would not know the
    // faces; the demo plays a perfect game after one deliberate mistake.
    let mut pairs: BTreeMap<SpeciesKey, Vec<CardId>> = BTreeMap::new();
    for (id, card) in session.board().expect("board installed").iter() {
        pairs.entry(card.species().clone()).or_default().push(id);
    }
    let pairs: Vec<(CardId, CardId)> = pairs.into_values().map(|ids| (ids[0], ids[1])).collect();

    // One deliberate mismatch first, to show the lock window.
    let (first_a, _) = pairs[0];
    let (second_b, _) = pairs[1];
    log_events(&session.select_card(first_a));
    log_events(&session.select_card(second_b));
    log_events(&session.unflip_after_delay(round).await);

    // Now clear the board pair by pair.
    for (a, b) in pairs {
        log_events(&session.select_card(a));
        log_events(&session.select_card(b));
    }

    info!("=== Round Results ===");
    let stats = session.stats();
    info!("Matches: {}", stats.matches);
    info!("Clicks: {}", stats.clicks);
    info!("Pairs left: {}", stats.pairs_left);
    info!("Timer: {}", session.timer().display());
}

/// Log events the way a presentation layer would render them.
fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::BoardDealt { rows, cols, cards } => {
                info!("Dealt {} cards in a {}x{} grid", cards, rows, cols);
            }
            GameEvent::CardFlipped { card } => {
                info!("Card {} flipped face-up", card);
            }
            GameEvent::PairMatched {
                species,
                pairs_left,
                ..
            } => {
                info!("Matched a pair of {} ({} pairs left)", species, pairs_left);
            }
            GameEvent::MismatchLocked { first, second } => {
                info!("Cards {} and {} mismatch, locking", first, second);
            }
            GameEvent::CardsUnflipped { first, second } => {
                info!("Cards {} and {} flipped back down", first, second);
            }
            GameEvent::GameComplete { matches, clicks } => {
                info!("Round complete! {} matches in {} clicks", matches, clicks);
            }
            GameEvent::TimerTick { display: time } => {
                info!("Timer: {}", time);
            }
            GameEvent::TimeExpired => {
                info!("Time expired!");
            }
        }
    }
}
