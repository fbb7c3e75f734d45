//! Headless match runner
//!
//! Plays one bot-vs-bot battle on a fixed tokio interval. The delta fed to
//! the simulation is measured on the caller side, the way a render loop
//! would measure it.

pub mod bot;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Roster;
use crate::config::Config;
use crate::game::{BattleEvent, GamePhase, GameSession, PlayerSlot, SessionError};
use crate::game::snapshot::SnapshotCadence;
use crate::input::InputFrame;
use crate::util::time::tick_delta_ms;

use self::bot::Bot;

/// Why the runner stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Victory,
    TickLimit,
    Shutdown,
}

/// Outcome of one headless battle
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub battle_id: Uuid,
    pub ticks: u64,
    pub winner: Option<String>,
    pub stop: StopReason,
}

/// Characters for both slots: configured names, else the first two roster
/// entries (a mirror match for a one-character roster)
fn pick_characters(config: &Config, roster: &Roster) -> Result<(String, String), SessionError> {
    let mut names = roster.names();
    let first = names.next().map(str::to_string);
    let second = names.next().map(str::to_string).or_else(|| first.clone());

    let one = config.player1.clone().or(first);
    let two = config.player2.clone().or(second);
    match (one, two) {
        (Some(one), Some(two)) => Ok((one, two)),
        _ => Err(SessionError::SelectionIncomplete),
    }
}

/// Run one battle until it is decided, `max_ticks` is reached or `shutdown`
/// resolves
pub async fn run_match(
    config: &Config,
    roster: Roster,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary, SessionError> {
    let (one, two) = pick_characters(config, &roster)?;
    let mut session = GameSession::new(roster, config.arena());
    session.toggle_selection(PlayerSlot::One, &one)?;
    session.toggle_selection(PlayerSlot::Two, &two)?;
    let battle_id = session.start_battle()?.id();

    let mut bots = [
        Bot::new(PlayerSlot::One, config.demo_seed),
        Bot::new(PlayerSlot::Two, config.demo_seed.wrapping_add(1)),
    ];
    let mut cadence = SnapshotCadence::new(config.snapshot_every);

    let tick_duration = Duration::from_secs_f32(tick_delta_ms(config.tick_rate) / 1000.0);
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        battle_id = %battle_id,
        player1 = %one,
        player2 = %two,
        tick_rate = config.tick_rate,
        "Headless battle running"
    );

    tokio::pin!(shutdown);
    let mut last_tick = Instant::now();
    let mut ticks = 0u64;

    let stop = loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break StopReason::Shutdown,
            _ = tick_interval.tick() => {}
        }

        let now = Instant::now();
        let delta_ms = now.duration_since(last_tick).as_secs_f32() * 1000.0;
        last_tick = now;

        let Some(battle) = session.battle() else {
            break StopReason::Shutdown;
        };
        let input = InputFrame::new(bots[0].next_input(battle), bots[1].next_input(battle));
        let events = session.update(delta_ms, &input);
        ticks += 1;

        for event in &events {
            if matches!(event, BattleEvent::Hit { .. } | BattleEvent::KnockedDown { .. }) {
                cadence.force_next();
            }
            debug!(battle_id = %battle_id, tick = ticks, event = ?event, "Battle event");
        }

        if cadence.should_send() {
            if let Some(snapshot) = session.snapshot() {
                match serde_json::to_string(&snapshot) {
                    Ok(json) => debug!(battle_id = %battle_id, snapshot = %json, "Snapshot"),
                    Err(e) => {
                        warn!(battle_id = %battle_id, error = %e, "Failed to encode snapshot")
                    }
                }
            }
        }

        if matches!(session.phase(), GamePhase::Victory { .. }) {
            break StopReason::Victory;
        }
        if ticks >= config.max_ticks {
            break StopReason::TickLimit;
        }
    };

    let winner = match session.phase() {
        GamePhase::Victory { winner } => session
            .battle()
            .map(|battle| battle.fighter(winner).name().to_string()),
        _ => None,
    };

    info!(
        battle_id = %battle_id,
        ticks,
        winner = ?winner,
        stop = ?stop,
        "Headless battle finished"
    );

    Ok(RunSummary {
        battle_id,
        ticks,
        winner,
        stop,
    })
}
