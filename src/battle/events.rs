//! Battle event stream
//!
//! Events carry ids and plain values only. Consumers never see unit records.

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexCoord;
use crate::combat::body_zone::BodyLocation;
use crate::combat::weapons::WeaponKind;
use crate::core::types::{Round, UnitId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    RoundStarted { round: Round, order: Vec<UnitId> },
    RoundEnded { round: Round },
    TurnStarted { unit: UnitId, round: Round },
    TurnEnded { unit: UnitId, round: Round },
    UnitMoved {
        unit: UnitId,
        from: HexCoord,
        to: HexCoord,
        cost: u32,
    },
    WeaponFired {
        attacker: UnitId,
        target: UnitId,
        weapon: WeaponKind,
        hit: bool,
    },
    DamageDealt {
        target: UnitId,
        amount: u32,
        location: BodyLocation,
    },
    CriticalHit { unit: UnitId, location: BodyLocation },
    UnitShutdown { unit: UnitId, heat: u32 },
    UnitRestarted { unit: UnitId },
    UnitDestroyed { unit: UnitId },
    CombatEnded { victory: bool, rounds: Round },
    BattleAborted { round: Round },
    InvariantViolated { unit: UnitId, detail: String },
}

impl BattleEvent {
    /// One-line description for logs and text output
    pub fn describe(&self) -> String {
        match self {
            BattleEvent::RoundStarted { round, order } => {
                let order: Vec<String> = order.iter().map(|id| id.to_string()).collect();
                format!("Round {} begins: {}", round, order.join(", "))
            }
            BattleEvent::RoundEnded { round } => format!("Round {} ends", round),
            BattleEvent::TurnStarted { unit, round } => {
                format!("{} starts its turn (round {})", unit, round)
            }
            BattleEvent::TurnEnded { unit, .. } => format!("{} ends its turn", unit),
            BattleEvent::UnitMoved {
                unit,
                from,
                to,
                cost,
            } => format!("{} moves {} -> {} ({} MP)", unit, from, to, cost),
            BattleEvent::WeaponFired {
                attacker,
                target,
                weapon,
                hit,
            } => format!(
                "{} fires {} at {}: {}",
                attacker,
                weapon,
                target,
                if *hit { "hit" } else { "miss" }
            ),
            BattleEvent::DamageDealt {
                target,
                amount,
                location,
            } => format!("{} takes {} damage to {}", target, amount, location),
            BattleEvent::CriticalHit { unit, location } => {
                format!("{} suffers a critical hit to {}", unit, location)
            }
            BattleEvent::UnitShutdown { unit, heat } => {
                format!("{} shuts down at heat {}", unit, heat)
            }
            BattleEvent::UnitRestarted { unit } => format!("{} restarts", unit),
            BattleEvent::UnitDestroyed { unit } => format!("{} is destroyed", unit),
            BattleEvent::CombatEnded { victory, rounds } => format!(
                "Combat ended in {} after {} rounds",
                if *victory { "victory" } else { "defeat" },
                rounds
            ),
            BattleEvent::BattleAborted { round } => format!("Battle aborted after round {}", round),
            BattleEvent::InvariantViolated { unit, detail } => {
                format!("Invariant violated on {}: {}", unit, detail)
            }
        }
    }
}

/// Receiver for the battle event stream
pub trait EventSink {
    fn emit(&mut self, event: BattleEvent);
}

impl EventSink for Vec<BattleEvent> {
    fn emit(&mut self, event: BattleEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: BattleEvent) {
        (**self).emit(event);
    }
}

/// Ordered event record for one battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }
}

impl EventSink for BattleEventLog {
    fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }
}

/// Forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: BattleEvent) {
        match &event {
            BattleEvent::RoundStarted { .. }
            | BattleEvent::UnitDestroyed { .. }
            | BattleEvent::CombatEnded { .. }
            | BattleEvent::BattleAborted { .. } => tracing::info!("{}", event.describe()),
            BattleEvent::InvariantViolated { .. } => tracing::error!("{}", event.describe()),
            _ => tracing::debug!("{}", event.describe()),
        }
    }
}
