//! Turn scheduler: initiative, the per-unit turn window, and victory checks
//!
//! Each round: initiative -> (start turn -> move/act -> end turn) per unit -> round end
//!
//! The scheduler is the only entry point that mutates battle state. Commands
//! are checked in full before anything changes; a rejected command leaves
//! the battle exactly as it was.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::battle::ai::plan_turn;
use crate::battle::battle_map::BattleMap;
use crate::battle::battlefield::Battlefield;
use crate::battle::constants::{INITIATIVE_BASE, INITIATIVE_JITTER, PILOTING_PIVOT};
use crate::battle::events::{BattleEvent, EventSink};
use crate::battle::hex::{HexCoord, HexDirection};
use crate::battle::movement::{plan_movement, reachable_hexes};
use crate::battle::resolution::resolve_attack;
use crate::battle::roster::{MissionParams, Roster, UnitFactory, UnitTemplate};
use crate::battle::units::{CombatUnit, Controller, HeatCheck, Side, WeightClass};
use crate::combat::body_zone::BodyLocation;
use crate::combat::weapons::WeaponKind;
use crate::core::config::BattleConfig;
use crate::core::error::{CommandError, GridError, InvariantViolation, SetupError};
use crate::core::rng::RandomSource;
use crate::core::types::{Round, UnitId};

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Deployment, // Units placed, no round yet
    Active,   // Battle in progress
    Finished, // Battle over
}

/// Battle outcome, from the player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    #[default]
    Undecided,
    Victory,
    Defeat,
    Aborted,
}

/// Post-battle state of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub name: String,
    pub side: Side,
    pub weight_class: WeightClass,
    pub destroyed: bool,
    pub health: u32,
    pub max_health: u32,
    pub heat: u32,
    pub criticals: Vec<BodyLocation>,
}

impl UnitSummary {
    fn of(unit: &CombatUnit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            side: unit.side,
            weight_class: unit.weight_class,
            destroyed: unit.is_destroyed(),
            health: unit.health(),
            max_health: unit.max_health(),
            heat: unit.heat,
            criticals: unit.criticals.iter().map(|c| c.location).collect(),
        }
    }
}

/// Results handed back to company management
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rounds: Round,
    pub units: Vec<UnitSummary>,
    /// Destroyed player units
    pub casualties: Vec<UnitId>,
    /// Destroyed hostile units
    pub salvage: Vec<UnitId>,
}

/// Initiative score: base + piloting bonus + jitter
pub fn initiative_score(unit: &CombatUnit, rng: &mut dyn RandomSource) -> i32 {
    let piloting_bonus = unit
        .piloting()
        .map_or(0, |skill| PILOTING_PIVOT - skill as i32);
    INITIATIVE_BASE + piloting_bonus + rng.roll_range(-INITIATIVE_JITTER, INITIATIVE_JITTER)
}

/// Turn order for the living units, highest score first
///
/// Scores are rolled in the given order; equal scores keep that order.
pub fn initiative_order<'a>(
    units: impl IntoIterator<Item = &'a CombatUnit>,
    rng: &mut dyn RandomSource,
) -> Vec<UnitId> {
    let mut scored: Vec<(UnitId, i32)> = units
        .into_iter()
        .filter(|u| !u.is_destroyed())
        .map(|u| (u.id, initiative_score(u, rng)))
        .collect();
    scored.sort_by_key(|&(_, score)| Reverse(score));
    scored.into_iter().map(|(id, _)| id).collect()
}

/// Drives one battle from deployment to its outcome
pub struct TurnScheduler<S: EventSink, R: RandomSource> {
    config: BattleConfig,
    field: Battlefield,
    sink: S,
    rng: R,
    phase: BattlePhase,
    outcome: BattleOutcome,
    round: Round,
    order: Vec<UnitId>,
    cursor: usize,
    active: Option<UnitId>,
    // Bumped every time a turn opens
    turn_serial: u64,
    abort_requested: bool,
    // Last round the autopilot may open
    round_limit: Option<Round>,
    // Invariant faults panic instead of being clamped
    strict_invariants: bool,
}

impl<S: EventSink, R: RandomSource> TurnScheduler<S, R> {
    /// Build a battle: generate the map, roll the opposing force, deploy both sides.
    ///
    /// Every template is validated before any unit is placed.
    pub fn new(
        config: BattleConfig,
        roster: &Roster,
        mission: &MissionParams,
        factory: &mut impl UnitFactory,
        sink: S,
        mut rng: R,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        roster.validate()?;

        let map = BattleMap::generate(
            config.grid.width,
            config.grid.height,
            &config.grid.terrain,
            &mut rng,
        );

        let hostiles = factory.opposing_force(mission, &mut rng);
        if hostiles.is_empty() {
            return Err(SetupError::NoOpposition);
        }
        hostiles.iter().try_for_each(|t| t.validate())?;

        let mut field = Battlefield::new(map);
        let mut next_id = 1;
        deploy_side(&mut field, &config, Side::Attacker, &roster.units, &mut next_id)?;
        deploy_side(&mut field, &config, Side::Defender, &hostiles, &mut next_id)?;

        tracing::info!(
            "Battle deployed on {}x{} map: {} player units vs {} hostiles",
            config.grid.width,
            config.grid.height,
            roster.units.len(),
            hostiles.len()
        );

        Ok(Self::assemble(config, field, sink, rng))
    }

    /// Wrap an already-deployed battlefield. Both sides must have units.
    pub fn from_battlefield(
        config: BattleConfig,
        field: Battlefield,
        sink: S,
        rng: R,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        if field.side_eliminated(Side::Attacker) {
            return Err(SetupError::EmptyRoster);
        }
        if field.side_eliminated(Side::Defender) {
            return Err(SetupError::NoOpposition);
        }
        Ok(Self::assemble(config, field, sink, rng))
    }

    fn assemble(config: BattleConfig, field: Battlefield, sink: S, rng: R) -> Self {
        Self {
            config,
            field,
            sink,
            rng,
            phase: BattlePhase::Deployment,
            outcome: BattleOutcome::Undecided,
            round: 0,
            order: Vec::new(),
            cursor: 0,
            active: None,
            turn_serial: 0,
            abort_requested: false,
            round_limit: None,
            strict_invariants: cfg!(debug_assertions),
        }
    }

    // ---- Queries ----

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> BattleOutcome {
        self.outcome
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    /// This round's turn order
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn unit(&self, id: UnitId) -> Option<&CombatUnit> {
        self.field.unit(id)
    }

    /// The unit whose turn is open
    pub fn active_unit(&self) -> Option<&CombatUnit> {
        self.active.and_then(|id| self.field.unit(id))
    }

    /// Legal destinations for a unit right now
    pub fn reachable_for(&self, id: UnitId) -> BTreeSet<HexCoord> {
        self.field
            .unit(id)
            .map(|unit| reachable_hexes(&self.field.map, unit))
            .unwrap_or_default()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn report(&self) -> BattleReport {
        let destroyed_on = |side: Side| {
            self.field
                .units()
                .iter()
                .filter(|u| u.side == side && u.is_destroyed())
                .map(|u| u.id)
                .collect()
        };

        BattleReport {
            outcome: self.outcome,
            rounds: self.round,
            units: self.field.units().iter().map(UnitSummary::of).collect(),
            casualties: destroyed_on(Side::Attacker),
            salvage: destroyed_on(Side::Defender),
        }
    }

    // ---- Lifecycle ----

    /// Roll the first initiative and open the first turn
    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.phase != BattlePhase::Deployment {
            return Err(CommandError::BattleNotActive);
        }
        self.phase = BattlePhase::Active;
        self.begin_round();
        self.advance();
        Ok(())
    }

    /// Stop scheduling after the round in progress completes
    pub fn request_abort(&mut self) {
        tracing::info!("Abort requested during round {}", self.round);
        self.abort_requested = true;
    }

    fn begin_round(&mut self) {
        self.round += 1;
        self.field.clear_round_movement();
        self.order = initiative_order(self.field.units(), &mut self.rng);
        self.cursor = 0;

        tracing::info!("Round {} begins with {} units", self.round, self.order.len());
        self.sink.emit(BattleEvent::RoundStarted {
            round: self.round,
            order: self.order.clone(),
        });
    }

    /// Close the round. Returns false when no further round was opened.
    fn end_round(&mut self) -> bool {
        self.sink.emit(BattleEvent::RoundEnded { round: self.round });

        if self.abort_requested {
            self.phase = BattlePhase::Finished;
            self.outcome = BattleOutcome::Aborted;
            tracing::info!("Battle aborted after round {}", self.round);
            self.sink.emit(BattleEvent::BattleAborted { round: self.round });
            return false;
        }

        if self.round_limit.is_some_and(|limit| self.round >= limit) {
            tracing::info!("Round limit reached after round {}", self.round);
            return false;
        }

        self.begin_round();
        true
    }

    /// Open the next turn that can be taken, closing turns that cannot
    fn advance(&mut self) {
        while self.phase == BattlePhase::Active && self.active.is_none() {
            let Some(&id) = self.order.get(self.cursor) else {
                if !self.end_round() {
                    break;
                }
                continue;
            };
            self.cursor += 1;

            let dissipation = self.config.heat.dissipation;
            let Some(unit) = self.field.unit_mut(id) else {
                continue;
            };
            // Destroyed mid-round; dropped from the order next round
            if unit.is_destroyed() {
                continue;
            }

            unit.start_turn(dissipation);
            let exhausted = unit.turn_exhausted();
            self.active = Some(id);
            self.turn_serial += 1;
            tracing::debug!("Round {}: turn opens for {}", self.round, id);
            self.sink.emit(BattleEvent::TurnStarted {
                unit: id,
                round: self.round,
            });

            // Shut-down units have nothing to spend
            if exhausted {
                self.close_turn(id);
            }
        }
    }

    /// End-of-turn heat check, then release the turn
    fn close_turn(&mut self, id: UnitId) {
        let chance = self.config.heat.shutdown_chance;
        if let Some(unit) = self.field.unit_mut(id) {
            if !unit.is_destroyed() {
                match unit.check_heat(chance, &mut self.rng) {
                    HeatCheck::ShutDown => {
                        tracing::debug!("{} shuts down at heat {}", id, unit.heat);
                        self.sink.emit(BattleEvent::UnitShutdown {
                            unit: id,
                            heat: unit.heat,
                        });
                    }
                    HeatCheck::Restarted => {
                        self.sink.emit(BattleEvent::UnitRestarted { unit: id });
                    }
                    HeatCheck::Nominal | HeatCheck::Held => {}
                }
            }
        }

        tracing::debug!("Round {}: turn closes for {}", self.round, id);
        self.sink.emit(BattleEvent::TurnEnded {
            unit: id,
            round: self.round,
        });
        self.active = None;
    }

    /// Close the turn if both budgets are spent, then move on
    fn settle_turn(&mut self, id: UnitId) {
        if self.phase != BattlePhase::Active || self.active != Some(id) {
            return;
        }
        if self.field.unit(id).map_or(true, |u| u.turn_exhausted()) {
            self.close_turn(id);
            self.advance();
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        self.phase = BattlePhase::Finished;
        self.outcome = outcome;
        self.active = None;
        tracing::info!("Battle ended: {:?} in round {}", outcome, self.round);
        self.sink.emit(BattleEvent::CombatEnded {
            victory: outcome == BattleOutcome::Victory,
            rounds: self.round,
        });
    }

    fn check_victory(&mut self) {
        if self.phase != BattlePhase::Active {
            return;
        }
        if self.field.side_eliminated(Side::Attacker) {
            self.finish(BattleOutcome::Defeat);
        } else if self.field.side_eliminated(Side::Defender) {
            self.finish(BattleOutcome::Victory);
        }
    }

    fn on_destroyed(&mut self, id: UnitId) -> Result<(), GridError> {
        self.field.remove_wreck(id)?;
        tracing::info!("{} destroyed in round {}", id, self.round);
        self.sink.emit(BattleEvent::UnitDestroyed { unit: id });
        self.check_victory();
        Ok(())
    }

    /// Audit a unit after mutation. Debug builds stop here; release builds
    /// clamp, log, and surface the fault.
    fn guard_invariants(&mut self, id: UnitId) -> Result<(), GridError> {
        let Some(unit) = self.field.unit_mut(id) else {
            return Ok(());
        };
        let Err(fault) = unit.audit() else {
            return Ok(());
        };

        if self.strict_invariants {
            panic!("{fault}");
        }
        self.recover_from_fault(fault)
    }

    /// Clamp the faulty unit, log, and surface the fault on the event stream
    fn recover_from_fault(&mut self, fault: InvariantViolation) -> Result<(), GridError> {
        tracing::error!("{}", fault);
        let id = fault.unit;
        let Some(unit) = self.field.unit_mut(id) else {
            return Ok(());
        };
        let was_destroyed = unit.is_destroyed();
        unit.clamp_to_invariants();
        let now_destroyed = unit.is_destroyed();
        self.sink.emit(BattleEvent::InvariantViolated {
            unit: id,
            detail: fault.detail,
        });
        if now_destroyed && !was_destroyed {
            self.on_destroyed(id)?;
        }
        Ok(())
    }

    // ---- Commands ----

    /// The active unit, or why `id` may not act
    fn ensure_turn(&self, id: UnitId) -> Result<&CombatUnit, CommandError> {
        if self.phase != BattlePhase::Active {
            return Err(CommandError::BattleNotActive);
        }
        let active = self.active.ok_or(CommandError::NoActiveTurn)?;
        if active != id {
            return Err(CommandError::NotYourTurn {
                requested: id,
                active,
            });
        }
        let unit = self
            .field
            .unit(id)
            .ok_or(CommandError::Grid(GridError::UnknownUnit(id)))?;
        if unit.is_shutdown() {
            return Err(CommandError::UnitShutdown(id));
        }
        Ok(unit)
    }

    /// Move the active unit along its cheapest path to `to`
    pub fn move_unit(&mut self, id: UnitId, to: HexCoord) -> Result<(), CommandError> {
        let unit = self.ensure_turn(id)?;
        if unit.has_moved {
            return Err(CommandError::AlreadyMoved(id));
        }

        let plan = plan_movement(&self.field.map, unit);
        let Some(cost) = plan.cost_to(to) else {
            tracing::warn!("Rejected move of {} to {}: unreachable", id, to);
            return Err(CommandError::Unreachable { unit: id, to });
        };
        let path = plan.path_to(to).unwrap_or_default();
        let facing = match path.as_slice() {
            [] => None,
            [only] => HexDirection::toward(plan.origin, *only),
            [.., before, last] => HexDirection::toward(*before, *last),
        };

        let from = self.field.relocate(id, to)?;
        let movement_heat = self.config.heat.movement_heat;
        if let Some(unit) = self.field.unit_mut(id) {
            unit.movement_points = unit.movement_points.saturating_sub(cost);
            unit.has_moved = true;
            if let Some(facing) = facing {
                unit.facing = facing;
            }
            if cost > 0 {
                unit.add_heat(movement_heat);
            }
        }

        tracing::debug!("{} moves {} -> {} for {} MP", id, from, to, cost);
        self.sink.emit(BattleEvent::UnitMoved {
            unit: id,
            from,
            to,
            cost,
        });
        self.guard_invariants(id)?;
        self.settle_turn(id);
        Ok(())
    }

    /// Fire `weapon` from the active unit at `target`
    pub fn attack(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        weapon: WeaponKind,
    ) -> Result<(), CommandError> {
        let unit = self.ensure_turn(attacker)?;
        if unit.has_acted {
            return Err(CommandError::AlreadyActed(attacker));
        }
        let side = unit.side;

        let invalid = |reason: &str| {
            tracing::warn!("Rejected attack by {} on {}: {}", attacker, target, reason);
            CommandError::InvalidTarget {
                target,
                reason: reason.to_string(),
            }
        };
        if target == attacker {
            return Err(invalid("a unit cannot target itself"));
        }
        let victim = self.field.unit(target).ok_or_else(|| invalid("unknown unit"))?;
        if victim.side == side {
            return Err(invalid("target is friendly"));
        }
        if victim.is_destroyed() {
            return Err(invalid("target is already destroyed"));
        }

        let (shooter, victim) = self
            .field
            .pair_mut(attacker, target)
            .ok_or(GridError::UnknownUnit(target))?;
        let outcome = resolve_attack(shooter, victim, weapon, &mut self.rng);

        self.sink.emit(BattleEvent::WeaponFired {
            attacker,
            target,
            weapon,
            hit: outcome.hit,
        });
        if let Some(report) = outcome.report {
            self.sink.emit(BattleEvent::DamageDealt {
                target,
                amount: outcome.damage,
                location: report.location,
            });
            if let Some(critical) = report.critical {
                self.sink.emit(BattleEvent::CriticalHit {
                    unit: target,
                    location: critical.location,
                });
            }
            if report.destroyed {
                self.on_destroyed(target)?;
            }
        }
        self.guard_invariants(target)?;
        self.guard_invariants(attacker)?;

        self.settle_turn(attacker);
        Ok(())
    }

    /// Close the active unit's turn early
    pub fn end_turn(&mut self, id: UnitId) -> Result<(), CommandError> {
        if self.phase != BattlePhase::Active {
            return Err(CommandError::BattleNotActive);
        }
        let active = self.active.ok_or(CommandError::NoActiveTurn)?;
        if active != id {
            return Err(CommandError::NotYourTurn {
                requested: id,
                active,
            });
        }
        self.close_turn(id);
        self.advance();
        Ok(())
    }

    /// Let the AI take the active unit's whole turn
    pub fn run_ai_turn(&mut self) -> Result<(), CommandError> {
        if self.phase != BattlePhase::Active {
            return Err(CommandError::BattleNotActive);
        }
        let id = self.active.ok_or(CommandError::NoActiveTurn)?;
        let serial = self.turn_serial;

        let plan = {
            let unit = self
                .field
                .unit(id)
                .ok_or(CommandError::Grid(GridError::UnknownUnit(id)))?;
            let enemies: Vec<&CombatUnit> = self.field.living(unit.side.opponent()).collect();
            let reachable = reachable_hexes(&self.field.map, unit);
            plan_turn(unit, &enemies, &reachable)
        };

        if let Some(destination) = plan.destination {
            self.move_unit(id, destination)?;
        }
        if let Some(target) = plan.target {
            let weapon = self.field.unit(id).map(|u| u.weapon);
            if let (true, Some(weapon)) = (self.turn_is_open(id, serial), weapon) {
                self.attack(id, target, weapon)?;
            }
        }
        if self.turn_is_open(id, serial) {
            self.end_turn(id)?;
        }
        Ok(())
    }

    /// Same turn still open; a new round may hand the same unit a fresh turn
    fn turn_is_open(&self, id: UnitId, serial: u64) -> bool {
        self.active == Some(id) && self.turn_serial == serial
    }

    /// Run the active unit's turn if the AI controls it.
    /// Returns false when a player command is awaited.
    pub fn step(&mut self) -> Result<bool, CommandError> {
        match self.active_unit().map(|u| u.controller) {
            Some(Controller::Ai) => {
                self.run_ai_turn()?;
                Ok(true)
            }
            Some(Controller::Player) => Ok(false),
            None => Err(CommandError::NoActiveTurn),
        }
    }

    /// Drive every unit with the AI until the battle ends or round `max_rounds`
    /// completes.
    ///
    /// A battle stopped at its limit holds at the round boundary with no turn
    /// open; a later call with a higher limit picks it up from there.
    pub fn run_autopilot(&mut self, max_rounds: Round) -> Result<BattleOutcome, CommandError> {
        if self.round >= max_rounds && self.active.is_none() {
            return Ok(self.outcome);
        }
        self.round_limit = Some(max_rounds);
        let result = self.drive_to_limit();
        self.round_limit = None;
        result.map(|()| self.outcome)
    }

    fn drive_to_limit(&mut self) -> Result<(), CommandError> {
        if self.phase == BattlePhase::Deployment {
            self.start()?;
        } else if self.phase == BattlePhase::Active && self.active.is_none() {
            self.begin_round();
            self.advance();
        }
        while self.phase == BattlePhase::Active && self.active.is_some() {
            self.run_ai_turn()?;
        }
        Ok(())
    }
}

/// Place one side's units row-major into its edge columns
fn deploy_side(
    field: &mut Battlefield,
    config: &BattleConfig,
    side: Side,
    templates: &[UnitTemplate],
    next_id: &mut u32,
) -> Result<(), SetupError> {
    let width = config.grid.width as i32;
    let depth = config.deployment_depth as i32;
    let columns = match side {
        Side::Attacker => 0..depth,
        Side::Defender => width - depth..width,
    };
    let facing = match side {
        Side::Attacker => HexDirection::SouthEast,
        Side::Defender => HexDirection::NorthWest,
    };

    let mut zone = (0..config.grid.height as i32)
        .flat_map(|row| columns.clone().map(move |col| HexCoord::new(col, row)));

    for template in templates {
        let hex = zone
            .find(|hex| !field.map.is_occupied(*hex))
            .ok_or(SetupError::DeploymentFull(side.label()))?;
        let mut unit = template.instantiate(UnitId(*next_id), side)?.at(hex);
        unit.facing = facing;
        unit.heat_threshold = config.heat.shutdown_threshold;
        field.deploy(unit)?;
        *next_id += 1;
    }
    Ok(())
}
