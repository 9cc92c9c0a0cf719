//! The turn step queue.
//!
//! A turn is a queue of [`Phase`]s. Each [`TurnQueue::step`] call runs one
//! phase, or one stage of the move currently resolving, so a presentation
//! layer can animate between steps. Brackets are ordered only when reached,
//! which lets speed changes from earlier brackets take effect.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use tracing::{debug, trace};

use crate::battle::Battle;
use crate::error::Result;
use crate::events::BattleEvent;
use crate::pipeline::{MoveOutcome, MoveResolution};
use crate::state::CombatantId;
use crate::turn::{end_turn, order_bracket, switch_in, TurnCommand};

#[derive(Debug)]
pub enum Phase {
    TurnStart,
    /// Order and expand the commands queued at this priority
    Bracket(i8),
    Command(TurnCommand),
    Move(MoveResolution<'static>),
    TurnEnd,
}

/// What happened during one turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: u16,
    /// Actors in the order they acted
    pub order: Vec<CombatantId>,
    pub outcomes: Vec<MoveOutcome>,
}

#[derive(Debug)]
pub struct TurnQueue {
    phases: VecDeque<Phase>,
    brackets: BTreeMap<i8, Vec<TurnCommand>>,
    report: TurnReport,
}

impl TurnQueue {
    /// Validate and bucket `commands` by priority.
    pub fn new(battle: &Battle, commands: &[TurnCommand]) -> Result<Self> {
        let mut brackets: BTreeMap<i8, Vec<TurnCommand>> = BTreeMap::new();
        for command in commands {
            command.validate(battle)?;
            brackets.entry(command.priority(battle)).or_default().push(*command);
        }

        let mut phases = VecDeque::with_capacity(brackets.len() + 2);
        phases.push_back(Phase::TurnStart);
        phases.extend(brackets.keys().rev().map(|&priority| Phase::Bracket(priority)));
        phases.push_back(Phase::TurnEnd);

        Ok(Self { phases, brackets, report: TurnReport::default() })
    }

    /// Phase the next `step` will run.
    pub fn current(&self) -> Option<&Phase> {
        self.phases.front()
    }

    pub fn is_finished(&self) -> bool {
        self.phases.is_empty()
    }

    /// Run one step. Returns false once the turn is over.
    pub fn step(&mut self, battle: &mut Battle) -> bool {
        let Some(phase) = self.phases.pop_front() else {
            return false;
        };
        match phase {
            Phase::TurnStart => {
                battle.turn += 1;
                self.report.turn = battle.turn;
                battle.emit(BattleEvent::TurnStarted { turn: battle.turn }, false);
                debug!(turn = battle.turn, "turn started");
            }
            Phase::Bracket(priority) => {
                let commands = self.brackets.remove(&priority).unwrap_or_default();
                let ordered = order_bracket(battle, &commands);
                trace!(priority, count = ordered.len(), "bracket expanded");
                for command in ordered.into_iter().rev() {
                    self.phases.push_front(Phase::Command(command));
                }
            }
            Phase::Command(command) => self.start_command(battle, command),
            Phase::Move(mut resolution) => {
                resolution.step(battle);
                if resolution.state().is_terminal() {
                    self.report.outcomes.push(resolution.outcome());
                } else {
                    self.phases.push_front(Phase::Move(resolution));
                }
            }
            Phase::TurnEnd => end_turn(battle),
        }
        true
    }

    fn start_command(&mut self, battle: &mut Battle, command: TurnCommand) {
        let actor = command.actor();
        // Fainted or switched out earlier this turn
        if !battle.combatant(actor).is_active() {
            trace!(?actor, "actor no longer active; command dropped");
            return;
        }
        self.report.order.push(actor);
        match command {
            TurnCommand::UseMove { user, move_index, target } => {
                let Some(slot) = battle.combatant(user).moveset.get(move_index) else {
                    return;
                };
                let mv = slot.id.get();
                self.phases
                    .push_front(Phase::Move(MoveResolution::new(user, mv, Some(move_index), target, false)));
            }
            TurnCommand::Switch { out, incoming } => {
                if let Err(error) = switch_in(battle, out, incoming) {
                    debug!(?out, ?incoming, %error, "switch skipped");
                }
            }
            TurnCommand::Pass { user } => {
                battle.combatant_mut(user).turn_data.acted = true;
            }
        }
    }

    /// Step until the turn is over.
    pub fn run(mut self, battle: &mut Battle) -> TurnReport {
        while self.step(battle) {}
        self.report
    }

    pub fn report(&self) -> &TurnReport {
        &self.report
    }
}
