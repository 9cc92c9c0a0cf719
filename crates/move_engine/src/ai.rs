//! Move scoring for computer-controlled combatants.
//!
//! Scores come from a dry run of each move (so failed conditions and
//! immunities score as failures) plus the attributes' benefit scores.

use tracing::trace;

use crate::battle::Battle;
use crate::moves::MoveId;
use crate::pipeline::{accuracy, damage, simulate_move, MoveContext, MoveOutcome};
use crate::state::{CombatantId, MoveResult};
use crate::turn::TurnCommand;

/// Score of a move that would fail outright.
pub const FAIL_SCORE: i32 = -100;

/// Extra score for a hit expected to knock the target out.
const KO_BONUS: i32 = 50;

/// Score `move_id` used by `user` against `target`. Higher is better.
pub fn score_move(battle: &mut Battle, user: CombatantId, move_id: MoveId, target: CombatantId) -> i32 {
    let mv = move_id.get();
    let requested = battle.combatant(target).battler_index();
    let outcome = simulate_move(battle, user, mv, requested);
    if failed(&outcome) {
        return FAIL_SCORE;
    }

    let is_opponent = battle.combatant(target).side != battle.combatant(user).side;
    let mut score = 0;

    if !mv.is_status() && is_opponent {
        let defender = battle.combatant(target);
        let hp = u32::from(defender.hp.max(1));
        let multiple = outcome.targets.len() > 1;
        let estimate = damage::estimate_damage(battle, user, target, mv, multiple);
        score += (estimate.min(hp) * 100 / hp) as i32;
        if estimate >= hp {
            score += KO_BONUS;
        }
    }

    for attr in mv.attrs() {
        score += attr.user_benefit_score(battle, user, mv);
        let benefit = attr.target_benefit_score(battle, target, mv);
        score += if is_opponent { -benefit } else { benefit };
    }

    // Weight by the chance to connect
    let ctx = MoveContext::new(user, target, mv, mv.data.move_type);
    if let Some(chance) = accuracy::hit_chance(battle, &ctx) {
        score = (f64::from(score) * (chance / 100.0).min(1.0)) as i32;
    }

    trace!(?user, ?target, ?move_id, score, "move scored");
    score
}

fn failed(outcome: &MoveOutcome) -> bool {
    matches!(outcome.result, MoveResult::Fail | MoveResult::NoEffect)
        && outcome.targets.iter().all(|t| t.damage == 0)
}

/// Pick the best-scoring move and target for `user`. Passes when nothing is usable.
pub fn choose_command(battle: &mut Battle, user: CombatantId) -> TurnCommand {
    if !battle.combatant(user).is_active() {
        return TurnCommand::Pass { user };
    }
    let slots: Vec<(usize, MoveId)> = battle
        .combatant(user)
        .moveset
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.pp > 0)
        .map(|(index, slot)| (index, slot.id))
        .collect();
    let opponents = battle.opponents_of(user);

    let mut best: Option<(i32, TurnCommand)> = None;
    for (move_index, move_id) in slots {
        let candidates: Vec<CombatantId> = if move_id.get().is_status() && opponents.is_empty() {
            vec![user]
        } else if opponents.is_empty() {
            continue;
        } else {
            opponents.to_vec()
        };
        for target in candidates {
            let score = score_move(battle, user, move_id, target);
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                let command = TurnCommand::UseMove {
                    user,
                    move_index,
                    target: battle.combatant(target).battler_index(),
                };
                best = Some((score, command));
            }
        }
    }

    match best {
        Some((score, command)) if score > FAIL_SCORE => command,
        _ => TurnCommand::Pass { user },
    }
}
