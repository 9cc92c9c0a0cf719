//! Target resolution: abstract target spec plus live geometry to concrete slots.

use smallvec::SmallVec;
use tracing::trace;

use super::attrs::{apply_attrs_of_kind, AttrArgs, AttrKind};
use super::{Move, MoveTarget};
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::pipeline::{power, MoveContext};
use crate::state::{BattlerIndex, CombatantId};
use crate::tags::BattlerTagKind;

/// Concrete targets for one move use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    pub targets: SmallVec<[BattlerIndex; 4]>,
    /// More than one target was resolved (spread damage applies)
    pub multiple: bool,
}

impl ResolvedTargets {
    fn from_list(mut targets: SmallVec<[BattlerIndex; 4]>) -> Self {
        let mut seen = SmallVec::<[BattlerIndex; 4]>::new();
        targets.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });
        let multiple = targets.len() > 1;
        Self { targets, multiple }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Target spec after variable-target attributes have had their say.
pub fn effective_target(battle: &Battle, user: CombatantId, mv: &Move) -> MoveTarget {
    let mut target = mv.data.target;
    let ctx = MoveContext::new(user, user, mv, mv.data.move_type);
    apply_attrs_of_kind(AttrKind::VariableTarget, battle, &ctx, &mut AttrArgs::Target(&mut target));
    target
}

/// Resolve `mv`'s targets for `user`, honoring `requested` where the target kind allows a choice.
///
/// Fainted and empty slots are filtered and duplicates removed. A random
/// near enemy is drawn from the battle RNG here.
pub fn resolve_targets(
    battle: &mut Battle,
    user: CombatantId,
    mv: &Move,
    requested: Option<BattlerIndex>,
) -> ResolvedTargets {
    let spec = effective_target(battle, user, mv);
    let Some(user_index) = battle.combatant(user).battler_index() else {
        return ResolvedTargets::default();
    };
    let opponents = slots(battle, battle.opponents_of(user));
    let allies = slots(battle, battle.allies_of(user));
    let valid_request = requested.filter(|r| battle.occupant(*r).is_some());

    let list: SmallVec<[BattlerIndex; 4]> = match spec {
        MoveTarget::User | MoveTarget::UserSide | MoveTarget::BothSides => smallvec_of(user_index),
        MoveTarget::EnemySide => opponents.iter().copied().take(1).collect(),
        MoveTarget::NearOther | MoveTarget::Other => match valid_request {
            Some(r) if r != user_index => smallvec_of(r),
            _ => opponents.iter().copied().take(1).collect(),
        },
        MoveTarget::NearEnemy => match valid_request {
            Some(r) if opponents.contains(&r) => smallvec_of(r),
            _ => opponents.iter().copied().take(1).collect(),
        },
        MoveTarget::NearAlly => match valid_request {
            Some(r) if allies.contains(&r) => smallvec_of(r),
            _ => allies.iter().copied().take(1).collect(),
        },
        MoveTarget::UserOrNearAlly => match valid_request {
            Some(r) if allies.contains(&r) => smallvec_of(r),
            _ => smallvec_of(user_index),
        },
        MoveTarget::UserAndAllies => {
            let mut list = smallvec_of(user_index);
            list.extend(allies.iter().copied());
            list
        }
        MoveTarget::AllNearEnemies => opponents.clone(),
        MoveTarget::RandomNearEnemy => battle
            .rng
            .choose(&opponents)
            .copied()
            .into_iter()
            .collect(),
        MoveTarget::AllNearOthers | MoveTarget::AllOthers => {
            let mut list = allies.clone();
            list.extend(opponents.iter().copied());
            list.sort();
            list
        }
        MoveTarget::All => {
            let mut list = smallvec_of(user_index);
            list.extend(allies.iter().copied());
            list.extend(opponents.iter().copied());
            list.sort();
            list
        }
        MoveTarget::Attacker => {
            if battle.combatant(user).turn_data.last_attacker().is_some() {
                smallvec_of(BattlerIndex::Attacker)
            } else {
                SmallVec::new()
            }
        }
    };

    let mut resolved = ResolvedTargets::from_list(list);
    if !resolved.multiple {
        if let Some(first) = resolved.targets.first_mut() {
            if let Some(redirected) = redirect(battle, user, mv, *first) {
                trace!(?user, from = ?*first, to = ?redirected, "move redirected");
                *first = redirected;
            }
        }
    }
    resolved
}

/// Bind the `Attacker` sentinel to whoever most recently hit `user`.
pub fn bind_attacker(battle: &Battle, user: CombatantId) -> Option<CombatantId> {
    let source = battle.combatant(user).turn_data.last_attacker()?.source;
    battle.combatant(source).is_active().then_some(source)
}

/// Follow Me and redirecting abilities pull single-target moves aimed at their side.
fn redirect(
    battle: &Battle,
    user: CombatantId,
    mv: &Move,
    target: BattlerIndex,
) -> Option<BattlerIndex> {
    let target_id = battle.occupant(target)?;
    let target_side = battle.combatant(target_id).side;
    if target_side == battle.combatant(user).side {
        return None;
    }
    let candidates = battle.opponents_of(user);

    if let Some(&center) = candidates
        .iter()
        .find(|&&id| battle.combatant(id).tags.has(BattlerTagKind::CenterOfAttention))
    {
        return battle.combatant(center).battler_index();
    }

    let move_type = power::effective_move_type(battle, user, mv).0;
    candidates
        .iter()
        .find(|&&id| dispatch::redirects_type(battle.combatant(id).effective_ability(), move_type))
        .and_then(|&id| battle.combatant(id).battler_index())
}

fn slots(battle: &Battle, ids: SmallVec<[CombatantId; 2]>) -> SmallVec<[BattlerIndex; 4]> {
    ids.iter()
        .filter_map(|&id| battle.combatant(id).battler_index())
        .collect()
}

fn smallvec_of(index: BattlerIndex) -> SmallVec<[BattlerIndex; 4]> {
    let mut list = SmallVec::new();
    list.push(index);
    list
}
