//! The move resolution state machine.
//!
//! ```text
//! Selected -> ConditionsChecked -> TargetsResolved
//!   -> per target: AccuracyChecked -> PowerComputed -> DamageApplied -> SecondaryEffectsApplied
//!   -> Done
//! ```
//!
//! `FailedCondition` and `Cancelled` are terminal. A miss or immunity ends
//! only that target's walk. Each call to [`MoveResolution::step`] advances
//! exactly one stage so the presentation layer can interleave its own work.

use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::{accuracy, damage, effects, power, MoveContext};
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::cells::BoolCell;
use crate::error::{ConfigError, Result};
use crate::events::{BattleEvent, CancelReason, DamageSource};
use crate::items;
use crate::moves::attrs::{AttrKind, EffectTrigger, MoveAttr, MoveEffect};
use crate::moves::conditions::conditions_pass;
use crate::moves::targeting::{bind_attacker, resolve_targets};
use crate::moves::{Move, MoveFlags, MoveId};
use crate::state::{
    AttackRecord, BattlerIndex, CombatantId, MoveRecord, MoveResult, StatusKind,
};
use crate::tags::{battler, ArenaTagKind, BattlerTag, BattlerTagKind, LapseTiming, TagPayload};
use crate::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Selected,
    ConditionsChecked,
    TargetsResolved,
    AccuracyChecked,
    PowerComputed,
    DamageApplied,
    SecondaryEffectsApplied,
    Done,
    FailedCondition,
    Cancelled,
}

impl ResolutionState {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ResolutionState::Done | ResolutionState::FailedCondition | ResolutionState::Cancelled
        )
    }
}

/// How one target came out of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HitResult {
    Hit,
    Missed,
    NoEffect,
    Protected,
    /// Target left the field before its turn in the walk
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetReport {
    pub target: CombatantId,
    pub result: HitResult,
    /// HP removed from the target (substitute damage excluded)
    pub damage: u32,
    pub hits: u8,
    pub critical: bool,
    /// 4 = 1x
    pub effectiveness: u8,
}

impl TargetReport {
    fn new(target: CombatantId, result: HitResult) -> Self {
        Self { target, result, damage: 0, hits: 0, critical: false, effectiveness: damage::NEUTRAL }
    }
}

/// Final result of one move use.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub user: CombatantId,
    pub move_id: MoveId,
    pub state: ResolutionState,
    pub result: MoveResult,
    pub targets: Vec<TargetReport>,
    pub total_damage: u32,
    pub cancel_reason: Option<CancelReason>,
}

/// Scratch for the target currently being walked.
#[derive(Clone, Debug)]
struct TargetWork {
    report: TargetReport,
    move_type: Type,
    power: u32,
    hits: u8,
    /// Hits that reached the target itself rather than a substitute
    landed: u8,
    behind_substitute: bool,
}

/// One move use, advanced stage by stage.
#[derive(Debug)]
pub struct MoveResolution<'m> {
    user: CombatantId,
    mv: &'m Move,
    move_slot: Option<usize>,
    requested: Option<BattlerIndex>,
    simulated: bool,
    state: ResolutionState,
    target_slots: SmallVec<[BattlerIndex; 4]>,
    targets: SmallVec<[CombatantId; 4]>,
    multiple: bool,
    cursor: usize,
    work: Option<TargetWork>,
    reports: Vec<TargetReport>,
    /// Index of the target whose walk owns the user's self effects
    self_effect_owner: Option<usize>,
    any_effect: bool,
    failed: bool,
    charging: bool,
    cancel_reason: Option<CancelReason>,
}

impl<'m> MoveResolution<'m> {
    pub fn new(
        user: CombatantId,
        mv: &'m Move,
        move_slot: Option<usize>,
        requested: Option<BattlerIndex>,
        simulated: bool,
    ) -> Self {
        Self {
            user,
            mv,
            move_slot,
            requested,
            simulated,
            state: ResolutionState::Selected,
            target_slots: SmallVec::new(),
            targets: SmallVec::new(),
            multiple: false,
            cursor: 0,
            work: None,
            reports: Vec::new(),
            self_effect_owner: None,
            any_effect: false,
            failed: false,
            charging: false,
            cancel_reason: None,
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Advance one stage. Returns false once the resolution is terminal.
    pub fn step(&mut self, battle: &mut Battle) -> bool {
        let before = self.state;
        match self.state {
            ResolutionState::Selected => self.select(battle),
            ResolutionState::ConditionsChecked => self.resolve(battle),
            ResolutionState::TargetsResolved | ResolutionState::SecondaryEffectsApplied => {
                self.next_target(battle)
            }
            ResolutionState::AccuracyChecked => match &self.work {
                Some(work) if work.report.result == HitResult::Hit => self.compute_power(battle),
                _ => self.next_target(battle),
            },
            ResolutionState::PowerComputed => self.apply_damage(battle),
            ResolutionState::DamageApplied => self.apply_post_effects(battle),
            ResolutionState::Done | ResolutionState::FailedCondition | ResolutionState::Cancelled => {
                return false;
            }
        }
        trace!(user = ?self.user, move_id = ?self.mv.id, from = ?before, to = ?self.state, "resolution step");
        true
    }

    /// Step until terminal and return the outcome.
    pub fn run(mut self, battle: &mut Battle) -> MoveOutcome {
        while self.step(battle) {}
        self.outcome()
    }

    pub fn outcome(&self) -> MoveOutcome {
        let total_damage = self.reports.iter().map(|r| r.damage).sum();
        MoveOutcome {
            user: self.user,
            move_id: self.mv.id,
            state: self.state,
            result: self.result(),
            targets: self.reports.clone(),
            total_damage,
            cancel_reason: self.cancel_reason,
        }
    }

    fn result(&self) -> MoveResult {
        match self.state {
            ResolutionState::FailedCondition | ResolutionState::Cancelled => MoveResult::Fail,
            _ if self.charging => MoveResult::Pending,
            _ if self.failed => MoveResult::Fail,
            _ => {
                if self.mv.is_status() {
                    if self.any_effect {
                        return MoveResult::Success;
                    }
                } else if self.reports.iter().any(|r| r.result == HitResult::Hit) {
                    return MoveResult::Success;
                }
                if !self.reports.is_empty()
                    && self.reports.iter().all(|r| r.result == HitResult::Missed)
                {
                    MoveResult::Miss
                } else if !self.reports.is_empty()
                    && self.reports.iter().all(|r| r.result == HitResult::NoEffect)
                {
                    MoveResult::NoEffect
                } else {
                    MoveResult::Fail
                }
            }
        }
    }

    fn ctx(&self, target: CombatantId, move_type: Type) -> MoveContext<'m> {
        MoveContext::new(self.user, target, self.mv, move_type)
    }

    // ========================================================================
    // Selected: pre-move checks, charge handling, PP
    // ========================================================================

    fn select(&mut self, battle: &mut Battle) {
        let user = self.user;
        if !battle.combatant(user).is_active() {
            self.state = ResolutionState::Cancelled;
            return;
        }

        if let Some(reason) = self.pre_move_cancel(battle) {
            self.cancel(battle, reason);
            return;
        }

        let charge = self.mv.attrs().iter().find_map(|a| match a {
            MoveAttr::Charge(tag) => Some(*tag),
            _ => None,
        });
        if let Some(semi_tag) = charge {
            let stored = battle.combatant(user).tags.get(BattlerTagKind::Charging).and_then(|t| {
                match &t.payload {
                    TagPayload::Charging { move_id, targets } if *move_id == self.mv.id => {
                        Some(targets.first().copied())
                    }
                    _ => None,
                }
            });
            match stored {
                Some(requested) => {
                    self.requested = requested.or(self.requested);
                    self.clear_charge(battle);
                }
                None => {
                    self.begin_charge(battle, semi_tag);
                    return;
                }
            }
        }

        battle.emit(BattleEvent::MoveUsed { user, move_id: self.mv.id }, self.simulated);
        // A two-turn move paid its PP on the charge turn
        if charge.is_none() {
            self.deduct_pp(battle);
        }

        if self.mv.has_flag(MoveFlags::GRAVITY) && battle.field.has_field_tag(ArenaTagKind::Gravity) {
            self.fail(battle);
            return;
        }

        let condition_target = self
            .requested
            .filter(|r| !r.is_sentinel())
            .and_then(|r| battle.occupant(r))
            .or_else(|| battle.opponents_of(user).first().copied());
        if !conditions_pass(battle, user, condition_target, self.mv) {
            debug!(?user, move_id = ?self.mv.id, "move condition failed");
            self.fail(battle);
            return;
        }
        self.state = ResolutionState::ConditionsChecked;
    }

    fn pre_move_cancel(&mut self, battle: &mut Battle) -> Option<CancelReason> {
        let user = self.user;
        if !self.simulated {
            battler::lapse_tags(battle, user, LapseTiming::PreMove);
            if let Some(reason) = battle.combatant_mut(user).turn_data.cancel_reason.take() {
                return Some(reason);
            }
            if let Some(reason) = self.status_cancel(battle) {
                return Some(reason);
            }
        }
        let mut cancelled = BoolCell::default();
        dispatch::apply_pre_move(battle, user, self.mv, &mut cancelled, self.simulated);
        if cancelled.value {
            return Some(CancelReason::Ability);
        }
        if self.mv.is_status() && battle.combatant(user).tags.has(BattlerTagKind::Taunted) {
            return Some(CancelReason::Taunted);
        }
        if let Some(slot) = self.move_slot {
            if battle.combatant(user).moveset.get(slot).map_or(true, |s| s.pp == 0) {
                return Some(CancelReason::NoPp);
            }
        }
        None
    }

    fn status_cancel(&mut self, battle: &mut Battle) -> Option<CancelReason> {
        let user = self.user;
        let status = battle.combatant(user).status?;
        match status.kind {
            StatusKind::Sleep => {
                if status.turns == 0 {
                    effects::cure_status(battle, user, false);
                    return None;
                }
                if let Some(s) = battle.combatant_mut(user).status.as_mut() {
                    s.turns -= 1;
                }
                Some(CancelReason::Asleep)
            }
            StatusKind::Freeze => {
                if battle.rng.random_int(5) == 0 {
                    effects::cure_status(battle, user, false);
                    return None;
                }
                Some(CancelReason::Frozen)
            }
            StatusKind::Paralysis => (battle.rng.random_int(4) == 0).then_some(CancelReason::Paralyzed),
            _ => None,
        }
    }

    fn cancel(&mut self, battle: &mut Battle, reason: CancelReason) {
        let user = self.user;
        debug!(?user, move_id = ?self.mv.id, ?reason, "move cancelled");
        self.clear_charge(battle);
        battle.emit(BattleEvent::MoveCancelled { user, move_id: self.mv.id, reason }, self.simulated);
        if !self.simulated {
            battle.combatant_mut(user).turn_data.acted = true;
        }
        self.cancel_reason = Some(reason);
        self.state = ResolutionState::Cancelled;
    }

    fn begin_charge(&mut self, battle: &mut Battle, semi_tag: Option<BattlerTagKind>) {
        let user = self.user;
        let mut targets = SmallVec::new();
        targets.extend(self.requested);
        let tag = BattlerTag::new(BattlerTagKind::Charging)
            .with_source(user, Some(self.mv.id))
            .with_payload(TagPayload::Charging { move_id: self.mv.id, targets });
        battler::add_tag(battle, user, tag, self.simulated);
        if let Some(kind) = semi_tag {
            battler::add_tag(battle, user, BattlerTag::new(kind), self.simulated);
        }
        battle.emit(BattleEvent::ChargingMove { user, move_id: self.mv.id }, self.simulated);
        self.deduct_pp(battle);
        self.charging = true;
        self.finish(battle);
    }

    fn clear_charge(&mut self, battle: &mut Battle) {
        let user = self.user;
        if !battle.combatant(user).tags.has(BattlerTagKind::Charging) {
            return;
        }
        battler::remove_tag(battle, user, BattlerTagKind::Charging, self.simulated);
        if let Some(semi) = battle.combatant(user).tags.semi_invulnerable() {
            battler::remove_tag(battle, user, semi, self.simulated);
        }
    }

    fn deduct_pp(&mut self, battle: &mut Battle) {
        if self.simulated {
            return;
        }
        if let Some(slot) = self.move_slot {
            if let Some(move_slot) = battle.combatant_mut(self.user).moveset.get_mut(slot) {
                move_slot.pp = move_slot.pp.saturating_sub(1);
            }
        }
    }

    fn fail(&mut self, battle: &mut Battle) {
        battle.emit(BattleEvent::MoveFailed { user: self.user, move_id: self.mv.id }, self.simulated);
        self.failed = true;
        self.record(battle);
        self.state = ResolutionState::FailedCondition;
    }

    // ========================================================================
    // ConditionsChecked: targeting
    // ========================================================================

    fn resolve(&mut self, battle: &mut Battle) {
        let resolved = resolve_targets(battle, self.user, self.mv, self.requested);
        for &index in &resolved.targets {
            let id = if index.is_sentinel() {
                bind_attacker(battle, self.user)
            } else {
                battle.occupant(index)
            };
            if let Some(id) = id {
                self.targets.push(id);
                self.target_slots.push(battle.combatant(id).battler_index().unwrap_or(index));
            }
        }
        self.multiple = resolved.multiple;
        if self.targets.is_empty() {
            debug!(user = ?self.user, move_id = ?self.mv.id, "no targets");
            self.fail(battle);
            return;
        }
        trace!(user = ?self.user, targets = ?self.targets, multiple = self.multiple, "targets resolved");
        self.state = ResolutionState::TargetsResolved;
    }

    // ========================================================================
    // Per target
    // ========================================================================

    fn next_target(&mut self, battle: &mut Battle) {
        if let Some(work) = self.work.take() {
            self.reports.push(work.report);
            self.cursor += 1;
        }
        if self.failed {
            self.finish(battle);
            return;
        }
        let Some(&target) = self.targets.get(self.cursor) else {
            self.finish(battle);
            return;
        };
        self.check_target(battle, target);
    }

    fn check_target(&mut self, battle: &mut Battle, target: CombatantId) {
        let user = self.user;
        let (move_type, _) = power::effective_move_type(battle, user, self.mv);
        let ctx = self.ctx(target, move_type);
        let mut work = TargetWork {
            report: TargetReport::new(target, HitResult::Hit),
            move_type,
            power: 0,
            hits: 0,
            landed: 0,
            behind_substitute: false,
        };
        self.state = ResolutionState::AccuracyChecked;

        if !battle.combatant(target).is_active() || !battle.combatant(user).is_active() {
            work.report.result = HitResult::Failed;
            self.work = Some(work);
            return;
        }

        if target != user
            && self.mv.has_flag(MoveFlags::PROTECT)
            && battle.combatant(target).tags.has(BattlerTagKind::Protected)
        {
            battle.emit(BattleEvent::Protected { target }, self.simulated);
            work.report.result = HitResult::Protected;
            self.work = Some(work);
            return;
        }

        if !accuracy::check_hit(battle, &ctx) {
            battle.emit(BattleEvent::Missed { user, target }, self.simulated);
            work.report.result = HitResult::Missed;
            self.work = Some(work);
            return;
        }

        if self.is_immune(battle, &ctx, &mut work) {
            battle.emit(BattleEvent::NoEffect { target }, self.simulated);
            work.report.result = HitResult::NoEffect;
            self.work = Some(work);
            return;
        }

        work.behind_substitute = target != user
            && battle.combatant(target).tags.has(BattlerTagKind::Substitute)
            && !self.bypasses_substitute();
        if self.self_effect_owner.is_none() {
            self.self_effect_owner = Some(self.cursor);
        }
        self.work = Some(work);
    }

    fn bypasses_substitute(&self) -> bool {
        self.mv.has_flag(MoveFlags::SOUND) || self.mv.has_flag(MoveFlags::BYPASSSUB)
    }

    fn is_immune(&self, battle: &mut Battle, ctx: &MoveContext<'m>, work: &mut TargetWork) -> bool {
        let target = ctx.target;
        if target == ctx.user {
            return false;
        }
        let target_combatant = battle.combatant(target);
        let status_immune = self.mv.attrs_of_kind(AttrKind::TypeImmunity).any(|a| {
            matches!(a, MoveAttr::StatusMoveTypeImmunity(ty) if target_combatant.has_type(*ty))
        });
        if status_immune {
            return true;
        }
        if !self.mv.is_status() {
            work.report.effectiveness = damage::effectiveness(battle, ctx);
            if work.report.effectiveness == 0 {
                return true;
            }
        }
        if let Some(reaction) = dispatch::type_immunity(battle, target, ctx.move_type) {
            dispatch::apply_immunity_reaction(battle, target, reaction, self.simulated);
            return true;
        }
        false
    }

    fn compute_power(&mut self, battle: &mut Battle) {
        let Some(work) = self.work.as_mut() else {
            self.state = ResolutionState::PowerComputed;
            return;
        };
        if !self.mv.is_status() {
            work.power = power::calculate_battle_power(battle, self.user, work.report.target, self.mv);
            work.hits = self
                .mv
                .attrs()
                .iter()
                .find_map(|a| match a {
                    MoveAttr::MultiHit(kind) => Some(kind.roll(&mut battle.rng)),
                    _ => None,
                })
                .unwrap_or(1);
        }
        self.state = ResolutionState::PowerComputed;
    }

    fn apply_damage(&mut self, battle: &mut Battle) {
        self.state = ResolutionState::DamageApplied;
        let Some(mut work) = self.work.take() else {
            return;
        };
        let target = work.report.target;
        let ctx = self.ctx(target, work.move_type);

        if self.mv.is_status() {
            for trigger in EffectTrigger::ORDER {
                self.apply_effects(battle, &ctx, &work, trigger, 0, 0);
                if self.failed {
                    break;
                }
            }
            self.work = Some(work);
            return;
        }

        for hit in 0..work.hits {
            if battle.combatant(target).is_fainted() || battle.combatant(self.user).is_fainted() {
                break;
            }
            let fixed = damage::fixed_damage(battle, &ctx);
            let critical = fixed.is_none() && damage::roll_critical(battle, &ctx);
            let amount = match fixed {
                Some(amount) => amount,
                None => damage::calculate_damage(
                    battle,
                    &ctx,
                    work.power,
                    self.multiple,
                    critical,
                    work.report.effectiveness,
                ),
            };
            if critical {
                work.report.critical = true;
                battle.emit(BattleEvent::CriticalHit { target }, self.simulated);
            }

            work.behind_substitute = work.behind_substitute
                && battle.combatant(target).tags.has(BattlerTagKind::Substitute);
            if work.behind_substitute {
                self.hit_substitute(battle, target, amount);
            } else {
                let dealt = self.hit_target(battle, target, amount);
                work.report.damage += dealt;
            }
            work.report.hits += 1;

            for trigger in [EffectTrigger::PreApply, EffectTrigger::OnHit] {
                self.apply_effects(battle, &ctx, &work, trigger, hit, work.report.damage);
            }
            if !work.behind_substitute {
                items::apply_after_hit(battle, &ctx, self.simulated);
                work.landed += 1;
            }
            battle.check_faint(target, self.simulated);
            battle.check_faint(self.user, self.simulated);
        }
        self.work = Some(work);
    }

    fn hit_target(&self, battle: &mut Battle, target: CombatantId, amount: u32) -> u32 {
        let current = battle.combatant(target).hp;
        if self.simulated {
            return amount.min(u32::from(current));
        }
        let defender = battle.combatant_mut(target);
        let dealt = defender.take_damage(amount);
        let hp_left = defender.hp;
        defender.turn_data.record_hit(AttackRecord {
            source: self.user,
            move_id: self.mv.id,
            category: self.mv.category(),
            damage: u32::from(dealt),
        });
        battle.emit(
            BattleEvent::Damage { target, amount: dealt, hp_left, source: DamageSource::Move },
            false,
        );
        u32::from(dealt)
    }

    fn hit_substitute(&self, battle: &mut Battle, target: CombatantId, amount: u32) {
        if self.simulated {
            return;
        }
        let Some(tag) = battle.combatant_mut(target).tags.get_mut(BattlerTagKind::Substitute) else {
            return;
        };
        let TagPayload::Substitute { hp } = &mut tag.payload else {
            return;
        };
        let absorbed = amount.min(u32::from(*hp)) as u16;
        *hp -= absorbed;
        let broken = *hp == 0;
        battle.emit(BattleEvent::SubstituteDamaged { target, amount: absorbed }, false);
        if broken {
            battler::remove_tag(battle, target, BattlerTagKind::Substitute, false);
        }
    }

    fn apply_post_effects(&mut self, battle: &mut Battle) {
        self.state = ResolutionState::SecondaryEffectsApplied;
        let Some(work) = self.work.take() else {
            return;
        };
        let target = work.report.target;
        let ctx = self.ctx(target, work.move_type);
        let damaging = !self.mv.is_status();
        if damaging {
            self.apply_effects(battle, &ctx, &work, EffectTrigger::PostApply, 0, work.report.damage);
            if work.report.hits > 0 && work.report.effectiveness != damage::NEUTRAL {
                battle.emit(
                    BattleEvent::Effectiveness { target, multiplier: work.report.effectiveness },
                    self.simulated,
                );
            }
            if self.mv.is_multi_hit() {
                battle.emit(BattleEvent::HitCount { user: self.user, hits: work.report.hits }, self.simulated);
            }
        }

        // Ability reactions run once every move effect has landed
        let reactions = if damaging {
            work.landed
        } else {
            u8::from(!self.failed && target != self.user && !work.behind_substitute)
        };
        for _ in 0..reactions {
            dispatch::apply_post_defend(battle, &ctx, damaging, self.simulated);
            dispatch::apply_post_attack(battle, &ctx, damaging, self.simulated);
        }
        battle.check_faint(target, self.simulated);
        battle.check_faint(self.user, self.simulated);
        self.work = Some(work);
    }

    /// Fire the move's effects registered for `trigger`.
    fn apply_effects(
        &mut self,
        battle: &mut Battle,
        ctx: &MoveContext<'m>,
        work: &TargetWork,
        trigger: EffectTrigger,
        hit: u8,
        damage_dealt: u32,
    ) {
        let owns_self_effects = self.self_effect_owner == Some(self.cursor);
        let mv = self.mv;
        for effect in mv.effects().filter(|e| e.trigger == trigger) {
            if effect.first_hit_only && hit > 0 {
                continue;
            }
            if effect.self_target && !owns_self_effects {
                continue;
            }
            if self.suppressed(battle, ctx, work, effect) {
                continue;
            }
            if !effect.roll(mv, &mut battle.rng) {
                continue;
            }
            let applied = effects::apply_effect(battle, ctx, effect, damage_dealt, self.simulated);
            if applied {
                self.any_effect = true;
            } else if effect.fail_on_overlap {
                self.failed = true;
                return;
            }
        }
    }

    fn suppressed(
        &self,
        battle: &Battle,
        ctx: &MoveContext<'m>,
        work: &TargetWork,
        effect: &MoveEffect,
    ) -> bool {
        if !effect.self_target {
            if work.behind_substitute {
                return true;
            }
            if effect.is_secondary(self.mv) && dispatch::ignores_secondary_effects(battle, ctx.target) {
                return true;
            }
        }
        !self.mv.is_status()
            && effect.effective_chance(self.mv) > 0
            && dispatch::suppresses_own_effects(battle, self.user)
    }

    // ========================================================================
    // Done
    // ========================================================================

    fn finish(&mut self, battle: &mut Battle) {
        // A status move that changed nothing also reads as a failure
        if !self.charging && (self.failed || (self.mv.is_status() && !self.any_effect)) {
            battle.emit(BattleEvent::MoveFailed { user: self.user, move_id: self.mv.id }, self.simulated);
        }
        self.record(battle);
        if !self.simulated && battle.combatant(self.user).is_active() {
            battler::lapse_tags(battle, self.user, LapseTiming::AfterMove);
        }
        self.state = ResolutionState::Done;
        debug!(user = ?self.user, move_id = ?self.mv.id, result = ?self.result(), "move resolved");
    }

    fn record(&self, battle: &mut Battle) {
        if self.simulated {
            return;
        }
        let record = MoveRecord {
            move_id: self.mv.id,
            targets: self.target_slots.clone(),
            result: self.result(),
            turn: battle.turn,
        };
        let user = battle.combatant_mut(self.user);
        user.push_move_record(record);
        user.turn_data.acted = true;
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Use the move in `user`'s moveset slot `move_index`.
pub fn use_move(
    battle: &mut Battle,
    user: CombatantId,
    move_index: usize,
    requested: Option<BattlerIndex>,
) -> Result<MoveOutcome> {
    let combatant = battle.combatant(user);
    let Some(slot) = combatant.moveset.get(move_index) else {
        return Err(ConfigError::MoveIndexOutOfRange { name: combatant.name.clone(), index: move_index });
    };
    let mv = slot.id.get();
    Ok(MoveResolution::new(user, mv, Some(move_index), requested, false).run(battle))
}

/// Resolve an arbitrary move for `user`, outside any moveset slot.
pub fn execute_move(
    battle: &mut Battle,
    user: CombatantId,
    mv: &Move,
    requested: Option<BattlerIndex>,
) -> MoveOutcome {
    MoveResolution::new(user, mv, None, requested, false).run(battle)
}

/// Dry run: no mutation, no events, and the battle RNG is left where it was.
pub fn simulate_move(
    battle: &mut Battle,
    user: CombatantId,
    mv: &Move,
    requested: Option<BattlerIndex>,
) -> MoveOutcome {
    let rng = battle.rng.clone();
    let outcome = MoveResolution::new(user, mv, None, requested, true).run(battle);
    battle.rng = rng;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityId;
    use crate::config::BattleConfig;
    use crate::moves::attrs::EffectKind;
    use crate::roster::CombatantConfig;
    use crate::state::{Side, StatusCondition};

    fn duel(user: CombatantConfig, target: CombatantConfig) -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(BattleConfig::single(17));
        let a = battle.add_combatant(&user, Side::Player).unwrap();
        let b = battle.add_combatant(&target, Side::Enemy).unwrap();
        battle.summon(a, 0).unwrap();
        battle.summon(b, 0).unwrap();
        battle.take_events();
        (battle, a, b)
    }

    fn mon(name: &str, moves: &[MoveId]) -> CombatantConfig {
        CombatantConfig::new(name)
            .level(50)
            .types(Type::Water, None)
            .stats([300, 100, 100, 100, 100, 100])
            .moves(moves)
    }

    fn count<F: Fn(&BattleEvent) -> bool>(events: &[BattleEvent], pred: F) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_tackle_hits_and_records_history() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Tackle]));
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.state, ResolutionState::Done);
        assert_eq!(outcome.result, MoveResult::Success);
        assert_eq!(outcome.targets.len(), 1);
        assert!(outcome.total_damage > 0);

        let events = battle.take_events();
        assert_eq!(events[0], BattleEvent::MoveUsed { user: a, move_id: MoveId::Tackle });
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::Damage { target, .. } if *target == b)), 1);

        let user = battle.combatant(a);
        assert_eq!(user.last_move().map(|r| r.move_id), Some(MoveId::Tackle));
        assert_eq!(user.moveset[0].pp, MoveId::Tackle.data().pp - 1);
        assert!(user.turn_data.acted);
        assert_eq!(battle.combatant(b).turn_data.last_attacker().map(|r| r.source), Some(a));
    }

    #[test]
    fn test_step_walks_the_states_in_order() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Tackle]));
        let mut resolution = MoveResolution::new(a, MoveId::Tackle.get(), Some(0), None, false);
        let mut seen = vec![resolution.state()];
        while resolution.step(&mut battle) {
            seen.push(resolution.state());
        }
        assert_eq!(
            seen,
            vec![
                ResolutionState::Selected,
                ResolutionState::ConditionsChecked,
                ResolutionState::TargetsResolved,
                ResolutionState::AccuracyChecked,
                ResolutionState::PowerComputed,
                ResolutionState::DamageApplied,
                ResolutionState::SecondaryEffectsApplied,
                ResolutionState::Done,
            ]
        );
    }

    #[test]
    fn test_failed_condition_emits_one_failure() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Fakeout]), mon("B", &[MoveId::Tackle]));
        battle.combatant_mut(a).active_turns = 1;
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.state, ResolutionState::FailedCondition);
        assert_eq!(outcome.total_damage, 0);
        let events = battle.take_events();
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::MoveFailed { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::Damage { .. })), 0);
        assert_eq!(battle.combatant(b).hp, 300);
    }

    #[test]
    fn test_protect_blocks_protectable_moves() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Protect]));
        use_move(&mut battle, b, 0, None).unwrap();
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.targets[0].result, HitResult::Protected);
        assert_eq!(battle.combatant(b).hp, 300);
    }

    #[test]
    fn test_substitute_absorbs_hits_and_blocks_status() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Tackle, MoveId::Thunderwave, MoveId::Growl]),
            mon("B", &[MoveId::Substitute]),
        );
        use_move(&mut battle, b, 0, None).unwrap();
        assert_eq!(battle.combatant(b).hp, 225);
        battle.take_events();

        use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(battle.combatant(b).hp, 225);
        let events = battle.take_events();
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::SubstituteDamaged { .. })), 1);

        let outcome = use_move(&mut battle, a, 1, None).unwrap();
        assert_ne!(outcome.result, MoveResult::Success);
        assert!(battle.combatant(b).status.is_none());

        // Sound moves go straight through
        use_move(&mut battle, a, 2, None).unwrap();
        assert_eq!(battle.combatant(b).stage(crate::state::BattleStat::Atk), -1);
    }

    #[test]
    fn test_multi_hit_reports_hits() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Doublekick]), mon("B", &[MoveId::Tackle]));
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.targets[0].hits, 2);
        let events = battle.take_events();
        assert!(events.contains(&BattleEvent::HitCount { user: a, hits: 2 }));
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::Damage { .. })), 2);
    }

    #[test]
    fn test_charge_move_spans_two_uses() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Dig]), mon("B", &[MoveId::Tackle]));
        let first = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(first.result, MoveResult::Pending);
        assert!(battle.combatant(a).tags.has(BattlerTagKind::Underground));
        assert_eq!(battle.combatant(b).hp, 300);

        // Tackle cannot reach underground
        let blocked = use_move(&mut battle, b, 0, None).unwrap();
        assert_eq!(blocked.targets[0].result, HitResult::Missed);

        let second = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(second.result, MoveResult::Success);
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Underground));
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Charging));
        assert!(battle.combatant(b).hp < 300);
        assert_eq!(battle.combatant(a).moveset[0].pp, MoveId::Dig.data().pp - 1);
    }

    #[test]
    fn test_ability_immunity_reacts() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Thunderbolt]),
            mon("B", &[MoveId::Tackle]).ability(AbilityId::Voltabsorb).current_hp(100),
        );
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.targets[0].result, HitResult::NoEffect);
        assert!(battle.combatant(b).hp > 100);
    }

    #[test]
    fn test_type_immunity_is_no_effect() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Thunderwave]),
            mon("B", &[MoveId::Tackle]).types(Type::Ground, None),
        );
        let mut outcome = use_move(&mut battle, a, 0, None).unwrap();
        while outcome.result == MoveResult::Miss {
            outcome = use_move(&mut battle, a, 0, None).unwrap();
        }
        assert_eq!(outcome.result, MoveResult::NoEffect);
        assert!(battle.take_events().contains(&BattleEvent::NoEffect { target: b }));
    }

    #[test]
    fn test_status_move_without_effect_fails() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Willowisp]), mon("B", &[MoveId::Tackle]));
        battle.combatant_mut(b).status = Some(StatusCondition::new(StatusKind::Poison));
        // Will-O-Wisp can miss; retry until it connects
        let mut outcome = use_move(&mut battle, a, 0, None).unwrap();
        while outcome.targets[0].result == HitResult::Missed {
            outcome = use_move(&mut battle, a, 0, None).unwrap();
        }
        assert_eq!(outcome.result, MoveResult::Fail);
    }

    #[test]
    fn test_stockpile_refuses_fourth_layer() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Stockpile]), mon("B", &[MoveId::Tackle]));
        for _ in 0..3 {
            assert_eq!(use_move(&mut battle, a, 0, None).unwrap().result, MoveResult::Success);
        }
        battle.take_events();
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.result, MoveResult::Fail);
        let events = battle.take_events();
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::MoveFailed { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, BattleEvent::StatChanged { .. })), 0);
    }

    #[test]
    fn test_sheer_force_drops_secondary_effects() {
        let burn = Move::builder(MoveId::Tackle)
            .chance(100)
            .accuracy(-1)
            .effect(MoveEffect::new(EffectKind::Status(StatusKind::Burn)))
            .build();
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Tackle]));
        execute_move(&mut battle, a, &burn, None);
        assert_eq!(battle.combatant(b).status.map(|s| s.kind), Some(StatusKind::Burn));

        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Tackle]).ability(AbilityId::Sheerforce),
            mon("B", &[MoveId::Tackle]),
        );
        execute_move(&mut battle, a, &burn, None);
        assert!(battle.combatant(b).status.is_none());
    }

    #[test]
    fn test_flinch_cancels_and_is_consumed() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Tackle]));
        battler::add_tag(&mut battle, a, BattlerTag::new(BattlerTagKind::Flinched), false);
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.state, ResolutionState::Cancelled);
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Flinched));
        assert!(battle.take_events().iter().any(|e| matches!(
            e,
            BattleEvent::MoveCancelled { reason: CancelReason::Flinched, .. }
        )));
    }

    #[test]
    fn test_taunt_blocks_status_moves() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Swordsdance]), mon("B", &[MoveId::Tackle]));
        battler::add_tag(&mut battle, a, BattlerTag::new(BattlerTagKind::Taunted), false);
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(outcome.state, ResolutionState::Cancelled);
        assert_eq!(battle.combatant(a).stage(crate::state::BattleStat::Atk), 0);
    }

    #[test]
    fn test_simulated_run_changes_nothing() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Flamethrower]), mon("B", &[MoveId::Tackle]));
        let rng = battle.rng.state();
        let outcome = simulate_move(&mut battle, a, MoveId::Flamethrower.get(), None);
        assert!(outcome.total_damage > 0);
        assert_eq!(battle.combatant(b).hp, 300);
        assert!(battle.combatant(a).move_history.is_empty());
        assert!(battle.take_events().is_empty());
        assert_eq!(battle.rng.state(), rng);

        // The real run sees the same draws
        let real = execute_move(&mut battle, a, MoveId::Flamethrower.get(), None);
        assert_eq!(real.total_damage, outcome.total_damage);
    }

    #[test]
    fn test_move_index_out_of_range() {
        let (mut battle, a, _) = duel(mon("A", &[MoveId::Tackle]), mon("B", &[MoveId::Tackle]));
        assert!(matches!(
            use_move(&mut battle, a, 3, None),
            Err(ConfigError::MoveIndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_recoil_after_damage() {
        let (mut battle, a, b) = duel(mon("A", &[MoveId::Doubleedge]), mon("B", &[MoveId::Tackle]));
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        let dealt = outcome.total_damage;
        assert_eq!(300 - battle.combatant(b).hp as u32, dealt);
        assert_eq!(300 - battle.combatant(a).hp as u32, (dealt / 3).max(1));
    }

    #[test]
    fn test_ability_reactions_follow_move_effects() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Doubleedge]),
            mon("B", &[MoveId::Tackle]).ability(AbilityId::Roughskin),
        );
        use_move(&mut battle, a, 0, None).unwrap();
        let events = battle.take_events();
        let recoil: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                matches!(e, BattleEvent::Damage { target, source: DamageSource::Recoil, .. } if *target == a)
            })
            .map(|(i, _)| i)
            .collect();
        let shown = events
            .iter()
            .position(|e| matches!(e, BattleEvent::AbilityShown { combatant, .. } if *combatant == b))
            .unwrap();
        // Move recoil first, then the Rough Skin chip
        assert_eq!(recoil.len(), 2);
        assert!(recoil[0] < shown && shown < recoil[1]);
        assert!(matches!(events[recoil[1]], BattleEvent::Damage { amount: 37, .. }));
    }

    #[test]
    fn test_status_move_reaches_any_move_reactions() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Willowisp]),
            mon("B", &[MoveId::Tackle]).ability(AbilityId::Synchronize),
        );
        let mut outcome = use_move(&mut battle, a, 0, None).unwrap();
        while outcome.targets[0].result == HitResult::Missed {
            outcome = use_move(&mut battle, a, 0, None).unwrap();
        }
        assert_eq!(outcome.result, MoveResult::Success);
        assert_eq!(battle.combatant(b).status.map(|s| s.kind), Some(StatusKind::Burn));
        assert_eq!(battle.combatant(a).status.map(|s| s.kind), Some(StatusKind::Burn));
        assert!(battle
            .take_events()
            .contains(&BattleEvent::AbilityShown { combatant: b, ability: AbilityId::Synchronize }));
    }

    #[test]
    fn test_ability_cancel_clears_charge() {
        let (mut battle, a, b) = duel(
            mon("A", &[MoveId::Dig]).ability(AbilityId::Truant),
            mon("B", &[MoveId::Tackle]),
        );
        battle.turn = 1;
        assert_eq!(use_move(&mut battle, a, 0, None).unwrap().result, MoveResult::Pending);
        assert!(battle.combatant(a).tags.has(BattlerTagKind::Underground));
        battle.take_events();

        battle.turn = 2;
        let loafing = use_move(&mut battle, a, 0, None).unwrap();
        assert_eq!(loafing.state, ResolutionState::Cancelled);
        assert_eq!(loafing.cancel_reason, Some(CancelReason::Ability));
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Underground));
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Charging));
        assert_eq!(battle.combatant(b).hp, 300);
        let events = battle.take_events();
        assert!(events.contains(&BattleEvent::AbilityShown { combatant: a, ability: AbilityId::Truant }));

        // Rested; the next use starts a fresh charge
        battle.turn = 3;
        assert_eq!(use_move(&mut battle, a, 0, None).unwrap().result, MoveResult::Pending);
    }
}
