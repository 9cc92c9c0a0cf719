//! End-to-end move resolution checks against a live battle.

use move_engine::moves::{EffectKind, MoveCondition, MoveEffect};
use move_engine::pipeline::power::calculate_battle_power;
use move_engine::pipeline::HitResult;
use move_engine::state::{MoveResult, StatusKind};
use move_engine::tags::battler::add_tag;
use move_engine::tags::{BattlerTag, BattlerTagKind};
use move_engine::types::Type;
use move_engine::{
    execute_move, use_move, Battle, BattleConfig, BattleEvent, CombatantConfig, CombatantId, Move,
    MoveId, Side,
};

// ============================================================================
// Helpers
// ============================================================================

fn mon(name: &str) -> CombatantConfig {
    CombatantConfig::new(name).moves(&[MoveId::Tackle])
}

fn single(seed: u64, user: CombatantConfig, target: CombatantConfig) -> (Battle, CombatantId, CombatantId) {
    let mut battle = Battle::new(BattleConfig::single(seed));
    let a = battle.add_combatant(&user, Side::Player).unwrap();
    let b = battle.add_combatant(&target, Side::Enemy).unwrap();
    battle.summon(a, 0).unwrap();
    battle.summon(b, 0).unwrap();
    battle.take_events();
    (battle, a, b)
}

/// Quaker and a Flying ally against a dug-in foe and an exposed one.
fn quake_board(seed: u64) -> (Battle, [CombatantId; 4]) {
    let mut battle = Battle::new(BattleConfig::double(seed));
    let bulky = [1000, 100, 100, 100, 100, 100];
    let user = battle
        .add_combatant(&CombatantConfig::new("Quaker").moves(&[MoveId::Earthquake]), Side::Player)
        .unwrap();
    let ally = battle.add_combatant(&mon("Perch").types(Type::Flying, None), Side::Player).unwrap();
    let dug = battle.add_combatant(&mon("Mole").stats(bulky), Side::Enemy).unwrap();
    let exposed = battle.add_combatant(&mon("Plain").stats(bulky), Side::Enemy).unwrap();
    for (id, slot) in [(user, 0), (ally, 1), (dug, 0), (exposed, 1)] {
        battle.summon(id, slot).unwrap();
    }
    add_tag(&mut battle, dug, BattlerTag::new(BattlerTagKind::Underground), false);
    battle.take_events();
    (battle, [user, ally, dug, exposed])
}

fn count(events: &[BattleEvent], pred: impl Fn(&BattleEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// ============================================================================
// Secondary effect rates
// ============================================================================

#[test]
fn test_thirty_percent_burn_rate_over_many_seeds() {
    let scorch = Move::builder(MoveId::Tackle)
        .power(100)
        .chance(30)
        .effect(MoveEffect::new(EffectKind::Status(StatusKind::Burn)))
        .build();

    const SEEDS: u64 = 400;
    let mut burned = 0;
    for seed in 0..SEEDS {
        let (mut battle, a, b) = single(
            seed,
            mon("User"),
            mon("Wall").stats([1000, 100, 400, 100, 400, 100]),
        );
        let outcome = execute_move(&mut battle, a, &scorch, None);
        assert_eq!(outcome.targets[0].result, HitResult::Hit, "seed {seed}");
        if battle.combatant(b).status.map(|s| s.kind) == Some(StatusKind::Burn) {
            burned += 1;
        }
    }

    let rate = f64::from(burned) / SEEDS as f64;
    assert!((0.22..=0.38).contains(&rate), "burn rate {rate}");
}

#[test]
fn test_burn_never_follows_a_miss() {
    let scorch = Move::builder(MoveId::Tackle)
        .power(100)
        .accuracy(70)
        .chance(30)
        .effect(MoveEffect::new(EffectKind::Status(StatusKind::Burn)))
        .build();

    let (mut hits, mut misses, mut burned) = (0u32, 0u32, 0u32);
    for seed in 0..400 {
        let (mut battle, a, b) = single(
            seed,
            mon("User"),
            mon("Wall").stats([1000, 100, 400, 100, 400, 100]),
        );
        let outcome = execute_move(&mut battle, a, &scorch, None);
        let status = battle.combatant(b).status.map(|s| s.kind);
        match outcome.targets[0].result {
            HitResult::Missed => {
                misses += 1;
                assert_eq!(status, None, "seed {seed}");
                assert_eq!(battle.combatant(b).hp, 1000, "seed {seed}");
            }
            HitResult::Hit => {
                hits += 1;
                if status == Some(StatusKind::Burn) {
                    burned += 1;
                }
            }
            other => panic!("seed {seed}: unexpected {other:?}"),
        }
    }

    assert!((80..=160).contains(&misses), "misses {misses}");
    let rate = f64::from(burned) / f64::from(hits);
    assert!((0.2..=0.4).contains(&rate), "burn rate among hits {rate}");
}

#[test]
fn test_same_seed_same_battle() {
    let run = |seed| {
        let (mut battle, a, b) = single(seed, mon("A").moves(&[MoveId::Thunderbolt]), mon("B"));
        let outcome = use_move(&mut battle, a, 0, None).unwrap();
        (outcome.total_damage, battle.combatant(b).status, battle.take_events())
    };
    assert_eq!(run(21), run(21));
}

// ============================================================================
// Multi-target resolution
// ============================================================================

#[test]
fn test_spread_move_resolves_each_target_independently() {
    let (mut battle, [user, ally, dug, exposed]) = quake_board(17);
    let quake = MoveId::Earthquake.get();

    // Only the dug-in target doubles the power
    let dug_power = calculate_battle_power(&battle, user, dug, quake);
    let exposed_power = calculate_battle_power(&battle, user, exposed, quake);
    assert_eq!(exposed_power, u32::from(quake.data.power));
    assert_eq!(dug_power, exposed_power * 2);

    let outcome = use_move(&mut battle, user, 0, None).unwrap();
    assert_eq!(outcome.targets.len(), 3);

    let report = |id| outcome.targets.iter().find(|t| t.target == id).unwrap();
    assert_eq!(report(ally).result, HitResult::NoEffect);
    assert_eq!(report(ally).damage, 0);
    assert_eq!(report(dug).result, HitResult::Hit);
    assert_eq!(report(exposed).result, HitResult::Hit);
    assert!(report(dug).damage > report(exposed).damage);
    assert_eq!(outcome.total_damage, report(dug).damage + report(exposed).damage);
    assert_eq!(outcome.result, MoveResult::Success);
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_failed_condition_short_circuits() {
    let (mut battle, a, b) = single(2, mon("A").moves(&[MoveId::Fakeout]), mon("B"));
    battle.combatant_mut(a).active_turns = 3;

    let outcome = use_move(&mut battle, a, 0, None).unwrap();
    assert_eq!(outcome.result, MoveResult::Fail);
    assert_eq!(outcome.total_damage, 0);
    assert!(outcome.targets.is_empty());

    let events = battle.take_events();
    assert_eq!(count(&events, |e| matches!(e, BattleEvent::MoveFailed { .. })), 1);
    assert_eq!(count(&events, |e| matches!(e, BattleEvent::Damage { .. })), 0);
    assert_eq!(battle.combatant(b).hp, battle.combatant(b).max_hp());
    assert!(!battle.combatant(b).tags.has(BattlerTagKind::Flinched));
}

#[test]
fn test_status_move_blocked_by_type_immunity() {
    let (mut battle, a, b) = single(
        30,
        mon("A").moves(&[MoveId::Willowisp]),
        mon("B").types(Type::Fire, None),
    );
    let outcome = use_move(&mut battle, a, 0, None).unwrap();
    assert_ne!(outcome.result, MoveResult::Success);
    assert_eq!(battle.combatant(b).status, None);
}

#[test]
fn test_failed_condition_short_circuits_spread_moves() {
    let (mut battle, [user, ally, dug, exposed]) = quake_board(4);
    battle.combatant_mut(user).active_turns = 3;
    let opener = Move::builder(MoveId::Earthquake)
        .condition(MoveCondition::FirstTurnOnly)
        .build();

    let outcome = execute_move(&mut battle, user, &opener, None);
    assert_eq!(outcome.result, MoveResult::Fail);
    assert_eq!(outcome.total_damage, 0);
    assert!(outcome.targets.is_empty());

    let events = battle.take_events();
    assert_eq!(count(&events, |e| matches!(e, BattleEvent::MoveFailed { .. })), 1);
    assert_eq!(count(&events, |e| matches!(e, BattleEvent::Damage { .. })), 0);
    for id in [ally, dug, exposed] {
        assert_eq!(battle.combatant(id).hp, battle.combatant(id).max_hp());
    }
    assert!(battle.combatant(dug).tags.has(BattlerTagKind::Underground));
}
