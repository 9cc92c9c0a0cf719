//! Property tests for the invariants every resolution must keep.

use move_engine::moves::{EffectKind, MoveEffect};
use move_engine::pipeline::power::calculate_battle_power;
use move_engine::rng::BattleRng;
use move_engine::state::{BattleStat, MoveResult, StatusKind};
use move_engine::tags::battler::add_tag;
use move_engine::tags::{BattlerTag, BattlerTagKind};
use move_engine::{
    simulate_move, Battle, BattleConfig, CombatantConfig, CombatantId, Move, MoveId, Side,
};
use proptest::prelude::*;

fn duel(seed: u64) -> (Battle, CombatantId, CombatantId) {
    let mut battle = Battle::new(BattleConfig::single(seed));
    let a = battle
        .add_combatant(
            &CombatantConfig::new("A").moves(&[MoveId::Tackle, MoveId::Flamethrower, MoveId::Growl]),
            Side::Player,
        )
        .unwrap();
    let b = battle
        .add_combatant(&CombatantConfig::new("B").moves(&[MoveId::Tackle]), Side::Enemy)
        .unwrap();
    battle.summon(a, 0).unwrap();
    battle.summon(b, 0).unwrap();
    battle.take_events();
    (battle, a, b)
}

fn any_stat() -> impl Strategy<Value = BattleStat> {
    prop::sample::select(BattleStat::ALL.to_vec())
}

fn any_tag() -> impl Strategy<Value = BattlerTagKind> {
    prop::sample::select(vec![
        BattlerTagKind::Confused,
        BattlerTagKind::Taunted,
        BattlerTagKind::Seeded,
        BattlerTagKind::FocusEnergy,
        BattlerTagKind::Minimized,
    ])
}

proptest! {
    #[test]
    fn stages_stay_in_range(deltas in prop::collection::vec((any_stat(), -12i8..=12), 0..40)) {
        let (mut battle, a, _) = duel(1);
        for (stat, delta) in deltas {
            let before = battle.combatant(a).stage(stat);
            let room = battle.combatant(a).stage_room(stat, delta);
            let applied = battle.combatant_mut(a).change_stage(stat, delta);
            let after = battle.combatant(a).stage(stat);
            prop_assert_eq!(applied, room);
            prop_assert_eq!(after - before, applied);
            prop_assert!((-6..=6).contains(&after));
        }
    }

    #[test]
    fn non_stacking_tags_are_never_duplicated(kind in any_tag(), repeats in 1usize..6) {
        let (mut battle, _, b) = duel(2);
        for _ in 0..repeats {
            add_tag(&mut battle, b, BattlerTag::new(kind), false);
        }
        let copies = battle.combatant(b).tags.iter().filter(|t| t.kind == kind).count();
        prop_assert!(copies <= 1);
    }

    #[test]
    fn zero_chance_never_fires_and_certain_always_fires(seed in any::<u64>()) {
        let mv = Move::builder(MoveId::Tackle).build();
        let mut rng = BattleRng::new(seed);
        let never = MoveEffect::new(EffectKind::Status(StatusKind::Burn)).chance(0);
        let always = MoveEffect::new(EffectKind::Status(StatusKind::Burn)).chance(100);
        for _ in 0..16 {
            prop_assert!(!never.roll(&mv, &mut rng));
            prop_assert!(always.roll(&mv, &mut rng));
        }
    }

    #[test]
    fn power_is_deterministic(seed in any::<u64>(), atk_stage in -6i8..=6) {
        let (mut battle, a, b) = duel(seed);
        battle.combatant_mut(a).change_stage(BattleStat::Atk, atk_stage);
        for id in [MoveId::Tackle, MoveId::Flamethrower] {
            let first = calculate_battle_power(&battle, a, b, id.get());
            let second = calculate_battle_power(&battle, a, b, id.get());
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn simulation_never_mutates(seed in any::<u64>(), move_index in 0usize..3) {
        let (mut battle, a, b) = duel(seed);
        let before = battle.snapshot();
        let mv = battle.combatant(a).moveset[move_index].id.get();
        let outcome = simulate_move(&mut battle, a, mv, None);
        prop_assert_ne!(outcome.result, MoveResult::Pending);
        prop_assert_eq!(battle.snapshot(), before);
        prop_assert!(battle.take_events().is_empty());
        prop_assert_eq!(battle.combatant(b).hp, battle.combatant(b).max_hp());
    }
}
