use crate::items::hooks::ItemHooks;
use crate::items::implementations::*;
use crate::items::ItemId;

pub static ITEM_REGISTRY: [Option<ItemHooks>; ItemId::COUNT] = {
    let mut registry: [Option<ItemHooks>; ItemId::COUNT] = [None; ItemId::COUNT];

    // =========================================================================
    // Type boosters
    // =========================================================================

    let boosters = [
        ItemId::Blackbelt,
        ItemId::Charcoal,
        ItemId::Magnet,
        ItemId::Miracleseed,
        ItemId::Mysticwater,
        ItemId::Nevermeltice,
        ItemId::Silkscarf,
        ItemId::Softsand,
    ];
    let mut i = 0;
    while i < boosters.len() {
        registry[boosters[i] as usize] = Some(ItemHooks {
            on_modify_power: Some(on_modify_power_type_boost),
            ..ItemHooks::NONE
        });
        i += 1;
    }

    // =========================================================================
    // Accuracy
    // =========================================================================

    registry[ItemId::Widelens as usize] = Some(ItemHooks {
        on_modify_accuracy: Some(on_modify_accuracy_wide_lens),
        ..ItemHooks::NONE
    });

    registry[ItemId::Zoomlens as usize] = Some(ItemHooks {
        on_modify_accuracy: Some(on_modify_accuracy_zoom_lens),
        ..ItemHooks::NONE
    });

    registry[ItemId::Brightpowder as usize] = Some(ItemHooks {
        on_defender_accuracy: Some(on_defender_accuracy_bright_powder),
        ..ItemHooks::NONE
    });

    // =========================================================================
    // Battle effects
    // =========================================================================

    registry[ItemId::Scopelens as usize] = Some(ItemHooks {
        on_crit_stage: Some(on_crit_stage_scope_lens),
        ..ItemHooks::NONE
    });

    registry[ItemId::Kingsrock as usize] = Some(ItemHooks {
        on_after_hit: Some(on_after_hit_kings_rock),
        ..ItemHooks::NONE
    });

    registry[ItemId::Quickclaw as usize] = Some(ItemHooks {
        on_bypass_speed: Some(on_bypass_speed_quick_claw),
        ..ItemHooks::NONE
    });

    registry[ItemId::Leftovers as usize] = Some(ItemHooks {
        on_turn_end: Some(on_turn_end_leftovers),
        ..ItemHooks::NONE
    });

    registry
};
