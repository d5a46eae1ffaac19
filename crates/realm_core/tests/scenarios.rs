//! End-to-end scenarios over the public simulation API.

use realm_core::conquest::cooldown_for;
use realm_core::prelude::*;
use realm_core::progression;
use realm_test_utils::fixtures::{arena, seeded_with_radius, ArenaSpec, ARENA_NATION};

#[test]
fn radius_one_island_has_seven_land_tiles() {
    for seed in 0..20 {
        let sim = seeded_with_radius(seed, 1);
        let island = sim.island();
        assert_eq!(island.land_count(), 7);
        assert_eq!(island.count_of(Owner::Player), 1);
        assert!(island
            .tiles()
            .filter(|t| t.is_land())
            .all(|t| t.is_player() || t.nation().is_some()));
        // Three rings of sea around the land.
        assert_eq!(island.len(), 61);
    }
}

#[test]
fn overwhelming_attack_eliminates_nation() {
    let mut sim = arena(&ArenaSpec {
        player_troops: 50.0,
        t1_bonus: 49.0,
        enemy_stats: NationStats::new(2.0, 2.0, 15.0),
        enemy_troops: 10.0 / 6.0,
        ..ArenaSpec::default()
    });
    assert!((sim.player_effective_stats().strength - 100.0).abs() < f64::EPSILON);
    sim.start_attack(Some(ARENA_NATION)).unwrap();

    let mut conquered = false;
    for _ in 0..10 {
        let tick = sim.tick();
        if tick
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::NationConquered { .. }))
        {
            conquered = true;
            break;
        }
    }

    assert!(conquered);
    assert!(sim.game_state().attacking.is_none());
    assert!(sim.game_state().selected.is_none());
    assert_eq!(sim.game_state().total_conquests, 6);
    assert!(sim.game_state().island_cleared);
    assert!(sim.nation(ARENA_NATION).is_none());
}

#[test]
fn fractional_troops_after_loss_become_one() {
    let mut sim = arena(&ArenaSpec {
        player_troops: 1.0,
        enemy_troops: 0.1,
        ..ArenaSpec::default()
    });
    sim.start_attack(Some(ARENA_NATION)).unwrap();
    let tick = sim.tick();

    assert!(tick
        .events
        .contains(&GameEvent::Defeated { nation: ARENA_NATION }));
    assert!(sim.game_state().attacking.is_none());
    // Defeat sets 1, then this tick's production is added on top.
    let troops = sim.resource(ResourceKind::Troops).value;
    assert!((troops - 1.0 - tick.deltas.troop_gain).abs() < 1e-9);
    assert_eq!(sim.island().count_of(Owner::Nation(ARENA_NATION)), 6);
}

#[test]
fn succession_with_twenty_tiles() {
    let balance = BalanceConfig::default().progression;
    let mut state = GameState::new(8);
    let before = state.t1_bonus;
    progression::apply_succession(&mut state, 20, &balance);
    assert!((state.t1_bonus - before - 0.20).abs() < 1e-12);
    assert_eq!(state.ruler_prestige, 1);
}

#[test]
fn succession_through_simulation_keeps_prestige() {
    // Six player tiles meet the 5-tile minimum on a radius-1 island.
    let mut sim = arena(&ArenaSpec {
        enemy_tiles: 1,
        ..ArenaSpec::default()
    });
    assert!(sim.upgrade_book().is_visible(UpgradeId::Succession));
    assert_eq!(sim.player_tile_count(), 6);

    let event = sim.purchase_upgrade(UpgradeId::Succession).unwrap();
    let Some(GameEvent::Succession {
        ruler_prestige,
        t1_bonus,
    }) = event
    else {
        panic!("expected a succession event, got {event:?}");
    };
    assert_eq!(ruler_prestige, 1);
    assert!((t1_bonus - 0.06).abs() < 1e-12);
    assert_eq!(sim.game_state().ruler_prestige, 1);
    assert!((sim.resource(ResourceKind::RulerPrestige).value - 1.0).abs() < f64::EPSILON);
    assert!(sim.resource(ResourceKind::RulerPrestige).visible);
    // A fresh island replaced the arena.
    assert_eq!(sim.player_tile_count(), 1);
    assert!(sim.ruler_name().ends_with(" II"));
}

#[test]
fn auto_conquest_cooldown_at_war_council_three() {
    let balance = BalanceConfig::default().progression;
    assert_eq!(cooldown_for(3, &balance), 3);
}

#[test]
fn auto_conquest_picks_target_and_waits() {
    let spec = ArenaSpec {
        enemy_tiles: 3,
        enemy_troops: 200.0,
        enemy_max_troops: 200.0,
        ..ArenaSpec::default()
    };
    let mut locked = arena(&spec);
    assert_eq!(locked.set_auto_conquest(true), Err(GameError::AutoConquestLocked));
    assert_eq!(locked.set_auto_conquest(false), Ok(()));

    let mut sim = arena(&ArenaSpec {
        dynasty: &[DynastyNodeId::Legacy, DynastyNodeId::AutoConquest],
        ..spec
    });
    sim.set_auto_conquest(true).unwrap();

    let first = sim.tick();
    assert_eq!(
        first.events,
        vec![
            GameEvent::AutoTargetChosen { nation: ARENA_NATION },
            GameEvent::AttackStarted { nation: ARENA_NATION },
        ]
    );
    assert_eq!(sim.game_state().attacking, Some(ARENA_NATION));
    assert_eq!(sim.game_state().auto_cooldown, 5);

    sim.tick();
    assert_eq!(sim.game_state().auto_cooldown, 4);
}

#[test]
fn set_sail_requires_cleared_island() {
    let mut sim = arena(&ArenaSpec {
        t1_bonus: 49.0,
        enemy_troops: 1.0,
        ..ArenaSpec::default()
    });
    assert_eq!(sim.set_sail(), Err(GameError::IslandNotCleared));

    assert_eq!(sim.start_attack(None), Err(GameError::NoSelection));
    sim.start_attack(Some(ARENA_NATION)).unwrap();
    while !sim.game_state().island_cleared {
        sim.tick();
    }
    let event = sim.set_sail().unwrap();
    assert_eq!(event, GameEvent::SetSail { dynasty_points: 1.0 });
    assert_eq!(sim.game_state().island_prestige, 1);
    assert_eq!(sim.game_state().ruler_prestige, 0);
    assert!(sim.game_state().t1_bonus.abs() < f64::EPSILON);
    assert!(sim.resource(ResourceKind::DynastyPoints).visible);
    assert!(sim.ruler_name().starts_with("Count Arthur"));
    assert!(sim.purchase_dynasty(DynastyNodeId::Legacy).is_ok());
    assert_eq!(
        sim.purchase_dynasty(DynastyNodeId::Legacy),
        Err(GameError::DynastyNodeOwned(DynastyNodeId::Legacy))
    );
}

#[test]
fn legacy_pays_for_population_on_set_sail() {
    let mut sim = arena(&ArenaSpec {
        enemy_tiles: 0,
        player_pop: 2_500.0,
        dynasty: &[DynastyNodeId::Legacy],
        ..ArenaSpec::default()
    });
    assert!(sim.game_state().island_cleared);

    let event = sim.set_sail().unwrap();
    assert_eq!(event, GameEvent::SetSail { dynasty_points: 3.0 });
    assert!((sim.resource(ResourceKind::DynastyPoints).value - 3.0).abs() < f64::EPSILON);

    let mut plain = arena(&ArenaSpec {
        enemy_tiles: 0,
        player_pop: 2_500.0,
        ..ArenaSpec::default()
    });
    assert_eq!(plain.set_sail(), Ok(GameEvent::SetSail { dynasty_points: 1.0 }));
}

#[test]
fn expansion_grows_the_next_island() {
    let mut sim = arena(&ArenaSpec {
        dynasty_points: 4.0,
        ..ArenaSpec::default()
    });
    sim.purchase_dynasty(DynastyNodeId::Legacy).unwrap();
    sim.purchase_dynasty(DynastyNodeId::AutoConquest).unwrap();
    sim.purchase_dynasty(DynastyNodeId::IslandSize).unwrap();
    assert_eq!(sim.game_state().island_radius, 10);
    // The current island keeps its size until the next reset.
    assert_eq!(sim.island().land_count(), 7);

    sim.abdicate();
    // Rings 9 and 10 on top of the default radius-8 island.
    assert_eq!(sim.island().land_count(), 1 + 3 * 8 * 9 + 6 * 9 + 6 * 10);
    assert_eq!(sim.game_state().island_radius, 10);
}

#[test]
fn standing_army_garrisons_origin_only() {
    let mut sim = arena(&ArenaSpec {
        dynasty_points: 3.0,
        ..ArenaSpec::default()
    });
    sim.purchase_dynasty(DynastyNodeId::Legacy).unwrap();
    sim.purchase_dynasty(DynastyNodeId::AutoConquest).unwrap();
    sim.purchase_dynasty(DynastyNodeId::StartingTroops).unwrap();
    assert!(sim.resource(ResourceKind::DynastyPoints).value.abs() < f64::EPSILON);

    sim.abdicate();
    let origin = sim.get_tile(Hex::ORIGIN).unwrap();
    assert!((origin.troops - 50.0).abs() < f64::EPSILON);
    assert!((origin.max_troops - 500.0).abs() < f64::EPSILON);
    // The troop pool resets to the usual 10.
    assert!((sim.resource(ResourceKind::Troops).value - 10.0).abs() < f64::EPSILON);
    assert_eq!(sim.resource(ResourceKind::Troops).cap, Some(200.0));
}
