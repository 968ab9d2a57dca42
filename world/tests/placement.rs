use brewhouse_core::{
    CellCoord, CellOffset, Command, DefinitionId, Direction, Event, Facing, InteractionContext,
    MachineDefinition, MachineId, PlacementError, PlacementRecord, RecordSkipReason, RemovalError,
    StationKind, StationSpec,
};
use brewhouse_world::{apply, query, FloorLayout, MachineCatalog, Purse, World, WorldBuilder};
use glam::Vec3;

fn tap_line() -> MachineDefinition {
    MachineDefinition {
        id: DefinitionId::new("tap_line"),
        name: "Tap line".to_owned(),
        cost: 100,
        occupied: vec![CellOffset::new(0, 0)],
        affected: vec![
            CellOffset::new(0, 1),
            CellOffset::new(0, 2),
            CellOffset::new(0, 3),
        ],
        vertical_offset: 0.0,
        stations: vec![StationSpec {
            label: "Pour a pint".to_owned(),
            priority: 1,
            kind: StationKind::Market,
        }],
    }
}

fn bench() -> MachineDefinition {
    MachineDefinition {
        id: DefinitionId::new("bench"),
        name: "Bench".to_owned(),
        cost: 30,
        occupied: vec![CellOffset::new(0, 0), CellOffset::new(1, 0)],
        affected: vec![CellOffset::new(0, -1)],
        vertical_offset: 0.25,
        stations: vec![StationSpec {
            label: "Open drawer".to_owned(),
            priority: 0,
            kind: StationKind::Storage,
        }],
    }
}

fn world_with(balance: u64) -> World {
    WorldBuilder::new()
        .layout(FloorLayout::new(10, 10, 1.0, Vec3::ZERO))
        .catalog(MachineCatalog::new([tap_line(), bench()]))
        .wallet(Purse::new(balance))
        .player(CellCoord::new(5, 5), Direction::North)
        .build()
}

fn place(world: &mut World, id: &str, anchor: CellCoord, facing: Facing) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::PlaceMachine {
            definition: DefinitionId::new(id),
            anchor,
            facing,
        },
        &mut events,
    );
    events
}

fn registrations(world: &World) -> Vec<(CellCoord, Vec<brewhouse_core::InteractableId>)> {
    query::layout(world)
        .cells()
        .map(|cell| (cell, query::interactables_at(world, cell)))
        .filter(|(_, handles)| !handles.is_empty())
        .collect()
}

#[test]
fn end_to_end_commit_in_front_of_agent() {
    let mut world = world_with(500);
    let pose = query::player_pose(&world);
    let anchor = pose.facing_cell();
    let facing = pose.facing.facing().compose(Facing::IDENTITY);
    assert_eq!(anchor, CellCoord::new(5, 6));

    let events = place(&mut world, "tap_line", anchor, facing);

    assert_eq!(
        events,
        vec![Event::MachinePlaced {
            machine: MachineId::new(0),
            definition: DefinitionId::new("tap_line"),
            anchor,
            facing: Facing::IDENTITY,
        }]
    );
    assert_eq!(query::occupied_cells(&world), vec![CellCoord::new(5, 6)]);
    assert!(query::is_occupied(&world, CellCoord::new(5, 6)));
    assert!(!query::is_occupied(&world, CellCoord::new(5, 7)));

    let affected = [CellCoord::new(5, 7), CellCoord::new(5, 8), CellCoord::new(5, 9)];
    let handles = query::interactables_at(&world, affected[0]);
    assert_eq!(handles.len(), 1);
    for cell in affected {
        assert_eq!(query::interactables_at(&world, cell), handles);
    }
    assert_eq!(query::interactable_cells(&world, handles[0]), affected.to_vec());
    assert_eq!(registrations(&world).len(), 3);
    assert_eq!(query::balance(&world), 400);
}

#[test]
fn rotated_commit_uses_composed_facing() {
    let mut world = world_with(500);
    let facing = Direction::East.facing().compose(Facing::from_steps(1));
    assert_eq!(facing, Facing::from_steps(2));

    let events = place(&mut world, "bench", CellCoord::new(4, 4), facing);

    assert!(matches!(events[0], Event::MachinePlaced { .. }));
    assert_eq!(
        query::occupied_cells(&world),
        vec![CellCoord::new(3, 4), CellCoord::new(4, 4)]
    );
    assert_eq!(query::interactables_at(&world, CellCoord::new(4, 5)).len(), 1);
}

#[test]
fn commit_with_invalid_cell_changes_nothing() {
    let mut world = world_with(500);
    let _ = place(&mut world, "tap_line", CellCoord::new(2, 2), Facing::IDENTITY);

    let occupied = query::occupied_cells(&world);
    let registered = registrations(&world);
    let balance = query::balance(&world);

    let overlapping = place(&mut world, "bench", CellCoord::new(1, 2), Facing::IDENTITY);
    let outside = place(&mut world, "bench", CellCoord::new(9, 0), Facing::IDENTITY);

    assert_eq!(
        overlapping,
        vec![Event::PlacementRejected {
            definition: DefinitionId::new("bench"),
            anchor: CellCoord::new(1, 2),
            reason: PlacementError::Occupied,
        }]
    );
    assert_eq!(
        outside,
        vec![Event::PlacementRejected {
            definition: DefinitionId::new("bench"),
            anchor: CellCoord::new(9, 0),
            reason: PlacementError::OutOfBounds,
        }]
    );
    assert_eq!(query::occupied_cells(&world), occupied);
    assert_eq!(registrations(&world), registered);
    assert_eq!(query::balance(&world), balance);
    assert_eq!(query::machine_view(&world).len(), 1);
}

#[test]
fn unaffordable_commit_keeps_balance() {
    let mut world = world_with(99);

    let events = place(&mut world, "tap_line", CellCoord::new(5, 6), Facing::IDENTITY);

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            definition: DefinitionId::new("tap_line"),
            anchor: CellCoord::new(5, 6),
            reason: PlacementError::InsufficientFunds,
        }]
    );
    assert_eq!(query::balance(&world), 99);
    assert_eq!(query::occupied_count(&world), 0);
    assert!(registrations(&world).is_empty());
}

#[test]
fn unknown_definition_is_rejected() {
    let mut world = world_with(500);
    let events = place(&mut world, "still", CellCoord::new(1, 1), Facing::IDENTITY);
    assert!(matches!(
        events[..],
        [Event::PlacementRejected {
            reason: PlacementError::UnknownDefinition,
            ..
        }]
    ));
}

#[test]
fn removal_inverts_registration() {
    let mut world = world_with(500);
    let _ = place(&mut world, "bench", CellCoord::new(3, 3), Facing::IDENTITY);
    let machine = query::machine_at(&world, CellCoord::new(4, 3)).expect("bench placed");

    let mut events = Vec::new();
    apply(&mut world, Command::RemoveMachine { machine }, &mut events);
    apply(&mut world, Command::RemoveMachine { machine }, &mut events);

    assert_eq!(
        events,
        vec![
            Event::MachineRemoved { machine },
            Event::RemovalRejected {
                machine,
                reason: RemovalError::MissingMachine,
            },
        ]
    );
    assert_eq!(query::occupied_count(&world), 0);
    assert!(registrations(&world).is_empty());
    assert_eq!(query::balance(&world), 470);
}

#[test]
fn preview_plan_matches_commit() {
    let mut world = world_with(500);
    let plan = query::footprint_plan(
        &world,
        &DefinitionId::new("bench"),
        CellCoord::new(6, 2),
        Facing::from_steps(3),
    )
    .expect("bench is in the catalog");
    assert!(plan.is_valid());

    let _ = place(&mut world, "bench", CellCoord::new(6, 2), Facing::from_steps(3));

    let snapshot = &query::machine_view(&world)[0];
    assert_eq!(snapshot.occupied, plan.occupied);
    assert_eq!(snapshot.affected, plan.interaction_cells());
    assert_eq!(snapshot.vertical_offset, 0.25);
}

#[test]
fn restore_skips_unknown_and_invalid_records() {
    let mut world = world_with(500);
    let _ = place(&mut world, "tap_line", CellCoord::new(0, 0), Facing::IDENTITY);

    let records = vec![
        PlacementRecord {
            definition: DefinitionId::new("bench"),
            anchor: CellCoord::new(2, 2),
            facing: Facing::IDENTITY,
            vertical_offset: 0.5,
        },
        PlacementRecord {
            definition: DefinitionId::new("retired_still"),
            anchor: CellCoord::new(6, 6),
            facing: Facing::IDENTITY,
            vertical_offset: 0.0,
        },
        PlacementRecord {
            definition: DefinitionId::new("tap_line"),
            anchor: CellCoord::new(3, 2),
            facing: Facing::IDENTITY,
            vertical_offset: 0.0,
        },
    ];

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::RestoreLayout {
            records: records.clone(),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::RecordSkipped {
                definition: DefinitionId::new("retired_still"),
                anchor: CellCoord::new(6, 6),
                reason: RecordSkipReason::UnknownDefinition,
            },
            Event::RecordSkipped {
                definition: DefinitionId::new("tap_line"),
                anchor: CellCoord::new(3, 2),
                reason: RecordSkipReason::InvalidFootprint(PlacementError::Occupied),
            },
            Event::LayoutRestored {
                restored: 1,
                skipped: 2,
            },
        ]
    );
    assert_eq!(query::placement_records(&world), vec![records[0].clone()]);
    assert!(!query::is_occupied(&world, CellCoord::new(0, 0)));
    assert_eq!(query::balance(&world), 400);
}

#[test]
fn records_rebuild_identical_state_in_a_fresh_world() {
    let mut original = world_with(500);
    let _ = place(&mut original, "tap_line", CellCoord::new(1, 1), Facing::from_steps(1));
    let _ = place(&mut original, "bench", CellCoord::new(5, 5), Facing::from_steps(2));

    let mut restored = world_with(0);
    let mut events = Vec::new();
    apply(
        &mut restored,
        Command::RestoreLayout {
            records: query::placement_records(&original),
        },
        &mut events,
    );

    assert_eq!(
        events.last(),
        Some(&Event::LayoutRestored {
            restored: 2,
            skipped: 0,
        })
    );
    assert_eq!(
        query::occupied_cells(&restored),
        query::occupied_cells(&original)
    );
    assert_eq!(
        query::placement_records(&restored),
        query::placement_records(&original)
    );
    let cells = |world: &World| -> Vec<CellCoord> {
        registrations(world).into_iter().map(|(cell, _)| cell).collect()
    };
    assert_eq!(cells(&restored), cells(&original));
}

#[test]
fn expanding_keeps_machines_at_their_world_position() {
    let mut world = world_with(500);
    let _ = place(&mut world, "bench", CellCoord::new(0, 1), Facing::IDENTITY);
    let machine = query::machine_at(&world, CellCoord::new(0, 1)).expect("bench placed");
    let before = query::machine_position(&world, machine).expect("machine exists");

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ExpandGarage {
            right: 0,
            left: 2,
            up: 0,
            down: 1,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::GarageExpanded {
            width: 12,
            height: 11,
            shift: CellOffset::new(2, 1),
        }]
    );
    assert_eq!(query::layout(&world).origin(), Vec3::new(-2.0, 0.0, -1.0));
    assert_eq!(
        query::occupied_cells(&world),
        vec![CellCoord::new(2, 2), CellCoord::new(3, 2)]
    );
    assert_eq!(query::interactables_at(&world, CellCoord::new(2, 1)).len(), 1);

    let moved = query::machine_at(&world, CellCoord::new(2, 2)).expect("bench survived");
    assert_eq!(query::machine_position(&world, moved), Some(before));
    assert_eq!(query::player_pose(&world).cell, CellCoord::new(7, 6));
}

#[test]
fn footprints_past_the_coordinate_range_are_out_of_bounds() {
    let mut world = world_with(500);
    let requests = [
        (CellCoord::new(i32::MAX, 0), Facing::IDENTITY),
        (CellCoord::new(i32::MIN, 3), Facing::from_steps(2)),
        (CellCoord::new(4, i32::MAX), Facing::from_steps(3)),
    ];

    for (anchor, facing) in requests {
        let events = place(&mut world, "bench", anchor, facing);
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                definition: DefinitionId::new("bench"),
                anchor,
                reason: PlacementError::OutOfBounds,
            }]
        );
    }

    assert!(query::occupied_cells(&world).is_empty());
    assert!(query::machine_view(&world).is_empty());
    assert_eq!(query::balance(&world), 500);
}

#[test]
fn expanding_keeps_machine_and_station_ids() {
    let mut world = world_with(500);
    let _ = place(&mut world, "bench", CellCoord::new(0, 1), Facing::IDENTITY);
    let machine = query::machine_at(&world, CellCoord::new(0, 1)).expect("bench placed");
    let station = query::interactables_at(&world, CellCoord::new(0, 0));
    assert_eq!(station.len(), 1);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ExpandGarage {
            right: 0,
            left: 1,
            up: 0,
            down: 1,
        },
        &mut events,
    );

    assert_eq!(query::machine_at(&world, CellCoord::new(1, 2)), Some(machine));
    assert_eq!(query::interactables_at(&world, CellCoord::new(1, 1)), station);
    assert_eq!(
        query::interactable_cells(&world, station[0]),
        vec![CellCoord::new(1, 1)]
    );

    events.clear();
    apply(
        &mut world,
        Command::Interact {
            cell: CellCoord::new(1, 1),
            context: InteractionContext {
                actor_cell: CellCoord::new(1, 0),
                actor_facing: Direction::North,
            },
        },
        &mut events,
    );
    assert!(matches!(
        events[..],
        [Event::Interacted { interactable, .. }] if interactable == station[0]
    ));

    events.clear();
    apply(&mut world, Command::RemoveMachine { machine }, &mut events);
    assert_eq!(events, vec![Event::MachineRemoved { machine }]);
    assert!(query::occupied_cells(&world).is_empty());
    assert!(query::interactables_at(&world, CellCoord::new(1, 1)).is_empty());
}

#[test]
fn oversized_expansion_is_capped_and_keeps_machines() {
    let mut world = world_with(500);
    let _ = place(&mut world, "bench", CellCoord::new(0, 1), Facing::IDENTITY);
    let machine = query::machine_at(&world, CellCoord::new(0, 1)).expect("bench placed");

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ExpandGarage {
            right: 0,
            left: u32::MAX,
            up: 0,
            down: 0,
        },
        &mut events,
    );

    let shift = i32::MAX - 11;
    assert_eq!(
        events,
        vec![Event::GarageExpanded {
            width: i32::MAX as u32 - 1,
            height: 10,
            shift: CellOffset::new(shift, 0),
        }]
    );
    assert_eq!(
        query::occupied_cells(&world),
        vec![CellCoord::new(shift, 1), CellCoord::new(shift + 1, 1)]
    );
    assert_eq!(query::machine_at(&world, CellCoord::new(shift, 1)), Some(machine));
}

#[test]
fn expanding_right_keeps_origin_and_cells() {
    let mut world = world_with(500);
    let _ = place(&mut world, "tap_line", CellCoord::new(9, 0), Facing::IDENTITY);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ExpandGarage {
            right: 2,
            left: 0,
            up: 0,
            down: 0,
        },
        &mut events,
    );

    let layout = query::layout(&world);
    assert_eq!(layout.width(), 12);
    assert_eq!(layout.origin(), Vec3::ZERO);
    assert_eq!(query::occupied_cells(&world), vec![CellCoord::new(9, 0)]);
}

#[test]
fn clearing_removes_all_spatial_content() {
    let mut world = world_with(500);
    let _ = place(&mut world, "bench", CellCoord::new(3, 3), Facing::IDENTITY);
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::SpawnRoamer {
            cell: CellCoord::new(7, 7),
        },
        &mut events,
    );
    apply(&mut world, Command::ClearGarage, &mut events);

    assert_eq!(events.last(), Some(&Event::GarageCleared));
    assert_eq!(query::occupied_count(&world), 0);
    assert!(registrations(&world).is_empty());
    assert!(query::machine_view(&world).is_empty());
    assert!(query::roamer_view(&world).into_vec().is_empty());
}
