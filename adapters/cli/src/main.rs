#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that lays out and simulates a garage brewery floor.

mod floor_plan;
mod layout_transfer;

use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use brewhouse_core::{CellCoord, Command, DefinitionId, Direction, Event, Facing};
use brewhouse_system_roaming::Roaming;
use brewhouse_world::{apply, query, GarageConfig, World};
use clap::Parser;
use thiserror::Error;

use crate::layout_transfer::GarageLayoutSnapshot;

/// Simulated time advanced by a single tick.
const FRAME: Duration = Duration::from_millis(100);

/// Lays out machines on a garage floor and simulates its roaming visitors.
#[derive(Debug, Parser)]
#[command(name = "brewhouse", version)]
struct Cli {
    /// TOML configuration describing the floor, player, roamers and catalog.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Layout transfer string restored before any placement.
    #[arg(long, value_name = "STRING")]
    layout: Option<String>,
    /// Machine to place, as `ID@X,Y,FACING` (facing is N, E, S, W or 0-3).
    #[arg(long = "place", value_name = "ID@X,Y,FACING")]
    places: Vec<PlaceRequest>,
    /// Number of simulation ticks to run after placing.
    #[arg(long, default_value_t = 0)]
    ticks: u32,
    /// Prints the layout transfer string of the final floor.
    #[arg(long)]
    export: bool,
    /// Lists the placeable machines before laying out the floor.
    #[arg(long)]
    catalog: bool,
}

/// Placement requested on the command line.
#[derive(Clone, Debug, PartialEq)]
struct PlaceRequest {
    definition: DefinitionId,
    anchor: CellCoord,
    facing: Facing,
}

/// Errors produced while parsing a `--place` argument.
#[derive(Debug, Error, PartialEq, Eq)]
enum PlaceRequestError {
    #[error("expected ID@X,Y,FACING, got '{0}'")]
    Malformed(String),
    #[error("'{0}' is not a valid coordinate")]
    Coordinate(String),
    #[error("'{0}' is not a facing; use N, E, S, W or 0-3")]
    Facing(String),
}

impl FromStr for PlaceRequest {
    type Err = PlaceRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || PlaceRequestError::Malformed(value.to_owned());
        let (id, placement) = value.split_once('@').ok_or_else(malformed)?;
        let mut fields = placement.split(',');
        let (Some(x), Some(y), Some(facing), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };
        if id.trim().is_empty() {
            return Err(malformed());
        }

        let coordinate = |field: &str| {
            field
                .trim()
                .parse::<i32>()
                .map_err(|_| PlaceRequestError::Coordinate(field.to_owned()))
        };

        Ok(Self {
            definition: DefinitionId::new(id.trim()),
            anchor: CellCoord::new(coordinate(x)?, coordinate(y)?),
            facing: parse_facing(facing.trim())?,
        })
    }
}

fn parse_facing(value: &str) -> Result<Facing, PlaceRequestError> {
    let direction = match value.to_ascii_uppercase().as_str() {
        "N" | "NORTH" => Some(Direction::North),
        "E" | "EAST" => Some(Direction::East),
        "S" | "SOUTH" => Some(Direction::South),
        "W" | "WEST" => Some(Direction::West),
        _ => None,
    };
    if let Some(direction) = direction {
        return Ok(direction.facing());
    }

    match value.parse::<u8>() {
        Ok(steps) if steps < 4 => Ok(Facing::from_steps(i32::from(steps))),
        _ => Err(PlaceRequestError::Facing(value.to_owned())),
    }
}

/// Entry point for the brewhouse command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GarageConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => GarageConfig::default(),
    };
    let snapshot = cli
        .layout
        .as_deref()
        .map(GarageLayoutSnapshot::decode)
        .transpose()
        .context("failed to decode --layout")?;
    if let Some(snapshot) = &snapshot {
        fit_floor(&mut config, snapshot)?;
    }

    let mut world = World::from_config(&config);
    println!("{}", query::welcome_banner(&world));
    if cli.catalog {
        print!("{}", catalog_listing(&world));
    }

    let mut events = Vec::new();
    if let Some(snapshot) = snapshot {
        restore(&mut world, snapshot, &mut events);
    }

    for request in &cli.places {
        place(&mut world, request, &mut events);
    }

    let mut roaming = Roaming::new(config.roaming.seed);
    for _ in 0..cli.ticks {
        let view = query::roamer_view(&world);
        let mut commands = Vec::new();
        roaming.handle(
            &events,
            &view,
            |cell| query::is_walkable(&world, cell),
            &mut commands,
        );

        events.clear();
        for command in commands {
            apply(&mut world, command, &mut events);
        }
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        for event in &events {
            log::debug!("{event:?}");
        }
    }

    print!("{}", floor_plan::render(&world));
    println!("balance: {}", query::balance(&world));

    if cli.export {
        let layout = query::layout(&world);
        let snapshot = GarageLayoutSnapshot {
            width: layout.width(),
            height: layout.height(),
            tile_size: layout.tile_size(),
            records: query::placement_records(&world),
        };
        println!("{}", snapshot.encode().context("failed to export layout")?);
    }

    Ok(())
}

/// One line per placeable machine: identifier, cost, footprint size and name.
fn catalog_listing(world: &World) -> String {
    query::catalog(world)
        .iter()
        .map(|definition| {
            format!(
                "{:<16} {:>5}  {} cells  {}\n",
                definition.id.as_str(),
                definition.cost,
                definition.occupied.len(),
                definition.name
            )
        })
        .collect()
}

/// Sizes the configured floor after the snapshot it is about to restore.
fn fit_floor(config: &mut GarageConfig, snapshot: &GarageLayoutSnapshot) -> Result<()> {
    if !snapshot.tile_size.is_finite() || snapshot.tile_size <= 0.0 {
        bail!("layout tile size {} is not positive", snapshot.tile_size);
    }
    config.garage.width = snapshot.width;
    config.garage.height = snapshot.height;
    config.garage.tile_size = snapshot.tile_size;
    Ok(())
}

/// Replays the snapshot's records and reports what was skipped.
fn restore(world: &mut World, snapshot: GarageLayoutSnapshot, events: &mut Vec<Event>) {
    apply(
        world,
        Command::RestoreLayout {
            records: snapshot.records,
        },
        events,
    );
    for event in events.iter() {
        match event {
            Event::RecordSkipped {
                definition,
                anchor,
                reason,
            } => println!("skipped {definition} at {anchor:?}: {reason:?}"),
            Event::LayoutRestored { restored, skipped } => {
                println!("restored {restored} machines ({skipped} skipped)");
            }
            _ => {}
        }
    }
}

/// Commits a single placement and reports the outcome.
fn place(world: &mut World, request: &PlaceRequest, events: &mut Vec<Event>) {
    let start = events.len();
    apply(
        world,
        Command::PlaceMachine {
            definition: request.definition.clone(),
            anchor: request.anchor,
            facing: request.facing,
        },
        events,
    );

    for event in &events[start..] {
        match event {
            Event::MachinePlaced {
                machine,
                definition,
                anchor,
                facing,
            } => println!(
                "placed {definition} #{} at {anchor:?} facing {}",
                machine.get(),
                facing.steps()
            ),
            Event::PlacementRejected {
                definition,
                anchor,
                reason,
            } => println!("cannot place {definition} at {anchor:?}: {reason:?}"),
            _ => {}
        }
    }
}
