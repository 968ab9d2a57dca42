#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the garage brewery.
//!
//! The world owns the floor layout, the occupancy set, the interactable
//! index, every placed machine and every moving agent. Adapters and systems
//! mutate it exclusively through [`apply`] and read it through [`query`].

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;

use brewhouse_core::{
    rotate_offsets, AgentId, CellCoord, Command, DefinitionId, Direction, Event, Facing,
    FootprintPlan, Interactable, InteractableId, InteractionContext, InteractionOutcome,
    MachineDefinition, MachineId, PlacementError, PlacementRecord, RecordSkipReason, RemovalError,
    Wallet, WELCOME_BANNER,
};

mod config;
mod interactables;
mod layout;
mod machines;
mod motion;
mod occupancy;
mod wallet;

pub use config::{
    default_catalog, ConfigError, EconomyConfig, FloorConfig, GarageConfig, PlayerConfig,
    RoamingConfig,
};
pub use layout::FloorLayout;
pub use machines::MachineCatalog;
pub use wallet::Purse;

use interactables::{InteractableRegistry, RoamerPrompt, Station};
use machines::{MachineRegistry, MachineState};
use motion::{Motion, Player, Roamer, Settle};
use occupancy::OccupancySet;

const DEFAULT_FLOOR_WIDTH: u32 = 10;
const DEFAULT_FLOOR_HEIGHT: u32 = 10;
const DEFAULT_TILE_SIZE: f32 = 1.0;
const DEFAULT_STARTING_BALANCE: u64 = 500;

const DEFAULT_MOVE_DURATION: Duration = Duration::from_millis(250);
const DEFAULT_TURN_DURATION: Duration = Duration::from_millis(100);
const DEFAULT_ROAMER_STEP_DURATION: Duration = Duration::from_millis(600);

#[derive(Clone, Copy, Debug)]
struct Timings {
    player_move: Duration,
    player_turn: Duration,
    roamer_step: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            player_move: DEFAULT_MOVE_DURATION,
            player_turn: DEFAULT_TURN_DURATION,
            roamer_step: DEFAULT_ROAMER_STEP_DURATION,
        }
    }
}

/// Represents the authoritative garage brewery world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    layout: FloorLayout,
    occupancy: OccupancySet,
    interactables: InteractableRegistry,
    machines: MachineRegistry,
    catalog: MachineCatalog,
    wallet: Box<dyn Wallet>,
    player: Player,
    roamers: BTreeMap<AgentId, Roamer>,
    next_agent_id: u32,
    timings: Timings,
    respect_occupancy: bool,
}

impl World {
    /// Creates a 10x10 garage stocked with the default brewery catalog.
    #[must_use]
    pub fn new() -> Self {
        WorldBuilder::new().build()
    }

    /// Wires a world from a validated configuration, spawning its roaming agents.
    #[must_use]
    pub fn from_config(config: &GarageConfig) -> Self {
        let floor = &config.garage;
        let mut world = WorldBuilder::new()
            .layout(FloorLayout::new(
                floor.width,
                floor.height,
                floor.tile_size,
                floor.origin(),
            ))
            .catalog(MachineCatalog::new(config.machines.iter().cloned()))
            .wallet(Purse::new(config.economy.starting_balance))
            .player(config.player.start_cell(), config.player.facing)
            .player_timings(config.player.move_duration(), config.player.turn_duration())
            .roamer_step(config.roaming.step_duration())
            .respect_occupancy(config.roaming.respect_occupancy)
            .build();

        for cell in config.roaming.spawn_cells() {
            if world.spawn_roamer(cell).is_none() {
                log::warn!("configured roamer spawn {cell:?} is not walkable");
            }
        }
        world
    }

    /// Registers an external interactable on the provided cells.
    ///
    /// The world owns the object until [`World::unregister_interactable`] drops it.
    pub fn register_interactable<I>(
        &mut self,
        cells: I,
        interactable: Box<dyn Interactable>,
    ) -> InteractableId
    where
        I: IntoIterator<Item = CellCoord>,
    {
        self.interactables.insert(cells, interactable)
    }

    /// Removes the interactable from every cell and drops it.
    ///
    /// Returns `false` when the handle was not registered; this is not an error.
    pub fn unregister_interactable(&mut self, id: InteractableId) -> bool {
        self.interactables.remove(id)
    }

    /// Removes the interactable from a single cell, keeping its other registrations.
    pub fn unregister_interactable_at(&mut self, id: InteractableId, cell: CellCoord) {
        self.interactables.detach_from(cell, id);
    }

    fn player_cell(&self) -> CellCoord {
        self.layout.world_to_grid(self.player.position)
    }

    fn clear_floor(&mut self) {
        let _ = self.machines.drain();
        self.roamers.clear();
        self.interactables.clear();
        self.occupancy.clear();
    }

    fn configure(&mut self, layout: FloorLayout, out_events: &mut Vec<Event>) {
        let valid_tile = layout.tile_size().is_finite() && layout.tile_size() > 0.0;
        if layout.width() == 0 || layout.height() == 0 || !valid_tile {
            log::warn!(
                "ignoring garage configuration {}x{} with tile size {}",
                layout.width(),
                layout.height(),
                layout.tile_size()
            );
            return;
        }

        let previous_cell = self.player_cell();
        self.clear_floor();
        self.layout = layout;

        let cell = if self.layout.is_inside(previous_cell) {
            previous_cell
        } else {
            CellCoord::new(0, 0)
        };
        self.player = Player::new(self.layout.grid_to_world(cell), self.player.facing);

        out_events.push(Event::GarageConfigured {
            width: self.layout.width(),
            height: self.layout.height(),
        });
    }

    fn expand(&mut self, right: u32, left: u32, up: u32, down: u32, out_events: &mut Vec<Event>) {
        let (layout, shift) = self.layout.expanded(right, left, up, down);
        self.layout = layout;

        self.occupancy.clear();
        for machine in self.machines.iter_mut() {
            machine.translate(shift);
            let _ = self.occupancy.set_occupied(
                &self.layout,
                machine.occupied.iter().copied(),
                true,
            );
        }
        self.interactables.translate(shift);
        for roamer in self.roamers.values_mut() {
            roamer.registered_cell = roamer.registered_cell.map(|cell| cell.offset(shift));
        }

        log::info!(
            "expanded garage to {}x{}, shifted {} machines by {shift:?}",
            self.layout.width(),
            self.layout.height(),
            self.machines.iter().count()
        );

        out_events.push(Event::GarageExpanded {
            width: self.layout.width(),
            height: self.layout.height(),
            shift,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        if self.player.advance(dt) == Settle::Finished {
            out_events.push(Event::PlayerSettled {
                cell: self.player_cell(),
                facing: self.player.facing,
            });
        }

        for roamer in self.roamers.values_mut() {
            let _ = roamer.advance(dt);
            if let Some((from, to)) = sync_roamer(&self.layout, &mut self.interactables, roamer) {
                out_events.push(Event::RoamerCellChanged {
                    agent: roamer.id,
                    from,
                    to,
                });
            }
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if self.player.is_busy() {
            log::debug!("player is still moving, ignoring {direction:?}");
            return;
        }

        if self.player.facing != direction {
            self.player.motion = Some(Motion::turn(direction, self.timings.player_turn));
            out_events.push(Event::PlayerTurning { toward: direction });
            return;
        }

        let from = self.player_cell();
        let to = from.step(direction);
        if !self.layout.is_inside(to) || self.occupancy.is_occupied(to) {
            out_events.push(Event::PlayerBlocked { direction });
            return;
        }

        self.player.motion = Some(Motion::walk(
            self.player.position,
            self.layout.grid_to_world(to),
            self.timings.player_move,
        ));
        out_events.push(Event::PlayerWalking { from, to });
    }

    fn place_machine(
        &mut self,
        definition_id: DefinitionId,
        anchor: CellCoord,
        facing: Facing,
        out_events: &mut Vec<Event>,
    ) {
        let mut reject = |reason: PlacementError| {
            log::debug!("rejected placement of `{definition_id}` at {anchor:?}: {reason:?}");
            out_events.push(Event::PlacementRejected {
                definition: definition_id.clone(),
                anchor,
                reason,
            });
        };

        let Some(definition) = self.catalog.get(&definition_id).cloned() else {
            reject(PlacementError::UnknownDefinition);
            return;
        };

        let plan = plan_footprint(&self.layout, &self.occupancy, &definition, anchor, facing);
        if let Some(reason) = plan.rejection() {
            reject(reason);
            return;
        }

        if self.wallet.balance() < definition.cost || !self.wallet.debit(definition.cost) {
            reject(PlacementError::InsufficientFunds);
            return;
        }

        let machine = self.install_machine(&definition, plan, definition.vertical_offset);
        out_events.push(Event::MachinePlaced {
            machine,
            definition: definition_id,
            anchor,
            facing,
        });
    }

    fn remove_machine(&mut self, machine: MachineId, out_events: &mut Vec<Event>) {
        match self.machines.remove(machine) {
            Some(state) => {
                self.uninstall_machine(state);
                out_events.push(Event::MachineRemoved { machine });
            }
            None => out_events.push(Event::RemovalRejected {
                machine,
                reason: RemovalError::MissingMachine,
            }),
        }
    }

    fn restore_layout(&mut self, records: Vec<PlacementRecord>, out_events: &mut Vec<Event>) {
        for machine in self.machines.drain() {
            self.uninstall_machine(machine);
        }

        let (restored, skipped) = self.replay(records, out_events);
        log::info!("restored {restored} machines, skipped {skipped} records");
        out_events.push(Event::LayoutRestored { restored, skipped });
    }

    fn replay(
        &mut self,
        records: Vec<PlacementRecord>,
        out_events: &mut Vec<Event>,
    ) -> (usize, usize) {
        let mut restored = 0;
        let mut skipped = 0;
        for record in records {
            match self.replay_record(&record) {
                Ok(_) => restored += 1,
                Err(reason) => {
                    skipped += 1;
                    log::warn!(
                        "skipping placement record `{}` at {:?}: {reason:?}",
                        record.definition,
                        record.anchor
                    );
                    out_events.push(Event::RecordSkipped {
                        definition: record.definition,
                        anchor: record.anchor,
                        reason,
                    });
                }
            }
        }
        (restored, skipped)
    }

    fn replay_record(&mut self, record: &PlacementRecord) -> Result<MachineId, RecordSkipReason> {
        let definition = self
            .catalog
            .get(&record.definition)
            .cloned()
            .ok_or(RecordSkipReason::UnknownDefinition)?;
        let plan = plan_footprint(
            &self.layout,
            &self.occupancy,
            &definition,
            record.anchor,
            record.facing,
        );
        if let Some(reason) = plan.rejection() {
            return Err(RecordSkipReason::InvalidFootprint(reason));
        }
        Ok(self.install_machine(&definition, plan, record.vertical_offset))
    }

    /// Occupies the footprint and registers one station per `StationSpec` on the interaction cells.
    fn install_machine(
        &mut self,
        definition: &MachineDefinition,
        plan: FootprintPlan,
        vertical_offset: f32,
    ) -> MachineId {
        let id = self.machines.allocate();
        let marked = self
            .occupancy
            .set_occupied(&self.layout, plan.occupied.iter().copied(), true);
        log::debug!("machine {} occupies {marked} cells", id.get());

        let cells = plan.interaction_cells();
        let interactables = definition
            .stations
            .iter()
            .map(|spec| {
                self.interactables
                    .insert(cells.iter().copied(), Box::new(Station::new(spec.clone())))
            })
            .collect();

        self.machines.insert(MachineState {
            id,
            definition: definition.id.clone(),
            anchor: plan.anchor,
            facing: plan.facing,
            occupied: plan.occupied,
            affected: cells,
            vertical_offset,
            interactables,
        });
        id
    }

    fn uninstall_machine(&mut self, machine: MachineState) {
        let _ = self
            .occupancy
            .set_occupied(&self.layout, machine.occupied, false);
        for id in machine.interactables {
            let _ = self.interactables.remove(id);
        }
    }

    fn spawn_roamer(&mut self, cell: CellCoord) -> Option<AgentId> {
        if !walkable(&self.layout, &self.occupancy, self.respect_occupancy, cell) {
            log::debug!("cannot spawn roamer on {cell:?}");
            return None;
        }

        let agent = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.wrapping_add(1);

        let interactable = self
            .interactables
            .insert(std::iter::empty(), Box::new(RoamerPrompt::new(agent)));
        let mut roamer = Roamer::new(agent, self.layout.grid_to_world(cell), interactable);
        let _ = sync_roamer(&self.layout, &mut self.interactables, &mut roamer);
        let _ = self.roamers.insert(agent, roamer);
        Some(agent)
    }

    fn step_roamer(&mut self, agent: AgentId, direction: Direction) {
        let Some(roamer) = self.roamers.get_mut(&agent) else {
            log::debug!("step requested for unknown roamer {}", agent.get());
            return;
        };
        if roamer.is_moving() {
            log::debug!("roamer {} is still moving", agent.get());
            return;
        }

        let from = self.layout.world_to_grid(roamer.position);
        let to = from.step(direction);
        if !walkable(&self.layout, &self.occupancy, self.respect_occupancy, to) {
            log::debug!("roamer {} cannot enter {to:?}", agent.get());
            return;
        }

        roamer.motion = Some(Motion::walk(
            roamer.position,
            self.layout.grid_to_world(to),
            self.timings.roamer_step,
        ));
    }

    fn despawn_roamer(&mut self, agent: AgentId) -> bool {
        let Some(roamer) = self.roamers.remove(&agent) else {
            return false;
        };
        let _ = self.interactables.remove(roamer.interactable);
        true
    }

    fn interact(
        &mut self,
        cell: CellCoord,
        context: InteractionContext,
        out_events: &mut Vec<Event>,
    ) {
        let top = self
            .interactables
            .ranked_at(cell, &context)
            .first()
            .map(|(id, _)| *id);
        let Some((id, interactable)) =
            top.and_then(|id| self.interactables.get_mut(id).map(|entry| (id, entry)))
        else {
            out_events.push(Event::NothingToInteract { cell });
            return;
        };

        let outcome = interactable.interact(&context);
        out_events.push(Event::Interacted {
            cell,
            interactable: id,
            outcome,
        });

        if let InteractionOutcome::ShooRoamer { agent } = outcome {
            if self.despawn_roamer(agent) {
                out_events.push(Event::RoamerDespawned { agent });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit construction-time wiring of the world's collaborators.
#[derive(Debug)]
pub struct WorldBuilder {
    layout: FloorLayout,
    catalog: MachineCatalog,
    wallet: Box<dyn Wallet>,
    player_cell: CellCoord,
    player_facing: Direction,
    timings: Timings,
    respect_occupancy: bool,
}

impl WorldBuilder {
    /// Starts from a 10x10 unit floor, the default catalog and a funded purse.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layout: FloorLayout::new(
                DEFAULT_FLOOR_WIDTH,
                DEFAULT_FLOOR_HEIGHT,
                DEFAULT_TILE_SIZE,
                Vec3::ZERO,
            ),
            catalog: MachineCatalog::new(default_catalog()),
            wallet: Box::new(Purse::new(DEFAULT_STARTING_BALANCE)),
            player_cell: CellCoord::new(0, 0),
            player_facing: Direction::North,
            timings: Timings::default(),
            respect_occupancy: true,
        }
    }

    /// Floor layout the world starts with.
    #[must_use]
    pub fn layout(mut self, layout: FloorLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Machines available for placement and load replay.
    #[must_use]
    pub fn catalog(mut self, catalog: MachineCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Currency collaborator debited by placements.
    #[must_use]
    pub fn wallet(mut self, wallet: impl Wallet + 'static) -> Self {
        self.wallet = Box::new(wallet);
        self
    }

    /// Starting cell and facing of the player.
    #[must_use]
    pub fn player(mut self, cell: CellCoord, facing: Direction) -> Self {
        self.player_cell = cell;
        self.player_facing = facing;
        self
    }

    /// Time the player needs to walk one cell and to turn.
    #[must_use]
    pub fn player_timings(mut self, move_duration: Duration, turn_duration: Duration) -> Self {
        self.timings.player_move = move_duration;
        self.timings.player_turn = turn_duration;
        self
    }

    /// Time a roaming agent needs to walk one cell.
    #[must_use]
    pub fn roamer_step(mut self, duration: Duration) -> Self {
        self.timings.roamer_step = duration;
        self
    }

    /// Whether roaming agents treat occupied cells as unwalkable.
    #[must_use]
    pub fn respect_occupancy(mut self, enabled: bool) -> Self {
        self.respect_occupancy = enabled;
        self
    }

    /// Assembles the world.
    #[must_use]
    pub fn build(self) -> World {
        let player_cell = if self.layout.is_inside(self.player_cell) {
            self.player_cell
        } else {
            log::warn!(
                "player start {:?} lies outside the garage, using (0, 0)",
                self.player_cell
            );
            CellCoord::new(0, 0)
        };
        let player = Player::new(self.layout.grid_to_world(player_cell), self.player_facing);

        World {
            banner: WELCOME_BANNER,
            layout: self.layout,
            occupancy: OccupancySet::new(),
            interactables: InteractableRegistry::new(),
            machines: MachineRegistry::new(),
            catalog: self.catalog,
            wallet: self.wallet,
            player,
            roamers: BTreeMap::new(),
            next_agent_id: 0,
            timings: self.timings,
            respect_occupancy: self.respect_occupancy,
        }
    }
}

impl Default for WorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGarage {
            width,
            height,
            tile_size,
            origin,
        } => world.configure(
            FloorLayout::new(width, height, tile_size, origin),
            out_events,
        ),
        Command::ExpandGarage {
            right,
            left,
            up,
            down,
        } => world.expand(right, left, up, down, out_events),
        Command::ClearGarage => {
            world.clear_floor();
            out_events.push(Event::GarageCleared);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::PlaceMachine {
            definition,
            anchor,
            facing,
        } => world.place_machine(definition, anchor, facing, out_events),
        Command::RemoveMachine { machine } => world.remove_machine(machine, out_events),
        Command::RestoreLayout { records } => world.restore_layout(records, out_events),
        Command::SpawnRoamer { cell } => {
            if let Some(agent) = world.spawn_roamer(cell) {
                out_events.push(Event::RoamerSpawned { agent, cell });
            }
        }
        Command::StepRoamer { agent, direction } => world.step_roamer(agent, direction),
        Command::DespawnRoamer { agent } => {
            if world.despawn_roamer(agent) {
                out_events.push(Event::RoamerDespawned { agent });
            }
        }
        Command::Interact { cell, context } => world.interact(cell, context, out_events),
    }
}

/// Rotates a definition's shapes to `anchor` and `facing` and validates the footprint.
fn plan_footprint(
    layout: &FloorLayout,
    occupancy: &OccupancySet,
    definition: &MachineDefinition,
    anchor: CellCoord,
    facing: Facing,
) -> FootprintPlan {
    let occupied = rotate_offsets(&definition.occupied, anchor, facing);
    let affected = rotate_offsets(&definition.affected, anchor, facing);

    let mut out_of_bounds = Vec::new();
    let mut blocked = Vec::new();
    for cell in &occupied {
        if !layout.is_inside(*cell) {
            out_of_bounds.push(*cell);
        } else if occupancy.is_occupied(*cell) {
            blocked.push(*cell);
        }
    }

    FootprintPlan {
        anchor,
        facing,
        occupied,
        affected,
        out_of_bounds,
        blocked,
    }
}

fn walkable(
    layout: &FloorLayout,
    occupancy: &OccupancySet,
    respect_occupancy: bool,
    cell: CellCoord,
) -> bool {
    layout.is_inside(cell) && !(respect_occupancy && occupancy.is_occupied(cell))
}

/// Re-registers the roamer's interactable when its logical cell changed.
///
/// Returns the previous and current cell when a change was recorded.
fn sync_roamer(
    layout: &FloorLayout,
    interactables: &mut InteractableRegistry,
    roamer: &mut Roamer,
) -> Option<(CellCoord, CellCoord)> {
    let cell = layout.world_to_grid(roamer.position);
    match roamer.registered_cell {
        Some(previous) if previous == cell => None,
        Some(previous) => {
            interactables.detach(roamer.interactable);
            interactables.attach([cell], roamer.interactable);
            roamer.registered_cell = Some(cell);
            Some((previous, cell))
        }
        None => {
            interactables.attach([cell], roamer.interactable);
            roamer.registered_cell = Some(cell);
            None
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;

    use brewhouse_core::{
        rotated_centroid, AgentId, AgentPose, CellCoord, DefinitionId, Facing, FootprintPlan,
        InteractableId, InteractionContext, MachineId, MachineSnapshot, PlacementRecord,
        RoamerSnapshot, RoamerView,
    };

    use super::{plan_footprint, walkable, FloorLayout, MachineCatalog, World};

    /// Top candidate the interaction prompt should present for a cell.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct InteractionPrompt {
        /// Handle that would receive the interaction.
        pub interactable: InteractableId,
        /// Priority the handle reported.
        pub priority: i32,
        /// Prompt text such as "Stir the mash".
        pub description: String,
    }

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the floor layout.
    #[must_use]
    pub fn layout(world: &World) -> &FloorLayout {
        &world.layout
    }

    /// Reports whether the cell lies within the floor bounds.
    #[must_use]
    pub fn is_inside(world: &World, cell: CellCoord) -> bool {
        world.layout.is_inside(cell)
    }

    /// Reports whether a machine footprint blocks the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellCoord) -> bool {
        world.occupancy.is_occupied(cell)
    }

    /// Every occupied cell ordered by column, then row.
    #[must_use]
    pub fn occupied_cells(world: &World) -> Vec<CellCoord> {
        world.occupancy.iter().collect()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(world: &World) -> usize {
        world.occupancy.len()
    }

    /// Reports whether a roaming agent may enter the cell.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellCoord) -> bool {
        walkable(
            &world.layout,
            &world.occupancy,
            world.respect_occupancy,
            cell,
        )
    }

    /// Handles registered at the cell in registration order.
    #[must_use]
    pub fn interactables_at(world: &World, cell: CellCoord) -> Vec<InteractableId> {
        world.interactables.at(cell).to_vec()
    }

    /// Cells the handle is registered on.
    #[must_use]
    pub fn interactable_cells(world: &World, id: InteractableId) -> Vec<CellCoord> {
        world.interactables.cells_of(id).to_vec()
    }

    /// Highest-priority interactable at the cell that accepts the actor.
    ///
    /// Equal priorities resolve to the earliest registration.
    #[must_use]
    pub fn interaction_prompt(
        world: &World,
        cell: CellCoord,
        context: &InteractionContext,
    ) -> Option<InteractionPrompt> {
        world
            .interactables
            .ranked_at(cell, context)
            .first()
            .map(|(id, entry)| InteractionPrompt {
                interactable: *id,
                priority: entry.priority(),
                description: entry.description(),
            })
    }

    /// Machines available for placement.
    #[must_use]
    pub fn catalog(world: &World) -> &MachineCatalog {
        &world.catalog
    }

    /// Resolved and validated footprint of a placement candidate.
    ///
    /// Previews, commits and load replay all derive their cells from this plan.
    #[must_use]
    pub fn footprint_plan(
        world: &World,
        definition: &DefinitionId,
        anchor: CellCoord,
        facing: Facing,
    ) -> Option<FootprintPlan> {
        world.catalog.get(definition).map(|definition| {
            plan_footprint(&world.layout, &world.occupancy, definition, anchor, facing)
        })
    }

    /// Snapshots of every placed machine ordered by identifier.
    #[must_use]
    pub fn machine_view(world: &World) -> Vec<MachineSnapshot> {
        world.machines.iter().map(|machine| machine.snapshot()).collect()
    }

    /// Machine whose footprint covers the cell.
    #[must_use]
    pub fn machine_at(world: &World, cell: CellCoord) -> Option<MachineId> {
        world.machines.at(cell).map(|machine| machine.id)
    }

    /// World position that centres the machine's model over its rotated footprint.
    #[must_use]
    pub fn machine_position(world: &World, machine: MachineId) -> Option<Vec3> {
        let state = world.machines.iter().find(|state| state.id == machine)?;
        let tile = world.layout.tile_size();
        let centroid = world
            .catalog
            .get(&state.definition)
            .map(|definition| rotated_centroid(&definition.occupied, state.facing))
            .unwrap_or_default();
        Some(
            world.layout.grid_to_world(state.anchor)
                + Vec3::new(centroid.x * tile, state.vertical_offset, centroid.y * tile),
        )
    }

    /// Persisted records of every placed machine ordered by identifier.
    #[must_use]
    pub fn placement_records(world: &World) -> Vec<PlacementRecord> {
        world
            .machines
            .iter()
            .map(|machine| machine.snapshot().record())
            .collect()
    }

    /// Spendable balance of the wallet.
    #[must_use]
    pub fn balance(world: &World) -> u64 {
        world.wallet.balance()
    }

    /// Current pose of the player.
    #[must_use]
    pub fn player_pose(world: &World) -> AgentPose {
        AgentPose {
            cell: world.player_cell(),
            facing: world.player.facing,
            busy: world.player.is_busy(),
        }
    }

    /// Interpolated world position of the player.
    #[must_use]
    pub fn player_position(world: &World) -> Vec3 {
        world.player.position
    }

    /// Captures a read-only view of the roaming agents.
    #[must_use]
    pub fn roamer_view(world: &World) -> RoamerView {
        RoamerView::from_snapshots(
            world
                .roamers
                .values()
                .map(|roamer| RoamerSnapshot {
                    id: roamer.id,
                    cell: world.layout.world_to_grid(roamer.position),
                    moving: roamer.is_moving(),
                })
                .collect(),
        )
    }

    /// Interpolated world position of a roaming agent.
    #[must_use]
    pub fn roamer_position(world: &World, agent: AgentId) -> Option<Vec3> {
        world.roamers.get(&agent).map(|roamer| roamer.position)
    }

    /// Handle of the interactable carried by a roaming agent.
    #[must_use]
    pub fn roamer_interactable(world: &World, agent: AgentId) -> Option<InteractableId> {
        world.roamers.get(&agent).map(|roamer| roamer.interactable)
    }
}

#[cfg(test)]
mod tests {
    use brewhouse_core::{CellOffset, StationKind, StationSpec};

    use super::*;

    fn single_cell_shelf() -> MachineDefinition {
        MachineDefinition {
            id: DefinitionId::new("shelf"),
            name: "Shelf".to_owned(),
            cost: 10,
            occupied: vec![CellOffset::new(0, 0)],
            affected: Vec::new(),
            vertical_offset: 0.0,
            stations: vec![StationSpec {
                label: "Open shelf".to_owned(),
                priority: 0,
                kind: StationKind::Storage,
            }],
        }
    }

    #[test]
    fn apply_configures_garage() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureGarage {
                width: 12,
                height: 8,
                tile_size: 0.5,
                origin: Vec3::new(1.0, 0.0, 2.0),
            },
            &mut events,
        );

        let layout = query::layout(&world);
        assert_eq!(layout.width(), 12);
        assert_eq!(layout.height(), 8);
        assert_eq!(layout.tile_size(), 0.5);
        assert_eq!(
            events,
            vec![Event::GarageConfigured {
                width: 12,
                height: 8
            }]
        );
    }

    #[test]
    fn invalid_configuration_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureGarage {
                width: 0,
                height: 8,
                tile_size: 1.0,
                origin: Vec3::ZERO,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::layout(&world).width(), DEFAULT_FLOOR_WIDTH);
    }

    #[test]
    fn plan_reports_both_invalid_kinds() {
        let layout = FloorLayout::new(4, 4, 1.0, Vec3::ZERO);
        let mut occupancy = OccupancySet::new();
        let _ = occupancy.set_occupied(&layout, [CellCoord::new(3, 0)], true);
        let mut bar = single_cell_shelf();
        bar.occupied = vec![CellOffset::new(0, 0), CellOffset::new(1, 0)];

        let plan = plan_footprint(
            &layout,
            &occupancy,
            &bar,
            CellCoord::new(2, 0),
            Facing::IDENTITY,
        );
        assert!(plan.out_of_bounds.is_empty());
        assert_eq!(plan.blocked, vec![CellCoord::new(3, 0)]);

        let rotated = plan_footprint(
            &layout,
            &occupancy,
            &bar,
            CellCoord::new(0, 0),
            Facing::from_steps(2),
        );
        assert_eq!(rotated.out_of_bounds, vec![CellCoord::new(-1, 0)]);
        assert_eq!(rotated.rejection(), Some(PlacementError::OutOfBounds));
    }

    #[test]
    fn empty_affected_set_registers_on_anchor() {
        let mut world = WorldBuilder::new()
            .catalog(MachineCatalog::new([single_cell_shelf()]))
            .build();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceMachine {
                definition: DefinitionId::new("shelf"),
                anchor: CellCoord::new(3, 3),
                facing: Facing::IDENTITY,
            },
            &mut events,
        );

        assert_eq!(query::interactables_at(&world, CellCoord::new(3, 3)).len(), 1);
        assert_eq!(query::balance(&world), DEFAULT_STARTING_BALANCE - 10);
    }

    #[test]
    fn builder_moves_outside_player_to_origin_cell() {
        let world = WorldBuilder::new()
            .player(CellCoord::new(40, 2), Direction::East)
            .build();
        let pose = query::player_pose(&world);
        assert_eq!(pose.cell, CellCoord::new(0, 0));
        assert_eq!(pose.facing, Direction::East);
        assert!(!pose.busy);
    }

    #[test]
    fn from_config_spawns_walkable_roamers() {
        let mut config = GarageConfig::default();
        config.roaming.spawns = vec![[10, 8], [40, 40]];
        let world = World::from_config(&config);

        let roamers = query::roamer_view(&world).into_vec();
        assert_eq!(roamers.len(), 1);
        assert_eq!(roamers[0].cell, CellCoord::new(10, 8));
        assert_eq!(query::balance(&world), 500);
        assert_eq!(query::layout(&world).width(), 12);
    }
}
