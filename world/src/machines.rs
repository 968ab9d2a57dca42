//! Authoritative machine state management utilities.

use std::collections::BTreeMap;

use brewhouse_core::{
    CellCoord, CellOffset, DefinitionId, Facing, InteractableId, MachineDefinition, MachineId,
    MachineSnapshot,
};

/// Snapshot of a machine stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct MachineState {
    /// Identifier allocated by the world for the machine.
    pub(crate) id: MachineId,
    /// Definition the machine was built from.
    pub(crate) definition: DefinitionId,
    /// Anchor cell of the footprint.
    pub(crate) anchor: CellCoord,
    /// Effective facing of the footprint.
    pub(crate) facing: Facing,
    /// Cells blocked by the machine.
    pub(crate) occupied: Vec<CellCoord>,
    /// Cells the machine's interactables are registered on.
    pub(crate) affected: Vec<CellCoord>,
    /// Render-only vertical offset.
    pub(crate) vertical_offset: f32,
    /// Interactables spawned with the machine.
    pub(crate) interactables: Vec<InteractableId>,
}

impl MachineState {
    /// Moves every cell of the machine by `shift`.
    pub(crate) fn translate(&mut self, shift: CellOffset) {
        self.anchor = self.anchor.offset(shift);
        for cell in self.occupied.iter_mut().chain(self.affected.iter_mut()) {
            *cell = cell.offset(shift);
        }
    }

    pub(crate) fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            id: self.id,
            definition: self.definition.clone(),
            anchor: self.anchor,
            facing: self.facing,
            occupied: self.occupied.clone(),
            affected: self.affected.clone(),
            vertical_offset: self.vertical_offset,
        }
    }
}

/// Registry that stores machines and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct MachineRegistry {
    entries: BTreeMap<MachineId, MachineState>,
    next_machine_id: MachineId,
}

impl MachineRegistry {
    /// Creates an empty machine registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_machine_id: MachineId::new(0),
        }
    }

    /// Reserves the next free identifier.
    pub(crate) fn allocate(&mut self) -> MachineId {
        let id = self.next_machine_id;
        self.next_machine_id = MachineId::new(id.get().wrapping_add(1));
        id
    }

    pub(crate) fn insert(&mut self, state: MachineState) {
        let _ = self.entries.insert(state.id, state);
    }

    pub(crate) fn remove(&mut self, id: MachineId) -> Option<MachineState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &MachineState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut MachineState> {
        self.entries.values_mut()
    }

    /// Removes every machine, returning them in identifier order.
    pub(crate) fn drain(&mut self) -> Vec<MachineState> {
        std::mem::take(&mut self.entries).into_values().collect()
    }

    /// Machine whose footprint covers the provided cell.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<&MachineState> {
        self.entries
            .values()
            .find(|machine| machine.occupied.contains(&cell))
    }
}

/// Lookup table of placeable machine definitions.
#[derive(Clone, Debug, Default)]
pub struct MachineCatalog {
    definitions: BTreeMap<DefinitionId, MachineDefinition>,
}

impl MachineCatalog {
    /// Builds a catalog from definitions; later duplicates replace earlier ones.
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = MachineDefinition>) -> Self {
        let definitions = definitions
            .into_iter()
            .map(|definition| (definition.id.clone(), definition))
            .collect();
        Self { definitions }
    }

    /// Definition registered under `id`.
    #[must_use]
    pub fn get(&self, id: &DefinitionId) -> Option<&MachineDefinition> {
        self.definitions.get(id)
    }

    /// Iterates definitions in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &MachineDefinition> {
        self.definitions.values()
    }

    /// Number of definitions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Reports whether the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
