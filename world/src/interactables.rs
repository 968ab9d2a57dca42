//! Registration and lookup of interactables by floor cell.

use std::collections::{BTreeMap, HashMap};

use brewhouse_core::{
    AgentId, CellCoord, CellOffset, Interactable, InteractableId, InteractionContext,
    InteractionOutcome, StationKind, StationSpec,
};

/// Bidirectional index between cells and the handles registered on them.
#[derive(Clone, Debug, Default)]
pub(crate) struct CellIndex {
    by_cell: HashMap<CellCoord, Vec<InteractableId>>,
    by_handle: HashMap<InteractableId, Vec<CellCoord>>,
}

impl CellIndex {
    /// Appends `handle` to every listed cell, keeping one entry per cell.
    pub(crate) fn register<I>(&mut self, cells: I, handle: InteractableId)
    where
        I: IntoIterator<Item = CellCoord>,
    {
        for cell in cells {
            let handles = self.by_cell.entry(cell).or_default();
            if handles.contains(&handle) {
                continue;
            }
            handles.push(handle);
            self.by_handle.entry(handle).or_default().push(cell);
        }
    }

    /// Removes `handle` from every cell it was registered on. Unknown handles are ignored.
    pub(crate) fn unregister(&mut self, handle: InteractableId) {
        let Some(cells) = self.by_handle.remove(&handle) else {
            return;
        };

        for cell in cells {
            if let Some(handles) = self.by_cell.get_mut(&cell) {
                handles.retain(|candidate| *candidate != handle);
                if handles.is_empty() {
                    let _ = self.by_cell.remove(&cell);
                }
            }
        }
    }

    /// Removes `handle` from a single cell, keeping its other registrations.
    pub(crate) fn unregister_at(&mut self, cell: CellCoord, handle: InteractableId) {
        if let Some(handles) = self.by_cell.get_mut(&cell) {
            handles.retain(|candidate| *candidate != handle);
            if handles.is_empty() {
                let _ = self.by_cell.remove(&cell);
            }
        }
        if let Some(cells) = self.by_handle.get_mut(&handle) {
            cells.retain(|candidate| *candidate != cell);
            if cells.is_empty() {
                let _ = self.by_handle.remove(&handle);
            }
        }
    }

    /// Handles registered at `cell` in registration order.
    pub(crate) fn at(&self, cell: CellCoord) -> &[InteractableId] {
        self.by_cell.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cells `handle` is registered on.
    pub(crate) fn cells_of(&self, handle: InteractableId) -> &[CellCoord] {
        self.by_handle.get(&handle).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Moves every registration by `shift`.
    pub(crate) fn translate(&mut self, shift: CellOffset) {
        self.by_cell = self
            .by_cell
            .drain()
            .map(|(cell, handles)| (cell.offset(shift), handles))
            .collect();
        for cells in self.by_handle.values_mut() {
            for cell in cells.iter_mut() {
                *cell = cell.offset(shift);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.by_cell.clear();
        self.by_handle.clear();
    }
}

/// Arena owning every interactable together with its cell index.
#[derive(Debug, Default)]
pub(crate) struct InteractableRegistry {
    entries: BTreeMap<InteractableId, Box<dyn Interactable>>,
    index: CellIndex,
    next_id: u32,
}

impl InteractableRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `interactable` and registers it on the provided cells.
    pub(crate) fn insert<I>(
        &mut self,
        cells: I,
        interactable: Box<dyn Interactable>,
    ) -> InteractableId
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let id = InteractableId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.entries.insert(id, interactable);
        self.index.register(cells, id);
        id
    }

    /// Registers an already stored handle on additional cells.
    pub(crate) fn attach<I>(&mut self, cells: I, id: InteractableId)
    where
        I: IntoIterator<Item = CellCoord>,
    {
        if self.entries.contains_key(&id) {
            self.index.register(cells, id);
        }
    }

    /// Unregisters the handle from every cell while keeping the object alive.
    pub(crate) fn detach(&mut self, id: InteractableId) {
        self.index.unregister(id);
    }

    pub(crate) fn detach_from(&mut self, cell: CellCoord, id: InteractableId) {
        self.index.unregister_at(cell, id);
    }

    /// Unregisters the handle and drops the object.
    pub(crate) fn remove(&mut self, id: InteractableId) -> bool {
        self.index.unregister(id);
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn at(&self, cell: CellCoord) -> &[InteractableId] {
        self.index.at(cell)
    }

    pub(crate) fn cells_of(&self, id: InteractableId) -> &[CellCoord] {
        self.index.cells_of(id)
    }

    pub(crate) fn get(&self, id: InteractableId) -> Option<&dyn Interactable> {
        self.entries.get(&id).map(|entry| entry.as_ref())
    }

    pub(crate) fn get_mut(
        &mut self,
        id: InteractableId,
    ) -> Option<&mut (dyn Interactable + 'static)> {
        self.entries.get_mut(&id).map(|entry| entry.as_mut())
    }

    /// Available handles at `cell`, highest priority first.
    ///
    /// The sort is stable, so equal priorities keep registration order.
    pub(crate) fn ranked_at(
        &self,
        cell: CellCoord,
        context: &InteractionContext,
    ) -> Vec<(InteractableId, &dyn Interactable)> {
        let mut ranked: Vec<_> = self
            .at(cell)
            .iter()
            .filter_map(|id| self.get(*id).map(|entry| (*id, entry)))
            .filter(|(_, entry)| entry.can_interact(context))
            .collect();
        ranked.sort_by_key(|(_, entry)| std::cmp::Reverse(entry.priority()));
        ranked
    }

    pub(crate) fn translate(&mut self, shift: CellOffset) {
        self.index.translate(shift);
    }

    /// Drops every interactable and registration.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Interactable component spawned from a machine's [`StationSpec`].
#[derive(Clone, Debug)]
pub(crate) struct Station {
    spec: StationSpec,
    uses: u32,
}

impl Station {
    pub(crate) fn new(spec: StationSpec) -> Self {
        Self { spec, uses: 0 }
    }
}

impl Interactable for Station {
    fn priority(&self) -> i32 {
        self.spec.priority
    }

    fn can_interact(&self, _context: &InteractionContext) -> bool {
        true
    }

    fn description(&self) -> String {
        self.spec.label.clone()
    }

    fn interact(&mut self, _context: &InteractionContext) -> InteractionOutcome {
        self.uses = self.uses.saturating_add(1);
        match self.spec.kind {
            StationKind::Minigame { stage } => InteractionOutcome::LaunchMinigame { stage },
            StationKind::Storage => InteractionOutcome::OpenStorage,
            StationKind::Market => InteractionOutcome::OpenMarket,
        }
    }
}

/// Priority of a roaming agent's prompt; chasing pests beats using machines.
pub(crate) const ROAMER_PRIORITY: i32 = 100;

/// Interactable carried by a roaming agent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RoamerPrompt {
    agent: AgentId,
}

impl RoamerPrompt {
    pub(crate) const fn new(agent: AgentId) -> Self {
        Self { agent }
    }
}

impl Interactable for RoamerPrompt {
    fn priority(&self) -> i32 {
        ROAMER_PRIORITY
    }

    fn can_interact(&self, _context: &InteractionContext) -> bool {
        true
    }

    fn description(&self) -> String {
        "Shoo the mouse".to_owned()
    }

    fn interact(&mut self, _context: &InteractionContext) -> InteractionOutcome {
        InteractionOutcome::ShooRoamer { agent: self.agent }
    }
}
