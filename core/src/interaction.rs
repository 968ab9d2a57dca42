//! Capability contracts for anything the player can interact with on the floor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AgentId, CellCoord, Direction};

/// Brewing stage advanced by a machine's attached minigame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewStage {
    /// Germinating and drying the grain.
    Malting,
    /// Steeping the malt to extract sugars.
    Mashing,
    /// Letting yeast convert the wort.
    Fermenting,
    /// Filling and capping bottles.
    Bottling,
}

/// Behaviour a machine station exposes once interacted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StationKind {
    /// Hands control to the minigame attached to a brewing stage.
    Minigame {
        /// Stage the minigame progresses.
        stage: BrewStage,
    },
    /// Opens the storage panel of the machine.
    Storage,
    /// Opens the sales panel for finished product.
    Market,
}

/// Authoring-time description of one interactable component carried by a machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSpec {
    /// Prompt text shown to the player.
    pub label: String,
    /// Ordering weight; higher priorities win when several interactables share a cell.
    #[serde(default)]
    pub priority: i32,
    /// Behaviour triggered by the station.
    #[serde(flatten)]
    pub kind: StationKind,
}

/// Information about the actor attempting an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractionContext {
    /// Cell the actor stands on.
    pub actor_cell: CellCoord,
    /// Direction the actor faces.
    pub actor_facing: Direction,
}

/// Side effect requested by an interactable when it is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// An external minigame should run for the provided stage.
    LaunchMinigame {
        /// Stage the minigame progresses.
        stage: BrewStage,
    },
    /// The storage panel should open.
    OpenStorage,
    /// The market panel should open.
    OpenMarket,
    /// The roaming agent was chased off and must leave the floor.
    ShooRoamer {
        /// Agent that was chased off.
        agent: AgentId,
    },
}

/// Capability shared by every object the interaction prompt may surface.
pub trait Interactable: fmt::Debug {
    /// Ordering weight; higher priorities are offered first.
    fn priority(&self) -> i32;

    /// Reports whether the actor may currently use this interactable.
    fn can_interact(&self, context: &InteractionContext) -> bool;

    /// Short prompt description such as "Mash grain".
    fn description(&self) -> String;

    /// Performs the interaction and reports the requested side effect.
    fn interact(&mut self, context: &InteractionContext) -> InteractionOutcome;
}

/// Currency collaborator consulted by the placement committer.
pub trait Wallet: fmt::Debug {
    /// Current spendable balance.
    fn balance(&self) -> u64;

    /// Removes `amount` from the balance, all or nothing.
    ///
    /// Returns `false` without changing the balance when funds are insufficient.
    fn debit(&mut self, amount: u64) -> bool;

    /// Adds `amount` to the balance.
    fn credit(&mut self, amount: u64);
}
