//! TOML configuration describing the garage, its agents and the machine catalog.

use std::{collections::BTreeSet, path::Path, path::PathBuf, time::Duration};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use brewhouse_core::{
    BrewStage, CellCoord, CellOffset, DefinitionId, Direction, MachineDefinition, StationKind,
    StationSpec,
};

/// Errors raised while loading or validating a [`GarageConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The garage has no cells.
    #[error("garage dimensions must be positive, got {width}x{height}")]
    EmptyGarage {
        /// Configured column count.
        width: u32,
        /// Configured row count.
        height: u32,
    },
    /// The tile size is zero, negative or not finite.
    #[error("tile size must be a positive finite number, got {0}")]
    InvalidTileSize(f32),
    /// A timing value is negative or not finite.
    #[error("{field} must be a non-negative number of seconds, got {value}")]
    InvalidDuration {
        /// Name of the offending setting.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
    /// The player would start outside the garage.
    #[error("player start ({x}, {y}) lies outside the garage")]
    PlayerOutside {
        /// Configured column.
        x: i32,
        /// Configured row.
        y: i32,
    },
    /// Two catalog entries share an identifier.
    #[error("machine id `{0}` is defined more than once")]
    DuplicateMachine(DefinitionId),
    /// A catalog entry blocks no cells.
    #[error("machine `{0}` has an empty footprint")]
    EmptyFootprint(DefinitionId),
}

/// Complete garage configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarageConfig {
    /// Floor dimensions and placement in world space.
    pub garage: FloorConfig,
    /// Player start pose and motion timings.
    pub player: PlayerConfig,
    /// Roaming agent behaviour.
    pub roaming: RoamingConfig,
    /// Starting funds.
    pub economy: EconomyConfig,
    /// Catalog of placeable machines.
    pub machines: Vec<MachineDefinition>,
}

/// Floor dimensions and placement in world space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    /// Number of cell columns.
    pub width: u32,
    /// Number of cell rows.
    pub height: u32,
    /// Side length of a cell in world units.
    pub tile_size: f32,
    /// World position of cell `(0, 0)`.
    pub origin: [f32; 3],
}

/// Player start pose and motion timings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting cell as `[x, y]`.
    pub start: [i32; 2],
    /// Starting facing.
    pub facing: Direction,
    /// Seconds needed to walk one cell.
    pub move_seconds: f32,
    /// Seconds needed to turn toward a new direction.
    pub turn_seconds: f32,
}

/// Roaming agent behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoamingConfig {
    /// Seconds a roaming agent needs to walk one cell.
    pub step_seconds: f32,
    /// Whether roaming agents avoid occupied cells.
    pub respect_occupancy: bool,
    /// Seed of the random walk.
    pub seed: u64,
    /// Cells on which roaming agents spawn, as `[x, y]`.
    pub spawns: Vec<[i32; 2]>,
}

/// Starting funds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Coins available when the session starts.
    pub starting_balance: u64,
}

impl Default for GarageConfig {
    fn default() -> Self {
        Self {
            garage: FloorConfig::default(),
            player: PlayerConfig::default(),
            roaming: RoamingConfig::default(),
            economy: EconomyConfig::default(),
            machines: default_catalog(),
        }
    }
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 10,
            tile_size: 1.0,
            origin: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: [1, 1],
            facing: Direction::North,
            move_seconds: 0.25,
            turn_seconds: 0.1,
        }
    }
}

impl Default for RoamingConfig {
    fn default() -> Self {
        Self {
            step_seconds: 0.6,
            respect_occupancy: true,
            seed: 0x5eed,
            spawns: vec![[10, 8]],
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 500,
        }
    }
}

impl FloorConfig {
    /// World position of cell `(0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }
}

impl PlayerConfig {
    /// Starting cell.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        CellCoord::new(self.start[0], self.start[1])
    }

    /// Time needed to walk one cell.
    #[must_use]
    pub fn move_duration(&self) -> Duration {
        seconds(self.move_seconds)
    }

    /// Time needed to turn toward a new direction.
    #[must_use]
    pub fn turn_duration(&self) -> Duration {
        seconds(self.turn_seconds)
    }
}

impl RoamingConfig {
    /// Time a roaming agent needs to walk one cell.
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        seconds(self.step_seconds)
    }

    /// Spawn cells.
    pub fn spawn_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.spawns.iter().map(|[x, y]| CellCoord::new(*x, *y))
    }
}

impl GarageConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!(
            "loaded garage config from {} ({} machines)",
            path.display(),
            config.machines.len()
        );
        Ok(config)
    }

    /// Checks every invariant the world relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floor = &self.garage;
        if floor.width == 0 || floor.height == 0 {
            return Err(ConfigError::EmptyGarage {
                width: floor.width,
                height: floor.height,
            });
        }
        if !(floor.tile_size.is_finite() && floor.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(floor.tile_size));
        }

        for (field, value) in [
            ("player.move_seconds", self.player.move_seconds),
            ("player.turn_seconds", self.player.turn_seconds),
            ("roaming.step_seconds", self.roaming.step_seconds),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }

        let [x, y] = self.player.start;
        let inside_x = x >= 0 && i64::from(x) < i64::from(floor.width);
        let inside_y = y >= 0 && i64::from(y) < i64::from(floor.height);
        if !(inside_x && inside_y) {
            return Err(ConfigError::PlayerOutside { x, y });
        }

        let mut seen = BTreeSet::new();
        for machine in &self.machines {
            if !seen.insert(machine.id.clone()) {
                return Err(ConfigError::DuplicateMachine(machine.id.clone()));
            }
            if machine.occupied.is_empty() {
                return Err(ConfigError::EmptyFootprint(machine.id.clone()));
            }
        }

        Ok(())
    }

    /// Serialises the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

fn offsets(values: &[(i32, i32)]) -> Vec<CellOffset> {
    values.iter().map(|&(x, y)| CellOffset::new(x, y)).collect()
}

fn station(label: &str, priority: i32, kind: StationKind) -> StationSpec {
    StationSpec {
        label: label.to_owned(),
        priority,
        kind,
    }
}

/// Brewery machines available when the configuration names none.
///
/// Every machine is authored facing north, used from the cell south of it.
#[must_use]
pub fn default_catalog() -> Vec<MachineDefinition> {
    vec![
        MachineDefinition {
            id: DefinitionId::new("malt_kiln"),
            name: "Malt kiln".to_owned(),
            cost: 80,
            occupied: offsets(&[(0, 0)]),
            affected: offsets(&[(0, -1)]),
            vertical_offset: 0.0,
            stations: vec![station(
                "Spray the malt",
                10,
                StationKind::Minigame {
                    stage: BrewStage::Malting,
                },
            )],
        },
        MachineDefinition {
            id: DefinitionId::new("mash_tun"),
            name: "Mash tun".to_owned(),
            cost: 150,
            occupied: offsets(&[(0, 0), (0, 1)]),
            affected: offsets(&[(0, -1)]),
            vertical_offset: 0.1,
            stations: vec![station(
                "Stir the mash",
                10,
                StationKind::Minigame {
                    stage: BrewStage::Mashing,
                },
            )],
        },
        MachineDefinition {
            id: DefinitionId::new("fermenter"),
            name: "Fermenter".to_owned(),
            cost: 240,
            occupied: offsets(&[(0, 0), (1, 0), (0, 1), (1, 1)]),
            affected: offsets(&[(0, -1), (1, -1)]),
            vertical_offset: 0.0,
            stations: vec![
                station(
                    "Check fermentation",
                    10,
                    StationKind::Minigame {
                        stage: BrewStage::Fermenting,
                    },
                ),
                station("Open fermenter", 5, StationKind::Storage),
            ],
        },
        MachineDefinition {
            id: DefinitionId::new("bottling_line"),
            name: "Bottling line".to_owned(),
            cost: 200,
            occupied: offsets(&[(-1, 0), (0, 0), (1, 0)]),
            affected: offsets(&[(0, -1)]),
            vertical_offset: 0.0,
            stations: vec![station(
                "Bottle the batch",
                10,
                StationKind::Minigame {
                    stage: BrewStage::Bottling,
                },
            )],
        },
        MachineDefinition {
            id: DefinitionId::new("storage_shelf"),
            name: "Storage shelf".to_owned(),
            cost: 40,
            occupied: offsets(&[(0, 0)]),
            affected: offsets(&[(0, -1)]),
            vertical_offset: 0.0,
            stations: vec![station("Open shelf", 0, StationKind::Storage)],
        },
        MachineDefinition {
            id: DefinitionId::new("sales_counter"),
            name: "Sales counter".to_owned(),
            cost: 60,
            occupied: offsets(&[(0, 0), (1, 0)]),
            affected: offsets(&[(0, -1), (1, -1)]),
            vertical_offset: 0.0,
            stations: vec![station("Sell beer", 0, StationKind::Market)],
        },
    ]
}
