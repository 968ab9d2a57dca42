use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use brewhouse_core::PlacementRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "garage";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "garage:v1";
/// Delimiter used to separate the prefix, floor dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of the machines placed on the garage floor and the floor configuration.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GarageLayoutSnapshot {
    /// Number of cell columns on the floor.
    pub(crate) width: u32,
    /// Number of cell rows on the floor.
    pub(crate) height: u32,
    /// Edge length of one cell in world units.
    pub(crate) tile_size: f32,
    /// Machines composing the layout, in placement order.
    pub(crate) records: Vec<PlacementRecord>,
}

impl GarageLayoutSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            tile_size: self.tile_size,
            records: self.records.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
            self.width, self.height
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            width,
            height,
            tile_size: decoded.tile_size,
            records: decoded.records,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    tile_size: f32,
    records: Vec<PlacementRecord>,
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include floor dimensions.
    #[error("layout string is missing the floor dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The floor dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse floor dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use brewhouse_core::{CellCoord, DefinitionId, Facing};

    use super::*;

    fn snapshot(records: Vec<PlacementRecord>) -> GarageLayoutSnapshot {
        GarageLayoutSnapshot {
            width: 12,
            height: 10,
            tile_size: 1.5,
            records,
        }
    }

    #[test]
    fn round_trip_populated_layout() {
        let layout = snapshot(vec![
            PlacementRecord {
                definition: DefinitionId::new("mash_tun"),
                anchor: CellCoord::new(3, 4),
                facing: Facing::from_steps(1),
                vertical_offset: 0.25,
            },
            PlacementRecord {
                definition: DefinitionId::new("storage_shelf"),
                anchor: CellCoord::new(0, 9),
                facing: Facing::IDENTITY,
                vertical_offset: 0.0,
            },
        ]);

        let encoded = layout.encode().expect("layout encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:12x10:")));

        let decoded = GarageLayoutSnapshot::decode(&encoded).expect("layout decodes");
        assert_eq!(decoded, layout);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = snapshot(Vec::new()).encode().expect("layout encodes");
        let decoded = GarageLayoutSnapshot::decode(&format!("  {encoded}\n")).expect("decodes");
        assert!(decoded.records.is_empty());
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(matches!(
            GarageLayoutSnapshot::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("cellar:v1:4x4:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "cellar"
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("garage:v2:4x4:e30"),
            Err(LayoutTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("garage:v1:0x4:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("garage:v1:4x4"),
            Err(LayoutTransferError::MissingPayload)
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("garage:v1:4x4:!!!"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            GarageLayoutSnapshot::decode("garage:v1:4x4:e30"),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }
}
