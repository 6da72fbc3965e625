//! Tile indexes: high-resolution flow tiles and value mosaics.

use hydro_common::{Extent, HydroError, HydroResult, MapPoint};
use serde::{Deserialize, Serialize};

/// One high-resolution tile and the layers it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    /// Tile name, used in logs and responses.
    pub id: String,
    /// Map extent covered by the tile.
    pub extent: Extent,
    /// Layer id of the tile's flow-direction grid.
    pub flow_direction: String,
    /// Layer id of the tile's flow-accumulation grid.
    pub flow_accumulation: String,
}

/// Ordered list of tiles. Lookups return the first match, so overlapping
/// tiles are resolved by their order in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileIndex {
    tiles: Vec<TileEntry>,
}

impl TileIndex {
    pub fn new(tiles: Vec<TileEntry>) -> Self {
        Self { tiles }
    }

    /// First tile whose extent contains the point (edges inclusive).
    pub fn find(&self, point: &MapPoint) -> Option<&TileEntry> {
        self.tiles.iter().find(|tile| tile.extent.contains(point))
    }

    pub fn tiles(&self) -> &[TileEntry] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Reject tiles with empty layer ids or inverted extents.
    pub fn validate(&self) -> HydroResult<()> {
        for tile in &self.tiles {
            if tile.flow_direction.is_empty() || tile.flow_accumulation.is_empty() {
                return Err(HydroError::Config(format!(
                    "tile '{}' is missing a layer id",
                    tile.id
                )));
            }
            if !(tile.extent.width() > 0.0 && tile.extent.height() > 0.0) {
                return Err(HydroError::Config(format!(
                    "tile '{}' has an empty extent",
                    tile.id
                )));
            }
        }
        Ok(())
    }
}

/// One tile of a value mosaic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicTile {
    pub id: String,
    pub extent: Extent,
    /// Layer id of the tile's value grid.
    pub layer: String,
}

/// A layer split across tiles that may overlap, such as a series of
/// surveys over the same ground. A point is sampled in every tile covering
/// it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mosaic {
    tiles: Vec<MosaicTile>,
}

impl Mosaic {
    pub fn new(tiles: Vec<MosaicTile>) -> Self {
        Self { tiles }
    }

    /// Every tile whose extent contains the point, in configuration order.
    pub fn covering<'a>(&'a self, point: &'a MapPoint) -> impl Iterator<Item = &'a MosaicTile> + 'a {
        self.tiles.iter().filter(move |tile| tile.extent.contains(point))
    }

    pub fn tiles(&self) -> &[MosaicTile] {
        &self.tiles
    }

    pub fn validate(&self, name: &str) -> HydroResult<()> {
        if self.tiles.is_empty() {
            return Err(HydroError::Config(format!("mosaic '{}' has no tiles", name)));
        }
        for tile in &self.tiles {
            if tile.layer.is_empty() {
                return Err(HydroError::Config(format!(
                    "mosaic '{}' tile '{}' is missing a layer id",
                    name, tile.id
                )));
            }
            if !(tile.extent.width() > 0.0 && tile.extent.height() > 0.0) {
                return Err(HydroError::Config(format!(
                    "mosaic '{}' tile '{}' has an empty extent",
                    name, tile.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, extent: Extent) -> TileEntry {
        TileEntry {
            id: id.to_string(),
            extent,
            flow_direction: format!("{}_fdr", id),
            flow_accumulation: format!("{}_fac", id),
        }
    }

    #[test]
    fn test_find_returns_first_containing_tile() {
        let index = TileIndex::new(vec![
            tile("west", Extent::new(0.0, 0.0, 10.0, 10.0)),
            tile("overlap", Extent::new(5.0, 0.0, 15.0, 10.0)),
        ]);
        assert_eq!(index.find(&MapPoint::new(7.0, 5.0)).unwrap().id, "west");
        assert_eq!(index.find(&MapPoint::new(12.0, 5.0)).unwrap().id, "overlap");
        assert!(index.find(&MapPoint::new(20.0, 5.0)).is_none());
    }

    #[test]
    fn test_validate_rejects_empty_extent() {
        let index = TileIndex::new(vec![tile("flat", Extent::new(0.0, 0.0, 0.0, 10.0))]);
        assert!(index.validate().is_err());
        assert!(TileIndex::default().validate().is_ok());
    }

    #[test]
    fn test_mosaic_covering_returns_every_overlap() {
        let mosaic = Mosaic::new(vec![
            MosaicTile {
                id: "2019".into(),
                extent: Extent::new(0.0, 0.0, 10.0, 10.0),
                layer: "survey_2019".into(),
            },
            MosaicTile {
                id: "2021".into(),
                extent: Extent::new(5.0, 0.0, 15.0, 10.0),
                layer: "survey_2021".into(),
            },
        ]);
        let point = MapPoint::new(7.0, 5.0);
        let ids: Vec<&str> = mosaic.covering(&point).map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2019", "2021"]);
        assert_eq!(mosaic.covering(&MapPoint::new(-1.0, 5.0)).count(), 0);
        assert!(mosaic.validate("surveys").is_ok());
        assert!(Mosaic::default().validate("empty").is_err());
    }

    #[test]
    fn test_deserializes_from_list() {
        let json = r#"[{"id": "a", "extent": {"min_x": 0, "min_y": 0, "max_x": 1, "max_y": 1},
                        "flow_direction": "a_fdr", "flow_accumulation": "a_fac"}]"#;
        let index: TileIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.len(), 1);
    }
}
