//! Tile catalog: the immutable set of variants a cell may resolve to.
//!
//! Two file shapes are accepted and produce the same [`Catalog`]:
//!
//! ```json
//! { "size": 16, "tiles": [ { "image": "grass.png", "sockets": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]] } ] }
//! { "size": 16, "image": "sheet.png", "sprites": [ { "id": "grass", "x": 0, "y": 2, "sockets": [...] } ] }
//! ```
//!
//! Sockets are listed TOP, RIGHT, BOTTOM, LEFT. Sprite `x`/`y` are the tile
//! column and row inside the sheet.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::CatalogError;
use crate::socket::{connects, Edge, Socket};

/// A tile definition as seen by the solver.
///
/// The solver only uses [`id`](Self::id) and [`socket`](Self::socket); the
/// image reference is resolved by whoever draws the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileVariant {
    /// Standalone image file.
    Plain { image: String, sockets: [Socket; 4] },
    /// Cell of the catalog's shared sprite sheet.
    Sprite {
        id: String,
        x: u32,
        y: u32,
        sockets: [Socket; 4],
    },
}

impl TileVariant {
    pub fn plain(image: impl Into<String>, sockets: [Socket; 4]) -> Self {
        TileVariant::Plain {
            image: image.into(),
            sockets,
        }
    }

    pub fn sprite(id: impl Into<String>, x: u32, y: u32, sockets: [Socket; 4]) -> Self {
        TileVariant::Sprite {
            id: id.into(),
            x,
            y,
            sockets,
        }
    }

    /// Identifier: the image key for plain tiles, the sprite id otherwise.
    pub fn id(&self) -> &str {
        match self {
            TileVariant::Plain { image, .. } => image,
            TileVariant::Sprite { id, .. } => id,
        }
    }

    /// Socket on the given edge.
    pub fn socket(&self, edge: Edge) -> &Socket {
        &self.sockets()[edge.index()]
    }

    pub fn sockets(&self) -> &[Socket; 4] {
        match self {
            TileVariant::Plain { sockets, .. } | TileVariant::Sprite { sockets, .. } => sockets,
        }
    }
}

#[derive(Deserialize)]
struct TileEntry {
    image: String,
    sockets: [Socket; 4],
}

#[derive(Deserialize)]
struct SpriteEntry {
    id: String,
    x: u32,
    y: u32,
    sockets: [Socket; 4],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Sheet {
        size: u32,
        image: String,
        sprites: Vec<SpriteEntry>,
    },
    Tiles {
        size: u32,
        tiles: Vec<TileEntry>,
    },
}

/// Immutable, ordered collection of tile variants.
///
/// A variant is identified by its index. Construction precomputes, for every
/// variant and edge, the list of variants that may sit across that edge.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Tile edge length in pixels
    size: u32,
    /// Shared sprite sheet, if the variants are sprites
    sheet: Option<String>,
    variants: Vec<TileVariant>,
    /// `compatible[edge][v]` = variants `w` with `connects(v, edge, w, opposite)`
    compatible: [Vec<Vec<usize>>; 4],
}

impl Catalog {
    /// Build a catalog of plain tiles (or any mix of variants).
    pub fn new(size: u32, variants: Vec<TileVariant>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for variant in &variants {
            if !seen.insert(variant.id()) {
                return Err(CatalogError::DuplicateVariant(variant.id().to_string()));
            }
        }

        let compatible: [Vec<Vec<usize>>; 4] = std::array::from_fn(|e| {
            let edge = Edge::ALL[e];
            variants
                .iter()
                .map(|v| {
                    variants
                        .iter()
                        .enumerate()
                        .filter(|(_, w)| connects(v, edge, w, edge.opposite()))
                        .map(|(i, _)| i)
                        .collect::<Vec<usize>>()
                })
                .collect()
        });

        Ok(Self {
            size,
            sheet: None,
            variants,
            compatible,
        })
    }

    /// Build a catalog whose variants are cut from one sprite sheet.
    pub fn with_sheet(
        size: u32,
        sheet: impl Into<String>,
        variants: Vec<TileVariant>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(size, variants)?;
        catalog.sheet = Some(sheet.into());
        Ok(catalog)
    }

    /// Parse either catalog file shape.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        match serde_json::from_str(json)? {
            CatalogFile::Tiles { size, tiles } => Self::new(
                size,
                tiles
                    .into_iter()
                    .map(|t| TileVariant::plain(t.image, t.sockets))
                    .collect(),
            ),
            CatalogFile::Sheet {
                size,
                image,
                sprites,
            } => Self::with_sheet(
                size,
                image,
                sprites
                    .into_iter()
                    .map(|s| TileVariant::sprite(s.id, s.x, s.y, s.sockets))
                    .collect(),
            ),
        }
    }

    /// Load a catalog file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TileVariant> {
        self.variants.get(index)
    }

    pub fn variants(&self) -> &[TileVariant] {
        &self.variants
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.id() == id)
    }

    /// Variants allowed across `edge` of variant `index`.
    #[inline]
    pub fn compatible(&self, index: usize, edge: Edge) -> &[usize] {
        &self.compatible[edge.index()][index]
    }
}
