//! Socket-matching Wave Function Collapse.
//!
//! Fills a rectangular grid with tile variants so that every pair of
//! neighbors shows matching sockets on the shared edge.
//!
//! - [`socket`]: edges, socket tokens and the `connects` test
//! - [`catalog`]: the immutable tile set and its JSON file formats
//! - [`cell`]: one location's shrinking domain
//! - [`grid`]: propagation, minimum entropy search and the collapse loop
//! - [`model`]: options, seeding and the contradiction policy
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilewave_core::{Catalog, Model, Options};
//!
//! let catalog = Arc::new(Catalog::load("tilesets/pipes/tileset.json")?);
//! let mut model = Model::new(catalog, Options::default().with_seed(42))?;
//! model.run()?;
//!
//! let grid = model.grid();
//! let top_left = grid.get(0, 0).unwrap().resolved_variant()?;
//! ```

pub mod catalog;
pub mod cell;
pub mod error;
pub mod grid;
pub mod model;
pub mod options;
pub mod rng;
pub mod socket;

pub use catalog::{Catalog, TileVariant};
pub use cell::Cell;
pub use error::{CatalogError, WfcError, WfcResult};
pub use grid::{Grid, SolveState, StepOutcome};
pub use model::{Model, RunSummary};
pub use options::{ContradictionPolicy, Options, Propagation, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use rng::{ScriptedRandom, StdRandom, WfcRng};
pub use socket::{connects, Edge, Socket, SocketToken};
