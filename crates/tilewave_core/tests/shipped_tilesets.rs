//! The catalogs under `tilesets/` load and solve.

use std::path::PathBuf;
use std::sync::Arc;

use tilewave_core::{Catalog, Edge, Model, Options, TileVariant};

fn tileset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tilesets")
        .join(name)
        .join("tileset.json")
}

#[test]
fn test_roads_catalog_solves() {
    let catalog = Arc::new(Catalog::load(tileset("roads")).unwrap());
    assert_eq!(catalog.len(), 16);
    assert!(catalog.sheet().is_none());

    let mut model = Model::new(catalog, Options::default().with_seed(42)).unwrap();
    let summary = model.run().unwrap();
    assert_eq!(summary.attempts, 1);
    assert_eq!(model.grid().collapsed_count(), 100);
}

#[test]
fn test_coast_sheet_loads() {
    let catalog = Catalog::load(tileset("coast")).unwrap();
    assert_eq!(catalog.sheet(), Some("sheet.png"));
    assert!(catalog
        .variants()
        .iter()
        .all(|v| matches!(v, TileVariant::Sprite { .. })));

    // Straight shores continue into each other along the coastline
    let north = catalog.index_of("shore_n").unwrap();
    assert!(catalog.compatible(north, Edge::Right).contains(&north));
    assert!(catalog
        .compatible(north, Edge::Top)
        .contains(&catalog.index_of("water").unwrap()));
    assert!(catalog
        .compatible(north, Edge::Bottom)
        .contains(&catalog.index_of("land").unwrap()));
}
