//! PNG rendering for solved (or partially solved) grids.
//!
//! Tile images are resolved relative to the catalog file. Plain tiles load
//! one file each; sprite tiles are cut from the catalog's sheet at
//! `(x * size, y * size)`. Cells that are not collapsed stay transparent.

use image::{imageops, Rgba, RgbaImage};
use std::path::Path;
use tilewave_core::{Catalog, Grid, TileVariant};

/// Errors raised while loading tile images.
#[derive(Debug)]
pub enum RenderError {
    /// Image decoding or file error
    Image(image::ImageError),
    /// Sprite variants in a catalog without a sheet
    MissingSheet(String),
    /// Sprite lies outside the sheet
    SpriteOutOfBounds { id: String, x: u32, y: u32 },
    /// Grid in pixels does not fit a `u32` image
    CanvasTooLarge { width: usize, height: usize },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Image(e) => write!(f, "image error: {}", e),
            RenderError::MissingSheet(id) => {
                write!(f, "sprite '{}' has no sprite sheet to be cut from", id)
            }
            RenderError::SpriteOutOfBounds { id, x, y } => {
                write!(f, "sprite '{}' at ({}, {}) lies outside the sheet", id, x, y)
            }
            RenderError::CanvasTooLarge { width, height } => {
                write!(f, "a {}x{} grid is too large to render", width, height)
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Image(e)
    }
}

/// One decoded image per catalog variant, indexed like the catalog.
pub struct TileAtlas {
    size: u32,
    tiles: Vec<RgbaImage>,
}

impl TileAtlas {
    pub fn load(catalog: &Catalog, base_dir: &Path) -> Result<Self, RenderError> {
        let size = catalog.size();
        let sheet = match catalog.sheet() {
            Some(sheet) => Some(image::open(base_dir.join(sheet))?.to_rgba8()),
            None => None,
        };

        let mut tiles = Vec::with_capacity(catalog.len());
        for variant in catalog.variants() {
            let tile = match variant {
                TileVariant::Plain { image, .. } => {
                    let img = image::open(base_dir.join(image))?.to_rgba8();
                    if img.dimensions() == (size, size) {
                        img
                    } else {
                        imageops::resize(&img, size, size, imageops::FilterType::Nearest)
                    }
                }
                TileVariant::Sprite { id, x, y, .. } => {
                    let sheet = sheet
                        .as_ref()
                        .ok_or_else(|| RenderError::MissingSheet(id.clone()))?;
                    let origin = |cell: u32, limit: u32| {
                        cell.checked_mul(size)
                            .filter(|p| p.checked_add(size).is_some_and(|end| end <= limit))
                    };
                    let (Some(px), Some(py)) =
                        (origin(*x, sheet.width()), origin(*y, sheet.height()))
                    else {
                        return Err(RenderError::SpriteOutOfBounds {
                            id: id.clone(),
                            x: *x,
                            y: *y,
                        });
                    };
                    imageops::crop_imm(sheet, px, py, size, size).to_image()
                }
            };
            tiles.push(tile);
        }

        Ok(Self { size, tiles })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn tile(&self, variant: usize) -> Option<&RgbaImage> {
        self.tiles.get(variant)
    }
}

/// Draw every collapsed cell at `(x * size, y * size)`.
///
/// `tint` multiplies the RGB channels of each drawn tile.
pub fn render_grid(
    grid: &Grid,
    atlas: &TileAtlas,
    tint: Option<[u8; 3]>,
) -> Result<RgbaImage, RenderError> {
    let size = atlas.size();
    let (width, height) = canvas_size(grid.width(), grid.height(), size)?;
    let mut img = RgbaImage::new(width, height);

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let Some(cell) = grid.get(x, y) else { continue };
            if !cell.is_collapsed() {
                continue;
            }
            let Some(tile) = cell.resolved_variant().ok().and_then(|v| atlas.tile(v)) else {
                continue;
            };
            let (ox, oy) = (x as i64 * size as i64, y as i64 * size as i64);
            match tint {
                Some(tint) => imageops::overlay(&mut img, &tinted(tile, tint), ox, oy),
                None => imageops::overlay(&mut img, tile, ox, oy),
            }
        }
    }

    Ok(img)
}

/// Pixel dimensions of a `width x height` grid of `size` tiles.
fn canvas_size(width: usize, height: usize, size: u32) -> Result<(u32, u32), RenderError> {
    let pixels = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(size))
    };
    match (pixels(width), pixels(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(RenderError::CanvasTooLarge { width, height }),
    }
}

fn tinted(tile: &RgbaImage, tint: [u8; 3]) -> RgbaImage {
    let mut out = tile.clone();
    for Rgba(px) in out.pixels_mut() {
        for c in 0..3 {
            px[c] = ((px[c] as u16 * tint[c] as u16) / 255) as u8;
        }
    }
    out
}

/// Text view of the grid, one character per cell.
///
/// Collapsed cells show their catalog index in base 36, open cells `.`,
/// contradicted cells `!`.
pub fn render_text(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let ch = match grid.get(x, y) {
                Some(cell) if cell.is_contradiction() => '!',
                Some(cell) => match cell.resolved_variant() {
                    Ok(v) => std::char::from_digit((v % 36) as u32, 36).unwrap_or('#'),
                    Err(_) => '.',
                },
                None => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// Parse `RRGGBB` (an optional leading `#` is allowed).
pub fn parse_tint(s: &str) -> Result<[u8; 3], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got '{}'", s));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad tint '{}': {}", s, e))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
