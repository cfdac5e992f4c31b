//! Error types for catalog loading and solving.

use std::fmt;

/// Errors raised while building a [`Catalog`](crate::Catalog).
#[derive(Debug)]
pub enum CatalogError {
    /// File system error
    Io(std::io::Error),
    /// Malformed catalog JSON
    Json(serde_json::Error),
    /// Two variants share the same id
    DuplicateVariant(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
            CatalogError::Json(e) => write!(f, "JSON error: {}", e),
            CatalogError::DuplicateVariant(id) => {
                write!(f, "duplicate tile variant '{}'", id)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Json(e) => Some(e),
            CatalogError::DuplicateVariant(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

/// Errors raised by the solver.
#[derive(Debug)]
pub enum WfcError {
    /// `resolved_variant` called on a cell that is not collapsed
    NotCollapsed { remaining: usize },
    /// A cell ran out of possible variants
    Contradiction { x: usize, y: usize },
    /// Grid built from a catalog with no variants
    EmptyCatalog,
    /// Grid with a zero dimension
    InvalidDimensions { width: usize, height: usize },
    /// Every restart attempt ended in a contradiction
    Unsatisfiable { attempts: usize },
    /// Catalog could not be loaded
    Catalog(CatalogError),
}

impl fmt::Display for WfcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WfcError::NotCollapsed { remaining } => write!(
                f,
                "cell is not collapsed ({} variants remaining)",
                remaining
            ),
            WfcError::Contradiction { x, y } => {
                write!(f, "contradiction at cell ({}, {})", x, y)
            }
            WfcError::EmptyCatalog => write!(f, "catalog has no tile variants"),
            WfcError::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {}x{}", width, height)
            }
            WfcError::Unsatisfiable { attempts } => write!(
                f,
                "no solution found after {} attempt(s)",
                attempts
            ),
            WfcError::Catalog(e) => write!(f, "catalog error: {}", e),
        }
    }
}

impl std::error::Error for WfcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WfcError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for WfcError {
    fn from(e: CatalogError) -> Self {
        WfcError::Catalog(e)
    }
}

/// Result type for solver operations.
pub type WfcResult<T> = Result<T, WfcError>;
