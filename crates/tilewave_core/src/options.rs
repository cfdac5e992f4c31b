//! Solve configuration.

use serde::Deserialize;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;

/// How constraints spread after a collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Rescan the whole grid, row-major, until a pass changes nothing.
    #[default]
    Rescan,
    /// Re-check only the neighbors of cells that changed.
    Worklist,
}

/// What the [`Model`](crate::Model) does when a cell runs out of variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum ContradictionPolicy {
    /// Stop and report the contradiction.
    #[default]
    Halt,
    /// Throw the grid away and start over, up to `max_attempts` grids in total.
    Restart { max_attempts: usize },
}

/// Options recognised when building a solve.
///
/// Missing fields take their defaults, so an empty JSON object is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub width: usize,
    pub height: usize,
    /// `None` draws the seed from the operating system.
    pub seed: Option<u64>,
    pub propagation: Propagation,
    pub on_contradiction: ContradictionPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            propagation: Propagation::default(),
            on_contradiction: ContradictionPolicy::default(),
        }
    }
}

impl Options {
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn with_contradiction_policy(mut self, policy: ContradictionPolicy) -> Self {
        self.on_contradiction = policy;
        self
    }
}
