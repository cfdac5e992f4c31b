//! Whole-solve driver: builds the grid from [`Options`], seeds it and applies
//! the contradiction policy.

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::{WfcError, WfcResult};
use crate::grid::{Grid, StepOutcome};
use crate::options::{ContradictionPolicy, Options};
use crate::rng::{StdRandom, WfcRng};

/// Totals for a completed [`Model::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Grids built, 1 when the first attempt succeeded
    pub attempts: usize,
    /// Collapses in the successful attempt, seed included
    pub collapses: usize,
}

pub struct Model {
    catalog: Arc<Catalog>,
    options: Options,
    grid: Grid,
    attempts: usize,
}

impl Model {
    /// Build and seed a grid. Unseeded options draw from the OS.
    pub fn new(catalog: Arc<Catalog>, options: Options) -> WfcResult<Self> {
        let rng = StdRandom::from_option(options.seed);
        Self::with_rng(catalog, options, Box::new(rng))
    }

    /// Same as [`new`](Self::new) with a caller-supplied random source.
    /// `options.seed` is ignored.
    pub fn with_rng(
        catalog: Arc<Catalog>,
        options: Options,
        rng: Box<dyn WfcRng>,
    ) -> WfcResult<Self> {
        let mut grid = Grid::new(Arc::clone(&catalog), options.width, options.height, rng)?
            .with_propagation(options.propagation);
        grid.seed();

        Ok(Self {
            catalog,
            options,
            grid,
            attempts: 1,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grids built so far, the current one included.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn finished(&self) -> bool {
        self.grid.finished()
    }

    /// One tick. The contradiction policy is not applied here.
    pub fn step(&mut self) -> StepOutcome {
        self.grid.step()
    }

    /// Start over with fresh cells and a new seed cell.
    pub fn restart(&mut self) {
        self.grid.restart();
        self.attempts += 1;
        self.grid.seed();
    }

    /// Apply the contradiction policy after a step reported a contradiction
    /// at `(x, y)`.
    ///
    /// [`ContradictionPolicy::Halt`] returns [`WfcError::Contradiction`];
    /// [`ContradictionPolicy::Restart`] starts over until `max_attempts`
    /// grids have been tried, then returns [`WfcError::Unsatisfiable`].
    pub fn recover(&mut self, x: usize, y: usize) -> WfcResult<()> {
        match self.options.on_contradiction {
            ContradictionPolicy::Halt => Err(WfcError::Contradiction { x, y }),
            ContradictionPolicy::Restart { max_attempts } => {
                if self.attempts >= max_attempts {
                    return Err(WfcError::Unsatisfiable {
                        attempts: self.attempts,
                    });
                }
                warn!(
                    "Attempt {} hit a contradiction at ({}, {}), restarting",
                    self.attempts, x, y
                );
                self.restart();
                Ok(())
            }
        }
    }

    /// Step until finished, recovering from contradictions per the policy.
    pub fn run(&mut self) -> WfcResult<RunSummary> {
        loop {
            match self.grid.step() {
                StepOutcome::Collapsed { .. } => {}
                StepOutcome::Finished => {
                    info!(
                        "Solved {}x{} in {} attempt(s)",
                        self.options.width, self.options.height, self.attempts
                    );
                    return Ok(RunSummary {
                        attempts: self.attempts,
                        collapses: self.grid.collapses(),
                    });
                }
                StepOutcome::Contradiction { x, y } => self.recover(x, y)?,
            }
        }
    }
}
