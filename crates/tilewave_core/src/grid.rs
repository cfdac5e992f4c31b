//! The solver grid: propagation, minimum entropy search and the collapse loop.
//!
//! A solve is driven from outside, one [`Grid::step`] per tick:
//!
//! 1. [`Grid::seed`] collapses a random cell and propagates.
//! 2. Each `step` collapses the lowest entropy cell and propagates again.
//! 3. Once no uncollapsed cell is left the grid is [`SolveState::Finished`].
//!
//! A cell whose domain becomes empty halts the solve in
//! [`SolveState::Contradiction`]; there is no backtracking. Callers that want
//! another try rebuild the grid (see [`Model`](crate::Model)).

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::catalog::Catalog;
use crate::cell::Cell;
use crate::error::{WfcError, WfcResult};
use crate::options::Propagation;
use crate::rng::WfcRng;
use crate::socket::Edge;

/// Where a solve currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    /// Cells left to collapse
    Running,
    /// Every cell is collapsed
    Finished,
    /// The cell at `(x, y)` has no variant left
    Contradiction { x: usize, y: usize },
}

/// Result of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The cell at `(x, y)` was collapsed to `variant`.
    Collapsed { x: usize, y: usize, variant: usize },
    /// Nothing left to do.
    Finished,
    /// The solve is stuck on the cell at `(x, y)`.
    Contradiction { x: usize, y: usize },
}

pub struct Grid {
    catalog: Arc<Catalog>,
    width: usize,
    height: usize,
    /// Row-major: index = x + y * width
    cells: Vec<Cell>,
    rng: Box<dyn WfcRng>,
    propagation: Propagation,
    state: SolveState,
    /// Number of successful `Cell::collapse` calls, seed included
    collapses: usize,
    /// Whether a full propagation has run since construction
    settled: bool,
    /// Worklist buffers, reused between propagations
    queue: VecDeque<usize>,
    queued: Vec<bool>,
}

impl Grid {
    /// Create a grid with every cell able to take any catalog variant.
    pub fn new(
        catalog: Arc<Catalog>,
        width: usize,
        height: usize,
        rng: Box<dyn WfcRng>,
    ) -> WfcResult<Self> {
        if catalog.is_empty() {
            return Err(WfcError::EmptyCatalog);
        }
        if width == 0 || height == 0 {
            return Err(WfcError::InvalidDimensions { width, height });
        }

        let length = width * height;
        let cells = vec![Cell::new(&catalog); length];

        Ok(Self {
            catalog,
            width,
            height,
            cells,
            rng,
            propagation: Propagation::default(),
            state: SolveState::Running,
            collapses: 0,
            settled: false,
            queue: VecDeque::with_capacity(length),
            queued: vec![false; length],
        })
    }

    pub fn with_propagation(mut self, propagation: Propagation) -> Self {
        self.propagation = propagation;
        self
    }

    /// Throw away every cell and start from full domains again.
    ///
    /// Only the catalog, the dimensions and the random stream carry over, so
    /// the next [`seed`](Self::seed) continues where the last solve's draws
    /// stopped.
    pub fn restart(&mut self) {
        let length = self.width * self.height;
        self.cells = vec![Cell::new(&self.catalog); length];
        self.state = SolveState::Running;
        self.collapses = 0;
        self.settled = false;
        self.queue.clear();
        self.queued.fill(false);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    /// True once no uncollapsed cell is left. Never true after a contradiction.
    pub fn finished(&self) -> bool {
        self.state == SolveState::Finished
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self.state, SolveState::Contradiction { .. })
    }

    /// Number of collapses performed so far, including the seed.
    pub fn collapses(&self) -> usize {
        self.collapses
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.index(x, y))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_collapsed()).count()
    }

    /// Resolved catalog index per cell, row-major; `None` for open cells.
    pub fn resolved_variants(&self) -> Vec<Option<usize>> {
        self.cells
            .iter()
            .map(|c| c.resolved_variant().ok())
            .collect()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    #[inline]
    fn coords(&self, i: usize) -> (usize, usize) {
        (i % self.width, i / self.width)
    }

    /// Index of the neighbor across `edge`, if it exists.
    fn neighbor(&self, i: usize, edge: Edge) -> Option<usize> {
        let (x, y) = self.coords(i);
        let (dx, dy) = edge.delta();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        if nx >= self.width || ny >= self.height {
            return None;
        }
        Some(self.index(nx, ny))
    }

    /// Collapse a uniformly chosen cell and propagate from it.
    ///
    /// Draws `x` first, then `y`.
    pub fn seed(&mut self) -> StepOutcome {
        if let Some(outcome) = self.terminal_outcome() {
            return outcome;
        }
        let x = self.rng.next_usize_max(self.width);
        let y = self.rng.next_usize_max(self.height);
        debug!("Seeding at ({}, {})", x, y);
        self.collapse_at(x, y)
    }

    /// Perform one collapse.
    ///
    /// Picks the lowest entropy cell; if it is already collapsed the grid is
    /// finished. After a contradiction or once finished this does nothing and
    /// returns the same outcome again.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(outcome) = self.terminal_outcome() {
            return outcome;
        }

        let (x, y) = self.find_lowest_entropy_cell();
        let i = self.index(x, y);
        if self.cells[i].is_collapsed() {
            self.state = SolveState::Finished;
            info!(
                "Solve finished: {}x{} grid after {} collapses",
                self.width, self.height, self.collapses
            );
            return StepOutcome::Finished;
        }

        self.collapse_at(x, y)
    }

    fn terminal_outcome(&self) -> Option<StepOutcome> {
        match self.state {
            SolveState::Running => None,
            SolveState::Finished => Some(StepOutcome::Finished),
            SolveState::Contradiction { x, y } => Some(StepOutcome::Contradiction { x, y }),
        }
    }

    fn collapse_at(&mut self, x: usize, y: usize) -> StepOutcome {
        let i = self.index(x, y);
        let Some(variant) = self.cells[i].collapse(self.rng.as_mut()) else {
            self.halt(x, y);
            return StepOutcome::Contradiction { x, y };
        };
        self.collapses += 1;
        debug!(
            "Collapsed ({}, {}) to '{}'",
            x,
            y,
            self.catalog.get(variant).map_or("?", |v| v.id())
        );

        self.propagate(x, y);

        match self.state {
            SolveState::Contradiction { x, y } => StepOutcome::Contradiction { x, y },
            _ => StepOutcome::Collapsed { x, y, variant },
        }
    }

    fn halt(&mut self, x: usize, y: usize) {
        warn!("Contradiction at ({}, {}): no tile variant fits", x, y);
        self.state = SolveState::Contradiction { x, y };
    }

    /// Find the uncollapsed cell with the lowest entropy.
    ///
    /// Row-major scan; the first cell seen wins ties. Returns `(0, 0)` when
    /// every cell is collapsed, so callers must check the returned cell.
    /// An empty cell has entropy -1 and is therefore preferred.
    pub fn find_lowest_entropy_cell(&self) -> (usize, usize) {
        let mut best = (0, 0);
        let mut min_entropy = self.catalog.len() as isize;

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[self.index(x, y)];
                if cell.is_collapsed() {
                    continue;
                }
                let entropy = cell.entropy();
                if entropy < min_entropy {
                    min_entropy = entropy;
                    best = (x, y);
                }
            }
        }

        best
    }

    /// Narrow every cell until no neighbor constraint removes anything.
    ///
    /// `(x, y)` is the cell that just changed. It is only used as the starting
    /// point of [`Propagation::Worklist`]; [`Propagation::Rescan`] always
    /// looks at the whole grid. Returns true if any cell was narrowed.
    /// Afterwards the first empty cell, if any, halts the solve.
    pub fn propagate(&mut self, x: usize, y: usize) -> bool {
        let narrowed = match self.propagation {
            Propagation::Rescan => self.propagate_rescan(),
            Propagation::Worklist => self.propagate_worklist(self.index(x, y)),
        };
        self.settled = true;

        if let Some(i) = self.cells.iter().position(Cell::is_contradiction) {
            let (cx, cy) = self.coords(i);
            self.halt(cx, cy);
        }

        narrowed
    }

    fn propagate_rescan(&mut self) -> bool {
        let mut narrowed = false;
        let mut passes = 0;

        loop {
            let mut changed = false;
            passes += 1;
            for i in 0..self.cells.len() {
                if self.narrow_cell(i) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            narrowed = true;
        }

        trace!("Propagation settled after {} passes", passes);
        narrowed
    }

    fn propagate_worklist(&mut self, origin: usize) -> bool {
        self.queue.clear();
        self.queued.fill(false);

        if self.settled {
            for edge in Edge::ALL {
                if let Some(j) = self.neighbor(origin, edge) {
                    self.enqueue(j);
                }
            }
        } else {
            // Nothing has been narrowed yet: every cell needs a first look
            for i in 0..self.cells.len() {
                self.enqueue(i);
            }
        }

        let mut narrowed = false;
        let mut visits = 0;

        while let Some(i) = self.queue.pop_front() {
            self.queued[i] = false;
            visits += 1;
            if self.narrow_cell(i) {
                narrowed = true;
                for edge in Edge::ALL {
                    if let Some(j) = self.neighbor(i, edge) {
                        self.enqueue(j);
                    }
                }
            }
        }

        trace!("Propagation settled after {} cell visits", visits);
        narrowed
    }

    fn enqueue(&mut self, i: usize) {
        if !self.queued[i] {
            self.queued[i] = true;
            self.queue.push_back(i);
        }
    }

    /// Constrain cell `i` against each existing neighbor, TOP, RIGHT,
    /// BOTTOM, LEFT. Every edge is checked even after one narrows.
    fn narrow_cell(&mut self, i: usize) -> bool {
        let mut changed = false;
        for edge in Edge::ALL {
            if let Some(j) = self.neighbor(i, edge) {
                if self.constrain_pair(i, j, edge) {
                    changed = true;
                }
            }
        }
        changed
    }

    fn constrain_pair(&mut self, i: usize, j: usize, edge: Edge) -> bool {
        debug_assert_ne!(i, j);
        let (cell, neighbor) = if i < j {
            let (lo, hi) = self.cells.split_at_mut(j);
            (&mut lo[i], &hi[0])
        } else {
            let (lo, hi) = self.cells.split_at_mut(i);
            (&mut hi[0], &lo[j])
        };
        cell.constrain(neighbor, edge, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TileVariant;
    use crate::rng::{ScriptedRandom, StdRandom};
    use crate::socket::Socket;

    fn plain(id: &str, sockets: [i64; 4]) -> TileVariant {
        TileVariant::plain(id, sockets.map(|s| Socket::new(s, s, s)))
    }

    /// Every combination of two socket kinds on four edges: always solvable.
    fn two_color_catalog() -> Arc<Catalog> {
        let variants = (0..16)
            .map(|bits: i64| {
                plain(
                    &format!("t{:02}", bits),
                    [bits & 1, (bits >> 1) & 1, (bits >> 2) & 1, (bits >> 3) & 1],
                )
            })
            .collect();
        Arc::new(Catalog::new(8, variants).unwrap())
    }

    /// Two tiles that only fit against themselves.
    fn island_catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(8, vec![plain("land", [0; 4]), plain("sea", [1; 4])]).unwrap(),
        )
    }

    fn scripted(catalog: Arc<Catalog>, w: usize, h: usize, picks: Vec<usize>) -> Grid {
        Grid::new(catalog, w, h, Box::new(ScriptedRandom::new(picks))).unwrap()
    }

    #[test]
    fn test_new_rejects_empty_catalog() {
        let catalog = Arc::new(Catalog::new(8, Vec::new()).unwrap());
        let result = Grid::new(catalog, 3, 3, Box::new(ScriptedRandom::first()));
        assert!(matches!(result, Err(WfcError::EmptyCatalog)));
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        let result = Grid::new(island_catalog(), 0, 3, Box::new(ScriptedRandom::first()));
        assert!(matches!(
            result,
            Err(WfcError::InvalidDimensions {
                width: 0,
                height: 3
            })
        ));
    }

    #[test]
    fn test_get_bounds() {
        let grid = scripted(island_catalog(), 3, 2, vec![0]);
        assert!(grid.get(2, 1).is_some());
        assert!(grid.get(3, 0).is_none());
        assert!(grid.get(0, 2).is_none());
    }

    #[test]
    fn test_seed_draws_x_then_y() {
        let mut grid = scripted(two_color_catalog(), 4, 3, vec![2, 1, 5]);
        let outcome = grid.seed();
        assert_eq!(
            outcome,
            StepOutcome::Collapsed {
                x: 2,
                y: 1,
                variant: 5
            }
        );
        assert!(grid.get(2, 1).unwrap().is_collapsed());
        assert_eq!(grid.collapses(), 1);
    }

    #[test]
    fn test_seed_propagates_to_whole_grid() {
        // Islands: one collapse decides the whole connected grid
        let mut grid = scripted(island_catalog(), 3, 3, vec![1, 1, 1]);
        grid.seed();
        for cell in grid.cells() {
            assert_eq!(cell.resolved_variant().unwrap(), 1);
        }
        assert_eq!(grid.step(), StepOutcome::Finished);
        assert!(grid.finished());
    }

    #[test]
    fn test_lowest_entropy_tie_breaks_row_major() {
        let grid = scripted(two_color_catalog(), 3, 3, vec![0]);
        assert_eq!(grid.find_lowest_entropy_cell(), (0, 0));
    }

    #[test]
    fn test_lowest_entropy_prefers_narrowed_cell() {
        // Seed at (1, 1): its four neighbors drop to 8 variants, the rest keep 16
        let mut grid = scripted(two_color_catalog(), 3, 3, vec![1, 1, 0]);
        grid.seed();
        assert_eq!(grid.get(1, 0).unwrap().remaining(), 8);
        assert_eq!(grid.get(0, 0).unwrap().remaining(), 16);
        // (1, 0) is the first of the four tied neighbors in row-major order
        assert_eq!(grid.find_lowest_entropy_cell(), (1, 0));

        grid.step();
        assert!(grid.get(1, 0).unwrap().is_collapsed());
    }

    #[test]
    fn test_lowest_entropy_defaults_when_all_collapsed() {
        let catalog = Arc::new(Catalog::new(8, vec![plain("only", [0; 4])]).unwrap());
        let grid = scripted(catalog, 2, 2, vec![0]);
        assert_eq!(grid.find_lowest_entropy_cell(), (0, 0));
        assert!(grid.get(0, 0).unwrap().is_collapsed());
    }

    #[test]
    fn test_propagate_reaches_fixed_point() {
        let mut grid = scripted(two_color_catalog(), 4, 4, vec![0, 0, 3]);
        grid.seed();
        let snapshot = grid.cells().to_vec();
        assert!(!grid.propagate(0, 0));
        assert_eq!(grid.cells(), snapshot.as_slice());
    }

    #[test]
    fn test_contradiction_halts_solve() {
        // Neither tile fits against anything, itself included
        let catalog = Arc::new(
            Catalog::new(
                8,
                vec![
                    TileVariant::plain("a", std::array::from_fn(|_| Socket::new(1, 2, 3))),
                    TileVariant::plain("b", std::array::from_fn(|_| Socket::new(4, 5, 6))),
                ],
            )
            .unwrap(),
        );
        let mut grid = scripted(catalog, 2, 1, vec![0, 0, 0]);

        let outcome = grid.seed();
        assert_eq!(outcome, StepOutcome::Contradiction { x: 1, y: 0 });
        assert!(grid.is_contradiction());
        assert!(!grid.finished());
        assert!(grid.get(1, 0).unwrap().is_contradiction());
        assert_eq!(grid.get(1, 0).unwrap().entropy(), -1);

        // Further steps do nothing
        assert_eq!(grid.step(), StepOutcome::Contradiction { x: 1, y: 0 });
        assert_eq!(grid.collapses(), 1);
    }

    #[test]
    fn test_worklist_matches_rescan() {
        for seed in [1, 7, 42, 1234] {
            let mut rescan = Grid::new(
                two_color_catalog(),
                6,
                5,
                Box::new(StdRandom::from_seed(seed)),
            )
            .unwrap();
            let mut worklist = Grid::new(
                two_color_catalog(),
                6,
                5,
                Box::new(StdRandom::from_seed(seed)),
            )
            .unwrap()
            .with_propagation(Propagation::Worklist);

            assert_eq!(rescan.seed(), worklist.seed());
            assert_eq!(rescan.cells(), worklist.cells());
            loop {
                let a = rescan.step();
                let b = worklist.step();
                assert_eq!(a, b);
                assert_eq!(rescan.cells(), worklist.cells());
                if a == StepOutcome::Finished {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_worklist_strips_unsupported_everywhere() {
        // "dead" has a right edge nothing matches, so it can only survive in
        // the last column
        let catalog = Arc::new(
            Catalog::new(8, vec![plain("open", [0; 4]), plain("dead", [0, 9, 0, 0])]).unwrap(),
        );
        let mut grid = scripted(catalog, 4, 3, vec![3, 2, 0])
            .with_propagation(Propagation::Worklist);
        grid.seed();

        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(grid.get(x, y).unwrap().possible_variants(), vec![0]);
            }
        }
        assert_eq!(grid.get(3, 0).unwrap().possible_variants(), vec![0, 1]);
        assert_eq!(grid.get(3, 2).unwrap().resolved_variant().unwrap(), 0);
    }

    #[test]
    fn test_restart_discards_cells() {
        let catalog = Arc::new(
            Catalog::new(
                8,
                vec![
                    TileVariant::plain("a", std::array::from_fn(|_| Socket::new(1, 2, 3))),
                    TileVariant::plain("b", std::array::from_fn(|_| Socket::new(4, 5, 6))),
                ],
            )
            .unwrap(),
        );
        let mut grid = scripted(catalog, 2, 1, vec![0]);
        grid.seed();
        assert!(grid.is_contradiction());

        grid.restart();
        assert_eq!(grid.state(), SolveState::Running);
        assert_eq!(grid.collapses(), 0);
        assert!(grid.cells().iter().all(|c| c.remaining() == 2));
    }

    #[test]
    fn test_resolved_variants() {
        let mut grid = scripted(island_catalog(), 2, 2, vec![0, 0, 0]);
        assert_eq!(grid.resolved_variants(), vec![None; 4]);
        grid.seed();
        assert_eq!(grid.resolved_variants(), vec![Some(0); 4]);
        assert_eq!(grid.collapsed_count(), 4);
    }
}
