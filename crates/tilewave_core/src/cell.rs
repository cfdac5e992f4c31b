//! One grid location's domain of still-possible tile variants.
//!
//! The domain is a flag per catalog index plus a running count, the same
//! layout the wave uses for patterns. It only shrinks, except for `collapse`
//! which narrows it to a single member.

use crate::catalog::{Catalog, TileVariant};
use crate::error::{WfcError, WfcResult};
use crate::rng::WfcRng;
use crate::socket::Edge;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// `allowed[v]` = variant `v` is still possible here
    allowed: Vec<bool>,
    /// Number of `true` entries in `allowed`
    remaining: usize,
}

impl Cell {
    /// A cell that may still be any variant of the catalog.
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_len(catalog.len())
    }

    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            allowed: vec![true; len],
            remaining: len,
        }
    }

    /// `|domain| - 1`: zero when resolved, -1 when contradicted.
    #[inline]
    pub fn entropy(&self) -> isize {
        self.remaining as isize - 1
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.remaining == 1
    }

    /// The domain is empty: no variant satisfies the neighbors.
    #[inline]
    pub fn is_contradiction(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[inline]
    pub fn allows(&self, variant: usize) -> bool {
        self.allowed.get(variant).copied().unwrap_or(false)
    }

    /// Catalog indices still possible, ascending.
    pub fn possible_variants(&self) -> Vec<usize> {
        self.iter_possible().collect()
    }

    fn iter_possible(&self) -> impl Iterator<Item = usize> + '_ {
        self.allowed
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
    }

    /// Narrow this cell against the neighbor across `edge`.
    ///
    /// A variant survives if at least one variant still possible in
    /// `neighbor` fits against it. Collapsed cells are left alone. Returns
    /// true if anything was removed.
    pub fn constrain(&mut self, neighbor: &Cell, edge: Edge, catalog: &Catalog) -> bool {
        if self.is_collapsed() {
            return false;
        }

        let unsupported: Vec<usize> = self
            .iter_possible()
            .filter(|&v| {
                !catalog
                    .compatible(v, edge)
                    .iter()
                    .any(|&w| neighbor.allows(w))
            })
            .collect();

        for &v in &unsupported {
            self.allowed[v] = false;
        }
        self.remaining -= unsupported.len();

        !unsupported.is_empty()
    }

    /// Pick one remaining variant uniformly at random and keep only it.
    ///
    /// Returns `None` without drawing from `rng` when the domain is empty.
    pub fn collapse(&mut self, rng: &mut dyn WfcRng) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }

        let choice = rng.next_usize_max(self.remaining);
        let picked = self.iter_possible().nth(choice)?;

        self.allowed.fill(false);
        self.allowed[picked] = true;
        self.remaining = 1;
        Some(picked)
    }

    /// The variant this cell resolved to.
    pub fn resolved_variant(&self) -> WfcResult<usize> {
        if !self.is_collapsed() {
            return Err(WfcError::NotCollapsed {
                remaining: self.remaining,
            });
        }
        self.iter_possible().next().ok_or(WfcError::NotCollapsed {
            remaining: self.remaining,
        })
    }

    /// The tile this cell resolved to, looked up in `catalog`.
    pub fn resolved_tile<'c>(&self, catalog: &'c Catalog) -> WfcResult<&'c TileVariant> {
        let index = self.resolved_variant()?;
        catalog.get(index).ok_or(WfcError::NotCollapsed {
            remaining: self.remaining,
        })
    }
}
