//! Regular 3D block decomposition.
//!
//! A global box of `Nx × Ny × Nz` entries is numbered
//! `global = i + Nx·j + Nx·Ny·k`. The processor grid splits each axis into
//! contiguous blocks; when an axis does not divide evenly the first
//! `n mod p` blocks get one extra entry. Ranks map to processor coordinates
//! x-fastest, the same way entries map to global indices.

use std::ops::Range;

use super::IndexDecomposition;
use super::rank::RankSource;
use crate::stg_error::StgError;

/// Number of ranks along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcGrid {
    dims: [usize; 3],
}

impl ProcGrid {
    pub fn new(dims: [usize; 3]) -> Result<Self, StgError> {
        if dims.contains(&0) {
            return Err(StgError::InvalidDecomposition(format!(
                "processor grid {dims:?} has an empty axis"
            )));
        }
        checked_product(dims).ok_or_else(|| {
            StgError::InvalidDecomposition(format!("processor grid {dims:?} overflows"))
        })?;
        Ok(Self { dims })
    }

    /// Factor `nranks` into a grid over `global`, choosing the split whose
    /// sub-boxes have the smallest surface. Every axis gets at most as many
    /// ranks as it has entries.
    pub fn auto(nranks: usize, global: [usize; 3]) -> Result<Self, StgError> {
        let mut best: Option<([usize; 3], f64)> = None;
        for px in divisors(nranks) {
            for py in divisors(nranks / px) {
                let pz = nranks / px / py;
                let dims = [px, py, pz];
                if dims.iter().zip(global).any(|(&p, n)| p > n) {
                    continue;
                }
                let b: Vec<f64> = dims
                    .iter()
                    .zip(global)
                    .map(|(&p, n)| n as f64 / p as f64)
                    .collect();
                let surface = b[0] * b[1] + b[1] * b[2] + b[0] * b[2];
                if best.is_none_or(|(_, s)| surface < s) {
                    best = Some((dims, surface));
                }
            }
        }
        let (dims, _) = best.ok_or_else(|| {
            StgError::InvalidDecomposition(format!(
                "cannot place {nranks} ranks on a {global:?} domain"
            ))
        })?;
        log::debug!("auto processor grid for {nranks} ranks on {global:?}: {dims:?}");
        Self::new(dims)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of ranks.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Processor coordinates of `rank` (x-fastest).
    pub fn coords_of(&self, rank: usize) -> Option<[usize; 3]> {
        unflatten(rank, self.dims)
    }

    /// Rank at processor coordinates `coords`.
    pub fn rank_of(&self, coords: [usize; 3]) -> Option<usize> {
        flatten(coords, self.dims)
    }
}

/// One rank's block of a regular global box.
///
/// # Invariants
/// - `origin[a] + size[a] <= global[a]` on every axis.
/// - `local_count() == size.iter().product()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegularDecomposition {
    global: [usize; 3],
    origin: [usize; 3],
    size: [usize; 3],
    global_count: usize,
    local_count: usize,
    placement: Option<(ProcGrid, usize)>,
}

impl RegularDecomposition {
    /// Block owned by `rank` when `global` is split over `proc_grid`.
    ///
    /// # Errors
    /// [`StgError::InvalidDecomposition`] if an axis has more ranks than
    /// entries, or `rank` is outside the grid.
    pub fn new(global: [usize; 3], proc_grid: [usize; 3], rank: usize) -> Result<Self, StgError> {
        let grid = ProcGrid::new(proc_grid)?;
        for axis in 0..3 {
            if grid.dims[axis] > global[axis] {
                return Err(StgError::InvalidDecomposition(format!(
                    "axis {axis} has {} entries for {} ranks",
                    global[axis], grid.dims[axis]
                )));
            }
        }
        let coords = grid.coords_of(rank).ok_or_else(|| {
            StgError::InvalidDecomposition(format!(
                "rank {rank} outside a grid of {} ranks",
                grid.size()
            ))
        })?;
        let mut origin = [0; 3];
        let mut size = [0; 3];
        for axis in 0..3 {
            let block = block_range(global[axis], grid.dims[axis], coords[axis]);
            origin[axis] = block.start;
            size[axis] = block.len();
        }
        let mut decomp = Self::from_local_box(global, origin, size)?;
        decomp.placement = Some((grid, rank));
        log::debug!(
            "rank {rank} of {:?} owns origin {origin:?} size {size:?}",
            grid.dims
        );
        Ok(decomp)
    }

    /// Decomposition from an externally computed local box.
    ///
    /// # Errors
    /// [`StgError::InvalidDecomposition`] if the box leaves the global
    /// domain or a count overflows.
    pub fn from_local_box(
        global: [usize; 3],
        origin: [usize; 3],
        size: [usize; 3],
    ) -> Result<Self, StgError> {
        for axis in 0..3 {
            let end = origin[axis].checked_add(size[axis]);
            if end.is_none_or(|e| e > global[axis]) {
                return Err(StgError::InvalidDecomposition(format!(
                    "local box {origin:?}+{size:?} exceeds global extent {global:?} on axis {axis}"
                )));
            }
        }
        let global_count = checked_product(global).ok_or_else(|| {
            StgError::InvalidDecomposition(format!("global extent {global:?} overflows"))
        })?;
        Ok(Self {
            global,
            origin,
            size,
            global_count,
            local_count: size.iter().product(),
            placement: None,
        })
    }

    /// Block owned by the calling rank, with the processor grid chosen by
    /// [`ProcGrid::auto`].
    pub fn from_comm<R: RankSource>(global: [usize; 3], comm: &R) -> Result<Self, StgError> {
        let grid = ProcGrid::auto(comm.size(), global)?;
        Self::new(global, grid.dims(), comm.rank())
    }

    pub fn global_extent(&self) -> [usize; 3] {
        self.global
    }

    pub fn local_origin(&self) -> [usize; 3] {
        self.origin
    }

    pub fn local_extent(&self) -> [usize; 3] {
        self.size
    }

    /// Processor grid and rank, when built from one.
    pub fn placement(&self) -> Option<(ProcGrid, usize)> {
        self.placement
    }

    /// Owned (i,j,k) ranges, per axis.
    pub fn local_ijk_range(&self) -> [Range<usize>; 3] {
        std::array::from_fn(|a| self.origin[a]..self.origin[a] + self.size[a])
    }

    /// `i + Nx·j + Nx·Ny·k`.
    ///
    /// # Errors
    /// [`StgError::IndexOutOfDomain`] naming the first coordinate outside
    /// its axis.
    pub fn global_of(&self, ijk: [usize; 3]) -> Result<usize, StgError> {
        for axis in 0..3 {
            if ijk[axis] >= self.global[axis] {
                return Err(StgError::IndexOutOfDomain {
                    index: ijk[axis],
                    count: self.global[axis],
                });
            }
        }
        Ok(ijk[0] + self.global[0] * (ijk[1] + self.global[1] * ijk[2]))
    }

    /// Inverse of [`global_of`](Self::global_of).
    pub fn ijk_of(&self, global: usize) -> Result<[usize; 3], StgError> {
        unflatten(global, self.global).ok_or(StgError::IndexOutOfDomain {
            index: global,
            count: self.global_count,
        })
    }

    /// Whether (i,j,k) lies in this rank's box.
    pub fn contains_ijk(&self, ijk: [usize; 3]) -> bool {
        (0..3).all(|a| ijk[a] >= self.origin[a] && ijk[a] - self.origin[a] < self.size[a])
    }

    /// Rank owning `global`, when the decomposition came from a processor
    /// grid. `None` for indices outside the domain.
    pub fn owner_of(&self, global: usize) -> Option<usize> {
        let (grid, _) = self.placement?;
        let ijk = self.ijk_of(global).ok()?;
        let mut coords = [0; 3];
        for axis in 0..3 {
            coords[axis] = block_owner(self.global[axis], grid.dims[axis], ijk[axis]);
        }
        grid.rank_of(coords)
    }
}

impl IndexDecomposition for RegularDecomposition {
    fn global_count(&self) -> usize {
        self.global_count
    }

    fn local_count(&self) -> usize {
        self.local_count
    }

    fn global_to_local(&self, global: usize) -> usize {
        let Ok(ijk) = self.ijk_of(global) else {
            return self.local_count;
        };
        if !self.contains_ijk(ijk) {
            return self.local_count;
        }
        let rel: [usize; 3] = std::array::from_fn(|a| ijk[a] - self.origin[a]);
        flatten(rel, self.size).unwrap_or(self.local_count)
    }

    fn local_to_global(&self, local: usize) -> Option<usize> {
        let rel = unflatten(local, self.size)?;
        self.global_of(std::array::from_fn(|a| rel[a] + self.origin[a]))
            .ok()
    }
}

/// Range of coordinates held by block `c` of `p` over `n` entries.
fn block_range(n: usize, p: usize, c: usize) -> Range<usize> {
    let base = n / p;
    let rem = n % p;
    let start = c * base + c.min(rem);
    let len = base + usize::from(c < rem);
    start..start + len
}

/// Block holding coordinate `x`; inverse of [`block_range`]. Requires
/// `p <= n`.
fn block_owner(n: usize, p: usize, x: usize) -> usize {
    let base = n / p;
    let rem = n % p;
    let wide = rem * (base + 1);
    if x < wide {
        x / (base + 1)
    } else {
        rem + (x - wide) / base
    }
}

fn flatten(c: [usize; 3], dims: [usize; 3]) -> Option<usize> {
    if (0..3).any(|a| c[a] >= dims[a]) {
        return None;
    }
    Some(c[0] + dims[0] * (c[1] + dims[1] * c[2]))
}

fn unflatten(index: usize, dims: [usize; 3]) -> Option<[usize; 3]> {
    if index >= checked_product(dims)? {
        return None;
    }
    let plane = dims[0] * dims[1];
    Some([index % dims[0], (index % plane) / dims[0], index / plane])
}

fn checked_product(dims: [usize; 3]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn divisors(n: usize) -> impl Iterator<Item = usize> {
    (1..=n).filter(move |d| n % d == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_tile_the_axis_with_remainder_first() {
        let blocks: Vec<_> = (0..3).map(|c| block_range(10, 3, c)).collect();
        assert_eq!(blocks, [0..4, 4..7, 7..10]);
        for x in 0..10 {
            let owner = block_owner(10, 3, x);
            assert!(blocks[owner].contains(&x));
        }
    }

    #[test]
    fn ranks_are_x_fastest() {
        let grid = ProcGrid::new([2, 3, 1]).unwrap();
        assert_eq!(grid.coords_of(0), Some([0, 0, 0]));
        assert_eq!(grid.coords_of(1), Some([1, 0, 0]));
        assert_eq!(grid.coords_of(2), Some([0, 1, 0]));
        assert_eq!(grid.coords_of(5), Some([1, 2, 0]));
        assert_eq!(grid.coords_of(6), None);
        assert_eq!(grid.rank_of([1, 2, 0]), Some(5));
    }

    #[test]
    fn global_numbering() {
        let d = RegularDecomposition::new([4, 3, 2], [1, 1, 1], 0).unwrap();
        assert_eq!(d.global_of([1, 2, 1]).unwrap(), 1 + 4 * 2 + 12);
        assert_eq!(d.ijk_of(21).unwrap(), [1, 2, 1]);
        assert_eq!(
            d.global_of([4, 0, 0]),
            Err(StgError::IndexOutOfDomain { index: 4, count: 4 })
        );
        assert!(d.ijk_of(24).is_err());
        // serial: local numbering is the global numbering
        assert!((0..24).all(|g| d.global_to_local(g) == g));
    }

    #[test]
    fn foreign_and_out_of_domain_map_to_sentinel() {
        // 4x2x1 over 2x1x1: rank 1 owns i in 2..4
        let d = RegularDecomposition::new([4, 2, 1], [2, 1, 1], 1).unwrap();
        assert_eq!(d.local_count(), 4);
        assert_eq!(d.local_ijk_range(), [2..4, 0..2, 0..1]);
        assert_eq!(d.global_to_local(d.global_of([2, 0, 0]).unwrap()), 0);
        assert_eq!(d.global_to_local(d.global_of([3, 1, 0]).unwrap()), 3);
        assert!(d.global_to_local(d.global_of([1, 1, 0]).unwrap()) >= d.local_count());
        assert!(d.global_to_local(1000) >= d.local_count());
        assert_eq!(d.try_global_to_local(0), None);
        assert_eq!(d.local_to_global(3), Some(7));
        assert_eq!(d.local_to_global(4), None);
        assert_eq!(d.owned_globals().collect::<Vec<_>>(), [2, 3, 6, 7]);
    }

    #[test]
    fn owner_agrees_with_each_ranks_view() {
        let global = [7, 5, 3];
        let grid = [3, 2, 1];
        let ranks: Vec<_> = (0..6)
            .map(|r| RegularDecomposition::new(global, grid, r).unwrap())
            .collect();
        let total: usize = ranks.iter().map(|d| d.local_count()).sum();
        assert_eq!(total, 7 * 5 * 3);
        for g in 0..ranks[0].global_count() {
            let owner = ranks[0].owner_of(g).unwrap();
            for (r, d) in ranks.iter().enumerate() {
                assert_eq!(d.is_local(g), r == owner, "global {g} rank {r}");
            }
        }
        assert_eq!(ranks[0].owner_of(7 * 5 * 3), None);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(RegularDecomposition::new([2, 2, 2], [3, 1, 1], 0).is_err());
        assert!(RegularDecomposition::new([4, 4, 4], [2, 2, 1], 4).is_err());
        assert!(RegularDecomposition::new([4, 4, 4], [0, 1, 1], 0).is_err());
        assert!(RegularDecomposition::from_local_box([4, 4, 4], [3, 0, 0], [2, 1, 1]).is_err());
        assert!(
            RegularDecomposition::from_local_box([usize::MAX, 2, 1], [0; 3], [1, 1, 1]).is_err()
        );
    }

    #[test]
    fn auto_grid_prefers_compact_blocks() {
        let grid = ProcGrid::auto(4, [100, 100, 1]).unwrap();
        assert_eq!(grid.dims(), [2, 2, 1]);
        assert_eq!(ProcGrid::auto(1, [3, 3, 3]).unwrap().dims(), [1, 1, 1]);
        assert!(ProcGrid::auto(5, [2, 2, 1]).is_err());
    }

    #[test]
    fn from_comm_uses_rank_info() {
        let comm = crate::decomp::RankInfo::new(3, 4).unwrap();
        let d = RegularDecomposition::from_comm([8, 8, 1], &comm).unwrap();
        assert_eq!(d.placement().map(|(g, r)| (g.dims(), r)), Some(([2, 2, 1], 3)));
        assert_eq!(d.local_ijk_range(), [4..8, 4..8, 0..1]);
    }
}
