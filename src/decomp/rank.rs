//! Where a rank learns its id and the number of ranks.
//!
//! The core never communicates; it only needs `rank`/`size` once, at setup.

use crate::stg_error::StgError;

/// Source of this process's rank and the communicator size.
pub trait RankSource {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;
}

/// Serial run: rank 0 of 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl RankSource for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }
}

/// Rank and size supplied explicitly (tests, or an external launcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankInfo {
    rank: usize,
    size: usize,
}

impl RankInfo {
    pub fn new(rank: usize, size: usize) -> Result<Self, StgError> {
        if rank >= size {
            return Err(StgError::InvalidDecomposition(format!(
                "rank {rank} is not below communicator size {size}"
            )));
        }
        Ok(Self { rank, size })
    }
}

impl RankSource for RankInfo {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::RankSource;
    use mpi::traits::Communicator;

    impl<C: Communicator> RankSource for C {
        fn rank(&self) -> usize {
            Communicator::rank(self) as usize
        }

        fn size(&self) -> usize {
            Communicator::size(self) as usize
        }
    }
}
