//! Exchange of individuals between islands.

use super::population::Population;
use super::types::Genome;
use crate::error::GaError;
use crate::random::random_ints;
use rand::rngs::StdRng;

/// Moves individuals between islands.
///
/// Runs sequentially on the GA's master RNG, before any island is advanced,
/// since it touches several islands at once.
pub trait Migrator<G: Genome>: Send + Sync {
    fn apply(&self, pops: &mut [Population<G>], rng: &mut StdRng) -> Result<(), GaError>;

    fn validate(&self) -> Result<(), GaError>;
}

/// Ring migration.
///
/// For every adjacent pair of islands `(i, i + 1)`, `n_migrants` positions
/// are sampled without replacement and the individuals at those positions
/// are swapped. Sizes are preserved. When `n_migrants` reaches the island
/// size every position is swapped, which exchanges the islands wholesale.
///
/// # Examples
///
/// ```
/// use u_evolve::ga::MigRing;
///
/// // Swap 2 individuals between each pair of neighbouring islands
/// let mig = MigRing { n_migrants: 2 };
/// assert_eq!(mig.n_migrants, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MigRing {
    pub n_migrants: usize,
}

impl<G: Genome> Migrator<G> for MigRing {
    fn apply(&self, pops: &mut [Population<G>], rng: &mut StdRng) -> Result<(), GaError> {
        for i in 1..pops.len() {
            let (left, right) = pops.split_at_mut(i);
            let a = &mut left[i - 1].individuals;
            let b = &mut right[0].individuals;
            if a.len() != b.len() {
                return Err(GaError::invariant(format!(
                    "islands {} and {} differ in size ({} vs {})",
                    i - 1,
                    i,
                    a.len(),
                    b.len()
                )));
            }
            let k = self.n_migrants.min(a.len());
            for j in random_ints(k, 0, a.len(), rng) {
                std::mem::swap(&mut a[j], &mut b[j]);
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), GaError> {
        if self.n_migrants == 0 {
            return Err(GaError::config("n_migrants should be at least 1"));
        }
        Ok(())
    }
}
