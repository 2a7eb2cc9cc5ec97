//! # Seeded Parameter Initialisation
//!
//! The CPU backend's random generator cannot be seeded, so parameters created
//! through a [`VarBuilder`](candle_nn::VarBuilder) differ from run to run. This
//! module overwrites every variable in a [`VarMap`] from a seeded generator,
//! which makes whole training runs reproducible.

use candle_core::Tensor;
use candle_nn::VarMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::error::Result;

/// Distribution a parameter tensor is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamInit {
    /// N(0, 1), used for embedding tables.
    StandardNormal,
    /// U(-bound, bound).
    Uniform { bound: f32 },
}

impl ParamInit {
    /// U(-1/sqrt(fan), 1/sqrt(fan)).
    pub fn uniform_fan(fan: usize) -> Self {
        ParamInit::Uniform {
            bound: 1.0 / (fan.max(1) as f32).sqrt(),
        }
    }

    /// Draw `count` values.
    fn sample(&self, rng: &mut StdRng, count: usize) -> Result<Vec<f32>> {
        let values: Vec<f32> = match *self {
            ParamInit::StandardNormal => {
                let normal = Normal::new(0.0f32, 1.0)
                    .map_err(|e| candle_core::Error::Msg(format!("invalid normal: {e}")))?;
                (0..count).map(|_| normal.sample(rng)).collect()
            }
            ParamInit::Uniform { bound } => {
                let uniform = Uniform::new_inclusive(-bound, bound);
                (0..count).map(|_| uniform.sample(rng)).collect()
            }
        };
        Ok(values)
    }
}

/// Overwrite every variable in `varmap` with values drawn from a generator
/// seeded with `seed`.
///
/// Variables are visited in name order so the result does not depend on the
/// map's iteration order. `scheme` picks the distribution per variable name;
/// variables it returns `None` for keep their current values.
///
/// Returns the number of scalars written.
pub fn reinitialize<F>(varmap: &VarMap, seed: u64, scheme: F) -> Result<usize>
where
    F: Fn(&str) -> Option<ParamInit>,
{
    let vars = varmap
        .data()
        .lock()
        .map_err(|e| candle_core::Error::Msg(format!("var map lock poisoned: {e}")))?;

    let mut named: Vec<_> = vars.iter().collect();
    named.sort_by(|a, b| a.0.cmp(b.0));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut written = 0;
    for (name, var) in named {
        let Some(init) = scheme(name) else {
            tracing::trace!(%name, "keeping builder initialisation");
            continue;
        };
        let count = var.elem_count();
        let values = init.sample(&mut rng, count)?;
        let tensor = Tensor::from_vec(values, var.dims(), var.device())?;
        var.set(&tensor)?;
        written += count;
    }

    Ok(written)
}
