use num_complex::Complex64;

use crate::error::{ArithmeticError, PlotError};
use crate::expr::{Expression, Variable};
use crate::state::data_series::{imaginary_label, real_label, Series};

/// Imaginary parts at or below this (relative to the real part) are treated
/// as rounding noise.
pub const IMAGINARY_EPSILON: f64 = 1e-12;

/// Something that can be sampled at real values of a variable.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, variable: &Variable, value: f64) -> Result<Complex64, ArithmeticError>;
}

impl Evaluator for Expression {
    fn evaluate(&self, variable: &Variable, value: f64) -> Result<Complex64, ArithmeticError> {
        Expression::evaluate(self, variable, value)
    }
}

/// Counters gathered over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub attempted: usize,
    pub failed: usize,
    pub imaginary_samples: usize,
}

/// Output of one sampling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSeries {
    pub real: Series,
    /// Empty unless `has_imaginary` or the caller asked for it.
    pub imaginary: Series,
    pub has_imaginary: bool,
    pub stats: PassStats,
}

fn is_imaginary_significant(z: Complex64) -> bool {
    z.im.abs() > IMAGINARY_EPSILON * z.re.abs().max(1.0)
}

/// Sample `evaluator` at `steps + 1` uniformly spaced points of
/// `[x_min, x_max]`, endpoints included.
///
/// Both parts of every sample are recorded. Whether the imaginary series is
/// returned is decided once the whole pass is done: it is kept when
/// `want_imaginary` is set or when any sample had a significant imaginary
/// part. Samples that fail to evaluate are skipped and leave a gap marker in
/// both series; the pass only fails when none succeeded.
pub fn build<E: Evaluator + ?Sized>(
    x_min: f64,
    x_max: f64,
    steps: usize,
    evaluator: &E,
    variable: &Variable,
    want_imaginary: bool,
) -> Result<SampledSeries, PlotError> {
    if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
        return Err(PlotError::InvalidDomain { x_min, x_max });
    }
    if steps == 0 {
        return Err(PlotError::InvalidSteps);
    }

    let step = (x_max - x_min) / steps as f64;
    let mut real = Series::with_capacity(real_label(variable.name()), steps + 1);
    let mut imaginary = Series::with_capacity(imaginary_label(variable.name()), steps + 1);
    let mut stats = PassStats::default();

    for i in 0..=steps {
        let x = if i == steps {
            x_max
        } else {
            x_min + i as f64 * step
        };
        // Guards against a step below the resolution of x_min.
        if real.last_x().is_some_and(|last| x <= last) {
            continue;
        }
        stats.attempted += 1;
        match evaluator.evaluate(variable, x) {
            Ok(z) => {
                real.push(x, z.re);
                imaginary.push(x, z.im);
                if is_imaginary_significant(z) {
                    stats.imaginary_samples += 1;
                }
            }
            Err(e) => {
                tracing::trace!("Sample at {variable} = {x} failed: {e}");
                stats.failed += 1;
                real.mark_gap();
                imaginary.mark_gap();
            }
        }
    }

    if real.is_empty() {
        tracing::warn!(
            "No sample in [{x_min}, {x_max}] could be evaluated ({} failed)",
            stats.failed
        );
        return Err(PlotError::EmptySeries {
            x_min,
            x_max,
            failed: stats.failed,
        });
    }

    let has_imaginary = stats.imaginary_samples > 0;
    if !(has_imaginary || want_imaginary) {
        imaginary.clear();
    }

    tracing::debug!(
        "Sampled [{x_min}, {x_max}] in {steps} steps: {} points, {} failed, {} imaginary",
        real.len(),
        stats.failed,
        stats.imaginary_samples
    );

    Ok(SampledSeries {
        real,
        imaginary,
        has_imaginary,
        stats,
    })
}
