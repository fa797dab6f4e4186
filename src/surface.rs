//! Sweeping two inputs over a grid, for decision-surface plots and the like.

use tracing::debug;

use crate::error::{FuzzyError, Result};
use crate::inference::InferenceSystem;
use crate::universe::Universe;
use crate::variable::{Antecedent, Variable};

/// An antecedent and the values to sweep it over.
#[derive(Clone, Debug)]
pub struct Axis {
    name: String,
    samples: Universe,
}

impl Axis {
    pub fn new(name: impl Into<String>, samples: Universe) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[f64] {
        self.samples.points()
    }
}

/// Crisp output of one consequent at every `(x, y)` of a grid.
///
/// Points where no rule fired (and the system is configured to fail on an
/// empty aggregate) are holes rather than errors, so a sweep across an
/// uncovered region still yields the rest of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    x: Vec<f64>,
    y: Vec<f64>,
    // Row-major: one row per y value
    z: Vec<Option<f64>>,
}

impl Surface {
    /// Evaluates `system` once per grid point, with every other antecedent held
    /// at its value in `fixed`. Any error other than an empty aggregate aborts.
    pub fn compute<S: AsRef<str>>(
        system: &InferenceSystem,
        x_axis: &Axis,
        y_axis: &Axis,
        fixed: impl IntoIterator<Item = (S, f64)>,
        output: &str,
    ) -> Result<Self> {
        let x_var: Variable<Antecedent> = system.antecedent(x_axis.name())?;
        let y_var: Variable<Antecedent> = system.antecedent(y_axis.name())?;
        let output = system.consequent(output)?;
        let mut inputs = system.inputs(fixed)?;

        let (x, y) = (x_axis.points().to_vec(), y_axis.points().to_vec());
        let mut z = Vec::with_capacity(x.len() * y.len());

        debug!(x = x_axis.name(), y = y_axis.name(), points = x.len() * y.len(), "computing surface");

        for y_value in &y {
            inputs.add(y_var, *y_value);

            for x_value in &x {
                inputs.add(x_var, *x_value);

                match system.evaluate(&inputs) {
                    Ok(outputs) => z.push(outputs.crisp(output)),
                    Err(FuzzyError::EmptyAggregate(_)) => z.push(None),
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(Self { x, y, z })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Output at `x[i]`, `y[j]`; `None` out of range or where no rule fired.
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.x.len() {
            return None;
        }

        self.z.get(j * self.x.len() + i).copied().flatten()
    }

    /// Rows of outputs, one per `y` value.
    pub fn rows(&self) -> impl Iterator<Item = (f64, &[Option<f64>])> {
        self.y.iter().copied().zip(self.z.chunks(self.x.len().max(1)))
    }
}
