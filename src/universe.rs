use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;

/// Absorbs float noise when `(max - min) / step` should be an integer.
const STEP_TOLERANCE: f64 = 1e-9;

/// Largest number of sample points a universe may hold.
pub const MAX_SAMPLES: usize = 10_000_000;

/// A discretized domain of discourse: `min, min + step, ..., max`.
///
/// If `max - min` is not a multiple of `step` the last sample is the largest one
/// that does not exceed `max`, as with `numpy.arange(min, max + step, step)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UniverseBounds", into = "UniverseBounds")]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    points: Vec<f64>,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct UniverseBounds {
    min: f64,
    max: f64,
    step: f64,
}

impl Universe {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self> {
        let invalid = |reason| FuzzyError::InvalidUniverse { min, max, step, reason };

        if !(min.is_finite() && max.is_finite() && step.is_finite()) {
            return Err(invalid("bounds and step must be finite"));
        }
        if step <= 0. {
            return Err(invalid("step must be positive"));
        }
        if min > max {
            return Err(invalid("min must not exceed max"));
        }

        let intervals = ((max - min) / step + STEP_TOLERANCE).floor();
        if intervals >= MAX_SAMPLES as f64 {
            return Err(invalid("too many samples"));
        }

        let points = Linspace::new(min, step, intervals as usize + 1).collect();

        Ok(Self { min, max, step, points })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sample points, strictly increasing and never empty.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.
    }

    /// Last sample point. Below `max` when `max - min` is not a multiple of `step`.
    pub fn last(&self) -> f64 {
        self.points.last().copied().unwrap_or(self.min)
    }

    /// Clamps `x` to the sampled range `[min, last]`.
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.last())
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.min..=self.last()).contains(&x)
    }
}

impl TryFrom<UniverseBounds> for Universe {
    type Error = FuzzyError;

    fn try_from(bounds: UniverseBounds) -> Result<Self> {
        Universe::new(bounds.min, bounds.max, bounds.step)
    }
}

impl From<Universe> for UniverseBounds {
    fn from(universe: Universe) -> Self {
        UniverseBounds {
            min: universe.min,
            max: universe.max,
            step: universe.step,
        }
    }
}

#[test]
fn test_universe_points() {
    let universe = Universe::new(1000., 1500., 1.).unwrap();

    assert_eq!(universe.len(), 501);
    assert_eq!(universe.points()[0], 1000.);
    assert_eq!(universe.points()[500], 1500.);
    assert!(universe.points().windows(2).all(|w| w[0] < w[1]));

    let tenths = Universe::new(0., 1., 0.1).unwrap();
    assert_eq!(tenths.len(), 11);

    let ragged = Universe::new(0., 10., 3.).unwrap();
    assert_eq!(ragged.points(), &[0., 3., 6., 9.]);
    assert_eq!(ragged.last(), 9.);
    assert_eq!(ragged.clamp(10.), 9.);
    assert_eq!(ragged.clamp(-1.), 0.);
    assert!(!ragged.contains(9.5));

    let single = Universe::new(5., 5., 1.).unwrap();
    assert_eq!(single.points(), &[5.]);
    assert_eq!(single.midpoint(), 5.);
}

#[test]
fn test_universe_rejects_bad_bounds() {
    assert!(matches!(
        Universe::new(0., 10., 0.),
        Err(FuzzyError::InvalidUniverse { .. })
    ));
    assert!(Universe::new(10., 0., 1.).is_err());
    assert!(Universe::new(0., f64::INFINITY, 1.).is_err());
    assert!(Universe::new(f64::NAN, 1., 1.).is_err());
    assert!(matches!(
        Universe::new(0., 1e10, 1e-10),
        Err(FuzzyError::InvalidUniverse { reason: "too many samples", .. })
    ));
    assert!(Universe::new(0., 1., f64::MIN_POSITIVE).is_err());
    assert!(Universe::new(f64::MIN / 2., f64::MAX / 2., 1.).is_err());
    assert_eq!(Universe::new(0., 1e5, 1.).unwrap().len(), 100_001);
}

#[test]
fn test_universe_serde() {
    let universe: Universe = serde_json::from_str(r#"{"min": 0, "max": 100, "step": 1}"#).unwrap();
    assert_eq!(universe.len(), 101);

    let json = serde_json::to_string(&universe).unwrap();
    assert_eq!(json, r#"{"min":0.0,"max":100.0,"step":1.0}"#);

    assert!(serde_json::from_str::<Universe>(r#"{"min": 0, "max": 1, "step": -1}"#).is_err());
}
