use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, Result};
use crate::math::interp;

/// Maps a crisp value to a degree of membership in `[0, 1]`.
///
/// Construct through [`MembershipFunction::triangular`] and friends to get the
/// parameter checks up front; variants built directly are checked again when the
/// owning system is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipFunction {
    /// Zero outside `[a, c]`, rising to one at `b`.
    Triangular(f64, f64, f64),
    /// Zero outside `[a, d]`, one on `[b, c]`.
    Trapezoidal(f64, f64, f64, f64),
    /// Linear interpolation between `(x, degree)` points, flat past either end.
    Piecewise(Vec<(f64, f64)>),
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self> {
        let mf = Self::Triangular(a, b, c);
        mf.validate()?;
        Ok(mf)
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let mf = Self::Trapezoidal(a, b, c, d);
        mf.validate()?;
        Ok(mf)
    }

    pub fn piecewise(points: impl Into<Vec<(f64, f64)>>) -> Result<Self> {
        let mf = Self::Piecewise(points.into());
        mf.validate()?;
        Ok(mf)
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::Triangular(..) => "triangular",
            Self::Trapezoidal(..) => "trapezoidal",
            Self::Piecewise(_) => "piecewise",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| FuzzyError::InvalidMembership {
            shape: self.shape(),
            reason,
        };
        let ordered = |params: &[f64]| {
            if params.iter().any(|p| !p.is_finite()) {
                return Err(invalid(format!("parameters {params:?} must be finite")));
            }
            if params.windows(2).any(|w| w[0] > w[1]) {
                return Err(invalid(format!("parameters {params:?} must be non-decreasing")));
            }
            Ok(())
        };

        match self {
            Self::Triangular(a, b, c) => ordered(&[*a, *b, *c]),
            Self::Trapezoidal(a, b, c, d) => ordered(&[*a, *b, *c, *d]),
            Self::Piecewise(points) => {
                if points.is_empty() {
                    return Err(invalid("needs at least one point".into()));
                }
                let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
                ordered(&xs)?;

                match points.iter().find(|(_, y)| !(0. ..=1.).contains(y)) {
                    Some((x, y)) => Err(invalid(format!("degree {y} at {x} is outside [0, 1]"))),
                    None => Ok(()),
                }
            },
        }
    }

    /// Degree of membership of `x`.
    ///
    /// Equal endpoints make a step instead of a ramp, so no parameters can divide by zero.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular(a, b, c) => {
                if x < a || x > c {
                    0.
                } else if x < b {
                    (x - a) / (b - a)
                } else if x == b {
                    1.
                } else {
                    (c - x) / (c - b)
                }
            },
            Self::Trapezoidal(a, b, c, d) => {
                if x < a || x > d {
                    0.
                } else if x < b {
                    (x - a) / (b - a)
                } else if x <= c {
                    1.
                } else {
                    (d - x) / (d - c)
                }
            },
            Self::Piecewise(ref points) => interp(x, points),
        }
    }

    /// Interval where the degree is positive, `None` when unbounded.
    pub fn support(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Triangular(a, _, c) => Some((a, c)),
            Self::Trapezoidal(a, _, _, d) => Some((a, d)),
            Self::Piecewise(_) => None,
        }
    }

    /// Interval where the degree is one.
    pub fn core(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Triangular(_, b, _) => Some((b, b)),
            Self::Trapezoidal(_, b, c, _) => Some((b, c)),
            Self::Piecewise(_) => None,
        }
    }
}

#[test]
fn test_triangular() {
    let mf = MembershipFunction::triangular(25., 50., 75.).unwrap();

    assert_eq!(mf.degree(0.), 0.);
    assert_eq!(mf.degree(25.), 0.);
    assert_eq!(mf.degree(37.5), 0.5);
    assert_eq!(mf.degree(50.), 1.);
    assert_eq!(mf.degree(62.5), 0.5);
    assert_eq!(mf.degree(75.), 0.);
    assert_eq!(mf.degree(100.), 0.);
}

#[test]
fn test_degenerate_shoulders() {
    // Left shoulder: a == b
    let baixo = MembershipFunction::triangular(0., 0., 50.).unwrap();
    assert_eq!(baixo.degree(0.), 1.);
    assert_eq!(baixo.degree(20.), 0.6);
    assert_eq!(baixo.degree(-1.), 0.);

    // Right shoulder: b == c
    let alto = MembershipFunction::triangular(50., 100., 100.).unwrap();
    assert_eq!(alto.degree(100.), 1.);
    assert_eq!(alto.degree(75.), 0.5);
    assert_eq!(alto.degree(100.5), 0.);

    // Spike: a == b == c
    let spike = MembershipFunction::triangular(3., 3., 3.).unwrap();
    assert_eq!(spike.degree(3.), 1.);
    assert_eq!(spike.degree(3.001), 0.);

    let pesado = MembershipFunction::trapezoidal(1000., 1250., 1250., 1500.).unwrap();
    assert_eq!(pesado.degree(1250.), 1.);
    assert_eq!(pesado.degree(1200.), 0.8);

    let leve = MembershipFunction::trapezoidal(1000., 1000., 1250., 1500.).unwrap();
    assert_eq!(leve.degree(1000.), 1.);
    assert_eq!(leve.degree(999.), 0.);
    assert_eq!(leve.degree(1375.), 0.5);
}

#[test]
fn test_trapezoidal_plateau() {
    let mf = MembershipFunction::trapezoidal(0., 0., 25., 50.).unwrap();

    for x in [0., 10., 24.9, 25.] {
        assert_eq!(mf.degree(x), 1.);
    }
    assert_eq!(mf.degree(37.5), 0.5);
    assert_eq!(mf.degree(50.), 0.);
    assert_eq!(mf.support(), Some((0., 50.)));
    assert_eq!(mf.core(), Some((0., 25.)));
}

#[test]
fn test_piecewise() {
    let low = MembershipFunction::piecewise(vec![(155., 1.), (160., 0.8), (165., 0.5), (170., 0.2), (175., 0.)]).unwrap();

    assert_eq!(low.degree(150.), 1.);
    assert_eq!(low.degree(162.5), 0.65);
    assert_eq!(low.degree(190.), 0.);
}

#[test]
fn test_validation() {
    assert!(matches!(
        MembershipFunction::triangular(3., 2., 1.),
        Err(FuzzyError::InvalidMembership { shape: "triangular", .. })
    ));
    assert!(MembershipFunction::trapezoidal(0., 2., 1., 3.).is_err());
    assert!(MembershipFunction::triangular(0., f64::NAN, 1.).is_err());
    assert!(MembershipFunction::piecewise(Vec::new()).is_err());
    assert!(MembershipFunction::piecewise(vec![(0., 0.), (1., 1.5)]).is_err());
    assert!(MembershipFunction::piecewise(vec![(1., 0.), (0., 1.)]).is_err());
    // Bypassing the constructor is still caught by validate
    assert!(MembershipFunction::Triangular(1., 0., 2.).validate().is_err());
}

#[test]
fn test_serde() {
    let mf: MembershipFunction = serde_json::from_str(r#"{"trapezoidal": [0, 0, 25, 50]}"#).unwrap();
    assert_eq!(mf, MembershipFunction::Trapezoidal(0., 0., 25., 50.));

    let mf: MembershipFunction = serde_json::from_str(r#"{"piecewise": [[0, 0], [1, 1]]}"#).unwrap();
    assert_eq!(mf.degree(0.25), 0.25);
}
