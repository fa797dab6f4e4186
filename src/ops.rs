use std::iter::Sum;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::math::interp;

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if v == F::one() {
                    u
                } else if u == F::one() {
                    v
                } else {
                    F::zero()
                }
            },
        }
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if v == F::zero() {
                    u
                } else if u == F::zero() {
                    v
                } else {
                    F::one()
                }
            },
        }
    }
}

/// Implication operator: shapes a consequent term's membership by the firing
/// strength of the rule concluding it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ImplicationOp {
    /// Mamdani: clip the term at the firing strength
    #[default]
    Min,
    /// Larsen: scale the term by the firing strength
    Prod,
}

impl ImplicationOp {
    pub fn call<F: Float>(self, firing: F, degree: F) -> F {
        match self {
            Self::Min => F::min(firing, degree),
            Self::Prod => firing * degree,
        }
    }
}

/// Method for aggregating the consequences of the fuzzy rules
///
/// Every variant is commutative and associative with zero as identity, so the
/// order rules are aggregated in never changes the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ProductionLink {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl ProductionLink {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => OrOp::Max.call(u, v),
            Self::ProbOr => OrOp::ProbOr.call(u, v),
            Self::BoundedSum => OrOp::BoundedSum.call(u, v),
            Self::DrasticSum => OrOp::DrasticSum.call(u, v),
        }
    }

    /// Folds `v` into `acc` point by point.
    pub fn accumulate<F: Float>(self, acc: &mut [F], v: impl IntoIterator<Item = F>) {
        for (a, v) in acc.iter_mut().zip(v) {
            *a = self.call(*a, v);
        }
    }
}

/// Method for defuzzifcating the resulting membership function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DefuzzificationOp {
    /// Discrete center of gravity over the sample points
    #[default]
    Centroid,
    /// Center of Gravity of the piecewise-linear area
    Cog,
    /// Bisector of Area
    Boa,
    /// Mean of the values for which the membership function is maximum
    Mom,
    /// Largest value for which the membership function is maximum
    Lom,
    /// Smallest value for which the membership function is maximum
    Som,
}

impl DefuzzificationOp {
    /// Crisp value of the fuzzy set `membership` sampled at `universe`.
    ///
    /// `None` if the slices are empty or differ in length, or if `membership`
    /// is zero everywhere.
    pub fn call<F: Float + Sum>(self, universe: &[F], membership: &[F]) -> Option<F> {
        if universe.is_empty() || universe.len() != membership.len() {
            return None;
        }
        if membership.iter().all(|m| *m == F::zero()) {
            return None;
        }
        if universe.len() == 1 {
            return Some(universe[0]);
        }

        let two = F::one() + F::one();
        let points = || universe.iter().copied().zip(membership.iter().copied());

        let crisp = match self {
            Self::Centroid => {
                let num = points().map(|(u, m)| u * m).sum::<F>();
                let den = membership.iter().copied().sum::<F>();

                num / den
            },
            Self::Cog => {
                let n_areas = universe.len() - 1;
                let mut areas = Vec::with_capacity(n_areas);
                let mut centroids = Vec::with_capacity(n_areas);
                let three = two + F::one();

                for i in 0..n_areas {
                    let base = universe[i + 1] - universe[i];
                    let area_rect = F::min(membership[i], membership[i + 1]) * base;
                    let center_rect = universe[i] + base / two;
                    let (area_tria, center_tri) = if membership[i + 1] == membership[i] {
                        (F::zero(), F::zero())
                    } else if membership[i + 1] > membership[i] {
                        (
                            base * F::abs(membership[i + 1] - membership[i]) / two,
                            universe[i] + two / three * base,
                        )
                    } else {
                        (
                            base * F::abs(membership[i + 1] - membership[i]) / two,
                            universe[i] + F::one() / three * base,
                        )
                    };
                    let area = area_rect + area_tria;
                    let center = if area == F::zero() {
                        F::zero()
                    } else {
                        (area_rect * center_rect + area_tria * center_tri) / area
                    };

                    areas.push(area);
                    centroids.push(center);
                }

                let den = areas.iter().copied().sum::<F>();
                let num = areas
                    .into_iter()
                    .zip(centroids)
                    .map(|(area, cent)| area * cent)
                    .sum::<F>();

                num / den
            },
            Self::Boa => {
                let areas: Vec<F> = universe
                    .windows(2)
                    .zip(membership.windows(2))
                    .map(|(u, m)| (m[0] + m[1]) * (u[1] - u[0]) / two)
                    .collect();
                let target = areas.iter().copied().sum::<F>() / two;
                let mut cum_area = F::zero();

                for (i, area) in areas.iter().copied().enumerate() {
                    cum_area = cum_area + area;
                    if cum_area >= target {
                        // Invert the cumulative area linearly within this segment
                        let coords = [(cum_area - area, universe[i]), (cum_area, universe[i + 1])];

                        return Some(interp(target, &coords));
                    }
                }

                universe[universe.len() - 1]
            },
            Self::Mom => {
                let maximum = membership.iter().copied().fold(F::zero(), F::max);
                let (len, sum) = points()
                    .filter(|(_, m)| *m == maximum)
                    .fold((F::zero(), F::zero()), |(len, sum), (u, _)| (len + F::one(), sum + u));

                sum / len
            },
            Self::Lom => {
                let maximum = membership.iter().copied().fold(F::zero(), F::max);
                points()
                    .filter(|(_, m)| *m == maximum)
                    .map(|(u, _)| u)
                    .fold(F::neg_infinity(), F::max)
            },
            Self::Som => {
                let maximum = membership.iter().copied().fold(F::zero(), F::max);
                points()
                    .filter(|(_, m)| *m == maximum)
                    .map(|(u, _)| u)
                    .fold(F::infinity(), F::min)
            },
        };

        Some(crisp)
    }
}

#[test]
fn test_and_or() {
    assert_eq!(AndOp::Min.call(0.3, 0.7), 0.3);
    assert_eq!(AndOp::Prod.call(0.5, 0.5), 0.25);
    assert_eq!(AndOp::BoundedProd.call(0.5, 0.25), 0.);
    assert_eq!(AndOp::DrasticProd.call(0.4, 1.), 0.4);
    assert_eq!(AndOp::DrasticProd.call(0.4, 0.9), 0.);

    assert_eq!(OrOp::Max.call(0.3, 0.7), 0.7);
    assert_eq!(OrOp::ProbOr.call(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.call(0.75, 0.5), 1.);
    assert_eq!(OrOp::DrasticSum.call(0.4, 0.), 0.4);
    assert_eq!(OrOp::DrasticSum.call(0.4, 0.1), 1.);
}

#[test]
fn test_implication() {
    assert_eq!(ImplicationOp::Min.call(0.25, 0.5), 0.25);
    assert_eq!(ImplicationOp::Min.call(0.75, 0.5), 0.5);
    assert_eq!(ImplicationOp::Prod.call(0.5, 0.5), 0.25);
}

#[test]
fn test_production_link_identity() {
    for link in [
        ProductionLink::Max,
        ProductionLink::ProbOr,
        ProductionLink::BoundedSum,
        ProductionLink::DrasticSum,
    ] {
        assert_eq!(link.call(0., 0.375), 0.375);
        assert_eq!(link.call(0.375, 0.), 0.375);
    }

    let mut acc = [0., 0.5, 0.25];
    ProductionLink::Max.accumulate(&mut acc, [0.5, 0.25, 0.25]);
    assert_eq!(acc, [0.5, 0.5, 0.25]);
}

#[test]
fn test_defuzzification() {
    let universe = [0., 1., 2., 3., 4.];
    // Symmetric triangle around 2
    let triangle = [0., 0.5, 1., 0.5, 0.];

    for op in [
        DefuzzificationOp::Centroid,
        DefuzzificationOp::Cog,
        DefuzzificationOp::Boa,
        DefuzzificationOp::Mom,
        DefuzzificationOp::Lom,
        DefuzzificationOp::Som,
    ] {
        assert_eq!(op.call(&universe, &triangle), Some(2.), "{op:?}");
    }

    let plateau = [0., 1., 1., 1., 0.];
    assert_eq!(DefuzzificationOp::Mom.call(&universe, &plateau), Some(2.));
    assert_eq!(DefuzzificationOp::Lom.call(&universe, &plateau), Some(3.));
    assert_eq!(DefuzzificationOp::Som.call(&universe, &plateau), Some(1.));

    let skewed = [1., 0., 0., 0., 1.];
    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &skewed), Some(2.));

    let ramp = [0., 0., 0., 0., 1.];
    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &ramp), Some(4.));
    assert_eq!(DefuzzificationOp::Cog.call(&universe, &ramp), Some(3. + 2. / 3.));

    assert_eq!(DefuzzificationOp::Cog.call(&[7.], &[0.5]), Some(7.));

    let empty: [f64; 0] = [];
    for op in [DefuzzificationOp::Centroid, DefuzzificationOp::Cog, DefuzzificationOp::Boa] {
        assert_eq!(op.call(&empty, &empty), None, "{op:?}");
        assert_eq!(op.call(&universe, &[0.; 5]), None, "{op:?}");
        assert_eq!(op.call(&universe, &triangle[..3]), None, "{op:?}");
    }
}
