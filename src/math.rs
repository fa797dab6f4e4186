use num::Float;

/// Similar to numpy.interp for a single `x`: linear interpolation between the
/// surrounding `coords`, clamped to the first/last `y` outside their range.
///
/// `coords` must be sorted by `x` and non-empty; an empty slice yields zero.
pub(crate) fn interp<F: Float>(x: F, coords: &[(F, F)]) -> F {
    let (Some(&(x_first, y_first)), Some(&(x_last, y_last))) = (coords.first(), coords.last()) else {
        return F::zero();
    };

    // Base cases
    if x <= x_first {
        return y_first;
    }
    if x >= x_last {
        return y_last;
    }

    for window in coords.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];

        // Actual interpolation
        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return y2;
            }

            return y1 + (x - x1) * (y2 - y1) / (x2 - x1);
        }
    }

    y_last
}

#[test]
fn test_interp() {
    let coords = [(1., 3.), (2., 2.), (3., 0.)];
    let x = [0., 1., 1.5, 2.72, 3.24];
    let y: Vec<f64> = x.iter().map(|x| interp(*x, &coords)).collect();

    assert_eq!(y, vec![3., 3., 2.5, 0.5599999999999996, 0.]);

    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];
    let y: Vec<f64> = [2.5, -1., 7.5].iter().map(|x| interp(*x, &coords)).collect();

    assert_eq!(y, vec![4., 0., 2.]);
}

#[test]
fn test_interp_step() {
    // A vertical segment at x = 1 acts as a step
    let coords = [(0., 0.), (1., 0.), (1., 1.), (2., 1.)];

    assert_eq!(interp(0.5, &coords), 0.);
    assert_eq!(interp(1., &coords), 0.);
    assert_eq!(interp(1.5, &coords), 1.);
    assert_eq!(interp(0.5, &[] as &[(f64, f64)]), 0.);
}
