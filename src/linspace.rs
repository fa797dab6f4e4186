use num::Float;

/// `n` evenly spaced samples starting at `start`, `step` apart.
pub struct Linspace<F> {
    start: F,
    step: F,
    index: usize,
    len: usize,
}

impl<F: Float> Linspace<F> {
    pub fn new(start: F, step: F, n: usize) -> Self {
        Linspace {
            start,
            step,
            index: 0,
            len: n,
        }
    }
}

impl<F: Float> Iterator for Linspace<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            return None;
        }

        // Not accumulated: start + step * i
        let i = F::from(self.index)?;
        self.index += 1;

        Some(self.start + self.step * i)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl<F: Float> ExactSizeIterator for Linspace<F> {}

#[test]
fn test_linspace() {
    let points: Vec<f64> = Linspace::new(0., 0.25, 5).collect();
    assert_eq!(points, vec![0., 0.25, 0.5, 0.75, 1.]);

    let points: Vec<f64> = Linspace::new(1000., 1., 3).collect();
    assert_eq!(points, vec![1000., 1001., 1002.]);

    let single: Vec<f64> = Linspace::new(3., 0., 1).collect();
    assert_eq!(single, vec![3.]);
    assert_eq!(Linspace::<f64>::new(0., 1., 0).len(), 0);
}
