use log::debug;

use crate::complex::{c, dist_squared, C};
use crate::poly::Polynomial;

/// Convergence gate on the squared residual |p(z)|².
const CONVERGENCE_EPSILON: f64 = 1e-32;

/// Escape perturbations available to a stalled search, the last of which
/// accepts the iterate as-is.
const ESCAPE_ATTEMPTS: usize = 6;

/// Newton-Raphson multi-root search with deflation.
///
/// Finding every root of an arbitrary polynomial is not guaranteed; the
/// search never fails either way — an accepted-unconverged value is
/// indistinguishable from a converged one to the caller.
#[derive(Clone, Debug)]
pub struct RootFinder {
    max_iters: usize,
    initial: C<f64>,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            initial: c(1.0, 1.0),
        }
    }
}

impl RootFinder {
    pub fn new(max_iters: usize, initial: C<f64>) -> Self {
        Self { max_iters, initial }
    }

    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    pub fn initial(&self) -> C<f64> {
        self.initial
    }

    /// Produces exactly `poly.degree()` values. Roots are recorded in
    /// deflation order, which is not canonical; when the deflation chain
    /// bottoms out below effective degree 2, the remaining slots stay at
    /// zero.
    pub fn find(&self, poly: &Polynomial) -> Vec<C<f64>> {
        let mut roots = vec![C::zero(); poly.degree()];
        let mut current = poly.clone();
        let mut budget = self.max_iters;
        for slot in roots.iter_mut() {
            let (root, remaining) = self.search(&current, budget);
            *slot = root;
            budget = remaining;
            if current.effective_degree() <= 1 {
                break;
            }
            current = &current / &Polynomial::new(vec![root, c(1.0, 0.0)]);
        }
        roots
    }

    /// One bounded Newton search with the escape-perturbation ladder.
    /// Returns the accepted value and the (possibly doubled) iteration
    /// budget for the next deflation level.
    fn search(&self, poly: &Polynomial, mut max_iters: usize) -> (C<f64>, usize) {
        let deri = poly.derivative();
        let mut z = self.initial;
        let mut k = 0;
        loop {
            for _ in 0..max_iters {
                let pz = poly.apply(z);
                let dpz = deri.apply(z);
                if dpz.is_zero() || !dpz.is_normal() || !pz.is_normal() || (pz / dpz).is_zero() {
                    break;
                }
                z = z - pz / dpz;
            }
            if residual(poly, z) > CONVERGENCE_EPSILON {
                match k {
                    0 => z = c(z.re, 0.0),
                    1 => z = c(0.0, z.im),
                    2 => z = z * c(0.5, 0.0),
                    3 => z = z * c(0.0, 0.5),
                    4 => z = z * z,
                    _ => debug!("accepting unconverged root candidate {}", z),
                }
                k += 1;
                max_iters *= 2;
            }
            if k >= ESCAPE_ATTEMPTS || residual(poly, z) <= CONVERGENCE_EPSILON {
                return (z, max_iters);
            }
        }
    }
}

fn residual(poly: &Polynomial, z: C<f64>) -> f64 {
    dist_squared(poly.apply(z), C::zero())
}
