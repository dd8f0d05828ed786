use std::ops::{Add, Div, Mul, Sub};

use crate::complex::{cr, C};

/// Integer power by repeated squaring.
///
/// The zeroth power collapses to the zero value; callers that need a unit
/// must special-case index 0 themselves, as `Polynomial::apply` does.
pub fn pw<T>(z: T, p: usize) -> T
where
    T: Mul<Output = T> + Copy + Default,
{
    if p == 0 {
        return T::default();
    }
    if p == 1 {
        return z;
    }
    if p % 2 == 0 {
        pw(z * z, p / 2)
    } else {
        z * pw(z * z, (p - 1) / 2)
    }
}

/// Polynomial over complex coefficients, index 0 = constant term.
///
/// The coefficient vector's length is the capacity: `degree` is capacity−1
/// and may exceed `effective_degree` when leading coefficients cancel.
/// Arithmetic preserves capacity the way the fixed-length representation
/// would.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<C<f64>>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<C<f64>>) -> Self {
        Self { coeffs }
    }

    /// Coefficients from real parts only; handy for the common
    /// real-coefficient case.
    pub fn from_reals(res: &[f64]) -> Self {
        Self::new(res.iter().map(|&re| cr(re)).collect())
    }

    /// `(z − r1)(z − r2)…` built by repeated multiplication of degree-1
    /// factors. An empty root list yields the constant 1.
    pub fn from_roots(roots: &[C<f64>]) -> Self {
        let mut acc = Self::new(vec![cr(1.0)]);
        for &r in roots {
            acc = &acc * &Self::new(vec![-r, cr(1.0)]);
        }
        acc
    }

    pub fn coeffs(&self) -> &[C<f64>] {
        &self.coeffs
    }

    /// Nominal degree: capacity − 1.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Highest index whose coefficient is not epsilon-zero; 0 when every
    /// coefficient is zero.
    pub fn effective_degree(&self) -> usize {
        let mut ret = 0;
        for (i, coeff) in self.coeffs.iter().enumerate() {
            if !coeff.is_zero() {
                ret = i;
            }
        }
        ret
    }

    fn term(&self, z: C<f64>, idx: usize) -> C<f64> {
        if idx > 0 {
            pw(self.coeffs[idx] * z, idx)
        } else {
            self.coeffs[idx]
        }
    }

    /// Evaluation under the `(cᵢ·z)^i` per-term rule.
    pub fn apply(&self, z: C<f64>) -> C<f64> {
        let mut acc = C::zero();
        for i in 0..self.coeffs.len() {
            acc = acc + self.term(z, i);
        }
        acc
    }

    /// One-lower-capacity polynomial with coefficient `cᵢ₊₁·(i+2)` at
    /// index i.
    pub fn derivative(&self) -> Self {
        let n = self.coeffs.len().saturating_sub(1);
        let mut coeffs = Vec::with_capacity(n);
        for i in 0..n {
            coeffs.push(self.coeffs[i + 1] * ((i + 2) as f64));
        }
        Self::new(coeffs)
    }

    /// Synthetic long division: folds leading terms out of the remainder
    /// while its effective degree exceeds the divisor's. Returns
    /// `(quotient, remainder)`; each fold retires one effective degree and
    /// the retired slot is cleared so float residue cannot stall the loop.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let mut quot = Self::new(vec![C::zero()]);
        let mut rem = self.clone();
        while rem.effective_degree() > divisor.effective_degree() {
            let rem_deg = rem.effective_degree();
            let div_deg = divisor.effective_degree();
            let gap = rem_deg - div_deg;
            let a = rem.coeffs[rem_deg] / divisor.coeffs[div_deg];
            let mut term = vec![C::zero(); gap + 1];
            term[gap] = a;
            let term = Self::new(term);
            quot = &quot + &term;
            rem = &rem - &(&term * divisor);
            rem.coeffs[rem_deg] = C::zero();
        }
        (quot, rem)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    /// Index-wise sum up to the larger capacity; missing high-order terms
    /// are zero.
    fn add(self, rhs: &Polynomial) -> Polynomial {
        let k = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = vec![C::zero(); k];
        for (i, slot) in coeffs.iter_mut().enumerate() {
            if let Some(&a) = self.coeffs.get(i) {
                *slot = *slot + a;
            }
            if let Some(&b) = rhs.coeffs.get(i) {
                *slot = *slot + b;
            }
        }
        Polynomial::new(coeffs)
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let negated = Polynomial::new(rhs.coeffs.iter().map(|&x| -x).collect());
        self + &negated
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    /// Full convolution; result capacity is the sum of the input degrees
    /// plus one.
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let k = (self.coeffs.len() + rhs.coeffs.len()).saturating_sub(1);
        let mut coeffs = vec![C::zero(); k];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] = coeffs[i + j] + a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}

impl Div for &Polynomial {
    type Output = Polynomial;

    /// Yields the terminal remainder of `div_rem`, which is what the
    /// deflation step in the root solver consumes.
    fn div(self, rhs: &Polynomial) -> Polynomial {
        self.div_rem(rhs).1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::complex::c;

    fn assert_coeffs(p: &Polynomial, expected: &[f64]) {
        assert_eq!(p.coeffs().len(), expected.len());
        for (got, &want) in p.coeffs().iter().zip(expected) {
            assert!(
                (got.re - want).abs() < 1e-9 && got.im.abs() < 1e-9,
                "expected {:?}, got {:?}",
                expected,
                p.coeffs()
            );
        }
    }

    #[test]
    fn test_pw() {
        assert_eq!(pw(2.0, 0), 0.0);
        assert_eq!(pw(2.0, 1), 2.0);
        assert_eq!(pw(2.0, 3), 8.0);
        assert_eq!(pw(2.0, 10), 1024.0);
        assert_eq!(pw(c(0.0, 1.0), 2), c(-1.0, 0.0));
    }

    #[test]
    fn test_add() {
        let p = Polynomial::from_reals(&[1.0, 0.0, 0.0, 1.0]);
        let q = Polynomial::from_reals(&[0.0, 2.0, 3.0, 3.0]);
        assert_coeffs(&(&p + &q), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_add_mixed_capacity() {
        let p = Polynomial::from_reals(&[1.0, 2.0, 3.0]);
        let q = Polynomial::from_reals(&[1.0]);
        assert_coeffs(&(&p + &q), &[2.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sub() {
        let p = Polynomial::from_reals(&[1.0, 2.0, 3.0, 4.0]);
        let q = Polynomial::from_reals(&[0.0, 1.0, 2.0, 3.0]);
        assert_coeffs(&(&p - &q), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mul() {
        let p = Polynomial::from_reals(&[3.0, 7.0, 4.0, 1.0]);
        let q = Polynomial::from_reals(&[-4.0, -2.0, -3.0, 8.0]);
        assert_coeffs(&(&p * &q), &[-12.0, -34.0, -39.0, -9.0, 42.0, 29.0, 8.0]);
    }

    #[test]
    fn test_degree() {
        assert_eq!(Polynomial::from_reals(&[3.0, 7.0, 4.0, 1.0]).degree(), 3);
        assert_eq!(
            Polynomial::from_reals(&[-12.0, -34.0, -39.0, -9.0, 42.0, 29.0, 8.0]).degree(),
            6
        );
    }

    #[test]
    fn test_effective_degree() {
        let p = Polynomial::from_reals(&[0.0, 0.0, 1.0, 0.0]);
        assert_eq!(p.degree(), 3);
        assert_eq!(p.effective_degree(), 2);
    }

    #[test]
    fn test_effective_degree_all_zero() {
        assert_eq!(Polynomial::from_reals(&[0.0, 0.0, 0.0]).effective_degree(), 0);
    }

    #[test]
    fn test_div() {
        let p = Polynomial::from_reals(&[0.0, 0.0, 1.0]);
        let q = Polynomial::from_reals(&[0.0, 1.0]);
        let r = &p / &q;
        let expected = [0.0, 1.0];
        for i in 0..r.effective_degree() {
            assert!((r.coeffs()[i].re - expected[i]).abs() < 1e-9);
            assert!(r.coeffs()[i].im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_div_rem_quotient() {
        let p = Polynomial::from_reals(&[0.0, 0.0, 1.0]);
        let q = Polynomial::from_reals(&[0.0, 1.0]);
        let (quot, rem) = p.div_rem(&q);
        assert_eq!(quot.effective_degree(), 1);
        assert_eq!(quot.coeffs()[1], c(1.0, 0.0));
        assert_eq!(rem.effective_degree(), 0);
    }

    #[test]
    fn test_div_preserves_capacity() {
        let p = Polynomial::from_reals(&[-1.0, 0.0, 1.0]);
        let q = Polynomial::from_reals(&[1.0, 1.0]);
        let r = &p / &q;
        assert_eq!(r.coeffs().len(), 3);
        assert_coeffs(&r, &[-1.0, -1.0, 0.0]);
    }

    #[test]
    fn test_apply_constant_term() {
        let p = Polynomial::from_reals(&[5.0]);
        assert_eq!(p.apply(c(3.0, 1.0)), c(5.0, 0.0));
    }

    #[test]
    fn test_apply_uses_coefficient_scaled_power_rule() {
        // term i>0 is (cᵢ·z)^i, so [0, 0, 2] at z=3 gives (2·3)² = 36
        let p = Polynomial::from_reals(&[0.0, 0.0, 2.0]);
        assert_eq!(p.apply(cr(3.0)), c(36.0, 0.0));
    }

    #[test]
    fn test_derivative_multipliers() {
        // coefficient i of the derivative is cᵢ₊₁·(i+2)
        let p = Polynomial::from_reals(&[5.0, 3.0, 7.0, 2.0]);
        let d = p.derivative();
        assert_coeffs(&d, &[6.0, 21.0, 8.0]);
    }

    #[test]
    fn test_derivative_of_constant_is_empty() {
        let p = Polynomial::from_reals(&[5.0]);
        let d = p.derivative();
        assert_eq!(d.coeffs().len(), 0);
        assert_eq!(d.apply(c(2.0, 2.0)), C::zero());
    }

    #[test]
    fn test_from_roots_coefficients() {
        // (z−1)(z−2)(z−3) = z³ − 6z² + 11z − 6
        let p = Polynomial::from_roots(&[cr(1.0), cr(2.0), cr(3.0)]);
        assert_coeffs(&p, &[-6.0, 11.0, -6.0, 1.0]);
    }

    #[test]
    fn test_from_roots_single() {
        let p = Polynomial::from_roots(&[c(2.0, -1.0)]);
        assert_eq!(p.coeffs().len(), 2);
        assert_eq!(p.coeffs()[0], c(-2.0, 1.0));
        assert_eq!(p.coeffs()[1], c(1.0, 0.0));
    }
}
