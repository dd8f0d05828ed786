#![allow(clippy::new_without_default)]
use std::time::Instant;

use log::debug;
use ndarray::Array2;

pub mod bench;
pub mod complex;
pub mod coord;
pub mod error;
pub mod painter;
pub mod poly;
pub mod roots;
pub mod solver;
pub mod threads;

pub use crate::complex::{c, ci, cr, dist_squared, Complex, C};
pub use crate::coord::Viewport;
pub use crate::error::ConfigError;
pub use crate::poly::Polynomial;
pub use crate::roots::RootFinder;

use crate::poly::pw;
use crate::solver::{FieldSolver, FieldState, Solver};
use crate::threads::boxed_solver;

/// Timing read from the last recompute pass. The operation count is a
/// closed-form estimate, not a measurement.
#[derive(Copy, Clone, Debug)]
pub struct Diagnostics {
    pub elapsed_secs: f64,
    pub ops_per_sec: f64,
}

/// Owns the full field configuration and a cached index grid.
///
/// Mutators flip the dirty flag; `compute` is a no-op until the next
/// mutation. Exclusive access (`&mut self`) serializes mutation against an
/// in-flight recompute.
pub struct FieldComputer {
    poly: Polynomial,
    deri: Polynomial,
    roots: Vec<C<f64>>,
    viewport: Viewport,
    cycles: usize,
    finder: RootFinder,
    threads: usize,
    dirty: bool,
    pool: Option<Box<dyn Solver<FieldState>>>,
    cache: Array2<i16>,
    recomputes: usize,
    diagnostics: Option<Diagnostics>,
}

impl FieldComputer {
    /// Builds from an explicit root set; the polynomial becomes the
    /// product of the corresponding degree-1 factors.
    pub fn from_roots(
        roots: Vec<C<f64>>,
        center: C<f64>,
        increment: f64,
        width: usize,
        height: usize,
        cycles: usize,
    ) -> Result<Self, ConfigError> {
        if roots.is_empty() {
            return Err(ConfigError::EmptyRootSet);
        }
        let poly = Polynomial::from_roots(&roots);
        Self::with_parts(poly, roots, center, increment, width, height, cycles)
    }

    /// Builds from coefficients; the root set is solved up front with the
    /// default finder.
    pub fn from_polynomial(
        coeffs: Vec<C<f64>>,
        center: C<f64>,
        increment: f64,
        width: usize,
        height: usize,
        cycles: usize,
    ) -> Result<Self, ConfigError> {
        if coeffs.len() < 2 {
            return Err(ConfigError::ConstantPolynomial(coeffs.len()));
        }
        let poly = Polynomial::new(coeffs);
        let roots = RootFinder::default().find(&poly);
        Self::with_parts(poly, roots, center, increment, width, height, cycles)
    }

    fn with_parts(
        poly: Polynomial,
        roots: Vec<C<f64>>,
        center: C<f64>,
        increment: f64,
        width: usize,
        height: usize,
        cycles: usize,
    ) -> Result<Self, ConfigError> {
        validate_increment(increment)?;
        validate_grid(width, height)?;
        validate_cycles(cycles)?;
        let deri = poly.derivative();
        Ok(Self {
            poly,
            deri,
            roots,
            viewport: Viewport::new(center, increment, width, height),
            cycles,
            finder: RootFinder::default(),
            threads: num_cpus::get_physical(),
            dirty: true,
            pool: None,
            cache: Array2::from_elem((height, width), -1),
            recomputes: 0,
            diagnostics: None,
        })
    }

    fn engine_changed(&mut self) {
        self.pool = None;
        self.dirty = true;
    }

    /// Replaces the polynomial; the derivative and the root set are
    /// recomputed to match.
    pub fn set_polynomial(&mut self, coeffs: Vec<C<f64>>) -> Result<(), ConfigError> {
        if coeffs.len() < 2 {
            return Err(ConfigError::ConstantPolynomial(coeffs.len()));
        }
        self.poly = Polynomial::new(coeffs);
        self.deri = self.poly.derivative();
        self.roots = self.finder.find(&self.poly);
        self.engine_changed();
        Ok(())
    }

    /// Replaces the root set; the polynomial and derivative are rebuilt
    /// from it.
    pub fn set_roots(&mut self, roots: Vec<C<f64>>) -> Result<(), ConfigError> {
        if roots.is_empty() {
            return Err(ConfigError::EmptyRootSet);
        }
        self.poly = Polynomial::from_roots(&roots);
        self.deri = self.poly.derivative();
        self.roots = roots;
        self.engine_changed();
        Ok(())
    }

    pub fn set_center(&mut self, center: C<f64>) {
        self.viewport.center = center;
        self.dirty = true;
    }

    pub fn set_increment(&mut self, increment: f64) -> Result<(), ConfigError> {
        validate_increment(increment)?;
        self.viewport.increment = increment;
        self.dirty = true;
        Ok(())
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        validate_grid(width, height)?;
        self.viewport.width = width;
        self.viewport.height = height;
        self.cache = Array2::from_elem((height, width), -1);
        self.dirty = true;
        Ok(())
    }

    pub fn set_cycles(&mut self, cycles: usize) -> Result<(), ConfigError> {
        validate_cycles(cycles)?;
        self.cycles = cycles;
        self.engine_changed();
        Ok(())
    }

    /// Overrides (iteration budget, initial guess) used by subsequent
    /// coefficient-driven root solves; a root set supplied by the caller
    /// is never re-solved.
    pub fn set_root_finder(&mut self, finder: RootFinder) {
        self.finder = finder;
    }

    /// Worker count for the recompute pass; 0 runs it on the calling
    /// thread. Does not invalidate the cache.
    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads;
        self.pool = None;
    }

    pub fn move_by(&mut self, delta: C<f64>) {
        self.set_center(self.viewport.center + delta);
    }

    pub fn move_up(&mut self, fac: usize) {
        self.move_by(ci(self.viewport.increment * fac as f64));
    }

    pub fn move_down(&mut self, fac: usize) {
        self.move_by(ci(-self.viewport.increment * fac as f64));
    }

    pub fn move_left(&mut self, fac: usize) {
        self.move_by(cr(-self.viewport.increment * fac as f64));
    }

    pub fn move_right(&mut self, fac: usize) {
        self.move_by(cr(self.viewport.increment * fac as f64));
    }

    pub fn zoom_in(&mut self, fac: usize) -> Result<(), ConfigError> {
        self.set_increment(self.viewport.increment * pw(0.9, fac))
    }

    pub fn zoom_out(&mut self, fac: usize) -> Result<(), ConfigError> {
        self.set_increment(self.viewport.increment * pw(1.1, fac))
    }

    pub fn increase_cycles(&mut self, fac: usize) -> Result<(), ConfigError> {
        self.set_cycles((self.cycles as f64 * pw(1.1, fac)) as usize)
    }

    pub fn decrease_cycles(&mut self, fac: usize) -> Result<(), ConfigError> {
        self.set_cycles((self.cycles as f64 * pw(0.9, fac)) as usize)
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.poly
    }

    pub fn derivative(&self) -> &Polynomial {
        &self.deri
    }

    pub fn roots(&self) -> &[C<f64>] {
        &self.roots
    }

    pub fn center(&self) -> C<f64> {
        self.viewport.center
    }

    pub fn increment(&self) -> f64 {
        self.viewport.increment
    }

    pub fn width(&self) -> usize {
        self.viewport.width
    }

    pub fn height(&self) -> usize {
        self.viewport.height
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of recompute passes actually performed; unchanged by
    /// cache-hit calls to `compute`.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn diagnostics(&self) -> Option<Diagnostics> {
        self.diagnostics
    }

    /// Returns the cached grid when clean; otherwise reseeds from the
    /// viewport, runs the pass to completion, and caches the result.
    /// Entries are root indices in `[0, degree)`.
    pub fn compute(&mut self) -> &Array2<i16> {
        if !self.dirty {
            return &self.cache;
        }
        let start = Instant::now();
        if self.pool.is_none() {
            let solver = FieldSolver::new(self.poly.clone(), self.roots.clone(), self.cycles);
            self.pool = Some(boxed_solver(solver, self.threads));
        }
        let seeded = FieldState::from(&self.viewport);
        let solved = self.pool.as_ref().unwrap().solve(&seeded);
        let (width, height) = (self.viewport.width, self.viewport.height);
        self.cache = Array2::from_shape_vec((height, width), solved.into_indices()).unwrap();

        let elapsed = start.elapsed().as_secs_f64();
        let ops = estimated_ops_per_cell_cycle(self.poly.coeffs().len()) as f64
            * self.viewport.cells() as f64
            * self.cycles as f64;
        self.diagnostics = Some(Diagnostics {
            elapsed_secs: elapsed,
            ops_per_sec: ops / elapsed,
        });
        debug!("recomputed {}x{} grid in {:.3}s", width, height, elapsed);

        self.recomputes += 1;
        self.dirty = false;
        &self.cache
    }
}

/// Per-cell per-cycle cost model for a polynomial with `n` coefficients:
/// evaluation, derivative evaluation, the Newton update, and the
/// classification sweep.
fn estimated_ops_per_cell_cycle(n: usize) -> usize {
    (n + 1) * n + n + n * (n - 1) + (n - 1) + 2 + 3 * (n - 1) + (n - 2)
}

fn validate_increment(increment: f64) -> Result<(), ConfigError> {
    if !(increment > 0.0) || !increment.is_finite() {
        return Err(ConfigError::NonPositiveIncrement(increment));
    }
    Ok(())
}

fn validate_grid(width: usize, height: usize) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyGrid { width, height });
    }
    Ok(())
}

fn validate_cycles(cycles: usize) -> Result<(), ConfigError> {
    if cycles == 0 {
        return Err(ConfigError::ZeroCycles);
    }
    Ok(())
}

/// Computer over the cube roots of unity, the classic three-basin Newton
/// fractal, with the default window and cycle count.
pub fn newton_fractal(width: usize, height: usize) -> Result<FieldComputer, ConfigError> {
    let half_sqrt3 = 3.0_f64.sqrt() / 2.0;
    FieldComputer::from_roots(
        vec![cr(1.0), c(-0.5, half_sqrt3), c(-0.5, -half_sqrt3)],
        c(0.0, 0.0),
        0.01,
        width,
        height,
        25,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn small_computer() -> FieldComputer {
        let mut computer = FieldComputer::from_roots(
            vec![cr(-1.0), cr(1.0)],
            c(0.0, 0.0),
            0.1,
            8,
            8,
            10,
        )
        .unwrap();
        computer.set_threads(2);
        computer
    }

    #[test]
    fn test_compute_is_idempotent_until_mutation() {
        let mut computer = small_computer();
        let first = computer.compute().clone();
        assert_eq!(computer.recompute_count(), 1);
        let second = computer.compute().clone();
        assert_eq!(computer.recompute_count(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mut computer = small_computer();
        computer.compute();
        computer.move_right(5);
        computer.compute();
        assert_eq!(computer.recompute_count(), 2);
    }

    #[test]
    fn test_recompute_is_deterministic() {
        let mut computer = small_computer();
        let first = computer.compute().clone();
        // a pan out and back forces a recompute of the original window
        computer.move_right(3);
        computer.compute();
        computer.move_left(3);
        let third = computer.compute().clone();
        assert_eq!(computer.recompute_count(), 3);
        assert_eq!(first, third);
    }

    #[test]
    fn test_indices_in_degree_range() {
        let mut computer = small_computer();
        let degree = computer.polynomial().degree() as i16;
        for &i in computer.compute().iter() {
            assert!(i >= 0 && i < degree);
        }
    }

    #[test]
    fn test_grid_matches_dimensions() {
        let mut computer = small_computer();
        computer.resize(5, 3).unwrap();
        let grid = computer.compute();
        assert_eq!(grid.nrows(), 3);
        assert_eq!(grid.ncols(), 5);
    }

    #[test]
    fn test_derivative_tracks_polynomial() {
        let mut computer = small_computer();
        computer.set_roots(vec![cr(2.0), cr(-2.0)]).unwrap();
        assert_eq!(
            computer.derivative().coeffs(),
            computer.polynomial().derivative().coeffs()
        );
    }

    #[test]
    fn test_set_polynomial_resolves_matching_roots() {
        let mut computer = small_computer();
        computer
            .set_polynomial(vec![cr(-1.0), cr(0.0), cr(1.0)])
            .unwrap();
        assert_eq!(computer.roots().len(), computer.polynomial().degree());
        let mut res: Vec<f64> = computer.roots().iter().map(|r| r.re).collect();
        res.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((res[0] + 1.0).abs() < 1e-6);
        assert!((res[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let mut computer = small_computer();
        assert_eq!(
            computer.set_increment(0.0),
            Err(ConfigError::NonPositiveIncrement(0.0))
        );
        assert_eq!(
            computer.set_increment(f64::INFINITY),
            Err(ConfigError::NonPositiveIncrement(f64::INFINITY))
        );
        assert_eq!(
            computer.resize(0, 4),
            Err(ConfigError::EmptyGrid { width: 0, height: 4 })
        );
        assert_eq!(computer.set_cycles(0), Err(ConfigError::ZeroCycles));
        assert_eq!(
            computer.set_polynomial(vec![cr(5.0)]),
            Err(ConfigError::ConstantPolynomial(1))
        );
        assert_eq!(computer.set_roots(vec![]), Err(ConfigError::EmptyRootSet));
        assert!(matches!(
            FieldComputer::from_roots(vec![], c(0.0, 0.0), 0.1, 4, 4, 5),
            Err(ConfigError::EmptyRootSet)
        ));
    }

    #[test]
    fn test_rejected_mutation_leaves_cache_clean() {
        let mut computer = small_computer();
        computer.compute();
        assert!(computer.set_increment(-0.5).is_err());
        computer.compute();
        assert_eq!(computer.recompute_count(), 1);
    }

    #[test]
    fn test_zoom_scales_increment() {
        let mut computer = small_computer();
        let before = computer.increment();
        computer.zoom_in(1).unwrap();
        assert!((computer.increment() - before * 0.9).abs() < 1e-12);
        computer.zoom_out(2).unwrap();
        assert!((computer.increment() - before * 0.9 * 1.1 * 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_diagnostics_recorded_after_compute() {
        let mut computer = small_computer();
        assert!(computer.diagnostics().is_none());
        computer.compute();
        let d = computer.diagnostics().unwrap();
        assert!(d.elapsed_secs >= 0.0);
        assert!(d.ops_per_sec > 0.0);
    }

    #[test]
    fn test_single_threaded_pass_matches_pooled() {
        let mut pooled = small_computer();
        let mut single = small_computer();
        single.set_threads(0);
        assert_eq!(pooled.compute(), single.compute());
    }

    #[test]
    fn test_default_fractal_covers_three_basins() {
        let mut computer = newton_fractal(64, 64).unwrap();
        computer.set_threads(0);
        let grid = computer.compute();
        for &i in grid.iter() {
            assert!(i >= 0 && i < 3);
        }
    }
}
