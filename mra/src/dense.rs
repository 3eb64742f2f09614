//! Dense lattice reference backend.
//!
//! Functions live on a uniform one-dimensional lattice: a one-particle
//! function is a `DVector` of point values, a pair function a `DMatrix`
//! indexed `(r1, r2)`, and each convolution operator a symmetric kernel
//! matrix. The kernels keep the algebraic relations the diagram engine
//! relies on (symmetry, linearity, and the pointwise identity
//! g12 * f12 = (g12 - bsh(gamma)) / (2 gamma)), so every invariant of the
//! full multiresolution backend can be exercised at test scale.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::{MraBackend, PairOp, Particle};

/// Backend over a uniform lattice on [-extent, extent].
#[derive(Debug, Clone)]
pub struct DenseBackend {
    points: Vec<f64>,
    /// Quadrature weight of one lattice point.
    weight: f64,
    /// Softening length that bounds the Coulomb kernel on the diagonal.
    soft: f64,
    gamma: f64,
    coulomb: DMatrix<f64>,
    f12: DMatrix<f64>,
    ue: DMatrix<f64>,
}

impl DenseBackend {
    pub fn new(n: usize, extent: f64, gamma: f64) -> Self {
        assert!(n > 1, "lattice needs at least two points");
        let h = 2.0 * extent / (n - 1) as f64;
        let points: Vec<f64> = (0..n).map(|i| -extent + i as f64 * h).collect();
        let soft = h;

        let coulomb = build_kernel(&points, |d| 1.0 / (d + soft));
        let f12 = build_kernel(&points, |d| (1.0 - (-gamma * d).exp()) / (2.0 * gamma));
        let ue = build_kernel(&points, |d| 0.5 * gamma * (-gamma * d).exp());

        DenseBackend {
            points,
            weight: h,
            soft,
            gamma,
            coulomb,
            f12,
            ue,
        }
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// A normalized Gaussian lobe centered at `center`.
    pub fn gaussian(&self, center: f64, width: f64) -> DVector<f64> {
        let mut f = DVector::from_iterator(
            self.points.len(),
            self.points
                .iter()
                .map(|&x| (-(x - center) * (x - center) / (2.0 * width * width)).exp()),
        );
        let norm = (self.weight * f.dot(&f)).sqrt();
        if norm > 0.0 {
            f /= norm;
        }
        f
    }

    /// Gram-Schmidt orthonormalization with respect to the lattice inner
    /// product; linearly dependent inputs are rejected.
    pub fn orthonormalize(&self, funcs: &[DVector<f64>]) -> Vec<DVector<f64>> {
        let mut result: Vec<DVector<f64>> = Vec::with_capacity(funcs.len());
        for f in funcs {
            let mut v = f.clone();
            for q in &result {
                let overlap = self.weight * q.dot(&v);
                v -= q * overlap;
            }
            let norm = (self.weight * v.dot(&v)).sqrt();
            assert!(norm > 1e-12, "orthonormalize: linearly dependent input");
            result.push(v / norm);
        }
        result
    }

    fn kernel(&self, op: PairOp) -> DMatrix<f64> {
        match op {
            PairOp::Coulomb => self.coulomb.clone(),
            PairOp::SlaterF12 => self.f12.clone(),
            PairOp::Bsh(mu) => {
                let soft = self.soft;
                build_kernel(&self.points, |d| (-mu * d).exp() / (d + soft))
            }
        }
    }
}

fn build_kernel(points: &[f64], k: impl Fn(f64) -> f64 + Sync) -> DMatrix<f64> {
    let n = points.len();
    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| k((points[i] - points[j]).abs()))
                .collect()
        })
        .collect();
    DMatrix::from_fn(n, n, |i, j| rows[i][j])
}

impl MraBackend for DenseBackend {
    type F3 = DVector<f64>;
    type F6 = DMatrix<f64>;

    fn zero3(&self) -> DVector<f64> {
        DVector::zeros(self.points.len())
    }

    fn add3(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a + b
    }

    fn sub3(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a - b
    }

    fn scale3(&self, a: &DVector<f64>, s: f64) -> DVector<f64> {
        a * s
    }

    fn mul3(&self, a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
        a.component_mul(b)
    }

    fn inner3(&self, a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        self.weight * a.dot(b)
    }

    fn truncate3(&self, f: &mut DVector<f64>, tol: f64) {
        for v in f.iter_mut() {
            if v.abs() < tol {
                *v = 0.0;
            }
        }
    }

    fn apply_coulomb(&self, f: &DVector<f64>) -> DVector<f64> {
        self.weight * (&self.coulomb * f)
    }

    fn apply_f12(&self, f: &DVector<f64>) -> DVector<f64> {
        self.weight * (&self.f12 * f)
    }

    fn apply_bsh(&self, f: &DVector<f64>, mu: f64) -> DVector<f64> {
        self.weight * (self.kernel(PairOp::Bsh(mu)) * f)
    }

    fn zero6(&self) -> DMatrix<f64> {
        DMatrix::zeros(self.points.len(), self.points.len())
    }

    fn add6(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
        a + b
    }

    fn sub6(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
        a - b
    }

    fn scale6(&self, a: &DMatrix<f64>, s: f64) -> DMatrix<f64> {
        a * s
    }

    fn mul6(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> DMatrix<f64> {
        a.component_mul(b)
    }

    fn inner6(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
        self.weight * self.weight * a.dot(b)
    }

    fn truncate6(&self, u: &mut DMatrix<f64>, tol: f64) {
        for v in u.iter_mut() {
            if v.abs() < tol {
                *v = 0.0;
            }
        }
    }

    fn outer(&self, x: &DVector<f64>, y: &DVector<f64>) -> DMatrix<f64> {
        x * y.transpose()
    }

    fn swap_particles(&self, u: &DMatrix<f64>) -> DMatrix<f64> {
        u.transpose()
    }

    fn mul_particle(&self, u: &DMatrix<f64>, p: Particle, f: &DVector<f64>) -> DMatrix<f64> {
        let mut result = u.clone();
        match p {
            Particle::One => {
                for (i, mut row) in result.row_iter_mut().enumerate() {
                    row *= f[i];
                }
            }
            Particle::Two => {
                for (j, mut col) in result.column_iter_mut().enumerate() {
                    col *= f[j];
                }
            }
        }
        result
    }

    fn partial_inner(&self, u: &DMatrix<f64>, f: &DVector<f64>, p: Particle) -> DVector<f64> {
        match p {
            Particle::One => self.weight * u.tr_mul(f),
            Particle::Two => self.weight * (u * f),
        }
    }

    fn apply_coulomb_particle(&self, u: &DMatrix<f64>, p: Particle) -> DMatrix<f64> {
        match p {
            Particle::One => self.weight * (&self.coulomb * u),
            Particle::Two => self.weight * (u * &self.coulomb),
        }
    }

    fn op_project(
        &self,
        u: &DMatrix<f64>,
        f: &DVector<f64>,
        p: Particle,
        op: PairOp,
    ) -> DVector<f64> {
        let weighted = self.kernel(op).component_mul(u);
        match p {
            Particle::One => self.weight * weighted.tr_mul(f),
            Particle::Two => self.weight * (weighted * f),
        }
    }

    fn op_pair(&self, x: &DVector<f64>, y: &DVector<f64>, op: PairOp) -> DMatrix<f64> {
        self.kernel(op).component_mul(&self.outer(x, y))
    }

    fn apply_ue_pair(&self, x: &DVector<f64>, y: &DVector<f64>) -> DMatrix<f64> {
        self.ue.component_mul(&self.outer(x, y))
    }

    fn ue_local(&self) -> DMatrix<f64> {
        self.ue.clone()
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> DenseBackend {
        DenseBackend::new(16, 3.0, 1.4)
    }

    #[test]
    fn gaussian_is_normalized() {
        let b = backend();
        let g = b.gaussian(0.0, 0.8);
        assert!((b.inner3(&g, &g) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn orthonormalize_yields_orthonormal_set() {
        let b = backend();
        let set = b.orthonormalize(&[b.gaussian(-0.5, 0.8), b.gaussian(0.5, 0.8)]);
        assert!((b.inner3(&set[0], &set[0]) - 1.0).abs() < 1e-10);
        assert!((b.inner3(&set[1], &set[1]) - 1.0).abs() < 1e-10);
        assert!(b.inner3(&set[0], &set[1]).abs() < 1e-10);
    }

    #[test]
    fn coulomb_kernel_is_symmetric() {
        let b = backend();
        let x = b.gaussian(-0.3, 0.7);
        let y = b.gaussian(0.6, 0.9);
        let gy = b.apply_coulomb(&y);
        let gx = b.apply_coulomb(&x);
        assert!((b.inner3(&x, &gy) - b.inner3(&y, &gx)).abs() < 1e-10);
    }

    #[test]
    fn gf_kernel_identity_holds() {
        // g12 * f12 agrees pointwise with (coulomb - bsh(gamma)) / (2 gamma)
        let b = backend();
        let gf = b.coulomb.component_mul(&b.f12);
        let other = (&b.coulomb - b.kernel(PairOp::Bsh(b.gamma))) / (2.0 * b.gamma);
        assert!((gf - other).norm() < 1e-12);
    }

    #[test]
    fn swap_and_outer_are_consistent() {
        let b = backend();
        let x = b.gaussian(-0.4, 0.7);
        let y = b.gaussian(0.4, 0.7);
        let xy = b.outer(&x, &y);
        let yx = b.outer(&y, &x);
        assert!((b.swap_particles(&xy) - yx).norm() < 1e-12);
    }

    #[test]
    fn partial_inner_matches_manual_contraction() {
        let b = backend();
        let x = b.gaussian(-0.4, 0.7);
        let y = b.gaussian(0.4, 0.7);
        let f = b.gaussian(0.0, 1.0);
        let xy = b.outer(&x, &y);
        // <f(1)|x(1) y(2)>_1 = <f|x> y
        let got = b.partial_inner(&xy, &f, Particle::One);
        let want = b.scale3(&y, b.inner3(&f, &x));
        assert!((got - want).norm() < 1e-10);
    }
}
