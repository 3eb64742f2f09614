//! Numerical backend contract for coupled-cluster diagram evaluation.
//!
//! The diagram engine in the `cc2` crate is written against this trait and
//! never touches the representation of a continuous function directly. A
//! backend supplies one-particle functions (`F3`), two-particle pair
//! functions (`F6`), elementary arithmetic, inner products, truncation to a
//! working tolerance, and the convolution operators of the theory (Coulomb,
//! Slater-type correlation factor, bound-state Helmholtz / Yukawa Green's
//! function).
//!
//! The backend is free to execute elementwise and convolution work across a
//! thread pool internally; every call here is blocking and returns a fully
//! reduced result.

pub mod dense;

/// Selects one of the two slots of a pair function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Particle {
    One,
    Two,
}

/// Two-particle kernels the backend can apply or contract with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOp {
    /// Coulomb interaction 1/r12.
    Coulomb,
    /// Slater-type correlation factor f12 = (1 - exp(-gamma r12)) / (2 gamma).
    SlaterF12,
    /// Yukawa / bound-state Helmholtz kernel with decay constant mu.
    Bsh(f64),
}

pub trait MraBackend {
    /// One-particle function.
    type F3: Clone;
    /// Two-particle (pair) function.
    type F6: Clone;

    // --- one-particle arithmetic ---

    fn zero3(&self) -> Self::F3;
    fn add3(&self, a: &Self::F3, b: &Self::F3) -> Self::F3;
    fn sub3(&self, a: &Self::F3, b: &Self::F3) -> Self::F3;
    fn scale3(&self, a: &Self::F3, s: f64) -> Self::F3;
    /// Pointwise product a(r) * b(r).
    fn mul3(&self, a: &Self::F3, b: &Self::F3) -> Self::F3;
    fn inner3(&self, a: &Self::F3, b: &Self::F3) -> f64;
    /// Discard contributions below the working tolerance.
    fn truncate3(&self, f: &mut Self::F3, tol: f64);

    fn norm3(&self, f: &Self::F3) -> f64 {
        self.inner3(f, f).sqrt()
    }

    // --- one-particle convolutions ---

    /// Coulomb (Poisson) convolution: (1/r12 * f).
    fn apply_coulomb(&self, f: &Self::F3) -> Self::F3;
    /// Correlation-factor convolution: (f12 * f).
    fn apply_f12(&self, f: &Self::F3) -> Self::F3;
    /// Green's-function convolution with decay constant mu.
    fn apply_bsh(&self, f: &Self::F3, mu: f64) -> Self::F3;

    // --- two-particle arithmetic ---

    fn zero6(&self) -> Self::F6;
    fn add6(&self, a: &Self::F6, b: &Self::F6) -> Self::F6;
    fn sub6(&self, a: &Self::F6, b: &Self::F6) -> Self::F6;
    fn scale6(&self, a: &Self::F6, s: f64) -> Self::F6;
    /// Pointwise product u(1,2) * v(1,2).
    fn mul6(&self, a: &Self::F6, b: &Self::F6) -> Self::F6;
    fn inner6(&self, a: &Self::F6, b: &Self::F6) -> f64;
    fn truncate6(&self, u: &mut Self::F6, tol: f64);

    fn norm6(&self, u: &Self::F6) -> f64 {
        self.inner6(u, u).sqrt()
    }

    // --- two-particle structure ---

    /// Decomposed product |x(1) y(2)>.
    fn outer(&self, x: &Self::F3, y: &Self::F3) -> Self::F6;
    /// g(1,2) = u(2,1).
    fn swap_particles(&self, u: &Self::F6) -> Self::F6;
    /// Multiply one slot pointwise: f(p) * u(1,2).
    fn mul_particle(&self, u: &Self::F6, p: Particle, f: &Self::F3) -> Self::F6;
    /// Plain contraction over one slot: <f(p)|u(1,2)>_p.
    fn partial_inner(&self, u: &Self::F6, f: &Self::F3, p: Particle) -> Self::F3;
    /// Convolve one slot with the Coulomb kernel,
    /// e.g. p = One: y(1,2) = int g(1,3) u(3,2) d3.
    fn apply_coulomb_particle(&self, u: &Self::F6, p: Particle) -> Self::F6;
    /// Kernel-weighted contraction over one slot: <f(p)|op(1,2)|u(1,2)>_p.
    fn op_project(&self, u: &Self::F6, f: &Self::F3, p: Particle, op: PairOp) -> Self::F3;
    /// Kernel times a decomposed product: op(1,2) |x(1) y(2)>.
    fn op_pair(&self, x: &Self::F3, y: &Self::F3, op: PairOp) -> Self::F6;

    // --- electronic regularization potential ---

    /// The (flat) electronic smoothing potential applied to a decomposed
    /// product: Ue |x(1) y(2)>.
    fn apply_ue_pair(&self, x: &Self::F3, y: &Self::F3) -> Self::F6;
    /// The local multiplicative part of Ue, used for the commutator
    /// correction of the nuclear-transformed operator.
    fn ue_local(&self) -> Self::F6;

    /// Length scale of the Slater correlation factor.
    fn gamma(&self) -> f64;
}
