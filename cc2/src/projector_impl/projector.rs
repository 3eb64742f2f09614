use std::sync::Arc;

use mra::{MraBackend, Particle};

/// One-particle projector Q = 1 - sum_k |ket_k><bra_k|.
#[derive(Clone)]
pub struct Projector<B: MraBackend> {
    backend: Arc<B>,
    bra: Vec<B::F3>,
    ket: Vec<B::F3>,
}

impl<B: MraBackend> Projector<B> {
    pub fn new(backend: Arc<B>, bra: Vec<B::F3>, ket: Vec<B::F3>) -> Self {
        assert_eq!(bra.len(), ket.len());
        Projector { backend, bra, ket }
    }

    /// Remove the occupied-space component of `f` in place.
    pub fn apply(&self, f: &mut B::F3) {
        for (bra_k, ket_k) in self.bra.iter().zip(&self.ket) {
            let overlap = self.backend.inner3(bra_k, f);
            *f = self
                .backend
                .sub3(f, &self.backend.scale3(ket_k, overlap));
        }
    }

    pub fn apply_vec(&self, fs: &mut [B::F3]) {
        for f in fs.iter_mut() {
            self.apply(f);
        }
    }

    /// The occupied-space expansion sum_k <bra_k|f> amp_k for arbitrary
    /// expansion functions (used by diagrams that contract against the
    /// occupied block with amplitude kets instead of reference kets).
    pub fn complement(&self, f: &B::F3, amplitudes: &[B::F3]) -> B::F3 {
        let mut result = self.backend.zero3();
        for (bra_k, amp_k) in self.bra.iter().zip(amplitudes) {
            let overlap = self.backend.inner3(bra_k, f);
            result = self
                .backend
                .add3(&result, &self.backend.scale3(amp_k, overlap));
        }
        result
    }
}

/// Strong-orthogonality projector Q12 = 1 - O1 - O2 + O1 O2 on pair
/// functions.
#[derive(Clone)]
pub struct StrongOrthogonalityProjector<B: MraBackend> {
    backend: Arc<B>,
    bra: Vec<B::F3>,
    ket: Vec<B::F3>,
}

impl<B: MraBackend> StrongOrthogonalityProjector<B> {
    pub fn new(backend: Arc<B>, bra: Vec<B::F3>, ket: Vec<B::F3>) -> Self {
        assert_eq!(bra.len(), ket.len());
        StrongOrthogonalityProjector { backend, bra, ket }
    }

    /// Q12 u. The double-count correction O1 O2 u is added back after both
    /// single-particle projections are removed.
    pub fn apply(&self, u: &B::F6) -> B::F6 {
        let b = &self.backend;
        let mut result = u.clone();

        // O1 u = sum_k |ket_k(1)> <bra_k(1)|u>_1
        for (bra_k, ket_k) in self.bra.iter().zip(&self.ket) {
            let residue = b.partial_inner(u, bra_k, Particle::One);
            result = b.sub6(&result, &b.outer(ket_k, &residue));
        }

        // O2 u = sum_k <bra_k(2)|u>_2 |ket_k(2)>
        for (bra_k, ket_k) in self.bra.iter().zip(&self.ket) {
            let residue = b.partial_inner(u, bra_k, Particle::Two);
            result = b.sub6(&result, &b.outer(&residue, ket_k));
        }

        // O1 O2 u = sum_kl <bra_k bra_l|u> |ket_k ket_l>
        for (bra_k, ket_k) in self.bra.iter().zip(&self.ket) {
            let residue = b.partial_inner(u, bra_k, Particle::One);
            for (bra_l, ket_l) in self.bra.iter().zip(&self.ket) {
                let coeff = b.inner3(bra_l, &residue);
                result = b.add6(&result, &b.scale6(&b.outer(ket_k, ket_l), coeff));
            }
        }

        result
    }
}
