//! Diagram assembler.
//!
//! Each coupled-cluster diagram is a variant of a closed term enum; the
//! assembler evaluates one term for every active orbital (singles) or one
//! stored pair (doubles) and the aggregate entry points combine terms with
//! the projector discipline of the working equations: the Fock residue is
//! never projected, everything else passes through Q (singles) or Q12
//! (doubles) before it is added.
//!
//! Term names arriving from outside the crate (restart files, driver
//! scripts) are resolved through `from_name`, which aborts on names that do
//! not evaluate to a known diagram.

mod doubles;
mod singles;

use crate::diagnostics::fatal;

/// Diagrams contributing to the singles potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinglesTerm {
    /// Closed-shell Fock residue (2J - K) |tau_i>.
    FockResidue,
    /// CCS potential in t-form.
    Ccs,
    /// Brillouin term F |phi_i>.
    S1,
    /// Brillouin term -sum_k <k|F|tau_i> tau_k.
    S5a,
    S2bU,
    S2cU,
    S4aU,
    S4bU,
    S4cU,
    /// S2b evaluated on the regularization tails Q12 f12 |t_k t_l>.
    S2bReg,
    S2cReg,
    S4aReg,
    S4bReg,
    S4cReg,
}

impl SinglesTerm {
    pub fn name(&self) -> &'static str {
        match self {
            SinglesTerm::FockResidue => "F3D",
            SinglesTerm::Ccs => "CCS",
            SinglesTerm::S1 => "S1",
            SinglesTerm::S5a => "S5a",
            SinglesTerm::S2bU => "S2b_u",
            SinglesTerm::S2cU => "S2c_u",
            SinglesTerm::S4aU => "S4a_u",
            SinglesTerm::S4bU => "S4b_u",
            SinglesTerm::S4cU => "S4c_u",
            SinglesTerm::S2bReg => "S2b_r",
            SinglesTerm::S2cReg => "S2c_r",
            SinglesTerm::S4aReg => "S4a_r",
            SinglesTerm::S4bReg => "S4b_r",
            SinglesTerm::S4cReg => "S4c_r",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "F3D" => SinglesTerm::FockResidue,
            "CCS" => SinglesTerm::Ccs,
            "S1" => SinglesTerm::S1,
            "S5a" => SinglesTerm::S5a,
            "S2b_u" => SinglesTerm::S2bU,
            "S2c_u" => SinglesTerm::S2cU,
            "S4a_u" => SinglesTerm::S4aU,
            "S4b_u" => SinglesTerm::S4bU,
            "S4c_u" => SinglesTerm::S4cU,
            "S2b_r" => SinglesTerm::S2bReg,
            "S2c_r" => SinglesTerm::S2cReg,
            "S4a_r" => SinglesTerm::S4aReg,
            "S4b_r" => SinglesTerm::S4bReg,
            "S4c_r" => SinglesTerm::S4cReg,
            other => fatal(&format!("unknown singles diagram '{}'", other)),
        }
    }

    /// The u-part diagrams and their regularization-tail counterparts.
    pub fn doubles_coupled() -> [SinglesTerm; 10] {
        [
            SinglesTerm::S2bU,
            SinglesTerm::S2cU,
            SinglesTerm::S4aU,
            SinglesTerm::S4bU,
            SinglesTerm::S4cU,
            SinglesTerm::S2bReg,
            SinglesTerm::S2cReg,
            SinglesTerm::S4aReg,
            SinglesTerm::S4bReg,
            SinglesTerm::S4cReg,
        ]
    }
}

/// Diagrams contributing to the doubles potential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoublesTerm {
    /// Closed-shell Fock residue (2J - K + U_nuc) |u>.
    FockResidue6d,
    /// Screened Coulomb part g12 |t_i t_j>.
    Cc2Coulomb,
    /// Regularized CC2 residue on |t_i t_j>.
    Cc2Residue,
}

impl DoublesTerm {
    pub fn name(&self) -> &'static str {
        match self {
            DoublesTerm::FockResidue6d => "F6D",
            DoublesTerm::Cc2Coulomb => "CC2_coulomb",
            DoublesTerm::Cc2Residue => "CC2_residue",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "F6D" => DoublesTerm::FockResidue6d,
            "CC2_coulomb" => DoublesTerm::Cc2Coulomb,
            "CC2_residue" => DoublesTerm::Cc2Residue,
            other => fatal(&format!("unknown doubles diagram '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests;
