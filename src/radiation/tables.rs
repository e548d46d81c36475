//! Radiated-energy laws used by the continuous radiation-reaction models

use crate::constants::*;
use crate::units::Normalization;

/// Energy radiated by a particle with quantum parameter `chi`
/// over a time step `dt`, and the range of `chi` over which
/// that is trusted.
///
/// Implementations must be deterministic for fixed inputs and
/// `radiated_energy` non-decreasing in `chi` at fixed `dt`.
pub trait EnergyLaw: Sync {
    /// Classical (Landau-Lifshitz) radiated energy in units of
    /// the rest energy
    fn radiated_energy(&self, chi: f64, dt: f64) -> f64;

    /// Particles with quantum parameter below this value do not
    /// radiate in the continuous models.
    fn minimum_chi_continuous(&self) -> f64;

    /// Radiated energy, including the reduction in the emitted
    /// power caused by quantum effects
    fn corrected_radiated_energy(&self, chi: f64, dt: f64) -> f64 {
        gaunt_factor(chi) * self.radiated_energy(chi, dt)
    }
}

/// Ratio of the quantum to the classical emitted power, using the
/// fit g(chi) = [1 + 4.8 (1 + chi) ln(1 + 1.7 chi) + 2.44 chi^2]^(-2/3),
/// which is accurate to a few percent for all chi.
pub fn gaunt_factor(chi: f64) -> f64 {
    let g = 1.0 + 4.8 * (1.0 + chi) * (1.7 * chi).ln_1p() + 2.44 * chi * chi;
    g.powf(-2.0 / 3.0)
}

/// Closed-form evaluation of the classical radiated energy,
/// W = (2 alpha / 3 lambda_C) chi^2 dt, in code units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RadiationTables {
    minimum_chi_continuous: f64,
    factor_classical_radiated_power: f64,
}

impl RadiationTables {
    pub fn new(norm: &Normalization) -> Self {
        RadiationTables {
            minimum_chi_continuous: MINIMUM_CHI_CONTINUOUS,
            factor_classical_radiated_power: 2.0 * ALPHA_FINE / (3.0 * norm.compton_wavelength()),
        }
    }

    pub fn with_minimum_chi_continuous(&self, chi: f64) -> Self {
        RadiationTables {
            minimum_chi_continuous: chi,
            ..*self
        }
    }
}

impl EnergyLaw for RadiationTables {
    #[inline(always)]
    fn radiated_energy(&self, chi: f64, dt: f64) -> f64 {
        self.factor_classical_radiated_power * chi * chi * dt
    }

    #[inline(always)]
    fn minimum_chi_continuous(&self) -> f64 {
        self.minimum_chi_continuous
    }
}
