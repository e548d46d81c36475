//! Continuous radiation reaction with the quantum reduction of the
//! emitted power, as appropriate for chi not much smaller than one

use crate::energy::EnergyAccumulator;
use crate::field::FieldSamples;
use crate::particle::{ParticlesMut, SpeciesParameters};
use crate::units::Normalization;
use super::{EnergyLaw, Radiate};
use super::landau_lifshitz::continuous_radiation_reaction;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorrectedLandauLifshitz {
    one_over_mass: f64,
    dt: f64,
    inv_norm_schwinger: f64,
}

impl CorrectedLandauLifshitz {
    pub fn new(species: &SpeciesParameters, norm: &Normalization) -> Self {
        CorrectedLandauLifshitz {
            one_over_mass: species.one_over_mass,
            dt: species.dt,
            inv_norm_schwinger: norm.inv_norm_schwinger(),
        }
    }
}

impl Radiate for CorrectedLandauLifshitz {
    fn apply<L: EnergyLaw>(&self, particles: &mut ParticlesMut, fields: &FieldSamples, law: &L, energy: &mut EnergyAccumulator, istart: usize, iend: usize, ipart_ref: usize) {
        let radiated = continuous_radiation_reaction(
            particles, fields,
            |chi, dt| law.corrected_radiated_energy(chi, dt),
            law.minimum_chi_continuous(),
            self.one_over_mass, self.dt, self.inv_norm_schwinger,
            istart, iend, ipart_ref,
        );
        energy.add(radiated);
    }

    fn name(&self) -> &'static str {
        "corrected-landau-lifshitz"
    }
}
