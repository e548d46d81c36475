//! Radiation reaction on charged particles
//!
//! The continuous models remove the energy radiated in a time step from
//! the particle momentum, without changing its direction, and record
//! that energy for the global energy balance. Each call processes the
//! particles `istart..iend` of a view, reading the field for particle `i`
//! from offset `i - ipart_ref` of the field buffer.

use enum_dispatch::enum_dispatch;
use rayon::prelude::*;

use crate::energy::EnergyAccumulator;
use crate::field::FieldSamples;
use crate::geometry::ThreeVector;
use crate::particle::{Particles, ParticlesMut, SpeciesParameters};
use crate::units::Normalization;

mod tables;
mod landau_lifshitz;
mod corrected;

pub use tables::*;
pub use landau_lifshitz::*;
pub use corrected::*;

/// Returns the Lorentz-invariant quantum parameter chi of a particle
/// with charge-to-mass-squared ratio `charge_over_mass_sqd` (in units of
/// e / m_e^2), normalized momentum `u` and Lorentz factor `gamma`, in an
/// electric field `E` and magnetic field `B` given in code units.
///
/// `inv_norm_schwinger` is the inverse of the Schwinger field in
/// the same units.
#[allow(non_snake_case)]
#[inline(always)]
pub fn quantum_parameter(charge_over_mass_sqd: f64, u: ThreeVector, gamma: f64, E: ThreeVector, B: ThreeVector, inv_norm_schwinger: f64) -> f64 {
    // chi^2 = |(gamma E + u x B)^2 - (E.u)^2| / E_s^2
    let e_par = E * u;
    let f_perp = gamma * E + u.cross(B);
    inv_norm_schwinger * charge_over_mass_sqd.abs() * (e_par * e_par - f_perp.norm_sqr()).abs().sqrt()
}

/// Capability shared by all radiation-reaction models.
#[enum_dispatch]
pub trait Radiate {
    /// Applies radiation reaction to particles `istart..iend` of `particles`,
    /// adding the weighted energy they radiate to `energy` and, for every
    /// particle in range, storing the quantum parameter evaluated with
    /// the updated momentum.
    fn apply<L: EnergyLaw>(&self, particles: &mut ParticlesMut, fields: &FieldSamples, law: &L, energy: &mut EnergyAccumulator, istart: usize, iend: usize, ipart_ref: usize);

    /// Name of the model, as given in the input file
    fn name(&self) -> &'static str;
}

/// The radiation-reaction models a species may use.
#[enum_dispatch(Radiate)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RadiationModel {
    NoRadiation,
    LandauLifshitz,
    CorrectedLandauLifshitz,
}

impl RadiationModel {
    /// Looks up a model by the name used in the input file,
    /// returning `None` if it is not recognised.
    pub fn from_name(name: &str, species: &SpeciesParameters, norm: &Normalization) -> Option<Self> {
        match name {
            "none" => Some(NoRadiation::new(species, norm).into()),
            "landau-lifshitz" | "LL" => Some(LandauLifshitz::new(species, norm).into()),
            "corrected-landau-lifshitz" | "cLL" => Some(CorrectedLandauLifshitz::new(species, norm).into()),
            _ => None,
        }
    }
}

/// Refreshes the stored quantum parameter, leaving the momentum
/// untouched.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoRadiation {
    one_over_mass: f64,
    inv_norm_schwinger: f64,
}

impl NoRadiation {
    pub fn new(species: &SpeciesParameters, norm: &Normalization) -> Self {
        NoRadiation {
            one_over_mass: species.one_over_mass,
            inv_norm_schwinger: norm.inv_norm_schwinger(),
        }
    }
}

impl Radiate for NoRadiation {
    fn apply<L: EnergyLaw>(&self, particles: &mut ParticlesMut, fields: &FieldSamples, _law: &L, _energy: &mut EnergyAccumulator, istart: usize, iend: usize, ipart_ref: usize) {
        check_range(particles, fields, istart, iend, ipart_ref);
        update_chi(particles, fields, self.one_over_mass, self.inv_norm_schwinger, istart, iend, ipart_ref);
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

#[inline]
fn check_range(particles: &ParticlesMut, fields: &FieldSamples, istart: usize, iend: usize, ipart_ref: usize) {
    debug_assert!(particles.is_aligned());
    debug_assert!(istart <= iend);
    debug_assert!(istart >= particles.start() && iend <= particles.end(),
        "range {}..{} is outside the view {}..{}", istart, iend, particles.start(), particles.end());
    debug_assert!(istart >= ipart_ref && iend - ipart_ref <= fields.len(),
        "range {}..{} is not covered by {} field samples from {}", istart, iend, fields.len(), ipart_ref);
}

/// Evaluates and stores chi for particles `istart..iend`,
/// using their current momentum.
#[inline]
fn update_chi(particles: &mut ParticlesMut, fields: &FieldSamples, one_over_mass: f64, inv_norm_schwinger: f64, istart: usize, iend: usize, ipart_ref: usize) {
    let one_over_mass_sqd = one_over_mass * one_over_mass;
    for ipart in istart..iend {
        let charge_over_mass_sqd = f64::from(particles.charge(ipart)) * one_over_mass_sqd;
        let u = particles.momentum(ipart);
        let gamma = (1.0 + u * u).sqrt();
        let j = ipart - ipart_ref;
        let chi = quantum_parameter(charge_over_mass_sqd, u, gamma, fields.E(j), fields.B(j), inv_norm_schwinger);
        particles.set_chi(ipart, chi);
    }
}

/// Applies `model` to particles `istart..iend` of `particles`, splitting
/// that range into `lanes` disjoint views that are processed in parallel.
///
/// `fields` holds the sample for particle `i` at `i - ipart_ref`.
/// The returned accumulator combines the lanes in index order, so the
/// result is reproducible for a fixed number of lanes.
#[allow(clippy::too_many_arguments)]
pub fn apply_in_lanes<L: EnergyLaw>(model: &RadiationModel, particles: &mut Particles, fields: &FieldSamples, law: &L, lanes: usize, istart: usize, iend: usize, ipart_ref: usize) -> EnergyAccumulator {
    let partials: Vec<EnergyAccumulator> = particles.split_range(istart, iend, lanes)
        .into_par_iter()
        .map(|mut view| {
            let mut energy = EnergyAccumulator::new();
            let (istart, iend) = (view.start(), view.end());
            model.apply(&mut view, fields, law, &mut energy, istart, iend, ipart_ref);
            energy
        })
        .collect();

    EnergyAccumulator::merge(partials)
}
