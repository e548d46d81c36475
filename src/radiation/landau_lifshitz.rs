//! Classical, continuous radiation reaction following the
//! Landau-Lifshitz prescription, without quantum corrections

use crate::energy::{EnergyAccumulator, pairwise_sum};
use crate::field::FieldSamples;
use crate::particle::{ParticlesMut, SpeciesParameters};
use crate::units::Normalization;
use super::{EnergyLaw, Radiate, quantum_parameter, check_range, update_chi};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LandauLifshitz {
    one_over_mass: f64,
    dt: f64,
    inv_norm_schwinger: f64,
}

impl LandauLifshitz {
    pub fn new(species: &SpeciesParameters, norm: &Normalization) -> Self {
        LandauLifshitz {
            one_over_mass: species.one_over_mass,
            dt: species.dt,
            inv_norm_schwinger: norm.inv_norm_schwinger(),
        }
    }
}

impl Radiate for LandauLifshitz {
    fn apply<L: EnergyLaw>(&self, particles: &mut ParticlesMut, fields: &FieldSamples, law: &L, energy: &mut EnergyAccumulator, istart: usize, iend: usize, ipart_ref: usize) {
        let radiated = continuous_radiation_reaction(
            particles, fields,
            |chi, dt| law.radiated_energy(chi, dt),
            law.minimum_chi_continuous(),
            self.one_over_mass, self.dt, self.inv_norm_schwinger,
            istart, iend, ipart_ref,
        );
        energy.add(radiated);
    }

    fn name(&self) -> &'static str {
        "landau-lifshitz"
    }
}

/// Removes the energy `radiated_energy(chi, dt)` from the momentum of
/// every particle in `istart..iend` that has gamma > 1 and chi at least
/// `minimum_chi`.
///
/// Returns the sum of the weighted, exact energy losses
/// w (gamma - gamma'), where gamma' is computed from the updated momentum.
/// On exit, the stored chi of all particles in range reflects their
/// updated momentum.
#[allow(clippy::too_many_arguments)]
pub(super) fn continuous_radiation_reaction<F>(
    particles: &mut ParticlesMut,
    fields: &FieldSamples,
    radiated_energy: F,
    minimum_chi: f64,
    one_over_mass: f64,
    dt: f64,
    inv_norm_schwinger: f64,
    istart: usize,
    iend: usize,
    ipart_ref: usize) -> f64
where
    F: Fn(f64, f64) -> f64
{
    check_range(particles, fields, istart, iend, ipart_ref);

    let one_over_mass_sqd = one_over_mass * one_over_mass;

    // weighted energy lost by each particle
    let mut rad_norm_energy = vec![0.0; iend - istart];

    for ipart in istart..iend {
        let charge_over_mass_sqd = f64::from(particles.charge(ipart)) * one_over_mass_sqd;
        let u = particles.momentum(ipart);
        let gamma = (1.0 + u * u).sqrt();

        let j = ipart - ipart_ref;
        let (e, b) = (fields.E(j), fields.B(j));
        debug_assert!(e.is_finite() && b.is_finite(), "non-finite field sample at {}", j);

        let chi = quantum_parameter(charge_over_mass_sqd, u, gamma, e, b, inv_norm_schwinger);

        // gamma / (gamma^2 - 1) diverges at rest
        if gamma > 1.0 && chi >= minimum_chi {
            let f = radiated_energy(chi, dt) * gamma / (gamma * gamma - 1.0);
            debug_assert!(f < 1.0, "fractional momentum loss {:.3e} of particle {} reverses its momentum", f, ipart);
            let u = u - f * u;
            particles.set_momentum(ipart, u);
            let loss = gamma - (1.0 + u * u).sqrt();
            rad_norm_energy[ipart - istart] = particles.weight(ipart) * loss;
        }
    }

    let radiated = pairwise_sum(&rad_norm_energy);

    update_chi(particles, fields, one_over_mass, inv_norm_schwinger, istart, iend, ipart_ref);

    radiated
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_xoshiro::*;
    use crate::geometry::ThreeVector;
    use crate::particle::Particles;
    use crate::radiation::{RadiationModel, RadiationTables, apply_in_lanes};
    use super::*;

    /// Returns the same energy for every chi.
    struct FixedLaw {
        energy: f64,
        minimum_chi: f64,
    }

    impl EnergyLaw for FixedLaw {
        fn radiated_energy(&self, _chi: f64, _dt: f64) -> f64 {
            self.energy
        }

        fn minimum_chi_continuous(&self) -> f64 {
            self.minimum_chi
        }
    }

    const INV_NORM_SCHWINGER: f64 = 1.0e-6;

    fn model(dt: f64) -> LandauLifshitz {
        LandauLifshitz {
            one_over_mass: 1.0,
            dt,
            inv_norm_schwinger: INV_NORM_SCHWINGER,
        }
    }

    /// Magnetic field, along z, such that a particle with momentum
    /// (u, 0, 0) has quantum parameter `chi`
    fn field_for(chi: f64, u: f64, n: usize) -> FieldSamples {
        let b = chi / (INV_NORM_SCHWINGER * u);
        let mut samples = FieldSamples::new(n);
        for j in 0..n {
            samples.set(j, [0.0; 3].into(), [0.0, 0.0, b].into());
        }
        samples
    }

    fn random_batch(n: usize, seed: u64) -> (Particles, FieldSamples) {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut pt = Particles::with_capacity(n);
        let mut samples = FieldSamples::new(n);
        for j in 0..n {
            let u = ThreeVector::new(
                rng.gen_range(-1000.0, 1000.0),
                rng.gen_range(-100.0, 100.0),
                rng.gen_range(-100.0, 100.0),
            );
            let charge = if rng.gen::<bool>() { -1 } else { 1 };
            pt.push(u, charge, rng.gen_range(0.5, 2.0));
            let e = ThreeVector::new(rng.gen_range(-1.0, 1.0), rng.gen_range(-1.0, 1.0), rng.gen_range(-1.0, 1.0));
            let b = ThreeVector::new(rng.gen_range(-1.0, 1.0), rng.gen_range(-1.0, 1.0), rng.gen_range(-1.0, 1.0));
            samples.set(j, 100.0 * e, 100.0 * b);
        }
        (pt, samples)
    }

    #[test]
    fn single_particle() {
        let threshold = 1.0e-3;
        let law = FixedLaw {energy: 1.0e-4, minimum_chi: threshold};
        let mut pt = Particles::with_capacity(1);
        pt.push(ThreeVector::new(10.0, 0.0, 0.0), -1, 1.0);
        let samples = field_for(2.0 * threshold, 10.0, 1);

        let gamma_before = pt.gamma(0);
        let mut energy = EnergyAccumulator::new();
        model(0.01).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);

        let f = 1.0e-4 * gamma_before / (gamma_before * gamma_before - 1.0);
        let ux = 10.0 * (1.0 - f);
        let gamma_after = (1.0 + ux * ux).sqrt();
        println!("gamma = {:.6} => {:.6}, f = {:.6e}, u_x = {:.9}, loss = {:.6e}", gamma_before, pt.gamma(0), f, pt.momentum(0)[0], energy.total());

        assert!((gamma_before - 10.0498756).abs() < 1.0e-6);
        assert!((f - 1.005e-5).abs() < 1.0e-9);
        assert!(((pt.momentum(0)[0] - ux) / ux).abs() < 1.0e-12);
        assert_eq!(pt.momentum(0)[1], 0.0);
        assert_eq!(pt.momentum(0)[2], 0.0);
        let target = gamma_before - gamma_after;
        assert!(((energy.total() - target) / target).abs() < 1.0e-9);
        // which is approximately the radiated energy
        assert!(((energy.total() - 1.0e-4) / 1.0e-4).abs() < 1.0e-5);
    }

    #[test]
    fn recorded_loss_is_exact() {
        let law = FixedLaw {energy: 0.0, minimum_chi: 0.0};
        for i in 0..12 {
            // large enough that the first-order estimate is poor
            let energy_lost = 1.0e-6 * 4.0f64.powi(i);
            let law = FixedLaw {energy: energy_lost, ..law};
            let mut pt = Particles::with_capacity(1);
            pt.push(ThreeVector::new(0.0, 30.0, -40.0), 1, 1.0);
            let samples = field_for(0.1, 50.0, 1);

            let gamma_before = pt.gamma(0);
            let mut energy = EnergyAccumulator::new();
            model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
            let exact = gamma_before - pt.gamma(0);

            println!("W = {:.3e}: recorded = {:.6e}, gamma - gamma' = {:.6e}", energy_lost, energy.total(), exact);
            assert_eq!(energy.total(), exact);
        }
    }

    #[test]
    fn threshold_gating() {
        let threshold = 1.0e-3;
        let law = FixedLaw {energy: 1.0e-2, minimum_chi: threshold};
        let u0 = ThreeVector::new(20.0, 0.0, 0.0);

        // just below
        let mut pt = Particles::with_capacity(1);
        pt.push(u0, -1, 1.0);
        let samples = field_for(threshold * (1.0 - 1.0e-9), 20.0, 1);
        let mut energy = EnergyAccumulator::new();
        model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
        assert_eq!(pt.momentum(0), u0);
        assert_eq!(energy.total(), 0.0);

        // just above
        let mut pt = Particles::with_capacity(1);
        pt.push(u0, -1, 1.0);
        let samples = field_for(threshold * (1.0 + 1.0e-9), 20.0, 1);
        model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
        println!("u_x = {:.9} => {:.9}", u0[0], pt.momentum(0)[0]);
        assert!(pt.momentum(0)[0] < u0[0] - 1.0e-3);
        assert!(energy.total() > 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "reverses its momentum")]
    fn momentum_reversal_is_caught() {
        // gamma ~ 10: f ~ 30 / 10
        let law = FixedLaw {energy: 30.0, minimum_chi: 0.0};
        let mut pt = Particles::with_capacity(1);
        pt.push(ThreeVector::new(10.0, 0.0, 0.0), -1, 1.0);
        let samples = field_for(0.1, 10.0, 1);
        let mut energy = EnergyAccumulator::new();
        model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
    }

    #[test]
    fn particles_at_rest_do_not_radiate() {
        let law = FixedLaw {energy: 1.0, minimum_chi: 0.0};
        let mut pt = Particles::with_capacity(1);
        pt.push(ThreeVector::new(0.0, 0.0, 0.0), -1, 1.0);
        let mut samples = FieldSamples::new(1);
        samples.set(0, [1.0, 0.0, 0.0].into(), [0.0, 0.0, 1.0].into());

        let mut energy = EnergyAccumulator::new();
        model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
        assert_eq!(pt.momentum(0), ThreeVector::new(0.0, 0.0, 0.0));
        assert_eq!(energy.total(), 0.0);
        // chi is still evaluated: E / E_s
        assert!((pt.chi(0) - INV_NORM_SCHWINGER).abs() < 1.0e-18);
    }

    #[test]
    fn reduction_factor_is_monotonic() {
        let u0 = ThreeVector::new(0.0, 0.0, 50.0);
        let mut last = 0.0;
        for i in 0..20 {
            let law = FixedLaw {energy: 1.0e-5 * 1.5f64.powi(i), minimum_chi: 0.0};
            let mut pt = Particles::with_capacity(1);
            pt.push(u0, -1, 1.0);
            let mut samples = FieldSamples::new(1);
            samples.set(0, [0.0; 3].into(), [1.0, 0.0, 0.0].into());
            let mut energy = EnergyAccumulator::new();
            model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 0, 1, 0);
            let f = 1.0 - pt.momentum(0)[2] / u0[2];
            assert!(f >= last);
            last = f;
        }
    }

    #[test]
    fn direction_is_preserved() {
        let norm = Normalization::from_wavelength(0.8e-6);
        let tables = RadiationTables::new(&norm);
        let (mut pt, samples) = random_batch(1000, 0);
        let before = pt.clone();

        let species = SpeciesParameters::new(1.0, 0.1);
        let model = LandauLifshitz::new(&species, &norm);
        let mut energy = EnergyAccumulator::new();
        let n = pt.len();
        model.apply(&mut pt.view_mut(), &samples, &tables, &mut energy, 0, n, 0);

        let mut changed = 0;
        for i in 0..n {
            let (u0, u1) = (before.momentum(i), pt.momentum(i));
            let sin_angle = u0.cross(u1).norm_sqr().sqrt() / (u0.norm_sqr() * u1.norm_sqr()).sqrt();
            assert!(sin_angle < 1.0e-14, "momentum of particle {} rotated: {} => {}", i, u0, u1);
            assert!(u1.norm_sqr() <= u0.norm_sqr());
            if u1 != u0 {
                changed += 1;
            }
        }
        println!("{} of {} particles radiated, total = {:.6e}", changed, n, energy.total());
        assert!(changed > 0);
        assert!(energy.total() > 0.0);
    }

    #[test]
    fn chi_reflects_updated_momentum() {
        let norm = Normalization::from_wavelength(0.8e-6);
        // high threshold so that only some particles radiate
        let tables = RadiationTables::new(&norm).with_minimum_chi_continuous(0.1);
        let (mut pt, samples) = random_batch(500, 1);
        let species = SpeciesParameters::new(1.0, 0.1);
        let model = LandauLifshitz::new(&species, &norm);

        let mut energy = EnergyAccumulator::new();
        let n = pt.len();
        model.apply(&mut pt.view_mut(), &samples, &tables, &mut energy, 0, n, 0);

        let below = (0..n).filter(|&i| pt.chi(i) < 0.1).count();
        println!("{} of {} particles below threshold", below, n);
        assert!(below > 0 && below < n);

        for i in 0..n {
            let u = pt.momentum(i);
            let gamma = (1.0 + u * u).sqrt();
            let chi = quantum_parameter(-1.0, u, gamma, samples.E(i), samples.B(i), norm.inv_norm_schwinger());
            assert_eq!(pt.chi(i), chi);
        }
    }

    #[test]
    fn field_buffer_offset() {
        // field samples only cover particles 4..8
        let law = FixedLaw {energy: 1.0e-3, minimum_chi: 0.0};
        let mut pt = Particles::with_capacity(10);
        for _i in 0..10 {
            pt.push(ThreeVector::new(10.0, 0.0, 0.0), -1, 1.0);
        }
        let samples = field_for(0.1, 10.0, 4);
        let mut energy = EnergyAccumulator::new();
        model(0.1).apply(&mut pt.view_mut(), &samples, &law, &mut energy, 4, 8, 4);

        for i in 0..10 {
            let radiated = pt.momentum(i)[0] < 10.0;
            assert_eq!(radiated, i >= 4 && i < 8, "particle {}", i);
            assert_eq!(pt.chi(i) > 0.0, i >= 4 && i < 8);
        }
    }

    #[test]
    fn lanes_over_offset_field_buffer() {
        // field samples only cover particles 4..12
        let law = FixedLaw {energy: 1.0e-3, minimum_chi: 0.0};
        let rr: RadiationModel = model(0.1).into();
        let mut reference = Particles::with_capacity(12);
        for i in 0..12 {
            reference.push(ThreeVector::new(10.0 + i as f64, 0.0, 0.0), -1, 1.0);
        }
        let samples = field_for(0.1, 10.0, 8);

        let mut pt = reference.clone();
        let mut expected = EnergyAccumulator::new();
        rr.apply(&mut pt.view_mut(), &samples, &law, &mut expected, 4, 12, 4);

        for &lanes in [1, 3, 8].iter() {
            let mut pt = reference.clone();
            let energy = apply_in_lanes(&rr, &mut pt, &samples, &law, lanes, 4, 12, 4);
            println!("lanes = {}: radiated = {:.16e}", lanes, energy.total());
            assert!(((energy.total() - expected.total()) / expected.total()).abs() < 1.0e-14);
            for i in 0..12 {
                let radiated = pt.momentum(i) != reference.momentum(i);
                assert_eq!(radiated, i >= 4, "particle {}", i);
                assert_eq!(pt.chi(i) > 0.0, i >= 4);
            }
        }
    }

    #[test]
    fn weighted_sum_is_independent_of_lanes() {
        let norm = Normalization::from_wavelength(0.8e-6);
        let tables = RadiationTables::new(&norm);
        let species = SpeciesParameters::new(1.0, 0.1);
        let model: RadiationModel = LandauLifshitz::new(&species, &norm).into();

        let (reference, samples) = random_batch(4099, 3);
        let n = reference.len();

        // direct sum of w_i e_i
        let expected = {
            let mut pt = reference.clone();
            let mut energy = EnergyAccumulator::new();
            model.apply(&mut pt.view_mut(), &samples, &tables, &mut energy, 0, n, 0);
            let direct: f64 = (0..n).map(|i| reference.weight(i) * (reference.gamma(i) - pt.gamma(i))).sum();
            assert!(((energy.total() - direct) / direct).abs() < 1.0e-12);
            energy.total()
        };

        for &lanes in [1, 2, 3, 7, 16, 64].iter() {
            let mut pt = reference.clone();
            let first = apply_in_lanes(&model, &mut pt, &samples, &tables, lanes, 0, n, 0).total();
            let mut pt = reference.clone();
            let second = apply_in_lanes(&model, &mut pt, &samples, &tables, lanes, 0, n, 0).total();
            let error = ((first - expected) / expected).abs();
            println!("lanes = {:>2}: radiated = {:.16e}, rel. difference = {:.3e}", lanes, first, error);
            assert_eq!(first, second);
            assert!(error < 1.0e-12);
        }
    }

    #[test]
    fn energy_balance_over_many_steps() {
        use crate::energy::EnergyBalance;
        let norm = Normalization::from_wavelength(0.8e-6);
        let tables = RadiationTables::new(&norm);
        let species = SpeciesParameters::new(1.0, 0.05);
        let model: RadiationModel = LandauLifshitz::new(&species, &norm).into();
        let (mut pt, samples) = random_batch(1000, 4);
        let n = pt.len();

        let mut balance = EnergyBalance::new(pt.total_kinetic_energy());
        for _step in 0..50 {
            let energy = apply_in_lanes(&model, &mut pt, &samples, &tables, 4, 0, n, 0);
            balance.record(energy.total());
        }
        let error = balance.relative_error(pt.total_kinetic_energy());
        println!("radiated = {:.6e}, relative error in balance = {:.3e}", balance.radiated(), error);
        assert!(balance.radiated() > 0.0);
        assert!(error.abs() < 1.0e-10);
    }
}
