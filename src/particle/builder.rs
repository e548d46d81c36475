use rand::prelude::*;
use rand_distr::StandardNormal;
use crate::geometry::ThreeVector;
use super::Particles;

/// Loads a beam of macroparticles, all with the same charge
/// and weight, propagating along +x.
#[derive(Debug,Copy,Clone)]
pub struct BeamBuilder {
    num: usize,
    charge: i16,
    weight: f64,
    gamma: f64,
    sigma: f64,
    rms_div: f64,
}

impl BeamBuilder {
    pub fn new(num: usize, charge: i16) -> Self {
        BeamBuilder {
            num,
            charge,
            weight: 1.0,
            gamma: 1.0,
            sigma: 0.0,
            rms_div: 0.0,
        }
    }

    pub fn with_weight(&self, weight: f64) -> Self {
        BeamBuilder {
            weight,
            ..*self
        }
    }

    /// Lorentz factors are normally distributed with mean `gamma`
    /// and standard deviation `sigma`, truncated at gamma = 1.
    pub fn with_normal_energy_spectrum(&self, gamma: f64, sigma: f64) -> Self {
        BeamBuilder {
            gamma,
            sigma,
            ..*self
        }
    }

    /// Angles in the x-y and x-z planes are normally distributed with
    /// standard deviation `rms_div`.
    pub fn with_divergence(&self, rms_div: f64) -> Self {
        BeamBuilder {
            rms_div,
            ..*self
        }
    }

    /// Number of macroparticles to be generated
    pub fn len(&self) -> usize {
        self.num
    }

    /// Mean Lorentz factor
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn charge(&self) -> i16 {
        self.charge
    }

    pub fn build<R: Rng>(&self, rng: &mut R) -> Particles {
        let mut particles = Particles::with_capacity(self.num);

        for _i in 0..self.num {
            let gamma = if self.sigma > 0.0 {
                loop {
                    let gamma = self.gamma + self.sigma * rng.sample::<f64,_>(StandardNormal);
                    if gamma > 1.0 {
                        break gamma;
                    }
                }
            } else {
                self.gamma.max(1.0)
            };

            let u = (gamma * gamma - 1.0).sqrt();
            let theta_y = self.rms_div * rng.sample::<f64,_>(StandardNormal);
            let theta_z = self.rms_div * rng.sample::<f64,_>(StandardNormal);
            let u = ThreeVector::new(u, 0.0, 0.0)
                .rotate_around_y(theta_z)
                .rotate_around_x(theta_y);

            particles.push(u, self.charge, self.weight);
        }

        particles
    }
}
