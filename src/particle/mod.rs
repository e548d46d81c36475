//! Particles, stored as a structure of arrays

use crate::geometry::ThreeVector;

mod builder;
pub use builder::*;

/// Species-level parameters that are constant over a
/// radiation-reaction call, already in code units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpeciesParameters {
    /// Inverse of the rest mass, in units of the electron mass
    pub one_over_mass: f64,
    /// Duration of the time step, in units of 1/omega_r
    pub dt: f64,
}

impl SpeciesParameters {
    pub fn new(mass: f64, dt: f64) -> Self {
        SpeciesParameters {
            one_over_mass: mass.recip(),
            dt,
        }
    }

    /// Rest mass, in units of the electron mass
    pub fn mass(&self) -> f64 {
        self.one_over_mass.recip()
    }
}

/// A set of macroparticles belonging to the same species.
///
/// Momentum is normalized to `m c`, charge is in units of
/// the elementary charge and `chi` stores the quantum parameter
/// computed at the last radiation-reaction step.
#[derive(Debug, Clone, Default)]
pub struct Particles {
    momentum: [Vec<f64>; 3],
    charge: Vec<i16>,
    weight: Vec<f64>,
    chi: Vec<f64>,
}

impl Particles {
    pub fn with_capacity(n: usize) -> Self {
        Particles {
            momentum: [
                Vec::with_capacity(n),
                Vec::with_capacity(n),
                Vec::with_capacity(n),
            ],
            charge: Vec::with_capacity(n),
            weight: Vec::with_capacity(n),
            chi: Vec::with_capacity(n),
        }
    }

    /// Appends a particle with normalized momentum `u`, charge
    /// state `charge` and statistical weight `weight`. Its quantum
    /// parameter is zero until it is first evaluated.
    pub fn push(&mut self, u: ThreeVector, charge: i16, weight: f64) {
        self.momentum[0].push(u[0]);
        self.momentum[1].push(u[1]);
        self.momentum[2].push(u[2]);
        self.charge.push(charge);
        self.weight.push(weight);
        self.chi.push(0.0);
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    #[allow(unused)]
    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    pub fn momentum(&self, i: usize) -> ThreeVector {
        ThreeVector::new(self.momentum[0][i], self.momentum[1][i], self.momentum[2][i])
    }

    /// Lorentz factor, from the mass-shell condition
    #[allow(unused)]
    pub fn gamma(&self, i: usize) -> f64 {
        let u = self.momentum(i);
        (1.0 + u * u).sqrt()
    }

    #[allow(unused)]
    pub fn charge(&self, i: usize) -> i16 {
        self.charge[i]
    }

    #[allow(unused)]
    pub fn weight(&self, i: usize) -> f64 {
        self.weight[i]
    }

    #[allow(unused)]
    pub fn chi(&self, i: usize) -> f64 {
        self.chi[i]
    }

    /// Total kinetic energy, sum of w (gamma - 1), in units of
    /// the species rest energy.
    pub fn total_kinetic_energy(&self) -> f64 {
        // gamma - 1 = u^2 / (gamma + 1) avoids cancellation at low energy
        (0..self.len())
            .map(|i| {
                let u = self.momentum(i);
                let gamma = (1.0 + u * u).sqrt();
                self.weight[i] * (u * u) / (gamma + 1.0)
            })
            .sum()
    }

    /// Largest quantum parameter stored in the batch
    pub fn max_chi(&self) -> f64 {
        self.chi.iter().cloned().fold(0.0, f64::max)
    }

    /// Borrows the entire batch mutably.
    pub fn view_mut(&mut self) -> ParticlesMut<'_> {
        let [ux, uy, uz] = &mut self.momentum;
        ParticlesMut {
            start: 0,
            ux,
            uy,
            uz,
            charge: &self.charge,
            weight: &self.weight,
            chi: &mut self.chi,
        }
    }

    /// Splits the batch into at most `lanes` contiguous, disjoint,
    /// non-empty views of near-equal length, in index order.
    pub fn split_lanes(&mut self, lanes: usize) -> Vec<ParticlesMut<'_>> {
        let len = self.len();
        self.split_range(0, len, lanes)
    }

    /// As `split_lanes`, but covering only the particles `[istart, iend)`.
    pub fn split_range(&mut self, istart: usize, iend: usize, lanes: usize) -> Vec<ParticlesMut<'_>> {
        assert!(istart <= iend && iend <= self.len(),
            "range {}..{} is outside the batch of {} particles", istart, iend, self.len());
        let lanes = lanes.max(1);
        let len = iend - istart;
        let chunk = (len + lanes - 1) / lanes;
        let mut views = Vec::with_capacity(lanes);
        let (_, rest) = self.view_mut().split_at(istart);
        let (mut rest, _) = rest.split_at(len);
        while rest.len() > chunk {
            let (head, tail) = rest.split_at(chunk);
            views.push(head);
            rest = tail;
        }
        if !rest.is_empty() {
            views.push(rest);
        }
        views
    }
}

/// Mutable view of the contiguous index range `[start, start + len)`
/// of a `Particles`.
///
/// Accessors take the global particle index, so that kernels may
/// be handed `istart` and `iend` as they would be for the full batch.
/// Momentum and `chi` are writable, charge and weight are not.
#[derive(Debug)]
pub struct ParticlesMut<'a> {
    start: usize,
    ux: &'a mut [f64],
    uy: &'a mut [f64],
    uz: &'a mut [f64],
    charge: &'a [i16],
    weight: &'a [f64],
    chi: &'a mut [f64],
}

impl<'a> ParticlesMut<'a> {
    /// Global index of the first particle in the view
    pub fn start(&self) -> usize {
        self.start
    }

    /// Global index one past the last particle in the view
    pub fn end(&self) -> usize {
        self.start + self.len()
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Is every array the same length?
    pub fn is_aligned(&self) -> bool {
        let n = self.len();
        self.ux.len() == n && self.uy.len() == n && self.uz.len() == n
            && self.charge.len() == n && self.chi.len() == n
    }

    /// Divides the view in two at `mid` particles from its start.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let ParticlesMut {start, ux, uy, uz, charge, weight, chi} = self;
        let (ux0, ux1) = ux.split_at_mut(mid);
        let (uy0, uy1) = uy.split_at_mut(mid);
        let (uz0, uz1) = uz.split_at_mut(mid);
        let (q0, q1) = charge.split_at(mid);
        let (w0, w1) = weight.split_at(mid);
        let (chi0, chi1) = chi.split_at_mut(mid);
        let head = ParticlesMut {
            start,
            ux: ux0, uy: uy0, uz: uz0,
            charge: q0, weight: w0, chi: chi0,
        };
        let tail = ParticlesMut {
            start: start + mid,
            ux: ux1, uy: uy1, uz: uz1,
            charge: q1, weight: w1, chi: chi1,
        };
        (head, tail)
    }

    #[inline(always)]
    pub fn momentum(&self, i: usize) -> ThreeVector {
        let j = i - self.start;
        ThreeVector::new(self.ux[j], self.uy[j], self.uz[j])
    }

    #[inline(always)]
    pub fn set_momentum(&mut self, i: usize, u: ThreeVector) {
        let j = i - self.start;
        self.ux[j] = u[0];
        self.uy[j] = u[1];
        self.uz[j] = u[2];
    }

    #[inline(always)]
    pub fn charge(&self, i: usize) -> i16 {
        self.charge[i - self.start]
    }

    #[inline(always)]
    pub fn weight(&self, i: usize) -> f64 {
        self.weight[i - self.start]
    }

    #[inline(always)]
    #[allow(unused)]
    pub fn chi(&self, i: usize) -> f64 {
        self.chi[i - self.start]
    }

    #[inline(always)]
    pub fn set_chi(&mut self, i: usize, chi: f64) {
        self.chi[i - self.start] = chi;
    }
}
