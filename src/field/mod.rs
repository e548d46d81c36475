//! Electromagnetic field, sampled at particle positions

use crate::geometry::ThreeVector;

mod uniform;
pub use self::uniform::*;

/// Components of the electric and magnetic fields, interpolated to the
/// positions of a contiguous set of particles, in units of
/// `m c omega_r / e` (electric) and `m omega_r / e` (magnetic).
///
/// The sample belonging to particle `i` is stored at `i - ipart_ref`,
/// where `ipart_ref` is the index of the first particle the buffer was
/// filled for.
#[derive(Debug, Clone, Default)]
pub struct FieldSamples {
    ex: Vec<f64>,
    ey: Vec<f64>,
    ez: Vec<f64>,
    bx: Vec<f64>,
    by: Vec<f64>,
    bz: Vec<f64>,
}

#[allow(non_snake_case)]
impl FieldSamples {
    /// Creates a buffer with `n` zeroed samples.
    #[allow(unused)]
    pub fn new(n: usize) -> Self {
        FieldSamples {
            ex: vec![0.0; n],
            ey: vec![0.0; n],
            ez: vec![0.0; n],
            bx: vec![0.0; n],
            by: vec![0.0; n],
            bz: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.ex.len()
    }

    #[allow(unused)]
    pub fn is_empty(&self) -> bool {
        self.ex.is_empty()
    }

    /// Changes the number of samples, zeroing any new entries.
    pub fn resize(&mut self, n: usize) {
        for c in [&mut self.ex, &mut self.ey, &mut self.ez, &mut self.bx, &mut self.by, &mut self.bz].iter_mut() {
            c.resize(n, 0.0);
        }
    }

    pub fn set(&mut self, j: usize, E: ThreeVector, B: ThreeVector) {
        self.ex[j] = E[0];
        self.ey[j] = E[1];
        self.ez[j] = E[2];
        self.bx[j] = B[0];
        self.by[j] = B[1];
        self.bz[j] = B[2];
    }

    /// Electric field at buffer offset `j`
    #[inline(always)]
    pub fn E(&self, j: usize) -> ThreeVector {
        ThreeVector::new(self.ex[j], self.ey[j], self.ez[j])
    }

    /// Magnetic field at buffer offset `j`
    #[inline(always)]
    pub fn B(&self, j: usize) -> ThreeVector {
        ThreeVector::new(self.bx[j], self.by[j], self.bz[j])
    }
}

/// Represents the electromagnetic field in the simulation domain,
/// as seen by the particle pusher.
pub trait Field {
    /// Fills `samples` with the field seen by particles
    /// `[istart, iend)`, storing particle `i` at `i - istart`.
    fn interpolate(&self, istart: usize, iend: usize, samples: &mut FieldSamples);
}
