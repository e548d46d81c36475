//! A constant, homogeneous electromagnetic field

use crate::geometry::ThreeVector;
use super::{Field, FieldSamples};

#[allow(non_snake_case)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformField {
    E: ThreeVector,
    B: ThreeVector,
}

#[allow(non_snake_case)]
impl UniformField {
    pub fn new(E: ThreeVector, B: ThreeVector) -> Self {
        UniformField {E, B}
    }

    /// A static magnetic field of magnitude `b0` along z
    #[allow(unused)]
    pub fn magnetic(b0: f64) -> Self {
        UniformField {
            E: ThreeVector::new(0.0, 0.0, 0.0),
            B: ThreeVector::new(0.0, 0.0, b0),
        }
    }

    /// Returns the electric and magnetic fields.
    pub fn components(&self) -> (ThreeVector, ThreeVector) {
        (self.E, self.B)
    }
}

impl Field for UniformField {
    fn interpolate(&self, istart: usize, iend: usize, samples: &mut FieldSamples) {
        debug_assert!(istart <= iend);
        samples.resize(iend - istart);
        for j in 0..(iend - istart) {
            samples.set(j, self.E, self.B);
        }
    }
}
