//! Normalized (code) units, defined by a reference angular frequency
//!
//! Times are measured in units of 1/omega_r, momenta in units of m c,
//! energies in units of m c^2, electric fields in units of m c omega_r / e
//! and magnetic fields in units of m omega_r / e, where m and e are the
//! electron mass and elementary charge.

use std::f64::consts;
use crate::constants::*;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Normalization {
    omega_ref: f64,
}

impl Normalization {
    /// Reference angular frequency `omega_r`, in rad/s
    pub fn from_frequency(omega_ref: f64) -> Self {
        Normalization {omega_ref}
    }

    /// Reference angular frequency is that of light with vacuum
    /// wavelength `wavelength`, in metres.
    pub fn from_wavelength(wavelength: f64) -> Self {
        Normalization {
            omega_ref: 2.0 * consts::PI * SPEED_OF_LIGHT / wavelength,
        }
    }

    #[allow(unused)]
    pub fn reference_frequency(&self) -> f64 {
        self.omega_ref
    }

    /// Reduced Compton wavelength in units of c/omega_r,
    /// i.e. hbar omega_r / (m c^2)
    pub fn compton_wavelength(&self) -> f64 {
        COMPTON_TIME * self.omega_ref
    }

    /// Inverse of the Schwinger field m^2 c^3 / (e hbar), in code units.
    /// Numerically equal to `compton_wavelength`.
    pub fn inv_norm_schwinger(&self) -> f64 {
        COMPTON_TIME * self.omega_ref
    }

    /// Converts a time in code units to seconds.
    pub fn time_to_si(&self, t: f64) -> f64 {
        t / self.omega_ref
    }

    /// Converts an electric field, in V/m, to code units.
    #[allow(unused)]
    pub fn electric_field_from_si(&self, e_si: f64) -> f64 {
        e_si * ELEMENTARY_CHARGE / (ELECTRON_MASS * SPEED_OF_LIGHT * self.omega_ref)
    }

    /// Converts a magnetic field, in T, to code units.
    #[allow(unused)]
    pub fn magnetic_field_from_si(&self, b_si: f64) -> f64 {
        b_si * ELEMENTARY_CHARGE / (ELECTRON_MASS * self.omega_ref)
    }
}
