//! Bookkeeping of the energy removed by radiation reaction
//!
//! Each radiation-reaction call adds the weighted energy radiated by its
//! batch into an `EnergyAccumulator`. Concurrent lanes each own one and are
//! combined by the caller with `EnergyAccumulator::merge`, which uses
//! pairwise summation: for a fixed decomposition the result is
//! bit-reproducible, and different lane counts agree to within round-off.

#[cfg(feature = "with-mpi")]
use mpi::{traits::*, collective::SystemOperation};
#[cfg(not(feature = "with-mpi"))]
use no_mpi::*;

/// Below this length, `pairwise_sum` adds sequentially
const PAIRWISE_BLOCK: usize = 8;

/// Sums `values` by recursive halving, which bounds the round-off
/// error by O(log n) rather than O(n).
pub fn pairwise_sum(values: &[f64]) -> f64 {
    if values.len() <= PAIRWISE_BLOCK {
        values.iter().sum()
    } else {
        let (lhs, rhs) = values.split_at(values.len() / 2);
        pairwise_sum(lhs) + pairwise_sum(rhs)
    }
}

/// Running total of the energy radiated in one time step,
/// in units of the species rest energy, weighted by the
/// macroparticle statistical weight.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct EnergyAccumulator {
    total: f64,
}

impl EnergyAccumulator {
    pub fn new() -> Self {
        EnergyAccumulator {total: 0.0}
    }

    pub fn add(&mut self, energy: f64) {
        self.total += energy;
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Zeroes the total, to be called at the start of every step.
    pub fn reset(&mut self) {
        self.total = 0.0;
    }

    /// Combines per-lane accumulators, in the order given.
    pub fn merge<I>(lanes: I) -> Self where I: IntoIterator<Item = EnergyAccumulator> {
        let partials: Vec<f64> = lanes.into_iter().map(|acc| acc.total).collect();
        EnergyAccumulator {
            total: pairwise_sum(&partials),
        }
    }

    /// Sum over all tasks in the communicator.
    pub fn all_reduce(&self, comm: &impl Communicator) -> f64 {
        let mut global = 0.0;
        comm.all_reduce_into(&self.total, &mut global, SystemOperation::sum());
        global
    }
}

/// Global energy-conservation check for a radiating species: the
/// kinetic energy lost by the particles must equal the energy recorded
/// as radiated.
#[derive(Debug, Copy, Clone)]
pub struct EnergyBalance {
    initial_kinetic: f64,
    radiated: f64,
}

impl EnergyBalance {
    pub fn new(initial_kinetic: f64) -> Self {
        EnergyBalance {
            initial_kinetic,
            radiated: 0.0,
        }
    }

    /// Adds the energy radiated in a single step.
    pub fn record(&mut self, radiated: f64) {
        self.radiated += radiated;
    }

    pub fn radiated(&self) -> f64 {
        self.radiated
    }

    /// (K_0 - K - W_rad) / K_0, given the current kinetic energy `kinetic`
    pub fn relative_error(&self, kinetic: f64) -> f64 {
        if self.initial_kinetic > 0.0 {
            (self.initial_kinetic - kinetic - self.radiated) / self.initial_kinetic
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_xoshiro::*;
    use super::*;

    #[test]
    fn pairwise_matches_naive() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);
        let values: Vec<f64> = (0..10_001).map(|_| rng.gen::<f64>()).collect();
        let naive: f64 = values.iter().sum();
        let pairwise = pairwise_sum(&values);
        println!("naive = {:.16e}, pairwise = {:.16e}", naive, pairwise);
        assert!(((naive - pairwise) / naive).abs() < 1.0e-12);
        assert_eq!(pairwise_sum(&[]), 0.0);
        assert_eq!(pairwise_sum(&[1.5]), 1.5);
    }

    #[test]
    fn pairwise_is_more_accurate() {
        // 1 + n * eps/4, where each small increment is lost by naive summation
        let n = 1 << 16;
        let tiny = f64::EPSILON / 4.0;
        let mut values = vec![tiny; n];
        values.insert(0, 1.0);
        let naive: f64 = values.iter().sum();
        let pairwise = pairwise_sum(&values);
        let exact = 1.0 + (n as f64) * tiny;
        println!("naive error = {:e}, pairwise error = {:e}", naive - exact, pairwise - exact);
        assert!((pairwise - exact).abs() < (naive - exact).abs());
    }

    #[test]
    fn merging_lanes() {
        let lanes: Vec<EnergyAccumulator> = (1..=4)
            .map(|i| {
                let mut acc = EnergyAccumulator::new();
                acc.add(0.25 * i as f64);
                acc
            })
            .collect();
        let merged = EnergyAccumulator::merge(lanes);
        assert_eq!(merged.total(), 2.5);

        let mut acc = merged;
        acc.reset();
        assert_eq!(acc.total(), 0.0);
        assert_eq!(EnergyAccumulator::merge(Vec::new()).total(), 0.0);
    }

    #[cfg(not(feature = "with-mpi"))]
    #[test]
    fn single_task_reduction() {
        let world = no_mpi::initialize().unwrap().world();
        let mut acc = EnergyAccumulator::new();
        acc.add(1.25);
        assert_eq!(acc.all_reduce(&world), 1.25);
    }

    #[test]
    fn balance() {
        let mut balance = EnergyBalance::new(10.0);
        balance.record(0.5);
        balance.record(0.25);
        assert_eq!(balance.radiated(), 0.75);
        assert!(balance.relative_error(9.25).abs() < 1.0e-15);
        assert!((balance.relative_error(9.0) - 0.025).abs() < 1.0e-15);
    }
}
