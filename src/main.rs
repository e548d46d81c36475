use std::error::Error;
use std::convert::TryFrom;
use std::path::Path;

#[cfg(feature = "with-mpi")]
use mpi::{traits::*, collective::SystemOperation};
#[cfg(not(feature = "with-mpi"))]
use no_mpi::*;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_xoshiro::*;

mod constants;
mod energy;
mod field;
mod geometry;
mod input;
mod particle;
mod radiation;
mod units;

use constants::*;
use energy::*;
use field::*;
use geometry::*;
use input::*;
use particle::*;
use radiation::*;
use units::*;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Diagnostic {
    Warning,
    Error,
}

/// Prints a diagnostic message to stderr, if `$condition` holds.
macro_rules! report {
    ($level:expr, $condition:expr, $($arg:tt)*) => {
        if $condition {
            match $level {
                Diagnostic::Warning => eprintln!("{}: {}", "Warning".bold().yellow(), format!($($arg)*)),
                Diagnostic::Error => eprintln!("{}: {}", "Error".bold().red(), format!($($arg)*)),
            }
        }
    };
}

/// Everything needed to run, read from the input deck and
/// converted to code units.
#[derive(Debug, Clone)]
struct Setup {
    norm: Normalization,
    species: SpeciesParameters,
    model: RadiationModel,
    tables: RadiationTables,
    beam: BeamBuilder,
    field: UniformField,
    steps: usize,
    lanes: usize,
    rng_seed: u64,
    output_every: usize,
}

impl Setup {
    fn from_config(config: &Config, num_threads: usize) -> Result<Self, InputError> {
        let dt = config.read_positive("control:dt")?;
        let steps: usize = config.read("control:steps")?;
        let lanes: usize = config.read("control:lanes").unwrap_or(num_threads).max(1);
        let rng_seed: u64 = config.read("control:rng_seed").unwrap_or(0);
        let output_every: usize = config.read("control:output_every")
            .unwrap_or(steps / 10)
            .max(1);

        let norm = match config.read_positive("control:reference_wavelength") {
            Ok(wavelength) => Normalization::from_wavelength(wavelength),
            Err(e) if e.kind() == InputErrorKind::Location => {
                Normalization::from_frequency(config.read_positive("control:reference_frequency")?)
            },
            Err(e) => return Err(e),
        };

        let mass = config.read_positive("species:mass")?;
        let species = SpeciesParameters::new(mass, dt);

        let charge: i64 = config.read("species:charge")?;
        let charge = i16::try_from(charge)
            .map_err(|_| InputError::invalid("species:charge", "out of range"))?;

        let num: usize = config.read("species:n")?;
        let weight = config.read_positive("species:weight").or_else(|e| {
            if e.kind() == InputErrorKind::Location {Ok(1.0)} else {Err(e)}
        })?;

        let gamma = config.read_positive("species:gamma")?;
        if gamma < 1.0 {
            return Err(InputError::invalid("species:gamma", "Lorentz factor must be at least 1"));
        }
        let sigma: f64 = config.read("species:sigma").unwrap_or(0.0);
        let rms_div: f64 = config.read("species:rms_div").unwrap_or(0.0);
        let beam = BeamBuilder::new(num, charge)
            .with_weight(weight)
            .with_normal_energy_spectrum(gamma, sigma.abs())
            .with_divergence(rms_div.abs());

        let name: String = config.read("species:radiation_model")?;
        let model = RadiationModel::from_name(&name, &species, &norm)
            .ok_or_else(|| InputError::invalid("species:radiation_model", &format!("unknown model \"{}\"", name)))?;

        let minimum_chi: f64 = config.read("radiation:minimum_chi_continuous")
            .unwrap_or(MINIMUM_CHI_CONTINUOUS);
        if minimum_chi < 0.0 {
            return Err(InputError::invalid("radiation:minimum_chi_continuous", "must be non-negative"));
        }
        let tables = RadiationTables::new(&norm).with_minimum_chi_continuous(minimum_chi);

        let zero = ThreeVector::new(0.0, 0.0, 0.0);
        let e: ThreeVector = config.read("field:E").unwrap_or(zero);
        let b: ThreeVector = config.read("field:B").unwrap_or(zero);
        if !e.is_finite() || !b.is_finite() {
            return Err(InputError::invalid("field", "field components must be finite"));
        }

        Ok(Setup {
            norm,
            species,
            model,
            tables,
            beam,
            field: UniformField::new(e, b),
            steps,
            lanes,
            rng_seed,
            output_every,
        })
    }

    /// Fractional momentum loss, in a single step, of a particle
    /// with the mean Lorentz factor moving along +x.
    fn reference_loss(&self) -> f64 {
        let (e, b) = self.field.components();
        let gamma = self.beam.gamma();
        let u = ThreeVector::new((gamma * gamma - 1.0).sqrt(), 0.0, 0.0);
        let q_over_m_sqd = f64::from(self.beam.charge()) * self.species.one_over_mass.powi(2);
        let chi = quantum_parameter(q_over_m_sqd, u, gamma, e, b, self.norm.inv_norm_schwinger());
        if gamma > 1.0 {
            self.tables.radiated_energy(chi, self.species.dt) * gamma / (gamma * gamma - 1.0)
        } else {
            0.0
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(feature = "with-mpi")]
    let universe = mpi::initialize().ok_or("unable to initialize MPI")?;
    #[cfg(not(feature = "with-mpi"))]
    let universe = no_mpi::initialize().ok_or("unable to initialize MPI stand-in")?;

    let world = universe.world();
    let id = world.rank();
    let ntasks = world.size();

    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).ok_or(InputError::file("<none>"))?;
    let path = Path::new(path);

    if id == 0 {
        println!(
            "{} {} ({}) on {} task{}, {} thread{} per task",
            "radrr".bold(),
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA_SHORT").unwrap_or("unknown"),
            ntasks, if ntasks > 1 {"s"} else {""},
            rayon::current_num_threads(), if rayon::current_num_threads() > 1 {"s"} else {""},
        );
        let features = env!("RADRR_ACTIVE_FEATURES");
        if !features.is_empty() {
            println!("\t* with features: {}", features);
        }
    }

    let setup = Config::from_file(path)
        .and_then(|mut config| {
            config.with_context("constants")?;
            Setup::from_config(&config, rayon::current_num_threads())
        });

    let setup = match setup {
        Ok(setup) => setup,
        Err(e) => {
            report!(Diagnostic::Error, id == 0, "{}", e);
            return Err(e.into());
        }
    };

    let Setup {norm, species, model, tables, beam, field, steps, lanes, rng_seed, output_every} = setup.clone();
    let energy_unit = species.mass() * ELECTRON_MASS_MEV;

    if id == 0 {
        println!("{} {} particles per task with {} radiation reaction, {} steps of {:.3e} fs in {} lane{}...",
            "Running".bold().cyan(),
            beam.len(),
            model.name().bold().blue(),
            steps,
            1.0e15 * norm.time_to_si(species.dt),
            lanes, if lanes > 1 {"s"} else {""},
        );
    }

    let loss = setup.reference_loss();
    report!(Diagnostic::Warning, id == 0 && loss > 0.1,
        "fractional momentum loss per step is {:.3e}, consider reducing the time step.", loss);
    report!(Diagnostic::Warning, id == 0 && beam.len() == 0, "no particles to push.");

    let mut rng = Xoshiro256StarStar::seed_from_u64(rng_seed + id as u64);
    let mut particles = beam.build(&mut rng);

    let mut samples = FieldSamples::default();
    field.interpolate(0, particles.len(), &mut samples);

    let mut initial = 0.0;
    world.all_reduce_into(&particles.total_kinetic_energy(), &mut initial, SystemOperation::sum());
    let mut balance = EnergyBalance::new(initial);

    let pb = if id == 0 {
        ProgressBar::new(steps as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({per_sec})")?);

    let num = particles.len();
    let mut step_energy = EnergyAccumulator::new();
    for step in 0..steps {
        step_energy.reset();
        let lanes_energy = apply_in_lanes(&model, &mut particles, &samples, &tables, lanes, 0, num, 0);
        step_energy.add(lanes_energy.total());

        let radiated = step_energy.all_reduce(&world);
        balance.record(radiated);

        if (step + 1) % output_every == 0 {
            pb.println(format!("\tstep {:>6}: radiated {:.6e} MeV", step + 1, radiated * energy_unit));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut kinetic = 0.0;
    world.all_reduce_into(&particles.total_kinetic_energy(), &mut kinetic, SystemOperation::sum());
    let mut max_chi = 0.0;
    world.all_reduce_into(&particles.max_chi(), &mut max_chi, SystemOperation::max());

    if id == 0 {
        println!("{} {} steps.", "Completed".bold().bright_green(), steps);
        println!("\tinitial kinetic energy = {:.6e} MeV", initial * energy_unit);
        println!("\t  final kinetic energy = {:.6e} MeV", kinetic * energy_unit);
        println!("\t      radiated energy = {:.6e} MeV", balance.radiated() * energy_unit);
        println!("\t              max chi = {:.6e}", max_chi);
        println!("\t        balance error = {:.3e}", balance.relative_error(kinetic));
    }

    Ok(())
}
