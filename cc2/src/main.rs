//! CC2 Calculation Command-Line Interface
//!
//! Entry point for running a CC2 ground-state calculation on the dense
//! lattice model reference with YAML configuration.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;

use mra::dense::DenseBackend;

use cc2::config::{Args, Config};
use cc2::io::{print_summary, setup_output};
use cc2::operators_impl::CcOperators;
use cc2::orbital_impl::ReferenceState;
use cc2::solver_impl::Cc2Solver;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_ref());

    // Load and parse configuration
    info!("Reading configuration from: {}", args.config_file);
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;
    let config: Config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();
    info!("Configuration loaded:\n{:?}", config);

    let params = config.to_params(&args);
    let backend = Arc::new(DenseBackend::new(
        config.grid_points(),
        config.extent(),
        config.gamma(),
    ));
    let reference = build_model_reference(&backend, &config)?;

    let ops = CcOperators::new(backend, reference, params);
    let mut solver = Cc2Solver::new(ops);
    let output = solver.solve();

    solver.ops().diagnostics().report();
    let warnings = solver.ops().diagnostics().warnings();
    print_summary(&mut std::io::stdout(), &output, &warnings)?;
    Ok(())
}

/// Build the synthetic model reference: orthonormalized Gaussian lobes spread
/// over the lattice, with configured or evenly spaced bound-state energies.
fn build_model_reference(
    backend: &Arc<DenseBackend>,
    config: &Config,
) -> Result<ReferenceState<nalgebra::DVector<f64>>> {
    let occupied = config.occupied();
    if occupied == 0 {
        return Err(eyre!("model needs at least one occupied orbital"));
    }

    let extent = config.extent();
    let spread = extent / 2.0;
    let lobes: Vec<_> = (0..occupied)
        .map(|i| {
            let center = if occupied == 1 {
                0.0
            } else {
                -spread + i as f64 * (2.0 * spread / (occupied - 1) as f64)
            };
            backend.gaussian(center, 0.8)
        })
        .collect();
    let orbitals = backend.orthonormalize(&lobes);

    let energies = match &config.model.orbital_energies {
        Some(e) => {
            if e.len() != occupied {
                return Err(eyre!(
                    "configured {} orbital energies for {} occupied orbitals",
                    e.len(),
                    occupied
                ));
            }
            if e.iter().any(|&eps| eps >= 0.0) {
                return Err(eyre!("orbital energies must be negative for bound states"));
            }
            e.clone()
        }
        None => (0..occupied).map(|i| -1.0 + 0.3 * i as f64 / occupied.max(1) as f64).collect(),
    };

    Ok(ReferenceState {
        mo_bra: orbitals.clone(),
        mo_ket: orbitals,
        orbital_energies: energies,
        nuclear_potential: None,
    })
}
