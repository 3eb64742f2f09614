//! Command-line argument parsing for coupled-cluster calculations

use clap::Parser;

/// CC2 ground-state calculation with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "cc2.yaml")]
    pub config_file: String,

    /// Override output file (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override energy convergence threshold
    #[arg(long)]
    pub econv: Option<f64>,

    /// Override amplitude convergence threshold
    #[arg(long)]
    pub dconv: Option<f64>,

    /// Override maximum macro iterations
    #[arg(long)]
    pub max_macro_iterations: Option<usize>,

    /// Override number of frozen occupied orbitals
    #[arg(long)]
    pub freeze: Option<usize>,
}
