//! Command-line parsing for the emulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the emulator/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ModelFamily, SchemaVersion};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "mgemu",
    version,
    about = "Nonlinear matter power-spectrum boost emulators for modified gravity and dark energy"
)]
pub struct Cli {
    /// Log progress (model loading, downloads). `RUST_LOG` overrides this.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download and unpack the emulator networks for a schema (no-op if present).
    Fetch(FetchArgs),
    /// Show the parameters and k range an emulator needs.
    Info(ModelArgs),
    /// Compute the nonlinear power-spectrum boost.
    Boost(EvalArgs),
    /// Compute the μ-Σ-DE linear power spectrum.
    Linear(EvalArgs),
    /// Plot a previously exported result JSON.
    Plot(PlotArgs),
}

/// Where the networks live and which ones to load.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Model family.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelFamily::Fr)]
    pub family: ModelFamily,

    /// Emulator schema generation.
    #[arg(long, value_enum, default_value_t = SchemaVersion::V2)]
    pub schema: SchemaVersion,

    /// Model store root (defaults to $MGEMU_MODEL_DIR, then ./mgemu_data).
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Emulator schema generation.
    #[arg(long, value_enum, default_value_t = SchemaVersion::V2)]
    pub schema: SchemaVersion,

    /// Model store root (defaults to $MGEMU_MODEL_DIR, then ./mgemu_data).
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Install from a local zip instead of downloading.
    #[arg(long, value_name = "ZIP")]
    pub archive: Option<PathBuf>,
}

/// Cosmology, redshifts and output options for an evaluation.
///
/// Every parameter takes one value per redshift bin (comma-separated), or a
/// single value applied to all bins.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Total matter density Ω_m.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub omega_m: Option<Vec<f64>>,

    /// Baryon density Ω_b.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub omega_b: Option<Vec<f64>>,

    /// Hubble constant H0 (km/s/Mpc).
    #[arg(long = "h0", value_delimiter = ',', allow_negative_numbers = true)]
    pub h0: Option<Vec<f64>>,

    /// Scalar spectral index n_s.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub ns: Option<Vec<f64>>,

    /// Massive-neutrino density Ω_ν.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub omega_nu: Option<Vec<f64>>,

    /// Primordial amplitude A_s.
    #[arg(long = "as", value_delimiter = ',', allow_negative_numbers = true)]
    pub a_s: Option<Vec<f64>>,

    /// f(R) amplitude |f_R0|.
    #[arg(long = "fr0", value_delimiter = ',', allow_negative_numbers = true)]
    pub f_r0: Option<Vec<f64>>,

    /// nDGP crossover parameter Ω_rc.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub omegarc: Option<Vec<f64>>,

    /// Growth index γ.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub gamma: Option<Vec<f64>>,

    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub q1: Option<Vec<f64>>,

    /// μ-Σ parameter μ0.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub mu0: Option<Vec<f64>>,

    /// μ-Σ parameter Σ0.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub sigma0: Option<Vec<f64>>,

    /// Any other emulator parameter, as NAME=V1,V2,... (repeatable).
    #[arg(long = "param", value_name = "NAME=VALUES")]
    pub extra: Vec<String>,

    /// Redshift bins.
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub z: Vec<f64>,

    /// Output wavenumbers in h/Mpc (default: the emulator's own grid).
    #[arg(short, long, value_delimiter = ',', conflicts_with = "k_log")]
    pub k: Option<Vec<f64>>,

    /// Log-spaced output wavenumbers as MIN,MAX,N.
    #[arg(long, value_name = "MIN,MAX,N")]
    pub k_log: Option<String>,

    /// Render an ASCII plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the result to CSV (z,k,value).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the result to JSON (replottable with `mgemu plot`).
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved result.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Result JSON produced by `mgemu boost --export-json`.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boost_command() {
        let cli = Cli::try_parse_from([
            "mgemu", "boost", "--family", "dgp", "--omega-m", "0.3", "--omegarc", "0.1,0.2",
            "-z", "0,1", "--param", "w0=-0.9", "--k-log", "0.01,1,10", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Boost(args) = cli.command else {
            panic!("expected boost");
        };
        assert_eq!(args.model.family, ModelFamily::Dgp);
        assert_eq!(args.model.schema, SchemaVersion::V2);
        assert_eq!(args.omega_m, Some(vec![0.3]));
        assert_eq!(args.omegarc, Some(vec![0.1, 0.2]));
        assert_eq!(args.z, vec![0.0, 1.0]);
        assert_eq!(args.extra, vec!["w0=-0.9".to_string()]);
        assert_eq!(args.k_log.as_deref(), Some("0.01,1,10"));
    }

    #[test]
    fn k_and_k_log_conflict() {
        let res = Cli::try_parse_from([
            "mgemu", "boost", "-z", "0", "-k", "0.1", "--k-log", "0.01,1,10",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn musigma_family_name() {
        let cli = Cli::try_parse_from(["mgemu", "info", "--family", "musigma-de"]).unwrap();
        let Command::Info(args) = cli.command else {
            panic!("expected info");
        };
        assert_eq!(args.family, ModelFamily::MuSigmaDe);
    }
}
