//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - bootstraps the model store on request
//! - loads emulators and evaluates them
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, EvalArgs, FetchArgs, ModelArgs, PlotArgs};
use crate::data::{StoreConfig, ensure_model_store, install_archive, ModelStore};
use crate::domain::{CosmoParams, Quantity, RunConfig};
use crate::error::AppError;
use crate::math::log_space;

pub mod pipeline;

/// Entry point for the `mgemu` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    crate::logging::init_tracing(cli.verbose)
        .map_err(|e| AppError::new(4, format!("Failed to initialise logging: {e}")))?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Info(args) => handle_info(args, cli.verbose),
        Command::Boost(args) => handle_eval(args, Quantity::NonlinearBoost, cli.verbose),
        Command::Linear(args) => handle_eval(args, Quantity::LinearPowerSpectrum, cli.verbose),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let mut config = StoreConfig::from_env();
    if let Some(root) = args.store {
        config.root = root;
    }

    let store = match &args.archive {
        Some(archive) => {
            let store = ModelStore::new(&config.root);
            install_archive(&store, args.schema, archive)?;
            store
        }
        None => ensure_model_store(&config, args.schema)?,
    };

    println!(
        "Model store ready: {}",
        store.schema_dir(args.schema).display()
    );
    Ok(())
}

fn handle_info(args: ModelArgs, verbose: bool) -> Result<(), AppError> {
    let store = ModelStore::new(store_root(args.store.clone()));
    let config = RunConfig {
        family: args.family,
        schema: args.schema,
        store_root: store.root().to_path_buf(),
        verbose,
        quantity: Quantity::NonlinearBoost,
        params: CosmoParams::default(),
        plot: false,
        plot_width: 0,
        plot_height: 0,
        export_csv: None,
        export_json: None,
    };
    let emu = pipeline::load_emulator(&config)?;
    println!("{}", crate::report::format_registry(emu.registry()));
    Ok(())
}

fn handle_eval(args: EvalArgs, quantity: Quantity, verbose: bool) -> Result<(), AppError> {
    let config = run_config_from_args(&args, quantity, verbose)?;
    let run = pipeline::run_eval(&config)?;

    println!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_table(&run));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.result.k,
            &rows(&run),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_results_csv(path, &run)?;
        info!(path = %path.display(), "wrote CSV export");
    }
    if let Some(path) = &config.export_json {
        crate::io::result::write_result_json(path, &run)?;
        info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::result::read_result_json(&args.result)?;
    let plot = crate::plot::render_ascii_plot(&file.k, &file.values, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn rows(run: &pipeline::RunOutput) -> Vec<Vec<f64>> {
    (0..run.result.zbins()).map(|i| run.result.row(i)).collect()
}

fn store_root(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| StoreConfig::from_env().root)
}

pub fn run_config_from_args(args: &EvalArgs, quantity: Quantity, verbose: bool) -> Result<RunConfig, AppError> {
    let mut params = CosmoParams {
        omega_m: args.omega_m.clone(),
        omega_b: args.omega_b.clone(),
        h0: args.h0.clone(),
        ns: args.ns.clone(),
        omega_nu: args.omega_nu.clone(),
        a_s: args.a_s.clone(),
        f_r0: args.f_r0.clone(),
        omegarc: args.omegarc.clone(),
        gamma: args.gamma.clone(),
        q1: args.q1.clone(),
        mu0: args.mu0.clone(),
        sigma0: args.sigma0.clone(),
        z: Some(args.z.clone()),
        k: args.k.clone(),
        ..CosmoParams::default()
    };

    for raw in &args.extra {
        let (name, values) = parse_param(raw)?;
        params.set(&name, values);
    }

    if let Some(spec) = &args.k_log {
        let (min, max, n) = parse_k_log(spec)?;
        params.k = Some(log_space(min, max, n)?);
    }

    Ok(RunConfig {
        family: args.model.family,
        schema: args.model.schema,
        store_root: store_root(args.model.store.clone()),
        verbose,
        quantity,
        params,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}

/// Parse `NAME=V1,V2,...`.
fn parse_param(raw: &str) -> Result<(String, Vec<f64>), AppError> {
    let (name, values) = raw
        .split_once('=')
        .ok_or_else(|| AppError::new(2, format!("Invalid --param '{raw}': expected NAME=VALUES.")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::new(2, format!("Invalid --param '{raw}': empty name.")));
    }
    let values = parse_list(values)
        .map_err(|e| AppError::new(2, format!("Invalid --param '{raw}': {e}")))?;
    Ok((name.to_string(), values))
}

/// Parse `MIN,MAX,N`.
fn parse_k_log(raw: &str) -> Result<(f64, f64, usize), AppError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [min, max, n] = parts.as_slice() else {
        return Err(AppError::new(2, format!("Invalid --k-log '{raw}': expected MIN,MAX,N.")));
    };
    let bad = |e: String| AppError::new(2, format!("Invalid --k-log '{raw}': {e}"));
    Ok((
        min.parse::<f64>().map_err(|e| bad(e.to_string()))?,
        max.parse::<f64>().map_err(|e| bad(e.to_string()))?,
        n.parse::<usize>().map_err(|e| bad(e.to_string()))?,
    ))
}

fn parse_list(raw: &str) -> Result<Vec<f64>, String> {
    let values: Result<Vec<f64>, _> = raw.split(',').map(|v| v.trim().parse::<f64>()).collect();
    match values {
        Ok(v) if !v.is_empty() => Ok(v),
        Ok(_) => Err("no values".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
