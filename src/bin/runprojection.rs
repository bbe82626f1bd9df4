//! Driver: project a random matrix onto the row-max ball at several radii.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin runprojection -- 200 50
//! cargo run --release --bin runprojection -- 8 6 --solver bisection --fractions 0.1,0.5
//! ```

use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rowmax_sparsify::{project_with_config, weighted_row_max_norm, ProjectionConfig, Solver};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Matrices up to this many entries are printed.
const PRINT_LIMIT: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "runprojection")]
#[command(about = "Project a random matrix onto the weighted L1,inf ball at several radii")]
struct Args {
    /// Number of rows.
    nrows: usize,

    /// Number of columns.
    ncols: usize,

    /// Seed for the random matrix.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Lambda search strategy (exact or bisection).
    #[arg(long, default_value = "exact")]
    solver: Solver,

    /// Radii as fractions of the unconstrained norm.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]
    )]
    fractions: Vec<f64>,

    /// Print matrices regardless of their size.
    #[arg(long)]
    print: bool,
}

fn print_matrix(m: &Array2<f64>) {
    for row in m.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:9.6}", v)).collect();
        println!("{}", line.join(" "));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    ensure!(
        args.fractions.iter().all(|f| f.is_finite() && *f >= 0.0),
        "fractions must be finite and non-negative: {:?}",
        args.fractions
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let a = Array2::random_using((args.nrows, args.ncols), Uniform::new(0.0, 1.0), &mut rng);
    let w = Array1::<f64>::ones(args.nrows);
    let config = ProjectionConfig::new(args.solver);
    debug!(?config, seed = args.seed, "generated input matrix");

    let print = args.print || args.nrows * args.ncols <= PRINT_LIMIT;

    let norm = weighted_row_max_norm(&a.view(), &w.view()).context("norm of input matrix")?;
    println!("Input Matrix A: norm={:.6}", norm);
    if print {
        print_matrix(&a);
        println!();
    }

    for &f in &args.fractions {
        info!(fraction = f, radius = f * norm, "projecting");
        let start = Instant::now();
        let b = project_with_config(&a.view(), f * norm, &w.view(), &config)
            .with_context(|| format!("projection at fraction {}", f))?;
        let elapsed = start.elapsed();

        let pnorm = weighted_row_max_norm(&b.view(), &w.view())?;
        println!(
            "Projected Matrix B: factor={:.6}  norm={:.6}  time = {:.6}",
            f,
            pnorm,
            elapsed.as_secs_f64()
        );
        if print {
            print_matrix(&b);
            println!();
        }
    }

    Ok(())
}
