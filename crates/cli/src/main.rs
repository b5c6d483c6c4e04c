//! geokrig CLI - variogram analysis and kriging of scattered samples

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use geokrig_algorithms::interpolation::{krige, krige_grid, KrigingMethod, KrigingParams, QueryGrid};
use geokrig_algorithms::statistics::morans_i;
use geokrig_algorithms::variogram::{
    directional_curve, empirical_curve, fit_model, Direction, EmpiricalCurve, FitParams,
    FittedModel, Statistic, VariogramModel,
};
use geokrig_core::{points_from_rows, population_variance, SamplePoint};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geokrig")]
#[command(author, version, about = "Variogram analysis and kriging of scattered 2-D samples", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the empirical semivariogram (or covariogram) of the samples
    Variogram {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        lags: LagArgs,
        /// Compute covariance instead of semivariance
        #[arg(long)]
        covariance: bool,
        /// Direction of the pairs in compass degrees (0=North, clockwise)
        #[arg(long)]
        angle: Option<f64>,
        /// Half-width of the direction sector in degrees
        #[arg(long, default_value = "22.5")]
        angle_tol: f64,
    },
    /// Fit the range of a variogram model to the samples
    Fit {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        lags: LagArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Krige query points or a regular grid
    Krige {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        lags: LagArgs,
        #[command(flatten)]
        model: ModelArgs,
        /// Use this range instead of fitting one
        #[arg(long)]
        range: Option<f64>,
        /// Query points as "x,y;x,y;..."
        #[arg(long, conflicts_with = "grid")]
        at: Option<String>,
        /// Regular grid as "xmin,xmax,nx,ymin,ymax,ny"
        #[arg(long)]
        grid: Option<String>,
        /// Kriging method: simple, ordinary
        #[arg(short, long, default_value = "simple")]
        method: String,
        /// Nearest samples per estimate (0 = all)
        #[arg(short, long, default_value = "0")]
        neighbors: usize,
        /// Nugget added to the kriging variance
        #[arg(long, default_value = "0.0")]
        nugget: f64,
        /// Report negative variances as-is instead of clamping them to zero
        #[arg(long)]
        no_clamp: bool,
        /// Stop at the first query that fails
        #[arg(long)]
        fail_fast: bool,
    },
    /// Global Moran's I with inverse-distance weights
    Moran {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Sample points as "x,y,value;x,y,value;..."
    #[arg(short, long)]
    points: String,
}

#[derive(Args)]
struct LagArgs {
    /// Lag distances as "h1,h2,..."
    #[arg(short, long, default_value = "")]
    lags: String,
    /// Half-width of each lag window
    #[arg(short, long, default_value = "1.0")]
    tol: f64,
}

#[derive(Args)]
struct ModelArgs {
    /// Model: nugget, linear, spherical, exponential, gaussian, power
    #[arg(long, default_value = "spherical")]
    model: String,
    /// Sill (defaults to the population variance of the values)
    #[arg(long)]
    sill: Option<f64>,
    /// Number of candidate ranges searched
    #[arg(long, default_value = "1000")]
    mesh: usize,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a global tracing subscriber is already installed");
    }
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn parse_numbers(text: &str, what: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid number '{}' in {}", s, what))
        })
        .collect()
}

fn parse_points(text: &str) -> Result<Vec<SamplePoint>> {
    let rows = text
        .split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|row| parse_numbers(row, "points"))
        .collect::<Result<Vec<_>>>()?;
    if rows.is_empty() {
        anyhow::bail!("No sample points given");
    }
    points_from_rows(&rows).context("Invalid sample points, each needs finite x,y,value")
}

fn parse_queries(text: &str) -> Result<Vec<(f64, f64)>> {
    text.split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|row| match parse_numbers(row, "query points")?.as_slice() {
            [x, y] => Ok((*x, *y)),
            _ => anyhow::bail!("Query '{}' must be x,y", row),
        })
        .collect()
}

fn parse_grid(text: &str) -> Result<QueryGrid> {
    let v = parse_numbers(text, "grid")?;
    if v.len() != 6 {
        anyhow::bail!("Grid must be xmin,xmax,nx,ymin,ymax,ny (got {} values)", v.len());
    }
    let count = |c: f64, axis: &str| -> Result<usize> {
        if c < 1.0 || c.fract() != 0.0 {
            anyhow::bail!("Grid {} must be a positive integer, got {}", axis, c);
        }
        Ok(c as usize)
    };
    Ok(QueryGrid {
        x_min: v[0],
        x_max: v[1],
        nx: count(v[2], "nx")?,
        y_min: v[3],
        y_max: v[4],
        ny: count(v[5], "ny")?,
    })
}

fn parse_method(method: &str) -> Result<KrigingMethod> {
    match method.to_lowercase().as_str() {
        "simple" | "sk" => Ok(KrigingMethod::Simple),
        "ordinary" | "ok" => Ok(KrigingMethod::Ordinary),
        _ => anyhow::bail!("Unknown method: {}. Use simple or ordinary.", method),
    }
}

fn sill_of(points: &[SamplePoint], model: &ModelArgs) -> Result<f64> {
    match model.sill {
        Some(s) => Ok(s),
        None => population_variance(points).context("Cannot take the variance of no points"),
    }
}

fn lag_values(lags: &LagArgs) -> Result<Vec<f64>> {
    let values = parse_numbers(&lags.lags, "lags")?;
    if values.is_empty() {
        anyhow::bail!("--lags is required, e.g. --lags 1,2,3,4");
    }
    Ok(values)
}

fn build_curve(points: &[SamplePoint], lags: &LagArgs, statistic: Statistic) -> Result<EmpiricalCurve> {
    empirical_curve(points, &lag_values(lags)?, lags.tol, statistic)
        .context("Failed to build empirical curve")
}

fn fit(points: &[SamplePoint], lags: &LagArgs, model: &ModelArgs) -> Result<FittedModel> {
    let kind: VariogramModel = model.model.parse()?;
    let sill = sill_of(points, model)?;
    let curve = build_curve(points, lags, Statistic::Semivariance)?;
    let params = FitParams {
        mesh_size: model.mesh,
        ..Default::default()
    };
    fit_model(&curve, kind, sill, &params).context("Failed to fit variogram model")
}

fn print_curve(curve: &EmpiricalCurve) {
    let label = match curve.statistic {
        Statistic::Semivariance => "semivariance",
        Statistic::Covariance => "covariance",
    };
    println!("{:>12}  {:>16}  {:>8}", "lag", label, "pairs");
    for ((lag, value), pairs) in curve.lags.iter().zip(&curve.values).zip(&curve.pair_counts) {
        println!("{:>12.4}  {:>16.6}  {:>8}", lag, value, pairs);
    }
}

fn print_model(fitted: &FittedModel) {
    println!("Model: {}", fitted.model);
    println!("  Range: {:.6}", fitted.range);
    println!("  Sill:  {:.6}", fitted.sill);
    println!("  MSE:   {:.6e}", fitted.mse);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Variogram {
            data,
            lags,
            covariance,
            angle,
            angle_tol,
        } => {
            let points = parse_points(&data.points)?;
            let statistic = if covariance {
                Statistic::Covariance
            } else {
                Statistic::Semivariance
            };
            let curve = match angle {
                Some(angle) => {
                    directional_curve(
                        &points,
                        &lag_values(&lags)?,
                        lags.tol,
                        statistic,
                        Direction::new(angle, angle_tol),
                    )
                    .context("Failed to build directional curve")?
                }
                None => build_curve(&points, &lags, statistic)?,
            };
            info!("{} samples, {} non-empty lags", points.len(), curve.len());
            print_curve(&curve);
        }

        Commands::Fit { data, lags, model } => {
            let points = parse_points(&data.points)?;
            let start = Instant::now();
            let fitted = fit(&points, &lags, &model)?;
            print_model(&fitted);
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Krige {
            data,
            lags,
            model,
            range,
            at,
            grid,
            method,
            neighbors,
            nugget,
            no_clamp,
            fail_fast,
        } => {
            let points = parse_points(&data.points)?;
            let fitted = match range {
                Some(range) => {
                    let kind: VariogramModel = model.model.parse()?;
                    FittedModel::new(kind, range, sill_of(&points, &model)?)?
                }
                None => fit(&points, &lags, &model)?,
            };
            info!(
                "Using {} model, range {:.4}, sill {:.4}",
                fitted.model, fitted.range, fitted.sill
            );

            let params = KrigingParams {
                method: parse_method(&method)?,
                neighbors: Some(neighbors),
                nugget,
                clamp_variance: !no_clamp,
                fail_fast,
            };

            let start = Instant::now();
            match (at, grid) {
                (Some(at), _) => {
                    let queries = parse_queries(&at)?;
                    let result = krige(&points, &fitted, &queries, &params)
                        .context("Kriging failed")?;
                    println!("{:>12}  {:>12}  {:>14}  {:>14}", "x", "y", "estimate", "std_dev");
                    for (q, (e, s)) in queries
                        .iter()
                        .zip(result.estimates.iter().zip(&result.std_devs))
                    {
                        println!("{:>12.4}  {:>12.4}  {:>14.6}  {:>14.6}", q.0, q.1, e, s);
                    }
                    for (idx, err) in &result.failures {
                        warn!("Query {} failed: {}", idx, err);
                    }
                }
                (None, Some(grid)) => {
                    let grid = parse_grid(&grid)?;
                    let pb = spinner(&format!("Kriging {}x{} grid...", grid.nx, grid.ny))?;
                    let result = krige_grid(&points, &fitted, &grid, &params)
                        .context("Grid kriging failed")?;
                    pb.finish_and_clear();

                    println!("Estimate ({} rows along y, {} columns along x):", grid.ny, grid.nx);
                    for row in result.estimate.rows() {
                        let line: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
                        println!("  {}", line.join(" "));
                    }
                    println!("Standard deviation:");
                    for row in result.std_dev.rows() {
                        let line: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
                        println!("  {}", line.join(" "));
                    }
                    if !result.failures.is_empty() {
                        warn!("{} grid cells could not be kriged", result.failures.len());
                    }
                }
                (None, None) => anyhow::bail!("Give query points with --at or a grid with --grid"),
            }
            println!("  Processing time: {:.2?}", start.elapsed());
        }

        Commands::Moran { data } => {
            let points = parse_points(&data.points)?;
            let result = morans_i(&points).context("Failed to compute Moran's I")?;
            println!("Moran's I: {:.6}", result.i);
            println!("  Expected: {:.6}", result.expected);
            println!("  Z-score:  {:.4}", result.z_score);
            println!("  P-value:  {:.4e}", result.p_value);
        }
    }

    Ok(())
}
