/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-balance.
 *
 * setup-balance is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-balance is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-balance. If not, see <https://www.gnu.org/licenses/>.
 */


mod data;
mod error;
mod report;
mod settings;

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info, warn, Level};
use chassis::advisor::advise;
use chassis::compare::{compare, rank_candidates};
use chassis::model::{BalanceModel, CalculationInputs, Tier};
use chassis::rates::{arb_sizing, freq_to_spring, spring_to_freq, ArbSizingRequest, SpringTable};
use chassis::reference::ReferenceData;
use chassis::setup::{Axle, CornerWeights, WeightDistribution};
use chassis::tyre::{estimate_tyre_spring_rate, TyreSize};
use crate::data::{load_inputs, load_inputs_in_dir, InputFile};
use utils::units::psi_to_bar;
use crate::error::{AppError, Result};
use crate::report::TyreRateReport;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "setup-balance", version, about = "Predicts understeer/oversteer balance from a suspension setup")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TierArg {
    Basic,
    TyreAware,
    #[default]
    Complete
}

impl From<TierArg> for Tier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Basic => Tier::Basic,
            TierArg::TyreAware => Tier::TyreAware,
            TierArg::Complete => Tier::Complete
        }
    }
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    /// Setup file (TOML)
    #[arg(required_unless_present = "preset")]
    input: Option<PathBuf>,
    /// Start from a built-in or user preset instead of a file
    #[arg(short, long, conflicts_with = "input")]
    preset: Option<String>,
    #[arg(short, long, value_enum, default_value_t)]
    tier: TierArg,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict the handling balance of a setup
    Predict {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Compare a setup against a baseline. Pass a directory to rank every setup in it
    Compare {
        /// Baseline setup file
        baseline: PathBuf,
        /// Setup file, or directory of setup files
        current: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        tier: TierArg,
    },
    /// Suggest setup changes
    Advise {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Weight distribution from corner weights (kg)
    Weights {
        fl: f64,
        fr: f64,
        rl: f64,
        rr: f64,
    },
    /// Spring rate (N/mm) for a target ride frequency
    SpringRate {
        /// Hz
        #[arg(short, long)]
        frequency: f64,
        /// Sprung mass on the corner (kg)
        #[arg(short, long)]
        corner_mass: f64,
        #[arg(short, long)]
        motion_ratio: f64,
        /// Tyre vertical rate (N/mm)
        #[arg(short, long)]
        tyre_rate: f64,
    },
    /// Ride frequencies for a list of spring rates
    SpringTable {
        #[arg(short, long)]
        corner_mass: f64,
        #[arg(short, long)]
        motion_ratio: f64,
        #[arg(short, long)]
        tyre_rate: f64,
        /// Spring rates (N/mm)
        #[arg(required = true, num_args = 1..)]
        rates: Vec<f64>,
    },
    /// Estimate tyre vertical rate (N/mm) from its size and pressure
    TyreRate {
        /// Section width (mm)
        width: f64,
        /// Aspect ratio (%)
        aspect_ratio: f64,
        /// Rim diameter (in)
        rim_diameter: f64,
        /// bar, or psi with --psi
        #[arg(short, long)]
        pressure: f64,
        #[arg(long)]
        psi: bool,
    },
    /// Size an anti-roll bar for a target roll gradient
    Arb {
        #[arg(long)]
        total_mass: f64,
        /// mm
        #[arg(long)]
        cg_height: f64,
        /// Body roll in deg/g
        #[arg(long)]
        target_gradient: f64,
        #[arg(long)]
        front_weight_pct: f64,
        /// Spring roll stiffness on the front axle (N.mm/deg)
        #[arg(long)]
        spring_roll_front: f64,
        #[arg(long)]
        spring_roll_rear: f64,
        #[arg(long, default_value = "front")]
        axle: String,
    },
    /// List tyre compounds and car presets
    Presets,
}

fn init_logging(level: Level) {
    let log_dir = match data::create_local_data_dir_if_missing() {
        Some(dir) => dir,
        None => match env::current_dir() {
            Ok(current_dir) => current_dir,
            Err(e) => {
                eprintln!("Failed to init logging. Couldn't determine current dir {}", e.to_string());
                return;
            }
        }
    };
    let file_appender = tracing_appender::rolling::never(log_dir, "setup_balance.log");
    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_max_level(level)
        .with_ansi(false)
        .compact()
        .finish();
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(_) => {
            info!("Logging initialised");
        }
        Err(e) => {
            eprintln!("Failed to init logging. {}", e.to_string());
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    match json {
        true => println!("{}", report::to_json(value)?),
        false => println!("{}", text(value))
    }
    Ok(())
}

fn resolve_inputs(args: &InputArgs, reference: &ReferenceData) -> Result<CalculationInputs> {
    match (&args.input, &args.preset) {
        (Some(path), _) => load_inputs(path, reference),
        (None, Some(id)) => InputFile::from_preset(id).resolve(reference),
        (None, None) => Err(AppError::Input("a setup file or --preset is required".to_string()))
    }
}

fn parse_axle(axle: &str) -> Result<Axle> {
    match axle.to_lowercase().as_str() {
        "front" => Ok(Axle::Front),
        "rear" => Ok(Axle::Rear),
        _ => Err(AppError::Input(format!("axle must be front or rear, got {}", axle)))
    }
}

fn compare_paths(model: &BalanceModel, tier: Tier, baseline: &Path, current: &Path, json: bool) -> Result<()> {
    let baseline_inputs = load_inputs(baseline, model.reference())?;
    if current.is_dir() {
        let candidates = load_inputs_in_dir(current, model.reference())?;
        let ranked = rank_candidates(model, tier, &baseline_inputs, &candidates)?;
        return emit(json, &ranked, |ranked| report::ranking(ranked));
    }
    let current_inputs = load_inputs(current, model.reference())?;
    let delta = compare(model, tier, &baseline_inputs, &current_inputs)?;
    emit(json, &delta, report::balance_delta)
}

fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let reference = data::load_reference_data(settings)?;
    let model = BalanceModel::with_config(&reference, settings.model_config())?;
    let json = cli.json;
    match cli.command {
        Commands::Predict { input } => {
            let inputs = resolve_inputs(&input, &reference)?;
            let result = model.calculate(input.tier.into(), &inputs)?;
            emit(json, &result, report::balance_result)
        }
        Commands::Compare { baseline, current, tier } => {
            compare_paths(&model, tier.into(), &baseline, &current, json)
        }
        Commands::Advise { input } => {
            let inputs = resolve_inputs(&input, &reference)?;
            let result = model.calculate(input.tier.into(), &inputs)?;
            let suggestions = advise(&result, &inputs)?;
            emit(json, &suggestions, |s| report::suggestions(s))
        }
        Commands::Weights { fl, fr, rl, rr } => {
            let corners = CornerWeights::new(fl, fr, rl, rr);
            corners.validate()?;
            let distribution = WeightDistribution::from_corners(&corners).rounded(1);
            emit(json, &distribution, report::weight_distribution)
        }
        Commands::SpringRate { frequency, corner_mass, motion_ratio, tyre_rate } => {
            let spring_rate = freq_to_spring(frequency, corner_mass, motion_ratio, tyre_rate)?;
            let check = spring_to_freq(spring_rate, corner_mass, motion_ratio, tyre_rate)?;
            emit(json, &spring_rate, |rate| format!("{:.2} N/mm ({:.3} Hz)", rate, check))
        }
        Commands::SpringTable { corner_mass, motion_ratio, tyre_rate, rates } => {
            let table = SpringTable::new(rates, corner_mass, motion_ratio, tyre_rate)?;
            let rows: Vec<_> = table.iter().collect();
            emit(json, &rows, |_| report::spring_table(&table))
        }
        Commands::TyreRate { width, aspect_ratio, rim_diameter, pressure, psi } => {
            let size = TyreSize::new(width, aspect_ratio, rim_diameter);
            let pressure = if psi { psi_to_bar(pressure) } else { pressure };
            let rate = estimate_tyre_spring_rate(&size, pressure)?;
            emit(json, &TyreRateReport::new(size, pressure, rate), report::tyre_rate)
        }
        Commands::Arb { total_mass, cg_height, target_gradient, front_weight_pct,
                        spring_roll_front, spring_roll_rear, axle } => {
            let request = ArbSizingRequest {
                total_mass,
                cg_height,
                target_roll_gradient: target_gradient,
                front_weight_pct,
                spring_roll_front,
                spring_roll_rear,
                axle: parse_axle(&axle)?
            };
            let sizing = arb_sizing(&request)?;
            emit(json, &sizing, report::arb_sizing)
        }
        Commands::Presets => {
            if json {
                #[derive(Serialize)]
                struct Listing<'a> {
                    compounds: Vec<&'a chassis::reference::CompoundRecord>,
                    presets: Vec<&'a chassis::reference::PresetRecord>
                }
                let listing = Listing {
                    compounds: reference.compounds().collect(),
                    presets: reference.presets().collect()
                };
                return emit(true, &listing, |_| String::new());
            }
            println!("{}", report::reference_data(&reference));
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (settings, load_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e))
    };
    init_logging(settings.log_level());
    if let Some(e) = load_error {
        warn!("Failed to load settings. {}. Writing defaults to {}", e.to_string(), Settings::path().display());
        settings.write().unwrap_or_else(|e| { error!("Failed to write settings. {}", e.to_string()) });
    }
    info!("Settings loaded from {}. Reference lateral acceleration {} g, comparison dead band {}",
          Settings::path().display(), settings.reference_lateral_g(), settings.unchanged_dead_band());

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e.to_string());
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
