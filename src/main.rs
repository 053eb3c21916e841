use std::path::PathBuf;

use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shop_scout::context::{CustomerSegment, MarketContext, UserInputs};
use shop_scout::engine::Engine;
use shop_scout::providers::FixtureProvider;
use shop_scout::scoring::{
    validate_config, validate_scenarios, EngineConfig, LocationType, MarketCondition,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a business category at a site (default if a business is given)
    Score {
        /// Business category id (e.g. cafe, milk_tea, pharmacy)
        business: String,
        /// Also evaluate the risk rule catalog
        #[arg(long)]
        rules: bool,
        /// Also print the weight-sensitivity ranking
        #[arg(long)]
        sensitivity: bool,
    },
    /// Evaluate the risk rule catalog for a business
    Rules { business: String },
    /// Project the score under the built-in and custom scenarios
    Scenarios { business: String },
    /// Monte Carlo uncertainty simulation over perturbed area signals
    Simulate {
        business: String,
        /// Number of trials (default from config)
        #[arg(long)]
        runs: Option<usize>,
        /// Base seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rank which factor weight moves the score most
    Sensitivity {
        business: String,
        /// Relative weight adjustment (e.g. 0.2 for +20%)
        #[arg(long)]
        adjustment: Option<f64>,
    },
    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "shop-scout")]
#[command(about = "Location decision scoring for your next shop", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/shop-scout/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Context JSON file with area signals ({"osm": ..., "category_counts": ...})
    #[arg(long, global = true)]
    context: Option<PathBuf>,

    /// Use the built-in demo area instead of a context file
    #[arg(long, global = true)]
    demo: bool,

    /// Target customer segment (student, office, family, tourist, ...)
    #[arg(long, global = true)]
    customer: Option<CustomerSegment>,

    /// Intended price positioning, 1 (budget) to 4 (premium)
    #[arg(long, global = true)]
    price: Option<u8>,

    /// Month (1-12) for the seasonal calendar; defaults to the current month
    #[arg(long, global = true)]
    month: Option<u32>,

    /// Market condition weighting (high_growth, mature_market, declining_market)
    #[arg(long, global = true)]
    market: Option<MarketCondition>,

    /// Location type weighting (city_center, residential, commercial, suburban)
    #[arg(long, global = true)]
    location: Option<LocationType>,

    /// Emit machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Business category to score (shorthand for the score subcommand)
    business: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "shop_scout=debug"
    } else {
        "shop_scout=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match cli.command {
        Some(command) => command,
        None => match cli.business.clone() {
            Some(business) => Commands::Score {
                business,
                rules: false,
                sensitivity: false,
            },
            None => {
                eprintln!("No business given. Try: shop-scout score cafe --demo");
                std::process::exit(EXIT_CONFIG);
            }
        },
    };

    // Init never needs config or context.
    if let Commands::Init { force } = command {
        match shop_scout::config::write_starter_config(cli.config.clone().map(PathBuf::from), force)
        {
            Ok(path) => {
                println!("Wrote starter config to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let app_config = match shop_scout::config::load_config(cli.config.clone().map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Engine tables plus the file-level overrides, validated before anything runs.
    let mut engine_config = EngineConfig::default();
    engine_config.simulation = app_config.simulation;
    if let Some(adjustment) = app_config.sensitivity_adjustment {
        engine_config.sensitivity_adjustment = adjustment;
    }

    let mut config_errors = Vec::new();
    if let Err(errors) = validate_config(&engine_config) {
        config_errors.extend(errors);
    }
    if let Err(errors) = validate_scenarios(&app_config.custom_scenarios) {
        config_errors.extend(errors);
    }
    if !config_errors.is_empty() {
        eprintln!("Config errors:");
        for error in &config_errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let engine = Engine::new(engine_config).with_custom_scenarios(app_config.custom_scenarios);

    let inputs = UserInputs {
        customer_target: cli
            .customer
            .unwrap_or(app_config.defaults.customer_target),
        price_level: cli.price.unwrap_or(app_config.defaults.price_level).clamp(1, 4),
    };
    let month = cli
        .month
        .or(app_config.defaults.month)
        .unwrap_or_else(|| chrono::Local::now().month());

    let raw = if cli.demo {
        FixtureProvider.raw_context()
    } else if let Some(path) = &cli.context {
        match shop_scout::providers::load_context_file(path) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Context error: {}", e);
                std::process::exit(EXIT_DATA);
            }
        }
    } else {
        eprintln!("No area data. Pass --context <file.json> or --demo.");
        std::process::exit(EXIT_DATA);
    };

    let ctx = MarketContext::from_raw(raw, inputs.customer_target, month);
    if cli.verbose {
        eprintln!(
            "Context: {} feature tags, {} categories, income {}, rent level {}, seasonal x{:.2}",
            ctx.osm_counts.len(),
            ctx.category_counts.len(),
            ctx.income_level.as_str(),
            ctx.rent_level,
            ctx.seasonal_factor
        );
    }

    let use_colors = shop_scout::output::should_use_colors();

    match command {
        Commands::Score {
            business,
            rules,
            sensitivity,
        } => {
            let result =
                engine.score_business_with(&business, &inputs, &ctx, cli.market, cli.location);

            if cli.verbose {
                let weights = engine.resolve_weights(&business, cli.market, cli.location);
                eprintln!("Weight criticality for {}:", business);
                for (factor, band) in shop_scout::scoring::weight_bands(&weights) {
                    eprintln!(
                        "  {:<24} {:.3}  {}",
                        factor.as_str(),
                        weights.get(&factor).copied().unwrap_or(0.0),
                        band.as_str()
                    );
                }
            }

            if cli.json {
                let mut doc = serde_json::json!({ "business": business, "result": result });
                if rules {
                    let scores = engine.component_scores(&business, &inputs, &ctx);
                    let (rule_results, summary) = engine.evaluate_rules(&business, &ctx, &scores);
                    doc["rules"] = serde_json::json!({
                        "results": rule_results,
                        "summary": summary,
                    });
                }
                if sensitivity {
                    doc["sensitivity"] = serde_json::to_value(engine.analyze_sensitivity(
                        &business, &inputs, &ctx, None,
                    ))
                    .unwrap_or_default();
                }
                println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
            } else {
                print!(
                    "{}",
                    shop_scout::output::format_scoring_result(&business, &result, use_colors)
                );
                if rules {
                    let scores = engine.component_scores(&business, &inputs, &ctx);
                    let (rule_results, summary) = engine.evaluate_rules(&business, &ctx, &scores);
                    println!();
                    print!(
                        "{}",
                        shop_scout::output::format_rule_results(
                            &rule_results,
                            &summary,
                            use_colors
                        )
                    );
                }
                if sensitivity {
                    let report = engine.analyze_sensitivity(&business, &inputs, &ctx, None);
                    println!();
                    print!(
                        "{}",
                        shop_scout::output::format_sensitivity(&report, use_colors)
                    );
                }
            }
        }
        Commands::Rules { business } => {
            let scores = engine.component_scores(&business, &inputs, &ctx);
            let (rule_results, summary) = engine.evaluate_rules(&business, &ctx, &scores);
            if cli.json {
                let doc = serde_json::json!({
                    "business": business,
                    "results": rule_results,
                    "summary": summary,
                });
                println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
            } else {
                print!(
                    "{}",
                    shop_scout::output::format_rule_results(&rule_results, &summary, use_colors)
                );
            }
        }
        Commands::Scenarios { business } => {
            let results = engine.run_scenarios(&business, &inputs, &ctx);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&results).unwrap_or_default()
                );
            } else {
                print!(
                    "{}",
                    shop_scout::output::format_scenario_table(&results, use_colors)
                );
            }
        }
        Commands::Simulate {
            business,
            runs,
            seed,
        } => {
            match engine.simulate_monte_carlo(&business, &inputs, &ctx, runs, seed) {
                Ok(summary) => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&summary).unwrap_or_default()
                        );
                    } else {
                        print!(
                            "{}",
                            shop_scout::output::format_monte_carlo(&summary, use_colors)
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Simulation failed: {}", e);
                    std::process::exit(EXIT_DATA);
                }
            }
        }
        Commands::Sensitivity {
            business,
            adjustment,
        } => {
            let report = engine.analyze_sensitivity(&business, &inputs, &ctx, adjustment);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).unwrap_or_default()
                );
            } else {
                print!(
                    "{}",
                    shop_scout::output::format_sensitivity(&report, use_colors)
                );
            }
        }
        Commands::Init { .. } => unreachable!("handled before config load"),
    }

    std::process::exit(EXIT_SUCCESS);
}
