use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use insight_dashboards::advice::{advise, AssetCatalog};
use insight_dashboards::aggregate::{self, round_to};
use insight_dashboards::config::{Config, DEFAULT_CONFIG_FILE};
use insight_dashboards::dataset::DataContext;
use insight_dashboards::models::{InputRanges, PredictionInput};
use insight_dashboards::report::{self, PredictionReport, SalesReport};
use insight_dashboards::sales::{self, SalesFilter};
use insight_dashboards::scoring;

#[derive(Parser)]
#[command(name = "insight-dashboards")]
#[command(about = "Student performance analytics, score prediction and sales dashboards", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Student dataset CSV (overrides the config)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Directory holding the advice images (overrides the config)
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the dataset: record count and majors
    Overview,
    /// Per-major analytics plus a deep dive on one major
    Analyze {
        /// Major to analyze in depth
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Predict a final score and show tiered advice
    Predict {
        #[arg(long)]
        midterm: Option<f64>,
        #[arg(long)]
        attendance: Option<f64>,
        #[arg(long)]
        study_hours: Option<f64>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long, default_value = "男")]
        gender: String,
        #[arg(long, default_value = "20230001")]
        student_id: String,
    },
    /// Supermarket sales metrics over a sample or a CSV file
    Sales {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long = "city")]
        cities: Vec<String>,
        #[arg(long = "customer-type")]
        customer_types: Vec<String>,
        #[arg(long = "gender")]
        genders: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing() {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        );

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn emit(text: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn render<T: serde::Serialize>(
    format: Format,
    value: &T,
    markdown: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        Format::Markdown => Ok(markdown(value)),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn load_context(config: &Config) -> anyhow::Result<DataContext> {
    DataContext::load(&config.dataset.path, config.columns.clone())
        .context("student dataset could not be loaded; nothing was rendered")
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(data) = cli.data {
        config.dataset.path = data;
    }
    if let Some(assets) = cli.assets {
        config.assets.dir = assets;
    }

    match cli.command {
        Commands::Overview => {
            let context = load_context(&config)?;
            let catalog = AssetCatalog::from_config(&config.assets);
            let overview = report::overview(&context, &catalog);
            emit(&render(cli.format, &overview, report::render_overview)?, None)?;
        }
        Commands::Analyze { major, out } => {
            let context = load_context(&config)?;
            let majors = context.dataset().majors();
            let target = major.or_else(|| {
                majors
                    .iter()
                    .find(|m| **m == config.dataset.default_major)
                    .or_else(|| majors.first())
                    .cloned()
            });

            let analytics = report::analyze(&context, target.as_deref());
            let text = render(cli.format, &analytics, report::render_analytics)?;
            emit(&text, out.as_deref())?;
        }
        Commands::Predict {
            midterm,
            attendance,
            study_hours,
            major,
            gender,
            student_id,
        } => {
            let context = load_context(&config)?;
            let records = context.dataset().records();
            let ranges = aggregate::input_ranges(context.dataset());

            let default_of = |pick: fn(&InputRanges) -> f64| {
                ranges.as_ref().map(pick).unwrap_or_default()
            };
            let input = PredictionInput {
                student_id,
                major: major
                    .or_else(|| context.dataset().majors().into_iter().next())
                    .unwrap_or_default(),
                gender,
                midterm_score: midterm.unwrap_or_else(|| default_of(|r| r.midterm.mean.trunc())),
                attendance_rate: attendance
                    .unwrap_or_else(|| default_of(|r| round_to(r.attendance.mean, 2))),
                weekly_study_hours: study_hours
                    .unwrap_or_else(|| default_of(|r| r.study_hours.mean.trunc())),
            };

            let out_of_range = ranges
                .map(|ranges| ranges.check(&input))
                .unwrap_or_default();
            for issue in &out_of_range {
                warn!(
                    field = issue.field,
                    value = issue.value,
                    min = issue.min,
                    max = issue.max,
                    "Input outside observed range"
                );
            }

            let result = scoring::predict(&input);
            info!(
                student_id = %input.student_id,
                score = result.predicted_score,
                tier = ?result.tier,
                "Prediction"
            );

            let catalog = AssetCatalog::from_config(&config.assets);
            let prediction = PredictionReport {
                reference: aggregate::major_reference(records, &input.major),
                advice: advise(result.tier, &catalog),
                input,
                result,
                out_of_range,
            };
            emit(
                &render(cli.format, &prediction, report::render_prediction)?,
                None,
            )?;
        }
        Commands::Sales {
            csv,
            seed,
            rows,
            cities,
            customer_types,
            genders,
            out,
        } => {
            let data = match csv {
                Some(path) => sales::load_sales(&path)?,
                None => sales::generate_sample(
                    seed.unwrap_or(config.sales.seed),
                    rows.unwrap_or(config.sales.rows),
                ),
            };

            let mut filter = SalesFilter::with_defaults(&data, &config.sales.default_cities);
            if !cities.is_empty() {
                filter.cities = cities;
            }
            if !customer_types.is_empty() {
                filter.customer_types = customer_types;
            }
            if !genders.is_empty() {
                filter.genders = genders;
            }

            let selected = filter.apply(&data);
            info!(total = data.len(), selected = selected.len(), "Filtered sales");
            let sales_report = SalesReport {
                summary: sales::summarize(&selected),
                by_hour: sales::sales_by_hour(&selected),
                by_product: sales::sales_by_product(&selected),
                filter,
            };
            let text = render(cli.format, &sales_report, report::render_sales)?;
            emit(&text, out.as_deref())?;
        }
    }

    Ok(())
}
