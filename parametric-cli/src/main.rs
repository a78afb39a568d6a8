mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parametric::config::{Config, LoggingConfig};
use parametric::SortParam;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "parametric")]
#[command(about = "Parametric values - facet and range aggregation over recorded index data")]
#[command(version)]
struct Cli {
    /// Config file, created with defaults if missing
    #[arg(short, long, global = true, env = "PARAMETRIC_CONFIG")]
    config: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format when done
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Categorical values per field
    Values {
        /// JSON fixture with recorded index data
        #[arg(short, long)]
        fixture: PathBuf,

        /// Fields to aggregate (all declared parametric fields if omitted)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Value ordering
        #[arg(long, value_parser = parse_sort_arg)]
        sort: Option<SortParam>,

        /// Maximum values per field (0 = unlimited)
        #[arg(long)]
        max_values: Option<u32>,
    },

    /// Numeric range buckets per field
    Buckets {
        /// JSON fixture with recorded index data
        #[arg(short, long)]
        fixture: PathBuf,

        /// Fields to bucket
        #[arg(long = "field", required = true)]
        fields: Vec<String>,

        /// Number of buckets per field
        #[arg(short, long)]
        buckets: u32,

        /// Lower bound (observed minimum if omitted)
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,

        /// Upper bound (observed maximum if omitted)
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,
    },

    /// Hierarchical values across dependent fields
    Dependent {
        /// JSON fixture with recorded index data
        #[arg(short, long)]
        fixture: PathBuf,

        /// Fields, outermost first
        #[arg(long = "field")]
        fields: Vec<String>,
    },
}

fn parse_sort_arg(s: &str) -> std::result::Result<SortParam, String> {
    SortParam::parse_sort(s).ok_or_else(|| format!("unknown sort '{}'", s))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // Results go to stdout, logs stay on stderr
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };
    init_tracing(&config.logging);

    let metrics = if cli.print_metrics {
        Some(metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?)
    } else {
        None
    };

    match cli.command {
        Commands::Values {
            fixture,
            fields,
            sort,
            max_values,
        } => {
            tracing::info!("Aggregating values from {:?}", fixture);
            let engine = commands::load_engine(&fixture, &config)?;
            commands::run_values(&engine, fields, sort, max_values).await?;
        }
        Commands::Buckets {
            fixture,
            fields,
            buckets,
            min,
            max,
        } => {
            tracing::info!("Bucketing {} fields from {:?}", fields.len(), fixture);
            let engine = commands::load_engine(&fixture, &config)?;
            commands::run_buckets(&engine, fields, buckets, min, max).await?;
        }
        Commands::Dependent { fixture, fields } => {
            tracing::info!("Building dependent values from {:?}", fixture);
            let engine = commands::load_engine(&fixture, &config)?;
            commands::run_dependent(&engine, fields).await?;
        }
    }

    if let Some(handle) = metrics {
        eprintln!("{}", handle.render());
    }

    Ok(())
}
