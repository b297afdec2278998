use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use hivescope::config::{ConfigInput, OutputFormat, ReportMode};
use hivescope::plotting::ChartPlotter;
use hivescope::report::Orchestrator;

/// Monthly beehive sensor reports: CO2, weight, temperature and humidity.
#[derive(Debug, Parser)]
#[command(name = "hivescope", version, about)]
struct Cli {
    /// First month of the range (MM/YYYY)
    #[arg(long, env = "BEEHIVE_START_DATE")]
    start_date: Option<String>,

    /// Last month of the range (MM/YYYY)
    #[arg(long, env = "BEEHIVE_END_DATE")]
    end_date: Option<String>,

    /// Year of a single-month report
    #[arg(long, env = "BEEHIVE_YEAR")]
    year: Option<String>,

    /// Month of a single-month report (number or name)
    #[arg(long, env = "BEEHIVE_MONTH")]
    month: Option<String>,

    /// Attributes to analyse, separated by commas or spaces
    #[arg(long, env = "BEEHIVE_ATTRIBUTE", num_args = 1..)]
    attributes: Vec<String>,

    #[arg(long, value_enum, default_value_t = ReportMode::Attribute)]
    mode: ReportMode,

    #[arg(long)]
    co2_file: Option<PathBuf>,

    #[arg(long)]
    weight_file: Option<PathBuf>,

    #[arg(long)]
    temp_file: Option<PathBuf>,

    #[arg(long)]
    humidity_file: Option<PathBuf>,

    /// Folder holding the default hive_<attribute>_<hive>.csv files
    #[arg(long, env = "BEEHIVE_CSV_DIR", default_value = "csv_data")]
    csv_dir: PathBuf,

    #[arg(long, default_value = "hive1")]
    hive_id: String,

    #[arg(long, env = "BEEHIVE_REPORT_DIR", default_value = "monthly_reports")]
    output_dir: PathBuf,

    /// Also copy finished reports here
    #[arg(long)]
    download_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for ConfigInput {
    fn from(cli: Cli) -> Self {
        ConfigInput {
            start_date: cli.start_date,
            end_date: cli.end_date,
            year: cli.year,
            month: cli.month,
            attributes: cli.attributes,
            mode: cli.mode,
            co2_file: cli.co2_file,
            weight_file: cli.weight_file,
            temperature_file: cli.temp_file,
            humidity_file: cli.humidity_file,
            csv_dir: cli.csv_dir,
            hive_id: cli.hive_id,
            output_dir: cli.output_dir,
            download_dir: cli.download_dir,
            format: cli.format,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let today = chrono::Local::now().date_naive();
    let mut orchestrator = Orchestrator::from_input(cli.into(), today, Box::new(ChartPlotter::default()))?;
    tracing::debug!("Writing reports under {:?}", orchestrator.config().output_dir);

    let reports = orchestrator.run()?;
    for report in &reports {
        println!("{}", report.display());
    }
    Ok(())
}
