use clap::{ArgAction, Args, Parser, Subcommand};
use eyre::Result;
use std::io;
use std::path::PathBuf;
use tracing::Level;
use vinsight::{
    Command, Config, Context, ExportFormat, NewRecord, OutputStyle, Presenter, RecordPatch, SearchCriteria, commands,
};

#[derive(Parser)]
#[command(name = "vinsight")]
#[command(about = "VinSight Maintenance Tracker - record, search and export vehicle maintenance")]
#[command(version)]
struct Cli {
    /// Directory containing the store (default: config file, then current directory)
    #[arg(short, long, global = true)]
    store_path: Option<PathBuf>,

    /// Config file (default: ~/.config/vinsight/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a maintenance record
    Add(AddArgs),

    /// List maintenance records sorted by date
    List {
        /// Only records for this car (exact name, any case)
        #[arg(long)]
        car: Option<String>,
    },

    /// Show a single record
    Show {
        #[arg(long)]
        id: u64,
    },

    /// Search/filter maintenance records
    Search(SearchArgs),

    /// Edit a record by ID
    Edit(EditArgs),

    /// Delete a record by ID
    Delete {
        /// Record ID to delete
        #[arg(long)]
        id: u64,
    },

    /// Export records to a file
    Export {
        /// Output file (default: maintenance_export.csv, or .json with --format json)
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Only records for this car (exact name, any case)
        #[arg(long)]
        car: Option<String>,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    car: String,

    /// Odometer reading
    #[arg(long)]
    mileage: u64,

    /// Service type, e.g. "oil change"
    #[arg(long = "type")]
    service_type: String,

    #[arg(long)]
    cost: Option<f64>,

    #[arg(long)]
    notes: Option<String>,

    /// Date in YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args)]
struct SearchArgs {
    /// Car name contains
    #[arg(long)]
    car: Option<String>,

    /// Service type contains
    #[arg(long = "type")]
    service_type: Option<String>,

    #[arg(long)]
    min_mileage: Option<u64>,

    #[arg(long)]
    max_mileage: Option<u64>,

    /// Only records after this date (YYYY-MM-DD)
    #[arg(long)]
    after: Option<String>,

    /// Only records before this date (YYYY-MM-DD)
    #[arg(long)]
    before: Option<String>,

    /// Notes contain this text
    #[arg(long)]
    notes_contains: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    /// Record ID to edit
    #[arg(long)]
    id: u64,

    #[arg(long)]
    car: Option<String>,

    #[arg(long)]
    mileage: Option<u64>,

    #[arg(long = "type")]
    service_type: Option<String>,

    #[arg(long)]
    cost: Option<f64>,

    /// New date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Add(a) => Command::Add(NewRecord {
                car: a.car,
                date: a.date,
                mileage: Some(a.mileage),
                service_type: a.service_type,
                cost: a.cost,
                notes: a.notes,
            }),
            Commands::List { car } => Command::List { car },
            Commands::Show { id } => Command::Show { id },
            Commands::Search(s) => Command::Search(SearchCriteria {
                car: s.car,
                service_type: s.service_type,
                min_mileage: s.min_mileage,
                max_mileage: s.max_mileage,
                after: s.after,
                before: s.before,
                notes_contains: s.notes_contains,
            }),
            Commands::Edit(e) => Command::Edit {
                id: e.id,
                patch: RecordPatch {
                    car: e.car,
                    date: e.date,
                    mileage: e.mileage,
                    service_type: e.service_type,
                    cost: e.cost,
                    notes: e.notes,
                },
            },
            Commands::Delete { id } => Command::Delete { id },
            Commands::Export { file, format, car } => Command::Export { file, format, car },
        }
    }
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured.and_then(|l| l.parse::<Level>().ok()).unwrap_or(Level::WARN),
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    init_tracing(cli.verbose, config.log_level.as_deref());

    if !config.color {
        colored::control::set_override(false);
    }

    let ctx = Context {
        store_path: cli.store_path.unwrap_or(config.store_path),
        export_file: config.export_file,
        presenter: Presenter::new(config.currency, config.distance_unit),
    };

    commands::run(cli.command.into(), &ctx, &mut io::stdout().lock())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Failures are reported as text; the exit status stays zero
    if let Err(e) = run(cli) {
        println!("{}", OutputStyle::error(&format!("Error: {:#}", e)));
    }

    Ok(())
}
