use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use warikan::cli::{
    handle_classify_command, handle_override_command, handle_process_command,
    handle_ratio_command, handle_settle_command, ClassifyArgs, OverrideCommands, ProcessArgs,
    RatioCommands, SettleArgs, Workspace,
};
use warikan::config::{Settings, WarikanPaths};
use warikan::models::HouseholdId;

#[derive(Parser)]
#[command(
    name = "warikan",
    author = "Kaylee Beyene",
    version,
    about = "Household expense classification and proportional cost sharing",
    long_about = "warikan classifies imported household transactions (shared, advance \
                  payment, personal or excluded) and splits shared spending between \
                  members by the household's monthly burden ratio."
)]
struct Cli {
    /// Base directory for settings, snapshots and results
    #[arg(long, global = true, env = "WARIKAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Household snapshot to read (defaults to data/household.json)
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// Household to process (defaults to the configured household)
    #[arg(long, global = true)]
    household: Option<HouseholdId>,

    /// Log filter, e.g. "debug" or "warikan=trace" (overrides settings)
    #[arg(long, global = true, env = "RUST_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and split transactions, saving results per month
    Process(ProcessArgs),

    /// Show how transactions are classified
    Classify(ClassifyArgs),

    /// Show each member's position for a month
    Settle(SettleArgs),

    /// Burden ratio commands
    #[command(subcommand)]
    Ratio(RatioCommands),

    /// Manual override commands
    #[command(subcommand, name = "override")]
    Override(OverrideCommands),

    /// Write default settings and create directories
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => WarikanPaths::with_base_dir(dir),
        None => WarikanPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    let filter = cli.log.as_deref().unwrap_or(&settings.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let ws = Workspace::new(paths, settings, cli.snapshot, cli.household);

    match cli.command {
        Some(Commands::Process(args)) => handle_process_command(&ws, args)?,
        Some(Commands::Classify(args)) => handle_classify_command(&ws, args)?,
        Some(Commands::Settle(args)) => handle_settle_command(&ws, args)?,
        Some(Commands::Ratio(cmd)) => handle_ratio_command(&ws, cmd)?,
        Some(Commands::Override(cmd)) => handle_override_command(&ws, cmd)?,
        Some(Commands::Init) => {
            println!("Initializing warikan at: {}", ws.paths.base_dir().display());
            ws.settings.save(&ws.paths)?;
            println!("Settings written to: {}", ws.paths.settings_file().display());
            println!(
                "Place a household snapshot at {} or pass --snapshot.",
                ws.paths.snapshot_file().display()
            );
        }
        Some(Commands::Config) => {
            println!("warikan Configuration");
            println!("=====================");
            println!("Base directory:    {}", ws.paths.base_dir().display());
            println!("Settings file:     {}", ws.paths.settings_file().display());
            println!("Snapshot:          {}", ws.snapshot_path.display());
            println!("Results directory: {}", ws.paths.results_dir().display());
            println!();
            println!("Settings:");
            println!("  Household:          {}", ws.household_id);
            println!(
                "  Precedence:         {}",
                ws.settings
                    .classification
                    .precedence
                    .checks()
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" > ")
            );
            println!(
                "  Advance debt basis: {:?}",
                ws.settings.sharing.advance_debt_basis
            );
            println!("  Currency symbol:    {}", ws.settings.currency_symbol);
            println!("  Log level:          {}", ws.settings.log_level);
        }
        None => {
            println!("warikan - household expense sharing");
            println!();
            println!("Run 'warikan --help' for usage information.");
        }
    }

    Ok(())
}
