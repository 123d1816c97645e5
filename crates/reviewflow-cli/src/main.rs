use clap::{ArgAction, Parser, Subcommand};
use commands::{business, daemon, review, sweep};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reviewflow")]
#[command(about = "Reviewflow - review moderation windows, auto-publishing, and reminders")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler daemon (periodic sweeps plus exact-time tasks)
    #[command(long_about = "Run the background scheduler: a periodic backstop sweep that auto-publishes overdue reviews and sends due reminders, plus exact-time one-shot tasks for each pending review's deadline and reminder offsets.")]
    Daemon {
        /// Seconds between backstop sweeps (overrides config)
        #[arg(long, value_name = "SECONDS")]
        interval: Option<u64>,

        /// Skip the sweep normally run at startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_sweep: bool,

        /// Write logs to the daily-rotating daemon log file instead of stderr
        #[arg(long, action = ArgAction::SetTrue)]
        log_to_file: bool,
    },
    /// Run a single sweep pass and exit
    #[command(long_about = "Evaluate every pending review once: auto-publish those past their deadline and send any reminders that have come due. Useful from cron or for catching up after downtime.")]
    Sweep,
    /// Submit a review
    Submit {
        /// Business the review is for
        #[arg(long)]
        business: String,

        /// Star rating, 1-5
        #[arg(long)]
        rating: u8,

        /// Review text
        #[arg(long)]
        comment: String,

        /// Reviewer display name
        #[arg(long)]
        name: String,

        /// Reviewer email address
        #[arg(long)]
        email: String,

        /// Product or service being reviewed
        #[arg(long)]
        product: Option<String>,

        /// Review identifier (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Record a business response to a pending review
    Respond {
        /// Review identifier
        #[arg(long)]
        review: String,

        /// Response text
        #[arg(long)]
        text: String,
    },
    /// List stored reviews
    List {
        /// Only reviews for this business
        #[arg(long)]
        business: Option<String>,

        /// Only reviews with this status (pending_moderation, published, responded, auto_published)
        #[arg(long)]
        status: Option<String>,
    },
    /// Manage registered businesses
    Business {
        #[command(subcommand)]
        cmd: BusinessCommands,
    },
}

#[derive(Subcommand)]
enum BusinessCommands {
    /// Register a business so its reviews can be routed
    Add {
        /// Business identifier
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Owner email for alerts and reminders
        #[arg(long)]
        owner_email: String,
    },
    /// Show aggregate stats over a business's public reviews
    Stats {
        /// Business identifier
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Daemon {
            log_to_file: true, ..
        } => Some(review_lifecycle_config::PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Daemon {
            interval,
            no_startup_sweep,
            log_to_file: _,
        } => daemon::run_daemon(interval, no_startup_sweep, &output).await,
        Commands::Sweep => sweep::run_sweep(&output).await,
        Commands::Submit {
            business,
            rating,
            comment,
            name,
            email,
            product,
            id,
        } => review::run_submit(business, rating, comment, name, email, product, id, &output).await,
        Commands::Respond { review, text } => review::run_respond(review, text, &output).await,
        Commands::List { business, status } => review::run_list(business, status, &output).await,
        Commands::Business { cmd } => match cmd {
            BusinessCommands::Add {
                id,
                name,
                owner_email,
            } => business::run_add(id, name, owner_email, &output).await,
            BusinessCommands::Stats { id } => business::run_stats(id, &output).await,
        },
    }
}
