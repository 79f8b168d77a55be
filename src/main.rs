//! interview-scheduler - command line harness.
//!
//! Runs a coordination session against the console (or a reply script),
//! invokes single tools, and inspects stored sessions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_scheduler::config::Config;
use interview_scheduler::coordination::{CoordinationSession, Coordinator, SessionId};
use interview_scheduler::responder::{ConsoleResponder, Responder, ScriptedResponder, TimeoutResponder};
use interview_scheduler::setup::{read_setup, Directory, InterviewSetup};
use interview_scheduler::store::{create_session_store, StoreType};
use interview_scheduler::tools::{ToolContext, ToolRegistry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "interview-scheduler")]
#[command(about = "Coordinate an interview between interviewer, candidate and HR")]
struct Cli {
    /// Session store backend (memory, file, sqlite)
    #[arg(long, env = "INTERVIEW_STORE")]
    store: Option<String>,

    /// Directory for stored sessions
    #[arg(long, env = "INTERVIEW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the HR contacts of the built-in directory
    List,

    /// Run one coordination session
    Run {
        /// Use the fixed demo setup (default)
        #[arg(long, conflicts_with_all = ["random", "hr", "setup", "interactive"])]
        sample: bool,

        /// Type in the HR, interviewer and candidate contacts and the position
        #[arg(long, conflicts_with_all = ["random", "hr", "setup"])]
        interactive: bool,

        /// Pick HR, interviewer, candidate and position at random
        #[arg(long, conflicts_with_all = ["hr", "setup"])]
        random: bool,

        /// Use the N-th HR contact from `list` (1-based)
        #[arg(long, value_name = "N", conflicts_with = "setup")]
        hr: Option<usize>,

        /// Load the setup from a YAML file
        #[arg(long, value_name = "FILE")]
        setup: Option<PathBuf>,

        /// Answer prompts from a YAML list instead of the console
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,

        /// Seconds to wait for each answer
        #[arg(long, value_name = "SECS", env = "INTERVIEW_RESPONSE_TIMEOUT_SECS")]
        timeout: Option<u64>,
    },

    /// Invoke a single tool with JSON arguments
    Tool {
        /// Tool name (e.g. call_contact)
        name: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// List stored sessions, newest first
    Sessions {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print one stored session as JSON
    Show {
        /// Session id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so prompts on stdout stay readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(store) = &cli.store {
        config.store_type = store.parse::<StoreType>()?;
    }
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    match cli.command {
        Command::List => {
            list_directory();
            Ok(())
        }
        Command::Run {
            sample: _,
            interactive,
            random,
            hr,
            setup,
            script,
            timeout,
        } => {
            if let Some(secs) = timeout {
                config.response_timeout = Some(Duration::from_secs(secs));
            }
            let setup = if interactive {
                let mut input = tokio::io::BufReader::new(tokio::io::stdin());
                read_setup(&mut input, &mut tokio::io::stdout(), &config.setup_defaults()).await?
            } else {
                choose_setup(&config, random, hr, setup)?
            };
            run(&config, setup, script).await
        }
        Command::Tool { name, args } => run_tool(&config, &name, &args).await,
        Command::Sessions { limit } => list_sessions(&config, limit).await,
        Command::Show { id } => show_session(&config, &id).await,
    }
}

fn list_directory() {
    let directory = Directory::builtin();
    println!("\nAvailable HR contacts:");
    println!("{}", "=".repeat(50));
    for (i, hr) in directory.hr_contacts.iter().enumerate() {
        println!("{}. {} ({}) at {}", i + 1, hr.name, hr.title, hr.organization);
        println!("   Email: {} | Phone: {}", hr.email, hr.phone);
        println!();
    }
}

fn choose_setup(
    config: &Config,
    random: bool,
    hr: Option<usize>,
    file: Option<PathBuf>,
) -> Result<InterviewSetup> {
    let directory = Directory::builtin();
    let defaults = config.setup_defaults();
    let mut rng = rand::thread_rng();
    let setup = if let Some(path) = file {
        InterviewSetup::from_yaml_file(&path, &defaults)?
    } else if let Some(index) = hr {
        directory.setup_for_hr(index, &defaults, &mut rng)?
    } else if random {
        directory.random_setup(&mut rng)?
    } else {
        directory.sample_setup()?
    };
    Ok(setup)
}

fn with_timeout(config: &Config, base: Arc<dyn Responder>) -> Arc<dyn Responder> {
    match config.response_timeout {
        Some(limit) => Arc::new(TimeoutResponder::new(base, limit)),
        None => base,
    }
}

async fn run(config: &Config, setup: InterviewSetup, script: Option<PathBuf>) -> Result<()> {
    let base: Arc<dyn Responder> = match &script {
        Some(path) => Arc::new(ScriptedResponder::from_yaml_file(path).await?),
        None => Arc::new(ConsoleResponder::new()),
    };
    let responder = with_timeout(config, base);
    let store = create_session_store(config.store_type, config.data_dir.clone(), &config.operator)
        .await
        .context("Failed to open session store")?;
    info!(store = ?config.store_type, persistent = store.is_persistent(), "session store ready");

    println!("{}", setup.initialization_context());
    println!("{}", "=".repeat(60));

    let session = Coordinator::new(responder)
        .with_store(store)
        .run(setup)
        .await?;
    print_summary(&session);
    Ok(())
}

fn print_summary(session: &CoordinationSession) {
    println!("\n{}", "=".repeat(60));
    println!("Session {}: {}", session.id(), session.final_label());
    if let Some(booking) = session.confirmed_proposal() {
        println!(
            "Booked: {} at {} ({} minutes), confirmation {}",
            booking.date,
            booking.time,
            booking.duration_minutes,
            booking.confirmation_id.as_deref().unwrap_or("-")
        );
    }
    println!("\nAttempts:");
    for result in session.results() {
        println!("  [{}] {} -> {}", result.status, result.summary, result.next_step_hint);
    }
    if !session.setbacks().is_empty() {
        println!("\nSetbacks:");
        for setback in session.setbacks() {
            println!("  - {}", setback);
        }
    }
    for case in session.escalations() {
        println!(
            "\nEscalation ({}): {} [{}]",
            case.situation, case.human_decision, case.status
        );
    }
    println!("\nNotes:\n{}", session.notes().read());
}

async fn run_tool(config: &Config, name: &str, args: &str) -> Result<()> {
    let registry = ToolRegistry::new();
    if !registry.has_tool(name) {
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        anyhow::bail!("Unknown tool '{}'. Available: {}", name, names.join(", "));
    }
    let args: serde_json::Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;
    let ctx = ToolContext::new(with_timeout(config, Arc::new(ConsoleResponder::new())));
    let output = registry.execute(name, args, &ctx).await?;
    println!("{}", output);
    Ok(())
}

async fn list_sessions(config: &Config, limit: usize) -> Result<()> {
    let store = create_session_store(config.store_type, config.data_dir.clone(), &config.operator).await?;
    let sessions = store.list(limit).await?;
    if sessions.is_empty() {
        println!("No stored sessions.");
    }
    for session in sessions {
        println!(
            "{}  {}  {:<28} {} / {}",
            session.id(),
            session.updated_at().format("%Y-%m-%d %H:%M"),
            session.final_label(),
            session.setup().candidate.name,
            session.setup().position
        );
    }
    Ok(())
}

async fn show_session(config: &Config, id: &str) -> Result<()> {
    let id: SessionId = id.parse().context("Invalid session id")?;
    let store = create_session_store(config.store_type, config.data_dir.clone(), &config.operator).await?;
    let session = store
        .get(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Session {} not found", id))?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}
