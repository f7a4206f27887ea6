use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rostercam::{
    CaptureOutcome, CheckInPhase, CheckInSimulation, FormField, RosterConfig, RosterError,
    ScreenController, StudentStatus, SubmitOutcome,
};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "rostercam")]
#[command(about = "Student roster registration and face check-in simulator")]
#[command(version)]
#[command(long_about = "A headless roster controller for kindergarten student registration \
with face photo capture, backed by in-memory mock services. Includes a scripted registration \
demo and a simulated kiosk check-in cycle.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "rostercam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through list, registration, edit and delete against the mock services
    Demo {
        /// Print each screen as a JSON object instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the kiosk check-in simulation
    Checkin {
        /// Stop after this many result screens
        #[arg(long, default_value_t = 3)]
        cycles: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting rostercam v{}", env!("CARGO_PKG_VERSION"));

    let config = match RosterConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    match args.command.unwrap_or(Command::Demo { json: false }) {
        Command::Demo { json } => run_demo(config, json).await,
        Command::Checkin { cycles } => run_checkin(config, cycles).await,
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rostercam={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    let rendered = toml::to_string_pretty(&RosterConfig::default())
        .context("Failed to serialize default configuration")?;

    println!("# Rostercam Configuration File");
    println!("# Every key can be overridden with ROSTERCAM_<SECTION>__<KEY>");
    println!();
    println!("{}", rendered);
    Ok(())
}

fn show(controller: &ScreenController, json: bool) -> Result<()> {
    let screen = controller.render();
    let notification = controller.notifications().last();

    if json {
        let value = serde_json::json!({
            "screen": screen,
            "notification": notification.map(|n| serde_json::json!({
                "kind": n.kind.label(),
                "message": n.message,
            })),
        });
        println!("{}", serde_json::to_string(&value).context("Failed to encode screen")?);
        return Ok(());
    }

    println!("{}", screen);
    if let Some(notification) = notification {
        println!("  >> {}", notification);
    }
    println!();
    Ok(())
}

fn saved_id(outcome: SubmitOutcome) -> Result<String> {
    match outcome {
        SubmitOutcome::Saved { student_id } => Ok(student_id),
        SubmitOutcome::Invalid(errors) => Err(RosterError::Validation(errors).into()),
        SubmitOutcome::Ignored => Err(RosterError::busy("submit").into()),
    }
}

async fn run_demo(config: RosterConfig, json: bool) -> Result<()> {
    let max_attempts = config.registration.max_captures * 4;
    let min_captures = config.registration.min_captures;
    let controller = ScreenController::builder()
        .config(config)
        .build()
        .context("Failed to build screen controller")?;

    controller.init().await?;
    show(&controller, json)?;

    controller.set_search("na")?;
    show(&controller, json)?;
    controller.set_search("")?;

    // Register a new student
    controller.open_new_registration().await?;
    controller.set_field(FormField::FirstName, "Suda")?;
    controller.set_field(FormField::LastName, "Rakdee")?;
    controller.set_field(FormField::ClassId, "class-1b")?;
    controller.set_field(FormField::ParentName, "Malee Rakdee")?;
    controller.set_field(FormField::ParentPhone, "0899999999")?;
    controller.start_camera().await?;

    let mut accepted = 0;
    for _ in 0..max_attempts {
        if accepted >= min_captures {
            break;
        }
        match controller.capture().await? {
            CaptureOutcome::Captured { count } => accepted = count,
            CaptureOutcome::Rejected { reason } => info!("Retrying after rejection: {}", reason),
            other => {
                warn!("Capture stopped: {:?}", other);
                break;
            }
        }
    }
    show(&controller, json)?;

    let student_id = saved_id(controller.submit().await?)?;
    show(&controller, json)?;

    // Edit the new record without replacing its photos
    controller.open_student(&student_id).await?;
    show(&controller, json)?;
    controller.edit_selected().await?;
    controller.set_field(FormField::ParentPhone, "0811112222")?;
    saved_id(controller.submit().await?)?;
    show(&controller, json)?;

    // Soft delete and look at the deleted roster
    controller.open_student(&student_id).await?;
    controller.request_delete()?;
    show(&controller, json)?;
    controller.confirm_delete().await?;
    controller.set_status_filter(StudentStatus::Deleted)?;
    show(&controller, json)?;

    info!("Demo finished");
    Ok(())
}

async fn run_checkin(config: RosterConfig, cycles: u64) -> Result<()> {
    let handle = CheckInSimulation::new(&config.checkin).start();
    let mut updates = handle.subscribe();

    println!("{}", handle.state().phase.message());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping check-in simulation");
                break;
            }
        }

        let state = updates.borrow_and_update().clone();
        match (state.phase, &state.last_student) {
            (CheckInPhase::Success, Some(student)) => println!(
                "{}: {} ({}) in {} ms",
                state.phase.message(),
                student.name,
                student.class_name,
                state.processing_ms.unwrap_or_default()
            ),
            _ => println!("{}", state.phase.message()),
        }

        if state.phase.is_result() && state.results_shown >= cycles {
            break;
        }
    }

    let state = handle.shutdown().await?;
    println!(
        "{} results, {} check-ins, {} guardian notifications",
        state.results_shown,
        state.successes,
        state.outbox.len()
    );
    Ok(())
}
