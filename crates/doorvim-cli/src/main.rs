//! `doorvim` entry point.
//!
//! Without a subcommand the program answers the call vgetty handed it:
//!
//! ```text
//! main()
//!  └─ load_config()
//!  └─ answer
//!       ├─ ControllerBindings::from_env()   -- VOICE_INPUT / VOICE_OUTPUT / VOICE_PID
//!       └─ SessionChannel::with_session()
//!            └─ answer_call()                -- token first, then keypad entry
//! ```
//!
//! The other subcommands manage the capability token and the user directory
//! from an administrator's shell.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Instrument, error, info, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use doorvim_auth::{AuthResult, CapabilityToken, UserDirectory};
use doorvim_cli::config::DoorvimConfig;
use doorvim_cli::{admin, answer_call, load_config};
use doorvim_voice::{ControllerBindings, SessionChannel};

#[derive(Debug, Parser)]
#[command(name = "doorvim", version, about = "Answer the door phone and let the right people in")]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "DOORVIM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Answer the current call (default; run by vgetty)
    Answer,
    /// Let the next caller in without a code
    Authenticate {
        /// Length of the window; defaults to the configured duration
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Withdraw an outstanding authentication
    Revoke,
    /// Show whether an authentication is outstanding
    Status,
    /// Add a user to the directory
    Enroll {
        name: String,
        password: String,
        /// Store the password as given instead of a salted hash
        #[arg(long)]
        plaintext: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref());
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(&level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Commands::Answer) {
        Commands::Answer => match answer(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Call failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Authenticate { seconds } => {
            let seconds = seconds.unwrap_or(config.auth.token_duration_secs);
            report(admin::authenticate(&token(&config), seconds))
        }
        Commands::Revoke => report(admin::revoke(&token(&config))),
        Commands::Status => report(admin::status(&token(&config))),
        Commands::Enroll {
            name,
            password,
            plaintext,
        } => report(admin::enroll(
            &config.auth.users_file,
            &name,
            &password,
            !plaintext,
        )),
    }
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn token(config: &DoorvimConfig) -> CapabilityToken {
    CapabilityToken::new(config.auth.token_file.clone())
}

fn report(result: AuthResult<String>) -> ExitCode {
    match result {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Doorvim Error\n{e}");
            ExitCode::FAILURE
        }
    }
}

fn answer(config: DoorvimConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()
        .context("failed to start runtime")?;

    let span = info_span!("call", call_id = %Uuid::new_v4());
    runtime.block_on(
        async move {
            info!("Answering call");
            let users = UserDirectory::load(&config.auth.users_file)
                .context("failed to load user directory")?;
            let token = token(&config);

            let link = ControllerBindings::from_env()
                .and_then(|bindings| bindings.into_link())
                .context("failed to bind voice controller")?;

            let session_config = config.controller.session_config();
            let outcome = SessionChannel::with_session(link, session_config, async |session| {
                answer_call(session, &config, &token, &users)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await?;

            info!(?outcome, "Call finished");
            anyhow::Ok(())
        }
        .instrument(span),
    )
}
