//! InviSignia CLI — mark images with an invisible watermark and verify
//! them against the InviSignia service.
//!
//! Set IVSGN_API_URL (default http://localhost:8000). Session state lives
//! under IVSGN_STATE_DIR (default ~/.invisignia).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use invisignia_api_client::ApiClient;
use invisignia_cli::{format_file_size, init_tracing, mime_for_extension};
use invisignia_core::models::MediaAsset;
use invisignia_core::{ClientConfig, WorkflowError};
use invisignia_processing::SizePolicy;
use invisignia_workflow::{
    decide_access, Access, FileCredentialStore, SessionManager, SubmissionWorkflow, APP_PATH,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ivsgn", about = "InviSignia invisible watermark CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Log in and store the session
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the active session
    Whoami,
    /// Embed an invisible watermark into an image and save the result
    Mark {
        /// Path to the image file
        file: PathBuf,
        /// Purpose text embedded as the watermark payload (max 255 chars)
        #[arg(long, short)]
        purpose: String,
        /// Output path (defaults to the input name with an _ivsgn suffix)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Use the flat 1200 KB budget instead of the size-tiered one
        #[arg(long)]
        fixed_cap: bool,
    },
    /// Check an image for a previously embedded watermark
    Verify {
        /// Path to the image file
        file: PathBuf,
    },
    /// List your previous marks
    History {
        /// Maximum number of entries
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn load_asset(path: &PathBuf) -> Result<MediaAsset> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(MediaAsset::new(
        name,
        mime_for_extension(path),
        bytes::Bytes::from(data),
    ))
}

/// Protected commands fail closed when no session is live.
fn require_session(session: &SessionManager) -> Result<()> {
    if let Access::RedirectTo(_) = decide_access(session.is_logged_in(), APP_PATH) {
        if let Some(notice) = session.take_notice() {
            bail!("{}", notice);
        }
        bail!("Not logged in. Run `ivsgn login <email> <password>` first.");
    }
    Ok(())
}

fn render_error(session: &SessionManager, err: WorkflowError) -> anyhow::Error {
    if let Some(notice) = session.take_notice() {
        eprintln!("{}", notice);
    }
    match err.suggested_action() {
        Some(hint) => anyhow::anyhow!("{}\nHint: {}", err, hint),
        None => anyhow::anyhow!("{}", err),
    }
}

/// Print progress snapshots from the workflow's subscription until the
/// operation terminates.
fn spawn_progress_printer(
    mut rx: tokio::sync::watch::Receiver<invisignia_workflow::WorkflowState>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow().clone();
            if !state.stage.is_empty() {
                eprintln!("[{:>3}%] {}", state.percent, state.stage);
            }
            if state.phase.is_terminal() {
                break;
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ClientConfig::from_env()?;
    let api = ApiClient::new(&config.api_url, Duration::from_secs(config.request_timeout_secs))?;
    let session = Arc::new(SessionManager::new(Box::new(FileCredentialStore::new(
        &config.state_dir,
    )))?);

    let cli = Cli::parse();

    match cli.command {
        Commands::Register { email, password } => {
            let response = api
                .register(&email, &password)
                .await
                .with_context(|| "Registration failed")?;
            print_json(&response)?;
            println!("Registered. Run `ivsgn login {} <password>` to log in.", email);
        }
        Commands::Login { email, password } => {
            let token = api
                .login(&email, &password)
                .await
                .with_context(|| "Login failed")?;
            session.login(&email, &token.access_token)?;
            println!("Logged in as {}", email);
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match session.session() {
            Some(live) => println!("{} (session expires {})", live.identity, live.expires_at),
            None => println!("Not logged in"),
        },
        Commands::Mark {
            file,
            purpose,
            output,
            fixed_cap,
        } => {
            require_session(&session)?;
            let asset = load_asset(&file)?;
            let policy = if fixed_cap {
                SizePolicy::FixedCap
            } else {
                SizePolicy::Tiered
            };
            let mut workflow = SubmissionWorkflow::new(api, session.clone(), policy);
            let printer = spawn_progress_printer(workflow.subscribe());

            let original_size = asset.byte_size();
            let result = workflow.submit_mark(&asset, &purpose).await;
            printer.await.ok();
            let outcome = result.map_err(|e| render_error(&session, e))?;

            let out_path = output.unwrap_or_else(|| PathBuf::from(&outcome.suggested_name));
            std::fs::write(&out_path, &outcome.data)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            println!(
                "Marked {} ({}) -> {} ({})",
                file.display(),
                format_file_size(original_size),
                out_path.display(),
                format_file_size(outcome.data.len()),
            );
        }
        Commands::Verify { file } => {
            require_session(&session)?;
            let asset = load_asset(&file)?;
            let mut workflow = SubmissionWorkflow::new(api, session.clone(), SizePolicy::Tiered);
            let printer = spawn_progress_printer(workflow.subscribe());

            let result = workflow.submit_verify(&asset).await;
            printer.await.ok();
            let record = result.map_err(|e| render_error(&session, e))?;

            println!("Watermark found");
            print_json(&record)?;
        }
        Commands::History { limit } => {
            require_session(&session)?;
            let workflow = SubmissionWorkflow::new(api, session.clone(), SizePolicy::Tiered);
            let entries = workflow
                .history(limit)
                .await
                .map_err(|e| render_error(&session, e))?;
            print_json(&entries)?;
        }
    }

    Ok(())
}
