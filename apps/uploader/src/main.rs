use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    CancelOutcome, StagedFile, UploadSessionController, UploadState, VideoMetadataForm,
};
use shared::domain::SessionId;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "uploader", about = "Upload a video to a hosting session and follow its processing")]
struct Cli {
    /// Service base URL, e.g. http://localhost:9000/youtube
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    csrf_token: Option<String>,
    /// Print controller events as JSON lines.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage a file, send it, then follow remote processing.
    Upload {
        #[arg(long)]
        session: String,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
    /// Resynchronize with an upload already in flight and follow it.
    Status {
        #[arg(long)]
        session: String,
    },
    /// Cancel remote processing for a session.
    Cancel {
        #[arg(long)]
        session: String,
    },
    /// Update the video's title, description, tags, category or status.
    Update {
        #[arg(long)]
        session: String,
        #[command(flatten)]
        metadata: MetadataArgs,
    },
}

#[derive(Args, Debug)]
struct MetadataArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    tags: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "private")]
    status: String,
}

impl From<MetadataArgs> for VideoMetadataForm {
    fn from(args: MetadataArgs) -> Self {
        Self {
            title: args.title,
            description: args.description,
            tags: args.tags,
            category: args.category,
            status: args.status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut settings = config::load_settings();
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(csrf_token) = cli.csrf_token {
        settings.csrf_token = Some(csrf_token);
    }
    let host = settings.build_host()?;

    let open = |session: &str| -> Result<Arc<UploadSessionController>> {
        let session_id = SessionId::new(session).context("invalid --session")?;
        let controller = UploadSessionController::with_settings(
            session_id,
            host.clone(),
            settings.controller_settings(),
        );
        tokio::spawn(render::render_events(controller.subscribe_events(), cli.json));
        Ok(controller)
    };

    match cli.command {
        Command::Upload {
            session,
            file,
            metadata,
        } => {
            let controller = open(&session)?;
            if controller.load().await != UploadState::Idle {
                println!("session {session} already has an upload; following it instead");
            } else {
                controller.set_form(metadata.into()).await;
                let staged = StagedFile::from_path(&file).await?;
                controller.stage_file(staged).await?;
                transmit(&controller).await?;
            }
            follow(&controller).await
        }
        Command::Status { session } => {
            let controller = open(&session)?;
            if controller.load().await == UploadState::Idle {
                println!("no upload in flight for session {session}");
                return Ok(());
            }
            follow(&controller).await
        }
        Command::Cancel { session } => {
            let controller = open(&session)?;
            controller.load().await;
            report_cancel(controller.cancel().await?);
            controller.wait_for_polling().await;
            Ok(())
        }
        Command::Update { session, metadata } => {
            let controller = open(&session)?;
            controller.set_form(metadata.into()).await;
            controller.update_metadata().await?;
            Ok(())
        }
    }
}

/// Runs the transfer. A first Ctrl-C shows the leave-page warning, a second one abandons.
async fn transmit(controller: &Arc<UploadSessionController>) -> Result<()> {
    let commit = controller.commit_upload();
    tokio::pin!(commit);
    let mut warned = false;
    loop {
        tokio::select! {
            result = &mut commit => return Ok(result?),
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                match controller.leave_page_warning().await {
                    Some(_) if warned => bail!("upload abandoned during transfer"),
                    Some(warning) => {
                        eprintln!("{warning}");
                        eprintln!("Press Ctrl-C again to leave anyway.");
                        warned = true;
                    }
                    None => {}
                }
            }
        }
    }
}

/// Follows processing to its end; Ctrl-C cancels remote processing.
async fn follow(controller: &Arc<UploadSessionController>) -> Result<()> {
    tokio::select! {
        _ = controller.wait_for_polling() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            report_cancel(controller.cancel().await?);
            controller.wait_for_polling().await;
        }
    }

    let state = controller.state().await;
    if state == UploadState::Uploaded {
        controller.attach_video_link().await;
    }
    println!("{}", render::summary(state, &controller.page().await));
    Ok(())
}

fn report_cancel(outcome: CancelOutcome) {
    match outcome {
        CancelOutcome::Cancelled { confirmed: true } => println!("cancel confirmed by server"),
        CancelOutcome::Cancelled { confirmed: false } => {
            println!("cancel request failed; session reset locally")
        }
        CancelOutcome::NothingToCancel => println!("nothing to cancel"),
    }
}
