use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use filedeck_lib::api::{HttpApi, SelectionApi};
use filedeck_lib::config::Config;
use filedeck_lib::delete_confirm::ConfirmState;
use filedeck_lib::logging::{init_tracing, poll_logs, LogBuffer, LogLine};
use filedeck_lib::session::{DeleteOutcome, FileManagerSession, PageState, RenameOutcome};
use filedeck_lib::{connect, Action};

#[derive(Parser)]
#[command(name = "filedeck-cli")]
#[command(about = "Remote file manager selection CLI", version, long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides baseUrl from the config file
    #[arg(short, long)]
    base_url: Option<String>,

    /// JSON page state (current_path, items, selected, scripts)
    #[arg(short, long)]
    page: Option<PathBuf>,

    /// Listing path relative to the server root, used when no page file is given
    #[arg(long, default_value = "")]
    path: String,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add paths to the server-side selection
    Select { paths: Vec<String> },
    /// Remove paths from the server-side selection
    Deselect { paths: Vec<String> },
    /// Select every entry of the page listing
    SelectAll,
    /// Rename a single entry
    Rename { path: String, new_name: String },
    /// Create a folder in the current path
    Mkdir { name: String },
    /// Delete the selected entries, after adding `paths` to the selection
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        paths: Vec<String>,
    },
    /// Run a processing script on the selection, after adding `paths` to it
    Process { script: String, paths: Vec<String> },
    /// Clear the server-side selection
    Clear,
    /// Print the server log
    Logs {
        #[arg(short, long)]
        follow: bool,

        /// Only print the last N lines
        #[arg(short = 'n', long)]
        tail: Option<usize>,
    },
}

fn load_page(cli: &Cli) -> anyhow::Result<PageState> {
    match &cli.page {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read page file {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("Invalid page file {}", path.display()))
        }
        None => Ok(PageState {
            current_path: cli.path.clone(),
            ..PageState::default()
        }),
    }
}

fn print_lines(lines: &[LogLine]) {
    for line in lines {
        println!("{:>6}  {}", line.line_no + 1, line.text);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    let page = load_page(&cli)?;
    let session = connect(&config, page)?;

    match cli.command {
        Command::Select { paths } => sync_paths(&session, Action::Add, &paths).await?,
        Command::Deselect { paths } => sync_paths(&session, Action::Remove, &paths).await?,
        Command::SelectAll => select_all(&session).await?,
        Command::Rename { path, new_name } => match session.rename(&path, &new_name).await {
            Ok(RenameOutcome::Renamed { new_name }) => println!("✅ Renamed to {new_name}"),
            Ok(RenameOutcome::Unchanged) => println!("ℹ️  Name unchanged"),
            Err(e) => anyhow::bail!("[{}] {e}", e.code()),
        },
        Command::Mkdir { name } => match session.create_folder(&name).await {
            Ok(created) => println!("📁 Created folder {created}"),
            Err(e) => anyhow::bail!("[{}] {e}", e.code()),
        },
        Command::Delete { yes, paths } => {
            include_paths(&session, &paths).await?;
            delete(&session, yes).await?
        }
        Command::Process { script, paths } => {
            include_paths(&session, &paths).await?;
            match session.submit_process(&script).await {
                Ok(count) => println!("⚙️  Started {script} on {count} item(s)"),
                Err(e) => anyhow::bail!("[{}] {e}", e.code()),
            }
        }
        Command::Clear => match session.clear_selection().await {
            Ok(()) => println!("🧹 Selection cleared"),
            Err(e) => anyhow::bail!("[{}] {e}", e.code()),
        },
        Command::Logs { follow, tail } => logs(&session, &config, follow, tail).await?,
    }

    Ok(())
}

async fn sync_paths(
    session: &FileManagerSession<HttpApi>,
    action: Action,
    paths: &[String],
) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("Missing required argument: <PATHS>");
    }

    let mut failed = 0;
    for path in paths {
        match session.selection().synchronize(action, path).await {
            Ok(()) => println!("✅ {} {path}", action.as_str()),
            Err(e) => {
                failed += 1;
                eprintln!("   ⚠️  {path}: {e}");
            }
        }
    }

    println!("📊 Selected: {}", session.count());
    if failed > 0 {
        anyhow::bail!("{failed} of {} request(s) failed", paths.len());
    }
    Ok(())
}

/// The server keeps the selection but never reports it, so a session without
/// a page file only knows about the paths given on the command line.
async fn include_paths(session: &FileManagerSession<HttpApi>, paths: &[String]) -> anyhow::Result<()> {
    if let Err(e) = session.select_paths(paths).await {
        anyhow::bail!("[{}] {e}", e.code());
    }
    if session.count() == 0 {
        anyhow::bail!("Nothing selected: pass the paths as arguments or a --page file with the current selection");
    }
    Ok(())
}

async fn select_all(session: &FileManagerSession<HttpApi>) -> anyhow::Result<()> {
    let total = session.items().len();
    if total == 0 {
        anyhow::bail!("No listing to select from: pass a --page file with the current listing");
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Selecting...");

    let report = session
        .select_all(|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;

    if report.is_complete() {
        pb.finish_with_message("✅ Selection complete!");
    } else {
        pb.abandon_with_message("⚠️  Selection incomplete");
    }

    println!();
    println!("📊 Results:");
    println!("   Requests sent: {}", report.attempted);
    println!("   Succeeded: {}", report.succeeded);
    println!("   Selected: {}", session.count());
    if !report.is_complete() {
        println!("   Errors: {}", report.failed.len());
        for (path, error) in &report.failed {
            eprintln!("   ⚠️  {path}: {error}");
        }
        anyhow::bail!("{} path(s) could not be selected", report.failed.len());
    }
    Ok(())
}

async fn delete(session: &FileManagerSession<HttpApi>, yes: bool) -> anyhow::Result<()> {
    let deadline = match session.click_delete().await {
        Ok(DeleteOutcome::Armed { deadline }) => deadline,
        Ok(DeleteOutcome::Submitted { count }) => {
            println!("🗑️  Deleted {count} item(s)");
            return Ok(());
        }
        Err(e) => anyhow::bail!("[{}] {e}", e.code()),
    };

    if !yes {
        let button = session.delete_button();
        println!(
            "⚠️  {} item(s) will be deleted. Type 'y' to {} within {}s.",
            session.count(),
            button.label.to_lowercase(),
            deadline
                .saturating_duration_since(tokio::time::Instant::now())
                .as_secs_f32()
                .ceil()
        );

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        let read = tokio::time::timeout_at(deadline, stdin.read_line(&mut answer)).await;

        if read.is_err() || session.delete_state() == ConfirmState::Idle {
            println!("⏱️  Confirmation expired, nothing deleted");
            return Ok(());
        }
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    match session.click_delete().await {
        Ok(DeleteOutcome::Submitted { count }) => {
            println!("🗑️  Deleted {count} item(s)");
            Ok(())
        }
        Ok(DeleteOutcome::Armed { .. }) => {
            println!("⏱️  Confirmation expired, nothing deleted");
            Ok(())
        }
        Err(e) => anyhow::bail!("[{}] {e}", e.code()),
    }
}

async fn logs(
    session: &FileManagerSession<HttpApi>,
    config: &Config,
    follow: bool,
    tail: Option<usize>,
) -> anyhow::Result<()> {
    let buffer = LogBuffer::new(config.max_log_lines);
    let api = session.selection().api();

    let snapshot = api
        .fetch_logs()
        .await
        .context("Failed to fetch server log")?;
    buffer.ingest(&snapshot);

    match tail {
        Some(n) => print_lines(&buffer.tail(n)),
        None => print_lines(&buffer.lines()),
    }

    if !follow {
        return Ok(());
    }

    let token = CancellationToken::new();
    let stop = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    poll_logs(api, &buffer, config.log_poll_interval(), token, print_lines).await;
    Ok(())
}
