mod cli;

use recconv::{config, ConversionQueue};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rc_av::{FfmpegTranscoder, ToolRegistry};
use rc_core::events::{EventBus, QueueEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::broadcast;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "recconv=debug,rc_av=debug,rc_core=debug".to_string()
        } else {
            "recconv=info,rc_av=info,rc_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert { files, stdin } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_files(files, stdin, cli.config.as_deref()))
        }
        Commands::CheckTools { json } => check_tools(cli.config.as_deref(), json),
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("recconv {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn convert_files(
    files: Vec<PathBuf>,
    read_stdin: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let tools = ToolRegistry::discover(&config.tools);
    let engine = FfmpegTranscoder::from_registry(&tools)
        .context("Cannot convert without the transcoding engine")?;
    tracing::info!("Using engine {}", engine.program().display());

    let events = Arc::new(EventBus::new(config.queue.event_capacity));
    let display = tokio::spawn(show_queue(events.subscribe()));
    let queue = ConversionQueue::new(Arc::new(engine), events.clone());

    let mut queued = 0usize;
    for file in files {
        if submit(&queue, &file) {
            queued += 1;
        }
    }

    if read_stdin {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() && submit(&queue, Path::new(line)) {
                queued += 1;
            }
        }
    }

    if queued == 0 {
        anyhow::bail!("No files to convert");
    }

    queue.wait_idle().await;
    let stats = queue.stats();

    // Closing the bus lets the display task flush and exit.
    drop(queue);
    drop(events);
    let _ = display.await;

    println!("{} converted, {} failed", stats.succeeded, stats.failed);
    if stats.failed > 0 {
        anyhow::bail!("{} of {} conversions failed", stats.failed, queued);
    }
    Ok(())
}

/// Enqueue `file` if it exists, returning whether it was queued.
fn submit(queue: &ConversionQueue, file: &Path) -> bool {
    match std::fs::canonicalize(file) {
        Ok(path) if path.is_file() => {
            queue.enqueue(path);
            true
        }
        _ => {
            eprintln!("Skipping {}: not a file", file.display());
            false
        }
    }
}

/// Render queue events to stdout until the bus closes.
async fn show_queue(mut rx: broadcast::Receiver<QueueEvent>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::debug!("display skipped {} queue events", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let line = match &event {
            QueueEvent::Queued { path, .. } => format!("queued {}", path.display()),
            QueueEvent::Started { path } => format!("converting {}", path.display()),
            QueueEvent::Finished {
                path, error: None, ..
            } => format!("done {}", path.display()),
            QueueEvent::Finished {
                path,
                error: Some(e),
                ..
            } => format!("failed {}: {}", path.display(), e),
            QueueEvent::Idle => "idle".to_string(),
        };
        match event.depth() {
            Some(depth) => println!("{} ({} in queue)", line, depth),
            None => println!("{}", line),
        }
    }
}

fn check_tools(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("Checking external tools...\n");

    let mut all_ok = true;
    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("The transcoding engine is missing. Install ffmpeg or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            match config.tools.ffmpeg_path {
                Some(ref engine) => println!("  Engine: {}", engine.display()),
                None => println!("  Engine: discovered at startup"),
            }
            println!("  Event capacity: {}", config.queue.event_capacity);
            for warning in config.validate() {
                println!("  Warning: {}", warning);
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("  Event capacity: {}", config.queue.event_capacity);
        }
    }

    Ok(())
}
