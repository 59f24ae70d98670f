//! Subcommand handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use tokio::io::AsyncReadExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use toolbox_core::{
    ConversionConfig, DirectorySink, IncomingFile, Quality, RunOutcome, TaskEvent, TaskQueue,
    TaskStatus, ThreadCount,
};
use toolbox_tools::base64::{decode_image, decode_text, encode_image, encode_text};
use toolbox_tools::json::{JsonTree, ROOT};
use toolbox_tools::registry::{registry, resolve};
use toolbox_tools::script;
use toolbox_tools::svg::svg_to_component;
use toolbox_tools::text::TextStats;

use crate::cli::{Base64Action, Commands};
use crate::config::Config;

pub async fn run(command: Commands, cfg: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Convert {
            files,
            quality,
            threads,
            out_dir,
        } => convert(cfg, files, quality, threads, out_dir).await,
        Commands::Tools { id } => {
            tools(id.as_deref());
            Ok(())
        }
        Commands::Base64 { action } => base64(action).await,
        Commands::Json {
            input,
            tree,
            expand,
            expand_all,
        } => {
            let text = read_input(input).await?;
            if tree || expand_all || !expand.is_empty() {
                let mut doc = JsonTree::parse(&text)?;
                if expand_all {
                    doc.expand_all();
                } else if expand.is_empty() {
                    doc.expand(ROOT);
                }
                for path in &expand {
                    doc.expand(path);
                }
                print!("{}", doc.render());
            } else {
                println!("{}", toolbox_tools::json::format(&text)?);
            }
            Ok(())
        }
        Commands::Exec { input } => exec(input).await,
        Commands::Stats { input } => {
            let text = read_input(input).await?;
            println!("{}", TextStats::of(&text));
            Ok(())
        }
        Commands::Svg { input, name } => {
            let svg = read_input(input).await?;
            print!("{}", svg_to_component(&svg, &name)?);
            Ok(())
        }
    }
}

// ── convert ──────────────────────────────────────────────────────────────────

async fn convert(
    cfg: &Config,
    files: Vec<PathBuf>,
    quality: Option<Quality>,
    threads: Option<ThreadCount>,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = ConversionConfig::new(
        quality.unwrap_or(cfg.quality),
        threads.unwrap_or(cfg.threads),
    );
    let out_dir = out_dir.unwrap_or_else(|| cfg.out_dir.clone());
    let queue = TaskQueue::with_webp_workers(config, DirectorySink::new(out_dir.clone()));

    let mut incoming = Vec::with_capacity(files.len());
    for path in &files {
        let file = IncomingFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        incoming.push(file);
    }
    let offered = incoming.len();
    let added = queue.add_files(incoming).await;
    if added.len() < offered {
        warn!(skipped = offered - added.len(), "skipped files that are not convertible images");
    }
    if added.is_empty() {
        eprintln!("nothing to convert");
        return Ok(());
    }

    let names: HashMap<_, _> = queue
        .tasks()
        .await
        .into_iter()
        .map(|t| (t.id, t.source.name))
        .collect();
    let mut events = queue.subscribe();
    let progress = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TaskEvent::StatusChanged { task_id, status }) => {
                    let name = names.get(&task_id).map_or("?", String::as_str);
                    match status {
                        TaskStatus::Completed => println!("✓ {name}"),
                        TaskStatus::Error { message } => println!("✗ {name}: {message}"),
                        _ => {}
                    }
                }
                Ok(TaskEvent::ChunkStarted { index, size }) => {
                    debug!(chunk = index, size, "chunk started");
                }
                Ok(TaskEvent::RunFinished { .. }) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => debug!(missed = n, "progress output lagged"),
            }
        }
    });

    let outcome = queue.run_conversion().await;
    if let Err(e) = progress.await {
        warn!(error = %e, "progress printer stopped abnormally");
    }

    let report = match outcome {
        RunOutcome::Finished(report) => report,
        RunOutcome::AlreadyRunning => bail!("a conversion is already running"),
    };
    info!(?report, "conversion finished");
    println!(
        "{} of {} converted into {}",
        report.completed,
        report.dispatched(),
        out_dir.display()
    );
    if report.failed > 0 {
        bail!("{} file(s) failed to convert", report.failed);
    }
    Ok(())
}

// ── tools ────────────────────────────────────────────────────────────────────

fn tools(id: Option<&str>) {
    let entries = registry();
    let selected = id.map(resolve);
    for entry in entries {
        if selected.is_some_and(|s| s != entry.id) {
            continue;
        }
        println!(
            "{:<18} {:<18} {}",
            entry.id.to_string(),
            entry.name,
            entry.category.title()
        );
    }
}

// ── base64 ───────────────────────────────────────────────────────────────────

async fn base64(action: Base64Action) -> anyhow::Result<()> {
    match action {
        Base64Action::Encode { input } => {
            println!("{}", encode_text(&read_input(input).await?));
        }
        Base64Action::Decode { input } => {
            println!("{}", decode_text(&read_input(input).await?)?);
        }
        Base64Action::DecodeImage { input, output } => {
            let decoded = decode_image(&read_input(input).await?)?;
            tokio::fs::write(&output, &decoded.bytes)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!(
                "wrote {} bytes ({}) to {}",
                decoded.bytes.len(),
                decoded.mime.as_deref().unwrap_or("unknown type"),
                output.display()
            );
        }
        Base64Action::Image { path, raw } => {
            let file = IncomingFile::from_path(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            if !file.mime.starts_with("image/") {
                bail!("{} is not an image ({})", path.display(), file.mime);
            }
            let encoded = encode_image(&file.mime, &file.bytes);
            println!("{}", if raw { encoded.base64 } else { encoded.data_uri });
        }
    }
    Ok(())
}

// ── exec ─────────────────────────────────────────────────────────────────────

async fn exec(input: Option<String>) -> anyhow::Result<()> {
    let code = read_input(input).await?;
    let result = tokio::task::spawn_blocking(move || script::execute(&code))
        .await
        .context("script runner stopped abnormally")??;
    println!("{result}");
    Ok(())
}

// ── input ────────────────────────────────────────────────────────────────────

/// The argument itself, or all of stdin for `None` / `-`.
async fn read_input(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_input_is_used_verbatim() {
        assert_eq!(read_input(Some("abc".into())).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn decoded_image_is_written_to_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("pixel.gif");
        base64(Base64Action::DecodeImage {
            input: Some("data:image/gif;base64,R0lGODlh".into()),
            output: output.clone(),
        })
        .await
        .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"GIF89a");

        let bad = base64(Base64Action::DecodeImage {
            input: Some("data:image/gif;base64,@@".into()),
            output: dir.path().join("bad.gif"),
        })
        .await;
        assert_eq!(bad.unwrap_err().to_string(), "Invalid Base64 string");
        assert!(!dir.path().join("bad.gif").exists());
    }

    #[tokio::test]
    async fn exec_fails_with_the_thrown_message() {
        exec(Some("return 6 * 7".into())).await.unwrap();
        let err = exec(Some("throw new Error('nope')".into())).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
