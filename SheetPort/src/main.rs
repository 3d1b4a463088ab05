mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, MergeArgs, PluginArgs, ServeArgs};
use sheetapp::{WebAppExt, Webapp};
use sheetconfig::get_config;
use sheetexport::PlaylistExportExt;
use sheetplatform::{LoadReport, Platform, PlatformConfigExt, PlatformLoader, SharedRegistry};
use sheetserver::{ConfigExt, ServerBuilder};
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(args).await,
        Command::Platforms(args) => list_platforms(args),
        Command::Merge(args) => merge(args),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut builder = ServerBuilder::new_configured();
    if let Some(port) = args.port {
        builder = builder.http_port(port);
    }
    let mut server = builder.build();

    server.init_logging().await;
    server.init_config_api().await;

    info!("Loading platform plugins...");
    let (registry, report) = SharedRegistry::load(platform_loader(&args.plugins)?);
    log_report(&report);

    server
        .init_playlist_export(registry)
        .await
        .context("Failed to initialize the export API")?;

    let server_info = server.info();
    server
        .add_route("/info", move || {
            let server_info = server_info.clone();
            async move {
                serde_json::json!({
                    "name": server_info.name,
                    "version": env!("CARGO_PKG_VERSION"),
                    "http_port": server_info.http_port,
                })
            }
        })
        .await;

    server.add_webapp::<Webapp>("/").await;

    server.start().await.context("Failed to start the HTTP server")?;
    info!("SheetPort is ready, press Ctrl+C to stop");
    server.wait().await;

    Ok(())
}

fn list_platforms(args: PluginArgs) -> Result<()> {
    sheetserver::init_logging();

    let (registry, report) = platform_loader(&args)?.load_all();

    let mut out = std::io::stdout().lock();
    for platform in registry.platforms() {
        let code = platform.short_code().unwrap_or("-");
        writeln!(out, "{}\t{}", platform.name(), code)?;
        for hint in platform.hints() {
            writeln!(out, "\t{}", hint)?;
        }
    }
    for failure in &report.failures {
        writeln!(out, "FAILED\t{}\t{}", failure.file, failure.error)?;
    }
    Ok(())
}

fn merge(args: MergeArgs) -> Result<()> {
    let batch = sheetmerge::read_batch(&args.files)?;
    let merged = sheetmerge::merge_uploads(&batch);
    let text = sheetmerge::to_pretty_json(&merged)?;

    if args.output == "-" {
        println!("{}", text);
    } else {
        std::fs::write(&args.output, text)
            .with_context(|| format!("Failed to write {}", args.output))?;
        eprintln!(
            "Merged {} file(s), {} entries, into {}",
            batch.len(),
            merged.len(),
            args.output
        );
    }
    Ok(())
}

/// `--plugins` wins over the configured directory
fn platform_loader(args: &PluginArgs) -> Result<PlatformLoader> {
    let config = get_config();
    match &args.plugins {
        Some(dir) => {
            let timeout = config.get_plugin_timeout_secs()?;
            Ok(PlatformLoader::builder()
                .directory(dir)
                .timeout(Duration::from_secs(timeout as u64))
                .build()?)
        }
        None => config.create_platform_loader(),
    }
}

fn log_report(report: &LoadReport) {
    info!("{} platform(s) loaded", report.loaded.len());
    for name in &report.loaded {
        info!("  - {}", name);
    }
    for failure in &report.failures {
        warn!("  ! {}: {}", failure.file, failure.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shipped_descriptors_load() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("plugins");
        let (registry, report) = PlatformLoader::builder()
            .directory(dir)
            .build()
            .unwrap()
            .load_all();

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        let example = registry.find("Example Music").unwrap();
        assert_eq!(example.short_code(), Some("ex"));
        assert_eq!(example.hints().len(), 2);
    }

    #[test]
    fn test_merge_command_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&a, r#"[{"a":1}]"#).unwrap();
        std::fs::write(&b, r#"{"b":2}"#).unwrap();
        let output = dir.path().join("out.json");

        merge(MergeArgs {
            files: vec![a, b],
            output: output.to_string_lossy().to_string(),
        })
        .unwrap();

        let merged: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(merged, serde_json::json!([{"a":1},{"b":2}]));
    }
}
