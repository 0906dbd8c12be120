mod cli;

use clipexport::{
    config::{self, Config},
    export::{ExportPlan, ExportRequest, Exporter},
    progress::TerminalProgress,
};
use clipexport_av::FfmpegMuxer;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ExportArgs};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "clipexport=trace,clipexport_dash=debug,clipexport_av=debug".to_string()
        } else {
            "clipexport=info,clipexport_dash=info,clipexport_av=info".to_string()
        }
    });

    // stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Inspect { input_dir, json }) => inspect(&input_dir, config, json),
        Some(Commands::CheckTools) => check_tools(&config),
        None => export(cli.export, config),
    }
}

fn export(args: ExportArgs, mut config: Config) -> Result<()> {
    let Some(input_dir) = args.input_dir else {
        anyhow::bail!("No input directory given");
    };

    config.export.compact |= args.compact;
    config.export.skip_missing_init |= args.skip_missing_init;

    let mut request = ExportRequest::new(input_dir);
    if let Some(output) = args.output {
        request = request.with_output(output);
    }

    let exporter = Exporter::new(config.export);
    let plan = exporter.plan(&request)?;

    if args.dry_run {
        print_plan(&plan);
        println!("\n[DRY RUN] Would write {}", plan.output.display());
        return Ok(());
    }

    let muxer = FfmpegMuxer::locate(config.tools.ffmpeg_path.as_deref())?;
    tracing::debug!("Using ffmpeg at {:?}", muxer.program());

    let exporter = if args.no_progress {
        exporter
    } else {
        exporter.with_observer(Arc::new(TerminalProgress::new()))
    };

    tracing::info!("Exporting clip {:?}", plan.input_dir);
    let summary = exporter.execute(plan, &muxer)?;

    for stream in &summary.streams {
        tracing::debug!(
            "Stream {}: {} segment(s), {} missing, {} bytes",
            stream.id,
            stream.segments_written,
            stream.segments_missing,
            stream.bytes_written
        );
    }

    println!("{}", summary.output.display());
    Ok(())
}

fn inspect(input_dir: &Path, config: Config, json: bool) -> Result<()> {
    let request = ExportRequest::new(input_dir);
    let plan = Exporter::new(config.export).plan(&request)?;

    if json {
        let json_str = serde_json::to_string_pretty(&plan)?;
        println!("{}", json_str);
    } else {
        print_plan(&plan);
    }

    Ok(())
}

fn print_plan(plan: &ExportPlan) {
    println!("Manifest: {}", plan.manifest.display());
    println!("Output: {}", plan.output.display());

    println!("\nRepresentations: {}", plan.representations.len());
    for rep in &plan.representations {
        println!("  [{}] {}", rep.id, rep.describe());
        println!("      init:  {}", rep.initialization);
        println!("      media: {}", rep.media);
        match rep.segments {
            Some(range) if !range.is_empty() => println!(
                "      segments: {}..{} ({} found)",
                range.min,
                range.max,
                range.len()
            ),
            Some(_) => println!("      segments: none found"),
            None => println!("      segments: skipped"),
        }
    }
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = clipexport_av::check_tools(config.tools.ffmpeg_path.as_deref());
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
            print!(" ({})", version.lines().next().unwrap_or(""));
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
        println!("ffmpeg is missing. Install it or set tools.ffmpeg_path in the config.");
    }

    Ok(())
}
