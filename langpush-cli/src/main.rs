use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use langpush::{FormatType, PushOutcome};
use langpush_cli::{
    config,
    export::{ExportRequest, run_export, run_push},
    server::{self, AppState},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP push service.
    Serve {
        /// Configuration file (defaults to ./langpush.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on, overrides `server.bind`
        #[arg(short, long)]
        bind: Option<String>,

        /// JSON term catalog, overrides `catalog.path`
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory receiving pushed files, overrides `storage.dir`
        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },

    /// Export translations from a catalog file.
    Export {
        #[command(flatten)]
        target: TargetArgs,

        /// File to write a single locale to (stdout when omitted)
        #[arg(short, long, conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Push every selected locale into this directory, one file per locale
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// List the supported export formats.
    Formats,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// The JSON term catalog
    #[arg(long)]
    catalog: PathBuf,

    /// Project identifier
    #[arg(short, long)]
    project: String,

    /// Locale code, or `all`
    #[arg(short, long)]
    locale: String,

    /// Export format id (see `langpush formats`)
    #[arg(short, long, value_parser = parse_format)]
    format: FormatType,

    /// Only export terms without a translation
    #[arg(long)]
    untranslated: bool,

    /// Locale whose translations fill the gaps
    #[arg(long)]
    fallback_locale: Option<String>,
}

impl From<TargetArgs> for ExportRequest {
    fn from(args: TargetArgs) -> Self {
        ExportRequest {
            catalog: args.catalog,
            project: args.project,
            locale: args.locale,
            format: args.format,
            untranslated: args.untranslated,
            fallback_locale: args.fallback_locale,
        }
    }
}

fn parse_format(s: &str) -> Result<FormatType, String> {
    s.parse().map_err(|e: langpush::Error| e.to_string())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args.commands).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Serve {
            config,
            bind,
            catalog,
            storage_dir,
        } => {
            let cwd = std::env::current_dir()?;
            let mut settings = config::load(config.as_deref(), &cwd)?;
            if let Some(bind) = bind {
                settings.server.bind = bind;
            }
            if let Some(catalog) = catalog {
                settings.catalog.path = Some(catalog);
            }
            if let Some(dir) = storage_dir {
                settings.storage.dir = Some(dir);
            }
            settings.validate()?;

            let state = AppState::from_settings(&settings, &cwd).await?;
            server::serve(state, &settings.server.bind).await
        }
        Commands::Export {
            target,
            output,
            out_dir,
        } => {
            let request = ExportRequest::from(target);
            match out_dir {
                Some(dir) => {
                    let summary = run_push(&request, &dir).await?;
                    for entry in &summary.entries {
                        if let PushOutcome::Failed { error } = &entry.outcome {
                            eprintln!("❌ {}: {}", entry.locale, error);
                        }
                    }
                    println!("{}", summary.message());
                    if summary.failed() > 0 {
                        return Err(format!("{} locale(s) failed", summary.failed()).into());
                    }
                    Ok(())
                }
                None => Ok(run_export(&request, output.as_deref()).await?),
            }
        }
        Commands::Formats => {
            for format in FormatType::ALL {
                println!(
                    "{:<12} .{:<11} {}",
                    format.id(),
                    format.extension(),
                    format.content_type()
                );
            }
            Ok(())
        }
    }
}
