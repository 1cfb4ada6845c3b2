//! SvgIcons CLI
//!
//! Commands: normalize, identify, load, previews, settings
//! Outputs JSON (or canonical SVG) to stdout, diagnostics to stderr
//! Returns 2 when some icons failed to load

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use svgicons_core::{
    count_label, filter_previews, logging::init_logging, reload_notice, resolve_identifier,
    FsSource, IconLoader, IconManifest, MemoryRegistry, Mode, Normalizer, SettingsStore,
};

#[derive(Parser)]
#[command(name = "svgicons-cli")]
#[command(about = "SvgIcons CLI - normalize SVG files into theme-compatible icons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the settings file
    #[arg(short, long, default_value = "data.json")]
    settings: PathBuf,

    /// Icons directory used when the settings carry no override
    #[arg(long, default_value = "icons")]
    default_root: PathBuf,

    /// Per-file read timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    read_timeout_ms: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one SVG file and print the result
    Normalize {
        file: PathBuf,

        /// registration or preview
        #[arg(short, long, default_value = "registration")]
        mode: Mode,
    },

    /// Print the identifier for a path relative to the icons root
    Identify {
        path: String,

        /// Overrides the prefix from settings
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Reload every icon and print the manifest
    Load,

    /// List preview-mode icons
    Previews {
        /// Only identifiers containing this text
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    SetPrefix { prefix: String },
    /// Set the icons directory override; omit to clear it
    SetRoot { root: Option<PathBuf> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut store = match SettingsStore::open(&cli.settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load settings: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Normalize { file, mode } => {
            let content = match std::fs::read_to_string(&file) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!(r#"{{"error": "Failed to read {}: {}"}}"#, file.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            println!("{}", Normalizer::new().normalize(&content, mode));
            ExitCode::SUCCESS
        }

        Commands::Identify { path, prefix } => {
            let prefix = prefix.unwrap_or_else(|| store.settings().icon_prefix.clone());
            println!("{}", resolve_identifier(&path, &prefix));
            ExitCode::SUCCESS
        }

        Commands::Load => {
            let loader = build_loader(&store, &cli.default_root, cli.read_timeout_ms);
            let registry = MemoryRegistry::new();
            let result = loader.reload(&registry);
            eprintln!("{}", reload_notice(&result));

            let summary = match result {
                Ok(s) => s,
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            };
            match IconManifest::from_summary(&summary) {
                Ok(manifest) => print_json(&serde_json::json!({ "success": true, "manifest": manifest })),
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::FAILURE;
                }
            }
            if summary.has_failures() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }

        Commands::Previews { search } => {
            let loader = build_loader(&store, &cli.default_root, cli.read_timeout_ms);
            match loader.previews() {
                Ok(previews) => {
                    let visible = filter_previews(&previews, &search);
                    print_json(&serde_json::json!({
                        "count": count_label(visible.len(), previews.len(), &search),
                        "icons": visible,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Settings { action } => {
            let saved = match action {
                SettingsAction::Show => Ok(()),
                SettingsAction::SetPrefix { prefix } => store.set_icon_prefix(prefix),
                SettingsAction::SetRoot { root } => store.set_icons_root_override(root),
            };
            if let Err(e) = saved {
                print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                return ExitCode::FAILURE;
            }
            print_json(store.settings());
            ExitCode::SUCCESS
        }
    }
}

fn build_loader(store: &SettingsStore, default_root: &Path, read_timeout_ms: u64) -> IconLoader {
    IconLoader::from_settings(Arc::new(FsSource), store.settings(), default_root)
        .with_read_timeout(Duration::from_millis(read_timeout_ms))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!(r#"{{"error": "Serialization error: {}"}}"#, e),
    }
}
