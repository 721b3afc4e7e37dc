//! CLI argument definitions using clap derive

use crate::camera::FacingMode;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Camara - offline-first camera and photo gallery
///
/// Takes lossless photos from a camera feed, keeps them in a local
/// gallery and caches the application shell for offline use.
#[derive(Parser, Debug)]
#[command(name = "camara")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CAMARA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory (photos and offline cache)
    #[arg(long, global = true, env = "CAMARA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the camera, take one photo and store it
    Capture(CaptureArgs),

    /// Browse or clear the photo gallery
    Gallery(GalleryArgs),

    /// Save a photo as a PNG file
    Download(DownloadArgs),

    /// Manage the offline cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the capture command
#[derive(Parser, Debug)]
pub struct CaptureArgs {
    /// Camera to use (default: from config)
    #[arg(short, long)]
    pub facing: Option<FacingMode>,

    /// Image file used as the camera feed
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Also save the photo as a PNG file
    #[arg(short, long)]
    pub download: bool,

    /// Directory for --download (default: from config, else current directory)
    #[arg(short, long, requires = "download")]
    pub output: Option<PathBuf>,
}

/// Arguments for the gallery command
#[derive(Parser, Debug)]
pub struct GalleryArgs {
    /// Subcommand for gallery
    #[command(subcommand)]
    pub action: GalleryAction,
}

/// Gallery subcommands
#[derive(Subcommand, Debug)]
pub enum GalleryAction {
    /// List all photos, oldest first
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one photo (newest by default)
    Show {
        /// Photo id
        #[arg(long, conflicts_with_all = ["index", "back"])]
        id: Option<i64>,

        /// Position in the gallery (1 = oldest)
        #[arg(short, long, conflicts_with = "back")]
        index: Option<usize>,

        /// Steps back from the newest photo
        #[arg(short, long)]
        back: Option<usize>,
    },

    /// Delete every photo
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Photo id (default: newest)
    #[arg(long)]
    pub id: Option<i64>,

    /// Target directory (default: from config, else current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Download the core assets into the current generation
    Install,

    /// Purge old generations and serve from the current one
    Activate,

    /// Show cache state
    Status {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Request a resource through the offline proxy
    Fetch {
        /// Path relative to the configured origin, or an absolute URL
        path: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Treat the request as a page navigation
        #[arg(long)]
        document: bool,

        /// Write the body to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every cache generation
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_capture() {
        let cli = Cli::parse_from(["camara", "capture", "--facing", "user", "--download"]);
        match cli.command {
            Commands::Capture(args) => {
                assert_eq!(args.facing, Some(FacingMode::Front));
                assert!(args.download);
                assert!(args.source.is_none());
            }
            _ => panic!("expected Capture command"),
        }
    }

    #[test]
    fn capture_output_requires_download() {
        let result = Cli::try_parse_from(["camara", "capture", "--output", "/tmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_gallery_show() {
        let cli = Cli::parse_from(["camara", "gallery", "show", "--index", "2"]);
        match cli.command {
            Commands::Gallery(GalleryArgs {
                action: GalleryAction::Show { id, index, back },
            }) => {
                assert_eq!(id, None);
                assert_eq!(index, Some(2));
                assert_eq!(back, None);
            }
            _ => panic!("expected Gallery Show command"),
        }
    }

    #[test]
    fn gallery_show_selectors_conflict() {
        let result = Cli::try_parse_from(["camara", "gallery", "show", "--id", "1", "--index", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_cache_fetch() {
        let cli = Cli::parse_from(["camara", "cache", "fetch", "./app.js", "--document"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action:
                    CacheAction::Fetch {
                        path,
                        method,
                        data,
                        document,
                        output,
                    },
            }) => {
                assert_eq!(path, "./app.js");
                assert_eq!(method, "GET");
                assert!(data.is_none());
                assert!(document);
                assert!(output.is_none());
            }
            _ => panic!("expected Cache Fetch command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "camara",
            "gallery",
            "list",
            "-vv",
            "--data-dir",
            "/tmp/camara",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/camara")));
    }

    #[test]
    fn config_action_is_optional() {
        let cli = Cli::parse_from(["camara", "config"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs { action: None })
        ));
    }
}
