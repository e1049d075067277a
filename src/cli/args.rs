//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Config used when neither `-C` nor a positional config is given
pub const DEFAULT_CONFIG: &str = "configs/cliqzium.json";

/// Default config of `fern react-dev`
pub const REACT_NATIVE_CONFIG: &str = "configs/react-native.json";

/// Fern extension build and test runner
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: configs/cliqzium.json)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rebuild on change and restart the browser test runner after every build
    #[command(name = "test-webext")]
    TestWebext,

    /// Run the configured build once
    #[command(visible_alias = "b")]
    Build,

    /// Print the extension id from a config file
    #[command(name = "addon-id")]
    AddonId {
        /// Config file (overrides -C)
        #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,
    },

    /// Scaffold a new source unit (available types: module)
    Generate {
        /// What to generate
        #[arg(value_name = "TYPE")]
        kind: String,

        /// Name of the new module
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Run the react-native dev server
    #[command(name = "react-dev")]
    ReactDev {
        /// Config file (default: configs/react-native.json)
        #[arg(value_name = "CONFIG", value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Config file selected for this invocation, relative to the project root.
    ///
    /// A positional config wins over `-C`, which wins over the command's default.
    pub fn config_path(&self) -> &Path {
        let positional = match &self.command {
            Commands::AddonId { config } | Commands::ReactDev { config } => config.as_deref(),
            _ => None,
        };

        positional
            .or(self.config.as_deref())
            .unwrap_or_else(|| match self.command {
                Commands::ReactDev { .. } => Path::new(REACT_NATIVE_CONFIG),
                _ => Path::new(DEFAULT_CONFIG),
            })
    }
}
