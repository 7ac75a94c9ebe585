//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Collapsible question/heading outline for AI chat pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: chatoc.toml)
    #[arg(short = 'C', long, global = true, default_value = "chatoc.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

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
    /// List registered platform adapters and their URL patterns
    #[command(visible_alias = "p")]
    Platforms,

    /// Report which adapter (if any) handles a URL
    #[command(visible_alias = "c")]
    Check {
        #[arg(value_hint = clap::ValueHint::Url)]
        url: Url,
    },

    /// Build the outline of a saved page once and print it
    #[command(visible_alias = "o")]
    Outline {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Keep the outline in sync while the saved page changes on disk
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        page: PageArgs,
    },
}

/// A page snapshot and the URL it was captured from.
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// URL the page was loaded from (selects the adapter)
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: Url,

    /// Saved HTML of the page
    #[arg(value_name = "HTML_FILE", value_hint = clap::ValueHint::FilePath)]
    pub html: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
