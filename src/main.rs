//! chatoc - collapsible question/heading outline for AI chat pages.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod dom;
mod logger;
mod observe;
mod outline;
mod platform;
mod reconcile;
mod sidebar;
mod tabs;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, common::Context};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let ctx = Context::load(&cli)?;

    match &cli.command {
        Commands::Platforms => cli::platforms::list_platforms(&ctx.registry),
        Commands::Check { url } => cli::check::check_url(&ctx.registry, url),
        Commands::Outline {
            page,
            format,
            pretty,
        } => cli::outline::print_outline(&ctx, page, *format, *pretty),
        Commands::Watch { page } => cli::watch::watch_page(&ctx, page),
    }
}
