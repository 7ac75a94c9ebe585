//! `chatoc outline <URL> <HTML_FILE>`: one update pass over a saved page.

use std::io::Write;

use anyhow::{Result, bail};

use super::args::{OutputFormat, PageArgs};
use super::common::{Context, read_page};
use crate::core::Session;
use crate::sidebar::{OutlineSnapshot, render_text};

pub fn print_outline(ctx: &Context, page: &PageArgs, format: OutputFormat, pretty: bool) -> Result<()> {
    let snapshot = build_outline(ctx, page)?;

    let output = match format {
        OutputFormat::Text => render_text(&snapshot),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(&snapshot)? + "\n",
        OutputFormat::Json => serde_json::to_string(&snapshot)? + "\n",
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn build_outline(ctx: &Context, page: &PageArgs) -> Result<OutlineSnapshot> {
    let mut doc = read_page(&page.html)?;
    let Some(session) = Session::start(&mut doc, &ctx.registry, page.url.as_str(), &ctx.settings)
    else {
        bail!("no platform adapter matches {}", page.url);
    };

    let snapshot = session.snapshot(&doc);
    crate::debug!("outline"; "{} entries from {}", snapshot.entries.len(), page.html.display());
    session.destroy(&mut doc);
    Ok(snapshot)
}
