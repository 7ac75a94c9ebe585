//! `chatoc watch <URL> <HTML_FILE>`: live outline over a page snapshot.
//!
//! ```text
//! notify thread ──(reload)──▶ ┐
//! stdin lines  ──(intent)───▶ ├─▶ current-thread loop ─▶ Session
//! Ctrl+C       ──(shutdown)─▶ ┘          ▲
//!                                        └─ sleep until debounce deadline
//! ```
//!
//! Saving the HTML file swaps the page content in place, which the session
//! sees as ordinary mutation records. Everything touching the document runs
//! on the loop thread.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context as _, Result, bail};
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::args::PageArgs;
use super::common::{Context, read_html, read_page};
use crate::core::{
    Command, CommandError, Dispatched, Intent, Session, is_shutdown, register_shutdown,
};
use crate::dom::{Document, insert_fragment};
use crate::logger::{status_detach, status_error, status_success, status_unchanged, status_warning};
use crate::reconcile::ReconcileOutcome;
use crate::sidebar::render_text;
use crate::{debug, log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn watch_page(ctx: &Context, page: &PageArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start event loop")?;
    runtime.block_on(run(ctx, page))
}

async fn run(ctx: &Context, page: &PageArgs) -> Result<()> {
    let html_path = page
        .html
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", page.html.display()))?;

    let mut doc = read_page(&html_path)?;

    let Some(mut session) =
        Session::start(&mut doc, &ctx.registry, page.url.as_str(), &ctx.settings)
    else {
        bail!("no platform adapter matches {}", page.url);
    };

    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
    register_shutdown(shutdown_tx);

    // Keep the watcher alive for the whole loop
    let (_watcher, mut file_rx) = watch_file(&html_path)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    log!("watch"; "{} on {} (t N, a, r, g N[.M], d, m X Y, p, q)", session.adapter().name(), html_path.display());
    show(&session, &doc, "started", false);

    while !is_shutdown() {
        let now = Instant::now();
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            Some(()) = file_rx.recv() => {
                if let Err(e) = reload(&mut doc, &session, &html_path) {
                    status_error("reload failed", &format!("{e:#}"));
                    continue;
                }
                let relevant = session.on_mutations(&mut doc, Instant::now());
                debug!("watch"; "reloaded, {} relevant records", relevant);
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if handle_line(&line, &mut doc, &mut session) == Flow::Quit {
                        break;
                    }
                }
                // keep watching until Ctrl+C
                Ok(None) => stdin_open = false,
                Err(e) => {
                    log!("error"; "stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::time::sleep(session.sleep_duration(now)) => {
                if let Some(outcome) = session.poll(&mut doc, Instant::now()) {
                    show_outcome(&session, &doc, &outcome);
                }
            }
        }
    }

    session.destroy(&mut doc);
    status_detach();
    log!("watch"; "stopped");
    Ok(())
}

/// Watch the file's directory: editors often save by rename, which would
/// silently end a watch on the file itself.
fn watch_file(path: &Path) -> Result<(notify::RecommendedWatcher, mpsc::Receiver<()>)> {
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (notify_tx, notify_rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = notify_tx.send(res);
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    // One slot is enough: a reload always reads the whole file
    let (async_tx, async_rx) = mpsc::channel::<()>(1);
    let target = path.to_path_buf();
    std::thread::spawn(move || {
        while let Ok(result) = notify_rx.recv() {
            match result {
                Ok(event) if touches(&event, &target) => {
                    if let Err(mpsc::error::TrySendError::Closed(())) = async_tx.try_send(()) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        }
    });

    Ok((watcher, async_rx))
}

fn touches(event: &notify::Event, target: &Path) -> bool {
    let content_change = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    };
    content_change && event.paths.iter().any(|p| p == target)
}

/// Replace the page content with the file's current markup, leaving the
/// widget in place when it sits directly under `<body>`.
fn reload(doc: &mut Document, session: &Session, path: &Path) -> Result<()> {
    let html = read_html(path)?;
    let body = doc.body();
    let widget = session.sidebar().root();

    for child in doc.children(body).to_vec() {
        if child != widget {
            doc.remove(child);
        }
    }
    let before = doc.children(body).contains(&widget).then_some(widget);
    insert_fragment(doc, body, before, &html)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(())
}

fn handle_line(line: &str, doc: &mut Document, session: &mut Session) -> Flow {
    // the typed line already moved the cursor below the status block
    status_detach();

    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(CommandError::Empty) => return Flow::Continue,
        Err(e) => {
            status_warning(&e.to_string());
            return Flow::Continue;
        }
    };

    match command {
        Command::Quit => return Flow::Quit,
        Command::Print => {
            show(session, doc, "outline", false);
            return Flow::Continue;
        }
        _ => {}
    }

    let intent = match command.resolve(session.sidebar().model()) {
        Ok(Some(intent)) => intent,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            status_warning(&e.to_string());
            return Flow::Continue;
        }
    };

    let navigating = matches!(intent, Intent::Navigate(_));
    match session.dispatch(doc, intent) {
        Dispatched::Pass(outcome) => show_outcome(session, doc, &outcome),
        Dispatched::Applied => {
            let headline = match doc.scrolled_to() {
                Some(node) if navigating => {
                    format!("scrolled to \"{}\"", doc.normalized_text(node))
                }
                _ => "applied".to_string(),
            };
            show(session, doc, &headline, false);
        }
        Dispatched::Ignored => status_warning(&format!("`{}` had no effect", line.trim())),
    }
    Flow::Continue
}

fn show_outcome(session: &Session, doc: &Document, outcome: &ReconcileOutcome) {
    let unchanged = matches!(outcome, ReconcileOutcome::Unchanged);
    show(session, doc, &outcome.to_string(), unchanged);
}

fn show(session: &Session, doc: &Document, headline: &str, unchanged: bool) {
    let text = render_text(&session.snapshot(doc));
    let message = format!("{headline}\n{text}");
    if unchanged {
        status_unchanged(&message);
    } else {
        status_success(&message);
    }
}
