use std::time::{Duration, Instant};

use super::*;
use crate::dom::{NodeId, insert_fragment, parse_document};
use crate::outline::Fingerprint;
use crate::sidebar::render_text;

const URL: &str = "https://chatgpt.com/c/abc";

fn page() -> Document {
    parse_document(
        r#"<main>
            <article><div class="whitespace-pre-wrap">What is X?</div></article>
            <article><div class="markdown prose"><h3>Intro</h3></div></article>
            <article><div class="whitespace-pre-wrap">What is Y?</div></article>
            <article><div class="markdown prose"><h3>Intro</h3><h3>Details</h3></div></article>
        </main>"#,
    )
    .unwrap()
}

fn main_of(doc: &Document) -> NodeId {
    doc.descendants(doc.body())
        .find(|&n| doc.tag(n) == Some("main"))
        .unwrap()
}

fn turn(question: &str, heading: &str) -> String {
    format!(
        r#"<article><div class="whitespace-pre-wrap">{question}</div></article>
           <article><div class="markdown prose"><h3>{heading}</h3></div></article>"#
    )
}

fn start(doc: &mut Document) -> Session {
    let settings = Settings::default();
    let registry = settings.registry().unwrap();
    Session::start(doc, &registry, URL, &settings).unwrap()
}

fn questions(session: &Session, doc: &Document) -> Vec<String> {
    session
        .snapshot(doc)
        .entries
        .into_iter()
        .map(|e| e.question)
        .collect()
}

fn navigate(question: &str, heading: Option<usize>) -> Intent {
    Intent::Navigate(Navigation {
        entry: Fingerprint::of(question),
        heading,
    })
}

#[test]
fn test_unsupported_url_leaves_page_alone() {
    let mut doc = page();
    let settings = Settings::default();
    let registry = Registry::builtin();

    assert!(Session::start(&mut doc, &registry, "https://example.com/", &settings).is_none());
    assert_eq!(doc.writes(), 0);
    assert!(!doc.is_observing());
}

#[test]
fn test_start_runs_initial_pass() {
    let mut doc = page();
    let session = start(&mut doc);

    assert_eq!(session.adapter().id(), "chatgpt");
    assert_eq!(session.passes(), 1);
    assert!(doc.is_observing());
    assert!(session.sidebar().is_attached(&doc));
    assert_eq!(questions(&session, &doc), vec!["What is X?", "What is Y?"]);
    // nothing pending, so the loop idles
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_burst_of_mutations_runs_one_pass() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let main = main_of(&doc);
    let t0 = Instant::now();
    let step = Duration::from_millis(100);

    for (i, q) in ["A?", "B?", "C?", "D?"].iter().enumerate() {
        insert_fragment(&mut doc, main, None, &turn(q, "h")).unwrap();
        let at = t0 + step * u32::try_from(i).unwrap();
        assert_eq!(session.on_mutations(&mut doc, at), 1);
    }

    // chatgpt waits 1s after the last event (t0 + 300ms)
    let last = t0 + step * 3;
    assert!(session.poll(&mut doc, last + Duration::from_millis(999)).is_none());
    assert_eq!(session.passes(), 1);

    let outcome = session.poll(&mut doc, last + Duration::from_secs(1));
    assert_eq!(
        outcome,
        Some(ReconcileOutcome::Patched {
            appended: 4,
            replaced: 0
        })
    );
    assert_eq!(session.passes(), 2);
    assert!(session.poll(&mut doc, last + Duration::from_secs(10)).is_none());
    assert_eq!(questions(&session, &doc).len(), 6);
}

#[test]
fn test_own_writes_do_not_schedule_passes() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let now = Instant::now();

    session.dispatch(&mut doc, Intent::ToggleAll);
    session.dispatch(&mut doc, navigate("What is X?", None));
    assert!(!doc.has_pending_records());

    assert_eq!(session.on_mutations(&mut doc, now), 0);
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_repeated_intents_leave_nothing_queued() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let nodes = doc.live_nodes();

    for _ in 0..500 {
        session.dispatch(&mut doc, Intent::Toggle(Fingerprint::of("What is X?")));
    }
    assert!(!doc.has_pending_records());
    assert_eq!(doc.live_nodes(), nodes);

    session.dispatch(&mut doc, navigate("What is Y?", Some(1)));
    session.dispatch(&mut doc, Intent::ToggleDrawer);
    session.dispatch(&mut doc, Intent::Refresh);
    assert!(!doc.has_pending_records());
}

#[test]
fn test_page_records_survive_intents() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let main = main_of(&doc);

    insert_fragment(&mut doc, main, None, &turn("What is Z?", "Z")).unwrap();
    session.dispatch(&mut doc, Intent::Toggle(Fingerprint::of("What is X?")));
    assert!(doc.has_pending_records());
    assert_eq!(session.on_mutations(&mut doc, Instant::now()), 1);
    assert!(session.next_deadline().is_some());
}

#[test]
fn test_refresh_supersedes_pending_pass() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let main = main_of(&doc);
    let now = Instant::now();

    insert_fragment(&mut doc, main, None, &turn("What is Z?", "Z")).unwrap();
    session.on_mutations(&mut doc, now);
    assert!(session.next_deadline().is_some());

    assert_eq!(
        session.dispatch(&mut doc, Intent::Refresh),
        Dispatched::Pass(ReconcileOutcome::Patched {
            appended: 1,
            replaced: 0
        })
    );
    assert_eq!(session.passes(), 2);
    assert_eq!(session.next_deadline(), None);
    assert!(session.poll(&mut doc, now + Duration::from_secs(5)).is_none());
    assert_eq!(session.passes(), 2);
}

#[test]
fn test_toggle_second_entry_keeps_indicator_expanded() {
    let mut doc = page();
    let mut session = start(&mut doc);

    assert_eq!(
        session.dispatch(&mut doc, Intent::Toggle(Fingerprint::of("What is Y?"))),
        Dispatched::Applied
    );
    let snap = session.snapshot(&doc);
    assert!(!snap.entries[0].collapsed);
    assert!(snap.entries[1].collapsed);
    assert!(snap.any_expanded);
    assert!(render_text(&snap).starts_with("Outline · chatgpt  [-]"));

    assert_eq!(
        session.dispatch(&mut doc, Intent::Toggle(Fingerprint::of("Nope?"))),
        Dispatched::Ignored
    );
}

#[test]
fn test_navigation_scrolls_and_keeps_one_active() {
    let mut doc = page();
    let mut session = start(&mut doc);

    let targets = [
        navigate("What is X?", None),
        navigate("What is Y?", Some(1)),
        navigate("What is X?", Some(0)),
        navigate("What is Y?", Some(0)),
    ];
    for intent in targets {
        assert_eq!(session.dispatch(&mut doc, intent), Dispatched::Applied);
        let snap = session.snapshot(&doc);
        let active = snap
            .entries
            .iter()
            .map(|e| usize::from(e.active) + e.headings.iter().filter(|h| h.active).count())
            .sum::<usize>();
        assert_eq!(active, 1);
    }

    let scrolled = doc.scrolled_to().unwrap();
    assert_eq!(doc.normalized_text(scrolled), "Intro");
    assert_eq!(
        session.dispatch(&mut doc, navigate("What is Y?", Some(7))),
        Dispatched::Ignored
    );
}

#[test]
fn test_navigation_reresolves_stale_reference() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let main = main_of(&doc);

    // the page re-renders the same conversation before any pass runs
    doc.clear_children(main);
    insert_fragment(&mut doc, main, None, &turn("What is X?", "Intro")).unwrap();
    insert_fragment(&mut doc, main, None, &turn("What is Y?", "Details")).unwrap();

    assert_eq!(
        session.dispatch(&mut doc, navigate("What is Y?", None)),
        Dispatched::Applied
    );
    let scrolled = doc.scrolled_to().unwrap();
    assert!(doc.is_connected(scrolled));
    assert_eq!(doc.normalized_text(scrolled), "What is Y?");
}

#[test]
fn test_navigation_to_vanished_entry_is_ignored() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let main = main_of(&doc);

    doc.clear_children(main);
    assert_eq!(
        session.dispatch(&mut doc, navigate("What is X?", None)),
        Dispatched::Ignored
    );
    assert_eq!(doc.scrolled_to(), None);
}

#[test]
fn test_detached_widget_is_reattached() {
    let mut doc = page();
    let mut session = start(&mut doc);
    let root = session.sidebar().root();

    doc.remove(root);
    assert!(!session.sidebar().is_attached(&doc));

    assert_eq!(session.on_mutations(&mut doc, Instant::now()), 0);
    assert!(session.sidebar().is_attached(&doc));
    assert_eq!(questions(&session, &doc).len(), 2);
}

#[test]
fn test_drag_disabled_by_default() {
    let mut doc = page();
    let mut session = start(&mut doc);
    assert_eq!(
        session.dispatch(&mut doc, Intent::Drag(crate::sidebar::Position { x: 5, y: 5 })),
        Dispatched::Ignored
    );
    assert_eq!(session.dispatch(&mut doc, Intent::ToggleDrawer), Dispatched::Applied);
    assert!(!session.sidebar().is_drawer_open());
}

#[test]
fn test_destroy_cleans_up() {
    let mut doc = page();
    let session = start(&mut doc);
    let root = session.sidebar().root();

    session.destroy(&mut doc);
    assert!(!doc.is_observing());
    assert!(!doc.is_connected(root));
    let leftover = doc
        .descendants(doc.body())
        .any(|n| doc.has_class(n, "outline-container"));
    assert!(!leftover);
}
