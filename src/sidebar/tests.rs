use super::*;
use crate::dom::parse_document;
use crate::outline::read_outline;
use crate::platform::Registry;
use crate::reconcile::reconcile;

const PAGE: &str = r#"<main>
    <article><div class="whitespace-pre-wrap">What is X?</div></article>
    <article><div class="markdown prose"><h3>Intro</h3></div></article>
    <article><div class="whitespace-pre-wrap">What is Y?</div></article>
    <article><div class="markdown prose"><h3>Intro</h3><h3>Details</h3></div></article>
</main>"#;

fn setup(settings: &SidebarSettings) -> (Document, Sidebar) {
    let mut doc = parse_document(PAGE).unwrap();
    let adapter = Registry::builtin().get("chatgpt").cloned().unwrap();
    let body = doc.body();
    let mut sidebar = Sidebar::mount(&mut doc, body, settings);
    let desired = read_outline(&doc, &adapter);
    reconcile(&mut doc, &mut sidebar, &desired);
    (doc, sidebar)
}

fn fp(question: &str) -> Fingerprint {
    Fingerprint::of(question)
}

fn nav(question: &str, heading: Option<usize>) -> Navigation {
    Navigation {
        entry: fp(question),
        heading,
    }
}

fn snapshot(doc: &Document, sidebar: &Sidebar) -> OutlineSnapshot {
    OutlineSnapshot::capture(doc, sidebar, "chatgpt")
}

fn active_count(doc: &Document, sidebar: &Sidebar) -> usize {
    doc.descendants(sidebar.root())
        .filter(|&n| doc.has_class(n, render::ACTIVE))
        .count()
}

#[test]
fn test_mount_is_one_write() {
    let mut doc = Document::new();
    let body = doc.body();
    let sidebar = Sidebar::mount(&mut doc, body, &SidebarSettings::default());
    assert_eq!(doc.writes(), 1);
    assert!(sidebar.is_attached(&doc));
    assert!(sidebar.is_drawer_open());
    assert!(sidebar.model().is_empty());
}

#[test]
fn test_toggle_entry_flips_only_that_entry() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());

    assert!(sidebar.toggle_entry(&mut doc, &fp("What is Y?")));
    let snap = snapshot(&doc, &sidebar);
    assert!(!snap.entries[0].collapsed);
    assert!(snap.entries[1].collapsed);
    // one entry still expanded
    assert!(snap.any_expanded);

    assert!(!sidebar.toggle_entry(&mut doc, &fp("Unknown?")));
}

#[test]
fn test_collapsed_entry_hides_headings() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    sidebar.toggle_entry(&mut doc, &fp("What is Y?"));

    let hidden = doc
        .descendants(sidebar.root())
        .filter(|&n| doc.has_class(n, render::HEADING) && doc.has_class(n, render::HIDDEN))
        .count();
    assert_eq!(hidden, 2);

    let text = render_text(&snapshot(&doc, &sidebar));
    assert!(text.contains(" 2. [+] What is Y?"));
    assert!(!text.contains("2.2 Details"));
}

#[test]
fn test_toggle_all_follows_indicator() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());

    // mixed state counts as expanded, so the first toggle collapses all
    sidebar.toggle_entry(&mut doc, &fp("What is X?"));
    sidebar.toggle_all(&mut doc);
    let snap = snapshot(&doc, &sidebar);
    assert!(snap.entries.iter().all(|e| e.collapsed));
    assert!(!snap.any_expanded);

    sidebar.toggle_all(&mut doc);
    let snap = snapshot(&doc, &sidebar);
    assert!(snap.entries.iter().all(|e| !e.collapsed));
    assert!(snap.any_expanded);
}

#[test]
fn test_mark_active_is_exclusive() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());

    let targets = [
        nav("What is X?", None),
        nav("What is Y?", Some(1)),
        nav("What is X?", Some(0)),
        nav("What is Y?", None),
    ];
    for target in &targets {
        assert!(sidebar.mark_active(&mut doc, target));
        assert_eq!(active_count(&doc, &sidebar), 1);
    }
    assert_eq!(sidebar.active(), Some(&nav("What is Y?", None)));
    assert!(snapshot(&doc, &sidebar).entries[1].active);

    assert!(!sidebar.mark_active(&mut doc, &nav("What is Y?", Some(9))));
    assert_eq!(active_count(&doc, &sidebar), 1);
}

#[test]
fn test_target_of() {
    let (doc, sidebar) = setup(&SidebarSettings::default());
    let question = sidebar.target_of(&nav("What is Y?", None)).unwrap();
    assert_eq!(doc.normalized_text(question), "What is Y?");

    let heading = sidebar.target_of(&nav("What is Y?", Some(1))).unwrap();
    assert_eq!(doc.tag(heading), Some("h3"));
    assert_eq!(doc.normalized_text(heading), "Details");

    assert!(sidebar.target_of(&nav("What is X?", Some(1))).is_none());
}

#[test]
fn test_toggle_drawer() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());

    assert!(!sidebar.toggle_drawer(&mut doc));
    assert!(doc.has_class(sidebar.root(), render::COLLAPSED));
    assert!(render_text(&snapshot(&doc, &sidebar)).contains("(hidden)"));

    assert!(sidebar.toggle_drawer(&mut doc));
    assert!(!doc.has_class(sidebar.root(), render::COLLAPSED));
}

#[test]
fn test_drag_requires_permission() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    assert_eq!(sidebar.drag_to(&mut doc, Position { x: 10, y: 10 }), None);
    assert_eq!(sidebar.position(), None);
}

#[test]
fn test_drag_clamps_to_viewport() {
    let settings = SidebarSettings {
        allow_drag: true,
        ..SidebarSettings::default()
    };
    let (mut doc, mut sidebar) = setup(&settings);
    sidebar.set_viewport(Size {
        width: 800,
        height: 600,
    });

    let pos = sidebar.drag_to(&mut doc, Position { x: 2000, y: -50 }).unwrap();
    assert_eq!(pos, Position { x: 550, y: 0 });
    assert_eq!(
        doc.attr(sidebar.root(), "style"),
        Some("width:250px;left:550px;top:0px;right:auto")
    );
}

#[test]
fn test_contains() {
    let (doc, sidebar) = setup(&SidebarSettings::default());
    let inner = doc.descendants(sidebar.root()).last().unwrap();
    assert!(sidebar.contains(&doc, sidebar.root()));
    assert!(sidebar.contains(&doc, inner));
    assert!(!sidebar.contains(&doc, doc.body()));
}

#[test]
fn test_ensure_attached_reappends_detached_widget() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    let body = doc.body();
    // observing keeps the removed subtree alive until sweep
    doc.observe(crate::dom::ObserveOptions::child_list());
    let root = sidebar.root();
    doc.remove(root);
    assert!(!sidebar.is_attached(&doc));

    assert!(sidebar.ensure_attached(&mut doc, body));
    assert_eq!(sidebar.root(), root);
    assert!(sidebar.is_attached(&doc));
    assert!(!sidebar.ensure_attached(&mut doc, body));
}

#[test]
fn test_ensure_attached_rebuilds_freed_widget() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    let body = doc.body();
    sidebar.toggle_entry(&mut doc, &fp("What is X?"));
    sidebar.mark_active(&mut doc, &nav("What is Y?", Some(0)));

    let root = sidebar.root();
    doc.remove(root);
    assert!(!doc.is_live(root));

    assert!(sidebar.ensure_attached(&mut doc, body));
    assert_ne!(sidebar.root(), root);

    let snap = snapshot(&doc, &sidebar);
    assert_eq!(snap.entries.len(), 2);
    assert!(snap.entries[0].collapsed);
    assert!(snap.entries[1].headings[0].active);
    assert_eq!(active_count(&doc, &sidebar), 1);
}

#[test]
fn test_destroy_removes_widget() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    let root = sidebar.root();
    sidebar.destroy(&mut doc);
    assert!(!doc.is_connected(root));
    assert!(sidebar.model().is_empty());
    assert!(sidebar.active().is_none());
}

#[test]
fn test_duplicate_append_allocates_nothing() {
    let (mut doc, mut sidebar) = setup(&SidebarSettings::default());
    let adapter = Registry::builtin().get("chatgpt").cloned().unwrap();
    let desired = read_outline(&doc, &adapter);

    let nodes = doc.live_nodes();
    let writes = doc.writes();
    assert!(!sidebar.append_entry(&mut doc, &desired[0]));
    assert_eq!(doc.live_nodes(), nodes);
    assert_eq!(doc.writes(), writes);
    assert_eq!(sidebar.model().len(), 2);

    // a replace addressed at the wrong entry builds nothing either
    sidebar.replace_entry(&mut doc, 0, &desired[1]);
    assert_eq!(doc.live_nodes(), nodes);
    assert_eq!(snapshot(&doc, &sidebar).entries[0].question, "What is X?");
}
