//! Mutation relevance.
//!
//! A batch is relevant when any record touches the adapter's observe scope:
//!
//! - child-list: an added or removed node matches the scope, contains a
//!   match, or sits under a match (the record target's ancestor chain)
//! - attributes / character data: the target or one of its ancestors matches
//!
//! Records produced by the sidebar itself never count.

use crate::dom::{Document, MutationKind, MutationRecord, NodeId, Selector};

pub struct MutationFilter<'a> {
    scope: &'a Selector,
    /// Widget root whose subtree is ignored
    ignore: Option<NodeId>,
}

impl<'a> MutationFilter<'a> {
    pub fn new(scope: &'a Selector, ignore: Option<NodeId>) -> Self {
        Self { scope, ignore }
    }

    fn is_ignored(&self, doc: &Document, node: NodeId) -> bool {
        self.ignore
            .is_some_and(|root| node == root || doc.ancestors(node).any(|a| a == root))
    }

    /// Does this single record concern the observed scope?
    pub fn is_relevant(&self, doc: &Document, record: &MutationRecord) -> bool {
        if self.is_ignored(doc, record.target) {
            return false;
        }
        match &record.kind {
            MutationKind::ChildList { .. } => {
                let mut touched = record
                    .touched_nodes()
                    .filter(|&n| Some(n) != self.ignore)
                    .peekable();
                if touched.peek().is_none() {
                    return false;
                }
                if touched.any(|n| self.scope.matches_within(doc, n)) {
                    return true;
                }
                self.scope.closest(doc, record.target).is_some()
            }
            MutationKind::Attributes { .. } | MutationKind::CharacterData => {
                self.scope.closest(doc, record.target).is_some()
            }
        }
    }

    /// Was this record produced by the widget itself (a write inside its
    /// subtree, or the widget root being attached or detached)?
    pub fn is_own(&self, doc: &Document, record: &MutationRecord) -> bool {
        let Some(root) = self.ignore else {
            return false;
        };
        if self.is_ignored(doc, record.target) {
            return true;
        }
        matches!(record.kind, MutationKind::ChildList { .. })
            && record.touched_nodes().all(|n| n == root)
    }

    /// Number of relevant records in a batch.
    pub fn count_relevant(&self, doc: &Document, records: &[MutationRecord]) -> usize {
        records.iter().filter(|r| self.is_relevant(doc, r)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ObserveOptions, insert_fragment, parse_document};

    fn page() -> (Document, Selector) {
        let doc = parse_document(
            r#"<main id="chat">
                <div class="turn"><div class="answer"><p id="p1">text</p></div></div>
                <aside id="ads"><span>ad</span></aside>
            </main>"#,
        )
        .unwrap();
        (doc, Selector::parse(".answer").unwrap())
    }

    fn find(doc: &Document, id: &str) -> NodeId {
        Selector::parse(&format!("#{id}"))
            .unwrap()
            .query_first(doc, doc.body())
            .unwrap()
    }

    #[test]
    fn test_added_answer_is_relevant() {
        let (mut doc, scope) = page();
        doc.observe(ObserveOptions::child_list());
        let chat = find(&doc, "chat");
        insert_fragment(&mut doc, chat, None, r#"<div class="turn"><div class="answer"></div></div>"#)
            .unwrap();

        let records = doc.take_records();
        let filter = MutationFilter::new(&scope, None);
        assert_eq!(filter.count_relevant(&doc, &records), 1);
    }

    #[test]
    fn test_change_inside_answer_is_relevant() {
        let (mut doc, scope) = page();
        doc.observe(ObserveOptions::child_list());
        let p1 = find(&doc, "p1");
        insert_fragment(&mut doc, p1, None, "<b>more</b>").unwrap();

        let records = doc.take_records();
        assert!(MutationFilter::new(&scope, None).is_relevant(&doc, &records[0]));
    }

    #[test]
    fn test_unrelated_churn_is_ignored() {
        let (mut doc, scope) = page();
        doc.observe(ObserveOptions::all());
        let ads = find(&doc, "ads");
        insert_fragment(&mut doc, ads, None, "<span>another ad</span>").unwrap();
        doc.set_attr(ads, "data-x", "1");

        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        assert_eq!(MutationFilter::new(&scope, None).count_relevant(&doc, &records), 0);
    }

    #[test]
    fn test_removed_answer_is_relevant_until_sweep() {
        let (mut doc, scope) = page();
        doc.observe(ObserveOptions::child_list());
        let answer = scope.query_first(&doc, doc.body()).unwrap();
        let turn = doc.parent(answer).unwrap();
        doc.remove(turn);

        let records = doc.take_records();
        assert!(MutationFilter::new(&scope, None).is_relevant(&doc, &records[0]));
        doc.sweep();
        assert!(!doc.is_live(answer));
    }

    #[test]
    fn test_text_change_uses_ancestor_chain() {
        let (mut doc, scope) = page();
        doc.observe(ObserveOptions::all());
        let p1 = find(&doc, "p1");
        let text = doc.children(p1)[0];
        doc.set_text(text, "streamed");

        let records = doc.take_records();
        assert!(MutationFilter::new(&scope, None).is_relevant(&doc, &records[0]));
    }

    #[test]
    fn test_own_widget_is_ignored() {
        let (mut doc, _) = page();
        let scope = Selector::parse("div").unwrap();
        let widget = doc.create_element_with("div", &[("class", "outline-container")]);
        doc.observe(ObserveOptions::all());
        let body = doc.body();
        doc.append_child(body, widget);
        let inner = doc.create_element("div");
        doc.append_child(widget, inner);

        let records = doc.take_records();
        assert_eq!(records.len(), 2);
        let filter = MutationFilter::new(&scope, Some(widget));
        assert_eq!(filter.count_relevant(&doc, &records), 0);
    }

    #[test]
    fn test_retain_drops_only_widget_records() {
        let (mut doc, scope) = page();
        let widget = doc.create_element_with("div", &[("class", "outline-container")]);
        doc.observe(ObserveOptions::all());
        let body = doc.body();
        doc.append_child(body, widget);
        doc.set_attr(widget, "style", "left:0px");
        let chat = find(&doc, "chat");
        insert_fragment(&mut doc, chat, None, r#"<div class="answer"></div>"#).unwrap();

        let filter = MutationFilter::new(&scope, Some(widget));
        doc.retain_records(|doc, record| !filter.is_own(doc, record));

        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, chat);
    }
}
