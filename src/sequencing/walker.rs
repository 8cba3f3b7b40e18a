use tracing::debug;

use crate::{
    ids::{EdgeId, NodeId},
    sequencing::edge::{EdgeState, EdgeStep},
};

/// The canvas as the walker sees it.
///
/// Edge labels are plain text here; the walker decodes and encodes them with
/// [`EdgeState`] at this boundary.
pub trait GraphHost {
    fn selection(&self) -> Vec<NodeId>;

    fn set_selection(&mut self, nodes: Vec<NodeId>);

    /// Edges whose start endpoint is `node`.
    fn outgoing_edges(&self, node: &NodeId) -> Vec<EdgeId>;

    fn edge_label(&self, edge: &EdgeId) -> Option<String>;

    fn set_edge_label(&mut self, edge: &EdgeId, label: String);

    /// The node at the far end of `edge`, if it still exists.
    fn resolve_edge_end(&self, edge: &EdgeId) -> Option<NodeId>;
}

/// What one beat tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    /// The computed next selection, in insertion order.
    pub selection: Vec<NodeId>,
    /// Edges that reached their end node on this tick.
    pub arrivals: usize,
}

/// Advances the canvas selection one beat at a time.
///
/// Per selected node:
/// - no usable outgoing edges: the node stays selected
/// - per edge, move its counter one beat; on arrival the end node joins the
///   next selection, otherwise the node itself does
///
/// An empty result never clears the selection.
#[derive(Debug, Default)]
pub struct GraphWalker {
    previous: Vec<NodeId>,
}

impl GraphWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes that were selected when the walker last looked.
    pub fn previous(&self) -> &[NodeId] {
        &self.previous
    }

    /// Note the current selection, parking edge counters if it was cleared.
    ///
    /// Returns how many edge labels were parked.
    pub fn observe<G: GraphHost + ?Sized>(&mut self, host: &mut G) -> usize {
        let selection = host.selection();
        if !selection.is_empty() {
            self.previous = selection;
            return 0;
        }

        let mut parked = 0;
        for node in std::mem::take(&mut self.previous) {
            for edge in host.outgoing_edges(&node) {
                let state = EdgeState::from_label(host.edge_label(&edge).as_deref());
                if !state.is_at_rest() {
                    host.set_edge_label(&edge, state.rest().label());
                    parked += 1;
                }
            }
        }
        if parked > 0 {
            debug!(parked, "selection cleared, edge counters parked");
        }
        parked
    }

    /// Run one beat tick against the host.
    pub fn tick<G: GraphHost + ?Sized>(&mut self, host: &mut G) -> WalkOutcome {
        let current = host.selection();
        if current.is_empty() {
            self.observe(host);
            return WalkOutcome::default();
        }

        let mut outcome = WalkOutcome::default();
        for node in &current {
            let edges: Vec<(EdgeId, NodeId)> = host
                .outgoing_edges(node)
                .into_iter()
                .filter_map(|edge| host.resolve_edge_end(&edge).map(|end| (edge, end)))
                .collect();

            if edges.is_empty() {
                insert_unique(&mut outcome.selection, node.clone());
                continue;
            }

            for (edge, end) in edges {
                let state = EdgeState::from_label(host.edge_label(&edge).as_deref());
                match state.advance() {
                    EdgeStep::Travelling(next) => {
                        host.set_edge_label(&edge, next.label());
                        insert_unique(&mut outcome.selection, node.clone());
                    }
                    EdgeStep::Arrived(next) => {
                        host.set_edge_label(&edge, next.label());
                        insert_unique(&mut outcome.selection, end);
                        outcome.arrivals += 1;
                    }
                }
            }
        }

        if outcome.selection.is_empty() {
            self.previous = current;
        } else {
            debug!(
                from = current.len(),
                to = outcome.selection.len(),
                arrivals = outcome.arrivals,
                "walked selection"
            );
            host.set_selection(outcome.selection.clone());
            self.previous = outcome.selection.clone();
        }
        outcome
    }
}

fn insert_unique(selection: &mut Vec<NodeId>, node: NodeId) {
    if !selection.contains(&node) {
        selection.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct Graph {
        selection: Vec<NodeId>,
        // edge id -> (start, end, label)
        edges: Vec<(EdgeId, NodeId, Option<NodeId>, Option<String>)>,
    }

    impl Graph {
        fn edge(mut self, id: &str, start: &str, end: Option<&str>, label: &str) -> Self {
            self.edges.push((
                id.into(),
                start.into(),
                end.map(NodeId::from),
                Some(label.to_owned()),
            ));
            self
        }

        fn select(mut self, nodes: &[&str]) -> Self {
            self.selection = nodes.iter().map(|n| NodeId::from(*n)).collect();
            self
        }

        fn label(&self, id: &str) -> String {
            self.edge_label(&EdgeId::from(id)).unwrap_or_default()
        }

        fn selected(&self) -> Vec<&str> {
            self.selection.iter().map(NodeId::as_str).collect()
        }

        fn selected_set(&self) -> BTreeSet<&str> {
            self.selection.iter().map(NodeId::as_str).collect()
        }
    }

    impl GraphHost for Graph {
        fn selection(&self) -> Vec<NodeId> {
            self.selection.clone()
        }

        fn set_selection(&mut self, nodes: Vec<NodeId>) {
            self.selection = nodes;
        }

        fn outgoing_edges(&self, node: &NodeId) -> Vec<EdgeId> {
            self.edges
                .iter()
                .filter(|(_, start, _, _)| start == node)
                .map(|(e, _, _, _)| e.clone())
                .collect()
        }

        fn edge_label(&self, edge: &EdgeId) -> Option<String> {
            self.edges
                .iter()
                .find(|(e, _, _, _)| e == edge)
                .and_then(|(_, _, _, l)| l.clone())
        }

        fn set_edge_label(&mut self, edge: &EdgeId, label: String) {
            if let Some(entry) = self.edges.iter_mut().find(|(e, _, _, _)| e == edge) {
                entry.3 = Some(label);
            }
        }

        fn resolve_edge_end(&self, edge: &EdgeId) -> Option<NodeId> {
            self.edges
                .iter()
                .find(|(e, _, _, _)| e == edge)
                .and_then(|(_, _, end, _)| end.clone())
        }
    }

    #[test]
    fn long_edge_counts_up_then_arrives_once() {
        let mut graph = Graph::default().edge("ab", "A", Some("B"), "4").select(&["A"]);
        let mut walker = GraphWalker::new();

        let mut labels = Vec::new();
        let mut arrivals = Vec::new();
        for _ in 0..4 {
            let outcome = walker.tick(&mut graph);
            labels.push(graph.label("ab"));
            arrivals.push(outcome.arrivals);
        }
        assert_eq!(labels, ["4:2", "4:3", "4:4", "4"]);
        assert_eq!(arrivals, [0, 0, 0, 1]);
        assert_eq!(graph.selected(), ["B"]);
    }

    #[test]
    fn fan_out_is_additive() {
        let mut graph = Graph::default()
            .edge("ab", "A", Some("B"), "1")
            .edge("ac", "A", Some("C"), "2")
            .select(&["A"]);
        let mut walker = GraphWalker::new();

        walker.tick(&mut graph);
        assert_eq!(graph.selected_set(), BTreeSet::from(["A", "B"]));
        assert_eq!(graph.label("ab"), "1");
        assert_eq!(graph.label("ac"), "2:2");

        walker.tick(&mut graph);
        assert_eq!(graph.selected_set(), BTreeSet::from(["B", "C"]));
        assert_eq!(graph.label("ab"), "1");
        assert_eq!(graph.label("ac"), "2");
    }

    #[test]
    fn leaf_holds_its_place() {
        let mut graph = Graph::default().select(&["A"]);
        let mut walker = GraphWalker::new();
        let outcome = walker.tick(&mut graph);
        assert_eq!(outcome.selection, [NodeId::from("A")]);
        assert_eq!(graph.selected(), ["A"]);
    }

    #[test]
    fn converging_paths_select_once() {
        let mut graph = Graph::default()
            .edge("ac", "A", Some("C"), "1")
            .edge("bc", "B", Some("C"), "1")
            .select(&["A", "B"]);
        let mut walker = GraphWalker::new();
        walker.tick(&mut graph);
        assert_eq!(graph.selected(), ["C"]);
    }

    #[test]
    fn unresolvable_edge_is_ignored() {
        let mut graph = Graph::default()
            .edge("dangling", "A", None, "3:2")
            .select(&["A"]);
        let mut walker = GraphWalker::new();
        walker.tick(&mut graph);
        assert_eq!(graph.selected(), ["A"]);
        assert_eq!(graph.label("dangling"), "3:2");
    }

    #[test]
    fn malformed_label_acts_as_one_beat_edge() {
        let mut graph = Graph::default()
            .edge("ab", "A", Some("B"), "soon")
            .select(&["A"]);
        let mut walker = GraphWalker::new();
        walker.tick(&mut graph);
        assert_eq!(graph.selected(), ["B"]);
        assert_eq!(graph.label("ab"), "1");
    }

    #[test]
    fn clearing_selection_parks_counters() {
        let mut graph = Graph::default()
            .edge("ab", "A", Some("B"), "4")
            .edge("ac", "A", Some("C"), "3")
            .select(&["A"]);
        let mut walker = GraphWalker::new();
        walker.tick(&mut graph);
        assert_eq!(graph.label("ab"), "4:2");

        graph.selection.clear();
        assert_eq!(walker.observe(&mut graph), 2);
        assert_eq!(graph.label("ab"), "4");
        assert_eq!(graph.label("ac"), "3");

        // Re-selecting restarts from the top
        graph.selection = vec!["A".into()];
        walker.observe(&mut graph);
        walker.tick(&mut graph);
        assert_eq!(graph.label("ab"), "4:2");
    }

    #[test]
    fn empty_selection_tick_changes_nothing() {
        let mut graph = Graph::default().edge("ab", "A", Some("B"), "2:2");
        let mut walker = GraphWalker::new();
        let outcome = walker.tick(&mut graph);
        assert!(outcome.selection.is_empty());
        assert!(graph.selection.is_empty());
        assert_eq!(graph.label("ab"), "2:2");
    }
}
