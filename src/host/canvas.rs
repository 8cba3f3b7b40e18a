use std::collections::BTreeMap;

use crate::{
    dsp::Waveform,
    ids::{EdgeId, NodeId, SessionId},
    protocol::Vector,
    sequencing::{EdgeState, GraphHost},
};

/// What a canvas node is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Produces a tone while selected.
    Tone { frequency: f32, wave: Waveform },
    /// Contains other nodes; selecting it plays its tone children.
    Group,
    /// Anything else an edge can attach to.
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Centre of the node.
    pub position: Vector,
    pub parent: Option<NodeId>,
}

impl CanvasNode {
    pub fn is_tone(&self) -> bool {
        matches!(self.kind, NodeKind::Tone { .. })
    }
}

/// A directed connector. The label carries the edge counter as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: EdgeId,
    pub start: NodeId,
    pub end: Option<NodeId>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub position: Option<Vector>,
    pub selection: Vec<NodeId>,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: None,
            selection: Vec::new(),
        }
    }
}

/// A shared canvas held in memory.
///
/// The walker drives the selection of the current session, the one whose
/// requests this canvas is answering.
#[derive(Debug, Default)]
pub struct Canvas {
    nodes: BTreeMap<NodeId, CanvasNode>,
    edges: Vec<Connector>,
    sessions: BTreeMap<SessionId, Session>,
    current: Option<SessionId>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tone(
        &mut self,
        id: impl Into<NodeId>,
        frequency: f32,
        wave: Waveform,
        position: Vector,
    ) -> NodeId {
        self.add_node(id.into(), NodeKind::Tone { frequency, wave }, position)
    }

    /// Add a group and move `children` into it.
    pub fn add_group(&mut self, id: impl Into<NodeId>, position: Vector, children: &[NodeId]) -> NodeId {
        let id = self.add_node(id.into(), NodeKind::Group, position);
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(id.clone());
            }
        }
        id
    }

    pub fn add_plain(&mut self, id: impl Into<NodeId>, position: Vector) -> NodeId {
        self.add_node(id.into(), NodeKind::Plain, position)
    }

    fn add_node(&mut self, id: NodeId, kind: NodeKind, position: Vector) -> NodeId {
        self.nodes.insert(
            id.clone(),
            CanvasNode {
                id: id.clone(),
                kind,
                position,
                parent: None,
            },
        );
        id
    }

    /// Connect `start` to `end` with an edge `length` beats long.
    pub fn connect(
        &mut self,
        id: impl Into<EdgeId>,
        start: impl Into<NodeId>,
        end: impl Into<NodeId>,
        length: u32,
    ) -> EdgeId {
        let id = id.into();
        self.edges.push(Connector {
            id: id.clone(),
            start: start.into(),
            end: Some(end.into()),
            label: Some(EdgeState::at_rest(length).label()),
        });
        id
    }

    /// Remove a node. Edges pointing at it stay but no longer resolve.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<CanvasNode> {
        for session in self.sessions.values_mut() {
            session.selection.retain(|n| n != id);
        }
        self.nodes.remove(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&CanvasNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.values()
    }

    pub fn tones(&self) -> impl Iterator<Item = &CanvasNode> {
        self.nodes.values().filter(|n| n.is_tone())
    }

    /// Direct children of a group.
    pub fn children<'a>(&'a self, parent: &'a NodeId) -> impl Iterator<Item = &'a CanvasNode> + 'a {
        self.nodes
            .values()
            .filter(move |n| n.parent.as_ref() == Some(parent))
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Connector> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn edges(&self) -> &[Connector] {
        &self.edges
    }

    pub fn join(&mut self, session: Session) {
        if self.current.is_none() {
            self.current = Some(session.id.clone());
        }
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn leave(&mut self, id: &SessionId) -> Option<Session> {
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        self.sessions.remove(id)
    }

    pub fn set_current_session(&mut self, id: Option<SessionId>) {
        self.current = id;
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn session_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Replace a session's selection.
    pub fn select(&mut self, session: &SessionId, nodes: Vec<NodeId>) {
        if let Some(s) = self.sessions.get_mut(session) {
            s.selection = nodes;
        }
    }

    pub fn move_session(&mut self, session: &SessionId, position: Vector) {
        if let Some(s) = self.sessions.get_mut(session) {
            s.position = Some(position);
        }
    }

    fn current_mut(&mut self) -> Option<&mut Session> {
        let id = self.current.as_ref()?;
        self.sessions.get_mut(id)
    }
}

impl GraphHost for Canvas {
    fn selection(&self) -> Vec<NodeId> {
        self.current_session()
            .map(|s| s.selection.clone())
            .unwrap_or_default()
    }

    fn set_selection(&mut self, nodes: Vec<NodeId>) {
        if let Some(session) = self.current_mut() {
            session.selection = nodes;
        }
    }

    fn outgoing_edges(&self, node: &NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| &e.start == node)
            .map(|e| e.id.clone())
            .collect()
    }

    fn edge_label(&self, edge: &EdgeId) -> Option<String> {
        self.edge(edge).and_then(|e| e.label.clone())
    }

    fn set_edge_label(&mut self, edge: &EdgeId, label: String) {
        if let Some(e) = self.edges.iter_mut().find(|e| &e.id == edge) {
            e.label = Some(label);
        }
    }

    fn resolve_edge_end(&self, edge: &EdgeId) -> Option<NodeId> {
        self.edge(edge)
            .and_then(|e| e.end.clone())
            .filter(|end| self.nodes.contains_key(end))
    }
}
