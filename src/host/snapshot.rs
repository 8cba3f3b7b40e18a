use crate::{
    host::canvas::{Canvas, CanvasNode, NodeKind},
    ids::NodeId,
    protocol::{SessionPresence, ToneDescriptor, Vector, WorldSnapshot},
};

fn describe(node: &CanvasNode) -> Option<ToneDescriptor> {
    match node.kind {
        NodeKind::Tone { frequency, wave } => Some(ToneDescriptor {
            id: node.id.clone(),
            parent: node.parent.clone(),
            frequency,
            wave,
            x: node.position.x,
            y: node.position.y,
        }),
        _ => None,
    }
}

/// Build the snapshot the current session gets back with its PONG.
///
/// Distances are measured from the current session's position (the origin
/// when it has none) to every tone another session is playing. Selecting a
/// group plays the tone nodes directly inside it.
pub fn build_snapshot(canvas: &Canvas) -> WorldSnapshot {
    let widgets = canvas
        .tones()
        .filter_map(|node| describe(node).map(|tone| (node.id.clone(), tone)))
        .collect();

    let mut snapshot = WorldSnapshot {
        current_session_id: canvas
            .current_session()
            .map(|s| s.id.clone())
            .unwrap_or_default(),
        users: Default::default(),
        widgets,
    };

    let listener = canvas
        .current_session()
        .and_then(|s| s.position)
        .unwrap_or(Vector::ORIGIN);

    for session in canvas.sessions() {
        let mut presence = SessionPresence {
            session_id: session.id.clone(),
            user: session.name.clone(),
            position: session.position,
            selection: session.selection.clone(),
            ..Default::default()
        };

        let mut add = |id: &NodeId| {
            if let Some(tone) = snapshot.widgets.get(id) {
                presence
                    .distances
                    .insert(id.clone(), tone.position().distance(listener));
                presence.oscillators.insert(id.clone(), tone.clone());
            }
        };

        for id in &session.selection {
            if snapshot.widgets.contains_key(id) {
                add(id);
            } else if canvas.node(id).is_some() {
                for child in canvas.children(id) {
                    add(&child.id);
                }
            }
        }

        snapshot.users.insert(session.id.clone(), presence);
    }

    snapshot
}
