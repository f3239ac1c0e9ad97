//! Node/edge snapshot of the resolved link graph, for graph renderers.

use crate::model::note::{Note, NoteId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: NoteId,
    pub title: String,
    /// Number of notes linking here.
    pub backlink_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: NoteId,
    pub target: NoteId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl LinkGraph {
    /// Builds the graph from notes in the given order. Edges follow `links_out`.
    pub fn from_notes<'a, I, F>(notes: I, backlink_count: F) -> Self
    where
        I: IntoIterator<Item = &'a Note>,
        F: Fn(NoteId) -> usize,
    {
        let mut graph = Self::default();
        for note in notes {
            graph.nodes.push(GraphNode {
                id: note.id,
                title: note.title.clone(),
                backlink_count: backlink_count(note.id),
            });
            graph
                .edges
                .extend(note.links_out.iter().map(|target| GraphEdge {
                    source: note.id,
                    target: *target,
                }));
        }
        graph
    }
}
