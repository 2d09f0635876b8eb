//! The node-graph document.
//!
//! A `Graph` is a flat list of nodes plus directed links between them.
//! Nodes and links are kept in insertion order so the serialized form is
//! stable: the same graph always produces the same snapshot text.

use std::fmt;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Stable identifier of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Node type, e.g. "LoadImage" or "Sampler".
    pub kind: String,
    pub title: String,
    /// Canvas position (x, y).
    pub pos: [f32; 2],
}

/// A directed connection from one node's output to another's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    next_id: u64,
    nodes: Vec<Node>,
    links: Vec<Link>,
    /// Set when the view needs a redraw; never part of a snapshot.
    #[serde(skip)]
    dirty: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node titled after its kind and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-finite position or when ids run out.
    pub fn add_node(&mut self, kind: &str, pos: [f32; 2]) -> Result<NodeId> {
        ensure_finite(pos)?;
        let id = NodeId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .context("Node id counter exhausted")?;
        self.nodes.push(Node {
            id,
            kind: kind.to_string(),
            title: kind.to_string(),
            pos,
        });
        Ok(id)
    }

    /// Moves a node by `delta`.
    ///
    /// # Errors
    ///
    /// Returns an error if no node has the given id or the move would
    /// leave it at a non-finite position.
    pub fn move_node(&mut self, id: NodeId, delta: [f32; 2]) -> Result<()> {
        let node = self.node_mut(id)?;
        let pos = [node.pos[0] + delta[0], node.pos[1] + delta[1]];
        ensure_finite(pos)?;
        node.pos = pos;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if no node has the given id.
    pub fn rename_node(&mut self, id: NodeId, title: &str) -> Result<()> {
        self.node_mut(id)?.title = title.to_string();
        Ok(())
    }

    /// Links `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown nodes, self links and duplicate links.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.ensure_node(from)?;
        self.ensure_node(to)?;
        if from == to {
            bail!("Cannot link node {from} to itself");
        }
        let link = Link { from, to };
        if self.links.contains(&link) {
            bail!("Nodes {from} and {to} are already linked");
        }
        self.links.push(link);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the link does not exist.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        let link = Link { from, to };
        let Some(index) = self.links.iter().position(|l| *l == link) else {
            bail!("No link from {from} to {to}");
        };
        self.links.remove(index);
        Ok(())
    }

    /// Removes a node. Its links must already be gone; see
    /// [`Graph::links_of`].
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or still linked.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let index = self.index_of(id)?;
        if !self.links_of(id).is_empty() {
            bail!("Node {id} still has links");
        }
        Ok(self.nodes.remove(index))
    }

    /// Links touching `id`, in insertion order.
    pub fn links_of(&self, id: NodeId) -> Vec<Link> {
        self.links
            .iter()
            .filter(|l| l.from == id || l.to == id)
            .copied()
            .collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the redraw flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Serializes the graph as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize graph")
    }

    /// # Errors
    ///
    /// Returns an error if `json` is not a valid graph.
    pub fn from_json(json: &str) -> Result<Self> {
        let graph: Graph = serde_json::from_str(json).context("Failed to parse graph")?;
        graph.validate()?;
        Ok(graph)
    }

    /// Checks that ids are unique, positions are finite and every link
    /// points at a known node.
    fn validate(&self) -> Result<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            ensure_finite(node.pos)?;
            if node.id.0 >= self.next_id {
                bail!("Node {} is beyond the id counter", node.id);
            }
            if self.nodes[..i].iter().any(|n| n.id == node.id) {
                bail!("Duplicate node id {}", node.id);
            }
        }
        for link in &self.links {
            self.ensure_node(link.from)?;
            self.ensure_node(link.to)?;
        }
        Ok(())
    }

    fn index_of(&self, id: NodeId) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .with_context(|| format!("No node with id {id}"))
    }

    fn ensure_node(&self, id: NodeId) -> Result<()> {
        self.index_of(id).map(|_| ())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let index = self.index_of(id)?;
        Ok(&mut self.nodes[index])
    }
}

/// JSON has no encoding for NaN or infinity, so such a position could
/// never be restored from a snapshot.
fn ensure_finite(pos: [f32; 2]) -> Result<()> {
    if !pos.iter().all(|c| c.is_finite()) {
        bail!("Position ({}, {}) is not finite", pos[0], pos[1]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node("LoadImage", [0.0, 0.0]).unwrap();
        let b = graph.add_node("Sampler", [200.0, 0.0]).unwrap();
        (graph, a, b)
    }

    #[test]
    fn test_add_node_assigns_sequential_ids() {
        let (graph, a, b) = sample();
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.node(b).map(|n| n.title.as_str()), Some("Sampler"));
    }

    #[test]
    fn test_move_node() {
        let (mut graph, a, _) = sample();
        graph.move_node(a, [10.0, -5.0]).unwrap();
        assert_eq!(graph.node(a).unwrap().pos, [10.0, -5.0]);
    }

    #[test]
    fn test_move_unknown_node_fails() {
        let (mut graph, _, _) = sample();
        assert!(graph.move_node(NodeId(42), [1.0, 1.0]).is_err());
    }

    #[test]
    fn test_rename_node() {
        let (mut graph, a, _) = sample();
        graph.rename_node(a, "Input").unwrap();
        assert_eq!(graph.node(a).unwrap().title, "Input");
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (mut graph, a, b) = sample();
        graph.connect(a, b).unwrap();
        assert_eq!(graph.links(), &[Link { from: a, to: b }]);
        graph.disconnect(a, b).unwrap();
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_connect_rejects_self_duplicate_and_unknown() {
        let (mut graph, a, b) = sample();
        assert!(graph.connect(a, a).is_err());
        graph.connect(a, b).unwrap();
        assert!(graph.connect(a, b).is_err());
        assert!(graph.connect(a, NodeId(9)).is_err());
        assert_eq!(graph.links().len(), 1);
    }

    #[test]
    fn test_disconnect_missing_link_fails() {
        let (mut graph, a, b) = sample();
        assert!(graph.disconnect(a, b).is_err());
    }

    #[test]
    fn test_remove_node_requires_no_links() {
        let (mut graph, a, b) = sample();
        graph.connect(a, b).unwrap();
        assert!(graph.remove_node(a).is_err());
        graph.disconnect(a, b).unwrap();
        let removed = graph.remove_node(a).unwrap();
        assert_eq!(removed.id, a);
        assert!(graph.node(a).is_none());
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let (mut graph, _, b) = sample();
        graph.remove_node(b).unwrap();
        let c = graph.add_node("Preview", [0.0, 0.0]).unwrap();
        assert_eq!(c, NodeId(2));
    }

    #[test]
    fn test_json_round_trip_is_stable() {
        let (mut graph, a, b) = sample();
        graph.connect(a, b).unwrap();
        let json = graph.to_json().unwrap();
        let parsed = Graph::from_json(&json).unwrap();
        assert_eq!(parsed.to_json().unwrap(), json);
        assert_eq!(parsed.nodes(), graph.nodes());
    }

    #[test]
    fn test_dirty_flag_not_serialized() {
        let (mut graph, _, _) = sample();
        let before = graph.to_json().unwrap();
        graph.mark_dirty();
        assert_eq!(graph.to_json().unwrap(), before);
        assert!(graph.take_dirty());
        assert!(!graph.is_dirty());
    }

    #[test]
    fn test_from_json_rejects_dangling_link() {
        let json = r#"{"next_id":1,"nodes":[{"id":0,"kind":"A","title":"A","pos":[0.0,0.0]}],"links":[{"from":0,"to":5}]}"#;
        assert!(Graph::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_duplicate_ids() {
        let json = r#"{"next_id":2,"nodes":[{"id":1,"kind":"A","title":"A","pos":[0.0,0.0]},{"id":1,"kind":"B","title":"B","pos":[0.0,0.0]}],"links":[]}"#;
        assert!(Graph::from_json(json).is_err());
    }

    #[test]
    fn test_non_finite_positions_rejected() {
        let mut graph = Graph::new();
        assert!(graph.add_node("A", [f32::INFINITY, 0.0]).is_err());
        assert!(graph.add_node("A", [0.0, f32::NAN]).is_err());
        assert!(graph.is_empty());

        let a = graph.add_node("A", [f32::MAX, 0.0]).unwrap();
        assert!(graph.move_node(a, [f32::MAX, 0.0]).is_err());
        assert_eq!(graph.node(a).unwrap().pos, [f32::MAX, 0.0]);
        assert!(Graph::from_json(&graph.to_json().unwrap()).is_ok());
    }

    #[test]
    fn test_add_node_fails_when_ids_run_out() {
        let json = format!(r#"{{"next_id":{},"nodes":[],"links":[]}}"#, u64::MAX);
        let mut graph = Graph::from_json(&json).unwrap();
        assert!(graph.add_node("A", [0.0, 0.0]).is_err());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Graph::from_json("not json").is_err());
    }
}
