//! The multitext graph.
//!
//! A `MultiText` is a DAG of text (or token) fragments where every vertex also
//! records the slot it occupies. Each leaf's ancestry, sorted by slot, is one
//! realized variant of the text.
//!
//! ## Representation
//!
//! Vertices live in an arena addressed by [`VertexId`]; parent and child
//! relations are handle lists. All traversals are iterative.
//!
//! ## Invariants
//!
//! Enforced by [`MultiText::from_vertex_elements`]:
//!
//! 1. The graph is acyclic.
//! 2. The ancestry of any vertex holds at most one vertex per position.
//!
//! Every other constructor either goes through it or preserves both
//! invariants structurally (copies and disjoint unions).

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::types::{AncestralFingerprint, Component, Edge, Vertex, VertexId};

/// Error type for graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Element and parent lists differ in length.
    #[error("Expected {expected} parent lists, got {actual}")]
    LengthMismatch {
        /// Number of vertex elements.
        expected: usize,
        /// Number of parent lists.
        actual: usize,
    },
    /// A parent index does not name a vertex.
    #[error("Vertex {vertex} references unknown parent index {parent}")]
    UnknownParent {
        /// Child vertex.
        vertex: VertexId,
        /// Offending parent index.
        parent: usize,
    },
    /// A vertex lists itself as parent.
    #[error("Vertex {0} is its own parent")]
    SelfLoop(VertexId),
    /// The same arc was given twice.
    #[error("Duplicate arc {0}")]
    DuplicateArc(Edge),
    /// The arcs form a cycle.
    #[error("Cycle detected through vertex {0}")]
    Cycle(VertexId),
    /// Two ancestors of a vertex occupy the same slot.
    #[error("Ancestry of {vertex} holds more than one vertex at position {position}")]
    DuplicatePosition {
        /// Vertex whose ancestry is invalid.
        vertex: VertexId,
        /// Position occupied twice.
        position: usize,
    },
    /// A component map has no entry for a vertex.
    #[error("No component supplied for vertex {0}")]
    MissingComponent(VertexId),
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// DAG of fragments sharing common parts.
///
/// Generic over the vertex payload: `MultiText<String>` is the text-level
/// graph produced by the builder, `MultiText<TokenRun>` the token-level graph
/// produced by the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiText<C> {
    vertices: Vec<Vertex<C>>,
    edges: Vec<Edge>,
}

impl<C> Default for MultiText<C> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<C> MultiText<C> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from vertex elements and per-vertex parent indices.
    ///
    /// # Arguments
    /// * `elements` - `(component, position)` for each vertex, in arena order
    /// * `parent_indices` - for each element, the indices of its parents
    ///
    /// # Errors
    /// Fails if the lists differ in length, an index is out of range, an arc
    /// is a self loop or a duplicate, the arcs form a cycle, or some ancestry
    /// holds two vertices at the same position.
    pub fn from_vertex_elements(
        elements: Vec<(C, usize)>,
        parent_indices: Vec<Vec<usize>>,
    ) -> Result<Self, GraphError> {
        if elements.len() != parent_indices.len() {
            return Err(GraphError::LengthMismatch {
                expected: elements.len(),
                actual: parent_indices.len(),
            });
        }

        let n = elements.len();
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for (child, parents) in parent_indices.iter().enumerate() {
            for &parent in parents {
                if parent >= n {
                    return Err(GraphError::UnknownParent {
                        vertex: VertexId::new(child),
                        parent,
                    });
                }
                if parent == child {
                    return Err(GraphError::SelfLoop(VertexId::new(child)));
                }
                let edge = Edge::new(VertexId::new(parent), VertexId::new(child));
                if !seen.insert(edge) {
                    return Err(GraphError::DuplicateArc(edge));
                }
                edges.push(edge);
            }
        }

        let vertices = elements
            .into_iter()
            .map(|(component, position)| Vertex::new(component, position))
            .collect();

        let graph = Self::link(vertices, edges);
        graph.validate()?;

        tracing::trace!(
            vertices = graph.vertices.len(),
            edges = graph.edges.len(),
            "multitext constructed"
        );
        Ok(graph)
    }

    fn link(mut vertices: Vec<Vertex<C>>, edges: Vec<Edge>) -> Self {
        for edge in &edges {
            vertices[edge.parent.index()].children.push(edge.child);
            vertices[edge.child.index()].parents.push(edge.parent);
        }
        Self { vertices, edges }
    }

    fn validate(&self) -> Result<(), GraphError> {
        self.try_topological_order()?;

        for id in self.vertex_ids() {
            let mut positions = HashSet::new();
            for ancestor in self.ancestry(id, true) {
                let position = self.vertex(ancestor).position;
                if !positions.insert(position) {
                    return Err(GraphError::DuplicatePosition { vertex: id, position });
                }
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// True if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get a vertex by handle.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this graph.
    pub fn vertex(&self, id: VertexId) -> &Vertex<C> {
        &self.vertices[id.index()]
    }

    /// Get a vertex by handle, if it exists.
    pub fn get(&self, id: VertexId) -> Option<&Vertex<C>> {
        self.vertices.get(id.index())
    }

    /// Component of a vertex.
    pub fn component(&self, id: VertexId) -> &C {
        &self.vertex(id).component
    }

    /// All vertex handles in arena order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// All vertices with their handles, in arena order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex<C>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// All arcs, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Components at both ends of every arc.
    pub fn arc_components(&self) -> impl Iterator<Item = (&C, &C)> + '_ {
        self.edges
            .iter()
            .map(|e| (self.component(e.parent), self.component(e.child)))
    }

    /// Vertices without parents, in arena order.
    pub fn roots(&self) -> Vec<VertexId> {
        self.vertices().filter(|(_, v)| v.is_root()).map(|(id, _)| id).collect()
    }

    /// Vertices without children, in arena order.
    pub fn leaves(&self) -> Vec<VertexId> {
        self.vertices().filter(|(_, v)| v.is_leaf()).map(|(id, _)| id).collect()
    }

    /// Highest slot index used by any vertex.
    pub fn max_position(&self) -> Option<usize> {
        self.vertices.iter().map(|v| v.position).max()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Traversals
    // ─────────────────────────────────────────────────────────────────────

    fn neighbours(&self, id: VertexId, direction: Direction) -> &[VertexId] {
        let vertex = self.vertex(id);
        match direction {
            Direction::Up => &vertex.parents,
            Direction::Down => &vertex.children,
        }
    }

    /// Post-order walk: every vertex comes after all the vertices it was
    /// reached through, matching recursive discovery order.
    fn walk(&self, start: VertexId, include_self: bool, direction: Direction) -> Vec<VertexId> {
        let mut result = Vec::new();
        let mut seen = HashSet::from([start]);
        let mut stack = vec![(start, 0usize)];

        while let Some(frame) = stack.last_mut() {
            let (current, next) = *frame;
            let neighbours = self.neighbours(current, direction);
            if next < neighbours.len() {
                frame.1 += 1;
                let neighbour = neighbours[next];
                if seen.insert(neighbour) {
                    stack.push((neighbour, 0));
                }
            } else {
                stack.pop();
                if current != start || include_self {
                    result.push(current);
                }
            }
        }
        result
    }

    /// All ancestors of `id` in discovery order, each once.
    pub fn ancestry(&self, id: VertexId, include_self: bool) -> Vec<VertexId> {
        self.walk(id, include_self, Direction::Up)
    }

    /// All descendants of `id` in discovery order, each once.
    pub fn descendants(&self, id: VertexId, include_self: bool) -> Vec<VertexId> {
        self.walk(id, include_self, Direction::Down)
    }

    /// Ancestry of `id` (itself included) sorted by position.
    pub fn sorted_ancestry(&self, id: VertexId) -> Vec<VertexId> {
        let mut ancestry = self.ancestry(id, true);
        ancestry.sort_by_key(|a| self.vertex(*a).position);
        ancestry
    }

    /// Children of any parent of `id`, excluding `id`, each once.
    pub fn siblings(&self, id: VertexId) -> Vec<VertexId> {
        let mut seen = HashSet::from([id]);
        let mut result = Vec::new();
        for &parent in &self.vertex(id).parents {
            for &child in &self.vertex(parent).children {
                if seen.insert(child) {
                    result.push(child);
                }
            }
        }
        result
    }

    /// Every vertex reachable from `id` ignoring arc direction, breadth first.
    pub fn weakly_connected_component(&self, id: VertexId) -> Vec<VertexId> {
        let mut visited = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            result.push(current);
            let vertex = self.vertex(current);
            for &next in vertex.children.iter().chain(vertex.parents.iter()) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        result
    }

    fn try_topological_order(&self) -> Result<Vec<VertexId>, GraphError> {
        let mut in_degree: Vec<usize> = self.vertices.iter().map(|v| v.parents.len()).collect();
        let mut queue: VecDeque<VertexId> = self.roots().into();
        let mut order = Vec::with_capacity(self.vertices.len());

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &child in &self.vertex(current).children {
                in_degree[child.index()] -= 1;
                if in_degree[child.index()] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if order.len() < self.vertices.len() {
            let stuck = in_degree
                .iter()
                .position(|d| *d > 0)
                .map(VertexId::new)
                .unwrap_or(VertexId::new(0));
            return Err(GraphError::Cycle(stuck));
        }
        Ok(order)
    }

    /// Vertices ordered so every parent precedes its children.
    ///
    /// Roots come first in arena order; ties are broken breadth first.
    pub fn topological_order(&self) -> Vec<VertexId> {
        // Acyclicity is checked at construction.
        self.try_topological_order().unwrap_or_default()
    }

    /// Lazy iterator over the position-sorted ancestry of every leaf.
    ///
    /// Leaves are visited in arena order. The iterator can be cloned, and
    /// each call starts over.
    pub fn leaf_ancestries(&self) -> LeafAncestries<'_, C> {
        LeafAncestries {
            graph: self,
            leaves: self.leaves().into_iter(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Structural classification
    // ─────────────────────────────────────────────────────────────────────

    /// True if no arc goes from a position to the same or an earlier one.
    pub fn is_causal(&self) -> bool {
        self.edges
            .iter()
            .all(|e| self.vertex(e.parent).position < self.vertex(e.child).position)
    }

    /// True if there is at most one directed path between any two vertices.
    pub fn is_multitree(&self) -> bool {
        let order = self.topological_order();
        let mut rank = vec![0usize; self.vertices.len()];
        for (i, id) in order.iter().enumerate() {
            rank[id.index()] = i;
        }

        for source in self.vertex_ids() {
            let mut paths = vec![0u8; self.vertices.len()];
            paths[source.index()] = 1;
            for &current in &order[rank[source.index()]..] {
                let count = paths[current.index()];
                if count == 0 {
                    continue;
                }
                for &child in &self.vertex(current).children {
                    let slot = &mut paths[child.index()];
                    *slot = slot.saturating_add(count).min(2);
                    if *slot > 1 {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// True if the graph has exactly one root and no vertex has more than
    /// one parent.
    pub fn is_tree(&self) -> bool {
        self.roots().len() == 1 && self.vertices.iter().all(|v| v.parents.len() <= 1)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Structural copies
    // ─────────────────────────────────────────────────────────────────────

    /// Copy the topology, computing each new component from the old one.
    ///
    /// Vertex handles are preserved.
    pub fn map_components<U, F>(&self, mut f: F) -> MultiText<U>
    where
        F: FnMut(VertexId, &C) -> U,
    {
        let vertices = self
            .vertices()
            .map(|(id, v)| Vertex {
                component: f(id, &v.component),
                position: v.position,
                parents: v.parents.clone(),
                children: v.children.clone(),
            })
            .collect();
        MultiText {
            vertices,
            edges: self.edges.clone(),
        }
    }

    /// Copy the topology, replacing every component from `map`.
    ///
    /// Use `clone()` to copy with the existing components.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingComponent`] if `map` lacks a vertex.
    pub fn copy_with_component_map<U>(
        &self,
        mut map: BTreeMap<VertexId, U>,
    ) -> Result<MultiText<U>, GraphError> {
        let mut components = Vec::with_capacity(self.vertices.len());
        for id in self.vertex_ids() {
            components.push(map.remove(&id).ok_or(GraphError::MissingComponent(id))?);
        }
        let vertices = self
            .vertices
            .iter()
            .zip(components)
            .map(|(v, component)| Vertex {
                component,
                position: v.position,
                parents: v.parents.clone(),
                children: v.children.clone(),
            })
            .collect();
        Ok(MultiText {
            vertices,
            edges: self.edges.clone(),
        })
    }

    /// Disjoint union: `other`'s vertices are appended after this graph's.
    pub fn union(mut self, other: MultiText<C>) -> MultiText<C> {
        let offset = self.vertices.len();
        let shift = |id: &VertexId| VertexId::new(id.index() + offset);

        self.vertices.extend(other.vertices.into_iter().map(|v| Vertex {
            component: v.component,
            position: v.position,
            parents: v.parents.iter().map(shift).collect(),
            children: v.children.iter().map(shift).collect(),
        }));
        self.edges
            .extend(other.edges.iter().map(|e| e.shifted(offset)));
        self
    }
}

impl<C: Component> MultiText<C> {
    /// Fingerprint of the realized history up to and including `id`.
    pub fn ancestral_fingerprint(&self, id: VertexId) -> AncestralFingerprint {
        let ancestry = self.sorted_ancestry(id);
        AncestralFingerprint::from_components(ancestry.iter().map(|a| self.component(*a)))
    }

    /// Concatenate the components of `ancestry` in the given order.
    pub fn realize(&self, ancestry: &[VertexId]) -> C {
        let mut realized = C::default();
        for id in ancestry {
            realized.append(self.component(*id));
        }
        realized
    }

    /// The realized variant of every leaf, in leaf order.
    pub fn realized_leaves(&self) -> Vec<C> {
        self.leaf_ancestries()
            .map(|ancestry| self.realize(&ancestry))
            .collect()
    }
}

/// Iterator returned by [`MultiText::leaf_ancestries`].
pub struct LeafAncestries<'a, C> {
    graph: &'a MultiText<C>,
    leaves: std::vec::IntoIter<VertexId>,
}

impl<C> Clone for LeafAncestries<'_, C> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            leaves: self.leaves.clone(),
        }
    }
}

impl<C> Iterator for LeafAncestries<'_, C> {
    type Item = Vec<VertexId>;

    fn next(&mut self) -> Option<Self::Item> {
        self.leaves.next().map(|leaf| self.graph.sorted_ancestry(leaf))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.leaves.size_hint()
    }
}

impl<C> ExactSizeIterator for LeafAncestries<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn text(elements: &[(&str, usize)], parents: Vec<Vec<usize>>) -> MultiText<String> {
        MultiText::from_vertex_elements(
            elements.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            parents,
        )
        .unwrap()
    }

    /// "A " -> {x, y} -> " B" as a tree (the standard layout).
    fn standard_sample() -> MultiText<String> {
        text(
            &[("A ", 0), ("x", 1), ("y", 1), (" B", 2), (" B", 2)],
            vec![vec![], vec![0], vec![0], vec![1], vec![2]],
        )
    }

    /// Shared singleton "m" between two branch points feeding every branch.
    fn frugal_sample() -> MultiText<String> {
        //  s0 -> a1 -\
        //     \> b1 --+-> (c3 | d3) per branch
        //        m2 -/
        text(
            &[("s", 0), ("a", 1), ("b", 1), ("m", 2), ("c", 3), ("d", 3), ("c", 3), ("d", 3)],
            vec![
                vec![],
                vec![0],
                vec![0],
                vec![],
                vec![3, 1],
                vec![3, 1],
                vec![3, 2],
                vec![3, 2],
            ],
        )
    }

    #[test]
    fn test_roots_and_leaves() {
        let graph = standard_sample();
        assert_eq!(graph.roots(), vec![id(0)]);
        assert_eq!(graph.leaves(), vec![id(3), id(4)]);
        assert_eq!(graph.max_position(), Some(2));
    }

    #[test]
    fn test_ancestry_discovery_order() {
        let graph = standard_sample();
        assert_eq!(graph.ancestry(id(3), false), vec![id(0), id(1)]);
        assert_eq!(graph.ancestry(id(3), true), vec![id(0), id(1), id(3)]);
        assert!(graph.ancestry(id(0), false).is_empty());
    }

    #[test]
    fn test_ancestry_with_multiple_parents() {
        let graph = frugal_sample();
        let ancestry = graph.ancestry(id(4), true);
        assert_eq!(ancestry.len(), 4);
        assert_eq!(graph.sorted_ancestry(id(4)), vec![id(0), id(1), id(3), id(4)]);
    }

    #[test]
    fn test_descendants() {
        let graph = standard_sample();
        let mut descendants = graph.descendants(id(0), false);
        descendants.sort();
        assert_eq!(descendants, vec![id(1), id(2), id(3), id(4)]);
        assert_eq!(graph.descendants(id(1), true), vec![id(3), id(1)]);
    }

    #[test]
    fn test_siblings() {
        let graph = standard_sample();
        assert_eq!(graph.siblings(id(1)), vec![id(2)]);
        assert!(graph.siblings(id(0)).is_empty());
        assert!(graph.siblings(id(3)).is_empty());

        // Siblings through either parent of a shared-singleton child.
        let graph = frugal_sample();
        assert_eq!(graph.siblings(id(4)), vec![id(5), id(6), id(7)]);
    }

    #[test]
    fn test_weakly_connected_component() {
        let graph = frugal_sample();
        let component = graph.weakly_connected_component(id(3));
        assert_eq!(component.len(), graph.len());
        assert_eq!(component[0], id(3));

        let disjoint = text(&[("a", 0), ("b", 0)], vec![vec![], vec![]]);
        assert_eq!(disjoint.weakly_connected_component(id(1)), vec![id(1)]);
    }

    #[test]
    fn test_leaf_ancestries_are_sorted_and_restartable() {
        let graph = frugal_sample();
        let ancestries = graph.leaf_ancestries();
        assert_eq!(ancestries.len(), 4);

        let again = ancestries.clone();
        let first: Vec<_> = ancestries.collect();
        let second: Vec<_> = again.collect();
        assert_eq!(first, second);

        for ancestry in &first {
            let positions: Vec<_> = ancestry.iter().map(|a| graph.vertex(*a).position()).collect();
            assert_eq!(positions, vec![0, 1, 2, 3]);
        }
        assert_eq!(graph.realized_leaves(), vec!["samc", "samd", "sbmc", "sbmd"]);
    }

    #[test]
    fn test_fingerprint_tracks_realized_prefix() {
        let graph = standard_sample();
        // Same text " B" but different histories.
        assert_ne!(graph.ancestral_fingerprint(id(3)), graph.ancestral_fingerprint(id(4)));

        // Same history split differently.
        let split = text(&[("A", 0), (" x", 1), (" B", 2)], vec![vec![], vec![0], vec![1]]);
        assert_eq!(
            split.ancestral_fingerprint(id(2)),
            graph.ancestral_fingerprint(id(3))
        );
    }

    #[test]
    fn test_fingerprint_stable_under_copy() {
        let graph = frugal_sample();
        let map: BTreeMap<_, _> = graph
            .vertices()
            .map(|(id, v)| (id, v.component().clone()))
            .collect();
        let copy = graph.copy_with_component_map(map).unwrap();
        for id in graph.vertex_ids() {
            assert_eq!(graph.ancestral_fingerprint(id), copy.ancestral_fingerprint(id));
        }
        assert_eq!(copy, graph);
    }

    #[test]
    fn test_copy_with_missing_component() {
        let graph = standard_sample();
        let map: BTreeMap<VertexId, Vec<u32>> = BTreeMap::from([(id(0), vec![1])]);
        assert_eq!(
            graph.copy_with_component_map(map),
            Err(GraphError::MissingComponent(id(1)))
        );
    }

    #[test]
    fn test_map_components_keeps_topology() {
        let graph = standard_sample();
        let lengths = graph.map_components(|_, c| c.len());
        assert_eq!(lengths.edges(), graph.edges());
        assert_eq!(*lengths.component(id(0)), 2);
        assert_eq!(lengths.vertex(id(3)).parents(), &[id(1)]);
    }

    #[test]
    fn test_union_shifts_handles() {
        let a = text(&[("a", 0), ("b", 1)], vec![vec![], vec![0]]);
        let b = text(&[("c", 0), ("d", 1)], vec![vec![], vec![0]]);
        let joined = a.union(b);
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.roots(), vec![id(0), id(2)]);
        assert_eq!(joined.vertex(id(3)).parents(), &[id(2)]);
        assert_eq!(joined.edges()[1], Edge::new(id(2), id(3)));
        assert_eq!(joined.realized_leaves(), vec!["ab", "cd"]);
    }

    #[test]
    fn test_rejects_cycle() {
        let result = MultiText::from_vertex_elements(
            vec![("a".to_string(), 0), ("b".to_string(), 1)],
            vec![vec![1], vec![0]],
        );
        assert!(matches!(result, Err(GraphError::Cycle(_))));
    }

    #[test]
    fn test_rejects_duplicate_position_in_ancestry() {
        let result = MultiText::from_vertex_elements(
            vec![("a".to_string(), 0), ("b".to_string(), 0)],
            vec![vec![], vec![0]],
        );
        assert_eq!(
            result,
            Err(GraphError::DuplicatePosition { vertex: id(1), position: 0 })
        );
    }

    #[test]
    fn test_rejects_malformed_parent_lists() {
        let elements = || vec![("a".to_string(), 0), ("b".to_string(), 1)];
        assert!(matches!(
            MultiText::from_vertex_elements(elements(), vec![vec![]]),
            Err(GraphError::LengthMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            MultiText::from_vertex_elements(elements(), vec![vec![], vec![5]]),
            Err(GraphError::UnknownParent { parent: 5, .. })
        ));
        assert!(matches!(
            MultiText::from_vertex_elements(elements(), vec![vec![0], vec![]]),
            Err(GraphError::SelfLoop(_))
        ));
        assert!(matches!(
            MultiText::from_vertex_elements(elements(), vec![vec![], vec![0, 0]]),
            Err(GraphError::DuplicateArc(_))
        ));
    }

    #[test]
    fn test_classification() {
        let standard = standard_sample();
        assert!(standard.is_causal());
        assert!(standard.is_tree());
        assert!(standard.is_multitree());

        let frugal = frugal_sample();
        assert!(frugal.is_causal());
        assert!(!frugal.is_tree());
        assert!(frugal.is_multitree());

        // Diamond: two paths from the root to the bottom.
        let diamond = text(
            &[("a", 0), ("b", 1), ("c", 2), ("d", 3)],
            vec![vec![], vec![0], vec![0], vec![1, 2]],
        );
        assert!(!diamond.is_multitree());

        // Arc from a later slot to an earlier one.
        let backwards = text(&[("late", 1), ("early", 0)], vec![vec![], vec![0]]);
        assert!(!backwards.is_causal());
    }

    #[test]
    fn test_topological_order_puts_parents_first() {
        let graph = frugal_sample();
        let order = graph.topological_order();
        assert_eq!(order.len(), graph.len());
        let rank: BTreeMap<_, _> = order.iter().enumerate().map(|(i, v)| (*v, i)).collect();
        for edge in graph.edges() {
            assert!(rank[&edge.parent] < rank[&edge.child]);
        }
    }

    #[test]
    fn test_arc_components() {
        let graph = standard_sample();
        let arcs: Vec<_> = graph.arc_components().collect();
        assert_eq!(arcs[0], (&"A ".to_string(), &"x".to_string()));
        assert_eq!(arcs.len(), 4);
    }
}
