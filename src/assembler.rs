//! Sequence assembly.
//!
//! Flattens a token-level multitext into one sequence for a decoder model:
//! token ids, position ids, a 2D attention mask and per-token provenance.
//!
//! ## Attention
//!
//! A token attends every token of every ancestor of its vertex and the
//! earlier tokens of its own vertex. Vertices on different branches never
//! attend to each other, so one forward pass evaluates all variants.
//!
//! ## Positions
//!
//! | Method | Start of a vertex |
//! |--------|-------------------|
//! | `FullAlignment` | sum of the longest runs of all earlier slots in its component |
//! | `NoAlignment` | right after the parent it was first reached from |

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash;
use crate::multitext::MultiText;
use crate::types::{AncestralFingerprint, TokenId, TokenRun, VertexId};

/// How position ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositioningMethod {
    /// Every slot starts at the same position on all branches.
    FullAlignment,
    /// Every branch is numbered as if it were the only one.
    ///
    /// Every root starts at 0, including the shared singletons of the frugal
    /// layout. A vertex continues only from the parent it was first reached
    /// from, so positions along a path with several parents need not be
    /// contiguous.
    NoAlignment,
}

impl PositioningMethod {
    /// All methods.
    pub const ALL: [PositioningMethod; 2] = [Self::FullAlignment, Self::NoAlignment];

    /// Parse positioning method from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full_alignment" => Some(Self::FullAlignment),
            "no_alignment" => Some(Self::NoAlignment),
            _ => None,
        }
    }
}

impl Default for PositioningMethod {
    fn default() -> Self {
        Self::FullAlignment
    }
}

impl std::fmt::Display for PositioningMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullAlignment => write!(f, "full_alignment"),
            Self::NoAlignment => write!(f, "no_alignment"),
        }
    }
}

/// Where a token of the flattened sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenProvenance {
    /// Vertex holding the token.
    pub vertex: VertexId,
    /// Slot index of that vertex.
    pub position: usize,
    /// Ancestral fingerprint of that vertex.
    pub fingerprint: AncestralFingerprint,
}

/// Flattened model inputs.
///
/// All four sequences have one entry per token. `attention_mask[i][j]` is
/// true when token `i` may attend to token `j`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInputs {
    /// Token ids in emission order.
    pub input_ids: Vec<TokenId>,
    /// Position id of every token.
    pub position_ids: Vec<usize>,
    /// Row `i` lists which tokens token `i` attends.
    pub attention_mask: Vec<Vec<bool>>,
    /// Source vertex of every token.
    pub provenance: Vec<TokenProvenance>,
}

impl ModelInputs {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// True if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Indices attended by token `i`, ascending. Empty if `i` is out of range.
    pub fn attended_indices(&self, i: usize) -> Vec<usize> {
        self.attention_mask
            .get(i)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, attends)| **attends)
                    .map(|(j, _)| j)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tokens attended by token `i`, in slot order.
    ///
    /// This is the text the model conditions on at `i`, regardless of where
    /// the contributing vertices were emitted.
    pub fn attended_tokens(&self, i: usize) -> Vec<TokenId> {
        let mut indices = self.attended_indices(i);
        indices.sort_by_key(|j| (self.provenance[*j].position, *j));
        indices.into_iter().map(|j| self.input_ids[j]).collect()
    }

    /// Token indices of slot `position`, grouped by ancestral fingerprint.
    pub fn tokens_by_fingerprint(&self, position: usize) -> BTreeMap<AncestralFingerprint, Vec<usize>> {
        let mut groups: BTreeMap<AncestralFingerprint, Vec<usize>> = BTreeMap::new();
        for (i, origin) in self.provenance.iter().enumerate() {
            if origin.position == position {
                groups.entry(origin.fingerprint).or_default().push(i);
            }
        }
        groups
    }

    /// Canonical hash of all inputs.
    pub fn digest(&self) -> u64 {
        canonical_hash(self)
    }
}

/// Flatten `graph` into model inputs.
///
/// Roots are visited in arena order and each is expanded breadth first.
/// A vertex reachable from several roots is emitted once, on first sight.
pub fn prepare_inputs(graph: &MultiText<TokenRun>, positioning: PositioningMethod) -> ModelInputs {
    let roots = graph.roots();
    let (order, reached_from) = emission_order(graph, &roots);

    let starts = match positioning {
        PositioningMethod::FullAlignment => aligned_starts(graph, &roots),
        PositioningMethod::NoAlignment => chained_starts(graph, &order, &reached_from),
    };

    let mut inputs = ModelInputs::default();
    // First token index of every vertex in the flattened sequence.
    let mut offsets = vec![0usize; graph.len()];
    for &vertex in &order {
        offsets[vertex.index()] = inputs.len();
        let origin = TokenProvenance {
            vertex,
            position: graph.vertex(vertex).position(),
            fingerprint: graph.ancestral_fingerprint(vertex),
        };
        for (k, &token) in graph.component(vertex).iter().enumerate() {
            inputs.input_ids.push(token);
            inputs.position_ids.push(starts[vertex.index()] + k);
            inputs.provenance.push(origin);
        }
    }

    inputs.attention_mask = attention_mask(graph, &offsets, inputs.len());

    tracing::debug!(
        tokens = inputs.len(),
        vertices = graph.len(),
        roots = roots.len(),
        positioning = %positioning,
        "assembled model inputs"
    );
    inputs
}

/// Breadth-first emission order, plus the parent each vertex was first
/// reached from.
fn emission_order(
    graph: &MultiText<TokenRun>,
    roots: &[VertexId],
) -> (Vec<VertexId>, Vec<Option<VertexId>>) {
    let mut seen = vec![false; graph.len()];
    let mut reached_from = vec![None; graph.len()];
    let mut order = Vec::with_capacity(graph.len());

    for &root in roots {
        if seen[root.index()] {
            continue;
        }
        seen[root.index()] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &child in graph.vertex(current).children() {
                if !seen[child.index()] {
                    seen[child.index()] = true;
                    reached_from[child.index()] = Some(current);
                    queue.push_back(child);
                }
            }
        }
    }
    (order, reached_from)
}

fn aligned_starts(graph: &MultiText<TokenRun>, roots: &[VertexId]) -> Vec<usize> {
    let mut starts = vec![0usize; graph.len()];
    let mut done = vec![false; graph.len()];

    for &root in roots {
        if done[root.index()] {
            continue;
        }
        let component = graph.weakly_connected_component(root);

        let mut longest: BTreeMap<usize, usize> = BTreeMap::new();
        for &vertex in &component {
            let slot = longest.entry(graph.vertex(vertex).position()).or_default();
            *slot = (*slot).max(graph.component(vertex).len());
        }

        let mut offset = 0;
        let mut slot_start: BTreeMap<usize, usize> = BTreeMap::new();
        for (position, width) in longest {
            slot_start.insert(position, offset);
            offset += width;
        }

        for vertex in component {
            starts[vertex.index()] = slot_start[&graph.vertex(vertex).position()];
            done[vertex.index()] = true;
        }
    }
    starts
}

fn chained_starts(
    graph: &MultiText<TokenRun>,
    order: &[VertexId],
    reached_from: &[Option<VertexId>],
) -> Vec<usize> {
    let mut starts = vec![0usize; graph.len()];
    // Parents are always emitted before the children they reach.
    for &vertex in order {
        if let Some(parent) = reached_from[vertex.index()] {
            starts[vertex.index()] = starts[parent.index()] + graph.component(parent).len();
        }
    }
    starts
}

fn attention_mask(graph: &MultiText<TokenRun>, offsets: &[usize], total: usize) -> Vec<Vec<bool>> {
    let mut rows = vec![Vec::new(); total];
    // Context handed through vertices without tokens. Any other vertex
    // exposes its last row.
    let mut forwarded: BTreeMap<VertexId, Vec<bool>> = BTreeMap::new();

    for vertex in graph.topological_order() {
        let mut context = vec![false; total];
        for &parent in graph.vertex(vertex).parents() {
            let len = graph.component(parent).len();
            let visible = if len == 0 {
                forwarded.get(&parent)
            } else {
                rows.get(offsets[parent.index()] + len - 1)
            };
            for (seen, &v) in context.iter_mut().zip(visible.into_iter().flatten()) {
                *seen |= v;
            }
        }

        let run = graph.component(vertex).len();
        if run == 0 {
            forwarded.insert(vertex, context);
            continue;
        }
        let start = offsets[vertex.index()];
        for k in 0..run {
            context[start + k] = true;
            rows[start + k] = context.clone();
        }
    }
    rows
}
