//! DAG construction from ordered fragment slots.
//!
//! Three strategies trade vertex sharing against explicitness. All of them
//! realize the same multiset of leaf strings.
//!
//! | Mode | Sharing |
//! |------|---------|
//! | `Full` | none: one disjoint chain per combination |
//! | `Standard` | shared prefixes: a branching tree |
//! | `Frugal` | shared prefixes plus singletons between branch points |

use serde::{Deserialize, Serialize};

use crate::multitext::{GraphError, MultiText};
use crate::types::{parse_slots, Slot};

/// Error type for DAG construction.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A slot holds no fragment.
    #[error("Slot {slot} has no alternatives")]
    InvalidSlot {
        /// Index of the offending slot.
        slot: usize,
    },
    /// Slot list could not be parsed.
    #[error("Malformed slot list: {0}")]
    Parse(#[from] serde_json::Error),
    /// The generated layout violated a graph invariant.
    #[error("Graph construction failed: {0}")]
    Graph(#[from] GraphError),
}

/// Strategy used to turn slots into a DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildMode {
    /// Every combination as an independent chain.
    Full,
    /// Branching tree over the alternatives.
    Standard,
    /// Branching tree that builds singletons between branch points once.
    Frugal,
}

impl BuildMode {
    /// All modes, from most to least explicit.
    pub const ALL: [BuildMode; 3] = [Self::Full, Self::Standard, Self::Frugal];

    /// Parse build mode from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "standard" => Some(Self::Standard),
            "frugal" => Some(Self::Frugal),
            _ => None,
        }
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::Standard
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Standard => write!(f, "standard"),
            Self::Frugal => write!(f, "frugal"),
        }
    }
}

/// Vertex elements and parent lists collected before validation.
#[derive(Debug, Default)]
struct Layout {
    elements: Vec<(String, usize)>,
    parents: Vec<Vec<usize>>,
}

impl Layout {
    fn push(&mut self, text: &str, position: usize, parents: Vec<usize>) -> usize {
        self.elements.push((text.to_string(), position));
        self.parents.push(parents);
        self.elements.len() - 1
    }

    fn finish(self) -> Result<MultiText<String>, GraphError> {
        MultiText::from_vertex_elements(self.elements, self.parents)
    }
}

/// Build a text-level multitext from ordered slots.
///
/// # Errors
/// Returns [`BuildError::InvalidSlot`] if a slot has no alternatives.
pub fn build_multitext(mode: BuildMode, slots: &[Slot]) -> Result<MultiText<String>, BuildError> {
    if let Some(slot) = slots.iter().position(Slot::is_empty) {
        return Err(BuildError::InvalidSlot { slot });
    }

    let graph = match mode {
        BuildMode::Full => build_full(slots)?,
        BuildMode::Standard => build_standard(slots)?,
        BuildMode::Frugal => build_frugal(slots)?,
    };

    tracing::debug!(
        mode = %mode,
        slots = slots.len(),
        vertices = graph.len(),
        leaves = graph.leaves().len(),
        "built multitext"
    );
    Ok(graph)
}

/// Build a text-level multitext from a JSON slot list.
pub fn build_multitext_from_json(mode: BuildMode, json: &str) -> Result<MultiText<String>, BuildError> {
    let slots = parse_slots(json)?;
    build_multitext(mode, &slots)
}

/// Cartesian product of the slots, rightmost slot varying fastest.
fn combinations(slots: &[Slot]) -> Vec<Vec<&str>> {
    let mut result = Vec::new();
    let mut indices = vec![0usize; slots.len()];
    loop {
        result.push(
            slots
                .iter()
                .zip(&indices)
                .map(|(slot, &i)| slot.options()[i].as_str())
                .collect(),
        );

        // Advance the odometer.
        let mut digit = slots.len();
        loop {
            if digit == 0 {
                return result;
            }
            digit -= 1;
            indices[digit] += 1;
            if indices[digit] < slots[digit].len() {
                break;
            }
            indices[digit] = 0;
        }
    }
}

fn build_full(slots: &[Slot]) -> Result<MultiText<String>, GraphError> {
    let mut graph = MultiText::new();
    for combination in combinations(slots) {
        let mut chain = Layout::default();
        let mut previous: Option<usize> = None;
        for (position, text) in combination.into_iter().enumerate() {
            previous = Some(chain.push(text, position, previous.into_iter().collect()));
        }
        graph = graph.union(chain.finish()?);
    }
    Ok(graph)
}

/// Append one vertex per (open vertex, option) pair.
///
/// `shared` is added as an extra parent of every new vertex. With no open
/// vertices the new vertices hang off `shared` alone (or become roots).
fn expand(
    layout: &mut Layout,
    open: &[usize],
    shared: Option<usize>,
    position: usize,
    slot: &Slot,
) -> Vec<usize> {
    let anchors: Vec<Option<usize>> = if open.is_empty() {
        vec![None]
    } else {
        open.iter().copied().map(Some).collect()
    };

    let mut next = Vec::with_capacity(anchors.len() * slot.len());
    for anchor in anchors {
        for text in slot.options() {
            let parents = shared.into_iter().chain(anchor).collect();
            next.push(layout.push(text, position, parents));
        }
    }
    next
}

fn build_standard(slots: &[Slot]) -> Result<MultiText<String>, GraphError> {
    let mut layout = Layout::default();
    let mut open: Vec<usize> = Vec::new();
    for (position, slot) in slots.iter().enumerate() {
        open = expand(&mut layout, &open, None, position, slot);
    }
    layout.finish()
}

fn build_frugal(slots: &[Slot]) -> Result<MultiText<String>, GraphError> {
    let last_branch = slots.iter().rposition(|s| !s.is_singleton());

    let mut layout = Layout::default();
    // Open vertices of the nearest branching slot, or ends of trailing chains.
    let mut open: Vec<usize> = Vec::new();
    // Shared singleton at the previous slot.
    let mut shared: Option<usize> = None;

    for (position, slot) in slots.iter().enumerate() {
        match last_branch {
            Some(last) if position < last && slot.is_singleton() => {
                let parents = shared.into_iter().collect();
                shared = Some(layout.push(&slot.options()[0], position, parents));
            }
            _ => {
                open = expand(&mut layout, &open, shared.take(), position, slot);
            }
        }
    }
    layout.finish()
}
