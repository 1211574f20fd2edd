//! Token merge engine.
//!
//! Projects a text-level multitext onto tokenizer output. Every leaf ancestry
//! is tokenized as one string; tokens are attributed back to the vertices
//! their characters came from, and the per-leaf attributions are reconciled
//! into a single token run per vertex.
//!
//! ## Reconciliation
//!
//! A tokenizer may merge the tail of a shared fragment with the head of the
//! next fragment in one branch but not in another. The engine keeps the
//! shortest observed run for the shared vertex and moves the surplus tokens
//! to the front of the following vertex, where they belong in the branch
//! that produced them.
//!
//! Leaves are processed sequentially in leaf order; later leaves are
//! reconciled against the runs fixed by earlier ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::multitext::{GraphError, MultiText};
use crate::tokenizer::Tokenizer;
use crate::types::{TokenId, TokenRun, VertexId};

/// Error type for the merge engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A token spans disconnected vertices that have alternatives.
    #[error("Token {token} of leaf {leaf} spans vertices {vertices:?} that cannot be attributed")]
    UnresolvableTokenSpan {
        /// Leaf whose ancestry was being tokenized.
        leaf: VertexId,
        /// Token index in the leaf's encoding.
        token: usize,
        /// Vertices touched by the token, in position order.
        vertices: Vec<VertexId>,
    },
    /// A token without characters somewhere other than the first position.
    #[error("Token {token} of leaf {leaf} covers no characters")]
    UnsupportedEmptyToken {
        /// Leaf whose ancestry was being tokenized.
        leaf: VertexId,
        /// Token index in the leaf's encoding.
        token: usize,
    },
    /// A token span points outside the tokenized string.
    #[error("Token {token} of leaf {leaf} spans {start}..{end}, string has {len} characters")]
    SpanOutOfRange {
        /// Leaf whose ancestry was being tokenized.
        leaf: VertexId,
        /// Token index in the leaf's encoding.
        token: usize,
        /// Span start.
        start: usize,
        /// Span end (exclusive).
        end: usize,
        /// Number of characters in the string.
        len: usize,
    },
    /// Two branches produced equally long but different runs.
    #[error("Branches tokenized vertex {vertex} differently: {existing:?} vs {incoming:?}")]
    TokenizationDisagreement {
        /// Vertex in disagreement.
        vertex: VertexId,
        /// Run fixed by earlier leaves.
        existing: TokenRun,
        /// Run produced by the current leaf.
        incoming: TokenRun,
    },
    /// Two branches produced runs where neither is a prefix of the other.
    #[error("Branches tokenized vertex {vertex} incompatibly: {existing:?} vs {incoming:?}")]
    NonPrefixDisagreement {
        /// Vertex in disagreement.
        vertex: VertexId,
        /// Run fixed by earlier leaves.
        existing: TokenRun,
        /// Run produced by the current leaf.
        incoming: TokenRun,
    },
    /// Surplus tokens have nowhere to go.
    #[error("Vertex {vertex} has no successor to take surplus tokens {surplus:?}")]
    MissingSuccessor {
        /// Vertex whose surplus could not be relocated.
        vertex: VertexId,
        /// The surplus tokens.
        surplus: TokenRun,
    },
    /// The token-level copy could not be built.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Statistics of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Leaf ancestries tokenized.
    pub leaves: usize,
    /// Tokens in the resulting graph.
    pub tokens: usize,
    /// Reconciliations that moved surplus tokens to a successor.
    pub relocations: usize,
}

/// Token merge engine bound to a tokenizer.
pub struct TokenMerger<'t, T: Tokenizer + ?Sized> {
    tokenizer: &'t T,
}

impl<'t, T: Tokenizer + ?Sized> TokenMerger<'t, T> {
    /// Create a merger for `tokenizer`.
    pub fn new(tokenizer: &'t T) -> Self {
        Self { tokenizer }
    }

    /// Tokenize `graph` into a token-level graph of the same topology.
    pub fn merge(&self, graph: &MultiText<String>) -> Result<MultiText<TokenRun>, MergeError> {
        self.merge_with_report(graph).map(|(tokens, _)| tokens)
    }

    /// Tokenize `graph`, also returning merge statistics.
    pub fn merge_with_report(
        &self,
        graph: &MultiText<String>,
    ) -> Result<(MultiText<TokenRun>, MergeReport), MergeError> {
        let mut assigned: BTreeMap<VertexId, TokenRun> = BTreeMap::new();
        // Distinct successors of each vertex across already merged leaves.
        let mut successors: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();
        let mut report = MergeReport::default();

        for (leaf, ancestry) in graph.leaves().into_iter().zip(graph.leaf_ancestries()) {
            let mut pending = self.attribute(graph, leaf, &ancestry)?;
            report.relocations +=
                reconcile(&ancestry, &mut pending, &mut assigned, &successors)?;

            for pair in ancestry.windows(2) {
                let next = successors.entry(pair[0]).or_default();
                if !next.contains(&pair[1]) {
                    next.push(pair[1]);
                }
            }
            report.leaves += 1;
        }

        // Vertices no token touched (e.g. empty fragments) hold no tokens.
        for id in graph.vertex_ids() {
            assigned.entry(id).or_default();
        }
        report.tokens = assigned.values().map(Vec::len).sum();

        tracing::debug!(
            leaves = report.leaves,
            tokens = report.tokens,
            relocations = report.relocations,
            "merged leaf tokenizations"
        );

        let tokens = graph.copy_with_component_map(assigned)?;
        Ok((tokens, report))
    }

    /// Tokenize one leaf ancestry and attribute each token to a vertex.
    fn attribute(
        &self,
        graph: &MultiText<String>,
        leaf: VertexId,
        ancestry: &[VertexId],
    ) -> Result<BTreeMap<VertexId, TokenRun>, MergeError> {
        let mut text = String::new();
        let mut owners: Vec<VertexId> = Vec::new();
        for &vertex in ancestry {
            let fragment = graph.component(vertex);
            text.push_str(fragment);
            owners.extend(std::iter::repeat(vertex).take(fragment.chars().count()));
        }

        let encoding = self.tokenizer.encode(&text);
        tracing::trace!(
            leaf = %leaf,
            chars = owners.len(),
            tokens = encoding.len(),
            "tokenized leaf ancestry"
        );

        // Every vertex of the ancestry is seen by this leaf, even one whose
        // fragment owns no character.
        let mut pending: BTreeMap<VertexId, TokenRun> =
            ancestry.iter().map(|v| (*v, TokenRun::new())).collect();
        for (index, &token) in encoding.ids.iter().enumerate() {
            match encoding.token_to_chars(index) {
                Some((start, end)) if start > end || end > owners.len() => {
                    return Err(MergeError::SpanOutOfRange {
                        leaf,
                        token: index,
                        start,
                        end,
                        len: owners.len(),
                    });
                }
                Some((start, end)) if start < end => {
                    // Owners follow the ancestry, so this is in position order.
                    let mut touched: Vec<VertexId> = Vec::new();
                    for &owner in &owners[start..end] {
                        if !touched.contains(&owner) {
                            touched.push(owner);
                        }
                    }

                    if touched.len() == 1 {
                        pending.entry(touched[0]).or_default().push(token);
                        continue;
                    }

                    let cutoff = touched
                        .windows(2)
                        .position(|w| !graph.vertex(w[0]).children().contains(&w[1]))
                        .map_or(touched.len(), |i| i + 1);

                    // Past a break, only vertices without alternatives can be
                    // folded into the token.
                    if touched[cutoff..].iter().any(|v| !graph.siblings(*v).is_empty()) {
                        return Err(MergeError::UnresolvableTokenSpan {
                            leaf,
                            token: index,
                            vertices: touched,
                        });
                    }

                    pending.entry(touched[cutoff - 1]).or_default().push(token);
                }
                _ if index == 0 => {
                    let first = ancestry.first().copied().unwrap_or(leaf);
                    pending.entry(first).or_default().push(token);
                }
                _ => {
                    return Err(MergeError::UnsupportedEmptyToken { leaf, token: index });
                }
            }
        }
        Ok(pending)
    }
}

/// Merge one leaf's pending runs into the assigned runs.
///
/// Returns the number of relocations performed.
fn reconcile(
    ancestry: &[VertexId],
    pending: &mut BTreeMap<VertexId, TokenRun>,
    assigned: &mut BTreeMap<VertexId, TokenRun>,
    successors: &BTreeMap<VertexId, Vec<VertexId>>,
) -> Result<usize, MergeError> {
    let mut relocations = 0;

    // The ancestry is position ordered, and relocation only ever targets a
    // later vertex of it.
    for (i, &vertex) in ancestry.iter().enumerate() {
        let Some(incoming) = pending.remove(&vertex) else {
            continue;
        };
        if !assigned.contains_key(&vertex) {
            assigned.insert(vertex, incoming);
            continue;
        }
        let existing = &assigned[&vertex];
        if *existing == incoming {
            continue;
        }
        if existing.len() == incoming.len() {
            return Err(MergeError::TokenizationDisagreement {
                vertex,
                existing: existing.clone(),
                incoming,
            });
        }

        let incoming_is_longer = incoming.len() > existing.len();
        let (short, long) = if incoming_is_longer {
            (existing, &incoming)
        } else {
            (&incoming, existing)
        };
        if !long.starts_with(short) {
            return Err(MergeError::NonPrefixDisagreement {
                vertex,
                existing: existing.clone(),
                incoming,
            });
        }
        let surplus: TokenRun = long[short.len()..].to_vec();

        if incoming_is_longer {
            // Earlier leaves fixed the shorter run; this leaf's successor
            // takes the surplus before its own reconciliation.
            let Some(&next) = ancestry.get(i + 1) else {
                return Err(MergeError::MissingSuccessor { vertex, surplus });
            };
            prepend(pending.entry(next).or_default(), &surplus);
        } else {
            // Shorter run wins; every successor fixed by an earlier leaf
            // takes the surplus.
            let earlier = successors.get(&vertex).map(Vec::as_slice).unwrap_or_default();
            if earlier.is_empty() {
                return Err(MergeError::MissingSuccessor { vertex, surplus });
            }
            assigned.insert(vertex, incoming);
            for next in earlier {
                prepend(assigned.entry(*next).or_default(), &surplus);
            }
        }

        tracing::debug!(
            vertex = %vertex,
            surplus = ?surplus,
            deferred = incoming_is_longer,
            "relocated surplus tokens to successor"
        );
        relocations += 1;
    }
    Ok(relocations)
}

fn prepend(run: &mut TokenRun, surplus: &[TokenId]) {
    let tail = std::mem::replace(run, surplus.to_vec());
    run.extend(tail);
}

/// Tokenize a text-level multitext with `tokenizer`.
///
/// Shorthand for [`TokenMerger::merge`].
pub fn tokenize_multitext<T: Tokenizer + ?Sized>(
    graph: &MultiText<String>,
    tokenizer: &T,
) -> Result<MultiText<TokenRun>, MergeError> {
    TokenMerger::new(tokenizer).merge(graph)
}
