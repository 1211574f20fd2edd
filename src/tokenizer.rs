//! Tokenizer interface consumed by the merge engine.
//!
//! Tokenization itself is external: any deterministic function from a string
//! to token ids plus per-token character spans can drive the merge engine.
//! [`GreedyTokenizer`] is a small longest-match implementation for tests
//! and benchmarks.

use std::collections::HashMap;

use crate::types::TokenId;

/// Output of a tokenizer for one string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    /// Token ids in order.
    pub ids: Vec<TokenId>,
    /// Character span `[start, end)` of each token, `None` for tokens that
    /// cover no characters (e.g. a beginning-of-sequence marker).
    pub spans: Vec<Option<(usize, usize)>>,
}

impl Encoding {
    /// Create an encoding from ids and spans of equal length.
    pub fn new(ids: Vec<TokenId>, spans: Vec<Option<(usize, usize)>>) -> Self {
        debug_assert_eq!(ids.len(), spans.len());
        Self { ids, spans }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Character span of a token, if it covers any character.
    pub fn token_to_chars(&self, index: usize) -> Option<(usize, usize)> {
        self.spans.get(index).copied().flatten()
    }
}

/// Deterministic string tokenizer.
pub trait Tokenizer {
    /// Tokenize `text`. Spans are character offsets into `text`.
    fn encode(&self, text: &str) -> Encoding;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Encoding,
{
    fn encode(&self, text: &str) -> Encoding {
        self(text)
    }
}

/// Longest-match vocabulary tokenizer.
///
/// Scans left to right and emits the longest vocabulary entry starting at the
/// current character. Characters not covered by the vocabulary become the
/// unknown token. An optional beginning-of-sequence token without a span is
/// emitted first.
#[derive(Debug, Clone)]
pub struct GreedyTokenizer {
    vocab: HashMap<String, TokenId>,
    max_piece_chars: usize,
    unknown: TokenId,
    bos: Option<TokenId>,
}

impl GreedyTokenizer {
    /// Create a tokenizer from `(piece, id)` pairs.
    pub fn new<I, S>(vocab: I, unknown: TokenId) -> Self
    where
        I: IntoIterator<Item = (S, TokenId)>,
        S: Into<String>,
    {
        let vocab: HashMap<String, TokenId> = vocab
            .into_iter()
            .map(|(piece, id)| (piece.into(), id))
            .filter(|(piece, _)| !piece.is_empty())
            .collect();
        let max_piece_chars = vocab.keys().map(|p| p.chars().count()).max().unwrap_or(1);
        Self {
            vocab,
            max_piece_chars,
            unknown,
            bos: None,
        }
    }

    /// Emit `bos` before every encoding.
    pub fn with_bos(mut self, bos: TokenId) -> Self {
        self.bos = Some(bos);
        self
    }

    /// Number of vocabulary entries.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Look up a piece.
    pub fn token_id(&self, piece: &str) -> Option<TokenId> {
        self.vocab.get(piece).copied()
    }
}

impl Tokenizer for GreedyTokenizer {
    fn encode(&self, text: &str) -> Encoding {
        let chars: Vec<char> = text.chars().collect();
        let mut encoding = Encoding::default();
        if let Some(bos) = self.bos {
            encoding.ids.push(bos);
            encoding.spans.push(None);
        }

        let mut start = 0;
        let mut piece = String::new();
        while start < chars.len() {
            let longest = self.max_piece_chars.min(chars.len() - start);
            let matched = (1..=longest).rev().find_map(|width| {
                piece.clear();
                piece.extend(&chars[start..start + width]);
                self.vocab.get(&piece).map(|id| (*id, width))
            });
            let (id, width) = matched.unwrap_or((self.unknown, 1));
            encoding.ids.push(id);
            encoding.spans.push(Some((start, start + width)));
            start += width;
        }
        encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> GreedyTokenizer {
        GreedyTokenizer::new([("a", 1), ("b", 2), ("ab", 3), ("abc", 4)], 0)
    }

    #[test]
    fn test_longest_match() {
        let encoding = tokenizer().encode("abcab");
        assert_eq!(encoding.ids, vec![4, 3]);
        assert_eq!(encoding.token_to_chars(0), Some((0, 3)));
        assert_eq!(encoding.token_to_chars(1), Some((3, 5)));
    }

    #[test]
    fn test_unknown_characters() {
        let encoding = tokenizer().encode("zé");
        assert_eq!(encoding.ids, vec![0, 0]);
        assert_eq!(encoding.token_to_chars(1), Some((1, 2)));
    }

    #[test]
    fn test_bos_has_no_span() {
        let encoding = tokenizer().with_bos(9).encode("a");
        assert_eq!(encoding.ids, vec![9, 1]);
        assert_eq!(encoding.token_to_chars(0), None);
        assert_eq!(encoding.token_to_chars(1), Some((0, 1)));
        assert_eq!(encoding.token_to_chars(2), None);
    }

    #[test]
    fn test_closure_tokenizer() {
        let per_char = |text: &str| {
            let n = text.chars().count();
            Encoding::new(
                text.chars().map(|c| c as TokenId).collect(),
                (0..n).map(|i| Some((i, i + 1))).collect(),
            )
        };
        assert_eq!(per_char.encode("ab").ids, vec![97, 98]);
    }

    #[test]
    fn test_vocab_lookup() {
        let t = tokenizer();
        assert_eq!(t.vocab_size(), 4);
        assert_eq!(t.token_id("ab"), Some(3));
        assert_eq!(t.token_id("c"), None);
    }
}
