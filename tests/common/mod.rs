//! Shared fixtures for integration tests.

#![allow(dead_code)]

use multitext_kernel::{Encoding, GreedyTokenizer, Slot, TokenId};

/// Install a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One token per character, id = code point.
pub fn per_char(text: &str) -> Encoding {
    let n = text.chars().count();
    Encoding::new(
        text.chars().map(|c| c as TokenId).collect(),
        (0..n).map(|i| Some((i, i + 1))).collect(),
    )
}

/// Small subword vocabulary with pieces that straddle fragment boundaries.
pub fn subword_tokenizer() -> GreedyTokenizer {
    let pieces = [
        "The", " sentence", " \"", "Four", " children", " are", " playing", " in", " some",
        " water", ".\"", " is", " true", " false", ".", "The children", " wet", "A", " ",
        "x", "y", " B", "B", "e", "s", "t", "r", "u", "f", "a", "l",
    ];
    GreedyTokenizer::new(
        pieces.iter().enumerate().map(|(i, p)| (*p, i as TokenId + 10)),
        1,
    )
    .with_bos(2)
}

/// `["A ", ("x", "y"), " B"]`
pub fn sample_slots() -> Vec<Slot> {
    vec![Slot::literal("A "), Slot::alternatives(["x", "y"]), Slot::literal(" B")]
}

/// Two independent true/false judgements: four variants.
pub fn two_questions() -> Vec<Slot> {
    vec![
        Slot::literal("The sentence \"Four children are playing in some water.\" is "),
        Slot::alternatives(["true.", "false."]),
        Slot::literal(" The sentence \"The children are wet.\" is "),
        Slot::alternatives(["true.", "false."]),
    ]
}
