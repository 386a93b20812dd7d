//! Line tokens and their restriction onto view rows.
//!
//! The view layer treats tokenization as an input: a model hands over one
//! ordered, non-overlapping token list per input line, in char offsets.
//! What the view layer owns is *restriction*: cutting a token list down to
//! the sub-range of the line shown on one output row and rebasing the
//! survivors so they line up with that row's columns. Continuation rows of
//! a wrapped line shift everything right by the wrap indent's width — the
//! indent itself is visual padding and no token may span it.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Semantic token categories, as produced by a host tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    String,
    Number,
    Identifier,
    Type,
    Function,
    Comment,
    Operator,
    Punctuation,
    Text,
}

/// One token on one input line, as a half-open char-offset range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: u32,
    pub end: u32,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "token range must be start <= end");
        Self { kind, start, end }
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<u32> {
        self.start..self.end
    }
}

/// The ordered, non-overlapping token list of one line (input or output).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineTokens {
    tokens: Vec<Token>,
}

impl LineTokens {
    /// Create from an ordered token list.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.windows(2).all(|w| w[0].end <= w[1].start),
            "tokens must be ordered and non-overlapping"
        );
        Self { tokens }
    }

    /// A single token of the given kind covering `[0, len)`.
    #[must_use]
    pub fn whole_line(kind: TokenKind, len: u32) -> Self {
        Self {
            tokens: vec![Token::new(kind, 0, len)],
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Restrict to the char range `[start, end)` and rebase onto a view
    /// row whose content begins `delta` columns in.
    ///
    /// Tokens entirely outside the range are dropped; tokens straddling a
    /// boundary are clipped to it. Each survivor is then rebased to
    /// `token - start + delta`, so a renderer can apply it directly to the
    /// output row (whose first `delta` columns are untokenized indent
    /// padding).
    #[must_use]
    pub fn restricted(&self, start: u32, end: u32, delta: u32) -> LineTokens {
        let mut out = Vec::new();
        for token in &self.tokens {
            if token.end <= start {
                continue;
            }
            if token.start >= end {
                break;
            }
            let clipped_start = token.start.max(start);
            let clipped_end = token.end.min(end);
            if clipped_start >= clipped_end {
                continue;
            }
            out.push(Token::new(
                token.kind,
                clipped_start - start + delta,
                clipped_end - start + delta,
            ));
        }
        LineTokens { tokens: out }
    }
}
