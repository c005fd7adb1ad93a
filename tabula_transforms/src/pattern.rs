// Copyright 2026 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SQL `LIKE` patterns.
//!
//! `%` matches any run of characters (including none), `_` matches exactly one character,
//! and `\` makes the next character literal. Matching is case-sensitive.

extern crate alloc;

use alloc::vec::Vec;

use tabula_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AnyRun,
    AnyOne,
    Literal(char),
}

/// A compiled `LIKE` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LikePattern {
    tokens: Vec<Token>,
}

impl LikePattern {
    /// Compiles `pattern`, rejecting a trailing unescaped `\`.
    pub(crate) fn compile(pattern: &str) -> Result<Self> {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let token = match c {
                '%' => {
                    if tokens.last() == Some(&Token::AnyRun) {
                        continue;
                    }
                    Token::AnyRun
                }
                '_' => Token::AnyOne,
                '\\' => match chars.next() {
                    Some(escaped) => Token::Literal(escaped),
                    None => {
                        return Err(Error::InvalidArgument(alloc::format!(
                            "malformed LIKE pattern `{pattern}`: dangling escape"
                        )));
                    }
                },
                other => Token::Literal(other),
            };
            tokens.push(token);
        }
        Ok(Self { tokens })
    }

    /// Returns `true` if the whole of `text` matches.
    pub(crate) fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let pattern = &self.tokens;
        let (mut ti, mut pi) = (0, 0);
        // Position after the most recent `%`, and the text position it is currently absorbing up to.
        let mut backtrack: Option<(usize, usize)> = None;

        while ti < text.len() {
            match pattern.get(pi) {
                Some(Token::AnyRun) => {
                    pi += 1;
                    backtrack = Some((pi, ti));
                    continue;
                }
                Some(Token::AnyOne) => {
                    ti += 1;
                    pi += 1;
                    continue;
                }
                Some(Token::Literal(c)) if *c == text[ti] => {
                    ti += 1;
                    pi += 1;
                    continue;
                }
                _ => {}
            }
            let Some((resume_pi, absorbed)) = backtrack else {
                return false;
            };
            pi = resume_pi;
            ti = absorbed + 1;
            backtrack = Some((resume_pi, ti));
        }

        pattern[pi..].iter().all(|t| *t == Token::AnyRun)
    }
}
