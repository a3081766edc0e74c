/*
    MIT License

    Copyright (c) 2020 Lars Krueger <lars_e_krueger@gmx.de>

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

//! Errors reported by grammar construction and parsing

use std::fmt;

/// List of errors when building grammars or running the parser.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// No start symbol set when building a grammar.
    EmptyStart,

    /// Non-terminal used in a rule without a production for it.
    NoRule(String),

    /// Malformed textual category, e.g. an unclosed feature block.
    BadCategory(String),

    /// Input tokens that no terminal of the grammar can produce. Detected
    /// before any edge is inserted.
    Coverage(Vec<String>),

    /// A select query listed the same edge attribute more than once.
    BadRestriction,

    /// An inference rule consuming the given number of edges was registered.
    /// The incremental driver supports only axioms (0) and single-edge
    /// trigger rules (1).
    StrategyShape(usize),
}

/// Type alias for Results with Errors
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyStart => write!(f, "no start symbol set"),
            Error::NoRule(sym) => write!(f, "no production for non-terminal `{}`", sym),
            Error::BadCategory(text) => write!(f, "malformed category `{}`", text),
            Error::Coverage(tokens) => write!(
                f,
                "input tokens not covered by the grammar: {}",
                tokens.join(", ")
            ),
            Error::BadRestriction => {
                write!(f, "select restriction lists the same attribute twice")
            }
            Error::StrategyShape(n) => write!(
                f,
                "inference rules must consume 0 or 1 edges, got one consuming {}",
                n
            ),
        }
    }
}

impl std::error::Error for Error {}
