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

//! Incremental Earley chart parsing.
//!
//! The parser derives all parse trees of a token sequence under a
//! context-free grammar by adding *edges* (hypotheses about subsequences)
//! to a *chart*, a blackboard for composing and combining hypotheses. It is
//! *incremental*: for all i < j, every edge ending at position i is derived
//! before any edge ending at position j is touched.
//!
//! Grammars come in two flavors behind one [Category] trait: plain
//! categories ([String]) combine by equality, feature categories
//! ([FeatCategory]) carry attribute-value maps and combine by unification.
//!
//! ```ignore
//! let mut builder = GrammarBuilder::new();
//! builder.set_start("S");
//! builder.add(Production::new("S").nt("NP").nt("VP"));
//! // ...
//! let parser = ChartParser::new(builder.build()?);
//! for tree in parser.parse(&tokens)? {
//!     println!("{}", tree);
//! }
//! ```

mod category;
mod chart;
mod edge;
mod error;
mod features;
mod grammar;
mod parser;
mod rules;
mod tree;

pub use category::Category;
pub use chart::{Chart, Cpl, Restriction};
pub use edge::{Edge, EdgeId, LeafEdge, TreeEdge};
pub use error::{Error, Result};
pub use features::{Bindings, FeatCategory, FeatValue};
pub use grammar::{demo_grammar, Grammar, GrammarBuilder, Production, Symbol, Token};
pub use parser::ChartParser;
pub use rules::{
    earley_strategy, Completer, InferenceRule, LeafInit, Predictor, Scanner, TopDownInit,
};
pub use tree::Tree;
