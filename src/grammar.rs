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

//! Grammar builder and compiled grammar

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use itertools::Itertools;

use crate::category::Category;
use crate::error::{Error, Result};

/// Input tokens and grammar terminals. Terminals match tokens by equality.
pub trait Token: Clone + Eq + Hash + fmt::Display {}

impl<T> Token for T where T: Clone + Eq + Hash + fmt::Display {}

/// One position of a production right hand side.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Symbol<C, T> {
    /// Rewrites further via productions of the grammar.
    Nonterminal(C),
    /// Matches one input token.
    Terminal(T),
}

impl<C, T> fmt::Display for Symbol<C, T>
where
    C: fmt::Display,
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Nonterminal(cat) => write!(f, "{}", cat),
            Symbol::Terminal(token) => write!(f, "'{}'", token),
        }
    }
}

/// A production `A -> β`. An empty right hand side denotes an epsilon
/// production.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Production<C, T> {
    lhs: C,
    rhs: Vec<Symbol<C, T>>,
}

impl<C: Category, T: Token> Production<C, T> {
    /// Create a new production for the given left hand side.
    ///
    /// ```ignore
    /// Production::new("S").nt("NP").nt("VP")
    /// ```
    ///
    /// corresponds to `S -> NP VP`.
    pub fn new(lhs: impl Into<C>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: Vec::new(),
        }
    }

    /// Append a non-terminal to the right hand side.
    pub fn nt(mut self, cat: impl Into<C>) -> Self {
        self.rhs.push(Symbol::Nonterminal(cat.into()));
        self
    }

    /// Append a terminal to the right hand side.
    pub fn t(mut self, token: impl Into<T>) -> Self {
        self.rhs.push(Symbol::Terminal(token.into()));
        self
    }

    pub fn lhs(&self) -> &C {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol<C, T>] {
        &self.rhs
    }
}

impl<C, T> fmt::Display for Production<C, T>
where
    C: fmt::Display,
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// Grammar builder. When the grammar has been completely defined, it needs
/// to be built to create the look-up tables used during parsing.
pub struct GrammarBuilder<C, T> {
    start: Option<C>,
    productions: Vec<Production<C, T>>,
}

impl<C: Category, T: Token> GrammarBuilder<C, T> {
    pub fn new() -> Self {
        Self {
            start: None,
            productions: Vec::new(),
        }
    }

    /// Set the start symbol. May be overwritten until [build](#method.build)
    /// is called.
    pub fn set_start(&mut self, cat: impl Into<C>) {
        self.start = Some(cat.into());
    }

    /// Add a production.
    pub fn add(&mut self, production: Production<C, T>) {
        self.productions.push(production);
    }

    /// Build the grammar for efficient use.
    ///
    /// If the given grammar is incomplete or inconsistent, return an error.
    pub fn build(self) -> Result<Grammar<C, T>> {
        let start = match self.start {
            Some(start) => start,
            None => return Err(Error::EmptyStart),
        };

        let mut by_lhs: HashMap<C::Key, Vec<usize>> = HashMap::new();
        let mut vocabulary = HashSet::new();
        for (index, production) in self.productions.iter().enumerate() {
            by_lhs
                .entry(production.lhs.index_key())
                .or_insert_with(Vec::new)
                .push(index);
            for symbol in &production.rhs {
                if let Symbol::Terminal(token) = symbol {
                    vocabulary.insert(token.clone());
                }
            }
        }

        // The start symbol counts as used on a right hand side.
        if !by_lhs.contains_key(&start.index_key()) {
            return Err(Error::NoRule(start.to_string()));
        }
        for production in &self.productions {
            for symbol in &production.rhs {
                if let Symbol::Nonterminal(cat) = symbol {
                    if !by_lhs.contains_key(&cat.index_key()) {
                        return Err(Error::NoRule(cat.to_string()));
                    }
                }
            }
        }

        Ok(Grammar {
            start,
            productions: self.productions,
            by_lhs,
            vocabulary,
        })
    }
}

/// A compiled grammar: the productions plus the look-up tables the inference
/// rules need. Read-only during a parse.
pub struct Grammar<C: Category, T: Token> {
    start: C,
    productions: Vec<Production<C, T>>,
    /// Production indices grouped by the index key of their left hand side.
    by_lhs: HashMap<C::Key, Vec<usize>>,
    /// All terminals occurring in productions.
    vocabulary: HashSet<T>,
}

impl<C: Category, T: Token> Grammar<C, T> {
    pub fn start(&self) -> &C {
        &self.start
    }

    /// All productions, in definition order.
    pub fn productions(&self) -> impl Iterator<Item = &Production<C, T>> {
        self.productions.iter()
    }

    /// Productions whose left hand side unifies with `cat`, in definition
    /// order. For plain grammars this is an exact left-hand-side lookup.
    pub fn productions_for(&self, cat: &C) -> Vec<&Production<C, T>> {
        match self.by_lhs.get(&cat.index_key()) {
            Some(indices) => indices
                .iter()
                .map(|&index| &self.productions[index])
                .filter(|production| cat.unify(&production.lhs).is_some())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Check that every token can be produced as a terminal by some
    /// production. Fails with [Error::Coverage] listing the offenders.
    pub fn check_coverage(&self, tokens: &[T]) -> Result<()> {
        let missing: Vec<String> = tokens
            .iter()
            .filter(|token| !self.vocabulary.contains(*token))
            .map(|token| token.to_string())
            .unique()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Coverage(missing))
        }
    }
}

/// The classic demo grammar used by the command line driver and the tests.
/// `I saw John with a dog with my cookie` has five readings under it.
pub fn demo_grammar() -> Grammar<String, String> {
    let mut builder = GrammarBuilder::new();
    builder.set_start("S");
    builder.add(Production::new("S").nt("NP").nt("VP"));
    builder.add(Production::new("PP").t("with").nt("NP"));
    builder.add(Production::new("NP").nt("NP").nt("PP"));
    builder.add(Production::new("VP").nt("VP").nt("PP"));
    builder.add(Production::new("VP").nt("Verb").nt("NP"));
    builder.add(Production::new("VP").nt("Verb"));
    builder.add(Production::new("NP").nt("Det").nt("Noun"));
    builder.add(Production::new("NP").t("John"));
    builder.add(Production::new("NP").t("I"));
    builder.add(Production::new("Det").t("the"));
    builder.add(Production::new("Det").t("my"));
    builder.add(Production::new("Det").t("a"));
    builder.add(Production::new("Noun").t("dog"));
    builder.add(Production::new("Noun").t("cookie"));
    builder.add(Production::new("Verb").t("ate"));
    builder.add(Production::new("Verb").t("saw"));
    builder.build().expect("demo grammar is well-formed")
}
