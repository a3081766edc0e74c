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

//! Inference rules: axioms and single-edge trigger rules

use crate::category::Category;
use crate::chart::{Chart, Restriction};
use crate::edge::{Edge, EdgeId, LeafEdge, TreeEdge};
use crate::error::Result;
use crate::grammar::{Grammar, Symbol, Token};

/// One inference rule of the chart-parsing system.
///
/// A rule declares how many existing edges it consumes: axioms (0) are fired
/// once when the chart is seeded, trigger rules (1) are fired once per edge
/// per rule. Rules insert the edges they derive and return the newly
/// discovered ones, so the driver can re-enqueue them. A rule that does not
/// apply to its trigger edge simply returns no edges; that is not an error.
pub trait InferenceRule<C: Category, T: Token> {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Number of existing edges the rule consumes.
    fn num_edges(&self) -> usize;

    /// Fire an axiom.
    fn apply_axiom(
        &self,
        _chart: &mut Chart<C, T>,
        _grammar: &Grammar<C, T>,
    ) -> Result<Vec<EdgeId>> {
        Ok(Vec::new())
    }

    /// Fire on a trigger edge.
    fn apply(
        &self,
        _chart: &mut Chart<C, T>,
        _grammar: &Grammar<C, T>,
        _edge: EdgeId,
    ) -> Result<Vec<EdgeId>> {
        Ok(Vec::new())
    }
}

/// Fundamental rule: combine an incomplete left edge with a complete right
/// edge starting where the left one ends, advancing the dot over the matched
/// symbol. The licensing substitution is applied to the rest of the left
/// edge. One candidate edge per child pointer list of the left edge;
/// insertion deduplicates.
fn fundamental<C: Category, T: Token>(
    chart: &mut Chart<C, T>,
    left_id: EdgeId,
    right_id: EdgeId,
    new_edges: &mut Vec<EdgeId>,
) {
    let advanced = {
        let left = chart.edge(left_id);
        let right = chart.edge(right_id);
        debug_assert_eq!(left.end(), right.start());
        debug_assert!(right.is_complete());
        let left_tree = match left {
            Edge::Tree(tree_edge) => tree_edge,
            Edge::Leaf(_) => return,
        };
        let subst = match (left.next_symbol(), right.lhs()) {
            (Some(Symbol::Terminal(want)), Symbol::Terminal(token)) => {
                if *want == token {
                    C::Subst::default()
                } else {
                    return;
                }
            }
            (Some(Symbol::Nonterminal(want)), Symbol::Nonterminal(have)) => {
                match want.unify(&have) {
                    Some(subst) => subst,
                    None => return,
                }
            }
            _ => return,
        };
        left_tree.advanced(&subst, right.end())
    };
    for mut cpl in chart.cpls(left_id).to_vec() {
        cpl.push(right_id);
        let (id, fresh) = chart.insert(Edge::Tree(advanced.clone()), cpl);
        if fresh {
            new_edges.push(id);
        }
    }
}

/// Axiom: one leaf edge per input token.
pub struct LeafInit;

impl<C: Category, T: Token> InferenceRule<C, T> for LeafInit {
    fn name(&self) -> &'static str {
        "LeafInit"
    }

    fn num_edges(&self) -> usize {
        0
    }

    fn apply_axiom(
        &self,
        chart: &mut Chart<C, T>,
        _grammar: &Grammar<C, T>,
    ) -> Result<Vec<EdgeId>> {
        let mut new_edges = Vec::new();
        for index in 0..chart.num_leaves() {
            let token = chart.leaf(index).clone();
            let (id, fresh) = chart.insert(Edge::Leaf(LeafEdge::new(token, index)), Vec::new());
            if fresh {
                new_edges.push(id);
            }
        }
        Ok(new_edges)
    }
}

/// Axiom: one zero-width edge at position 0 per production of the start
/// symbol.
pub struct TopDownInit;

impl<C: Category, T: Token> InferenceRule<C, T> for TopDownInit {
    fn name(&self) -> &'static str {
        "TopDownInit"
    }

    fn num_edges(&self) -> usize {
        0
    }

    fn apply_axiom(
        &self,
        chart: &mut Chart<C, T>,
        grammar: &Grammar<C, T>,
    ) -> Result<Vec<EdgeId>> {
        let mut new_edges = Vec::new();
        for production in grammar.productions_for(grammar.start()) {
            let edge = Edge::Tree(TreeEdge::from_production(production, 0));
            let (id, fresh) = chart.insert(edge, Vec::new());
            if fresh {
                new_edges.push(id);
            }
        }
        Ok(new_edges)
    }
}

/// Trigger rule: top-down prediction. An incomplete edge expecting a
/// non-terminal inserts a zero-width edge for each of its productions.
///
/// Cached per (category, position): without the cache, left-recursive
/// grammars predict forever.
pub struct Predictor;

impl<C: Category, T: Token> InferenceRule<C, T> for Predictor {
    fn name(&self) -> &'static str {
        "Predictor"
    }

    fn num_edges(&self) -> usize {
        1
    }

    fn apply(
        &self,
        chart: &mut Chart<C, T>,
        grammar: &Grammar<C, T>,
        edge: EdgeId,
    ) -> Result<Vec<EdgeId>> {
        let (cat, end) = {
            let edge = chart.edge(edge);
            match edge.next_symbol() {
                Some(Symbol::Nonterminal(cat)) => (cat.clone(), edge.end()),
                _ => return Ok(Vec::new()),
            }
        };
        if chart.already_predicted(end, &cat) {
            return Ok(Vec::new());
        }
        chart.mark_predicted(end, cat.clone());

        let mut new_edges = Vec::new();
        for production in grammar.productions_for(&cat) {
            let edge = Edge::Tree(TreeEdge::from_production(production, end));
            let (id, fresh) = chart.insert(edge, Vec::new());
            if fresh {
                new_edges.push(id);
            }
        }
        Ok(new_edges)
    }
}

/// Trigger rule: a scanned token advances the dot of every edge to its left
/// that expects it as a terminal.
pub struct Scanner;

impl<C: Category, T: Token> InferenceRule<C, T> for Scanner {
    fn name(&self) -> &'static str {
        "Scanner"
    }

    fn num_edges(&self) -> usize {
        1
    }

    fn apply(
        &self,
        chart: &mut Chart<C, T>,
        _grammar: &Grammar<C, T>,
        edge: EdgeId,
    ) -> Result<Vec<EdgeId>> {
        let (token, start) = match chart.edge(edge) {
            Edge::Leaf(leaf) => (leaf.token().clone(), leaf.index()),
            Edge::Tree(_) => return Ok(Vec::new()),
        };
        let lefts = chart.select(
            start,
            &[
                Restriction::IsComplete(false),
                Restriction::Next(Symbol::Terminal(token)),
            ],
        )?;
        let mut new_edges = Vec::new();
        for left in lefts {
            fundamental(chart, left, edge, &mut new_edges);
        }
        Ok(new_edges)
    }
}

/// Trigger rule: a complete constituent advances the dot of every edge
/// ending where it starts whose next symbol matches its label.
pub struct Completer;

impl<C: Category, T: Token> InferenceRule<C, T> for Completer {
    fn name(&self) -> &'static str {
        "Completer"
    }

    fn num_edges(&self) -> usize {
        1
    }

    fn apply(
        &self,
        chart: &mut Chart<C, T>,
        _grammar: &Grammar<C, T>,
        edge: EdgeId,
    ) -> Result<Vec<EdgeId>> {
        let (cat, start) = {
            let trigger = chart.edge(edge);
            match trigger {
                Edge::Tree(tree_edge) if trigger.is_complete() => {
                    (tree_edge.lhs().clone(), trigger.start())
                }
                _ => return Ok(Vec::new()),
            }
        };
        let lefts = chart.select(
            start,
            &[
                Restriction::IsComplete(false),
                Restriction::Next(Symbol::Nonterminal(cat)),
            ],
        )?;
        let mut new_edges = Vec::new();
        for left in lefts {
            fundamental(chart, left, edge, &mut new_edges);
        }
        Ok(new_edges)
    }
}

/// The standard Earley strategy: both axioms plus the three trigger rules.
/// Works for plain and feature charts alike; the category type decides
/// whether symbols combine by equality or by unification.
pub fn earley_strategy<C: Category, T: Token>() -> Vec<Box<dyn InferenceRule<C, T>>> {
    vec![
        Box::new(LeafInit),
        Box::new(TopDownInit),
        Box::new(Completer),
        Box::new(Scanner),
        Box::new(Predictor),
    ]
}
