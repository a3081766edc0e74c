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

//! The chart: append-only edge store with lazy secondary indexes

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace};

use crate::category::Category;
use crate::edge::{Edge, EdgeId};
use crate::error::{Error, Result};
use crate::grammar::{Symbol, Token};
use crate::tree::Tree;

/// Ordered list of the child edges that justify an edge's dot position, one
/// entry per matched right-hand-side symbol. An ambiguous edge accumulates
/// several of these.
pub type Cpl = Vec<EdgeId>;

/// Edge attribute a select query can restrict. Determines the index an
/// attribute set is served from.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
enum Attr {
    IsComplete,
    Lhs,
    Next,
    Start,
}

/// One attribute restriction of a select query.
///
/// Symbol-valued restrictions compare non-terminals by unification, so a
/// partially specified feature category matches every edge it unifies with.
#[derive(Clone, Debug)]
pub enum Restriction<C, T> {
    /// Only complete (or only incomplete) edges.
    IsComplete(bool),
    /// Edges whose label matches the symbol.
    Lhs(Symbol<C, T>),
    /// Incomplete edges whose next symbol matches.
    Next(Symbol<C, T>),
    /// Edges starting at the position.
    Start(usize),
}

/// Canonical index key component. Categories are projected through
/// [Category::index_key], so feature categories with different bindings
/// share a bucket and are told apart by the unification fallback in select.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum KeyPart<K, T> {
    Bool(bool),
    Pos(usize),
    Term(T),
    Cat(K),
    /// Complete edges have no next symbol.
    Missing,
}

fn symbol_key<C: Category, T: Token>(symbol: &Symbol<C, T>) -> KeyPart<C::Key, T> {
    match symbol {
        Symbol::Terminal(token) => KeyPart::Term(token.clone()),
        Symbol::Nonterminal(cat) => KeyPart::Cat(cat.index_key()),
    }
}

/// Whether a stored symbol satisfies a requested one: terminals by equality,
/// non-terminals by unifiability.
fn symbol_matches<C: Category, T: Token>(want: &Symbol<C, T>, have: &Symbol<C, T>) -> bool {
    match (want, have) {
        (Symbol::Terminal(a), Symbol::Terminal(b)) => a == b,
        (Symbol::Nonterminal(a), Symbol::Nonterminal(b)) => a.unify(b).is_some(),
        _ => false,
    }
}

impl<C: Category, T: Token> Restriction<C, T> {
    fn attr(&self) -> Attr {
        match self {
            Restriction::IsComplete(_) => Attr::IsComplete,
            Restriction::Lhs(_) => Attr::Lhs,
            Restriction::Next(_) => Attr::Next,
            Restriction::Start(_) => Attr::Start,
        }
    }

    fn key_part(&self) -> KeyPart<C::Key, T> {
        match self {
            Restriction::IsComplete(flag) => KeyPart::Bool(*flag),
            Restriction::Lhs(symbol) => symbol_key(symbol),
            Restriction::Next(symbol) => symbol_key(symbol),
            Restriction::Start(pos) => KeyPart::Pos(*pos),
        }
    }

    fn matches(&self, edge: &Edge<C, T>) -> bool {
        match self {
            Restriction::IsComplete(flag) => edge.is_complete() == *flag,
            Restriction::Start(pos) => edge.start() == *pos,
            Restriction::Lhs(symbol) => symbol_matches(symbol, &edge.lhs()),
            Restriction::Next(symbol) => edge
                .next_symbol()
                .map_or(false, |next| symbol_matches(symbol, next)),
        }
    }
}

/// Index key of an edge for a given attribute set.
fn key_for<C: Category, T: Token>(edge: &Edge<C, T>, attrs: &[Attr]) -> Vec<KeyPart<C::Key, T>> {
    attrs
        .iter()
        .map(|attr| match attr {
            Attr::IsComplete => KeyPart::Bool(edge.is_complete()),
            Attr::Start => KeyPart::Pos(edge.start()),
            Attr::Lhs => symbol_key(&edge.lhs()),
            Attr::Next => match edge.next_symbol() {
                Some(symbol) => symbol_key(symbol),
                None => KeyPart::Missing,
            },
        })
        .collect()
}

/// Secondary index over one canonical attribute set: one bucket map per end
/// position, edge lists in insertion order.
struct EdgeIndex<C: Category, T: Token> {
    buckets: Vec<HashMap<Vec<KeyPart<C::Key, T>>, Vec<EdgeId>>>,
}

/// The parsing chart: an append-only bag of edges partitioned by end
/// position, with the child pointer lists discovered for each edge and
/// dynamically created secondary indexes for constant-time rule lookups.
///
/// Edges are only ever added, never removed or mutated. The chart owns all
/// edges and child pointer lists; rules see them through ids.
pub struct Chart<C: Category, T: Token> {
    tokens: Vec<T>,
    /// Edge arena. `EdgeId`s index into it; arena order is insertion order.
    edges: Vec<Edge<C, T>>,
    /// Structural identity to arena index, for duplicate detection.
    ids: HashMap<Edge<C, T>, EdgeId>,
    /// Insertion-ordered edge ids per end position.
    edgelists: Vec<Vec<EdgeId>>,
    /// Child pointer lists per edge, in discovery order.
    cpls: Vec<Vec<Cpl>>,
    /// Lazily materialized indexes, keyed by sorted attribute set.
    indexes: HashMap<Vec<Attr>, EdgeIndex<C, T>>,
    /// (position, category) pairs already expanded by the predictor.
    predicted: HashSet<(usize, C)>,
}

impl<C: Category, T: Token> Chart<C, T> {
    /// Create an empty chart over the given tokens.
    pub fn new(tokens: Vec<T>) -> Self {
        let edgelists = (0..=tokens.len()).map(|_| Vec::new()).collect();
        Self {
            tokens,
            edges: Vec::new(),
            ids: HashMap::new(),
            edgelists,
            cpls: Vec::new(),
            indexes: HashMap::new(),
            predicted: HashSet::new(),
        }
    }

    pub fn num_leaves(&self) -> usize {
        self.tokens.len()
    }

    pub fn leaf(&self, index: usize) -> &T {
        &self.tokens[index]
    }

    pub fn leaves(&self) -> &[T] {
        &self.tokens
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: EdgeId) -> &Edge<C, T> {
        &self.edges[id]
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<C, T>)> {
        self.edges.iter().enumerate()
    }

    /// Ids of the edges ending at `end`, in insertion order.
    pub fn edge_ids_at(&self, end: usize) -> &[EdgeId] {
        &self.edgelists[end]
    }

    /// The child pointer lists discovered for an edge so far.
    pub fn cpls(&self, id: EdgeId) -> &[Cpl] {
        &self.cpls[id]
    }

    /// Add an edge with one child pointer list.
    ///
    /// If the edge is already present, the list is recorded if novel and the
    /// edge keeps its id; the flag is false. Otherwise the edge is appended
    /// to its end position, registered with all live indexes, and the flag
    /// is true. The flag distinguishes "newly discovered" from "reinforced".
    pub fn insert(&mut self, edge: Edge<C, T>, cpl: Cpl) -> (EdgeId, bool) {
        #[cfg(debug_assertions)]
        self.assert_cpl(&edge, &cpl);

        if let Some(&id) = self.ids.get(&edge) {
            let cpls = &mut self.cpls[id];
            if !cpls.contains(&cpl) {
                cpls.push(cpl);
            }
            return (id, false);
        }

        let id = self.edges.len();
        let end = edge.end();
        debug_assert!(end < self.edgelists.len());
        trace!("chart: edge {}: {}", id, edge);
        self.edgelists[end].push(id);
        for (attrs, index) in self.indexes.iter_mut() {
            let key = key_for(&edge, attrs);
            index.buckets[end].entry(key).or_insert_with(Vec::new).push(id);
        }
        self.ids.insert(edge.clone(), id);
        self.edges.push(edge);
        self.cpls.push(vec![cpl]);
        (id, true)
    }

    /// A child pointer list must have one entry per matched symbol, the
    /// children must chain over the edge's span, and each child's label must
    /// match the symbol it was matched against.
    #[cfg(debug_assertions)]
    fn assert_cpl(&self, edge: &Edge<C, T>, cpl: &Cpl) {
        debug_assert_eq!(cpl.len(), edge.dot());
        if let Edge::Tree(tree_edge) = edge {
            let mut pos = edge.start();
            for (i, &child) in cpl.iter().enumerate() {
                let child = &self.edges[child];
                debug_assert!(child.is_complete());
                debug_assert_eq!(child.start(), pos);
                debug_assert!(symbol_matches(&tree_edge.rhs()[i], &child.lhs()));
                pos = child.end();
            }
            debug_assert_eq!(pos, edge.end());
        }
    }

    /// The edges at `end` that satisfy all restrictions, in insertion order.
    ///
    /// The first use of an attribute set materializes an index over the
    /// current chart content; later inserts keep every live index complete.
    /// Restriction sets are canonicalized by attribute, so the order they
    /// are written in does not multiply indexes. Listing an attribute twice
    /// is rejected with [Error::BadRestriction].
    pub fn select(&mut self, end: usize, restrictions: &[Restriction<C, T>]) -> Result<Vec<EdgeId>> {
        debug_assert!(end < self.edgelists.len());
        if restrictions.is_empty() {
            return Ok(self.edgelists[end].clone());
        }

        let mut sorted: Vec<&Restriction<C, T>> = restrictions.iter().collect();
        sorted.sort_by_key(|restriction| restriction.attr());
        let attrs: Vec<Attr> = sorted.iter().map(|restriction| restriction.attr()).collect();
        if attrs.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(Error::BadRestriction);
        }

        if !self.indexes.contains_key(&attrs) {
            self.add_index(&attrs);
        }
        let key: Vec<KeyPart<C::Key, T>> = sorted
            .iter()
            .map(|restriction| restriction.key_part())
            .collect();
        let index = &self.indexes[&attrs];
        let shortlist = match index.buckets[end].get(&key) {
            Some(ids) => ids.as_slice(),
            None => &[],
        };
        // The index buckets by skeleton keys; confirm each candidate against
        // the full restriction values.
        Ok(shortlist
            .iter()
            .copied()
            .filter(|&id| {
                sorted
                    .iter()
                    .all(|restriction| restriction.matches(&self.edges[id]))
            })
            .collect())
    }

    /// Materialize the index for a canonical attribute set over the current
    /// chart content.
    fn add_index(&mut self, attrs: &[Attr]) {
        debug!("chart: materializing index over {:?}", attrs);
        let mut buckets: Vec<HashMap<Vec<KeyPart<C::Key, T>>, Vec<EdgeId>>> =
            (0..self.edgelists.len()).map(|_| HashMap::new()).collect();
        for (end, edgelist) in self.edgelists.iter().enumerate() {
            for &id in edgelist {
                let key = key_for(&self.edges[id], attrs);
                buckets[end].entry(key).or_insert_with(Vec::new).push(id);
            }
        }
        self.indexes.insert(attrs.to_vec(), EdgeIndex { buckets });
    }

    /// Whether the predictor already expanded `cat` at `end` in this parse.
    pub(crate) fn already_predicted(&self, end: usize, cat: &C) -> bool {
        self.predicted.contains(&(end, cat.clone()))
    }

    pub(crate) fn mark_predicted(&mut self, end: usize, cat: C) {
        self.predicted.insert((end, cat));
    }

    /// All derivation trees of complete edges spanning the whole input whose
    /// label unifies with `root`. Order follows edge insertion order;
    /// ambiguity yields multiple trees per edge.
    pub fn parses(&self, root: &C) -> Vec<Tree<C, T>> {
        let mut memo = HashMap::new();
        let mut parses = Vec::new();
        for &id in &self.edgelists[self.num_leaves()] {
            let edge = &self.edges[id];
            if !edge.is_complete() || edge.start() != 0 {
                continue;
            }
            if let Symbol::Nonterminal(cat) = edge.lhs() {
                if root.unify(&cat).is_some() {
                    parses.extend(self.trees_memo(id, &mut memo));
                }
            }
        }
        parses
    }

    /// The derivation trees of one edge, one per combination of child
    /// derivations per child pointer list.
    pub fn trees(&self, id: EdgeId) -> Vec<Tree<C, T>> {
        self.trees_memo(id, &mut HashMap::new())
    }

    fn trees_memo(
        &self,
        id: EdgeId,
        memo: &mut HashMap<EdgeId, Vec<Tree<C, T>>>,
    ) -> Vec<Tree<C, T>> {
        if let Some(known) = memo.get(&id) {
            return known.clone();
        }
        // Cyclic derivations (unary cycles) contribute nothing below their
        // own edge; the derivation set stays finite.
        memo.insert(id, Vec::new());
        let trees = match &self.edges[id] {
            Edge::Leaf(leaf) => vec![Tree::Leaf(leaf.token().clone())],
            Edge::Tree(tree_edge) => {
                let mut trees = Vec::new();
                for cpl in &self.cpls[id] {
                    if cpl.is_empty() {
                        trees.push(Tree::Node {
                            label: tree_edge.lhs().clone(),
                            children: Vec::new(),
                        });
                        continue;
                    }
                    let child_trees: Vec<Vec<Tree<C, T>>> = cpl
                        .iter()
                        .map(|&child| self.trees_memo(child, memo))
                        .collect();
                    for children in child_trees.into_iter().multi_cartesian_product() {
                        trees.push(Tree::Node {
                            label: tree_edge.lhs().clone(),
                            children,
                        });
                    }
                }
                trees
            }
        };
        memo.insert(id, trees.clone());
        trees
    }

    /// One line per token, aligned with the drawing of [pp_edge](#method.pp_edge).
    pub fn pp_leaves(&self, width: usize) -> String {
        let width = width.max(2);
        let mut line = String::new();
        for token in &self.tokens {
            line.push(' ');
            line.push_str(&format!("{:^1$}", token, width - 1));
        }
        line.push(' ');
        format!("|{}|", line)
    }

    /// Draw an edge the classic chart way: its span as a bar over the token
    /// positions, followed by the dotted rule. Incomplete edges end in `>`.
    pub fn pp_edge(&self, id: EdgeId, width: usize) -> String {
        let width = width.max(2);
        let edge = &self.edges[id];
        let (start, end) = edge.span();
        let mut line = String::new();
        for pos in 0..=self.num_leaves() {
            let boundary = if start == end {
                if pos == start {
                    '#'
                } else {
                    '.'
                }
            } else if pos == start {
                '['
            } else if pos == end {
                if edge.is_complete() {
                    ']'
                } else {
                    '>'
                }
            } else if pos > start && pos < end {
                '-'
            } else {
                '.'
            };
            line.push(boundary);
            if pos < self.num_leaves() {
                let fill = if pos >= start && pos < end { '-' } else { ' ' };
                for _ in 1..width {
                    line.push(fill);
                }
            }
        }
        format!("|{}| {}", line, edge)
    }

    /// Dump the whole chart, one line per edge in insertion order.
    pub fn pp_chart(&self, width: usize) -> String {
        (0..self.edges.len())
            .map(|id| self.pp_edge(id, width))
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{LeafEdge, TreeEdge};

    fn nt(name: &str) -> Symbol<String, &'static str> {
        Symbol::Nonterminal(name.to_string())
    }

    fn t(token: &'static str) -> Symbol<String, &'static str> {
        Symbol::Terminal(token)
    }

    fn tree_edge(
        lhs: &str,
        rhs: Vec<Symbol<String, &'static str>>,
        dot: usize,
        start: usize,
        end: usize,
    ) -> Edge<String, &'static str> {
        Edge::Tree(TreeEdge::new(lhs.to_string(), rhs, dot, start, end))
    }

    /// Chart over "a" with a leaf, two complete A edges and an incomplete
    /// S edge, enough to exercise select and CPL accretion.
    fn toy_chart() -> (Chart<String, &'static str>, EdgeId, EdgeId, EdgeId) {
        let mut chart = Chart::new(vec!["a"]);
        let (leaf, fresh) = chart.insert(Edge::Leaf(LeafEdge::new("a", 0)), Vec::new());
        assert!(fresh);
        let (a1, _) = chart.insert(tree_edge("A", vec![t("a")], 1, 0, 1), vec![leaf]);
        let (a2, _) = chart.insert(tree_edge("A", vec![nt("B")], 0, 0, 0), Vec::new());
        chart.insert(tree_edge("S", vec![nt("A"), nt("A")], 0, 0, 0), Vec::new());
        (chart, leaf, a1, a2)
    }

    #[test]
    fn insert_deduplicates_and_accretes_cpls() {
        let mut chart = Chart::new(vec!["a"]);
        let (leaf, _) = chart.insert(Edge::Leaf(LeafEdge::new("a", 0)), Vec::new());
        let (b, _) = chart.insert(tree_edge("B", vec![t("a")], 1, 0, 1), vec![leaf]);
        let (a1, fresh) = chart.insert(tree_edge("A", vec![t("a")], 1, 0, 1), vec![leaf]);
        assert!(fresh);
        let (a2, fresh) = chart.insert(tree_edge("A", vec![nt("B")], 1, 0, 1), vec![b]);
        assert!(fresh);
        assert_ne!(a1, a2);

        // Same edge, same cpl: reinforced, nothing recorded.
        let (id, fresh) = chart.insert(tree_edge("A", vec![t("a")], 1, 0, 1), vec![leaf]);
        assert_eq!(id, a1);
        assert!(!fresh);
        assert_eq!(chart.cpls(a1).len(), 1);

        // Same edge shape via another derivation: cpl accretes.
        let x1 = chart.insert(tree_edge("X", vec![nt("A")], 1, 0, 1), vec![a1]);
        let x2 = chart.insert(tree_edge("X", vec![nt("A")], 1, 0, 1), vec![a2]);
        assert!(x1.1);
        assert!(!x2.1);
        assert_eq!(x1.0, x2.0);
        assert_eq!(chart.cpls(x1.0).len(), 2);
    }

    #[test]
    fn select_without_restrictions_is_insertion_ordered() {
        let (mut chart, leaf, a1, _) = toy_chart();
        assert_eq!(chart.select(1, &[]).unwrap(), vec![leaf, a1]);
        assert_eq!(chart.select(0, &[]).unwrap().len(), 2);
    }

    #[test]
    fn select_with_restrictions() {
        let (mut chart, leaf, a1, a2) = toy_chart();
        assert_eq!(
            chart
                .select(1, &[Restriction::IsComplete(true)])
                .unwrap(),
            vec![leaf, a1]
        );
        assert_eq!(
            chart
                .select(1, &[Restriction::IsComplete(true), Restriction::Lhs(nt("A"))])
                .unwrap(),
            vec![a1]
        );
        assert_eq!(
            chart
                .select(0, &[Restriction::IsComplete(false), Restriction::Next(nt("B"))])
                .unwrap(),
            vec![a2]
        );
        assert_eq!(
            chart
                .select(0, &[Restriction::Next(t("a"))])
                .unwrap(),
            Vec::<EdgeId>::new()
        );
    }

    #[test]
    fn restriction_order_does_not_matter() {
        let (mut chart, _, a1, _) = toy_chart();
        let one = chart
            .select(1, &[Restriction::IsComplete(true), Restriction::Lhs(nt("A"))])
            .unwrap();
        let two = chart
            .select(1, &[Restriction::Lhs(nt("A")), Restriction::IsComplete(true)])
            .unwrap();
        assert_eq!(one, two);
        assert_eq!(one, vec![a1]);
    }

    #[test]
    fn duplicate_attribute_is_rejected() {
        let (mut chart, ..) = toy_chart();
        assert_eq!(
            chart
                .select(0, &[Restriction::IsComplete(true), Restriction::IsComplete(false)])
                .err(),
            Some(Error::BadRestriction)
        );
    }

    #[test]
    fn index_is_idempotent() {
        // Materializing the index before or after an insert must not change
        // what select returns.
        fn grow(chart: &mut Chart<String, &'static str>, leaf: EdgeId) {
            let (b, _) = chart.insert(tree_edge("B", vec![t("a")], 1, 0, 1), vec![leaf]);
            chart.insert(tree_edge("A", vec![nt("B")], 1, 0, 1), vec![b]);
        }

        let restrictions = [Restriction::IsComplete(true), Restriction::Lhs(nt("A"))];

        let (mut early, leaf, ..) = toy_chart();
        let _ = early.select(1, &restrictions).unwrap();
        grow(&mut early, leaf);

        let (mut late, leaf, ..) = toy_chart();
        grow(&mut late, leaf);

        let found = early.select(1, &restrictions).unwrap();
        assert_eq!(found, late.select(1, &restrictions).unwrap());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn epsilon_edge_yields_a_childless_tree() {
        let mut chart: Chart<String, &str> = Chart::new(Vec::new());
        chart.insert(tree_edge("S", Vec::new(), 0, 0, 0), Vec::new());
        let parses = chart.parses(&"S".to_string());
        assert_eq!(parses.len(), 1);
        assert_eq!(parses[0].to_string(), "(S)");
    }

    #[test]
    fn pp_edge_draws_the_span() {
        let (chart, leaf, a1, a2) = toy_chart();
        assert_eq!(chart.pp_edge(leaf, 4), "|[---]| [0:1] 'a'");
        assert_eq!(chart.pp_edge(a1, 4), "|[---]| [0:1] A -> 'a' *");
        assert_eq!(chart.pp_edge(a2, 4), "|#   .| [0:0] A -> * B");
        assert_eq!(chart.pp_leaves(4), "|  a  |");
    }
}
