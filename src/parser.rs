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

//! Incremental Earley chart parser

use log::debug;

use crate::category::Category;
use crate::chart::Chart;
use crate::edge::EdgeId;
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Token};
use crate::rules::{earley_strategy, InferenceRule};
use crate::tree::Tree;

/// Default total width reserved for the chart drawing in trace output.
const TRACE_CHART_WIDTH: usize = 50;

/// An incremental chart parser implementing Jay Earley's algorithm.
///
/// The axioms seed the chart, then each end position 0..=n is driven to
/// fixpoint in turn: every edge ending there is offered to every trigger
/// rule, and newly derived edges ending at the current position re-enter
/// the agenda (LIFO). Edges ending at earlier positions are closed: the
/// only rules that derive an edge ending at p need a complete right edge
/// ending at p, which is only processed while the driver is at p.
pub struct ChartParser<C: Category, T: Token> {
    grammar: Grammar<C, T>,
    axioms: Vec<Box<dyn InferenceRule<C, T>>>,
    trigger_rules: Vec<Box<dyn InferenceRule<C, T>>>,
    trace: usize,
    trace_chart_width: usize,
}

impl<C: Category, T: Token> ChartParser<C, T> {
    /// Parser with the standard Earley strategy and no tracing.
    pub fn new(grammar: Grammar<C, T>) -> Self {
        Self::with_strategy(grammar, earley_strategy())
            .expect("standard strategy has valid arities")
    }

    /// Parser with a custom strategy. The strategy is split into axioms and
    /// trigger rules; a rule consuming more than one edge is rejected with
    /// [Error::StrategyShape].
    pub fn with_strategy(
        grammar: Grammar<C, T>,
        strategy: Vec<Box<dyn InferenceRule<C, T>>>,
    ) -> Result<Self> {
        let mut axioms = Vec::new();
        let mut trigger_rules = Vec::new();
        for rule in strategy {
            match rule.num_edges() {
                0 => axioms.push(rule),
                1 => trigger_rules.push(rule),
                n => return Err(Error::StrategyShape(n)),
            }
        }
        Ok(Self {
            grammar,
            axioms,
            trigger_rules,
            trace: 0,
            trace_chart_width: TRACE_CHART_WIDTH,
        })
    }

    /// Tracing verbosity: 0 is silent, 1 prints one line per newly inserted
    /// edge, 2 adds per-position banners. Tracing never affects the chart.
    pub fn set_trace(&mut self, level: usize) {
        self.trace = level;
    }

    /// Total width of the chart drawing in trace output.
    pub fn set_trace_chart_width(&mut self, width: usize) {
        self.trace_chart_width = width;
    }

    pub fn grammar(&self) -> &Grammar<C, T> {
        &self.grammar
    }

    /// Parse and return all derivation trees rooted in the start symbol.
    /// No parse is not an error: the list is empty then.
    pub fn parse(&self, tokens: &[T]) -> Result<Vec<Tree<C, T>>> {
        let chart = self.chart_parse(tokens)?;
        Ok(chart.parses(self.grammar.start()))
    }

    /// Run the chart to completion over the tokens and return it.
    pub fn chart_parse(&self, tokens: &[T]) -> Result<Chart<C, T>> {
        self.grammar.check_coverage(tokens)?;
        let mut chart = Chart::new(tokens.to_vec());
        // Width of one leaf cell in the trace drawing.
        let width = (self.trace_chart_width / (chart.num_leaves() + 1)).max(2);
        if self.trace > 0 {
            println!("{}", chart.pp_leaves(width));
        }

        for axiom in &self.axioms {
            let new_edges = axiom.apply_axiom(&mut chart, &self.grammar)?;
            self.trace_new_edges(&chart, axiom.name(), &new_edges, width);
        }

        for end in 0..=chart.num_leaves() {
            if self.trace > 1 {
                println!("\n* Processing position {}\n", end);
            }
            debug!("processing position {}", end);
            let mut agenda: Vec<EdgeId> = chart.edge_ids_at(end).to_vec();
            while let Some(edge) = agenda.pop() {
                for rule in &self.trigger_rules {
                    let new_edges = rule.apply(&mut chart, &self.grammar, edge)?;
                    self.trace_new_edges(&chart, rule.name(), &new_edges, width);
                    for &new_edge in &new_edges {
                        // Nothing may be derived for an already closed
                        // position.
                        debug_assert!(chart.edge(new_edge).end() >= end);
                        if chart.edge(new_edge).end() == end {
                            agenda.push(new_edge);
                        }
                    }
                }
            }
        }

        Ok(chart)
    }

    fn trace_new_edges(&self, chart: &Chart<C, T>, rule: &str, new_edges: &[EdgeId], width: usize) {
        if self.trace == 0 {
            return;
        }
        for &id in new_edges {
            if self.trace > 1 {
                println!("{}  ({})", chart.pp_edge(id, width), rule);
            } else {
                println!("{}", chart.pp_edge(id, width));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatCategory;
    use crate::grammar::{demo_grammar, GrammarBuilder, Production};

    fn plain_grammar(
        start: &str,
        productions: Vec<Production<String, &'static str>>,
    ) -> Grammar<String, &'static str> {
        let mut builder = GrammarBuilder::new();
        builder.set_start(start);
        for production in productions {
            builder.add(production);
        }
        builder.build().expect("test grammar should build")
    }

    fn parse_strings(
        grammar: Grammar<String, &'static str>,
        tokens: &[&'static str],
    ) -> Vec<String> {
        let parser = ChartParser::new(grammar);
        parser
            .parse(tokens)
            .expect("parse should succeed")
            .iter()
            .map(|tree| tree.to_string())
            .collect()
    }

    /// Assert the chart invariants that must hold after every parse: no
    /// structural duplicates, and every child pointer list matches its
    /// edge's dot and chains over its span.
    fn check_invariants(chart: &Chart<String, &'static str>) {
        let mut seen = std::collections::HashSet::new();
        for (id, edge) in chart.edges() {
            assert!(seen.insert(edge.clone()), "duplicate edge {}", edge);
            let cpls = chart.cpls(id);
            assert!(!cpls.is_empty());
            for cpl in cpls {
                assert_eq!(cpl.len(), edge.dot());
                let mut pos = edge.start();
                for &child in cpl {
                    let child = chart.edge(child);
                    assert!(child.is_complete());
                    assert_eq!(child.start(), pos);
                    pos = child.end();
                }
                assert_eq!(pos, edge.end());
            }
        }
    }

    #[test]
    fn single_terminal() {
        let grammar = plain_grammar("S", vec![Production::new("S").t("a")]);
        assert_eq!(parse_strings(grammar, &["a"]), vec!["(S a)"]);
    }

    #[test]
    fn ambiguous_bracketings() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").nt("S").nt("S"),
                Production::new("S").t("a"),
            ],
        );
        let mut parses = parse_strings(grammar, &["a", "a", "a"]);
        parses.sort();
        assert_eq!(
            parses,
            vec![
                "(S (S (S a) (S a)) (S a))".to_string(),
                "(S (S a) (S (S a) (S a)))".to_string(),
            ]
        );
    }

    #[test]
    fn two_constituents() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").nt("A").nt("B"),
                Production::new("A").t("a"),
                Production::new("B").t("b"),
            ],
        );
        assert_eq!(parse_strings(grammar, &["a", "b"]), vec!["(S (A a) (B b))"]);
    }

    #[test]
    fn epsilon_production_and_right_recursion() {
        let grammar = plain_grammar(
            "S",
            vec![Production::new("S").t("a").nt("S"), Production::new("S")],
        );
        assert_eq!(parse_strings(grammar, &["a", "a"]), vec!["(S a (S a (S)))"]);
    }

    #[test]
    fn toy_sentence() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").nt("NP").nt("VP"),
                Production::new("NP").t("I"),
                Production::new("VP").nt("V").nt("NP"),
                Production::new("V").t("saw"),
                Production::new("NP").t("John"),
            ],
        );
        assert_eq!(
            parse_strings(grammar, &["I", "saw", "John"]),
            vec!["(S (NP I) (VP (V saw) (NP John)))"]
        );
    }

    #[test]
    fn agreement_through_unification() {
        fn cat(s: &str) -> FeatCategory {
            s.parse().expect("test category should parse")
        }

        let mut builder: GrammarBuilder<FeatCategory, &'static str> = GrammarBuilder::new();
        builder.set_start(cat("S"));
        builder.add(
            Production::new(cat("S"))
                .nt(cat("NP[num=?n]"))
                .nt(cat("VP[num=?n]")),
        );
        builder.add(Production::new(cat("NP[num=sg]")).t("dog"));
        builder.add(Production::new(cat("NP[num=pl]")).t("dogs"));
        builder.add(Production::new(cat("VP[num=sg]")).t("barks"));
        builder.add(Production::new(cat("VP[num=pl]")).t("bark"));
        let grammar = builder.build().expect("grammar should build");
        let parser = ChartParser::new(grammar);

        let parses = parser.parse(&["dog", "barks"]).expect("parse should succeed");
        assert_eq!(parses.len(), 1);
        assert_eq!(
            parses[0].to_string(),
            "(S (NP[num=sg] dog) (VP[num=sg] barks))"
        );

        // Number disagreement kills the only candidate combination.
        let parses = parser.parse(&["dog", "bark"]).expect("parse should succeed");
        assert!(parses.is_empty());
        let parses = parser.parse(&["dogs", "bark"]).expect("parse should succeed");
        assert_eq!(parses.len(), 1);
    }

    #[test]
    fn empty_input() {
        let grammar = plain_grammar(
            "S",
            vec![Production::new("S"), Production::new("S").t("a")],
        );
        assert_eq!(parse_strings(grammar, &[]), vec!["(S)"]);

        let grammar = plain_grammar("S", vec![Production::new("S").t("a")]);
        assert_eq!(parse_strings(grammar, &[]), Vec::<String>::new());
    }

    #[test]
    fn unary_cycle_terminates() {
        let grammar = plain_grammar(
            "A",
            vec![
                Production::new("A").nt("A"),
                Production::new("A").t("a"),
            ],
        );
        // The cached predictor keeps A -> A from predicting forever, and the
        // cycle guard in tree extraction keeps the derivation set finite.
        let parses = parse_strings(grammar, &["a"]);
        assert_eq!(parses, vec!["(A a)".to_string(), "(A (A a))".to_string()]);
    }

    #[test]
    fn left_recursion_terminates() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").nt("S").t("a"),
                Production::new("S").t("a"),
            ],
        );
        assert_eq!(
            parse_strings(grammar, &["a", "a", "a"]),
            vec!["(S (S (S a) a) a)"]
        );
    }

    #[test]
    fn no_parse_is_not_an_error() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").t("a").t("b"),
                Production::new("X").t("b"),
            ],
        );
        assert_eq!(parse_strings(grammar, &["b", "b"]), Vec::<String>::new());
    }

    #[test]
    fn uncovered_token_fails_before_parsing() {
        let grammar = plain_grammar("S", vec![Production::new("S").t("a")]);
        let parser = ChartParser::new(grammar);
        assert_eq!(
            parser.parse(&["a", "z"]).err(),
            Some(Error::Coverage(vec!["z".to_string()]))
        );
    }

    #[test]
    fn oversized_rules_are_rejected() {
        struct PairRule;

        impl InferenceRule<String, &'static str> for PairRule {
            fn name(&self) -> &'static str {
                "Pair"
            }

            fn num_edges(&self) -> usize {
                2
            }
        }

        let grammar = plain_grammar("S", vec![Production::new("S").t("a")]);
        let result = ChartParser::with_strategy(grammar, vec![Box::new(PairRule)]);
        assert_eq!(result.err(), Some(Error::StrategyShape(2)));
    }

    #[test]
    fn chart_invariants_hold() {
        let grammar = plain_grammar(
            "S",
            vec![
                Production::new("S").nt("S").nt("S"),
                Production::new("S").t("a"),
            ],
        );
        let parser = ChartParser::new(grammar);
        let chart = parser
            .chart_parse(&["a", "a", "a", "a"])
            .expect("parse should succeed");
        check_invariants(&chart);
    }

    #[test]
    fn parsing_is_deterministic() {
        let grammar = || {
            plain_grammar(
                "S",
                vec![
                    Production::new("S").nt("S").nt("S"),
                    Production::new("S").t("a"),
                ],
            )
        };
        let run = || {
            let parser = ChartParser::new(grammar());
            let chart = parser
                .chart_parse(&["a", "a", "a"])
                .expect("parse should succeed");
            let edges: Vec<String> = chart.edges().map(|(_, edge)| edge.to_string()).collect();
            let parses: Vec<String> = chart
                .parses(&"S".to_string())
                .iter()
                .map(|tree| tree.to_string())
                .collect();
            (edges, parses)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn demo_sentence_has_five_readings() {
        let tokens: Vec<String> = "I saw John with a dog with my cookie"
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let parser = ChartParser::new(demo_grammar());
        let parses = parser.parse(&tokens).expect("parse should succeed");
        assert_eq!(parses.len(), 5);
        // All readings cover the same tokens.
        for tree in &parses {
            let leaves: Vec<&String> = tree.leaves();
            assert_eq!(leaves.len(), tokens.len());
        }
    }

    #[test]
    fn tracing_does_not_change_the_result() {
        let grammar = plain_grammar("S", vec![Production::new("S").t("a")]);
        let mut parser = ChartParser::new(grammar);
        parser.set_trace(2);
        parser.set_trace_chart_width(30);
        let parses = parser.parse(&["a"]).expect("parse should succeed");
        assert_eq!(parses.len(), 1);
    }
}
