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

//! Demonstration driver for the incremental Earley parser

use std::time::Instant;

use log::{debug, info};
use structopt::StructOpt;

use chartparse::{demo_grammar, ChartParser};

#[derive(Debug, StructOpt)]
#[structopt(name = "chartparse", about = "Incremental Earley chart parser demo")]
struct CommandLine {
    /// Tracing verbosity: 1 prints every new edge, 2 adds position banners
    #[structopt(short, long, default_value = "2")]
    trace: usize,

    /// Print the demo grammar before parsing
    #[structopt(long)]
    print_grammar: bool,

    /// Print the number of trees instead of the trees themselves
    #[structopt(long)]
    no_trees: bool,

    /// Print the parse time
    #[structopt(long)]
    times: bool,

    /// Fail unless exactly this many parses are found
    #[structopt(long)]
    expect: Option<usize>,

    /// Sentence to parse with the demo grammar
    #[structopt(default_value = "I saw John with a dog with my cookie")]
    sentence: String,
}

fn main() {
    // Initialise the logger first
    let _ = std::env::var("CHARTPARSE_LOG").and_then(|log| {
        let _ = flexi_logger::Logger::with_str(log)
            .format(flexi_logger::with_thread)
            .log_to_file()
            .start();
        info!("Logging is ready");
        Ok(())
    });

    let cmd_line = CommandLine::from_args();
    debug!("{:?}", cmd_line);

    let grammar = demo_grammar();
    if cmd_line.print_grammar {
        println!("* Grammar");
        for production in grammar.productions() {
            println!("    {}", production);
        }
        println!();
    }

    let tokens: Vec<String> = cmd_line
        .sentence
        .split_whitespace()
        .map(str::to_string)
        .collect();
    println!("* Sentence");
    println!("    {:?}", tokens);
    println!();

    let mut parser = ChartParser::new(grammar);
    parser.set_trace(cmd_line.trace);

    let started = Instant::now();
    let chart = match parser.chart_parse(&tokens) {
        Ok(chart) => chart,
        Err(err) => {
            eprintln!("parse failed: {}", err);
            std::process::exit(1);
        }
    };
    let parses = chart.parses(parser.grammar().start());
    let elapsed = started.elapsed();

    println!();
    if cmd_line.no_trees {
        println!("Nr trees: {}", parses.len());
    } else {
        for tree in &parses {
            println!("{}", tree);
        }
    }
    if cmd_line.times {
        println!("Time: {:?}", elapsed);
    }

    if let Some(expected) = cmd_line.expect {
        if parses.len() != expected {
            eprintln!("expected {} parses, found {}", expected, parses.len());
            std::process::exit(1);
        }
    }
}
