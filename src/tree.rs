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

//! Derivation trees extracted from a completed chart

use std::fmt;

/// One derivation of a subsequence of the input. Inner nodes carry the
/// category of the production that derived them, leaves carry input tokens.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Tree<C, T> {
    /// Constituent derived by a production.
    Node {
        label: C,
        children: Vec<Tree<C, T>>,
    },
    /// A single input token.
    Leaf(T),
}

impl<C, T> Tree<C, T> {
    /// The category of an inner node.
    pub fn label(&self) -> Option<&C> {
        match self {
            Tree::Node { label, .. } => Some(label),
            Tree::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[Tree<C, T>] {
        match self {
            Tree::Node { children, .. } => children,
            Tree::Leaf(_) => &[],
        }
    }

    /// The tokens covered by this tree, left to right.
    pub fn leaves(&self) -> Vec<&T> {
        match self {
            Tree::Leaf(token) => vec![token],
            Tree::Node { children, .. } => {
                children.iter().flat_map(|child| child.leaves()).collect()
            }
        }
    }
}

impl<C, T> fmt::Display for Tree<C, T>
where
    C: fmt::Display,
    T: fmt::Display,
{
    /// Bracketed form, e.g. `(S (NP I) (VP (V saw) (NP John)))`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tree::Leaf(token) => write!(f, "{}", token),
            Tree::Node { label, children } => {
                write!(f, "({}", label)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(label: &str, children: Vec<Tree<String, String>>) -> Tree<String, String> {
        Tree::Node {
            label: label.to_string(),
            children,
        }
    }

    fn leaf(token: &str) -> Tree<String, String> {
        Tree::Leaf(token.to_string())
    }

    #[test]
    fn bracketed_display() {
        let tree = node(
            "S",
            vec![
                node("NP", vec![leaf("I")]),
                node("VP", vec![node("V", vec![leaf("saw")]), node("NP", vec![leaf("John")])]),
            ],
        );
        assert_eq!(tree.to_string(), "(S (NP I) (VP (V saw) (NP John)))");
        // An epsilon constituent prints with no children.
        assert_eq!(node("S", Vec::new()).to_string(), "(S)");
    }

    #[test]
    fn leaves_in_order() {
        let tree = node("S", vec![node("A", vec![leaf("a")]), node("B", vec![leaf("b")])]);
        let leaves: Vec<&str> = tree.leaves().iter().map(|t| t.as_str()).collect();
        assert_eq!(leaves, vec!["a", "b"]);
    }
}
