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

//! Category labels of non-terminal symbols

use std::fmt;
use std::hash::Hash;

/// Left-hand-side label of a production.
///
/// The chart, the inference rules, and the grammar are all generic over the
/// category type. A plain context-free grammar uses a category whose `unify`
/// degrades to an equality test. A feature grammar carries attribute-value
/// maps and a real unifier. Choosing the category type selects between the
/// two rule families; a mismatched pairing cannot be expressed.
pub trait Category: Clone + Eq + Hash + fmt::Display {
    /// Canonical projection used as a secondary index key. Two categories
    /// that can possibly unify must project to the same key; the chart
    /// confirms candidates found under a key with a full `unify` call.
    type Key: Clone + Eq + Hash;

    /// Substitution produced by a successful unification.
    type Subst: Default;

    /// Project to the index key.
    fn index_key(&self) -> Self::Key;

    /// Most general common specialization of two categories, as a
    /// substitution to apply to the surrounding rule. None if the
    /// categories are incompatible.
    fn unify(&self, other: &Self) -> Option<Self::Subst>;

    /// Apply a substitution.
    fn substitute(&self, subst: &Self::Subst) -> Self;
}

/// Plain context-free categories: unification is an equality test and
/// substitution is the identity.
impl Category for String {
    type Key = String;
    type Subst = ();

    fn index_key(&self) -> String {
        self.clone()
    }

    fn unify(&self, other: &Self) -> Option<()> {
        if self == other {
            Some(())
        } else {
            None
        }
    }

    fn substitute(&self, _subst: &()) -> Self {
        self.clone()
    }
}
