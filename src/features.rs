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

//! Categories with attribute-value maps and unification

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::category::Category;
use crate::error::{Error, Result};

/// Value of one feature: either a constant or a named variable.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum FeatValue {
    /// Constant value, compared literally.
    Atom(String),
    /// Variable, written `?name`. Bound by unification.
    Var(String),
}

impl FeatValue {
    pub fn atom(value: &str) -> Self {
        FeatValue::Atom(value.to_string())
    }

    pub fn var(name: &str) -> Self {
        FeatValue::Var(name.to_string())
    }
}

impl fmt::Display for FeatValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatValue::Atom(value) => write!(f, "{}", value),
            FeatValue::Var(name) => write!(f, "?{}", name),
        }
    }
}

/// Substitution produced by a successful unification: variable name to value.
pub type Bindings = BTreeMap<String, FeatValue>;

/// A non-terminal category carrying an attribute-value map, e.g.
/// `NP[num=sg, case=acc]`. Variables are scoped per production; a grammar
/// that wants two rules not to share a variable uses distinct names.
///
/// Feature maps are immutable: unification produces a [Bindings] value that
/// is applied functionally to build new categories.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FeatCategory {
    name: String,
    features: BTreeMap<String, FeatValue>,
}

impl FeatCategory {
    /// Category without features, e.g. a start symbol `S`.
    pub fn new(name: &str) -> Self {
        FeatCategory {
            name: name.to_string(),
            features: BTreeMap::new(),
        }
    }

    /// Add one feature. Consumes and returns self for chained construction.
    pub fn feat(mut self, key: &str, value: FeatValue) -> Self {
        self.features.insert(key.to_string(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature(&self, key: &str) -> Option<&FeatValue> {
        self.features.get(key)
    }
}

/// Follow variable bindings until a constant or an unbound variable remains.
fn resolve(value: &FeatValue, bindings: &Bindings) -> FeatValue {
    let mut current = value.clone();
    while let FeatValue::Var(name) = &current {
        match bindings.get(name) {
            Some(next) if *next != current => current = next.clone(),
            _ => break,
        }
    }
    current
}

/// Unify two resolved values, extending the bindings on success.
fn unify_values(a: FeatValue, b: FeatValue, bindings: &mut Bindings) -> Option<()> {
    match (a, b) {
        (FeatValue::Atom(x), FeatValue::Atom(y)) => {
            if x == y {
                Some(())
            } else {
                None
            }
        }
        (FeatValue::Var(v), other) | (other, FeatValue::Var(v)) => {
            if FeatValue::Var(v.clone()) != other {
                bindings.insert(v, other);
            }
            Some(())
        }
    }
}

impl Category for FeatCategory {
    /// The type-stripped skeleton: only the category name. All feature
    /// variants of `NP` share one index bucket.
    type Key = String;
    type Subst = Bindings;

    fn index_key(&self) -> String {
        self.name.clone()
    }

    fn unify(&self, other: &Self) -> Option<Bindings> {
        if self.name != other.name {
            return None;
        }
        let mut bindings = Bindings::new();
        // A feature absent on one side is unconstrained and unifies with
        // anything on the other side.
        for (key, a) in &self.features {
            if let Some(b) = other.features.get(key) {
                let a = resolve(a, &bindings);
                let b = resolve(b, &bindings);
                unify_values(a, b, &mut bindings)?;
            }
        }
        Some(bindings)
    }

    fn substitute(&self, bindings: &Bindings) -> Self {
        if bindings.is_empty() {
            return self.clone();
        }
        let features = self
            .features
            .iter()
            .map(|(key, value)| (key.clone(), resolve(value, bindings)))
            .collect();
        FeatCategory {
            name: self.name.clone(),
            features,
        }
    }
}

impl fmt::Display for FeatCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.features.is_empty() {
            write!(f, "[")?;
            for (i, (key, value)) in self.features.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl FromStr for FeatCategory {
    type Err = Error;

    /// Parse the textual form `NAME` or `NAME[key=value, key=?var]`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bracket = match s.find('[') {
            None => {
                if s.is_empty() || s.contains(']') {
                    return Err(Error::BadCategory(s.to_string()));
                }
                return Ok(FeatCategory::new(s));
            }
            Some(pos) => pos,
        };
        if bracket == 0 || !s.ends_with(']') {
            return Err(Error::BadCategory(s.to_string()));
        }
        let mut category = FeatCategory::new(s[..bracket].trim());
        let inner = &s[bracket + 1..s.len() - 1];
        for part in inner.split(',') {
            let part = part.trim();
            let mut kv = part.splitn(2, '=');
            let key = kv.next().unwrap_or("").trim();
            let value = match kv.next() {
                Some(value) => value.trim(),
                None => return Err(Error::BadCategory(s.to_string())),
            };
            if key.is_empty() || value.is_empty() {
                return Err(Error::BadCategory(s.to_string()));
            }
            let value = if let Some(name) = value.strip_prefix('?') {
                FeatValue::var(name)
            } else {
                FeatValue::atom(value)
            };
            category.features.insert(key.to_string(), value);
        }
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(s: &str) -> FeatCategory {
        s.parse().expect("test category should parse")
    }

    #[test]
    fn parse_category() {
        let c = cat("NP[num=?n, case=acc]");
        assert_eq!(c.name(), "NP");
        assert_eq!(c.feature("num"), Some(&FeatValue::var("n")));
        assert_eq!(c.feature("case"), Some(&FeatValue::atom("acc")));

        let plain = cat("S");
        assert_eq!(plain, FeatCategory::new("S"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("".parse::<FeatCategory>().is_err());
        assert!("NP[".parse::<FeatCategory>().is_err());
        assert!("NP[num]".parse::<FeatCategory>().is_err());
        assert!("[num=sg]".parse::<FeatCategory>().is_err());
    }

    #[test]
    fn display_round_trip() {
        let c = cat("NP[case=acc, num=?n]");
        assert_eq!(c.to_string(), "NP[case=acc, num=?n]");
        assert_eq!(cat(&c.to_string()), c);
    }

    #[test]
    fn unify_atoms() {
        assert!(cat("NP[num=sg]").unify(&cat("NP[num=sg]")).is_some());
        assert!(cat("NP[num=sg]").unify(&cat("NP[num=pl]")).is_none());
        assert!(cat("NP[num=sg]").unify(&cat("VP[num=sg]")).is_none());
    }

    #[test]
    fn absent_features_are_unconstrained() {
        assert!(cat("NP[num=sg]").unify(&cat("NP[case=acc]")).is_some());
        assert!(cat("NP").unify(&cat("NP[num=sg]")).is_some());
    }

    #[test]
    fn unify_binds_variables() {
        let bindings = cat("NP[num=?n]")
            .unify(&cat("NP[num=sg]"))
            .expect("should unify");
        assert_eq!(bindings.get("n"), Some(&FeatValue::atom("sg")));

        // Binding direction is irrelevant for the result.
        let bindings = cat("NP[num=pl]")
            .unify(&cat("NP[num=?n]"))
            .expect("should unify");
        assert_eq!(bindings.get("n"), Some(&FeatValue::atom("pl")));
    }

    #[test]
    fn shared_variable_propagates() {
        // Within one category, a variable used twice must resolve to one value.
        let left = cat("X[a=?v, b=?v]");
        let right = cat("X[a=1, b=2]");
        assert!(left.unify(&right).is_none());

        let right = cat("X[a=1, b=1]");
        assert!(left.unify(&right).is_some());
    }

    #[test]
    fn variable_against_variable() {
        let bindings = cat("NP[num=?n]")
            .unify(&cat("NP[num=?n]"))
            .expect("same variable should unify");
        assert!(bindings.is_empty());

        assert!(cat("NP[num=?n]").unify(&cat("NP[num=?m]")).is_some());
    }

    #[test]
    fn substitute_applies_bindings() {
        let bindings = cat("VP[num=?n]")
            .unify(&cat("VP[num=sg]"))
            .expect("should unify");
        let rest = cat("NP[num=?n, case=acc]").substitute(&bindings);
        assert_eq!(rest, cat("NP[num=sg, case=acc]"));
    }

    #[test]
    fn index_key_strips_features() {
        assert_eq!(cat("NP[num=sg]").index_key(), "NP");
        assert_eq!(cat("NP").index_key(), "NP");
    }
}
