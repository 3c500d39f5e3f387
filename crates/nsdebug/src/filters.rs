//! Namespace enable patterns
//!
//! An enable spec is a comma or whitespace separated list of wildcard tokens.
//! `*` matches any sequence, every other character matches itself, and a
//! leading `-` turns the token into a deny rule. Deny rules are checked first.

use crate::{Error, Result};
use regex::Regex;

/// One wildcard token compiled to an anchored matcher
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    token: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compile a token without its polarity prefix.
    pub fn new(token: &str) -> Result<Self> {
        let body = token
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*?");

        let regex = Regex::new(&format!("^{}$", body)).map_err(|e| Error::Pattern {
            token: token.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            token: token.to_string(),
            regex,
        })
    }

    /// The wildcard text this pattern was compiled from
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.regex.is_match(namespace)
    }
}

/// Ordered allow and deny rules compiled from an enable spec
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    names: Vec<CompiledPattern>,
    skips: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compile an enable spec. Empty tokens are dropped, token order is kept.
    pub fn compile(spec: &str) -> Result<Self> {
        let mut set = Self::default();

        for token in spec.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }

            match token.strip_prefix('-') {
                Some(denied) => set.skips.push(CompiledPattern::new(denied)?),
                None => set.names.push(CompiledPattern::new(token)?),
            }
        }

        Ok(set)
    }

    /// Allow rules, in spec order
    pub fn names(&self) -> &[CompiledPattern] {
        &self.names
    }

    /// Deny rules, in spec order
    pub fn skips(&self) -> &[CompiledPattern] {
        &self.skips
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.skips.is_empty()
    }

    /// Decide whether `namespace` is enabled.
    ///
    /// A namespace ending in `*` is always enabled, whatever the rules say.
    pub fn is_enabled(&self, namespace: &str) -> bool {
        if namespace.ends_with('*') {
            return true;
        }

        if self.skips.iter().any(|skip| skip.matches(namespace)) {
            return false;
        }

        self.names.iter().any(|name| name.matches(namespace))
    }

    /// Serialize back into a spec: allow rules first, then deny rules with
    /// their `-` restored.
    pub fn to_spec(&self) -> String {
        self.names
            .iter()
            .map(|name| name.token().to_string())
            .chain(self.skips.iter().map(|skip| format!("-{}", skip.token())))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(patterns: &[CompiledPattern]) -> Vec<&str> {
        patterns.iter().map(|p| p.token()).collect()
    }

    #[test]
    fn test_compile_splits_and_polarizes() {
        let set = PatternSet::compile("http:*, -http:noisy  db,,-*:trace").unwrap();

        assert_eq!(tokens(set.names()), vec!["http:*", "db"]);
        assert_eq!(tokens(set.skips()), vec!["http:noisy", "*:trace"]);
    }

    #[test]
    fn test_deny_checked_before_allow() {
        let set = PatternSet::compile("http:*,-http:noisy").unwrap();

        assert!(set.is_enabled("http:req"));
        assert!(!set.is_enabled("http:noisy"));
        assert!(!set.is_enabled("db"));
    }

    #[test]
    fn test_wildcard_is_anchored() {
        let set = PatternSet::compile("req").unwrap();
        assert!(set.is_enabled("req"));
        assert!(!set.is_enabled("http:req"));
        assert!(!set.is_enabled("request"));

        let set = PatternSet::compile("*req*").unwrap();
        assert!(set.is_enabled("http:request:body"));
    }

    #[test]
    fn test_literal_characters_are_not_regex() {
        let set = PatternSet::compile("http.req,a+b").unwrap();
        assert!(set.is_enabled("http.req"));
        assert!(!set.is_enabled("httpXreq"));
        assert!(set.is_enabled("a+b"));
        assert!(!set.is_enabled("aab"));
    }

    #[test]
    fn test_empty_spec_disables_everything() {
        let set = PatternSet::compile("").unwrap();
        assert!(set.is_empty());
        assert!(!set.is_enabled("http"));
        assert!(set.is_enabled("http*"));
        assert_eq!(set.to_spec(), "");
    }

    #[test]
    fn test_to_spec_orders_names_before_skips() {
        let set = PatternSet::compile("-a:*, b, -c, d:*").unwrap();
        assert_eq!(set.to_spec(), "b,d:*,-a:*,-c");
    }

    proptest! {
        #[test]
        fn prop_star_suffix_always_enabled(ns in "[a-z:.]{0,12}", spec in "[a-z:*, -]{0,20}") {
            let set = PatternSet::compile(&spec).unwrap();
            let namespace = format!("{}*", ns);
            prop_assert!(set.is_enabled(&namespace));
        }

        #[test]
        fn prop_spec_round_trip(spec in "[a-z:*, -]{0,24}") {
            let set = PatternSet::compile(&spec).unwrap();
            let again = PatternSet::compile(&set.to_spec()).unwrap();

            prop_assert_eq!(tokens(set.names()), tokens(again.names()));
            prop_assert_eq!(tokens(set.skips()), tokens(again.skips()));
        }
    }
}
