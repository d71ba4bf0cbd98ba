//! Typed `when:` rule descriptors.
//!
//! A conditional attribute rule is declared as an attribute whose NAME
//! carries the rule and whose VALUE carries the payload:
//!
//! ```text
//! data-when:<path>[:<arg>]:<attr> = "<value>"
//! ```
//!
//! - `<path>` is the dependency path the condition resolves.
//! - `<arg>` (optional) selects the comparator: absent means "dependency is
//!   truthy", the literal `0` means "dependency is falsy", anything else is
//!   itself resolved as a path expression and compared for equality.
//! - `<attr>` is the target attribute. A leading-uppercase target means
//!   "remove the (lowercased) attribute when the condition holds"; a
//!   lowercase target means "set it to the payload value" (possibly empty,
//!   for boolean-present attributes).
//!
//! Rule names are parsed once per element scan into [`WhenRule`]; malformed
//! names (fewer than two colon-separated segments) are skipped with a debug
//! event and no attribute change.

use tracing::debug;

use crate::vocab;

/// How a rule's condition is decided against its dependency path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Comparator {
    /// True when the dependency resolves truthy.
    Truthy,
    /// True when the dependency resolves falsy (declared with arg `0`).
    Falsy,
    /// True when the dependency equals the resolved argument path.
    Equals(String),
}

/// What happens to the target attribute while the condition holds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleAction {
    /// Set the attribute to this literal (empty for boolean-present).
    Set(String),
    /// Remove the attribute.
    Remove,
}

/// One parsed conditional attribute rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhenRule {
    /// Dependency path the condition resolves.
    pub dep: String,
    pub comparator: Comparator,
    /// Target attribute name (already lowercased for removal rules).
    pub attr: String,
    pub action: RuleAction,
}

/// Parse one attribute into a rule, if its name is a well-formed rule name.
///
/// Returns `None` both for non-rule attributes and for malformed rule
/// names; only the latter emits a diagnostic.
#[must_use]
pub fn parse_when(name: &str, value: &str) -> Option<WhenRule> {
    let tail = name.strip_prefix(vocab::WHEN_PREFIX)?;
    let segments: Vec<&str> = tail.split(':').collect();
    if segments.len() < 2 {
        debug!(%name, "malformed when: rule skipped");
        return None;
    }

    let dep = segments[0].to_string();
    let attr = segments[segments.len() - 1];
    // Only the first argument participates; extras are tolerated.
    let comparator = match segments[1..segments.len() - 1].first() {
        None => Comparator::Truthy,
        Some(&"0") => Comparator::Falsy,
        Some(&arg) => Comparator::Equals(arg.to_string()),
    };

    let removes = attr.chars().next().is_some_and(char::is_uppercase);
    let (attr, action) = if removes {
        (attr.to_lowercase(), RuleAction::Remove)
    } else {
        (attr.to_string(), RuleAction::Set(value.to_string()))
    };

    Some(WhenRule {
        dep,
        comparator,
        attr,
        action,
    })
}


#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing never panics, whatever the attribute looks like.
        #[test]
        fn parse_is_total(name in "[ -~]{0,40}", value in "[ -~]{0,20}") {
            let _ = parse_when(&name, &value);
        }

        /// Well-formed three-part names always parse, and the target ends
        /// up where it should.
        #[test]
        fn well_formed_names_parse(
            dep in "[a-z][a-z.]{0,10}",
            attr in "[a-z][a-z-]{0,10}",
            value in "[a-z]{0,8}",
        ) {
            let name = format!("data-when:{dep}:{attr}");
            let rule = parse_when(&name, &value).unwrap();
            prop_assert_eq!(rule.dep, dep);
            prop_assert_eq!(rule.attr, attr);
            prop_assert_eq!(rule.comparator, Comparator::Truthy);
        }
    }
}
