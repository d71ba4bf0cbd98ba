//! Per-element recompute: projection, interpolation, and conditional
//! attribute toggling.
//!
//! The evaluator runs over one element at a time, on every synchronization
//! pass that touches it. It has three jobs, in order:
//!
//! 1. **Projection** — resolve the `data-view`/`data-sync` path and write
//!    the rendered value into the element (form value for inputs, text
//!    content otherwise).
//! 2. **Echo** — fill the `data-echo` positional template from the
//!    `data-args` paths. The template lives in the attribute itself, so it
//!    is stable across passes by construction.
//! 3. **`when:` rules** — apply every parsed rule in declaration order.
//!
//! # Backup discipline
//!
//! The first rule to touch an attribute in an element's lifetime backs up
//! its current value (`data-backup:<attr>`) or its absence
//! (`data-backup:<attr>:0`) before any override. While at least one rule
//! targeting the attribute holds, last-write-wins in declaration order.
//! When every rule targeting it evaluates false, the exact backup is
//! restored and discarded — an attribute is never permanently lost or
//! duplicated across toggles.

use vellum_state::Store;
use vellum_tree::{Document, NodeId};

use crate::rules::{self, Comparator, RuleAction, WhenRule};
use crate::value::{loose_eq, render, truthy};
use crate::vocab;

/// Recompute one element's bound output.
pub fn evaluate(doc: &mut Document, store: &Store, node: NodeId) {
    project(doc, store, node);
    echo(doc, store, node);
    apply_rules(doc, store, node);
}

/// The element's read path, if bound: `data-view` wins over `data-sync`.
#[must_use]
pub fn read_path(doc: &Document, node: NodeId) -> Option<String> {
    doc.attr(node, vocab::VIEW)
        .or_else(|| doc.attr(node, vocab::SYNC))
        .map(str::to_string)
}

/// The element's write path, if editable: `data-edit` wins over
/// `data-sync`.
#[must_use]
pub fn write_path(doc: &Document, node: NodeId) -> Option<String> {
    doc.attr(node, vocab::EDIT)
        .or_else(|| doc.attr(node, vocab::SYNC))
        .map(str::to_string)
}

fn project(doc: &mut Document, store: &Store, node: NodeId) {
    let Some(path) = read_path(doc, node) else {
        return;
    };
    let rendered = render(&store.get(&path));
    if doc.is_input(node) {
        doc.set_value(node, rendered);
    } else {
        doc.set_text(node, rendered);
    }
}

fn echo(doc: &mut Document, store: &Store, node: NodeId) {
    let Some(template) = doc.attr(node, vocab::ECHO).map(str::to_string) else {
        return;
    };
    let args: Vec<String> = doc
        .attr(node, vocab::ARGS)
        .unwrap_or("")
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut text = template;
    for (position, arg) in args.iter().enumerate() {
        let token = format!("%{position}");
        text = text.replacen(&token, &render(&store.get(arg)), 1);
    }
    doc.set_text(node, text);
}

fn apply_rules(doc: &mut Document, store: &Store, node: NodeId) {
    let parsed: Vec<WhenRule> = doc
        .attrs(node)
        .iter()
        .filter_map(|(name, value)| rules::parse_when(name, value))
        .collect();
    if parsed.is_empty() {
        return;
    }

    // Declaration-ordered `attr -> any rule held` bookkeeping; order
    // matters for deterministic restore.
    let mut touched: Vec<(String, bool)> = Vec::new();

    for rule in parsed {
        back_up(doc, node, &rule.attr);

        let held = condition_holds(store, &rule);
        if held {
            match &rule.action {
                RuleAction::Set(value) => doc.set_attr(node, rule.attr.clone(), value.clone()),
                RuleAction::Remove => doc.remove_attr(node, &rule.attr),
            }
        }

        match touched.iter_mut().find(|(attr, _)| *attr == rule.attr) {
            Some(entry) => entry.1 |= held,
            None => touched.push((rule.attr, held)),
        }
    }

    for (attr, any_held) in touched {
        if !any_held {
            restore(doc, node, &attr);
        }
    }
}

fn condition_holds(store: &Store, rule: &WhenRule) -> bool {
    let dep = store.get(&rule.dep);
    match &rule.comparator {
        Comparator::Truthy => truthy(&dep),
        Comparator::Falsy => !truthy(&dep),
        Comparator::Equals(arg) => loose_eq(&dep, &store.get(arg)),
    }
}

/// Save the attribute's pre-override state on first touch, and only then.
fn back_up(doc: &mut Document, node: NodeId, attr: &str) {
    let backup = backup_name(attr);
    let absent = absent_name(attr);
    if doc.has_attr(node, &backup) || doc.has_attr(node, &absent) {
        return;
    }
    match doc.attr(node, attr).map(str::to_string) {
        Some(current) => doc.set_attr(node, backup, current),
        None => doc.set_attr(node, absent, ""),
    }
}

/// Put the attribute back exactly as backed up, then discard the backup.
fn restore(doc: &mut Document, node: NodeId, attr: &str) {
    let backup = backup_name(attr);
    let absent = absent_name(attr);
    if let Some(saved) = doc.attr(node, &backup).map(str::to_string) {
        doc.set_attr(node, attr, saved);
        doc.remove_attr(node, &backup);
    } else if doc.has_attr(node, &absent) {
        doc.remove_attr(node, attr);
        doc.remove_attr(node, &absent);
    }
}

fn backup_name(attr: &str) -> String {
    format!("{}{attr}", vocab::BACKUP_PREFIX)
}

fn absent_name(attr: &str) -> String {
    format!("{}{attr}{}", vocab::BACKUP_PREFIX, vocab::ABSENT_SUFFIX)
}
