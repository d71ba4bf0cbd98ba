//! The markup binding attribute vocabulary.
//!
//! Bindings are declared entirely through these attributes; the engine
//! rediscovers them by query on every synchronization pass.

/// Read path: project the value at this path into the element.
pub const VIEW: &str = "data-view";
/// Read path with edit wiring (two-way form binding).
pub const SYNC: &str = "data-sync";
/// Write path for editable elements; defaults to the sync path.
pub const EDIT: &str = "data-edit";
/// Array path rendered by repeating the element's captured template.
pub const FEED: &str = "data-feed";
/// Whitespace-separated argument paths for interpolation and rule
/// dependencies.
pub const ARGS: &str = "data-args";
/// Positional text template (`%0 %1 …`) filled from [`ARGS`].
pub const ECHO: &str = "data-echo";
/// Page template marker (`<template data-type="name">`).
pub const PAGE_TYPE: &str = "data-type";

/// Prefix of conditional rule attributes:
/// `data-when:<path>[:<arg>]:<attr>`.
pub const WHEN_PREFIX: &str = "data-when:";
/// Prefix of internal attribute backups: `data-backup:<attr>` holds the
/// pre-override value, `data-backup:<attr>:0` marks "was absent".
pub const BACKUP_PREFIX: &str = "data-backup:";
/// Suffix distinguishing the absent-marker backup.
pub const ABSENT_SUFFIX: &str = ":0";

/// Feed template placeholder for the current item's own path.
pub const VALUE_TOKEN: &str = "..value";
/// Feed template placeholder for the current 1-based position.
pub const INDEX_TOKEN: &str = "..index";
