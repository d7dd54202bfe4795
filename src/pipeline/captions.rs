//! Caption numbering shared by the picture and table passes.
//!
//! Both passes number their elements in document order and let authors
//! attach a reference key with a `KEY|caption` prefix. References written
//! later as `<p: KEY/>` or `<t: KEY/>` resolve to `"<label> <id>"`.

use crate::document::{Document, FenceTracker};
use crate::error::{CaptionKind, EzmdError};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Keyed caption ids for one pass over one document.
///
/// Ids are 1-based and dense in registration order. Passing `None` to
/// [`register`](Self::register) takes an id without a key, so the element
/// is counted but cannot be referenced.
#[derive(Debug, Clone)]
pub struct CaptionRegistry {
    kind: CaptionKind,
    keys: HashMap<String, u32>,
    last: u32,
}

impl CaptionRegistry {
    pub fn new(kind: CaptionKind) -> Self {
        Self {
            kind,
            keys: HashMap::new(),
            last: 0,
        }
    }

    pub fn kind(&self) -> CaptionKind {
        self.kind
    }

    /// Assign the next id, recording it under `key` when one is given.
    ///
    /// A key that is already registered keeps its first id.
    pub fn register(&mut self, key: Option<&str>) -> u32 {
        self.last += 1;
        let id = self.last;
        if let Some(key) = key {
            if let Some(existing) = self.keys.get(key) {
                warn!(
                    kind = %self.kind,
                    key,
                    existing,
                    "duplicate caption key; references keep the first id"
                );
            } else {
                self.keys.insert(key.to_string(), id);
            }
        }
        debug!(kind = %self.kind, id, key = key.unwrap_or(""), "registered caption");
        id
    }

    pub fn lookup(&self, key: &str) -> Option<u32> {
        self.keys.get(key).copied()
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> u32 {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }
}

/// Split `KEY|caption` into its trimmed parts; without `|` there is no key.
pub fn split_caption(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once('|') {
        Some((key, text)) => (Some(key.trim()), text.trim()),
        None => (None, raw.trim()),
    }
}

/// Replace every reference tag matched by `re` with `"<label> <id>"`.
///
/// `re` must capture the key in group 1. Tags inside fenced code blocks are
/// left as written. Returns the number of tags replaced.
pub(crate) fn resolve_references(
    doc: &mut Document,
    re: &Regex,
    registry: &CaptionRegistry,
    label: &str,
) -> Result<usize, EzmdError> {
    let mut resolved = 0;
    let mut fence = FenceTracker::default();
    for line in doc.lines_mut() {
        if fence.in_code(line) || !re.is_match(line) {
            continue;
        }
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for caps in re.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let key = &caps[1];
            let id = registry
                .lookup(key)
                .ok_or_else(|| EzmdError::UnresolvedReference {
                    kind: registry.kind(),
                    key: key.to_string(),
                })?;
            out.push_str(&line[last..whole.start()]);
            out.push_str(&format!("{label} {id}"));
            last = whole.end();
            resolved += 1;
        }
        out.push_str(&line[last..]);
        *line = out;
    }
    Ok(resolved)
}
