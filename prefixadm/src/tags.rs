// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display names for route tags.
//!
//! Tags are opaque community-like strings. Operators supply a table naming
//! the ones they care about, either exactly or by a leading prefix of the tag
//! string. Tags without a name are still shown, under [`UNRESOLVED`].

use arc_swap::ArcSwap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Placeholder shown for tags that have no configured name.
pub const UNRESOLVED: &str = "(NA)";

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub struct TagNames {
    /// Exact tag to name mappings.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Tag prefix to name mappings, consulted when there is no exact match.
    /// The longest matching prefix wins.
    #[serde(default)]
    pub tag_prefixes: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for TagNames {
    fn from(tags: BTreeMap<String, String>) -> Self {
        Self {
            tags,
            tag_prefixes: BTreeMap::new(),
        }
    }
}

impl TagNames {
    pub fn resolve(&self, tag: &str) -> Option<&str> {
        if let Some(name) = self.tags.get(tag) {
            return Some(name.as_str());
        }
        self.tag_prefixes
            .iter()
            .filter(|(prefix, _)| tag.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, name)| name.as_str())
    }

    /// The `name/tag` form used in route listings.
    pub fn display(&self, tag: &str) -> String {
        format!("{}/{}", self.resolve(tag).unwrap_or(UNRESOLVED), tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len() + self.tag_prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the active tag table. Replacing the table swaps it as a whole, so a
/// reader holding a [`TagNameStore::snapshot`] never sees a mix of old and
/// new entries.
pub struct TagNameStore {
    names: ArcSwap<TagNames>,
}

impl TagNameStore {
    pub fn new(names: TagNames) -> Self {
        Self {
            names: ArcSwap::new(Arc::new(names)),
        }
    }

    pub fn snapshot(&self) -> Arc<TagNames> {
        self.names.load_full()
    }

    pub fn replace(&self, names: TagNames) {
        self.names.store(Arc::new(names));
    }
}

impl Default for TagNameStore {
    fn default() -> Self {
        Self::new(TagNames::default())
    }
}
