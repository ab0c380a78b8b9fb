//! Playback queue model
//!
//! An ordered, indexable sequence of playable items plus a zero-based
//! cursor. The cursor may sit one past the last item, which marks the queue
//! as exhausted. Item sequences are never edited in place: a refresh builds
//! a new `Queue` that replaces the old one at a rotation boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable item identifier, preserved across catalog refreshes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the media surface should load for an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaRef {
    /// One file carrying both picture and sound
    Single { url: String },
    /// Muted video with a separate audio track played alongside
    Pair { video: String, audio: String },
}

impl MediaRef {
    /// URL whose progress drives completion
    ///
    /// For a pair the audio track is authoritative; the video only decorates.
    pub fn primary_url(&self) -> &str {
        match self {
            MediaRef::Single { url } => url,
            MediaRef::Pair { audio, .. } => audio,
        }
    }
}

/// Optional descriptive metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default)]
    pub title: Option<String>,

    /// Creator or uploader shown next to the title
    #[serde(default)]
    pub attribution: Option<String>,

    /// Ranking score (e.g. weekly play count)
    #[serde(default)]
    pub popularity: Option<i64>,

    /// Known media length, when the catalog provides it
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// An opaque playable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub media: MediaRef,
    #[serde(default)]
    pub meta: ItemMeta,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, media: MediaRef) -> Self {
        Self {
            id: id.into(),
            media,
            meta: ItemMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Ordered items plus a cursor in `[0, len]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    items: Vec<Item>,
    index: usize,
}

impl Queue {
    /// Create a queue positioned at its first item
    pub fn new(items: Vec<Item>) -> Self {
        Self { items, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current cursor position; equals `len()` once exhausted
    pub fn index(&self) -> usize {
        self.index
    }

    /// True when the cursor has moved past the last item
    ///
    /// An empty queue is exhausted from the start.
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.items.len()
    }

    /// Item under the cursor, or `None` when exhausted or empty
    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.index)
    }

    /// Move the cursor forward one step, saturating at `len()`
    pub fn advance(&mut self) {
        if self.index < self.items.len() {
            self.index += 1;
        }
    }

    /// Rewind the cursor to the first item
    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Position of the item with `id`, if present
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}
