//! Process-wide catalog of shared notes, referenced from markers by id.

use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::data::NoteId;

/// A note template, shared between every context referencing it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedNote {
    pub id: NoteId,
    pub text: String,
}

impl SharedNote {
    pub fn new(id: impl Into<NoteId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Source of shared notes, asked exactly once
pub trait NoteProvider {
    fn shared_notes(&self) -> Vec<SharedNote>;
}

impl<F: Fn() -> Vec<SharedNote>> NoteProvider for F {
    fn shared_notes(&self) -> Vec<SharedNote> {
        self()
    }
}

impl NoteProvider for Vec<SharedNote> {
    fn shared_notes(&self) -> Vec<SharedNote> {
        self.clone()
    }
}

#[derive(Debug, Default)]
struct Loaded {
    notes: Vec<SharedNote>,
    by_id: HashMap<NoteId, usize>,
}

impl Loaded {
    fn collect(provided: Vec<SharedNote>) -> Self {
        let mut loaded = Loaded::default();
        for note in provided {
            if note.text.trim().is_empty() {
                tracing::warn!(id = %note.id, "skipping shared note with blank text");
                continue;
            }
            if loaded.by_id.contains_key(&note.id) {
                tracing::warn!(id = %note.id, "duplicate shared note id, keeping the first one");
                continue;
            }
            loaded.by_id.insert(note.id.clone(), loaded.notes.len());
            loaded.notes.push(note);
        }
        loaded
    }
}

/// Shared notes, loaded at most once.
///
/// Until [`NoteCatalog::load`] is called, catalog behaves as an empty one.
/// Concurrent first-time loads converge on a single provider call.
#[derive(Debug, Default)]
pub struct NoteCatalog {
    loaded: OnceCell<Loaded>,
}

impl NoteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog that is already loaded from `provider`
    pub fn with_provider(provider: &impl NoteProvider) -> Self {
        let catalog = Self::new();
        catalog.load(provider);
        catalog
    }

    /// Loads notes from `provider`, unless already loaded
    pub fn load(&self, provider: &impl NoteProvider) -> &Self {
        self.loaded.get_or_init(|| {
            let loaded = Loaded::collect(provider.shared_notes());
            tracing::debug!(count = loaded.notes.len(), "shared notes loaded");
            loaded
        });
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    pub fn get(&self, id: &str) -> Option<&SharedNote> {
        let loaded = self.loaded.get()?;
        loaded.by_id.get(id).and_then(|index| loaded.notes.get(*index))
    }

    /// Notes in the order provider returned them
    pub fn list(&self) -> &[SharedNote] {
        self.loaded
            .get()
            .map(|loaded| loaded.notes.as_slice())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }

    pub fn many(&self) -> bool {
        self.count() > 1
    }
}
