//! Footnote registry: collects notes per context and assigns their indices and marks.

use std::{borrow::Cow, collections::HashMap, fmt::Debug, sync::Arc};

use cached::{Cached, UnboundCache};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    catalog::NoteCatalog,
    context::PageView,
    data::{Context, ContextKind, Note, NoteId, NoteSource, Occurrence, Reference, RegisteredMarker},
    lexer::{self, LexError},
};

/// Turns a note number into the mark displayed for it
pub trait MarkStrategy {
    fn mark(&self, number: usize) -> String;
}

impl<F: Fn(usize) -> String> MarkStrategy for F {
    fn mark(&self, number: usize) -> String {
        self(number)
    }
}

/// `1`, `2`, `3`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct Numeric;

impl MarkStrategy for Numeric {
    fn mark(&self, number: usize) -> String {
        number.to_string()
    }
}

/// Cycles through symbols, repeating them once exhausted: `*`, `†`, ..., `**`, `††`, ...
#[derive(Debug, Clone, smart_default::SmartDefault)]
pub struct Symbolic {
    #[default(vec!["*".into(), "†".into(), "‡".into(), "§".into(), "‖".into(), "¶".into()])]
    pub symbols: Vec<Cow<'static, str>>,
}

impl MarkStrategy for Symbolic {
    fn mark(&self, number: usize) -> String {
        if number == 0 || self.symbols.is_empty() {
            return number.to_string();
        }
        let len = self.symbols.len();
        self.symbols[(number - 1) % len].repeat((number - 1) / len + 1)
    }
}

#[derive(Debug, Default)]
struct ContextNotes {
    notes: Vec<Note>,
    by_id: HashMap<NoteId, usize>,
    /// Number of notes preceding this page, for paginated posts
    offset: usize,
}

/// Markers of the complete source: prefix char, tag, attributes, self-closing slash, body, suffix char
static MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(.?)\[(ref)\b(.*?)(?:(/))?\](?:(.+?)\[/ref\])?(.?)")
        .expect("Marker pattern is valid")
});

fn attribute<'c>(captures: &Captures<'c>, name: &str) -> Option<&'c str> {
    let raw = captures.get(3)?.as_str();
    let (_, attributes) = lexer::attributes::<LexError>(raw).ok()?;
    attributes
        .into_iter()
        .find(|attribute| attribute.name == name)
        .and_then(|attribute| attribute.value)
}

/// Position of `note`'s first marker among all markers of `full_source` (zero-based).
///
/// Scans the raw text with a pattern, not with the lexer, so nested or malformed markers may be miscounted.
/// Returns 0, if the note was not found.
pub fn resolve_absolute_index(full_source: &str, note: &Note) -> usize {
    MARKERS
        .captures_iter(full_source)
        .position(|captures| match note.source {
            NoteSource::Inline => {
                captures
                    .get(5)
                    .is_some_and(|body| body.as_str() == note.text)
                    || attribute(&captures, "note") == Some(note.text.as_str())
            }
            NoteSource::Shared => attribute(&captures, "id")
                .is_some_and(|id| id.trim() == note.id.as_str()),
        })
        .unwrap_or(0)
}

pub struct Registry {
    catalog: Arc<NoteCatalog>,
    marks: Box<dyn MarkStrategy + Send + Sync>,
    contexts: HashMap<Context, ContextNotes>,
    pagination: UnboundCache<(u64, usize), usize>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("catalog", &self.catalog)
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::default())
    }
}

impl Registry {
    pub fn new(catalog: Arc<NoteCatalog>) -> Self {
        Self {
            catalog,
            marks: Box::new(Numeric),
            contexts: HashMap::new(),
            pagination: UnboundCache::new(),
        }
    }

    pub fn with_marks(mut self, marks: impl MarkStrategy + Send + Sync + 'static) -> Self {
        self.marks = Box::new(marks);
        self
    }

    pub fn catalog(&self) -> &NoteCatalog {
        &self.catalog
    }

    /// Finds out which note an occurrence points at: `(id, source, text)`
    fn resolve(&self, occurrence: &Occurrence<'_>) -> Option<(NoteId, NoteSource, String)> {
        if let Some(id) = occurrence.note_id.as_deref() {
            let Some(shared) = self.catalog.get(id) else {
                tracing::debug!(id, "unknown shared note, dropping marker");
                return None;
            };
            return Some((shared.id.clone(), NoteSource::Shared, shared.text.clone()));
        }
        let Some(text) = occurrence
            .inline_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        else {
            tracing::trace!("blank inline note, dropping marker");
            return None;
        };
        Some((NoteId::inline(text), NoteSource::Inline, text.to_owned()))
    }

    /// Records an occurrence in `context`.
    ///
    /// Returns `None` (and changes nothing) if the occurrence doesn't resolve to a note.
    pub fn register(
        &mut self,
        context: Context,
        occurrence: &Occurrence<'_>,
    ) -> Option<RegisteredMarker> {
        self.register_on_page(context, occurrence, None)
    }

    /// Same as [`Registry::register`], but the first note of a paginated post continues numbering of previous pages
    pub fn register_on_page(
        &mut self,
        context: Context,
        occurrence: &Occurrence<'_>,
        page: Option<&PageView<'_>>,
    ) -> Option<RegisteredMarker> {
        let (id, source, text) = self.resolve(occurrence)?;

        let is_new = !self
            .contexts
            .get(&context)
            .is_some_and(|notes| notes.by_id.contains_key(&id));
        if is_new {
            let index = self.count(context) + 1;
            let mut note = Note {
                id: id.clone(),
                source,
                text,
                index,
                mark: String::new(),
                refs: Vec::new(),
            };
            let offset = page
                .filter(|page| index == 1 && page.applies_to(&context))
                .map(|page| self.pagination_offset(context, page.page, page.full_source, &note));
            let notes = self.contexts.entry(context).or_default();
            if let Some(offset) = offset {
                notes.offset = offset;
            }
            note.mark = self.marks.mark(notes.offset + index);
            tracing::debug!(%context, id = %note.id, index, mark = %note.mark, "note created");
            notes.by_id.insert(id.clone(), notes.notes.len());
            notes.notes.push(note);
        }

        let notes = self.contexts.get_mut(&context)?;
        let position = *notes.by_id.get(&id)?;
        let note = notes.notes.get_mut(position)?;
        let ordinal = note.refs.len() + 1;
        let display = occurrence.display.as_deref().map(str::to_owned);
        note.refs.push(Reference {
            ordinal,
            display: display.clone(),
            preview: occurrence.preview,
        });
        Some(RegisteredMarker {
            context,
            note_id: id,
            ordinal,
            index: note.index,
            mark: note.mark.clone(),
            display,
            preview: occurrence.preview,
            note_text: note.text.clone(),
        })
    }

    /// Notes of `context`, by index ascending
    pub fn current_notes(&self, context: Context) -> &[Note] {
        self.contexts
            .get(&context)
            .map(|notes| notes.notes.as_slice())
            .unwrap_or_default()
    }

    pub fn note(&self, context: Context, id: &str) -> Option<&Note> {
        let notes = self.contexts.get(&context)?;
        notes.by_id.get(id).and_then(|position| notes.notes.get(*position))
    }

    pub fn is_empty(&self, context: Context) -> bool {
        self.count(context) == 0
    }

    pub fn count(&self, context: Context) -> usize {
        self.current_notes(context).len()
    }

    /// Number of notes on previous pages; list numbering starts right after it
    pub fn offset(&self, context: Context) -> usize {
        self.contexts
            .get(&context)
            .map(|notes| notes.offset)
            .unwrap_or_default()
    }

    /// Forgets every note of `context`
    pub fn clear(&mut self, context: Context) {
        if let Some(notes) = self.contexts.remove(&context) {
            tracing::trace!(%context, count = notes.notes.len(), "footnotes cleared");
        }
    }

    /// Forgets every note of every context.
    ///
    /// Pagination offsets are kept, since they depend on the source only.
    pub fn clear_all(&mut self) {
        self.contexts.clear();
    }

    /// Starting offset of `page` of a paginated post, computed once per post and page.
    ///
    /// Notes already registered in `context` (if any) are re-marked to continue the numbering;
    /// a context without notes is left as it is.
    /// Comments are never paginated, so they always start at zero.
    pub fn pagination_offset(
        &mut self,
        context: Context,
        page: usize,
        full_source: &str,
        first_note: &Note,
    ) -> usize {
        if context.kind == ContextKind::Comment {
            return 0;
        }
        let offset = *self
            .pagination
            .cache_get_or_set_with((context.id, page), || {
                let offset = resolve_absolute_index(full_source, first_note);
                tracing::debug!(%context, page, offset, "pagination offset resolved");
                offset
            });
        if let Some(notes) = self.contexts.get_mut(&context) {
            notes.offset = offset;
            for note in notes.notes.iter_mut() {
                note.mark = self.marks.mark(offset + note.index);
            }
        }
        offset
    }
}
