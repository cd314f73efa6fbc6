//! *Footnotes, but the boring kind.*
//!
//! This crate collects `[ref]...[/ref]` footnote markers from a piece of content and turns them into
//! numbered links, followed by a notes list with links back to every marker.
//!
//! # Markers
//! - `[ref]Some note[/ref]` - inline note. Identical note texts in the same context are the same note.
//! - `[ref id="source"]` - shared note, looked up in the [`NoteCatalog`].
//! - `[ref id="source"]see here[/ref]`, `[ref note="Some note"]see here[/ref]` - marker displays the body instead of the note's mark.
//! - `preview` attribute marks the link as a preview one (for styling).
//!
//! Markers that don't resolve to a note (unknown id, blank text) are replaced by nothing; rendering never fails.
//!
//! # Ideology
//! Footnotes are scoped by a [`Context`] (a post, or a comment), and numbering of a context restarts with every pass over content.
//! Context is always passed explicitly; the host decides what's being rendered (see [`ContextResolver`]).
//!
//! Just like with any other markup transformation, output is written into anything implementing [`Write`](std::fmt::Write),
//! so a renderer is just a set of methods writing to it (see [`NoteRenderer`]).
//! The only renderer bundled is [`HtmlRenderer`], with every literal piece of markup overridable via [`Templates`].
//!
//! # Pagination
//! A post split into several pages keeps continuous numbering: first note on a page looks itself up in the complete post source,
//! to find out how many notes precede the page. Lookup is a best-effort one, see [`resolve_absolute_index`].

mod catalog;
mod context;
/// This module defines types that are used to represent collected notes
mod data;
mod engine;
mod gen;
mod lexer;
mod registry;
mod settings;
mod util;

/// Reexports
pub use catalog::{NoteCatalog, NoteProvider, SharedNote};
pub use context::{Ambient, ContextResolver, PageView};
pub use data::{
    Context, ContextKind, Note, NoteId, NoteSource, Occurrence, Reference, RegisteredMarker,
};
pub use engine::Footnotes;
pub use gen::{
    html::{HtmlRenderer, Templates},
    GenerationError, NoteRenderer,
};
pub use lexer::{markers, scan, LexError, Segment};
pub use registry::{resolve_absolute_index, MarkStrategy, Numeric, Registry, Symbolic};
pub use settings::{Placement, Settings, SettingsError, StoredSettings, SETTINGS_VERSION};

/// Processes a single post in one go: replaces it's markers and appends the notes section
pub fn process_post(catalog: std::sync::Arc<NoteCatalog>, id: u64, content: &str) -> String {
    Footnotes::new(catalog, Settings::default()).render_post(id, content, None)
}
