use std::borrow::{Borrow, Cow};

use itertools::Itertools;
use sha2::{Digest, Sha256};

/// Kind of content a footnote context belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContextKind {
    #[display(fmt = "post")]
    Post,
    #[display(fmt = "comment")]
    Comment,
}

impl ContextKind {
    /// Prefix of every note anchor rendered inside this kind of context
    pub fn anchor_prefix(&self) -> &'static str {
        match self {
            ContextKind::Post => "note-",
            ContextKind::Comment => "comment-note-",
        }
    }
}

/// A rendering scope: notes never leak from one context into another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[display(fmt = "{}#{}", kind, id)]
pub struct Context {
    pub kind: ContextKind,
    pub id: u64,
}

impl Context {
    pub fn post(id: u64) -> Self {
        Self {
            kind: ContextKind::Post,
            id,
        }
    }

    pub fn comment(id: u64) -> Self {
        Self {
            kind: ContextKind::Comment,
            id,
        }
    }

    /// Anchor of the list item for `note` within this context
    pub fn note_anchor(&self, note: &NoteId) -> String {
        format!("{}{}-{}", self.kind.anchor_prefix(), self.id, note)
    }

    /// Anchor of a single reference to `note`; unique per `ordinal`
    pub fn reference_anchor(&self, note: &NoteId, ordinal: usize) -> String {
        format!("return-{}-{}", self.note_anchor(note), ordinal)
    }
}

/// Key of a note, unique within a context
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
    derive_more::Deref,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NoteId(String);

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl NoteId {
    /// Derives an id from inline note text.
    ///
    /// Same text always maps onto the same id, so repeated inline notes collapse into one.
    pub fn inline(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(digest[..8].iter().map(|byte| format!("{byte:02x}")).join(""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where the note's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteSource {
    /// Written right at the marker
    Inline,
    /// Taken from the global catalog
    Shared,
}

/// One occurrence of a marker pointing at a [`Note`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reference {
    /// 1-based position among the note's references
    pub ordinal: usize,
    /// Text shown instead of the mark
    pub display: Option<String>,
    pub preview: bool,
}

/// A distinct footnote, possibly referenced multiple times
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pub id: NoteId,
    pub source: NoteSource,
    /// Note body; may carry inline markup
    pub text: String,
    /// 1-based, in first-encounter order
    pub index: usize,
    pub mark: String,
    /// Never empty
    pub refs: Vec<Reference>,
}

/// A single marker, as recognized by the lexer.
///
/// Attributes the marker syntax doesn't know about are dropped on the way here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occurrence<'source> {
    /// `id` attribute: a shared note from the catalog
    pub note_id: Option<Cow<'source, str>>,
    /// Inline note body (`note` attribute or the enclosed body)
    pub inline_text: Option<Cow<'source, str>>,
    /// Enclosed body shown instead of the mark
    pub display: Option<Cow<'source, str>>,
    pub preview: bool,
}

impl<'source> Occurrence<'source> {
    pub fn inline(text: impl Into<Cow<'source, str>>) -> Self {
        Self {
            inline_text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn shared(id: impl Into<Cow<'source, str>>) -> Self {
        Self {
            note_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<Cow<'source, str>>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}

/// Everything needed to render one inline marker link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredMarker {
    pub context: Context,
    pub note_id: NoteId,
    pub ordinal: usize,
    pub index: usize,
    pub mark: String,
    pub display: Option<String>,
    pub preview: bool,
    /// Note text, used for the link's tooltip
    pub note_text: String,
}

impl RegisteredMarker {
    pub fn note_anchor(&self) -> String {
        self.context.note_anchor(&self.note_id)
    }

    pub fn anchor(&self) -> String {
        self.context.reference_anchor(&self.note_id, self.ordinal)
    }
}
