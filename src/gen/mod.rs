pub mod html;

use std::fmt::Write;

use crate::{
    data::{Context, RegisteredMarker},
    registry::Registry,
};

#[derive(Debug, derive_more::From, thiserror::Error)]
pub enum GenerationError {
    #[error("{}", .0)]
    Fmt(std::fmt::Error),
}

pub type Res = Result<(), GenerationError>;

/// Runs `write` against a fresh string.
///
/// Generation errors are logged, and result in no output at all (never a partial one).
fn rendered(write: impl FnOnce(&mut String) -> Res) -> Option<String> {
    let mut output = String::new();
    match write(&mut output) {
        Ok(()) => Some(output),
        Err(err) => {
            tracing::error!(error = %err, "failed to render footnotes");
            None
        }
    }
}

/// Turns registered footnotes into output markup
pub trait NoteRenderer {
    /// Writes an inline link for a single marker
    fn write_marker<W: Write + ?Sized>(&self, output: &mut W, marker: &RegisteredMarker) -> Res;

    /// Writes the ordered notes list of `context`. Writes nothing, if there are no notes.
    fn write_list<W: Write + ?Sized>(
        &self,
        output: &mut W,
        registry: &Registry,
        context: Context,
    ) -> Res;

    /// Writes the notes list wrapped into it's labelled container. Writes nothing, if there are no notes.
    fn write_section<W: Write + ?Sized>(
        &self,
        output: &mut W,
        registry: &Registry,
        context: Context,
    ) -> Res;

    fn render_marker(&self, marker: &RegisteredMarker) -> Option<String> {
        rendered(|output| self.write_marker(output, marker))
    }

    fn render_list(&self, registry: &Registry, context: Context) -> Option<String> {
        if registry.is_empty(context) {
            return None;
        }
        rendered(|output| self.write_list(output, registry, context))
    }

    fn render_section(&self, registry: &Registry, context: Context) -> Option<String> {
        if registry.is_empty(context) {
            return None;
        }
        rendered(|output| self.write_section(output, registry, context))
    }

    /// Appends the notes section of `context` to the content (if there is any)
    fn append_to(&self, mut content: String, registry: &Registry, context: Context) -> String {
        if let Some(section) = self.render_section(registry, context) {
            content.push_str(&section);
        }
        content
    }
}
