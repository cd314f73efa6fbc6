mod templates;

pub use templates::Templates;

use std::{borrow::Cow, fmt::Write};

use itertools::Itertools;

use crate::{
    data::{Context, ContextKind, Note, RegisteredMarker},
    registry::Registry,
    util::{escaped, escaped_href, fill, interpolate, strip_tags},
};

use super::{NoteRenderer, Res};

const MARKER_CLASS: &str = "simple-footnote";
const PREVIEW_MARKER_CLASS: &str = "simple-footnote simple-footnote-preview";

#[derive(Debug, Clone, smart_default::SmartDefault)]
pub struct HtmlRenderer {
    pub templates: Templates,
    /// Label of post sections
    #[default(Cow::Borrowed("Notes:"))]
    pub notes_label: Cow<'static, str>,
}

impl HtmlRenderer {
    pub fn new(templates: Templates) -> Self {
        Self {
            templates,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.notes_label = label.into();
        self
    }

    fn list_item(&self, context: Context, note: &Note) -> Result<String, std::fmt::Error> {
        let back_links: Vec<String> = note
            .refs
            .iter()
            .map(|reference| {
                let href = escaped_href(&format!(
                    "#{}",
                    context.reference_anchor(&note.id, reference.ordinal)
                ))?;
                fill(
                    &self.templates.back_link,
                    &[("href", href.as_str()), ("glyph", &*self.templates.back_link_glyph)],
                )
            })
            .collect::<Result<_, _>>()?;
        let back_links = back_links
            .iter()
            .join(&*self.templates.back_link_separator);
        // note text may carry markup of its own, so it's inserted as is
        let text = fill(&self.templates.note_text, &[("text", note.text.as_str())])?;
        let id = escaped(&context.note_anchor(&note.id))?;
        fill(
            &self.templates.list_item,
            &[
                ("id", id.as_str()),
                ("note", text.as_str()),
                ("backlinks", back_links.as_str()),
            ],
        )
    }
}

impl NoteRenderer for HtmlRenderer {
    fn write_marker<W: Write + ?Sized>(&self, output: &mut W, marker: &RegisteredMarker) -> Res {
        let class = if marker.preview {
            PREVIEW_MARKER_CLASS
        } else {
            MARKER_CLASS
        };
        let title = escaped(&strip_tags(&marker.note_text))?;
        let id = escaped(&marker.anchor())?;
        let href = escaped_href(&format!("#{}", marker.note_anchor()))?;
        let shown = escaped(marker.display.as_deref().unwrap_or(&marker.mark))?;
        let text = fill(&self.templates.marker_text, &[("mark", shown.as_str())])?;
        interpolate(
            output,
            &self.templates.marker_link,
            &[
                ("class", class),
                ("title", title.as_str()),
                ("id", id.as_str()),
                ("href", href.as_str()),
                ("text", text.as_str()),
            ],
        )?;
        Ok(())
    }

    fn write_list<W: Write + ?Sized>(
        &self,
        output: &mut W,
        registry: &Registry,
        context: Context,
    ) -> Res {
        let notes = registry.current_notes(context);
        if notes.is_empty() {
            return Ok(());
        }
        let items: String = notes
            .iter()
            .map(|note| self.list_item(context, note))
            .collect::<Result<_, _>>()?;
        let start = (registry.offset(context) + 1).to_string();
        interpolate(
            output,
            &self.templates.list,
            &[("start", start.as_str()), ("items", items.as_str())],
        )?;
        Ok(())
    }

    fn write_section<W: Write + ?Sized>(
        &self,
        output: &mut W,
        registry: &Registry,
        context: Context,
    ) -> Res {
        if registry.is_empty(context) {
            return Ok(());
        }
        let mut list = String::new();
        self.write_list(&mut list, registry, context)?;
        let label = match context.kind {
            ContextKind::Post => {
                let label = escaped(&self.notes_label)?;
                fill(&self.templates.label, &[("label", label.as_str())])?
            }
            ContextKind::Comment => String::new(),
        };
        interpolate(
            output,
            &self.templates.section,
            &[("label", label.as_str()), ("list", list.as_str())],
        )?;
        Ok(())
    }
}
