//! Content pass driver: finds markers, links them to their notes and appends the notes section.

use std::sync::Arc;

use crate::{
    catalog::NoteCatalog,
    context::{ContextResolver, PageView},
    data::{Context, ContextKind},
    gen::{html::HtmlRenderer, NoteRenderer},
    lexer::{self, Segment},
    registry::Registry,
    settings::{Placement, Settings},
};

/// Footnotes of a single request.
///
/// Every content pass is expected to go through [`Footnotes::render`] (or one of it's specialized versions) exactly once:
/// markers are replaced with links, the notes section is appended and the context is cleared afterwards.
#[derive(Debug)]
pub struct Footnotes<R: NoteRenderer = HtmlRenderer> {
    registry: Registry,
    renderer: R,
    settings: Settings,
}

impl Default for Footnotes {
    fn default() -> Self {
        Self::new(Arc::default(), Settings::default())
    }
}

impl Footnotes {
    pub fn new(catalog: Arc<NoteCatalog>, settings: Settings) -> Self {
        let renderer = HtmlRenderer::default().with_label(settings.notes_label.clone());
        Self {
            registry: Registry::new(catalog),
            renderer,
            settings,
        }
    }
}

impl<R: NoteRenderer> Footnotes<R> {
    pub fn with_renderer<T: NoteRenderer>(self, renderer: T) -> Footnotes<T> {
        Footnotes {
            registry: self.registry,
            renderer,
            settings: self.settings,
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Tells, if markers in `context` should be processed
    fn enabled(&self, context: &Context) -> bool {
        match context.kind {
            ContextKind::Post => true,
            ContextKind::Comment => self.settings.comment_footnotes,
        }
    }

    /// Replaces every marker of `content` with a link to it's note.
    ///
    /// Markers that don't resolve to a note are replaced with nothing.
    /// Without a context (or for comments, if those are disabled) content is returned as is.
    pub fn run_markers(
        &mut self,
        context: Option<Context>,
        content: &str,
        page: Option<&PageView<'_>>,
    ) -> String {
        let Some(context) = context.filter(|context| self.enabled(context)) else {
            tracing::trace!("no footnotes context, content left as is");
            return content.to_owned();
        };
        let mut output = String::with_capacity(content.len());
        for segment in lexer::scan(content) {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Marker { occurrence, raw } => {
                    let link = self
                        .registry
                        .register_on_page(context, &occurrence, page)
                        .and_then(|marker| self.renderer.render_marker(&marker));
                    match link {
                        Some(link) => output.push_str(&link),
                        None => tracing::debug!(%context, marker = raw, "marker dropped"),
                    }
                }
            }
        }
        output
    }

    /// Appends notes section of `context` to the content, and forgets the notes
    pub fn append(&mut self, context: Option<Context>, content: String) -> String {
        let Some(context) = context else {
            return content;
        };
        let content = self.renderer.append_to(content, &self.registry, context);
        self.registry.clear(context);
        content
    }

    /// Full pass over a content of whatever `resolver` says is being rendered
    pub fn render(
        &mut self,
        resolver: &impl ContextResolver,
        content: &str,
        page: Option<&PageView<'_>>,
    ) -> String {
        match resolver.resolve() {
            Some(Context {
                kind: ContextKind::Post,
                id,
            }) => self.render_post(id, content, page),
            Some(Context {
                kind: ContextKind::Comment,
                id,
            }) => self.render_comment(id, content),
            None => content.to_owned(),
        }
    }

    /// Full pass over a post (or a single page of it).
    ///
    /// With [`Placement::PageLinks`], section of a paginated post is kept until [`Footnotes::append_after_page_links`].
    pub fn render_post(&mut self, id: u64, content: &str, page: Option<&PageView<'_>>) -> String {
        let context = Some(Context::post(id));
        let content = self.run_markers(context, content, page);
        let paginated = page.is_some_and(PageView::is_paginated);
        if self.settings.placement == Placement::PageLinks && paginated {
            return content;
        }
        self.append(context, content)
    }

    pub fn render_comment(&mut self, id: u64, content: &str) -> String {
        let context = Some(Context::comment(id));
        if !self.enabled(&Context::comment(id)) {
            return content.to_owned();
        }
        let content = self.run_markers(context, content, None);
        self.append(context, content)
    }

    /// Appends the deferred section of a post to markup following it's page links.
    ///
    /// Page links may be rendered twice (above and below the content); only the first call after the pass gets the section.
    pub fn append_after_page_links(&mut self, post: u64, after: String) -> String {
        if self.settings.placement != Placement::PageLinks {
            return after;
        }
        self.append(Some(Context::post(post)), after)
    }

    /// Forgets everything collected so far, except for pagination offsets
    pub fn clear_all(&mut self) {
        self.registry.clear_all();
    }
}
