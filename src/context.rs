//! Host-facing view of "what is being rendered right now".

use crate::data::{Context, ContextKind};

/// Resolves the context of the content currently being rendered.
///
/// `None` means nothing is being rendered; every footnote operation is a no-op then.
pub trait ContextResolver {
    fn resolve(&self) -> Option<Context>;
}

impl ContextResolver for Option<Context> {
    fn resolve(&self) -> Option<Context> {
        *self
    }
}

impl ContextResolver for Context {
    fn resolve(&self) -> Option<Context> {
        Some(*self)
    }
}

impl<F: Fn() -> Option<Context>> ContextResolver for F {
    fn resolve(&self) -> Option<Context> {
        self()
    }
}

/// Resolver for hosts that know the current post and, possibly, the comment being displayed inside it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ambient {
    pub post: Option<u64>,
    pub comment: Option<u64>,
    /// Whether the comment text is the thing being rendered
    pub in_comment: bool,
}

impl ContextResolver for Ambient {
    fn resolve(&self) -> Option<Context> {
        if self.in_comment {
            self.comment.map(Context::comment)
        } else {
            self.post.map(Context::post)
        }
    }
}

/// Page of a post split into several pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView<'source> {
    /// 1-based page number; also a key of the pagination offset
    pub page: usize,
    pub pages: usize,
    /// Complete, unpaginated post source
    pub full_source: &'source str,
}

impl<'source> PageView<'source> {
    pub fn new(page: usize, pages: usize, full_source: &'source str) -> Self {
        Self {
            page,
            pages,
            full_source,
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.pages > 1
    }

    /// Tells, if footnote numbering in `context` depends on this page
    pub fn applies_to(&self, context: &Context) -> bool {
        self.is_paginated() && context.kind == ContextKind::Post
    }
}
