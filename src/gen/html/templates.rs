use std::borrow::Cow;

/// Markup templates, with `{placeholder}`s filled in at render time.
///
/// Every field is an extension point: override any of them with struct update syntax,
/// numbering and ordering of the notes stays the same.
#[derive(Debug, Clone, PartialEq, Eq, smart_default::SmartDefault)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Templates {
    /// Inline marker link. Placeholders: `{class}`, `{title}`, `{id}`, `{href}`, `{text}`
    #[default(Cow::Borrowed(
        r#"<a class="{class}" title="{title}" id="{id}" href="{href}">{text}</a>"#
    ))]
    pub marker_link: Cow<'static, str>,
    /// Text of the marker link. Placeholders: `{mark}` (mark, or the custom display text)
    #[default(Cow::Borrowed("<sup>{mark}</sup>"))]
    pub marker_text: Cow<'static, str>,
    /// Placeholders: `{id}`, `{note}`, `{backlinks}`
    #[default(Cow::Borrowed(r#"<li id="{id}">{note} {backlinks}</li>"#))]
    pub list_item: Cow<'static, str>,
    /// Link back to a single reference. Placeholders: `{href}`, `{glyph}`
    #[default(Cow::Borrowed(r#"<a href="{href}">{glyph}</a>"#))]
    pub back_link: Cow<'static, str>,
    #[default(Cow::Borrowed("&#8617;"))]
    pub back_link_glyph: Cow<'static, str>,
    /// Placed between back-links of a note referenced several times
    #[default(Cow::Borrowed(" "))]
    pub back_link_separator: Cow<'static, str>,
    /// Placeholders: `{text}`
    #[default(Cow::Borrowed("{text}"))]
    pub note_text: Cow<'static, str>,
    /// Placeholders: `{start}`, `{items}`
    #[default(Cow::Borrowed(r#"<ol start="{start}">{items}</ol>"#))]
    pub list: Cow<'static, str>,
    /// Placeholders: `{label}`, `{list}`
    #[default(Cow::Borrowed(r#"<aside class="simple-footnotes">{label}{list}</aside>"#))]
    pub section: Cow<'static, str>,
    /// Section label; not used for comments. Placeholders: `{label}`
    #[default(Cow::Borrowed(r#"<p class="notes">{label}</p>"#))]
    pub label: Cow<'static, str>,
}
