use std::fmt::Write;

use once_cell::sync::Lazy;
use pulldown_cmark_escape::{escape_href, escape_html, FmtWriter};
use regex::Regex;

/// Substitutes `{name}` placeholders of `template` in a single pass.
///
/// Substituted values are never scanned again, so they may contain braces freely.
/// Placeholders without a matching value are kept as they are.
pub fn interpolate<W: Write + ?Sized>(
    output: &mut W,
    template: &str,
    values: &[(&str, &str)],
) -> std::fmt::Result {
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.write_str(&rest[..open])?;
        let candidate = &rest[open..];
        let substituted = candidate.find('}').and_then(|close| {
            let name = &candidate[1..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match substituted {
            Some((close, value)) => {
                output.write_str(value)?;
                rest = &candidate[(close + 1)..];
            }
            None => {
                output.write_char('{')?;
                rest = &candidate[1..];
            }
        }
    }
    output.write_str(rest)
}

/// Same as [`interpolate`], but into a fresh string
pub fn fill(template: &str, values: &[(&str, &str)]) -> Result<String, std::fmt::Error> {
    let mut output = String::with_capacity(template.len());
    interpolate(&mut output, template, values)?;
    Ok(output)
}

/// Escapes text for use in element bodies and attribute values
pub fn escaped(text: &str) -> Result<String, std::fmt::Error> {
    let mut output = String::with_capacity(text.len());
    escape_html(FmtWriter(&mut output), text)?;
    Ok(output)
}

/// Escapes link target for use in `href` attribute
pub fn escaped_href(href: &str) -> Result<String, std::fmt::Error> {
    let mut output = String::with_capacity(href.len());
    escape_href(FmtWriter(&mut output), href)?;
    Ok(output)
}

static SCRIPTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:script|style)[^>]*?>.*?</(?:script|style)>")
        .expect("Script/style pattern is valid")
});
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Tag pattern is valid"));

/// Removes all tags (and script/style contents) from markup, leaving plain text
pub fn strip_tags(markup: &str) -> String {
    let without_scripts = SCRIPTS.replace_all(markup, "");
    TAGS.replace_all(&without_scripts, "").trim().to_owned()
}
