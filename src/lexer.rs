//! Marker lexer.
//!
//! Recognizes `[ref]...[/ref]`, `[ref id="..."]`, `[ref note="..."]` (self-closing or enclosing, with optional
//! `preview` flag), and splits the input into plain text and marker segments.
//! Anything that fails to parse as a marker stays plain text.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_until, take_while1},
    character::complete::{char, multispace0, satisfy, space0},
    combinator::{cut, not, opt},
    error::{context, ContextError, ErrorKind, ParseError},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult, Parser,
};

use crate::data::Occurrence;

pub(crate) const OPEN: &str = "[ref";
pub(crate) const CLOSE: &str = "[/ref]";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("{kind:?} at {at:?}")]
    Nom { at: Box<str>, kind: ErrorKind },
    #[error("{context}: {inner}")]
    Context {
        context: &'static str,
        inner: Box<LexError>,
    },
}

fn snippet(input: &str) -> Box<str> {
    input.chars().take(24).collect::<String>().into()
}

impl<'source> ParseError<&'source str> for LexError {
    fn from_error_kind(input: &'source str, kind: ErrorKind) -> Self {
        Self::Nom {
            at: snippet(input),
            kind,
        }
    }

    fn append(_: &'source str, _: ErrorKind, other: Self) -> Self {
        // innermost error is the informative one
        other
    }
}

impl<'source> ContextError<&'source str> for LexError {
    fn add_context(_: &'source str, context: &'static str, other: Self) -> Self {
        Self::Context {
            context,
            inner: Box::new(other),
        }
    }
}

/// Matches `\w` the way a regex word boundary does
fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Position of the next marker opener in `text`, if any
pub(crate) fn next_opener(text: &str) -> Option<usize> {
    text.match_indices(OPEN)
        .find(|(ind, _)| {
            text[(ind + OPEN.len())..]
                .chars()
                .next()
                .map_or(true, |c| !is_word(c))
        })
        .map(|(ind, _)| ind)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Attribute, as written inside the opening tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribute<'source> {
    pub name: &'source str,
    /// `None` for bare flags, like `preview`
    pub value: Option<&'source str>,
}

fn attribute_name<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, &'source str, E> {
    take_while1(is_name_char).parse(input)
}

/// Parses `= value`, where value is double-quoted, single-quoted or bare
fn attribute_value<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, &'source str, E> {
    preceded(
        tuple((space0, char('='), space0)),
        alt((
            delimited(char('"'), take_until("\""), char('"')),
            delimited(char('\''), take_until("'"), char('\'')),
            take_till1(|c: char| c.is_whitespace() || c == ']' || c == '/'),
        )),
    )
    .parse(input)
}

fn attribute<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Attribute<'source>, E> {
    pair(attribute_name, opt(attribute_value))
        .map(|(name, value)| Attribute { name, value })
        .parse(input)
}

/// Skips whatever stands before the next attribute and can't be a part of one (whitespace, stray punctuation)
fn separator<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, &'source str, E> {
    take_till(|c: char| is_name_char(c) || matches!(c, ']' | '[' | '/'))
        .map(|skipped: &'source str| {
            if !skipped.trim().is_empty() {
                tracing::trace!(skipped, "ignoring malformed ref attributes");
            }
            skipped
        })
        .parse(input)
}

/// Parses attributes, along with any trailing whitespace
///
/// Never fails; stray characters between attributes are skipped,
/// and it stops at the first thing that can't start an attribute (`]`, `[` or `/`)
pub fn attributes<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Vec<Attribute<'source>>, E> {
    terminated(many0(preceded(separator, attribute)), multispace0).parse(input)
}

/// Parses opening tag, telling if it was self-closing (`[ref .../]`)
fn open_tag<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, (Vec<Attribute<'source>>, bool), E> {
    preceded(
        pair(tag(OPEN), not(satisfy(is_word))),
        // that's a ref tag for sure, so we lock in
        // anything up to the closing bracket is ignored, but the tag may not run into another one
        cut(context(
            "ref attributes",
            terminated(
                pair(attributes, take_till(|c: char| c == ']' || c == '[')),
                char(']'),
            ),
        )),
    )
    .map(|(attributes, tail): (_, &'source str)| {
        let tail = tail.trim_end();
        let self_closing = tail.ends_with('/');
        let skipped = tail.strip_suffix('/').unwrap_or(tail).trim();
        if !skipped.is_empty() {
            tracing::trace!(skipped, "ignoring malformed ref attributes");
        }
        (attributes, self_closing)
    })
    .parse(input)
}

/// Parses enclosed body along with the closing tag.
///
/// Body may not open another marker, so the closing tag is only looked for up to the next opener.
/// If it's not there, the tag is considered self-closing and nothing is consumed.
fn body<'source, E: ParseError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Option<&'source str>, E> {
    let stretch = &input[..next_opener(input).unwrap_or(input.len())];
    let attempt: IResult<&'source str, &'source str, E> =
        terminated(take_until(CLOSE), tag(CLOSE)).parse(stretch);
    match attempt {
        Ok((rest, body)) => Ok((&input[(stretch.len() - rest.len())..], Some(body))),
        Err(_) => Ok((input, None)),
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Folds parsed attributes and body into a typed occurrence
pub fn occurrence<'source>(
    attributes: &[Attribute<'source>],
    body: Option<&'source str>,
) -> Occurrence<'source> {
    let mut occurrence = Occurrence::default();
    let mut note = None;
    for attribute in attributes {
        match (attribute.name, attribute.value) {
            ("id", Some(value)) => occurrence.note_id = non_blank(value).map(Cow::from),
            ("note", Some(value)) => note = Some(value),
            ("preview", None) => occurrence.preview = true,
            ("preview", Some(value)) => {
                occurrence.preview = !matches!(value.trim(), "" | "0" | "false" | "no")
            }
            (name, _) => tracing::trace!(attribute = name, "ignoring ref attribute"),
        }
    }
    let body = body.filter(|body| !body.trim().is_empty());
    if occurrence.note_id.is_some() || note.is_some() {
        // note is supplied elsewhere, so body only replaces the mark
        occurrence.inline_text = note.map(Cow::from);
        occurrence.display = body.map(Cow::from);
    } else {
        occurrence.inline_text = body.map(Cow::from);
    }
    occurrence
}

/// Parses a single marker, starting right at it's opening bracket
pub fn marker<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Occurrence<'source>, E> {
    let (rest, (attributes, self_closing)) = context("ref marker", open_tag).parse(input)?;
    let (rest, body) = if self_closing {
        (rest, None)
    } else {
        body(rest)?
    };
    Ok((rest, occurrence(&attributes, body)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'source> {
    Text(&'source str),
    Marker {
        occurrence: Occurrence<'source>,
        /// Marker exactly as written in the source
        raw: &'source str,
    },
}

/// Splits input into text and marker segments, in document order
pub fn scan(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut search = 0;
    while let Some(found) = input[search..].find(OPEN) {
        let start = search + found;
        match marker::<LexError>(&input[start..]) {
            Ok((rest, occurrence)) => {
                let end = input.len() - rest.len();
                if cursor < start {
                    segments.push(Segment::Text(&input[cursor..start]));
                }
                segments.push(Segment::Marker {
                    occurrence,
                    raw: &input[start..end],
                });
                cursor = end;
                search = end;
            }
            Err(err) => {
                tracing::trace!(error = %err, "not a ref marker");
                search = start + OPEN.len();
            }
        }
    }
    if cursor < input.len() {
        segments.push(Segment::Text(&input[cursor..]));
    }
    segments
}

/// Markers found in the input, in document order
pub fn markers(input: &str) -> impl Iterator<Item = Occurrence<'_>> {
    scan(input).into_iter().filter_map(|segment| match segment {
        Segment::Marker { occurrence, .. } => Some(occurrence),
        Segment::Text(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test {
        {$name:ident, $parser:expr, $input:literal, e: $expected:expr} => {
            #[test]
            fn $name() {
                // arrange

                // act
                let result: Result<_, nom::Err<LexError>>;
                result = $parser.parse($input);

                // assert
                let expected = $expected;
                if result != expected {
                    panic!("Parser did not produce expected result. Structure comparison:\n\tExpected:{:#?}\n\n\tActual:{:#?}", expected, result);
                }
            }
        };
        {$name:ident, $parser:expr, $input:literal, p: $expected:pat} => {
            #[test]
            fn $name() {
                // arrange

                // act
                let result: Result<_, nom::Err<LexError>>;
                result = $parser.parse($input);

                // assert
                if !matches!(result, $expected) {
                    panic!("{}: {:?}", "Parser did not produce complying result:", result);
                }
            }
        };
    }

    macro_rules! attr {
        ($name:literal) => {
            Attribute {
                name: $name,
                value: None,
            }
        };
        ($name:literal = $value:literal) => {
            Attribute {
                name: $name,
                value: Some($value),
            }
        };
    }

    // `attributes` tests
    test! {attributes_empty, attributes, "]", e: Ok(("]", vec![]))}
    test! {attributes_double_quoted, attributes, " id=\"intro\"]", e: Ok(("]", vec![attr!("id" = "intro")]))}
    test! {attributes_single_quoted, attributes, " id = 'intro' ]", e: Ok(("]", vec![attr!("id" = "intro")]))}
    test! {attributes_bare_value, attributes, " id=intro/]", e: Ok(("/]", vec![attr!("id" = "intro")]))}
    test! {attributes_flag, attributes, " note=\"Some text\" preview]", e: Ok(("]", vec![attr!("note" = "Some text"), attr!("preview")]))}
    test! {attributes_empty_value, attributes, " note=\"\"]", e: Ok(("]", vec![attr!("note" = "")]))}
    test! {attributes_stray_punctuation, attributes, ", id=\"x\"; preview ]", e: Ok(("]", vec![attr!("id" = "x"), attr!("preview")]))}
    test! {attributes_stop_at_unknown, attributes, " id=\"x\" @ ]", e: Ok(("@ ]", vec![attr!("id" = "x")]))}

    macro_rules! occ {
        (^ $text:literal) => {
            Occurrence::inline($text)
        };
        (# $id:literal) => {
            Occurrence::shared($id)
        };
        (none) => {
            Occurrence::default()
        };
    }

    mod marker {
        use super::*;

        macro_rules! test_ok {
            {$name:ident, $input:literal, $output:expr, $left_over:literal} => {
                test!{$name, marker, $input, e: Ok(($left_over, $output))}
            };
        }

        macro_rules! test_err {
            {$name:ident, $input:literal} => {
                test!{$name, marker, $input, p: Err(_)}
            };
        }

        test_err! {err_empty, ""}
        test_err! {err_other_tag, "[reference]text[/reference]"}
        test_err! {err_unclosed_bracket, "[ref id=\"x\""}
        test_ok! {ok_enclosing, "[ref]First note.[/ref] after", occ!(^"First note."), " after"}
        test_ok! {ok_body_kept_raw, "[ref] spaced [/ref]", occ!(^" spaced "), ""}
        test_ok! {ok_shared, "[ref id=\"intro\"] after", occ!(#"intro"), " after"}
        test_ok! {ok_shared_self_closing, "[ref id=\"intro\" /]", occ!(#"intro"), ""}
        test_ok! {ok_shared_display, "[ref id=\"intro\"]see[/ref]", occ!(#"intro").with_display("see"), ""}
        test_ok! {ok_note_attribute, "[ref note=\"From attribute\"]", occ!(^"From attribute"), ""}
        test_ok! {ok_note_attribute_display, "[ref note=\"From attribute\"]*[/ref]", occ!(^"From attribute").with_display("*"), ""}
        test_ok! {ok_preview, "[ref preview]Shown[/ref]", occ!(^"Shown").with_preview(true), ""}
        test_ok! {ok_preview_false, "[ref preview=\"false\"]Shown[/ref]", occ!(^"Shown"), ""}
        test_ok! {ok_unknown_attribute, "[ref colour=\"red\"]Text[/ref]", occ!(^"Text"), ""}
        test_ok! {ok_blank_body, "[ref]   [/ref]", occ!(none), ""}
        test_ok! {ok_unterminated, "[ref]never closed", occ!(none), "never closed"}
        test_ok! {ok_nested_open, "[ref id=\"a\"] then [ref]B[/ref]", occ!(#"a"), " then [ref]B[/ref]"}
        test_ok! {ok_comma_separated, "[ref id=\"x\", preview] b", occ!(#"x").with_preview(true), " b"}
        test_ok! {ok_value_without_name, "[ref id=\"x\" =\"bad\"]", occ!(#"x"), ""}
        test_ok! {ok_positional_value, "[ref id=\"x\" \"positional\"]", occ!(#"x"), ""}
        test_ok! {ok_stray_symbol, "[ref id=\"x\" @]", occ!(#"x"), ""}
        test_ok! {ok_leading_comma, "[ref, id=\"x\"]", occ!(#"x"), ""}
        test_ok! {ok_junk_before_slash, "[ref id=\"x\" ; /]kept[/ref]", occ!(#"x"), "kept[/ref]"}
        test_err! {err_runs_into_next_tag, "[ref id=\"x\" [ref]B[/ref]"}
        test_ok! {ok_multiline, "[ref]line one\nline two[/ref]", occ!(^"line one\nline two"), ""}
    }

    #[test]
    fn scan_splits_text_and_markers() {
        // arrange
        let input = "See[ref]First note.[/ref] more[ref]Second note.[/ref]";

        // act
        let segments = scan(input);

        // assert
        assert_eq!(
            segments,
            vec![
                Segment::Text("See"),
                Segment::Marker {
                    occurrence: occ!(^"First note."),
                    raw: "[ref]First note.[/ref]"
                },
                Segment::Text(" more"),
                Segment::Marker {
                    occurrence: occ!(^"Second note."),
                    raw: "[ref]Second note.[/ref]"
                },
            ]
        );
    }

    #[test]
    fn scan_keeps_malformed_as_text() {
        let input = "a [ref id=\"x\" b [references] c";

        let segments = scan(input);

        assert_eq!(segments, vec![Segment::Text(input)]);
    }

    #[test]
    fn scan_many_unclosed_markers() {
        // arrange
        let input = "[ref]x ".repeat(20_000);

        // act
        let segments = scan(&input);

        // assert
        assert_eq!(segments.len(), 40_000);
        assert!(segments
            .iter()
            .step_by(2)
            .all(|segment| matches!(segment, Segment::Marker { raw: "[ref]", .. })));
        assert_eq!(segments.last(), Some(&Segment::Text("x ")));
    }

    #[test]
    fn scan_unicode() {
        let input = "Текст[ref]Примітка[/ref].";

        let found: Vec<_> = markers(input).collect();

        assert_eq!(found, vec![occ!(^"Примітка")]);
        assert_eq!(scan(input).last(), Some(&Segment::Text(".")));
    }

    #[test]
    fn next_opener_respects_word_boundary() {
        assert_eq!(next_opener("x [ref]"), Some(2));
        assert_eq!(next_opener("[ref id=1]"), Some(0));
        assert_eq!(next_opener("[ref"), Some(0));
        assert_eq!(next_opener("[references] [ref]"), Some(13));
        assert_eq!(next_opener("[references]"), None);
        assert_eq!(next_opener("plain"), None);
    }
}
