//! Host settings of footnote rendering.

use std::{fmt::Display, str::FromStr};

/// Schema version of the current settings layout
pub const SETTINGS_VERSION: u32 = 1;

/// Where the notes section of a post goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Placement {
    /// Right after the content
    #[default]
    Content,
    /// After page links of a paginated post
    PageLinks,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown footnotes placement: {:?}", .0)]
    UnknownPlacement(String),
}

impl FromStr for Placement {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "content" => Ok(Placement::Content),
            "page_links" => Ok(Placement::PageLinks),
            other => Err(SettingsError::UnknownPlacement(other.to_owned())),
        }
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::Content => write!(f, "content"),
            Placement::PageLinks => write!(f, "page_links"),
        }
    }
}

/// Settings exactly as the host stored them, possibly from an older version or hand-edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoredSettings {
    pub db_version: Option<u32>,
    pub placement: Option<String>,
    pub comment_footnotes: Option<bool>,
    pub notes_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, smart_default::SmartDefault)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    pub placement: Placement,
    /// Whether markers inside comments are processed at all
    pub comment_footnotes: bool,
    #[default("Notes:".to_owned())]
    pub notes_label: String,
    #[default(SETTINGS_VERSION)]
    pub db_version: u32,
}

impl Settings {
    /// Migrates stored settings to the current version.
    ///
    /// Returns `true`, if anything was changed (and should be stored back).
    pub fn upgrade(stored: &mut StoredSettings) -> bool {
        let version = stored.db_version.unwrap_or_default();
        if version >= SETTINGS_VERSION {
            return false;
        }
        if version < 1 {
            stored.placement = Some(Placement::Content.to_string());
        }
        stored.db_version = Some(SETTINGS_VERSION);
        tracing::debug!(from = version, to = SETTINGS_VERSION, "settings upgraded");
        true
    }

    /// Coerces arbitrary stored preferences into valid settings.
    ///
    /// Anything other than `page_links` falls back to the default placement.
    pub fn sanitize(stored: &StoredSettings) -> Self {
        let placement = match stored.placement.as_deref().map(Placement::from_str) {
            Some(Ok(Placement::PageLinks)) => Placement::PageLinks,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "falling back to default placement");
                Placement::default()
            }
            Some(Ok(Placement::Content)) | None => Placement::default(),
        };
        let defaults = Self::default();
        Self {
            placement,
            comment_footnotes: stored.comment_footnotes.unwrap_or(defaults.comment_footnotes),
            notes_label: stored
                .notes_label
                .clone()
                .filter(|label| !label.trim().is_empty())
                .unwrap_or(defaults.notes_label),
            db_version: SETTINGS_VERSION,
        }
    }

    /// Upgrades, then sanitizes stored settings
    pub fn load(mut stored: StoredSettings) -> Self {
        Self::upgrade(&mut stored);
        Self::sanitize(&stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test {
        {$name:ident, $input:literal, $expected:expr} => {
            #[test]
            fn $name() {
                // act
                let placement = Placement::from_str($input);

                // assert
                assert_eq!(placement, $expected);
            }
        };
    }

    test! {content, "content", Ok(Placement::Content)}
    test! {page_links, "page_links", Ok(Placement::PageLinks)}
    test! {padded, " page_links\n", Ok(Placement::PageLinks)}
    test! {unknown, "footer", Err(SettingsError::UnknownPlacement("footer".to_owned()))}

    #[test]
    fn placement_display_parses_back() {
        for placement in [Placement::Content, Placement::PageLinks] {
            assert_eq!(placement.to_string().parse(), Ok(placement));
        }
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.placement, Placement::Content);
        assert!(!settings.comment_footnotes);
        assert_eq!(settings.notes_label, "Notes:");
        assert_eq!(settings.db_version, SETTINGS_VERSION);
    }

    #[test]
    fn unversioned_settings_are_upgraded() {
        // arrange
        let mut stored = StoredSettings {
            placement: Some("page_links".to_owned()),
            ..Default::default()
        };

        // act
        let changed = Settings::upgrade(&mut stored);

        // assert
        assert!(changed);
        assert_eq!(stored.db_version, Some(SETTINGS_VERSION));
        assert_eq!(stored.placement.as_deref(), Some("content"));
        assert!(!Settings::upgrade(&mut stored));
    }

    #[test]
    fn current_settings_are_kept() {
        let mut stored = StoredSettings {
            db_version: Some(SETTINGS_VERSION),
            placement: Some("page_links".to_owned()),
            ..Default::default()
        };
        let settings = Settings::load(stored.clone());

        assert!(!Settings::upgrade(&mut stored));
        assert_eq!(settings.placement, Placement::PageLinks);
    }

    #[test]
    fn sanitizing() {
        let garbage = StoredSettings {
            db_version: Some(SETTINGS_VERSION),
            placement: Some("sidebar".to_owned()),
            comment_footnotes: Some(true),
            notes_label: Some("  ".to_owned()),
        };
        let settings = Settings::sanitize(&garbage);

        assert_eq!(settings.placement, Placement::Content);
        assert!(settings.comment_footnotes);
        assert_eq!(settings.notes_label, "Notes:");
    }
}
