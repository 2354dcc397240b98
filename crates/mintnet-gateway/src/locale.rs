//! Localized message bundles.
//!
//! Bundles are plain statics selected by a `match`; there is no runtime
//! loading and no fallback chain beyond the configured default language.

use std::fmt;
use std::str::FromStr;

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Language {
    /// German.
    #[default]
    De,
    /// English.
    En,
}

/// Messages shown to users in error responses.
#[derive(Debug)]
pub struct Messages {
    /// Entity, invite or membership does not exist.
    pub not_found: &'static str,
    /// Viewer lacks the rights for the action.
    pub forbidden: &'static str,
    /// Request is malformed or violates field rules.
    pub bad_request: &'static str,
    /// Request conflicts with the current state.
    pub conflict: &'static str,
    /// Anything else.
    pub internal: &'static str,
}

static DE: Messages = Messages {
    not_found: "Der angeforderte Eintrag wurde nicht gefunden.",
    forbidden: "Dir fehlen die Rechte für diese Aktion.",
    bad_request: "Die Anfrage ist ungültig.",
    conflict: "Die Anfrage steht im Widerspruch zum aktuellen Stand.",
    internal: "Ein unerwarteter Fehler ist aufgetreten.",
};

static EN: Messages = Messages {
    not_found: "The requested entry was not found.",
    forbidden: "You are not allowed to do this.",
    bad_request: "The request is invalid.",
    conflict: "The request conflicts with the current state.",
    internal: "An unexpected error occurred.",
};

impl Language {
    /// Message bundle of the language.
    pub fn messages(&self) -> &'static Messages {
        match self {
            Language::De => &DE,
            Language::En => &EN,
        }
    }

    /// Language tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::De => "de",
            Language::En => "en",
        }
    }

    /// Pick the language from an `Accept-Language` header.
    ///
    /// Tags are taken in order of quality; the first supported primary tag
    /// wins. Falls back to `default` if the header is absent or names no
    /// supported language.
    pub fn from_accept_language(header: Option<&str>, default: Language) -> Language {
        let Some(header) = header else {
            return default;
        };

        let mut tags: Vec<(&str, f32)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim();
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (!tag.is_empty() && quality > 0.0).then_some((tag, quality))
            })
            .collect();
        // Stable sort keeps header order among equal weights
        tags.sort_by(|a, b| b.1.total_cmp(&a.1));

        tags.into_iter()
            .find_map(|(tag, _)| tag.parse().ok())
            .unwrap_or(default)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.split(['-', '_']).next().unwrap_or(s);
        match primary.to_ascii_lowercase().as_str() {
            "de" => Ok(Language::De),
            "en" => Ok(Language::En),
            _ => Err(format!("unsupported language: {}", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
