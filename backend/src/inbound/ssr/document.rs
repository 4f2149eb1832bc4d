//! Document shell rendered around every page.
//!
//! The shell is split so the head and the opening of the root container can
//! be flushed before the page content is ready.

use actix_web::HttpRequest;
use actix_web::http::header::ACCEPT_LANGUAGE;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;

use super::manifest::ChunkManifest;

/// Cookie carrying the reader's language choice.
pub const LANG_COOKIE: &str = "lang";
/// Id of the script element holding the initial state.
pub const INITIAL_DATA_ID: &str = "__INITIAL_DATA__";
/// Id of the element the client hydrates.
pub const ROOT_ID: &str = "root";

/// Supported document languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// French.
    Fr,
}

impl Language {
    /// Two-letter tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Map a language tag such as `fr-CA` to a supported language.
    ///
    /// ```
    /// use recordkeeper::inbound::ssr::Language;
    ///
    /// assert_eq!(Language::from_tag("fr-CA"), Some(Language::Fr));
    /// assert_eq!(Language::from_tag("en"), Some(Language::En));
    /// assert_eq!(Language::from_tag("de"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("fr") {
            Some(Self::Fr)
        } else if primary.eq_ignore_ascii_case("en") {
            Some(Self::En)
        } else {
            None
        }
    }

    /// The `lang` cookie wins; otherwise the first supported
    /// `Accept-Language` entry; otherwise English.
    #[must_use]
    pub fn negotiate(req: &HttpRequest) -> Self {
        if let Some(lang) = req
            .cookie(LANG_COOKIE)
            .and_then(|cookie| Self::from_tag(cookie.value()))
        {
            return lang;
        }
        req.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| {
                header
                    .split(',')
                    .filter_map(|entry| entry.split(';').next())
                    .find_map(Self::from_tag)
            })
            .unwrap_or_default()
    }
}

/// Values interpolated into the document shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVariables {
    /// `<title>` text.
    pub page_title: String,
    /// Meta description.
    pub page_description: String,
    /// `lang` attribute of the document.
    pub lang: Language,
    /// Omit development-only markup.
    pub is_production: bool,
}

/// Doctype, head and the opening of the root container.
#[must_use]
pub fn shell_start(vars: &DocumentVariables, manifest: &ChunkManifest) -> String {
    let head = html! {
        head {
            meta charset="utf-8";
            meta http-equiv="Content-Type" content="text/html; charset=utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            meta name="mobile-web-app-capable" content="yes";
            title { (vars.page_title) }
            meta name="description" content=(vars.page_description);
            meta property="og:title" content=(vars.page_title);
            meta property="og:description" content=(vars.page_description);
            @for href in manifest.css_assets() {
                link rel="stylesheet" href=(href);
            }
            @for script in manifest.bootstrap_scripts() {
                link rel="preload" as="script" href=(script);
            }
        }
    };
    format!(
        "{}<html lang=\"{}\">{}<body><main role=\"main\"><div class=\"root\" id=\"{ROOT_ID}\">",
        DOCTYPE.into_string(),
        vars.lang.as_str(),
        head.into_string(),
    )
}

/// Initial state and bootstrap scripts, emitted after the content.
#[must_use]
pub fn shell_scripts(initial_data: &serde_json::Value, manifest: &ChunkManifest) -> Markup {
    html! {
        script id=(INITIAL_DATA_ID) type="application/json" {
            (PreEscaped(escape_json_for_script(initial_data)))
        }
        @for src in manifest.bootstrap_scripts() {
            script src=(src) defer {}
        }
    }
}

/// Closing tags matching [`shell_start`].
pub const SHELL_END: &str = "</div></main></body></html>";

/// Serialise JSON so it cannot terminate the surrounding script element.
fn escape_json_for_script(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
