//! Server-rendered pages.
//!
//! Each page renders enough markup to be useful before hydration; the client
//! bundle takes over from there.

use maud::{Markup, html};
use serde::Serialize;

use crate::domain::Record;

use super::document::Language;

/// Pages served by the document shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// `/` and `/dashboard`.
    Dashboard,
    /// `/records`.
    Records,
    /// `/login`.
    Login,
}

impl Page {
    /// Resolve a request path. Trailing slashes are ignored.
    ///
    /// ```
    /// use recordkeeper::inbound::ssr::Page;
    ///
    /// assert_eq!(Page::from_path("/"), Some(Page::Dashboard));
    /// assert_eq!(Page::from_path("/records/"), Some(Page::Records));
    /// assert_eq!(Page::from_path("/unknown"), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" | "/dashboard" => Some(Self::Dashboard),
            "/records" => Some(Self::Records),
            "/login" => Some(Self::Login),
            _ => None,
        }
    }

    /// Whether the client must hold a session to see the page.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Document title in `lang`.
    #[must_use]
    pub const fn title(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Dashboard, Language::En) => "Dashboard",
            (Self::Dashboard, Language::Fr) => "Tableau de bord",
            (Self::Records, Language::En) => "Records",
            (Self::Records, Language::Fr) => "Enregistrements",
            (Self::Login, Language::En) => "Sign in",
            (Self::Login, Language::Fr) => "Connexion",
        }
    }

    /// Meta description in `lang`.
    #[must_use]
    pub const fn description(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Dashboard, Language::En) => "Overview of your account and records.",
            (Self::Dashboard, Language::Fr) => "Aperçu de votre compte et de vos enregistrements.",
            (Self::Records, Language::En) => "Record versions and their history.",
            (Self::Records, Language::Fr) => "Versions des enregistrements et leur historique.",
            (Self::Login, Language::En) => "Sign in to continue.",
            (Self::Login, Language::Fr) => "Connectez-vous pour continuer.",
        }
    }

    /// Page body. `records` is only used by [`Page::Records`].
    #[must_use]
    pub fn render(self, lang: Language, records: &[Record]) -> Markup {
        match self {
            Self::Dashboard => dashboard(lang),
            Self::Records => records_page(lang, records),
            Self::Login => login(lang),
        }
    }
}

fn label(lang: Language, en: &'static str, fr: &'static str) -> &'static str {
    match lang {
        Language::En => en,
        Language::Fr => fr,
    }
}

fn navigation(lang: Language) -> Markup {
    html! {
        nav {
            a href="/dashboard" { (Page::Dashboard.title(lang)) }
            " "
            a href="/records" { (Page::Records.title(lang)) }
        }
    }
}

fn dashboard(lang: Language) -> Markup {
    html! {
        header { h1 { (Page::Dashboard.title(lang)) } (navigation(lang)) }
        section data-page="dashboard" {
            p { (Page::Dashboard.description(lang)) }
        }
    }
}

fn records_page(lang: Language, records: &[Record]) -> Markup {
    html! {
        header { h1 { (Page::Records.title(lang)) } (navigation(lang)) }
        form method="post" action="/api/records" data-form="record" {
            label {
                (label(lang, "Type", "Type"))
                select name="type" {
                    option value="NEW" { "NEW" }
                    option value="UPDATED" { "UPDATED" }
                }
            }
            label {
                (label(lang, "Record ID", "Identifiant"))
                input type="text" name="recordId" pattern="[0-9a-fA-F]{24}";
            }
            label {
                (label(lang, "Description", "Description"))
                input type="text" name="description";
            }
            button type="submit" { (label(lang, "Save", "Enregistrer")) }
        }
        @if records.is_empty() {
            p data-empty { (label(lang, "No records yet.", "Aucun enregistrement.")) }
        } @else {
            table {
                thead {
                    tr {
                        th { (label(lang, "Record ID", "Identifiant")) }
                        th { "Type" }
                        th { (label(lang, "Description", "Description")) }
                        th { (label(lang, "Created", "Créé")) }
                    }
                }
                tbody {
                    @for record in records {
                        tr data-record-id=(record.record_id) {
                            td {
                                a href={ "/api/records/" (record.record_id) "/all" } { (record.record_id) }
                            }
                            td { (record.record_type.as_str()) }
                            td { (record.description.as_deref().unwrap_or_default()) }
                            td { time datetime=(record.created_at.to_rfc3339()) { (record.created_at.format("%Y-%m-%d %H:%M")) } }
                        }
                    }
                }
            }
        }
    }
}

fn login(lang: Language) -> Markup {
    html! {
        h1 { (Page::Login.title(lang)) }
        form method="post" action="/api/auth/login" data-form="login" {
            label {
                (label(lang, "Email", "Courriel"))
                input type="email" name="email" autocomplete="username" required;
            }
            label {
                (label(lang, "Password", "Mot de passe"))
                input type="password" name="password" autocomplete="current-password" required;
            }
            button type="submit" { (Page::Login.title(lang)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordId, RecordType};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    #[rstest]
    #[case("/", Some(Page::Dashboard))]
    #[case("/dashboard", Some(Page::Dashboard))]
    #[case("/records", Some(Page::Records))]
    #[case("/login/", Some(Page::Login))]
    #[case("/records/abc", None)]
    #[case("/api/records", None)]
    fn resolves_paths(#[case] path: &str, #[case] expected: Option<Page>) {
        assert_eq!(Page::from_path(path), expected);
    }

    #[rstest]
    fn only_login_is_public() {
        assert!(Page::Dashboard.is_protected());
        assert!(Page::Records.is_protected());
        assert!(!Page::Login.is_protected());
    }

    #[rstest]
    fn records_page_lists_records() {
        let created_at = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("timestamp");
        let record = Record {
            id: RecordId::generate(created_at),
            record_id: "65f0a1b2c3d4e5f60718293a".parse().expect("id"),
            record_type: RecordType::Updated,
            description: Some("<b>second</b>".to_owned()),
            created_at,
        };
        let html = Page::Records.render(Language::En, &[record]).into_string();
        assert!(html.contains(r#"data-record-id="65f0a1b2c3d4e5f60718293a""#));
        assert!(html.contains("&lt;b&gt;second&lt;/b&gt;"));
        assert!(html.contains("2026-03-01 09:30"));
        assert!(!html.contains("data-empty"));
    }

    #[rstest]
    fn login_page_is_translated() {
        let html = Page::Login.render(Language::Fr, &[]).into_string();
        assert!(html.contains("Mot de passe"));
        assert!(html.contains(r#"action="/api/auth/login""#));
    }
}
