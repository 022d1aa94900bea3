//! store::locator
//!
//! Canonical URLs for documents, and the inverse for show URLs.
//!
//! # Layout
//!
//! | Action  | URL                                   |
//! |---------|---------------------------------------|
//! | show    | `/wiki/<name>` or `/wiki/<name>/<rev>` |
//! | history | `/wiki/<name>/history`                |
//! | compare | `/wiki/<name>/compare`                |
//! | edit    | `/pages/<name>/edit`                  |
//! | new     | `/pages/new/<name>`                   |
//! | revert  | `/pages/<name>/revert[/<rev>]`        |
//!
//! Every URL carries the configured proxy prefix. Names are encoded per
//! path segment, so attachment paths keep their `/` separators.
//!
//! # Example
//!
//! ```
//! use wikistore::core::types::Revision;
//! use wikistore::store::locator::{Action, Locator};
//!
//! let locator = Locator::new("/kb");
//! assert_eq!(locator.show("Getting-Started", &Revision::Current), "/kb/wiki/Getting-Started");
//! assert_eq!(
//!     locator.url_for("Home", Action::History, &Revision::Current),
//!     "/kb/wiki/Home/history"
//! );
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::types::Revision;

/// Presentation-layer actions a document links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Show,
    History,
    Compare,
    Edit,
    New,
    Revert,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "show" => Ok(Action::Show),
            "history" => Ok(Action::History),
            "compare" => Ok(Action::Compare),
            "edit" => Ok(Action::Edit),
            "new" => Ok(Action::New),
            "revert" => Ok(Action::Revert),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// URL builder bound to a proxy prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    proxy_path: String,
}

impl Locator {
    const WIKI: &'static str = "/wiki";
    const PAGES: &'static str = "/pages";

    /// Create a locator. A trailing `/` on the prefix is ignored.
    pub fn new(proxy_path: impl Into<String>) -> Self {
        let proxy_path = proxy_path.into();
        Self {
            proxy_path: proxy_path.trim_end_matches('/').to_string(),
        }
    }

    /// The prefix prepended to every URL.
    pub fn proxy_path(&self) -> &str {
        &self.proxy_path
    }

    /// Show URL, with the revision segment when it is not current.
    pub fn show(&self, name: &str, revision: &Revision) -> String {
        self.show_encoded(&encode(name), revision)
    }

    /// URL for `action` on `name`.
    ///
    /// ```
    /// use wikistore::core::types::Revision;
    /// use wikistore::store::locator::{Action, Locator};
    ///
    /// let locator = Locator::default();
    /// let rev: Revision = "abcd1234".parse().unwrap();
    ///
    /// assert_eq!(locator.url_for("My Page", Action::Edit, &rev), "/pages/My%20Page/edit");
    /// assert_eq!(locator.url_for("Home", Action::Revert, &rev), "/pages/Home/revert/abcd1234");
    /// assert_eq!(locator.url_for("Home", Action::New, &rev), "/pages/new/Home");
    /// ```
    pub fn url_for(&self, name: &str, action: Action, revision: &Revision) -> String {
        let name = encode(name);
        let p = &self.proxy_path;
        match action {
            Action::Show => self.show_encoded(&name, revision),
            Action::History => format!("{}{}/{}/history", p, Self::WIKI, name),
            Action::Compare => format!("{}{}/{}/compare", p, Self::WIKI, name),
            Action::Edit => format!("{}{}/{}/edit", p, Self::PAGES, name),
            Action::New => format!("{}{}/new/{}", p, Self::PAGES, name),
            Action::Revert => match revision.version() {
                Some(id) => format!("{}{}/{}/revert/{}", p, Self::PAGES, name, id),
                None => format!("{}{}/{}/revert", p, Self::PAGES, name),
            },
        }
    }

    fn show_encoded(&self, encoded: &str, revision: &Revision) -> String {
        match revision.version() {
            Some(id) => format!("{}{}/{}/{}", self.proxy_path, Self::WIKI, encoded, id),
            None => format!("{}{}/{}", self.proxy_path, Self::WIKI, encoded),
        }
    }

    /// Recover the name and revision from a show URL.
    ///
    /// A two-segment URL whose second segment is a version id is read as
    /// `<name>/<rev>`; anything else is a (possibly nested) name at the
    /// current revision.
    ///
    /// ```
    /// use wikistore::core::types::Revision;
    /// use wikistore::store::locator::Locator;
    ///
    /// let locator = Locator::new("/kb");
    /// let (name, rev) = locator.parse_show("/kb/wiki/My%20Page/abcd1234").unwrap();
    /// assert_eq!(name, "My Page");
    /// assert_eq!(rev.to_string(), "abcd1234");
    ///
    /// let (name, rev) = locator.parse_show("/kb/wiki/docs/guide.pdf").unwrap();
    /// assert_eq!(name, "docs/guide.pdf");
    /// assert_eq!(rev, Revision::Current);
    ///
    /// assert!(locator.parse_show("/wiki/Home").is_none());
    /// ```
    pub fn parse_show(&self, url: &str) -> Option<(String, Revision)> {
        let path = url.split(&['?', '#'][..]).next()?;
        let path = path.strip_prefix(self.proxy_path.as_str())?;
        let rest = path.strip_prefix(Self::WIKI)?.strip_prefix('/')?;

        let segments = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).ok().map(|d| d.into_owned()))
            .collect::<Option<Vec<_>>>()?;

        match segments.as_slice() {
            [] => None,
            [name, rev] => match rev.parse::<Revision>() {
                Ok(revision @ Revision::Version(_)) => Some((name.clone(), revision)),
                _ => Some((segments.join("/"), Revision::Current)),
            },
            _ => Some((segments.join("/"), Revision::Current)),
        }
    }
}

fn encode(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> Revision {
        "abcd1234".parse().unwrap()
    }

    mod build {
        use super::*;

        #[test]
        fn show_current_and_versioned() {
            let locator = Locator::default();
            assert_eq!(locator.show("Home", &Revision::Current), "/wiki/Home");
            assert_eq!(locator.show("Home", &version()), "/wiki/Home/abcd1234");
        }

        #[test]
        fn show_action_matches_show() {
            let locator = Locator::new("/kb");
            assert_eq!(
                locator.url_for("A Page", Action::Show, &version()),
                locator.show("A Page", &version())
            );
        }

        #[test]
        fn every_action_is_prefixed() {
            let locator = Locator::new("/kb/");
            for action in [
                Action::Show,
                Action::History,
                Action::Compare,
                Action::Edit,
                Action::New,
                Action::Revert,
            ] {
                let url = locator.url_for("Home", action, &Revision::Current);
                assert!(url.starts_with("/kb/"), "{:?} -> {}", action, url);
                assert!(!url.starts_with("/kb//"));
            }
        }

        #[test]
        fn file_paths_keep_separators() {
            let locator = Locator::default();
            assert_eq!(
                locator.show("docs/my file.pdf", &Revision::Current),
                "/wiki/docs/my%20file.pdf"
            );
        }

        #[test]
        fn reserved_characters_encoded() {
            let locator = Locator::default();
            assert_eq!(
                locator.show("C&A", &Revision::Current),
                "/wiki/C%26A"
            );
        }
    }

    mod parse {
        use super::*;

        #[test]
        fn round_trip_page() {
            let locator = Locator::new("/kb");
            for revision in [Revision::Current, version()] {
                let url = locator.show("Getting Started", &revision);
                assert_eq!(
                    locator.parse_show(&url),
                    Some(("Getting Started".to_string(), revision))
                );
            }
        }

        #[test]
        fn query_and_fragment_ignored() {
            let locator = Locator::default();
            let (name, _) = locator.parse_show("/wiki/Home?x=1#top").unwrap();
            assert_eq!(name, "Home");
        }

        #[test]
        fn nested_path_is_a_name() {
            let locator = Locator::default();
            let (name, rev) = locator.parse_show("/wiki/a/b/c.txt").unwrap();
            assert_eq!(name, "a/b/c.txt");
            assert!(rev.is_current());
        }

        #[test]
        fn second_segment_not_a_version() {
            let locator = Locator::default();
            let (name, rev) = locator.parse_show("/wiki/docs/guide.pdf").unwrap();
            assert_eq!(name, "docs/guide.pdf");
            assert!(rev.is_current());
        }

        #[test]
        fn foreign_urls_rejected() {
            let locator = Locator::default();
            assert!(locator.parse_show("/pages/Home/edit").is_none());
            assert!(locator.parse_show("/wiki/").is_none());
            assert!(locator.parse_show("/wikipedia").is_none());
        }
    }

    #[test]
    fn action_from_str() {
        assert_eq!("History".parse::<Action>(), Ok(Action::History));
        assert!("delete".parse::<Action>().is_err());
    }
}
