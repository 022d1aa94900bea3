//! store::catalog
//!
//! Paginated listing of every page.
//!
//! Pages are the `*.md` files at the storage root, newest modification
//! first. Each page on the requested listing page is fetched concurrently;
//! pages that fail to fetch are left out.

use std::io;
use std::time::SystemTime;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::document::Document;
use super::resolver::ResolveError;
use super::wiki::Wiki;
use crate::core::paths::PAGE_EXTENSION;
use crate::core::types::{Revision, RevisionRange, VersionId};

/// One listed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub title: String,
    pub url: String,
    /// Newest first, at most two
    pub hashes: Vec<VersionId>,
    /// Predecessor to latest version, when the page has two
    pub range: Option<RevisionRange>,
}

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    /// 1-based, clamped into `1..=total_pages`
    pub current_page: usize,
    pub total_pages: usize,
    /// Number of page files found, fetched or not
    pub total_items: usize,
}

/// Lists the wiki's pages.
#[derive(Debug, Clone)]
pub struct Catalog {
    wiki: Wiki,
}

impl Catalog {
    pub(crate) fn new(wiki: Wiki) -> Self {
        Self { wiki }
    }

    /// Page names at the storage root, newest modification first, then by
    /// name.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Unreadable`] if the storage root cannot be listed.
    pub fn names(&self) -> Result<Vec<String>, ResolveError> {
        let root = self.wiki.paths().root().to_path_buf();
        let mut pages: Vec<(SystemTime, String)> = Vec::new();

        for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ResolveError::Unreadable {
                        path: root,
                        source: io::Error::from(err),
                    });
                }
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != PAGE_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }

            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            pages.push((modified, stem));
        }

        pages.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(pages.into_iter().map(|(_, name)| name).collect())
    }

    /// Fetch one listing page. `page_number` is 1-based; out-of-range values
    /// are clamped. A `per_page` of zero uses the configured page size.
    pub async fn list(
        &self,
        page_number: usize,
        per_page: usize,
    ) -> Result<CatalogPage, ResolveError> {
        let names = self.names()?;
        let per_page = if per_page == 0 {
            self.wiki.settings().items_per_page.max(1)
        } else {
            per_page
        };

        let total_items = names.len();
        let total_pages = total_items.div_ceil(per_page).max(1);
        let current_page = page_number.clamp(1, total_pages);

        let selected: Vec<String> = names
            .into_iter()
            .skip((current_page - 1) * per_page)
            .take(per_page)
            .collect();

        let mut tasks = JoinSet::new();
        for (position, name) in selected.into_iter().enumerate() {
            let wiki = self.wiki.clone();
            tasks.spawn(async move {
                let mut page = wiki.page(&name, Revision::Current)?;
                page.fetch().await?;
                Ok::<_, ResolveError>((position, page))
            });
        }

        let mut fetched: Vec<(usize, Document)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((position, page))) if page.is_ok() => fetched.push((position, page)),
                Ok(Ok((_, page))) => {
                    debug!(name = page.name(), error = ?page.error(), "leaving page out");
                }
                Ok(Err(err)) => warn!(error = %err, "cannot resolve listed page"),
                Err(err) => warn!(error = %err, "catalog task failed"),
            }
        }
        fetched.sort_by_key(|(position, _)| *position);

        let entries = fetched
            .into_iter()
            .map(|(_, page)| entry(&page))
            .collect();

        Ok(CatalogPage {
            entries,
            current_page,
            total_pages,
            total_items,
        })
    }
}

fn entry(page: &Document) -> CatalogEntry {
    let hashes = page.hashes().to_vec();
    let range = match hashes.as_slice() {
        [latest, previous] => Some(RevisionRange::new(previous.clone(), latest.clone())),
        _ => None,
    };

    CatalogEntry {
        name: page.url_name(),
        title: page.title(),
        url: page.url_for_show(),
        hashes,
        range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::paths::StoragePaths;
    use crate::git::mock::MockBackend;
    use crate::store::wiki::WikiSettings;
    use std::fs::{self, File};
    use std::sync::Arc;
    use std::time::Duration;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn page_path(name: &str) -> PathBuf {
        PathBuf::from(StoragePaths::page_file(name))
    }

    fn touch(dir: &TempDir, name: &str, age_secs: u64) {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        let when = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    fn catalog(dir: &TempDir, backend: MockBackend) -> Catalog {
        Wiki::new(
            StoragePaths::new(dir.path().to_path_buf(), "files"),
            Arc::new(backend),
            WikiSettings::default(),
        )
        .catalog()
    }

    fn tracked(names: &[&str]) -> MockBackend {
        names.iter().enumerate().fold(MockBackend::new(), |b, (i, name)| {
            b.commit(page_path(name), &format!("{:08x}", i + 1), "x", "Create")
        })
    }

    #[test]
    fn names_newest_first_pages_only() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "Old.md", 300);
        touch(&dir, "New.md", 10);
        touch(&dir, "Middle.md", 100);
        touch(&dir, "notes.txt", 0);
        touch(&dir, "files/Attached.md", 0);
        touch(&dir, ".Hidden.md", 0);

        let names = catalog(&dir, MockBackend::new()).names().unwrap();
        assert_eq!(names, vec!["New", "Middle", "Old"]);
    }

    #[tokio::test]
    async fn paginates_and_clamps() {
        let dir = TempDir::new().unwrap();
        let all = ["A", "B", "C", "D", "E"];
        for (i, name) in all.iter().enumerate() {
            touch(&dir, &format!("{}.md", name), (i as u64 + 1) * 10);
        }
        let catalog = catalog(&dir, tracked(&all));

        let first = catalog.list(1, 2).await.unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_items, 5);
        let names: Vec<_> = first.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let last = catalog.list(99, 2).await.unwrap();
        assert_eq!(last.current_page, 3);
        assert_eq!(last.entries.len(), 1);
        assert_eq!(last.entries[0].name, "E");

        let zero = catalog.list(0, 2).await.unwrap();
        assert_eq!(zero.current_page, 1);
    }

    #[tokio::test]
    async fn untracked_pages_left_out() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "Tracked.md", 10);
        touch(&dir, "Draft.md", 20);

        let listing = catalog(&dir, tracked(&["Tracked"])).list(1, 10).await.unwrap();
        assert_eq!(listing.total_items, 2);
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].title, "Tracked");
    }

    #[tokio::test]
    async fn range_from_previous_to_latest() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "Home.md", 10);
        touch(&dir, "Once.md", 20);
        let backend = MockBackend::new()
            .commit("Home.md", "aaaa1111", "v1", "Create")
            .commit("Home.md", "bbbb2222", "v2", "Update")
            .commit("Once.md", "cccc3333", "x", "Create");

        let listing = catalog(&dir, backend).list(1, 10).await.unwrap();
        let home = &listing.entries[0];
        let once = &listing.entries[1];

        assert_eq!(
            home.range.as_ref().map(ToString::to_string),
            Some("aaaa1111..bbbb2222".to_string())
        );
        assert_eq!(home.url, "/wiki/Home");
        assert!(once.range.is_none());
    }

    #[tokio::test]
    async fn empty_wiki_has_one_empty_page() {
        let dir = TempDir::new().unwrap();
        let listing = catalog(&dir, MockBackend::new()).list(1, 10).await.unwrap();

        assert!(listing.entries.is_empty());
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.current_page, 1);
    }

    #[tokio::test]
    async fn zero_per_page_uses_setting() {
        let dir = TempDir::new().unwrap();
        for i in 0..12 {
            touch(&dir, &format!("P{}.md", i), i);
        }
        let names: Vec<String> = (0..12).map(|i| format!("P{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let listing = catalog(&dir, tracked(&refs)).list(1, 0).await.unwrap();
        assert_eq!(listing.entries.len(), Config::DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(listing.total_pages, 2);
    }
}
