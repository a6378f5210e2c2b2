use tracing::{debug, error, warn};

use super::{ListController, RequestToken};
use crate::effects::Command;
use crate::error::ApiError;
use crate::model::{Page, Record};
use crate::search::QueryState;

impl ListController {
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn rows(&self) -> &[Record] {
        &self.page.items
    }

    pub fn total_items(&self) -> u64 {
        self.page.total
    }

    pub fn total_pages(&self) -> u32 {
        self.query.total_pages(self.page.total)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Go to page `n`; fetches only if the page actually changed.
    pub fn set_page(&mut self, n: u32) -> Option<Command> {
        self.query.set_page(n).then(|| self.load())
    }

    /// Change the filter (back to page 1); fetches only if it actually changed.
    pub fn set_search(&mut self, s: &str) -> Option<Command> {
        self.query.set_search(s).then(|| self.load())
    }

    pub fn next_page(&mut self) -> Option<Command> {
        let page = self.query.page();
        if page >= self.total_pages() {
            return None;
        }
        self.set_page(page + 1)
    }

    pub fn prev_page(&mut self) -> Option<Command> {
        let page = self.query.page();
        if page <= 1 {
            return None;
        }
        self.set_page(page - 1)
    }

    /// Issue a fetch for the current query. Supersedes every fetch issued before.
    pub fn load(&mut self) -> Command {
        self.latest_fetch = RequestToken(self.latest_fetch.0 + 1);
        self.loading = true;
        debug!(
            kind = self.kind.endpoint(),
            token = self.latest_fetch.0,
            page = self.query.page(),
            search = self.query.search(),
            "issuing list fetch"
        );
        Command::FetchPage {
            token: self.latest_fetch,
            query: self.query.clone(),
        }
    }

    pub(super) fn apply_page(
        &mut self,
        token: RequestToken,
        result: Result<Page, ApiError>,
    ) -> Vec<Command> {
        if token != self.latest_fetch {
            warn!(
                kind = self.kind.endpoint(),
                stale = token.0,
                latest = self.latest_fetch.0,
                "discarding out-of-order list response"
            );
            return Vec::new();
        }
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(
                    kind = self.kind.endpoint(),
                    rows = page.items.len(),
                    total = page.total,
                    "list fetch settled"
                );
                let overshot = page.is_empty() && self.query.page() > 1;
                let last = self.query.total_pages(page.total);
                self.page = page;
                if overshot {
                    let target = (self.query.page() - 1).min(last);
                    debug!(kind = self.kind.endpoint(), to_page = target, "empty page, stepping back");
                    return self.set_page(target).into_iter().collect();
                }
                Vec::new()
            }
            Err(err) => {
                error!(kind = self.kind.endpoint(), error = %err, "list fetch failed; keeping stale page");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Outcome;
    use crate::model::ResourceKind;
    use serde_json::Map;

    fn rows(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new(*id, Map::new())).collect()
    }

    fn token_of(cmd: &Command) -> RequestToken {
        match cmd {
            Command::FetchPage { token, .. } => *token,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn only_latest_issued_fetch_is_applied() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let first = c.load();
        let second = c.set_search("ann").unwrap();
        c.apply(Outcome::PageLoaded {
            token: token_of(&second),
            result: Ok(Page::new(rows(&["new"]), 1)),
        });
        c.apply(Outcome::PageLoaded {
            token: token_of(&first),
            result: Ok(Page::new(rows(&["old"]), 1)),
        });
        assert_eq!(c.rows()[0].id.as_str(), "new");
        assert!(!c.loading());
    }

    #[test]
    fn stale_response_leaves_loading_for_the_newer_request() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let first = c.load();
        let _second = c.set_page(2).unwrap();
        c.apply(Outcome::PageLoaded {
            token: token_of(&first),
            result: Ok(Page::default()),
        });
        assert!(c.loading());
    }

    #[test]
    fn failure_keeps_stale_rows_and_clears_loading() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        let t = token_of(&c.load());
        c.apply(Outcome::PageLoaded {
            token: t,
            result: Ok(Page::new(rows(&["a", "b"]), 2)),
        });
        let t = token_of(&c.load());
        c.apply(Outcome::PageLoaded {
            token: t,
            result: Err(ApiError::unexpected("down")),
        });
        assert_eq!(c.rows().len(), 2);
        assert!(!c.loading());
        assert!(c.take_notices().is_empty());
    }

    #[test]
    fn empty_page_beyond_first_steps_back() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let t = token_of(&c.set_page(3).unwrap());
        let follow = c.apply(Outcome::PageLoaded {
            token: t,
            result: Ok(Page::new(Vec::new(), 20)),
        });
        assert_eq!(c.query().page(), 2);
        assert!(matches!(follow.as_slice(), [Command::FetchPage { query, .. }] if query.page() == 2));
    }

    #[test]
    fn step_back_clamps_to_last_page() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let t = token_of(&c.set_page(7).unwrap());
        c.apply(Outcome::PageLoaded {
            token: t,
            result: Ok(Page::new(Vec::new(), 11)),
        });
        assert_eq!(c.query().page(), 2);
    }

    #[test]
    fn unchanged_query_issues_nothing() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        assert!(c.set_page(1).is_none());
        assert!(c.set_search("").is_none());
        assert!(c.prev_page().is_none());
        assert!(c.next_page().is_none());
    }
}
