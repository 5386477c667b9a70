//! Directory navigation while picking a project location
//!
//! The navigator is `Loading`, `Ready(listing)` or `Error(message)`. Every
//! request is stamped with a [`NavigationTicket`]; only the result carrying
//! the most recently issued ticket is applied, so a slow listing can never
//! overwrite a newer one.

use std::sync::{Arc, Mutex, MutexGuard};

use mbird_core::DirectoryListing;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::Result;

/// Whether the project is being created or loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectMode {
    Create,
    Load,
}

impl ProjectMode {
    pub fn verb(&self) -> &'static str {
        match self {
            ProjectMode::Create => "create",
            ProjectMode::Load => "load",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationState {
    Loading,
    Ready(DirectoryListing),
    Error(String),
}

/// Generation stamp of one navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NavigationTicket(u64);

#[derive(Debug)]
struct Inner {
    state: NavigationState,
    generation: u64,
}

pub struct Navigator {
    backend: Arc<dyn Backend>,
    mode: ProjectMode,
    inner: Mutex<Inner>,
}

impl Navigator {
    /// A navigator in `Loading`; call [`Navigator::start`] to fetch the first listing.
    pub fn new(backend: Arc<dyn Backend>, mode: ProjectMode) -> Self {
        Self {
            backend,
            mode,
            inner: Mutex::new(Inner {
                state: NavigationState::Loading,
                generation: 0,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn mode(&self) -> ProjectMode {
        self.mode
    }

    pub fn state(&self) -> NavigationState {
        self.inner().state.clone()
    }

    /// The listing currently shown, if any.
    pub fn listing(&self) -> Option<DirectoryListing> {
        match &self.inner().state {
            NavigationState::Ready(listing) => Some(listing.clone()),
            _ => None,
        }
    }

    /// Enter `Loading` and issue a ticket that supersedes every earlier one.
    pub fn begin(&self) -> NavigationTicket {
        let mut inner = self.inner();
        inner.generation += 1;
        inner.state = NavigationState::Loading;
        NavigationTicket(inner.generation)
    }

    /// Apply a listing result. Returns `false` if the ticket was superseded,
    /// in which case the state is left untouched.
    pub fn complete(&self, ticket: NavigationTicket, result: Result<DirectoryListing>) -> bool {
        let mut inner = self.inner();
        if ticket.0 != inner.generation {
            debug!("Discarding superseded listing (ticket {})", ticket.0);
            return false;
        }
        inner.state = match result {
            Ok(listing) => NavigationState::Ready(listing),
            Err(e) => {
                warn!("Directory listing failed: {}", e);
                NavigationState::Error(e.to_string())
            }
        };
        true
    }

    /// Drop interest in every in-flight request. Late results are ignored.
    pub fn abandon(&self) {
        self.inner().generation += 1;
    }

    /// Fetch the default starting directory and list it.
    pub async fn start(&self) -> bool {
        let ticket = self.begin();
        let result = match self.backend.default_directory().await {
            Ok(path) => self.backend.browse(&path).await,
            Err(e) => Err(e),
        };
        self.complete(ticket, result)
    }

    /// List `path`. Works from any state, including `Error`, which makes
    /// it the retry path as well.
    pub async fn navigate(&self, path: &str) -> bool {
        let ticket = self.begin();
        debug!("Navigating to {}", path);
        let result = self.backend.browse(path).await;
        self.complete(ticket, result)
    }

    /// Navigate to the parent of the current listing. `false` at the root or
    /// when no listing is shown.
    pub async fn up(&self) -> bool {
        let parent = self.listing().and_then(|l| l.parent);
        match parent {
            Some(parent) => self.navigate(&parent).await,
            None => false,
        }
    }

    /// Selection is disabled in create mode until a name is typed.
    pub fn can_select(&self, create_name: Option<&str>) -> bool {
        if self.listing().is_none() {
            return false;
        }
        match self.mode {
            ProjectMode::Create => create_name.is_some_and(|name| !name.is_empty()),
            ProjectMode::Load => true,
        }
    }

    /// The path a selection would submit. `current/name` in create mode
    /// with a non-empty name, otherwise `current`. `None` unless `Ready`.
    pub fn select_current(&self, create_name: Option<&str>) -> Option<String> {
        let listing = self.listing()?;
        match (self.mode, create_name) {
            (ProjectMode::Create, Some(name)) if !name.is_empty() => {
                Some(format!("{}/{}", listing.current.trim_end_matches('/'), name))
            }
            _ => Some(listing.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::test_utils::{MockBackend, listing};

    fn navigator(mode: ProjectMode) -> Navigator {
        Navigator::new(Arc::new(MockBackend::new()), mode)
    }

    #[test]
    fn test_starts_loading() {
        assert_eq!(navigator(ProjectMode::Load).state(), NavigationState::Loading);
    }

    #[test]
    fn test_superseded_ticket_is_discarded() {
        let nav = navigator(ProjectMode::Load);
        let first = nav.begin();
        let second = nav.begin();

        assert!(nav.complete(second, Ok(listing("/b", Some("/"), &[]))));
        assert!(!nav.complete(first, Ok(listing("/a", Some("/"), &[]))));

        assert_eq!(nav.listing().unwrap().current, "/b");
    }

    #[test]
    fn test_abandon_ignores_late_result() {
        let nav = navigator(ProjectMode::Load);
        let ticket = nav.begin();
        nav.abandon();

        assert!(!nav.complete(ticket, Ok(listing("/a", None, &[]))));
        assert_eq!(nav.state(), NavigationState::Loading);
    }

    #[test]
    fn test_failure_enters_error() {
        let nav = navigator(ProjectMode::Load);
        let ticket = nav.begin();
        nav.complete(ticket, Err(ClientError::Transport("connection refused".into())));

        assert_eq!(nav.state(), NavigationState::Error("connection refused".into()));
        assert!(nav.select_current(None).is_none());
    }

    #[test]
    fn test_select_in_create_mode() {
        let nav = navigator(ProjectMode::Create);
        let ticket = nav.begin();
        nav.complete(ticket, Ok(listing("/home/u", Some("/home"), &[])));

        assert_eq!(nav.select_current(Some("proj")).as_deref(), Some("/home/u/proj"));
        assert_eq!(nav.select_current(Some("")).as_deref(), Some("/home/u"));
        assert!(nav.can_select(Some("proj")));
        assert!(!nav.can_select(Some("")));
        assert!(!nav.can_select(None));
    }

    #[test]
    fn test_select_in_load_mode_ignores_name() {
        let nav = navigator(ProjectMode::Load);
        let ticket = nav.begin();
        nav.complete(ticket, Ok(listing("/home/u/p.mbird", Some("/home/u"), &[])));

        assert_eq!(nav.select_current(Some("x")).as_deref(), Some("/home/u/p.mbird"));
        assert!(nav.can_select(None));
    }

    #[test]
    fn test_create_at_filesystem_root() {
        let nav = navigator(ProjectMode::Create);
        let ticket = nav.begin();
        nav.complete(ticket, Ok(listing("/", None, &[])));

        assert_eq!(nav.select_current(Some("proj")).as_deref(), Some("/proj"));
    }
}
