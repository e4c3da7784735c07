//! The multi-page capture session.
//!
//! [`MultiPageSession`] owns an ordered list of captured pages. Exactly one
//! page is active at a time; editing goes through the same
//! [`EditorSession`] engine as the single-image flow, instantiated for the
//! selected page. History is per page and lives only in the active editor:
//! switching pages commits the edit state back to the page and discards the
//! editor (with any transient drag), so each page's undo/redo is
//! independent.
//!
//! Finalizing renders every page's final output in order and hands the set
//! to the page-composition collaborator.

use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compose::{ComposeError, ComposeOptions, DocumentComposer};
use crate::decode::Bitmap;
use crate::edit::EditState;
use crate::render::{render_final, RenderError};
use crate::session::{EditorError, EditorSession};

/// Default maximum number of pages per capture session.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Stable identity of a page, independent of its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(u64);

impl PageId {
    /// Reconstruct an id from its raw value (e.g. one handed to a host UI).
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// One captured page and its committed edit state.
#[derive(Debug)]
struct Page {
    id: PageId,
    image: Arc<Bitmap>,
    state: EditState,
    /// Rendered final output, cached until the page is edited again.
    final_image: Option<Arc<Bitmap>>,
}

/// Errors surfaced by multi-page session operations.
#[derive(Debug, Error)]
pub enum PageSessionError {
    /// The configured page limit was reached; the capture was rejected and
    /// no state changed.
    #[error("Page limit of {max} reached")]
    PageLimitExceeded { max: usize },

    /// No page with the given id exists.
    #[error("No such page")]
    UnknownPage,

    /// A reorder index was out of range.
    #[error("Page index {index} out of range")]
    IndexOutOfRange { index: usize },

    /// Finalizing requires at least one page.
    #[error("Cannot finalize with no pages")]
    NoPages,

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// An ordered multi-page capture session.
pub struct MultiPageSession {
    pages: Vec<Page>,
    selected: Option<usize>,
    /// Editor for the selected page; rebuilt on every selection change.
    active: Option<EditorSession>,
    next_id: u64,
    max_pages: usize,
    viewport: (f64, f64),
}

impl MultiPageSession {
    pub fn new(max_pages: usize, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            pages: Vec::new(),
            selected: None,
            active: None,
            next_id: 1,
            max_pages: max_pages.max(1),
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Ids of all pages in display order.
    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }

    /// Id of the currently selected page.
    pub fn selected_page(&self) -> Option<PageId> {
        self.selected.map(|idx| self.pages[idx].id)
    }

    /// The editor for the selected page, if any page is selected.
    pub fn editor(&mut self) -> Option<&mut EditorSession> {
        self.active.as_mut()
    }

    /// Append a captured bitmap as a new page and select it.
    ///
    /// Rejected with [`PageSessionError::PageLimitExceeded`] and no state
    /// change when the session already holds the configured maximum.
    pub fn add_page(&mut self, bitmap: Bitmap) -> Result<PageId, PageSessionError> {
        if self.pages.len() >= self.max_pages {
            warn!("page capture rejected: limit of {} reached", self.max_pages);
            return Err(PageSessionError::PageLimitExceeded {
                max: self.max_pages,
            });
        }

        let id = PageId(self.next_id);
        self.next_id += 1;

        let image = Arc::new(bitmap);
        let state = EditState::identity(image.width, image.height);
        self.pages.push(Page {
            id,
            image,
            state,
            final_image: None,
        });
        debug!("page {:?} added ({} total)", id, self.pages.len());

        self.activate(self.pages.len() - 1);
        Ok(id)
    }

    /// Make the given page the active one. Selecting the already-selected
    /// page is a no-op.
    pub fn select_page(&mut self, id: PageId) -> Result<(), PageSessionError> {
        let index = self.index_of(id)?;
        if self.selected == Some(index) {
            return Ok(());
        }
        self.activate(index);
        Ok(())
    }

    /// Remove a page. When the selected page is deleted the nearest
    /// remaining page is selected; deleting the last page leaves the
    /// session empty.
    pub fn delete_page(&mut self, id: PageId) -> Result<(), PageSessionError> {
        let index = self.index_of(id)?;

        if self.selected == Some(index) {
            self.active = None;
            self.selected = None;
            self.pages.remove(index);
            if !self.pages.is_empty() {
                self.activate(index.min(self.pages.len() - 1));
            }
        } else {
            // The active editor is untouched; only its page index shifts
            self.pages.remove(index);
            if let Some(sel) = self.selected {
                if index < sel {
                    self.selected = Some(sel - 1);
                }
            }
        }
        debug!("page {:?} deleted ({} remain)", id, self.pages.len());
        Ok(())
    }

    /// Move the page at `from` to position `to`, shifting the others. The
    /// selected page keeps its identity, not its index.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), PageSessionError> {
        if from >= self.pages.len() {
            return Err(PageSessionError::IndexOutOfRange { index: from });
        }
        if to >= self.pages.len() {
            return Err(PageSessionError::IndexOutOfRange { index: to });
        }
        if from == to {
            return Ok(());
        }

        let selected_id = self.selected_page();
        let page = self.pages.remove(from);
        self.pages.insert(to, page);

        if let Some(id) = selected_id {
            // Position may have shifted; identity is what's preserved
            self.selected = self.pages.iter().position(|p| p.id == id);
        }
        Ok(())
    }

    /// Propagate a viewport change to the active editor.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
        if let Some(session) = self.active.as_mut() {
            session.set_viewport(width, height);
        }
    }

    /// Compose all pages, in order, into a document.
    ///
    /// Each page's final output is rendered from its committed edit state
    /// (cached renders are reused for untouched pages). On success the
    /// session is torn down; on failure the pages are retained so the call
    /// can be retried, but the transient editing state is dropped either
    /// way.
    pub fn finalize(
        &mut self,
        composer: &dyn DocumentComposer,
        options: &ComposeOptions,
    ) -> Result<Vec<u8>, PageSessionError> {
        if self.pages.is_empty() {
            return Err(PageSessionError::NoPages);
        }

        // Editing state is transient and torn down whether or not
        // composition succeeds; the pages themselves survive a failure.
        self.commit_active();
        self.active = None;
        self.selected = None;

        let mut rendered = Vec::with_capacity(self.pages.len());
        for page in &mut self.pages {
            let final_image = match &page.final_image {
                Some(cached) => Arc::clone(cached),
                None => {
                    let output = Arc::new(render_final(&page.image, &page.state)?);
                    page.final_image = Some(Arc::clone(&output));
                    output
                }
            };
            rendered.push((*final_image).clone());
        }

        let bytes = composer.compose(&rendered, options)?;

        debug!("finalized {} pages into a document", self.pages.len());
        self.pages.clear();
        Ok(bytes)
    }

    fn index_of(&self, id: PageId) -> Result<usize, PageSessionError> {
        self.pages
            .iter()
            .position(|p| p.id == id)
            .ok_or(PageSessionError::UnknownPage)
    }

    /// Commit the active editor's state back onto its page, then build a
    /// fresh editor for the page at `index`.
    fn activate(&mut self, index: usize) {
        self.commit_active();
        let page = &self.pages[index];
        self.active = Some(EditorSession::resume(
            Arc::clone(&page.image),
            page.state,
            self.viewport.0,
            self.viewport.1,
        ));
        self.selected = Some(index);
    }

    /// Write the active editor's committed state back to its page. Any
    /// in-flight drag is abandoned first; a cached final render is
    /// invalidated when the page actually changed.
    fn commit_active(&mut self) {
        let (Some(index), Some(mut session)) = (self.selected, self.active.take()) else {
            return;
        };
        session.abandon_drag();

        let page = &mut self.pages[index];
        let new_state = *session.edit_state();
        let new_image = session.image_arc();
        if new_state != page.state || !Arc::ptr_eq(&new_image, &page.image) {
            page.final_image = None;
        }
        page.state = new_state;
        page.image = new_image;
    }
}
