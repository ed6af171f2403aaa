//! Print job state and document lifecycle
//!
//! `Idle → DocumentStarted → PageStarted → PageEnded → DocumentEnded`,
//! with `Failed` reachable from every step after the document started.
//! A [`Document`] that is dropped before it finished aborts the spooled
//! document.

use crate::config::FontSpec;
use crate::device::{DeviceContext, DocumentInfo};
use crate::error::{DeviceError, JobStage, PrintError, PrintResult};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Lifecycle state of a document on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    DocumentStarted,
    PageStarted,
    PageEnded,
    DocumentEnded,
    Failed,
}

/// Per-invocation job record
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub source: PathBuf,
    pub device: String,
    pub size_hint: u64,
    /// Vertical position of the next line
    pub cursor_y: i32,
    pub lines_read: usize,
    pub lines_drawn: usize,
    pub pages: usize,
    lines_on_page: usize,
}

impl PrintJob {
    pub fn new(source: PathBuf, device: String, size_hint: u64, top: i32) -> Self {
        Self {
            source,
            device,
            size_hint,
            cursor_y: top,
            lines_read: 0,
            lines_drawn: 0,
            pages: 1,
            lines_on_page: 0,
        }
    }

    /// Move the cursor past one line, drawn or not
    pub fn advance(&mut self, line_height: i32) {
        self.cursor_y = self.cursor_y.saturating_add(line_height);
        self.lines_read += 1;
        self.lines_on_page += 1;
    }

    /// Whether the next line would cross `page_height`
    ///
    /// A page always receives at least one line.
    pub fn needs_page_break(&self, line_height: i32, page_height: i32) -> bool {
        self.lines_on_page > 0 && self.cursor_y.saturating_add(line_height) > page_height
    }

    pub fn new_page(&mut self, top: i32) {
        self.cursor_y = top;
        self.lines_on_page = 0;
        self.pages += 1;
    }
}

/// A started document on a device context
pub struct Document<'a, C: DeviceContext> {
    ctx: &'a mut C,
    state: JobState,
}

impl<'a, C: DeviceContext> Document<'a, C> {
    /// Begin a document; failure means no document exists on the device
    pub fn start(ctx: &'a mut C, info: &DocumentInfo) -> PrintResult<Self> {
        ctx.start_document(info).map_err(PrintError::JobCreationFailed)?;
        debug!(name = %info.name, size_hint = info.size_hint, "Document started");
        Ok(Self {
            ctx,
            state: JobState::DocumentStarted,
        })
    }

    pub fn start_page(&mut self) -> PrintResult<()> {
        debug_assert!(matches!(
            self.state,
            JobState::DocumentStarted | JobState::PageEnded
        ));
        self.step(JobStage::StartPage, |ctx| ctx.start_page())?;
        self.state = JobState::PageStarted;
        Ok(())
    }

    pub fn select_font(&mut self, spec: &FontSpec) -> PrintResult<C::Font> {
        debug_assert_eq!(self.state, JobState::PageStarted);
        self.step(JobStage::Draw, |ctx| ctx.select_font(spec))
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &[u16]) -> PrintResult<()> {
        debug_assert_eq!(self.state, JobState::PageStarted);
        self.step(JobStage::Draw, |ctx| ctx.draw_text(x, y, text))
    }

    pub fn end_page(&mut self) -> PrintResult<()> {
        debug_assert_eq!(self.state, JobState::PageStarted);
        self.step(JobStage::EndPage, |ctx| ctx.end_page())?;
        self.state = JobState::PageEnded;
        Ok(())
    }

    /// End the document, consuming the guard
    pub fn finish(mut self) -> PrintResult<()> {
        debug_assert_eq!(self.state, JobState::PageEnded);
        let result = self.ctx.end_document();
        // EndDoc was attempted; the document is no longer ours to abort
        self.state = match result {
            Ok(()) => JobState::DocumentEnded,
            Err(_) => JobState::Idle,
        };
        result.map_err(|e| PrintError::incomplete(JobStage::EndDocument, e))
    }

    fn step<T>(
        &mut self,
        stage: JobStage,
        f: impl FnOnce(&mut C) -> Result<T, DeviceError>,
    ) -> PrintResult<T> {
        f(&mut *self.ctx).map_err(|e| {
            self.state = JobState::Failed;
            PrintError::incomplete(stage, e)
        })
    }
}

impl<C: DeviceContext> Drop for Document<'_, C> {
    fn drop(&mut self) {
        match self.state {
            JobState::Idle | JobState::DocumentEnded => {}
            state => {
                warn!(?state, "Aborting unfinished document");
                self.ctx.abort_document();
            }
        }
    }
}
