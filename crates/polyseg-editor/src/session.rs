//! Image lifecycle and persistence hand-off.
//!
//! The editor never talks to storage itself. A [`SaveSink`] receives the
//! committed polygon list on explicit save and as an autosave right before
//! switching images. Saving is split into [`Editor::begin_save`] and
//! [`Editor::finish_save`] so editing can continue while a save is in
//! flight; the ticket remembers which history revision was sent.

use crate::controller::{Editor, LoadedImage, Notice, Response};
use polyseg_core::model::{self, ImageData, ImageDimensions, Polygon};
use polyseg_core::{SaveError, fit_to_view};
use serde::Serialize;

/// Outbound persistence collaborator.
pub trait SaveSink {
    fn save(&mut self, request: &SaveRequest) -> Result<(), SaveError>;
}

/// Payload of one save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub polygons: Vec<Polygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
}

/// Identifies the state a save was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    epoch: u64,
    revision: u64,
}

impl Editor {
    /// Snapshot the committed state for saving.
    ///
    /// # Errors
    /// [`SaveError::NoImage`] if no image has been loaded.
    pub fn begin_save(&self) -> Result<(SaveTicket, SaveRequest), SaveError> {
        let Some(image) = &self.image else {
            return Err(SaveError::NoImage);
        };
        let ticket = SaveTicket {
            epoch: self.image_epoch,
            revision: self.history.current_revision(),
        };
        let request = SaveRequest {
            polygons: self.history.current().to_vec(),
            image_id: Some(image.id.clone()),
            dimensions: Some(image.dimensions),
        };
        Ok((ticket, request))
    }

    /// Record the outcome of a save started with [`Editor::begin_save`].
    ///
    /// On success the revision the ticket captured becomes the saved one,
    /// so edits made in the meantime keep the editor dirty. On failure a
    /// notice is queued and nothing else changes.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<(), SaveError>) -> Response {
        match result {
            Ok(()) if ticket.epoch == self.image_epoch => {
                self.history.mark_saved_revision(ticket.revision);
                log::info!(
                    "saved {} (revision {})",
                    self.image_id().unwrap_or_default(),
                    ticket.revision
                );
                Response::REPAINT
            }
            Ok(()) => {
                log::debug!("save for a previous image finished; ignoring");
                Response::NONE
            }
            Err(err) => {
                log::error!("save failed: {err}");
                self.notices.push(Notice::error(err.to_string()));
                Response::REPAINT
            }
        }
    }

    /// Save synchronously through `sink`.
    pub fn save_with(&mut self, sink: &mut dyn SaveSink) -> Result<(), SaveError> {
        let (ticket, request) = match self.begin_save() {
            Ok(started) => started,
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                return Err(err);
            }
        };
        let result = sink.save(&request);
        self.finish_save(ticket, result.clone());
        result
    }

    /// Switch to a new image.
    ///
    /// If the current image has unsaved changes and a sink is given, it is
    /// autosaved first; a failed autosave is reported but does not block
    /// the switch. Everything else (selection, mode, gesture state,
    /// history, view) is reset for the new image.
    pub fn load_image(&mut self, image: ImageData, autosave: Option<&mut dyn SaveSink>) -> Response {
        if self.image.is_some()
            && self.has_unsaved_changes()
            && let Some(sink) = autosave
        {
            log::info!("autosaving {} before switching images", self.image_id().unwrap_or_default());
            if let Err(err) = self.save_with(sink) {
                log::warn!("autosave failed, switching images anyway: {err}");
            }
        }

        let dimensions = image.dimensions();
        let polygons = model::normalize_polygons(image.polygons);
        log::info!("loaded image {} with {} polygons", image.id, polygons.len());

        self.polygons = polygons.clone();
        self.history.reset(polygons);
        let t = self.modes.reset();
        self.apply_transition(t);
        self.reset_gesture();
        self.image = Some(LoadedImage {
            id: image.id,
            dimensions,
        });
        self.image_epoch += 1;
        self.transform = fit_to_view(dimensions, self.canvas, self.config.fit_padding);
        Response::REPAINT
    }
}
