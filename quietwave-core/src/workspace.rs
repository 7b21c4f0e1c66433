//! Top-level page state: the uploaded file, its processed counterpart, both
//! transports and the comparison reveal.
//!
//! The workspace is generic over the resource handle so the browser front end
//! can store revocable object URLs while tests use plain values. Dropping a
//! handle is how a superseded resource gets released.

use crate::error::{ProcessingError, WorkspaceError};
use crate::intake::{export_filename, validate_upload, UploadedFile};
use crate::reveal::RevealState;
use crate::transport::{MediaEvent, PlaybackController, ResourceId, TransportCommand};

pub trait Resource {
    fn id(&self) -> ResourceId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Original,
    Denoised,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Original, Channel::Denoised];

    pub fn index(self) -> usize {
        match self {
            Channel::Original => 0,
            Channel::Denoised => 1,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Channel::Original => "Original Audio",
            Channel::Denoised => "Denoised Audio",
        }
    }
}

/// Proof that an upload is in flight. Consumed by [`Workspace::complete`], so each
/// upload clears the loading state at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be completed or the workspace stays loading"]
pub struct ProcessingTicket {
    upload: u64,
    result_id: ResourceId,
}

impl ProcessingTicket {
    /// Id the processed resource must carry.
    pub fn result_id(&self) -> ResourceId {
        self.result_id
    }
}

#[derive(Debug, PartialEq)]
pub enum Completion {
    Processed { id: ResourceId },
    Failed(ProcessingError),
    /// A newer upload replaced this one; the result was discarded.
    Stale,
}

#[derive(Debug)]
pub struct Workspace<R> {
    original: Option<R>,
    denoised: Option<R>,
    file_name: Option<String>,
    loading: bool,
    upload_seq: u64,
    next_resource: u64,
    transports: [PlaybackController; 2],
    reveal: RevealState,
}

impl<R: Resource> Workspace<R> {
    pub fn new(volume: f64) -> Self {
        Self {
            original: None,
            denoised: None,
            file_name: None,
            loading: false,
            upload_seq: 0,
            next_resource: 1,
            transports: [PlaybackController::new(volume), PlaybackController::new(volume)],
            reveal: RevealState::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn resource(&self, channel: Channel) -> Option<&R> {
        match channel {
            Channel::Original => self.original.as_ref(),
            Channel::Denoised => self.denoised.as_ref(),
        }
    }

    pub fn transport(&self, channel: Channel) -> &PlaybackController {
        &self.transports[channel.index()]
    }

    pub fn reveal(&self) -> &RevealState {
        &self.reveal
    }

    pub fn can_compare(&self) -> bool {
        self.original.is_some() && self.denoised.is_some()
    }

    pub fn export_name(&self, suffix: &str) -> Option<String> {
        self.denoised.as_ref()?;
        Some(export_filename(self.file_name.as_deref().unwrap_or(""), suffix))
    }

    fn allocate_id(&mut self) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource += 1;
        id
    }

    /// Validate the upload and switch the page into the loading state.
    ///
    /// A rejected file, or one whose resource can't be created, leaves every
    /// piece of state untouched. On success the previous original and denoised
    /// resources are dropped, the original transport is bound to the new
    /// resource and the denoised one goes idle.
    pub fn begin_upload(
        &mut self,
        upload: &UploadedFile,
        make_original: impl FnOnce(ResourceId) -> Result<R, String>,
    ) -> Result<ProcessingTicket, WorkspaceError> {
        validate_upload(upload)?;
        if self.loading {
            return Err(WorkspaceError::Busy);
        }

        let original_id = self.allocate_id();
        let original = make_original(original_id).map_err(WorkspaceError::ResourceUnavailable)?;
        let result_id = self.allocate_id();
        self.upload_seq += 1;

        self.original = Some(original);
        self.denoised = None;
        self.file_name = Some(upload.name.clone());
        self.loading = true;
        self.transports[Channel::Original.index()].bind(original_id);
        self.transports[Channel::Denoised.index()].unbind();
        self.sync_reveal();

        log::info!("upload {} accepted: {} ({})", self.upload_seq, upload.name, upload.media_type);
        Ok(ProcessingTicket {
            upload: self.upload_seq,
            result_id,
        })
    }

    /// Finish an upload. Loading always clears for the current ticket, whatever the outcome.
    pub fn complete(&mut self, ticket: ProcessingTicket, result: Result<R, ProcessingError>) -> Completion {
        if ticket.upload != self.upload_seq || !self.loading {
            log::warn!("discarding result of superseded upload {}", ticket.upload);
            return Completion::Stale;
        }
        self.loading = false;

        let completion = match result {
            Ok(resource) => {
                let id = resource.id();
                if id != ticket.result_id {
                    log::warn!("processed resource {id} does not match expected {}", ticket.result_id);
                }
                self.denoised = Some(resource);
                self.transports[Channel::Denoised.index()].bind(id);
                Completion::Processed { id }
            }
            Err(e) => {
                log::error!("processing failed: {e}");
                Completion::Failed(e)
            }
        };
        self.sync_reveal();
        completion
    }

    /// Drop both resources and return to the empty page.
    pub fn clear(&mut self) {
        self.original = None;
        self.denoised = None;
        self.file_name = None;
        self.loading = false;
        self.upload_seq += 1;
        for t in &mut self.transports {
            t.unbind();
        }
        self.sync_reveal();
    }

    pub fn toggle_play(&mut self, channel: Channel) -> TransportCommand {
        self.transports[channel.index()].toggle_play()
    }

    pub fn seek(&mut self, channel: Channel, secs: f64) -> Option<f64> {
        self.transports[channel.index()].seek(secs)
    }

    pub fn set_volume(&mut self, channel: Channel, volume: f64) -> f64 {
        self.transports[channel.index()].set_volume(volume)
    }

    pub fn handle_media_event(&mut self, channel: Channel, id: ResourceId, event: MediaEvent) -> bool {
        self.transports[channel.index()].handle_event(id, event)
    }

    pub fn begin_drag(&mut self) -> bool {
        self.reveal.begin_drag()
    }

    pub fn update_drag(&mut self, pointer_x: f64, container_left: f64, container_width: f64) -> bool {
        self.reveal.update_drag(pointer_x, container_left, container_width)
    }

    pub fn end_drag(&mut self) {
        self.reveal.end_drag();
    }

    fn sync_reveal(&mut self) {
        let can = self.can_compare();
        self.reveal.set_enabled(can);
    }
}
