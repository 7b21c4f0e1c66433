//! The upload flow: validate, show the original, process, show the result,
//! then work out statistics for both sides in the background.

use leptos::prelude::*;
use quietwave_core::analysis::{compute_stats, snr, AudioStats};
use quietwave_core::decode::{decode, sniff_format, DecodedAudio};
use quietwave_core::error::WorkspaceError;
use quietwave_core::intake::{AudioFormat, UploadedFile};
use quietwave_core::transport::ResourceId;
use quietwave_core::workspace::{Channel, Completion};
use web_sys::File;

use crate::audio::gateway::ProcessingGateway;
use crate::audio::loader;
use crate::audio::resource::PlayableResource;
use crate::state::AppState;
use crate::types::{StatsPanel, ToastKind};

pub fn submit(state: AppState, file: File) {
    let upload = UploadedFile::new(file.name(), file.type_(), file.size() as u64);
    let begun = state
        .workspace
        .try_update(|w| w.begin_upload(&upload, |id| PlayableResource::from_blob(id, &file)));

    let ticket = match begun {
        None => return,
        Some(Ok(ticket)) => ticket,
        Some(Err(WorkspaceError::Intake(e))) => {
            log::warn!("rejected {}: {e}", upload.name);
            state.notify(ToastKind::Error, "Invalid file format", "Please upload a WAV or MP3 file.");
            return;
        }
        Some(Err(WorkspaceError::Busy)) => {
            state.notify(ToastKind::Error, "Still Processing", "Wait for the current file to finish first.");
            return;
        }
        Some(Err(e)) => {
            log::error!("upload of {} failed: {e}", upload.name);
            state.notify(ToastKind::Error, "Upload Failed", e.to_string());
            return;
        }
    };

    log::info!(
        "processing {} ({}, {} bytes)",
        upload.name,
        upload.format().map(|f| f.label()).unwrap_or("?"),
        upload.size_bytes
    );
    let original_id = state
        .workspace
        .with_untracked(|w| w.transport(Channel::Original).bound());
    state.stats.set(StatsPanel::default());
    let gateway = state.config.with_value(ProcessingGateway::from_config);
    let format = upload.format();

    wasm_bindgen_futures::spawn_local(async move {
        let result = gateway.submit(&file, ticket.result_id()).await;
        let completion = state.workspace.try_update(|w| w.complete(ticket, result));

        match completion {
            Some(Completion::Processed { id }) => {
                state.notify(
                    ToastKind::Success,
                    "Audio Processed Successfully",
                    "Your audio has been denoised and is ready to play.",
                );
                if let (Some(original_id), Some(format)) = (original_id, format) {
                    update_stats(state, file, format, original_id, id).await;
                }
            }
            Some(Completion::Failed(e)) => {
                log::error!("processing of {} failed: {e}", upload.name);
                state.notify(
                    ToastKind::Error,
                    "Processing Failed",
                    "Failed to process audio file. Please try again.",
                );
            }
            Some(Completion::Stale) | None => {}
        }
    });
}

/// True while both resources the figures describe are still on screen.
fn still_current(state: AppState, original: ResourceId, denoised: ResourceId) -> bool {
    state
        .workspace
        .try_with_untracked(|w| {
            w.transport(Channel::Original).is_current(original) && w.transport(Channel::Denoised).is_current(denoised)
        })
        .unwrap_or(false)
}

async fn update_stats(state: AppState, file: File, format: AudioFormat, original_id: ResourceId, denoised_id: ResourceId) {
    let _ = state.stats.try_update(|s| s.computing = true);
    // Let the toast and the new controls paint before decoding.
    loader::yield_now().await;

    let original = match load_decoded(loader::read_blob(&file).await, Some(format)) {
        Ok(audio) => audio,
        Err(e) => {
            log::warn!("statistics unavailable for {}: {e}", file.name());
            let _ = state.stats.try_update(|s| s.computing = false);
            return;
        }
    };
    let original_stats = compute_stats(&original);
    log::debug!("original stats: {original_stats:?}");
    if !still_current(state, original_id, denoised_id) {
        return;
    }
    let _ = state.stats.try_update(|s| s.original = Some((original_id, original_stats)));
    loader::yield_now().await;

    let Some(url) = state
        .workspace
        .try_with_untracked(|w| w.resource(Channel::Denoised).map(|r| r.url().to_string()))
        .flatten()
    else {
        return;
    };
    let denoised = load_decoded(loader::fetch_bytes(&url).await, None);
    if !still_current(state, original_id, denoised_id) {
        return;
    }
    match denoised {
        Ok(denoised) => {
            let stats: AudioStats = compute_stats(&denoised);
            let ratio = snr(&original.samples, &denoised.samples);
            log::info!("SNR of processed output: {}", ratio.label());
            let _ = state.stats.try_update(|s| {
                s.denoised = Some((denoised_id, stats));
                s.snr = Some(ratio);
                s.computing = false;
            });
        }
        Err(e) => {
            log::warn!("statistics unavailable for processed audio: {e}");
            let _ = state.stats.try_update(|s| s.computing = false);
        }
    }
}

/// Decode fetched bytes. Without a known format the container is sniffed from the header.
fn load_decoded(bytes: Result<Vec<u8>, String>, format: Option<AudioFormat>) -> Result<DecodedAudio, String> {
    let bytes = bytes?;
    let format = format
        .or_else(|| sniff_format(&bytes))
        .ok_or_else(|| "unrecognised audio container".to_string())?;
    decode(&bytes, format).map_err(|e| e.to_string())
}
