//! Turns an upload into its denoised counterpart.
//!
//! `Simulated` is a placeholder that echoes the input back after a delay.
//! `Remote` posts the file to a processing service that answers with
//! `{"processedAudioUrl": "..."}`.

use quietwave_core::error::ProcessingError;
use quietwave_core::transport::ResourceId;
use serde::Deserialize;
use web_sys::{File, FormData, RequestInit};

use crate::audio::loader;
use crate::audio::resource::PlayableResource;
use crate::config::AppConfig;

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessingGateway {
    Simulated { delay_ms: u32 },
    Remote { endpoint: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessResponse {
    processed_audio_url: String,
}

impl ProcessingGateway {
    pub fn from_config(config: &AppConfig) -> Self {
        match &config.processing_endpoint {
            Some(endpoint) => Self::Remote { endpoint: endpoint.clone() },
            None => Self::Simulated { delay_ms: config.simulated_delay_ms },
        }
    }

    pub async fn submit(&self, file: &File, result_id: ResourceId) -> Result<PlayableResource, ProcessingError> {
        match self {
            Self::Simulated { delay_ms } => {
                log::info!("simulating processing of {} ({} ms)", file.name(), delay_ms);
                loader::sleep_ms(*delay_ms).await;
                PlayableResource::from_blob(result_id, file).map_err(ProcessingError::Unavailable)
            }
            Self::Remote { endpoint } => {
                let url = post_file(endpoint, file).await?;
                log::info!("processing service returned {url}");
                Ok(PlayableResource::remote(result_id, url))
            }
        }
    }
}

async fn post_file(endpoint: &str, file: &File) -> Result<String, ProcessingError> {
    let form = FormData::new().map_err(|e| ProcessingError::Unavailable(format!("{e:?}")))?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(|e| ProcessingError::Unavailable(format!("{e:?}")))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    let resp = loader::fetch_response(endpoint, Some(&init))
        .await
        .map_err(ProcessingError::Network)?;
    if !resp.ok() {
        return Err(ProcessingError::Backend { status: resp.status() });
    }
    let body = loader::response_text(&resp)
        .await
        .map_err(ProcessingError::MalformedResponse)?;
    parse_response(&body)
}

/// Extract the processed audio address from a service reply.
pub fn parse_response(body: &str) -> Result<String, ProcessingError> {
    let reply: ProcessResponse =
        serde_json::from_str(body).map_err(|e| ProcessingError::MalformedResponse(e.to_string()))?;
    let url = reply.processed_audio_url.trim();
    if url.is_empty() {
        return Err(ProcessingError::MalformedResponse("processedAudioUrl is empty".to_string()));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        assert_eq!(
            parse_response(r#"{"processedAudioUrl":"https://cdn.example/out.wav"}"#).unwrap(),
            "https://cdn.example/out.wav"
        );
        // Extra fields are fine.
        assert!(parse_response(r#"{"processedAudioUrl":"/a.wav","took":1.2}"#).is_ok());
    }

    #[test]
    fn test_parse_response_rejects_bad_bodies() {
        for body in ["", "<html>", r#"{"url":"/a.wav"}"#, r#"{"processedAudioUrl":"  "}"#] {
            assert!(
                matches!(parse_response(body), Err(ProcessingError::MalformedResponse(_))),
                "{body:?}"
            );
        }
    }

    #[test]
    fn test_gateway_choice() {
        let mut cfg = AppConfig::default();
        assert_eq!(ProcessingGateway::from_config(&cfg), ProcessingGateway::Simulated { delay_ms: 2000 });
        cfg.processing_endpoint = Some("http://localhost:5000/process".into());
        assert_eq!(
            ProcessingGateway::from_config(&cfg),
            ProcessingGateway::Remote { endpoint: "http://localhost:5000/process".into() }
        );
    }
}
