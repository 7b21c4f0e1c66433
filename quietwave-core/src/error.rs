use thiserror::Error;

/// Upload rejected before anything else happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("unsupported media type {media_type:?} (expected WAV or MP3)")]
    InvalidFormat { media_type: String },
}

/// Failure of the processing gateway. Terminal for that upload; the user retries by uploading again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("network error: {0}")]
    Network(String),
    #[error("processing backend returned HTTP {status}")]
    Backend { status: u16 },
    #[error("malformed processing response: {0}")]
    MalformedResponse(String),
    #[error("processing unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("WAV decode failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("MP3 decode failed: {0}")]
    Mp3(#[from] symphonia::core::errors::Error),
    #[error("no audio track found")]
    NoTrack,
    #[error("decoded stream is empty")]
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("an upload is already being processed")]
    Busy,
    #[error("could not create a playable resource: {0}")]
    ResourceUnavailable(String),
}
