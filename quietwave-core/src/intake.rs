use crate::error::IntakeError;

/// Media types accepted for upload. Exact, case-sensitive match as reported by the browser.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["audio/wav", "audio/mpeg", "audio/mp3"];

/// Value for the file input's `accept` attribute.
pub const ACCEPT_ATTRIBUTE: &str = ".wav,.mp3";

/// Descriptor of a file picked or dropped by the user.
/// The bytes stay in the browser until validation has passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_bytes,
        }
    }

    pub fn format(&self) -> Option<AudioFormat> {
        AudioFormat::from_media_type(&self.media_type)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "audio/wav" => Some(AudioFormat::Wav),
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AudioFormat::Wav => "WAV",
            AudioFormat::Mp3 => "MP3",
        }
    }
}

pub fn is_accepted(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type)
}

pub fn validate_upload(file: &UploadedFile) -> Result<AudioFormat, IntakeError> {
    file.format().ok_or_else(|| IntakeError::InvalidFormat {
        media_type: file.media_type.clone(),
    })
}

/// `clip.final.wav` + `_denoised.wav` → `clip.final_denoised.wav`.
///
/// A trailing `.ext` is stripped only when `ext` is non-empty and holds no `/`,
/// so `.hidden` loses everything and `clip.` keeps its dot.
pub fn export_filename(original: &str, suffix: &str) -> String {
    let stem = match original.rfind('.') {
        Some(i) if i + 1 < original.len() && !original[i + 1..].contains('/') => &original[..i],
        _ => original,
    };
    format!("{stem}{suffix}")
}
