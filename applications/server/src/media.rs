/// Audio container formats accepted for upload
use serde::{Deserialize, Serialize};

/// MIME type served when a blob's format is unknown
pub const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Wav,
    Opus,
    M4a,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "opus",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/opus",
            AudioFormat::M4a => "audio/mp4",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "flac" => Some(AudioFormat::Flac),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            "wav" => Some(AudioFormat::Wav),
            "opus" => Some(AudioFormat::Opus),
            "m4a" => Some(AudioFormat::M4a),
            _ => None,
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/flac" | "audio/x-flac" => Some(AudioFormat::Flac),
            "audio/ogg" | "audio/vorbis" => Some(AudioFormat::Ogg),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(AudioFormat::Wav),
            "audio/opus" => Some(AudioFormat::Opus),
            "audio/mp4" | "audio/x-m4a" | "audio/aac" => Some(AudioFormat::M4a),
            _ => None,
        }
    }
}

/// Whether a declared MIME type can carry audio
///
/// Generic binary uploads are given the benefit of the doubt.
pub fn is_audio_mime(mime: &str) -> bool {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("audio/") || essence == "application/octet-stream"
}

/// MIME type to serve for a blob with the given extension
pub fn mime_for_extension(ext: Option<&str>) -> String {
    let Some(ext) = ext else {
        return DEFAULT_MIME_TYPE.to_string();
    };
    AudioFormat::from_extension(ext)
        .map(|f| f.mime_type().to_string())
        .or_else(|| {
            mime_guess::from_ext(ext)
                .first()
                .filter(|m| m.type_() == mime_guess::mime::AUDIO)
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}
