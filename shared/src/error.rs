use thiserror::Error;

use crate::intake::MAX_UPLOAD_BYTES;

/// Errors that end up in front of the user as a notice or an inline message.
pub trait UserFacing {
    /// Stable taxonomy name, also sent as `ErrorResponse::code`.
    fn code(&self) -> &'static str;
    /// Short notice title.
    fn title(&self) -> &'static str;
    fn user_message(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    DeviceNotFound,
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("no active camera session")]
    NoActiveSession,
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}

impl CameraError {
    /// Maps a browser `DOMException` name from `getUserMedia` onto the taxonomy.
    pub fn from_dom_exception(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => CameraError::PermissionDenied,
            "NotFoundError" | "OverconstrainedError" | "DevicesNotFoundError" => CameraError::DeviceNotFound,
            _ if message.is_empty() => CameraError::DeviceUnavailable(name.to_string()),
            _ => CameraError::DeviceUnavailable(format!("{}: {}", name, message)),
        }
    }
}

impl UserFacing for CameraError {
    fn code(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => "PermissionDenied",
            CameraError::DeviceNotFound => "DeviceNotFound",
            CameraError::DeviceUnavailable(_) => "DeviceUnavailable",
            CameraError::NoActiveSession => "NoActiveSession",
            CameraError::CaptureFailed(_) => "CaptureFailed",
        }
    }

    fn title(&self) -> &'static str {
        "Camera Error"
    }

    fn user_message(&self) -> String {
        match self {
            CameraError::PermissionDenied => {
                "Camera permission denied. Please allow camera access in your browser settings.".into()
            }
            CameraError::DeviceNotFound => {
                "No camera found. Please ensure a camera is connected and enabled.".into()
            }
            CameraError::DeviceUnavailable(_) => {
                "Could not access camera. It may be in use by another application.".into()
            }
            CameraError::NoActiveSession => "Start the camera before capturing a photo.".into(),
            CameraError::CaptureFailed(_) => "Could not capture a photo. Please try again.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("file of {size} bytes exceeds the upload limit")]
    FileTooLarge { size: u64 },
    #[error("unsupported media type: {mime_type:?}")]
    InvalidType { mime_type: String },
    #[error("file is empty")]
    EmptyFile,
    #[error("malformed data url")]
    MalformedDataUrl,
    #[error("image payload is not valid base64")]
    InvalidEncoding,
}

impl UserFacing for IntakeError {
    fn code(&self) -> &'static str {
        match self {
            IntakeError::FileTooLarge { .. } => "FileTooLarge",
            IntakeError::InvalidType { .. } => "InvalidType",
            IntakeError::EmptyFile => "EmptyFile",
            IntakeError::MalformedDataUrl => "MalformedDataUrl",
            IntakeError::InvalidEncoding => "InvalidEncoding",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            IntakeError::FileTooLarge { .. } => "File too large",
            IntakeError::InvalidType { .. } => "Invalid file type",
            IntakeError::EmptyFile => "Empty file",
            IntakeError::MalformedDataUrl | IntakeError::InvalidEncoding => "Unreadable image",
        }
    }

    fn user_message(&self) -> String {
        match self {
            IntakeError::FileTooLarge { .. } => format!(
                "Please upload an image smaller than {}MB.",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            ),
            IntakeError::InvalidType { .. } => "Please upload an image file (e.g., JPG, PNG).".into(),
            IntakeError::EmptyFile => "The selected file is empty.".into(),
            IntakeError::MalformedDataUrl | IntakeError::InvalidEncoding => {
                "The selected image could not be read. Please try another file.".into()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no image selected")]
    NoImageSelected,
    #[error("an analysis is already running")]
    AnalysisInProgress,
}

impl UserFacing for SessionError {
    fn code(&self) -> &'static str {
        match self {
            SessionError::NoImageSelected => "NoImageSelected",
            SessionError::AnalysisInProgress => "AnalysisInProgress",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            SessionError::NoImageSelected => "No Image Selected",
            SessionError::AnalysisInProgress => "Analysis Running",
        }
    }

    fn user_message(&self) -> String {
        match self {
            SessionError::NoImageSelected => "Please upload or capture an image first.".into(),
            SessionError::AnalysisInProgress => "Please wait for the current analysis to finish.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrativeError {
    #[error("narrative generation failed: {0}")]
    GenerationFailed(String),
}

impl UserFacing for NarrativeError {
    fn code(&self) -> &'static str {
        "GenerationFailed"
    }

    fn title(&self) -> &'static str {
        "Error"
    }

    fn user_message(&self) -> String {
        "Failed to get detailed information from AI. Please try again.".into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A transient toast-style message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn from_error<E: UserFacing>(err: &E) -> Self {
        Self {
            title: err.title().to_string(),
            description: err.user_message(),
            variant: NoticeVariant::Destructive,
        }
    }
}
