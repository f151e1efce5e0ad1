use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    BadBindAddress(String),
    BadPortRange(String),
    DirectoryDoesNotExist(String),
    MissingApiToken,
    MissingRemoteUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::BadBindAddress(e) => write!(f, "Bind address error: {}", e),
            ConfigError::BadPortRange(e) => write!(f, "Port range error: {}", e),
            ConfigError::DirectoryDoesNotExist(e) => write!(f, "Directory error: {}", e),
            ConfigError::MissingApiToken => write!(f, "API token is required but not configured"),
            ConfigError::MissingRemoteUrl => {
                write!(f, "Remote backend selected but no base URL configured")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failure of one `normalize` call. `InvalidJson` is the only variant: any
/// input that parses as JSON normalizes successfully, possibly to an empty
/// transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    InvalidJson(String),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::InvalidJson(e) => write!(f, "Input is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for NormalizeError {}

#[derive(Debug)]
pub enum TransportError {
    ConnectionFailed(String),
    BodyConsumed,
    RequestNotSent,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::ConnectionFailed(e) => write!(f, "Transport connection failed: {}", e),
            TransportError::BodyConsumed => write!(f, "Response body was already consumed"),
            TransportError::RequestNotSent => write!(f, "Request was not sent yet"),
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug)]
pub enum SessionError {
    NotArmed,
    AlreadyCaptured,
    FetchFailed(String),
    ImplausibleBody(usize),
    NormalizeError(NormalizeError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotArmed => write!(f, "Session is not armed"),
            SessionError::AlreadyCaptured => write!(f, "Session already captured a payload"),
            SessionError::FetchFailed(e) => write!(f, "Manual fetch failed: {}", e),
            SessionError::ImplausibleBody(n) => {
                write!(
                    f,
                    "Fetched body too short to be a caption payload ({} bytes)",
                    n
                )
            }
            SessionError::NormalizeError(e) => write!(f, "Normalization failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<NormalizeError> for SessionError {
    fn from(err: NormalizeError) -> Self {
        SessionError::NormalizeError(err)
    }
}

#[derive(Debug)]
pub enum HandoffError {
    ChannelClosed,
    ReadFailed(String),
}

impl fmt::Display for HandoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandoffError::ChannelClosed => write!(f, "Hand-off channel is closed"),
            HandoffError::ReadFailed(e) => write!(f, "Hand-off read failed: {}", e),
        }
    }
}

impl std::error::Error for HandoffError {}

#[derive(Debug)]
pub enum StorageError {
    BackendUnavailable(String),
    ConnectionFailed,
    WriteFailed,
    ReadFailed,
    NotFound,
    Unauthorized,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::BackendUnavailable(e) => write!(f, "Storage backend unavailable: {}", e),
            StorageError::ConnectionFailed => write!(f, "Storage connection failed"),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
            StorageError::NotFound => write!(f, "Record not found"),
            StorageError::Unauthorized => write!(f, "Storage backend rejected the credential"),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum WebError {
    BindFailed(std::io::Error),
    MissingSecret,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
            WebError::MissingSecret => write!(f, "No API token configured for the web server"),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    WebError(WebError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}
