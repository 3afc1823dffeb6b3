use std::fmt;

// === StoreError ===

/// Errors related to durable storage of the read ids and the enabled flag.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing storage.
    Io(String),
    /// Failed to serialize or deserialize a stored value.
    Serialization(String),
    /// Database operation failed.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Storage I/O error: {}", msg),
            StoreError::Serialization(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
            StoreError::Database(msg) => write!(f, "Storage database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === AffordanceError ===

/// Errors related to inserting the toggle affordance into the host panel.
#[derive(Debug, PartialEq)]
pub enum AffordanceError {
    /// The panel anchor the affordance goes after is not rendered yet.
    AnchorNotFound,
    /// The affordance is already present in the panel.
    AlreadyInserted,
    /// The host rejected the insertion.
    InsertFailed(String),
}

impl fmt::Display for AffordanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffordanceError::AnchorNotFound => write!(f, "Affordance anchor not found"),
            AffordanceError::AlreadyInserted => write!(f, "Affordance already inserted"),
            AffordanceError::InsertFailed(msg) => {
                write!(f, "Affordance insertion failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for AffordanceError {}

// === BridgeError ===

/// Errors related to the JSON-lines host bridge.
#[derive(Debug)]
pub enum BridgeError {
    /// The incoming line is not a valid request.
    Parse(String),
    /// The event was understood but handling it failed.
    Dispatch(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Parse(msg) => write!(f, "parse error: {}", msg),
            BridgeError::Dispatch(msg) => write!(f, "dispatch error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

// === TrackerError ===

/// Top-level error returned by the event dispatcher.
#[derive(Debug)]
pub enum TrackerError {
    /// Persisting read-state failed.
    Store(StoreError),
    /// Loading or validating settings failed.
    Settings(SettingsError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Store(err) => write!(f, "{}", err),
            TrackerError::Settings(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Store(err) => Some(err),
            TrackerError::Settings(err) => Some(err),
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(err: StoreError) -> Self {
        TrackerError::Store(err)
    }
}

impl From<SettingsError> for TrackerError {
    fn from(err: SettingsError) -> Self {
        TrackerError::Settings(err)
    }
}
