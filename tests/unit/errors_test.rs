use std::error::Error;

use rstest::rstest;
use skimmed::types::errors::*;

// === StoreError Tests ===

#[rstest]
#[case(StoreError::Io("quota exceeded".to_string()), "Storage I/O error: quota exceeded")]
#[case(StoreError::Serialization("not a list".to_string()), "Storage serialization error: not a list")]
#[case(StoreError::Database("locked".to_string()), "Storage database error: locked")]
fn store_error_display(#[case] err: StoreError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn store_error_from_rusqlite() {
    let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StoreError::Database(_)));
}

// === SettingsError Tests ===

#[rstest]
#[case(SettingsError::IoError("denied".to_string()), "Settings I/O error: denied")]
#[case(SettingsError::SerializationError("eof".to_string()), "Settings serialization error: eof")]
#[case(SettingsError::InvalidKey("dwell.nope".to_string()), "Invalid settings key: dwell.nope")]
#[case(SettingsError::InvalidValue("zero".to_string()), "Invalid settings value: zero")]
fn settings_error_display(#[case] err: SettingsError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

// === AffordanceError Tests ===

#[test]
fn affordance_error_display_variants() {
    assert_eq!(
        AffordanceError::AnchorNotFound.to_string(),
        "Affordance anchor not found"
    );
    assert_eq!(
        AffordanceError::AlreadyInserted.to_string(),
        "Affordance already inserted"
    );
    assert_eq!(
        AffordanceError::InsertFailed("detached".to_string()).to_string(),
        "Affordance insertion failed: detached"
    );
}

// === BridgeError Tests ===

#[test]
fn bridge_error_display_variants() {
    assert_eq!(
        BridgeError::Parse("missing event".to_string()).to_string(),
        "parse error: missing event"
    );
    assert_eq!(
        BridgeError::Dispatch("boom".to_string()).to_string(),
        "dispatch error: boom"
    );
}

// === TrackerError Tests ===

#[test]
fn tracker_error_wraps_store_error_with_source() {
    let err: TrackerError = StoreError::Io("quota exceeded".to_string()).into();
    assert_eq!(err.to_string(), "Storage I/O error: quota exceeded");
    assert!(err.source().is_some());
}

#[test]
fn tracker_error_wraps_settings_error() {
    let err: TrackerError = SettingsError::InvalidValue("zero".to_string()).into();
    assert!(matches!(err, TrackerError::Settings(_)));
}

#[test]
fn leaf_errors_have_no_source() {
    let err: Box<dyn Error> = Box::new(StoreError::Io("x".to_string()));
    assert!(err.source().is_none());
}
