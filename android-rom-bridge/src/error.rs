use thiserror::Error;

// XXX: jni-rs must not leak into the public API, so the android backend keeps
// its own internal error type (see `android::jni_utils`) and strips it down to
// `HostError::JavaError` before it crosses this boundary.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Java VM or JNI error, including Java exceptions: {0}")]
    JavaError(String),

    /// An activity or picker could not be launched, e.g. because no matching
    /// component exists on the device. Observed by the host and logged; never
    /// reported through the engine callbacks.
    #[error("Failed to launch activity: {0}")]
    LaunchFailed(String),

    #[error(transparent)]
    Read(#[from] crate::reader::ReadError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;
