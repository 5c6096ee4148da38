//! The JNI calls this backend makes are mostly not part of a Java native
//! method implementation, so there is no JNI local frame that will unwind and
//! free local references for us, and exceptions cannot simply be left pending
//! for Java to pick up on return.
//!
//! These utilities check + clear exceptions and map them into Rust errors.

use std::ops::Deref;

use jni::objects::{JObject, JString};
use jni::JavaVM;
use thiserror::Error;

use crate::error::HostError;

// Internal error type so jni-rs never shows up in the public API; it is
// stripped down to `HostError::JavaError` at the module boundary.
#[derive(Error, Debug)]
pub(crate) enum InternalHostError {
    #[error("A Java exception was thrown via a JNI method call: {0}")]
    JniException(String),
    #[error("A Java VM error: {0}")]
    JvmError(#[from] jni::errors::Error),
}

pub(crate) type InternalResult<T> = std::result::Result<T, InternalHostError>;

impl From<InternalHostError> for HostError {
    fn from(value: InternalHostError) -> Self {
        HostError::JavaError(value.to_string())
    }
}

// TODO: drop once JavaVM implements Clone upstream
#[derive(Debug)]
pub(crate) struct CloneJavaVM {
    pub jvm: JavaVM,
}

impl Clone for CloneJavaVM {
    fn clone(&self) -> Self {
        Self {
            jvm: unsafe { JavaVM::from_raw(self.jvm.get_java_vm_pointer()).unwrap() },
        }
    }
}

impl CloneJavaVM {
    pub unsafe fn from_raw(jvm: *mut jni::sys::JavaVM) -> InternalResult<Self> {
        Ok(Self {
            jvm: JavaVM::from_raw(jvm)?,
        })
    }
}

unsafe impl Send for CloneJavaVM {}
unsafe impl Sync for CloneJavaVM {}

impl Deref for CloneJavaVM {
    type Target = JavaVM;

    fn deref(&self) -> &Self::Target {
        &self.jvm
    }
}

/// Maps `jni::errors::Error::JavaException` into a richer error based on the
/// actual contents of the `JThrowable`, clearing the exception along the way.
///
/// (The `jni` crate doesn't do that automatically since it's more common to
/// let the exception get thrown when returning to Java.)
pub(crate) fn clear_and_map_exception_to_err(
    env: &mut jni::JNIEnv<'_>,
    err: jni::errors::Error,
) -> InternalHostError {
    if !matches!(err, jni::errors::Error::JavaException) {
        return err.into();
    }

    let result = env.with_local_frame::<_, _, InternalHostError>(5, |env| {
        let exception = env.exception_occurred()?;
        if exception.is_null() {
            // Should only be called after receiving a JavaException result.
            return Ok("UNKNOWN (no exception pending)".to_owned());
        }
        env.exception_clear()?;

        let message = env
            .call_method(&exception, "getMessage", "()Ljava/lang/String;", &[])?
            .l()?;
        if message.is_null() {
            return Ok("UNKNOWN (exception without message)".to_owned());
        }
        let message: String = env.get_string(&JString::from(message))?.into();
        Ok(message)
    });

    match result {
        Ok(message) => InternalHostError::JniException(message),
        Err(err) => {
            InternalHostError::JniException(format!("UNKNOWN (failed to query JThrowable: {err:?})"))
        }
    }
}

/// Post-processes a failed JNI interaction: pending exceptions are cleared
/// and folded into the error, anything else passes through.
pub(crate) fn map_internal(env: &mut jni::JNIEnv<'_>, err: InternalHostError) -> InternalHostError {
    match err {
        InternalHostError::JvmError(err) => clear_and_map_exception_to_err(env, err),
        other => other,
    }
}

/// Null-checked conversion of a Java object result into something usable.
pub(crate) fn non_null<'local>(
    object: JObject<'local>,
    what: &str,
) -> InternalResult<JObject<'local>> {
    if object.is_null() {
        Err(InternalHostError::JniException(format!("{what} was null")))
    } else {
        Ok(object)
    }
}
