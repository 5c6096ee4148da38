//! Native methods the Java activities bind against.
//!
//! These are the only unwind boundaries in the crate; each body runs under
//! [`abort_on_panic`] since unwinding into the JVM is undefined behaviour.

use jni::objects::{GlobalRef, JObject, JString};
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{error, warn};

use crate::error::HostError;
use crate::handoff::{route_external_file, ControllerLauncher, HandoffDisposition};
use crate::host::RequestKind;
use crate::util::abort_on_panic;

use super::intent::{Action, Intent};
use super::jni_utils::{map_internal, InternalHostError};
use super::CONTROLLER;

/// Called by `GameActivity.onActivityResult` for every request code this
/// crate issued. `uri` is `data == null ? null : data.getData()`.
#[no_mangle]
pub extern "system" fn Java_org_rustgame_rombridge_GameActivity_nativePickerResult(
    env: JNIEnv,
    _activity: JObject,
    request_code: jint,
    uri: JObject,
) {
    abort_on_panic(|| {
        let Ok(request) = RequestKind::try_from(request_code) else {
            error!("Ignoring picker result with unknown request code {request_code:#x}");
            return;
        };
        let uri = if uri.is_null() {
            None
        } else {
            match env.new_global_ref(&uri) {
                Ok(uri) => Some(uri),
                Err(err) => {
                    error!("Failed to pin the picker result uri: {err}");
                    return;
                }
            }
        };
        let Some(controller) = CONTROLLER.get() else {
            warn!("Dropping {request:?} result, no controller is attached");
            return;
        };
        controller.lock().unwrap().resolve(request, uri.as_ref());
    });
}

/// Called by `GameActivity.onDestroy`.
#[no_mangle]
pub extern "system" fn Java_org_rustgame_rombridge_GameActivity_nativeDetachController(
    _env: JNIEnv,
    _activity: JObject,
) {
    abort_on_panic(super::detach);
}

/// Called by `IntentReceiverActivity.onCreate` with the `ACTION_VIEW` data
/// uri, its MIME type and the fully qualified game activity class name.
///
/// Returns `true` when a running controller consumed the file, meaning the
/// receiver should bring the existing task back to the front before
/// finishing; `false` means finish immediately.
#[no_mangle]
pub extern "system" fn Java_org_rustgame_rombridge_IntentReceiverActivity_nativeRouteIntent<
    'local,
>(
    mut env: JNIEnv<'local>,
    receiver: JObject<'local>,
    uri: JObject<'local>,
    mime: JString<'local>,
    activity_class: JString<'local>,
) -> jboolean {
    abort_on_panic(|| {
        if uri.is_null() {
            warn!("External intent carried no data uri");
            return JNI_FALSE;
        }
        let mime: String = match env.get_string(&mime) {
            Ok(mime) => mime.into(),
            Err(err) => {
                error!("Failed to read the external intent MIME type: {err}");
                return JNI_FALSE;
            }
        };
        let uri = match env.new_global_ref(&uri) {
            Ok(uri) => uri,
            Err(err) => {
                error!("Failed to pin the external file uri: {err}");
                return JNI_FALSE;
            }
        };

        let mut launcher = ReceiverLauncher {
            env: &mut env,
            receiver: &receiver,
            activity_class: &activity_class,
        };
        match route_external_file(&CONTROLLER, &mut launcher, &uri, &mime) {
            HandoffDisposition::DeliveredToRunning => JNI_TRUE,
            HandoffDisposition::ControllerLaunched | HandoffDisposition::Abandoned => JNI_FALSE,
        }
    })
}

/// Starts the game activity with a `VIEW` intent carrying the file, from the
/// receiver's own context.
struct ReceiverLauncher<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    receiver: &'a JObject<'local>,
    activity_class: &'a JString<'local>,
}

impl ControllerLauncher for ReceiverLauncher<'_, '_> {
    type Uri = GlobalRef;

    fn launch_with_rom(&mut self, uri: &GlobalRef, mime: &str) -> crate::Result<()> {
        let result = self.env.with_local_frame::<_, _, InternalHostError>(16, |env| {
            let package = env
                .call_method(self.receiver, "getPackageName", "()Ljava/lang/String;", &[])?
                .l()?;
            let package: String = env.get_string(&JString::from(package))?.into();
            let class: String = env.get_string(self.activity_class)?.into();

            Intent::for_action(env, Action::View)?
                .set_class_name(env, &package, &class)?
                .set_data_and_type(env, uri.as_obj(), mime)?
                .start(env, self.receiver)
        });
        result.map_err(|err| {
            let err = map_internal(self.env, err);
            HostError::LaunchFailed(err.to_string())
        })
    }
}
