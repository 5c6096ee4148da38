//! JNI-backed implementations of the platform traits, plus the process-wide
//! controller registry and the attach/detach entry points the engine calls
//! from `android_main`.
//!
//! The Java side is expected to look like this:
//!
//! - A `GameActivity` subclass that overrides `onActivityResult` and forwards
//!   every result whose request code is one of the [`RequestKind`]
//!   discriminants to `nativePickerResult(requestCode, data.getData())`, and
//!   calls `nativeDetachController` from `onDestroy`.
//! - A small, manifest-exported `IntentReceiverActivity` registered for
//!   `ACTION_VIEW` on `application/octet-stream` that calls
//!   `nativeRouteIntent(uri, mime, gameActivityClassName)` from `onCreate`
//!   and then finishes itself.
//!
//! Both native methods live in [`exports`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::JNIEnv;
use log::{error, info, warn};

use crate::downloads::{DownloadHandle, DownloadSnapshot};
use crate::error::{HostError, Result};
use crate::handoff::ControllerSlot;
use crate::host::{FileHost, RequestKind};
use crate::platform::{DownloadBackend, PlatformServices};
use crate::{EngineCallbacks, UriPermissions, BINARY_MIME_TYPE, MODS_DIR_NAME};

mod intent;
mod io;
mod jni_utils;

pub mod exports;

use intent::{Action, Category, Intent};
use io::{JavaInputStream, JavaOutputStream};
use jni_utils::{map_internal, non_null, CloneJavaVM, InternalHostError, InternalResult};

/// The controller as instantiated on device.
pub type AndroidFileHost = FileHost<AndroidPlatform, Box<dyn EngineCallbacks + Send>>;

/// Back-reference used by the intent receiver; filled by [`attach`], emptied
/// by [`detach`].
pub(crate) static CONTROLLER: ControllerSlot<Mutex<AndroidFileHost>> = ControllerSlot::new();

/// SDK level of the device we are running on, `0` when the system property
/// cannot be read.
pub fn sdk_version() -> i32 {
    let property = android_properties::getprop("ro.build.version.sdk");
    match property.value().map(|value| value.parse::<i32>()) {
        Some(Ok(version)) => version,
        _ => {
            warn!("Failed to read ro.build.version.sdk");
            0
        }
    }
}

/// Platform services implemented over JNI against the activity published in
/// [`ndk_context`].
pub struct AndroidPlatform {
    vm: CloneJavaVM,
    activity: GlobalRef,
}

impl AndroidPlatform {
    /// Binds to the activity the `android-activity` glue registered for this
    /// process.
    pub fn from_current_context() -> Result<Self> {
        let ctx = ndk_context::android_context();
        let vm = unsafe { CloneJavaVM::from_raw(ctx.vm().cast()) }
            .map_err(HostError::from)?;
        let env = vm
            .attach_current_thread_permanently()
            .map_err(InternalHostError::from)
            .map_err(HostError::from)?;
        let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
        let activity = env
            .new_global_ref(activity)
            .map_err(InternalHostError::from)
            .map_err(HostError::from)?;
        Ok(Self { vm, activity })
    }

    /// Runs `f` on the attached thread inside a fresh local frame, folding
    /// any pending Java exception into the returned error.
    fn with_env<R>(
        &self,
        f: impl for<'l> FnOnce(&mut JNIEnv<'l>, &JObject<'static>) -> InternalResult<R>,
    ) -> Result<R> {
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(InternalHostError::from)
            .map_err(HostError::from)?;
        let result =
            env.with_local_frame::<_, _, InternalHostError>(32, |env| f(env, self.activity.as_obj()));
        result.map_err(|err| HostError::from(map_internal(&mut env, err)))
    }

    /// Creates `<external files dir>/mods` and asks the media scanner to
    /// index it so the folder shows up when the device is browsed over USB.
    pub fn ensure_mods_dir(&self) -> Result<()> {
        let base = self.with_env(|env, activity| {
            let dir = env
                .call_method(
                    activity,
                    "getExternalFilesDir",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&JObject::null())],
                )?
                .l()?;
            let dir = non_null(dir, "external files dir")?;
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
                .l()?;
            let path: String = env.get_string(&JString::from(path))?.into();
            Ok(path)
        })?;

        let mods_dir = PathBuf::from(base).join(MODS_DIR_NAME);
        std::fs::create_dir_all(&mods_dir)?;

        let mods_dir = mods_dir.to_string_lossy().into_owned();
        self.with_env(|env, activity| {
            let path = env.new_string(&mods_dir)?;
            let paths = env.new_object_array(1, "java/lang/String", &path)?;
            env.call_static_method(
                "android/media/MediaScannerConnection",
                "scanFile",
                "(Landroid/content/Context;[Ljava/lang/String;[Ljava/lang/String;\
                 Landroid/media/MediaScannerConnection$OnScanCompletedListener;)V",
                &[
                    JValue::Object(activity),
                    JValue::Object(&paths),
                    JValue::Object(&JObject::null()),
                    JValue::Object(&JObject::null()),
                ],
            )?
            .v()?;
            Ok(())
        })
    }

    /// ROM reference carried by the intent this activity was started with,
    /// present only when an external handoff launched us.
    pub fn activating_rom_uri(&self) -> Option<GlobalRef> {
        let result = self.with_env(|env, activity| {
            let intent = env
                .call_method(activity, "getIntent", "()Landroid/content/Intent;", &[])?
                .l()?;
            if intent.is_null() {
                return Ok(None);
            }
            let mime = env
                .call_method(&intent, "getType", "()Ljava/lang/String;", &[])?
                .l()?;
            if mime.is_null() {
                return Ok(None);
            }
            let mime: String = env.get_string(&JString::from(mime))?.into();
            if mime != BINARY_MIME_TYPE {
                return Ok(None);
            }
            let data = env
                .call_method(&intent, "getData", "()Landroid/net/Uri;", &[])?
                .l()?;
            if data.is_null() {
                return Ok(None);
            }
            Ok(Some(env.new_global_ref(data)?))
        });
        match result {
            Ok(uri) => uri,
            Err(err) => {
                error!("Failed to inspect the activating intent: {err}");
                None
            }
        }
    }

    fn download_manager<'l>(
        env: &mut JNIEnv<'l>,
        activity: &JObject<'_>,
    ) -> InternalResult<JObject<'l>> {
        let name = env.new_string("download")?;
        let manager = env
            .call_method(
                activity,
                "getSystemService",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&name)],
            )?
            .l()?;
        non_null(manager, "download manager service")
    }
}

/// Intent launches surface as `LaunchFailed` so the host can tell "never
/// started" apart from later JNI trouble.
fn as_launch_failure(err: HostError) -> HostError {
    match err {
        HostError::JavaError(message) => HostError::LaunchFailed(message),
        other => other,
    }
}

impl PlatformServices for AndroidPlatform {
    type Uri = GlobalRef;
    type Stream = JavaInputStream;
    type Sink = JavaOutputStream;

    fn launch_document_picker(&mut self, mime: &str, request: RequestKind) -> Result<()> {
        self.with_env(|env, activity| {
            Intent::for_action(env, Action::OpenDocument)?
                .add_category(env, Category::Openable)?
                .with_type(env, mime)?
                .start_for_result(env, activity, request as i32)
        })
        .map_err(as_launch_failure)
    }

    fn launch_tree_picker(&mut self, request: RequestKind, grants: UriPermissions) -> Result<()> {
        self.with_env(|env, activity| {
            let mut intent = Intent::for_action(env, Action::OpenDocumentTree)?;
            if !grants.is_empty() {
                intent = intent.add_flags(env, grants)?;
            }
            intent.start_for_result(env, activity, request as i32)
        })
        .map_err(as_launch_failure)
    }

    fn open_content(&mut self, uri: &GlobalRef) -> Result<JavaInputStream> {
        let vm = self.vm.clone();
        self.with_env(move |env, activity| {
            let resolver = env
                .call_method(
                    activity,
                    "getContentResolver",
                    "()Landroid/content/ContentResolver;",
                    &[],
                )?
                .l()?;
            let stream = env
                .call_method(
                    &resolver,
                    "openInputStream",
                    "(Landroid/net/Uri;)Ljava/io/InputStream;",
                    &[JValue::Object(uri.as_obj())],
                )?
                .l()?;
            let stream = non_null(stream, "content input stream")?;
            let stream = env.new_global_ref(stream)?;
            Ok(JavaInputStream { vm, stream })
        })
    }

    fn create_document(
        &mut self,
        tree: &GlobalRef,
        name: &str,
        mime: &str,
    ) -> Result<JavaOutputStream> {
        let vm = self.vm.clone();
        self.with_env(move |env, activity| {
            let resolver = env
                .call_method(
                    activity,
                    "getContentResolver",
                    "()Landroid/content/ContentResolver;",
                    &[],
                )?
                .l()?;

            // A tree uri cannot be written directly; derive the uri of the
            // folder document it denotes, then create the new file under it.
            let tree_doc_id = env
                .call_static_method(
                    "android/provider/DocumentsContract",
                    "getTreeDocumentId",
                    "(Landroid/net/Uri;)Ljava/lang/String;",
                    &[JValue::Object(tree.as_obj())],
                )?
                .l()?;
            let folder = env
                .call_static_method(
                    "android/provider/DocumentsContract",
                    "buildDocumentUriUsingTree",
                    "(Landroid/net/Uri;Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(tree.as_obj()), JValue::Object(&tree_doc_id)],
                )?
                .l()?;

            let mime = env.new_string(mime)?;
            let name = env.new_string(name)?;
            let document = env
                .call_static_method(
                    "android/provider/DocumentsContract",
                    "createDocument",
                    "(Landroid/content/ContentResolver;Landroid/net/Uri;\
                     Ljava/lang/String;Ljava/lang/String;)Landroid/net/Uri;",
                    &[
                        JValue::Object(&resolver),
                        JValue::Object(&folder),
                        JValue::Object(&mime),
                        JValue::Object(&name),
                    ],
                )?
                .l()?;
            let document = non_null(document, "created document uri")?;

            let stream = env
                .call_method(
                    &resolver,
                    "openOutputStream",
                    "(Landroid/net/Uri;)Ljava/io/OutputStream;",
                    &[JValue::Object(&document)],
                )?
                .l()?;
            let stream = non_null(stream, "document output stream")?;
            let stream = env.new_global_ref(stream)?;
            Ok(JavaOutputStream { vm, stream })
        })
    }

    fn uri_path(&mut self, uri: &GlobalRef) -> String {
        let result = self.with_env(|env, _activity| {
            let path = env
                .call_method(uri.as_obj(), "getPath", "()Ljava/lang/String;", &[])?
                .l()?;
            if path.is_null() {
                return Ok(String::new());
            }
            let path: String = env.get_string(&JString::from(path))?.into();
            Ok(path)
        });
        match result {
            Ok(path) => path,
            Err(err) => {
                error!("Failed to resolve a display path: {err}");
                String::new()
            }
        }
    }
}

impl DownloadBackend for AndroidPlatform {
    fn enqueue(&mut self, url: &str, filename: &str) -> Result<DownloadHandle> {
        let visible_in_downloads_ui = sdk_version() < 29;
        self.with_env(move |env, activity| {
            let url = env.new_string(url)?;
            let source = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&url)],
                )?
                .l()?;
            let request = env.new_object(
                "android/app/DownloadManager$Request",
                "(Landroid/net/Uri;)V",
                &[JValue::Object(&source)],
            )?;

            // VISIBILITY_VISIBLE, i.e. a notification while running only.
            env.call_method(
                &request,
                "setNotificationVisibility",
                "(I)Landroid/app/DownloadManager$Request;",
                &[0i32.into()],
            )?;
            env.call_method(
                &request,
                "setAllowedOverMetered",
                "(Z)Landroid/app/DownloadManager$Request;",
                &[true.into()],
            )?;
            if visible_in_downloads_ui {
                // Removed in API 29; a no-op there but still required below.
                env.call_method(
                    &request,
                    "setVisibleInDownloadsUi",
                    "(Z)Landroid/app/DownloadManager$Request;",
                    &[false.into()],
                )?;
            }

            let dir = env
                .call_method(
                    activity,
                    "getExternalFilesDir",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&JObject::null())],
                )?
                .l()?;
            let dir = non_null(dir, "external files dir")?;
            let filename = env.new_string(filename)?;
            let target = env.new_object(
                "java/io/File",
                "(Ljava/io/File;Ljava/lang/String;)V",
                &[JValue::Object(&dir), JValue::Object(&filename)],
            )?;
            let destination = env
                .call_static_method(
                    "android/net/Uri",
                    "fromFile",
                    "(Ljava/io/File;)Landroid/net/Uri;",
                    &[JValue::Object(&target)],
                )?
                .l()?;
            env.call_method(
                &request,
                "setDestinationUri",
                "(Landroid/net/Uri;)Landroid/app/DownloadManager$Request;",
                &[JValue::Object(&destination)],
            )?;

            let manager = Self::download_manager(env, activity)?;
            let id = env
                .call_method(
                    &manager,
                    "enqueue",
                    "(Landroid/app/DownloadManager$Request;)J",
                    &[JValue::Object(&request)],
                )?
                .j()?;
            Ok(DownloadHandle(id))
        })
    }

    fn remove(&mut self, handle: DownloadHandle) -> bool {
        let result = self.with_env(|env, activity| {
            let manager = Self::download_manager(env, activity)?;
            let ids = env.new_long_array(1)?;
            env.set_long_array_region(&ids, 0, &[handle.0])?;
            let removed = env
                .call_method(&manager, "remove", "([J)I", &[JValue::Object(&ids)])?
                .i()?;
            Ok(removed > 0)
        });
        match result {
            Ok(removed) => removed,
            Err(err) => {
                error!("Failed to remove download {}: {err}", handle.0);
                false
            }
        }
    }

    fn query(&mut self, handle: DownloadHandle) -> Option<DownloadSnapshot> {
        let result = self.with_env(|env, activity| {
            let manager = Self::download_manager(env, activity)?;
            let query = env.new_object("android/app/DownloadManager$Query", "()V", &[])?;
            let ids = env.new_long_array(1)?;
            env.set_long_array_region(&ids, 0, &[handle.0])?;
            env.call_method(
                &query,
                "setFilterById",
                "([J)Landroid/app/DownloadManager$Query;",
                &[JValue::Object(&ids)],
            )?;

            let cursor = env
                .call_method(
                    &manager,
                    "query",
                    "(Landroid/app/DownloadManager$Query;)Landroid/database/Cursor;",
                    &[JValue::Object(&query)],
                )?
                .l()?;
            if cursor.is_null() {
                return Ok(None);
            }
            if !env.call_method(&cursor, "moveToFirst", "()Z", &[])?.z()? {
                env.call_method(&cursor, "close", "()V", &[])?.v()?;
                return Ok(None);
            }

            let mut int_column = |env: &mut JNIEnv<'_>, name: &str| -> InternalResult<i32> {
                let name = env.new_string(name)?;
                let index = env
                    .call_method(
                        &cursor,
                        "getColumnIndex",
                        "(Ljava/lang/String;)I",
                        &[JValue::Object(&name)],
                    )?
                    .i()?;
                Ok(index)
            };
            let status_index = int_column(env, "status")?;
            let bytes_index = int_column(env, "bytes_so_far")?;
            let total_index = int_column(env, "total_size")?;

            let status = env
                .call_method(&cursor, "getInt", "(I)I", &[status_index.into()])?
                .i()?;
            let bytes_so_far = env
                .call_method(&cursor, "getLong", "(I)J", &[bytes_index.into()])?
                .j()?;
            let total_bytes = env
                .call_method(&cursor, "getLong", "(I)J", &[total_index.into()])?
                .j()?;
            env.call_method(&cursor, "close", "()V", &[])?.v()?;

            Ok(Some(DownloadSnapshot {
                status,
                bytes_so_far,
                total_bytes,
            }))
        });
        match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!("Failed to query download {}: {err}", handle.0);
                None
            }
        }
    }
}

/// Builds the controller against the current activity, registers it for the
/// intent receiver and returns it to the engine. Call once from
/// `android_main` after logging is up.
///
/// Poll [`FileHost::has_rom_already`] on the returned host once the engine
/// can accept a ROM; a file delivered by the intent that launched this
/// process is stashed here and drained by that poll.
pub fn attach(callbacks: Box<dyn EngineCallbacks + Send>) -> Result<Arc<Mutex<AndroidFileHost>>> {
    let platform = AndroidPlatform::from_current_context()?;

    if let Err(err) = platform.ensure_mods_dir() {
        // Not fatal; only folder visibility over USB suffers.
        warn!("Failed to prepare the mods directory: {err}");
    }
    let activating_uri = platform.activating_rom_uri();

    let mut host = FileHost::new(platform, callbacks);
    if let Some(uri) = activating_uri {
        info!("Launched with a ROM attached to the activating intent");
        if !host.stash_rom(&uri) {
            warn!("Could not read the ROM attached to the activating intent");
        }
    }

    let host = Arc::new(Mutex::new(host));
    CONTROLLER.register(&host);
    Ok(host)
}

/// Unregisters the controller; external handoffs fall back to launching a
/// fresh activity afterwards. Call when the activity is being destroyed.
pub fn detach() {
    CONTROLLER.clear();
}
