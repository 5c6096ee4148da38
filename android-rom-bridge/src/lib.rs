//! Glue for acquiring game data files on Android.
//!
//! Native game engines frequently need a ROM image (or other user-provided
//! file bytes) that the application cannot ship. This crate owns the
//! acquisition protocol around that: prompting the user through the system
//! document picker, consuming files delivered by an external "open with"
//! intent (whether the main activity is running yet or not), exporting
//! engine-produced files to a user-picked folder, and driving background
//! transfers through the platform download manager.
//!
//! The protocol core ([`FileHost`], [`route_external_file`]) is generic over
//! the OS capability traits in [`platform`], so it builds and tests on any
//! host. The [`android`] module supplies the JNI-backed implementations plus
//! the `Java_*` springboards the Java activities call into.
//!
//! The engine side of the seam is the [`EngineCallbacks`] trait: implement it,
//! hand it to `android::attach` from `android_main`, and poll
//! [`FileHost::has_rom_already`] once during startup to pick up a ROM that
//! arrived before the engine could receive callbacks.

use bitflags::bitflags;

mod error;
pub use error::{HostError, Result};

pub mod reader;
pub use reader::{read_capped, ReadError};

mod downloads;
pub use downloads::{DownloadHandle, DownloadSnapshot, DownloadStatus};

mod platform;
pub use platform::{DownloadBackend, PlatformServices};

mod host;
pub use host::{FileHost, RequestKind};

mod handoff;
pub use handoff::{
    route_external_file, ControllerLauncher, ControllerSlot, HandoffDisposition, RomIntake,
};

#[cfg(target_os = "android")]
mod util;

#[cfg(target_os = "android")]
pub mod android;

/// Media type used both for ROM picker filtering and for documents created
/// during export.
pub const BINARY_MIME_TYPE: &str = "application/octet-stream";

/// Media type for the generic file picker.
pub const ANY_MIME_TYPE: &str = "*/*";

/// ROM images larger than this are rejected during acquisition.
pub const ROM_SIZE_LIMIT: usize = 0x40_0000; // 4 MiB

/// Cap for generic file imports.
pub const FILE_SIZE_LIMIT: usize = 0x4000_0000; // 1 GiB

/// Subdirectory of the app's external files dir created at first run and
/// media-scanned so file managers on a PC can see it.
pub const MODS_DIR_NAME: &str = "mods";

bitflags! {
    /// Uri permission grants attached to a folder picker intent
    /// (`Intent.FLAG_GRANT_*_URI_PERMISSION`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UriPermissions: i32 {
        const GRANT_READ = 0x0000_0001;
        const GRANT_WRITE = 0x0000_0002;
    }
}

/// Notifications the engine receives from the host. All fire-and-forget; no
/// return value is consumed.
///
/// Delivery happens on the thread the triggering call arrived on (the
/// activity's main thread for picker results), so implementations should do
/// no more than queue the payload for the engine's own loop.
pub trait EngineCallbacks {
    /// Result of ROM acquisition. `success` is false and `bytes` absent when
    /// the user cancelled, the content could not be read, or it exceeded
    /// [`ROM_SIZE_LIMIT`].
    fn rom_received(&mut self, success: bool, bytes: Option<Vec<u8>>);

    /// Result of a generic file import. `path` is a best-effort display path,
    /// empty when the picker was cancelled.
    fn file_received(&mut self, success: bool, bytes: Option<Vec<u8>>, path: &str);

    /// Result of a folder access request; `path` is empty on denial.
    fn folder_access_result(&mut self, success: bool, path: &str);
}

impl<C: EngineCallbacks + ?Sized> EngineCallbacks for Box<C> {
    fn rom_received(&mut self, success: bool, bytes: Option<Vec<u8>>) {
        (**self).rom_received(success, bytes);
    }

    fn file_received(&mut self, success: bool, bytes: Option<Vec<u8>>, path: &str) {
        (**self).file_received(success, bytes, path);
    }

    fn folder_access_result(&mut self, success: bool, path: &str) {
        (**self).folder_access_result(success, path);
    }
}

#[test]
fn callbacks_are_object_safe() {
    fn takes_dyn(_: &mut dyn EngineCallbacks) {}
    struct Noop;
    impl EngineCallbacks for Noop {
        fn rom_received(&mut self, _: bool, _: Option<Vec<u8>>) {}
        fn file_received(&mut self, _: bool, _: Option<Vec<u8>>, _: &str) {}
        fn folder_access_result(&mut self, _: bool, _: &str) {}
    }
    takes_dyn(&mut Noop);
}
