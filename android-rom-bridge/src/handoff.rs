//! Routing for files delivered by an external "open with" intent.
//!
//! The receiver activity that the OS spins up for such an intent is stateless
//! glue: it checks whether the long-lived controller is registered in the
//! process-wide [`ControllerSlot`] and either hands the file reference
//! straight over, or issues a fresh controller launch carrying it. The
//! controller's own cold-start path then picks the reference up.

use std::sync::{Arc, Mutex, Weak};

use log::{error, info};

use crate::error::Result;
use crate::host::FileHost;
use crate::platform::{DownloadBackend, PlatformServices};
use crate::EngineCallbacks;

/// Process-wide registry holding a weak reference to the single live
/// controller instance, or nothing. Registered on controller start, cleared
/// on teardown; a back-reference, never an owner: the controller's lifetime
/// stays governed by the OS activity lifecycle.
pub struct ControllerSlot<T> {
    inner: std::sync::RwLock<Weak<T>>,
}

impl<T> ControllerSlot<T> {
    pub const fn new() -> Self {
        Self {
            inner: std::sync::RwLock::new(Weak::new()),
        }
    }

    pub fn register(&self, controller: &Arc<T>) {
        *self.inner.write().unwrap() = Arc::downgrade(controller);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap() = Weak::new();
    }

    /// Upgrades to the live controller, or `None` when none is registered or
    /// the registered one has already been torn down.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.read().unwrap().upgrade()
    }
}

impl<T> Default for ControllerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Direct-delivery capability of a registered controller, as seen from the
/// receiver. Takes `&self` because slot holders share the instance.
pub trait RomIntake {
    type Uri;

    /// Hands a freshly delivered ROM reference to the controller. Returns
    /// whether the content could be read and the engine was notified.
    fn deliver_rom(&self, uri: &Self::Uri) -> bool;
}

impl<P, C> RomIntake for Mutex<FileHost<P, C>>
where
    P: PlatformServices + DownloadBackend,
    C: EngineCallbacks,
{
    type Uri = P::Uri;

    fn deliver_rom(&self, uri: &P::Uri) -> bool {
        self.lock().unwrap().deliver_rom(uri)
    }
}

/// Launches a fresh controller activity carrying a file reference, used when
/// no controller is registered yet.
pub trait ControllerLauncher {
    type Uri;

    fn launch_with_rom(&mut self, uri: &Self::Uri, mime: &str) -> Result<()>;
}

/// What became of an externally delivered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffDisposition {
    /// A live controller took the reference; the receiver should offer the
    /// user a switch back to it and then terminate.
    DeliveredToRunning,
    /// No controller was alive; a launch request carrying the reference went
    /// out and the receiver should terminate immediately.
    ControllerLaunched,
    /// The launch failed (packaging or configuration error). Logged only;
    /// the receiver terminates without further action.
    Abandoned,
}

/// Decides launch-vs-deliver for a file reference arriving from outside.
pub fn route_external_file<T, L>(
    slot: &ControllerSlot<T>,
    launcher: &mut L,
    uri: &T::Uri,
    mime: &str,
) -> HandoffDisposition
where
    T: RomIntake,
    L: ControllerLauncher<Uri = T::Uri>,
{
    if let Some(controller) = slot.get() {
        info!("Handing external file straight to the running controller");
        controller.deliver_rom(uri);
        HandoffDisposition::DeliveredToRunning
    } else {
        info!("No controller running, launching one for the external file");
        match launcher.launch_with_rom(uri, mime) {
            Ok(()) => HandoffDisposition::ControllerLaunched,
            Err(err) => {
                error!("Giving up on external file, controller launch failed: {err}");
                HandoffDisposition::Abandoned
            }
        }
    }
}
