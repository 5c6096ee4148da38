//! OS-facing capability traits.
//!
//! The acquisition state machine in [`crate::host`] never talks to the
//! operating system directly; everything it needs from the platform is behind
//! these two traits so the protocol can be driven on any OS (and under test
//! with in-memory fakes). The android backend provides the real
//! implementations over JNI.

use std::io::{Read, Write};

use crate::downloads::{DownloadHandle, DownloadSnapshot};
use crate::error::Result;
use crate::host::RequestKind;
use crate::UriPermissions;

/// Document pickers and content streams.
///
/// Launch operations return as soon as the picker is on screen; the result
/// arrives later through [`crate::host::FileHost::resolve`] carrying the
/// [`RequestKind`] passed here.
pub trait PlatformServices {
    /// Opaque reference to externally owned content (a `content://` Uri on
    /// Android, a path in tests).
    type Uri;
    /// Readable byte stream for a [`Self::Uri`].
    type Stream: Read;
    /// Writable stream for a document created under a picked folder.
    type Sink: Write;

    /// Shows the system document picker filtered to `mime`.
    fn launch_document_picker(&mut self, mime: &str, request: RequestKind) -> Result<()>;

    /// Shows the system folder picker, granting `grants` on the picked tree.
    fn launch_tree_picker(&mut self, request: RequestKind, grants: UriPermissions) -> Result<()>;

    /// Opens `uri` for reading.
    fn open_content(&mut self, uri: &Self::Uri) -> Result<Self::Stream>;

    /// Creates a new document called `name` with type `mime` under the picked
    /// folder `tree` and opens it for writing.
    fn create_document(&mut self, tree: &Self::Uri, name: &str, mime: &str) -> Result<Self::Sink>;

    /// Best-effort display path for `uri`; empty when none can be resolved.
    fn uri_path(&mut self, uri: &Self::Uri) -> String;
}

/// Thin front over the platform download manager. Stateless by design: every
/// call re-queries the manager by id.
pub trait DownloadBackend {
    /// Starts a background transfer of `url` into the app's external storage
    /// area under `filename`.
    fn enqueue(&mut self, url: &str, filename: &str) -> Result<DownloadHandle>;

    /// Cancels a transfer and removes its partial file. Returns whether the
    /// manager still knew the id.
    fn remove(&mut self, handle: DownloadHandle) -> bool;

    /// Current status row for `handle`, or `None` when the manager has no
    /// record of it.
    fn query(&mut self, handle: DownloadHandle) -> Option<DownloadSnapshot>;
}
