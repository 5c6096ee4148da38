//! The file acquisition controller.
//!
//! [`FileHost`] owns the single in-flight "pending ROM bytes" slot and the
//! outstanding picker request tags. The engine calls the request operations
//! synchronously from its main loop; picker results arrive later on the same
//! OS event queue through [`FileHost::resolve`]. Nothing here blocks and
//! nothing here locks: the surrounding activity guarantees the calls never
//! interleave, and callers driving a host from multiple threads must
//! serialize externally.

use log::{error, info, warn};

use crate::downloads::{self, DownloadHandle, DownloadStatus};
use crate::error::Result;
use crate::platform::{DownloadBackend, PlatformServices};
use crate::reader::read_capped;
use crate::{
    EngineCallbacks, UriPermissions, ANY_MIME_TYPE, BINARY_MIME_TYPE, FILE_SIZE_LIMIT,
    ROM_SIZE_LIMIT,
};

use bitflags::bitflags;
use num_enum::TryFromPrimitive;

/// Identifies which asynchronous picker operation a result belongs to.
///
/// The discriminants double as the activity request codes passed to
/// `startActivityForResult`, so a raw code coming back from Java converts
/// straight into a `RequestKind` via `try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(i32)]
pub enum RequestKind {
    RomSelection = 0xee01,
    FileSelection = 0xee02,
    FileExport = 0xee03,
    FolderAccess = 0xee04,
}

bitflags! {
    /// In-flight markers, one per picker kind. A tag is set when the picker
    /// launches and cleared when its result (success or cancel) arrives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct Outstanding: u32 {
        const ROM_SELECTION = 1 << 0;
        const FILE_SELECTION = 1 << 1;
        const FILE_EXPORT = 1 << 2;
        const FOLDER_ACCESS = 1 << 3;
    }
}

impl RequestKind {
    fn tag(self) -> Outstanding {
        match self {
            RequestKind::RomSelection => Outstanding::ROM_SELECTION,
            RequestKind::FileSelection => Outstanding::FILE_SELECTION,
            RequestKind::FileExport => Outstanding::FILE_EXPORT,
            RequestKind::FolderAccess => Outstanding::FOLDER_ACCESS,
        }
    }
}

/// Export payload held between `request_file_export` and the destination
/// folder selection. Exactly one outstanding export at a time.
struct PendingExport {
    name: String,
    bytes: Vec<u8>,
}

/// Long-lived controller bridging the engine to the platform's pickers and
/// download manager. Generic over the OS capabilities so the protocol runs
/// unchanged on the host during tests.
pub struct FileHost<P, C>
where
    P: PlatformServices + DownloadBackend,
    C: EngineCallbacks,
{
    platform: P,
    callbacks: C,
    /// At most one ROM payload waiting to be drained; a new arrival
    /// overwrites, it does not queue.
    pending_rom: Option<Vec<u8>>,
    pending_export: Option<PendingExport>,
    outstanding: Outstanding,
}

impl<P, C> FileHost<P, C>
where
    P: PlatformServices + DownloadBackend,
    C: EngineCallbacks,
{
    pub fn new(platform: P, callbacks: C) -> Self {
        Self {
            platform,
            callbacks,
            pending_rom: None,
            pending_export: None,
            outstanding: Outstanding::empty(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Synchronous check for a ROM that arrived before the engine was ready
    /// to receive callbacks (cold-start delivery, or a second external
    /// handoff). Fires the success notification and drains the slot when a
    /// payload is waiting: calling this twice in a row yields `true` then
    /// `false` unless a new payload arrived in between.
    pub fn has_rom_already(&mut self) -> bool {
        match self.pending_rom.take() {
            Some(bytes) => {
                self.callbacks.rom_received(true, Some(bytes));
                true
            }
            None => false,
        }
    }

    /// Asks the user to pick a ROM file. When a pending payload is already
    /// waiting this never opens a picker; it drains the slot and fires the
    /// success notification immediately.
    pub fn request_rom_selection(&mut self) {
        if let Some(bytes) = self.pending_rom.take() {
            info!("ROM content already present, skipping the selection dialog");
            self.callbacks.rom_received(true, Some(bytes));
            return;
        }
        self.launch_picker(RequestKind::RomSelection, |platform, request| {
            platform.launch_document_picker(BINARY_MIME_TYPE, request)
        });
    }

    /// Asks the user to pick an arbitrary file for import.
    pub fn request_file_selection(&mut self) {
        self.launch_picker(RequestKind::FileSelection, |platform, request| {
            platform.launch_document_picker(ANY_MIME_TYPE, request)
        });
    }

    /// Asks the user for a destination folder, then writes `bytes` into a new
    /// document called `name` under it. The write happens when the folder
    /// selection resolves; the engine gets no notification either way.
    pub fn request_file_export(&mut self, name: &str, bytes: Vec<u8>) {
        if self.pending_export.is_some() {
            warn!("Replacing an export that never resolved: {name:?}");
        }
        self.pending_export = Some(PendingExport {
            name: name.to_owned(),
            bytes,
        });
        match self.platform.launch_tree_picker(
            RequestKind::FileExport,
            UriPermissions::GRANT_READ | UriPermissions::GRANT_WRITE,
        ) {
            Ok(()) => {
                self.outstanding.insert(Outstanding::FILE_EXPORT);
            }
            Err(err) => {
                // No result will ever arrive, so don't hold the payload.
                error!("Failed to launch the export destination picker: {err}");
                self.pending_export = None;
            }
        }
    }

    /// Asks the user to grant access to a folder.
    pub fn request_folder_access(&mut self) {
        self.launch_picker(RequestKind::FolderAccess, |platform, request| {
            platform.launch_tree_picker(request, UriPermissions::empty())
        });
    }

    /// Direct delivery of a ROM reference from an already-running process
    /// (the handoff receiver path). Reads the content and fires the success
    /// notification; returns `false` without any notification when the
    /// content cannot be read.
    pub fn deliver_rom(&mut self, uri: &P::Uri) -> bool {
        info!("ROM delivered by external intent");
        match self.read_uri(uri, ROM_SIZE_LIMIT) {
            Some(bytes) => {
                self.callbacks.rom_received(true, Some(bytes));
                true
            }
            None => false,
        }
    }

    /// Cold-start delivery: resolve the reference carried by the activating
    /// intent and park the bytes for the engine to poll once it is up. No
    /// notification fires. Returns whether the content could be read.
    pub fn stash_rom(&mut self, uri: &P::Uri) -> bool {
        match self.read_uri(uri, ROM_SIZE_LIMIT) {
            Some(bytes) => {
                self.pending_rom = Some(bytes);
                true
            }
            None => false,
        }
    }

    /// Single entry point for asynchronous picker results. `uri` is `None`
    /// when the user dismissed the picker. Results with no matching
    /// outstanding tag are dropped.
    pub fn resolve(&mut self, request: RequestKind, uri: Option<&P::Uri>) {
        info!(
            "Got picker result, request = {request:?}, resolved = {}",
            uri.is_some()
        );
        if !self.outstanding.contains(request.tag()) {
            warn!("Dropping {request:?} result that matches no outstanding request");
            return;
        }
        self.outstanding.remove(request.tag());

        match request {
            RequestKind::RomSelection => match uri {
                Some(uri) => {
                    let bytes = self.read_uri(uri, ROM_SIZE_LIMIT);
                    let success = bytes.is_some();
                    self.callbacks.rom_received(success, bytes);
                }
                None => self.callbacks.rom_received(false, None),
            },
            RequestKind::FileSelection => match uri {
                Some(uri) => {
                    // The path is reported even when the read fails, matching
                    // the delivery contract for partially resolved imports.
                    let path = self.platform.uri_path(uri);
                    let bytes = self.read_uri(uri, FILE_SIZE_LIMIT);
                    let success = bytes.is_some();
                    self.callbacks.file_received(success, bytes, &path);
                }
                None => self.callbacks.file_received(false, None, ""),
            },
            RequestKind::FileExport => {
                let pending = self.pending_export.take();
                match (uri, pending) {
                    (Some(tree), Some(export)) => {
                        if let Err(err) = self.write_export(tree, &export) {
                            error!("Failed to write {:?} during export: {err}", export.name);
                        }
                    }
                    (Some(_), None) => {
                        warn!("Export destination selected but no payload is pending");
                    }
                    // Cancelled exports are deliberately silent; the payload
                    // is dropped here so it cannot leak into a later export.
                    (None, _) => {}
                }
            }
            RequestKind::FolderAccess => match uri {
                Some(uri) => {
                    let path = self.platform.uri_path(uri);
                    self.callbacks.folder_access_result(true, &path);
                }
                None => self.callbacks.folder_access_result(false, ""),
            },
        }
    }

    /// Enqueues a background transfer with the platform download manager.
    /// The returned handle is owned by the engine from here on.
    pub fn start_download(&mut self, url: &str, filename: &str) -> Result<DownloadHandle> {
        info!("Starting download from {url:?} to file {filename:?}");
        self.platform.enqueue(url, filename)
    }

    /// Cancels a transfer. Returns whether the manager still knew the handle.
    pub fn cancel_download(&mut self, handle: DownloadHandle) -> bool {
        self.platform.remove(handle)
    }

    pub fn download_status(&mut self, handle: DownloadHandle) -> DownloadStatus {
        match self.platform.query(handle) {
            Some(snapshot) => DownloadStatus::from(snapshot.status),
            None => DownloadStatus::Invalid,
        }
    }

    /// `(bytes_so_far, total_bytes)`, both zero when the handle is unknown.
    pub fn download_progress(&mut self, handle: DownloadHandle) -> (i64, i64) {
        downloads::progress_of(self.platform.query(handle))
    }

    fn launch_picker(
        &mut self,
        request: RequestKind,
        launch: impl FnOnce(&mut P, RequestKind) -> Result<()>,
    ) {
        if self.outstanding.contains(request.tag()) {
            // Caller contract violation; the previous result will be dropped.
            warn!("{request:?} requested while an earlier request is still outstanding");
        }
        match launch(&mut self.platform, request) {
            Ok(()) => {
                self.outstanding.insert(request.tag());
            }
            Err(err) => error!("Failed to launch {request:?} picker: {err}"),
        }
    }

    fn read_uri(&mut self, uri: &P::Uri, limit: usize) -> Option<Vec<u8>> {
        let stream = match self.platform.open_content(uri) {
            Ok(stream) => stream,
            Err(err) => {
                error!("Failed to open content stream: {err}");
                return None;
            }
        };
        match read_capped(stream, limit) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                error!("Failed to read content: {err}");
                None
            }
        }
    }

    fn write_export(&mut self, tree: &P::Uri, export: &PendingExport) -> Result<()> {
        use std::io::Write as _;

        let mut sink = self
            .platform
            .create_document(tree, &export.name, BINARY_MIME_TYPE)?;
        sink.write_all(&export.bytes)?;
        sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloads::DownloadSnapshot;
    use crate::error::HostError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{self, Cursor, Write};
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Notification {
        Rom {
            success: bool,
            bytes: Option<Vec<u8>>,
        },
        File {
            success: bool,
            bytes: Option<Vec<u8>>,
            path: String,
        },
        Folder {
            success: bool,
            path: String,
        },
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Notification>>>);

    impl Recorder {
        fn take(&self) -> Vec<Notification> {
            self.0.borrow_mut().drain(..).collect()
        }

        fn is_empty(&self) -> bool {
            self.0.borrow().is_empty()
        }
    }

    impl EngineCallbacks for Recorder {
        fn rom_received(&mut self, success: bool, bytes: Option<Vec<u8>>) {
            self.0.borrow_mut().push(Notification::Rom { success, bytes });
        }

        fn file_received(&mut self, success: bool, bytes: Option<Vec<u8>>, path: &str) {
            self.0.borrow_mut().push(Notification::File {
                success,
                bytes,
                path: path.to_owned(),
            });
        }

        fn folder_access_result(&mut self, success: bool, path: &str) {
            self.0.borrow_mut().push(Notification::Folder {
                success,
                path: path.to_owned(),
            });
        }
    }

    #[derive(Debug, PartialEq)]
    enum Launched {
        Document { mime: String, request: RequestKind },
        Tree { request: RequestKind, grants: UriPermissions },
    }

    #[derive(Default)]
    struct FakePlatform {
        files: HashMap<String, Vec<u8>>,
        launched: Vec<Launched>,
        fail_launch: bool,
        documents: Rc<RefCell<HashMap<String, (String, Vec<u8>)>>>,
        downloads: HashMap<i64, DownloadSnapshot>,
        removed: Vec<i64>,
        next_id: i64,
    }

    /// Appends into the fake document store, keyed by `tree/name`.
    struct FakeSink {
        documents: Rc<RefCell<HashMap<String, (String, Vec<u8>)>>>,
        key: String,
    }

    impl Write for FakeSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut documents = self.documents.borrow_mut();
            let (_, bytes) = documents.get_mut(&self.key).expect("document was created");
            bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl PlatformServices for FakePlatform {
        type Uri = String;
        type Stream = Cursor<Vec<u8>>;
        type Sink = FakeSink;

        fn launch_document_picker(&mut self, mime: &str, request: RequestKind) -> Result<()> {
            if self.fail_launch {
                return Err(HostError::LaunchFailed("no picker installed".into()));
            }
            self.launched.push(Launched::Document {
                mime: mime.to_owned(),
                request,
            });
            Ok(())
        }

        fn launch_tree_picker(&mut self, request: RequestKind, grants: UriPermissions) -> Result<()> {
            if self.fail_launch {
                return Err(HostError::LaunchFailed("no picker installed".into()));
            }
            self.launched.push(Launched::Tree { request, grants });
            Ok(())
        }

        fn open_content(&mut self, uri: &String) -> Result<Cursor<Vec<u8>>> {
            match self.files.get(uri) {
                Some(bytes) => Ok(Cursor::new(bytes.clone())),
                None => Err(io::Error::from(io::ErrorKind::NotFound).into()),
            }
        }

        fn create_document(&mut self, tree: &String, name: &str, mime: &str) -> Result<FakeSink> {
            let key = format!("{tree}/{name}");
            self.documents
                .borrow_mut()
                .insert(key.clone(), (mime.to_owned(), Vec::new()));
            Ok(FakeSink {
                documents: Rc::clone(&self.documents),
                key,
            })
        }

        fn uri_path(&mut self, uri: &String) -> String {
            uri.clone()
        }
    }

    impl DownloadBackend for FakePlatform {
        fn enqueue(&mut self, _url: &str, _filename: &str) -> Result<DownloadHandle> {
            self.next_id += 1;
            Ok(DownloadHandle(self.next_id))
        }

        fn remove(&mut self, handle: DownloadHandle) -> bool {
            self.removed.push(handle.0);
            self.downloads.remove(&handle.0).is_some()
        }

        fn query(&mut self, handle: DownloadHandle) -> Option<DownloadSnapshot> {
            self.downloads.get(&handle.0).copied()
        }
    }

    fn host_with(
        files: &[(&str, Vec<u8>)],
    ) -> (FileHost<FakePlatform, Recorder>, Recorder) {
        let mut platform = FakePlatform::default();
        for (uri, bytes) in files {
            platform.files.insert((*uri).to_owned(), bytes.clone());
        }
        let recorder = Recorder::default();
        (FileHost::new(platform, recorder.clone()), recorder)
    }

    #[test]
    fn has_rom_drains_pending_payload() {
        let (mut host, recorder) = host_with(&[("rom.bin", vec![1, 2, 3])]);
        assert!(host.stash_rom(&"rom.bin".to_owned()));
        assert!(recorder.is_empty(), "stashing must not notify the engine");

        assert!(host.has_rom_already());
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: true,
                bytes: Some(vec![1, 2, 3]),
            }]
        );

        assert!(!host.has_rom_already());
        assert!(recorder.is_empty());
    }

    #[test]
    fn new_arrival_overwrites_pending_payload() {
        let (mut host, recorder) =
            host_with(&[("first.bin", vec![1]), ("second.bin", vec![2])]);
        assert!(host.stash_rom(&"first.bin".to_owned()));
        assert!(host.stash_rom(&"second.bin".to_owned()));

        assert!(host.has_rom_already());
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: true,
                bytes: Some(vec![2]),
            }]
        );
        assert!(!host.has_rom_already());
    }

    #[test]
    fn rom_selection_skips_picker_when_payload_pending() {
        let (mut host, recorder) = host_with(&[("rom.bin", vec![7; 16])]);
        host.stash_rom(&"rom.bin".to_owned());

        host.request_rom_selection();
        assert!(host.platform().launched.is_empty());
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: true,
                bytes: Some(vec![7; 16]),
            }]
        );

        // Drained: the next request goes to the picker.
        host.request_rom_selection();
        assert_eq!(
            host.platform().launched,
            vec![Launched::Document {
                mime: BINARY_MIME_TYPE.to_owned(),
                request: RequestKind::RomSelection,
            }]
        );
        assert!(recorder.is_empty());
    }

    #[test]
    fn rom_selection_resolves_to_bytes() {
        let rom = vec![0xa5u8; 2 * 1024 * 1024];
        let (mut host, recorder) = host_with(&[("picked.bin", rom.clone())]);

        host.request_rom_selection();
        host.resolve(RequestKind::RomSelection, Some(&"picked.bin".to_owned()));
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: true,
                bytes: Some(rom),
            }]
        );
    }

    #[test]
    fn oversized_rom_resolves_to_failure() {
        let rom = vec![0u8; ROM_SIZE_LIMIT + 1];
        let (mut host, recorder) = host_with(&[("huge.bin", rom)]);

        host.request_rom_selection();
        host.resolve(RequestKind::RomSelection, Some(&"huge.bin".to_owned()));
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: false,
                bytes: None,
            }]
        );
    }

    #[test]
    fn cancelled_rom_selection_reports_failure() {
        let (mut host, recorder) = host_with(&[]);
        host.request_rom_selection();
        host.resolve(RequestKind::RomSelection, None);
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: false,
                bytes: None,
            }]
        );
    }

    #[test]
    fn results_without_outstanding_request_are_dropped() {
        let (mut host, recorder) = host_with(&[("rom.bin", vec![1])]);
        host.resolve(RequestKind::RomSelection, Some(&"rom.bin".to_owned()));
        host.resolve(RequestKind::FolderAccess, None);
        assert!(recorder.is_empty());
    }

    #[test]
    fn each_resolution_consumes_its_tag() {
        let (mut host, recorder) = host_with(&[]);
        host.request_rom_selection();
        host.resolve(RequestKind::RomSelection, None);
        // Same result delivered twice; the second must be dropped.
        host.resolve(RequestKind::RomSelection, None);
        assert_eq!(recorder.take().len(), 1);
    }

    #[test]
    fn failed_picker_launch_sets_no_tag() {
        let (mut host, recorder) = host_with(&[]);
        host.platform_mut().fail_launch = true;
        host.request_rom_selection();
        host.resolve(RequestKind::RomSelection, None);
        assert!(recorder.is_empty());
    }

    #[test]
    fn file_selection_reports_bytes_and_path() {
        let (mut host, recorder) = host_with(&[("docs/save.srm", vec![9, 9, 9])]);
        host.request_file_selection();
        assert_eq!(
            host.platform().launched,
            vec![Launched::Document {
                mime: ANY_MIME_TYPE.to_owned(),
                request: RequestKind::FileSelection,
            }]
        );

        host.resolve(RequestKind::FileSelection, Some(&"docs/save.srm".to_owned()));
        assert_eq!(
            recorder.take(),
            vec![Notification::File {
                success: true,
                bytes: Some(vec![9, 9, 9]),
                path: "docs/save.srm".to_owned(),
            }]
        );
    }

    #[test]
    fn unreadable_file_still_reports_its_path() {
        let (mut host, recorder) = host_with(&[]);
        host.request_file_selection();
        host.resolve(RequestKind::FileSelection, Some(&"gone.bin".to_owned()));
        assert_eq!(
            recorder.take(),
            vec![Notification::File {
                success: false,
                bytes: None,
                path: "gone.bin".to_owned(),
            }]
        );
    }

    #[test]
    fn cancelled_file_selection_reports_empty_path() {
        let (mut host, recorder) = host_with(&[]);
        host.request_file_selection();
        host.resolve(RequestKind::FileSelection, None);
        assert_eq!(
            recorder.take(),
            vec![Notification::File {
                success: false,
                bytes: None,
                path: String::new(),
            }]
        );
    }

    #[test]
    fn export_writes_document_and_stays_silent() {
        let (mut host, recorder) = host_with(&[]);
        host.request_file_export("save.bin", vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(
            host.platform().launched,
            vec![Launched::Tree {
                request: RequestKind::FileExport,
                grants: UriPermissions::GRANT_READ | UriPermissions::GRANT_WRITE,
            }]
        );

        host.resolve(RequestKind::FileExport, Some(&"tree:Documents".to_owned()));
        let documents = host.platform().documents.borrow();
        assert_eq!(documents.len(), 1);
        let (mime, bytes) = &documents["tree:Documents/save.bin"];
        assert_eq!(mime, BINARY_MIME_TYPE);
        assert_eq!(bytes, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        drop(documents);
        assert!(recorder.is_empty(), "export must not notify the engine");
    }

    #[test]
    fn cancelled_export_is_silent_and_drops_payload() {
        let (mut host, recorder) = host_with(&[]);
        host.request_file_export("save.bin", vec![1, 2, 3]);
        host.resolve(RequestKind::FileExport, None);
        assert!(recorder.is_empty());
        assert!(host.platform().documents.borrow().is_empty());

        // The dropped payload must not resurface on a later resolution.
        host.resolve(RequestKind::FileExport, Some(&"tree:Documents".to_owned()));
        assert!(host.platform().documents.borrow().is_empty());
    }

    #[test]
    fn failed_export_launch_drops_payload() {
        let (mut host, recorder) = host_with(&[]);
        host.platform_mut().fail_launch = true;
        host.request_file_export("save.bin", vec![1, 2, 3]);

        host.platform_mut().fail_launch = false;
        host.request_folder_access();
        host.resolve(RequestKind::FolderAccess, Some(&"tree:Documents".to_owned()));
        assert!(host.platform().documents.borrow().is_empty());
        assert_eq!(
            recorder.take(),
            vec![Notification::Folder {
                success: true,
                path: "tree:Documents".to_owned(),
            }]
        );
    }

    #[test]
    fn folder_access_uses_no_grants() {
        let (mut host, _recorder) = host_with(&[]);
        host.request_folder_access();
        assert_eq!(
            host.platform().launched,
            vec![Launched::Tree {
                request: RequestKind::FolderAccess,
                grants: UriPermissions::empty(),
            }]
        );
    }

    #[test]
    fn cancelled_folder_access_reports_empty_path() {
        let (mut host, recorder) = host_with(&[]);
        host.request_folder_access();
        host.resolve(RequestKind::FolderAccess, None);
        assert_eq!(
            recorder.take(),
            vec![Notification::Folder {
                success: false,
                path: String::new(),
            }]
        );
    }

    #[test]
    fn delivered_rom_notifies_immediately() {
        let (mut host, recorder) = host_with(&[("handoff.bin", vec![5, 5])]);
        assert!(host.deliver_rom(&"handoff.bin".to_owned()));
        assert_eq!(
            recorder.take(),
            vec![Notification::Rom {
                success: true,
                bytes: Some(vec![5, 5]),
            }]
        );
    }

    #[test]
    fn undeliverable_rom_stays_silent() {
        let (mut host, recorder) = host_with(&[]);
        assert!(!host.deliver_rom(&"missing.bin".to_owned()));
        assert!(recorder.is_empty());
    }

    #[test]
    fn download_queries_pass_through() {
        let (mut host, _recorder) = host_with(&[]);
        let handle = host.start_download("https://example.com/pack", "pack.bin").unwrap();

        // Queried before the manager has any record of it.
        assert_eq!(host.download_status(handle), DownloadStatus::Invalid);
        assert_eq!(host.download_progress(handle), (0, 0));

        host.platform_mut().downloads.insert(
            handle.0,
            DownloadSnapshot {
                status: DownloadStatus::Running as i32,
                bytes_so_far: 42,
                total_bytes: 100,
            },
        );
        assert_eq!(host.download_status(handle), DownloadStatus::Running);
        assert_eq!(host.download_progress(handle), (42, 100));

        assert!(host.cancel_download(handle));
        assert!(!host.cancel_download(handle));
    }
}
