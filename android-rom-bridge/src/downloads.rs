//! Download manager pass-throughs.
//!
//! The platform download manager owns all transfer state; this crate never
//! stores more than the opaque id it hands back to the engine. Every status or
//! progress query goes straight back to the manager.

use num_enum::FromPrimitive;

/// Opaque id returned by the platform download manager when a transfer is
/// enqueued. The engine is the owner of record; pass it back in to cancel or
/// query the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DownloadHandle(pub i64);

/// Terminal and in-flight states of a transfer, using the raw values of the
/// download manager's status column (`DownloadManager.COLUMN_STATUS`).
/// Unknown ids and unrecognized codes both map to [`DownloadStatus::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(i32)]
pub enum DownloadStatus {
    #[num_enum(default)]
    Invalid = 0x00,
    Pending = 0x01,
    Running = 0x02,
    Paused = 0x04,
    Successful = 0x08,
    Failed = 0x10,
}

impl DownloadStatus {
    /// Whether the transfer is still moving (pending, running or paused).
    pub fn is_active(self) -> bool {
        matches!(
            self,
            DownloadStatus::Pending | DownloadStatus::Running | DownloadStatus::Paused
        )
    }
}

/// One row of the download manager's status query, as raw column values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadSnapshot {
    /// Raw status column value, convertible via [`DownloadStatus::from`].
    pub status: i32,
    pub bytes_so_far: i64,
    pub total_bytes: i64,
}

/// Shapes a query row into the `(bytes_so_far, total_bytes)` pair reported to
/// the engine: `(0, 0)` for unknown ids, byte counters while the transfer is
/// active, and `total == current` once it succeeded.
pub(crate) fn progress_of(snapshot: Option<DownloadSnapshot>) -> (i64, i64) {
    let Some(snapshot) = snapshot else {
        return (0, 0);
    };
    match DownloadStatus::from(snapshot.status) {
        DownloadStatus::Invalid => (0, 0),
        DownloadStatus::Successful => (snapshot.total_bytes, snapshot.total_bytes),
        DownloadStatus::Failed => (0, snapshot.total_bytes),
        _ => (snapshot.bytes_so_far, snapshot.total_bytes),
    }
}
