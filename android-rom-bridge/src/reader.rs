//! Bounded stream reader.
//!
//! Content handed over by other apps is untrusted and of unknown size, so all
//! stream reads in this crate go through [`read_capped`] which aborts once a
//! hard byte limit is exceeded instead of buffering the whole stream.

use std::io::Read;

use thiserror::Error;

/// Streams are consumed in fixed 1 KiB chunks, so at no point does
/// [`read_capped`] hold more than `limit + CHUNK_SIZE` bytes in memory.
pub(crate) const CHUNK_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("stream exceeded the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("I/O error while reading stream")]
    Io(#[from] std::io::Error),
}

/// Reads `stream` to the end and returns the accumulated bytes, or
/// [`ReadError::TooLarge`] as soon as more than `limit` bytes have arrived.
///
/// No partial buffer is ever returned; an oversize stream and an I/O fault
/// look the same to callers that only care about success.
pub fn read_capped<R: Read>(mut stream: R, limit: usize) -> Result<Vec<u8>, ReadError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(buffer),
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.len() > limit {
                    return Err(ReadError::TooLarge { limit });
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}
