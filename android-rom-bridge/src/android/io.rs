//! `std::io` adapters over `java.io` streams obtained from the content
//! resolver, so the bounded reader and the export writer can stay oblivious
//! to JNI.

use std::io::{self, Read, Write};

use jni::objects::{GlobalRef, JValue};
use jni::JNIEnv;

use super::jni_utils::{map_internal, CloneJavaVM, InternalHostError};

/// Bytes are shuttled through a Java scratch array of at most this size.
const IO_CHUNK: usize = 8192;

fn attach_err(err: jni::errors::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("JVM attach failed: {err}"))
}

fn stream_err(env: &mut JNIEnv<'_>, err: InternalHostError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, map_internal(env, err).to_string())
}

fn close_quietly(vm: &CloneJavaVM, stream: &GlobalRef) {
    let Ok(mut env) = vm.attach_current_thread_permanently() else {
        return;
    };
    if env.call_method(stream.as_obj(), "close", "()V", &[]).is_err() {
        let _ = env.exception_clear();
        log::debug!("Ignoring failure to close a java stream");
    }
}

/// Readable wrapper around a `java.io.InputStream`. Closes the stream on
/// drop, best effort.
pub struct JavaInputStream {
    pub(crate) vm: CloneJavaVM,
    pub(crate) stream: GlobalRef,
}

impl Read for JavaInputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(attach_err)?;
        let wanted = buf.len().min(IO_CHUNK) as i32;
        let result = env.with_local_frame::<_, _, InternalHostError>(4, |env| {
            let chunk = env.new_byte_array(wanted)?;
            let read = env
                .call_method(self.stream.as_obj(), "read", "([B)I", &[JValue::Object(&chunk)])?
                .i()?;
            if read > 0 {
                // jbyte is i8; fill the destination buffer in place.
                let dst = unsafe {
                    std::slice::from_raw_parts_mut(buf.as_mut_ptr().cast::<i8>(), read as usize)
                };
                env.get_byte_array_region(&chunk, 0, dst)?;
            }
            Ok(read)
        });
        match result {
            // -1 is java's end-of-stream marker
            Ok(read) if read > 0 => Ok(read as usize),
            Ok(_) => Ok(0),
            Err(err) => Err(stream_err(&mut env, err)),
        }
    }
}

impl Drop for JavaInputStream {
    fn drop(&mut self) {
        close_quietly(&self.vm, &self.stream);
    }
}

/// Writable wrapper around a `java.io.OutputStream`. Closes the stream on
/// drop, best effort.
pub struct JavaOutputStream {
    pub(crate) vm: CloneJavaVM,
    pub(crate) stream: GlobalRef,
}

impl Write for JavaOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(attach_err)?;
        let len = buf.len().min(IO_CHUNK);
        let result = env.with_local_frame::<_, _, InternalHostError>(4, |env| {
            let chunk = env.new_byte_array(len as i32)?;
            let src = unsafe { std::slice::from_raw_parts(buf.as_ptr().cast::<i8>(), len) };
            env.set_byte_array_region(&chunk, 0, src)?;
            env.call_method(self.stream.as_obj(), "write", "([B)V", &[JValue::Object(&chunk)])?
                .v()?;
            Ok(())
        });
        match result {
            Ok(()) => Ok(len),
            Err(err) => Err(stream_err(&mut env, err)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(attach_err)?;
        let result = env.with_local_frame::<_, _, InternalHostError>(2, |env| {
            env.call_method(self.stream.as_obj(), "flush", "()V", &[])?.v()?;
            Ok(())
        });
        result.map_err(|err| stream_err(&mut env, err))
    }
}

impl Drop for JavaOutputStream {
    fn drop(&mut self) {
        close_quietly(&self.vm, &self.stream);
    }
}
