//! Raw engine boundary and the guard that owns its replies.

use std::{
    borrow::Cow,
    ffi::{CStr, c_char},
    ptr::NonNull,
};

/// The engine's C entry points.
///
/// # Safety
///
/// `process` must return either null or a pointer to a NUL-terminated string
/// that stays valid until it is passed to `release`. `release` must accept
/// every non-null pointer returned by `process` of the same engine. Both
/// methods may be called concurrently from several threads.
pub unsafe trait EngineAbi: Send + Sync {
    fn process(
        &self,
        kind: &CStr,
        prompt: &CStr,
        subject_id: &CStr,
        api_key: &CStr,
    ) -> *mut c_char;

    /// # Safety
    ///
    /// `reply` must be a non-null pointer returned by [`EngineAbi::process`]
    /// on this engine that has not been released yet.
    unsafe fn release(&self, reply: *mut c_char);
}

/// An engine-allocated reply, released exactly once when dropped.
///
/// This is the only place the raw reply pointer is held, so every exit path
/// (including unwinding) goes through `Drop`.
pub(crate) struct OwnedReply<'a, E: EngineAbi + ?Sized> {
    engine: &'a E,
    ptr: NonNull<c_char>,
}

impl<'a, E: EngineAbi + ?Sized> OwnedReply<'a, E> {
    /// Takes ownership of a `process` return value. Null yields `None` and
    /// nothing is ever released for it.
    pub(crate) fn take(engine: &'a E, raw: *mut c_char) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self { engine, ptr })
    }

    /// Reply text, decoded lossily when the engine emits invalid UTF-8.
    pub(crate) fn text(&self) -> Cow<'_, str> {
        // SAFETY: `ptr` is non-null and, per the `EngineAbi` contract, points
        // to a NUL-terminated string that stays valid until `release`.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_string_lossy()
    }
}

impl<E: EngineAbi + ?Sized> Drop for OwnedReply<'_, E> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `process` on `engine`, and `OwnedReply` is
        // neither `Clone` nor `Copy`, so this is the single release.
        unsafe { self.engine.release(self.ptr.as_ptr()) }
    }
}
