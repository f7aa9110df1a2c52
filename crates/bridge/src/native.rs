//! Link-time binding to the engine library (`libely_rust`).

use std::ffi::{CStr, c_char};

use crate::abi::EngineAbi;

#[link(name = "ely_rust")]
unsafe extern "C" {
    fn process_command(
        command_type: *const c_char,
        prompt: *const c_char,
        id: *const c_char,
        api_key: *const c_char,
    ) -> *mut c_char;

    fn free_rust_string(s: *mut c_char);
}

/// The engine linked into this binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

// SAFETY: the engine library documents that `process_command` returns null or
// a heap string owned by the caller until `free_rust_string`, and that both
// functions are thread-safe.
unsafe impl EngineAbi for NativeEngine {
    fn process(
        &self,
        kind: &CStr,
        prompt: &CStr,
        subject_id: &CStr,
        api_key: &CStr,
    ) -> *mut c_char {
        // SAFETY: all four arguments are valid NUL-terminated strings that
        // outlive the call; the engine does not retain them.
        unsafe {
            process_command(
                kind.as_ptr(),
                prompt.as_ptr(),
                subject_id.as_ptr(),
                api_key.as_ptr(),
            )
        }
    }

    unsafe fn release(&self, reply: *mut c_char) {
        // SAFETY: caller guarantees `reply` came from `process_command` and
        // has not been released.
        unsafe { free_rust_string(reply) }
    }
}
