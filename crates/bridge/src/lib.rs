//! Bridge to the external processing engine.
//!
//! The engine is an opaque C ABI library: `process_command` takes four
//! NUL-terminated strings and returns an engine-allocated string (or NULL),
//! which must be handed back to `free_rust_string` exactly once. Everything
//! that touches the raw pointer lives in [`abi`]; callers only ever see a
//! [`CommandResult`].

#![allow(unsafe_code)]

pub mod abi;
pub mod client;
pub mod error;
#[cfg(feature = "native-engine")]
pub mod native;
pub mod request;

pub use {
    abi::EngineAbi,
    client::{BridgeClient, CommandBridge, classify},
    error::{BridgeError, CommandResult},
    request::{CommandKind, CommandRequest},
};

#[cfg(feature = "native-engine")]
pub use native::NativeEngine;
