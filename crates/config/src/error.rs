pub use ely_common::{Error, Result};

ely_common::impl_context!();
