//! Shared error definitions and the localized message catalog used across all
//! ely crates.

pub mod error;
pub mod i18n;

pub use {
    error::{Error, FromMessage, Result},
    i18n::{Catalog, Language, Localizer, MessageKey},
};
