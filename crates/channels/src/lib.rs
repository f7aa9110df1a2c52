//! Platform-neutral command pipeline.
//!
//! A chat adapter converts its gateway events into [`MessageEvent`] /
//! [`InteractionEvent`], implements [`ChannelOutbound`] and
//! [`InteractionOutbound`], and hands both to a [`Dispatcher`]. Everything in
//! between (normalization, the engine call, truncation, the deferred
//! interaction protocol) lives here.

pub mod deferred;
pub mod delivery;
pub mod direct;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod normalize;
pub mod outbound;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod testing;

pub use {
    deferred::{DeferredReport, Stage},
    delivery::{DeliveryPlan, DeliveryStep, log_delivery_failure},
    direct::DirectReport,
    dispatch::{Dispatcher, Disposition},
    error::{Error, Result},
    event::{AckState, CommandOption, InteractionEvent, MessageEvent},
    normalize::{Normalized, Normalizer, Rejection},
    outbound::{ChannelOutbound, InteractionOutbound},
};
