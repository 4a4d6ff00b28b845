//! Application-level orchestration.
//!
//! This module owns the feed lifecycle: search commits, page fetches and patch loads.
//! UI layers talk to it through `UiCommand`s and receive `FeedEvent`s back.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
