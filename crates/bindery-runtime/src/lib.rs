#![forbid(unsafe_code)]

//! Runtime half of Bindery.
//!
//! - [`guard`]: the Changing-Set that breaks control/model feedback loops
//! - [`wiring`]: connects a [`ControlBinding`](bindery_core::ControlBinding)
//!   to a native control
//! - [`dispatcher`]: FIFO queue that lets any thread run work on the UI thread
//! - [`adapter`]: the [`BindingAdapter`] trait toolkits implement
//! - [`config`] and [`logging`]: `bindery.toml` and subscriber setup

pub mod adapter;
pub mod config;
pub mod dispatcher;
pub mod guard;
pub mod logging;
pub mod wiring;

pub use adapter::{BindingAdapter, Closing, FileMode};
pub use config::{BinderyConfig, ConfigError, DispatchConfig, LogConfig, SurfaceConfig};
pub use dispatcher::{DispatchError, DispatchHandle, DispatchState, Dispatcher, Task};
pub use guard::{ChangingSet, ControlId, EditGuard};
pub use wiring::{ControlSurface, WiredControl, wire_control};
