#![forbid(unsafe_code)]

//! Headless reference adapter for Bindery.
//!
//! [`HeadlessAdapter`] implements the adapter contract against simulated
//! controls. Tests and the demo drive it with
//! [`HeadlessControl::simulate_edit`] and [`HeadlessControl::simulate_click`]
//! and inspect what each control displays.

pub mod adapter;
pub mod control;
pub mod widget;

pub use adapter::{HeadlessAdapter, HeadlessWindow};
pub use control::HeadlessControl;
pub use widget::{HeadlessWidget, Row, Skipped};
