#![forbid(unsafe_code)]

//! The contract a toolkit adapter implements.
//!
//! An adapter turns a [`Bindable`] object into a widget (one control per
//! metadata record, wired with [`wire_control`](crate::wiring::wire_control)),
//! shows widgets until the surface is dismissed, and exposes the UI-thread
//! dispatcher.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::rc::Rc;

use bindery_core::error::BindError;
use bindery_core::property::Bindable;

use crate::dispatcher::{DispatchError, Task};

/// Whether a file is chosen for reading or writing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Load,
    Save,
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Save => "save",
        })
    }
}

pub trait BindingAdapter {
    /// Toolkit window handle.
    type Window;
    /// A laid-out panel of bound controls.
    type Widget;

    fn main_window(&self) -> Option<&Self::Window>;

    /// Build a panel with one control per metadata record of `object`.
    ///
    /// A record that fails to bind is skipped and logged; the rest of the
    /// panel still binds.
    ///
    /// # Errors
    ///
    /// Adapter-level failures only.
    fn obj_widget<B: Bindable>(&mut self, object: &Rc<B>) -> Result<Self::Widget, BindError>;

    /// Show `widgets` and block until the surface is dismissed.
    ///
    /// # Errors
    ///
    /// Adapter-level failures only.
    fn display_widgets(&mut self, widgets: Vec<Self::Widget>) -> Result<(), BindError>;

    /// Schedule `task` on the UI thread.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Closed`] once the adapter is closing.
    fn run_on_ui_thread(&self, task: Task) -> Result<(), DispatchError>;

    /// Dismiss the surface.
    fn close(&self);

    /// Show a single object.
    ///
    /// # Errors
    ///
    /// See [`obj_widget`](Self::obj_widget) and
    /// [`display_widgets`](Self::display_widgets).
    fn display<B: Bindable>(&mut self, object: &Rc<B>) -> Result<(), BindError> {
        let widget = self.obj_widget(object)?;
        self.display_widgets(vec![widget])
    }

    /// Ask the user for a file to load or save.
    ///
    /// `Ok(None)` means the user cancelled.
    ///
    /// # Errors
    ///
    /// [`BindError::Unsupported`] unless the adapter provides a file chooser.
    fn file_name(&mut self, mode: FileMode) -> Result<Option<PathBuf>, BindError> {
        let _ = mode;
        Err(BindError::Unsupported("file chooser"))
    }
}

/// Closes the wrapped adapter when dropped.
#[must_use = "dropping the guard closes the adapter"]
pub struct Closing<A: BindingAdapter> {
    adapter: A,
}

impl<A: BindingAdapter> Closing<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }
}

impl<A: BindingAdapter> Deref for Closing<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.adapter
    }
}

impl<A: BindingAdapter> DerefMut for Closing<A> {
    fn deref_mut(&mut self) -> &mut A {
        &mut self.adapter
    }
}

impl<A: BindingAdapter> Drop for Closing<A> {
    fn drop(&mut self) {
        self.adapter.close();
    }
}
