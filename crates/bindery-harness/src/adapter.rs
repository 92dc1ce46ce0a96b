#![forbid(unsafe_code)]

//! [`BindingAdapter`] over simulated controls.
//!
//! Binding goes through the same [`wire_control`] path a toolkit adapter
//! uses, so everything the harness observes (reflect suppression, getter
//! initialization, skipped records) is what a real surface would get.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use bindery_core::error::BindError;
use bindery_core::property::{Bindable, PropertyRegistry};
use bindery_runtime::adapter::{BindingAdapter, FileMode};
use bindery_runtime::config::BinderyConfig;
use bindery_runtime::dispatcher::{DispatchError, DispatchHandle, Dispatcher, Task};
use bindery_runtime::guard::ChangingSet;
use bindery_runtime::wiring::wire_control;

use crate::control::HeadlessControl;
use crate::widget::{HeadlessWidget, Skipped};

/// Stand-in for the toolkit's main window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub title: String,
}

#[derive(Debug)]
pub struct HeadlessAdapter {
    config: BinderyConfig,
    window: HeadlessWindow,
    dispatcher: Dispatcher,
    changing: ChangingSet,
    shown: Vec<HeadlessWidget>,
    file_answers: VecDeque<Option<PathBuf>>,
}

impl Default for HeadlessAdapter {
    fn default() -> Self {
        Self::new(BinderyConfig::default())
    }
}

impl HeadlessAdapter {
    #[must_use]
    pub fn new(config: BinderyConfig) -> Self {
        let window = HeadlessWindow {
            title: config.surface.title.clone(),
        };
        Self {
            config,
            window,
            dispatcher: Dispatcher::new(),
            changing: ChangingSet::new(),
            shown: Vec::new(),
            file_answers: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BinderyConfig {
        &self.config
    }

    /// Cross-thread handle to this adapter's dispatcher.
    #[must_use]
    pub fn handle(&self) -> DispatchHandle {
        self.dispatcher.handle()
    }

    #[must_use]
    pub fn changing(&self) -> &ChangingSet {
        &self.changing
    }

    /// Run whatever is queued for the UI thread now.
    pub fn pump(&self) -> usize {
        self.dispatcher.drain()
    }

    /// Widgets passed to the last [`display_widgets`](BindingAdapter::display_widgets).
    #[must_use]
    pub fn shown(&self) -> &[HeadlessWidget] {
        &self.shown
    }

    /// Script the next answer of [`file_name`](BindingAdapter::file_name);
    /// `None` plays a cancelled dialog.
    pub fn queue_file_name(&mut self, answer: Option<PathBuf>) {
        self.file_answers.push_back(answer);
    }
}

impl BindingAdapter for HeadlessAdapter {
    type Window = HeadlessWindow;
    type Widget = HeadlessWidget;

    fn main_window(&self) -> Option<&HeadlessWindow> {
        Some(&self.window)
    }

    fn obj_widget<B: Bindable>(&mut self, object: &Rc<B>) -> Result<HeadlessWidget, BindError> {
        let mut widget = HeadlessWidget::new(object.panel_title());
        for binding in PropertyRegistry::<B>::of().bind(object) {
            let control = HeadlessControl::new(&binding);
            let (setter, kind) = (binding.setter(), binding.kind());
            match wire_control(binding, &control, &self.changing) {
                Ok(wired) => {
                    control.attach(wired);
                    widget.push_row(control);
                }
                Err(err) => {
                    tracing::warn!(setter, kind = %kind, error = %err, "control skipped");
                    widget.push_skipped(Skipped {
                        setter,
                        kind,
                        reason: err.to_string(),
                    });
                }
            }
        }
        tracing::debug!(
            title = widget.title(),
            rows = widget.rows().len(),
            skipped = widget.skipped().len(),
            "widget built"
        );
        Ok(widget)
    }

    fn display_widgets(&mut self, widgets: Vec<HeadlessWidget>) -> Result<(), BindError> {
        tracing::info!(window = %self.window.title, panels = widgets.len(), "surface shown");
        self.shown = widgets;
        let ran = self
            .dispatcher
            .run_until_closed(self.config.dispatch.idle_wait());
        tracing::info!(tasks = ran, "surface dismissed");
        Ok(())
    }

    fn run_on_ui_thread(&self, task: Task) -> Result<(), DispatchError> {
        self.dispatcher.run_on_ui_thread(task)
    }

    fn close(&self) {
        self.dispatcher.handle().close();
    }

    fn file_name(&mut self, mode: FileMode) -> Result<Option<PathBuf>, BindError> {
        let answer = self
            .file_answers
            .pop_front()
            .ok_or(BindError::Unsupported("file chooser"))?;
        tracing::debug!(mode = %mode, chosen = ?answer, "file chosen");
        Ok(answer)
    }
}
