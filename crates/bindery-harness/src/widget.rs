#![forbid(unsafe_code)]

//! Simulated panels.

use std::fmt::Write as _;
use std::rc::Rc;

use bindery_core::metadata::ControlKind;

use crate::control::HeadlessControl;

/// One labelled control. Buttons carry an empty label.
#[derive(Clone, Debug)]
pub struct Row {
    pub label: &'static str,
    pub control: Rc<HeadlessControl>,
}

/// A record that failed to bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    pub setter: &'static str,
    pub kind: ControlKind,
    pub reason: String,
}

/// A titled panel of bound controls.
#[derive(Clone, Debug)]
pub struct HeadlessWidget {
    title: String,
    rows: Vec<Row>,
    skipped: Vec<Skipped>,
}

impl HeadlessWidget {
    pub(crate) fn new(title: String) -> Self {
        Self {
            title,
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn push_row(&mut self, control: Rc<HeadlessControl>) {
        let label = if control.kind() == ControlKind::Button {
            ""
        } else {
            control.setter()
        };
        self.rows.push(Row { label, control });
    }

    pub(crate) fn push_skipped(&mut self, skipped: Skipped) {
        self.skipped.push(skipped);
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn controls(&self) -> impl Iterator<Item = &Rc<HeadlessControl>> {
        self.rows.iter().map(|r| &r.control)
    }

    /// The control bound to `setter` with `kind`.
    #[must_use]
    pub fn control(&self, setter: &str, kind: ControlKind) -> Option<&Rc<HeadlessControl>> {
        self.controls()
            .find(|c| c.setter() == setter && c.kind() == kind)
    }

    /// Plain-text dump, one row per line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let mut out = format!("== {} ==\n", self.title);
        for row in &self.rows {
            let _ = writeln!(out, "  {:width$}  {}", row.label, row.control.describe());
        }
        for skipped in &self.skipped {
            let _ = writeln!(
                out,
                "  skipped {} ({}): {}",
                skipped.setter, skipped.kind, skipped.reason
            );
        }
        out
    }
}
