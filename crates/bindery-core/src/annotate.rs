#![forbid(unsafe_code)]

//! Built-in UI-intent factories.
//!
//! [`slider`], [`combobox`], [`checkbox`], and [`textbox`] build an
//! [`Annotation`]: the metadata record plus the typed value mapping and an
//! optional getter. Attaching annotations to a [`UiSetter`] stacks them on one
//! [`NotifyingSetter`], so a property shown as both a slider and a textbox
//! still notifies exactly once per call.
//!
//! [`button`] annotates a no-argument [`Action`] and does not wrap it in a
//! notifying setter; a button has no value to broadcast.
//!
//! ```
//! use std::cell::Cell;
//! use bindery_core::annotate::{slider, textbox, UiSetter};
//! use bindery_core::error::SetterError;
//! use bindery_core::listeners::{ListenerRegistry, Notifier};
//! use bindery_core::metadata::ControlKind;
//! use bindery_core::setter::NotifyingSetter;
//!
//! #[derive(Default)]
//! struct Plant {
//!     height: Cell<f64>,
//!     listeners: ListenerRegistry,
//! }
//!
//! impl Notifier for Plant {
//!     fn listener_registry(&self) -> &ListenerRegistry {
//!         &self.listeners
//!     }
//! }
//!
//! impl Plant {
//!     const HEIGHT: NotifyingSetter<Self, f64> = NotifyingSetter::new("height", Self::set_height);
//!
//!     fn height(&self) -> f64 {
//!         self.height.get()
//!     }
//!
//!     fn set_height(&self, v: f64) -> Result<Option<f64>, SetterError> {
//!         self.height.set(v);
//!         Ok(Some(v))
//!     }
//! }
//!
//! let height = UiSetter::new(Plant::HEIGHT)
//!     .with(slider(0, 100, 1.0).with_getter(Plant::height))
//!     .with(textbox().with_getter(Plant::height));
//! let kinds: Vec<_> = height.metadata().kinds().collect();
//! assert_eq!(kinds, vec![ControlKind::Slider, ControlKind::Textbox]);
//! ```

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::control::{
    CheckValue, CheckboxMapping, ComboboxMapping, ControlMapping, SliderMapping, SliderValue,
    TextboxMapping,
};
use crate::error::SetterError;
use crate::metadata::{
    Annotated, ControlKind, ControlOptions, Metadata, MetadataRecord, SliderOptions, annotate,
};
use crate::setter::NotifyingSetter;

type GetterFn<M, V> = dyn Fn(&M) -> Result<V, SetterError>;

/// Reads the current property value from an instance.
pub struct Getter<M, V> {
    f: Rc<GetterFn<M, V>>,
}

impl<M, V> Clone for Getter<M, V> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<M, V> Getter<M, V> {
    pub fn new(f: impl Fn(&M) -> V + 'static) -> Self {
        Self {
            f: Rc::new(move |m: &M| Ok(f(m))),
        }
    }

    pub fn fallible(f: impl Fn(&M) -> Result<V, SetterError> + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Read the value.
    ///
    /// # Errors
    ///
    /// Returns the getter's own error.
    pub fn get(&self, instance: &M) -> Result<V, SetterError> {
        (self.f)(instance)
    }
}

/// One UI-intent record with its typed value mapping and optional getter.
pub struct Annotation<M, V> {
    options: ControlOptions,
    mapping: Rc<dyn ControlMapping<V>>,
    getter: Option<Getter<M, V>>,
}

impl<M, V> Clone for Annotation<M, V> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            mapping: Rc::clone(&self.mapping),
            getter: self.getter.clone(),
        }
    }
}

impl<M, V> fmt::Debug for Annotation<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotation")
            .field("options", &self.options)
            .field("has_getter", &self.getter.is_some())
            .finish()
    }
}

impl<M, V> Annotation<M, V> {
    fn new(options: ControlOptions, mapping: Rc<dyn ControlMapping<V>>) -> Self {
        Self {
            options,
            mapping,
            getter: None,
        }
    }

    /// Initialize the control from `f` at bind time.
    #[must_use]
    pub fn with_getter(mut self, f: impl Fn(&M) -> V + 'static) -> Self {
        self.getter = Some(Getter::new(f));
        self
    }

    /// Like [`with_getter`](Self::with_getter) for getters that can fail. A
    /// failure at bind time skips this control only.
    #[must_use]
    pub fn with_fallible_getter(
        mut self,
        f: impl Fn(&M) -> Result<V, SetterError> + 'static,
    ) -> Self {
        self.getter = Some(Getter::fallible(f));
        self
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.options.kind()
    }

    #[must_use]
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    #[must_use]
    pub fn record(&self) -> MetadataRecord {
        MetadataRecord::new(self.options.clone(), self.getter.is_some())
    }

    #[must_use]
    pub fn mapping(&self) -> &Rc<dyn ControlMapping<V>> {
        &self.mapping
    }

    #[must_use]
    pub fn getter(&self) -> Option<&Getter<M, V>> {
        self.getter.as_ref()
    }
}

/// Slider over `minimum..=maximum`; see [`SliderOptions`] for `scale`.
pub fn slider<M, V: SliderValue>(minimum: i64, maximum: i64, scale: f64) -> Annotation<M, V> {
    Annotation::new(
        ControlOptions::Slider(SliderOptions {
            minimum,
            maximum,
            scale,
        }),
        Rc::new(SliderMapping::<V>::new(scale)),
    )
}

/// Combobox over `options`, displayed through their `Display` strings.
pub fn combobox<M, V>(options: impl IntoIterator<Item = V>) -> Annotation<M, V>
where
    V: Clone + PartialEq + fmt::Display + 'static,
{
    let options: Vec<V> = options.into_iter().collect();
    let labels = options.iter().map(ToString::to_string).collect();
    Annotation::new(
        ControlOptions::Combobox { labels },
        Rc::new(ComboboxMapping::new(options)),
    )
}

pub fn checkbox<M, V: CheckValue>() -> Annotation<M, V> {
    Annotation::new(
        ControlOptions::Checkbox,
        Rc::new(CheckboxMapping::<V>::new()),
    )
}

pub fn textbox<M, V>() -> Annotation<M, V>
where
    V: fmt::Display + FromStr + 'static,
    V::Err: fmt::Display,
{
    Annotation::new(ControlOptions::Textbox, Rc::new(TextboxMapping::<V>::new()))
}

/// A notifying setter with its stacked UI-intent annotations.
pub struct UiSetter<M, V> {
    inner: Annotated<NotifyingSetter<M, V>>,
    annotations: Vec<Annotation<M, V>>,
}

impl<M, V> Clone for UiSetter<M, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl<M, V> fmt::Debug for UiSetter<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiSetter")
            .field("name", &self.name())
            .field("annotations", &self.annotations)
            .finish()
    }
}

impl<M, V> UiSetter<M, V> {
    #[must_use]
    pub fn new(setter: NotifyingSetter<M, V>) -> Self {
        Self {
            inner: Annotated::new(setter),
            annotations: Vec::new(),
        }
    }

    /// Stack `annotation`. An earlier annotation of the same kind is replaced.
    #[must_use]
    pub fn with(mut self, annotation: Annotation<M, V>) -> Self {
        self.inner = self.inner.annotate(annotation.record());
        match self
            .annotations
            .iter_mut()
            .find(|a| a.kind() == annotation.kind())
        {
            Some(slot) => *slot = annotation,
            None => self.annotations.push(annotation),
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[must_use]
    pub fn setter(&self) -> NotifyingSetter<M, V> {
        *self.inner.op()
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation<M, V>> {
        self.annotations.iter()
    }
}

type ActionFn<M> = fn(&M) -> Result<(), SetterError>;

/// A no-argument operation a button triggers.
pub struct Action<M> {
    name: &'static str,
    f: ActionFn<M>,
}

impl<M> Clone for Action<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Action<M> {}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}

impl<M> Action<M> {
    #[must_use]
    pub const fn new(name: &'static str, f: ActionFn<M>) -> Self {
        Self { name, f }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Run the operation.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error.
    pub fn invoke(&self, instance: &M) -> Result<(), SetterError> {
        (self.f)(instance)
    }
}

/// Mark `action` as a button.
#[must_use]
pub fn button<M>(action: Action<M>) -> Annotated<Action<M>> {
    annotate(action, ControlOptions::Button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlValue;
    use crate::listeners::{ListenerRegistry, Notifier};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Knobs {
        level: Cell<i64>,
        mode: RefCell<String>,
        presses: Cell<u32>,
        listeners: ListenerRegistry,
    }

    impl Notifier for Knobs {
        fn listener_registry(&self) -> &ListenerRegistry {
            &self.listeners
        }
    }

    impl Knobs {
        const LEVEL: NotifyingSetter<Self, i64> = NotifyingSetter::new("level", Self::set_level);
        const MODE: NotifyingSetter<Self, String> = NotifyingSetter::new("mode", Self::set_mode);
        const PRESS: Action<Self> = Action::new("press", Self::press);

        fn level(&self) -> i64 {
            self.level.get()
        }

        fn set_level(&self, v: i64) -> Result<Option<i64>, SetterError> {
            self.level.set(v);
            Ok(None)
        }

        fn set_mode(&self, v: String) -> Result<Option<String>, SetterError> {
            *self.mode.borrow_mut() = v;
            Ok(None)
        }

        fn press(&self) -> Result<(), SetterError> {
            self.presses.set(self.presses.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn slider_records_options_and_getter() {
        let s = UiSetter::new(Knobs::LEVEL).with(slider(-5, 5, 2.0).with_getter(Knobs::level));
        let record = s.metadata().get(ControlKind::Slider).unwrap();
        assert!(record.has_getter());
        assert_eq!(
            record.options(),
            &ControlOptions::Slider(SliderOptions {
                minimum: -5,
                maximum: 5,
                scale: 2.0
            })
        );
        assert_eq!(s.name(), "level");
    }

    #[test]
    fn combobox_labels_use_display() {
        let s = UiSetter::new(Knobs::MODE).with(combobox(
            ["eco", "normal", "boost"].map(String::from),
        ));
        match s.metadata().get(ControlKind::Combobox).unwrap().options() {
            ControlOptions::Combobox { labels } => {
                assert_eq!(labels, &["eco", "normal", "boost"]);
            }
            other => panic!("unexpected options {other:?}"),
        }
        let a = s.annotations().next().unwrap();
        assert_eq!(
            a.mapping().inverse(ControlValue::Index(2)).unwrap(),
            "boost"
        );
    }

    #[test]
    fn stacking_keeps_one_setter() {
        let s = UiSetter::new(Knobs::LEVEL)
            .with(slider(0, 10, 1.0))
            .with(textbox())
            .with(slider(0, 20, 1.0).with_getter(Knobs::level));
        assert_eq!(s.annotations().count(), 2);
        assert_eq!(s.metadata().len(), 2);
        let first = s.annotations().next().unwrap();
        assert!(first.getter().is_some());
        assert_eq!(s.setter().name(), "level");
    }

    #[test]
    fn getter_reads_instance() {
        let k = Knobs::default();
        k.level.set(4);
        let a: Annotation<Knobs, i64> = slider(0, 10, 1.0).with_getter(Knobs::level);
        assert_eq!(a.getter().unwrap().get(&k).unwrap(), 4);

        let failing = textbox::<Knobs, i64>()
            .with_fallible_getter(|_: &Knobs| Err(SetterError::new("offline")));
        assert!(failing.getter().unwrap().get(&k).is_err());
    }

    #[test]
    fn button_has_metadata_but_no_listeners() {
        let k = Knobs::default();
        let b = button(Knobs::PRESS);
        assert!(b.metadata().contains(ControlKind::Button));
        assert!(!b.metadata().get(ControlKind::Button).unwrap().has_getter());
        b.invoke(&k).unwrap();
        b.invoke(&k).unwrap();
        assert_eq!(k.presses.get(), 2);
        assert!(k.listeners.is_empty());
    }

    #[test]
    fn checkbox_annotation_kind() {
        let a: Annotation<Knobs, bool> = checkbox();
        assert_eq!(a.kind(), ControlKind::Checkbox);
        assert!(!a.record().has_getter());
    }
}
