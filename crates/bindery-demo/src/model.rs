//! The demo object.
//!
//! Two sliders share one getter; `test2` forwards to `test`, so moving the
//! second slider moves the first but not the other way round. `button1`
//! drives three other setters, and `height` is shown both as a slider and as
//! a textbox.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bindery_core::prelude::*;

thread_local! {
    static MODEL: RefCell<Option<Rc<Demo>>> = const { RefCell::new(None) };
}

/// Make `demo` reachable from tasks dispatched to this (the UI) thread.
pub fn install(demo: &Rc<Demo>) {
    MODEL.with(|slot| *slot.borrow_mut() = Some(Rc::clone(demo)));
}

/// Run `f` against the installed model. `None` when nothing is installed.
pub fn with_model<R>(f: impl FnOnce(&Demo) -> R) -> Option<R> {
    let demo = MODEL.with(|slot| slot.borrow().clone())?;
    Some(f(&demo))
}

pub const COMBO_OPTIONS: [&str; 3] = ["Yes", "No", "Maybe"];

#[derive(Debug)]
pub struct Demo {
    value: Cell<i64>,
    bval: Cell<bool>,
    optionval: RefCell<String>,
    textval: RefCell<String>,
    height: Cell<f64>,
    listeners: ListenerRegistry,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            value: Cell::new(0),
            bval: Cell::new(true),
            optionval: RefCell::new("Maybe".to_owned()),
            textval: RefCell::new("Matt".to_owned()),
            height: Cell::new(5.0),
            listeners: ListenerRegistry::new(),
        }
    }
}

impl Notifier for Demo {
    fn listener_registry(&self) -> &ListenerRegistry {
        &self.listeners
    }
}

impl Demo {
    pub const TEST: NotifyingSetter<Self, i64> = NotifyingSetter::new("test", Self::set_test);
    pub const TEST2: NotifyingSetter<Self, i64> = NotifyingSetter::new("test2", Self::set_test2);
    pub const COMBO: NotifyingSetter<Self, String> = NotifyingSetter::new("combo", Self::set_combo);
    pub const BOOLVAL: NotifyingSetter<Self, bool> =
        NotifyingSetter::new("boolval", Self::set_boolval);
    pub const NAME: NotifyingSetter<Self, String> = NotifyingSetter::new("name", Self::set_name);
    pub const HEIGHT: NotifyingSetter<Self, f64> = NotifyingSetter::new("height", Self::set_height);
    pub const BUTTON1: Action<Self> = Action::new("button1", Self::button1);

    pub fn test(&self) -> i64 {
        self.value.get()
    }

    fn set_test(&self, v: i64) -> Result<Option<i64>, SetterError> {
        tracing::info!(value = v, "setting test");
        self.value.set(v);
        Ok(None)
    }

    fn set_test2(&self, v: i64) -> Result<Option<i64>, SetterError> {
        Self::TEST.call(self, v)?;
        Ok(None)
    }

    fn button1(&self) -> Result<(), SetterError> {
        Self::TEST.call(self, 50)?;
        Self::BOOLVAL.call(self, !self.boolval())?;
        Self::COMBO.call(self, "Maybe".to_owned())?;
        Ok(())
    }

    pub fn combo(&self) -> String {
        self.optionval.borrow().clone()
    }

    fn set_combo(&self, v: String) -> Result<Option<String>, SetterError> {
        tracing::info!(value = %v, "setting combo");
        *self.optionval.borrow_mut() = v;
        Ok(None)
    }

    pub fn boolval(&self) -> bool {
        self.bval.get()
    }

    fn set_boolval(&self, v: bool) -> Result<Option<bool>, SetterError> {
        self.bval.set(v);
        Ok(None)
    }

    pub fn name(&self) -> String {
        self.textval.borrow().clone()
    }

    fn set_name(&self, v: String) -> Result<Option<String>, SetterError> {
        *self.textval.borrow_mut() = v;
        Ok(None)
    }

    pub fn height(&self) -> f64 {
        self.height.get()
    }

    // Listeners get the stored value back, so both height controls agree.
    fn set_height(&self, v: f64) -> Result<Option<f64>, SetterError> {
        if !v.is_finite() || v < 0.0 {
            return Err(SetterError::new(format!("height {v} is not a length")));
        }
        self.height.set(v);
        Ok(Some(v))
    }
}

impl Bindable for Demo {
    fn register(registry: &mut PropertyRegistry<Self>) {
        registry
            .setter(UiSetter::new(Self::TEST).with(slider(0, 100, 1.0).with_getter(Self::test)))
            .setter(UiSetter::new(Self::TEST2).with(slider(0, 100, 1.0).with_getter(Self::test)))
            .button(button(Self::BUTTON1))
            .setter(
                UiSetter::new(Self::COMBO)
                    .with(combobox(COMBO_OPTIONS.map(String::from)).with_getter(Self::combo)),
            )
            .setter(UiSetter::new(Self::BOOLVAL).with(checkbox().with_getter(Self::boolval)))
            .setter(UiSetter::new(Self::NAME).with(textbox().with_getter(Self::name)))
            .setter(
                UiSetter::new(Self::HEIGHT)
                    .with(slider(0, 100, 1.0).with_getter(Self::height))
                    .with(textbox().with_getter(Self::height)),
            );
    }

    fn panel_title(&self) -> String {
        "Test".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test2_moves_test_listeners_only() {
        let demo = Demo::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        Demo::TEST.listeners(&demo).push(move |v| s.borrow_mut().push(*v));
        let test2_hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&test2_hits);
        Demo::TEST2.listeners(&demo).push(move |_| h.set(h.get() + 1));

        Demo::TEST.call(&demo, 3).unwrap();
        assert_eq!(test2_hits.get(), 0);
        Demo::TEST2.call(&demo, 8).unwrap();
        assert_eq!(*seen.borrow(), vec![3, 8]);
        assert_eq!(test2_hits.get(), 1);
    }

    #[test]
    fn button1_drives_other_setters() {
        let demo = Demo::default();
        Demo::COMBO.call(&demo, "No".to_owned()).unwrap();
        Demo::BUTTON1.invoke(&demo).unwrap();
        assert_eq!(demo.test(), 50);
        assert!(!demo.boolval());
        assert_eq!(demo.combo(), "Maybe");
    }

    #[test]
    fn height_returns_stored_value() {
        let demo = Demo::default();
        assert_eq!(Demo::HEIGHT.call(&demo, 7.5).unwrap(), Some(7.5));
        assert!(Demo::HEIGHT.call(&demo, -1.0).is_err());
        assert_eq!(demo.height(), 7.5);
    }

    #[test]
    fn registry_order_matches_declaration() {
        let registry = PropertyRegistry::<Demo>::of();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["test", "test2", "button1", "combo", "boolval", "name", "height"]
        );
    }

    #[test]
    fn thread_local_model_access() {
        assert_eq!(with_model(|d| d.test()), None);
        let demo = Rc::new(Demo::default());
        install(&demo);
        Demo::TEST.call(&demo, 4).unwrap();
        assert_eq!(with_model(|d| d.test()), Some(4));
    }
}
