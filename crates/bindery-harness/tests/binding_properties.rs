use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use bindery_core::error::ListenerError;
use bindery_core::prelude::*;
use bindery_harness::{HeadlessAdapter, HeadlessControl, HeadlessWidget};
use bindery_runtime::adapter::{BindingAdapter, FileMode};
use bindery_runtime::config::BinderyConfig;
use proptest::prelude::*;

#[derive(Default)]
struct Rig {
    level: Cell<i64>,
    level_calls: Cell<u32>,
    gain: Cell<f64>,
    mode: RefCell<String>,
    enabled: Cell<bool>,
    limit: Cell<i64>,
    listeners: ListenerRegistry,
}

impl Notifier for Rig {
    fn listener_registry(&self) -> &ListenerRegistry {
        &self.listeners
    }
}

impl Rig {
    const LEVEL: NotifyingSetter<Self, i64> = NotifyingSetter::new("level", Self::set_level);
    const GAIN: NotifyingSetter<Self, f64> = NotifyingSetter::new("gain", Self::set_gain);
    const MODE: NotifyingSetter<Self, String> = NotifyingSetter::new("mode", Self::set_mode);
    const ENABLED: NotifyingSetter<Self, bool> = NotifyingSetter::new("enabled", Self::set_enabled);
    const LIMIT: NotifyingSetter<Self, i64> = NotifyingSetter::new("limit", Self::set_limit);
    const EMPTY: NotifyingSetter<Self, String> = NotifyingSetter::new("empty", Self::set_mode);
    const OFFLINE: NotifyingSetter<Self, i64> = NotifyingSetter::new("offline", Self::set_level);
    const RESET: Action<Self> = Action::new("reset", Self::reset);

    fn level(&self) -> i64 {
        self.level.get()
    }

    fn set_level(&self, v: i64) -> Result<Option<i64>, SetterError> {
        self.level_calls.set(self.level_calls.get() + 1);
        self.level.set(v);
        Ok(None)
    }

    fn gain(&self) -> f64 {
        self.gain.get()
    }

    fn set_gain(&self, v: f64) -> Result<Option<f64>, SetterError> {
        self.gain.set(v);
        Ok(None)
    }

    fn mode(&self) -> String {
        self.mode.borrow().clone()
    }

    fn set_mode(&self, v: String) -> Result<Option<String>, SetterError> {
        *self.mode.borrow_mut() = v;
        Ok(None)
    }

    fn set_enabled(&self, v: bool) -> Result<Option<bool>, SetterError> {
        self.enabled.set(v);
        Ok(None)
    }

    fn set_limit(&self, v: i64) -> Result<Option<i64>, SetterError> {
        if v > 50 {
            return Err(SetterError::new("limit above 50"));
        }
        self.limit.set(v);
        Ok(None)
    }

    fn reset(&self) -> Result<(), SetterError> {
        Self::LEVEL.call(self, 0)?;
        Self::MODE.call(self, "Yes".to_owned())?;
        Ok(())
    }
}

impl Bindable for Rig {
    fn register(registry: &mut PropertyRegistry<Self>) {
        registry
            .setter(
                UiSetter::new(Self::LEVEL)
                    .with(slider(0, 100, 1.0).with_getter(Self::level))
                    .with(textbox().with_getter(Self::level)),
            )
            .setter(UiSetter::new(Self::GAIN).with(slider(0, 100, 10.0).with_getter(Self::gain)))
            .setter(
                UiSetter::new(Self::MODE)
                    .with(combobox(["Yes", "No", "Maybe"].map(String::from)).with_getter(Self::mode)),
            )
            .setter(UiSetter::new(Self::ENABLED).with(checkbox().with_getter(|r: &Rig| r.enabled.get())))
            .setter(UiSetter::new(Self::LIMIT).with(slider(0, 100, 1.0)))
            .setter(UiSetter::new(Self::EMPTY).with(combobox(Vec::<String>::new())))
            .setter(UiSetter::new(Self::OFFLINE).with(
                textbox().with_fallible_getter(|_: &Rig| Err(SetterError::new("sensor offline"))),
            ))
            .button(button(Self::RESET));
    }
}

fn fixture() -> (HeadlessAdapter, Rc<Rig>, HeadlessWidget) {
    let mut adapter = HeadlessAdapter::default();
    let rig = Rc::new(Rig {
        mode: RefCell::new("No".to_owned()),
        ..Rig::default()
    });
    let widget = adapter.obj_widget(&rig).unwrap();
    (adapter, rig, widget)
}

fn control<'a>(widget: &'a HeadlessWidget, setter: &str, kind: ControlKind) -> &'a Rc<HeadlessControl> {
    widget
        .control(setter, kind)
        .unwrap_or_else(|| panic!("no {kind} control for {setter}"))
}

#[test]
fn initialization_shows_getter_value() {
    let (_, _, widget) = fixture();
    let level = control(&widget, "level", ControlKind::Slider);
    assert_eq!(level.displayed(), Some(ControlValue::Position(0)));
    assert_eq!(level.updates(), 1);
    assert_eq!(
        control(&widget, "level", ControlKind::Textbox).displayed(),
        Some(ControlValue::Text("0".into()))
    );
    assert_eq!(
        control(&widget, "mode", ControlKind::Combobox).displayed(),
        Some(ControlValue::Index(1))
    );
    assert_eq!(
        control(&widget, "enabled", ControlKind::Checkbox).displayed(),
        Some(ControlValue::Check(CheckState::Unchecked))
    );
}

#[test]
fn slider_edit_calls_setter_once_without_reflecting_to_itself() {
    let (_, rig, widget) = fixture();
    let slider = control(&widget, "level", ControlKind::Slider);
    let text = control(&widget, "level", ControlKind::Textbox);
    let before = slider.updates();

    slider.simulate_edit(ControlValue::Position(42)).unwrap();

    assert_eq!(rig.level.get(), 42);
    assert_eq!(rig.level_calls.get(), 1);
    assert_eq!(slider.updates(), before);
    assert_eq!(slider.displayed(), Some(ControlValue::Position(42)));
    // The sibling control of the same setter follows.
    assert_eq!(text.displayed(), Some(ControlValue::Text("42".into())));
}

#[test]
fn direct_call_moves_bound_controls() {
    let (_, rig, widget) = fixture();
    Rig::LEVEL.call(&rig, 7).unwrap();
    assert_eq!(
        control(&widget, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(7))
    );
    assert_eq!(
        control(&widget, "level", ControlKind::Textbox).displayed(),
        Some(ControlValue::Text("7".into()))
    );
}

#[test]
fn textbox_edit_updates_slider_but_not_itself() {
    let (_, rig, widget) = fixture();
    let text = control(&widget, "level", ControlKind::Textbox);
    let slider = control(&widget, "level", ControlKind::Slider);
    let text_updates = text.updates();
    text.simulate_edit(ControlValue::Text("63".into())).unwrap();
    assert_eq!(rig.level.get(), 63);
    assert_eq!(text.updates(), text_updates);
    assert_eq!(slider.displayed(), Some(ControlValue::Position(63)));
}

#[test]
fn slider_scale_applies_both_ways() {
    let (_, rig, widget) = fixture();
    let gain = control(&widget, "gain", ControlKind::Slider);
    gain.simulate_edit(ControlValue::Position(25)).unwrap();
    assert_eq!(rig.gain.get(), 2.5);
    Rig::GAIN.call(&rig, 4.24).unwrap();
    assert_eq!(gain.displayed(), Some(ControlValue::Position(42)));
}

#[test]
fn slider_edits_are_clamped_to_range() {
    let (_, rig, widget) = fixture();
    control(&widget, "level", ControlKind::Slider)
        .simulate_edit(ControlValue::Position(250))
        .unwrap();
    assert_eq!(rig.level.get(), 100);
}

#[test]
fn combobox_and_checkbox_mappings() {
    let (_, rig, widget) = fixture();
    let mode = control(&widget, "mode", ControlKind::Combobox);
    mode.simulate_edit(ControlValue::Index(2)).unwrap();
    assert_eq!(*rig.mode.borrow(), "Maybe");
    Rig::MODE.call(&rig, "Yes".to_owned()).unwrap();
    assert_eq!(mode.displayed(), Some(ControlValue::Index(0)));

    let enabled = control(&widget, "enabled", ControlKind::Checkbox);
    enabled
        .simulate_edit(ControlValue::Check(CheckState::Checked))
        .unwrap();
    assert!(rig.enabled.get());
    let err = enabled
        .simulate_edit(ControlValue::Check(CheckState::PartiallyChecked))
        .unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
    assert!(rig.enabled.get());
}

#[test]
fn failing_setter_releases_changing_set() {
    let (adapter, rig, widget) = fixture();
    let limit = control(&widget, "limit", ControlKind::Slider);
    let err = limit.simulate_edit(ControlValue::Position(80)).unwrap_err();
    assert_eq!(err.to_string(), "limit above 50");
    assert!(adapter.changing().is_empty());

    // Model-driven updates reach the control again afterwards.
    Rig::LIMIT.call(&rig, 10).unwrap();
    assert_eq!(limit.displayed(), Some(ControlValue::Position(10)));
}

#[test]
fn unparsable_text_is_rejected_before_setter() {
    let (_, rig, widget) = fixture();
    let err = control(&widget, "level", ControlKind::Textbox)
        .simulate_edit(ControlValue::Text("loud".into()))
        .unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
    assert_eq!(rig.level_calls.get(), 0);
}

#[test]
fn bad_records_are_skipped_and_the_rest_bind() {
    let (_, _, widget) = fixture();
    let skipped: Vec<_> = widget.skipped().iter().map(|s| (s.setter, s.kind)).collect();
    assert_eq!(
        skipped,
        vec![("empty", ControlKind::Combobox), ("offline", ControlKind::Textbox)]
    );
    assert!(widget.skipped()[1].reason.contains("sensor offline"));
    assert_eq!(widget.rows().len(), 7);
    assert!(widget.controls().all(|c| c.is_wired()));
}

#[test]
fn button_row_has_empty_label_and_runs_action() {
    let (_, rig, widget) = fixture();
    let row = widget.rows().last().unwrap();
    assert_eq!(row.label, "");
    assert_eq!(row.control.displayed(), None);

    Rig::LEVEL.call(&rig, 30).unwrap();
    row.control.simulate_click().unwrap();
    assert_eq!(rig.level.get(), 0);
    assert_eq!(
        control(&widget, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(0))
    );
    assert_eq!(
        control(&widget, "mode", ControlKind::Combobox).displayed(),
        Some(ControlValue::Index(0))
    );
}

#[test]
fn failing_listener_does_not_block_reflect() {
    let (_, rig, widget) = fixture();
    Rig::LEVEL
        .listeners(&rig)
        .insert(0, |_| {});
    Rig::LEVEL
        .listeners(&rig)
        .push_fallible(|_| Err(ListenerError::new("observer gone")));
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    Rig::LEVEL.listeners(&rig).push(move |_| h.set(h.get() + 1));

    let n = Rig::LEVEL.call_reporting(&rig, 5).unwrap();
    assert_eq!(n.delivery.failed, 1);
    assert_eq!(hits.get(), 1);
    assert_eq!(
        control(&widget, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(5))
    );
}

#[test]
fn per_instance_controls_stay_independent() {
    let mut adapter = HeadlessAdapter::default();
    let a = Rc::new(Rig::default());
    let b = Rc::new(Rig::default());
    let wa = adapter.obj_widget(&a).unwrap();
    let wb = adapter.obj_widget(&b).unwrap();
    Rig::LEVEL.call(&a, 9).unwrap();
    assert_eq!(
        control(&wa, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(9))
    );
    assert_eq!(
        control(&wb, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(0))
    );
}

#[test]
fn display_runs_tasks_until_closed() {
    let (mut adapter, _, widget) = fixture();
    let handle = adapter.handle();
    let ran = Arc::new(AtomicUsize::new(0));
    let worker = {
        let ran = Arc::clone(&ran);
        thread::spawn(move || {
            for _ in 0..10 {
                let ran = Arc::clone(&ran);
                handle
                    .run_on_ui_thread(move || {
                        ran.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }
            handle.close();
        })
    };
    adapter.display_widgets(vec![widget]).unwrap();
    worker.join().unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 10);
    assert_eq!(adapter.shown().len(), 1);
    assert!(adapter.run_on_ui_thread(Box::new(|| {})).is_err());
}

#[test]
fn file_name_plays_scripted_answers() {
    let mut adapter = HeadlessAdapter::new(BinderyConfig::default());
    adapter.queue_file_name(Some(PathBuf::from("rig.toml")));
    adapter.queue_file_name(None);
    assert_eq!(
        adapter.file_name(FileMode::Load).unwrap(),
        Some(PathBuf::from("rig.toml"))
    );
    assert_eq!(adapter.file_name(FileMode::Save).unwrap(), None);
    assert!(matches!(
        adapter.file_name(FileMode::Save),
        Err(BindError::Unsupported(_))
    ));
}

#[test]
fn render_text_lists_rows_and_skips() {
    let (adapter, _, widget) = fixture();
    assert_eq!(adapter.main_window().unwrap().title, "Bindery");
    let text = widget.render_text();
    assert!(text.starts_with("== Rig ==\n"));
    assert!(text.contains("level    slider 0..=100: 0"));
    assert!(text.contains("combobox [Yes|No|Maybe]: No"));
    assert!(text.contains("<reset>"));
    assert!(text.contains("skipped offline (textbox)"));
}

#[test]
fn rebinding_does_not_accumulate_listeners() {
    let (mut adapter, rig, widget) = fixture();
    assert_eq!(Rig::LEVEL.listeners(&rig).len(), 2);
    drop(widget);
    for _ in 0..100 {
        let widget = adapter.obj_widget(&rig).unwrap();
        assert_eq!(Rig::LEVEL.listeners(&rig).len(), 2);
        drop(widget);
    }
    assert!(Rig::LEVEL.listeners(&rig).is_empty());
    assert!(Rig::MODE.listeners(&rig).is_empty());

    // A live widget keeps reflecting after the churn.
    let widget = adapter.obj_widget(&rig).unwrap();
    Rig::LEVEL.call(&rig, 12).unwrap();
    assert_eq!(
        control(&widget, "level", ControlKind::Slider).displayed(),
        Some(ControlValue::Position(12))
    );
}

proptest! {
    #[test]
    fn any_slider_edit_lands_clamped_and_reaches_siblings(position in -1_000i64..1_000) {
        let (_, rig, widget) = fixture();
        let slider = control(&widget, "level", ControlKind::Slider);
        slider.simulate_edit(ControlValue::Position(position)).unwrap();
        let expected = position.clamp(0, 100);
        prop_assert_eq!(rig.level.get(), expected);
        prop_assert_eq!(rig.level_calls.get(), 1);
        prop_assert_eq!(
            control(&widget, "level", ControlKind::Textbox).displayed(),
            Some(ControlValue::Text(expected.to_string()))
        );
    }

    #[test]
    fn direct_calls_always_track_last_value(values in prop::collection::vec(0i64..=100, 1..8)) {
        let (_, rig, widget) = fixture();
        for v in &values {
            Rig::LEVEL.call(&rig, *v).unwrap();
        }
        let last = *values.last().unwrap();
        prop_assert_eq!(
            control(&widget, "level", ControlKind::Slider).displayed(),
            Some(ControlValue::Position(last))
        );
    }
}
