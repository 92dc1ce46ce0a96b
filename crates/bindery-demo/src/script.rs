//! Scripted user edits.
//!
//! One step per line. Words are separated by any run of whitespace, and
//! everything after an `edit` step's control kind is the value, verbatim
//! apart from surrounding blanks. A line starting with `#` is a comment, as
//! is a `#` word after a button name:
//!
//! ```text
//! # combobox values take a label or an index
//! edit test slider 42
//! edit combo combobox No
//! # checkbox values: on | off | partial
//! edit boolval checkbox off
//! edit name textbox Ada Lovelace #1
//! click button1   # go
//! ```

use std::fs;
use std::path::Path;

use bindery_core::control::{CheckState, ControlValue};
use bindery_core::metadata::{ControlKind, ControlOptions};
use bindery_harness::HeadlessWidget;

use crate::error::DemoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Edit {
        setter: String,
        kind: ControlKind,
        value: String,
    },
    Click {
        setter: String,
    },
}

/// Outcome of a replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Replay {
    pub applied: usize,
    pub rejected: usize,
}

/// # Errors
///
/// [`DemoError::ScriptIo`] when the file cannot be read, otherwise see
/// [`parse`].
pub fn load(path: &Path) -> Result<Vec<Step>, DemoError> {
    let text = fs::read_to_string(path).map_err(|source| DemoError::ScriptIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// # Errors
///
/// [`DemoError::Script`] naming the first malformed line.
pub fn parse(text: &str) -> Result<Vec<Step>, DemoError> {
    let mut steps = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad = |reason: &str| DemoError::Script {
            line: index + 1,
            reason: reason.to_owned(),
        };
        let (command, rest) = next_word(line);
        match command {
            "edit" => {
                let (setter, rest) = next_word(rest);
                if setter.is_empty() {
                    return Err(bad("missing setter"));
                }
                let (kind, value) = next_word(rest);
                if kind.is_empty() {
                    return Err(bad("missing control kind"));
                }
                let kind = ControlKind::from_name(kind).ok_or_else(|| bad("unknown control kind"))?;
                if kind == ControlKind::Button {
                    return Err(bad("use `click` for buttons"));
                }
                steps.push(Step::Edit {
                    setter: setter.to_owned(),
                    kind,
                    value: value.to_owned(),
                });
            }
            "click" => {
                let (setter, rest) = next_word(rest);
                if setter.is_empty() {
                    return Err(bad("missing button name"));
                }
                if !rest.is_empty() && !rest.starts_with('#') {
                    return Err(bad("unexpected text after button name"));
                }
                steps.push(Step::Click {
                    setter: setter.to_owned(),
                });
            }
            other => return Err(bad(&format!("unknown command `{other}`"))),
        }
    }
    Ok(steps)
}

/// The first whitespace-delimited word of `text` and the trimmed remainder.
fn next_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

/// Play `steps` against `widget`. Rejected edits are logged by the controls
/// and counted; a step naming a missing control is an error.
///
/// # Errors
///
/// [`DemoError::Replay`] for unknown controls or unreadable values.
pub fn replay(steps: &[Step], widget: &HeadlessWidget) -> Result<Replay, DemoError> {
    let mut replay = Replay::default();
    for (index, step) in steps.iter().enumerate() {
        let bad = |reason: String| DemoError::Replay {
            step: index + 1,
            reason,
        };
        let outcome = match step {
            Step::Edit {
                setter,
                kind,
                value,
            } => {
                let control = widget
                    .control(setter, *kind)
                    .ok_or_else(|| bad(format!("no {kind} control for `{setter}`")))?;
                let raw = control_value(control.options(), value).map_err(bad)?;
                control.simulate_edit(raw)
            }
            Step::Click { setter } => {
                let control = widget
                    .control(setter, ControlKind::Button)
                    .ok_or_else(|| bad(format!("no button `{setter}`")))?;
                control.simulate_click()
            }
        };
        match outcome {
            Ok(()) => replay.applied += 1,
            Err(_) => replay.rejected += 1,
        }
    }
    tracing::info!(applied = replay.applied, rejected = replay.rejected, "script replayed");
    Ok(replay)
}

fn control_value(options: &ControlOptions, text: &str) -> Result<ControlValue, String> {
    match options {
        ControlOptions::Slider(_) => text
            .parse()
            .map(ControlValue::Position)
            .map_err(|_| format!("`{text}` is not a slider position")),
        ControlOptions::Combobox { labels } => labels
            .iter()
            .position(|l| l == text)
            .or_else(|| text.parse().ok().filter(|i| *i < labels.len()))
            .map(ControlValue::Index)
            .ok_or_else(|| format!("`{text}` is not one of {}", labels.join(", "))),
        ControlOptions::Checkbox => match text {
            "on" | "checked" | "true" => Ok(ControlValue::Check(CheckState::Checked)),
            "off" | "unchecked" | "false" => Ok(ControlValue::Check(CheckState::Unchecked)),
            "partial" => Ok(ControlValue::Check(CheckState::PartiallyChecked)),
            _ => Err(format!("`{text}` is not a check state")),
        },
        ControlOptions::Textbox => Ok(ControlValue::Text(text.to_owned())),
        ControlOptions::Button => Err("buttons take no value".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Demo;
    use bindery_harness::HeadlessAdapter;
    use bindery_runtime::adapter::BindingAdapter;
    use std::io::Write;
    use std::rc::Rc;

    #[test]
    fn parse_all_step_kinds() {
        let steps = parse(
            "# warm-up\n\nedit test slider 42\nedit name textbox Ada Lovelace  \nclick button1 # go\n",
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Edit {
                    setter: "test".into(),
                    kind: ControlKind::Slider,
                    value: "42".into()
                },
                Step::Edit {
                    setter: "name".into(),
                    kind: ControlKind::Textbox,
                    value: "Ada Lovelace".into()
                },
                Step::Click {
                    setter: "button1".into()
                },
            ]
        );
    }

    #[test]
    fn runs_of_blanks_separate_words() {
        let steps = parse("edit  test\tslider   4\n  click   button1\n").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Edit {
                    setter: "test".into(),
                    kind: ControlKind::Slider,
                    value: "4".into()
                },
                Step::Click {
                    setter: "button1".into()
                },
            ]
        );
    }

    #[test]
    fn textbox_value_may_contain_hash() {
        let steps = parse("edit name textbox  Room #4  \n").unwrap();
        assert_eq!(
            steps,
            vec![Step::Edit {
                setter: "name".into(),
                kind: ControlKind::Textbox,
                value: "Room #4".into()
            }]
        );
        assert!(parse("click button1 twice\n").is_err());
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse("click button1\nedit test dial 3\n").unwrap_err();
        assert_eq!(err.to_string(), "script line 2: unknown control kind");
        let err = parse("jump\n").unwrap_err();
        assert!(err.to_string().contains("unknown command `jump`"));
        assert!(parse("edit button1 button\n").is_err());
    }

    #[test]
    fn replay_drives_controls() {
        let mut adapter = HeadlessAdapter::default();
        let demo = Rc::new(Demo::default());
        let widget = adapter.obj_widget(&demo).unwrap();
        let steps = parse(
            "edit test2 slider 30\nedit combo combobox No\nedit boolval checkbox off\n\
             edit height textbox 12.5\nedit height textbox tall\n",
        )
        .unwrap();
        let outcome = replay(&steps, &widget).unwrap();
        assert_eq!(outcome, Replay { applied: 4, rejected: 1 });
        assert_eq!(demo.test(), 30);
        assert_eq!(demo.combo(), "No");
        assert!(!demo.boolval());
        assert_eq!(demo.height(), 12.5);
        assert_eq!(
            widget.control("test", ControlKind::Slider).unwrap().displayed(),
            Some(ControlValue::Position(30))
        );
        assert_eq!(
            widget.control("height", ControlKind::Slider).unwrap().displayed(),
            Some(ControlValue::Position(13))
        );
    }

    #[test]
    fn replay_rejects_unknown_control() {
        let mut adapter = HeadlessAdapter::default();
        let demo = Rc::new(Demo::default());
        let widget = adapter.obj_widget(&demo).unwrap();
        let steps = parse("edit volume slider 3\n").unwrap();
        assert!(matches!(
            replay(&steps, &widget),
            Err(DemoError::Replay { step: 1, .. })
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "click button1").unwrap();
        assert_eq!(load(file.path()).unwrap().len(), 1);
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("none.txt")),
            Err(DemoError::ScriptIo { .. })
        ));
    }
}
