use super::*;
use crate::model::stroke::{DrawingAttributes, StylusPoint};

fn stroke(x: f32) -> Stroke {
    Stroke::new(
        vec![StylusPoint::new(x, 0.0, 0.5), StylusPoint::new(x, 10.0, 0.5)],
        DrawingAttributes::default(),
    )
    .unwrap()
}

fn stack_with_strokes() -> LayerStack {
    let mut top = Layer::new("Layer 2");
    top.strokes = vec![stroke(1.0), stroke(2.0), stroke(3.0)];
    let mut bottom = Layer::new("Layer 1");
    bottom.strokes = vec![stroke(10.0)];
    LayerStack::from_layers(vec![top, bottom])
}

fn state(stack: &LayerStack) -> (Vec<(LayerId, Layer)>, Option<LayerId>) {
    (
        stack.iter().map(|(id, l)| (id, l.clone())).collect(),
        stack.selected(),
    )
}

fn round_trip(stack: &mut LayerStack, cmd: Command) {
    let before = state(stack);
    let mut h = History::new();
    cmd.apply(stack).unwrap();
    assert!(h.record(cmd));
    let after = state(stack);
    assert_ne!(before, after);

    h.undo(stack).unwrap().unwrap();
    assert_eq!(state(stack), before);
    h.redo(stack).unwrap().unwrap();
    assert_eq!(state(stack), after);
}

#[test]
fn insert_layer_round_trips() {
    let mut s = stack_with_strokes();
    let cmd = Command::InsertLayer {
        id: LayerId(50),
        index: 0,
        layer: Layer::new(""),
        prev_selected: s.selected(),
    };
    round_trip(&mut s, cmd);
    assert_eq!(s.get(LayerId(50)).map(|l| l.name.as_str()), Some("Layer 3"));
}

#[test]
fn remove_layer_round_trips() {
    let mut s = stack_with_strokes();
    let id = s.id_at(0).unwrap();
    let layer = s.get(id).unwrap().clone();
    round_trip(
        &mut s,
        Command::RemoveLayer {
            id,
            index: 0,
            layer,
        },
    );
}

#[test]
fn move_layer_round_trips() {
    let mut s = stack_with_strokes();
    s.get_mut(s.id_at(0).unwrap()).unwrap().name = "ink".into();
    round_trip(&mut s, Command::MoveLayer { from: 0, to: 1 });
}

#[test]
fn property_round_trips() {
    let mut s = stack_with_strokes();
    let id = s.id_at(1).unwrap();
    let new = LayerProperty::Opacity(0.3);
    let old = new.read(s.get(id).unwrap());
    round_trip(&mut s, Command::SetProperty { id, old, new });
}

#[test]
fn stroke_edit_restores_positions() {
    let mut s = stack_with_strokes();
    let top = s.id_at(0).unwrap();
    let bottom = s.id_at(1).unwrap();
    let cmd = Command::EditStrokes {
        removed: vec![
            RemovedStrokes {
                layer: top,
                strokes: vec![(0, stroke(1.0)), (2, stroke(3.0))],
            },
            RemovedStrokes {
                layer: bottom,
                strokes: vec![(0, stroke(10.0))],
            },
        ],
        added: Some(AddedStrokes {
            layer: top,
            at: 1,
            strokes: vec![stroke(7.0), stroke(8.0)],
        }),
    };
    assert_eq!(cmd.affected_layers(), vec![top, bottom]);
    round_trip(&mut s, cmd);
    assert_eq!(s.get(top).unwrap().strokes, vec![stroke(2.0), stroke(7.0), stroke(8.0)]);
}

#[test]
fn stale_stroke_edit_is_rejected_and_kept() {
    let mut s = stack_with_strokes();
    let top = s.id_at(0).unwrap();
    let cmd = Command::EditStrokes {
        removed: vec![RemovedStrokes {
            layer: top,
            strokes: vec![(0, stroke(99.0))],
        }],
        added: None,
    };
    assert!(cmd.apply(&mut s).is_err());

    let mut h = History::new();
    h.record(cmd);
    // Reverting inserts at position 0 which is valid, so force a stale redo instead.
    h.undo(&mut s).unwrap();
    assert_eq!(s.get(top).unwrap().strokes.len(), 4);
    s.get_mut(top).unwrap().strokes.clear();
    assert!(h.redo(&mut s).is_err());
    assert!(h.can_redo());
    assert!(!h.can_undo());
}

#[test]
fn failed_stroke_edit_leaves_every_layer_untouched() {
    let mut s = stack_with_strokes();
    let top = s.id_at(0).unwrap();
    let bottom = s.id_at(1).unwrap();
    let cmd = Command::EditStrokes {
        removed: vec![
            RemovedStrokes {
                layer: top,
                strokes: vec![(1, stroke(2.0))],
            },
            RemovedStrokes {
                layer: bottom,
                strokes: vec![(0, stroke(11.0))],
            },
        ],
        added: None,
    };
    let before = state(&s);
    assert!(cmd.apply(&mut s).is_err());
    assert_eq!(state(&s), before);

    // The appended tail still matches, but the top layer can no longer take the removed stroke back.
    s.get_mut(bottom).unwrap().strokes = vec![stroke(10.0), stroke(12.0), stroke(13.0)];
    let stale = Command::EditStrokes {
        removed: vec![RemovedStrokes {
            layer: top,
            strokes: vec![(5, stroke(2.0))],
        }],
        added: Some(AddedStrokes {
            layer: bottom,
            at: 2,
            strokes: vec![stroke(13.0)],
        }),
    };
    let before = state(&s);
    assert!(stale.revert(&mut s).is_err());
    assert_eq!(state(&s), before);
}

#[test]
fn unordered_removals_are_rejected() {
    let mut s = stack_with_strokes();
    let top = s.id_at(0).unwrap();
    let cmd = Command::EditStrokes {
        removed: vec![RemovedStrokes {
            layer: top,
            strokes: vec![(2, stroke(3.0)), (0, stroke(1.0))],
        }],
        added: None,
    };
    let before = state(&s);
    assert!(cmd.apply(&mut s).is_err());
    assert_eq!(state(&s), before);
}

#[test]
fn undo_redo_on_empty_history_is_noop() {
    let mut s = stack_with_strokes();
    let before = state(&s);
    let mut h = History::new();
    assert!(h.undo(&mut s).unwrap().is_none());
    assert!(h.redo(&mut s).unwrap().is_none());
    assert_eq!(state(&s), before);
}

#[test]
fn recording_clears_redo() {
    let mut s = stack_with_strokes();
    let mut h = History::new();
    let cmd = Command::MoveLayer { from: 0, to: 1 };
    cmd.apply(&mut s).unwrap();
    h.record(cmd);
    h.undo(&mut s).unwrap();
    assert_eq!(h.redo_len(), 1);

    let cmd = Command::MoveLayer { from: 1, to: 0 };
    cmd.apply(&mut s).unwrap();
    h.record(cmd);
    assert_eq!(h.redo_len(), 0);
    assert_eq!(h.undo_len(), 1);
}

#[test]
fn replay_guard_suppresses_recording() {
    let mut h = History::new();
    h.replaying = true;
    assert!(h.is_replaying());
    assert!(!h.record(Command::MoveLayer { from: 0, to: 1 }));
    assert_eq!(h.undo_len(), 0);
}
