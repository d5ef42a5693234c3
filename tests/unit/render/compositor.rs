use super::*;
use crate::foundation::core::Rgba8;
use crate::foundation::error::InkError;
use crate::model::stroke::{DrawingAttributes, StylusPoint};

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 64,
};

fn line(n: usize, y: f32, attrs: DrawingAttributes) -> Stroke {
    let pts = (0..n)
        .map(|i| StylusPoint::new(2.0 + i as f32, y, 1.0))
        .collect();
    Stroke::new(pts, attrs).unwrap()
}

fn layer_with(name: &str, strokes: Vec<Stroke>) -> Layer {
    let mut l = Layer::new(name);
    l.strokes = strokes;
    l
}

fn params(length_pct: f64, offset_pct: f64) -> FrameParams {
    FrameParams {
        thickness: 100.0,
        length_pct,
        offset_pct,
    }
}

#[test]
fn highlighter_alpha_on_half_opacity_layer_is_about_a_fifth() {
    let hl = DrawingAttributes {
        color: Rgba8::new(255, 255, 0, 200),
        highlighter: true,
        ..DrawingAttributes::default()
    };
    let mut l1 = layer_with("top", vec![line(4, 10.0, DrawingAttributes::default())]);
    l1.visible = false;
    let l2 = layer_with("middle", vec![line(4, 20.0, hl)]).with_opacity(0.5);
    let mut l3 = layer_with("bottom", vec![line(4, 30.0, DrawingAttributes::default())]);
    l3.visible = false;
    let layers: LayerList = vec![l1, l2, l3].into();

    let mut c = FrameCompositor::default();
    let list = c.compose(CANVAS, &layers, FrameParams::default(), false).unwrap();
    assert_eq!(list.draws.len(), 1);
    assert!((list.draws[0].brush.color.a - 0.196).abs() < 1e-3);
}

#[test]
fn identical_snapshot_reuses_command_list() {
    let layers: LayerList = vec![layer_with("a", vec![line(5, 10.0, DrawingAttributes::default())])].into();
    let mut c = FrameCompositor::default();
    let a = c.compose(CANVAS, &layers, params(100.0, 0.0), false).unwrap();
    // Deep-equal but distinct layer list.
    let copy: LayerList = layers.iter().cloned().collect::<Vec<_>>().into();
    let b = c.compose(CANVAS, &copy, params(100.0, 0.0), false).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(c.stats().frames_built, 1);
    assert_eq!(c.stats().frames_reused, 1);

    let d = c.compose(CANVAS, &layers, params(50.0, 0.0), false).unwrap();
    assert!(!Arc::ptr_eq(&a, &d));
    assert_eq!(c.stats().frames_built, 2);
}

#[test]
fn failed_build_keeps_previous_frame_memoized() {
    let layers: LayerList = vec![layer_with("a", vec![line(5, 10.0, DrawingAttributes::default())])].into();
    let mut c = FrameCompositor::default();
    let good = c.compose(CANVAS, &layers, params(100.0, 0.0), false).unwrap();

    let overflow = FrameParams {
        thickness: 1e300,
        ..params(100.0, 0.0)
    };
    let err = c.compose(CANVAS, &layers, overflow, false).unwrap_err();
    assert!(matches!(err, InkError::Resource(_)), "{err}");
    assert_eq!(c.last_snapshot().unwrap().thickness, 100.0);
    assert_eq!(c.stats().frames_built, 1);

    let again = c.compose(CANVAS, &layers, params(100.0, 0.0), false).unwrap();
    assert!(Arc::ptr_eq(&good, &again));
    assert_eq!(c.stats().frames_reused, 1);
}

#[test]
fn memoization_can_be_disabled() {
    let layers: LayerList = vec![layer_with("a", vec![line(5, 10.0, DrawingAttributes::default())])].into();
    let mut c = FrameCompositor::new(CompositorOpts { memoize: false });
    let a = c.compose(CANVAS, &layers, FrameParams::default(), false).unwrap();
    let b = c.compose(CANVAS, &layers, FrameParams::default(), false).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    // Resources are still shared through the caches.
    assert!(Arc::ptr_eq(&a.draws[0].geometry, &b.draws[0].geometry));
}

#[test]
fn editing_mode_records_only_the_clear() {
    let layers: LayerList = vec![layer_with("a", vec![line(5, 10.0, DrawingAttributes::default())])].into();
    let mut c = FrameCompositor::default();
    let list = c.compose(CANVAS, &layers, FrameParams::default(), true).unwrap();
    assert!(list.draws.is_empty());
    assert_eq!(list.clear.a, 0.0);
}

#[test]
fn half_length_reveals_first_half_bottom_layer_first() {
    // Bottom layer (index 1) holds 50 points, top layer holds 50 points.
    let top = layer_with("top", vec![line(50, 10.0, DrawingAttributes::default())]);
    let bottom = layer_with("bottom", vec![line(50, 40.0, DrawingAttributes::default())]);
    let layers: LayerList = vec![top, bottom].into();

    let mut c = FrameCompositor::default();
    let list = c.compose(CANVAS, &layers, params(50.0, 0.0), false).unwrap();
    assert_eq!(list.draws.len(), 1);
    let g = &list.draws[0].geometry;
    assert_eq!(g.start().y, 40.0);
    assert_eq!(g.segments().len(), 49);
}

#[test]
fn slivers_below_two_points_are_skipped_but_dots_render() {
    let layers: LayerList = vec![layer_with(
        "a",
        vec![
            line(1, 5.0, DrawingAttributes::default()),
            line(10, 10.0, DrawingAttributes::default()),
        ],
    )]
    .into();
    let mut c = FrameCompositor::default();

    // T = 11; length 18% -> 1 point: only the single-point stroke is revealed.
    let list = c.compose(CANVAS, &layers, params(18.0, 0.0), false).unwrap();
    assert_eq!(list.draws.len(), 1);
    assert_eq!(list.draws[0].geometry.segments().len(), 1);

    // 2 points total: dot plus a one-point sliver of the second stroke, which is skipped.
    let list = c.compose(CANVAS, &layers, params(19.0, 0.0), false).unwrap();
    assert_eq!(list.draws.len(), 1);
}

#[test]
fn thickness_scales_radius_with_pressure() {
    let attrs = DrawingAttributes {
        width: 10.0,
        height: 10.0,
        ..DrawingAttributes::default()
    };
    let layers: LayerList = vec![layer_with("a", vec![line(3, 10.0, attrs)])].into();
    let mut c = FrameCompositor::default();
    let list = c
        .compose(
            CANVAS,
            &layers,
            FrameParams {
                thickness: 50.0,
                ..FrameParams::default()
            },
            false,
        )
        .unwrap();
    // width 10 * pressure 1.0 * 50%
    assert_eq!(list.draws[0].geometry.start().radius, 5.0);
}

#[test]
fn unused_resources_are_swept_between_frames() {
    let red = DrawingAttributes {
        color: Rgba8::new(255, 0, 0, 255),
        ..DrawingAttributes::default()
    };
    let a: LayerList = vec![layer_with("a", vec![line(5, 10.0, red)])].into();
    let b: LayerList = vec![layer_with("a", vec![line(5, 20.0, DrawingAttributes::default())])].into();
    let mut c = FrameCompositor::default();
    c.compose(CANVAS, &a, FrameParams::default(), false).unwrap();
    c.compose(CANVAS, &b, FrameParams::default(), false).unwrap();
    let stats = c.stats();
    assert_eq!(stats.geometry.evicted, 1);
    assert_eq!(stats.brushes.evicted, 1);
    assert_eq!(stats.styles.evicted, 0);
    assert_eq!(stats.geometry.retained, 1);
}

#[test]
fn hidden_layers_do_not_count_toward_total() {
    let mut hidden = layer_with("h", vec![line(7, 1.0, DrawingAttributes::default())]);
    hidden.visible = false;
    let shown = layer_with("s", vec![line(3, 1.0, DrawingAttributes::default())]);
    assert_eq!(total_visible_points(&[hidden, shown]), 3);
}
