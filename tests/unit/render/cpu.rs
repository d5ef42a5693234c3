use super::*;
use crate::foundation::core::Rgba8;
use crate::model::stroke::{DrawingAttributes, Stroke, StylusPoint};
use crate::render::compositor::{FrameCompositor, FrameParams, LayerList};

const CANVAS: Canvas = Canvas {
    width: 32,
    height: 32,
};

fn horizontal_stroke(color: Rgba8) -> Stroke {
    let attrs = DrawingAttributes {
        color,
        width: 8.0,
        height: 8.0,
        ..DrawingAttributes::default()
    };
    Stroke::new(
        vec![
            StylusPoint::new(4.0, 16.0, 1.0),
            StylusPoint::new(28.0, 16.0, 1.0),
        ],
        attrs,
    )
    .unwrap()
}

fn layers(strokes: Vec<Stroke>, opacity: f64) -> LayerList {
    let mut l = Layer::new("a").with_opacity(opacity);
    l.strokes = strokes;
    vec![l].into()
}

fn alpha_at(frame: &FrameRGBA, x: u32, y: u32) -> u8 {
    frame.data[((y * frame.width + x) * 4 + 3) as usize]
}

#[test]
fn ink_covers_the_stroke_and_nothing_else() {
    let mut comp = FrameCompositor::default();
    let list = comp
        .compose(
            CANVAS,
            &layers(vec![horizontal_stroke(Rgba8::WHITE)], 1.0),
            FrameParams::default(),
            false,
        )
        .unwrap();
    let mut r = CpuRasterizer::default();
    let frame = r.rasterize(&list).unwrap();
    assert_eq!((frame.width, frame.height), (32, 32));
    assert!(frame.premultiplied);
    assert_eq!(alpha_at(&frame, 16, 16), 255);
    assert_eq!(alpha_at(&frame, 16, 2), 0);
    assert_eq!(alpha_at(&frame, 16, 30), 0);
}

#[test]
fn editing_frame_is_blank() {
    let mut comp = FrameCompositor::default();
    let list = comp
        .compose(
            CANVAS,
            &layers(vec![horizontal_stroke(Rgba8::WHITE)], 1.0),
            FrameParams::default(),
            true,
        )
        .unwrap();
    let frame = CpuRasterizer::default().rasterize(&list).unwrap();
    assert!(frame.is_blank());
}

#[test]
fn layer_opacity_scales_alpha() {
    let mut comp = FrameCompositor::default();
    let list = comp
        .compose(
            CANVAS,
            &layers(vec![horizontal_stroke(Rgba8::WHITE)], 0.5),
            FrameParams::default(),
            false,
        )
        .unwrap();
    let frame = CpuRasterizer::default().rasterize(&list).unwrap();
    let a = alpha_at(&frame, 16, 16);
    assert!((120..=135).contains(&a), "alpha {a}");
}

#[test]
fn same_command_list_is_not_rasterized_twice() {
    let mut comp = FrameCompositor::default();
    let ll = layers(vec![horizontal_stroke(Rgba8::WHITE)], 1.0);
    let a = comp.compose(CANVAS, &ll, FrameParams::default(), false).unwrap();
    let b = comp.compose(CANVAS, &ll, FrameParams::default(), false).unwrap();
    let mut r = CpuRasterizer::default();
    let fa = r.rasterize(&a).unwrap();
    let fb = r.rasterize(&b).unwrap();
    assert_eq!(fa.data, fb.data);
}

#[test]
fn background_is_composited_under_ink() {
    let mut comp = FrameCompositor::default();
    let list = comp
        .compose(
            CANVAS,
            &layers(vec![horizontal_stroke(Rgba8::new(255, 0, 0, 255))], 1.0),
            FrameParams::default(),
            false,
        )
        .unwrap();
    let mut r = CpuRasterizer::new(CpuRasterizerOpts::default().with_clear_rgba(Some([0, 0, 255, 255])));
    let frame = r.rasterize(&list).unwrap();
    let corner = &frame.data[0..4];
    assert_eq!(corner, &[0, 0, 255, 255]);
    let i = ((16 * 32 + 16) * 4) as usize;
    assert_eq!(&frame.data[i..i + 4], &[255, 0, 0, 255]);
}

#[test]
fn rasterize_layers_applies_transform() {
    let ll = layers(vec![horizontal_stroke(Rgba8::WHITE)], 1.0);
    let size = Canvas {
        width: 16,
        height: 16,
    };
    let mut r = CpuRasterizer::default();
    let frame = r
        .rasterize_layers(size, ll.iter(), Affine::scale(0.5))
        .unwrap();
    assert_eq!(frame.width, 16);
    assert_eq!(alpha_at(&frame, 8, 8), 255);
    assert_eq!(alpha_at(&frame, 8, 1), 0);
}

#[test]
fn to_straight_unpremultiplies() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 32, 128],
        premultiplied: true,
    };
    assert_eq!(frame.to_straight(), vec![128, 0, 64, 128]);
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let mut comp = FrameCompositor::default();
    let list = comp
        .compose(
            Canvas {
                width: 0,
                height: 10,
            },
            &layers(Vec::new(), 1.0),
            FrameParams::default(),
            false,
        )
        .unwrap();
    assert!(CpuRasterizer::default().rasterize(&list).is_err());
}
