use super::*;
use crate::foundation::core::Rgba8;
use crate::model::stroke::{DrawingAttributes, StylusPoint, StylusTip};

fn sample() -> Vec<Stroke> {
    let attrs = DrawingAttributes {
        color: Rgba8::new(10, 20, 30, 40),
        width: 3.5,
        height: 7.0,
        tip: StylusTip::Square,
        highlighter: true,
        ..DrawingAttributes::default()
    };
    vec![
        Stroke::new(
            vec![
                StylusPoint::new(1.25, 2.5, 0.75),
                StylusPoint::new(3.0, 4.0, 0.1),
            ],
            attrs,
        )
        .unwrap(),
        Stroke::new(vec![StylusPoint::new(9.0, 9.0, 0.5)], DrawingAttributes::default()).unwrap(),
    ]
}

#[test]
fn write_then_read_preserves_geometry_and_style() {
    let file = StrokeFile::new(sample());
    let mut buf = Vec::new();
    file.to_writer(&mut buf).unwrap();
    let back = StrokeFile::from_reader(buf.as_slice()).unwrap();
    assert_eq!(back, file);

    let mut again = Vec::new();
    back.to_writer(&mut again).unwrap();
    assert_eq!(buf, again);
}

#[test]
fn structurally_invalid_files_are_rejected() {
    assert!(StrokeFile::from_reader(&b"[]"[..]).is_err());
    assert!(StrokeFile::from_reader(&br#"{"version":2,"strokes":[]}"#[..]).is_err());
    // A stroke without points fails stroke validation.
    let empty = br#"{"version":1,"strokes":[{"points":[],"attributes":{"color":{"r":0,"g":0,"b":0,"a":255},"width":1.0,"height":1.0}}]}"#;
    assert!(StrokeFile::from_reader(&empty[..]).is_err());
    // Non-positive width fails too.
    let thin = br#"{"version":1,"strokes":[{"points":[{"x":0,"y":0}],"attributes":{"color":{"r":0,"g":0,"b":0,"a":255},"width":0.0,"height":1.0}}]}"#;
    assert!(StrokeFile::from_reader(&thin[..]).is_err());
}

#[test]
fn missing_pressure_defaults_to_half() {
    let json = br#"{"version":1,"strokes":[{"points":[{"x":1,"y":2}],"attributes":{"color":{"r":0,"g":0,"b":0,"a":255},"width":1.0,"height":1.0}}]}"#;
    let file = StrokeFile::from_reader(&json[..]).unwrap();
    assert_eq!(file.strokes[0].points()[0].pressure, 0.5);
}
