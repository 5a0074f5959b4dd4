use super::*;
use crate::clock::{face::ClockTime, scene::render};

#[test]
fn svg_has_one_line_per_stroke() {
    let scene = render(ClockTime::new(3, 0, 0).unwrap(), 500).unwrap();
    let svg = SvgEmitter.emit(&scene).unwrap();
    assert_eq!(svg.matches("<line ").count(), 14);
    assert!(svg.contains(r#"width="500" height="500""#));
    assert!(svg.contains(r#"stroke-linecap="round""#));
    // minute hand at 3:00 ends straight above the centre
    assert!(svg.contains(r#"x1="250.000" y1="250.000" x2="250.000" y2="37.500" stroke-width="15.000""#));
}

#[test]
fn svg_puts_each_element_on_its_own_line() {
    let scene = render(ClockTime::new(9, 15, 0).unwrap(), 120).unwrap();
    let svg = SvgEmitter.emit(&scene).unwrap();
    let lines: Vec<&str> = svg.lines().collect();
    assert_eq!(lines.len(), 19);
    assert!(lines[1].starts_with("<svg "));
    assert!(lines[3..17].iter().all(|l| l.starts_with("<line ") && l.ends_with("/>")));
    assert_eq!(&lines[17..], ["</g>", "</svg>"]);
    assert!(svg.ends_with("</svg>\n"));
}

#[test]
fn svg_parses_with_usvg() {
    let scene = render(ClockTime::new(11, 59, 59).unwrap(), 64).unwrap();
    let svg = SvgEmitter.emit(&scene).unwrap();
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
    assert_eq!(tree.size().width(), 64.0);
}

#[test]
fn png_centre_is_opaque_black_and_corner_transparent() {
    let scene = render(ClockTime::new(3, 0, 0).unwrap(), 200).unwrap();
    let img = PngEmitter.emit(&scene).unwrap();
    assert_eq!((img.width, img.height), (200, 200));
    assert_eq!(img.rgba8.len(), 200 * 200 * 4);

    assert_eq!(img.pixel(100, 100), Some([0, 0, 0, 255]));
    // along the hour hand, due east
    assert_eq!(img.pixel(140, 100).map(|p| p[3]), Some(255));
    assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(img.pixel(200, 0), None);
}

#[test]
fn png_roundtrips_through_image() {
    let scene = render(ClockTime::new(8, 20, 0).unwrap(), 48).unwrap();
    let img = PngEmitter.emit(&scene).unwrap();

    let dir = std::path::PathBuf::from("target").join("emit_tests");
    let path = dir.join("clock.png");
    img.save_png(&path).unwrap();

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (48, 48));
    assert_eq!(decoded.into_raw(), img.rgba8);
}
