//! Tests for the brush and line tools.

use image::{GrayImage, Luma, Rgb, RgbImage};

use super::{click, drag, session, white_session};
use crate::mask::{ImageBuffer, MASK_OFF, MASK_ON, MaskBuffer, MaskColor};
use crate::message::InputEvent;
use crate::model::{Tool, ToolState};
use crate::session::{EditorSession, Outcome};

#[test]
fn test_brush_click_stamps_disc_and_undo_restores() {
    let mut s = session(100, 100);
    s.set_brush_size(10);
    click(&mut s, 50.0, 50.0);

    let on = s.mask().count_on();
    assert!((300..=330).contains(&on), "disc area {}", on);
    assert_eq!(s.mask().get(50, 50), MASK_ON);
    assert_eq!(s.mask().get(50, 61), MASK_OFF);
    assert_eq!(s.state(), ToolState::Idle);

    assert_eq!(s.undo(), Outcome::Redraw);
    assert_eq!(s.mask().count_on(), 0);
}

#[test]
fn test_brush_drag_is_continuous_and_one_undo_unit() {
    let mut s = session(100, 100);
    s.set_brush_size(2);
    // Fast pointer: large jumps between samples
    drag(&mut s, &[(10.0, 50.0), (40.0, 50.0), (90.0, 50.0)]);

    for x in 10..=90 {
        assert_eq!(s.mask().get(x, 50), MASK_ON, "gap at x = {}", x);
    }
    assert_eq!(s.history().undo_count(), 1);

    s.undo();
    assert_eq!(s.mask().count_on(), 0);
}

#[test]
fn test_line_strokes_once_on_release() {
    let mut s = session(100, 100);
    s.set_tool(Tool::Line);
    s.set_brush_size(2);

    s.handle(InputEvent::PointerDown { x: 10.0, y: 10.0 });
    s.handle(InputEvent::PointerMove { x: 50.0, y: 80.0 });
    assert_eq!(s.mask().count_on(), 0, "line preview must not touch the mask");
    assert!(matches!(s.state(), ToolState::Drawing(_)));

    s.handle(InputEvent::PointerUp { x: 90.0, y: 10.0 });
    assert_eq!(s.mask().get(50, 10), MASK_ON);
    assert_eq!(s.mask().get(50, 40), MASK_OFF);
    assert_eq!(s.history().undo_count(), 1);
    assert_eq!(s.state(), ToolState::Idle);
}

#[test]
fn test_black_brush_erases() {
    let mut s = white_session(60, 60);
    s.set_brush_color(MaskColor::Black);
    click(&mut s, 30.0, 30.0);
    assert_eq!(s.mask().get(30, 30), MASK_OFF);
    assert_eq!(s.mask().get(0, 0), MASK_ON);
    assert!(s.mask().is_binary());
}

#[test]
fn test_pointer_down_outside_image_is_ignored() {
    // 100x50 image on a 100x100 canvas sits 25 px below the top edge
    let image = ImageBuffer::from_rgb(RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]))).unwrap();
    let mut s = EditorSession::new(image, None).unwrap();
    s.resize_canvas(100, 100);

    let outcome = s.handle(InputEvent::PointerDown { x: 50.0, y: 10.0 });
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(s.state(), ToolState::Idle);
    assert_eq!(s.history().undo_count(), 0);

    click(&mut s, 50.0, 50.0);
    assert_eq!(s.mask().get(50, 25), MASK_ON);
}

#[test]
fn test_move_outside_while_drawing_is_ignored() {
    let image = ImageBuffer::from_rgb(RgbImage::from_pixel(100, 50, Rgb([0, 0, 0]))).unwrap();
    let mut s = EditorSession::new(image, None).unwrap();
    s.resize_canvas(100, 100);
    s.set_brush_size(1);

    s.handle(InputEvent::PointerDown { x: 10.0, y: 50.0 });
    let before = s.mask().count_on();
    let outcome = s.handle(InputEvent::PointerMove { x: 90.0, y: 5.0 });
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(s.mask().count_on(), before);

    s.handle(InputEvent::PointerUp { x: 90.0, y: 5.0 });
    assert_eq!(s.state(), ToolState::Idle);
}

#[test]
fn test_brush_size_is_clamped() {
    let mut s = session(10, 10);
    s.set_brush_size(0);
    assert_eq!(s.settings().brush_size, 1);
    s.set_brush_size(500);
    assert_eq!(s.settings().brush_size, 50);
}

#[test]
fn test_flood_fill_at_stops_at_wall() {
    let mut gray = GrayImage::new(100, 100);
    for y in 0..100 {
        gray.put_pixel(50, y, Luma([255]));
    }
    let image = ImageBuffer::from_rgb(RgbImage::new(100, 100)).unwrap();
    let mask = MaskBuffer::from_gray(gray, 100, 100).unwrap();
    let mut s = EditorSession::new(image, Some(mask)).unwrap();
    s.resize_canvas(100, 100);

    assert_eq!(s.flood_fill_at(10.0, 10.0), Outcome::Redraw);
    assert_eq!(s.mask().count_on(), 50 * 100 + 100);
    assert_eq!(s.mask().get(75, 75), MASK_OFF);
    assert_eq!(s.history().undo_count(), 1);

    // Seed already the brush colour: nothing to do, nothing recorded
    assert_eq!(s.flood_fill_at(10.0, 10.0), Outcome::Unchanged);
    assert_eq!(s.history().undo_count(), 1);
}

#[test]
fn test_invert_twice_is_identity() {
    let mut s = session(40, 40);
    click(&mut s, 20.0, 20.0);
    let original = s.mask().clone();

    s.invert();
    assert_eq!(s.mask().count_on(), 1600 - original.count_on());
    s.invert();
    assert_eq!(s.mask(), &original);
}
