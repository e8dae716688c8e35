//! Scenario tests for the editing session.
//!
//! These drive [`EditorSession`] through the same event API a host uses,
//! on canvases sized so view and model coordinates coincide unless a test
//! says otherwise.

mod painting_tests;

use image::{GrayImage, Luma, Rgb, RgbImage};

use super::EditorSession;
use crate::mask::MaskBuffer;
use crate::message::InputEvent;

/// Session on a uniform grey image with a blank mask, laid out 1:1.
fn session(width: u32, height: u32) -> EditorSession {
    let image = crate::mask::ImageBuffer::from_rgb(RgbImage::from_pixel(
        width,
        height,
        Rgb([50, 50, 50]),
    ))
    .unwrap();
    let mut session = EditorSession::new(image, None).unwrap();
    session.resize_canvas(width, height);
    session
}

/// Session whose mask is entirely foreground.
fn white_session(width: u32, height: u32) -> EditorSession {
    let image = crate::mask::ImageBuffer::from_rgb(RgbImage::new(width, height)).unwrap();
    let mask =
        MaskBuffer::from_gray(GrayImage::from_pixel(width, height, Luma([255])), width, height)
            .unwrap();
    let mut session = EditorSession::new(image, Some(mask)).unwrap();
    session.resize_canvas(width, height);
    session
}

fn click(session: &mut EditorSession, x: f32, y: f32) {
    session.handle(InputEvent::PointerDown { x, y });
    session.handle(InputEvent::PointerUp { x, y });
}

fn drag(session: &mut EditorSession, path: &[(f32, f32)]) {
    let Some((&(x0, y0), rest)) = path.split_first() else {
        return;
    };
    session.handle(InputEvent::PointerDown { x: x0, y: y0 });
    for &(x, y) in rest {
        session.handle(InputEvent::PointerMove { x, y });
    }
    let &(x1, y1) = path.last().unwrap();
    session.handle(InputEvent::PointerUp { x: x1, y: y1 });
}
