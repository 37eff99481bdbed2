//! Bitmap font and rectangle primitives for the framebuffer
//!
//! Glyphs are 3×5 cells drawn at `SCALE`, so a character is 6×10 pixels with
//! a 2-pixel gap. Lowercase letters render as uppercase; anything without a
//! glyph renders as '?'.

use super::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const SCALE: i32 = 2;
pub const GLYPH_W: i32 = 3 * SCALE;
pub const GLYPH_H: i32 = 5 * SCALE;
pub const ADVANCE: i32 = GLYPH_W + SCALE;

/// Rows top to bottom, bit 2 = left column
fn glyph(ch: char) -> [u8; 5] {
    match ch.to_ascii_uppercase() {
        '0' => [7, 5, 5, 5, 7],
        '1' => [2, 6, 2, 2, 7],
        '2' => [7, 1, 7, 4, 7],
        '3' => [7, 1, 7, 1, 7],
        '4' => [5, 5, 7, 1, 1],
        '5' => [7, 4, 7, 1, 7],
        '6' => [7, 4, 7, 5, 7],
        '7' => [7, 1, 1, 2, 2],
        '8' => [7, 5, 7, 5, 7],
        '9' => [7, 5, 7, 1, 7],
        'A' => [2, 5, 7, 5, 5],
        'B' => [6, 5, 6, 5, 6],
        'C' => [3, 4, 4, 4, 3],
        'D' => [6, 5, 5, 5, 6],
        'E' => [7, 4, 6, 4, 7],
        'F' => [7, 4, 6, 4, 4],
        'G' => [3, 4, 5, 5, 3],
        'H' => [5, 5, 7, 5, 5],
        'I' => [7, 2, 2, 2, 7],
        'J' => [1, 1, 1, 5, 2],
        'K' => [5, 5, 6, 5, 5],
        'L' => [4, 4, 4, 4, 7],
        'M' => [5, 7, 7, 5, 5],
        'N' => [6, 5, 5, 5, 5],
        'O' => [2, 5, 5, 5, 2],
        'P' => [6, 5, 6, 4, 4],
        'Q' => [2, 5, 5, 6, 3],
        'R' => [6, 5, 6, 5, 5],
        'S' => [3, 4, 2, 1, 6],
        'T' => [7, 2, 2, 2, 2],
        'U' => [5, 5, 5, 5, 7],
        'V' => [5, 5, 5, 5, 2],
        'W' => [5, 5, 7, 7, 5],
        'X' => [5, 5, 2, 5, 5],
        'Y' => [5, 5, 2, 2, 2],
        'Z' => [7, 1, 2, 4, 7],
        ' ' => [0, 0, 0, 0, 0],
        ':' => [0, 2, 0, 2, 0],
        '-' => [0, 0, 7, 0, 0],
        '.' => [0, 0, 0, 0, 2],
        '/' => [1, 1, 2, 4, 4],
        '>' => [4, 2, 1, 2, 4],
        '!' => [2, 2, 2, 0, 2],
        '(' => [1, 2, 2, 2, 1],
        ')' => [4, 2, 2, 2, 4],
        _ => [7, 1, 2, 0, 2],
    }
}

/// Pixel width of `text` as drawn by `draw_text`
pub fn text_width(text: &str) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        n * ADVANCE - SCALE
    }
}

pub fn draw_text(fb: &mut [u32], x: i32, y: i32, text: &str, color: u32) {
    let mut cx = x;
    for ch in text.chars() {
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..3 {
                if bits & (4 >> col) != 0 {
                    draw_rect(
                        fb,
                        cx + col * SCALE,
                        y + row as i32 * SCALE,
                        SCALE,
                        SCALE,
                        color,
                    );
                }
            }
        }
        cx += ADVANCE;
    }
}

/// Text with a 1-pixel dark drop shadow
pub fn draw_text_shadow(fb: &mut [u32], x: i32, y: i32, text: &str, color: u32) {
    draw_text(fb, x + 1, y + 1, text, 0xFF000000);
    draw_text(fb, x, y, text, color);
}

/// Horizontally centred text
pub fn draw_text_centered(fb: &mut [u32], y: i32, text: &str, color: u32) {
    let x = (SCREEN_WIDTH as i32 - text_width(text)) / 2;
    draw_text_shadow(fb, x, y, text, color);
}

/// Filled rectangle, clipped to the screen
pub fn draw_rect(fb: &mut [u32], x: i32, y: i32, w: i32, h: i32, color: u32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(SCREEN_WIDTH as i32);
    let y1 = (y + h).min(SCREEN_HEIGHT as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    for py in y0..y1 {
        let row = py as usize * SCREEN_WIDTH;
        fb[row + x0 as usize..row + x1 as usize].fill(color);
    }
}

/// 1-pixel rectangle outline, clipped to the screen
pub fn draw_rect_outline(fb: &mut [u32], x: i32, y: i32, w: i32, h: i32, color: u32) {
    draw_rect(fb, x, y, w, 1, color);
    draw_rect(fb, x, y + h - 1, w, 1, color);
    draw_rect(fb, x, y, 1, h, color);
    draw_rect(fb, x + w - 1, y, 1, h, color);
}
