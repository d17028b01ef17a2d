//! Snapshot rendering.
//!
//! A snapshot is a small human-readable image card summarizing one
//! reading: machine id, temperature, rpm, vibration, and the render
//! time. It is produced in memory, streamed to the relay, and dropped.
//! Consumers treat the bytes as an opaque blob, so the artifact is an
//! uncompressed binary PPM (P6) and needs no codec.

use chrono::{DateTime, Utc};

use plantsight_common::Reading;

/// Rendered snapshot artifact.
///
/// Keyed by `(machine_id, generated_at)`; ephemeral, never retained by
/// the publisher after transmission.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Machine the snapshot describes.
    pub machine_id: String,
    /// When the snapshot was rendered.
    pub generated_at: DateTime<Utc>,
    data: Vec<u8>,
}

impl Snapshot {
    /// The encoded image bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// MIME type of the encoded image.
    pub fn mime_type(&self) -> &'static str {
        "image/x-portable-pixmap"
    }
}

/// Renders readings onto a fixed-size white canvas with a built-in
/// bitmap font.
///
/// The layout is deterministic (five fixed lines); the content is not,
/// because the render time is embedded. Rendering cannot fail: text is
/// uppercased to match the built-in glyph set and any character still
/// missing a glyph is drawn as a filled block instead.
pub struct SnapshotRenderer {
    width: usize,
    height: usize,
}

const TEXT_SCALE: usize = 2;
const MARGIN_X: usize = 10;
const FIRST_LINE_Y: usize = 20;
const LINE_HEIGHT: usize = 30;

impl SnapshotRenderer {
    /// Create a renderer for the given canvas size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Render one reading into a snapshot, stamped with the current time.
    pub fn render(&self, reading: &Reading) -> Snapshot {
        let generated_at = Utc::now();
        self.render_at(reading, generated_at)
    }

    /// Render with an explicit render time (deterministic in tests).
    pub fn render_at(&self, reading: &Reading, generated_at: DateTime<Utc>) -> Snapshot {
        let mut canvas = Canvas::new(self.width, self.height);

        let lines = [
            format!("Machine: {}", reading.machine_id),
            format!("Temp: {:.1} C", reading.temperature),
            format!("RPM: {}", reading.rpm),
            format!("Vibration: {:.2}", reading.vibration),
            format!("Time: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        ];

        for (i, line) in lines.iter().enumerate() {
            canvas.draw_text(MARGIN_X, FIRST_LINE_Y + i * LINE_HEIGHT, line);
        }

        Snapshot {
            machine_id: reading.machine_id.clone(),
            generated_at,
            data: canvas.into_ppm(),
        }
    }
}

/// White RGB canvas with black bitmap text.
struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFF; width * height * 3],
        }
    }

    /// Draw a line of text with its top-left corner at (x, y).
    ///
    /// Text is uppercased before glyph lookup. Pixels outside the canvas
    /// are clipped.
    fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        let advance = (font::GLYPH_WIDTH + 1) * TEXT_SCALE;
        for (i, ch) in text.to_ascii_uppercase().chars().enumerate() {
            self.draw_glyph(x + i * advance, y, font::glyph(ch));
        }
    }

    fn draw_glyph(&mut self, x: usize, y: usize, rows: [u8; font::GLYPH_HEIGHT]) {
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..font::GLYPH_WIDTH {
                if bits & (0x10 >> col) != 0 {
                    self.fill_block(x + col * TEXT_SCALE, y + row * TEXT_SCALE);
                }
            }
        }
    }

    fn fill_block(&mut self, x: usize, y: usize) {
        for dy in 0..TEXT_SCALE {
            for dx in 0..TEXT_SCALE {
                self.set_pixel(x + dx, y + dy);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = (y * self.width + x) * 3;
        self.pixels[offset] = 0;
        self.pixels[offset + 1] = 0;
        self.pixels[offset + 2] = 0;
    }

    fn into_ppm(self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut data = Vec::with_capacity(header.len() + self.pixels.len());
        data.extend_from_slice(header.as_bytes());
        data.extend_from_slice(&self.pixels);
        data
    }
}

/// Built-in 5x7 bitmap font.
///
/// Each glyph is seven rows of five bits, leftmost pixel in bit 4.
mod font {
    pub const GLYPH_WIDTH: usize = 5;
    pub const GLYPH_HEIGHT: usize = 7;

    /// Drawn for characters without a glyph, so rendering degrades
    /// instead of failing.
    pub const FALLBACK: [u8; GLYPH_HEIGHT] = [0x1F; GLYPH_HEIGHT];

    pub fn glyph(ch: char) -> [u8; GLYPH_HEIGHT] {
        match ch {
            ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
            '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
            '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
            '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
            '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
            '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
            '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
            '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
            '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
            '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
            '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
            'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
            'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
            'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
            'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
            'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
            'G' => [0x0E, 0x11, 0x10, 0x13, 0x11, 0x11, 0x0F],
            'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
            'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
            'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
            'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
            'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
            'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
            'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
            'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
            'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
            'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
            'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
            'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
            'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
            'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
            'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
            'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
            _ => FALLBACK,
        }
    }
}
