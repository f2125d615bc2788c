/*!
The drawing surface. A `Canvas` owns a fixed-size RGBA pixel buffer plus
the current brush color and size, and implements every drawing command
and read-only predicate of the language. Coordinates handed to drawing
commands may land outside the buffer; writes there are silently clipped.

Errors raised here carry no source position. The interpreter attaches
the calling statement's position before surfacing them.
*/

use super::State;
use crate::error;
use crate::lang::Error;
use std::collections::VecDeque;

type Result<T> = std::result::Result<T, Error>;

/// One pixel, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const RED: Rgba = Rgba::opaque(255, 0, 0);
    pub const GREEN: Rgba = Rgba::opaque(0, 255, 0);
    pub const BLUE: Rgba = Rgba::opaque(0, 0, 255);
    pub const YELLOW: Rgba = Rgba::opaque(255, 255, 0);
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    const fn opaque(r: u8, g: u8, b: u8) -> Rgba {
        Rgba { r, g, b, a: 255 }
    }

    /// Resolves a color spec. Accepts a palette name (case-insensitive)
    /// or `#RRGGBB`/`#RRGGBBAA` hex. Surrounding double quotes are
    /// stripped so raw string lexemes also resolve.
    pub fn parse(spec: &str) -> Result<Rgba> {
        let spec = spec.trim().trim_matches('"');
        if let Some(hex) = spec.strip_prefix('#') {
            return Rgba::parse_hex(spec, hex);
        }
        match spec.to_ascii_lowercase().as_str() {
            "white" => Ok(Rgba::WHITE),
            "black" => Ok(Rgba::BLACK),
            "red" => Ok(Rgba::RED),
            "green" => Ok(Rgba::GREEN),
            "blue" => Ok(Rgba::BLUE),
            "yellow" => Ok(Rgba::YELLOW),
            "transparent" => Ok(Rgba::TRANSPARENT),
            _ => Err(error!(Runtime; "unknown color '{}'", spec)),
        }
    }

    fn parse_hex(spec: &str, hex: &str) -> Result<Rgba> {
        if !hex.is_ascii() {
            return Err(error!(Runtime; "invalid hex color '{}'", spec));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| error!(Runtime; "invalid hex color '{}'", spec))
        };
        match hex.len() {
            6 => Ok(Rgba {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            }),
            8 => Ok(Rgba {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(error!(Runtime; "invalid hex color '{}'", spec)),
        }
    }
}

pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<Rgba>,
    brush: Rgba,
    brush_size: i32,
}

impl Canvas {
    /// A white canvas with a black single-pixel brush.
    pub fn new(width: i32, height: i32) -> Result<Canvas> {
        if width <= 0 || height <= 0 {
            return Err(
                error!(Runtime; "canvas dimensions must be positive, got {}x{}", width, height),
            );
        }
        Ok(Canvas {
            width,
            height,
            pixels: vec![Rgba::WHITE; (width * height) as usize],
            brush: Rgba::BLACK,
            brush_size: 1,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Bounds-checked read, used by predicates and the image codec hooks.
    pub fn pixel(&self, x: i32, y: i32) -> Result<Rgba> {
        if !self.in_bounds(x, y) {
            return Err(error!(Runtime; "pixel ({}, {}) is outside the canvas", x, y));
        }
        Ok(self.pixels[(y * self.width + x) as usize])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(error!(Runtime; "pixel ({}, {}) is outside the canvas", x, y));
        }
        self.pixels[(y * self.width + x) as usize] = color;
        Ok(())
    }

    /// Clipping write. Out-of-bounds coordinates are a no-op.
    fn paint(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            self.pixels[(y * self.width + x) as usize] = self.brush;
        }
    }

    /// Stamps the brush square centered at (x, y). A transparent brush
    /// writes nothing.
    fn stamp(&mut self, x: i32, y: i32) {
        if self.brush.a == 0 {
            return;
        }
        let reach = self.brush_size / 2;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                self.paint(x + dx, y + dy);
            }
        }
    }

    fn ensure_direction(dx: i32, dy: i32) -> Result<()> {
        if (-1..=1).contains(&dx) && (-1..=1).contains(&dy) {
            Ok(())
        } else {
            Err(error!(Runtime; "invalid direction ({}, {})", dx, dy))
        }
    }

    pub fn set_color(&mut self, spec: &str) -> Result<()> {
        self.brush = Rgba::parse(spec)?;
        Ok(())
    }

    pub fn set_size(&mut self, size: i32) -> Result<()> {
        if size <= 0 {
            return Err(error!(Runtime; "brush size must be positive, got {}", size));
        }
        // Stamps are centered, so even sizes round down to odd.
        self.brush_size = if size % 2 == 0 { size - 1 } else { size };
        Ok(())
    }

    pub fn draw_line(&mut self, state: &mut State, dx: i32, dy: i32, length: i32) -> Result<()> {
        Canvas::ensure_direction(dx, dy)?;
        // The first stamp lands on the cursor itself.
        let mut x = state.cursor_x;
        let mut y = state.cursor_y;
        for _ in 0..length {
            self.stamp(x, y);
            x += dx;
            y += dy;
        }
        state.cursor_x = x;
        state.cursor_y = y;
        Ok(())
    }

    pub fn draw_rectangle(
        &mut self,
        state: &mut State,
        dx: i32,
        dy: i32,
        distance: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        // Unlike the line and circle, any (dx, dy) vector is a legal
        // offset to the new center, and non-positive dimensions draw
        // nothing; the cursor moves either way.
        let cx = state.cursor_x + dx * distance;
        let cy = state.cursor_y + dy * distance;
        if width > 0 && height > 0 {
            let left = cx - width / 2;
            let top = cy - height / 2;
            let right = left + width - 1;
            let bottom = top + height - 1;
            for x in left..=right {
                self.stamp(x, top);
                self.stamp(x, bottom);
            }
            for y in top..=bottom {
                self.stamp(left, y);
                self.stamp(right, y);
            }
        }
        state.cursor_x = cx;
        state.cursor_y = cy;
        Ok(())
    }

    pub fn draw_circle(&mut self, state: &mut State, dx: i32, dy: i32, radius: i32) -> Result<()> {
        Canvas::ensure_direction(dx, dy)?;
        if radius <= 0 {
            return Err(error!(Runtime; "circle radius must be positive, got {}", radius));
        }
        let cx = state.cursor_x + dx;
        let cy = state.cursor_y + dy;
        // One-pixel ring: stamp offsets whose distance falls in radius +/- 0.5.
        let r = radius as f64;
        for y in -radius..=radius {
            for x in -radius..=radius {
                let d = ((x * x + y * y) as f64).sqrt();
                if d >= r - 0.5 && d <= r + 0.5 {
                    self.stamp(cx + x, cy + y);
                }
            }
        }
        state.cursor_x = cx;
        state.cursor_y = cy;
        Ok(())
    }

    /// 4-connected flood fill from the cursor, replacing the region that
    /// shares the cursor's starting color. A cursor off the canvas, or a
    /// region already painted in the brush color, is a no-op.
    pub fn fill(&mut self, state: &State) -> Result<()> {
        if !self.in_bounds(state.cursor_x, state.cursor_y) {
            return Ok(());
        }
        let target = self.pixel(state.cursor_x, state.cursor_y)?;
        if target == self.brush {
            return Ok(());
        }
        let mut visited = vec![false; (self.width * self.height) as usize];
        let mut frontier = VecDeque::new();
        frontier.push_back((state.cursor_x, state.cursor_y));
        visited[(state.cursor_y * self.width + state.cursor_x) as usize] = true;
        while let Some((x, y)) = frontier.pop_front() {
            self.pixels[(y * self.width + x) as usize] = self.brush;
            for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                if !self.in_bounds(nx, ny) {
                    continue;
                }
                let index = (ny * self.width + nx) as usize;
                if !visited[index] && self.pixels[index] == target {
                    visited[index] = true;
                    frontier.push_back((nx, ny));
                }
            }
        }
        Ok(())
    }

    pub fn set_cursor(&self, state: &mut State, x: i32, y: i32) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(error!(Runtime; "cursor ({}, {}) is outside the canvas", x, y));
        }
        state.cursor_x = x;
        state.cursor_y = y;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::WHITE);
    }

    /// Comparison is on the resolved RGBA value, so "#FF0000" matches "Red".
    /// An unparseable spec is simply not a match.
    pub fn is_brush_color(&self, spec: &str) -> bool {
        Rgba::parse(spec).map_or(false, |c| c == self.brush)
    }

    pub fn is_brush_size(&self, size: i32) -> bool {
        self.brush_size == size
    }

    pub fn is_canvas_color(&self, spec: &str) -> bool {
        Rgba::parse(spec).map_or(false, |c| self.pixels.iter().all(|p| *p == c))
    }

    /// Counts matching pixels in the box spanned by the two corners.
    /// Either corner off the canvas makes the count 0.
    pub fn color_count(&self, spec: &str, x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
        let color = match Rgba::parse(spec) {
            Ok(c) => c,
            Err(_) => return 0,
        };
        if !self.in_bounds(x1, y1) || !self.in_bounds(x2, y2) {
            return 0;
        }
        let (left, right) = (x1.min(x2), x1.max(x2));
        let (top, bottom) = (y1.min(y2), y1.max(y2));
        let mut count = 0;
        for y in top..=bottom {
            for x in left..=right {
                if self.pixels[(y * self.width + x) as usize] == color {
                    count += 1;
                }
            }
        }
        count
    }

    /// Debug view: one letter per pixel, palette colors by initial,
    /// '.' for white, '#' for black, '?' for anything else.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(match self.pixels[(y * self.width + x) as usize] {
                    Rgba::WHITE => '.',
                    Rgba::BLACK => '#',
                    Rgba::RED => 'R',
                    Rgba::GREEN => 'G',
                    Rgba::BLUE => 'B',
                    Rgba::YELLOW => 'Y',
                    Rgba::TRANSPARENT => ' ',
                    _ => '?',
                });
            }
            out.push('\n');
        }
        out
    }

    /// The whole buffer as interleaved RGBA bytes, row-major.
    pub fn raw_rgba(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for p in self.pixels.iter() {
            raw.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        raw
    }

    pub fn load_raw(&mut self, raw: &[u8]) -> Result<()> {
        let expected = (self.width * self.height) as usize * 4;
        if raw.len() != expected {
            return Err(
                error!(Runtime; "pixel buffer has {} bytes, expected {}", raw.len(), expected),
            );
        }
        for (pixel, bytes) in self.pixels.iter_mut().zip(raw.chunks_exact(4)) {
            *pixel = Rgba {
                r: bytes[0],
                g: bytes[1],
                b: bytes[2],
                a: bytes[3],
            };
        }
        Ok(())
    }
}
