//! Terminal rendering.
//!
//! The drawing surface is a true-color framebuffer with two vertical pixels
//! per character cell, painted with the upper-half-block glyph: the glyph's
//! foreground is the upper pixel and the cell background is the lower pixel.
//! Each frame is composed into a single string and written with one flush to
//! avoid tearing.

use std::io::{self, Write};

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Scale brightness by a factor in [0, 1].
    pub fn dimmed(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
        }
    }

    /// Componentwise max, used so glow halos never darken a particle core.
    fn max(self, other: Rgb) -> Rgb {
        Rgb {
            r: self.r.max(other.r),
            g: self.g.max(other.g),
            b: self.b.max(other.b),
        }
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb {
        r: ((r1 + m) * 255.0).round() as u8,
        g: ((g1 + m) * 255.0).round() as u8,
        b: ((b1 + m) * 255.0).round() as u8,
    }
}

/// Something particles can be drawn onto. Coordinates are in pixel units
/// (terminal cells are two pixels tall).
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self);
    fn plot(&mut self, x: f32, y: f32, radius: f32, color: Rgb, glow: bool);
}

/// Upper-half-block ANSI framebuffer sized to the terminal, reserving the
/// bottom row for a status line.
pub struct TerminalSurface {
    cols: u16,
    pixel_width: usize,
    pixel_height: usize,
    buffer: Vec<Rgb>,
    status: String,
}

impl TerminalSurface {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut surface = Self {
            cols: 0,
            pixel_width: 0,
            pixel_height: 0,
            buffer: Vec::new(),
            status: String::new(),
        };
        surface.resize(cols, rows);
        surface
    }

    /// Reallocate the framebuffer for a new terminal size. Existing pixel
    /// contents are discarded; the next frame repaints everything.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.pixel_width = cols as usize;
        self.pixel_height = rows.saturating_sub(1) as usize * 2;
        self.buffer = vec![Rgb::BLACK; self.pixel_width * self.pixel_height];
    }

    /// Text for the reserved bottom row, drawn on the next `present`.
    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if x < 0 || y < 0 || x >= self.pixel_width as i32 || y >= self.pixel_height as i32 {
            return;
        }
        let idx = y as usize * self.pixel_width + x as usize;
        self.buffer[idx] = self.buffer[idx].max(color);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb) {
        let r = radius.max(0.5);
        let ri = r.ceil() as i32;
        let x0 = cx.round() as i32;
        let y0 = cy.round() as i32;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if (dx * dx + dy * dy) as f32 <= r * r {
                    self.set_pixel(x0 + dx, y0 + dy, color);
                }
            }
        }
    }

    /// Compose the frame into one ANSI string. Rows are pixel pairs; colors
    /// are emitted only when they change from the previous cell.
    pub fn compose(&self) -> String {
        let mut out = String::with_capacity(self.buffer.len() * 4 + 64);
        out.push_str("\x1b[H");

        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        for row in 0..self.pixel_height / 2 {
            if row > 0 {
                out.push_str("\r\n");
            }
            for col in 0..self.pixel_width {
                let upper = self.buffer[(row * 2) * self.pixel_width + col];
                let lower = self.buffer[(row * 2 + 1) * self.pixel_width + col];
                if last_fg != Some(upper) {
                    out.push_str(&format!("\x1b[38;2;{};{};{}m", upper.r, upper.g, upper.b));
                    last_fg = Some(upper);
                }
                if last_bg != Some(lower) {
                    out.push_str(&format!("\x1b[48;2;{};{};{}m", lower.r, lower.g, lower.b));
                    last_bg = Some(lower);
                }
                out.push('▀');
            }
        }

        // Status line on the reserved bottom row.
        out.push_str("\x1b[0m");
        let status_row = self.pixel_height / 2 + 1;
        out.push_str(&format!("\x1b[{};1H\x1b[2K", status_row));
        let max = self.cols as usize;
        if self.status.chars().count() > max {
            out.extend(self.status.chars().take(max));
        } else {
            out.push_str(&self.status);
        }
        out
    }

    /// Write the composed frame to stdout with a single flush.
    pub fn present(&self) -> io::Result<()> {
        let frame = self.compose();
        let mut stdout = io::stdout().lock();
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f32 {
        self.pixel_width as f32
    }

    fn height(&self) -> f32 {
        self.pixel_height as f32
    }

    fn clear(&mut self) {
        self.buffer.fill(Rgb::BLACK);
    }

    fn plot(&mut self, x: f32, y: f32, radius: f32, color: Rgb, glow: bool) {
        if glow {
            self.fill_circle(x, y, radius * 3.0, color.dimmed(0.25));
        }
        self.fill_circle(x, y, radius, color);
    }
}
