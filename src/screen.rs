use std::io::Write;

pub type Rgb = (u8, u8, u8);

/// hsl(h, 100%, 50%) reduced to the hue wheel, which is the only slice of
/// HSL space the effects use.
pub fn hue_to_rgb(hue: f32) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

/// Truecolor framebuffer in half-block pixels: one terminal cell holds two
/// vertically stacked pixels, so height is twice the terminal row count.
pub struct Screen {
    width: usize,
    height: usize,
    pixels: Vec<(f32, f32, f32)>,
}

impl Screen {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![(0.0, 0.0, 0.0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn copy_from(&mut self, other: &Screen) {
        self.pixels.copy_from_slice(&other.pixels);
    }

    pub fn set(&mut self, x: f32, y: f32, color: Rgb) {
        self.blend(x, y, color, 1.0);
    }

    /// Mix `color` into the pixel under (x, y) with weight `alpha`.
    /// Out-of-surface coordinates are silently dropped.
    pub fn blend(&mut self, x: f32, y: f32, color: Rgb, alpha: f32) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        self.plot(x as i64, y as i64, color, alpha);
    }

    fn plot(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = &mut self.pixels[y as usize * self.width + x as usize];
        pixel.0 = pixel.0 * (1.0 - alpha) + color.0 as f32 * alpha;
        pixel.1 = pixel.1 * (1.0 - alpha) + color.1 as f32 * alpha;
        pixel.2 = pixel.2 * (1.0 - alpha) + color.2 as f32 * alpha;
    }

    /// Canvas-style rectangle fill, clipped to the surface.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let x0 = x.max(0.0) as usize;
        let y0 = y.max(0.0) as usize;
        let x1 = ((x + w).max(0.0) as usize).min(self.width);
        let y1 = ((y + h).max(0.0) as usize).min(self.height);
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.pixels[yy * self.width + xx] =
                    (color.0 as f32, color.1 as f32, color.2 as f32);
            }
        }
    }

    /// Bresenham segment from (x0, y0) to (x1, y1), alpha-blended per pixel.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32) {
        let (mut cx, mut cy) = (x0.round() as i64, y0.round() as i64);
        let (ex, ey) = (x1.round() as i64, y1.round() as i64);

        let dx = (ex - cx).abs();
        let dy = -(ey - cy).abs();
        let sx = if cx < ex { 1 } else { -1 };
        let sy = if cy < ey { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(cx, cy, color, alpha);
            if cx == ex && cy == ey {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                err += dx;
                cy += sy;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> (f32, f32, f32) {
        self.pixels[y * self.width + x]
    }

    /// Emit the frame as ANSI half-blocks: background color carries the top
    /// pixel, foreground the bottom, and color codes are only written when
    /// they change from the previous cell.
    pub fn write_half_blocks(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        out.clear();
        out.extend_from_slice(b"\x1b[H");

        let mut prev_top_color: Rgb = (255, 255, 255);
        let mut prev_bot_color: Rgb = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top_color = quantize(self.pixels[top_idx]);
                let bot_color = quantize(self.pixels[bot_idx]);

                if top_color != prev_top_color {
                    write!(
                        out,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        out,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                out.extend_from_slice("▄".as_bytes());
            }
            out.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < self.height {
                out.extend_from_slice(b"\r\n");
            }
        }

        Ok(())
    }
}

fn quantize(pixel: (f32, f32, f32)) -> Rgb {
    (
        pixel.0.round().clamp(0.0, 255.0) as u8,
        pixel.1.round().clamp(0.0, 255.0) as u8,
        pixel.2.round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue_to_rgb(0.0), (255, 0, 0));
        assert_eq!(hue_to_rgb(120.0), (0, 255, 0));
        assert_eq!(hue_to_rgb(240.0), (0, 0, 255));
        assert_eq!(hue_to_rgb(360.0), (255, 0, 0));
    }

    #[test]
    fn line_touches_both_endpoints() {
        let mut screen = Screen::new(20, 20);
        screen.line(2.0, 3.0, 10.0, 15.0, (255, 0, 0), 1.0);
        assert_eq!(screen.pixel(2, 3), (255.0, 0.0, 0.0));
        assert_eq!(screen.pixel(10, 15), (255.0, 0.0, 0.0));
    }

    #[test]
    fn drawing_off_surface_is_a_no_op() {
        let mut screen = Screen::new(8, 8);
        screen.set(-1.0, 4.0, (255, 255, 255));
        screen.set(4.0, 900.0, (255, 255, 255));
        screen.line(-50.0, -50.0, 100.0, 100.0, (10, 20, 30), 1.0);
        // The on-surface stretch of the diagonal still lands.
        assert_eq!(screen.pixel(0, 4), (0.0, 0.0, 0.0));
        assert_eq!(screen.pixel(4, 4), (10.0, 20.0, 30.0));
    }

    #[test]
    fn blend_mixes_toward_color() {
        let mut screen = Screen::new(4, 4);
        screen.fill_rect(0.0, 0.0, 4.0, 4.0, (100, 100, 100));
        screen.blend(1.0, 1.0, (200, 200, 200), 0.5);
        assert_eq!(screen.pixel(1, 1), (150.0, 150.0, 150.0));
    }

    #[test]
    fn copy_from_restores_backdrop() {
        let mut backdrop = Screen::new(6, 6);
        backdrop.fill_rect(0.0, 0.0, 6.0, 6.0, (1, 2, 3));
        let mut screen = Screen::new(6, 6);
        screen.set(3.0, 3.0, (255, 255, 255));
        screen.copy_from(&backdrop);
        assert_eq!(screen.pixel(3, 3), (1.0, 2.0, 3.0));
    }
}
