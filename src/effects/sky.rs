use super::{Effect, random};
use crate::screen::{Rgb, Screen};
use std::f32::consts::PI;
use std::io::{BufWriter, Stdout, Write};

const SKY_TOP: Rgb = (0x00, 0x0B, 0x27);
const SKY_BOTTOM: Rgb = (0x6C, 0x24, 0x84);
const GROUND: Rgb = (0x0C, 0x1D, 0x2D);
const STAR_GOLD: Rgb = (255, 215, 0);

pub const DEFAULT_STAR_COUNT: usize = 200;

// The wizard, as a small embedded pixel sprite.
const WIZARD_SPRITE: [&str; 14] = [
    "      ^      ",
    "     ^^^     ",
    "    ^^*^^    ",
    "   ^^^^^^^   ",
    "  ^^^^^^^^^  ",
    " ^^^^^^^^^^^ ",
    "    ooooo   *",
    "   wooooow  |",
    "   wwooww   |",
    "  rrwwwwrr  |",
    "  rrrwwrrr  |",
    " rrrrrrrrrr |",
    " rrrrrrrrrr |",
    "rrrrrrrrrrrr|",
];

fn sprite_color(c: char) -> Option<Rgb> {
    match c {
        '^' => Some((96, 56, 160)),
        '*' => Some((255, 215, 0)),
        'o' => Some((232, 190, 152)),
        'w' => Some((226, 226, 232)),
        'r' => Some((58, 66, 142)),
        '|' => Some((110, 78, 48)),
        _ => None,
    }
}

fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    (
        (a.0 as f32 + (b.0 as f32 - a.0 as f32) * t) as u8,
        (a.1 as f32 + (b.1 as f32 - a.1 as f32) * t) as u8,
        (a.2 as f32 + (b.2 as f32 - a.2 as f32) * t) as u8,
    )
}

/// A single star mark: placed once, never updated.
struct Star {
    x: f32,
    y: f32,
    size: f32,
}

impl Star {
    fn scatter(count: usize, width: f32, height: f32) -> Vec<Star> {
        (0..count)
            .map(|_| Star {
                x: random(25.0, width - 50.0),
                y: random(25.0, height * 0.4),
                size: random(1.0, 5.0),
            })
            .collect()
    }

    /// Six angular samples spaced 4π/5 apart, alternating between the full
    /// and half radius, which traces the outline of a five-point star.
    fn points(&self) -> [(f32, f32); 6] {
        let mut points = [(0.0, 0.0); 6];
        for (i, point) in points.iter_mut().enumerate() {
            let angle = i as f32 * (4.0 * PI) / 5.0 - PI / 10.0;
            let radius = if i % 2 == 0 { self.size } else { self.size / 2.0 };
            *point = (
                self.x + angle.cos() * radius,
                self.y + angle.sin() * radius,
            );
        }
        points
    }
}

/// The static night scene: gradient, ground band, wizard, star field.
/// Everything is decided at construction; `paint` just lays it down.
pub struct Sky {
    width: f32,
    height: f32,
    stars: Vec<Star>,
}

impl Sky {
    pub fn new(width: usize, height: usize, star_count: usize) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self {
            width,
            height,
            stars: Star::scatter(star_count, width, height),
        }
    }

    pub fn paint(&self, screen: &mut Screen) {
        for y in 0..screen.height() {
            let t = y as f32 / self.height;
            screen.fill_rect(0.0, y as f32, self.width, 1.0, lerp(SKY_TOP, SKY_BOTTOM, t));
        }

        screen.fill_rect(
            0.0,
            self.height * 0.9,
            self.width,
            self.height * 0.1 + 1.0,
            GROUND,
        );

        self.draw_wizard(screen);

        for star in &self.stars {
            for (x, y) in star.points() {
                screen.set(x, y, STAR_GOLD);
            }
        }
    }

    fn draw_wizard(&self, screen: &mut Screen) {
        let sprite_h = WIZARD_SPRITE.len() as f32;
        let sprite_w = WIZARD_SPRITE
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as f32;

        // Bottom-right corner anchored at (0.9 * width, 0.95 * height).
        let x0 = self.width * 0.9 - sprite_w;
        let y0 = self.height * 0.95 - sprite_h;

        for (row, line) in WIZARD_SPRITE.iter().enumerate() {
            for (col, c) in line.chars().enumerate() {
                if let Some(color) = sprite_color(c) {
                    screen.set(x0 + col as f32, y0 + row as f32, color);
                }
            }
        }
    }
}

pub struct SkyEffect {
    screen: Screen,
    output_buf: Vec<u8>,
}

impl Effect for SkyEffect {
    fn new(width: usize, height: usize) -> Self {
        let mut screen = Screen::new(width, height);
        Sky::new(width, height, crate::star_count()).paint(&mut screen);
        Self {
            screen,
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    fn update(&mut self) {}

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.screen.write_half_blocks(&mut self.output_buf)?;
        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_confines_stars_to_the_upper_sky() {
        let stars = Star::scatter(200, 1000.0, 1000.0);
        assert_eq!(stars.len(), 200);
        for star in &stars {
            assert!(star.x >= 25.0 && star.x <= 950.0, "x = {}", star.x);
            assert!(star.y >= 25.0 && star.y <= 400.0, "y = {}", star.y);
            assert!(star.size >= 1.0 && star.size < 5.0, "size = {}", star.size);
        }
    }

    #[test]
    fn star_mark_alternates_long_and_short_radii() {
        let star = Star {
            x: 100.0,
            y: 100.0,
            size: 4.0,
        };
        let points = star.points();
        assert_eq!(points.len(), 6);
        for (i, (px, py)) in points.iter().enumerate() {
            let radius = ((px - star.x).powi(2) + (py - star.y).powi(2)).sqrt();
            let expected = if i % 2 == 0 { 4.0 } else { 2.0 };
            assert!((radius - expected).abs() < 1e-4, "sample {i}: {radius}");
        }
    }

    #[test]
    fn scene_layers_gradient_and_ground() {
        let (w, h) = (200, 100);
        let mut screen = Screen::new(w, h);
        Sky::new(w, h, 0).paint(&mut screen);

        // Top row is the dark end of the gradient.
        assert_eq!(screen.pixel(0, 0), (0.0, 11.0, 39.0));
        // Bottom 10% is the solid ground band.
        assert_eq!(screen.pixel(0, h - 1), (12.0, 29.0, 45.0));
        assert_eq!(screen.pixel(w - 1, 91), (12.0, 29.0, 45.0));
    }

    #[test]
    fn requested_star_count_is_exact() {
        for n in [0, 1, 17, 500] {
            assert_eq!(Star::scatter(n, 800.0, 600.0).len(), n);
        }
    }
}
