use super::{Effect, random};
use crate::effects::sky::Sky;
use crate::screen::{Rgb, Screen, hue_to_rgb};
use crossterm::event::{Event, MouseButton, MouseEventKind};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::io::{BufWriter, Stdout, Write};

const ROCKET_TRAIL_LEN: usize = 10;
const ROCKET_SPEED: f32 = 15.0;
const ROCKET_FRICTION: f32 = 0.99;
const PARTICLES_PER_BURST: usize = 50;

const PARTICLE_TRAIL_LEN: usize = 7;
const PARTICLE_FRICTION: f32 = 0.96;
const GRAVITY: f32 = 5.0;

const WAND_LENGTH: f32 = 9.0;
const WAND_THICKNESS: f32 = 2.0;
const WAND_WOOD: Rgb = (138, 92, 56);
const WAND_TIP: Rgb = (255, 240, 160);

fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Rotation actually applied to the wand, in degrees, given the raw pointer
/// angle normalized into (0, 360]. Note the gap: (275, 360] escapes the
/// 90-degree clamp and draws unrotated. Long-standing behavior, kept as-is.
fn wand_rotation(raw_degrees: f32) -> f32 {
    if raw_degrees > 0.0 && raw_degrees < 90.0 {
        raw_degrees
    } else if raw_degrees > 90.0 && raw_degrees < 275.0 {
        90.0
    } else {
        0.0
    }
}

/// A rocket in flight. Travels on a fixed bearing from its launch point and
/// detonates the frame its projected distance covers the distance to target.
struct Rocket {
    x: f32,
    y: f32,
    origin_x: f32,
    origin_y: f32,
    target_x: f32,
    target_y: f32,
    distance_to_target: f32,
    trail: VecDeque<(f32, f32)>,
    angle: f32,
    speed: f32,
    hue: f32,
}

impl Rocket {
    fn new(origin: (f32, f32), target: (f32, f32)) -> Self {
        let (origin_x, origin_y) = origin;
        let (target_x, target_y) = target;

        let mut trail = VecDeque::with_capacity(ROCKET_TRAIL_LEN);
        for _ in 0..ROCKET_TRAIL_LEN {
            trail.push_back(origin);
        }

        Self {
            x: origin_x,
            y: origin_y,
            origin_x,
            origin_y,
            target_x,
            target_y,
            distance_to_target: distance(origin_x, origin_y, target_x, target_y),
            trail,
            angle: (target_y - origin_y).atan2(target_x - origin_x),
            speed: ROCKET_SPEED,
            hue: random(0.0, 360.0),
        }
    }

    /// One frame of flight. Returns false the frame the target is reached.
    fn advance(&mut self) -> bool {
        self.trail.pop_back();
        self.trail.push_front((self.x, self.y));

        self.speed *= ROCKET_FRICTION;
        let vx = self.angle.cos() * self.speed;
        let vy = self.angle.sin() * self.speed;

        let traveled = distance(self.origin_x, self.origin_y, self.x + vx, self.y + vy);
        if traveled >= self.distance_to_target {
            return false;
        }

        self.x += vx;
        self.y += vy;
        true
    }

    fn trail_end(&self) -> (f32, f32) {
        self.trail.back().copied().unwrap_or((self.x, self.y))
    }
}

/// A burst fragment: decaying speed, constant downward pull, fading alpha.
struct Particle {
    x: f32,
    y: f32,
    trail: VecDeque<(f32, f32)>,
    angle: f32,
    speed: f32,
    hue: f32,
    alpha: f32,
    decay: f32,
}

impl Particle {
    fn new(x: f32, y: f32) -> Self {
        let mut trail = VecDeque::with_capacity(PARTICLE_TRAIL_LEN);
        for _ in 0..PARTICLE_TRAIL_LEN {
            trail.push_back((x, y));
        }

        Self {
            x,
            y,
            trail,
            angle: random(0.0, PI * 2.0),
            speed: random(1.0, 10.0),
            hue: random(0.0, 360.0),
            alpha: 1.0,
            decay: random(0.015, 0.03),
        }
    }

    /// One frame of fallout. Returns false once the remaining opacity is
    /// within one step of gone.
    fn advance(&mut self) -> bool {
        self.trail.pop_back();
        self.trail.push_front((self.x, self.y));

        self.speed *= PARTICLE_FRICTION;
        self.x += self.angle.cos() * self.speed;
        self.y += self.angle.sin() * self.speed + GRAVITY;

        self.alpha -= self.decay;
        self.alpha > self.decay
    }

    fn trail_end(&self) -> (f32, f32) {
        self.trail.back().copied().unwrap_or((self.x, self.y))
    }
}

/// The interactive layer: wand tracking the pointer, rockets launched while
/// the button is held, bursts of particles where they land. The painted sky
/// sits behind it and is copied in wholesale as the per-frame clear.
pub struct FireworksEffect {
    width: usize,
    height: usize,
    backdrop: Screen,
    screen: Screen,
    pointer: (f32, f32),
    button_held: bool,
    rockets: Vec<Rocket>,
    particles: Vec<Particle>,
    output_buf: Vec<u8>,
}

impl Effect for FireworksEffect {
    fn new(width: usize, height: usize) -> Self {
        let mut backdrop = Screen::new(width, height);
        Sky::new(width, height, crate::star_count()).paint(&mut backdrop);

        Self {
            width,
            height,
            backdrop,
            screen: Screen::new(width, height),
            pointer: (0.0, 0.0),
            button_held: false,
            rockets: Vec::new(),
            particles: Vec::new(),
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    fn update(&mut self) {
        if self.button_held {
            self.rockets.push(Rocket::new(self.wand_tip(), self.pointer));
        }

        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| {
            if rocket.advance() {
                true
            } else {
                bursts.push((rocket.target_x, rocket.target_y));
                false
            }
        });

        for (x, y) in bursts {
            for _ in 0..PARTICLES_PER_BURST {
                self.particles.push(Particle::new(x, y));
            }
        }

        self.particles.retain_mut(Particle::advance);
    }

    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        self.screen.copy_from(&self.backdrop);

        self.draw_wand();

        for rocket in &self.rockets {
            let (tx, ty) = rocket.trail_end();
            self.screen
                .line(tx, ty, rocket.x, rocket.y, hue_to_rgb(rocket.hue), 1.0);
        }

        for particle in &self.particles {
            let (tx, ty) = particle.trail_end();
            self.screen.line(
                tx,
                ty,
                particle.x,
                particle.y,
                hue_to_rgb(particle.hue),
                particle.alpha,
            );
        }

        self.screen.write_half_blocks(&mut self.output_buf)?;
        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(mouse_event) => {
                let position = (mouse_event.column as f32, mouse_event.row as f32 * 2.0);
                match mouse_event.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.pointer = position;
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.pointer = position;
                        self.button_held = true;
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        self.button_held = false;
                    }
                    _ => {}
                }
            }
            // Losing focus releases the button and parks the pointer.
            Event::FocusLost => {
                self.pointer = (0.0, 0.0);
                self.button_held = false;
            }
            _ => {}
        }
    }
}

impl FireworksEffect {
    /// Where rockets launch from.
    fn wand_tip(&self) -> (f32, f32) {
        (
            self.width as f32 * 0.91 - WAND_LENGTH,
            self.height as f32 * 0.93 - WAND_THICKNESS,
        )
    }

    fn draw_wand(&mut self) {
        let (wx, wy) = self.wand_tip();

        let raw = (self.pointer.1 - wy).atan2(self.pointer.0 - wx) - PI;
        let degrees = raw.to_degrees() + 360.0;
        let theta = wand_rotation(degrees).to_radians();

        // The sprite extends backwards from the tip along the rotated axis.
        let base_x = wx - theta.cos() * WAND_LENGTH;
        let base_y = wy - theta.sin() * WAND_LENGTH;

        self.screen.line(base_x, base_y, wx, wy, WAND_WOOD, 1.0);
        self.screen.set(wx, wy, WAND_TIP);
    }
}
