use crossterm::event::Event;
use std::io::{BufWriter, Stdout};

pub mod fireworks;
pub mod sky;

pub trait Effect {
    fn new(width: usize, height: usize) -> Self
    where
        Self: Sized;
    fn update(&mut self);
    fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()>;
    fn handle_event(&mut self, _event: &Event) {}
}

/// Uniform sample in [min, max).
pub(crate) fn random(min: f32, max: f32) -> f32 {
    fastrand::f32() * (max - min) + min
}
