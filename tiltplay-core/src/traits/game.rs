//! Game interface
//!
//! The engine drives whichever game is active through this trait and never
//! needs to know which one it is.

use tiltplay_display::Frame;

use crate::attitude::Attitude;
use crate::session::Timers;

/// A tilt-controlled game
pub trait Game {
    /// Called once when a session starts, after the engine tasks exist
    ///
    /// Extra periodic work (spawning obstacles, countdowns) is registered
    /// through `timers` and delivered to [`Game::on_timer`].
    fn init(&mut self, timers: &mut Timers<'_>);

    /// Advance game state
    fn update(&mut self, attitude: &Attitude, now_us: u32);

    /// Render into a frame that has already been cleared
    fn draw(&mut self, frame: &mut Frame);

    /// Session is finished
    fn is_over(&self) -> bool;

    /// A timer registered in `init` fired
    fn on_timer(&mut self, _id: u8, _attitude: &Attitude) {}
}
