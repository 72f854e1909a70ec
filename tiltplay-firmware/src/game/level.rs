//! Spirit level
//!
//! A bubble follows roll and pitch inside a ring. Holding it in the centre
//! target for three seconds ends the round.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use heapless::String;
use tiltplay_core::{Attitude, Game, Timers};
use tiltplay_display::{BinaryColor, Frame, Point};
use tiltplay_hal::ticks_diff;

/// Centre of the 128x128 panel
const CENTER: Point = Point::new(64, 64);

/// Outer ring radius
const RING_RADIUS: i32 = 44;

/// Bubble radius
const BUBBLE_RADIUS: i32 = 6;

/// Target ring radius
const TARGET_RADIUS: i32 = 9;

/// Bubble travel per degree of tilt
const PX_PER_DEG: f32 = 2.0;

/// Both angles within this are "level"
const LEVEL_TOLERANCE_DEG: f32 = 2.0;

/// Time to hold level to finish
const HOLD_US: u32 = 3_000_000;

/// Timer id for the target blink
const BLINK_TIMER: u8 = 0;
const BLINK_INTERVAL_US: u32 = 400_000;

pub struct LevelGame {
    bubble: Point,
    roll: f32,
    pitch: f32,
    level_since_us: Option<u32>,
    held_us: u32,
    blink: bool,
    done: bool,
}

impl LevelGame {
    pub const fn new() -> Self {
        Self {
            bubble: CENTER,
            roll: 0.0,
            pitch: 0.0,
            level_since_us: None,
            held_us: 0,
            blink: false,
            done: false,
        }
    }
}

fn to_offset(angle: f32) -> i32 {
    let limit = (RING_RADIUS - BUBBLE_RADIUS) as f32;
    (angle * PX_PER_DEG).clamp(-limit, limit) as i32
}

impl Game for LevelGame {
    fn init(&mut self, timers: &mut Timers<'_>) {
        *self = Self::new();
        if timers.every(BLINK_TIMER, BLINK_INTERVAL_US).is_err() {
            defmt::warn!("no slot for blink timer");
        }
    }

    fn update(&mut self, attitude: &Attitude, now_us: u32) {
        self.roll = attitude.roll;
        self.pitch = attitude.pitch;
        self.bubble = CENTER + Point::new(to_offset(attitude.roll), to_offset(attitude.pitch));

        let level = libm::fabsf(attitude.roll) < LEVEL_TOLERANCE_DEG
            && libm::fabsf(attitude.pitch) < LEVEL_TOLERANCE_DEG;
        if level {
            let since = *self.level_since_us.get_or_insert(now_us);
            self.held_us = ticks_diff(now_us, since);
            if self.held_us >= HOLD_US {
                self.done = true;
            }
        } else {
            self.level_since_us = None;
            self.held_us = 0;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        frame.circle(CENTER.x, CENTER.y, RING_RADIUS, BinaryColor::On, false);
        if self.blink || self.level_since_us.is_none() {
            frame.circle(CENTER.x, CENTER.y, TARGET_RADIUS, BinaryColor::On, false);
        }
        frame.hline(CENTER.x - 3, CENTER.y, 7, BinaryColor::On);
        frame.vline(CENTER.x, CENTER.y - 3, 7, BinaryColor::On);
        frame.circle(self.bubble.x, self.bubble.y, BUBBLE_RADIUS, BinaryColor::On, true);

        // Hold progress along the bottom edge
        let progress = (self.held_us / (HOLD_US / 128)).min(128) as i32;
        frame.fill_rect(0, 124, progress, 4, BinaryColor::On);

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let mut line: String<24> = String::new();
        let _ = write!(line, "R{:>6.1} P{:>6.1}", self.roll, self.pitch);
        let _ = Text::with_baseline(&line, Point::zero(), style, Baseline::Top).draw(frame);
    }

    fn is_over(&self) -> bool {
        self.done
    }

    fn on_timer(&mut self, id: u8, _attitude: &Attitude) {
        if id == BLINK_TIMER {
            self.blink = !self.blink;
        }
    }
}
