//! Game session context
//!
//! One `Session` is built at boot and owns everything a game runs on: the
//! sensor, the clock, the attitude estimator, the task table and the frame.
//! The poll loop hands it the active game and the display transport on each
//! turn; nothing in here can stop that loop.

use embedded_hal::delay::DelayNs;
use tiltplay_display::{BinaryColor, DisplayError, DisplayTransport, Frame};
use tiltplay_hal::Clock;

use crate::attitude::{Attitude, AttitudeEstimator, CalibrationOffsets};
use crate::config::EngineConfig;
use crate::scheduler::{Scheduler, SchedulerError, TaskHandle};
use crate::traits::{Game, SensorError, SensorSource};

/// What a scheduled task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineTask {
    /// Read the sensor and advance both attitude filters
    SampleAttitude,
    /// Call `Game::update`
    UpdateGame,
    /// Clear the frame, call `Game::draw`, flush
    Draw,
    /// Game-defined timer, delivered to `Game::on_timer`
    Game(u8),
}

/// Game-facing view of the task table
pub struct Timers<'a> {
    scheduler: &'a mut Scheduler<EngineTask>,
    now_us: u32,
}

impl<'a> Timers<'a> {
    /// Fire `Game::on_timer(id)` every `interval_us`
    pub fn every(&mut self, id: u8, interval_us: u32) -> Result<TaskHandle, SchedulerError> {
        self.scheduler
            .register(interval_us, EngineTask::Game(id), self.now_us)
    }

    /// Stop a timer
    pub fn cancel(&mut self, handle: TaskHandle) -> Result<(), SchedulerError> {
        self.scheduler.remove(handle)
    }

    /// Change a timer's period
    pub fn set_interval(&mut self, handle: TaskHandle, interval_us: u32) -> Result<(), SchedulerError> {
        self.scheduler.set_interval(handle, interval_us)
    }
}

/// Outcome of one `Session::poll`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Tasks fired in this poll
    pub fired: u8,
    /// Attitude was sampled
    pub sampled: bool,
    /// Game state was updated
    pub updated: bool,
    /// A frame was drawn and flushed
    pub drawn: bool,
    /// Sensor read failure; the estimator reused the last good reading
    pub sensor_error: Option<SensorError>,
    /// Flush failure; the frame is redrawn on the next draw tick anyway
    pub display_error: Option<DisplayError>,
}

/// Per-device engine context
pub struct Session<S, C> {
    sensor: S,
    clock: C,
    config: EngineConfig,
    estimator: AttitudeEstimator,
    scheduler: Scheduler<EngineTask>,
    frame: Frame,
}

impl<S: SensorSource, C: Clock> Session<S, C> {
    /// Create a session context; no tasks run until `start`
    pub fn new(sensor: S, clock: C, config: EngineConfig) -> Self {
        Self {
            sensor,
            clock,
            estimator: AttitudeEstimator::from_config(&config),
            config,
            scheduler: Scheduler::new(),
            frame: Frame::new(),
        }
    }

    /// Run the blocking roll/pitch calibration
    pub fn calibrate<D: DelayNs>(&mut self, delay: &mut D) -> Result<CalibrationOffsets, SensorError> {
        let samples = self.config.calibration_samples;
        self.estimator.calibrate(&mut self.sensor, delay, samples)
    }

    /// Run the raw accelerometer calibration for tilt mode
    pub fn calibrate_tilt(&mut self) -> Result<CalibrationOffsets, SensorError> {
        let samples = self.config.calibration_samples;
        self.estimator.calibrate_tilt(&mut self.sensor, samples)
    }

    /// Begin a new game
    ///
    /// Drops every task of the previous session, registers the engine tasks
    /// (sample, update, draw, in that order so each tick's update sees that
    /// tick's sample) and lets the game add its own timers.
    pub fn start<G: Game>(&mut self, game: &mut G) -> Result<(), SchedulerError> {
        self.scheduler.clear();
        self.frame.clear(BinaryColor::Off);

        let now = self.clock.now_us();
        let cadence = self.config.cadence;
        self.scheduler
            .register(cadence.sensor_us, EngineTask::SampleAttitude, now)?;
        self.scheduler
            .register(cadence.update_us, EngineTask::UpdateGame, now)?;
        self.scheduler.register(cadence.draw_us, EngineTask::Draw, now)?;

        let mut timers = Timers {
            scheduler: &mut self.scheduler,
            now_us: now,
        };
        game.init(&mut timers);
        Ok(())
    }

    /// Run every due task once
    pub fn poll<G: Game, T: DisplayTransport>(&mut self, game: &mut G, transport: &mut T) -> PollReport {
        let now = self.clock.now_us();
        let Self {
            sensor,
            estimator,
            scheduler,
            frame,
            ..
        } = self;

        let mut report = PollReport::default();
        let fired = scheduler.poll(now, |task| match task {
            EngineTask::SampleAttitude => {
                report.sampled = true;
                if let Err(e) = estimator.sample(sensor, now) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("sensor read failed, reusing last sample: {}", e);
                    report.sensor_error = Some(e);
                }
            }
            EngineTask::UpdateGame => {
                report.updated = true;
                game.update(&estimator.attitude(), now);
            }
            EngineTask::Draw => {
                frame.clear(BinaryColor::Off);
                game.draw(frame);
                match frame.flush(transport) {
                    Ok(()) => report.drawn = true,
                    Err(e) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("display flush failed: {}", e);
                        report.display_error = Some(e);
                    }
                }
            }
            EngineTask::Game(id) => game.on_timer(id, &estimator.attitude()),
        });
        report.fired = fired as u8;
        report
    }

    /// Latest attitude snapshot
    pub fn attitude(&self) -> Attitude {
        self.estimator.attitude()
    }

    /// Attitude estimator
    pub fn estimator(&self) -> &AttitudeEstimator {
        &self.estimator
    }

    /// Attitude estimator, for recalibration or reset
    pub fn estimator_mut(&mut self) -> &mut AttitudeEstimator {
        &mut self.estimator
    }

    /// Task table
    pub fn scheduler(&self) -> &Scheduler<EngineTask> {
        &self.scheduler
    }

    /// Frame as last drawn
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clock the session runs on
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take the hardware back
    pub fn release(self) -> (S, C) {
        (self.sensor, self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attitude::Vector3;
    use crate::traits::RawAxes;
    use core::cell::Cell;

    struct ManualClock(Cell<u32>);

    impl ManualClock {
        fn advance(&self, us: u32) {
            self.0.set(self.0.get().wrapping_add(us));
        }
    }

    impl Clock for ManualClock {
        fn now_us(&self) -> u32 {
            self.0.get()
        }
    }

    struct LevelSensor {
        fail: bool,
    }

    impl SensorSource for LevelSensor {
        fn read_accel(&mut self) -> Result<Vector3, SensorError> {
            if self.fail {
                return Err(SensorError::NotResponding);
            }
            Ok(Vector3::new(0.0, 0.0, -1.0))
        }

        fn read_gyro(&mut self) -> Result<Vector3, SensorError> {
            Ok(Vector3::ZERO)
        }

        fn read_accel_raw(&mut self) -> Result<RawAxes, SensorError> {
            Ok(RawAxes::new(0, 16_384, 0))
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        pages: u32,
        fail: bool,
    }

    impl DisplayTransport for RecordingTransport {
        fn init(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn write_page(&mut self, _page: u8, _data: &[u8]) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Communication);
            }
            self.pages += 1;
            Ok(())
        }
    }

    /// Draws a dot at the tilt-driven position and ends after `lifetime`
    /// updates
    #[derive(Default)]
    struct DotGame {
        updates: u32,
        draws: u32,
        timer_ticks: u32,
        lifetime: u32,
        last_tilt: f32,
        use_timer: bool,
    }

    impl Game for DotGame {
        fn init(&mut self, timers: &mut Timers<'_>) {
            if self.use_timer {
                timers.every(7, 100_000).unwrap();
            }
        }

        fn update(&mut self, attitude: &Attitude, _now_us: u32) {
            self.updates += 1;
            self.last_tilt = attitude.tilt;
        }

        fn draw(&mut self, frame: &mut Frame) {
            self.draws += 1;
            frame.set_pixel(3, 5, BinaryColor::On);
        }

        fn is_over(&self) -> bool {
            self.updates >= self.lifetime
        }

        fn on_timer(&mut self, id: u8, _attitude: &Attitude) {
            assert_eq!(id, 7);
            self.timer_ticks += 1;
        }
    }

    fn session(fail: bool) -> Session<LevelSensor, ManualClock> {
        Session::new(
            LevelSensor { fail },
            ManualClock(Cell::new(0)),
            EngineConfig::DEFAULT,
        )
    }

    #[test]
    fn test_start_registers_engine_tasks_in_order() {
        let mut session = session(false);
        let mut game = DotGame::default();
        session.start(&mut game).unwrap();

        let actions: heapless::Vec<EngineTask, 4> =
            session.scheduler().tasks().iter().map(|t| t.action).collect();
        assert_eq!(
            actions.as_slice(),
            &[
                EngineTask::SampleAttitude,
                EngineTask::UpdateGame,
                EngineTask::Draw
            ]
        );
    }

    #[test]
    fn test_one_second_of_polling() {
        let mut session = session(false);
        let mut game = DotGame {
            lifetime: u32::MAX,
            use_timer: true,
            ..DotGame::default()
        };
        let mut transport = RecordingTransport::default();
        session.start(&mut game).unwrap();

        let mut samples = 0;
        for _ in 0..1000 {
            session.clock().advance(1_000);
            let report = session.poll(&mut game, &mut transport);
            if report.sampled {
                samples += 1;
            }
            assert_eq!(report.sensor_error, None);
        }

        assert_eq!(samples, 100);
        assert_eq!(game.updates, 50);
        // 16.667 ms interval polled on whole milliseconds: every 17 ms
        assert_eq!(game.draws, 1000 / 17);
        assert_eq!(transport.pages, game.draws * 16);
        assert_eq!(game.timer_ticks, 10);

        // Tilt filter is chasing the 90° raw reading
        assert!(game.last_tilt > 80.0);
        assert_eq!(session.frame().pixel(3, 5), Some(BinaryColor::On));
    }

    #[test]
    fn test_sensor_failure_is_reported_not_fatal() {
        let mut session = session(true);
        let mut game = DotGame {
            lifetime: u32::MAX,
            ..DotGame::default()
        };
        let mut transport = RecordingTransport::default();
        session.start(&mut game).unwrap();

        session.clock().advance(10_000);
        let report = session.poll(&mut game, &mut transport);
        assert!(report.sampled);
        assert_eq!(report.sensor_error, Some(SensorError::NotResponding));

        // Loop keeps going
        session.clock().advance(10_000);
        let report = session.poll(&mut game, &mut transport);
        assert!(report.updated);
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let mut session = session(false);
        let mut game = DotGame {
            lifetime: u32::MAX,
            ..DotGame::default()
        };
        let mut transport = RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        };
        session.start(&mut game).unwrap();

        session.clock().advance(16_667);
        let report = session.poll(&mut game, &mut transport);
        assert!(!report.drawn);
        assert_eq!(report.display_error, Some(DisplayError::Communication));
        assert_eq!(game.draws, 1);
    }

    #[test]
    fn test_restart_drops_previous_tasks() {
        let mut session = session(false);
        let mut transport = RecordingTransport::default();
        let mut game = DotGame {
            lifetime: 3,
            use_timer: true,
            ..DotGame::default()
        };
        session.start(&mut game).unwrap();
        assert_eq!(session.scheduler().len(), 4);

        while !game.is_over() {
            session.clock().advance(1_000);
            session.poll(&mut game, &mut transport);
        }

        let mut next = DotGame {
            lifetime: 3,
            ..DotGame::default()
        };
        session.start(&mut next).unwrap();
        assert_eq!(session.scheduler().len(), 3);
        assert_eq!(session.frame().pixel(3, 5), Some(BinaryColor::Off));
    }

    #[test]
    fn test_nothing_fires_before_first_interval() {
        let mut session = session(false);
        let mut game = DotGame::default();
        let mut transport = RecordingTransport::default();
        session.start(&mut game).unwrap();

        session.clock().advance(9_999);
        let report = session.poll(&mut game, &mut transport);
        assert_eq!(report, PollReport::default());
    }
}
