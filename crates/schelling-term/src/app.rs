//! The Elm-architecture application loop: [`Model`], [`Driver`], [`Effect`],
//! [`App`].
//!
//! The loop owns the fixed-interval timer. Between timer deadlines it hands
//! the remaining time to the driver to wait for input, so a model only ever
//! sees messages one at a time and never during a draw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use schelling_core::Grid;

use crate::frame::{compute_frame, Frame};
use crate::messages::Msg;
use crate::style::Cell;

// ---------------------------------------------------------------------------
// Context (cancellation token)
// ---------------------------------------------------------------------------

/// A cooperative-cancellation token backed by an [`AtomicBool`].
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Relaxed);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Effect
// ---------------------------------------------------------------------------

/// A side-effect returned by [`Model::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Change the period of [`Msg::Tick`]. The next tick is due one full
    /// period from now.
    SetInterval(Duration),
    /// Multiple effects applied in order.
    Batch(Vec<Effect>),
    /// Stop the application loop.
    End,
}

// ---------------------------------------------------------------------------
// Model trait
// ---------------------------------------------------------------------------

/// The application model.
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Render the current state into `grid`, which arrives blank.
    fn draw(&self, grid: &mut Grid<Cell>);
}

// ---------------------------------------------------------------------------
// Driver trait
// ---------------------------------------------------------------------------

/// Screen and input back-end.
pub trait Driver {
    /// Initialise the back-end.
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Wait at most `timeout` for input and send whatever arrived through
    /// `tx`. Returning early with nothing sent is allowed.
    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: &Sender<Msg>,
        timeout: Duration,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Flush a computed frame to the screen.
    fn flush(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Restore the screen. Called once, even when the loop fails.
    fn close(&mut self);
}

// ---------------------------------------------------------------------------
// AppConfig / App
// ---------------------------------------------------------------------------

/// Configuration for creating an [`App`].
pub struct AppConfig<M: Model, D: Driver> {
    pub model: M,
    pub driver: D,
    pub width: i32,
    pub height: i32,
    /// Period of [`Msg::Tick`].
    pub interval: Duration,
}

/// The main application runner.
pub struct App<M: Model, D: Driver> {
    model: M,
    driver: D,
    width: i32,
    height: i32,
    interval: Duration,
    next_tick: Instant,
}

impl<M: Model, D: Driver> App<M, D> {
    pub fn new(config: AppConfig<M, D>) -> Self {
        Self {
            model: config.model,
            driver: config.driver,
            width: config.width,
            height: config.height,
            interval: config.interval,
            next_tick: Instant::now() + config.interval,
        }
    }

    /// Run the Model-View-Update loop until the model returns
    /// [`Effect::End`].
    ///
    /// 1. Initialises the driver and sends [`Msg::Init`].
    /// 2. Loops: process queued messages → draw → diff → flush, then either
    ///    emit [`Msg::Tick`] when the timer is due or poll the driver until
    ///    it is.
    /// 3. Closes the driver on every exit path.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.driver.init()?;
        let result = self.event_loop();
        self.driver.close();
        result
    }

    fn event_loop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = Context::new();
        let (tx, rx): (Sender<Msg>, Receiver<Msg>) = mpsc::channel();
        tx.send(Msg::Init).ok();

        let mut prev_grid: Grid<Cell> = Grid::new(self.width, self.height);
        let mut curr_grid: Grid<Cell> = Grid::new(self.width, self.height);
        self.next_tick = Instant::now() + self.interval;

        loop {
            self.process_pending(&rx, &ctx, &mut prev_grid, &mut curr_grid)?;
            if ctx.is_done() {
                return Ok(());
            }

            let now = Instant::now();
            if now >= self.next_tick {
                tx.send(Msg::Tick).ok();
                self.next_tick = now + self.interval;
                continue;
            }
            self.driver
                .poll_msgs(&ctx, &tx, self.next_tick.saturating_duration_since(now))?;
        }
    }

    /// Drain queued messages, update the model, draw, diff, and flush.
    fn process_pending(
        &mut self,
        rx: &Receiver<Msg>,
        ctx: &Context,
        prev_grid: &mut Grid<Cell>,
        curr_grid: &mut Grid<Cell>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut needs_draw = false;

        while let Ok(msg) = rx.try_recv() {
            if matches!(msg, Msg::Screen { .. }) {
                // The terminal was cleared; repaint everything.
                *prev_grid = Grid::new(0, 0);
            }
            needs_draw = true;
            if let Some(effect) = self.model.update(msg) {
                self.handle_effect(effect, ctx);
                if ctx.is_done() {
                    return Ok(());
                }
            }
        }

        if needs_draw {
            curr_grid.fill(Cell::default());
            self.model.draw(curr_grid);
            let frame = compute_frame(prev_grid, curr_grid);
            if !frame.cells.is_empty() {
                self.driver.flush(frame)?;
            }
            prev_grid.clone_from(curr_grid);
        }

        Ok(())
    }

    fn handle_effect(&mut self, effect: Effect, ctx: &Context) {
        match effect {
            Effect::End => ctx.cancel(),
            Effect::SetInterval(interval) => {
                self.interval = interval;
                self.next_tick = Instant::now() + interval;
            }
            Effect::Batch(effects) => {
                for e in effects {
                    self.handle_effect(e, ctx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use schelling_core::Point;

    use super::*;
    use crate::messages::Key;

    /// Counts ticks, paints the count, and ends after `limit` ticks or on Escape.
    struct Counter {
        ticks: u32,
        limit: u32,
        seen: Vec<Msg>,
    }

    impl Model for Counter {
        fn update(&mut self, msg: Msg) -> Option<Effect> {
            self.seen.push(msg.clone());
            match msg {
                Msg::Tick => {
                    self.ticks += 1;
                    (self.ticks >= self.limit).then_some(Effect::End)
                }
                Msg::KeyDown { key: Key::Escape, .. } => Some(Effect::End),
                Msg::KeyDown { key: Key::Char('f'), .. } => Some(Effect::Batch(vec![
                    Effect::SetInterval(Duration::ZERO),
                    Effect::SetInterval(Duration::from_secs(60)),
                ])),
                _ => None,
            }
        }

        fn draw(&self, grid: &mut Grid<Cell>) {
            let digit = char::from_digit(self.ticks % 10, 10).unwrap_or('?');
            grid.set(Point::new(0, 0), Cell::default().with_char(digit));
        }
    }

    #[derive(Default)]
    struct Scripted {
        script: VecDeque<Msg>,
        frames: Vec<Frame>,
        inited: bool,
        closed: bool,
        fail_flush: bool,
    }

    impl Driver for Scripted {
        fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.inited = true;
            Ok(())
        }

        fn poll_msgs(
            &mut self,
            _ctx: &Context,
            tx: &Sender<Msg>,
            _timeout: Duration,
        ) -> Result<(), Box<dyn std::error::Error>> {
            if let Some(msg) = self.script.pop_front() {
                tx.send(msg).ok();
            }
            Ok(())
        }

        fn flush(&mut self, frame: Frame) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_flush {
                return Err("flush failed".into());
            }
            self.frames.push(frame);
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn app(limit: u32, driver: Scripted, interval: Duration) -> App<Counter, Scripted> {
        App::new(AppConfig {
            model: Counter {
                ticks: 0,
                limit,
                seen: Vec::new(),
            },
            driver,
            width: 4,
            height: 2,
            interval,
        })
    }

    #[test]
    fn ticks_until_model_ends() {
        let mut app = app(3, Scripted::default(), Duration::ZERO);
        app.run().unwrap();
        assert!(app.driver.inited);
        assert!(app.driver.closed);
        assert_eq!(app.model.ticks, 3);
        assert_eq!(app.model.seen[0], Msg::Init);
        // Each tick changes the painted digit.
        let last = app.driver.frames.last().unwrap();
        assert_eq!(last.cells.len(), 1);
        assert_eq!(last.cells[0].cell.ch, '2');
    }

    #[test]
    fn input_is_delivered_between_ticks() {
        let driver = Scripted {
            script: VecDeque::from([Msg::char('f'), Msg::key(Key::Escape)]),
            ..Scripted::default()
        };
        let mut app = app(u32::MAX, driver, Duration::from_secs(3600));
        app.run().unwrap();
        assert_eq!(app.interval, Duration::from_secs(60));
        assert_eq!(app.model.ticks, 0);
        assert_eq!(
            app.model.seen,
            vec![Msg::Init, Msg::char('f'), Msg::key(Key::Escape)]
        );
    }

    #[test]
    fn resize_repaints_whole_screen() {
        let driver = Scripted {
            script: VecDeque::from([
                Msg::Screen {
                    width: 80,
                    height: 24,
                },
                Msg::key(Key::Escape),
            ]),
            ..Scripted::default()
        };
        let mut app = app(u32::MAX, driver, Duration::from_secs(3600));
        app.run().unwrap();
        let frames = &app.driver.frames;
        // Init paints one changed cell; the resize repaints all eight.
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].cells.len(), 1);
        assert_eq!(frames[1].cells.len(), 8);
    }

    #[test]
    fn driver_closed_on_error() {
        let driver = Scripted {
            fail_flush: true,
            ..Scripted::default()
        };
        let mut app = app(3, driver, Duration::ZERO);
        assert!(app.run().is_err());
        assert!(app.driver.closed);
    }
}
