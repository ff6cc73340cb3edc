//! The [`Viewer`] model: steps the simulation on every timer tick and paints
//! its committed world.

use std::time::Duration;

use log::{error, info};
use schelling_core::{Grid, Point};
use schelling_sim::{RunState, Simulation};

use crate::app::{Effect, Model};
use crate::messages::{Key, ModMask, Msg};
use crate::style::{AttrMask, Cell, Color, Style};

const MIN_INTERVAL: Duration = Duration::from_millis(10);
const MAX_INTERVAL: Duration = Duration::from_secs(5);
const MIN_WIDTH: i32 = 64;

const SATISFIED: char = '●';
const UNSATISFIED: char = '○';

const HELP: &str = "space pause  n step  r reset  +/- speed  q quit";

pub struct Viewer {
    sim: Simulation,
    paused: bool,
    interval: Duration,
    error: Option<String>,
}

impl Viewer {
    pub fn new(sim: Simulation, interval: Duration) -> Self {
        Self {
            sim,
            paused: false,
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
            error: None,
        }
    }

    #[inline]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current tick period.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The error that halted the run, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Screen size needed to show the world plus the two text lines below it.
    pub fn screen_size(&self) -> (i32, i32) {
        let side = self.sim.snapshot().side();
        ((2 * side).max(MIN_WIDTH), side + 3)
    }

    fn advance(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.sim.step() {
            error!("simulation halted: {e}");
            self.error = Some(e.to_string());
            self.paused = true;
        }
    }

    fn reset(&mut self) {
        match self.sim.reset_with_seed(None) {
            Ok(()) => self.error = None,
            Err(e) => {
                error!("reset failed: {e}");
                self.error = Some(e.to_string());
                self.paused = true;
            }
        }
    }

    fn retime(&mut self, interval: Duration) -> Option<Effect> {
        let interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        if interval == self.interval {
            return None;
        }
        self.interval = interval;
        info!("tick interval set to {} ms", interval.as_millis());
        Some(Effect::SetInterval(interval))
    }

    fn on_key(&mut self, key: Key, modifiers: ModMask) -> Option<Effect> {
        match key {
            Key::Escape | Key::Char('q') => Some(Effect::End),
            Key::Char('c') if modifiers.contains(ModMask::CTRL) => Some(Effect::End),
            Key::Space => {
                self.paused = !self.paused;
                None
            }
            Key::Char('n') => {
                self.paused = true;
                self.advance();
                None
            }
            Key::Char('r') => {
                self.reset();
                None
            }
            Key::Char('+') => self.retime(self.interval / 2),
            Key::Char('-') => self.retime(self.interval * 2),
            _ => None,
        }
    }

    fn status_line(&self) -> String {
        let state = match (&self.error, self.paused, self.sim.state()) {
            (Some(e), _, _) => format!("halted: {e}"),
            (None, true, _) => "paused".to_string(),
            (None, false, RunState::Converged) => "converged".to_string(),
            (None, false, _) => "running".to_string(),
        };
        let unsatisfied = self
            .sim
            .last_report()
            .map_or_else(|| "-".to_string(), |r| r.unsatisfied.to_string());
        let similarity = self
            .sim
            .similarity()
            .map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
        format!(
            "tick {} | {} | unsatisfied {unsatisfied} | similarity {similarity} | {state}",
            self.sim.tick(),
            self.sim.census(),
        )
    }
}

fn print(grid: &mut Grid<Cell>, at: Point, text: &str, style: Style) {
    for (i, ch) in (0..).zip(text.chars()) {
        grid.set(at.shift(i, 0), Cell::new(ch, style));
    }
}

impl Model for Viewer {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Tick if !self.paused => {
                self.advance();
                None
            }
            Msg::KeyDown { key, modifiers } => self.on_key(key, modifiers),
            _ => None,
        }
    }

    fn draw(&self, grid: &mut Grid<Cell>) {
        let world = self.sim.snapshot();
        for (p, agent) in world.agents() {
            let style = Style::default().with_fg(Color::of_category(agent.category()));
            let ch = if agent.satisfied { SATISFIED } else { UNSATISFIED };
            grid.set(Point::new(2 * p.x, p.y), Cell::new(ch, style));
        }

        let side = world.side();
        let status = Style::default().with_attrs(AttrMask::BOLD);
        print(grid, Point::new(0, side + 1), &self.status_line(), status);
        let help = Style::default().with_attrs(AttrMask::DIM);
        print(grid, Point::new(0, side + 2), HELP, help);
    }
}
