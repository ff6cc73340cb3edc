//! Terminal viewer for the Schelling segregation simulator.
//!
//! The viewer is a plain consumer of the engine: an Elm-style [`App`] loop
//! owns a fixed-interval timer and delivers [`Msg::Tick`] to the [`Viewer`]
//! model, which advances the simulation and paints its committed snapshot
//! into a screen grid. Only changed screen cells reach the terminal.

pub mod app;
pub mod cli;
pub mod driver;
pub mod frame;
pub mod messages;
pub mod style;
pub mod viewer;

pub use app::{App, AppConfig, Context, Driver, Effect, Model};
pub use cli::Args;
pub use driver::CrosstermDriver;
pub use messages::{Key, ModMask, Msg};
pub use style::{AttrMask, Cell, Color, Style};
pub use viewer::Viewer;
