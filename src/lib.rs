pub mod action;
pub mod browser;
pub mod computer;
pub mod config;
pub mod driver;
pub mod error;
pub mod keymap;
pub mod tool;

pub use action::{Action, MouseButton, Point};
pub use browser::ChromiumDriver;
pub use computer::{with_computer, Computer, LocalComputer};
pub use config::{ComputerConfig, Dimensions, Environment};
pub use driver::Driver;
pub use error::ComputerError;
pub use tool::{ComputerCall, ComputerCallOutput, ComputerTool};
