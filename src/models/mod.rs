//! Workbrew API record types.

mod brew_command;
mod device;

pub use brew_command::*;
pub use device::*;
