pub mod executor;

pub use executor::{CommandError, CommandOutput, SystemCommandExecutor};
