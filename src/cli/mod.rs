mod args;
mod config;

pub use args::{Args, Command, CompareArgs, InitArgs, ScoreArgs};
pub use config::CompareConfig;
