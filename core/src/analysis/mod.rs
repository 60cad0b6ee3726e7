pub mod kill_window;

pub use kill_window::{KillAnalysis, analyze_kill};
