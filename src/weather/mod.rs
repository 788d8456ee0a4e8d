//! Weather system
//!
//! Weather slows the courier and makes each step more tiring. Conditions
//! follow a Markov chain; the game advances it on a timer with a short blend.

pub mod condition;
pub mod cycle;
pub mod process;

pub use condition::WeatherCondition;
pub use cycle::{Blend, WeatherCycle, WeatherEvent};
pub use process::WeatherProcess;
