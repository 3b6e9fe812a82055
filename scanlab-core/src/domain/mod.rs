//! Domain types for scanlab

pub mod bar;
pub mod signal;

pub use bar::{validate_bars, Bar, BarError};
pub use signal::{Signal, SignalStrength, SignalType};

/// Symbol type alias
pub type Symbol = String;
