//! Terminal output

pub mod output;
pub mod theme;

pub use output::ConsoleReporter;
pub use theme::Theme;
