pub mod evaluation;
pub mod room;
pub mod roster;
pub mod scoring;
pub mod words;

// Re-export main components
pub use evaluation::*;
pub use room::*;
pub use roster::*;
pub use scoring::*;
pub use words::*;
