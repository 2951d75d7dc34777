pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod frontend;
pub mod index;
pub mod middle;
