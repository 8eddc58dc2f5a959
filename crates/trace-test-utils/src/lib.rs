pub mod fixtures;
pub mod sandbox;

pub use sandbox::LibrarySandbox;
