pub mod input;
pub mod runner;

pub use runner::BatchRunner;
