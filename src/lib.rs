pub mod engine;
pub mod renderer;
pub mod world;
