pub mod event;
pub mod level;
pub mod spawner;
pub mod step;
pub mod world;
