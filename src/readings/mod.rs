pub mod generator;
pub mod history;
pub mod models;

pub use generator::ReadingGenerator;
pub use models::{BaseRoom, RoomReading};
