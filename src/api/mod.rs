pub mod attendance;
pub mod events;
pub mod export;
pub mod scanner;
pub mod student;
