pub mod level;
pub mod session;
