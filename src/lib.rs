pub mod its;
pub mod logger;
