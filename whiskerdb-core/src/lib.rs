pub mod date;
pub mod error;
pub mod identifier;
pub mod location;
pub mod model;
pub mod units;
pub mod value;
pub mod vocabulary;
