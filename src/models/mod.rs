pub mod fixture;
pub mod prediction;
pub mod response;
pub mod schema;
pub mod standings;
