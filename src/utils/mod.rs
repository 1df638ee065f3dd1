pub mod geo;
pub mod invalidation;
pub mod password;
pub mod token;
