pub mod profile;
pub mod rating;
pub mod recommendation;
pub mod user;
