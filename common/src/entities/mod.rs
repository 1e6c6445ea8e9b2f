pub mod comment;
pub mod issue;
pub mod stats;
pub mod user;
