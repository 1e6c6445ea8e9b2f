pub mod comment;
pub mod issue;
