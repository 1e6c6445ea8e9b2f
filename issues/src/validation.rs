use anyhow::anyhow;
use common::error::{self, AddCode};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn require(field: &str, value: &str) -> error::Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{} is required", field).code(400));
    }
    Ok(())
}

pub fn email(value: &str) -> error::Result<()> {
    if !EMAIL.is_match(value) {
        return Err(anyhow!("Invalid email address: {}", value).code(400));
    }
    Ok(())
}

/// Ids arrive as path segments; anything that is not a UUID cannot name an
/// existing issue, so it is reported the same way as an unknown one.
pub fn issue_id(raw: &str) -> error::Result<Uuid> {
    raw.parse()
        .map_err(|_| anyhow!("Issue not found").code(404))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("Title", "Printer jam").is_ok());
        assert_eq!(require("Title", "").unwrap_err().code, 400);
        assert_eq!(require("Title", "   ").unwrap_err().message(), "Title is required");
    }

    #[test]
    fn test_email() {
        assert!(email("robin@example.com").is_ok());
        assert!(email("robin+desk@mail.example.org").is_ok());
        for bad in ["", "robin", "robin@example", "ro bin@example.com", "@example.com"] {
            assert_eq!(email(bad).unwrap_err().code, 400, "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_issue_id() {
        let id = Uuid::new_v4();
        assert_eq!(issue_id(&id.to_string()).unwrap(), id);
        assert_eq!(issue_id("42").unwrap_err().code, 404);
    }
}
