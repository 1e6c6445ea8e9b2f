use std::env::var;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref HOST: String = var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    pub static ref PORT: u16 = var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(5000);
    pub static ref DATABASE_URL: Option<String> =
        var("DATABASE_URL").ok().filter(|url| !url.is_empty());
    pub static ref DATABASE_MAX_CONNECTIONS: u32 = var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|count| count.parse().ok())
        .unwrap_or(5);
}
