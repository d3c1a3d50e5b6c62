// Authentication: argon2 password hashing, HS256 bearer tokens, user accounts.

pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
