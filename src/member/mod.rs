//! Member domain
//!
//! The record saved and listed by the member controllers, plus the
//! in-memory store they share.

mod repository;

pub use repository::MemberRepository;

use serde::Serialize;

/// A saved member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: u64,
    pub username: String,
    pub age: u32,
}
