// src/types/mod.rs
pub mod profile;
pub mod response;
