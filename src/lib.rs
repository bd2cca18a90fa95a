// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod naming;
pub mod printer;
pub mod registrar;
pub mod source;
pub mod storage;
pub mod template;

pub use error::{Result, SeedError};
