// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod batch;
pub mod config;
pub mod counter;
pub mod error;
pub mod generator;
pub mod record;
pub mod splitter;
pub mod writer;

pub use error::{Error, Result};
