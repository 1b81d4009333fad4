// src/lib.rs

//! shipyard: World of Warships encyclopedia mirror library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
#[cfg(test)]
pub(crate) mod test_support;
pub mod utils;
