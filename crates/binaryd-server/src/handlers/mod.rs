//! Route handlers

pub mod commands;
pub mod help;
