//! Courier Quest - delivery courier simulation core

pub mod city;
pub mod core;
pub mod courier;
pub mod game;
pub mod history;
pub mod orders;
pub mod provider;
pub mod weather;
