//! Subway line server.
//!
//! Keeps each line as an ordered chain of segments between stations, and
//! serves the operations that grow and shrink it over HTTP.

pub mod cache;
pub mod config;
pub mod domain;
pub mod service;
pub mod stations;
pub mod store;
pub mod web;
