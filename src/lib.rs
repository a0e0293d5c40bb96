#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod config;
pub mod gps_processor;
mod logs;
pub mod main_db;
pub mod route;
pub mod route_store;
pub mod tracking_session;
mod utils;
