#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! 311 call stream browser.
//!
//! Wires the feed cache to the three synchronized views — list, map, and
//! detail overlay — through the [`selection::SelectionCoordinator`], and
//! renders them on the console.

pub mod interactive;
pub mod map;
pub mod render;
pub mod selection;
