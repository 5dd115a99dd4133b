//! # Base types for magpie
//!
//! This is an auxiliary crate for `magpie`, which contains the plain value types. It is split
//! from the main crate, so everything declared here can be used in the build script for `magpie`.
//!
//! Normally you don't want to use this crate directly. Use `magpie` instead.

pub mod bitboard;
pub mod bitboard_consts;
pub mod geometry;
pub mod types;
