//! Internal utilities for the Ferrule VST2 host bridge.
//!
//! This crate provides low-level helpers shared between `ferrule-core` and
//! `ferrule-vst2`. It has zero external dependencies.
//!
//! # Usage
//!
//! This crate is an internal implementation detail and is not intended for
//! direct use by host authors. Use the `ferrule` facade crate instead.
//!
//! # Contents
//!
//! - [`encode_ascii`] - Write a string into a fixed-width, null-padded ASCII field
//! - [`decode_ascii`] - Read a fixed-width ASCII field back into a `String`

pub mod ascii;

pub use ascii::{decode_ascii, encode_ascii};
