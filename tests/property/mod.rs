// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `projection`: folding stacks into a cloud assembly
//! - `units`: resource-graph invariants of the DNS and site units

mod projection;
mod units;
