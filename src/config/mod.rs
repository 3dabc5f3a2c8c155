// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for ondemand-chat
//!
//! Handles loading settings and resolving the per-run configuration.

pub mod settings;

pub use settings::*;
