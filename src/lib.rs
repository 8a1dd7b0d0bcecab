// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calc;
pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod monthkey;
pub mod persist;
pub mod recurrence;
pub mod sanitize;
pub mod store;
pub mod utils;
