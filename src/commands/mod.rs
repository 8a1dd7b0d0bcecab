// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod month;
pub mod tx;
pub mod recurring;
pub mod loan;
pub mod doctor;
