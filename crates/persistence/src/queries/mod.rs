// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `activities`: activity aggregates (row, responsible persons, participants, attendance)
//! - `audit`: per-activity audit timeline
//! - `notifications`: a user's notifications
//! - `users`: accounts, member directory and sessions

pub mod activities;
pub mod audit;
pub mod notifications;
pub mod users;
