// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `activities`: `persist_new_activity` / `persist_transition`, each one transaction
//! - `notifications`: read flags
//! - `users`: accounts and sessions

pub mod activities;
pub mod notifications;
pub mod users;

pub use activities::PersistTransitionResult;
