// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend setup.
//!
//! Only `SQLite` is supported. Everything here is connection plumbing that
//! Diesel DSL cannot express (PRAGMAs, `last_insert_rowid()`); queries and
//! mutations live in `queries/` and `mutations/`.

pub mod sqlite;
