// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod stat;

pub use cat::cat_command;
pub use ls::ls_command;
pub use mkdir::mkdir_command;
pub use mv::mv_command;
pub use put::{PutSource, put_command};
pub use rm::rm_command;
pub use stat::stat_command;
