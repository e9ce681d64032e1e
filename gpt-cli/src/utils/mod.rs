// SPDX-License-Identifier: MIT

pub mod log;

pub use self::log::{LogLevel, set_log_level};
