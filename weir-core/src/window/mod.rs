use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time::{EVENT_TIME_MAX, EVENT_TIME_MIN};
use crate::types::{EventTime, TimestampedValue};

mod assigners;
mod primitives;
mod reduce;
mod strategy;
mod triggers;

pub use assigners::*;
pub use primitives::*;
pub use reduce::*;
pub use strategy::*;
pub use triggers::*;

#[cfg(test)]
#[path = "tests/window_tests.rs"]
mod tests;
