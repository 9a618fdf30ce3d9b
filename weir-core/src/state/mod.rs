use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::{EventTime, StreamData, TimestampedValue};
use crate::window::{TimeWindow, Trigger, TriggerState};

mod copy_on_access;

pub use copy_on_access::*;

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
