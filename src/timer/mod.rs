//! Countdown for the bounded recording window

mod countdown;

pub use countdown::{CountdownEvent, CountdownId, CountdownTimer};
