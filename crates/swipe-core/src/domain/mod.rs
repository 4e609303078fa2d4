//! # Domain Types
//!
//! Strongly-typed request inputs shared by the services. Every type validates
//! at construction so an invalid value never reaches a provider gateway.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Normalized ticker symbol |
//! | [`Interval`] | Historical bar interval (1m .. 3mo) |
//! | [`CalendarDate`] | Caller-supplied `YYYY-MM-DD` date |
//! | [`UtcDateTime`] | UTC timestamp for outcome metadata |

mod calendar;
mod interval;
mod symbol;

pub use calendar::{format_session_time, CalendarDate, UtcDateTime};
pub use interval::Interval;
pub use symbol::Symbol;
