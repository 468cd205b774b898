pub mod berlin;
pub mod delivery;

mod dispatch;
mod schedule;

pub use dispatch::{DispatcherHandle, ReminderDispatcher, SWEEP_PERIOD};
pub use schedule::{ReminderScheduler, ScheduleError, ScheduleRequest, WhenKind};
