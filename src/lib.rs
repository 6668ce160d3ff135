//! Client library for the schedule-time records of an academic
//! administration dashboard.
//!
//! The backend owns the data; this crate owns the client-side rules around
//! it: canonical day-group names (`"Lu-Vi"`), localized 12-hour range text,
//! a total display ordering, field-level validation, and an optimistic list
//! synchronizer that patches the locally held list before the server
//! confirms, then commits or rolls back per outcome.

pub mod schedule_time;

pub use schedule_time::{
    ClientConfig, ListQuery, MutationPhase, NewScheduleTime, Notice, NoticeKind, Page,
    RestScheduleTimeRepository, ScheduleTime, ScheduleTimeError, ScheduleTimePatch,
    ScheduleTimeRepository, ScheduleTimeSync,
};
