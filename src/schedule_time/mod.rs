//! Schedule-time domain: day-group codec, localized range formatting, total
//! display ordering, REST repository, and optimistic list synchronization.

mod cache;
pub mod config;
pub mod days;
mod error;
pub mod format;
mod notify;
pub mod order;
mod repository;
mod sync;
mod types;
pub mod validate;

pub use config::ClientConfig;
pub use error::ScheduleTimeError;
pub use notify::{Notice, NoticeKind};
pub use repository::{RestScheduleTimeRepository, ScheduleTimeRepository};
pub use sync::{MutationPhase, ScheduleTimeSync};
pub use types::{ListQuery, NewScheduleTime, Page, ScheduleTime, ScheduleTimePatch};
