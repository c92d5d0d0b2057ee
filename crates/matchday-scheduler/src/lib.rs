//! `matchday-scheduler` — reminder planning and generation-swapped execution.
//!
//! # Overview
//!
//! [`planner::plan`] is a pure function turning a fixture list, the current
//! time, and the configured lead times into a de-duplicated set of
//! [`ReminderJob`]s keyed by `(match id, lead hours)`.
//!
//! The [`engine::SchedulerEngine`] holds the jobs of exactly one *generation*
//! in memory and polls every second, forwarding due reminders to the delivery
//! channel. A resync installs a whole new generation atomically: cancel and
//! install happen under one lock, which the due-scan also takes, so a job from
//! a superseded generation can never fire after the swap and no partial
//! generation is observable. The schedule is deliberately not persisted — it
//! is rebuilt from the feed at startup and on every resync.
//!
//! # Job lifecycle
//!
//! | State     | Where it lives                                         |
//! |-----------|--------------------------------------------------------|
//! | pending   | in the generation's queue, ordered by fire instant     |
//! | firing    | popped under the lock, handed to the delivery channel  |
//! | fired     | in the fired set (terminal; suppresses re-firing)      |
//! | cancelled | dropped when its generation is swapped out (terminal)  |

pub mod engine;
pub mod planner;
pub mod types;

pub use engine::{SchedulerEngine, SchedulerHandle};
pub use planner::plan;
pub use types::{JobKey, ReminderJob};
