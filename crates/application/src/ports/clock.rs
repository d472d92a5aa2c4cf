use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Time source for entry ages (wall clock) and trim slices (monotonic).
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn instant(&self) -> Instant {
        (**self).instant()
    }
}
