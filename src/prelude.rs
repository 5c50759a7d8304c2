pub use crate::builder::MapBuilder;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::{DEFAULT_MAX_AGE, ExpiringCore};
pub use crate::error::UnsupportedError;
pub use crate::map::ExpiringMap;
pub use crate::metrics::MapMetrics;
pub use crate::traits::{ConcurrentMap, CoreMap};
