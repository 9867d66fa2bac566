//! Date window filter
//!
//! The notification API only understands a lower date bound. The upper
//! bound (`until`) is enforced here: records come back in ascending date
//! order, so the first record past the bound ends the listing, even in the
//! middle of a page.

use chrono::{DateTime, SubsecRound, Utc};

use crate::backend::NotificationRecord;

/// A page after the upper bound has been applied
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedPage {
    /// Leading records dated at or before the bound
    pub kept: Vec<NotificationRecord>,

    /// The page crossed the bound; no further pages should be fetched
    pub exhausted: bool,
}

/// Keep the prefix of `page` dated `<= until` (inclusive)
///
/// Dates compare at whole seconds. With no bound every record is kept and the page is never exhausted.
pub fn apply(page: Vec<NotificationRecord>, until: Option<DateTime<Utc>>) -> WindowedPage {
    let Some(until) = until else {
        return WindowedPage {
            kept: page,
            exhausted: false,
        };
    };

    let mut kept = page;
    match kept.iter().position(|r| r.last_updated.trunc_subsecs(0) > until) {
        Some(cut) => {
            kept.truncate(cut);
            WindowedPage {
                kept,
                exhausted: true,
            }
        }
        None => WindowedPage {
            kept,
            exhausted: false,
        },
    }
}
