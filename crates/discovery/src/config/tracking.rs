//! View Tracking Config

use clap::Args;
use jiff::SignedDuration;

use crate::domain::views::TrackingPolicy;

/// View tracking windows.
#[derive(Debug, Args)]
pub struct TrackingConfig {
    /// Repeat views by the same visitor within this many seconds are not counted
    #[arg(long, env = "VIEW_DEDUP_WINDOW_SECS", default_value_t = 10)]
    pub view_dedup_window_secs: u32,

    /// Days of history kept visible to signed-in users
    #[arg(long, env = "USER_HISTORY_DAYS", default_value_t = 30)]
    pub user_history_days: u32,

    /// Days of history kept visible to guest sessions
    #[arg(long, env = "GUEST_HISTORY_DAYS", default_value_t = 7)]
    pub guest_history_days: u32,
}

impl TrackingConfig {
    #[must_use]
    pub fn policy(&self) -> TrackingPolicy {
        let days = |count: u32| SignedDuration::from_hours(i64::from(count) * 24);

        TrackingPolicy {
            dedup_window: SignedDuration::from_secs(i64::from(self.view_dedup_window_secs)),
            user_history_window: days(self.user_history_days),
            guest_history_window: days(self.guest_history_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        tracking: TrackingConfig,
    }

    #[test]
    fn defaults_match_the_default_policy() -> TestResult {
        let harness = Harness::try_parse_from(["harness"])?;

        assert_eq!(harness.tracking.policy(), TrackingPolicy::default());

        Ok(())
    }
}
