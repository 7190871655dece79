//! Engagement threshold arguments

use clap::Args;

use crate::models::MetricFilters;

/// Minimum engagement thresholds shared by `search` and `user-tweets`.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct MetricFilterArgs {
    /// Drop tweets with fewer likes
    #[arg(long, default_value_t = 0)]
    pub min_likes: u64,

    /// Drop tweets with fewer replies
    #[arg(long, default_value_t = 0)]
    pub min_replies: u64,

    /// Drop tweets with fewer retweets
    #[arg(long, default_value_t = 0)]
    pub min_retweets: u64,
}

impl From<MetricFilterArgs> for MetricFilters {
    fn from(args: MetricFilterArgs) -> Self {
        MetricFilters {
            min_likes: args.min_likes,
            min_replies: args.min_replies,
            min_retweets: args.min_retweets,
        }
    }
}
