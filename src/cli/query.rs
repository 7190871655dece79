//! Read command handlers: `search`, `user-tweets`, `tweet`

use crate::cli::{CommandContext, GlobalOptions, SearchArgs, UserTweetsArgs};
use crate::config::Config;
use crate::error::Result;
use crate::models::{RequestDescriptor, SearchOptions};
use crate::output;

/// Run `search`.
pub async fn search(args: SearchArgs, config: &Config, opts: &GlobalOptions) -> Result<()> {
    let descriptor = RequestDescriptor::search(
        &args.query,
        SearchOptions {
            limit: usize::from(args.limit),
            sort: args.sort,
            filters: args.filters.into(),
            since: args.since,
            quick: args.quick,
        },
    )?;
    execute(&descriptor, config, opts).await
}

/// Run `user-tweets`.
pub async fn user_tweets(
    args: UserTweetsArgs,
    config: &Config,
    opts: &GlobalOptions,
) -> Result<()> {
    let descriptor = RequestDescriptor::user_tweets(
        &args.username,
        usize::from(args.limit),
        args.sort,
        args.filters.into(),
    )?;
    execute(&descriptor, config, opts).await
}

/// Run `tweet`.
pub async fn tweet(id: &str, config: &Config, opts: &GlobalOptions) -> Result<()> {
    let descriptor = RequestDescriptor::tweet(id)?;
    execute(&descriptor, config, opts).await
}

async fn execute(
    descriptor: &RequestDescriptor,
    config: &Config,
    opts: &GlobalOptions,
) -> Result<()> {
    let ctx = CommandContext::new(config, opts)?;
    let envelope = ctx.orchestrator.execute(descriptor, ctx.no_cache).await?;
    output::print(&envelope)
}
