use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    cli::{AppContext, Command},
    error::CommandError,
    info, utils,
};

/// Prints `<name> +++ <genres>` for one artist id or artist link.
pub struct Info {
    ctx: Arc<AppContext>,
}

impl Info {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Command for Info {
    fn name(&self) -> &'static str {
        "info"
    }

    fn usage(&self) -> &'static str {
        "info <artist ID or URL>"
    }

    async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        let [input] = args else {
            return Err(CommandError::Usage(self.usage()));
        };
        let Some(artist_id) = utils::parse_artist_id(input) else {
            return Err(CommandError::Usage(self.usage()));
        };

        let artist = self
            .ctx
            .api
            .artist(&artist_id)
            .await
            .map_err(|source| CommandError::Provider {
                stage: "Artist lookup",
                source,
            })?;

        info!("{} +++ {}", artist.name, utils::format_genres(&artist.genres));
        Ok(())
    }
}
