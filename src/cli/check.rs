use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tabled::Table;

use crate::{
    cli::{AppContext, Command},
    error::CommandError,
    info,
    spotify::{LibraryFetcher, MetadataEnricher},
    success,
    types::{Artist, ArtistTableRow, PlaylistRule, WILDCARD_GENRE},
    utils,
};

/// Artists whose genres match no configured genre and who are not pinned by
/// any rule, sorted by name.
///
/// The wildcard is ignored here, it would otherwise hide every gap.
pub fn unmapped_artists<'a>(artists: &'a [Artist], rules: &[PlaylistRule]) -> Vec<&'a Artist> {
    let genres: HashSet<&str> = rules
        .iter()
        .flat_map(|r| r.genres.iter())
        .map(String::as_str)
        .filter(|g| *g != WILDCARD_GENRE)
        .collect();
    let pinned: HashSet<&str> = rules
        .iter()
        .flat_map(|r| r.artists.iter())
        .map(String::as_str)
        .collect();

    let mut missing: Vec<&Artist> = artists
        .iter()
        .filter(|a| !a.genres.iter().any(|g| genres.contains(g.as_str())))
        .filter(|a| !pinned.contains(a.name.as_str()))
        .collect();
    missing.sort_by(|a, b| utils::locale_cmp(&a.name, &b.name));
    missing
}

pub struct Check {
    ctx: Arc<AppContext>,
}

impl Check {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Command for Check {
    fn name(&self) -> &'static str {
        "check"
    }

    fn usage(&self) -> &'static str {
        "check"
    }

    async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        if !args.is_empty() {
            return Err(CommandError::Usage(self.usage()));
        }

        let api = self.ctx.api.as_ref();
        let tracks = LibraryFetcher::new(api)
            .fetch_all_saved_tracks()
            .await
            .map_err(|source| CommandError::Provider {
                stage: "Loading saved tracks",
                source,
            })?;
        info!("Successfully loaded {} songs", tracks.len());

        let artists = MetadataEnricher::new(api).artists_for_tracks(&tracks).await;
        info!("Loaded artist info, calculating missing genre mappings");

        let rules = self.ctx.rules().await;
        let missing = unmapped_artists(&artists, &rules);
        if missing.is_empty() {
            success!("No missing artist mappings");
            return Ok(());
        }

        info!("The following artists lack artist genre mappings:");
        let rows: Vec<ArtistTableRow> = missing
            .into_iter()
            .map(|a| ArtistTableRow {
                name: a.name.clone(),
                genres: utils::format_genres(&a.genres),
            })
            .collect();
        println!("{}", Table::new(rows));
        Ok(())
    }
}
