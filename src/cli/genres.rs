use std::{io, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use csv::{QuoteStyle, WriterBuilder};

use crate::{
    cli::{AppContext, Command},
    error::CommandError,
    info,
    spotify::{LibraryFetcher, MetadataEnricher},
    success,
    types::Artist,
    utils,
};

pub const DEFAULT_OUTPUT: &str = "./output.csv";

/// Writes one `"artist","genre,genre"` line per artist, sorted by name.
pub fn write_genres_csv<W: io::Write>(artists: &[Artist], writer: W) -> Result<(), csv::Error> {
    let mut sorted: Vec<&Artist> = artists.iter().collect();
    sorted.sort_by(|a, b| utils::locale_cmp(&a.name, &b.name));

    let mut csv = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);
    for artist in sorted {
        csv.write_record([artist.name.as_str(), artist.genres.join(",").as_str()])?;
    }
    csv.flush()?;
    Ok(())
}

pub struct ExportGenres {
    ctx: Arc<AppContext>,
}

impl ExportGenres {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Command for ExportGenres {
    fn name(&self) -> &'static str {
        "genres"
    }

    fn usage(&self) -> &'static str {
        "genres [output path]"
    }

    async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        let path = match args {
            [] => PathBuf::from(DEFAULT_OUTPUT),
            [path] => PathBuf::from(path),
            _ => return Err(CommandError::Usage(self.usage())),
        };

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

        let mut buffer = Vec::new();
        write_genres_csv(&artists, &mut buffer)?;
        async_fs::write(&path, buffer).await?;

        success!(
            "Exported genres of {} artists to {}",
            artists.len(),
            path.display()
        );
        Ok(())
    }
}
