use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    cli::{AppContext, Command},
    error::CommandError,
    info,
    spotify::{LibraryFetcher, MetadataEnricher, PlaylistReconciler},
    success, warning,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub tracks: usize,
    pub reconciled: Vec<String>,
    pub failed: Vec<String>,
}

/// One full pipeline run: library → decoration → every playlist.
///
/// Holds the context's pipeline slot for the whole run; a concurrent call
/// fails with [`CommandError::Busy`] instead of racing on playlist snapshots.
pub async fn run_pipeline(ctx: &AppContext) -> Result<ReloadSummary, CommandError> {
    let _slot = ctx.try_claim_pipeline()?;
    let api = ctx.api.as_ref();
    let rules = ctx.rules().await;

    let tracks = LibraryFetcher::new(api)
        .fetch_all_saved_tracks()
        .await
        .map_err(|source| CommandError::Provider {
            stage: "Loading saved tracks",
            source,
        })?;
    info!("Successfully loaded {} songs", tracks.len());

    let decorated = MetadataEnricher::new(api).decorate(&tracks).await;

    let mut summary = ReloadSummary {
        tracks: tracks.len(),
        ..ReloadSummary::default()
    };
    for (name, result) in PlaylistReconciler::new(api)
        .reconcile_all(&rules, &decorated)
        .await
    {
        match result {
            Ok(_) => summary.reconciled.push(name),
            Err(_) => summary.failed.push(name),
        }
    }

    if summary.failed.is_empty() {
        success!("Successfully completed reload");
    } else {
        warning!(
            "Reload finished, {} playlist(s) failed: {}",
            summary.failed.len(),
            summary.failed.join(", ")
        );
    }
    Ok(summary)
}

pub struct Reload {
    ctx: Arc<AppContext>,
}

impl Reload {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Command for Reload {
    fn name(&self) -> &'static str {
        "reload"
    }

    fn usage(&self) -> &'static str {
        "reload"
    }

    async fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        if !args.is_empty() {
            return Err(CommandError::Usage(self.usage()));
        }
        run_pipeline(&self.ctx).await.map(|_| ())
    }
}
