use crate::{
    models::{Seed, SeedInput},
    services::providers::MusicProvider,
};

/// Autocorrects a raw seed through the provider's best-match search
///
/// Fields the provider leaves blank keep the caller's spelling; no match at
/// all leaves the seed unchanged.
pub async fn resolve_seed(provider: &dyn MusicProvider, input: &SeedInput) -> Seed {
    let mut seed = Seed::unresolved(input);

    if let Some(best) = provider.search_best_match(&input.title, &input.artist).await {
        if !best.title.trim().is_empty() {
            seed.resolved_title = best.title;
        }
        if !best.artist.trim().is_empty() {
            seed.resolved_artist = best.artist;
        }
    }

    if seed.resolved_title != seed.original_title || seed.resolved_artist != seed.original_artist {
        tracing::debug!(
            original_title = %seed.original_title,
            original_artist = %seed.original_artist,
            resolved_title = %seed.resolved_title,
            resolved_artist = %seed.resolved_artist,
            "Seed autocorrected"
        );
    }

    seed
}
