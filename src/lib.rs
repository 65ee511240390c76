//! Season cover-art extraction and ranking for TheTVDB banner feeds.
//!
//! The banner feed is an XML document listing every candidate image known
//! for a series. This crate streams the `<Banner>` records out of such a
//! document, keeps the ones matching a requested season, classifies them
//! into poster / wide banner / backdrop roles and orders them by language
//! affinity and community rating.
//!
//! Fetching the feed, refreshing the on-disk cache and resolving which
//! series a library item maps to are the caller's concern.

pub mod extract;
pub mod rank;
pub mod record;

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use extract::BannerExtractor;
pub use rank::rank_images;
pub use record::{ImageRole, RankedImageInfo, RawBannerRecord};

/// Metadata provider the feed format belongs to.
pub const PROVIDER_NAME: &str = "TheTVDB";

/// Base URL prepended to the relative image paths in the feed.
pub const BANNER_BASE_URL: &str = "https://thetvdb.com/banners/";

#[derive(Debug, Error)]
pub enum FeedError {
    /// Structurally malformed document. Fatal to the extraction call; the
    /// caller decides whether to retry with a fresh fetch.
    #[error("malformed banner feed: {0}")]
    Parse(#[from] quick_xml::Error),

    /// The document ended inside an unclosed element.
    #[error("banner feed truncated")]
    UnexpectedEof,

    /// Element content that is not valid UTF-8.
    #[error("banner feed encoding error")]
    InvalidEncoding,

    /// A `<Season>` value was present but not an integer. Season numbering
    /// integrity is required for correct filtering, so this is fatal where
    /// bad ratings or vote counts are not.
    #[error("malformed season field: {0:?}")]
    MalformedSeason(String),

    /// Cooperative cancellation was observed between records.
    #[error("extraction cancelled")]
    Cancelled,

    /// Cache file access failed for a reason other than absence.
    #[error("feed io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract and rank the season images of a feed document.
pub fn season_images<R: BufRead>(
    input: R,
    target_season: i32,
    preferred_language: &str,
) -> Result<Vec<RankedImageInfo>, FeedError> {
    season_images_with_cancellation(
        input,
        target_season,
        preferred_language,
        CancellationToken::new(),
    )
}

/// Like [`season_images`], with a caller-supplied cancellation token. The
/// token is observed at every record boundary; cancellation yields
/// [`FeedError::Cancelled`], never a partial list.
pub fn season_images_with_cancellation<R: BufRead>(
    input: R,
    target_season: i32,
    preferred_language: &str,
    cancel: CancellationToken,
) -> Result<Vec<RankedImageInfo>, FeedError> {
    let records = BannerExtractor::with_cancellation(input, cancel)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rank_images(records, target_season, preferred_language))
}

/// Extract and rank season images from a cached feed document on disk.
///
/// A feed that has not been fetched yet is not an error: a missing file or
/// directory yields an empty list.
pub fn season_images_from_cache(
    path: &Path,
    target_season: i32,
    preferred_language: &str,
    cancel: CancellationToken,
) -> Result<Vec<RankedImageInfo>, FeedError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "banner feed not cached yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    season_images_with_cancellation(
        BufReader::new(file),
        target_season,
        preferred_language,
        cancel,
    )
}
