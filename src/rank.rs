//! Season filtering, role classification and relevance ordering.

use tracing::debug;

use crate::BANNER_BASE_URL;
use crate::record::{ImageRole, RankedImageInfo, RawBannerRecord};

/// Filter extracted records down to the requested season, classify them into
/// roles and order them best-first.
///
/// The sort is stable and descending on `(language affinity, community
/// rating, vote count)`; records with equal keys keep their feed order.
/// An unmatched or negative `target_season` simply yields an empty list.
pub fn rank_images(
    records: Vec<RawBannerRecord>,
    target_season: i32,
    preferred_language: &str,
) -> Vec<RankedImageInfo> {
    let total = records.len();

    let mut keyed: Vec<(u8, f64, u32, RankedImageInfo)> = records
        .into_iter()
        .filter_map(|record| accept(record, target_season))
        .map(|info| {
            (
                language_score(info.language.as_deref(), preferred_language),
                info.rating.unwrap_or(0.0),
                info.vote_count.unwrap_or(0),
                info,
            )
        })
        .collect();

    keyed.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| b.1.total_cmp(&a.1))
            .then_with(|| b.2.cmp(&a.2))
    });

    debug!(
        total,
        matched = keyed.len(),
        season = target_season,
        language = preferred_language,
        "ranked season images"
    );

    keyed.into_iter().map(|(_, _, _, info)| info).collect()
}

/// Apply the season filter and role classification to one record, turning
/// survivors into caller-facing image infos with absolute URLs.
fn accept(record: RawBannerRecord, target_season: i32) -> Option<RankedImageInfo> {
    let path = record.path.as_deref().filter(|p| !p.is_empty())?;
    if record.season? != target_season {
        return None;
    }
    let role = classify(record.banner_type.as_deref(), record.banner_type2.as_deref())?;

    let url = format!("{BANNER_BASE_URL}{path}");
    let thumbnail_url = record
        .thumbnail_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{BANNER_BASE_URL}{p}"));

    Some(RankedImageInfo {
        url,
        thumbnail_url,
        role,
        language: record.language,
        rating: record.rating,
        vote_count: record.vote_count,
        width: record.width,
        height: record.height,
    })
}

/// Map the two banner-type hints onto a role. Unknown combinations are not
/// an error; the record is just excluded.
fn classify(banner_type: Option<&str>, banner_type2: Option<&str>) -> Option<ImageRole> {
    let coarse = banner_type.unwrap_or("");
    if coarse.eq_ignore_ascii_case("season") {
        let fine = banner_type2.unwrap_or("");
        if fine.eq_ignore_ascii_case("season") {
            Some(ImageRole::Primary)
        } else if fine.eq_ignore_ascii_case("seasonwide") {
            Some(ImageRole::Banner)
        } else {
            None
        }
    } else if coarse.eq_ignore_ascii_case("fanart") {
        Some(ImageRole::Backdrop)
    } else {
        None
    }
}

/// Language affinity tier, the primary sort key. 3 is a perfect match, 0 a
/// mismatch. Untagged images rank with the preferred language for English
/// callers and one tier down for everyone else.
fn language_score(language: Option<&str>, preferred: &str) -> u8 {
    let prefers_english = preferred.eq_ignore_ascii_case("en");
    // An exact tag match wins outright, even when both sides are the empty
    // string.
    if language.is_some_and(|lang| lang.eq_ignore_ascii_case(preferred)) {
        return 3;
    }
    if !prefers_english && language.is_some_and(|lang| lang.eq_ignore_ascii_case("en")) {
        return 2;
    }
    if language.is_none_or(|lang| lang.is_empty()) {
        return if prefers_english { 3 } else { 2 };
    }
    0
}
