use std::{cell::RefCell, cmp::Ordering};

use chrono::Utc;
use feruca::Collator;
use rand::{Rng, distr::Alphanumeric};
use url::Url;

const STATE_LENGTH: usize = 16;

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Random anti-CSRF state for the authorization request.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Orders names the way a reader expects, using the Unicode Collation
/// Algorithm with the CLDR root order: `Ásgeir` sorts next to `Asgeir`, not
/// after `Zappa`. The exact string breaks remaining ties so distinct names
/// never compare equal.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let collated = COLLATOR.with(|collator| match collator.try_borrow_mut() {
        Ok(mut collator) => collator.collate(a, b),
        Err(_) => Collator::default().collate(a, b),
    });
    collated.then_with(|| a.cmp(b))
}

/// Accepts a bare artist id or an `https://open.spotify.com/artist/<id>` link.
pub fn parse_artist_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if !input.starts_with("https://") && !input.starts_with("http://") {
        return Some(input.to_string());
    }

    let url = Url::parse(input).ok()?;
    let mut segments = url.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "artist" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }
    }
    None
}

/// Genres as shown to the operator: comma separated, or `NOT RATED`.
pub fn format_genres(genres: &[String]) -> String {
    if genres.is_empty() {
        "NOT RATED".to_string()
    } else {
        genres.join(",")
    }
}
