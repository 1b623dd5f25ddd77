use std::cmp::Ordering;

use genrefy::utils::*;

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly 16 characters
    assert_eq!(state.len(), 16);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    assert_ne!(state, generate_state());
}

#[test]
fn test_locale_cmp_ignores_case_first() {
    assert_eq!(locale_cmp("abba", "Beatles"), Ordering::Less);
    assert_eq!(locale_cmp("Zappa", "abba"), Ordering::Greater);

    // Same letters, different case: lowercase first, never equal
    assert_eq!(locale_cmp("abba", "ABBA"), Ordering::Less);
    assert_eq!(locale_cmp("ABBA", "abba"), Ordering::Greater);
    assert_eq!(locale_cmp("abba", "abba"), Ordering::Equal);
}

#[test]
fn test_locale_cmp_sorts_names() {
    let mut names = vec!["motörhead", "Metallica", "ac/dc", "Björk", "AC/DC"];
    names.sort_by(|a, b| locale_cmp(a, b));

    assert_eq!(names, vec!["ac/dc", "AC/DC", "Björk", "Metallica", "motörhead"]);
}

#[test]
fn test_locale_cmp_places_accented_letters_with_their_base() {
    assert_eq!(locale_cmp("Ásgeir", "Beck"), Ordering::Less);
    assert_eq!(locale_cmp("Émilie Simon", "Florence"), Ordering::Less);
    assert_eq!(locale_cmp("Björk", "Bjorn"), Ordering::Less);

    // The accent only decides between otherwise equal names
    assert_eq!(locale_cmp("Asgeir", "Ásgeir"), Ordering::Less);

    let mut names = vec!["Émilie Simon", "Florence", "Ásgeir", "Beck", "a-ha", "A-ha"];
    names.sort_by(|a, b| locale_cmp(a, b));

    assert_eq!(
        names,
        vec!["a-ha", "A-ha", "Ásgeir", "Beck", "Émilie Simon", "Florence"]
    );
}

#[test]
fn test_parse_artist_id() {
    // Bare id
    assert_eq!(
        parse_artist_id("0OdUWJ0sBjDrqHygGUXeCF"),
        Some("0OdUWJ0sBjDrqHygGUXeCF".to_string())
    );

    // Share link with tracking query
    assert_eq!(
        parse_artist_id("https://open.spotify.com/artist/0OdUWJ0sBjDrqHygGUXeCF?si=abc123"),
        Some("0OdUWJ0sBjDrqHygGUXeCF".to_string())
    );

    // Localized link
    assert_eq!(
        parse_artist_id("https://open.spotify.com/intl-de/artist/4Z8W4fKeB5YxbusRsdQVPb"),
        Some("4Z8W4fKeB5YxbusRsdQVPb".to_string())
    );

    // Surrounding whitespace is ignored
    assert_eq!(
        parse_artist_id("  4Z8W4fKeB5YxbusRsdQVPb \n"),
        Some("4Z8W4fKeB5YxbusRsdQVPb".to_string())
    );
}

#[test]
fn test_parse_artist_id_rejects_non_artist_input() {
    assert_eq!(parse_artist_id(""), None);
    assert_eq!(parse_artist_id("   "), None);
    assert_eq!(
        parse_artist_id("https://open.spotify.com/track/6rqhFgbbKwnb9MLmUQDhG6"),
        None
    );
    assert_eq!(parse_artist_id("https://open.spotify.com/artist/"), None);
}

#[test]
fn test_format_genres() {
    assert_eq!(format_genres(&[]), "NOT RATED");
    assert_eq!(format_genres(&["rock".to_string()]), "rock");
    assert_eq!(
        format_genres(&["rock".to_string(), "hard rock".to_string()]),
        "rock,hard rock"
    );
}

#[test]
fn test_now_ms_is_current() {
    let now = now_ms();
    let chrono_now = chrono::Utc::now().timestamp_millis();

    assert!((chrono_now - now).abs() < 5_000);
}
