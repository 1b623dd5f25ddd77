use genrefy::{
    config::{load_playlists, parse_playlists},
    error::ConfigError,
    types::EnergyRange,
};

const PLAYLISTS: &str = r#"
[[playlists]]
id = "37i9dQZF1DXcBWIGoYBM5M"
name = "Rock"
genres = ["rock", "classic rock"]
ignored_genres = ["pop rock"]
artists = ["Queen"]

[[playlists]]
id = "1a2b3c"
name = "Chill"
genres = ["*"]
energy_range = { min_energy = 0.0, max_energy = 0.4 }
"#;

fn invalid_reason(content: &str) -> String {
    match parse_playlists(content) {
        Err(ConfigError::InvalidRule { reason, .. }) => reason,
        other => panic!("expected an invalid rule, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_parse_playlists() {
    let rules = parse_playlists(PLAYLISTS).unwrap();
    assert_eq!(rules.len(), 2);

    let rock = &rules[0];
    assert_eq!(rock.id, "37i9dQZF1DXcBWIGoYBM5M");
    assert_eq!(rock.genres, vec!["rock", "classic rock"]);
    assert_eq!(rock.ignored_genres, vec!["pop rock"]);
    assert_eq!(rock.artists, vec!["Queen"]);
    assert_eq!(rock.energy_range, None);
    assert!(!rock.matches_all_genres());

    let chill = &rules[1];
    assert!(chill.matches_all_genres());
    assert!(chill.ignored_genres.is_empty());
    assert!(chill.artists.is_empty());
    assert_eq!(
        chill.energy_range,
        Some(EnergyRange {
            min_energy: 0.0,
            max_energy: 0.4
        })
    );
}

#[test]
fn test_parse_empty_file() {
    assert!(parse_playlists("").unwrap().is_empty());
}

#[test]
fn test_parse_invalid_toml() {
    assert!(matches!(
        parse_playlists("[[playlists]\nid = "),
        Err(ConfigError::Parse(_))
    ));

    // genres is required
    assert!(matches!(
        parse_playlists("[[playlists]]\nid = \"a\"\nname = \"A\"\n"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_rule_validation() {
    assert_eq!(
        invalid_reason("[[playlists]]\nid = \"\"\nname = \"A\"\ngenres = [\"rock\"]\n"),
        "missing playlist id"
    );
    assert_eq!(
        invalid_reason("[[playlists]]\nid = \"a\"\nname = \" \"\ngenres = [\"rock\"]\n"),
        "missing playlist name"
    );
    assert_eq!(
        invalid_reason("[[playlists]]\nid = \"a\"\nname = \"A\"\ngenres = []\n"),
        "at least one genre (or \"*\") is required"
    );
    assert_eq!(
        invalid_reason(
            "[[playlists]]\nid = \"a\"\nname = \"A\"\ngenres = [\"*\"]\nenergy_range = { min_energy = 0.8, max_energy = 0.2 }\n"
        ),
        "min_energy is greater than max_energy"
    );
    assert_eq!(
        invalid_reason(
            "[[playlists]]\nid = \"a\"\nname = \"A\"\ngenres = [\"*\"]\nenergy_range = { min_energy = 0.0, max_energy = 1.5 }\n"
        ),
        "energy bounds must be within 0.0 and 1.0"
    );
}

#[test]
fn test_energy_range_is_inclusive() {
    let range = EnergyRange {
        min_energy: 0.5,
        max_energy: 0.7,
    };

    assert!(range.contains(0.5));
    assert!(range.contains(0.6));
    assert!(range.contains(0.7));
    assert!(!range.contains(0.49));
    assert!(!range.contains(0.71));
}

#[tokio::test]
async fn test_load_playlists_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("playlists.toml");
    std::fs::write(&path, PLAYLISTS).unwrap();

    let rules = load_playlists(&path).await.unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[1].name, "Chill");
}

#[tokio::test]
async fn test_load_playlists_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    match load_playlists(&path).await {
        Err(ConfigError::Read { path: reported, .. }) => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected read error, got {:?}", other.map(|r| r.len())),
    }
}
