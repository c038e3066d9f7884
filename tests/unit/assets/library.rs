use super::*;

fn lib() -> AssetLibrary {
    AssetLibrary::from_paths(vec![
        PathBuf::from("music/Calm Piano.mp3"),
        PathBuf::from("music/epic_drums.mp3"),
        PathBuf::from("music/lofi_beats.mp3"),
    ])
}

#[test]
fn similarity_matches_known_ratios() {
    assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-12);
    assert!((similarity("same", "same") - 1.0).abs() < 1e-12);
    assert_eq!(similarity("abc", "xyz"), 0.0);
    assert_eq!(similarity("", ""), 1.0);
}

#[test]
fn exact_name_wins() {
    let m = lib().resolve("epic_drums.mp3").unwrap();
    assert_eq!(m, AssetMatch::Exact(PathBuf::from("music/epic_drums.mp3")));
}

#[test]
fn stem_match_ignores_case_and_extension() {
    let m = lib().resolve("calm piano.wav").unwrap();
    assert_eq!(m, AssetMatch::Stem(PathBuf::from("music/Calm Piano.mp3")));
}

#[test]
fn similar_name_resolves_fuzzily() {
    let m = lib().resolve("lofi beat.mp3").unwrap();
    match m {
        AssetMatch::Similar { path, score } => {
            assert_eq!(path, PathBuf::from("music/lofi_beats.mp3"));
            assert!(score >= PREFERRED_SIMILARITY);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unrelated_name_falls_back_to_first_entry() {
    let m = lib().resolve("zzzz").unwrap();
    assert_eq!(m, AssetMatch::Fallback(PathBuf::from("music/Calm Piano.mp3")));
}

#[test]
fn empty_library_resolves_nothing() {
    assert!(AssetLibrary::default().resolve("x.mp3").is_none());
    assert!(AssetLibrary::default().resolve_logged("music", "x.mp3").is_none());
}

#[test]
fn scan_filters_extensions_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.MP4", "a.mov", "notes.txt"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    let lib = AssetLibrary::scan(dir.path(), &["mp4", "mov"]).unwrap();
    let names: Vec<_> = lib
        .entries()
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["a.mov", "b.MP4"]);

    let missing = AssetLibrary::scan(&dir.path().join("nope"), &["mp4"]).unwrap();
    assert!(missing.is_empty());
}
