use super::*;

#[test]
fn mixed_line_splits_into_three_runs() {
    let runs = segment_runs("Great job 🎉 today");
    assert_eq!(
        runs,
        vec![
            TextRun::Plain("Great job ".to_string()),
            TextRun::Emoji("🎉".to_string()),
            TextRun::Plain(" today".to_string()),
        ]
    );
}

#[test]
fn adjacent_emoji_share_a_run_but_not_a_cluster() {
    let runs = segment_runs("🔥🚀 go");
    assert_eq!(runs[0], TextRun::Emoji("🔥🚀".to_string()));
    assert_eq!(emoji_clusters(runs[0].as_str()), vec!["🔥", "🚀"]);
}

#[test]
fn sequences_stay_in_one_cluster() {
    // family (ZWJ), thumbs up with skin tone, flag, heart with VS16, keycap
    let text = "👨\u{200D}👩\u{200D}👧👍🏽🇫🇷❤\u{FE0F}1\u{FE0F}\u{20E3}";
    let clusters = emoji_clusters(text);
    assert_eq!(
        clusters,
        vec![
            "👨\u{200D}👩\u{200D}👧",
            "👍🏽",
            "🇫🇷",
            "❤\u{FE0F}",
            "1\u{FE0F}\u{20E3}",
        ]
    );
    assert_eq!(segment_runs(text).len(), 1);
}

#[test]
fn plain_digits_and_punctuation_are_not_emoji() {
    let runs = segment_runs("Top 10 tips: #1, #2!");
    assert_eq!(runs, vec![TextRun::Plain("Top 10 tips: #1, #2!".to_string())]);
}

#[test]
fn stray_selectors_are_dropped() {
    let plain: String = segment_runs("a\u{FE0F}b 🎉!")
        .into_iter()
        .filter_map(|r| match r {
            TextRun::Plain(s) => Some(s),
            TextRun::Emoji(_) => None,
        })
        .collect();
    assert_eq!(plain, "ab !");
    assert!(segment_runs("").is_empty());
}
