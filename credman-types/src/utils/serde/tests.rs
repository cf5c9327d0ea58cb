use serde::Deserialize;

use super::*;

#[derive(Debug, Deserialize)]
struct Timeout {
    #[serde(default, deserialize_with = "maybe_stringified")]
    num: Option<u32>,
}

fn timeout(json: &str) -> Option<u32> {
    serde_json::from_str::<Timeout>(json)
        .unwrap_or_else(|e| panic!("failed to parse {json}: {e}"))
        .num
}

#[test]
fn timeouts_from_numbers_and_strings() {
    assert_eq!(timeout(r#"{"num": 60000}"#), Some(60000));
    assert_eq!(timeout(r#"{"num": 1800.0}"#), Some(1800));
    assert_eq!(timeout(r#"{"num": 1800.1234}"#), Some(1800));
    assert_eq!(timeout(r#"{"num": 0.1234}"#), Some(0));
    assert_eq!(timeout(r#"{"num": "60000"}"#), Some(60000));
    assert_eq!(timeout(r#"{"num": "1800.5"}"#), Some(1800));
    assert_eq!(timeout(r#"{"num": "NaN"}"#), Some(0));
    assert_eq!(timeout(r#"{"num": "-Infinity"}"#), Some(0));
    assert_eq!(timeout(r#"{"num": -5}"#), Some(0));
    assert_eq!(timeout(r#"{"num": null}"#), None);
    assert_eq!(timeout(r#"{}"#), None);
}

#[test]
fn timeouts_reject_objects() {
    serde_json::from_str::<Timeout>(r#"{"num": {"ms": 5}}"#)
        .expect_err("an object is not a timeout");
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Color {
    Red,
    #[default]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Palette {
    #[serde(deserialize_with = "ignore_unknown")]
    main: Color,
    #[serde(deserialize_with = "ignore_unknown_vec")]
    all: Vec<Color>,
    #[serde(default, deserialize_with = "ignore_unknown_opt_vec")]
    extra: Option<Vec<Color>>,
}

#[test]
fn unknown_values_are_ignored() {
    let palette: Palette =
        serde_json::from_str(r#"{"main": "mauve", "all": ["red", "teal", "red"], "extra": null}"#)
            .expect("failed to parse");

    assert_eq!(palette.main, Color::Unknown);
    assert_eq!(palette.all, vec![Color::Red, Color::Red]);
    assert_eq!(palette.extra, None);
}
