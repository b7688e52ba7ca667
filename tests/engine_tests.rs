//! Template engine integration tests - extraction and rendering over real stories.

use madlib_engine::core::engine::{extract, placeholders_in, render};
use madlib_engine::genre_templates;
use std::collections::HashMap;

fn filler(placeholders: &[String]) -> HashMap<String, String> {
    placeholders
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), format!("word{}", i)))
        .collect()
}

#[test]
fn every_example_renders_without_leftover_blanks() {
    for record in genre_templates::all() {
        let values = filler(&record.placeholders);
        let story = render(&record.body, &values);
        assert!(
            placeholders_in(&story).is_empty(),
            "'{}' still has blanks: {:?}",
            record.title,
            placeholders_in(&story)
        );
        for p in &record.placeholders {
            assert!(!story.contains(&format!("[{}]", p)));
        }
    }
}

#[test]
fn extraction_matches_stored_example_placeholders() {
    for record in genre_templates::all() {
        let extraction = extract(&record.body);
        assert_eq!(extraction.placeholders, record.placeholders, "{}", record.title);
        assert_eq!(extraction.body, record.body);
    }
}

#[test]
fn repeated_blank_is_asked_once_and_filled_everywhere() {
    let extraction = extract("The [noun] saw another [noun] and a third [noun].");
    assert_eq!(extraction.placeholders, vec!["noun"]);

    let values = HashMap::from([("noun".to_string(), "llama".to_string())]);
    assert_eq!(
        render(&extraction.body, &values),
        "The llama saw another llama and a third llama."
    );
}

#[test]
fn render_result_independent_of_value_order() {
    let body = "[first] then [second] then [first][second]";
    let forward: HashMap<String, String> = [("first", "1"), ("second", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let backward: HashMap<String, String> = [("second", "2"), ("first", "1")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(render(body, &forward), "1 then 2 then 12");
    assert_eq!(render(body, &forward), render(body, &backward));
}

#[test]
fn partial_values_leave_other_blanks() {
    let values = HashMap::from([("name".to_string(), "Ann".to_string())]);
    assert_eq!(
        render("Hi [name], you are [adjective]!", &values),
        "Hi Ann, you are [adjective]!"
    );
}
