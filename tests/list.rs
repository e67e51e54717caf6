use vulkanseeds::domain::{Seed, SeedId, SortMode};
use vulkanseeds::error::SeedsError;
use vulkanseeds::list::{ListView, matches_query, sort_records};

fn seed(id: &str, title: &str, code: &str) -> Seed {
    Seed {
        id: SeedId::new(id),
        seed_code: code.to_string(),
        title: title.to_string(),
        description: String::new(),
        version: "1.20".to_string(),
        edition: "Java".to_string(),
        biomes: Vec::new(),
        features: Vec::new(),
        image_url: None,
        views: 0,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn loaded(records: Vec<Seed>) -> ListView {
    let mut view = ListView::new(SortMode::Popular);
    let ticket = view.begin_fetch();
    view.finish_fetch(ticket, Ok(records));
    view
}

fn visible_ids(view: &ListView) -> Vec<String> {
    view.visible()
        .iter()
        .map(|seed| seed.id.as_str().to_string())
        .collect()
}

#[test]
fn title_match_is_case_insensitive() {
    let mut view = loaded(vec![
        seed("1", "Village Spawn", "111"),
        seed("2", "Desert Temple", "222"),
    ]);
    view.set_query("village");
    assert_eq!(visible_ids(&view), vec!["1"]);
}

#[test]
fn seed_code_match_is_case_sensitive() {
    let mut view = loaded(vec![
        seed("lower", "One", "abcXYZ"),
        seed("upper", "Two", "ABCxyz"),
    ]);
    view.set_query("cXY");
    assert_eq!(visible_ids(&view), vec!["lower"]);
}

#[test]
fn description_features_and_biomes_match() {
    let mut by_description = seed("d", "A", "1");
    by_description.description = "Huge RAVINE at spawn".to_string();
    let mut by_feature = seed("f", "B", "2");
    by_feature.features = vec!["Ancient City".to_string()];
    let mut by_biome = seed("b", "C", "3");
    by_biome.biomes = vec!["Cherry Grove".to_string()];

    assert!(matches_query(&by_description, "ravine"));
    assert!(matches_query(&by_feature, "ancient"));
    assert!(matches_query(&by_biome, "GROVE"));
    assert!(!matches_query(&by_biome, "ancient"));
}

#[test]
fn filtering_keeps_store_order() {
    let mut view = loaded(vec![
        seed("3", "Island C", "1"),
        seed("1", "Island A", "2"),
        seed("2", "Mesa", "3"),
    ]);
    view.set_query("island");
    assert_eq!(visible_ids(&view), vec!["3", "1"]);
    view.pop_query_char();
    view.push_query_char('d');
    assert_eq!(visible_ids(&view), vec!["3", "1"]);
}

#[test]
fn popular_orders_by_views_descending() {
    let mut records = vec![seed("a", "A", "1"), seed("b", "B", "2"), seed("c", "C", "3")];
    records[0].views = 3;
    records[1].views = 10;
    records[2].views = 1;
    sort_records(&mut records, SortMode::Popular);
    let views = records.iter().map(|seed| seed.views).collect::<Vec<_>>();
    assert_eq!(views, vec![10, 3, 1]);
}

#[test]
fn recent_orders_by_created_at_descending() {
    let mut records = vec![seed("t2", "B", "2"), seed("t1", "A", "1"), seed("t3", "C", "3")];
    records[0].created_at = "2024-02-01T00:00:00Z".to_string();
    records[1].created_at = "2024-01-01T00:00:00Z".to_string();
    records[2].created_at = "2024-03-01T00:00:00+00:00".to_string();
    sort_records(&mut records, SortMode::Recent);
    let ids = records
        .iter()
        .map(|seed| seed.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["t3", "t2", "t1"]);
}

#[test]
fn loading_covers_exactly_one_fetch() {
    let mut view = ListView::new(SortMode::Popular);
    assert!(!view.is_loading());
    let ticket = view.begin_fetch();
    assert!(view.is_loading());
    view.finish_fetch(ticket, Ok(vec![seed("1", "A", "1")]));
    assert!(!view.is_loading());
}

#[test]
fn failed_fetch_keeps_last_known_list() {
    let mut view = loaded(vec![seed("1", "A", "1")]);
    let ticket = view.set_sort_mode(SortMode::Recent).unwrap();
    view.finish_fetch(ticket, Err(SeedsError::Transport("offline".to_string())));
    assert!(!view.is_loading());
    assert_eq!(view.records().len(), 1);
}

#[test]
fn failed_first_fetch_leaves_list_empty() {
    let mut view = ListView::new(SortMode::Popular);
    let ticket = view.begin_fetch();
    view.finish_fetch(
        ticket,
        Err(SeedsError::TransportStatus {
            status: 500,
            message: "boom".to_string(),
        }),
    );
    assert!(view.records().is_empty());
    assert!(view.visible().is_empty());
}
