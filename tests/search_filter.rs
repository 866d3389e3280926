use medscribe::search::{filter_records, load_records, ResultList, SearchBox, SearchRecord};
use std::time::{Duration, Instant};

fn catalogue() -> Vec<SearchRecord> {
    vec![
        SearchRecord::new("1", "Aspirin")
            .with_field("dosage", "100mg")
            .with_field("frequency", "Once daily"),
        SearchRecord::new("2", "Paracetamol")
            .with_field("dosage", "500mg")
            .with_field("frequency", "Twice daily"),
    ]
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn par_matches_only_paracetamol() {
    let records = catalogue();
    let hits = filter_records(&records, "par");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "2");
}

#[test]
fn matching_is_case_insensitive_and_ordered() {
    let records = vec![
        SearchRecord::new("a", "Amoxicillin"),
        SearchRecord::new("b", "Ciprofloxacin"),
        SearchRecord::new("c", "Ampicillin"),
    ];
    let ids: Vec<&str> = filter_records(&records, "CILLIN")
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn unmatched_query_shows_no_results_state() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);
    search.on_input("xx", t0);
    assert!(search.poll(t0 + ms(300)));
    assert_eq!(search.results(), &ResultList::NoResults);
    assert!(search.results().is_visible());
    assert!(search.matched_records().is_empty());
}

#[test]
fn burst_of_keystrokes_runs_one_pass_with_latest_query() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);

    for (at, query) in [(0, "pa"), (50, "par"), (100, "para"), (350, "as")] {
        assert!(!search.poll(t0 + ms(at)));
        search.on_input(query, t0 + ms(at));
    }
    for at in (360..650).step_by(10) {
        assert!(!search.poll(t0 + ms(at)), "fired early at {at}ms");
    }
    assert!(search.poll(t0 + ms(650)));
    assert!(!search.poll(t0 + ms(2000)));

    assert_eq!(search.filter_passes(), 1);
    let ids: Vec<&str> = search.matched_records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[test]
fn pause_longer_than_quiet_period_runs_a_pass_per_pause() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);
    let mut passes = Vec::new();

    search.on_input("as", t0);
    search.on_input("asp", t0 + ms(50));
    search.on_input("aspi", t0 + ms(100));
    for at in (100..=1000).step_by(10) {
        if at == 550 {
            search.on_input("par", t0 + ms(at));
        }
        if search.poll(t0 + ms(at)) {
            passes.push((at, search.matched_records()[0].name.clone()));
        }
    }

    assert_eq!(
        passes,
        vec![(400, "Aspirin".to_string()), (850, "Paracetamol".to_string())]
    );
}

#[test]
fn short_query_hides_results_and_cancels_pending_pass() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);
    search.on_input("as", t0);
    assert!(search.poll(t0 + ms(300)));
    assert!(search.results().is_visible());

    search.on_input("asp", t0 + ms(400));
    search.on_input("a", t0 + ms(450));
    assert_eq!(search.results(), &ResultList::Hidden);
    assert!(!search.poll(t0 + ms(2000)));
    assert_eq!(search.filter_passes(), 1);
}

#[test]
fn whitespace_is_trimmed_before_length_check() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);
    search.on_input("  a  ", t0);
    assert!(!search.poll(t0 + ms(1000)));
    assert_eq!(search.results(), &ResultList::Hidden);
}

#[test]
fn selecting_a_result_fills_target_and_closes_list() {
    let t0 = Instant::now();
    let mut search = SearchBox::new(catalogue(), ms(300), 2);
    search.on_input("par", t0);
    search.poll(t0 + ms(300));
    assert!(search.select(1).is_none());

    let picked = search.select(0).expect("first match");
    assert_eq!(picked.id, "2");
    assert_eq!(search.input(), "Paracetamol");
    assert_eq!(search.selection(), Some(&picked));
    assert_eq!(search.results(), &ResultList::Hidden);
    assert!(search.select(0).is_none());
}

#[test]
fn records_load_from_json_with_extra_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medicines.json");
    std::fs::write(
        &path,
        r#"[{"id":"m1","name":"Metformin","dosage":"500mg","frequency":"Twice daily"}]"#,
    )
    .unwrap();

    let records = load_records(&path).unwrap();
    assert_eq!(records[0].detail_line(), "500mg - Twice daily");
    assert!(load_records(dir.path().join("missing.json")).unwrap().is_empty());
}
