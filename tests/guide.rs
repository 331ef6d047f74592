use camino::Utf8PathBuf;
use chrono::{TimeZone, Utc};

use loop_epg::config::OutputOwner;
use loop_epg::domain::{CacheRecord, Category};
use loop_epg::guide::{self, GuideOptions};
use loop_epg::store::CacheStore;

fn options(category: Category, slot_duration_hours: u32) -> GuideOptions {
    GuideOptions {
        category,
        slot_duration_hours,
        window_start: Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap(),
        source_info_name: "loop-epg".to_string(),
        owner: None,
        mode: None,
    }
}

fn record(title: &str, origin: &str, artwork: Option<&str>) -> CacheRecord {
    CacheRecord {
        title: title.to_string(),
        description: format!("About {title}."),
        artwork: artwork.map(str::to_string),
        origin_name: origin.to_string(),
        updated_at: Utc::now(),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn emit_to_string(
    store: &CacheStore,
    titles: &[String],
    options: &GuideOptions,
) -> (String, guide::GuideReport) {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("tv.xml")).unwrap();
    let report = guide::emit(store, &path, titles, options).unwrap();
    let xml = std::fs::read_to_string(path.as_std_path()).unwrap();
    (xml, report)
}

#[test]
fn friends_channel_repeats_every_slot() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put(
            "Friends",
            Category::Series,
            &record("Friends", "Friends", Some("https://image.tmdb.org/t/p/w500/f.jpg")),
        )
        .unwrap();

    let (xml, report) = emit_to_string(&store, &names(&["Friends"]), &options(Category::Series, 1));

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert_eq!(report.channels, 1);
    assert_eq!(report.programmes, 48);
    assert_eq!(xml.matches("<channel id=\"friends\">").count(), 1);
    assert_eq!(xml.matches("<programme ").count(), 48);
    assert_eq!(xml.matches("<title lang=\"en\">Friends</title>").count(), 48);
    assert_eq!(xml.matches("<category lang=\"en\">Series</category>").count(), 48);
    assert!(xml.contains(
        "<programme start=\"20240309000000 +0000\" stop=\"20240309010000 +0000\" channel=\"friends\">"
    ));
    assert!(xml.contains(
        "<programme start=\"20240310230000 +0000\" stop=\"20240311000000 +0000\" channel=\"friends\">"
    ));
    assert_eq!(
        xml.matches("<icon src=\"https://image.tmdb.org/t/p/w500/f.jpg\"/>")
            .count(),
        49
    );
}

#[test]
fn missing_record_drops_one_channel() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put("Friends", Category::Series, &record("Friends", "Friends", None))
        .unwrap();
    store
        .put("Frasier", Category::Series, &record("Frasier", "Frasier", None))
        .unwrap();
    let list = names(&["Friends", "UnknownShow", "Frasier"]);

    let (xml, report) = emit_to_string(&store, &list, &options(Category::Series, 2));

    assert_eq!(report.channels, list.len() - 1);
    assert_eq!(report.skipped, vec!["UnknownShow".to_string()]);
    assert_eq!(xml.matches("<channel ").count(), 2);
    assert_eq!(xml.matches("<programme ").count(), 48);
}

#[test]
fn only_unresolved_titles_yield_empty_guide() {
    let store = CacheStore::in_memory().unwrap();

    let (xml, report) = emit_to_string(&store, &names(&["UnknownShow"]), &options(Category::Series, 1));

    assert_eq!(report.channels, 0);
    assert_eq!(report.programmes, 0);
    assert!(!xml.contains("<channel"));
    assert!(!xml.contains("<programme"));
    assert!(xml.contains("<tv source-info-name=\"loop-epg\">"));
}

#[test]
fn full_window_slot_yields_single_programme() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put("Alien", Category::Movie, &record("Alien", "Alien", None))
        .unwrap();

    let (xml, report) = emit_to_string(&store, &names(&["Alien"]), &options(Category::Movie, 48));

    assert_eq!(report.programmes, 1);
    assert!(xml.contains(
        "<programme start=\"20240309000000 +0000\" stop=\"20240311000000 +0000\" channel=\"alien\">"
    ));
    assert!(xml.contains("<category lang=\"en\">Movie</category>"));
}

#[test]
fn channels_precede_programmes_in_list_order() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put("Seinfeld", Category::Series, &record("Seinfeld", "Seinfeld", None))
        .unwrap();
    store
        .put("Cheers", Category::Series, &record("Cheers", "Cheers", None))
        .unwrap();

    let (xml, _) = emit_to_string(&store, &names(&["Seinfeld", "Cheers"]), &options(Category::Series, 24));

    let seinfeld = xml.find("<channel id=\"seinfeld\">").unwrap();
    let cheers = xml.find("<channel id=\"cheers\">").unwrap();
    let first_programme = xml.find("<programme ").unwrap();
    assert!(seinfeld < cheers);
    assert!(cheers < first_programme);
}

#[test]
fn channel_id_uses_requested_name_and_text_is_escaped() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put(
            "Law and Order",
            Category::Series,
            &record("Law & Order", "Law and Order", Some("")),
        )
        .unwrap();

    let (xml, _) = emit_to_string(&store, &names(&["Law and Order"]), &options(Category::Series, 24));

    assert!(xml.contains("<channel id=\"law_and_order\">"));
    assert!(xml.contains("<display-name>Law &amp; Order</display-name>"));
    assert!(!xml.contains("<icon"));
}

#[test]
fn duplicate_list_entries_emit_one_channel() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put("Friends", Category::Series, &record("Friends", "Friends", None))
        .unwrap();

    let (_, report) = emit_to_string(&store, &names(&["Friends", "Friends"]), &options(Category::Series, 24));

    assert_eq!(report.channels, 1);
}

#[test]
fn ownership_request_does_not_block_guide() {
    let store = CacheStore::in_memory().unwrap();
    store
        .put("Friends", Category::Series, &record("Friends", "Friends", None))
        .unwrap();
    let restricted = GuideOptions {
        owner: Some(OutputOwner {
            uid: u32::MAX - 1,
            gid: u32::MAX - 1,
        }),
        mode: Some(0o640),
        ..options(Category::Series, 24)
    };

    let (xml, report) = emit_to_string(&store, &names(&["Friends"]), &restricted);

    assert_eq!(report.channels, 1);
    assert!(xml.contains("<channel id=\"friends\">"));
}
