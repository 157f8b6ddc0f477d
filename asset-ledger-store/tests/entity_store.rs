use asset_ledger_core::{Category, LedgerError};
use asset_ledger_store::{EntityRecord, EntityStore};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

fn store_with_enemies() -> (TempDir, EntityStore) {
    let tmp = TempDir::new().unwrap();
    let enemies = tmp.path().join("enemies");
    write_json(
        &enemies,
        "enemy_dinosaur_t1_01.json",
        r#"{"id": "enemy_dinosaur_t1_01", "name": "Dinosaur", "stats": {"health": 50}}"#,
    );
    write_json(
        &enemies,
        "enemy_rat_t1_01.json",
        "\u{feff}{\"id\": \"enemy_rat_t1_01\", \"name\": \"Rat\"}",
    );
    let store = EntityStore::new(tmp.path());
    (tmp, store)
}

#[test]
fn read_tolerates_bom() {
    let (_tmp, store) = store_with_enemies();
    let rat = store.read(Category::Enemies, "enemy_rat_t1_01").unwrap();
    assert_eq!(rat.record.str_field("name"), Some("Rat"));
    assert_eq!(rat.source_file(), "enemy_rat_t1_01");
}

#[test]
fn read_missing_is_not_found() {
    let (_tmp, store) = store_with_enemies();
    let err = store.read(Category::Enemies, "enemy_yeti_t9_01").unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[test]
fn find_accepts_unprefixed_enemy_id() {
    let (_tmp, store) = store_with_enemies();
    let path = store.find(Category::Enemies, "dinosaur_t1_01").unwrap().unwrap();
    assert!(path.ends_with("enemy_dinosaur_t1_01.json"));
}

#[test]
fn find_falls_back_to_bosses() {
    let (tmp, store) = store_with_enemies();
    write_json(
        &tmp.path().join("bosses"),
        "boss_trex.json",
        r#"{"id": "boss_trex", "name": "T-Rex"}"#,
    );
    let path = store.find(Category::Enemies, "boss_trex").unwrap().unwrap();
    assert!(path.ends_with("bosses/boss_trex.json"));
}

#[test]
fn find_matches_record_content_when_file_name_differs() {
    let (tmp, store) = store_with_enemies();
    write_json(
        &tmp.path().join("items"),
        "potion_legacy_name.json",
        r#"{"id": "potion_small"}"#,
    );
    let path = store.find(Category::Items, "potion_small").unwrap().unwrap();
    assert!(path.ends_with("potion_legacy_name.json"));
}

#[test]
fn nested_category_listing_descends() {
    let tmp = TempDir::new().unwrap();
    let equipment = tmp.path().join("equipment");
    write_json(&equipment.join("weapons").join("sword"), "sword_iron.json", r#"{"id": "sword_iron"}"#);
    write_json(&equipment.join("armor"), "helmet_leather.json", r#"{"id": "helmet_leather"}"#);
    write_json(&equipment, "ring_gold.json", r#"{"id": "ring_gold"}"#);

    let store = EntityStore::new(tmp.path());
    let ids = store.list(Category::Equipment).unwrap();
    assert_eq!(ids, vec!["helmet_leather", "ring_gold", "sword_iron"]);

    let found = store.find(Category::Equipment, "sword_iron").unwrap().unwrap();
    assert!(found.ends_with("weapons/sword/sword_iron.json"));
}

#[test]
fn flat_category_ignores_subfolders() {
    let (tmp, store) = store_with_enemies();
    write_json(
        &tmp.path().join("enemies").join("archive"),
        "enemy_old.json",
        r#"{"id": "enemy_old"}"#,
    );
    assert_eq!(store.list(Category::Enemies).unwrap().len(), 2);
}

#[test]
fn scan_skips_malformed_record() {
    let (tmp, store) = store_with_enemies();
    write_json(&tmp.path().join("enemies"), "enemy_broken.json", r#"{"id": "enemy_bro"#);
    write_json(&tmp.path().join("enemies"), "enemy_list.json", r#"[1, 2, 3]"#);

    let report = store.scan(Category::Enemies).unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().any(|s| s.path.ends_with("enemy_broken.json")));
}

#[test]
fn scan_never_returns_duplicate_ids() {
    let (tmp, store) = store_with_enemies();
    write_json(
        &tmp.path().join("enemies"),
        "zz_copy.json",
        r#"{"id": "enemy_rat_t1_01", "name": "Rat copy"}"#,
    );
    let report = store.scan(Category::Enemies).unwrap();
    assert_eq!(report.records.len(), 2);
    let rat = report
        .records
        .iter()
        .find(|e| e.record.id == "enemy_rat_t1_01")
        .unwrap();
    assert_eq!(rat.record.str_field("name"), Some("Rat"));
    assert_eq!(report.skipped.len(), 1);
}

#[test]
fn missing_category_lists_empty() {
    let (_tmp, store) = store_with_enemies();
    assert!(store.list(Category::Npcs).unwrap().is_empty());
    assert!(!store.has_category(Category::Npcs));
}

#[test]
fn write_overwrites_in_place() {
    let (tmp, store) = store_with_enemies();
    let mut dino = store.read(Category::Enemies, "enemy_dinosaur_t1_01").unwrap();
    dino.record.set_field("stats.health", json!(75)).unwrap();
    let path = store
        .write(Category::Enemies, "enemy_dinosaur_t1_01", &dino.record)
        .unwrap();
    assert_eq!(path, tmp.path().join("enemies").join("enemy_dinosaur_t1_01.json"));

    let reread = store.read(Category::Enemies, "enemy_dinosaur_t1_01").unwrap();
    assert_eq!(reread.record.get_field("stats.health"), Some(&json!(75)));
    assert_eq!(reread.record.str_field("name"), Some("Dinosaur"));
}

#[test]
fn write_creates_new_record() {
    let (tmp, store) = store_with_enemies();
    let record = EntityRecord::new("npc_smith").with("name", json!("Smith"));
    store.write(Category::Npcs, "npc_smith", &record).unwrap();
    assert!(tmp.path().join("npcs").join("npc_smith.json").is_file());
    assert_eq!(store.list(Category::Npcs).unwrap(), vec!["npc_smith"]);
}

#[test]
fn write_rejects_mismatched_id() {
    let (_tmp, store) = store_with_enemies();
    let record = EntityRecord::new("enemy_a");
    let err = store.write(Category::Enemies, "enemy_b", &record).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn summaries_count_entity_categories() {
    let (tmp, store) = store_with_enemies();
    write_json(&tmp.path().join("items"), "potion.json", r#"{"id": "potion"}"#);
    let summaries = store.summaries().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].category, Category::Enemies);
    assert_eq!(summaries[0].count, 2);
    assert_eq!(summaries[1].name, "Items");
}

#[test]
fn read_reports_actual_category_after_fallback() {
    let (tmp, store) = store_with_enemies();
    write_json(&tmp.path().join("bosses"), "boss_trex.json", r#"{"id": "boss_trex"}"#);
    let trex = store.read(Category::Enemies, "boss_trex").unwrap();
    assert_eq!(trex.category, Category::Bosses);
    let dino = store.read(Category::Enemies, "enemy_dinosaur_t1_01").unwrap();
    assert_eq!(dino.category, Category::Enemies);
}

#[test]
fn traversal_ids_are_rejected() {
    let (tmp, store) = store_with_enemies();
    fs::write(tmp.path().join("victim.json"), r#"{"id": "victim"}"#).unwrap();
    for id in ["../victim", "../../victim", "/etc/passwd", "a/b", "..", ""] {
        let err = store.find(Category::Enemies, id).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{id}");
    }
    let record = EntityRecord::new("../victim");
    assert!(store.write(Category::Enemies, "../victim", &record).is_err());
    assert_eq!(
        fs::read_to_string(tmp.path().join("victim.json")).unwrap(),
        r#"{"id": "victim"}"#
    );
}

#[test]
fn save_rejects_paths_leaving_the_root() {
    let (tmp, store) = store_with_enemies();
    let mut entity = store.read(Category::Enemies, "enemy_rat_t1_01").unwrap();
    entity.path = tmp.path().join("enemies").join("..").join("..").join("x.json");
    let err = store.save(&entity).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(!tmp.path().parent().unwrap().join("x.json").exists());
}
