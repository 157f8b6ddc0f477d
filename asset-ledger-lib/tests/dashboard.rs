use std::fs;
use std::path::Path;

use asset_ledger_core::{Category, Status};
use asset_ledger_lib::{Dashboard, Project, ProjectConfig};
use asset_ledger_store::{MediaFiles, RegistryRecord};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

const DINO: &str = "enemy_dinosaur_t1_01";

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A project with the default layout and one enemy.
fn project() -> (TempDir, Dashboard) {
    let tmp = TempDir::new().unwrap();
    write_json(
        &tmp.path().join("src/entities/enemies").join(format!("{DINO}.json")),
        &json!({
            "id": DINO,
            "name": "Dinosaur",
            "description": "A small raptor with a bad attitude",
            "stats": { "health": 40, "damage": 6 }
        }),
    );
    let dashboard = Dashboard::new(Project::new(tmp.path(), ProjectConfig::default()));
    (tmp, dashboard)
}

fn entity_json(tmp: &TempDir, id: &str) -> Value {
    let path = tmp.path().join("src/entities/enemies").join(format!("{id}.json"));
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn find<'a>(view: &'a Value, id: &str) -> &'a Value {
    view["entities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == id)
        .unwrap()
}

fn category(dashboard: &Dashboard, name: &str) -> Value {
    let response = dashboard.get_category(name).unwrap();
    serde_json::to_value(response).unwrap()
}

#[test]
fn untouched_entity_is_pending_then_approved() {
    let (_tmp, dashboard) = project();

    let view = category(&dashboard, "enemies");
    let dino = find(&view, DINO);
    assert_eq!(dino["status"], "pending");
    assert_eq!(dino["sourceDescription"], "A small raptor with a bad attitude");
    assert_eq!(dino["_sourceFile"], DINO);
    let grouped = &view["filesBySource"]["enemies"];
    assert_eq!(grouped.as_array().unwrap().len(), 1);
    assert_eq!(grouped[0]["id"], DINO);
    assert_eq!(grouped[0]["status"], "pending");

    let ack = dashboard
        .set_status("enemies", "dinosaur", DINO, "approved", None)
        .unwrap();
    assert!(ack.is_success());

    let view = category(&dashboard, "enemies");
    assert_eq!(find(&view, DINO)["status"], "approved");
}

#[test]
fn decline_requires_note_and_reset_clears_it() {
    let (_tmp, dashboard) = project();

    let missing = dashboard
        .set_status("enemies", "dinosaur", DINO, "declined", Some("   "))
        .unwrap();
    assert!(!missing.is_success());
    assert!(missing.error().unwrap().contains("decline note"));

    dashboard
        .set_status("enemies", "dinosaur", DINO, "declined", Some("tail clipped"))
        .unwrap();
    let view = category(&dashboard, "enemies");
    assert_eq!(find(&view, DINO)["declineNote"], "tail clipped");

    dashboard
        .set_status("enemies", "dinosaur", DINO, "pending", None)
        .unwrap();
    let record = dashboard
        .registry()
        .get(Category::Enemies, DINO)
        .unwrap()
        .unwrap();
    assert_eq!(record.status, Status::Pending);
    assert!(record.decline_note.is_none());
    let view = category(&dashboard, "enemies");
    assert!(find(&view, DINO).get("declineNote").is_none());
}

#[test]
fn consumed_status_is_independent() {
    let (_tmp, dashboard) = project();
    dashboard
        .set_status("enemies", "", DINO, "approved", None)
        .unwrap();
    dashboard
        .set_consumed_status("enemies", "", DINO, "declined", Some("bones look fake"))
        .unwrap();

    let view = category(&dashboard, "enemies");
    let dino = find(&view, DINO);
    assert_eq!(dino["status"], "approved");
    assert_eq!(dino["consumedStatus"], "declined");
    assert_eq!(dino["consumedDeclineNote"], "bones look fake");
}

#[test]
fn expected_errors_are_structured() {
    let (_tmp, dashboard) = project();

    let unknown = serde_json::to_value(dashboard.get_category("dragons").unwrap()).unwrap();
    assert_eq!(unknown["success"], false);
    assert!(unknown["error"].as_str().unwrap().contains("dragons"));

    let missing = dashboard
        .set_status("enemies", "", "enemy_nobody", "approved", None)
        .unwrap();
    assert!(missing.error().unwrap().contains("enemy_nobody"));

    let bad_status = dashboard
        .set_status("enemies", "", DINO, "shiny", None)
        .unwrap();
    assert!(!bad_status.is_success());

    let bad_media = dashboard.transition_media("enemies/ghost_original.png", "approved").unwrap();
    assert!(!bad_media.is_success());
}

#[test]
fn malformed_entity_does_not_break_listing() {
    let (tmp, dashboard) = project();
    write_json(
        &tmp.path().join("src/entities/enemies/enemy_rat.json"),
        &json!({ "id": "enemy_rat", "name": "Rat" }),
    );
    fs::write(tmp.path().join("src/entities/enemies/enemy_bad.json"), "{ \"id\": ").unwrap();

    let view = category(&dashboard, "enemies");
    let ids: Vec<_> = view["entities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, [DINO, "enemy_rat"]);
    assert_eq!(view["skipped"].as_array().unwrap().len(), 1);
}

#[test]
fn set_field_round_trips_and_null_deletes() {
    let (tmp, dashboard) = project();

    assert!(dashboard
        .set_field("enemies", "", DINO, "stats.health", json!(55))
        .unwrap()
        .is_success());
    assert!(dashboard
        .set_field("enemies", "", DINO, "combat.attacks", json!({"bite": {"range": 1}}))
        .unwrap()
        .is_success());

    let record = entity_json(&tmp, DINO);
    assert_eq!(record["stats"]["health"], 55);
    assert_eq!(record["stats"]["damage"], 6);
    assert_eq!(record["combat"]["attacks"]["bite"]["range"], 1);

    dashboard
        .set_field("enemies", "", DINO, "stats.damage", Value::Null)
        .unwrap();
    let record = entity_json(&tmp, DINO);
    assert!(record["stats"].get("damage").is_none());
    assert_eq!(record["stats"]["health"], 55);
}

#[test]
fn update_entity_is_all_or_nothing() {
    let (tmp, dashboard) = project();
    let mut updates = Map::new();
    updates.insert("stats.health".to_string(), json!(99));
    updates.insert("name.first".to_string(), json!("Rex"));

    let response = dashboard.update_entity("enemies", "", DINO, &updates).unwrap();
    assert!(!response.is_success());
    assert_eq!(entity_json(&tmp, DINO)["stats"]["health"], 40);

    updates.shift_remove("name.first");
    updates.insert("tier".to_string(), json!(1));
    assert!(dashboard
        .update_entity("enemies", "", DINO, &updates)
        .unwrap()
        .is_success());
    let record = entity_json(&tmp, DINO);
    assert_eq!(record["stats"]["health"], 99);
    assert_eq!(record["tier"], 1);
}

#[test]
fn id_is_not_a_settable_field() {
    let (_tmp, dashboard) = project();
    let response = dashboard
        .set_field("enemies", "", DINO, "id", json!("enemy_other"))
        .unwrap();
    assert!(!response.is_success());
}

#[test]
fn media_transition_updates_registry_reference() {
    let (tmp, dashboard) = project();
    let media = tmp.path().join("assets/images/enemies");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join(format!("{DINO}_original.png")), b"png").unwrap();

    let mut record = RegistryRecord::new(DINO, Category::Enemies);
    record.files = MediaFiles {
        original: Some(format!("assets/images/enemies/{DINO}_original.png")),
        ..Default::default()
    };
    dashboard.registry().put(Category::Enemies, &record).unwrap();

    let response = dashboard
        .transition_media(&format!("enemies/{DINO}_original.png"), "approved")
        .unwrap()
        .success()
        .unwrap();
    assert!(response.changed);
    assert_eq!(response.new_name, format!("{DINO}_approved_original.png"));
    assert!(media.join(&response.new_name).is_file());

    let record = dashboard
        .registry()
        .get(Category::Enemies, DINO)
        .unwrap()
        .unwrap();
    assert_eq!(
        record.files.original.as_deref(),
        Some(format!("assets/images/enemies/{DINO}_approved_original.png").as_str())
    );

    // Applying the same state again changes nothing
    let again = dashboard
        .transition_media(&response.new_path, "approved")
        .unwrap()
        .success()
        .unwrap();
    assert!(!again.changed);
    assert_eq!(again.new_name, response.new_name);
}

#[test]
fn clean_is_rejected_for_media() {
    let (tmp, dashboard) = project();
    let media = tmp.path().join("assets/images/props");
    fs::create_dir_all(&media).unwrap();
    fs::write(media.join("barrel_original.png"), b"png").unwrap();

    let response = dashboard
        .transition_media("props/barrel_original.png", "clean")
        .unwrap();
    assert!(!response.is_success());
    assert!(media.join("barrel_original.png").is_file());
}

#[test]
fn rebuild_and_resolve() {
    let (tmp, dashboard) = project();
    let mut record = RegistryRecord::new(DINO, Category::Enemies);
    record.status = Status::Approved;
    record.files.clean = Some(format!("assets/images/enemies/{DINO}_clean.png"));
    dashboard.registry().put(Category::Enemies, &record).unwrap();

    let built = dashboard.rebuild_manifest().unwrap().success().unwrap();
    assert_eq!(built.images, 8);
    assert_eq!(built.audio, 2);
    assert!(built.changed);
    assert_eq!(built.output, "src/core/AssetLoader.js");
    assert!(tmp.path().join("src/core/AssetLoader.js").is_file());

    let rebuilt = dashboard.rebuild_manifest().unwrap().success().unwrap();
    assert!(!rebuilt.changed);

    let resolved = dashboard.resolve_asset(DINO).unwrap().success().unwrap();
    assert_eq!(resolved.path, format!("assets/images/enemies/{DINO}_clean.png"));
    assert!(!resolved.placeholder);

    let missing = dashboard.resolve_asset("enemy_nobody").unwrap().success().unwrap();
    assert_eq!(missing.path, "assets/images/PH.png");
    assert!(missing.placeholder);
}

#[test]
fn categories_report_counts() {
    let (_tmp, dashboard) = project();
    let response = serde_json::to_value(dashboard.categories().unwrap()).unwrap();
    let categories = response["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category"], "enemies");
    assert_eq!(categories[0]["count"], 1);
}

#[test]
fn blank_parameters_are_missing() {
    let (_tmp, dashboard) = project();
    for response in [
        dashboard.set_status("enemies", "", "", "approved", None).unwrap(),
        dashboard.set_status("", "", DINO, "approved", None).unwrap(),
        dashboard.set_consumed_status("enemies", "", DINO, " ", None).unwrap(),
        dashboard.set_field("enemies", "", "", "tier", json!(1)).unwrap(),
    ] {
        assert_eq!(
            response.error(),
            Some("Invalid request: Missing required parameters")
        );
    }
    let media = dashboard.transition_media("", "approved").unwrap();
    assert_eq!(media.error(), Some("Invalid request: Missing required parameters"));
}

#[test]
fn entity_ids_cannot_leave_the_store() {
    let (tmp, dashboard) = project();
    let victim = tmp.path().join("victim.json");
    fs::write(&victim, r#"{"id": "victim"}"#).unwrap();

    let response = dashboard
        .set_field("enemies", "", "../../../victim", "pwned", json!(true))
        .unwrap();
    assert!(!response.is_success());
    let status = dashboard
        .set_status("enemies", "", "../../../victim", "approved", None)
        .unwrap();
    assert!(!status.is_success());
    assert_eq!(fs::read_to_string(&victim).unwrap(), r#"{"id": "victim"}"#);
}

#[test]
fn registry_only_category_is_approved_directly() {
    let (tmp, dashboard) = project();
    let mut forge = RegistryRecord::new("forge", Category::Buildings);
    forge.files.clean = Some("assets/images/buildings/forge_clean.png".to_string());
    dashboard.registry().put(Category::Buildings, &forge).unwrap();

    let ack = dashboard
        .set_status("buildings", "", "forge", "approved", None)
        .unwrap();
    assert!(ack.is_success(), "{:?}", ack.error());
    let record = dashboard
        .registry()
        .get(Category::Buildings, "forge")
        .unwrap()
        .unwrap();
    assert_eq!(record.status, Status::Approved);
    assert!(!tmp.path().join("src/entities/buildings").exists());

    let resolved = dashboard.resolve_asset("forge").unwrap().success().unwrap();
    assert_eq!(resolved.path, "assets/images/buildings/forge_clean.png");
    assert!(!resolved.placeholder);

    // A registry-only record is created on first touch, declines included
    let props = dashboard
        .set_status("props", "", "barrel", "declined", Some("too shiny"))
        .unwrap();
    assert!(props.is_success());
    let barrel = dashboard.registry().get(Category::Props, "barrel").unwrap().unwrap();
    assert_eq!(barrel.decline_note.as_deref(), Some("too shiny"));
}
