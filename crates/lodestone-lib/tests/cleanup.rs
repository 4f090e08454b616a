mod common;

use common::{init_logger, library, offline_manager, write_descriptor, write_file};
use lodestone_lib::game::installer::cleanup_with;
use serde_json::json;
use tempfile::TempDir;

const LIB_X: &str = "org/x/x/1.0/x-1.0.jar";
const LIB_Y: &str = "org/y/y/1.0/y-1.0.jar";
const LIB_Z: &str = "org/z/z/1.0/z-1.0.jar";
const LIB_W: &str = "org/w/w/1.0/w-1.0.jar";

fn seed_two_versions(tmp: &TempDir) {
    let layout = lodestone_lib::EngineConfig::with_root(tmp.path()).layout();
    write_descriptor(
        &layout,
        "A",
        json!({
            "id": "A",
            "libraries": [library("org.x:x:1.0", LIB_X), library("org.y:y:1.0", LIB_Y)]
        }),
    );
    write_descriptor(
        &layout,
        "B",
        json!({
            "id": "B",
            "libraries": [library("org.y:y:1.0", LIB_Y), library("org.z:z:1.0", LIB_Z)]
        }),
    );
    for path in [LIB_X, LIB_Y, LIB_Z, LIB_W] {
        write_file(&layout.libraries_dir().join(path), path.as_bytes());
    }
}

#[tokio::test]
async fn sweep_keeps_every_library_a_loaded_version_references() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    seed_two_versions(&tmp);

    let mut manager = offline_manager(tmp.path());
    let report = cleanup_with(&mut manager).await.unwrap();

    let libs = manager.layout().libraries_dir();
    assert_eq!(report.removed_files, vec![libs.join(LIB_W)]);
    assert_eq!(report.freed_bytes, LIB_W.len() as u64);
    for kept in [LIB_X, LIB_Y, LIB_Z] {
        assert!(libs.join(kept).exists(), "{} was swept", kept);
    }
    // org/w/w/1.0, org/w/w, org/w
    assert_eq!(report.removed_dirs, 3);
    assert!(!libs.join("org/w").exists());
}

#[tokio::test]
async fn second_sweep_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    seed_two_versions(&tmp);

    let mut manager = offline_manager(tmp.path());
    cleanup_with(&mut manager).await.unwrap();
    let again = cleanup_with(&mut manager).await.unwrap();
    assert!(again.removed_files.is_empty());
    assert_eq!(again.removed_dirs, 0);
}

#[tokio::test]
async fn libraries_of_other_platforms_survive() {
    let tmp = TempDir::new().unwrap();
    let layout = lodestone_lib::EngineConfig::with_root(tmp.path()).layout();
    let mac_only = "org/lwjgl/lwjgl-macos/3.3.1/lwjgl-macos-3.3.1.jar";
    let mut lib = library("org.lwjgl:lwjgl-macos:3.3.1", mac_only);
    lib["rules"] = json!([{"action": "allow", "os": {"name": "osx"}}]);
    write_descriptor(&layout, "A", json!({"id": "A", "libraries": [lib]}));
    write_file(&layout.libraries_dir().join(mac_only), b"jar");

    let mut manager = offline_manager(tmp.path());
    let report = cleanup_with(&mut manager).await.unwrap();

    assert!(report.removed_files.is_empty());
    assert!(layout.libraries_dir().join(mac_only).exists());
}

#[tokio::test]
async fn unreferenced_assets_and_indexes_are_removed() {
    let tmp = TempDir::new().unwrap();
    let layout = lodestone_lib::EngineConfig::with_root(tmp.path()).layout();
    let kept = "aa11111111111111111111111111111111111111";
    let stale = "bb22222222222222222222222222222222222222";

    write_descriptor(
        &layout,
        "A",
        json!({"id": "A", "assetIndex": {"id": "5"}, "libraries": []}),
    );
    write_file(
        &layout.asset_index_path("5"),
        json!({"objects": {"icons/icon.png": {"hash": kept, "size": 4}}})
            .to_string()
            .as_bytes(),
    );
    write_file(
        &layout.asset_index_path("3"),
        json!({"objects": {"old.ogg": {"hash": stale, "size": 4}}})
            .to_string()
            .as_bytes(),
    );
    write_file(&layout.asset_object_path(kept), b"keep");
    write_file(&layout.asset_object_path(stale), b"gone");

    let mut manager = offline_manager(tmp.path());
    let report = cleanup_with(&mut manager).await.unwrap();

    assert!(layout.asset_index_path("5").exists());
    assert!(layout.asset_object_path(kept).exists());
    assert!(!layout.asset_index_path("3").exists());
    assert!(!layout.asset_object_path(stale).exists());
    assert_eq!(report.removed_files.len(), 2);
    assert!(!layout.asset_objects_dir().join("bb").exists());
}

#[tokio::test]
async fn refuses_to_sweep_when_a_version_fails_to_load() {
    let tmp = TempDir::new().unwrap();
    seed_two_versions(&tmp);
    let layout = lodestone_lib::EngineConfig::with_root(tmp.path()).layout();
    // Parent is not installed and cannot be fetched offline
    write_descriptor(
        &layout,
        "modded",
        json!({"id": "modded", "inheritsFrom": "missing-parent", "libraries": []}),
    );

    let mut manager = offline_manager(tmp.path());
    let err = cleanup_with(&mut manager).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Refusing to clean up"));
    assert!(layout.libraries_dir().join(LIB_W).exists());
}

#[tokio::test]
async fn corrupt_asset_index_aborts_the_sweep() {
    let tmp = TempDir::new().unwrap();
    let layout = lodestone_lib::EngineConfig::with_root(tmp.path()).layout();
    write_descriptor(
        &layout,
        "A",
        json!({"id": "A", "assetIndex": {"id": "5"}, "libraries": []}),
    );
    write_file(&layout.asset_index_path("5"), b"{ not json");
    let orphan = "cc33333333333333333333333333333333333333";
    write_file(&layout.asset_object_path(orphan), b"data");

    let mut manager = offline_manager(tmp.path());
    assert!(cleanup_with(&mut manager).await.is_err());
    assert!(layout.asset_object_path(orphan).exists());
}
