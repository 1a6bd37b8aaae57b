use sbmig_state::{load_settings, Overrides, RuntimeConfig};
use sbmig_test_utils::{env_guard, set_env_var, ProjectFixture};
use std::path::PathBuf;

#[test]
fn config_file_feeds_runtime_config() {
    let _g = env_guard();
    let _dir = set_env_var("SBMIG_WORKING_DIR", None);
    let project = ProjectFixture::new().unwrap();
    let path = project
        .write_config(&serde_json::json!({
            "spaceId": "1001",
            "oauthToken": "token",
            "datasourceExt": "ds.json",
            "workingDirectory": "out"
        }))
        .unwrap();

    let settings = load_settings(&path).unwrap().unwrap();
    let config = RuntimeConfig::resolve(Overrides::default(), settings);

    assert_eq!(config.space_id().unwrap(), "1001");
    assert_eq!(config.datasource_ext, "ds.json");
    assert_eq!(config.working_directory, PathBuf::from("out"));
}
