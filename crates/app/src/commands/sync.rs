use sbmig_discovery::{
    discover_all, discover_many_definitions, resolve_definitions, DefinitionKind, Discovered,
    DiscoveryConfig, Scope,
};
use sbmig_sync::{Space, SyncOrchestrator, SyncReport, Transport};
use std::path::PathBuf;
use tracing::warn;

/// Picks the definition files to sync: every discovered one with `all`,
/// otherwise the ones named in `names` (local before external).
pub(crate) fn select_datasource_files(
    discovery: &DiscoveryConfig,
    names: &[String],
    all: bool,
) -> Vec<PathBuf> {
    let kind = DefinitionKind::Datasource;
    let found = if all {
        discover_all(discovery, kind)
    } else {
        Discovered {
            local: discover_many_definitions(discovery, kind, Scope::Local, names),
            external: discover_many_definitions(discovery, kind, Scope::External, names),
        }
    };
    let selection = (!all).then_some(names);
    let mut duplicates = Vec::new();
    let (files, missing) = resolve_definitions(&found, selection, Some(&mut duplicates));
    for name in &missing {
        warn!(datasource = %name, "No datasource definition found with this name");
    }
    for dup in &duplicates {
        warn!(
            datasource = %dup.name,
            kept = %dup.kept.display(),
            skipped = %dup.skipped.display(),
            "Datasource defined more than once"
        );
    }
    files.into_iter().map(|f| f.path).collect()
}

/// Handle the `sync datasources` command.
pub(crate) async fn handle_sync_datasources_command<T: Transport>(
    space: Space<T>,
    discovery: &DiscoveryConfig,
    names: &[String],
    all: bool,
) -> SyncReport {
    let files = select_datasource_files(discovery, names, all);
    if files.is_empty() {
        warn!("No datasource definitions to sync");
        return SyncReport::default();
    }
    let report = SyncOrchestrator::new(space).sync_datasources(&files).await;
    print!("{}", report.format_summary());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::space_for;
    use sbmig_sync::{PipelineStage, SyncAction};
    use sbmig_test_utils::{datasource_definition, ProjectFixture};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn selection_reports_missing_and_prefers_local() {
        let project = ProjectFixture::new().unwrap();
        let local = project
            .write_datasource("colors", &datasource_definition("colors", &[]))
            .unwrap();
        project
            .write_external_datasource("kit", "colors", &datasource_definition("colors", &[]))
            .unwrap();
        project
            .write_external_datasource("kit", "sizes", &datasource_definition("sizes", &[]))
            .unwrap();
        let discovery = DiscoveryConfig::new(project.root());

        let files = select_datasource_files(&discovery, &["colors".into(), "ghost".into()], false);
        assert_eq!(files, vec![local]);

        let all = select_datasource_files(&discovery, &[], true);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn syncs_named_datasource_over_http() {
        let project = ProjectFixture::new().unwrap();
        project
            .write_datasource("colors", &datasource_definition("colors", &[("red", "#f00")]))
            .unwrap();
        let server = MockServer::start().await;

        // Empty space; entries are then fetched by the id returned from the create.
        Mock::given(method("GET"))
            .and(path("/spaces/7/datasources/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/spaces/7/datasources/"))
            .and(body_partial_json(json!({ "datasource": { "name": "colors" } })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "datasource": { "id": 3, "name": "colors", "slug": "colors", "dimensions": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/spaces/7/datasource_entries/"))
            .and(query_param("datasource_id", "3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("total", "0")
                    .set_body_json(json!({ "datasource_entries": [] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/spaces/7/datasource_entries/"))
            .and(body_partial_json(json!({
                "datasource_entry": { "name": "red", "value": "#f00", "datasource_id": 3 }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "datasource_entry": { "id": 9 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let report = handle_sync_datasources_command(
            space_for(&server),
            &DiscoveryConfig::new(project.root()),
            &["colors".into()],
            false,
        )
        .await;

        let outcome = report.outcome("colors").unwrap();
        assert!(report.success(), "{}", report.format_summary());
        assert_eq!(outcome.action, Some(SyncAction::Create));
        assert_eq!(outcome.stage, PipelineStage::Done);
    }

    #[tokio::test]
    async fn nothing_to_sync_makes_no_requests() {
        let project = ProjectFixture::new().unwrap();
        let server = MockServer::start().await;
        let report = handle_sync_datasources_command(
            space_for(&server),
            &DiscoveryConfig::new(project.root()),
            &["missing".into()],
            false,
        )
        .await;
        assert!(report.datasources.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
