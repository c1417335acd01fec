//! End-to-end tests over the fixture deployments
//!
//! Each test copies `test-fixtures/deployments/basic` into a temporary
//! directory and exercises the complete flow: rule loading -> pipeline ->
//! rendering -> deployment metadata.

use conf_core::{Error as CoreError, Pipeline, RuleSet, SystemProperties, Value};
use conf_render::{DeployOptions, DeployReport, Deployer, DeploymentPaths, Error};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/deployments/basic")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// Set up a deployment workspace from the fixture
fn setup_deployment() -> (TempDir, DeploymentPaths) {
    let temp = TempDir::new().unwrap();
    copy_dir(&fixture_dir(), temp.path());
    let paths = DeploymentPaths::new(
        temp.path().join("deployment.toml"),
        temp.path().join("resources"),
        temp.path().join("repository"),
    );
    (temp, paths)
}

fn system() -> SystemProperties {
    [("carbon.host", "is.example.com")].into_iter().collect()
}

fn environment(ldap_host: &str) -> IndexMap<String, String> {
    [("LDAP_HOST".to_string(), ldap_host.to_string())]
        .into_iter()
        .collect()
}

fn pipeline(ldap_host: &str) -> Pipeline {
    Pipeline::new(RuleSet::load(&fixture_dir().join("resources")))
        .with_system_properties(system())
        .with_environment(environment(ldap_host))
}

fn deployer(paths: &DeploymentPaths, ldap_host: &str, force: bool) -> Deployer {
    let options = DeployOptions {
        force,
        system: system(),
    };
    Deployer::new(paths.clone(), options).with_environment(environment(ldap_host))
}

#[test]
fn test_pipeline_over_fixture() {
    let context = pipeline("ldap.internal")
        .run_file(&fixture_dir().join("deployment.toml"))
        .unwrap();

    let get = |key: &str| context.get(key).map(Value::to_string);

    // Placeholders
    assert_eq!(get("server.hostname").as_deref(), Some("is.example.com"));
    assert_eq!(
        get("server.base_path").as_deref(),
        Some("https://is.example.com:9443")
    );
    assert_eq!(
        get("user_store.connection_url").as_deref(),
        Some("ldap://ldap.internal:10389")
    );

    // Inference and defaults
    assert_eq!(
        get("database.identity.driver").as_deref(),
        Some("com.mysql.jdbc.Driver")
    );
    assert_eq!(get("database.identity.pool.max_active").as_deref(), Some("50"));

    // Validator default, then key mapping
    assert_eq!(get("identity_db.username").as_deref(), Some("root"));
    assert!(!context.contains_key("database.identity.username"));
    assert_eq!(
        get("identity_db.url").as_deref(),
        Some("jdbc:mysql://is.example.com:3306/identity")
    );
    assert!(!context.contains_key("database.identity.url"));

    // Arrays of tables stay list values
    assert!(context.get("datasource").is_some_and(Value::is_list));
}

#[test]
fn test_deploy_renders_fixture_templates() {
    let (_temp, paths) = setup_deployment();

    let report = deployer(&paths, "ldap.internal", false).deploy().unwrap();

    let DeployReport::Deployed { written, .. } = report else {
        panic!("expected a deployment, got {report:?}");
    };
    assert_eq!(written.len(), 3);

    let carbon = fs::read_to_string(paths.output.join("conf/carbon.xml")).unwrap();
    assert!(carbon.contains("<HostName>is.example.com</HostName>"));
    assert!(carbon.contains("<Offset>0</Offset>"));
    assert!(carbon.contains("<BasePath>https://is.example.com:9443</BasePath>"));

    let datasources = fs::read_to_string(paths.output.join("conf/datasources.xml")).unwrap();
    assert!(datasources.contains(
        r#"<datasource id="WSO2_CARBON_DB" url="jdbc:h2:./repository/database/WSO2CARBON_DB"/>"#
    ));
    assert!(datasources.contains(r#"<datasource id="WSO2_SHARED_DB""#));
    assert!(datasources.contains(
        r#"url="jdbc:mysql://is.example.com:3306/identity" driver="com.mysql.jdbc.Driver" user="root" maxActive="50""#
    ));

    assert_eq!(
        fs::read_to_string(paths.output.join("user-mgt.properties")).unwrap(),
        "type=read_write_ldap\nconnection.url=ldap://ldap.internal:10389\n"
    );
}

#[test]
fn test_redeploy_tracks_environment() {
    let (_temp, paths) = setup_deployment();
    deployer(&paths, "ldap.internal", false).deploy().unwrap();

    let unchanged = deployer(&paths, "ldap.internal", false).deploy().unwrap();
    assert_eq!(unchanged, DeployReport::UpToDate);

    let report = deployer(&paths, "ldap.dr", false).deploy().unwrap();
    let DeployReport::Deployed { changes, .. } = report else {
        panic!("expected a deployment, got {report:?}");
    };
    assert_eq!(changes.references, vec!["$env{LDAP_HOST}".to_string()]);

    assert!(
        fs::read_to_string(paths.output.join("user-mgt.properties"))
            .unwrap()
            .contains("ldap://ldap.dr:10389")
    );
    assert!(
        fs::read_to_string(paths.backup_dir().join("user-mgt.properties"))
            .unwrap()
            .contains("ldap://ldap.internal:10389")
    );
}

#[test]
fn test_template_change_triggers_redeploy() {
    let (_temp, paths) = setup_deployment();
    deployer(&paths, "ldap.internal", false).deploy().unwrap();

    fs::write(
        paths.templates_dir().join("user-mgt.properties.hbs"),
        "connection.url={{user_store.connection_url}}\n",
    )
    .unwrap();
    let report = deployer(&paths, "ldap.internal", false).deploy().unwrap();

    assert!(matches!(report, DeployReport::Deployed { ref changes, .. } if !changes.changed.is_empty()));
    assert_eq!(
        fs::read_to_string(paths.output.join("user-mgt.properties")).unwrap(),
        "connection.url=ldap://ldap.internal:10389\n"
    );
}

#[test]
fn test_validation_failure_stops_deployment() {
    let (_temp, paths) = setup_deployment();
    let document = fs::read_to_string(&paths.config).unwrap();
    fs::write(
        &paths.config,
        document.replace(
            "type = \"mysql\"\n",
            "type = \"mysql\"\nusername = \"Admin User\"\n",
        ),
    )
    .unwrap();

    let err = deployer(&paths, "ldap.internal", false).deploy().unwrap_err();

    match err {
        Error::Core(CoreError::Validation { key, message }) => {
            assert_eq!(key, "database.identity.username");
            assert_eq!(
                message,
                "database.identity.username must be a lowercase identifier"
            );
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(!paths.output.join("conf/carbon.xml").exists());
}

#[test]
fn test_missing_environment_variable_is_reported() {
    let (_temp, paths) = setup_deployment();

    let err = Deployer::new(
        paths.clone(),
        DeployOptions {
            force: false,
            system: system(),
        },
    )
    .with_environment(IndexMap::<String, String>::new())
    .deploy()
    .unwrap_err();

    assert!(matches!(
        err,
        Error::Core(CoreError::MissingProperty { ref name, .. }) if name == "LDAP_HOST"
    ));
}
