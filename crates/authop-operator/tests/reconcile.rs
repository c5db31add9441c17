use std::sync::Arc;

use authop_config::observer::AUDIT_PROFILE_EVENT_REASON;
use authop_config::pass::OBSERVED_CONFIG_EVENT_REASON;
use authop_config::resources::{ApiServerSpec, Audit};
use authop_config::sources::API_SERVER_RESOURCE;
use authop_config::{ApiServer, AuditProfile, InMemoryLister, InMemoryRecorder, ObservedConfig};
use authop_deployment::{NoIdentityProviders, SynthesisInput, TransformError, VolumesAndMounts};
use authop_operator::{OperatorSettings, ReconcileError, ReconcilePass};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Volume;
use serde_json::{Value, json};

fn api_servers(profile: AuditProfile) -> InMemoryLister<ApiServer> {
    InMemoryLister::new(API_SERVER_RESOURCE).with_item(
        "cluster",
        ApiServer {
            spec: ApiServerSpec {
                audit: Audit { profile },
            },
            ..Default::default()
        },
    )
}

fn settings() -> OperatorSettings {
    let mut settings = OperatorSettings::default();
    settings.deployment.image = Some("quay.io/openshift/oauth-server:4.16".to_string());
    settings
}

fn template() -> Deployment {
    serde_json::from_value(json!({
        "metadata": { "name": "oauth-openshift" },
        "spec": {
            "selector": { "matchLabels": { "app": "oauth-openshift" } },
            "template": {
                "spec": {
                    "containers": [{
                        "name": "oauth-openshift",
                        "image": "${IMAGE}",
                        "args": ["exec oauth-server osinserver \\\n--v=${LOG_LEVEL} \\\n${SERVER_ARGUMENTS}\n"]
                    }]
                }
            }
        }
    }))
    .expect("valid deployment template")
}

fn command_of(deployment: &Deployment) -> &str {
    let pod = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
    &pod.containers[0].args.as_ref().unwrap()[0]
}

#[test]
fn audit_profile_flows_into_server_command() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::Default),
        NoIdentityProviders,
        recorder.clone(),
    );
    let existing = ObservedConfig::from_value(json!({ "unrelated": { "keep": true } })).unwrap();

    let outcome = pass
        .run(template(), SynthesisInput::new(existing))
        .expect("reconcile should succeed");

    assert!(outcome.observed_changed);
    assert_eq!(
        outcome.observed_config.as_map()["oauthServer"]["serverArguments"]["audit-log-format"],
        json!(["json"])
    );
    assert_eq!(outcome.observed_config.as_map()["unrelated"], json!({ "keep": true }));
    assert_eq!(
        command_of(&outcome.deployment),
        "exec oauth-server osinserver \\\n\
         --v=5 \\\n\
         --audit-log-format=json \\\n\
         --audit-log-maxbackup=10 \\\n\
         --audit-log-maxsize=100 \\\n\
         --audit-log-path=/var/log/oauth-server/audit.log \\\n\
         --audit-policy-file=/var/run/configmaps/audit/audit.yaml\n"
    );

    let reasons: Vec<String> = recorder.events().into_iter().map(|e| e.reason).collect();
    assert_eq!(
        reasons,
        vec![
            AUDIT_PROFILE_EVENT_REASON.to_string(),
            OBSERVED_CONFIG_EVENT_REASON.to_string()
        ]
    );
}

#[test]
fn disabled_audit_renders_no_server_arguments() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::None),
        NoIdentityProviders,
        recorder,
    );

    let outcome = pass
        .run(template(), SynthesisInput::new(ObservedConfig::new()))
        .expect("reconcile should succeed");

    assert!(!outcome.observed_changed);
    assert_eq!(
        command_of(&outcome.deployment),
        "exec oauth-server osinserver \\\n--v=5 \\\n\n"
    );
}

#[test]
fn second_pass_is_stable() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::WriteRequestBodies),
        NoIdentityProviders,
        recorder.clone(),
    );

    let first = pass
        .run(template(), SynthesisInput::new(ObservedConfig::new()))
        .unwrap();
    recorder.take();
    let second = pass
        .run(template(), SynthesisInput::new(first.observed_config.clone()))
        .unwrap();

    assert!(!second.observed_changed);
    assert_eq!(second.observed_config, first.observed_config);
    assert_eq!(second.deployment, first.deployment);
    assert!(recorder.is_empty());
}

#[test]
fn upstream_failure_aborts_before_synthesis() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::Default).failing("cache not synced"),
        NoIdentityProviders,
        recorder,
    );

    let err = pass
        .run(template(), SynthesisInput::new(ObservedConfig::new()))
        .unwrap_err();

    match err {
        ReconcileError::Observation(errors) => assert_eq!(errors.len(), 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_section_is_rejected() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::Default),
        NoIdentityProviders,
        recorder,
    );
    let existing =
        ObservedConfig::from_value(json!({ "oauthServer": ["not", "a", "map"] })).unwrap();

    let err = pass
        .run(template(), SynthesisInput::new(existing))
        .unwrap_err();

    assert!(matches!(err, ReconcileError::ObservedConfig(_)));
}

fn identity_providers() -> Value {
    json!({ "identityProviders": [{ "name": "htpasswd", "type": "HTPasswd" }] })
}

/// Mounts one volume per configured identity provider
fn idp_volumes(config: &ObservedConfig) -> Result<VolumesAndMounts, TransformError> {
    let providers = config
        .as_map()
        .get("oauthConfig")
        .and_then(|oauth_config| oauth_config["identityProviders"].as_array())
        .ok_or("oauthConfig.identityProviders missing")?;
    let volumes = (0..providers.len())
        .map(|i| Volume {
            name: format!("v4-0-config-user-idp-{i}-file-data"),
            ..Default::default()
        })
        .collect();
    Ok(VolumesAndMounts {
        volumes,
        mounts: Vec::new(),
    })
}

#[test]
fn unowned_section_keys_survive_and_reach_identity_providers() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::Default),
        idp_volumes,
        recorder.clone(),
    );
    let existing = ObservedConfig::from_value(json!({
        "oauthServer": { "oauthConfig": identity_providers() }
    }))
    .unwrap();

    let outcome = pass
        .run(template(), SynthesisInput::new(existing))
        .expect("reconcile should succeed");

    assert!(outcome.observed_changed);
    let section = &outcome.observed_config.as_map()["oauthServer"];
    assert_eq!(section["oauthConfig"], identity_providers());
    assert_eq!(section["serverArguments"]["audit-log-format"], json!(["json"]));

    let pod = outcome.deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
    let volumes: Vec<&str> = pod
        .volumes
        .as_ref()
        .unwrap()
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(volumes, vec!["v4-0-config-user-idp-0-file-data"]);

    // nothing left to change on the next pass
    recorder.take();
    let again = pass
        .run(template(), SynthesisInput::new(outcome.observed_config.clone()))
        .unwrap();
    assert!(!again.observed_changed);
    assert_eq!(again.observed_config, outcome.observed_config);
    assert!(recorder.is_empty());
}

#[test]
fn disabled_audit_clears_stale_arguments_only() {
    let recorder = Arc::new(InMemoryRecorder::new());
    let pass = ReconcilePass::from_settings(
        &settings(),
        api_servers(AuditProfile::None),
        idp_volumes,
        recorder,
    );
    let existing = ObservedConfig::from_value(json!({
        "oauthServer": {
            "serverArguments": { "audit-log-format": ["json"] },
            "oauthConfig": identity_providers()
        }
    }))
    .unwrap();

    let outcome = pass
        .run(template(), SynthesisInput::new(existing))
        .expect("reconcile should succeed");

    assert!(outcome.observed_changed);
    assert_eq!(
        outcome.observed_config.as_map()["oauthServer"],
        json!({ "oauthConfig": identity_providers() })
    );
    assert_eq!(
        command_of(&outcome.deployment),
        "exec oauth-server osinserver \\\n--v=5 \\\n\n"
    );
}
