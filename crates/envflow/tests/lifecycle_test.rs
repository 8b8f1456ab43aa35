//! Cloud9 APIをモックしたライフサイクルテスト

mod common;

use common::{DEV1, TestProject};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target(operation: &str) -> String {
    format!("AWSCloud9WorkspaceManagementService.{}", operation)
}

const STATE_DEV1: &str = r#"{
  "version": 1,
  "updated_at": "2026-01-01T00:00:00Z",
  "environments": {
    "dev1": {
      "record": {
        "id": "env-1",
        "arn": "arn:env-1",
        "name": "dev1",
        "loginName": "ubuntu",
        "hostname": "1.2.3.4",
        "port": 22,
        "tags": {"env": "prod"}
      },
      "status": "active",
      "updated_at": "2026-01-01T00:00:00Z"
    }
  }
}"#;

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_creates_and_records_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("CreateEnvironmentSSH").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"environmentId": "env-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("DescribeEnvironments").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environments": [{
                "id": "env-9",
                "arn": "arn:env-9",
                "name": "dev1",
                "loginName": "ubuntu",
                "hostname": "1.2.3.4",
                "port": 22,
                "environmentPath": "/home/ubuntu"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("ListTagsForResource").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Tags": [{"Key": "env", "Value": "prod"}]
        })))
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("env-9"));

    let state = project.read_state();
    let dev1 = &state["environments"]["dev1"];
    assert_eq!(dev1["status"], "active");
    assert_eq!(dev1["record"]["id"], "env-9");
    assert_eq!(dev1["record"]["arn"], "arn:env-9");
    assert_eq!(dev1["record"]["environmentPath"], "/home/ubuntu");
    assert_eq!(dev1["record"]["tags"]["env"], "prod");
    assert!(!project.path().join(".envflow").join("lock.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_without_changes_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(DEV1);
    project.write_state(STATE_DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("変更なし"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_failed_tag_marks_state_errored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("UpdateEnvironment").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("TagResource").as_str()))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.cloud9#LimitExceededException",
            "message": "too many tags"
        })))
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(&DEV1.replace(r#"env "prod""#, r#"env "staging""#));
    project.write_state(STATE_DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .arg("apply")
        .assert()
        .failure()
        .stdout(predicate::str::contains("リモートに反映済み"))
        .stderr(predicate::str::contains("too many tags"));

    let state = project.read_state();
    assert_eq!(state["environments"]["dev1"]["status"], "errored");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_drops_environment_deleted_remotely() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("DescribeEnvironments").as_str()))
        .and(body_json(json!({"environmentIds": ["env-1"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"environments": []})))
        .expect(1)
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(DEV1);
    project.write_state(STATE_DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .arg("refresh")
        .assert()
        .success()
        .stdout(predicate::str::contains("リモートに存在しません"));

    let state = project.read_state();
    assert!(state["environments"].get("dev1").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_destroy_deletes_and_forgets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("DeleteEnvironment").as_str()))
        .and(body_json(json!({"environmentId": "env-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(DEV1);
    project.write_state(STATE_DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .args(["destroy", "dev1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("delete: Deleted environment env-1"))
        .stdout(predicate::str::contains("削除完了"));

    let state = project.read_state();
    assert!(state["environments"].get("dev1").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_import_adopts_existing_environment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("DescribeEnvironments").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environments": [{
                "id": "env-42",
                "arn": "arn:env-42",
                "name": "legacy",
                "loginName": "ec2-user",
                "hostname": "5.6.7.8",
                "port": 2222
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(header("x-amz-target", target("ListTagsForResource").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Tags": []})))
        .mount(&server)
        .await;

    let project = TestProject::new();
    project.write_flow_kdl(DEV1);

    project
        .cmd()
        .env("ENVFLOW_CLOUD9_ENDPOINT", server.uri())
        .args(["import", "dev1", "env-42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("取り込み完了"));

    let state = project.read_state();
    let record = &state["environments"]["dev1"]["record"];
    assert_eq!(record["id"], "env-42");
    assert_eq!(record["port"], 2222);
}
