mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

/// Top-level help lists every plugin
#[test]
fn test_cli_help() {
    TestEnv::new()
        .rune()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("docker"))
        .stdout(predicate::str::contains("aws"))
        .stdout(predicate::str::contains("s3"))
        .stdout(predicate::str::contains("elb"))
        .stdout(predicate::str::contains("npm"));
}

#[test]
fn test_cli_version() {
    TestEnv::new()
        .rune()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("runeflow"));
}

#[test]
fn test_docker_build_help() {
    TestEnv::new()
        .rune()
        .args(["docker", "build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DESCRIPTOR]"))
        .stdout(predicate::str::contains("--build-arg"))
        .stdout(predicate::str::contains("--jobs"));
}

#[test]
fn test_docker_build_dry_run() {
    TestEnv::new()
        .rune()
        .args(["--dry-run", "docker", "build", "app:v1,worker[docker/worker.Dockerfile]"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker build -f Dockerfile -t app:v1 --pull .",
        ))
        .stderr(predicate::str::contains(
            "[dry-run] docker build -f docker/worker.Dockerfile -t worker:latest --pull .",
        ))
        .stdout(predicate::str::contains("worker:latest"));
}

#[test]
fn test_docker_build_default_image_name() {
    TestEnv::new()
        .rune()
        .env("RUNEFLOW_PROJECT_NAME", "acme/Web-App")
        .args(["docker", "build", "--dry-run", "--no-pull", "--build-arg", "VERSION=1.0"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker build -f Dockerfile -t acme-web-app:latest --build-arg VERSION=1.0 .",
        ));
}

#[test]
fn test_docker_build_invalid_descriptor() {
    TestEnv::new()
        .rune()
        .args(["--dry-run", "docker", "build", "app,Bad/Name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid image name 'Bad/Name'"))
        .stderr(predicate::str::contains("[dry-run]").not());
}

#[test]
fn test_docker_build_invalid_build_arg() {
    TestEnv::new()
        .rune()
        .args(["--dry-run", "docker", "build", "app", "--build-arg", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_docker_push_dry_run_with_registry_and_tags() {
    TestEnv::new()
        .rune()
        .args([
            "--dry-run",
            "docker",
            "push",
            "app:v1",
            "--registry",
            "registry.example.com/",
            "--tags",
            "latest",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker tag app:v1 registry.example.com/app:v1",
        ))
        .stderr(predicate::str::contains(
            "[dry-run] docker push registry.example.com/app:v1",
        ))
        .stderr(predicate::str::contains(
            "[dry-run] docker push registry.example.com/app:latest",
        ));
}

#[test]
fn test_docker_push_release_tags_use_commit_hash() {
    TestEnv::new()
        .rune()
        .env("RUNEFLOW_COMMIT_SHA", "ABCDEF1234567890")
        .args(["--dry-run", "docker", "push", "app:v1", "--release-tags"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[dry-run] docker push app:v1"))
        .stderr(predicate::str::contains("[dry-run] docker tag app:v1 app:abcdef12"))
        .stderr(predicate::str::contains("[dry-run] docker push app:abcdef12"));
}

#[test]
fn test_docker_push_release_tags_use_version() {
    TestEnv::new()
        .rune()
        .env("RUNEFLOW_COMMIT_SHA", "abcdef1234")
        .env("RUNEFLOW_RELEASE_TAG", "v2.1.0")
        .args(["--dry-run", "docker", "push", "app", "--release-tags"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[dry-run] docker push app:2.1.0"));
}

#[test]
fn test_docker_push_registry_from_environment() {
    TestEnv::new()
        .rune()
        .env("DOCKER_REGISTRY", "ghcr.io/acme")
        .args(["--dry-run", "docker", "push", "api"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker push ghcr.io/acme/api:latest",
        ));
}

#[test]
fn test_docker_push_registry_from_config_file() {
    let env = TestEnv::new();
    fs::write(
        env.path().join("runeflow.yaml"),
        "docker:\n  registry: reg.example.com\n",
    )
    .unwrap();

    env.rune()
        .args(["--dry-run", "docker", "push", "app"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker tag app:latest reg.example.com/app:latest",
        ))
        .stderr(predicate::str::contains(
            "[dry-run] docker push reg.example.com/app:latest",
        ));
}

#[test]
fn test_docker_push_environment_registry_beats_config_file() {
    let env = TestEnv::new();
    fs::write(
        env.path().join("runeflow.yaml"),
        "docker:\n  registry: reg.example.com\n",
    )
    .unwrap();

    env.rune()
        .env("DOCKER_REGISTRY", "ghcr.io/acme")
        .args(["--dry-run", "docker", "push", "app"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[dry-run] docker push ghcr.io/acme/app:latest",
        ))
        .stderr(predicate::str::contains("reg.example.com").not());
}

#[test]
fn test_docker_resolve_document() {
    TestEnv::new()
        .rune()
        .args([
            "docker",
            "resolve",
            r#"{"docker": {"web": {"tags": ["1.0", "latest"]}, "api": {"dockerFile": "api/Dockerfile"}}}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Dockerfile\""))
        .stdout(predicate::str::contains("\"web:1.0\""))
        .stdout(predicate::str::contains("\"api/Dockerfile\""))
        .stderr(predicate::str::contains("document"));
}

#[test]
fn test_docker_defaults() {
    TestEnv::new()
        .rune()
        .env("RUNEFLOW_PROJECT_NAME", "acme/api")
        .env("RUNEFLOW_COMMIT_SHA", "0123456789abcdef")
        .args(["docker", "defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme-api"))
        .stdout(predicate::str::contains("01234567"))
        .stdout(predicate::str::contains("(unset)"));
}

#[test]
fn test_docker_login_requires_credentials() {
    TestEnv::new()
        .rune()
        .args(["--dry-run", "docker", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOCKER_USERNAME"));
}

#[test]
fn test_docker_login_dry_run_hides_password() {
    TestEnv::new()
        .rune()
        .env("DOCKER_USERNAME", "ci-bot")
        .env("DOCKER_PASSWORD", "hunter2")
        .args(["--dry-run", "docker", "login", "--registry", "ghcr.io"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logging in to ghcr.io as ci-bot"))
        .stderr(predicate::str::contains(
            "[dry-run] docker login -u ci-bot -p *** ghcr.io",
        ))
        .stderr(predicate::str::contains("hunter2").not());
}

#[test]
fn test_s3_list_dry_run_hides_keys() {
    TestEnv::new()
        .rune()
        .env("AWS_ACCESS_KEY_ID", "AKIA123")
        .env("AWS_SECRET_ACCESS_KEY", "topsecret")
        .args(["--dry-run", "s3", "list", "my-bucket"])
        .assert()
        .success()
        .stderr(predicate::str::contains("-e AWS_SECRET_ACCESS_KEY=***"))
        .stderr(predicate::str::contains("aws s3 ls my-bucket"))
        .stderr(predicate::str::contains("topsecret").not());
}

#[test]
fn test_npm_create_credentials() {
    let env = TestEnv::new();
    env.rune()
        .args(["npm", "create-credentials", "--auth-token", "tok-123"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(env.path().join(".npmrc")).unwrap(),
        "//registry.npmjs.org/:_authToken=tok-123\n"
    );
}

#[test]
fn test_npm_create_credentials_requires_token() {
    TestEnv::new()
        .rune()
        .args(["npm", "create-credentials"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NPM_AUTH_TOKEN"));
}

#[test]
fn test_aws_create_credentials_from_environment() {
    let env = TestEnv::new();
    env.rune()
        .env("AWS_ACCESS_KEY_ID", "AKIA123")
        .env("AWS_SECRET_ACCESS_KEY", "shh")
        .args(["aws", "create-credentials"])
        .assert()
        .success();

    let config = fs::read_to_string(env.path().join(".aws").join("config")).unwrap();
    assert!(config.starts_with("[profile eb-cli]\n"));
    assert!(config.contains("aws_access_key_id=AKIA123"));
}

#[test]
fn test_aws_create_credentials_dry_run_writes_nothing() {
    let env = TestEnv::new();
    env.rune()
        .env("AWS_ACCESS_KEY_ID", "AKIA123")
        .env("AWS_SECRET_ACCESS_KEY", "shh")
        .args(["--dry-run", "aws", "create-credentials"])
        .assert()
        .success();

    assert!(!env.path().join(".aws").exists());
}

#[test]
fn test_s3_get_rejects_non_s3_uri() {
    TestEnv::new()
        .rune()
        .env("AWS_ACCESS_KEY_ID", "AKIA123")
        .env("AWS_SECRET_ACCESS_KEY", "shh")
        .args(["--dry-run", "s3", "get", "https://example.com/file"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("s3://"));
}

#[test]
fn test_elb_deploy_dry_run() {
    let env = TestEnv::new();
    env.rune()
        .env("RUNEFLOW_BRANCH_NAME", "develop")
        .env("EB_DEPLOYMENT_PATTERN_STRING", "master:prod|develop:staging")
        .args(["--dry-run", "elb", "deploy", "--timeout", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staging"))
        .stderr(predicate::str::contains("mini/eb-cli"))
        .stderr(predicate::str::contains("eb deploy staging --timeout 30"));
}

#[test]
fn test_elb_deploy_unmapped_branch() {
    TestEnv::new()
        .rune()
        .env("RUNEFLOW_BRANCH_NAME", "feature-x")
        .args(["--dry-run", "elb", "deploy", "master:prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching environment for branch feature-x"));
}
