use std::sync::{Arc, Mutex};

use acrpush_build::{Step, build_and_push, find_dockerfiles, resolve_registry};
use acrpush_cloud::{CommandExecutor, ExecError, Gateway, OutputSink};
use acrpush_core::{BuildPlan, WorkflowError};
use mockall::mock;
use tempfile::TempDir;

mock! {
    Executor {}

    impl CommandExecutor for Executor {
        async fn exec(
            &self,
            program: &str,
            args: &[String],
            sink: &OutputSink,
        ) -> Result<String, ExecError>;
    }
}

#[cfg(unix)]
fn exit_1(output: &str) -> ExecError {
    use std::os::unix::process::ExitStatusExt;
    ExecError::CommandFailed {
        command: "docker".to_owned(),
        status: std::process::ExitStatus::from_raw(1 << 8),
        output: output.to_owned(),
    }
}

fn plan(tmp: &TempDir, skip_latest: bool) -> BuildPlan {
    std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").unwrap();
    BuildPlan::new(
        "reg.example.com",
        "myrepo",
        "1.0.0",
        tmp.path().join("Dockerfile"),
        tmp.path(),
    )
    .unwrap()
    .with_skip_latest(skip_latest)
}

/// Mock that records `docker <subcommand> [last arg]` for every call.
fn recording_executor(fail_on: Option<&'static str>) -> (MockExecutor, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(move |program, args, _| {
        assert_eq!(program, "docker");
        let sub = args[0].clone();
        let call = match sub.as_str() {
            "push" => format!("push {}", args[1]),
            other => other.to_owned(),
        };
        recorded.lock().unwrap().push(call);
        match fail_on {
            #[cfg(unix)]
            Some(step) if step == sub => Err(exit_1("ERROR: failed to solve: dockerfile parse error")),
            _ => Ok(String::new()),
        }
    });
    (mock, calls)
}

// ── Step ordering ──

#[tokio::test]
async fn full_run_tags_and_pushes_latest() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, false);
    let (mock, calls) = recording_executor(None);

    let steps = build_and_push(&Gateway::with_executor(mock), &plan).await.unwrap();

    assert_eq!(
        steps,
        vec![
            Step::EngineCheck,
            Step::Build,
            Step::TagLatest,
            Step::Push,
            Step::PushLatest
        ]
    );
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "info",
            "build",
            "tag",
            "push reg.example.com/myrepo:1.0.0",
            "push reg.example.com/myrepo:latest",
        ]
    );
}

#[tokio::test]
async fn skip_latest_only_pushes_version() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, true);
    let (mock, calls) = recording_executor(None);

    build_and_push(&Gateway::with_executor(mock), &plan).await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["info", "build", "push reg.example.com/myrepo:1.0.0"]
    );
}

#[tokio::test]
async fn build_receives_plan_arguments() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, true).with_platform(Some("linux/amd64".to_owned()));
    let dockerfile = tmp.path().join("Dockerfile").to_str().unwrap().to_owned();
    let context = tmp.path().to_str().unwrap().to_owned();

    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|_, args, _| args[0] != "build")
        .returning(|_, _, _| Ok(String::new()));
    mock.expect_exec()
        .withf(move |_, args, _| {
            args == [
                "build",
                "--platform",
                "linux/amd64",
                "-t",
                "reg.example.com/myrepo:1.0.0",
                "-f",
                dockerfile.as_str(),
                context.as_str(),
            ]
        })
        .times(1)
        .returning(|_, _, _| Ok(String::new()));

    build_and_push(&Gateway::with_executor(mock), &plan).await.unwrap();
}

// ── Failures ──

#[cfg(unix)]
#[tokio::test]
async fn build_failure_stops_before_tag_and_push() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, false);
    let (mock, calls) = recording_executor(Some("build"));

    let err = build_and_push(&Gateway::with_executor(mock), &plan)
        .await
        .unwrap_err();

    assert_eq!(*calls.lock().unwrap(), vec!["info", "build"]);
    let WorkflowError::Tool(message) = err else {
        panic!("expected a tool error");
    };
    assert!(message.starts_with("Docker build failed"));
    assert!(message.contains("dockerfile parse error"));
}

#[cfg(unix)]
#[tokio::test]
async fn engine_failure_runs_nothing_else() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, false);
    let (mock, calls) = recording_executor(Some("info"));

    let err = build_and_push(&Gateway::with_executor(mock), &plan)
        .await
        .unwrap_err();

    assert_eq!(*calls.lock().unwrap(), vec!["info"]);
    assert!(err.to_string().starts_with("Docker daemon is not running"));
}

#[cfg(unix)]
#[tokio::test]
async fn failed_latest_push_keeps_version_push() {
    let tmp = TempDir::new().unwrap();
    let plan = plan(&tmp, false);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    let mut mock = MockExecutor::new();
    mock.expect_exec().returning(move |_, args, _| {
        recorded.lock().unwrap().push(args.join(" "));
        if args.last().is_some_and(|a| a.ends_with(":latest")) && args[0] == "push" {
            Err(exit_1("denied"))
        } else {
            Ok(String::new())
        }
    });

    let err = build_and_push(&Gateway::with_executor(mock), &plan)
        .await
        .unwrap_err();

    assert_eq!(calls.lock().unwrap().len(), 5);
    assert_eq!(
        err.to_string().lines().next().unwrap_or_default(),
        "failed to push image: reg.example.com/myrepo:latest: `docker` exited with exit status: 1: denied"
    );
}

// ── Registry resolution ──

#[tokio::test]
async fn resolve_registry_returns_login_server() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .withf(|program, args, _| program == "az" && args[..2] == ["acr", "show"])
        .returning(|_, _, _| {
            Ok(r#"{"name":"myacr","resourceGroup":"rg","loginServer":"myacr.azurecr.io"}"#.to_owned())
        });

    let registry = resolve_registry(&Gateway::with_executor(mock), "myacr", "rg")
        .await
        .unwrap();

    assert_eq!(registry.login_server, "myacr.azurecr.io");
}

#[cfg(unix)]
#[tokio::test]
async fn resolve_registry_translates_tool_error() {
    let mut mock = MockExecutor::new();
    mock.expect_exec()
        .returning(|_, _, _| Err(exit_1("(ResourceNotFound) The Resource was not found.")));

    let err = resolve_registry(&Gateway::with_executor(mock), "ghost", "rg")
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Tool(ref m) if m.starts_with("registry not found: ghost")));
}

// ── Dockerfile discovery ──

#[test]
fn finds_dockerfiles_recursively_in_path_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("services/web")).unwrap();
    std::fs::create_dir_all(root.join("docker")).unwrap();
    std::fs::write(root.join("services/web/Dockerfile"), "").unwrap();
    std::fs::write(root.join("Dockerfile"), "").unwrap();
    std::fs::write(root.join("docker/api.dockerfile"), "").unwrap();
    std::fs::write(root.join("docker/Dockerfile.dev"), "").unwrap();
    std::fs::write(root.join("README.md"), "").unwrap();
    std::fs::create_dir_all(root.join("Dockerfile.d")).unwrap();

    let found = find_dockerfiles(root);

    assert_eq!(
        found,
        vec![
            root.join("Dockerfile"),
            root.join("docker/api.dockerfile"),
            root.join("services/web/Dockerfile"),
        ]
    );
}

#[test]
fn no_dockerfiles_is_empty() {
    let tmp = TempDir::new().unwrap();
    assert!(find_dockerfiles(tmp.path()).is_empty());
}

// ── Session ──

mod session {
    use super::*;
    use acrpush_build::{open_session, resume_session, tenant_mismatch};
    use acrpush_cloud::Account;

    const ACCOUNT_T1: &str = r#"{"tenantId":"t-1","tenantName":"Contoso","accountName":"Prod"}"#;
    const ACCOUNT_T2: &str = r#"{"tenantId":"t-2","tenantName":"Fabrikam","accountName":"Dev"}"#;

    #[tokio::test]
    async fn same_tenant_skips_login() {
        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .withf(|_, args, _| args == ["account", "show"])
            .times(1)
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|_, args, _| args.len() > 2 && args[..2] == ["account", "show"])
            .times(1)
            .returning(|_, _, _| Ok(ACCOUNT_T1.to_owned()));
        mock.expect_exec()
            .withf(|_, args, _| args[..2] == ["account", "set"])
            .times(1)
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|_, args, _| args[0] == "login")
            .never();

        let account = open_session(&Gateway::with_executor(mock), Some("t-1"), Some("sub"))
            .await
            .unwrap();

        assert_eq!(account.tenant_name, "Contoso");
    }

    #[tokio::test]
    async fn other_tenant_logs_in_and_rereads_account() {
        let reads = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&reads);

        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .withf(|_, args, _| args == ["account", "show"])
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|_, args, _| args.len() > 2 && args[..2] == ["account", "show"])
            .times(2)
            .returning(move |_, _, _| {
                let mut n = counter.lock().unwrap();
                *n += 1;
                Ok(if *n == 1 { ACCOUNT_T1 } else { ACCOUNT_T2 }.to_owned())
            });
        mock.expect_exec()
            .withf(|_, args, _| args == ["login", "--tenant", "t-2"])
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let account = open_session(&Gateway::with_executor(mock), Some("t-2"), None)
            .await
            .unwrap();

        assert_eq!(account.tenant_id, "t-2");
        assert_eq!(*reads.lock().unwrap(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn logged_out_session_is_a_workflow_error() {
        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .times(1)
            .returning(|_, _, _| Err(exit_1("Please run 'az login' to setup account.")));

        let err = open_session(&Gateway::with_executor(mock), None, None)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Azure CLI is not logged in"));
    }

    #[tokio::test]
    async fn resume_never_logs_in_to_another_tenant() {
        let mut mock = MockExecutor::new();
        mock.expect_exec()
            .withf(|_, args, _| args == ["account", "show"])
            .times(1)
            .returning(|_, _, _| Ok(String::new()));
        mock.expect_exec()
            .withf(|_, args, _| args.len() > 2 && args[..2] == ["account", "show"])
            .times(1)
            .returning(|_, _, _| Ok(ACCOUNT_T1.to_owned()));
        mock.expect_exec()
            .withf(|_, args, _| args[0] == "login")
            .never();

        let account = resume_session(&Gateway::with_executor(mock), None)
            .await
            .unwrap();

        assert_eq!(account.tenant_id, "t-1");
        assert_eq!(tenant_mismatch(&account, Some("t-2")), Some("t-2"));
    }

    #[test]
    fn tenant_mismatch_ignores_blank_and_matching_ids() {
        let account = Account {
            tenant_id: "t-1".to_owned(),
            tenant_name: "Contoso".to_owned(),
            account_name: "Prod".to_owned(),
        };
        assert_eq!(tenant_mismatch(&account, None), None);
        assert_eq!(tenant_mismatch(&account, Some("  ")), None);
        assert_eq!(tenant_mismatch(&account, Some(" t-1 ")), None);
        assert_eq!(tenant_mismatch(&account, Some(" t-2 ")), Some("t-2"));
    }
}
