//! Integration tests for the command execution core
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};

use binaryd_process::{execute, CancellationToken, CommandSpec, Outcome, StatusCode};

fn spec(command: &str, timeout: Duration) -> CommandSpec {
    CommandSpec::new(command, timeout).expect("valid spec")
}

#[tokio::test]
async fn test_echo_output_is_exact() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("/bin/sh -c 'echo hello world'", Duration::from_secs(5)),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Ok);
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.output, "hello world\n");
    assert!(result.is_success());
    assert!(result.started_at > 0);
}

#[tokio::test]
async fn test_no_newline_added() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("/bin/sh -c 'printf hello'", Duration::from_secs(5)),
        &shutdown,
    )
    .await;

    assert_eq!(result.output, "hello");
    assert_eq!(result.rc(), 0);
}

#[tokio::test]
async fn test_raw_exit_code_is_returned() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("/bin/sh -c 'echo failing; exit 42'", Duration::from_secs(5)),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Exit(42));
    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.output, "failing\n");
}

#[tokio::test]
async fn test_stdout_and_stderr_are_combined() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("/bin/sh -c 'echo out; echo err >&2'", Duration::from_secs(5)),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Ok);
    assert!(result.output.contains("out\n"));
    assert!(result.output.contains("err\n"));
    assert_eq!(result.output.len(), "out\nerr\n".len());
}

#[tokio::test]
async fn test_large_output_is_fully_captured() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec(
            "/bin/sh -c 'head -c 200000 /dev/zero'",
            Duration::from_secs(10),
        ),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Ok);
    assert_eq!(result.output.len(), 200_000);
}

#[tokio::test]
async fn test_timeout_returns_promptly() {
    let shutdown = CancellationToken::new();
    let start = Instant::now();
    let result = execute(
        spec("/bin/sh -c 'sleep 30'", Duration::from_millis(500)),
        &shutdown,
    )
    .await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(result.status, StatusCode::Timeout);
    assert_eq!(result.rc(), 124);
    assert_eq!(result.outcome, Outcome::TimeoutExceeded);
    assert_eq!(
        result.output,
        "Command /bin/sh -c sleep 30 timed out after 0.5 seconds"
    );
}

#[cfg(target_os = "linux")]
fn is_alive(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Zombies are dead even if nobody has reaped them yet
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            .map(|state| state != "Z")
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_descendants() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("grandchild.pid");
    let command = format!("sleep 30 & echo $! > {}; wait", pid_file.display());

    let shutdown = CancellationToken::new();
    let result = execute(
        spec(&command, Duration::from_secs(1)).shell("/bin/sh"),
        &shutdown,
    )
    .await;
    assert_eq!(result.status, StatusCode::Timeout);

    let pid: i32 = std::fs::read_to_string(&pid_file)
        .expect("grandchild pid written")
        .trim()
        .parse()
        .unwrap();

    let mut alive = true;
    for _ in 0..40 {
        alive = is_alive(pid);
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!alive, "grandchild {} survived the timeout", pid);
}

#[tokio::test]
async fn test_upstream_cancellation_kills_child() {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let result = execute(
        spec("/bin/sh -c 'sleep 30'", Duration::from_secs(30)),
        &shutdown,
    )
    .await;

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(result.status, StatusCode::Unknown);
    assert!(!result.output.contains("timed out"));
}

#[tokio::test]
async fn test_missing_binary_is_not_found() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec(
            "/nonexistent/binaryd-test-binary --flag",
            Duration::from_secs(5),
        ),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::NotFound);
    assert_eq!(result.rc(), 127);
    assert_eq!(result.outcome, Outcome::ProcessNotFound);
    assert_eq!(
        result.output,
        "No such file or directory: '/nonexistent/binaryd-test-binary --flag'"
    );
}

#[tokio::test]
async fn test_non_executable_file() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.sh");
    std::fs::write(&script, "#!/bin/sh\necho nope\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o644)).unwrap();

    let shutdown = CancellationToken::new();
    let command = script.display().to_string();
    let result = execute(spec(&command, Duration::from_secs(5)), &shutdown).await;

    assert_eq!(result.status, StatusCode::NotExecutable);
    assert_eq!(result.rc(), 126);
    assert_eq!(result.output, format!("File not executable: '{}'", command));
}

#[tokio::test]
async fn test_unbalanced_quote_is_unknown() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("echo 'unbalanced", Duration::from_secs(5)),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Unknown);
    assert_eq!(result.outcome, Outcome::TokenizationFailed);
    assert!(!result.output.is_empty());
}

#[tokio::test]
async fn test_shell_reads_command_from_stdin() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("echo from-shell; exit 2", Duration::from_secs(5)).shell("/bin/sh"),
        &shutdown,
    )
    .await;

    assert_eq!(result.output, "from-shell\n");
    assert_eq!(result.status, StatusCode::Critical);
}

#[tokio::test]
async fn test_explicit_stdin_is_fed_to_child() {
    let shutdown = CancellationToken::new();
    let result = execute(
        spec("/bin/cat", Duration::from_secs(5)).stdin("payload\nline two"),
        &shutdown,
    )
    .await;

    assert_eq!(result.status, StatusCode::Ok);
    assert_eq!(result.output, "payload\nline two");
}

#[tokio::test]
async fn test_environment_is_not_inherited() {
    std::env::set_var("BINARYD_TEST_MARKER", "leaked");

    let shutdown = CancellationToken::new();
    let result = execute(
        spec(
            r#"echo "marker=${BINARYD_TEST_MARKER:-unset}""#,
            Duration::from_secs(5),
        )
        .shell("/bin/sh"),
        &shutdown,
    )
    .await;

    assert_eq!(result.output, "marker=unset\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_executions_are_independent() {
    let shutdown = CancellationToken::new();

    let slow = execute(
        spec(
            "/bin/sh -c 'sleep 0.3; printf slow; exit 3'",
            Duration::from_secs(5),
        ),
        &shutdown,
    );
    let fast = execute(
        spec("/bin/sh -c 'printf fast'", Duration::from_secs(5)),
        &shutdown,
    );
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.output, "slow");
    assert_eq!(slow.status, StatusCode::Unknown);
    assert_eq!(slow.outcome, Outcome::Completed);
    assert_eq!(fast.output, "fast");
    assert_eq!(fast.status, StatusCode::Ok);
}

#[tokio::test]
async fn test_process_listing() {
    if !Path::new("/usr/bin/ps").exists() {
        return;
    }

    let shutdown = CancellationToken::new();
    let result = execute(spec("/usr/bin/ps -eaf", Duration::from_secs(5)), &shutdown).await;

    assert_eq!(result.status, StatusCode::Ok);
    assert!(result.output.lines().next().unwrap_or("").contains("PID"));
}
