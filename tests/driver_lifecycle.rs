// tests/driver_lifecycle.rs

use std::error::Error;

use hvdriver::errors::DriverError;
use hvdriver::types::VmStatus;
use hvdriver_test_utils::builders::{exact_driver, fake_driver};
use hvdriver_test_utils::fake_executor::{Call, FakeExecutor};
use hvdriver_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn start_on_absent_vm_is_not_found() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().respond(Call::FindVm, "");
    let driver = fake_driver(&exec);

    let err = driver.start("devbox").await.unwrap_err();

    assert!(matches!(err, DriverError::NotFound(ref n) if n == "devbox"));
    assert_eq!(err.to_string(), "hyperv vm with name devbox does not exist");
    assert_eq!(exec.count(&Call::Cmdlet("Start-VM")), 0);
    assert_eq!(exec.rendered(), ["Hyper-V\\Get-VM -Name 'devbox*'"]);
    Ok(())
}

#[tokio::test]
async fn start_existing_vm() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().with_vm("devbox", "Off");
    let driver = fake_driver(&exec);

    driver.start("devbox").await?;

    assert_eq!(exec.cmdlets(), ["Get-VM", "Start-VM"]);
    assert_eq!(exec.rendered()[1], "Hyper-V\\Start-VM -Name 'devbox'");
    Ok(())
}

#[tokio::test]
async fn start_failure_is_wrapped() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .with_vm("devbox", "Off")
        .fail(Call::Cmdlet("Start-VM"), "not enough memory");
    let driver = fake_driver(&exec);

    let err = driver.start("devbox").await.unwrap_err();
    assert_eq!(err.to_string(), "start-vm: not enough memory");
    Ok(())
}

#[tokio::test]
async fn existence_check_failure_is_an_error_not_absence() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().fail(Call::FindVm, "module not loaded");
    let driver = fake_driver(&exec);

    for result in [
        driver.start("devbox").await,
        driver.stop("devbox").await,
        driver.destroy("devbox").await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "getting vms: module not loaded");
    }

    let err = driver.is_running("devbox").await.unwrap_err();
    assert_eq!(err.step(), Some("getting vms"));

    // Only existence checks were issued.
    assert_eq!(exec.calls().len(), 4);
    assert_eq!(exec.count(&Call::FindVm), 4);
    Ok(())
}

#[tokio::test]
async fn stop_and_destroy_absent_vm_are_noops() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new();
    let driver = fake_driver(&exec);

    driver.stop("devbox").await?;
    driver.destroy("devbox").await?;

    assert_eq!(exec.cmdlets(), ["Get-VM", "Get-VM"]);
    assert_eq!(exec.count(&Call::FindVm), 2);
    Ok(())
}

#[tokio::test]
async fn stop_existing_vm_turns_it_off() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().with_vm("devbox", "Running");
    let driver = fake_driver(&exec);

    driver.stop("devbox").await?;

    assert_eq!(
        exec.rendered(),
        [
            "Hyper-V\\Get-VM -Name 'devbox*'",
            "Hyper-V\\Stop-VM -Name 'devbox' -TurnOff",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn stop_failure_is_wrapped() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .with_vm("devbox", "Running")
        .fail(Call::Cmdlet("Stop-VM"), "busy");
    let err = fake_driver(&exec).stop("devbox").await.unwrap_err();
    assert_eq!(err.to_string(), "stopping vm: busy");
    Ok(())
}

#[tokio::test]
async fn destroy_existing_vm_forces_removal() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().with_vm("devbox", "Off");
    let driver = fake_driver(&exec);

    driver.destroy("devbox").await?;

    assert_eq!(exec.rendered()[1], "Hyper-V\\Remove-VM -Name 'devbox' -Force");
    Ok(())
}

#[tokio::test]
async fn destroy_failure_is_wrapped() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .with_vm("devbox", "Off")
        .fail(Call::Cmdlet("Remove-VM"), "file in use");
    let err = fake_driver(&exec).destroy("devbox").await.unwrap_err();
    assert_eq!(err.to_string(), "removing vm: file in use");
    Ok(())
}

#[tokio::test]
async fn is_running_reads_state_text() -> TestResult {
    init_tracing();

    let running = FakeExecutor::new().with_vm("devbox", "Running");
    assert!(fake_driver(&running).is_running("devbox").await?);

    let off = FakeExecutor::new().with_vm("devbox", "Off");
    assert!(!fake_driver(&off).is_running("devbox").await?);

    let empty = FakeExecutor::new()
        .respond(Call::FindVm, "devbox")
        .respond(Call::VmState, "");
    assert!(!fake_driver(&empty).is_running("devbox").await?);
    assert_eq!(empty.count(&Call::VmState), 1);
    Ok(())
}

#[tokio::test]
async fn is_running_skips_state_query_for_absent_vm() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new().respond(Call::VmState, "State : Running");
    let driver = fake_driver(&exec);

    assert!(!driver.is_running("devbox").await?);
    assert_eq!(exec.count(&Call::VmState), 0);
    Ok(())
}

#[tokio::test]
async fn whitespace_lookup_output_means_present() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .respond(Call::FindVm, "\r\n")
        .respond(Call::VmState, "State : Running");
    assert_eq!(fake_driver(&exec).status("devbox").await?, VmStatus::Running);
    assert_eq!(exec.count(&Call::VmState), 1);

    let exec = FakeExecutor::new().respond(Call::FindVm, " ");
    fake_driver(&exec).start("devbox").await?;
    assert_eq!(exec.cmdlets(), ["Get-VM", "Start-VM"]);

    let exec = FakeExecutor::new().respond(Call::FindVm, "\n");
    fake_driver(&exec).destroy("devbox").await?;
    assert_eq!(exec.cmdlets(), ["Get-VM", "Remove-VM"]);
    Ok(())
}

#[tokio::test]
async fn state_query_failure_is_wrapped() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .respond(Call::FindVm, "devbox")
        .fail(Call::VmState, "rpc unavailable");
    let err = fake_driver(&exec).is_running("devbox").await.unwrap_err();
    assert_eq!(err.to_string(), "getting vm state: rpc unavailable");
    Ok(())
}

#[tokio::test]
async fn status_reports_three_states() -> TestResult {
    init_tracing();

    let absent = FakeExecutor::new();
    assert_eq!(fake_driver(&absent).status("devbox").await?, VmStatus::Absent);

    let stopped = FakeExecutor::new().with_vm("devbox", "Saved");
    assert_eq!(fake_driver(&stopped).status("devbox").await?, VmStatus::Stopped);

    let running = FakeExecutor::new().with_vm("devbox", "Running");
    assert_eq!(fake_driver(&running).status("devbox").await?, VmStatus::Running);
    Ok(())
}

#[tokio::test]
async fn status_is_never_cached() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .respond(Call::FindVm, "devbox")
        .respond_once(Call::VmState, "State : Running")
        .respond(Call::VmState, "State : Off");
    let driver = fake_driver(&exec);

    assert_eq!(driver.status("devbox").await?, VmStatus::Running);
    assert_eq!(driver.status("devbox").await?, VmStatus::Stopped);
    assert_eq!(exec.count(&Call::FindVm), 2);
    assert_eq!(exec.count(&Call::VmState), 2);
    Ok(())
}

#[tokio::test]
async fn prefix_match_reports_similarly_named_vm_as_existing() -> TestResult {
    init_tracing();

    // Only "foobar" exists, but the wildcard lookup for "foo" still finds it.
    let exec = FakeExecutor::new().with_vm("foobar", "Off");
    let driver = fake_driver(&exec);

    assert_eq!(driver.status("foo").await?, VmStatus::Stopped);
    assert_eq!(exec.rendered()[0], "Hyper-V\\Get-VM -Name 'foo*'");
    Ok(())
}

#[tokio::test]
async fn exact_match_queries_literal_name() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new();
    let driver = exact_driver(&exec);

    driver.destroy("foo").await?;

    assert_eq!(
        exec.rendered(),
        ["Hyper-V\\Get-VM -Name 'foo' -ErrorAction SilentlyContinue"]
    );
    Ok(())
}

#[tokio::test]
async fn blank_name_is_rejected_before_any_command() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new();
    let driver = fake_driver(&exec);

    assert!(matches!(driver.start("").await, Err(DriverError::InvalidSpec(_))));
    assert!(matches!(driver.stop("  ").await, Err(DriverError::InvalidSpec(_))));
    assert!(matches!(driver.status("").await, Err(DriverError::InvalidSpec(_))));
    assert!(exec.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn full_lifecycle_against_scripted_hypervisor() -> TestResult {
    init_tracing();

    let exec = FakeExecutor::new()
        .respond(Call::VmGuid, "5f0c-77aa\r\n")
        .respond(Call::FindVm, "devbox")
        .respond(Call::VmState, "State : Running");
    let driver = fake_driver(&exec);

    let handle = driver.create("devbox", &hvdriver_test_utils::builders::devbox_spec()).await?;
    assert_eq!(handle, "5f0c-77aa");

    driver.start("devbox").await?;
    assert!(driver.is_running("devbox").await?);
    driver.stop("devbox").await?;
    driver.destroy("devbox").await?;

    let issued = exec.cmdlets();
    let tail: Vec<&str> = issued[8..].iter().map(String::as_str).collect();
    assert_eq!(
        tail,
        [
            "Get-VM", "Start-VM", // start
            "Get-VM", "Get-VM", // is_running
            "Get-VM", "Stop-VM", // stop
            "Get-VM", "Remove-VM", // destroy
        ]
    );
    Ok(())
}
