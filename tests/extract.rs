use anyhow::Result;
use kernel_test::extract::{extract, SECTION_END, SECTION_START};
use kernel_test::types::ValueType;
use std::fs;
use tempfile::tempdir;

fn report_body() -> &'static str {
    r#"{
    "version": "1.0",
    "name": "Basic Suite",
    "number_of_tests": 2,
    "failures": 1,
    "success": 1,
    "test_suite": {
        "2000": {"result": 4, "expected": 4, "status": 1, "type": 7},
        "2001": {"result": 1, "expected": 0, "status": 0, "type": 10}
    }
}"#
}

fn wrap_in_console_noise(body: &str) -> String {
    format!("[BOOT] kernel starting\nirq init ok\n{SECTION_START}\n{body}\n{SECTION_END}\nqemu: terminating\n")
}

#[test]
fn extracts_the_report_from_noisy_output() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    fs::write(&file, wrap_in_console_noise(report_body()))?;

    let report = extract(&file)?.expect("report should be present");
    assert_eq!(report.version, "1.0");
    assert_eq!(report.name, "Basic Suite");
    assert_eq!(report.number_of_tests, 2);
    assert_eq!(report.failures, 1);
    assert_eq!(report.cases.len(), 2);

    let failing = &report.cases["2001"];
    assert!(!failing.status);
    assert_eq!(failing.r#type, ValueType::RCode);
    Ok(())
}

#[test]
fn output_without_sentinels_is_missing_not_an_error() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    fs::write(&file, "[BOOT] kernel starting\npanic: nothing to report\n")?;

    assert!(extract(&file)?.is_none());
    Ok(())
}

#[test]
fn duplicate_test_ids_fail_the_whole_parse() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    let body = r#"{
    "version": "1.0",
    "name": "Dup Suite",
    "number_of_tests": 2,
    "failures": 0,
    "success": 2,
    "test_suite": {
        "2000": {"result": 4, "expected": 4, "status": 1, "type": 7},
        "2000": {"result": 4, "expected": 4, "status": 1, "type": 7}
    }
}"#;
    fs::write(&file, wrap_in_console_noise(body))?;

    let err = extract(&file).unwrap_err();
    assert!(format!("{err:#}").contains("duplicate test id \"2000\""));
    Ok(())
}

#[test]
fn undecodable_bytes_outside_the_report_are_tolerated() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    let mut raw = vec![0xff, 0xfe, 0x80, b'\n'];
    raw.extend_from_slice(wrap_in_console_noise(report_body()).as_bytes());
    fs::write(&file, raw)?;

    assert!(extract(&file)?.is_some());
    Ok(())
}

#[test]
fn truncated_report_is_malformed() -> Result<()> {
    // A killed run can cut the output mid-report; that is a parse error,
    // never a partially trusted report.
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    fs::write(
        &file,
        format!("{SECTION_START}\n{{\n    \"version\": \"1.0\",\n"),
    )?;

    assert!(extract(&file).is_err());
    Ok(())
}

#[test]
fn out_of_range_type_index_is_malformed() -> Result<()> {
    let dir = tempdir()?;
    let file = dir.path().join("out.txt");
    let body = r#"{
    "version": "1.0",
    "name": "Bad Type",
    "number_of_tests": 1,
    "failures": 0,
    "success": 1,
    "test_suite": {
        "1": {"result": 0, "expected": 0, "status": 1, "type": 12}
    }
}"#;
    fs::write(&file, wrap_in_console_noise(body))?;

    let err = extract(&file).unwrap_err();
    assert!(format!("{err:#}").contains("unknown test value type index 12"));
    Ok(())
}
