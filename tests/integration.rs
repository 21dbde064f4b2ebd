use assert_cmd::cargo::cargo_bin;
use duct::cmd;
use tempfile::TempDir;

#[test]
fn writes_a_csv_file_with_header() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_path = temp_dir.path().join("out.csv");

    cmd!(cargo_bin("fwrite"), "--rows", "50", "--output", &out_path)
        .run()
        .unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id,value,label"));
    assert_eq!(lines.next(), Some("0,-500,row-0"));
    assert_eq!(content.lines().count(), 51); // header + 50 rows
}

#[test]
fn custom_separator_is_honored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let out_path = temp_dir.path().join("out.tsv");

    cmd!(
        cargo_bin("fwrite"),
        "--rows",
        "10",
        "--sep",
        ";",
        "--output",
        &out_path
    )
    .run()
    .unwrap();

    let content = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(content.lines().next(), Some("id;value;label"));
}

#[test]
fn output_is_identical_across_thread_counts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let single = temp_dir.path().join("single.csv");
    let multi = temp_dir.path().join("multi.csv");

    cmd!(
        cargo_bin("fwrite"),
        "--rows",
        "20000",
        "--threads",
        "1",
        "--output",
        &single
    )
    .run()
    .unwrap();
    cmd!(
        cargo_bin("fwrite"),
        "--rows",
        "20000",
        "--threads",
        "8",
        "--output",
        &multi
    )
    .run()
    .unwrap();

    assert_eq!(
        std::fs::read(&single).unwrap(),
        std::fs::read(&multi).unwrap()
    );
}

#[test]
fn writes_to_console_when_output_is_dash() {
    let output = cmd!(cargo_bin("fwrite"), "--rows", "3", "--output", "-")
        .read()
        .unwrap();
    assert_eq!(output.lines().next(), Some("id,value,label"));
    assert_eq!(output.lines().count(), 4);
}
