use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use performance_diff::Report;

/// Pretty JSON plus a trailing newline. `target` names the destination in
/// error messages.
fn write_json<W: Write>(writer: &mut W, report: &Report, target: &str) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut *writer, report)
        .map_err(|err| format!("Failed to serialize report JSON to {target}: {err}"))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| format!("Failed to write report to {target}: {err}"))
}

pub fn write_report(path: &Path, report: &Report) -> Result<(), String> {
    let target = format!("'{}'", path.display());
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| format!("Failed to create directory for {target}: {err}"))?;
    }
    let mut file =
        File::create(path).map_err(|err| format!("Failed to create {target}: {err}"))?;
    write_json(&mut file, report, &target)
}

pub fn print_report(report: &Report) -> Result<(), String> {
    write_json(&mut io::stdout().lock(), report, "stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use performance_diff::{build_report, diff, ReportSource};

    fn report() -> Report {
        let output = diff(&[], &[], 90.0, None).expect("empty inputs diff cleanly");
        build_report(
            ReportSource {
                generated_at: "2026-01-01T00:00:00Z".to_string(),
                expected_path: "score.json".to_string(),
                actual_path: "take.json".to_string(),
                reference_tempo: 90.0,
                observed_tempo: None,
            },
            output,
            false,
        )
    }

    #[test]
    fn json_ends_with_newline() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &report(), "buffer").unwrap();
        assert_eq!(buffer.last(), Some(&b'\n'));
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["meta"]["expected_path"], "score.json");
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("performance_diff_report_out");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("report.json");
        write_report(&path, &report()).unwrap();

        let written = fs::read(&path).unwrap();
        let mut expected = Vec::new();
        write_json(&mut expected, &report(), "buffer").unwrap();
        assert_eq!(written, expected);
        let _ = fs::remove_dir_all(&dir);
    }
}
