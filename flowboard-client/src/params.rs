//! Log parameter extraction
//!
//! GitHub Actions prints the environment of every step invocation as a
//! group in the job log:
//!
//! ```text
//! 2022-02-24T11:10:24.8627684Z env:
//! 2022-02-24T11:10:24.8628366Z   foo: 1234
//! 2022-02-24T11:10:24.8629094Z   bar: xyz
//! 2022-02-24T11:10:24.8629861Z ##[endgroup]
//! ```
//!
//! The scanner walks each file line by line with two states (outside a
//! block, inside a block) and turns every block line into a key/value pair.

use flowboard_core::domain::run::ParameterSet;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::{ClientError, Result};

/// Content (after the timestamp) of the line opening a parameter block
pub const BLOCK_START: &str = "env:";

/// Suffix of the line closing a parameter block
pub const BLOCK_END: &str = "[endgroup]";

/// A file decoded from a log archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub name: String,
    pub body: Vec<u8>,
}

impl LogFile {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// Decodes an in-memory zip archive into its files, in listing order
pub fn read_archive(bytes: &[u8]) -> Result<Vec<LogFile>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        let mut body = Vec::new();
        entry.read_to_end(&mut body).map_err(|e| {
            ClientError::Archive(format!("failed reading zip file {}, err: {}", name, e))
        })?;

        files.push(LogFile { name, body });
    }

    Ok(files)
}

/// Parses every file; the first malformed file aborts the whole extraction
pub fn parse_log_files(files: &[LogFile]) -> Result<Vec<ParameterSet>> {
    files.iter().map(parse_log_file).collect()
}

enum ScanState<'a> {
    Outside,
    /// Lines collected since the opening `env:` line, with 1-based numbers
    Inside(Vec<(usize, &'a str)>),
}

/// Extracts the parameters of all blocks of one log file
///
/// Blocks are only parsed once their closing line is seen, so a block cut
/// off at the end of the file is ignored. Later blocks win on repeated keys.
pub fn parse_log_file(file: &LogFile) -> Result<ParameterSet> {
    let text = String::from_utf8_lossy(&file.body);
    let mut params = ParameterSet::new();
    let mut state = ScanState::Outside;

    for (index, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let content = line_content(line).trim_end();

        state = match state {
            ScanState::Outside if content == BLOCK_START => ScanState::Inside(Vec::new()),
            ScanState::Outside => ScanState::Outside,
            ScanState::Inside(lines) if content.ends_with(BLOCK_END) => {
                for (line_number, line) in lines {
                    let (key, value) = parse_parameter_line(&file.name, line_number, line)?;
                    params.insert(key.to_string(), value.to_string());
                }
                ScanState::Outside
            }
            ScanState::Inside(mut lines) => {
                lines.push((index + 1, line));
                ScanState::Inside(lines)
            }
        };
    }

    Ok(params)
}

/// Text following the leading timestamp token
fn line_content(line: &str) -> &str {
    line.split_once(|c: char| c.is_ascii_whitespace())
        .map(|(_, rest)| rest)
        .unwrap_or(line)
}

fn parse_parameter_line<'a>(
    file: &str,
    line_number: usize,
    line: &'a str,
) -> Result<(&'a str, &'a str)> {
    strip_timestamp(line)
        .and_then(|payload| payload.split_once(": "))
        .ok_or_else(|| ClientError::MalformedParameter {
            file: file.to_string(),
            line_number,
            line: line.to_string(),
        })
}

/// Splits on the first run of two or more whitespace characters, or a tab,
/// and returns what follows it
fn strip_timestamp(line: &str) -> Option<&str> {
    let mut chars = line.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !c.is_ascii_whitespace() {
            continue;
        }

        let mut run = 1;
        while let Some(&(_, next)) = chars.peek() {
            if !next.is_ascii_whitespace() {
                break;
            }
            run += 1;
            chars.next();
        }

        if run >= 2 || c == '\t' {
            let end = chars.peek().map(|&(idx, _)| idx).unwrap_or(line.len());
            return Some(&line[end..]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn log_file(body: &str) -> LogFile {
        LogFile::new("dummy-log-file", body)
    }

    fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const CHECKOUT_LOG: &str = "
2022-02-24T11:10:21.2859625Z ##[group]GITHUB_TOKEN Permissions
2022-02-24T11:10:21.2862230Z Actions: write
2022-02-24T11:10:21.2970062Z ##[endgroup]
2022-02-24T11:10:21.2977393Z Secret source: Actions
2022-02-24T11:10:24.8619017Z ##[group]Run actions/checkout@v2
2022-02-24T11:10:24.8619909Z with:
2022-02-24T11:10:24.8620689Z   repository: foo/bar
2022-02-24T11:10:24.8621874Z   token: ***
2022-02-24T11:10:24.8627684Z env:
2022-02-24T11:10:24.8628366Z   param-1: foo
2022-02-24T11:10:24.8629094Z   param-2: bar
2022-02-24T11:10:24.8629861Z ##[endgroup]
2022-02-24T11:10:25.0404068Z Syncing repository: foo/bar
2022-02-24T11:10:25.0407211Z ##[group]Getting Git version info
2022-02-24T11:10:25.0410386Z [command]/usr/bin/git version";

    #[test]
    fn test_parse_single_block() {
        let params = parse_log_file(&log_file(CHECKOUT_LOG)).unwrap();

        let expected: ParameterSet = [("param-1", "foo"), ("param-2", "bar")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn test_parse_crlf_block() {
        let body = "2022-02-24T11:28:55.2810181Z env:\r\n\
                    2022-02-24T11:28:55.2810792Z   xxx: 203\r\n\
                    2022-02-24T11:28:55.2811677Z   yyy: aaa\r\n\
                    2022-02-24T11:28:55.2812310Z ##[endgroup]\r\n";
        let params = parse_log_file(&log_file(body)).unwrap();
        assert_eq!(params.get("xxx").map(String::as_str), Some("203"));
        assert_eq!(params.get("yyy").map(String::as_str), Some("aaa"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_later_block_wins() {
        let body = "\
2022-02-24T11:10:24.0000001Z env:
2022-02-24T11:10:24.0000002Z   key1: value1
2022-02-24T11:10:24.0000003Z ##[endgroup]
2022-02-24T11:10:25.0000001Z Run something else
2022-02-24T11:10:26.0000001Z env:
2022-02-24T11:10:26.0000002Z   key1: value2
2022-02-24T11:10:26.0000003Z ##[endgroup]";
        let params = parse_log_file(&log_file(body)).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("key1").map(String::as_str), Some("value2"));
    }

    #[test]
    fn test_tab_separated_and_value_with_separator() {
        let body = "2022-02-24T11:10:24.0000001Z env:\n\
                    2022-02-24T11:10:24.0000002Z\turl: http://example.com: 8080\n\
                    2022-02-24T11:10:24.0000003Z ##[endgroup]";
        let params = parse_log_file(&log_file(body)).unwrap();
        assert_eq!(
            params.get("url").map(String::as_str),
            Some("http://example.com: 8080")
        );
    }

    #[test]
    fn test_malformed_line_names_file_and_line() {
        let body = "\
2022-02-24T11:10:24.0000001Z env:
2022-02-24T11:10:24.0000002Z   good: value
2022-02-24T11:10:24.0000003Z   no-separator-here
2022-02-24T11:10:24.0000004Z ##[endgroup]";
        let err = parse_log_file(&log_file(body)).unwrap_err();
        match err {
            ClientError::MalformedParameter {
                file,
                line_number,
                line,
            } => {
                assert_eq!(file, "dummy-log-file");
                assert_eq!(line_number, 3);
                assert!(line.ends_with("no-separator-here"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_line_without_timestamp_gap_is_malformed() {
        let body = "\
2022-02-24T11:10:24.0000001Z env:
2022-02-24T11:10:24.0000002Z key: value
2022-02-24T11:10:24.0000003Z ##[endgroup]";
        assert!(matches!(
            parse_log_file(&log_file(body)),
            Err(ClientError::MalformedParameter { line_number: 2, .. })
        ));
    }

    #[test]
    fn test_unterminated_block_is_ignored() {
        let body = "\
2022-02-24T11:10:24.0000001Z env:
2022-02-24T11:10:24.0000002Z   key: value
2022-02-24T11:10:24.0000003Z   not a parameter";
        assert!(parse_log_file(&log_file(body)).unwrap().is_empty());
    }

    #[test]
    fn test_file_without_blocks_is_empty() {
        let params = parse_log_file(&log_file("2022-02-24T11:10:24.0000001Z hello\n")).unwrap();
        assert!(params.is_empty());
        assert!(parse_log_file(&log_file("")).unwrap().is_empty());
    }

    #[test]
    fn test_strip_timestamp() {
        assert_eq!(strip_timestamp("ts   foo: 1"), Some("foo: 1"));
        assert_eq!(strip_timestamp("ts\tfoo: 1"), Some("foo: 1"));
        assert_eq!(strip_timestamp("ts foo:  1"), Some("1"));
        assert_eq!(strip_timestamp("ts foo: 1"), None);
        assert_eq!(strip_timestamp("ts  "), Some(""));
    }

    #[test]
    fn test_read_archive_keeps_listing_order() {
        let bytes = zip_bytes(&[
            ("build/1_Set up job.txt", "2022-02-24T11:10:24.0000001Z setup"),
            ("build/2_Run checkout.txt", CHECKOUT_LOG),
            ("2_build.txt", ""),
        ]);

        let files = read_archive(&bytes).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["build/1_Set up job.txt", "build/2_Run checkout.txt", "2_build.txt"]
        );

        let sets = parse_log_files(&files).unwrap();
        assert_eq!(sets.len(), 3);
        assert!(sets[0].is_empty());
        assert_eq!(sets[1].len(), 2);
        assert!(sets[2].is_empty());
    }

    #[test]
    fn test_read_corrupt_archive_fails() {
        let err = read_archive(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, ClientError::Archive(_)));
    }
}
