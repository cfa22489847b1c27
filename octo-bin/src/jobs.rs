//! Loading of the job list.
//!
//! The job list is a JSON array of [`Job`]s, read from a file given with
//! `--jobs`, or from stdin.

use anyhow::{Context, Result, bail};
use octo_lib::Job;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Read};
use std::path::Path;

/// Read the job list from `path`, `-` meaning stdin.
///
/// Without a path, stdin is read too, unless it is a terminal: nobody is
/// going to type a job list by hand.
pub(crate) fn load(path: Option<&Path>) -> Result<Vec<Job>> {
    match path {
        Some(path) if path == Path::new("-") => from_stdin(),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Cannot open job list `{}`", path.display()))?;
            from_reader(BufReader::new(file))
                .with_context(|| format!("Cannot read job list `{}`", path.display()))
        }
        None if io::stdin().is_terminal() => {
            bail!("No jobs given. Pass a job list with `--jobs <PATH>` or pipe it into stdin")
        }
        None => from_stdin(),
    }
}

fn from_stdin() -> Result<Vec<Job>> {
    from_reader(io::stdin().lock()).context("Cannot read job list from stdin")
}

/// Parse a job list from any reader
pub(crate) fn from_reader<R: Read>(reader: R) -> Result<Vec<Job>> {
    serde_json::from_reader(reader).context("Expected a JSON array of jobs with `url` and `payload`")
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::{from_reader, load};

    #[test]
    fn test_parse_job_list() {
        let input = r#"[
            {"url": "http://127.0.0.1:8001", "payload": {"title": "title number 0"}},
            {"url": "http://127.0.0.1:8001/path", "payload": [1, 2], "headers": {"x-key": "abc"}},
            {"url": "http://127.0.0.1:8001"}
        ]"#;

        let jobs = from_reader(Cursor::new(input)).unwrap();

        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].payload, json!({"title": "title number 0"}));
        assert_eq!(jobs[1].url.path(), "/path");
        assert_eq!(jobs[1].headers.as_ref().unwrap()["x-key"], "abc");
        assert_eq!(jobs[2].payload, json!(null));
    }

    #[test]
    fn test_reject_invalid_job_list() {
        assert!(from_reader(Cursor::new(r#"{"url": "http://a"}"#)).is_err());
        assert!(from_reader(Cursor::new(r#"[{"url": "not a url"}]"#)).is_err());
        assert!(from_reader(Cursor::new(r#"[{"payload": 1}]"#)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"url": "https://example.com", "payload": 1}}]"#).unwrap();

        let jobs = load(Some(file.path())).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_missing_file() {
        let err = load(Some(Path::new("does/not/exist.json"))).unwrap_err();
        assert!(err.to_string().contains("Cannot open job list"));
    }
}
