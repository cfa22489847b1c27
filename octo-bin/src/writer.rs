//! Writing the results of a run.

use anyhow::{Context, Result};
use octo_lib::Outcome;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Render `outcomes` as a JSON list in job order, indented by two spaces
pub(crate) fn render<T: Serialize>(outcomes: &[Outcome<T>]) -> Result<String> {
    serde_json::to_string_pretty(outcomes).context("Cannot serialize results")
}

/// Write the results to `output` if given, and to stdout if `echo` is set
pub(crate) fn write<T: Serialize>(
    outcomes: &[Outcome<T>],
    output: Option<&Path>,
    echo: bool,
) -> Result<()> {
    if output.is_none() && !echo {
        return Ok(());
    }
    let rendered = render(outcomes)?;

    if let Some(path) = output {
        fs::write(path, &rendered)
            .with_context(|| format!("Cannot write results to `{}`", path.display()))?;
    }
    if echo {
        writeln!(io::stdout().lock(), "{rendered}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use octo_lib::{ErrorKind, Failure, FailureReason, JobResponse, Outcome};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::{render, write};

    #[test]
    fn test_render_keeps_failed_slots() {
        let outcomes = vec![
            Outcome::Completed(JobResponse {
                status: 200,
                body: "{}".into(),
            }),
            Outcome::Failed(Failure::new(
                10,
                FailureReason::Exhausted,
                ErrorKind::Transport("connection reset".into()),
            )),
        ];

        let rendered: Value = serde_json::from_str(&render(&outcomes).unwrap()).unwrap();

        assert_eq!(
            rendered,
            json!([
                {"status": 200, "body": "{}"},
                {
                    "attempts": 10,
                    "reason": "exhausted",
                    "error": "Transport error: connection reset"
                }
            ])
        );
    }

    #[test]
    fn test_render_is_indented() {
        let rendered = render(&[Outcome::Completed(1)]).unwrap();
        assert_eq!(rendered, "[\n  1\n]");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.json");

        write(&[Outcome::Completed("ok")], Some(path.as_path()), false).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "[\n  \"ok\"\n]");
    }
}
