// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading of input documents and the tag name table.

use crate::tags::TagNames;
use anyhow::{Context, Result};
use mg_common::log::{init_file_logger, init_term_logger};
use serde::de::DeserializeOwned;
use slog::Logger;
use std::io::Read;
use std::path::Path;

/// Path argument that stands for standard input.
pub const STDIN: &str = "-";

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new(STDIN) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?
    };
    parse_json(&text).with_context(|| format!("parse {}", path.display()))
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

/// Load the tag name table. Without a file every tag is unresolved.
pub fn load_tag_names(path: Option<&Path>) -> Result<TagNames> {
    match path {
        Some(p) => read_json(p).context("load tag names"),
        None => Ok(TagNames::default()),
    }
}

/// Bunyan records to `log_file` when given, otherwise human readable
/// records on stderr.
pub fn init_log(log_file: Option<&Path>) -> Result<Logger> {
    match log_file {
        Some(p) => init_file_logger(p)
            .with_context(|| format!("open log file {}", p.display())),
        None => Ok(init_term_logger()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    struct TempFile(PathBuf);

    impl TempFile {
        fn new(name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "prefixadm-{}-{name}",
                std::process::id()
            ));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_load_tag_names() {
        let f = TempFile::new(
            "tags.json",
            r#"{
                "tags": { "65520:822": "TAG_NAME2" },
                "tag_prefixes": { "65529:": "PEERING" }
            }"#,
        );
        let names = load_tag_names(Some(&f.0)).unwrap();
        assert_eq!(names.resolve("65520:822"), Some("TAG_NAME2"));
        assert_eq!(names.resolve("65529:15990"), Some("PEERING"));
    }

    #[test]
    fn test_log_file() {
        let f = TempFile::new("log.json", "");
        let log = init_log(Some(&f.0)).unwrap();
        slog::info!(log, "loaded tag names"; "count" => 3);
        drop(log);

        let text = std::fs::read_to_string(&f.0).unwrap();
        let record: serde_json::Value =
            serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(record["msg"], "loaded tag names");
        assert_eq!(record["count"], 3);

        let missing = Path::new("/nonexistent/prefixadm/log.json");
        let err = init_log(Some(missing)).unwrap_err();
        assert!(format!("{err:#}").contains("open log file"));
    }

    #[test]
    fn test_no_tag_names() {
        assert!(load_tag_names(None).unwrap().is_empty());
    }

    #[test]
    fn test_bad_documents() {
        let f = TempFile::new("bad.json", "{ \"tags\": [1, 2] }");
        let err = load_tag_names(Some(&f.0)).unwrap_err();
        assert!(format!("{err:#}").contains("load tag names"));

        let missing = Path::new("/nonexistent/prefixadm/tags.json");
        let err = load_tag_names(Some(missing)).unwrap_err();
        assert!(format!("{err:#}").contains("read /nonexistent"));
    }

    #[test]
    fn test_read_routes_document() {
        let f = TempFile::new(
            "routes.json",
            crate::test::ADVERTISED_ROUTES_OUTPUT_JSON,
        );
        let value: serde_json::Value = read_json(&f.0).unwrap();
        let routes = crate::advertised::parse_structured(value).unwrap();
        assert_eq!(routes, crate::test::advertised_routes());
    }
}
