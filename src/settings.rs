use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::concat::DEFAULT_MERGED_NAME;
use crate::convert::HeadingStyle;
use crate::extract::DEFAULT_MARKER;

pub const CONFIG_FILE: &str = "ocaml-api-docs.toml";
const ENV_PREFIX: &str = "OCAML_DOCS";

/// Resolved run settings.
///
/// Layered lowest to highest: built-in defaults, optional TOML file,
/// `OCAML_DOCS_*` environment variables, command-line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub links: PathBuf,
    pub out_dir: PathBuf,
    pub marker: String,
    pub heading_style: HeadingStyle,
    pub merged_name: String,
    pub keep_going: bool,
    pub exclude_merged: bool,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Default)]
pub struct Overrides {
    pub links: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub marker: Option<String>,
    pub heading_style: Option<HeadingStyle>,
    pub merged_name: Option<String>,
    pub keep_going: Option<bool>,
    pub exclude_merged: Option<bool>,
}

impl Settings {
    pub fn load(file: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let path_value = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

        Config::builder()
            .set_default("links", "links.txt")?
            .set_default("out_dir", "ocaml-api-docs")?
            .set_default("marker", DEFAULT_MARKER)?
            .set_default("heading_style", HeadingStyle::default().as_str())?
            .set_default("merged_name", DEFAULT_MERGED_NAME)?
            .set_default("keep_going", false)?
            .set_default("exclude_merged", false)?
            .add_source(File::from(file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("links", path_value(&overrides.links))?
            .set_override_option("out_dir", path_value(&overrides.out_dir))?
            .set_override_option("marker", overrides.marker.clone())?
            .set_override_option("heading_style", overrides.heading_style.map(HeadingStyle::as_str))?
            .set_override_option("merged_name", overrides.merged_name.clone())?
            .set_override_option("keep_going", overrides.keep_going)?
            .set_override_option("exclude_merged", overrides.exclude_merged)?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let s = Settings::load(&tmp.path().join(CONFIG_FILE), &Overrides::default()).unwrap();

        assert_eq!(s.links, PathBuf::from("links.txt"));
        assert_eq!(s.out_dir, PathBuf::from("ocaml-api-docs"));
        assert_eq!(s.marker, "header");
        assert_eq!(s.heading_style, HeadingStyle::Atx);
        assert_eq!(s.merged_name, "concat.md");
        assert!(!s.keep_going);
        assert!(!s.exclude_merged);
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join(CONFIG_FILE);
        std::fs::write(
            &file,
            "out_dir = \"docs\"\nheading_style = \"setext\"\nexclude_merged = true\n",
        )
        .unwrap();

        let s = Settings::load(&file, &Overrides::default()).unwrap();
        assert_eq!(s.out_dir, PathBuf::from("docs"));
        assert_eq!(s.heading_style, HeadingStyle::Setext);
        assert!(s.exclude_merged);
        assert_eq!(s.links, PathBuf::from("links.txt"));
    }

    #[test]
    fn flags_beat_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join(CONFIG_FILE);
        std::fs::write(&file, "out_dir = \"docs\"\nmarker = \"main\"\n").unwrap();

        let overrides = Overrides {
            out_dir: Some(PathBuf::from("other")),
            heading_style: Some(HeadingStyle::Setext),
            keep_going: Some(true),
            ..Default::default()
        };
        let s = Settings::load(&file, &overrides).unwrap();
        assert_eq!(s.out_dir, PathBuf::from("other"));
        assert_eq!(s.marker, "main");
        assert_eq!(s.heading_style, HeadingStyle::Setext);
        assert!(s.keep_going);
    }

    #[test]
    fn unknown_heading_style_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join(CONFIG_FILE);
        std::fs::write(&file, "heading_style = \"underline\"\n").unwrap();
        assert!(Settings::load(&file, &Overrides::default()).is_err());
    }
}
