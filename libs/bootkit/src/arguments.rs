//! Process arguments as seen by the runtime.
//!
//! The only options the core itself understands are `--config <path>` and
//! `--config=<path>`; everything else is left for command selection and the command itself.

use std::path::PathBuf;

const CONFIG_FLAG: &str = "--config";

/// Raw arguments (program name excluded) split into configuration paths and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    raw: Vec<String>,
    config_paths: Vec<PathBuf>,
    command_args: Vec<String>,
    config_value_missing: bool,
}

impl Arguments {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut config_paths = Vec::new();
        let mut command_args = Vec::new();
        let mut config_value_missing = false;

        let mut iter = raw.iter();
        while let Some(arg) = iter.next() {
            if let Some(path) = arg.strip_prefix("--config=") {
                if path.is_empty() {
                    config_value_missing = true;
                } else {
                    config_paths.push(PathBuf::from(path));
                }
            } else if arg == CONFIG_FLAG {
                match iter.next() {
                    Some(path) => config_paths.push(PathBuf::from(path)),
                    None => config_value_missing = true,
                }
            } else {
                command_args.push(arg.clone());
            }
        }

        Self {
            raw,
            config_paths,
            command_args,
            config_value_missing,
        }
    }

    /// Everything, as passed in.
    #[must_use]
    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    /// `--config` files in the order given.
    #[must_use]
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// `true` if a `--config` option was given without a path.
    #[must_use]
    pub fn config_value_missing(&self) -> bool {
        self.config_value_missing
    }

    /// Arguments with configuration options removed.
    #[must_use]
    pub fn command_args(&self) -> &[String] {
        &self.command_args
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_options_are_split_out_in_order() {
        let args = Arguments::new([
            "--config=a.yaml",
            "--server",
            "--config",
            "b.yaml",
            "--port=80",
        ]);
        assert_eq!(
            args.config_paths(),
            [PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
        assert_eq!(args.command_args(), ["--server", "--port=80"]);
        assert_eq!(args.raw().len(), 5);
    }

    #[test]
    fn config_flag_without_value_is_flagged() {
        let args = Arguments::new(["--greet", "--config"]);
        assert!(args.config_paths().is_empty());
        assert!(args.config_value_missing());
        assert_eq!(args.command_args(), ["--greet"]);

        assert!(Arguments::new(["--config="]).config_value_missing());
        assert!(!Arguments::new(["--config", "a.yaml"]).config_value_missing());
    }

    #[test]
    fn empty_arguments() {
        let args = Arguments::new(Vec::<String>::new());
        assert!(args.raw().is_empty());
        assert!(args.command_args().is_empty());
    }
}
