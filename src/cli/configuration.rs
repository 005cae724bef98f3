//! Batch-run configuration file (SPEC_FULL §2): a YAML document naming a
//! corpus file, the pattern strings to count, variable declarations, and
//! output options, so a repeated multi-pattern invocation doesn't need to
//! be re-typed on the command line every time. Grounded on the reference
//! implementation's `cli::configuration::Configuration`
//! (`serde` + `serde_yaml`, with the same `IOErr`/`DeserializationErr`
//! split for `ConfigurationError`).

use std::{
    error, fmt,
    fs::File,
    io::Read,
    path::Path,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub corpus: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub output: OutputOptions,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(default)]
    pub plain: bool,
    #[serde(default)]
    pub select: Vec<usize>,
}

impl Default for OutputOptions {
    fn default() -> Self {
        OutputOptions { plain: false, select: Vec::new() }
    }
}

pub fn read_configuration(path: &Path) -> Result<Configuration, ConfigurationError> {
    let mut conf_str = String::new();

    match File::open(path) {
        Ok(mut file) => {
            if let Err(err) = file.read_to_string(&mut conf_str) {
                return Err(ConfigurationError::Io(format!(
                    "could not read configuration file \"{}\": {}",
                    path.to_string_lossy(),
                    err
                )));
            }
        }
        Err(err) => {
            return Err(ConfigurationError::Io(format!(
                "could not find configuration file \"{}\": {}",
                path.to_string_lossy(),
                err
            )));
        }
    }

    Ok(serde_yaml::from_str(&conf_str)?)
}

#[derive(Debug)]
pub enum ConfigurationError {
    Io(String),
    Deserialization(serde_yaml::Error),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::Io(err) => write!(f, "IO error: {}", err),
            ConfigurationError::Deserialization(err) => {
                write!(f, "failed to parse configuration file: {}", err)
            }
        }
    }
}

impl error::Error for ConfigurationError {}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigurationError::Deserialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_minimal_configuration() {
        let yaml = "corpus: corpus.txt\npatterns:\n  - \"A -> B\"\n  - \"A & B\"\n";
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.corpus, "corpus.txt");
        assert_eq!(config.patterns, vec!["A -> B".to_string(), "A & B".to_string()]);
        assert!(config.variables.is_empty());
        assert!(!config.output.plain);
    }

    #[test]
    fn deserializes_variables_and_output_options() {
        let yaml = "corpus: c.txt\npatterns: [\"x & y\"]\nvariables: [\"x\", \"y~A,B\"]\noutput:\n  plain: true\n  select: [0, 2]\n";
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.variables, vec!["x".to_string(), "y~A,B".to_string()]);
        assert!(config.output.plain);
        assert_eq!(config.output.select, vec![0, 2]);
    }
}
