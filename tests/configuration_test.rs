//! Batch configuration file round-trip (SPEC_FULL §2), using a real
//! temporary file the way the reference implementation's own tests read
//! fixtures from disk rather than parsing in-memory strings only.

use std::io::Write;

use patterncounter::cli::configuration::read_configuration;

#[test]
fn reads_a_configuration_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "corpus: corpus.txt\npatterns:\n  - \"A -> B\"\n  - \"A & B\"\nvariables: [\"x\"]\noutput:\n  plain: true\n  select: [0, 3]\n"
    )
    .unwrap();

    let config = read_configuration(file.path()).unwrap();

    assert_eq!(config.corpus, "corpus.txt");
    assert_eq!(config.patterns, vec!["A -> B".to_string(), "A & B".to_string()]);
    assert_eq!(config.variables, vec!["x".to_string()]);
    assert!(config.output.plain);
    assert_eq!(config.output.select, vec![0, 3]);
}

#[test]
fn missing_configuration_file_is_an_io_error() {
    let result = read_configuration(std::path::Path::new("/nonexistent/patterncounter.yaml"));
    assert!(result.is_err());
}
