//! CLI driver surface (SPEC_FULL §2): a `clap` v2 builder-API argument
//! parser dispatching to `driver::run`, grounded on the reference
//! implementation's `cli::mod::run`/`build_app` (timing via
//! `stopwatch::Stopwatch`, fatal errors logged and unwound through
//! `logger::fatal` rather than propagated as `Result`s all the way up, since
//! this is the outermost boundary of the program).

pub mod configuration;
pub mod driver;
pub mod formatter;
pub mod logger;
pub mod select;

use std::fs;
use std::path::Path;

use clap::{App, Arg, ArgMatches, Values};
use stopwatch::Stopwatch;

use crate::core::input::parse_corpus;

pub fn run() {
    let mut sw = Stopwatch::start_new();

    let matches = build_app();
    logger::init(&matches);

    let invocation = match matches.value_of("config") {
        Some(config_path) => load_from_config(config_path),
        None => load_from_args(&matches),
    };

    logger::info(&format!("loading corpus {} ...", invocation.corpus_path));
    let corpus_text = match fs::read_to_string(&invocation.corpus_path) {
        Ok(text) => text,
        Err(err) => logger::fatal(&format!(
            "could not read corpus file \"{}\": {}",
            invocation.corpus_path, err
        )),
    };

    let corpus = match parse_corpus(&corpus_text) {
        Ok(corpus) => corpus,
        Err(err) => logger::fatal(&format!("failed to parse corpus: {}", err)),
    };

    logger::info(&format!(
        "loaded {} sequence(s) from {}",
        corpus.len(),
        invocation.corpus_path
    ));

    if !invocation.select.is_empty() {
        print!("{}", select::render(&corpus, &invocation.select, None));
    }

    if !invocation.patterns.is_empty() {
        match driver::run(&corpus, &invocation.patterns, &invocation.variables, invocation.threads) {
            Ok(report) => {
                if invocation.plain {
                    print!("{}", formatter::render_plain(&report));
                } else {
                    print!("{}", formatter::render_human(&report));
                }
            }
            Err(err) => logger::fatal(&format!("failed to evaluate patterns: {}", err)),
        }
    }

    sw.stop();
    logger::info(&format!("done in {}ms", sw.elapsed_ms()));
}

struct Invocation {
    corpus_path: String,
    patterns: Vec<String>,
    variables: Vec<String>,
    select: Vec<usize>,
    plain: bool,
    threads: usize,
}

fn build_app<'a>() -> ArgMatches<'a> {
    App::new("patterncounter")
        .version("0.1.0")
        .about("Counts occurrences of DSL patterns over sequences of itemsets")
        .arg(
            Arg::with_name("corpus")
                .help("Sequence corpus file path")
                .value_name("CORPUS")
                .required_unless("config"),
        )
        .arg(
            Arg::with_name("pattern")
                .short("p")
                .long("pattern")
                .help("A pattern to count; may be given more than once")
                .takes_value(true)
                .value_name("PATTERN")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("var")
                .short("v")
                .long("var")
                .help("A variable declaration (NAME, NAME~A,B, or NAME:A,B); may be given more than once")
                .takes_value(true)
                .value_name("DECL")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("select")
                .long("select")
                .help("Sequence indices to print, in the §6 selection sub-operation")
                .takes_value(true)
                .value_name("INDEX")
                .multiple(true),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("Batch-run configuration file (YAML); replaces corpus/pattern/var/select flags")
                .takes_value(true)
                .value_name("PATH"),
        )
        .arg(
            Arg::with_name("plain")
                .long("plain")
                .help("Emit a plain, line-oriented report instead of the colored human report"),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .help("Number of worker threads evaluating variable bindings")
                .takes_value(true)
                .value_name("NUM"),
        )
        .arg(
            Arg::with_name("logfile")
                .long("logfile")
                .help("Path to a log file")
                .takes_value(true)
                .value_name("PATH"),
        )
        .arg(
            Arg::with_name("loglevel")
                .long("loglevel")
                .help("Log level (error, warn, info, debug, trace)")
                .takes_value(true)
                .value_name("LEVEL")
                .requires("logfile"),
        )
        .get_matches()
}

fn load_from_config(path: &str) -> Invocation {
    let config = match configuration::read_configuration(Path::new(path)) {
        Ok(config) => config,
        Err(err) => logger::fatal(&format!("failed to read configuration \"{}\": {}", path, err)),
    };

    Invocation {
        corpus_path: config.corpus,
        patterns: config.patterns,
        variables: config.variables,
        select: config.output.select,
        plain: config.output.plain,
        threads: 1,
    }
}

fn load_from_args(matches: &ArgMatches) -> Invocation {
    let corpus_path = matches.value_of("corpus").unwrap().to_string();
    let patterns = collect(matches.values_of("pattern"));
    let variables = collect(matches.values_of("var"));
    let select = parse_indices(matches.values_of("select"));
    let plain = matches.is_present("plain");
    let threads = matches
        .value_of("threads")
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1);

    Invocation {
        corpus_path,
        patterns,
        variables,
        select,
        plain,
        threads,
    }
}

fn collect(values: Option<Values>) -> Vec<String> {
    values.map(|vs| vs.map(String::from).collect()).unwrap_or_default()
}

fn parse_indices(values: Option<Values>) -> Vec<usize> {
    match values {
        None => Vec::new(),
        Some(vs) => vs.filter_map(|v| v.parse::<usize>().ok()).collect(),
    }
}
