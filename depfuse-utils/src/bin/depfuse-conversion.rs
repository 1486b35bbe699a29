#[macro_use]
extern crate failure;

#[macro_use]
extern crate log;

use std::convert::TryFrom;
use std::fs::File;
use std::io::BufReader;

use clap::{App, AppSettings, Arg};
use failure::Error;
use stdinout::{Input, OrExit, Output};

use depfuse::util::LabelSet;
use depfuse::{
    Field, FilterFields, FusionConfig, Malformed, PrecedenceTable, Reader, ResolveFusedForms,
    Schema, WriteTree, Writer,
};

fn main() {
    env_logger::init();

    let matches = build().get_matches();
    let in_format = matches.value_of(IN_FORMAT).unwrap();
    let in_format = Schema::try_from(in_format).or_exit("Can't read input format.", 1);
    let in_path = matches.value_of(INPUT).map(ToOwned::to_owned);
    let input = Input::from(in_path);
    let reader = BufReader::new(input.buf_read().or_exit("Can't open input reader.", 1));

    let out_format = matches.value_of(OUT_FORMAT).unwrap();
    let out_format = Schema::try_from(out_format).or_exit("Can't read output format.", 1);
    let out_path = matches.value_of(OUTPUT).map(ToOwned::to_owned);
    let output = Output::from(out_path);
    let writer = output.write().or_exit("Can't open output writer.", 1);
    let mut writer = Writer::new(writer, out_format, matches.is_present(KEEP_MULTI_TOKENS));

    let fusion = if matches.is_present(FUSE) {
        Some(fusion_config(
            matches.value_of(LANG).unwrap(),
            matches.value_of(PRECEDENCE),
            matches.is_present(FAIL_ON_MALFORMED),
        ))
    } else {
        None
    };

    let strip = matches
        .value_of(STRIP)
        .map(|fields| {
            fields
                .split(',')
                .map(|field| Field::try_from(field.trim()))
                .collect::<Result<Vec<_>, _>>()
                .or_exit("Can't parse fields to strip.", 1)
        })
        .unwrap_or_default();
    let truncate = matches
        .value_of(TRUNCATE)
        .map(|separator| single_char(separator).or_exit("Can't read deprel separator.", 1));
    let features = matches.value_of(FEATURES).map(get_set_from_file);
    let drop_secondary = matches.is_present(DROP_SECONDARY);

    let mut n_trees = 0;
    for tree in Reader::new(reader, in_format) {
        let mut tree = tree.or_exit("Could not read tree.", 1);

        if let Some(config) = fusion.as_ref() {
            tree = tree
                .resolve_fused_forms(config)
                .or_exit("Could not resolve fused forms.", 1);
        }

        if !strip.is_empty() {
            tree.strip_fields(&strip);
        }

        if let Some(separator) = truncate {
            tree.truncate_deprels(separator);
        }

        if let Some(features) = features.as_ref() {
            tree.filter_features(features);
        }

        if drop_secondary {
            tree.remove_secondary_edges();
        }

        writer
            .write_tree(&tree)
            .or_exit("Can't write to output.", 1);
        n_trees += 1;
    }
    info!("Converted {} sentences", n_trees);
}

fn fusion_config(lang: &str, precedence: Option<&str>, fail: bool) -> FusionConfig {
    let mut table = PrecedenceTable::default();
    if let Some(path) = precedence {
        let file = File::open(path).or_exit("Can't open precedence file.", 1);
        table
            .extend_from_reader(BufReader::new(file))
            .or_exit("Can't read precedence file.", 1);
    }
    if !table.contains(lang) {
        warn!("No precedence list for language {}, ties resolve to the lowest id", lang);
    }
    let on_malformed = if fail {
        Malformed::Fail
    } else {
        Malformed::Annotate
    };
    FusionConfig::for_language(&table, lang).on_malformed(on_malformed)
}

fn single_char(value: &str) -> Result<char, Error> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format_err!("Expected a single character: {}", value)),
    }
}

fn get_set_from_file(path: &str) -> LabelSet {
    let file = File::open(path).or_exit("Can't open feature file.", 1);
    LabelSet::positive_from_reader(BufReader::new(file)).or_exit("Can't read feature file.", 1)
}

static DEFAULT_CLAP_SETTINGS: &[AppSettings] = &[
    AppSettings::DontCollapseArgsInUsage,
    AppSettings::UnifiedHelpMessage,
];

static INPUT: &str = "INPUT";
static OUTPUT: &str = "OUTPUT";
static IN_FORMAT: &str = "IN_FORMAT";
static OUT_FORMAT: &str = "OUT_FORMAT";
static FUSE: &str = "FUSE";
static LANG: &str = "LANG";
static PRECEDENCE: &str = "PRECEDENCE";
static FAIL_ON_MALFORMED: &str = "FAIL_ON_MALFORMED";
static KEEP_MULTI_TOKENS: &str = "KEEP_MULTI_TOKENS";
static STRIP: &str = "STRIP";
static TRUNCATE: &str = "TRUNCATE";
static FEATURES: &str = "FEATURES";
static DROP_SECONDARY: &str = "DROP_SECONDARY";

static FORMATS: &[&str] = &["conllu", "conll2006", "conll2006dense"];

fn build<'a, 'b>() -> App<'a, 'b> {
    App::new("depfuse-conversion")
        .settings(DEFAULT_CLAP_SETTINGS)
        .version("0.1")
        .arg(
            Arg::with_name(INPUT)
                .long("input_file")
                .takes_value(true)
                .help("Input file"),
        )
        .arg(
            Arg::with_name(IN_FORMAT)
                .long("input_format")
                .takes_value(true)
                .possible_values(FORMATS)
                .default_value("conllu")
                .help("Input format:"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .long("output_file")
                .takes_value(true)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(OUT_FORMAT)
                .long("output_format")
                .takes_value(true)
                .possible_values(FORMATS)
                .default_value("conll2006")
                .help("Output format:"),
        )
        .arg(
            Arg::with_name(FUSE)
                .long("keep_fused_forms")
                .help("Merge multi-word tokens into their syntactic head."),
        )
        .arg(
            Arg::with_name(LANG)
                .long("lang")
                .takes_value(true)
                .default_value("none")
                .help("Language of the treebank, selects the POS precedence list."),
        )
        .arg(
            Arg::with_name(PRECEDENCE)
                .long("precedence")
                .takes_value(true)
                .help("Path to file with additional POS precedence lists."),
        )
        .arg(
            Arg::with_name(FAIL_ON_MALFORMED)
                .long("fail_on_malformed")
                .help("Abort if merging multi-word tokens does not result in a tree."),
        )
        .arg(
            Arg::with_name(KEEP_MULTI_TOKENS)
                .long("keep_multi_token_rows")
                .help("Write the rows of unmerged multi-word tokens."),
        )
        .arg(
            Arg::with_name(STRIP)
                .long("strip")
                .takes_value(true)
                .help("Comma separated fields to reset, e.g. lemma,feats."),
        )
        .arg(
            Arg::with_name(TRUNCATE)
                .long("truncate_deprels")
                .takes_value(true)
                .help("Cut dependency relations at this character."),
        )
        .arg(
            Arg::with_name(FEATURES)
                .long("features")
                .takes_value(true)
                .help("Path to file with the feature names to keep."),
        )
        .arg(
            Arg::with_name(DROP_SECONDARY)
                .long("drop_secondary")
                .help("Remove secondary dependencies."),
        )
}
