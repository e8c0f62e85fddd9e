//! Builds a response time report from CSV-like benchmark results.
//!
//! Usage: `cargo run --example report [-- PATH [SEPARATOR]]`. The first line of the input
//! is a header starting with `#` that lists the column names. Values are split on
//! `SEPARATOR`, or on whitespace if it is not given. Without `PATH`, a built-in sample is
//! used. With the `tracing` feature, events of the engine are logged according to
//! `RUST_LOG`.
use anyhow::{Context, Result};
use benchrel::{join_with, DuplicateKeys, Relation, Tuple};
use either::Either;
use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader},
};

const SAMPLE: &str = "\
#pattern mode nThreads blockSize response
rand read 1 4k 0.00052
rand read 2 4k 0.00061
rand read 4 4k 0.00090
rand write 1 4k 0.00093
rand write 2 4k 0.00120
rand write 4 4k 0.00210
seq read 1 4k 0.00011
seq read 2 4k 0.00013
seq write 1 4k 0.00020
seq write 2 4k 0.00031
rand read 1 64k 0.00210
rand write 1 64k 0.00340
";

const COLUMNS: [&str; 5] = ["pattern", "mode", "nThreads", "blockSize", "response"];

fn split(line: &str, separator: Option<&str>) -> Vec<String> {
    let line = line.trim_end();
    match separator {
        Some(separator) => line.split(separator).map(str::to_string).collect(),
        None => line.split_whitespace().map(str::to_string).collect(),
    }
}

/// Reads all the lines of `reader`, failing on the first line that cannot be read.
fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    Ok(reader.lines().collect::<io::Result<Vec<_>>>()?)
}

/// Returns a reusable relation over CSV-like `lines`. The lines after the header are
/// split lazily, when the relation is first iterated.
fn read_table<I>(mut lines: I, separator: Option<String>) -> Result<Relation>
where
    I: Iterator<Item = String> + 'static,
{
    let header = lines.next().context("input has no header line")?;
    let header = header.strip_prefix('#').unwrap_or(&header);
    let columns = split(header, separator.as_deref());

    let tuples = lines
        .filter(|line| !line.trim().is_empty())
        .map(move |line| split(&line, separator.as_deref()));
    Ok(Relation::streaming(&columns, tuples).reusable())
}

/// Returns, for every mode, the response time (scaled by `scale`) by number of threads
/// of the results with the given `pattern` and `block_size`, ordered by number of threads.
fn response_by_mode(
    results: &Relation,
    pattern: &str,
    block_size: &str,
    scale: f64,
) -> Result<Vec<(Tuple, Relation)>> {
    let (pattern, block_size) = (pattern.to_string(), block_size.to_string());
    let filtered = results.filter(move |rec| {
        matches!(
            rec.get(&["pattern", "blockSize"]),
            Ok(Either::Right(v)) if v == [pattern.as_str(), block_size.as_str()]
        )
    });

    let scaled = filtered.map(&COLUMNS, &COLUMNS, move |mut t| {
        if let Ok(response) = t[4].parse::<f64>() {
            t[4] = format!("{:.0}", response * scale);
        }
        t
    })?;

    let plots = scaled
        .group_by_as_relation(&["mode"], &["nThreads", "response"])?
        .into_iter()
        .map(|(mode, plot)| {
            let plot = plot.sort_by_key(|rec| rec.raw()[0].parse::<u32>().ok(), false)?;
            Ok((mode, plot))
        })
        .collect::<benchrel::Result<Vec<_>>>()?;
    Ok(plots)
}

/// Returns the response times of `mode` with 4k blocks, in a column named after `mode`.
fn responses_of(results: &Relation, mode: &str) -> Result<Relation> {
    let wanted = mode.to_string();
    let mut responses = results
        .filter(move |rec| {
            matches!(
                rec.get(&["mode", "blockSize"]),
                Ok(Either::Right(v)) if v == [wanted.as_str(), "4k"]
            )
        })
        .project(&["pattern", "nThreads", "response"])?;
    responses.rename_column("response", mode)?;
    Ok(responses.with_name(mode))
}

fn main() -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let results = match args.next() {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("cannot open `{}`", path))?;
            let lines = read_lines(BufReader::new(file))
                .with_context(|| format!("cannot read `{}`", path))?;
            read_table(lines.into_iter(), args.next())?
        }
        None => read_table(SAMPLE.lines().map(str::to_string), None)?,
    }
    .with_name("results");

    let count = results.fold(0, |count, _| count + 1)?;
    println!("{} results over {:?}", count, results.schema().columns());

    for pattern in &["rand", "seq"] {
        for (mode, plot) in response_by_mode(&results, pattern, "4k", 1_000_000.0)? {
            println!();
            println!("{} {}: (nThreads, response [us])", pattern, mode.join(","));
            println!("{}", plot.show()?);
        }
    }

    let reads = responses_of(&results, "read")?;
    let writes = responses_of(&results, "write")?;
    let compared = join_with(
        DuplicateKeys::Reject,
        &["pattern", "nThreads"],
        (&reads, &["read"]),
        (&writes, &["write"]),
    )?;

    println!();
    println!("{}", compared.schema().join(", "));
    println!("{}", compared.show()?);
    Ok(())
}
