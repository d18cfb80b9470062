//! A small demonstration binary, not a FASTA/CLI tool: file parsing and a
//! real argument surface are out of scope here. Runs one comparison over
//! two hard-coded sequences and reports the resulting dot counts.

use clap::{arg, crate_version, Command};
use freckle::alphabet::Alphabet;
use freckle::{Config, STD_CONFIG};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = Command::new("compare_demo")
        .about("Run a fixed sequence comparison and report dot counts")
        .version(crate_version!())
        .arg(arg!(-k --ktup <K> "k-tuple size").value_parser(clap::value_parser!(usize)))
        .arg(arg!(-w --window <W> "mismatch window width").value_parser(clap::value_parser!(usize)))
        .arg(arg!(-m --mismatch <M> "mismatch budget").value_parser(clap::value_parser!(usize)))
        .get_matches();

    let cfg = Config {
        k: matches.get_one::<usize>("ktup").copied().unwrap_or(STD_CONFIG.k),
        window: matches.get_one::<usize>("window").copied().unwrap_or(STD_CONFIG.window),
        mismatch: matches.get_one::<usize>("mismatch").copied().unwrap_or(STD_CONFIG.mismatch),
        ..STD_CONFIG
    };
    cfg.validate().expect(RCH);

    let s1 = b"GCGGGTACTGATATACTCATGATTATACCGCGCGGTTGTGTGAATTAATATCAACACCACAAAAGAGAGGAGGACTTCCTCTCTCTCTCTAACACCAATATATCCGGCCGGTTG";
    let s2 = b"ATCGACGTATAGATTTTTCCACAGCGCCAAACTCTTCTATCACTCATGACTGACTGTGTCATGACTGATTATATATATCTCTCTTCTCATATATCATACT";

    let alphabet = Alphabet::dna();
    let dots = cfg.compare(s1, s2)?;
    log::info!(
        "compared {} vs {} symbols (k={} window={} mismatch={} min_match={}): {} dots, maxx={} maxy={}",
        s1.len(),
        s2.len(),
        cfg.k,
        cfg.window,
        cfg.mismatch,
        cfg.min_match,
        dots.count(),
        dots.max_x(),
        dots.max_y(),
    );

    let self_dots = freckle::compare::compare(s1, s1, cfg.k, cfg.window, cfg.mismatch, cfg.min_match, &alphabet)?;
    log::info!("self-comparison of s1 found {} dots", self_dots.count());

    Ok(())
}
