//! A simple CLI tool for auditing CIPA kiosk elections offline.
//! It reads the JSON document served by `GET /admin/dump` and tallies it
//! with the same code the server uses.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use cipa_kiosk::model::api::{ElectionDump, VoteDesc};

const PROGRAM_NAME: &str = "audit-cli";

const ABOUT_TEXT: &str = "Tally and audit a CIPA kiosk election dump.

EXIT CODES:
     0: Audit succeeded.
   255: Ran successfully, but the dump is inconsistent.
 Other: Error.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON dump of the election,\n\
as returned by `GET /admin/dump`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(DUMP_PATH)
            .help(DUMP_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// The dump decoded but contradicts itself.
    Audit(AuditError),
}

#[derive(Debug, Eq, PartialEq)]
enum AuditError {
    /// Two candidates share a ballot number, so their votes cannot be told apart.
    DuplicateCode { code: String },
    /// The same vote appears twice.
    DuplicateVote { vote_id: String },
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::DuplicateCode { code } => {
                write!(f, "More than one candidate uses ballot number {code}.")
            }
            AuditError::DuplicateVote { vote_id } => {
                write!(f, "Vote {vote_id} appears more than once.")
            }
        }
    }
}

/// One line of the printed tally.
#[derive(Debug, Eq, PartialEq)]
struct FriendlyResults {
    pub candidate_name: String,
    pub code: String,
    pub votes: u64,
}

impl Display for FriendlyResults {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} vote{}",
            self.candidate_name,
            self.code,
            self.votes,
            if self.votes != 1 { "s" } else { "" }
        )
    }
}

/// The outcome of a successful audit.
#[derive(Debug, Eq, PartialEq)]
struct Report {
    total_votes: u64,
    tally: Vec<FriendlyResults>,
    orphaned: Vec<VoteDesc>,
}

/// Load a dump, check it, and tally it.
fn audit(path: &str) -> Result<Report, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: ElectionDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Consistency checks.
    let mut codes = HashSet::new();
    for candidate in &dump.candidates {
        if !codes.insert(candidate.code.as_str()) {
            return Err(Error::Audit(AuditError::DuplicateCode {
                code: candidate.code.clone(),
            }));
        }
    }
    let mut vote_ids = HashSet::new();
    for vote in &dump.votes {
        if !vote_ids.insert(vote.id) {
            return Err(Error::Audit(AuditError::DuplicateVote {
                vote_id: vote.id.to_string(),
            }));
        }
    }

    let results = dump.results();
    let mut tally: Vec<_> = results
        .tally
        .into_iter()
        .map(|entry| FriendlyResults {
            candidate_name: entry.name,
            code: entry.code,
            votes: entry.votes,
        })
        .collect();
    tally.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.candidate_name.cmp(&b.candidate_name))
    });

    let orphaned = dump
        .votes
        .into_iter()
        .filter(|vote| !codes.contains(vote.code.as_str()))
        .collect();

    Ok(Report {
        total_votes: results.total_votes,
        tally,
        orphaned,
    })
}

/// Run the audit, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.
    match audit(path) {
        Ok(report) => {
            println!("Audit succeeded: {} votes cast.", report.total_votes);
            for result in &report.tally {
                println!("{result}");
            }
            if !report.orphaned.is_empty() {
                println!(
                    "{} vote{} for ballot numbers with no candidate:",
                    report.orphaned.len(),
                    if report.orphaned.len() != 1 { "s" } else { "" }
                );
                for vote in &report.orphaned {
                    println!("  {} at {} (vote {})", vote.code, vote.cast_at, vote.id);
                }
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {msg}");
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {msg}");
            1
        }
        Err(Error::Audit(err)) => {
            println!("Audit failed: {err}");
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
