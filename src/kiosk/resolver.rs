use crate::model::db::Candidate;

use super::ballot::CODE_LENGTH;

/// What a (possibly partial) ballot number currently means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Fewer than [`CODE_LENGTH`] digits typed.
    Pending,
    /// Exactly one candidate carries this number.
    Matched(&'a Candidate),
    /// A full number that no single candidate carries.
    Invalid,
}

/// Resolve a ballot number against the candidate list.
///
/// A number shared by several candidates is `Invalid`: a vote must go to
/// exactly one of them, and guessing which would make the ballot depend on
/// list order.
pub fn resolve<'a>(number: &str, candidates: &'a [Candidate]) -> Resolution<'a> {
    if number.len() < CODE_LENGTH {
        return Resolution::Pending;
    }
    let mut matches = candidates.iter().filter(|c| c.code == number);
    match (matches.next(), matches.next()) {
        (Some(candidate), None) => Resolution::Matched(candidate),
        _ => Resolution::Invalid,
    }
}
