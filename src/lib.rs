//! Scoreline distributions for soccer fixtures, derived from expected-goals rates, and the
//! pricing of bookmaker markets over them. Candidate scorelines from uncertain sources are
//! aggregated and used to rank markets by coverage and by value against their latest prices.

pub mod analysis;
pub mod candidates;
pub mod catalogue;
pub mod config;
pub mod domain;
pub mod factorial;
pub mod file;
pub mod hash_lookup;
pub mod intensity;
pub mod market;
pub mod movement;
pub mod poisson;
pub mod prices;
pub mod pricing;
pub mod print;
pub mod probs;
pub mod scoregrid;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
