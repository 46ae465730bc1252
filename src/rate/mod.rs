//! Tiered pacing: how many requests go out per tick and how many may be in
//! flight at once.
mod controller;
mod tier;

#[cfg(test)]
mod tests;

pub use controller::{RateController, RunCompletion};
pub use tier::{Tier, TierPlan};
