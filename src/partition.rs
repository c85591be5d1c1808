use std::collections::{BTreeSet, HashSet};

use crate::aggregate::Bucket;
use crate::shot::PlayerId;

/// Which defenders get a row in the output.
#[derive(Debug, Clone, Default)]
pub enum TrackedDefenders {
    /// Every player on the defending roster of each game.
    #[default]
    All,
    Only(HashSet<PlayerId>),
}

impl TrackedDefenders {
    pub fn tracks(&self, id: &str) -> bool {
        match self {
            TrackedDefenders::All => true,
            TrackedDefenders::Only(ids) => ids.contains(id),
        }
    }
}

/// Fans one shot out to every tracked defender: `On` for those in
/// `on_ice`, `Off` for the rest of `universe`. Players on ice but missing from
/// the roster still count as on ice.
pub fn partition<'a>(
    on_ice: &'a BTreeSet<PlayerId>,
    universe: &'a BTreeSet<PlayerId>,
    tracked: &'a TrackedDefenders,
) -> impl Iterator<Item = (&'a str, Bucket)> + 'a {
    let on = on_ice
        .iter()
        .filter(move |id| tracked.tracks(id))
        .map(|id| (id.as_str(), Bucket::On));
    let off = universe
        .iter()
        .filter(move |id| !on_ice.contains(*id) && tracked.tracks(id))
        .map(|id| (id.as_str(), Bucket::Off));
    on.chain(off)
}
