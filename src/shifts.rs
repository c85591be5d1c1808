use std::collections::{BTreeSet, HashMap};

use crate::shot::PlayerId;

pub const PERIOD_LENGTH_SECONDS: u32 = 20 * 60;

/// Converts a count-down period clock ("MM:SS", fractional seconds ignored)
/// into seconds since puck drop.
pub fn clock_to_seconds(clock: &str, period: u8) -> Option<u32> {
    if period == 0 {
        return None;
    }
    let (m, s) = clock.trim().split_once(':')?;
    let m = m.trim().parse::<u32>().ok()?;
    let s = s.trim().split('.').next()?.parse::<u32>().ok()?;
    if s >= 60 {
        return None;
    }
    let left = m.checked_mul(60)?.checked_add(s)?;
    if left > PERIOD_LENGTH_SECONDS {
        return None;
    }
    let elapsed = PERIOD_LENGTH_SECONDS - left;
    (period as u32 - 1)
        .checked_mul(PERIOD_LENGTH_SECONDS)?
        .checked_add(elapsed)
}

/// A line change: after `time`, exactly `players` are on ice for `team_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub time: u32,
    pub team_id: String,
    pub players: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub start: u32,
    pub end: u32,
}

impl Shift {
    pub fn contains(&self, t: u32) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Shift intervals and dressed rosters reconstructed for one game.
#[derive(Debug, Clone, Default)]
pub struct GameShifts {
    shifts: HashMap<PlayerId, Vec<Shift>>,
    rosters: HashMap<String, BTreeSet<PlayerId>>,
}

impl GameShifts {
    /// Replays substitutions in game-time order. Shifts still open at the end
    /// close at `final_time`.
    pub fn from_substitutions(subs: &[Substitution], final_time: u32) -> Self {
        let mut ordered: Vec<&Substitution> = subs.iter().collect();
        // Stable: same-second changes keep feed order.
        ordered.sort_by_key(|s| s.time);

        let mut out = GameShifts::default();
        let mut on_ice: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        let mut open: HashMap<&str, u32> = HashMap::new();

        for sub in ordered {
            let group: BTreeSet<&str> = sub.players.iter().map(String::as_str).collect();
            let current = on_ice.entry(sub.team_id.as_str()).or_default();

            for pid in current.difference(&group) {
                if let Some(start) = open.remove(*pid) {
                    out.push_shift(pid, start, sub.time);
                }
            }
            for pid in group.difference(current) {
                open.insert(*pid, sub.time);
            }

            let roster = out.rosters.entry(sub.team_id.clone()).or_default();
            for pid in &group {
                roster.insert(pid.to_string());
            }
            *current = group;
        }

        for (pid, start) in open {
            out.push_shift(pid, start, final_time.max(start));
        }
        for list in out.shifts.values_mut() {
            list.sort_by_key(|s| s.start);
        }
        out
    }

    pub fn roster(&self, team_id: &str) -> Option<&BTreeSet<PlayerId>> {
        self.rosters.get(team_id)
    }

    pub fn teams(&self) -> impl Iterator<Item = &String> {
        self.rosters.keys()
    }

    pub fn shifts_for(&self, player_id: &str) -> &[Shift] {
        self.shifts.get(player_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_on_ice(&self, player_id: &str, t: u32) -> bool {
        self.shifts_for(player_id).iter().any(|s| s.contains(t))
    }

    /// Roster members of `team_id` on ice at `t`.
    pub fn on_ice_at(&self, team_id: &str, t: u32) -> BTreeSet<PlayerId> {
        let Some(roster) = self.roster(team_id) else {
            return BTreeSet::new();
        };
        roster
            .iter()
            .filter(|pid| self.is_on_ice(pid, t))
            .cloned()
            .collect()
    }

    fn push_shift(&mut self, pid: &str, start: u32, end: u32) {
        self.shifts
            .entry(pid.to_string())
            .or_default()
            .push(Shift { start, end });
    }
}
