//! Session-scoped vote ledger and the engine that applies votes.
//!
//! Every votable record (video, blog, comment) carries a pair of
//! like/dislike counters. A voter holds at most one active opinion
//! per entity: repeating the same vote is a conflict, switching moves
//! one unit between counters. The ledger lives in process memory for
//! the lifetime of the server; a voter whose session state is gone
//! can vote again. That is a deliberate simplification, not a bug.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A voter's choice, validated once at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    /// Thumbs up.
    Like,
    /// Thumbs down.
    Dislike,
}

impl VoteChoice {
    /// Parses the wire value (`like` / `dislike`). Anything else is
    /// rejected before any store read happens.
    pub fn parse(raw: &str) -> Result<Self, VoteError> {
        match raw {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(VoteError::InvalidChoice(other.to_string())),
        }
    }

    /// Wire spelling of the choice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

/// The four independent vote ledgers. A voter who liked a video can
/// still like the blog post embedding it; the ledgers never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteCategory {
    /// Votes on videos.
    Video,
    /// Votes on blog posts.
    Blog,
    /// Votes on video comments.
    VideoComment,
    /// Votes on blog comments.
    BlogComment,
}

/// A votable entity's counter pair. Both values stay non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    /// Number of likes.
    pub likes: i64,
    /// Number of dislikes.
    pub dislikes: i64,
}

impl VoteCounts {
    /// Fresh entity counters.
    pub const ZERO: Self = Self { likes: 0, dislikes: 0 };
}

/// Errors the vote path can reject a request with.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The wire value was neither `like` nor `dislike`.
    #[error("invalid vote type: {0}")]
    InvalidChoice(String),
    /// The target entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Per-session record of each voter's last choice per entity.
///
/// Keys are `(category, entity id, voter identity)`; the voter
/// identity is an opaque string (the client network address in this
/// deployment). Backed by a plain map — the ledger is handed to the
/// engine by reference, never consulted as ambient global state.
#[derive(Debug, Default)]
pub struct VoteLedger {
    entries: HashMap<(VoteCategory, String, String), VoteChoice>,
}

impl VoteLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The voter's last recorded choice for this entity, if any.
    pub fn previous(
        &self,
        category: VoteCategory,
        entity_id: &str,
        voter: &str,
    ) -> Option<VoteChoice> {
        self.entries
            .get(&(category, entity_id.to_string(), voter.to_string()))
            .copied()
    }

    /// Records the voter's choice, replacing any earlier one.
    pub fn record(
        &mut self,
        category: VoteCategory,
        entity_id: &str,
        voter: &str,
        choice: VoteChoice,
    ) {
        self.entries
            .insert((category, entity_id.to_string(), voter.to_string()), choice);
    }
}

/// Result of running a vote through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote mutated the counters; carries the updated pair.
    Applied(VoteCounts),
    /// The voter repeated their previous choice; counters unchanged.
    AlreadyVoted(VoteCounts),
}

impl VoteOutcome {
    /// Counter pair to report back to the caller either way.
    pub fn counts(self) -> VoteCounts {
        match self {
            Self::Applied(counts) | Self::AlreadyVoted(counts) => counts,
        }
    }
}

/// Applies one vote against an entity's current counters.
///
/// A repeat of the previous choice is a no-op reported as
/// [`VoteOutcome::AlreadyVoted`]. Otherwise the counter matching the
/// previous choice (if any) is decremented with a floor at zero, the
/// requested counter is incremented, `persist` writes the entity, and
/// only after a successful write is the ledger updated. A failed
/// write therefore leaves the ledger untouched.
///
/// The floor guard tolerates ledger/entity desynchronization (for
/// example counters reset by an admin) without going negative.
pub fn apply_vote<F>(
    ledger: &mut VoteLedger,
    category: VoteCategory,
    entity_id: &str,
    voter: &str,
    requested: VoteChoice,
    current: VoteCounts,
    persist: F,
) -> anyhow::Result<VoteOutcome>
where
    F: FnOnce(VoteCounts) -> anyhow::Result<()>,
{
    let previous = ledger.previous(category, entity_id, voter);
    if previous == Some(requested) {
        return Ok(VoteOutcome::AlreadyVoted(current));
    }

    let updated = adjust_counts(current, previous, requested);
    persist(updated)?;
    ledger.record(category, entity_id, voter, requested);
    Ok(VoteOutcome::Applied(updated))
}

fn adjust_counts(
    mut counts: VoteCounts,
    previous: Option<VoteChoice>,
    requested: VoteChoice,
) -> VoteCounts {
    match previous {
        Some(VoteChoice::Like) => counts.likes = (counts.likes - 1).max(0),
        Some(VoteChoice::Dislike) => counts.dislikes = (counts.dislikes - 1).max(0),
        None => {},
    }
    match requested {
        VoteChoice::Like => counts.likes += 1,
        VoteChoice::Dislike => counts.dislikes += 1,
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        ledger: &mut VoteLedger,
        entity: &str,
        voter: &str,
        choice: VoteChoice,
        current: VoteCounts,
    ) -> VoteOutcome {
        apply_vote(ledger, VoteCategory::Video, entity, voter, choice, current, |_| Ok(()))
            .expect("persist closure never fails here")
    }

    #[test]
    fn first_vote_increments_exactly_one_counter() {
        let mut ledger = VoteLedger::new();
        let outcome = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Like, VoteCounts::ZERO);
        assert_eq!(outcome, VoteOutcome::Applied(VoteCounts { likes: 1, dislikes: 0 }));
    }

    #[test]
    fn repeated_vote_is_a_conflict_with_unchanged_counts() {
        let mut ledger = VoteLedger::new();
        let first = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Like, VoteCounts::ZERO);
        let counts = first.counts();
        let second = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Like, counts);
        assert_eq!(second, VoteOutcome::AlreadyVoted(VoteCounts { likes: 1, dislikes: 0 }));
    }

    #[test]
    fn switching_vote_moves_one_unit_between_counters() {
        let mut ledger = VoteLedger::new();
        let pre = VoteCounts { likes: 4, dislikes: 2 };
        let liked = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Like, pre).counts();
        assert_eq!(liked, VoteCounts { likes: 5, dislikes: 2 });
        let switched = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Dislike, liked).counts();
        assert_eq!(switched, VoteCounts { likes: 4, dislikes: 3 });
    }

    #[test]
    fn counters_floor_at_zero_when_ledger_and_entity_drift() {
        let mut ledger = VoteLedger::new();
        ledger.record(VoteCategory::Video, "v1", "10.0.0.1", VoteChoice::Like);
        // Counters were reset out of band; the remembered like has
        // nothing left to take back.
        let outcome = apply(&mut ledger, "v1", "10.0.0.1", VoteChoice::Dislike, VoteCounts::ZERO);
        assert_eq!(outcome, VoteOutcome::Applied(VoteCounts { likes: 0, dislikes: 1 }));
    }

    #[test]
    fn ledgers_are_independent_per_category() {
        let mut ledger = VoteLedger::new();
        ledger.record(VoteCategory::Video, "e1", "10.0.0.1", VoteChoice::Like);
        assert_eq!(ledger.previous(VoteCategory::Blog, "e1", "10.0.0.1"), None);
        assert_eq!(
            ledger.previous(VoteCategory::Video, "e1", "10.0.0.1"),
            Some(VoteChoice::Like)
        );
    }

    #[test]
    fn failed_persist_leaves_the_ledger_unrecorded() {
        let mut ledger = VoteLedger::new();
        let result = apply_vote(
            &mut ledger,
            VoteCategory::Video,
            "v1",
            "10.0.0.1",
            VoteChoice::Like,
            VoteCounts::ZERO,
            |_| anyhow::bail!("store unavailable"),
        );
        assert!(result.is_err());
        assert_eq!(ledger.previous(VoteCategory::Video, "v1", "10.0.0.1"), None);
    }

    #[test]
    fn parse_rejects_unknown_choice() {
        assert!(matches!(VoteChoice::parse("like"), Ok(VoteChoice::Like)));
        assert!(matches!(VoteChoice::parse("dislike"), Ok(VoteChoice::Dislike)));
        assert!(matches!(VoteChoice::parse("upvote"), Err(VoteError::InvalidChoice(_))));
        assert!(matches!(VoteChoice::parse("LIKE"), Err(VoteError::InvalidChoice(_))));
    }

    #[test]
    fn two_voter_scenario_on_one_video() {
        let mut ledger = VoteLedger::new();
        let mut counts = VoteCounts::ZERO;

        counts = apply(&mut ledger, "video-1", "A", VoteChoice::Like, counts).counts();
        assert_eq!(counts, VoteCounts { likes: 1, dislikes: 0 });

        counts = apply(&mut ledger, "video-1", "B", VoteChoice::Like, counts).counts();
        assert_eq!(counts, VoteCounts { likes: 2, dislikes: 0 });

        counts = apply(&mut ledger, "video-1", "A", VoteChoice::Dislike, counts).counts();
        assert_eq!(counts, VoteCounts { likes: 1, dislikes: 1 });

        let repeat = apply(&mut ledger, "video-1", "A", VoteChoice::Dislike, counts);
        assert_eq!(repeat, VoteOutcome::AlreadyVoted(VoteCounts { likes: 1, dislikes: 1 }));
    }
}
