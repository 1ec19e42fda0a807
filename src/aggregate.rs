use std::{
    collections::{HashMap, hash_map},
    ops::AddAssign,
};

use tracing::trace;

use crate::{
    query::Selection,
    types::{Login, PullRequestNode, ReviewState},
    window::DateWindow,
};

/// A per-contributor accumulator. Counters only grow.
pub trait Counter: Default + Clone + AddAssign + std::fmt::Debug {
    fn total(&self) -> u64;
}

impl Counter for u64 {
    fn total(&self) -> u64 {
        *self
    }
}

/// Review outcomes for one reviewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewCounts {
    pub approvals: u64,
    pub comments: u64,
    pub changes_requested: u64,
}

impl ReviewCounts {
    fn bump(&mut self, bucket: ReviewBucket) {
        match bucket {
            ReviewBucket::Approvals => self.approvals += 1,
            ReviewBucket::Comments => self.comments += 1,
            ReviewBucket::ChangesRequested => self.changes_requested += 1,
        }
    }
}

impl AddAssign for ReviewCounts {
    fn add_assign(&mut self, other: Self) {
        self.approvals += other.approvals;
        self.comments += other.comments;
        self.changes_requested += other.changes_requested;
    }
}

impl Counter for ReviewCounts {
    fn total(&self) -> u64 {
        self.approvals + self.comments + self.changes_requested
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewBucket {
    Approvals,
    Comments,
    ChangesRequested,
}

/// How review states are folded into buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewBuckets {
    /// Approvals, changes-requested, and everything else as comments.
    #[default]
    ThreeWay,
    /// Approvals, and everything else (changes-requested included) as
    /// comments.
    TwoWay,
}

impl ReviewBuckets {
    pub fn classify(&self, state: &ReviewState) -> ReviewBucket {
        match (self, state) {
            (_, ReviewState::Approved) => ReviewBucket::Approvals,
            (ReviewBuckets::ThreeWay, ReviewState::ChangesRequested) => {
                ReviewBucket::ChangesRequested
            }
            _ => ReviewBucket::Comments,
        }
    }
}

/// Login → counter mapping for one page or a whole run.
#[derive(Debug, Clone)]
pub struct Tallies<C> {
    counts: HashMap<Login, C>,
}

impl<C> Default for Tallies<C> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<C: Counter> Tallies<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&mut self, login: Login) -> &mut C {
        self.counts.entry(login).or_default()
    }

    pub fn get(&self, login: &str) -> Option<&C> {
        self.counts.get(login)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, Login, C> {
        self.counts.iter()
    }

    /// Sum of every contributor's total.
    pub fn grand_total(&self) -> u64 {
        self.counts.values().map(Counter::total).sum()
    }

    /// Adds `other` into `self`, field by field.
    pub fn merge(&mut self, other: Tallies<C>) {
        for (login, count) in other.counts {
            *self.entry(login) += count;
        }
    }

    /// Entries by total descending, ties broken by login ascending.
    pub fn ranked(&self) -> Vec<(&Login, &C)> {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|(a_login, a), (b_login, b)| {
            b.total()
                .cmp(&a.total())
                .then_with(|| a_login.cmp(b_login))
        });
        entries
    }
}

/// Counting strategy applied to each pull request that passes the filter.
pub trait Tally {
    type Counter: Counter;

    /// Fields the query must select for this tally.
    fn selection(&self) -> Selection;

    fn tally(&self, node: &PullRequestNode, tallies: &mut Tallies<Self::Counter>);
}

/// One point per merged pull request, credited to its author.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeTally;

impl Tally for MergeTally {
    type Counter = u64;

    fn selection(&self) -> Selection {
        Selection::Authors
    }

    fn tally(&self, node: &PullRequestNode, tallies: &mut Tallies<u64>) {
        match node.author_login() {
            Some(author) => *tallies.entry(author) += 1,
            None => trace!(pr = node.number, "Skipping pull request without author"),
        }
    }
}

/// Review outcomes per reviewer, across every review on the pull request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewTally {
    pub buckets: ReviewBuckets,
}

impl Tally for ReviewTally {
    type Counter = ReviewCounts;

    fn selection(&self) -> Selection {
        Selection::Reviews
    }

    fn tally(&self, node: &PullRequestNode, tallies: &mut Tallies<ReviewCounts>) {
        for review in node.reviews() {
            let Some(reviewer) = review.reviewer_login() else {
                trace!(pr = node.number, "Skipping review without reviewer");
                continue;
            };
            let bucket = self.buckets.classify(&review.review_state());
            tallies.entry(reviewer).bump(bucket);
        }
    }
}

/// Who applies the date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFilter {
    ClientSide(DateWindow),
    /// The server already restricted the connection to the window.
    ServerSide,
}

impl PageFilter {
    pub fn admits(&self, node: &PullRequestNode) -> bool {
        match self {
            PageFilter::ClientSide(window) => window.contains(node.created_at),
            PageFilter::ServerSide => true,
        }
    }
}

/// Folds one page into a fresh, page-local [`Tallies`].
pub fn aggregate_page<T: Tally>(
    tally: &T,
    nodes: &[PullRequestNode],
    filter: &PageFilter,
) -> Tallies<T::Counter> {
    let mut page = Tallies::new();
    for node in nodes.iter().filter(|node| filter.admits(node)) {
        tally.tally(node, &mut page);
    }
    page
}
