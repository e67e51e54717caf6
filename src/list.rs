use std::cmp::Reverse;

use crate::domain::{Seed, SortMode};
use crate::error::SeedsError;

/// Generation number of a list fetch. Only the newest ticket may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct ListView {
    records: Vec<Seed>,
    loading: bool,
    query: String,
    sort_mode: SortMode,
    cursor: usize,
    latest_ticket: u64,
}

impl ListView {
    pub fn new(sort_mode: SortMode) -> Self {
        Self {
            sort_mode,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[Seed] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.loading = true;
        FetchTicket(self.latest_ticket)
    }

    /// Applies a fetch result. Returns false when the ticket was superseded
    /// and the result was dropped.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Seed>, SeedsError>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "dropping superseded seed list"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                tracing::info!(count = records.len(), sort = %self.sort_mode, "seed list loaded");
                self.records = records;
                self.clamp_cursor();
            }
            Err(err) => {
                tracing::warn!(error = %err, "error fetching seeds; keeping previous list");
            }
        }
        true
    }

    /// Returns the ticket of the fetch to start, or `None` if the mode did
    /// not change.
    pub fn set_sort_mode(&mut self, mode: SortMode) -> Option<FetchTicket> {
        if mode == self.sort_mode {
            return None;
        }
        self.sort_mode = mode;
        Some(self.begin_fetch())
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.clamp_cursor();
    }

    pub fn push_query_char(&mut self, ch: char) {
        self.query.push(ch);
        self.clamp_cursor();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.clamp_cursor();
    }

    pub fn visible(&self) -> Vec<&Seed> {
        self.records
            .iter()
            .filter(|seed| matches_query(seed, &self.query))
            .collect()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    pub fn selected(&self) -> Option<&Seed> {
        self.visible().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

/// Case-insensitive match on title, description, features and biomes; the
/// seed code is matched exactly as typed.
pub fn matches_query(seed: &Seed, query: &str) -> bool {
    let needle = query.to_lowercase();
    seed.title.to_lowercase().contains(&needle)
        || seed.description.to_lowercase().contains(&needle)
        || seed.seed_code.contains(query)
        || seed
            .features
            .iter()
            .any(|feature| feature.to_lowercase().contains(&needle))
        || seed
            .biomes
            .iter()
            .any(|biome| biome.to_lowercase().contains(&needle))
}

/// Local version of the store's descending order for `mode`.
pub fn sort_records(records: &mut [Seed], mode: SortMode) {
    match mode {
        SortMode::Popular => records.sort_by_key(|seed| Reverse(seed.views)),
        SortMode::Recent => records.sort_by_key(|seed| Reverse(seed.created_at_parsed())),
    }
}
