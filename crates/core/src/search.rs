//! Catalog search: query filters and the growing page window.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DayLabel, Lecture, TimeSlot};
use crate::parser::parse_schedule;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Search criteria. Dimensions combine with AND; values within a set with OR.
/// An empty set or `None` does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Case-insensitive substring of the title or course id
    pub text: String,
    pub grades: BTreeSet<u8>,
    pub days: BTreeSet<DayLabel>,
    pub times: BTreeSet<TimeSlot>,
    pub majors: BTreeSet<String>,
    pub credits: Option<u32>,
}

impl SearchQuery {
    pub fn matches(&self, lecture: &Lecture) -> bool {
        self.matches_text(lecture)
            && (self.grades.is_empty() || self.grades.contains(&lecture.grade))
            && (self.majors.is_empty() || self.majors.contains(&lecture.major))
            && self
                .credits
                .is_none_or(|credits| lecture.credit_value() == Some(credits))
            && self.matches_sessions(lecture)
    }

    fn matches_text(&self, lecture: &Lecture) -> bool {
        let needle = self.text.to_lowercase();
        needle.is_empty()
            || lecture.title.to_lowercase().contains(&needle)
            || lecture.id.to_lowercase().contains(&needle)
    }

    fn matches_sessions(&self, lecture: &Lecture) -> bool {
        if self.days.is_empty() && self.times.is_empty() {
            return true;
        }
        let sessions = parse_schedule(&lecture.raw_schedule);
        let day_ok = self.days.is_empty()
            || sessions.iter().any(|session| self.days.contains(&session.day));
        let time_ok = self.times.is_empty()
            || sessions
                .iter()
                .any(|session| {
                    let range = session.range;
                    self.times.range(range.first()..=range.last()).next().is_some()
                });
        day_ok && time_ok
    }
}

/// Lectures matching `query`, in catalog order
pub fn filter_lectures<'a>(catalog: &'a [Lecture], query: &SearchQuery) -> Vec<&'a Lecture> {
    catalog.iter().filter(|lecture| query.matches(lecture)).collect()
}

/// Distinct majors in first-seen order, for the major filter options
pub fn available_majors(catalog: &[Lecture]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    catalog
        .iter()
        .map(|lecture| lecture.major.as_str())
        .filter(|major| seen.insert(*major))
        .collect()
}

/// A query over a catalog plus the page window shown to the user.
///
/// The filtered result is re-derived whenever the catalog or query changes;
/// changing the query also resets the window to the first page.
#[derive(Debug, Clone)]
pub struct SearchSession {
    catalog: Arc<Vec<Lecture>>,
    query: SearchQuery,
    page: usize,
    page_size: usize,
    matched: Vec<usize>,
}

impl SearchSession {
    pub fn new(catalog: Arc<Vec<Lecture>>, page_size: usize) -> Self {
        let mut session = Self {
            catalog,
            query: SearchQuery::default(),
            page: 1,
            page_size: page_size.max(1),
            matched: Vec::new(),
        };
        session.refilter();
        session
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_query(&mut self, query: SearchQuery) {
        if query == self.query {
            return;
        }
        self.query = query;
        self.page = 1;
        self.refilter();
    }

    pub fn set_catalog(&mut self, catalog: Arc<Vec<Lecture>>) {
        self.catalog = catalog;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.matched = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, lecture)| self.query.matches(lecture))
            .map(|(index, _)| index)
            .collect();
        debug!(
            "Search matched {} of {} lectures",
            self.matched.len(),
            self.catalog.len()
        );
    }

    pub fn total(&self) -> usize {
        self.matched.len()
    }

    pub fn last_page(&self) -> usize {
        self.matched.len().div_ceil(self.page_size)
    }

    /// Grows the window by one page when the user nears the end of the list.
    /// Returns whether the window grew.
    pub fn load_more(&mut self) -> bool {
        if self.page >= self.last_page() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Every matching lecture, in catalog order
    pub fn filtered(&self) -> impl Iterator<Item = &Lecture> {
        self.matched.iter().map(|&index| &self.catalog[index])
    }

    /// The first `page * page_size` matches
    pub fn visible(&self) -> impl Iterator<Item = &Lecture> {
        self.filtered().take(self.page * self.page_size)
    }
}
