//! Navigation between the seed list and a single seed.
//!
//! The controller never talks to the store directly. Remote work is queued as
//! [`Effect`]s and the local state is updated right away; whoever drives the
//! controller runs the effects and reports back through `on_list_fetched` /
//! `on_increment_result`.

use std::collections::VecDeque;
use std::time::Instant;

use crate::catalog::CatalogClient;
use crate::config::ReconcilePolicy;
use crate::detail::{Clipboard, DetailView};
use crate::domain::{Seed, SeedId, SortMode, Theme};
use crate::error::SeedsError;
use crate::list::{FetchTicket, ListView};
use crate::seo::{HeadSink, seed_descriptor, site_default_descriptor, sync_head};
use crate::theme::{ThemeStore, load_or_default};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchList { ticket: FetchTicket, sort: SortMode },
    IncrementViews { id: SeedId, current: u64 },
}

#[derive(Debug)]
pub enum Screen {
    List,
    Detail(DetailView),
}

pub struct ViewController<H: HeadSink, T: ThemeStore> {
    head: H,
    themes: T,
    site_url: String,
    reconcile: ReconcilePolicy,
    list: ListView,
    screen: Screen,
    theme: Theme,
    scroll: u16,
    effects: VecDeque<Effect>,
}

impl<H: HeadSink, T: ThemeStore> ViewController<H, T> {
    pub fn new(head: H, themes: T, site_url: &str, reconcile: ReconcilePolicy) -> Self {
        let theme = load_or_default(&themes);
        Self {
            head,
            themes,
            site_url: site_url.trim_end_matches('/').to_string(),
            reconcile,
            list: ListView::new(SortMode::default()),
            screen: Screen::List,
            theme,
            scroll: 0,
            effects: VecDeque::new(),
        }
    }

    /// Queues the initial list fetch and applies the site-wide head.
    pub fn mount(&mut self) {
        sync_head(&mut self.head, &site_default_descriptor(&self.site_url));
        self.refresh();
    }

    pub fn head(&self) -> &H {
        &self.head
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn detail(&self) -> Option<&DetailView> {
        match &self.screen {
            Screen::Detail(detail) => Some(detail),
            Screen::List => None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i16) {
        self.scroll = self.scroll.saturating_add_signed(delta);
    }

    pub fn pending_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.effects.drain(..).collect()
    }

    /// List -> Detail. The view count shown is bumped immediately; the
    /// remote increment is only queued.
    pub fn select(&mut self, seed: &Seed) {
        self.effects.push_back(Effect::IncrementViews {
            id: seed.id.clone(),
            current: seed.views,
        });

        let opened = seed.with_views(seed.views.saturating_add(1));
        let descriptor = seed_descriptor(&opened, &self.site_url);
        self.screen = Screen::Detail(DetailView::new(opened));
        sync_head(&mut self.head, &descriptor);
        self.scroll = 0;
    }

    pub fn select_cursor(&mut self) -> bool {
        let Some(seed) = self.list.selected().cloned() else {
            return false;
        };
        self.select(&seed);
        true
    }

    /// Detail -> List, restoring the site-wide head. The list is reloaded as
    /// on mount, so it picks up the view just recorded.
    pub fn back(&mut self) {
        if matches!(self.screen, Screen::List) {
            return;
        }
        self.screen = Screen::List;
        sync_head(&mut self.head, &site_default_descriptor(&self.site_url));
        self.scroll = 0;
        self.refresh();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(err) = self.themes.save(self.theme) {
            tracing::warn!(error = %err, theme = %self.theme, "failed to persist theme");
        }
        self.theme
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if let Some(ticket) = self.list.set_sort_mode(mode) {
            self.effects.push_back(Effect::FetchList { ticket, sort: mode });
        }
    }

    pub fn refresh(&mut self) {
        let ticket = self.list.begin_fetch();
        self.effects.push_back(Effect::FetchList {
            ticket,
            sort: self.list.sort_mode(),
        });
    }

    pub fn copy_seed(
        &mut self,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Option<Result<(), SeedsError>> {
        match &mut self.screen {
            Screen::Detail(detail) => Some(detail.copy(clipboard, now)),
            Screen::List => None,
        }
    }

    pub fn on_list_fetched(&mut self, ticket: FetchTicket, result: Result<Vec<Seed>, SeedsError>) {
        self.list.finish_fetch(ticket, result);
    }

    pub fn on_increment_result(&mut self, id: &SeedId, current: u64, result: Result<(), SeedsError>) {
        let Err(err) = result else {
            return;
        };
        tracing::warn!(error = %err, seed = %id, "failed to record view");
        if self.reconcile != ReconcilePolicy::Revert {
            return;
        }
        if let Screen::Detail(detail) = &mut self.screen {
            if detail.seed().id == *id && detail.seed().views == current.saturating_add(1) {
                detail.set_views(current);
            }
        }
    }

    /// Runs every queued effect on the calling thread.
    pub fn run_effects(&mut self, client: &dyn CatalogClient) {
        for effect in self.take_effects() {
            match effect {
                Effect::FetchList { ticket, sort } => {
                    let result = client.fetch_all(sort, true);
                    self.on_list_fetched(ticket, result);
                }
                Effect::IncrementViews { id, current } => {
                    let result = client.increment_views(&id, current);
                    self.on_increment_result(&id, current, result);
                }
            }
        }
    }
}
