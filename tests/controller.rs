use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Instant;

use assert_matches::assert_matches;

use vulkanseeds::catalog::CatalogClient;
use vulkanseeds::config::ReconcilePolicy;
use vulkanseeds::controller::{Effect, Screen, ViewController};
use vulkanseeds::detail::Clipboard;
use vulkanseeds::domain::{Seed, SeedId, SortMode, Theme};
use vulkanseeds::error::SeedsError;
use vulkanseeds::list::sort_records;
use vulkanseeds::seo::{HtmlHead, MetaSlot};
use vulkanseeds::theme::ThemeStore;

const SITE: &str = "https://vulkanseeds.bolt.host";

#[derive(Default)]
struct MockCatalog {
    seeds: Vec<Seed>,
    fail_increment: bool,
    fetches: Mutex<Vec<SortMode>>,
    increments: Mutex<Vec<(SeedId, u64)>>,
}

impl CatalogClient for MockCatalog {
    fn fetch_all(&self, order: SortMode, _descending: bool) -> Result<Vec<Seed>, SeedsError> {
        self.fetches.lock().unwrap().push(order);
        let mut seeds = self.seeds.clone();
        sort_records(&mut seeds, order);
        Ok(seeds)
    }

    fn increment_views(&self, id: &SeedId, current: u64) -> Result<(), SeedsError> {
        self.increments
            .lock()
            .unwrap()
            .push((id.clone(), current + 1));
        if self.fail_increment {
            return Err(SeedsError::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemoryThemes {
    saved: Rc<RefCell<Option<Theme>>>,
}

impl ThemeStore for MemoryThemes {
    fn load(&self) -> Result<Option<Theme>, SeedsError> {
        Ok(*self.saved.borrow())
    }

    fn save(&self, theme: Theme) -> Result<(), SeedsError> {
        *self.saved.borrow_mut() = Some(theme);
        Ok(())
    }
}

struct NullClipboard;

impl Clipboard for NullClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), SeedsError> {
        Ok(())
    }
}

fn seed(id: &str, views: u64) -> Seed {
    Seed {
        id: SeedId::new(id),
        seed_code: format!("code-{id}"),
        title: format!("Seed {id}"),
        description: format!("Description of {id}"),
        version: "1.21".to_string(),
        edition: "Bedrock".to_string(),
        biomes: Vec::new(),
        features: Vec::new(),
        image_url: None,
        views,
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

fn controller(policy: ReconcilePolicy) -> ViewController<HtmlHead, MemoryThemes> {
    ViewController::new(HtmlHead::new(), MemoryThemes::default(), SITE, policy)
}

#[test]
fn mount_fetches_once_with_site_head() {
    let catalog = MockCatalog {
        seeds: vec![seed("a", 3), seed("b", 10), seed("c", 1)],
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.mount();

    assert!(controller.list().is_loading());
    assert_eq!(controller.pending_effects().count(), 1);
    controller.run_effects(&catalog);

    assert!(!controller.list().is_loading());
    assert_eq!(*catalog.fetches.lock().unwrap(), vec![SortMode::Popular]);
    let views = controller
        .list()
        .records()
        .iter()
        .map(|seed| seed.views)
        .collect::<Vec<_>>();
    assert_eq!(views, vec![10, 3, 1]);
    assert_eq!(controller.head().canonical(), Some(SITE));
}

#[test]
fn select_is_optimistic_and_queues_one_increment() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.scroll_by(7);
    controller.select(&seed("s5", 5));

    let detail = controller.detail().unwrap();
    assert_eq!(detail.seed().views, 6);
    assert_eq!(controller.scroll(), 0);

    let effects = controller.take_effects();
    assert_eq!(
        effects,
        vec![Effect::IncrementViews {
            id: SeedId::new("s5"),
            current: 5,
        }]
    );

    let catalog = MockCatalog::default();
    for effect in effects {
        if let Effect::IncrementViews { id, current } = effect {
            let result = catalog.increment_views(&id, current);
            controller.on_increment_result(&id, current, result);
        }
    }
    assert_eq!(
        *catalog.increments.lock().unwrap(),
        vec![(SeedId::new("s5"), 6)]
    );
}

#[test]
fn select_syncs_seed_head() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.select(&seed("xyz", 0));

    let head = controller.head();
    assert_eq!(head.title(), "Seed xyz - VulkanSeeds | Best Minecraft Seed");
    assert_eq!(head.canonical(), Some("https://vulkanseeds.bolt.host/?seed=xyz"));
    assert!(head.structured_data().unwrap().contains("code-xyz"));
}

#[test]
fn back_restores_site_head_and_list() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.select(&seed("xyz", 0));
    controller.back();

    assert_matches!(controller.screen(), Screen::List);
    assert_eq!(controller.head().canonical(), Some(SITE));
    assert_eq!(
        controller.head().meta(&MetaSlot::name("description")),
        Some("Discover the best Minecraft seeds for Java Edition, Bedrock Edition, and MCPE. Find village spawn seeds, beautiful landscapes, and more. Copy instantly!")
    );
}

#[test]
fn failed_increment_keeps_optimistic_count_by_default() {
    let catalog = MockCatalog {
        fail_increment: true,
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.select(&seed("s", 5));
    controller.run_effects(&catalog);

    assert_eq!(controller.detail().unwrap().seed().views, 6);
}

#[test]
fn failed_increment_reverts_when_configured() {
    let catalog = MockCatalog {
        fail_increment: true,
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::Revert);
    controller.select(&seed("s", 5));
    controller.run_effects(&catalog);

    assert_eq!(controller.detail().unwrap().seed().views, 5);
}

#[test]
fn revert_ignores_a_different_open_seed() {
    let mut controller = controller(ReconcilePolicy::Revert);
    controller.select(&seed("first", 5));
    controller.back();
    controller.select(&seed("second", 9));
    controller.on_increment_result(
        &SeedId::new("first"),
        5,
        Err(SeedsError::Transport("late failure".to_string())),
    );

    assert_eq!(controller.detail().unwrap().seed().views, 10);
}

#[test]
fn reselecting_before_acknowledgement_queues_both() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.select(&seed("a", 1));
    controller.back();
    controller.select(&seed("b", 2));

    let increments = controller
        .take_effects()
        .into_iter()
        .filter(|effect| matches!(effect, Effect::IncrementViews { .. }))
        .count();
    assert_eq!(increments, 2);
}

#[test]
fn sort_change_refetches_and_drops_stale_result() {
    let catalog = MockCatalog {
        seeds: vec![seed("a", 3)],
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.mount();
    let initial = controller.take_effects();
    controller.set_sort_mode(SortMode::Recent);
    controller.set_sort_mode(SortMode::Recent);
    let followups = controller.take_effects();
    assert_eq!(followups.len(), 1);

    for effect in followups {
        if let Effect::FetchList { ticket, sort } = effect {
            assert_eq!(sort, SortMode::Recent);
            controller.on_list_fetched(ticket, catalog.fetch_all(sort, true));
        }
    }
    assert!(!controller.list().is_loading());

    // the popular fetch resolves last but was superseded
    for effect in initial {
        if let Effect::FetchList { ticket, sort } = effect {
            controller.on_list_fetched(ticket, Ok(Vec::new()));
            assert_eq!(sort, SortMode::Popular);
        }
    }
    assert_eq!(controller.list().records().len(), 1);
}

#[test]
fn theme_toggle_persists_and_reloads() {
    let themes = MemoryThemes::default();
    let mut first = ViewController::new(
        HtmlHead::new(),
        themes.clone(),
        SITE,
        ReconcilePolicy::AcceptDrift,
    );
    assert_eq!(first.theme(), Theme::Light);
    assert_eq!(first.toggle_theme(), Theme::Dark);
    assert_eq!(*themes.saved.borrow(), Some(Theme::Dark));

    let second = ViewController::new(
        HtmlHead::new(),
        themes,
        SITE,
        ReconcilePolicy::AcceptDrift,
    );
    assert_eq!(second.theme(), Theme::Dark);
    assert_matches!(second.screen(), Screen::List);
}

#[test]
fn copy_only_applies_in_detail() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    let now = Instant::now();
    assert!(controller.copy_seed(&mut NullClipboard, now).is_none());

    controller.select(&seed("s", 0));
    assert_matches!(controller.copy_seed(&mut NullClipboard, now), Some(Ok(())));
    assert!(controller.detail().unwrap().is_copied(now));
}

#[test]
fn enter_opens_seed_under_cursor() {
    let catalog = MockCatalog {
        seeds: vec![seed("low", 1), seed("high", 50)],
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.mount();
    controller.run_effects(&catalog);
    controller.list_mut().move_cursor(1);

    assert!(controller.select_cursor());
    assert_eq!(controller.detail().unwrap().seed().id.as_str(), "low");
    assert_eq!(controller.detail().unwrap().seed().views, 2);
}

#[test]
fn back_reloads_list_with_recorded_view() {
    let before = MockCatalog {
        seeds: vec![seed("s", 5)],
        ..MockCatalog::default()
    };
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.mount();
    controller.run_effects(&before);
    assert!(controller.select_cursor());
    controller.run_effects(&before);
    assert_eq!(controller.detail().unwrap().seed().views, 6);

    controller.back();
    assert!(controller.list().is_loading());
    let effects = controller.take_effects();
    assert_eq!(effects.len(), 1);
    assert_matches!(
        effects[0],
        Effect::FetchList {
            sort: SortMode::Popular,
            ..
        }
    );

    let after = MockCatalog {
        seeds: vec![seed("s", 6)],
        ..MockCatalog::default()
    };
    for effect in effects {
        if let Effect::FetchList { ticket, sort } = effect {
            controller.on_list_fetched(ticket, after.fetch_all(sort, true));
        }
    }
    assert_eq!(controller.list().records()[0].views, 6);
}

#[test]
fn back_on_list_is_a_no_op() {
    let mut controller = controller(ReconcilePolicy::AcceptDrift);
    controller.back();
    assert!(controller.take_effects().is_empty());
    assert!(!controller.list().is_loading());
}
