use estate_lots::config::CacheConfig;
use estate_lots::inventory::{
    Feature, LotError, LotId, LotRegistry, LotStatus, PersistenceStore, SearchCriteria,
};
use std::path::Path;
use std::sync::Arc;
use std::thread;

fn seeded_registry(dir: &Path) -> LotRegistry {
    let store = PersistenceStore::new(dir.join("lots.dat"), dir.join("lots.bak"));
    let registry = LotRegistry::new(store, &CacheConfig::default());
    registry.initialize();
    registry
}

#[test]
fn seeded_grid_rejects_duplicates_and_keeps_sold_terminal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());
    assert_eq!(registry.len(), 100);

    assert_eq!(
        registry.add_lot(1, 1, 999.0, 1.0),
        Err(LotError::Duplicate(LotId::new(1, 1)))
    );
    assert_eq!(
        registry.get("Lot1 1").expect("seeded lot").base().size(),
        225.0
    );

    registry.change_status("Lot1 1", "sell").expect("sell");
    match registry.change_status("Lot1 1", "reserve") {
        Err(LotError::IllegalTransition { from, to, .. }) => {
            assert_eq!(from, LotStatus::Sold);
            assert_eq!(to, LotStatus::Reserved);
        }
        other => panic!("expected illegal transition, got {other:?}"),
    }
    let lot = registry.get("Lot1 1").expect("seeded lot");
    assert_eq!(lot.status(), LotStatus::Sold);
    assert!(lot.description().ends_with("Status: SOLD"));
}

#[test]
fn pool_adds_its_cost_exactly_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());
    let before = registry.get("Lot2 5").expect("seeded lot").price();

    let first = registry.add_feature("Lot2 5", "pool").expect("pool");
    let second = registry.add_feature("Lot2 5", "pool").expect("pool again");

    assert!(first.is_changed());
    assert!(!second.is_changed());
    let after = registry.get("Lot2 5").expect("seeded lot");
    assert_eq!(after.price() - before, 25_000.0);
    assert_eq!(after.features(), vec![Feature::SwimmingPool]);
    assert_eq!(after.description().matches(" + Swimming Pool").count(), 1);
}

#[test]
fn feature_prices_add_up_in_any_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());

    for feature in ["pool", "fencing", "landscaping"] {
        registry.add_feature("Lot3 1", feature).expect("feature");
    }
    for feature in ["landscaping", "pool", "fencing"] {
        registry.add_feature("Lot3 2", feature).expect("feature");
    }

    let first = registry.get("Lot3 1").expect("lot");
    let second = registry.get("Lot3 2").expect("lot");
    let extras = 25_000.0 + 12_000.0 + 8_000.0;
    assert_eq!(first.price(), first.base().price() + extras);
    assert_eq!(second.price(), second.base().price() + extras);
    assert_eq!(
        second.description(),
        "Lot 3-2 (270.0 sqm) - $150000.0 - Status: AVAILABLE + Premium Landscaping + Swimming Pool + Perimeter Fencing"
    );
}

#[test]
fn status_never_moves_backwards() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());

    registry.reserve("Lot4 1").expect("reserve");
    assert!(matches!(
        registry.transition("Lot4 1", LotStatus::Available),
        Err(LotError::IllegalTransition { .. })
    ));
    registry.add_feature("Lot4 1", "fencing").expect("fencing");
    assert_eq!(
        registry.get("Lot4 1").expect("lot").status(),
        LotStatus::Reserved
    );

    registry.sell("Lot4 1").expect("sell");
    for status in LotStatus::ordered() {
        if status != LotStatus::Sold {
            assert!(registry.transition("Lot4 1", status).is_err());
        }
    }
    assert_eq!(
        registry.get("Lot4 1").expect("lot").status(),
        LotStatus::Sold
    );
}

#[test]
fn premium_sold_search_returns_exact_subset() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());

    registry.sell("Lot5 20").expect("sell");
    registry.sell("Lot1 1").expect("sell");
    registry.add_feature("Lot5 10", "pool").expect("pool");
    registry.add_feature("Lot5 10", "landscaping").expect("landscaping");
    registry.sell("Lot5 10").expect("sell");
    registry.reserve("Lot5 19").expect("reserve");

    let criteria = SearchCriteria::new()
        .min_price(200_000.0)
        .status(LotStatus::Sold);
    let ids: Vec<String> = registry
        .search(&criteria)
        .iter()
        .map(|view| view.id().to_string())
        .collect();

    assert_eq!(ids, vec!["Lot5 10".to_string(), "Lot5 20".to_string()]);
}

#[test]
fn concurrent_feature_updates_are_not_lost() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = Arc::new(seeded_registry(dir.path()));
    let features = [
        Feature::SwimmingPool,
        Feature::PremiumLandscaping,
        Feature::PerimeterFencing,
    ];

    thread::scope(|scope| {
        for feature in features {
            for _ in 0..4 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    for block in 1..=5 {
                        let id = format!("Lot{block} 7");
                        registry.attach_feature(&id, feature).expect("attach");
                    }
                });
            }
        }
    });

    for block in 1..=5 {
        let lot = registry.get(&format!("Lot{block} 7")).expect("lot");
        assert_eq!(lot.features().len(), 3, "{lot}");
        assert_eq!(lot.price(), lot.base().price() + 45_000.0);
    }
}

#[test]
fn concurrent_sales_apply_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = seeded_registry(dir.path());

    let changed: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.sell("Lot2 9").expect("sell").is_changed()))
            .collect();
        handles
            .into_iter()
            .map(|handle| usize::from(handle.join().expect("thread")))
            .sum()
    });

    assert_eq!(changed, 1);
    assert_eq!(registry.get("Lot2 9").expect("lot").depth(), 1);
}
