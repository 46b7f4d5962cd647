use chrono::NaiveDate;
use db::{
    OrderStore, StoreError,
    models::production_order::{CreateProductionOrder, OrderStatus},
};

fn test_order() -> CreateProductionOrder {
    CreateProductionOrder {
        finished_goods: "Test Cake".to_string(),
        produced_quantity: 1,
        raw_materials: "Flour".to_string(),
        due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        storage_location: "Warehouse X".to_string(),
        status: None,
    }
}

async fn seeded_store() -> OrderStore {
    let store = OrderStore::in_memory();
    store.init().await.unwrap();
    store
}

#[tokio::test]
async fn operations_fail_before_init() {
    let store = OrderStore::in_memory();
    assert!(matches!(
        store.get_all().await,
        Err(StoreError::NotInitialized)
    ));
    assert!(matches!(
        store.get_by_id(1).await,
        Err(StoreError::NotInitialized)
    ));
    assert!(matches!(
        store.search("muffin").await,
        Err(StoreError::NotInitialized)
    ));
    assert!(matches!(
        store.filter_by_status(OrderStatus::Pending).await,
        Err(StoreError::NotInitialized)
    ));
    assert!(matches!(
        store.create(&test_order()).await,
        Err(StoreError::NotInitialized)
    ));
}

#[tokio::test]
async fn init_is_idempotent_and_seeds_once() {
    let store = seeded_store().await;
    store.init().await.unwrap();

    let orders = store.get_all().await.unwrap();
    assert_eq!(orders.len(), 8);
}

#[tokio::test]
async fn seeded_scenario_end_to_end() {
    let store = seeded_store().await;

    let orders = store.get_all().await.unwrap();
    assert_eq!(orders.len(), 8);
    // Highest id first: the last sample inserted.
    assert_eq!(orders[0].finished_goods, "Mixed Berry Muffins");

    let completed = store
        .filter_by_status(OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.len(), 6);

    let id = store.create(&test_order()).await.unwrap();
    assert_eq!(id, 9);
    let created = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.finished_goods, "Test Cake");
    assert_eq!(created.produced_quantity, 1);
    assert_eq!(created.raw_materials, "Flour");
    assert_eq!(created.storage_location, "Warehouse X");

    store
        .update_status(id, OrderStatus::InProgress)
        .await
        .unwrap();
    let updated = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(updated.status, OrderStatus::InProgress);

    assert!(matches!(
        store.update_status(999, OrderStatus::Completed).await,
        Err(StoreError::OrderNotFound(999))
    ));
    // The failed update left every record unchanged.
    let after = store.get_all().await.unwrap();
    assert_eq!(after.len(), 9);
    assert_eq!(after[0].status, OrderStatus::InProgress);
}

#[tokio::test]
async fn get_by_id_absent_is_none() {
    let store = seeded_store().await;
    assert!(store.get_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn filter_partitions_the_full_list() {
    let store = seeded_store().await;

    let all = store.get_all().await.unwrap();
    let mut unioned = Vec::new();
    for status in OrderStatus::ALL {
        let subset = store.filter_by_status(status).await.unwrap();
        assert!(subset.iter().all(|o| o.status == status));
        unioned.extend(subset);
    }
    assert_eq!(unioned.len(), all.len());
    for order in &all {
        assert!(unioned.contains(order));
    }
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let store = seeded_store().await;

    let lower = store.search("muffins").await.unwrap();
    let upper = store.search("MUFFINS").await.unwrap();
    assert_eq!(lower, upper);
    assert_eq!(lower.len(), 6);
}

#[tokio::test]
async fn search_on_status_is_superset_of_filter() {
    let store = seeded_store().await;

    let filtered = store
        .filter_by_status(OrderStatus::Completed)
        .await
        .unwrap();
    let searched = store.search("completed").await.unwrap();
    for order in &filtered {
        assert!(searched.contains(order));
    }
}

#[tokio::test]
async fn empty_search_matches_everything() {
    let store = seeded_store().await;
    assert_eq!(
        store.search("").await.unwrap(),
        store.get_all().await.unwrap()
    );
}

#[tokio::test]
async fn list_results_are_ordered_by_id_descending() {
    let store = seeded_store().await;
    store.create(&test_order()).await.unwrap();

    for orders in [
        store.get_all().await.unwrap(),
        store.search("e").await.unwrap(),
        store.filter_by_status(OrderStatus::Completed).await.unwrap(),
    ] {
        assert!(orders.windows(2).all(|w| w[0].id > w[1].id));
    }
}

#[tokio::test]
async fn create_honors_an_explicit_status() {
    let store = seeded_store().await;

    let mut order = test_order();
    order.status = Some(OrderStatus::Completed);
    let id = store.create(&order).await.unwrap();
    let created = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(created.status, OrderStatus::Completed);
}

#[tokio::test]
async fn update_status_self_heals_an_uninitialized_store() {
    let store = OrderStore::in_memory();
    // No explicit init: the mutation opens and seeds the store itself.
    store
        .update_status(1, OrderStatus::InProgress)
        .await
        .unwrap();

    let order = store.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.finished_goods, "Chocolate Chip Cookies");
}

#[tokio::test]
async fn close_returns_store_to_uninitialized() {
    let store = seeded_store().await;
    store.close().await;
    assert!(matches!(
        store.get_all().await,
        Err(StoreError::NotInitialized)
    ));
    // And init can bring it back.
    store.init().await.unwrap();
    assert_eq!(store.get_all().await.unwrap().len(), 8);
}
