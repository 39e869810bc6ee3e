use market_integration::harness::TestHarness;
use market_integration::{jpeg_photo, photo};
use plaza_client::{CreateError, ListingDraft, VehicleDraft};
use plaza_common::listing::DEFAULT_LOCATION;
use plaza_common::query::ListingQuery;

#[tokio::test]
async fn created_bike_shows_up_in_sporting_goods() {
    let h = TestHarness::setup();
    let id = h
        .gary
        .list_item("Bike", "Sporting Goods", "150", &[photo("bike.png")])
        .await;

    let query = ListingQuery::new().with_category("Sporting Goods");
    let listings = h.alice.client.browse(&query).await.unwrap();
    assert_eq!(listings.len(), 1);
    let bike = &listings[0];
    assert_eq!(bike.id, id);
    assert_eq!(bike.title, "Bike");
    assert_eq!(bike.price_cents, 15_000);
    assert_eq!(bike.location, DEFAULT_LOCATION);
    assert_eq!(bike.seller_email, h.gary.email);
    assert!(bike.image_folder.is_some());
}

#[tokio::test]
async fn detail_page_resolves_photo_urls_in_name_order() {
    let h = TestHarness::setup();
    let id = h
        .emma
        .list_item(
            "Desk Lamp",
            "Home Goods",
            "25",
            &[photo("b-side.png"), jpeg_photo("a-front.jpg")],
        )
        .await;

    let detail = h
        .alice
        .client
        .listing_detail(&id)
        .await
        .unwrap()
        .expect("listing detail");
    assert_eq!(detail.photo_urls.len(), 2);
    assert!(detail.photo_urls[0].ends_with("/a-front.jpg"));
    assert!(detail.photo_urls[1].ends_with("/b-side.png"));
    assert!(detail.vehicle.is_none());

    let summary = h
        .alice
        .client
        .listing_summary(&id)
        .await
        .unwrap()
        .expect("listing summary");
    assert_eq!(summary.title, "Desk Lamp");
    assert_eq!(summary.first_photo_url.as_deref(), Some(detail.photo_urls[0].as_str()));
}

#[tokio::test]
async fn zero_photo_listing_has_no_folder_and_no_urls() {
    let h = TestHarness::setup();
    let id = h.emma.list_item("Table", "Home Goods", "80", &[]).await;

    let detail = h
        .bob
        .client
        .listing_detail(&id)
        .await
        .unwrap()
        .expect("listing detail");
    assert_eq!(detail.listing.image_folder, None);
    assert!(detail.photo_urls.is_empty());
    assert_eq!(h.backend.blob_count(), 0);

    let summary = h
        .bob
        .client
        .listing_summary(&id)
        .await
        .unwrap()
        .expect("listing summary");
    assert_eq!(summary.first_photo_url, None);
}

#[tokio::test]
async fn vehicle_listing_carries_its_details() {
    let h = TestHarness::setup();
    let id = h
        .gary
        .list_vehicle(
            "Honda Civic",
            "8000",
            VehicleDraft {
                year: Some(2014),
                make: "Honda".into(),
                model: "Civic".into(),
                mileage: Some(92_000),
            },
            &[jpeg_photo("civic.jpg")],
        )
        .await;

    let detail = h
        .alice
        .client
        .listing_detail(&id)
        .await
        .unwrap()
        .expect("listing detail");
    assert_eq!(detail.listing.category, "Vehicles");
    let vehicle = detail.vehicle.expect("vehicle details");
    assert_eq!(vehicle.year, Some(2014));
    assert_eq!(vehicle.make, "Honda");
    assert_eq!(vehicle.mileage, Some(92_000));
}

#[tokio::test]
async fn rejected_draft_writes_nothing() {
    let h = TestHarness::setup();
    let draft = ListingDraft {
        title: "Mystery Box".into(),
        category: "Spaceships".into(),
        price: "50".into(),
        location: String::new(),
        seller_email: h.emma.email.clone(),
        description: String::new(),
    };

    let err = h
        .emma
        .client
        .create_listing(&draft, &[photo("box.png")])
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::Validation(_)));
    assert_eq!(h.backend.listing_count(), 0);
    assert_eq!(h.backend.blob_count(), 0);
}

#[tokio::test]
async fn failed_upload_aborts_before_the_listing_row() {
    let h = TestHarness::setup();
    h.backend.fail_blob_writes(true);

    let draft = ListingDraft {
        title: "Desk Lamp".into(),
        category: "Home Goods".into(),
        price: "25".into(),
        location: String::new(),
        seller_email: h.emma.email.clone(),
        description: String::new(),
    };
    let err = h
        .emma
        .client
        .create_listing(&draft, &[photo("lamp.png")])
        .await
        .unwrap_err();

    assert!(matches!(err, CreateError::Store(_)));
    assert_eq!(h.backend.listing_count(), 0);
}

#[tokio::test]
async fn failed_vehicle_row_leaves_the_listing_behind() {
    let h = TestHarness::setup();
    h.backend.fail_vehicle_writes(true);

    let draft = ListingDraft {
        title: "Honda Civic".into(),
        category: String::new(),
        price: "8000".into(),
        location: String::new(),
        seller_email: h.gary.email.clone(),
        description: String::new(),
    };
    let err = h
        .gary
        .client
        .create_vehicle_listing(&draft, &VehicleDraft::default(), &[])
        .await
        .unwrap_err();

    let CreateError::PartialFailure { listing_id, .. } = err else {
        panic!("expected partial failure, got {err:?}");
    };
    let detail = h
        .alice
        .client
        .listing_detail(&listing_id)
        .await
        .unwrap()
        .expect("orphaned listing still browsable");
    assert_eq!(detail.listing.category, "Vehicles");
    assert!(detail.vehicle.is_none());
}
