use std::collections::HashSet;
use std::time::Duration;

use eyre::Result;
use train_station_tests::TestCtxBuilder;

mod util;

/// Runs a sequence of trains and checks capacity and counters after each one.
#[tokio::test]
#[ntest::timeout(30_000)]
async fn test_trains_respect_capacity() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    let spawned: HashSet<_> = ctx.spawn_passengers(25).into_iter().collect();
    ctx.await_waiting(25).await?;

    let mut boarded = HashSet::new();
    let mut waiting = 25;
    for free_seats in [4, 0, 7, 1, 9, 12] {
        let expected = free_seats.min(waiting);
        let train = ctx.arrive(free_seats);
        let on_train = util::board(&ctx, expected).await?;
        let departure = ctx.departure(train).await?;

        assert_eq!(departure.admitted, expected);
        assert!(
            on_train.is_disjoint(&boarded),
            "A passenger must not board two trains."
        );
        boarded.extend(on_train);

        waiting -= expected;
        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.waiting, waiting);
        assert_eq!(snapshot.boarding, 0, "No passenger may leak into the next train.");
        assert!(!snapshot.train_present);
    }

    assert_eq!(waiting, 0);
    assert_eq!(boarded, spawned, "Every passenger must board exactly once.");
    ctx.finish().await
}

/// The train must wait for its last passenger, however long seating takes.
#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_no_premature_departure() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    ctx.spawn_passengers(5);
    ctx.await_waiting(5).await?;

    let train = ctx.arrive(5);
    for _ in 0..5 {
        ctx.next_admitted().await?;
    }
    for _ in 0..4 {
        ctx.on_board();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(
        !train.has_departed(),
        "The train must not depart while a passenger is still boarding."
    );
    assert_eq!(ctx.snapshot().boarding, 1);

    ctx.on_board();
    assert_eq!(ctx.departure(train).await?.admitted, 5);
    ctx.finish().await
}

/// Passengers arriving after a departure wait for the next train.
#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_late_passengers_take_next_train() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;

    assert_eq!(ctx.departure(ctx.arrive(3)).await?.admitted, 0);

    ctx.spawn_passengers(3);
    ctx.await_waiting(3).await?;
    ctx.assert_no_admission(Duration::from_millis(100)).await?;

    let train = ctx.arrive(3);
    util::board(&ctx, 3).await?;
    assert_eq!(ctx.departure(train).await?.admitted, 3);
    assert_eq!(ctx.snapshot().trains_departed, 2);

    ctx.finish().await
}

/// Passengers keep arriving while trains with a few seats load back to back.
#[tokio::test]
#[ntest::timeout(60_000)]
async fn test_arrivals_while_loading() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    let mut spawned = HashSet::new();
    let mut seated = HashSet::new();

    for _round in 0..50 {
        // no waiting for the platform: trains race the arrivals
        spawned.extend(ctx.spawn_passengers(20));
        while seated.len() < spawned.len() {
            let (departure, on_train) = ctx.load(3).await?;
            assert!(
                departure.admitted <= departure.free_seats,
                "A train must not take more passengers than it has seats."
            );
            assert_eq!(
                departure.admitted as usize,
                on_train.len(),
                "Every admitted passenger must return from `wait_for_train`."
            );
            assert_eq!(ctx.snapshot().boarding, 0, "No passenger may leak into the next train.");
            assert!(
                on_train.is_disjoint(&seated),
                "A passenger must not board two trains."
            );
            seated.extend(on_train);
        }
    }

    assert_eq!(seated, spawned, "Every passenger must be seated exactly once.");
    assert_eq!(ctx.snapshot().waiting, 0);
    ctx.finish().await
}
