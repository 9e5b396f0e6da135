use std::time::Duration;

use eyre::Result;
use train_station_core::StationError;
use train_station_tests::TestCtxBuilder;

mod util;

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_three_seats_for_ten_passengers() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    ctx.spawn_passengers(10);
    ctx.await_waiting(10).await?;

    let train = ctx.arrive(3);
    for _ in 0..3 {
        ctx.next_admitted().await?;
    }
    ctx.assert_no_admission(Duration::from_millis(200)).await?;

    for remaining in (0..3).rev() {
        assert!(
            !train.has_departed(),
            "The train must not depart before every passenger is seated."
        );
        ctx.on_board();
        assert_eq!(ctx.snapshot().boarding, remaining);
    }

    let departure = ctx.departure(train).await?;
    assert_eq!(departure.admitted, 3, "The train must fill all of its seats.");
    assert_eq!(ctx.snapshot().waiting, 7, "The other passengers must keep waiting.");

    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_empty_station() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;

    let departure = ctx.departure(ctx.arrive(5)).await?;
    assert_eq!(departure.admitted, 0);
    assert_eq!(departure.seats_left(), 5);

    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_train_without_free_seats() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    ctx.spawn_passengers(5);
    ctx.await_waiting(5).await?;

    let departure = ctx.departure(ctx.arrive(0)).await?;
    assert_eq!(departure.admitted, 0);
    ctx.assert_no_admission(Duration::from_millis(200)).await?;
    assert_eq!(ctx.snapshot().waiting, 5, "All passengers must keep waiting.");

    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_more_seats_than_passengers() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    ctx.spawn_passengers(4);
    ctx.await_waiting(4).await?;

    let train = ctx.arrive(10);
    util::board(&ctx, 4).await?;
    let departure = ctx.departure(train).await?;
    assert_eq!(departure.admitted, 4);
    assert_eq!(departure.seats_left(), 6);

    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_second_train_is_turned_away() -> Result<()> {
    let mut ctx = TestCtxBuilder::from_env()?.build().await?;
    ctx.spawn_passengers(2);
    ctx.await_waiting(2).await?;

    let train = ctx.arrive(2);
    ctx.next_admitted().await?;
    assert!(ctx.snapshot().train_present);
    assert_eq!(
        ctx.station.load_train(1),
        Err(StationError::TrainAlreadyPresent),
        "Only one train may load at a time."
    );

    ctx.on_board();
    util::board(&ctx, 1).await?;
    assert_eq!(ctx.departure(train).await?.admitted, 2);

    ctx.finish().await
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn test_trains_are_told_apart() -> Result<()> {
    let ctx = TestCtxBuilder::from_env()?.build().await?;

    let first = ctx.arrive(2);
    let first_id = first.id;
    ctx.departure(first).await?;
    let second = ctx.arrive(2);
    assert_ne!(first_id, second.id, "Trains with equal seats must not share an id.");
    ctx.departure(second).await?;

    ctx.finish().await
}
