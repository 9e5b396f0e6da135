use std::collections::HashSet;

use eyre::{eyre, Result};
use train_station_tests::TestCtx;
use uuid::Uuid;

/// Collects `n` admitted passengers, confirms each of them and checks that no
/// passenger was admitted twice.
#[allow(unused)]
pub async fn board(ctx: &TestCtx, n: u32) -> Result<HashSet<Uuid>> {
    let mut boarded = HashSet::new();
    for _ in 0..n {
        let id = ctx.next_admitted().await?;
        if !boarded.insert(id) {
            return Err(eyre!("Passenger {id} was admitted twice."));
        }
        ctx.on_board();
    }
    Ok(boarded)
}
