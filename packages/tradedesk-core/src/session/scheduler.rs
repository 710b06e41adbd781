//! Scheduled price feed.
//!
//! A background task ticks the shared session at a fixed cadence and
//! publishes each new asset snapshot. The task is controlled through a
//! command channel and can be paused, resumed and stopped.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::state::SharedSession;
use crate::types::Asset;
use crate::{Error, Result};

/// Commands accepted by the feed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    /// Stop ticking until resumed.
    Pause,
    /// Continue ticking; the next tick is one full interval away.
    Resume,
    /// End the task.
    Stop,
}

/// Asset snapshot published after a tick.
#[derive(Debug, Clone)]
pub struct MarketUpdate {
    /// Number of ticks applied so far (0 before the first tick)
    pub sequence: u64,
    pub assets: Arc<Vec<Asset>>,
    pub at: DateTime<Utc>,
}

/// Handle to a running feed task.
#[derive(Debug)]
pub struct FeedHandle {
    commands: mpsc::Sender<FeedCommand>,
    updates: watch::Receiver<MarketUpdate>,
    task: JoinHandle<u64>,
}

impl FeedHandle {
    /// Subscribe to market updates.
    pub fn subscribe(&self) -> watch::Receiver<MarketUpdate> {
        self.updates.clone()
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> MarketUpdate {
        self.updates.borrow().clone()
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(FeedCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(FeedCommand::Resume).await
    }

    /// Stop the task and wait for it, returning the number of ticks applied.
    pub async fn stop(self) -> Result<u64> {
        // The task may already have exited; joining still reports its count.
        let _ = self.commands.send(FeedCommand::Stop).await;
        self.task.await.map_err(|_| Error::FeedStopped)
    }

    async fn send(&self, command: FeedCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::FeedStopped)
    }
}

/// Start ticking `session` every `period`.
///
/// The first tick happens one full period after the call. Must be called
/// from within a tokio runtime. A zero `period` is rejected.
pub fn spawn_price_feed<R>(
    session: SharedSession,
    period: Duration,
    mut rng: R,
) -> Result<FeedHandle>
where
    R: Rng + Send + 'static,
{
    if period.is_zero() {
        return Err(Error::InvalidArgument(
            "feed period must be greater than zero".to_string(),
        ));
    }

    let (command_tx, mut command_rx) = mpsc::channel(16);
    let (update_tx, update_rx) = watch::channel(MarketUpdate {
        sequence: 0,
        assets: Arc::new(session.assets()),
        at: Utc::now(),
    });

    let task = tokio::spawn(async move {
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut paused = false;
        let mut ticks: u64 = 0;

        tracing::info!("Price feed started, ticking every {:?}", period);

        loop {
            tokio::select! {
                biased;

                command = command_rx.recv() => match command {
                    Some(FeedCommand::Pause) => {
                        if !paused {
                            tracing::info!("Price feed paused after {} ticks", ticks);
                        }
                        paused = true;
                    }
                    Some(FeedCommand::Resume) => {
                        if paused {
                            tracing::info!("Price feed resumed");
                            interval.reset();
                        }
                        paused = false;
                    }
                    Some(FeedCommand::Stop) | None => break,
                },

                _ = interval.tick(), if !paused => {
                    let now = Utc::now();
                    let assets = session.advance(&mut rng, now);
                    ticks += 1;
                    update_tx.send_replace(MarketUpdate {
                        sequence: ticks,
                        assets: Arc::new(assets),
                        at: now,
                    });
                }
            }
        }

        tracing::info!("Price feed stopped after {} ticks", ticks);
        ticks
    });

    Ok(FeedHandle {
        commands: command_tx,
        updates: update_rx,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TradingSession;
    use crate::types::{Portfolio, TradeOrder, HISTORY_CAPACITY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shared() -> SharedSession {
        SharedSession::new(TradingSession::seeded(&mut StdRng::seed_from_u64(8)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_schedule() {
        let session = shared();
        let handle = spawn_price_feed(
            session.clone(),
            Duration::from_secs(2),
            StdRng::seed_from_u64(1),
        )
        .unwrap();
        let mut updates = handle.subscribe();

        assert_eq!(handle.latest().sequence, 0);

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().sequence, 1);

        updates.changed().await.unwrap();
        let update = updates.borrow_and_update().clone();
        assert_eq!(update.sequence, 2);
        assert_eq!(*update.assets, session.assets());

        assert_eq!(handle.stop().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume() {
        let handle =
            spawn_price_feed(shared(), Duration::from_secs(2), StdRng::seed_from_u64(1)).unwrap();
        let mut updates = handle.subscribe();

        updates.changed().await.unwrap();
        handle.pause().await.unwrap();

        time::sleep(Duration::from_secs(20)).await;
        assert_eq!(handle.latest().sequence, 1);

        handle.resume().await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().sequence, 2);

        assert_eq!(handle.stop().await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trades_between_ticks() {
        let session = SharedSession::new(TradingSession::from_parts(
            Portfolio::with_cash(1_000.0),
            crate::feed::initial_market(Utc::now(), &mut StdRng::seed_from_u64(3)),
        ));
        let handle = spawn_price_feed(
            session.clone(),
            Duration::from_millis(500),
            StdRng::seed_from_u64(2),
        )
        .unwrap();
        let mut updates = handle.subscribe();

        updates.changed().await.unwrap();
        session.execute(&TradeOrder::buy("WTI", 2.0, 80.0)).unwrap();
        updates.changed().await.unwrap();

        let portfolio = session.portfolio();
        assert_eq!(portfolio.cash, 840.0);
        assert_eq!(portfolio.quantity_of("WTI"), 2.0);

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let session = shared();
        let result = spawn_price_feed(session.clone(), Duration::ZERO, StdRng::seed_from_u64(1));

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(session.assets()[0].history.len(), HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_commands_after_stop_fail() {
        let handle =
            spawn_price_feed(shared(), Duration::from_secs(60), StdRng::seed_from_u64(1)).unwrap();
        let commands = handle.commands.clone();

        assert_eq!(handle.stop().await.unwrap(), 0);
        assert!(commands.send(FeedCommand::Pause).await.is_err());
    }
}
