//! Periodic background refresh of one location.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::aggregator::WeatherAggregator;
use crate::error::AggregateError;
use crate::types::AggregatedWeather;

pub type RefreshResult = Result<AggregatedWeather, AggregateError>;

/// Aggregate `location` immediately and then every `every`, sending each
/// envelope on the returned channel.
///
/// A zero `every` disables refreshing: the task aggregates once, sends the
/// result and ends. Otherwise it stops when `token` is cancelled or the
/// receiver is dropped. An in-flight aggregation is cancelled along with
/// the task.
pub fn spawn_refresh(
    aggregator: WeatherAggregator,
    location: String,
    every: Duration,
    token: CancellationToken,
) -> (JoinHandle<()>, mpsc::Receiver<RefreshResult>) {
    let (tx, rx) = mpsc::channel(4);

    let handle = tokio::spawn(async move {
        let mut ticker = (!every.is_zero()).then(|| {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        if ticker.is_none() {
            tracing::info!(%location, "Refresh disabled, fetching once");
        }

        loop {
            match ticker.as_mut() {
                Some(ticker) => {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {}
                    }
                }
                None if token.is_cancelled() => break,
                None => {}
            }

            tracing::debug!(%location, "Refreshing weather");
            let result = aggregator
                .get_complete_weather_data_with_cancel(&location, &token)
                .await;

            if token.is_cancelled() {
                break;
            }
            if tx.send(result).await.is_err() {
                tracing::debug!("Refresh receiver dropped, stopping");
                break;
            }
            if ticker.is_none() {
                break;
            }
        }

        tracing::debug!(%location, "Weather refresh stopped");
    });

    (handle, rx)
}
