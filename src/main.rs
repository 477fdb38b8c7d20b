use std::time::Duration;

use tokio::time::interval;

use weather_dash::{
    config,
    controllers::{alerts_controller::AlertSection, cache_controller::CachePanel},
    services::{api_client::ApiClient, geolocation::StaticLocation, rule_eval},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let api = match ApiClient::from_settings(&settings) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("failed to build API client: {}", e);
            return;
        }
    };
    tracing::info!("using API at {}", api.base_url());

    let mut cache = CachePanel::new(api.clone());
    cache.refresh().await;
    match cache.error() {
        Some(err) => println!("cache: {err}"),
        None => println!("cache: {}", cache.size_label()),
    }

    let locator = StaticLocation::from_settings(&settings);
    let section = AlertSection::mount(api, &locator, &settings).await;

    let state = section.state();
    if let Some(err) = &state.error {
        println!("alerts: {err}");
    }
    for alert in &state.alerts {
        println!(
            "[{}] {}",
            alert.id,
            rule_eval::describe(&alert.conditions, alert.combinator)
        );
    }

    let mut ticker = interval(Duration::from_secs(5));
    let mut seen = section.live_total();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let total = section.live_total();
                if total != seen {
                    seen = total;
                    let state = section.state();
                    tracing::info!(
                        "{} live messages so far, {} active alerts",
                        total,
                        state.alerts.len()
                    );
                }
            }
        }
    }

    tracing::info!("shutting down");
    section.unmount().await;
}
