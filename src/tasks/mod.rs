//! Background scheduled tasks for the application.
//!
//! Enquiry aging, intake closing and the SSE keep-alive all run here.
//! Call `spawn_all` once during startup to launch them.

use crate::services::{EnquiryNotifier, EnquiryService, IntakeService};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn all background tasks.
///
/// Each task detaches via `tokio::spawn` and logs its own failures; a failed
/// sweep is retried on the next tick.
pub fn spawn_all(
    enquiry_service: Arc<EnquiryService>,
    intake_service: Arc<IntakeService>,
    notifier: EnquiryNotifier,
) {
    // 超过 24 小时未处理的新咨询转为 pending（每小时）
    tokio::spawn(async move {
        loop {
            match enquiry_service.age_stale(Utc::now()).await {
                Ok(ids) if !ids.is_empty() => {
                    log::info!("Enquiries moved to pending: {}", ids.len())
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to age stale enquiries: {e:?}"),
            }
            tokio::time::sleep(SWEEP_INTERVAL).await;
        }
    });

    // 截止日期已过的招生批次关闭（每小时）
    tokio::spawn(async move {
        loop {
            match intake_service.close_elapsed(Utc::now()).await {
                Ok(n) if n > 0 => log::info!("Intakes closed after deadline: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to close elapsed intakes: {e:?}"),
            }
            tokio::time::sleep(SWEEP_INTERVAL).await;
        }
    });

    // SSE 保活
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            notifier.keep_alive().await;
        }
    });
}
