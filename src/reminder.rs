//! Daily "log your weight" reminder.
//!
//! `ReminderScheduler` owns the policy (one reminder under a fixed identifier,
//! permission first) and talks to a `NotificationCenter`, which does the
//! actual delivery. `LocalNotificationCenter` delivers in-process through the
//! log.

use crate::models::ReminderResponse;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

pub const DAILY_REMINDER_ID: &str = "daily_weight_reminder";
const REMINDER_TITLE: &str = "Weight reminder";
const REMINDER_BODY: &str = "Don't forget to log today's weight.";

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("invalid reminder time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("notification permission has not been granted")]
    PermissionDenied,

    #[error("failed to schedule reminder: {0}")]
    Schedule(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    Granted,
    Denied,
}

impl PermissionDecision {
    pub fn is_granted(self) -> bool {
        self == PermissionDecision::Granted
    }
}

/// Local time of day at which the daily reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTime {
    pub hour: u32,
    pub minute: u32,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ReminderError> {
        if hour < 24 && minute < 60 {
            Ok(Self { hour, minute })
        } else {
            Err(ReminderError::InvalidTime { hour, minute })
        }
    }
}

impl Default for ReminderTime {
    fn default() -> Self {
        Self { hour: 22, minute: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub time: ReminderTime,
}

/// Delivery backend for reminders.
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Asks for permission to deliver. Resolves exactly once.
    async fn request_authorization(&self) -> PermissionDecision;

    async fn authorization_status(&self) -> PermissionDecision;

    /// Registers a repeating daily request. A request with the same
    /// identifier replaces the existing one.
    async fn add(&self, request: ReminderRequest) -> Result<(), ReminderError>;

    async fn remove_pending(&self, identifier: &str);

    async fn pending(&self) -> Vec<ReminderRequest>;
}

pub struct ReminderScheduler {
    center: Arc<dyn NotificationCenter>,
    time: ReminderTime,
}

impl ReminderScheduler {
    pub fn new(center: Arc<dyn NotificationCenter>, time: ReminderTime) -> Self {
        Self { center, time }
    }

    pub async fn request_permission(&self) -> PermissionDecision {
        let decision = self.center.request_authorization().await;
        info!(?decision, "notification permission resolved");
        decision
    }

    pub async fn permission_status(&self) -> PermissionDecision {
        self.center.authorization_status().await
    }

    /// Replaces any existing daily reminder with one at `hour:minute`.
    pub async fn schedule_daily(&self, hour: u32, minute: u32) -> Result<(), ReminderError> {
        let time = ReminderTime::new(hour, minute)?;
        self.center
            .add(ReminderRequest {
                identifier: DAILY_REMINDER_ID.to_string(),
                title: REMINDER_TITLE.to_string(),
                body: REMINDER_BODY.to_string(),
                time,
            })
            .await?;
        info!(hour, minute, "daily reminder scheduled");
        Ok(())
    }

    pub async fn cancel_daily(&self) {
        self.center.remove_pending(DAILY_REMINDER_ID).await;
    }

    pub async fn is_scheduled(&self) -> bool {
        self.center
            .pending()
            .await
            .iter()
            .any(|request| request.identifier == DAILY_REMINDER_ID)
    }

    /// Requests permission and, when granted, schedules the reminder at the
    /// configured time. A denial leaves nothing scheduled.
    pub async fn enable(&self) -> Result<PermissionDecision, ReminderError> {
        let decision = self.request_permission().await;
        match decision {
            PermissionDecision::Granted => {
                self.schedule_daily(self.time.hour, self.time.minute).await?;
            }
            PermissionDecision::Denied => {
                warn!("notification permission denied, reminder stays off");
                self.cancel_daily().await;
            }
        }
        Ok(decision)
    }

    pub async fn status(&self) -> ReminderResponse {
        ReminderResponse {
            enabled: self.is_scheduled().await,
            permission_granted: self.permission_status().await.is_granted(),
            hour: self.time.hour,
            minute: self.time.minute,
        }
    }
}

/// Next time strictly after `now` at which a daily `hour:minute` reminder fires.
pub fn next_fire(now: NaiveDateTime, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let today = now.date().and_hms_opt(hour, minute, 0)?;
    if today > now {
        return Some(today);
    }
    now.date().succ_opt()?.and_hms_opt(hour, minute, 0)
}

/// Resolves the next daily `hour:minute` in the time zone of `now`. A wall
/// time skipped by a DST change fires an hour later. A repeated wall time
/// fires at its first occurrence still ahead of `now`.
pub fn next_fire_in_zone<Tz: TimeZone>(
    now: &DateTime<Tz>,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Tz>> {
    let zone = now.timezone();
    let mut after = now.naive_local();
    for _ in 0..3 {
        let candidate = next_fire(after, hour, minute)?;
        let resolved = match zone.from_local_datetime(&candidate) {
            LocalResult::Single(at) => Some(at),
            LocalResult::Ambiguous(earliest, latest) => {
                Some(if earliest > *now { earliest } else { latest })
            }
            LocalResult::None => zone
                .from_local_datetime(&(candidate + Duration::hours(1)))
                .earliest(),
        };
        match resolved {
            Some(at) if at > *now => return Some(at),
            _ => after = candidate,
        }
    }
    None
}

struct PendingReminder {
    request: ReminderRequest,
    task: JoinHandle<()>,
}

/// Delivers reminders from a background task in this process. Permission is
/// decided by `policy`, fixed at construction.
pub struct LocalNotificationCenter {
    policy: PermissionDecision,
    authorized: Mutex<Option<PermissionDecision>>,
    pending: Mutex<HashMap<String, PendingReminder>>,
}

impl LocalNotificationCenter {
    pub fn new(policy: PermissionDecision) -> Self {
        Self {
            policy,
            authorized: Mutex::new(None),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl Drop for LocalNotificationCenter {
    fn drop(&mut self) {
        for (_, reminder) in self.pending.get_mut().drain() {
            reminder.task.abort();
        }
    }
}

#[async_trait]
impl NotificationCenter for LocalNotificationCenter {
    async fn request_authorization(&self) -> PermissionDecision {
        let mut authorized = self.authorized.lock().await;
        *authorized.get_or_insert(self.policy)
    }

    async fn authorization_status(&self) -> PermissionDecision {
        self.authorized
            .lock()
            .await
            .unwrap_or(PermissionDecision::Denied)
    }

    async fn add(&self, request: ReminderRequest) -> Result<(), ReminderError> {
        if !self.authorization_status().await.is_granted() {
            return Err(ReminderError::PermissionDenied);
        }
        if next_fire_in_zone(&Local::now(), request.time.hour, request.time.minute).is_none() {
            return Err(ReminderError::Schedule(format!(
                "no upcoming time for {:02}:{:02}",
                request.time.hour, request.time.minute
            )));
        }

        let task = tokio::spawn(deliver_daily(request.clone()));
        let previous = self.pending.lock().await.insert(
            request.identifier.clone(),
            PendingReminder { request, task },
        );
        if let Some(previous) = previous {
            previous.task.abort();
        }
        Ok(())
    }

    async fn remove_pending(&self, identifier: &str) {
        if let Some(reminder) = self.pending.lock().await.remove(identifier) {
            reminder.task.abort();
            debug!(identifier, "pending reminder removed");
        }
    }

    async fn pending(&self) -> Vec<ReminderRequest> {
        self.pending
            .lock()
            .await
            .values()
            .map(|reminder| reminder.request.clone())
            .collect()
    }
}

async fn deliver_daily(request: ReminderRequest) {
    loop {
        let now = Local::now();
        let Some(next) = next_fire_in_zone(&now, request.time.hour, request.time.minute) else {
            warn!(identifier = %request.identifier, "reminder has no upcoming fire time");
            return;
        };
        let wait = next.signed_duration_since(now).to_std().unwrap_or_default();
        debug!(identifier = %request.identifier, %next, "waiting for reminder");
        tokio::time::sleep(wait).await;

        info!(
            identifier = %request.identifier,
            title = %request.title,
            body = %request.body,
            "reminder due"
        );
    }
}
