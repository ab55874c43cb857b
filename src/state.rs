use crate::aggregation::{AveragingWindow, AxisRange};
use crate::models::Person;
use crate::reminder::ReminderScheduler;
use crate::storage::WeightLog;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Per-person chart and statistics settings. Kept in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewSettings {
    pub window: AveragingWindow,
    pub axis: AxisRange,
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<WeightLog>>,
    pub views: Arc<Mutex<HashMap<Person, ViewSettings>>>,
    pub reminders: Arc<ReminderScheduler>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: WeightLog, reminders: ReminderScheduler) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            views: Arc::new(Mutex::new(HashMap::new())),
            reminders: Arc::new(reminders),
        }
    }

    pub async fn view(&self, person: Person) -> ViewSettings {
        self.views
            .lock()
            .await
            .get(&person)
            .copied()
            .unwrap_or_default()
    }

    pub async fn update_view<F>(&self, person: Person, update: F) -> ViewSettings
    where
        F: FnOnce(&mut ViewSettings),
    {
        let mut views = self.views.lock().await;
        let view = views.entry(person).or_default();
        update(view);
        *view
    }
}
