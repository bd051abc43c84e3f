use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::errors::StoreResult;
use crate::models::{Priority, Task, TaskFields, TaskSelector, TaskStatus};
use super::flat_file;

pub const TASK_HEADER: [&str; 6] = ["Id", "Title", "Priority", "Entry Date", "Exit Date", "Status"];

// "Id" is optional on read so files written before ids existed still load.
const REQUIRED_COLUMNS: [&str; 5] = ["Title", "Priority", "Entry Date", "Exit Date", "Status"];

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(rename = "Id", default)]
    id: Option<Uuid>,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Priority")]
    priority: Priority,
    #[serde(rename = "Entry Date", with = "csv_date")]
    entry_date: NaiveDate,
    #[serde(rename = "Exit Date", with = "csv_date")]
    exit_date: NaiveDate,
    #[serde(rename = "Status")]
    status: TaskStatus,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: Some(task.id),
            title: task.title.clone(),
            priority: task.priority,
            entry_date: task.entry_date,
            exit_date: task.exit_date,
            status: task.status,
        }
    }
}

mod csv_date {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    // Older files stored full timestamps ("2024-01-01 00:00:00").
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
            .map_err(|_| serde::de::Error::custom(format!("invalid date '{}'", raw)))
    }
}

/// Flat-file task table. Every mutation loads the table, changes it in
/// memory and rewrites the whole file.
#[derive(Clone)]
pub struct TaskStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn load_tasks(&self) -> StoreResult<Vec<Task>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_all()
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_all(tasks)
    }

    pub fn add_task(
        &self,
        title: String,
        priority: Priority,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
    ) -> StoreResult<Task> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tasks = self.read_all()?;
        let task = Task::new(title, priority, entry_date, exit_date);
        tasks.push(task.clone());
        self.write_all(&tasks)?;

        tracing::info!("Added task {} ('{}')", task.id, task.title);
        Ok(task)
    }

    /// Returns the updated task, or `None` when nothing matches `selector`.
    pub fn update_task(&self, selector: &TaskSelector, fields: TaskFields) -> StoreResult<Option<Task>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tasks = self.read_all()?;
        let Some(idx) = selector.position(&tasks) else {
            tracing::warn!("Update skipped, no task with {}", selector);
            return Ok(None);
        };

        tasks[idx].apply(fields);
        let updated = tasks[idx].clone();
        self.write_all(&tasks)?;

        tracing::info!("Updated task {}", updated.id);
        Ok(Some(updated))
    }

    /// Returns the removed task, or `None` when nothing matches `selector`.
    pub fn delete_task(&self, selector: &TaskSelector) -> StoreResult<Option<Task>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut tasks = self.read_all()?;
        let Some(idx) = selector.position(&tasks) else {
            tracing::warn!("Delete skipped, no task with {}", selector);
            return Ok(None);
        };

        let removed = tasks.remove(idx);
        self.write_all(&tasks)?;

        tracing::info!("Deleted task {}", removed.id);
        Ok(Some(removed))
    }

    fn read_all(&self) -> StoreResult<Vec<Task>> {
        let Some(records) = flat_file::read_records::<TaskRecord>(&self.path, &REQUIRED_COLUMNS)? else {
            return Ok(Vec::new());
        };

        let mut assigned = 0;
        let tasks: Vec<Task> = records
            .into_iter()
            .map(|record| Task {
                id: record.id.unwrap_or_else(|| {
                    assigned += 1;
                    Uuid::new_v4()
                }),
                title: record.title,
                priority: record.priority,
                entry_date: record.entry_date,
                exit_date: record.exit_date,
                status: record.status,
            })
            .collect();

        // Persist freshly assigned ids right away so they stay stable.
        if assigned > 0 {
            tracing::info!("Assigned ids to {} tasks in {}", assigned, self.path.display());
            self.write_all(&tasks)?;
        }

        Ok(tasks)
    }

    fn write_all(&self, tasks: &[Task]) -> StoreResult<()> {
        let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
        flat_file::write_records(&self.path, &TASK_HEADER, &records)
    }
}
