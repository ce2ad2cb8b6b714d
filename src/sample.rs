//! Demonstration tasks for the explicit "load sample data" action.

use chrono::{Days, NaiveDate};

use crate::task::{Category, NewTask};

/// One task per category, due over the coming week starting at `today`.
pub fn sample_tasks(today: NaiveDate) -> Vec<NewTask> {
    let day = |n: u64| today.checked_add_days(Days::new(n)).unwrap_or(today);
    vec![
        NewTask::new("Send weekly report", Category::Work, day(1))
            .with_description("Numbers from the dashboard, two paragraphs max"),
        NewTask::new("Call the dentist", Category::Personal, day(3)),
        NewTask::new("Buy milk", Category::Shopping, today),
        NewTask::new("Water the plants", Category::Other, day(7)),
    ]
}
