//! Data shaping for the board, weekly and daily views.

use chrono::{Datelike, Days, NaiveDate, Timelike};
use shared::{Tag, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    Board,
    Weekly,
    Daily,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Board, ViewMode::Weekly, ViewMode::Daily];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Board => "board",
            ViewMode::Weekly => "weekly",
            ViewMode::Daily => "daily",
        }
    }
}

/// The seven days, Sunday first, of the week containing `date`, or `None`
/// when that week runs past either end of the calendar.
pub fn week_of(date: NaiveDate) -> Option<[NaiveDate; 7]> {
    let start =
        date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))?;
    start.checked_add_days(Days::new(6))?;
    Some(std::array::from_fn(|i| start + Days::new(i as u64)))
}

/// Tasks on `date`, earliest first.
pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    let mut day: Vec<&Task> = tasks.iter().filter(|t| t.date == date).collect();
    day.sort_by_key(|t| t.time);
    day
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourSlot<'a> {
    pub hour: u32,
    pub tasks: Vec<&'a Task>,
}

impl HourSlot<'_> {
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }
}

/// All 24 hours of `date`, each with the tasks starting in that hour.
pub fn hour_slots(tasks: &[Task], date: NaiveDate) -> Vec<HourSlot<'_>> {
    let day = tasks_on(tasks, date);
    (0..24)
        .map(|hour| HourSlot {
            hour,
            tasks: day.iter().copied().filter(|t| t.time.hour() == hour).collect(),
        })
        .collect()
}

/// Tasks grouped by tag in `Tag::ALL` order. Empty groups are kept.
pub fn group_by_tag(tasks: &[Task]) -> Vec<(Tag, Vec<&Task>)> {
    Tag::ALL
        .into_iter()
        .map(|tag| (tag, tasks.iter().filter(|t| t.tag == tag).collect()))
        .collect()
}
