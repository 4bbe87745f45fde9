//! View selection: which part of the UI is active and what it shows.
//!
//! The active view is a closed variant so that, for example, a form can never
//! carry a stale list filter. [`derive_screen`] turns the view state and the
//! task collection into the content the presentation layer renders.

use clap::ValueEnum;
use tracing::debug;

use crate::task::{Task, TaskId};

/// Filter applied by the list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFilter {
    All,
    Pending,
    Completed,
}

impl ListFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Pending => !task.completed,
            ListFilter::Completed => task.completed,
        }
    }

    /// Matching tasks in their original order.
    pub fn apply(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

/// Entries of the navigation menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Add,
    All,
    Pending,
    Completed,
    Stats,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Add,
        MenuItem::All,
        MenuItem::Pending,
        MenuItem::Completed,
        MenuItem::Stats,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Add => "New Task",
            MenuItem::All => "All Tasks",
            MenuItem::Pending => "Pending",
            MenuItem::Completed => "Completed",
            MenuItem::Stats => "Statistics",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MenuItem::Add => "Add a new task",
            MenuItem::All => "Show every task",
            MenuItem::Pending => "Tasks still to do",
            MenuItem::Completed => "Tasks already done",
            MenuItem::Stats => "Counts and progress",
        }
    }

    pub fn index(self) -> usize {
        MenuItem::ALL.iter().position(|&m| m == self).unwrap_or(0)
    }

    /// Next or previous menu entry, wrapping around.
    pub fn cycle(self, forward: bool) -> MenuItem {
        let len = MenuItem::ALL.len();
        let idx = self.index();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        MenuItem::ALL[next]
    }
}

impl From<ListFilter> for MenuItem {
    fn from(filter: ListFilter) -> Self {
        match filter {
            ListFilter::All => MenuItem::All,
            ListFilter::Pending => MenuItem::Pending,
            ListFilter::Completed => MenuItem::Completed,
        }
    }
}

/// The single thing the UI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    List(ListFilter),
    Form { editing: Option<TaskId> },
    Stats,
}

impl ActiveView {
    /// Menu entry highlighted for this view.
    pub fn menu_item(self) -> MenuItem {
        match self {
            ActiveView::List(filter) => filter.into(),
            ActiveView::Form { .. } => MenuItem::Add,
            ActiveView::Stats => MenuItem::Stats,
        }
    }

    /// One-line heading shown under the application title.
    pub fn subtitle(self) -> &'static str {
        match self {
            ActiveView::List(ListFilter::All) => "Manage all of your tasks here",
            ActiveView::List(ListFilter::Pending) => "Tasks waiting to be completed",
            ActiveView::List(ListFilter::Completed) => "Tasks you have completed",
            ActiveView::Stats => "Task statistics",
            ActiveView::Form { .. } => "Add a new task or edit an existing one",
        }
    }

    /// Short badge text for the header. `visible` is the number of listed tasks.
    pub fn badge(self, visible: usize) -> String {
        match self {
            ActiveView::Form { editing: Some(_) } => "Editing".to_string(),
            ActiveView::Form { editing: None } => "New task".to_string(),
            ActiveView::Stats => "Summary".to_string(),
            ActiveView::List(_) if visible == 1 => "1 task".to_string(),
            ActiveView::List(_) => format!("{visible} tasks"),
        }
    }
}

/// Active view plus the list filter to come back to after a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    active: ActiveView,
    last_list: ListFilter,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            active: ActiveView::List(ListFilter::All),
            last_list: ListFilter::All,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ActiveView {
        self.active
    }

    pub fn last_list(&self) -> ListFilter {
        self.last_list
    }

    /// Task currently open in the form, if any.
    pub fn editing(&self) -> Option<TaskId> {
        match self.active {
            ActiveView::Form { editing } => editing,
            _ => None,
        }
    }

    /// Navigate from the menu. Leaving the form abandons an edit in progress.
    pub fn select(&mut self, item: MenuItem) {
        self.active = match item {
            MenuItem::Add => ActiveView::Form { editing: None },
            MenuItem::All => self.show_list(ListFilter::All),
            MenuItem::Pending => self.show_list(ListFilter::Pending),
            MenuItem::Completed => self.show_list(ListFilter::Completed),
            MenuItem::Stats => ActiveView::Stats,
        };
        debug!(view = ?self.active, "view selected");
    }

    fn show_list(&mut self, filter: ListFilter) -> ActiveView {
        self.last_list = filter;
        ActiveView::List(filter)
    }

    /// Open the form on an existing task.
    pub fn begin_edit(&mut self, id: TaskId) {
        self.active = ActiveView::Form { editing: Some(id) };
        debug!(id, "editing task");
    }

    /// Leave the form and return to the last list filter.
    pub fn finish_edit(&mut self) {
        self.active = ActiveView::List(self.last_list);
    }
}

/// Summary numbers for the statistics view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Completed share in whole percent, rounded half up; 0 for no tasks.
    pub percent: u8,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let percent = if total == 0 {
            0
        } else {
            ((completed * 200 + total) / (total * 2)) as u8
        };
        Stats {
            total,
            completed,
            pending: total - completed,
            percent,
        }
    }
}

/// What the content area shows for the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    List {
        filter: ListFilter,
        tasks: Vec<&'a Task>,
    },
    Form {
        editing: Option<&'a Task>,
    },
    Stats(Stats),
}

/// Derive the visible content from the view state and the full collection.
pub fn derive_screen<'a>(view: &ViewState, tasks: &'a [Task]) -> Screen<'a> {
    match view.active() {
        ActiveView::List(filter) => Screen::List {
            filter,
            tasks: filter.apply(tasks),
        },
        ActiveView::Form { editing } => Screen::Form {
            editing: editing.and_then(|id| tasks.iter().find(|t| t.id == id)),
        },
        ActiveView::Stats => Screen::Stats(Stats::from_tasks(tasks)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: TaskId, completed: bool) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: String::new(),
            completed,
            created_at: Utc::now(),
        }
    }

    fn mixed() -> Vec<Task> {
        vec![
            task(1, false),
            task(2, true),
            task(3, false),
            task(4, true),
            task(5, false),
        ]
    }

    #[test]
    fn pending_and_completed_partition_all() {
        let tasks = mixed();
        let all = ListFilter::All.apply(&tasks);
        let pending = ListFilter::Pending.apply(&tasks);
        let completed = ListFilter::Completed.apply(&tasks);

        assert_eq!(all.len(), tasks.len());
        assert_eq!(pending.len() + completed.len(), all.len());
        for t in &all {
            let in_pending = pending.iter().any(|p| p.id == t.id);
            let in_completed = completed.iter().any(|c| c.id == t.id);
            assert!(in_pending ^ in_completed, "task {} must be in exactly one list", t.id);
        }
    }

    #[test]
    fn filters_keep_original_order() {
        let tasks = mixed();
        let ids: Vec<TaskId> = ListFilter::Pending.apply(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn completion_percentage() {
        assert_eq!(Stats::from_tasks(&[]).percent, 0);

        let third = vec![task(1, true), task(2, false), task(3, false)];
        let stats = Stats::from_tasks(&third);
        assert_eq!(stats, Stats { total: 3, completed: 1, pending: 2, percent: 33 });

        let two_thirds = vec![task(1, true), task(2, true), task(3, false)];
        assert_eq!(Stats::from_tasks(&two_thirds).percent, 67);

        let done = vec![task(1, true), task(2, true)];
        assert_eq!(Stats::from_tasks(&done).percent, 100);
    }

    #[test]
    fn half_percent_rounds_up() {
        // 1 of 8 = 12.5%
        let mut tasks: Vec<Task> = (1..=8).map(|i| task(i, false)).collect();
        tasks[0].completed = true;
        assert_eq!(Stats::from_tasks(&tasks).percent, 13);
    }

    #[test]
    fn navigating_lists_updates_last_list() {
        let mut view = ViewState::new();
        view.select(MenuItem::Pending);
        assert_eq!(view.active(), ActiveView::List(ListFilter::Pending));
        assert_eq!(view.last_list(), ListFilter::Pending);

        view.select(MenuItem::Stats);
        assert_eq!(view.active(), ActiveView::Stats);
        assert_eq!(view.last_list(), ListFilter::Pending);

        view.select(MenuItem::Add);
        assert_eq!(view.active(), ActiveView::Form { editing: None });
        assert_eq!(view.last_list(), ListFilter::Pending);
    }

    #[test]
    fn edit_returns_to_last_list_not_all() {
        let mut view = ViewState::new();
        view.select(MenuItem::Completed);
        view.begin_edit(4);
        assert_eq!(view.editing(), Some(4));
        assert_eq!(view.active().menu_item(), MenuItem::Add);

        view.finish_edit();
        assert_eq!(view.active(), ActiveView::List(ListFilter::Completed));
        assert_eq!(view.editing(), None);
    }

    #[test]
    fn leaving_the_form_drops_the_edit() {
        let mut view = ViewState::new();
        view.begin_edit(2);
        view.select(MenuItem::Stats);
        assert_eq!(view.editing(), None);
    }

    #[test]
    fn screen_follows_the_active_view() {
        let tasks = mixed();
        let mut view = ViewState::new();

        match derive_screen(&view, &tasks) {
            Screen::List { filter, tasks: shown } => {
                assert_eq!(filter, ListFilter::All);
                assert_eq!(shown.len(), 5);
            }
            other => panic!("expected list, got {other:?}"),
        }

        view.begin_edit(3);
        assert_eq!(derive_screen(&view, &tasks), Screen::Form { editing: Some(&tasks[2]) });

        view.select(MenuItem::Add);
        assert_eq!(derive_screen(&view, &tasks), Screen::Form { editing: None });

        view.select(MenuItem::Stats);
        assert!(matches!(derive_screen(&view, &tasks), Screen::Stats(s) if s.total == 5 && s.completed == 2));
    }

    #[test]
    fn badges_and_menu_cycle() {
        assert_eq!(ActiveView::List(ListFilter::All).badge(3), "3 tasks");
        assert_eq!(ActiveView::List(ListFilter::Pending).badge(1), "1 task");
        assert_eq!(ActiveView::Form { editing: Some(1) }.badge(0), "Editing");
        assert_eq!(ActiveView::Form { editing: None }.badge(0), "New task");
        assert_eq!(ActiveView::Stats.badge(9), "Summary");

        assert_eq!(MenuItem::Stats.cycle(true), MenuItem::Add);
        assert_eq!(MenuItem::Add.cycle(false), MenuItem::Stats);
        assert_eq!(MenuItem::All.cycle(true), MenuItem::Pending);
    }
}
