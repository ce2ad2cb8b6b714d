//! Terminal UI state and key handling.
//!
//! Kept free of any terminal I/O so every key binding can be exercised in
//! tests; `ui` draws it and feeds it events.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::store::TaskStore;
use crate::task::{parse_due_date, Category, CategoryFilter, NewTask, Task, TaskId};
use crate::task_list::TaskList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Category,
    Due,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Category,
            FormField::Category => FormField::Due,
            FormField::Due => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Due,
            FormField::Category => FormField::Title,
            FormField::Due => FormField::Category,
        }
    }
}

/// The "new task" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub title: String,
    pub category: Category,
    /// Raw text; blank means today.
    pub due: String,
    pub field: FormField,
    pub error: Option<String>,
}

impl AddForm {
    fn new(category: Category) -> Self {
        Self {
            title: String::new(),
            category,
            due: String::new(),
            field: FormField::Title,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Adding(AddForm),
}

pub struct App<S: TaskStore> {
    pub list: TaskList<S>,
    /// Index into the derived view.
    pub selected: usize,
    pub mode: Mode,
    /// One-line message for the status bar.
    pub status: Option<String>,
    pub should_quit: bool,
    today: NaiveDate,
}

impl<S: TaskStore> App<S> {
    pub fn new(list: TaskList<S>, today: NaiveDate) -> Self {
        Self {
            list,
            selected: 0,
            mode: Mode::Browse,
            status: None,
            should_quit: false,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.list.derived_view().get(self.selected).copied()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if matches!(self.mode, Mode::Adding(_)) {
            self.handle_form_key(key);
        } else {
            self.handle_browse_key(key);
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.list.derived_view().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('f') => {
                let filter = self.list.cycle_filter();
                self.selected = 0;
                self.status = Some(format!("Showing {}", filter.label()));
            }
            KeyCode::Char('s') => {
                let enabled = !self.list.sort_by_due_date();
                self.list.set_sort_by_due_date(enabled);
                let message = if enabled {
                    "Sorted by due date"
                } else {
                    "Insertion order"
                };
                self.status = Some(message.to_string());
            }
            KeyCode::Char('a') => {
                let category = match self.list.filter() {
                    CategoryFilter::Only(category) => category,
                    CategoryFilter::All => Category::Other,
                };
                self.mode = Mode::Adding(AddForm::new(category));
            }
            KeyCode::Char('S') => match self.list.load_sample_data(self.today) {
                Ok(added) => self.status = Some(format!("Added {added} sample tasks")),
                Err(err) => self.status = Some(format!("Save failed: {err}")),
            },
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Mode::Adding(form) = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                return;
            }
            KeyCode::Enter => {
                self.submit_form();
                return;
            }
            KeyCode::Tab => form.field = form.field.next(),
            KeyCode::BackTab => form.field = form.field.prev(),
            KeyCode::Left if form.field == FormField::Category => {
                form.category = form.category.prev();
            }
            KeyCode::Right if form.field == FormField::Category => {
                form.category = form.category.next();
            }
            KeyCode::Backspace => match form.field {
                FormField::Title => {
                    form.title.pop();
                }
                FormField::Due => {
                    form.due.pop();
                }
                FormField::Category => {}
            },
            KeyCode::Char(c) => match form.field {
                FormField::Title => form.title.push(c),
                FormField::Due => form.due.push(c),
                FormField::Category => {}
            },
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let Mode::Adding(form) = &mut self.mode else {
            return;
        };
        let due_date = if form.due.trim().is_empty() {
            self.today
        } else {
            match parse_due_date(&form.due) {
                Ok(date) => date,
                Err(err) => {
                    form.error = Some(err.to_string());
                    form.field = FormField::Due;
                    return;
                }
            }
        };
        let draft = NewTask::new(form.title.clone(), form.category, due_date);
        match self.list.add_task(draft) {
            Ok(Some(id)) => {
                self.mode = Mode::Browse;
                self.select(&id);
                self.status = Some("Task added".to_string());
            }
            Ok(None) => {
                form.error = Some("Title is required".to_string());
                form.field = FormField::Title;
            }
            Err(err) => form.error = Some(format!("Save failed: {err}")),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        if let Err(err) = self.list.toggle_completion(&id) {
            self.status = Some(format!("Save failed: {err}"));
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        match self.list.delete_task(&id) {
            Ok(Some(task)) => {
                self.status = Some(format!("Deleted {}", task.title));
                let len = self.list.derived_view().len();
                self.selected = self.selected.min(len.saturating_sub(1));
            }
            Ok(None) => {}
            Err(err) => self.status = Some(format!("Save failed: {err}")),
        }
    }

    /// Moves the cursor onto `id` if it is visible in the current view.
    fn select(&mut self, id: &TaskId) {
        if let Some(index) = self.list.derived_view().iter().position(|t| &t.id == id) {
            self.selected = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: TaskStore>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn app() -> App<MemoryStore> {
        let list = TaskList::open(MemoryStore::new()).unwrap();
        App::new(list, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn add_form_creates_task() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Left)); // other -> shopping
        app.handle_key_event(key(KeyCode::Tab));
        type_text(&mut app, "2024-01-05");
        app.handle_key_event(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Browse);
        let task = app.selected_task().unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.category, Category::Shopping);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn blank_due_date_means_today() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, "x");
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(app.selected_task().unwrap().due_date, app.today());
    }

    #[test]
    fn bad_due_date_keeps_form_open() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, "x");
        app.handle_key_event(key(KeyCode::BackTab));
        type_text(&mut app, "soon");
        app.handle_key_event(key(KeyCode::Enter));

        let Mode::Adding(form) = &app.mode else {
            panic!("form closed");
        };
        assert!(form.error.is_some());
        assert!(app.list.is_empty());
    }

    #[test]
    fn empty_title_is_refused() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('a')));
        app.handle_key_event(key(KeyCode::Enter));
        assert!(matches!(app.mode, Mode::Adding(_)));
        assert!(app.list.is_empty());
    }

    #[test]
    fn quit_keys_are_plain_text_inside_the_form() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('a')));
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        app.handle_key_event(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Browse);
        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn toggle_and_delete_act_on_selection() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('S')));
        let first = app.selected_task().unwrap().id.clone();

        app.handle_key_event(key(KeyCode::Char(' ')));
        assert!(app.list.get(&first).unwrap().completed);

        let before = app.list.tasks().len();
        app.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(app.list.tasks().len(), before - 1);
        assert!(app.list.get(&first).is_none());
    }

    #[test]
    fn sample_data_is_due_from_the_app_date() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('S')));
        let today = app.today();
        assert!(app.list.tasks().iter().any(|t| t.due_date == today));
        assert!(app.list.tasks().iter().all(|t| t.due_date >= today));
    }

    #[test]
    fn save_failure_lands_on_status_line() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('S')));
        app.list.store().fail_saves(true);
        app.handle_key_event(key(KeyCode::Char(' ')));
        assert!(app.status.as_deref().unwrap().starts_with("Save failed"));
        assert!(!app.selected_task().unwrap().completed);
    }

    #[test]
    fn filter_key_cycles_and_resets_cursor() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Char('S')));
        app.handle_key_event(key(KeyCode::Down));
        app.handle_key_event(key(KeyCode::Char('f')));
        assert_eq!(app.list.filter(), CategoryFilter::Only(Category::Work));
        assert_eq!(app.selected, 0);
        assert!(app
            .list
            .derived_view()
            .iter()
            .all(|t| t.category == Category::Work));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Up));
        assert_eq!(app.selected, 0);
        app.handle_key_event(key(KeyCode::Down));
        assert_eq!(app.selected, 0);
    }
}
