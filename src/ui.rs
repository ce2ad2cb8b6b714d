use std::io;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::info;

use crate::app::{AddForm, App, FormField, Mode};
use crate::config::Config;
use crate::error::Result;
use crate::logging;
use crate::store::TaskStore;
use crate::task::{Category, CategoryFilter, Task};
use crate::task_list::TaskList;

const HELP: &str = "a add  space toggle  d delete  f filter  s sort  S sample  q quit";

/// Runs the interactive UI until the user quits.
pub fn run<S: TaskStore>(store: S, config: &Config) -> Result<()> {
    let _log_guard = logging::init_file(&config.log.level, &config.log_file());

    let (mut list, backup) = TaskList::open_recovering(store)?;
    list.set_filter(config.default_filter());
    list.set_sort_by_due_date(config.view.sort_by_due_date);

    let mut app = App::new(list, Local::now().date_naive());
    if let Some(backup) = backup {
        app.status = Some(format!("Stored tasks were unreadable; copy kept at {backup}"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("ui started");

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("ui stopped");

    result.map_err(Into::into)
}

pub fn run_app<B: Backend, S: TaskStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key_event(key);
            }
        }
    }
    Ok(())
}

pub fn draw<S: TaskStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_counts(f, app, chunks[0]);
    draw_filters(f, app, chunks[1]);
    draw_tasks(f, app, chunks[2]);

    let status = app.status.as_deref().unwrap_or(HELP);
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    if let Mode::Adding(form) = &app.mode {
        draw_form(f, form, app);
    }
}

fn draw_counts<S: TaskStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let counts = app.list.counts();
    let line = Line::from(vec![
        Span::raw(format!("Total {}   ", counts.total)),
        Span::styled(
            format!("Completed {}   ", counts.completed),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("Pending {}", counts.pending),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().title("Tasks").borders(Borders::ALL)),
        area,
    );
}

fn draw_filters<S: TaskStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let filters: Vec<CategoryFilter> = std::iter::once(CategoryFilter::All)
        .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
        .collect();
    let selected = filters
        .iter()
        .position(|&filter| filter == app.list.filter())
        .unwrap_or(0);
    let sort = if app.list.sort_by_due_date() {
        "sorted by due date"
    } else {
        "insertion order"
    };

    let tabs = Tabs::new(filters.iter().map(|filter| filter.label()))
        .select(selected)
        .block(Block::default().title(sort).borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_tasks<S: TaskStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    if app.list.is_empty() {
        f.render_widget(Paragraph::new("No tasks available").block(block), area);
        return;
    }

    let view = app.list.derived_view();
    let items: Vec<ListItem> = view.iter().map(|task| task_item(task)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !view.is_empty() {
        state.select(Some(app.selected.min(view.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn task_item(task: &Task) -> ListItem<'_> {
    let (mark, title_style) = if task.completed {
        (
            "[x] ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ] ", Style::default().fg(Color::White))
    };
    ListItem::new(Line::from(vec![
        Span::raw(mark),
        Span::styled(task.title.as_str(), title_style),
        Span::raw(format!(" ({}, due {})", task.category, task.due_date)),
    ]))
}

fn draw_form<S: TaskStore>(f: &mut Frame, form: &AddForm, app: &App<S>) {
    let area = centered(f.area(), 50, 8);
    let field_style = |field: FormField| {
        if form.field == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let due = if form.due.is_empty() {
        format!("{} (today)", app.today())
    } else {
        form.due.clone()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title:    ", field_style(FormField::Title)),
            Span::raw(form.title.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Category: ", field_style(FormField::Category)),
            Span::raw(format!("< {} >", form.category.label())),
        ]),
        Line::from(vec![
            Span::styled("Due:      ", field_style(FormField::Due)),
            Span::raw(due),
        ]),
        Line::from(""),
    ];
    match &form.error {
        Some(error) => lines.push(Line::styled(error.as_str(), Style::default().fg(Color::Red))),
        None => lines.push(Line::styled(
            "tab next field  enter save  esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().title("New task").borders(Borders::ALL)),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::task::NewTask;
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent};
    use ratatui::backend::TestBackend;

    fn render<S: TaskStore>(app: &App<S>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_task() -> App<MemoryStore> {
        let mut list = TaskList::open(MemoryStore::new()).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        list.add_task(NewTask::new("Buy milk", Category::Shopping, due))
            .unwrap();
        App::new(list, due)
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let list = TaskList::open(MemoryStore::new()).unwrap();
        let app = App::new(list, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let screen = render(&app);
        assert!(screen.contains("No tasks available"));
        assert!(screen.contains("Total 0"));
    }

    #[test]
    fn shows_counts_and_tasks() {
        let screen = render(&app_with_task());
        assert!(screen.contains("Total 1"));
        assert!(screen.contains("Pending 1"));
        assert!(screen.contains("Buy milk"));
        assert!(screen.contains("due 2024-01-05"));
    }

    #[test]
    fn add_form_is_drawn_over_the_list() {
        let mut app = app_with_task();
        app.handle_key_event(KeyEvent::from(KeyCode::Char('a')));
        let screen = render(&app);
        assert!(screen.contains("New task"));
        assert!(screen.contains("2024-01-05 (today)"));
    }
}
