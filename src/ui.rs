use anyhow::Result;
use business_map::render::group_thousands;
use business_map::{
    AppConfig, BusinessMap, Debouncer, FilterCriteria, RenderEntry, RenderOptions, RenderPlan,
};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// Poll interval when no search is pending
const IDLE_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Businesses,
    Industries,
    Filters,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Businesses => Page::Industries,
            Page::Industries => Page::Filters,
            Page::Filters => Page::Businesses,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Businesses => Page::Filters,
            Page::Industries => Page::Businesses,
            Page::Filters => Page::Industries,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Businesses => "Businesses",
            Page::Industries => "Industries",
            Page::Filters => "Filters",
        }
    }
}

pub struct App {
    pub map: BusinessMap,
    pub title: String,
    pub criteria: FilterCriteria,
    pub options: RenderOptions,
    pub reference: NaiveDate,
    pub plan: RenderPlan,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    /// Typing into the search box
    pub editing_search: bool,
    /// What has been typed; applied to `criteria` once the debounce fires
    pub search_input: String,
    pub debouncer: Debouncer,
}

impl App {
    pub fn new(
        map: BusinessMap,
        config: &AppConfig,
        criteria: FilterCriteria,
        options: RenderOptions,
        reference: NaiveDate,
    ) -> Self {
        let plan = map.render(&criteria, options, reference);
        let mut state = TableState::default();
        if !plan.entries.is_empty() {
            state.select(Some(0));
        }

        Self {
            map,
            title: config.title.clone(),
            search_input: criteria.search.clone(),
            criteria,
            options,
            reference,
            plan,
            state,
            current_page: Page::Businesses,
            show_detail: false,
            editing_search: false,
            debouncer: Debouncer::new(config.search_debounce()),
        }
    }

    /// Recompute the whole plan from the current criteria
    pub fn refresh(&mut self) {
        self.plan = self
            .map
            .render(&self.criteria, self.options, self.reference);

        // Reset selection to first item
        if !self.plan.entries.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn selected_entry(&self) -> Option<&RenderEntry> {
        self.state.selected().and_then(|i| self.plan.entries.get(i))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    // ------------------------------------------------------------------------
    // Filter controls: every change except typing recomputes immediately
    // ------------------------------------------------------------------------

    pub fn cycle_age(&mut self) {
        self.criteria.age = self.criteria.age.next();
        self.refresh();
    }

    pub fn cycle_industry(&mut self) {
        let options = &self.map.filter_options().industries;
        self.criteria.industry = self.criteria.industry.cycle(options);
        self.refresh();
    }

    pub fn cycle_company_type(&mut self) {
        let options = &self.map.filter_options().company_types;
        self.criteria.company_type = self.criteria.company_type.cycle(options);
        self.refresh();
    }

    pub fn cycle_area(&mut self) {
        let options = &self.map.filter_options().municipalities;
        self.criteria.area = self.criteria.area.cycle(options);
        self.refresh();
    }

    pub fn toggle_clustering(&mut self) {
        self.options.cluster = !self.options.cluster;
        self.refresh();
    }

    pub fn toggle_coloring(&mut self) {
        self.options.color_by_industry = !self.options.color_by_industry;
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.search_input.clear();
        self.debouncer.cancel();
        self.refresh();
    }

    /// Record a keystroke in the search box; the filter waits for the debounce
    pub fn edit_search(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char(c) => self.search_input.push(c),
            KeyCode::Backspace => {
                self.search_input.pop();
            }
            _ => return,
        }
        self.debouncer.trigger(now);
    }

    /// Apply a pending search once the debounce delay has passed
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.take_due(now) {
            self.criteria.search = self.search_input.clone();
            self.refresh();
            true
        } else {
            false
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if self.editing_search {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.editing_search = false,
                code => self.edit_search(code, now),
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('/') => {
                self.editing_search = true;
                self.current_page = Page::Businesses;
            }
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Tab => self.current_page = self.current_page.next(),
            KeyCode::BackTab => self.current_page = self.current_page.previous(),
            KeyCode::Char('a') => self.cycle_age(),
            KeyCode::Char('i') => self.cycle_industry(),
            KeyCode::Char('t') => self.cycle_company_type(),
            KeyCode::Char('m') => self.cycle_area(),
            KeyCode::Char('g') => self.toggle_clustering(),
            KeyCode::Char('o') => self.toggle_coloring(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => {
                if !self.plan.entries.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.plan.entries.is_empty() {
                    self.state.select(Some(self.plan.entries.len() - 1));
                }
            }
            _ => {}
        }
        false
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn next(&mut self) {
        let len = self.plan.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.plan.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.plan.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.plan.entries.is_empty() {
            return;
        }
        let i = self
            .state
            .selected()
            .map(|i| i.saturating_sub(20))
            .unwrap_or(0);
        self.state.select(Some(i));
    }

    /// Visible businesses per industry label, for the legend
    pub fn industry_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for entry in &self.plan.entries {
            *counts.entry(entry.popup.industry.clone()).or_insert(0) += 1;
        }
        counts
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = app.debouncer.remaining(Instant::now()).unwrap_or(IDLE_TICK);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key, Instant::now()) {
                    return Ok(());
                }
            }
        }

        app.tick(Instant::now());
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(3), // Filter bar
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_filter_bar(f, chunks[1], app);

    if app.show_detail && app.current_page == Page::Businesses {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Business list
                Constraint::Percentage(40), // Popup content
            ])
            .split(chunks[2]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Businesses => render_table(f, chunks[2], app),
            Page::Industries => render_industries(f, chunks[2], app),
            Page::Filters => render_filters(f, chunks[2], app),
        }
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Businesses, Page::Industries, Page::Filters];

    let mut tab_spans = vec![Span::styled(
        format!("{}  ", app.title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        app.plan.header(),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_filter_bar(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Yellow);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let search_style = if app.editing_search {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        value
    };
    let search_text = if app.editing_search {
        format!("{}▏", app.search_input)
    } else if app.search_input.is_empty() {
        "-".to_string()
    } else {
        app.search_input.clone()
    };

    let spans = vec![
        Span::styled(" Search: ", label),
        Span::styled(search_text, search_style),
        Span::raw("  "),
        Span::styled("Age: ", label),
        Span::styled(app.criteria.age.label(), value),
        Span::raw("  "),
        Span::styled("Industry: ", label),
        Span::styled(app.criteria.industry.to_string(), value),
        Span::raw("  "),
        Span::styled("Type: ", label),
        Span::styled(app.criteria.company_type.to_string(), value),
        Span::raw("  "),
        Span::styled("Area: ", label),
        Span::styled(app.criteria.area.to_string(), value),
        Span::raw("  "),
        Span::styled("Cluster: ", label),
        Span::styled(if app.plan.clustered { "on" } else { "off" }, value),
    ];

    let bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters "),
    );

    f.render_widget(bar, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["", "Name", "Industry", "Status", "Area", "Founded", "Age"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.plan.entries.iter().map(|entry| {
        let color = hex_to_color(&entry.color);
        let popup = &entry.popup;

        let cells = vec![
            Cell::from("●").style(Style::default().fg(color)),
            Cell::from(truncate(&entry.label, 34)),
            Cell::from(truncate(&popup.industry, 22)).style(Style::default().fg(color)),
            Cell::from(truncate(&popup.status, 10)),
            Cell::from(truncate(&popup.area, 16)),
            Cell::from(popup.founded.clone()),
            Cell::from(popup.age.clone()),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(36),
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(if app.plan.clustered {
                " Businesses (clustered on map) "
            } else {
                " Businesses "
            }),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_industries(f: &mut Frame, area: Rect, app: &App) {
    let counts = app.industry_counts();

    let header = Row::new(["", "Industry", "Color", "Visible"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows = app.map.colors().iter().map(|(industry, hex)| {
        let color = hex_to_color(hex);
        Row::new(vec![
            Cell::from("●").style(Style::default().fg(color)),
            Cell::from(industry.to_string()),
            Cell::from(hex.to_string()).style(Style::default().fg(color)),
            Cell::from(format!("{}", counts.get(industry).copied().unwrap_or(0))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(40),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Industries - Color Legend "),
    );

    f.render_widget(table, area);
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let options = app.map.filter_options();
    let key = Style::default().fg(Color::Yellow);
    let muted = Style::default().fg(Color::DarkGray);

    let line = |k: &'static str, text: String, detail: String| {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(k, key),
            Span::raw(format!("  {:<28}", text)),
            Span::styled(detail, muted),
        ])
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Filter Controls",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        line(
            "/",
            format!("Search: {}", app.criteria.search),
            "name, address, industry, type".to_string(),
        ),
        line(
            "a",
            format!("Age: {}", app.criteria.age.label()),
            "cycles all → new → growth → young → established".to_string(),
        ),
        line(
            "i",
            format!("Industry: {}", app.criteria.industry),
            format!("{} industries", options.industries.len()),
        ),
        line(
            "t",
            format!("Type: {}", app.criteria.company_type),
            format!("{} company types", options.company_types.len()),
        ),
        line(
            "m",
            format!("Area: {}", app.criteria.area),
            format!("{} areas", options.municipalities.len()),
        ),
        line(
            "g",
            format!(
                "Clustering: {}",
                if app.options.cluster { "on" } else { "off" }
            ),
            "marker grouping on the map".to_string(),
        ),
        line(
            "o",
            format!(
                "Industry colors: {}",
                if app.options.color_by_industry {
                    "on"
                } else {
                    "off"
                }
            ),
            String::new(),
        ),
        line("c", "Clear all filters".to_string(), String::new()),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Visible: ", key),
            Span::raw(group_thousands(app.plan.visible_count)),
            Span::styled("   Active: ", key),
            Span::raw(group_thousands(app.plan.active_count)),
            Span::styled("   Dataset: ", key),
            Span::raw(app.map.dataset().source.clone()),
        ]),
    ];

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters - Quick Access "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.plan.entries.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if app.debouncer.is_pending() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            "searching…",
            Style::default().fg(Color::Green),
        ));
    }

    if !app.criteria.is_neutral() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("Filtered", Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    for (k, text) in [
        ("/", " Search | "),
        ("Enter", " Details | "),
        ("Tab", " Page | "),
        ("↑/↓", " Nav | "),
    ] {
        status_spans.push(Span::raw(if k == "/" { " | " } else { "" }));
        status_spans.push(Span::styled(k, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(text));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let entry = match app.selected_entry() {
        Some(e) => e,
        None => {
            let no_selection = Paragraph::new("No business selected").block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Business Details "),
            );
            f.render_widget(no_selection, area);
            return;
        }
    };

    let field = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("  {}", entry.popup.name),
            Style::default()
                .fg(hex_to_color(&entry.color))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    for (label, value) in entry.popup.rows() {
        content.push(Line::from(vec![
            Span::styled(format!("  {}: ", label), field),
            Span::raw(value.to_string()),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Position: ", field),
        Span::styled(
            format!("{:.5}, {:.5}", entry.position.lat, entry.position.lon),
            Style::default().fg(Color::Green),
        ),
    ]));
    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )]));

    let detail_panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Business Details "),
    );

    f.render_widget(detail_panel, area);
}

/// "#28a745" → Rgb(40, 167, 69); anything unparsable renders gray
fn hex_to_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Color::Gray;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use business_map::{BusinessRecord, Dataset};
    use crossterm::event::KeyModifiers;

    fn app() -> App {
        let records = vec![
            BusinessRecord {
                name: "Acme AS".to_string(),
                latitude: Some(58.9),
                longitude: Some(5.7),
                industry: Some("Energi".to_string()),
                company_type: Some("AS".to_string()),
                municipality: Some("Stavanger".to_string()),
                founded: Some("2024-01-01".to_string()),
                ..Default::default()
            },
            BusinessRecord {
                name: "Globex ENK".to_string(),
                latitude: Some(58.85),
                longitude: Some(5.74),
                industry: Some("Teknologi".to_string()),
                company_type: Some("ENK".to_string()),
                municipality: Some("Sandnes".to_string()),
                founded: Some("2019-01-01".to_string()),
                ..Default::default()
            },
        ];
        let config = AppConfig::default();
        let map = BusinessMap::new(Dataset::new(records, "memory", b"[]"), &config);
        App::new(
            map,
            &config,
            FilterCriteria::default(),
            RenderOptions::default(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
    }

    #[test]
    fn test_search_waits_for_debounce() {
        let mut app = app();
        let start = Instant::now();

        press(&mut app, KeyCode::Char('/'), start);
        for c in "acme".chars() {
            press(&mut app, KeyCode::Char(c), start);
        }
        assert_eq!(app.plan.visible_count, 2, "search not applied yet");

        assert!(!app.tick(start + Duration::from_millis(100)));
        assert!(app.tick(start + Duration::from_millis(500)));
        assert_eq!(app.plan.visible_count, 1);
        assert_eq!(app.selected_entry().unwrap().label, "Acme AS");
    }

    #[test]
    fn test_select_filters_apply_immediately() {
        let mut app = app();
        let now = Instant::now();

        press(&mut app, KeyCode::Char('m'), now); // area → Sandnes
        assert_eq!(app.plan.visible_count, 1);
        assert_eq!(app.plan.entries[0].label, "Globex ENK");

        press(&mut app, KeyCode::Char('c'), now);
        assert_eq!(app.plan.visible_count, 2);

        press(&mut app, KeyCode::Char('a'), now); // age → new
        assert_eq!(app.plan.visible_count, 1);
        assert_eq!(app.plan.entries[0].label, "Acme AS");
    }

    #[test]
    fn test_cluster_toggle_keeps_entries() {
        let mut app = app();
        let before = app.plan.entries.clone();

        press(&mut app, KeyCode::Char('g'), Instant::now());
        assert!(!app.plan.clustered);
        assert_eq!(app.plan.entries, before);
    }

    #[test]
    fn test_quit_keys_ignored_while_typing() {
        let mut app = app();
        let now = Instant::now();

        press(&mut app, KeyCode::Char('/'), now);
        assert!(!press(&mut app, KeyCode::Char('q'), now));
        assert_eq!(app.search_input, "q");

        press(&mut app, KeyCode::Esc, now);
        assert!(press(&mut app, KeyCode::Char('q'), now));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("#28a745"), Color::Rgb(40, 167, 69));
        assert_eq!(hex_to_color("nope"), Color::Gray);
        // six bytes, but not six hex digits
        assert_eq!(hex_to_color("#aééb"), Color::Gray);
        assert_eq!(hex_to_color("#zz0000"), Color::Gray);
    }
}
