use crate::config::Config;
use crate::core::{FileRecord, IngestError, RowKey};
use crate::services::{
    EnrichmentDispatcher, EnrichmentPipeline, HttpFetcher, IngestService, PageFetcher,
    TableViewEngine, TemplateGenerator,
};
use crate::tui::components::{
    CellViewer, DataTable, DetailView, ImportPrompt, MessageLine, SearchBar,
};
use crate::tui::{Action, ActionCategory, Component, Focusable, KeyBindings, Theme};
use arboard::Clipboard;
use color_eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Application state
///
/// Owns the loaded table and the UI components, routes key events to them and
/// bridges the detail view to the enrichment pipeline.
pub struct App {
    ingest: IngestService,
    dispatcher: EnrichmentDispatcher,

    /// Metadata of the loaded file; `None` before the first load
    file: Option<FileRecord>,

    data_table: Option<DataTable>,
    search_bar: SearchBar,
    cell_viewer: CellViewer,
    detail_view: Option<DetailView>,
    import_prompt: Option<ImportPrompt>,
    message_line: MessageLine,
    show_help: bool,

    keybindings: KeyBindings,
    theme: Theme,
    should_quit: bool,
}

impl App {
    /// App with a real HTTP fetcher; enrichment runs on `runtime`
    pub fn new(config: &Config, runtime: Handle) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.enrichment)?;
        Ok(Self::with_fetcher(config, runtime, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: &Config, runtime: Handle, fetcher: Arc<dyn PageFetcher>) -> Self {
        let templates = TemplateGenerator::new(config.sender.clone(), config.fields.clone());
        let pipeline = EnrichmentPipeline::new(
            fetcher,
            templates,
            config.enrichment.clone(),
            config.fields.clone(),
        );

        Self {
            ingest: IngestService::new(config.ingest.clone()),
            dispatcher: EnrichmentDispatcher::new(Arc::new(pipeline), runtime),
            file: None,
            data_table: None,
            search_bar: SearchBar::new(),
            cell_viewer: CellViewer::new(),
            detail_view: None,
            import_prompt: None,
            message_line: MessageLine::new(),
            show_help: false,
            keybindings: config.key_bindings(),
            theme: Theme::default(),
            should_quit: false,
        }
    }

    /// Load a file, replacing the current table.
    ///
    /// On failure the current table is kept and the error goes to the message line.
    pub fn load_path(&mut self, path: &Path) -> Result<(), IngestError> {
        let loaded = match self.ingest.ingest_path(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                self.message_line
                    .error(format!("Could not load {}: {}", path.display(), e));
                return Err(e);
            }
        };

        self.close_detail();
        self.dispatcher.pipeline().clear();

        let engine = TableViewEngine::new(Arc::new(loaded.table));
        let mut table = DataTable::new(engine, loaded.record.label());
        table.set_focused(true);

        self.search_bar.clear();
        self.search_bar.set_focused(false);
        self.message_line.info(format!(
            "Loaded {} rows from {}",
            loaded.record.row_count, loaded.record.name
        ));
        self.data_table = Some(table);
        self.file = Some(loaded.record);
        Ok(())
    }

    /// Back to the empty pre-upload state
    pub fn reset(&mut self) {
        self.close_detail();
        self.dispatcher.pipeline().clear();
        self.data_table = None;
        self.file = None;
        self.search_bar.clear();
        self.search_bar.set_focused(false);
        self.cell_viewer.clear();
        self.message_line.clear();
        info!("Table cleared");
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Text inputs see editing keys before the keybindings do
        if let Some(prompt) = &mut self.import_prompt {
            if prompt.handle_key(&key) {
                return Ok(());
            }
        } else if self.search_bar.is_focused() && self.detail_view.is_none() {
            if let Some(change) = self.search_bar.handle_key(&key) {
                if let (Some(query), Some(table)) = (change, &mut self.data_table) {
                    table.search(&query);
                }
                return Ok(());
            }
        }

        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }

        Ok(())
    }

    fn handle_action(&mut self, action: Action) -> Result<()> {
        if self.show_help {
            if matches!(action, Action::ToggleHelp | Action::Cancel | Action::Confirm) {
                self.show_help = false;
            } else if action == Action::Quit {
                self.should_quit = true;
            }
            return Ok(());
        }

        // App-level actions
        match action {
            Action::Quit => {
                self.should_quit = true;
                return Ok(());
            }
            Action::ToggleHelp => {
                self.show_help = true;
                return Ok(());
            }
            Action::Cancel => {
                if self.import_prompt.take().is_some() {
                    return Ok(());
                }
                if self.detail_view.is_some() {
                    self.close_detail();
                    return Ok(());
                }
                if self.search_bar.is_focused() {
                    self.search_bar.handle_action(action)?;
                    self.focus_table();
                    return Ok(());
                }
                self.message_line.handle_action(action)?;
                return Ok(());
            }
            Action::Import => {
                if self.import_prompt.is_none() {
                    self.import_prompt = Some(ImportPrompt::new());
                }
                return Ok(());
            }
            Action::NewFile => {
                self.reset();
                self.import_prompt = Some(ImportPrompt::new());
                return Ok(());
            }
            Action::Copy => {
                self.copy_selection();
                return Ok(());
            }
            _ => {}
        }

        // Route to import prompt if open
        if let Some(prompt) = &mut self.import_prompt {
            if action == Action::Confirm {
                prompt.handle_action(action)?;
                if let Some(path) = prompt.path() {
                    match self.load_path(&path) {
                        Ok(()) => self.import_prompt = None,
                        Err(e) => {
                            if let Some(prompt) = &mut self.import_prompt {
                                prompt.set_error(e.to_string());
                            }
                        }
                    }
                }
            }
            return Ok(());
        }

        // Route to detail view if open
        if let Some(detail) = &mut self.detail_view {
            detail.handle_action(action)?;
            self.request_enrichment();
            return Ok(());
        }

        if self.search_bar.is_focused() {
            if action == Action::Confirm {
                self.search_bar.handle_action(action)?;
                self.focus_table();
                return Ok(());
            }
        } else {
            match action {
                Action::Find if self.data_table.is_some() => {
                    self.search_bar.set_focused(true);
                    if let Some(table) = &mut self.data_table {
                        table.set_focused(false);
                    }
                    return Ok(());
                }
                Action::Confirm => {
                    self.open_detail();
                    return Ok(());
                }
                _ => {}
            }
        }

        // Navigation and sorting go to the table, even while typing a query
        if let Some(table) = &mut self.data_table {
            table.handle_action(action)?;
        }

        Ok(())
    }

    fn focus_table(&mut self) {
        self.search_bar.set_focused(false);
        if let Some(table) = &mut self.data_table {
            table.set_focused(true);
        }
    }

    /// Open the detail view on the row under the cursor
    fn open_detail(&mut self) {
        let (Some(table), Some(file)) = (&mut self.data_table, &self.file) else {
            return;
        };
        let (Some(row), Some(mapping)) = (table.selected_base_row(), table.selected_mapping())
        else {
            return;
        };

        let key = RowKey::new(file.session, row);
        let mut detail = DetailView::new(key, mapping);
        if let Some(result) = self.dispatcher.pipeline().cached(key) {
            detail.set_result(result);
        }
        debug!("Opened detail view {} for {}", detail.view_id(), key);

        table.set_focused(false);
        self.detail_view = Some(detail);
    }

    fn close_detail(&mut self) {
        if let Some(detail) = self.detail_view.take() {
            self.dispatcher.pipeline().view_closed(detail.key());
            debug!("Closed detail view {}", detail.view_id());
            self.focus_table();
        }
    }

    /// Start enrichment when a template tab is showing without a result
    fn request_enrichment(&mut self) {
        let Some(detail) = &mut self.detail_view else {
            return;
        };
        if !detail.needs_enrichment() {
            return;
        }
        match self
            .dispatcher
            .trigger(detail.view_id(), detail.key(), detail.mapping().clone())
        {
            Some(result) => detail.set_result(result),
            None => detail.mark_pending(),
        }
    }

    fn copy_selection(&mut self) {
        let text = match &self.detail_view {
            Some(detail) => match detail.active_template() {
                Some(template) => template.to_string(),
                None => {
                    self.message_line.error("Nothing to copy yet");
                    return;
                }
            },
            None => match self.data_table.as_ref().and_then(|t| t.current_cell_info()) {
                Some(info) => info.value,
                None => return,
            },
        };

        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self.message_line.info("Copied to clipboard"),
            Err(e) => {
                error!("Failed to copy to clipboard: {}", e);
                self.message_line.error(format!("Copy failed: {e}"));
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Deliver finished enrichment runs (called on every tick)
    pub fn update(&mut self) -> Result<()> {
        for event in self.dispatcher.drain() {
            let delivered = match &mut self.detail_view {
                Some(detail) => detail.apply(event.clone()),
                None => false,
            };
            if !delivered {
                debug!(
                    "Discarding late enrichment result for {} (view {})",
                    event.key, event.view
                );
            }
        }
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(table) = &mut self.data_table {
            self.cell_viewer.set_cell_info(table.current_cell_info());
            let viewer_height = self.cell_viewer.calculate_height(area.width);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(viewer_height),
                    Constraint::Min(0),
                    Constraint::Length(1),
                ])
                .split(area);

            self.search_bar.render(frame, chunks[0]);
            self.cell_viewer.render(frame, chunks[1]);
            table.render(frame, chunks[2]);
            self.message_line.render(frame, chunks[3]);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(area);
            self.render_welcome(frame, chunks[0]);
            self.message_line.render(frame, chunks[1]);
        }

        if let Some(detail) = &mut self.detail_view {
            detail.render(frame, Self::centered_rect(80, 85, area));
        }

        if let Some(prompt) = &mut self.import_prompt {
            let width = Self::percent_of(area.width, 60).max(40).min(area.width);
            prompt.render(frame, Self::centered_fixed(width, 7, area));
        }

        if self.show_help {
            self.render_help(frame, Self::centered_rect(70, 80, area));
        }
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("leadscope")
            .border_style(self.theme.border_style());
        let text = vec![
            Line::default(),
            Line::from(Span::styled("Prospect table analysis", self.theme.header_style())),
            Line::default(),
            Line::from("Load a CSV or spreadsheet file to view and analyse your prospects."),
            Line::default(),
            Line::from(Span::styled(
                "Press o to load a file, ? for help, q to quit",
                self.theme.muted_style(),
            )),
        ];
        let welcome = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(welcome, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        for category in ActionCategory::all() {
            lines.push(Line::from(Span::styled(
                category.to_string(),
                self.theme.header_style(),
            )));
            for action in Action::all().into_iter().filter(|a| a.category() == category) {
                let keys = self.keybindings.get_keys_for_action(action).join(", ");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<22}"), self.theme.info_style()),
                    Span::raw(action.description()),
                ]));
            }
            lines.push(Line::default());
        }

        let help = Paragraph::new(lines).block(
            Block::default()
                .title("Help")
                .title_bottom(Line::from(" Esc to close ").right_aligned())
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(self.theme.focused_border_style()),
        );
        frame.render_widget(help, area);
    }

    /// Helper to create centered rectangle
    fn centered_rect(percent_w: u16, percent_h: u16, area: Rect) -> Rect {
        let width = Self::percent_of(area.width, percent_w);
        let height = Self::percent_of(area.height, percent_h);
        Self::centered_fixed(width, height, area)
    }

    fn percent_of(length: u16, percent: u16) -> u16 {
        (u32::from(length) * u32::from(percent) / 100) as u16
    }

    fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn file(&self) -> Option<&FileRecord> {
        self.file.as_ref()
    }

    pub fn data_table(&self) -> Option<&DataTable> {
        self.data_table.as_ref()
    }

    pub fn detail_view(&self) -> Option<&DetailView> {
        self.detail_view.as_ref()
    }

    pub fn message_line(&self) -> &MessageLine {
        &self.message_line
    }

    pub fn search_query(&self) -> &str {
        self.search_bar.query()
    }

    pub fn is_import_open(&self) -> bool {
        self.import_prompt.is_some()
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn pipeline(&self) -> &Arc<EnrichmentPipeline> {
        self.dispatcher.pipeline()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }
}
