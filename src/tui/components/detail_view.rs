//! Prospect detail view
//!
//! Three tabs over one selected row: its raw fields, and the email and phone
//! templates. Opening either template tab asks for enrichment once; the view
//! then shows whatever result arrives for its own view id.

use crate::core::classifier::DetailValueKind;
use crate::core::{FieldMapping, RowKey, ViewId};
use crate::services::{Channel, EnrichmentEvent, EnrichmentResult};
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use tracing::debug;

pub const PENDING_PLACEHOLDER: &str = "Analysing website…";
pub const NO_ANALYSIS_PLACEHOLDER: &str = "No analysis available.";
pub const TEMPLATE_PLACEHOLDER: &str = "Template will be generated after analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Data,
    Email,
    Phone,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [DetailTab::Data, DetailTab::Email, DetailTab::Phone];

    pub fn title(&self) -> &'static str {
        match self {
            DetailTab::Data => "Data",
            DetailTab::Email => Channel::Email.title(),
            DetailTab::Phone => Channel::Phone.title(),
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        match self {
            DetailTab::Data => None,
            DetailTab::Email => Some(Channel::Email),
            DetailTab::Phone => Some(Channel::Phone),
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct DetailView {
    view_id: ViewId,
    key: RowKey,
    mapping: FieldMapping,
    tab: DetailTab,
    result: Option<EnrichmentResult>,
    requested: bool,
    scroll: u16,
    focused: bool,
}

impl DetailView {
    pub fn new(key: RowKey, mapping: FieldMapping) -> Self {
        Self {
            view_id: ViewId::new(),
            key,
            mapping,
            tab: DetailTab::Data,
            result: None,
            requested: false,
            scroll: 0,
            focused: true,
        }
    }

    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn active_tab(&self) -> DetailTab {
        self.tab
    }

    pub fn result(&self) -> Option<&EnrichmentResult> {
        self.result.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.requested && self.result.is_none()
    }

    /// A template tab is showing and nothing has been requested yet
    pub fn needs_enrichment(&self) -> bool {
        self.tab.channel().is_some() && !self.requested && self.result.is_none()
    }

    pub fn mark_pending(&mut self) {
        self.requested = true;
    }

    pub fn set_result(&mut self, result: EnrichmentResult) {
        self.requested = true;
        self.result = Some(result);
    }

    /// Take a finished run if it was addressed to this view
    pub fn apply(&mut self, event: EnrichmentEvent) -> bool {
        if event.view != self.view_id || event.key != self.key {
            return false;
        }
        debug!("Detail view {} received result for {}", self.view_id, self.key);
        self.set_result(event.result);
        true
    }

    /// Template of the active tab, once generated
    pub fn active_template(&self) -> Option<&str> {
        let channel = self.tab.channel()?;
        self.result
            .as_ref()
            .map(|r| r.template(channel))
            .filter(|t| !t.is_empty())
    }

    fn select(&mut self, tab: DetailTab) {
        self.tab = tab;
        self.scroll = 0;
    }

    fn data_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (key, value) in self.mapping.entries() {
            lines.push(Line::from(Span::styled(key.clone(), theme.header_style())));
            let value_line = if value.is_empty() {
                Line::from(Span::styled("—", theme.muted_style()))
            } else {
                let kind = DetailValueKind::of(value);
                match kind.href(value) {
                    Some(href) if href != *value => Line::from(vec![
                        Span::styled(value.clone(), theme.link_style()),
                        Span::styled(format!("  ({href})"), theme.muted_style()),
                    ]),
                    Some(_) => Line::from(Span::styled(value.clone(), theme.link_style())),
                    None => Line::from(value.clone()),
                }
            };
            lines.push(value_line);
            lines.push(Line::default());
        }
        lines
    }

    fn template_lines(&self, channel: Channel, theme: &Theme) -> Vec<Line<'static>> {
        if self.is_pending() {
            return vec![Line::from(Span::styled(
                PENDING_PLACEHOLDER,
                theme.warning_style(),
            ))];
        }

        let analysis = self
            .result
            .as_ref()
            .map(|r| r.analysis_text.as_str())
            .filter(|a| !a.is_empty())
            .unwrap_or(NO_ANALYSIS_PLACEHOLDER);
        let template = self.active_template().unwrap_or(TEMPLATE_PLACEHOLDER);

        let mut lines = vec![Line::from(Span::styled(
            "Website Analysis",
            theme.header_style(),
        ))];
        lines.extend(analysis.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(channel.title(), theme.header_style())));
        lines.extend(template.lines().map(|l| Line::from(l.to_string())));
        lines
    }
}

impl Component for DetailView {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::NextTab | Action::MoveRight => self.select(self.tab.next()),
            Action::PrevTab | Action::MoveLeft => self.select(self.tab.prev()),
            Action::MoveDown => self.scroll = self.scroll.saturating_add(1),
            Action::MoveUp => self.scroll = self.scroll.saturating_sub(1),
            Action::PageDown => self.scroll = self.scroll.saturating_add(10),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(10),
            Action::GoToTop => self.scroll = 0,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = Theme::default();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!("Prospect details [row {}]", self.key.row + 1))
            .title_bottom(Line::from(" Tab: switch  c: copy  Esc: close ").right_aligned())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let tabs = Tabs::new(DetailTab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(theme.normal_style())
            .highlight_style(theme.selected_style().add_modifier(Modifier::BOLD))
            .divider("|");
        frame.render_widget(tabs, chunks[0]);

        let lines = match self.tab.channel() {
            None => self.data_lines(&theme),
            Some(channel) => self.template_lines(channel, &theme),
        };
        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(body, chunks[1]);
    }

    fn supported_actions(&self) -> &[Action] {
        &[
            Action::NextTab,
            Action::PrevTab,
            Action::MoveLeft,
            Action::MoveRight,
            Action::MoveUp,
            Action::MoveDown,
            Action::PageUp,
            Action::PageDown,
            Action::GoToTop,
        ]
    }

    fn name(&self) -> &str {
        "DetailView"
    }
}

impl Focusable for DetailView {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionId;
    use crate::services::{EnrichmentOutcome, EnrichmentStage};

    fn view() -> DetailView {
        let mapping = FieldMapping::from_pairs([("Nom", "Acme"), ("Email", "hi@acme.fr")]);
        DetailView::new(RowKey::new(SessionId::new(), 0), mapping)
    }

    fn done(email: &str) -> EnrichmentResult {
        EnrichmentResult {
            url_found: true,
            url: Some("https://acme.fr".into()),
            analysis_text: "Company Analysis for Acme".into(),
            email_template: email.into(),
            phone_template: "Hello?".into(),
            outcome: EnrichmentOutcome::Analysed,
            stage: EnrichmentStage::Done,
        }
    }

    #[test]
    fn test_tab_cycle() {
        let mut view = view();
        assert_eq!(view.active_tab(), DetailTab::Data);
        view.handle_action(Action::NextTab).unwrap();
        assert_eq!(view.active_tab(), DetailTab::Email);
        view.handle_action(Action::NextTab).unwrap();
        view.handle_action(Action::NextTab).unwrap();
        assert_eq!(view.active_tab(), DetailTab::Data);
        view.handle_action(Action::PrevTab).unwrap();
        assert_eq!(view.active_tab(), DetailTab::Phone);
    }

    #[test]
    fn test_enrichment_requested_once() {
        let mut view = view();
        assert!(!view.needs_enrichment());

        view.handle_action(Action::NextTab).unwrap();
        assert!(view.needs_enrichment());
        view.mark_pending();
        assert!(!view.needs_enrichment());
        assert!(view.is_pending());

        view.handle_action(Action::NextTab).unwrap();
        assert!(!view.needs_enrichment());
    }

    #[test]
    fn test_apply_checks_view_and_row() {
        let mut view = view();
        view.mark_pending();

        let stale = EnrichmentEvent {
            view: ViewId::new(),
            key: view.key(),
            result: done("Dear Acme"),
        };
        assert!(!view.apply(stale));
        assert!(view.is_pending());

        let event = EnrichmentEvent {
            view: view.view_id(),
            key: view.key(),
            result: done("Dear Acme"),
        };
        assert!(view.apply(event));
        assert!(!view.is_pending());
        assert_eq!(view.result().map(|r| r.is_done()), Some(true));
    }

    #[test]
    fn test_active_template() {
        let mut view = view();
        view.set_result(done("Dear Acme"));
        assert_eq!(view.active_template(), None);

        view.handle_action(Action::NextTab).unwrap();
        assert_eq!(view.active_template(), Some("Dear Acme"));
        view.handle_action(Action::NextTab).unwrap();
        assert_eq!(view.active_template(), Some("Hello?"));

        view.set_result(done(""));
        view.handle_action(Action::PrevTab).unwrap();
        assert_eq!(view.active_template(), None);
    }
}
