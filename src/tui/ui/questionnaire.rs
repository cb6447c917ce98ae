//! Questionnaire view: 26 items in three tabbed parts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::domain::{Answers, Likert, QuestionnairePart, QUESTIONS, QUESTION_COUNT};
use crate::tui::styles::CalmTheme;

/// Lines used by one question (text + options).
const ROWS_PER_QUESTION: u16 = 2;

#[derive(Default)]
pub struct QuestionnaireState {
    pub answers: Answers,
    /// 0-based index into all questions
    pub selected: usize,
}

impl QuestionnaireState {
    #[must_use]
    pub fn current_part(&self) -> QuestionnairePart {
        QuestionnairePart::of(self.selected)
    }

    pub fn next_question(&mut self) {
        self.selected = (self.selected + 1) % QUESTION_COUNT;
    }

    pub fn prev_question(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(QUESTION_COUNT - 1);
    }

    /// Jump to the first question of the next part.
    pub fn next_part(&mut self) {
        self.selected = self.current_part().next().range().start;
    }

    /// Raise (or lower) the selected answer by one step, saturating at the scale ends.
    pub fn adjust(&mut self, up: bool) {
        if let Some(current) = self.answers.get(self.selected) {
            let next = if up {
                current.increment()
            } else {
                current.decrement()
            };
            self.answers.set(self.selected, next);
        }
    }

    pub fn clear_sensitive(&mut self) {
        self.answers.reset();
        self.selected = 0;
    }
}

/// Render the questionnaire
pub fn render_questionnaire(f: &mut Frame, area: Rect, state: &QuestionnaireState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Questions
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_tabs(f, chunks[0], state);
    render_questions(f, chunks[1], state);
    render_footer(f, chunks[2]);
}

fn render_tabs(f: &mut Frame, area: Rect, state: &QuestionnaireState) {
    let current = state.current_part();
    let titles: Vec<Line> = QuestionnairePart::ALL
        .iter()
        .map(|p| Line::from(p.title()))
        .collect();
    let selected = QuestionnairePart::ALL
        .iter()
        .position(|p| *p == current)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(CalmTheme::text_secondary())
        .highlight_style(CalmTheme::tab_active())
        .divider(Span::styled("│", CalmTheme::border()))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(CalmTheme::border()),
        );

    f.render_widget(tabs, area);
}

fn render_questions(f: &mut Frame, area: Rect, state: &QuestionnaireState) {
    let part = state.current_part();
    let block = Block::default()
        .title(Span::styled(
            " In the last two weeks, how often have you... ",
            CalmTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(CalmTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Keep the selected question on screen.
    let visible = usize::from((inner.height / ROWS_PER_QUESTION).max(1));
    let position = state.selected - part.range().start;
    let skip = position.saturating_sub(visible - 1);

    let mut lines = Vec::new();
    for index in part.range().skip(skip).take(visible) {
        let question = &QUESTIONS[index];
        let is_selected = index == state.selected;
        let text_style = if is_selected {
            CalmTheme::focused()
        } else {
            CalmTheme::text()
        };

        lines.push(Line::from(vec![
            Span::styled(
                if is_selected { "▸ " } else { "  " },
                CalmTheme::key_hint(),
            ),
            Span::styled(format!("Q{:02}. ", question.number), CalmTheme::text_muted()),
            Span::styled(question.text, text_style),
        ]));

        let answer = state.answers.get(index).unwrap_or_default();
        let mut options = vec![Span::raw("       ")];
        for choice in Likert::ALL {
            let style = if choice == answer {
                if is_selected {
                    CalmTheme::selected()
                } else {
                    CalmTheme::focused()
                }
            } else {
                CalmTheme::text_muted()
            };
            options.push(Span::styled(format!(" {} ", choice.label()), style));
            options.push(Span::raw(" "));
        }
        lines.push(Line::from(options));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let spans = vec![
        Span::styled("[↑↓] ", CalmTheme::key_hint()),
        Span::styled("Question ", CalmTheme::key_desc()),
        Span::styled("[←→] ", CalmTheme::key_hint()),
        Span::styled("Answer ", CalmTheme::key_desc()),
        Span::styled("[Tab] ", CalmTheme::key_hint()),
        Span::styled("Next Part ", CalmTheme::key_desc()),
        Span::styled("[P] ", CalmTheme::key_hint()),
        Span::styled("Profile ", CalmTheme::key_desc()),
        Span::styled("[Enter] ", CalmTheme::key_hint()),
        Span::styled("Analyze ", CalmTheme::key_desc()),
        Span::styled("[Esc] ", CalmTheme::key_hint()),
        Span::styled("Home", CalmTheme::key_desc()),
    ];

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut state = QuestionnaireState::default();
        state.prev_question();
        assert_eq!(state.selected, QUESTION_COUNT - 1);
        state.next_question();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_next_part_jumps_to_part_start() {
        let mut state = QuestionnaireState::default();
        state.selected = 4;
        state.next_part();
        assert_eq!(state.selected, 10);
        assert_eq!(state.current_part(), QuestionnairePart::AnxietyStress);
        state.next_part();
        assert_eq!(state.selected, 17);
        state.next_part();
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_adjust_saturates() {
        let mut state = QuestionnaireState::default();
        state.adjust(false);
        assert_eq!(state.answers.get(0), Some(Likert::NotAtAll));
        for _ in 0..5 {
            state.adjust(true);
        }
        assert_eq!(state.answers.get(0), Some(Likert::VeryOften));
        assert_eq!(state.answers.get(1), Some(Likert::NotAtAll));

        state.clear_sensitive();
        assert_eq!(state.answers, Answers::default());
    }
}
