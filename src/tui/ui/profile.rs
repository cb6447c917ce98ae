//! Student profile form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{AcademicYear, AgeGroup, Gender, StudentProfile, UniversityType, CGPA_MAX};
use crate::tui::styles::CalmTheme;

const MAX_DEPARTMENT_INPUT: usize = 64;
const MAX_CGPA_INPUT: usize = 8;

/// Form field identifiers, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    AgeGroup,
    Gender,
    University,
    Department,
    AcademicYear,
    Cgpa,
    Scholarship,
}

impl ProfileField {
    pub const ALL: [Self; 7] = [
        Self::AgeGroup,
        Self::Gender,
        Self::University,
        Self::Department,
        Self::AcademicYear,
        Self::Cgpa,
        Self::Scholarship,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AgeGroup => "Age",
            Self::Gender => "Gender",
            Self::University => "University",
            Self::Department => "Department",
            Self::AcademicYear => "Academic Year",
            Self::Cgpa => "Current CGPA",
            Self::Scholarship => "Waiver / Scholarship",
        }
    }

    /// Free-text fields; the rest cycle through fixed options.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Department | Self::Cgpa)
    }

    fn hint(&self) -> &'static str {
        match self {
            Self::Department => "e.g. CSE, EEE, BBA",
            Self::Cgpa => "0.00 - 4.00",
            _ => "",
        }
    }
}

/// Step to the neighbouring option, wrapping at both ends.
fn cycle<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    let pos = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    options[next]
}

/// Profile form state
pub struct ProfileFormState {
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub university: UniversityType,
    pub department: String,
    pub academic_year: AcademicYear,
    pub cgpa: String,
    pub scholarship: bool,
    pub selected_field: usize,
    /// Set once the profile validated; edits are refused until unlocked
    pub locked: bool,
    pub error_message: Option<String>,
}

impl Default for ProfileFormState {
    fn default() -> Self {
        let profile = StudentProfile::default();
        Self {
            age_group: profile.age_group,
            gender: profile.gender,
            university: profile.university,
            department: profile.department,
            academic_year: profile.academic_year,
            cgpa: format!("{:.2}", profile.cgpa),
            scholarship: profile.scholarship,
            selected_field: 0,
            locked: false,
            error_message: None,
        }
    }
}

impl ProfileFormState {
    #[must_use]
    pub fn current_field(&self) -> ProfileField {
        ProfileField::ALL[self.selected_field]
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % ProfileField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = ProfileField::ALL.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Move the current select field to its next (or previous) option.
    pub fn cycle_option(&mut self, forward: bool) {
        if self.locked {
            return;
        }
        match self.current_field() {
            ProfileField::AgeGroup => {
                self.age_group = cycle(&AgeGroup::ALL, self.age_group, forward);
            }
            ProfileField::Gender => self.gender = cycle(&Gender::ALL, self.gender, forward),
            ProfileField::University => {
                self.university = cycle(&UniversityType::ALL, self.university, forward);
            }
            ProfileField::AcademicYear => {
                self.academic_year = cycle(&AcademicYear::ALL, self.academic_year, forward);
            }
            ProfileField::Scholarship => self.scholarship = !self.scholarship,
            ProfileField::Department | ProfileField::Cgpa => {}
        }
        self.error_message = None;
    }

    /// Add a character to the current text field
    pub fn input_char(&mut self, c: char) {
        if self.locked {
            return;
        }
        match self.current_field() {
            ProfileField::Department => {
                if !c.is_control() && self.department.chars().count() < MAX_DEPARTMENT_INPUT {
                    self.department.push(c);
                    self.error_message = None;
                }
            }
            ProfileField::Cgpa => {
                if (c.is_ascii_digit() || c == '.') && self.cgpa.len() < MAX_CGPA_INPUT {
                    self.cgpa.push(c);
                    self.error_message = None;
                }
            }
            _ => {}
        }
    }

    pub fn delete_char(&mut self) {
        if self.locked {
            return;
        }
        match self.current_field() {
            ProfileField::Department => {
                self.department.pop();
            }
            ProfileField::Cgpa => {
                self.cgpa.pop();
            }
            _ => {}
        }
    }

    pub fn clear_field(&mut self) {
        if self.locked {
            return;
        }
        match self.current_field() {
            ProfileField::Department => self.department.zeroize(),
            ProfileField::Cgpa => self.cgpa.zeroize(),
            _ => {}
        }
    }

    /// Convert the form into a validated profile.
    ///
    /// # Errors
    /// Returns every problem found, in field order.
    pub fn to_profile(&self) -> Result<StudentProfile, Vec<String>> {
        if self.cgpa.trim().is_empty() {
            return Err(vec!["CGPA is required".to_string()]);
        }
        let cgpa = StudentProfile::parse_cgpa(&self.cgpa);
        let profile = StudentProfile {
            age_group: self.age_group,
            gender: self.gender,
            university: self.university,
            department: self.department.trim().to_string(),
            academic_year: self.academic_year,
            cgpa: cgpa.unwrap_or_default(),
            scholarship: self.scholarship,
        };

        let mut errors = profile.validate().err().unwrap_or_default();
        if cgpa.is_none() {
            errors.insert(0, "CGPA must contain a number".to_string());
        }
        if errors.is_empty() {
            Ok(profile)
        } else {
            Err(errors)
        }
    }

    /// Validate and lock. Returns whether the form is now locked.
    pub fn lock(&mut self) -> bool {
        match self.to_profile() {
            Ok(_) => {
                self.locked = true;
                self.error_message = None;
            }
            Err(errors) => {
                self.locked = false;
                self.error_message = Some(errors.join(", "));
            }
        }
        self.locked
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Wipe the free-text buffers and return to defaults.
    pub fn clear_sensitive(&mut self) {
        self.department.zeroize();
        self.cgpa.zeroize();
        *self = Self::default();
    }

    fn display_value(&self, field: ProfileField) -> String {
        match field {
            ProfileField::AgeGroup => self.age_group.label().to_string(),
            ProfileField::Gender => self.gender.label().to_string(),
            ProfileField::University => self.university.label().to_string(),
            ProfileField::Department => self.department.clone(),
            ProfileField::AcademicYear => self.academic_year.label().to_string(),
            ProfileField::Cgpa => self.cgpa.clone(),
            ProfileField::Scholarship => if self.scholarship { "Yes" } else { "No" }.to_string(),
        }
    }
}

/// Render the profile form
pub fn render_profile_form(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], state);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let status = if state.locked {
        Span::styled(" │ Locked", CalmTheme::success())
    } else {
        Span::styled(" │ Editing", CalmTheme::text_secondary())
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CalmTheme::text()),
        Span::styled("Student Profile", CalmTheme::title()),
        status,
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = ProfileField::ALL.len().div_ceil(2);
    render_field_column(f, columns[0], &ProfileField::ALL[..mid], 0, state);
    render_field_column(f, columns[1], &ProfileField::ALL[mid..], mid, state);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[ProfileField],
    offset: usize,
    state: &ProfileFormState,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected_field;
        let (border_style, title_style) = if is_selected && !state.locked {
            (CalmTheme::border_focused(), CalmTheme::focused())
        } else {
            (CalmTheme::border(), CalmTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = state.display_value(*field);
        let mut spans = vec![Span::raw(" ")];
        if field.is_text() {
            if value.is_empty() {
                spans.push(Span::styled(field.hint(), CalmTheme::text_muted()));
            } else {
                spans.push(Span::styled(value, CalmTheme::text()));
            }
            if is_selected && !state.locked {
                spans.push(Span::styled("▌", CalmTheme::cursor()));
            }
        } else if is_selected && !state.locked {
            spans.push(Span::styled("◀ ", CalmTheme::key_hint()));
            spans.push(Span::styled(value, CalmTheme::focused()));
            spans.push(Span::styled(" ▶", CalmTheme::key_hint()));
        } else {
            spans.push(Span::styled(value, CalmTheme::text()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", CalmTheme::danger()),
            Span::styled(err.clone(), CalmTheme::danger()),
        ])
    } else if state.locked {
        Line::from(vec![
            Span::styled("[U] ", CalmTheme::key_hint()),
            Span::styled("Unlock ", CalmTheme::key_desc()),
            Span::styled("[Tab] ", CalmTheme::key_hint()),
            Span::styled("Questionnaire ", CalmTheme::key_desc()),
            Span::styled("[Esc] ", CalmTheme::key_hint()),
            Span::styled("Home", CalmTheme::key_desc()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", CalmTheme::key_hint()),
            Span::styled("Field ", CalmTheme::key_desc()),
            Span::styled("[←→] ", CalmTheme::key_hint()),
            Span::styled("Option ", CalmTheme::key_desc()),
            Span::styled("[Enter/L] ", CalmTheme::key_hint()),
            Span::styled(format!("Lock (CGPA ≤ {CGPA_MAX:.2}) "), CalmTheme::key_desc()),
            Span::styled("[Esc] ", CalmTheme::key_hint()),
            Span::styled("Home", CalmTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(footer, area);
}
