//! Profile form: onboarding and profile updates.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{LocationChange, OnboardingRequest, ProfileUpdate, UserProfile};
use crate::tui::styles::SunTheme;

use super::{render_footer, render_header};

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
}

const NAME: usize = 0;
const AGE: usize = 1;
const SKIN_TYPE: usize = 2;
const SKIN_CONDITION: usize = 3;
const CANCER_HISTORY: usize = 4;
const CITY: usize = 5;

/// What a submitted form asks for.
#[derive(Debug, Clone)]
pub struct ProfileSubmission {
    /// Completes onboarding when the profile has not been onboarded yet.
    pub onboarding: Option<OnboardingRequest>,
    pub update: ProfileUpdate,
    /// A city to geocode before saving.
    pub city: Option<String>,
}

/// Profile form state
pub struct ProfileFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    pub saving: bool,
    onboarded: bool,
    current_city: Option<String>,
}

impl Default for ProfileFormState {
    fn default() -> Self {
        let field = |label, hint| FormField {
            label,
            hint,
            value: String::new(),
        };
        Self {
            fields: vec![
                field("Name", "up to 50 characters"),
                field("Age", "years (1-120)"),
                field("Skin type", "Fitzpatrick I, II, III, IV, V or VI"),
                field(
                    "Skin condition",
                    "normal, eczema, psoriasis, vitiligo, skin_cancer, lupus, other",
                ),
                field("Skin cancer history", "y / n"),
                field("City", "e.g. Lisbon (leave empty to clear)"),
            ],
            selected_field: 0,
            error_message: None,
            saving: false,
            onboarded: false,
            current_city: None,
        }
    }
}

impl ProfileFormState {
    /// Prefill the form from a stored profile.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        let mut state = Self::default();
        state.fields[NAME].value = profile.name.clone();
        state.fields[AGE].value = profile.age.map(|a| a.to_string()).unwrap_or_default();
        state.fields[SKIN_TYPE].value = profile
            .skin_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();
        state.fields[SKIN_CONDITION].value = profile
            .skin_condition
            .map(|c| c.as_str().to_string())
            .unwrap_or_default();
        state.fields[CANCER_HISTORY].value =
            if profile.has_skin_cancer_history { "y" } else { "n" }.to_string();
        state.current_city = profile.preferred_location.as_ref().map(|l| l.name.clone());
        state.fields[CITY].value = state.current_city.clone().unwrap_or_default();
        state.onboarded = profile.onboarding_completed;
        state
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        let accept = match self.selected_field {
            AGE => c.is_ascii_digit() || c == '-',
            CANCER_HISTORY => matches!(c, 'y' | 'Y' | 'n' | 'N'),
            _ => !c.is_control(),
        };
        if accept {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    fn value(&self, index: usize) -> Option<String> {
        let v = self.fields[index].value.trim();
        (!v.is_empty()).then(|| v.to_string())
    }

    /// Turn the form into a submission.
    ///
    /// Only syntax is checked here; ranges and enums are validated by the
    /// domain layer.
    ///
    /// # Errors
    /// Returns a message if the age is not a number.
    pub fn to_submission(&self) -> Result<ProfileSubmission, String> {
        let age = match self.value(AGE) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| "Please enter a valid age (1-120)".to_string())?,
            ),
            None => None,
        };
        let history = self
            .value(CANCER_HISTORY)
            .map(|v| v.eq_ignore_ascii_case("y"));

        let city = self.value(CITY);
        let city_changed = city != self.current_city;
        let location = match (&city, city_changed) {
            (None, true) => Some(LocationChange::Clear),
            _ => None,
        };

        let update = ProfileUpdate {
            name: self.value(NAME),
            age,
            skin_type: self.value(SKIN_TYPE),
            skin_condition: self.value(SKIN_CONDITION),
            has_skin_cancer_history: history,
            location,
        };
        let onboarding = (!self.onboarded).then(|| OnboardingRequest {
            skin_type: update.skin_type.clone(),
            skin_condition: update.skin_condition.clone(),
            age,
            has_skin_cancer_history: history.unwrap_or(false),
            location: None,
        });

        Ok(ProfileSubmission {
            onboarding,
            update,
            city: if city_changed { city } else { None },
        })
    }
}

/// Render the profile form
pub fn render_profile_form(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(2), // Footer/error
        ])
        .split(area);

    let note = if state.onboarded {
        "Update your profile"
    } else {
        "Tell us about your skin to personalize advice"
    };
    render_header(f, chunks[0], "Profile", note);
    render_form_fields(f, chunks[1], state);

    let busy = state.saving.then_some("Saving profile");
    render_footer(
        f,
        chunks[2],
        state.error_message.as_deref(),
        busy,
        &[
            ("↑↓", "Navigate"),
            ("Enter", "Save"),
            ("Del", "Clear field"),
            ("Esc", "Back"),
        ],
    );
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ProfileFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = state.fields.len().div_ceil(2);

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
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
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (SunTheme::border_focused(), SunTheme::focused())
        } else {
            (SunTheme::border(), SunTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.hint, SunTheme::text_muted())
        } else {
            Span::styled(field.value.as_str(), SunTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", SunTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;

    #[test]
    fn test_new_profile_submits_onboarding() {
        let mut state = ProfileFormState::from_profile(&UserProfile::new("Ada"));
        state.fields[AGE].value = "34".to_string();
        state.fields[SKIN_TYPE].value = "ii".to_string();
        state.fields[SKIN_CONDITION].value = "eczema".to_string();
        state.fields[CANCER_HISTORY].value = "y".to_string();
        state.fields[CITY].value = "Lisbon".to_string();

        let submission = state.to_submission().expect("Should build");
        let onboarding = submission.onboarding.expect("Should onboard");
        assert_eq!(onboarding.age, Some(34));
        assert!(onboarding.has_skin_cancer_history);
        assert_eq!(submission.city.as_deref(), Some("Lisbon"));
        assert!(submission.update.location.is_none());
    }

    #[test]
    fn test_clearing_city_clears_location() {
        let mut profile = UserProfile::new("Ada");
        profile.onboarding_completed = true;
        profile.preferred_location = Some(Location::new("Porto", 41.15, -8.61));
        let mut state = ProfileFormState::from_profile(&profile);

        let unchanged = state.to_submission().expect("Should build");
        assert!(unchanged.onboarding.is_none());
        assert!(unchanged.city.is_none());
        assert!(unchanged.update.location.is_none());

        state.selected_field = CITY;
        state.clear_field();
        let cleared = state.to_submission().expect("Should build");
        assert_eq!(cleared.update.location, Some(LocationChange::Clear));
    }

    #[test]
    fn test_age_must_be_numeric() {
        let mut state = ProfileFormState::default();
        state.selected_field = AGE;
        state.input_char('x');
        assert!(state.fields[AGE].value.is_empty());
        state.fields[AGE].value = "1-2".to_string();
        assert!(state.to_submission().is_err());
    }
}
