use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::form::{CompanionType, TripFormData};

/// Stable identifier of a wizard step. The current step is stored as an
/// identifier, never a bare index, so changing the active sequence never
/// requires index arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Region,
    Guests,
    Companion,
    Style,
    Pace,
    Details,
}

const GROUP_SEQUENCE: &[StepId] = &[
    StepId::Region,
    StepId::Guests,
    StepId::Companion,
    StepId::Style,
    StepId::Pace,
    StepId::Details,
];

const SOLO_SEQUENCE: &[StepId] = &[
    StepId::Region,
    StepId::Guests,
    StepId::Style,
    StepId::Pace,
    StepId::Details,
];

/// The step ordering for a party size. Solo travelers skip the companion
/// step; their companion type is fixed to Solo instead.
pub fn sequence_for(guests: u32) -> &'static [StepId] {
    if guests <= 1 {
        SOLO_SEQUENCE
    } else {
        GROUP_SEQUENCE
    }
}

/// Why the wizard refused to advance. Shown to the user as a blocking
/// message; state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepBlocked {
    #[error("select or enter a destination first")]
    NeedDestination,
    #[error("at least one guest is required")]
    NeedGuests,
    #[error("select who you are traveling with")]
    NeedCompanion,
    #[error("select at least one interest")]
    NeedInterests,
    #[error("select a travel pace")]
    NeedPace,
    #[error("fill in the dates and room count")]
    NeedDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(StepId),
    /// Already on the last step and it validated; the caller submits now.
    ReadyToSubmit,
}

/// The wizard: a draft form plus a current step, advancing only through
/// validated steps.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub form: TripFormData,
    step: StepId,
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            form: TripFormData::new(),
            step: StepId::Region,
        }
    }

    /// Rebuild from persisted state. A step that is not part of the active
    /// sequence (e.g. Companion restored after guests dropped to 1) is
    /// re-mapped the same way `set_guests` does.
    pub fn restore(form: TripFormData, step: StepId) -> Self {
        let mut state = Self { form, step };
        state.remap_step();
        state
    }

    pub fn step(&self) -> StepId {
        self.step
    }

    pub fn sequence(&self) -> &'static [StepId] {
        sequence_for(self.form.guests)
    }

    /// 1-based position of the current step and the sequence length, for
    /// the progress header.
    pub fn progress(&self) -> (usize, usize) {
        let sequence = self.sequence();
        let position = sequence
            .iter()
            .position(|s| *s == self.step)
            .unwrap_or(0);
        (position + 1, sequence.len())
    }

    pub fn is_last_step(&self) -> bool {
        self.sequence().last() == Some(&self.step)
    }

    /// Validity predicate of the current step.
    pub fn validate_current(&self) -> Result<(), StepBlocked> {
        match self.step {
            StepId::Region => {
                if self.form.destination().trim().is_empty() {
                    Err(StepBlocked::NeedDestination)
                } else {
                    Ok(())
                }
            }
            StepId::Guests => {
                if self.form.guests < 1 {
                    Err(StepBlocked::NeedGuests)
                } else {
                    Ok(())
                }
            }
            StepId::Companion => {
                if self.form.companion_type.is_none() {
                    Err(StepBlocked::NeedCompanion)
                } else {
                    Ok(())
                }
            }
            StepId::Style => {
                if self.form.interests.is_empty() {
                    Err(StepBlocked::NeedInterests)
                } else {
                    Ok(())
                }
            }
            StepId::Pace => {
                if self.form.travel_pace.is_none() {
                    Err(StepBlocked::NeedPace)
                } else {
                    Ok(())
                }
            }
            StepId::Details => {
                if self.form.rooms < 1
                    || self.form.start_date.is_none()
                    || self.form.end_date.is_none()
                {
                    Err(StepBlocked::NeedDetails)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Move forward one step if the current one validates. Blocked
    /// advancement changes nothing and reports why.
    pub fn advance(&mut self) -> Result<Advance, StepBlocked> {
        self.validate_current()?;
        let sequence = self.sequence();
        let position = sequence
            .iter()
            .position(|s| *s == self.step)
            .unwrap_or(0);
        match sequence.get(position + 1) {
            Some(next) => {
                self.step = *next;
                Ok(Advance::Moved(*next))
            }
            None => Ok(Advance::ReadyToSubmit),
        }
    }

    /// Move back one step, unconditionally, clamped at the first step.
    pub fn go_back(&mut self) {
        let sequence = self.sequence();
        let position = sequence
            .iter()
            .position(|s| *s == self.step)
            .unwrap_or(0);
        if position > 0 {
            self.step = sequence[position - 1];
        }
    }

    /// Change the party size. Going solo forces the companion type and
    /// drops the companion step from the sequence; growing the party again
    /// re-asks the companion question.
    pub fn set_guests(&mut self, guests: u32) {
        self.form.guests = guests.max(1);
        if self.form.guests == 1 {
            self.form.companion_type = Some(CompanionType::Solo);
        } else if self.form.companion_type == Some(CompanionType::Solo) {
            self.form.companion_type = None;
        }
        self.remap_step();
    }

    /// Add or remove an interest tag; travel_style mirrors the set as a
    /// comma-joined string.
    pub fn toggle_interest(&mut self, tag: &str) {
        if let Some(idx) = self.form.interests.iter().position(|t| t == tag) {
            self.form.interests.remove(idx);
        } else {
            self.form.interests.push(tag.to_string());
        }
        self.form.travel_style = self.form.interests.join(",");
    }

    fn remap_step(&mut self) {
        if !self.sequence().contains(&self.step) {
            // the only removable step is Companion; its slot falls to Style
            self.step = StepId::Style;
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}
