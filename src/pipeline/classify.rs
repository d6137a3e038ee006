//! Long-form / short-form partitioning by duration.

use serde::{Deserialize, Serialize};

use super::types::ScoredItem;

/// Videos at or under this many seconds are short-form.
pub const SHORT_FORM_MAX_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    LongForm,
    ShortForm,
}

impl FormFactor {
    #[must_use]
    pub fn of(duration_seconds: u64, short_form_max_seconds: u64) -> Self {
        if duration_seconds <= short_form_max_seconds {
            Self::ShortForm
        } else {
            Self::LongForm
        }
    }
}

/// Both categories, each in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub long_form: Vec<ScoredItem>,
    pub short_form: Vec<ScoredItem>,
}

/// Splits scored items by [`FormFactor`]. Every item lands in exactly one list.
#[must_use]
pub fn classify(items: Vec<ScoredItem>, short_form_max_seconds: u64) -> Partition {
    let (short_form, long_form): (Vec<_>, Vec<_>) = items.into_iter().partition(|scored| {
        FormFactor::of(scored.item.duration_seconds(), short_form_max_seconds)
            == FormFactor::ShortForm
    });

    Partition {
        long_form,
        short_form,
    }
}
