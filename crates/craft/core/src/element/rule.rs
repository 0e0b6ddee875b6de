//! Authored aggregation rules.

use std::collections::BTreeSet;

/// Which matched element's identity is displayed for a multi-match rule.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MultiShow {
    /// The rule's own identity.
    #[default]
    Default,
    /// The matched element with the largest quantity.
    Max,
    /// The matched element with the smallest quantity.
    Min,
}

/// How the quantities of several matched elements combine into one number.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MultiValue {
    /// Sum of every match; matches are also listed individually.
    #[default]
    All,
    OnlyMax,
    OnlyMin,
    /// Max plus the sum of the others.
    MaxPlus,
    /// Max minus the sum of the others.
    MaxMinus,
    MinPlus,
    MinMinus,
}

/// When an aggregated element appears in the display projection.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Visibility {
    #[default]
    Always,
    Never,
    WhenPositive,
    WhenNonPositive,
}

impl Visibility {
    /// Returns true if an entry with quantity `num` is displayed.
    pub fn shows(self, num: i32) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::WhenPositive => num > 0,
            Self::WhenNonPositive => num <= 0,
        }
    }
}

/// Display shape of an aggregated element.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Shape {
    #[default]
    Circle,
    Square,
    Diamond,
    Hexagon,
}

/// Governs how one or more element ids combine into one displayed and usable
/// value.
///
/// `plus_ids` and `minus_ids` never take part in the `multi_show` /
/// `multi_value` selection. They only shift the final number, and only when
/// that number is nonzero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ElementAggregationRule {
    /// Identity used for placeholders and [`MultiShow::Default`].
    pub id: String,
    pub name: String,
    pub img: String,
    pub color: String,
    pub shape: Shape,
    /// Element ids claimed by this rule.
    pub ids: BTreeSet<String>,
    pub multi_show: MultiShow,
    pub multi_value: MultiValue,
    pub plus_ids: BTreeSet<String>,
    pub minus_ids: BTreeSet<String>,
    pub use_min: bool,
    pub min: i32,
    pub use_max: bool,
    pub max: i32,
    pub visibility: Visibility,
    /// Reference magnitude for the display size; `0` means full size.
    pub value: i32,
}

impl ElementAggregationRule {
    pub fn new(id: impl Into<String>, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn multi_value(mut self, multi_value: MultiValue) -> Self {
        self.multi_value = multi_value;
        self
    }

    #[must_use]
    pub fn multi_show(mut self, multi_show: MultiShow) -> Self {
        self.multi_show = multi_show;
        self
    }

    #[must_use]
    pub fn plus(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.plus_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn minus(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.minus_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn min(mut self, min: i32) -> Self {
        self.use_min = true;
        self.min = min;
        self
    }

    #[must_use]
    pub fn max(mut self, max: i32) -> Self {
        self.use_max = true;
        self.max = max;
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn claims(&self, element_id: &str) -> bool {
        self.ids.contains(element_id)
    }

    /// Applies the one-sided clamps.
    ///
    /// Each bound only acts on values beyond it; an unset bound never clamps.
    pub fn clamp(&self, num: i32) -> i32 {
        let mut num = num;
        if self.use_min && num < self.min {
            num = self.min;
        }
        if self.use_max && num > self.max {
            num = self.max;
        }
        num
    }

    /// Display size in `0..=100` for an entry of quantity `num`.
    pub fn size_of(&self, num: i32) -> u8 {
        if self.value <= 0 {
            return 100;
        }
        let percent = (i64::from(num) * 100) / i64::from(self.value);
        percent.clamp(0, 100) as u8
    }
}
