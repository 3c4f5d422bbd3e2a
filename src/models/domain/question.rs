use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A generated multiple-choice question. Field names follow the JSON the model
/// is asked to produce.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub multi_select: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    #[serde(rename = "option")]
    pub label: String,
    pub is_correct: bool,
}

/// The option(s) a user picked for the current question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Single(usize),
    Multi(BTreeSet<usize>),
}

impl Selection {
    /// Builds a selection from raw indices; `None` when nothing was picked.
    pub fn from_indices(indices: &[usize]) -> Option<Self> {
        match indices {
            [] => None,
            [index] => Some(Selection::Single(*index)),
            many => Some(Selection::Multi(many.iter().copied().collect())),
        }
    }

    pub fn indices(&self) -> BTreeSet<usize> {
        match self {
            Selection::Single(index) => BTreeSet::from([*index]),
            Selection::Multi(indices) => indices.clone(),
        }
    }
}

impl Question {
    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct)
            .map(|(index, _)| index)
            .collect()
    }

    /// First index in `selection` that this question has no option for.
    pub fn out_of_range_index(&self, selection: &Selection) -> Option<usize> {
        selection
            .indices()
            .into_iter()
            .find(|index| *index >= self.options.len())
    }

    /// A selection is correct when it picks every correct option and nothing else.
    pub fn is_correct_selection(&self, selection: &Selection) -> bool {
        let correct = self.correct_indices();
        !correct.is_empty() && selection.indices() == correct
    }

    pub fn option_labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }
}
