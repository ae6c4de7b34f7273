use indexmap::IndexSet;

use crate::model::NegotiationResponse;

/// Which offered files the receiver took.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// In the order the receiver enumerated them.
    pub accepted: Vec<String>,
    /// In the order they were offered.
    pub skipped: Vec<String>,
}

impl Partition {
    /// True when the receiver took none of the offered files.
    pub fn nothing_accepted(&self) -> bool {
        self.accepted.is_empty()
    }
}

pub fn partition<'a, I>(requested: I, response: &NegotiationResponse) -> Partition
where
    I: IntoIterator<Item = &'a str>,
{
    let requested: IndexSet<&str> = requested.into_iter().collect();

    let mut accepted = Vec::with_capacity(response.files.len());
    for id in response.files.keys() {
        if requested.contains(id.as_str()) {
            accepted.push(id.clone());
        } else {
            log::warn!("Receiver returned a token for unknown file id {}", id);
        }
    }

    let skipped = requested
        .into_iter()
        .filter(|id| !response.files.contains_key(*id))
        .map(str::to_string)
        .collect();

    Partition { accepted, skipped }
}
