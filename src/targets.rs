//! Per-bucket registry of benchmarked targets and their column order.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetInfo {
    pub display_name: String,
    pub display_order: Option<i64>,
}

/// Target id → display info, remembering first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    entries: Vec<(String, TargetInfo)>,
    index: HashMap<String, usize>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An existing target keeps its encounter position.
    pub fn upsert(&mut self, target: &str, info: TargetInfo) {
        match self.index.get(target) {
            Some(&i) => self.entries[i].1 = info,
            None => {
                self.index.insert(target.to_string(), self.entries.len());
                self.entries.push((target.to_string(), info));
            }
        }
    }

    pub fn get(&self, target: &str) -> Option<&TargetInfo> {
        self.index.get(target).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TargetInfo)> {
        self.entries.iter().map(|(id, info)| (id.as_str(), info))
    }

    /// Column order: targets with a display order are stably sorted among
    /// the slots they occupy; targets without one stay where they are.
    pub fn ordered(&self) -> Vec<(&str, &TargetInfo)> {
        let mut out: Vec<(&str, &TargetInfo)> = self.iter().collect();
        let slots: Vec<usize> = (0..out.len())
            .filter(|&i| out[i].1.display_order.is_some())
            .collect();
        let mut ranked: Vec<(&str, &TargetInfo)> = slots.iter().map(|&i| out[i]).collect();
        ranked.sort_by_key(|(_, info)| info.display_order);
        for (slot, entry) in slots.into_iter().zip(ranked) {
            out[slot] = entry;
        }
        out
    }
}
