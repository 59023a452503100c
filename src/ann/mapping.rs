use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{Ann, AnnType};
use crate::addr::BankAddr;
use crate::error::AnnError;

/// Annotations indexed by address and by label.
///
/// Built once from the parsed annotation and symbol files, then only read.
/// Several annotations may share an address; a label may only name one
/// address.
#[derive(Debug, Clone, Default)]
pub struct AnnMapping {
    anns_at: BTreeMap<BankAddr, BTreeSet<Ann>>,
    label_addrs: HashMap<String, BankAddr>,
}

impl AnnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_anns<I: IntoIterator<Item = Ann>>(anns: I) -> Result<Self, AnnError> {
        let mut mapping = Self::new();
        for ann in anns {
            mapping.add(ann)?;
        }
        Ok(mapping)
    }

    pub fn add(&mut self, ann: Ann) -> Result<(), AnnError> {
        if !ann.label.is_empty() {
            match self.label_addrs.get(&ann.label) {
                Some(&existing) if existing != ann.addr => {
                    return Err(AnnError::DuplicateLabel {
                        label: ann.label,
                        existing,
                        new: ann.addr,
                    });
                }
                Some(_) => {}
                None => {
                    self.label_addrs.insert(ann.label.clone(), ann.addr);
                }
            }
        }
        self.anns_at.entry(ann.addr).or_default().insert(ann);
        Ok(())
    }

    pub fn has(&self, ann: &Ann) -> bool {
        self.anns_at.get(&ann.addr).is_some_and(|set| set.contains(ann))
    }

    pub fn label_address(&self, label: &str) -> Option<BankAddr> {
        self.label_addrs.get(label).copied()
    }

    pub fn anns_at(&self, addr: BankAddr) -> impl Iterator<Item = &Ann> {
        self.anns_at.get(&addr).into_iter().flatten()
    }

    /// Distinct non-empty labels at `addr`, in order.
    pub fn labels_at(&self, addr: BankAddr) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .anns_at(addr)
            .filter(|ann| !ann.label.is_empty())
            .map(|ann| ann.label.as_str())
            .collect();
        labels.dedup();
        labels
    }

    pub fn label_at(&self, addr: BankAddr) -> Option<&str> {
        self.labels_at(addr).into_iter().next()
    }

    /// The first annotation at `addr` whose type forces data emission.
    pub fn data_type_at(&self, addr: BankAddr) -> Option<&AnnType> {
        self.anns_at(addr).filter_map(|ann| ann.ty.as_ref()).find(|ty| ty.is_data())
    }

    /// Whether a label or a data annotation sits strictly after `start` and
    /// before `end`. Such addresses must start a line of output.
    pub fn has_anchor_between(&self, start: BankAddr, end: BankAddr) -> bool {
        let Some(first) = start.next() else {
            return false;
        };
        if first >= end {
            return false;
        }
        self.anns_at
            .range(first..end)
            .flat_map(|(_, set)| set)
            .any(|ann| !ann.label.is_empty() || ann.ty.as_ref().is_some_and(AnnType::is_data))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ann> {
        self.anns_at.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.anns_at.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.anns_at.is_empty()
    }
}
