/// Synthesis group formation and the optional singleton merge
use crate::core::affinity::Cluster;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: usize,
    /// Fragment ids in assembly order
    pub members: Vec<usize>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingOptions {
    pub max_group_size: usize,
    pub max_group_length: Option<usize>,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            max_group_size: 3,
            max_group_length: None,
        }
    }
}

/// Draw groups from the clusters, one fragment per cluster.
///
/// Each pass visits the non-empty clusters from largest to smallest
/// (lower cluster position first on ties) and takes the lowest remaining
/// fragment id of each until the group is full. With a length cap, a
/// fragment that would push the group over the cap is skipped for this pass;
/// the first fragment of a group is always taken. Members are stored in
/// ascending fragment-id order.
///
/// `length_of` maps a fragment id to its sequence length.
pub fn form_groups<F>(clusters: &[Cluster], length_of: F, options: GroupingOptions) -> Vec<Group>
where
    F: Fn(usize) -> usize,
{
    let mut queues: Vec<VecDeque<usize>> = clusters
        .iter()
        .map(|cluster| {
            let mut members = cluster.members.clone();
            members.sort_unstable();
            members.into()
        })
        .collect();

    let mut groups = Vec::new();

    loop {
        let mut order: Vec<usize> = (0..queues.len()).filter(|&c| !queues[c].is_empty()).collect();
        if order.is_empty() {
            break;
        }
        order.sort_by(|&a, &b| queues[b].len().cmp(&queues[a].len()).then(a.cmp(&b)));

        let mut members = Vec::with_capacity(options.max_group_size);
        let mut total_length = 0usize;

        for c in order {
            if members.len() == options.max_group_size {
                break;
            }
            let Some(&fragment) = queues[c].front() else {
                continue;
            };
            let length = length_of(fragment);
            if let Some(cap) = options.max_group_length {
                if !members.is_empty() && total_length + length > cap {
                    continue;
                }
            }
            queues[c].pop_front();
            members.push(fragment);
            total_length += length;
        }

        members.sort_unstable();
        groups.push(Group {
            id: groups.len(),
            members,
        });
    }

    groups
}

/// Pair single-fragment groups in ascending group-id order.
///
/// The merged group sits where its first singleton was and lists the two
/// fragments in encounter order; an odd singleton out is left alone. Larger
/// groups pass through untouched. Ids are renumbered from zero afterwards.
pub fn aggressive_merge(mut groups: Vec<Group>) -> Vec<Group> {
    groups.sort_by_key(|g| g.id);

    let mut merged: Vec<Group> = Vec::with_capacity(groups.len());
    let mut waiting: Option<usize> = None;

    for group in groups {
        if !group.is_singleton() {
            merged.push(group);
            continue;
        }
        match waiting.take() {
            Some(slot) => merged[slot].members.extend(group.members),
            None => {
                waiting = Some(merged.len());
                merged.push(group);
            }
        }
    }

    for (id, group) in merged.iter_mut().enumerate() {
        group.id = id;
    }

    merged
}
