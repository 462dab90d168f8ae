//! Pure rendering of the pod list model into a view tree
//!
//! The tree mirrors the page structure: a pod header, then directly after it
//! the pod's container group; inside the group each container header is
//! followed by its log block once that has arrived.

use std::fmt::Write as _;

use podscope_types::{ContainerKey, ElementId, Generation, LogBlock, PodName};

use crate::PodListModel;
use crate::text::sanitize_log;

/// Snapshot of everything the view displays
#[derive(Debug)]
pub struct ViewTree<'a> {
    pub generation: Generation,
    pub sections: Vec<PodSection<'a>>,
    /// Container shown in the log panel, with its log if fetched
    pub log_panel: Option<(&'a ContainerKey, Option<&'a LogBlock>)>,
    pub back_visible: bool,
}

/// A pod header and the group placed after it
#[derive(Debug)]
pub struct PodSection<'a> {
    pub pod: &'a PodName,
    /// `None` until the pod's containers have been rendered
    pub group: Option<Vec<ContainerEntry<'a>>>,
}

/// A container header and its log block
#[derive(Debug)]
pub struct ContainerEntry<'a> {
    pub key: &'a ContainerKey,
    pub log: Option<&'a LogBlock>,
}

/// One element of the pod list in document order
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    PodHeader(&'a PodName),
    ContainerGroup(&'a PodName),
    ContainerHeader(&'a ContainerKey),
    LogBlock(&'a LogBlock),
}

impl Node<'_> {
    /// Header id, for nodes that carry one
    pub fn id(&self) -> Option<ElementId> {
        match self {
            Self::PodHeader(pod) => Some(ElementId::Pod((*pod).clone())),
            Self::ContainerHeader(key) => Some(ElementId::Container((*key).clone())),
            Self::ContainerGroup(_) | Self::LogBlock(_) => None,
        }
    }
}

/// Describe the current model as a view tree
pub fn render(model: &PodListModel) -> ViewTree<'_> {
    let sections = model
        .entries()
        .iter()
        .map(|entry| PodSection {
            pod: &entry.pod,
            group: entry.group.as_ref().map(|group| {
                group
                    .iter()
                    .map(|key| ContainerEntry {
                        key,
                        log: model.log(key),
                    })
                    .collect()
            }),
        })
        .collect();

    ViewTree {
        generation: model.generation(),
        sections,
        log_panel: model.log_panel().map(|key| (key, model.log(key))),
        back_visible: model.back_visible(),
    }
}

impl<'a> ViewTree<'a> {
    /// Flatten the pod list into document order
    pub fn nodes(&self) -> Vec<Node<'a>> {
        let mut nodes = Vec::new();
        for section in &self.sections {
            nodes.push(Node::PodHeader(section.pod));
            if let Some(group) = &section.group {
                nodes.push(Node::ContainerGroup(section.pod));
                for entry in group {
                    nodes.push(Node::ContainerHeader(entry.key));
                    if let Some(block) = entry.log {
                        nodes.push(Node::LogBlock(block));
                    }
                }
            }
        }
        nodes
    }

    /// Ids of all headers in document order
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.nodes().iter().filter_map(Node::id).collect()
    }

    pub fn section(&self, pod: &PodName) -> Option<&PodSection<'a>> {
        self.sections.iter().find(|s| s.pod == pod)
    }

    /// Plain-text rendering, one indented line per element
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            let _ = writeln!(out, "{}", section.pod);
            let Some(group) = &section.group else {
                continue;
            };
            for entry in group {
                let _ = writeln!(out, "  {}", entry.key.container);
                match entry.log {
                    Some(block) => {
                        for line in sanitize_log(block.text.as_str()).lines() {
                            let _ = writeln!(out, "    | {}", line);
                        }
                    }
                    None => {
                        let _ = writeln!(out, "    (no logs)");
                    }
                }
            }
        }
        out
    }
}
