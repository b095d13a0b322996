//! Section hierarchy and incremental numbering.
//!
//! Sections only reference their direct children. Resolution runs in three
//! phases: collect each section's child sections, expand every section into
//! its root-first ancestor chain, then rank siblings sharing a parent chain in
//! first-seen order to derive "1.2.4"-style numbering. Elements referenced by
//! a section inherit that section's numbering.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{AnalysisResult, ElementRef, Numbering};

/// Section ancestry and numbering for one analysis result.
#[derive(Debug, Clone, Default)]
pub struct SectionHierarchy {
    /// section index -> root-first chain of section indices ending in itself
    chains: BTreeMap<usize, Vec<usize>>,
    /// section index -> numbering (root sections have none)
    section_numbering: BTreeMap<usize, Numbering>,
    /// (collection, index) -> numbering of the containing section
    element_numbering: HashMap<(String, usize), Numbering>,
}

impl SectionHierarchy {
    /// Resolve the hierarchy of every section in `result`.
    pub fn resolve(result: &AnalysisResult) -> Self {
        if result.sections.is_empty() {
            return Self::default();
        }

        let children = direct_children(result);
        let chains = expand_chains(&children);
        let section_numbering = number_sections(&chains);

        let mut element_numbering = HashMap::new();
        for (section_idx, section) in result.sections.iter().enumerate() {
            let Some(numbering) = section_numbering.get(&section_idx) else {
                continue;
            };
            for path in &section.elements {
                match ElementRef::parse(path) {
                    Some(element) if !element.is_section() => {
                        element_numbering
                            .insert((element.collection, element.index), numbering.clone());
                    }
                    Some(_) => {}
                    None => log::warn!(
                        "section {} references malformed element path {:?}",
                        section_idx,
                        path
                    ),
                }
            }
        }

        Self {
            chains,
            section_numbering,
            element_numbering,
        }
    }

    /// Root-first ancestor chain of a section, including the section itself.
    pub fn chain(&self, section: usize) -> Option<&[usize]> {
        self.chains.get(&section).map(Vec::as_slice)
    }

    /// Numbering of a section. Root sections have none.
    pub fn section_numbering(&self, section: usize) -> Option<&Numbering> {
        self.section_numbering.get(&section)
    }

    /// Numbering inherited by a non-section element, looked up by its wire
    /// collection name ("paragraphs", "tables", "keyValuePairs", ...).
    pub fn element_numbering(&self, collection: &str, index: usize) -> Option<&Numbering> {
        if collection == "sections" {
            return self.section_numbering(index);
        }
        self.element_numbering.get(&(collection.to_string(), index))
    }

    pub fn section_count(&self) -> usize {
        self.chains.len()
    }
}

/// Phase 1: each section's child sections, in reference order.
fn direct_children(result: &AnalysisResult) -> Vec<Vec<usize>> {
    let count = result.sections.len();
    result
        .sections
        .iter()
        .enumerate()
        .map(|(section_idx, section)| {
            section
                .elements
                .iter()
                .filter_map(|path| ElementRef::parse(path))
                .filter(|element| element.is_section())
                .map(|element| element.index)
                .filter(|&child| {
                    if child >= count {
                        log::warn!(
                            "section {} references missing section {}",
                            section_idx,
                            child
                        );
                        false
                    } else {
                        child != section_idx
                    }
                })
                .collect()
        })
        .collect()
}

/// Phase 2: depth-first expansion into ancestor chains, starting from the
/// sections no other section references. Sections only reachable through a
/// cycle are expanded afterwards from the lowest index.
fn expand_chains(children: &[Vec<usize>]) -> BTreeMap<usize, Vec<usize>> {
    let referenced: HashSet<usize> = children.iter().flatten().copied().collect();
    let mut chains = BTreeMap::new();
    let mut visited = HashSet::new();

    let roots = (0..children.len()).filter(|idx| !referenced.contains(idx));
    for root in roots {
        expand(children, root, Vec::new(), &mut visited, &mut chains);
    }
    for idx in 0..children.len() {
        if !visited.contains(&idx) {
            log::warn!("section {} is only reachable through a cycle", idx);
            expand(children, idx, Vec::new(), &mut visited, &mut chains);
        }
    }
    chains
}

fn expand(
    children: &[Vec<usize>],
    section: usize,
    mut prefix: Vec<usize>,
    visited: &mut HashSet<usize>,
    chains: &mut BTreeMap<usize, Vec<usize>>,
) {
    if !visited.insert(section) {
        return;
    }
    prefix.push(section);
    chains.insert(section, prefix.clone());
    for &child in &children[section] {
        expand(children, child, prefix.clone(), visited, chains);
    }
}

/// Phase 3: rank siblings under each parent chain in first-seen order and
/// concatenate the ranks along every chain.
fn number_sections(chains: &BTreeMap<usize, Vec<usize>>) -> BTreeMap<usize, Numbering> {
    let mut ranks: HashMap<&[usize], Vec<usize>> = HashMap::new();
    for chain in chains.values() {
        if let Some((section, parent)) = chain.split_last() {
            if parent.is_empty() {
                continue;
            }
            let siblings = ranks.entry(parent).or_default();
            if !siblings.contains(section) {
                siblings.push(*section);
            }
        }
    }

    let rank_of = |parent: &[usize], section: usize| -> Option<u32> {
        ranks
            .get(parent)
            .and_then(|siblings| siblings.iter().position(|&s| s == section))
            .map(|pos| pos as u32 + 1)
    };

    chains
        .iter()
        .filter(|(_, chain)| chain.len() > 1)
        .filter_map(|(&section, chain)| {
            let levels = (1..chain.len())
                .map(|level| rank_of(&chain[..level], chain[level]))
                .collect::<Option<Vec<u32>>>()?;
            Some((section, Numbering::new(levels)))
        })
        .collect()
}
