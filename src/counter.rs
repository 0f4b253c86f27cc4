//! Exact counting of board completions per placement.
//!
//! For a placement `p`, the other remaining ships are labelled slots. The
//! number of ways to fill every slot with placements that are pairwise
//! compatible and compatible with `p` is computed by inclusion–exclusion over
//! subsets of slot pairs: each subset splits into connected components whose
//! joint assignments (every linked pair in conflict) are enumerated with an
//! explicit stack, while unlinked slots contribute their candidate count.
//! Coverage of occupied groups is enforced by a second inclusion–exclusion
//! over subsets of groups whose cells are forbidden for that term.
//!
//! With too many other ships the pair expansion is replaced by a product
//! estimate: the baseline scaled by, for every slot pair, the fraction of
//! its candidate pairs that do not conflict. The estimate is never negative.
//!
//! Labelling equal-length ships multiplies every completion by the same
//! `Π k!` once `p`'s count is weighted by the multiplicity of its length, so
//! normalised results equal those of unordered counting.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use crate::bitboard::CellMask;
use crate::compat::{CompatibilityIndex, PlacementArena, PlacementId, PlacementSet};
use crate::config::{EngineConfig, MAX_EXACT_PAIRS};
use crate::groups::OccupiedGroup;

/// Subsets of occupied groups are enumerated exhaustively up to this size.
const MAX_EXACT_GROUPS: usize = 20;

/// Fixed-point scale of estimated counts. Every placement of one recompute
/// shares it, so it cancels in normalisation.
const ESTIMATE_SCALE: f64 = 1_048_576.0;

/// A count together with whether it hit the `i128` ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub value: i128,
    pub saturated: bool,
}

impl Tally {
    fn mul(&mut self, factor: i128) {
        match self.value.checked_mul(factor) {
            Some(v) => self.value = v,
            None => {
                self.value = i128::MAX;
                self.saturated = true;
            }
        }
    }

    fn add(&mut self, term: i128) {
        match self.value.checked_add(term) {
            Some(v) => self.value = v,
            None => {
                self.value = if term > 0 { i128::MAX } else { i128::MIN };
                self.saturated = true;
            }
        }
    }
}

/// Raw per-placement weights and how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    /// Signed completion count per arena handle, weighted by multiplicity.
    pub per_placement: Vec<i128>,
    /// Some plan replaced the pair expansion with the product estimate.
    pub pairs_estimated: bool,
    /// Group-subset order used when the group expansion was truncated.
    pub group_order: Option<usize>,
    pub saturated: bool,
}

impl Counts {
    pub fn is_exact(&self) -> bool {
        !self.pairs_estimated && self.group_order.is_none() && !self.saturated
    }
}

/// Slots of one connected set of conflicting pairs, in binding order.
#[derive(Debug, Clone)]
struct Component {
    /// Slots, each linked to an earlier one.
    order: Vec<usize>,
    /// For `order[d]`, the depths of earlier slots it must conflict with.
    links: Vec<Vec<usize>>,
}

#[derive(Debug, Clone)]
struct Term {
    negative: bool,
    components: Vec<usize>,
    free: Vec<usize>,
}

/// Inclusion–exclusion terms for the ships left once one ship of a bucket
/// is fixed.
#[derive(Debug, Clone)]
struct SlotPlan {
    /// Bucket of every other ship.
    slots: Vec<usize>,
    components: Vec<Component>,
    terms: Vec<Term>,
    /// Single-pair component per slot pair, filled when estimating.
    pair_components: Vec<usize>,
    estimated: bool,
}

impl SlotPlan {
    fn build(arena: &PlacementArena, fixed: usize, config: &EngineConfig) -> Self {
        let mut slots = Vec::new();
        for (b, bucket) in arena.buckets().iter().enumerate() {
            let count = bucket.multiplicity - usize::from(b == fixed);
            slots.extend(core::iter::repeat(b).take(count));
        }
        let n = slots.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                pairs.push((i, j));
            }
        }

        let exact = n <= config.max_exact_ships && pairs.len() <= MAX_EXACT_PAIRS;
        let subsets: Vec<Vec<usize>> = if exact {
            (0u32..1 << pairs.len())
                .map(|mask| (0..pairs.len()).filter(|&i| mask & (1 << i) != 0).collect())
                .collect()
        } else {
            combinations(pairs.len(), 1)
        };

        let mut components = Vec::new();
        let mut seen: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
        let mut terms = Vec::with_capacity(subsets.len());
        let mut pair_components = Vec::new();
        for subset in subsets {
            if !exact {
                let id = components.len();
                components.push(Component::build(&pairs, &subset));
                pair_components.push(id);
                continue;
            }
            let mut term = Term {
                negative: subset.len() % 2 == 1,
                components: Vec::new(),
                free: Vec::new(),
            };
            for group in split_components(n, &pairs, &subset) {
                let id = *seen.entry(group.clone()).or_insert_with(|| {
                    components.push(Component::build(&pairs, &group));
                    components.len() - 1
                });
                term.components.push(id);
            }
            let mut linked = vec![false; n];
            for &pi in &subset {
                linked[pairs[pi].0] = true;
                linked[pairs[pi].1] = true;
            }
            term.free = (0..n).filter(|&s| !linked[s]).collect();
            terms.push(term);
        }

        log::trace!(
            "bucket {}: {} slots, {} terms, {} components, exact={}",
            fixed,
            n,
            terms.len(),
            components.len(),
            exact
        );
        SlotPlan {
            slots,
            components,
            terms,
            pair_components,
            estimated: !exact,
        }
    }
}

impl Component {
    fn build(pairs: &[(usize, usize)], members: &[usize]) -> Self {
        let links_of = |s: usize| {
            members.iter().filter_map(move |&pi| {
                let (a, b) = pairs[pi];
                if a == s {
                    Some(b)
                } else if b == s {
                    Some(a)
                } else {
                    None
                }
            })
        };
        let first = pairs[members[0]].0;
        let mut order = vec![first];
        let mut cursor = 0;
        while cursor < order.len() {
            let current = order[cursor];
            cursor += 1;
            for other in links_of(current) {
                if !order.contains(&other) {
                    order.push(other);
                }
            }
        }
        let links = order
            .iter()
            .enumerate()
            .map(|(depth, &slot)| {
                links_of(slot)
                    .filter_map(|other| order.iter().position(|&o| o == other))
                    .filter(|&d| d < depth)
                    .collect()
            })
            .collect();
        Component { order, links }
    }
}

/// Group the pair indices of `subset` by connected component over slots.
/// Each group is sorted, groups are ordered by their first pair.
fn split_components(n: usize, pairs: &[(usize, usize)], subset: &[usize]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..n).collect();
    fn root(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }
    for &pi in subset {
        let (a, b) = pairs[pi];
        let (ra, rb) = (root(&mut parent, a), root(&mut parent, b));
        if ra != rb {
            parent[ra] = rb;
        }
    }
    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for &pi in subset {
        let r = root(&mut parent, pairs[pi].0);
        match groups.iter_mut().find(|(gr, _)| *gr == r) {
            Some((_, members)) => members.push(pi),
            None => groups.push((r, vec![pi])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

/// All `k`-element subsets of `0..n` in lexicographic order.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());
        let mut i = k;
        loop {
            if i == 0 {
                return out;
            }
            i -= 1;
            if idx[i] < n - k + i {
                break;
            }
        }
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Thread pool for the outer placement loop, `None` for a single worker.
#[cfg(feature = "std")]
fn worker_pool(workers: usize) -> Option<rayon::ThreadPool> {
    if workers <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            log::warn!("could not start {} workers, counting on one thread: {}", workers, err);
            None
        }
    }
}

/// Counts completions for every placement in an arena.
pub struct ConfigurationCounter<'a> {
    arena: &'a PlacementArena,
    index: &'a CompatibilityIndex,
    config: EngineConfig,
    plans: Vec<SlotPlan>,
    #[cfg(feature = "std")]
    pool: Option<rayon::ThreadPool>,
}

impl<'a> ConfigurationCounter<'a> {
    pub fn new(arena: &'a PlacementArena, index: &'a CompatibilityIndex, config: EngineConfig) -> Self {
        let plans = (0..arena.buckets().len())
            .map(|b| SlotPlan::build(arena, b, &config))
            .collect();
        Self {
            arena,
            index,
            config,
            plans,
            #[cfg(feature = "std")]
            pool: worker_pool(config.workers),
        }
    }

    /// Weighted completion counts covering every group, per placement.
    pub fn count(&self, groups: &[OccupiedGroup]) -> Counts {
        let m = groups.len();
        let exact_groups = m <= self.config.max_exact_groups.min(MAX_EXACT_GROUPS);
        let subsets: Vec<Vec<usize>> = if exact_groups {
            (0u32..1 << m)
                .map(|mask| (0..m).filter(|&i| mask & (1 << i) != 0).collect())
                .collect()
        } else {
            log::warn!(
                "{} occupied groups, truncating group expansion at order {}",
                m,
                self.config.group_order
            );
            (0..=self.config.group_order.min(m))
                .flat_map(|k| combinations(m, k))
                .collect()
        };

        let mut per_placement = vec![0i128; self.arena.len()];
        let mut saturated = false;
        for subset in &subsets {
            let negative = subset.len() % 2 == 1;
            let forbidden = subset
                .iter()
                .fold(CellMask::new(), |acc, &g| acc | groups[g].mask);
            let filters: Vec<PlacementSet> = (0..self.arena.buckets().len())
                .map(|b| self.arena.avoiding(b, forbidden))
                .collect();
            if filters.iter().any(PlacementSet::is_empty) {
                continue;
            }
            let jobs: Vec<PlacementId> = filters
                .iter()
                .enumerate()
                .flat_map(|(b, set)| {
                    let start = self.arena.buckets()[b].range.start;
                    set.iter().map(move |pos| start + pos)
                })
                .collect();
            let tallies = self.evaluate(&jobs, &filters);
            for (&p, tally) in jobs.iter().zip(tallies) {
                let multiplicity = self.arena.buckets()[self.arena.bucket_of(p)].multiplicity as i128;
                let mut weighted = tally;
                weighted.mul(multiplicity);
                saturated |= weighted.saturated;
                let mut acc = Tally {
                    value: per_placement[p],
                    saturated: false,
                };
                acc.add(if negative { -weighted.value } else { weighted.value });
                saturated |= acc.saturated;
                per_placement[p] = acc.value;
            }
        }

        let pairs_estimated = self.plans.iter().any(|plan| plan.estimated);
        if pairs_estimated {
            log::warn!("too many ships for exact pair expansion, using the pairwise estimate");
        }
        log::debug!(
            "counted {} placements over {} group subsets",
            self.arena.len(),
            subsets.len()
        );
        Counts {
            per_placement,
            pairs_estimated,
            group_order: (!exact_groups).then_some(self.config.group_order),
            saturated,
        }
    }

    fn evaluate(&self, jobs: &[PlacementId], filters: &[PlacementSet]) -> Vec<Tally> {
        #[cfg(feature = "std")]
        {
            use rayon::prelude::*;

            if let Some(pool) = self.pool.as_ref().filter(|_| jobs.len() > 1) {
                return pool.install(|| {
                    jobs.par_iter()
                        .map(|&p| self.count_placement(p, filters))
                        .collect()
                });
            }
        }
        jobs.iter().map(|&p| self.count_placement(p, filters)).collect()
    }

    /// Ways to fill every other slot given `p`, within `filters`.
    fn count_placement(&self, p: PlacementId, filters: &[PlacementSet]) -> Tally {
        let plan = &self.plans[self.arena.bucket_of(p)];
        let candidates: Vec<PlacementSet> = filters
            .iter()
            .enumerate()
            .map(|(b, filter)| {
                let mut set = filter.clone();
                set.difference_with(self.index.conflicts(p, b));
                set
            })
            .collect();
        let sizes: Vec<i128> = candidates.iter().map(|c| c.count() as i128).collect();
        if plan.slots.iter().any(|&b| sizes[b] == 0) {
            return Tally::default();
        }

        if plan.estimated {
            return self.estimate_placement(plan, &candidates, &sizes);
        }

        let mut memo: Vec<Option<i128>> = vec![None; plan.components.len()];
        let mut total = Tally::default();
        for term in &plan.terms {
            let mut value = Tally {
                value: 1,
                saturated: false,
            };
            for &c in &term.components {
                let f = *memo[c].get_or_insert_with(|| {
                    self.count_component(&plan.components[c], &plan.slots, &candidates)
                });
                value.mul(f);
                if value.value == 0 {
                    break;
                }
            }
            if value.value != 0 {
                for &s in &term.free {
                    value.mul(sizes[plan.slots[s]]);
                }
            }
            total.saturated |= value.saturated;
            total.add(if term.negative { -value.value } else { value.value });
        }
        total
    }

    /// Baseline times the share of compatible candidate pairs of every slot
    /// pair, scaled by [`ESTIMATE_SCALE`].
    fn estimate_placement(&self, plan: &SlotPlan, candidates: &[PlacementSet], sizes: &[i128]) -> Tally {
        let mut estimate: f64 = ESTIMATE_SCALE * plan.slots.iter().map(|&b| sizes[b] as f64).product::<f64>();
        for &c in &plan.pair_components {
            let component = &plan.components[c];
            let (a, b) = (plan.slots[component.order[0]], plan.slots[component.order[1]]);
            let conflicting = self.count_component(component, &plan.slots, candidates) as f64;
            let joint = sizes[a] as f64 * sizes[b] as f64;
            estimate *= (1.0 - conflicting / joint).max(0.0);
        }
        let rounded = libm::round(estimate);
        if rounded >= i128::MAX as f64 {
            return Tally {
                value: i128::MAX,
                saturated: true,
            };
        }
        Tally {
            value: rounded as i128,
            saturated: false,
        }
    }

    /// Assignments of a component's slots in which every linked pair
    /// conflicts. Depth-first over an explicit stack; the deepest slot only
    /// contributes the size of its candidate set.
    fn count_component(&self, component: &Component, slots: &[usize], candidates: &[PlacementSet]) -> i128 {
        let order = &component.order;
        let depth_max = order.len() - 1;
        let bucket_at = |d: usize| slots[order[d]];
        let start_of = |b: usize| self.arena.buckets()[b].range.start;

        let mut chosen: Vec<PlacementId> = vec![0; order.len()];
        let mut stack: Vec<(Vec<usize>, usize)> = vec![(candidates[bucket_at(0)].iter().collect(), 0)];
        let mut total: i128 = 0;
        while let Some(depth) = stack.len().checked_sub(1) {
            let frame = &mut stack[depth];
            if frame.1 >= frame.0.len() {
                stack.pop();
                continue;
            }
            let pos = frame.0[frame.1];
            frame.1 += 1;
            chosen[depth] = start_of(bucket_at(depth)) + pos;

            let next = depth + 1;
            let next_bucket = bucket_at(next);
            let links = &component.links[next];
            if next == depth_max && links.len() == 1 {
                let hits = candidates[next_bucket]
                    .intersection_count(self.index.conflicts(chosen[links[0]], next_bucket));
                total = total.saturating_add(hits as i128);
                continue;
            }
            let mut set = candidates[next_bucket].clone();
            for &e in links {
                set.intersect_with(self.index.conflicts(chosen[e], next_bucket));
            }
            if next == depth_max {
                total = total.saturating_add(set.count() as i128);
            } else if !set.is_empty() {
                stack.push((set.iter().collect(), 0));
            }
        }
        total
    }
}
