//! Property/fuzz-style invariants for layout mutations.
//!
//! Random streams of adds, removals, tab drags, splitter drags and
//! maximise toggles run against the public `Layout` API. After every step
//! the tree must validate, rows and columns must carry shares summing to
//! 100, and no component may be lost or duplicated by a drag.

use std::time::Duration;

use lattice_layout::{
    ComponentHost, ComponentHostError, ComponentRequest, Instant, ItemConfig, ItemId, ItemType,
    Layout, LayoutConfig, Node, PanelHandle, PointerEvent, PointerPhase, PointerTarget, Rect,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        min + (self.next_u64() % span) as i32
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }
}

#[derive(Default)]
struct CountingHost {
    next: u64,
}

impl ComponentHost for CountingHost {
    fn create(&mut self, _request: ComponentRequest<'_>) -> Result<PanelHandle, ComponentHostError> {
        self.next += 1;
        Ok(PanelHandle(self.next))
    }
    fn show(&mut self, _panel: PanelHandle) {}
    fn hide(&mut self, _panel: PanelHandle) {}
    fn resize(&mut self, _panel: PanelHandle, _rect: Rect) {}
    fn destroy(&mut self, _panel: PanelHandle) {}
}

const CONTAINER: Rect = Rect::new(0, 0, 1200, 800);

fn components(layout: &Layout) -> Vec<ItemId> {
    layout.items_by_type(ItemType::Component)
}

fn of_type(layout: &Layout, pred: fn(&Node) -> bool) -> Vec<ItemId> {
    layout
        .all_items()
        .into_iter()
        .filter(|&id| layout.node(id).is_some_and(pred))
        .collect()
}

fn press_drag_release(
    layout: &mut Layout,
    target: PointerTarget,
    from: (i32, i32),
    to: (i32, i32),
    now: Instant,
) {
    let steps = [
        (Some(target), PointerPhase::Down, from),
        (None, PointerPhase::Move, to),
        (None, PointerPhase::Up, to),
    ];
    for (target, phase, (x, y)) in steps {
        layout
            .pointer(target, &PointerEvent::mouse(phase, x, y), now)
            .expect("pointer event");
    }
}

fn step(layout: &mut Layout, rng: &mut Lcg, sequence: usize, now: Instant) -> isize {
    let comps = components(layout);
    let stacks = of_type(layout, Node::is_stack);
    let rows = of_type(layout, |n| n.is_row_or_column() && n.children().len() > 1);

    let mut candidates = vec![0usize]; // add
    if !comps.is_empty() {
        candidates.extend([1, 2, 4]); // remove, drag, maximise
    }
    if !rows.is_empty() {
        candidates.push(3); // splitter
    }

    match candidates[rng.choose_index(candidates.len())] {
        1 => {
            let target = comps[rng.choose_index(comps.len())];
            layout.remove_item(target).expect("remove");
            -1
        }
        2 => {
            let target = comps[rng.choose_index(comps.len())];
            let from = (rng.next_i32_range(0, 1199), rng.next_i32_range(0, 799));
            let to = (rng.next_i32_range(0, 1199), rng.next_i32_range(0, 799));
            press_drag_release(layout, PointerTarget::Tab(target), from, to, now);
            0
        }
        3 => {
            let row = rows[rng.choose_index(rows.len())];
            let index = rng.choose_index(layout.children_of(row).len() - 1);
            let dx = rng.next_i32_range(-400, 400);
            let dy = rng.next_i32_range(-300, 300);
            press_drag_release(
                layout,
                PointerTarget::Splitter { row, index },
                (600, 400),
                (600 + dx, 400 + dy),
                now,
            );
            layout.animation_frame();
            0
        }
        4 => {
            let target = comps[rng.choose_index(comps.len())];
            if let Some(stack) = layout.parent_of(target) {
                layout.toggle_maximise(stack).expect("maximise");
            }
            0
        }
        _ => {
            let config = ItemConfig::component(format!("c{sequence}"));
            let parents: Vec<ItemId> = if stacks.is_empty() {
                vec![layout.ground()]
            } else {
                stacks
                    .iter()
                    .copied()
                    .chain(of_type(layout, Node::is_row_or_column))
                    .collect()
            };
            let parent = parents[rng.choose_index(parents.len())];
            layout.add_child_config(parent, &config, None).expect("add");
            1
        }
    }
}

fn assert_layout_invariants(layout: &Layout) {
    layout
        .tree()
        .validate()
        .expect("tree should remain structurally valid");
    assert!(!layout.has_active_gesture());
    assert!(layout.drag_proxy().is_none());
    for id in of_type(layout, Node::is_row_or_column) {
        let node = layout.node(id).expect("node");
        let axis = node.axis().expect("axis");
        let total: f64 = node
            .children()
            .iter()
            .filter_map(|&c| layout.node(c).and_then(|n| n.size_along(axis)))
            .sum();
        assert!(
            node.children().is_empty() || (total - 100.0).abs() < 1e-6,
            "item {} shares sum to {total}",
            id.get()
        );
        let splitters = layout.splitter_rects(id).len();
        assert_eq!(splitters, node.children().len().saturating_sub(1));
    }
    for id in of_type(layout, Node::is_stack) {
        let node = layout.node(id).expect("node");
        if !node.children().is_empty() {
            assert!(node.active_child().is_some(), "stack {} has no active tab", id.get());
        }
    }
}

fn run_sequence(seed: u64, steps: usize) -> Layout {
    let config = LayoutConfig::with_content(vec![ItemConfig::row(vec![
        ItemConfig::component("left"),
        ItemConfig::column(vec![
            ItemConfig::component("top"),
            ItemConfig::component("bottom"),
        ]),
    ])]);
    let mut layout = Layout::new(config, CountingHost::default());
    layout.init(CONTAINER).expect("init");
    let mut rng = Lcg::new(seed);
    let mut expected = components(&layout).len() as isize;
    let t0 = Instant::now();

    for sequence in 0..steps {
        let now = t0 + Duration::from_millis(sequence as u64);
        expected += step(&mut layout, &mut rng, sequence, now);
        assert_layout_invariants(&layout);
        assert_eq!(
            components(&layout).len() as isize,
            expected,
            "component count drifted at step {sequence}, seed={seed}"
        );
    }
    layout
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_operation_sequences_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        run_sequence(seed, steps);
    }

    #[test]
    fn random_operation_sequences_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let first = run_sequence(seed, steps).to_config();
        let second = run_sequence(seed, steps).to_config();
        prop_assert_eq!(
            first.to_json_string().expect("json"),
            second.to_json_string().expect("json")
        );
    }
}
