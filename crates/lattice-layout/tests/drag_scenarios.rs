//! End-to-end drags driven through `Layout::pointer`.
//!
//! Every scenario uses a 600x400 container at the origin with default
//! dimensions (5px splitters, 20px headers) and fixed 100px tabs.

use std::time::Duration;

use lattice_layout::{
    ComponentHost, ComponentHostError, ComponentRequest, HostCommand, Instant, ItemConfig, ItemId,
    ItemType, Layout, LayoutConfig, LayoutEvent, Node, PanelHandle, PointerEvent, PointerPhase,
    PointerTarget, Rect,
};
use pretty_assertions::assert_eq;

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

fn layout(content: Vec<ItemConfig>) -> Layout {
    let mut layout = Layout::new(LayoutConfig::with_content(content), CountingHost::default());
    layout.init(Rect::from_size(600, 400)).expect("init");
    layout
}

fn component(layout: &Layout, name: &str) -> ItemId {
    layout.components_by_type(name)[0]
}

fn mouse(phase: PointerPhase, at: (i32, i32)) -> PointerEvent {
    PointerEvent::mouse(phase, at.0, at.1)
}

/// Press on `target`, move to `to`, release there.
fn drag(layout: &mut Layout, target: PointerTarget, from: (i32, i32), to: (i32, i32)) -> Vec<HostCommand> {
    let t0 = Instant::now();
    let mut commands = layout
        .pointer(Some(target), &mouse(PointerPhase::Down, from), t0)
        .expect("down");
    commands.extend(
        layout
            .pointer(None, &mouse(PointerPhase::Move, to), t0 + Duration::from_millis(16))
            .expect("move"),
    );
    commands.extend(
        layout
            .pointer(None, &mouse(PointerPhase::Up, to), t0 + Duration::from_millis(32))
            .expect("up"),
    );
    commands
}

fn type_of(layout: &Layout, id: ItemId) -> Option<ItemType> {
    layout.node(id).map(Node::item_type)
}

fn width(layout: &Layout, id: ItemId) -> f64 {
    layout.node(id).and_then(Node::width).unwrap_or(f64::NAN)
}

#[test]
fn three_components_dropped_into_an_empty_layout() {
    let mut layout = layout(Vec::new());
    let a = layout.create_drag_source(ItemConfig::component("a"));
    let b = layout.create_drag_source(ItemConfig::component("b"));
    let c = layout.create_drag_source(ItemConfig::component("c"));

    drag(&mut layout, PointerTarget::DragSource(a), (10, 10), (300, 200));
    let root = layout.root_item().expect("root");
    assert_eq!(type_of(&layout, root), Some(ItemType::Stack));
    assert_eq!(layout.children_of(root), &[component(&layout, "a")]);

    // Right quadrant of the only stack's body.
    drag(&mut layout, PointerTarget::DragSource(b), (10, 10), (500, 200));
    let row = layout.root_item().expect("root");
    assert_eq!(type_of(&layout, row), Some(ItemType::Row));
    let stacks = layout.children_of(row).to_vec();
    assert_eq!(stacks.len(), 2);
    assert_eq!(stacks[0], root);
    assert!(stacks.iter().all(|&s| type_of(&layout, s) == Some(ItemType::Stack)));
    assert_eq!(width(&layout, stacks[0]), 50.0);
    assert_eq!(width(&layout, stacks[1]), 50.0);

    // Header of the second stack, right of its only tab.
    drag(&mut layout, PointerTarget::DragSource(c), (10, 10), (500, 10));
    assert_eq!(layout.root_item(), Some(row));
    assert_eq!(layout.children_of(row), stacks.as_slice());
    assert_eq!(
        layout.children_of(stacks[1]),
        &[component(&layout, "b"), component(&layout, "c")]
    );
    assert!(layout.tree().validate().is_ok());

    let dropped = layout
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, LayoutEvent::ItemDropped(_)))
        .count();
    assert_eq!(dropped, 3);
}

fn two_stacks() -> Layout {
    layout(vec![ItemConfig::row(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
    ])])
}

fn column_source(layout: &mut Layout) -> lattice_layout::DragSourceId {
    layout.create_drag_source(ItemConfig::column(vec![
        ItemConfig::component("x"),
        ItemConfig::component("y"),
    ]))
}

#[test]
fn column_dropped_beside_a_stack_lands_as_one_stack() {
    let mut layout = two_stacks();
    let source = column_source(&mut layout);
    drag(&mut layout, PointerTarget::DragSource(source), (10, 10), (530, 200));

    let row = layout.root_item().expect("root");
    let children = layout.children_of(row).to_vec();
    assert_eq!(children.len(), 3);
    assert!(children.iter().all(|&c| type_of(&layout, c) == Some(ItemType::Stack)));
    assert_eq!(
        layout.children_of(children[2]),
        &[component(&layout, "x"), component(&layout, "y")]
    );
    assert!(layout.tree().validate().is_ok());
}

#[test]
fn column_dropped_on_a_header_gives_up_its_components() {
    let mut layout = two_stacks();
    let b = component(&layout, "b");
    let stack = layout.parent_of(b).expect("stack");
    let source = column_source(&mut layout);
    drag(&mut layout, PointerTarget::DragSource(source), (10, 10), (350, 10));

    let x = component(&layout, "x");
    let y = component(&layout, "y");
    let tabs = layout.children_of(stack).to_vec();
    assert_eq!(tabs.len(), 3);
    assert!(tabs.iter().all(|&t| type_of(&layout, t) == Some(ItemType::Component)));
    let at = tabs.iter().position(|&t| t == x).expect("x");
    assert_eq!(tabs.get(at + 1), Some(&y));
    assert_eq!(layout.node(stack).and_then(Node::active_child), Some(x));
    assert!(layout.tree().validate().is_ok());
}

#[test]
fn column_dropped_on_an_empty_ground_becomes_a_stack() {
    let mut layout = layout(Vec::new());
    let source = column_source(&mut layout);
    drag(&mut layout, PointerTarget::DragSource(source), (10, 10), (300, 200));

    let root = layout.root_item().expect("root");
    assert_eq!(type_of(&layout, root), Some(ItemType::Stack));
    assert_eq!(
        layout.children_of(root),
        &[component(&layout, "x"), component(&layout, "y")]
    );
    assert!(layout.tree().validate().is_ok());
}

#[test]
fn tab_reorders_within_its_stack() {
    let mut layout = layout(vec![ItemConfig::stack(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
        ItemConfig::component("c"),
    ])]);
    let stack = layout.root_item().expect("root");
    let (a, b, c) = (
        component(&layout, "a"),
        component(&layout, "b"),
        component(&layout, "c"),
    );
    drag(&mut layout, PointerTarget::Tab(c), (250, 10), (20, 10));
    assert_eq!(layout.children_of(stack), &[c, a, b]);
    assert_eq!(layout.node(stack).and_then(Node::active_child), Some(c));
}

#[test]
fn tab_drops_into_another_header_at_index() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::stack(vec![ItemConfig::component("c"), ItemConfig::component("d")]),
    ])]);
    let (a, b, c, d) = (
        component(&layout, "a"),
        component(&layout, "b"),
        component(&layout, "c"),
        component(&layout, "d"),
    );
    let left = layout.parent_of(a).expect("left stack");
    let right = layout.parent_of(c).expect("right stack");
    // Tabs of the right stack start at x = 303.
    drag(&mut layout, PointerTarget::Tab(d), (450, 10), (120, 10));
    assert_eq!(layout.children_of(left), &[a, d, b]);
    assert_eq!(layout.children_of(right), &[c]);
}

#[test]
fn bottom_quadrant_drop_splits_into_a_column() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::component("c"),
    ])]);
    let a = component(&layout, "a");
    let row = layout.root_item().expect("root");
    let right = layout.parent_of(component(&layout, "c")).expect("stack");

    drag(&mut layout, PointerTarget::Tab(a), (50, 10), (450, 300));

    let children = layout.children_of(row).to_vec();
    assert_eq!(children.len(), 2);
    let column = children[1];
    assert_eq!(type_of(&layout, column), Some(ItemType::Column));
    assert_eq!(width(&layout, column), 50.0);
    let parts = layout.children_of(column).to_vec();
    assert_eq!(parts[0], right);
    assert_eq!(layout.children_of(parts[1]), &[a]);
    for part in parts {
        assert_eq!(layout.node(part).and_then(Node::height), Some(50.0));
    }
}

#[test]
fn left_edge_drop_joins_the_root_row() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::component("c"),
    ])]);
    let row = layout.root_item().expect("root");
    let left = layout.parent_of(component(&layout, "a")).expect("stack");
    let b = component(&layout, "b");

    drag(&mut layout, PointerTarget::Tab(b), (150, 10), (20, 200));

    let children = layout.children_of(row).to_vec();
    assert_eq!(children.len(), 3);
    assert_eq!(layout.children_of(children[0]), &[b]);
    assert_eq!(children[1], left);
    assert_eq!(width(&layout, children[0]), 25.0);
    assert_eq!(width(&layout, children[1]), 25.0);
    assert_eq!(width(&layout, children[2]), 50.0);
}

#[test]
fn dragging_the_last_tab_out_prunes_its_stack() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
    ])]);
    let a = component(&layout, "a");
    let b = component(&layout, "b");
    let right = layout.parent_of(b).expect("stack");

    // Drop a onto the header of b's stack. The row collapses into that stack.
    drag(&mut layout, PointerTarget::Tab(a), (50, 10), (500, 10));

    assert_eq!(layout.root_item(), Some(right));
    assert_eq!(layout.children_of(right), &[b, a]);
    assert!(layout.tree().validate().is_ok());
}

#[test]
fn click_without_drag_only_activates_the_tab() {
    let mut layout = layout(vec![ItemConfig::stack(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
    ])]);
    let stack = layout.root_item().expect("root");
    let b = component(&layout, "b");
    let commands = drag(&mut layout, PointerTarget::Tab(b), (150, 10), (152, 11));
    assert_eq!(commands, vec![HostCommand::ListenGlobal, HostCommand::UnlistenGlobal]);
    assert_eq!(layout.node(stack).and_then(Node::active_child), Some(b));
    assert!(layout.drag_proxy().is_none());
    assert!(!layout.has_active_gesture());
}

#[test]
fn holding_still_past_the_delay_starts_a_drag() {
    let mut layout = layout(vec![ItemConfig::stack(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
    ])]);
    let b = component(&layout, "b");
    let t0 = Instant::now();
    layout
        .pointer(Some(PointerTarget::Tab(b)), &mouse(PointerPhase::Down, (150, 10)), t0)
        .expect("down");
    assert!(layout.poll(t0 + Duration::from_millis(100)).expect("early").is_empty());
    let commands = layout.poll(t0 + Duration::from_millis(200)).expect("due");
    assert_eq!(commands, vec![HostCommand::SetGlobalDragging(true)]);
    let proxy = layout.drag_proxy().expect("proxy");
    assert_eq!(proxy.item(), b);
    assert_eq!(proxy.rect(), Rect::new(150, 10, 300, 200));
    assert_eq!(layout.parent_of(b), None);

    let commands = layout
        .pointer(None, &mouse(PointerPhase::Up, (150, 10)), t0 + Duration::from_millis(250))
        .expect("up");
    assert_eq!(
        commands,
        vec![HostCommand::SetGlobalDragging(false), HostCommand::UnlistenGlobal]
    );
    assert!(layout.parent_of(b).is_some());
}

#[test]
fn moves_outside_the_container_are_ignored_while_constrained() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::component("c"),
    ])]);
    let b = component(&layout, "b");
    let t0 = Instant::now();
    layout
        .pointer(Some(PointerTarget::Tab(b)), &mouse(PointerPhase::Down, (150, 10)), t0)
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (450, 300)), t0)
        .expect("move inside");
    let before = layout.drop_indicator();
    assert!(before.is_some());
    layout
        .pointer(None, &mouse(PointerPhase::Move, (900, 900)), t0)
        .expect("move outside");
    assert_eq!(layout.drop_indicator(), before);
}

#[test]
fn splitter_drag_moves_the_boundary_on_release() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b"),
    ])]);
    let row = layout.root_item().expect("root");
    let left = layout.children_of(row)[0];
    let right = layout.children_of(row)[1];
    assert_eq!(layout.splitter_rects(row), &[Rect::new(298, 0, 5, 400)]);

    let t0 = Instant::now();
    let target = PointerTarget::Splitter { row, index: 0 };
    layout
        .pointer(Some(target), &mouse(PointerPhase::Down, (300, 200)), t0)
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (400, 200)), t0)
        .expect("move");
    assert_eq!(layout.splitter_drag().map(|d| d.offset), Some(100));
    // Sizes only change on release.
    assert_eq!(width(&layout, left), 50.0);

    layout
        .pointer(None, &mouse(PointerPhase::Up, (400, 200)), t0)
        .expect("up");
    let total = width(&layout, left) + width(&layout, right);
    assert!((total - 100.0).abs() < 1e-9);
    assert!((width(&layout, left) - 398.0 / 595.0 * 100.0).abs() < 1e-9);

    layout.animation_frame();
    let element = layout.node(left).map(Node::element).expect("element");
    assert_eq!(element.rect.width, 398);
}

#[test]
fn splitter_drag_is_clamped_to_minimum_sizes() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::component("a"),
        ItemConfig::component("b").with_min_size(Some(200), None),
    ])]);
    let row = layout.root_item().expect("root");
    let t0 = Instant::now();
    layout
        .pointer(
            Some(PointerTarget::Splitter { row, index: 0 }),
            &mouse(PointerPhase::Down, (300, 200)),
            t0,
        )
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (590, 200)), t0)
        .expect("move");
    // Right neighbour is 297px wide and must keep 200px.
    assert_eq!(layout.splitter_drag().map(|d| d.offset), Some(97));
    layout
        .pointer(None, &mouse(PointerPhase::Move, (-500, 200)), t0)
        .expect("move");
    assert_eq!(layout.splitter_drag().map(|d| d.offset), Some(-288));
}

#[test]
fn last_tab_of_a_pinned_stack_stays_put() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a")]).closable(false),
        ItemConfig::component("b"),
    ])]);
    let a = component(&layout, "a");
    let stack = layout.parent_of(a).expect("stack");
    assert!(!layout.can_drag_out(a));

    let t0 = Instant::now();
    layout
        .pointer(Some(PointerTarget::Tab(a)), &mouse(PointerPhase::Down, (50, 10)), t0)
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (500, 200)), t0)
        .expect("move");
    assert!(layout.drag_proxy().is_none());
    layout
        .pointer(None, &mouse(PointerPhase::Up, (500, 200)), t0)
        .expect("up");
    assert_eq!(layout.children_of(stack), &[a]);
    assert!(!layout.has_active_gesture());
}

/// Press b's tab in `row[stack[a, b], c]` and move into the left body.
fn dragging_b() -> (Layout, Instant) {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::component("c"),
    ])]);
    let b = component(&layout, "b");
    let t0 = Instant::now();
    layout
        .pointer(Some(PointerTarget::Tab(b)), &mouse(PointerPhase::Down, (150, 10)), t0)
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (100, 200)), t0)
        .expect("move");
    assert!(layout.drag_proxy().is_some());
    (layout, t0)
}

#[test]
fn removing_the_dragged_item_destroys_it_after_the_drop() {
    let (mut layout, t0) = dragging_b();
    let a = component(&layout, "a");
    let b = layout.drag_proxy().map(|d| d.item()).expect("dragged");

    layout.remove_item(b).expect("remove");
    assert!(layout.node(b).is_some());

    layout
        .pointer(None, &mouse(PointerPhase::Up, (100, 200)), t0)
        .expect("up");
    assert!(layout.node(b).is_none());
    assert!(layout.components_by_type("b").is_empty());
    let stack = layout.parent_of(a).expect("stack");
    assert_eq!(layout.children_of(stack), &[a]);
    assert!(layout.tree().validate().is_ok());
}

#[test]
fn unrelated_removals_apply_at_once_during_a_drag() {
    let (mut layout, t0) = dragging_b();
    let a = component(&layout, "a");
    let c = component(&layout, "c");

    layout.remove_item(c).expect("remove");
    assert!(layout.node(c).is_none());
    // Only the left stack is left, so the row collapsed into it.
    let left = layout.parent_of(a).expect("stack");
    assert_eq!(layout.root_item(), Some(left));

    layout.destroy().expect("destroy");
    assert!(!layout.is_destroyed());

    layout
        .pointer(None, &mouse(PointerPhase::Up, (100, 200)), t0)
        .expect("up");
    assert!(layout.is_destroyed());
}

#[test]
fn blur_cancel_drops_at_the_last_valid_target() {
    let mut layout = layout(vec![ItemConfig::row(vec![
        ItemConfig::stack(vec![ItemConfig::component("a"), ItemConfig::component("b")]),
        ItemConfig::component("c"),
    ])]);
    let b = component(&layout, "b");
    let right = layout.parent_of(component(&layout, "c")).expect("stack");
    let t0 = Instant::now();
    layout
        .pointer(Some(PointerTarget::Tab(b)), &mouse(PointerPhase::Down, (150, 10)), t0)
        .expect("down");
    layout
        .pointer(None, &mouse(PointerPhase::Move, (450, 10)), t0)
        .expect("move");
    layout
        .pointer(None, &mouse(PointerPhase::Cancel, (450, 10)), t0)
        .expect("cancel");
    assert_eq!(layout.parent_of(b), Some(right));
}
