//! End-to-end interaction scenarios against a SheetEngine.

use std::cell::RefCell;
use std::rc::Rc;

use cellgrid_core::sheet::merge_into;
use cellgrid_core::{
    CellAddress, CellValue, ChangeSet, ClipboardBlock, CommitDirection, Direction, EditTrigger,
    EngineMode, FormulaError, FormulaResolver, GridAction, GridConfig, MemoryClipboard,
    PointerModifiers, SelectionRect, Sheet, SheetEngine,
};
use pretty_assertions::assert_eq;

type ChangeLog = Rc<RefCell<Vec<ChangeSet>>>;

fn a1(name: &str) -> CellAddress {
    CellAddress::from_a1(name).unwrap()
}

fn rect(s: &str) -> SelectionRect {
    s.parse().unwrap()
}

fn engine_with_config(cells: &[(&str, &str)], config: GridConfig) -> (SheetEngine, ChangeLog) {
    let sheet = Sheet::with_cells(
        "Sheet1",
        cells.iter().map(|(a, v)| (a1(a), CellValue::from(*v))),
    );
    let grid = sheet.grid();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    let seen = log.clone();
    let engine = SheetEngine::new(sheet, config).with_change_handler(Box::new(
        move |name: &str, changes: &ChangeSet| {
            assert_eq!(name, "Sheet1");
            merge_into(&grid, changes);
            seen.borrow_mut().push(changes.clone());
        },
    ));
    (engine, log)
}

fn engine_with(cells: &[(&str, &str)]) -> (SheetEngine, ChangeLog) {
    engine_with_config(cells, GridConfig::default())
}

fn edit(engine: &mut SheetEngine, address: &str, input: &str, direction: CommitDirection) {
    engine.move_to(a1(address), false);
    assert!(engine.begin_edit(EditTrigger::Programmatic(Some(input.to_string()))));
    engine.commit_edit(direction);
}

#[test]
fn fill_then_undo_restores_empties() {
    let (mut engine, log) = engine_with(&[("A1", "Hello")]);
    assert!(engine.fill(a1("A1"), Some(rect("A1:A3"))));

    assert_eq!(engine.get_value(a1("A2")), CellValue::from("Hello"));
    assert_eq!(engine.get_value(a1("A3")), CellValue::from("Hello"));
    assert_eq!(engine.selection().rects(), &[rect("A1:A3")]);
    assert_eq!(log.borrow().len(), 1);

    assert!(engine.undo());
    assert_eq!(engine.get_value(a1("A1")), CellValue::from("Hello"));
    assert!(!engine.sheet().is_defined(a1("A2")));
    assert!(!engine.sheet().is_defined(a1("A3")));
    assert_eq!(engine.active_cell(), a1("A1"));
    assert_eq!(engine.selection().rects(), &[rect("A1:A3")]);
}

#[test]
fn fill_without_target_is_a_no_op() {
    let (mut engine, log) = engine_with(&[("A1", "Hello")]);
    assert!(!engine.fill(a1("A1"), None));
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn fill_over_empty_region_records_nothing() {
    let (mut engine, log) = engine_with(&[]);
    assert!(!engine.fill(a1("A1"), Some(rect("A1:A3"))));
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn fill_skips_cells_already_holding_the_value() {
    let (mut engine, log) = engine_with(&[("A1", "x"), ("A2", "x")]);
    assert!(!engine.fill(a1("A1"), Some(rect("A1:A2"))));

    assert!(engine.fill(a1("A1"), Some(rect("A1:A3"))));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].len(), 1);
    assert_eq!(engine.get_value(a1("A3")), CellValue::from("x"));
}

#[test]
fn formula_is_stored_literally_and_displayed_evaluated() {
    let (mut engine, _) = engine_with(&[]);
    engine.move_to(a1("B2"), false);
    assert!(engine.dispatch(GridAction::StartTyping('=')));
    engine.type_text("SUM(2,2)");
    assert!(engine.dispatch(GridAction::Commit(CommitDirection::Down)));

    assert_eq!(engine.get_value(a1("B2")), CellValue::Text("=SUM(2,2)".into()));
    assert_eq!(engine.display_value(a1("B2")), "4");
    assert_eq!(engine.active_cell(), a1("B3"));
}

#[test]
fn formulas_read_the_live_sheet() {
    let (mut engine, _) = engine_with(&[("A1", "2"), ("A2", "=A1*10")]);
    assert_eq!(engine.display_value(a1("A2")), "20");
    edit(&mut engine, "A1", "5", CommitDirection::Stay);
    assert_eq!(engine.display_value(a1("A2")), "50");
}

#[test]
fn cycles_display_marker() {
    let (engine, _) = engine_with(&[("A1", "=B1"), ("B1", "=A1")]);
    assert_eq!(engine.display_value(a1("A1")), "#CYCLE!");
}

#[test]
fn paste_two_by_two_selects_exact_rect() {
    let (mut engine, log) = engine_with(&[]);
    engine.move_to(a1("C3"), false);
    let block = ClipboardBlock::from_rows(vec![
        vec![CellValue::Number(1.0), CellValue::Number(2.0)],
        vec![CellValue::Number(3.0), CellValue::Number(4.0)],
    ]);
    assert_eq!(engine.paste_block(&block), Some(rect("C3:D4")));
    assert_eq!(engine.selection().rects(), &[rect("C3:D4")]);
    assert_eq!(engine.active_cell(), a1("C3"));
    assert_eq!(engine.get_value(a1("D4")), CellValue::Number(4.0));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn paste_records_anchor_only_by_default() {
    let (mut engine, _) = engine_with(&[]);
    engine.move_to(a1("C3"), false);
    engine.paste_block(&ClipboardBlock::parse_tsv("a\tb\nc\td"));
    assert!(engine.undo());
    assert_eq!(engine.get_value(a1("C3")), CellValue::Empty);
    assert_eq!(engine.get_value(a1("D4")), CellValue::from("d"));
}

#[test]
fn undoable_paste_reverts_whole_block() {
    let mut config = GridConfig::default();
    config.history.undoable_paste = true;
    let (mut engine, _) = engine_with_config(&[("D4", "keep")], config);
    engine.move_to(a1("C3"), false);
    engine.paste_block(&ClipboardBlock::parse_tsv("a\tb\nc\td"));
    assert!(engine.undo());
    assert!(engine.sheet().defined_in(rect("C3:C4")).is_empty());
    assert_eq!(engine.get_value(a1("D4")), CellValue::from("keep"));
    assert_eq!(engine.selection().rects(), &[rect("C3:D4")]);
}

#[test]
fn paste_is_clipped_to_grid() {
    let mut config = GridConfig::default();
    config.row_count = 5;
    config.column_count = 5;
    let (mut engine, _) = engine_with_config(&[], config);
    engine.move_to(a1("E5"), false);
    assert_eq!(
        engine.paste_block(&ClipboardBlock::parse_tsv("1\t2\n3\t4")),
        Some(rect("E5"))
    );
    assert_eq!(engine.get_value(a1("E5")), CellValue::Number(1.0));
    assert_eq!(engine.sheet().len(), 1);
}

#[test]
fn empty_paste_does_nothing() {
    let (mut engine, log) = engine_with(&[]);
    assert_eq!(engine.paste_block(&ClipboardBlock::default()), None);
    assert_eq!(engine.paste(), None);
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn delete_twice_second_is_empty() {
    let (mut engine, log) = engine_with(&[("A1", "1"), ("B2", "2"), ("C3", "3")]);
    engine.set_selection(a1("A1"), &[rect("A1:B2")]);
    assert_eq!(engine.delete_selection(), 2);
    assert_eq!(engine.delete_selection(), 0);
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(engine.get_value(a1("C3")), CellValue::Number(3.0));

    assert!(engine.undo());
    assert_eq!(engine.get_value(a1("A1")), CellValue::Number(1.0));
    assert_eq!(engine.get_value(a1("B2")), CellValue::Number(2.0));
}

#[test]
fn delete_covers_disjoint_rects() {
    let (mut engine, _) = engine_with(&[("A1", "1"), ("C1", "2"), ("B1", "keep")]);
    engine.set_selection(a1("C1"), &[rect("A1"), rect("C1")]);
    assert_eq!(engine.delete_selection(), 2);
    assert_eq!(engine.sheet().len(), 1);
}

#[test]
fn delete_rects_defaults_to_active_cell() {
    let (mut engine, log) = engine_with(&[("B2", "x"), ("C3", "y")]);
    engine.move_to(a1("B2"), false);
    assert_eq!(engine.delete_rects(&[]), 1);
    assert_eq!(engine.get_value(a1("C3")), CellValue::from("y"));

    assert_eq!(engine.delete_rects(&[rect("C3:Z9")]), 1);
    assert_eq!(log.borrow().len(), 2);
    assert!(engine.sheet().is_empty());
}

#[test]
fn copy_paste_reproduces_block() {
    let (mut engine, _) = engine_with(&[("A1", "1"), ("B1", "x"), ("B2", "=A1*2")]);
    engine.set_selection(a1("A1"), &[rect("A1:B2")]);
    let block = engine.copy();
    assert_eq!(block.height(), 2);
    assert_eq!(block.width(), 2);

    engine.move_to(a1("D5"), false);
    assert_eq!(engine.paste(), Some(rect("D5:E6")));
    assert_eq!(engine.get_value(a1("D5")), CellValue::Number(1.0));
    assert_eq!(engine.get_value(a1("E5")), CellValue::from("x"));
    assert!(!engine.sheet().is_defined(a1("D6")));
    assert_eq!(engine.get_value(a1("E6")), CellValue::Text("=A1*2".into()));
}

#[test]
fn copy_keeps_quoted_text_as_text() {
    let (mut engine, _) = engine_with(&[("A1", "\"12\"")]);
    assert_eq!(engine.get_value(a1("A1")), CellValue::Text("12".into()));
    engine.copy();
    engine.move_to(a1("B1"), false);
    engine.paste();
    assert_eq!(engine.get_value(a1("B1")), CellValue::Text("12".into()));
}

#[test]
fn external_clipboard_text_is_parsed() {
    let (engine, _) = engine_with(&[]);
    let mut engine = engine.with_clipboard(Box::new(MemoryClipboard::with_text("1\t2\n3\t4\n")));
    assert_eq!(engine.paste(), Some(rect("A1:B2")));
    assert_eq!(engine.get_value(a1("B2")), CellValue::Number(4.0));
}

#[test]
fn cut_clears_without_undo_entry() {
    let (mut engine, log) = engine_with(&[("A1", "1"), ("A2", "2")]);
    engine.set_selection(a1("A1"), &[rect("A1:A3")]);
    let block = engine.cut();
    assert_eq!(block.height(), 3);
    assert!(engine.sheet().is_empty());
    assert!(!engine.history().can_undo());
    assert_eq!(log.borrow().len(), 1);

    engine.move_to(a1("C1"), false);
    engine.paste();
    assert_eq!(engine.get_value(a1("C2")), CellValue::Number(2.0));
}

#[test]
fn undoable_cut_can_be_reverted() {
    let mut config = GridConfig::default();
    config.history.undoable_cut = true;
    let (mut engine, _) = engine_with_config(&[("A1", "1")], config);
    engine.cut();
    assert!(engine.undo());
    assert_eq!(engine.get_value(a1("A1")), CellValue::Number(1.0));
}

#[test]
fn point_patch_undo_redo_round_trip() {
    let (mut engine, _) = engine_with(&[("B2", "old")]);
    edit(&mut engine, "B2", "new", CommitDirection::Down);
    assert_eq!(engine.active_cell(), a1("B3"));

    assert!(engine.undo());
    assert_eq!(engine.get_value(a1("B2")), CellValue::from("old"));
    assert_eq!(engine.active_cell(), a1("B2"));

    assert!(engine.redo());
    assert_eq!(engine.get_value(a1("B2")), CellValue::from("new"));
    assert!(!engine.redo());
}

#[test]
fn empty_history_is_a_no_op() {
    let (mut engine, log) = engine_with(&[]);
    assert!(!engine.undo());
    assert!(!engine.redo());
    assert!(log.borrow().is_empty());
}

#[test]
fn unchanged_commit_still_advances() {
    let (mut engine, log) = engine_with(&[("A1", "same")]);
    assert!(engine.begin_edit(EditTrigger::Key));
    let commit = engine.commit_edit(CommitDirection::Right).unwrap();
    assert!(!commit.is_change());
    assert_eq!(engine.active_cell(), a1("B1"));
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn untouched_edit_keeps_text_that_looks_numeric() {
    let (mut engine, log) = engine_with(&[("A1", "\"12\""), ("A2", "\"\"x\"\"")]);
    assert_eq!(engine.get_value(a1("A1")), CellValue::Text("12".into()));

    for cell in ["A1", "A2"] {
        engine.move_to(a1(cell), false);
        let before = engine.get_value(a1(cell));
        assert!(engine.begin_edit(EditTrigger::Key));
        let commit = engine.commit_edit(CommitDirection::Stay).unwrap();
        assert!(!commit.is_change());
        assert_eq!(engine.get_value(a1(cell)), before);
    }
    assert_eq!(engine.get_value(a1("A2")), CellValue::Text("\"x\"".into()));
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn commit_at_grid_edge_stays_put() {
    let mut config = GridConfig::default();
    config.row_count = 3;
    let (mut engine, _) = engine_with_config(&[], config);
    edit(&mut engine, "A3", "x", CommitDirection::Down);
    assert_eq!(engine.active_cell(), a1("A3"));
}

#[test]
fn cancel_touches_nothing() {
    let (mut engine, log) = engine_with(&[("A1", "keep")]);
    assert!(engine.dispatch(GridAction::StartTyping('z')));
    assert_eq!(engine.mode(), EngineMode::Edit);
    assert!(engine.dispatch(GridAction::CancelEdit));
    assert_eq!(engine.mode(), EngineMode::Navigate);
    assert_eq!(engine.get_value(a1("A1")), CellValue::from("keep"));
    assert!(log.borrow().is_empty());
    assert!(!engine.history().can_undo());
}

#[test]
fn dispatch_respects_mode() {
    let (mut engine, _) = engine_with(&[]);
    assert!(!engine.dispatch(GridAction::InsertChar('x')));
    assert!(engine.dispatch(GridAction::StartTyping('4')));
    assert!(!engine.dispatch(GridAction::Move(Direction::Down)));
    assert!(engine.dispatch(GridAction::InsertChar('2')));
    assert!(engine.dispatch(GridAction::Backspace));
    assert!(engine.dispatch(GridAction::InsertChar('5')));
    assert_eq!(engine.edit_buffer(), Some("45"));
    assert!(engine.dispatch(GridAction::Commit(CommitDirection::Right)));
    assert_eq!(engine.get_value(a1("A1")), CellValue::Number(45.0));
    assert_eq!(engine.active_cell(), a1("B1"));
}

#[test]
fn keyboard_extension_grows_rect() {
    let (mut engine, _) = engine_with(&[]);
    engine.move_to(a1("B2"), false);
    engine.dispatch(GridAction::Extend(Direction::Right));
    engine.dispatch(GridAction::Extend(Direction::Down));
    assert_eq!(engine.selection().rects(), &[rect("B2:C3")]);
    assert_eq!(engine.active_cell(), a1("B2"));
    engine.dispatch(GridAction::Move(Direction::Up));
    assert_eq!(engine.selection().rects(), &[rect("B1")]);
}

#[test]
fn navigation_extras() {
    let (mut engine, _) = engine_with(&[("C2", "x"), ("E7", "y")]);
    engine.move_to(a1("A2"), false);
    engine.dispatch(GridAction::RowEnd);
    assert_eq!(engine.active_cell(), a1("C2"));
    engine.dispatch(GridAction::RowStart);
    assert_eq!(engine.active_cell(), a1("A2"));
    engine.dispatch(GridAction::GotoLast);
    assert_eq!(engine.active_cell(), a1("E7"));
    engine.dispatch(GridAction::GotoFirst);
    assert_eq!(engine.active_cell(), a1("A1"));
    engine.dispatch(GridAction::PageDown);
    assert!(engine.active_cell().row > 10);
    engine.dispatch(GridAction::SelectAll);
    assert_eq!(engine.selection().rects(), &[rect("A1:ALL1000")]);
}

#[test]
fn pointer_drag_selects_rect() {
    let (mut engine, _) = engine_with(&[]);
    engine.pointer_down(196.0, 55.0, PointerModifiers::NONE);
    engine.pointer_move(396.0, 99.0);
    assert!(engine.selection().is_dragging());
    engine.pointer_up();
    assert_eq!(engine.selection().rects(), &[rect("B2:D4")]);
    assert_eq!(engine.active_cell(), a1("B2"));
}

#[test]
fn reverse_drag_is_normalized() {
    let (mut engine, _) = engine_with(&[]);
    engine.pointer_down(396.0, 99.0, PointerModifiers::NONE);
    engine.pointer_move(196.0, 55.0);
    engine.pointer_up();
    assert_eq!(engine.selection().rects(), &[rect("B2:D4")]);
    assert_eq!(engine.active_cell(), a1("D4"));
}

#[test]
fn ctrl_click_adds_disjoint_rect() {
    let (mut engine, _) = engine_with(&[]);
    engine.pointer_down(96.0, 33.0, PointerModifiers::NONE);
    engine.pointer_up();
    engine.pointer_down(396.0, 99.0, PointerModifiers::CTRL);
    assert_eq!(engine.selection().rects(), &[rect("A1")]);
    assert_eq!(engine.selection().draft(), Some(rect("D4")));
    engine.pointer_up();
    assert_eq!(engine.selection().rects(), &[rect("A1"), rect("D4")]);
    assert_eq!(engine.active_cell(), a1("D4"));
    assert!(engine.selection().is_column_highlighted(1));
    assert!(!engine.selection().is_column_highlighted(2));
}

#[test]
fn fill_handle_gesture_fills_and_selects() {
    let (mut engine, log) = engine_with(&[("A1", "x")]);
    engine.pointer_down(96.0, 33.0, PointerModifiers::NONE);
    engine.pointer_up();
    assert!(engine.pointer_down_on_fill_handle());
    engine.pointer_move(96.0, 99.0);
    assert_eq!(engine.selection().fill_draft(), Some(rect("A1:A4")));
    engine.pointer_up();

    for row in 2..=4 {
        assert_eq!(engine.get_value(CellAddress::new(row, 1)), CellValue::from("x"));
    }
    assert_eq!(engine.selection().rects(), &[rect("A1:A4")]);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn fill_handle_without_growth_does_nothing() {
    let (mut engine, log) = engine_with(&[("A1", "x")]);
    engine.pointer_down_on_fill_handle();
    engine.pointer_move(96.0, 33.0);
    engine.pointer_up();
    assert!(log.borrow().is_empty());
}

#[test]
fn press_during_fill_drag_abandons_it() {
    let (mut engine, log) = engine_with(&[("A1", "x")]);
    assert!(engine.pointer_down_on_fill_handle());
    engine.pointer_move(96.0, 99.0);
    engine.pointer_down(396.0, 99.0, PointerModifiers::NONE);
    assert!(!engine.selection().is_filling());
    assert_eq!(engine.selection().fill_draft(), None);

    engine.pointer_move(396.0, 121.0);
    engine.pointer_up();
    assert_eq!(engine.selection().rects(), &[rect("D4:D5")]);
    assert!(log.borrow().is_empty());
}

#[test]
fn hover_reports_display_text() {
    let (mut engine, _) = engine_with(&[("B2", "=1+1")]);
    assert_eq!(engine.hover(196.0, 55.0), Some((a1("B2"), "2".to_string())));
    assert_eq!(engine.hovered_cell(), Some(a1("B2")));

    // Empty cells are tracked but show nothing.
    assert_eq!(engine.hover(96.0, 33.0), None);
    assert_eq!(engine.hovered_cell(), Some(a1("A1")));

    assert_eq!(engine.hover(196.0, 5.0), None);
    assert_eq!(engine.hovered_cell(), None);

    engine.hover(196.0, 55.0);
    engine.pointer_leave();
    assert_eq!(engine.hovered_cell(), None);
}

#[test]
fn gestures_ignored_while_editing() {
    let (mut engine, _) = engine_with(&[]);
    engine.begin_edit(EditTrigger::Key);
    assert!(!engine.pointer_down_on_fill_handle());
    engine.pointer_move(396.0, 99.0);
    assert!(engine.editor().is_editing());
}

#[test]
fn double_click_opens_editor_with_value() {
    let (mut engine, _) = engine_with(&[("B2", "=1+1")]);
    assert!(engine.double_click(196.0, 55.0));
    assert_eq!(engine.active_cell(), a1("B2"));
    assert_eq!(engine.edit_buffer(), Some("=1+1"));
}

#[test]
fn click_while_editing_commits_in_place() {
    let (mut engine, _) = engine_with(&[]);
    engine.begin_edit(EditTrigger::Typed('7'));
    engine.pointer_down(396.0, 99.0, PointerModifiers::NONE);
    assert_eq!(engine.get_value(a1("A1")), CellValue::Number(7.0));
    assert_eq!(engine.active_cell(), a1("D4"));
}

#[test]
fn long_text_widens_its_column() {
    let (mut engine, _) = engine_with(&[]);
    assert_eq!(engine.column_width(1), 100.0);
    edit(&mut engine, "A1", &"w".repeat(30), CommitDirection::Stay);
    assert!(engine.take_relayout_request());
    assert_eq!(engine.column_width(1), 220.0);
    // B1 now starts further right.
    assert_eq!(engine.resolve_address(300.0, 33.0), a1("B1"));
}

#[test]
fn scrolling_moves_visible_range() {
    let (mut engine, _) = engine_with(&[]);
    let range = engine.scroll_to(0.0, 220.0);
    assert_eq!(*range.rows.start(), 9);
    let range = engine.resize(800.0, 300.0);
    assert!(*range.rows.end() < 29);
}

struct Shout;

impl FormulaResolver for Shout {
    fn resolve(&self, _: CellAddress, expression: &str) -> Result<CellValue, FormulaError> {
        Ok(CellValue::Text(expression.to_uppercase()))
    }
}

#[test]
fn custom_resolver_drives_display() {
    let (engine, _) = engine_with(&[("A1", "=hello")]);
    let engine = engine.with_resolver(Box::new(Shout));
    assert_eq!(engine.display_value(a1("A1")), "HELLO");
}
