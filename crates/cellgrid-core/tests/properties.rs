//! Property tests for selection normalization and undo/redo symmetry.

use std::collections::BTreeMap;

use cellgrid_core::{
    CellAddress, CellValue, CommitDirection, EditTrigger, GridBounds, GridConfig, Selection,
    SelectionRect, Sheet, SheetEngine,
};
use proptest::prelude::*;

fn small_config() -> GridConfig {
    let mut config = GridConfig::default();
    config.row_count = 20;
    config.column_count = 20;
    config
}

fn snapshot(engine: &SheetEngine) -> BTreeMap<CellAddress, CellValue> {
    engine
        .sheet()
        .grid()
        .iter()
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect()
}

fn address() -> impl Strategy<Value = CellAddress> {
    (1usize..=20, 1usize..=20).prop_map(|(row, column)| CellAddress::new(row, column))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn drag_rect_is_normalized(start in address(), end in address()) {
        let mut selection = Selection::new(GridBounds::new(20, 20));
        selection.begin_selection(start);
        selection.extend_selection(end);
        selection.end_selection();

        let rect = selection.last_rect();
        prop_assert!(rect.top <= rect.bottom);
        prop_assert!(rect.left <= rect.right);
        prop_assert!(rect.contains(start));
        prop_assert!(rect.contains(end));
        prop_assert_eq!(rect, SelectionRect::spanning(end, start));
        prop_assert_eq!(selection.active_cell(), start);
    }

    #[test]
    fn undo_all_then_redo_all_restores_states(
        edits in prop::collection::vec((address(), "[a-z0-9]{0,4}"), 1..8)
    ) {
        let mut engine = SheetEngine::new(Sheet::new("Sheet1"), small_config());
        let before = snapshot(&engine);
        for (at, input) in &edits {
            engine.move_to(*at, false);
            engine.begin_edit(EditTrigger::Programmatic(Some(input.clone())));
            engine.commit_edit(CommitDirection::Stay);
        }
        let after = snapshot(&engine);

        while engine.undo() {}
        prop_assert_eq!(snapshot(&engine), before);
        while engine.redo() {}
        prop_assert_eq!(snapshot(&engine), after);
    }

    #[test]
    fn fill_undo_restores_target(
        seed in prop::collection::vec((address(), 0u32..100), 0..10),
        source in address(),
        corner_a in address(),
        corner_b in address(),
    ) {
        let sheet = Sheet::with_cells(
            "Sheet1",
            seed.iter().map(|(a, n)| (*a, CellValue::Number(f64::from(*n)))),
        );
        let mut engine = SheetEngine::new(sheet, small_config());
        let before = snapshot(&engine);
        let target = SelectionRect::spanning(corner_a, corner_b);

        let filled = engine.fill(source, Some(target));
        let value = engine.get_value(source);
        for a in target.addresses() {
            prop_assert_eq!(engine.get_value(a), value.clone());
        }

        // Nothing to change means nothing to undo.
        prop_assert_eq!(engine.undo(), filled);
        prop_assert_eq!(snapshot(&engine), before);
    }
}
