use shopfloor_core::{CellKind, SheetMeta, Slot, View};
use shopfloor_engine::ErrorKind;
use shopfloor_harness::{TestBench, demo_line_items, demo_meta};

// ============================================================================
// Projection over stored line items
// ============================================================================

#[test]
fn empty_sheet_projects_no_rows_in_every_view() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.workbench.create_sheet(SheetMeta::default())?;

    for view in View::ALL {
        let projection = bench.workbench.view(sheet_id, view)?;
        assert!(projection.rows.is_empty(), "{view:?} should be empty");
        assert_eq!(projection.headers.len(), view.columns().len());
    }
    Ok(())
}

#[test]
fn quotation_computes_line_totals() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(demo_meta(), &demo_line_items())?;

    let quotation = bench.workbench.view(sheet_id, View::Quotation)?;
    let totals: Vec<&str> = quotation
        .rows
        .iter()
        .map(|row| row.cells[7].content.as_str())
        .collect();
    assert_eq!(totals, ["1250.00", "1760.00", "", "1202.00", ""]);
    Ok(())
}

#[test]
fn outsourcing_shows_only_flagged_rows_renumbered() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(demo_meta(), &demo_line_items())?;

    let outsourcing = bench.workbench.view(sheet_id, View::Outsourcing)?;
    assert_eq!(outsourcing.rows.len(), 2);
    assert_eq!(outsourcing.rows[0].number, 1);
    assert_eq!(outsourcing.rows[0].source_row, Some(1));
    assert_eq!(outsourcing.rows[0].cells[1].content, "drive shaft");
    assert_eq!(outsourcing.rows[1].number, 2);
    assert_eq!(outsourcing.rows[1].source_row, Some(3));
    assert_eq!(outsourcing.rows[1].cells[1].content, "gear blank");
    // surface treatment sits before quantity in this layout
    assert_eq!(outsourcing.rows[1].cells[3].content, "carburize");
    assert_eq!(outsourcing.rows[1].cells[4].content, "8 pcs");
    Ok(())
}

#[test]
fn round_trip_through_every_writable_column() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(SheetMeta::default(), &demo_line_items())?;

    for view in View::ALL {
        for (column, spec) in view.columns().iter().enumerate() {
            if spec.is_derived() {
                continue;
            }
            // Keep the outsourcing filter stable while writing through it.
            let content = match spec.slot() {
                Some(Slot::Outsourced) => "true".to_string(),
                _ => format!("{}-{}", view.as_str(), spec.key),
            };
            let stored = bench.write(sheet_id, view, 0, column as i64, &content)?;
            assert_eq!(stored.kind, CellKind::Text);

            let projection = bench.workbench.view(sheet_id, view)?;
            let cell = projection.cell(0, column).ok_or("missing projected cell")?;
            assert_eq!(cell.content, content, "{}.{}", view.as_str(), spec.key);
        }
    }
    Ok(())
}

#[test]
fn views_share_stored_columns() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.workbench.create_sheet(SheetMeta::default())?;

    bench.write(sheet_id, View::Production, 0, 1, "flange")?;
    bench.write(sheet_id, View::Production, 0, 6, "5-axis milling")?;

    let shipping = bench.workbench.view(sheet_id, View::Shipping)?;
    assert_eq!(shipping.rows[0].cells[1].content, "flange");
    let quotation = bench.workbench.view(sheet_id, View::Quotation)?;
    assert_eq!(quotation.rows[0].cells[1].content, "flange");
    assert!(quotation.rows[0].cells.iter().all(|c| c.content != "5-axis milling"));
    Ok(())
}

#[test]
fn derived_column_rejects_writes() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(demo_meta(), &demo_line_items())?;

    let err = bench.write(sheet_id, View::Quotation, 0, 7, "1.00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadOnlyColumn);
    let err = bench.write(sheet_id, View::Outsourcing, 0, 6, "1.00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReadOnlyColumn);
    Ok(())
}

#[test]
fn flagging_a_row_adds_it_to_outsourcing() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(demo_meta(), &demo_line_items())?;

    bench.write(sheet_id, View::Shipping, 4, 6, "true")?;
    assert_eq!(bench.workbench.view(sheet_id, View::Outsourcing)?.rows.len(), 3);

    // Anything but the literal flag clears it.
    bench.write(sheet_id, View::Quotation, 1, 8, "TRUE")?;
    let outsourcing = bench.workbench.view(sheet_id, View::Outsourcing)?;
    let sources: Vec<_> = outsourcing.rows.iter().map(|r| r.source_row).collect();
    assert_eq!(sources, [Some(3), Some(4)]);
    Ok(())
}

#[test]
fn print_documents_pad_and_total() -> Result<(), Box<dyn std::error::Error>> {
    let mut bench = TestBench::new()?;
    let sheet_id = bench.create_order(demo_meta(), &demo_line_items())?;

    let quotation = bench.workbench.print_document(sheet_id, View::Quotation)?;
    assert_eq!(quotation.rows.len(), 5);
    assert_eq!(quotation.grand_total.as_deref(), Some("4212.00"));
    assert_eq!(quotation.meta.order_id, "QUO-2026-0815");

    let order = bench.workbench.print_document(sheet_id, View::Outsourcing)?;
    assert_eq!(order.title, "Purchase Order");
    assert_eq!(order.rows.len(), 4);
    assert_eq!(order.grand_total.as_deref(), Some("2962.00"));

    let production = bench.workbench.print_document(sheet_id, View::Production)?;
    assert_eq!(production.grand_total, None);
    Ok(())
}
