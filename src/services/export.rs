use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::{
    error::AppError,
    models::trip::{Expense, MemberAmount},
};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const EXPENSES_SHEET: &str = "Expenses";
pub const SHARES_SHEET: &str = "Shares";
pub const GIVE_RECEIVE_SHEET: &str = "Give_Receive";

/// Longest string Excel stores in a single cell, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

pub fn export_file_name(trip_name: &str) -> String {
    format!("{trip_name}_expenses_and_shares.xlsx")
}

/// Writes the expenses, shares and balances of one trip into a three-sheet
/// workbook and returns the file contents.
pub fn export_workbook(
    expenses: &[Expense],
    shares: &[MemberAmount],
    give_receive: &[MemberAmount],
) -> Result<Vec<u8>, AppError> {
    if expenses.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    write_expenses(workbook.add_worksheet(), &header, expenses)?;
    write_amounts(
        workbook.add_worksheet(),
        &header,
        SHARES_SHEET,
        ["Member", "Share"],
        shares,
    )?;
    write_amounts(
        workbook.add_worksheet(),
        &header,
        GIVE_RECEIVE_SHEET,
        ["Member", "Amount"],
        give_receive,
    )?;

    let bytes = workbook.save_to_buffer()?;
    info!(
        expenses = expenses.len(),
        bytes = bytes.len(),
        "workbook exported"
    );
    Ok(bytes)
}

fn write_expenses(
    sheet: &mut Worksheet,
    header: &Format,
    expenses: &[Expense],
) -> Result<(), XlsxError> {
    sheet.set_name(EXPENSES_SHEET)?;
    for (col, title) in ["member", "description", "amount"].into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, header)?;
    }
    for (index, expense) in expenses.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, cell_text(&expense.member))?;
        sheet.write_string(row, 1, cell_text(&expense.description))?;
        sheet.write_number(row, 2, expense.amount)?;
    }
    Ok(())
}

fn write_amounts(
    sheet: &mut Worksheet,
    header: &Format,
    name: &str,
    titles: [&str; 2],
    rows: &[MemberAmount],
) -> Result<(), XlsxError> {
    sheet.set_name(name)?;
    for (col, title) in titles.into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, header)?;
    }
    for (index, item) in rows.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, cell_text(&item.member))?;
        sheet.write_number(row, 1, item.amount)?;
    }
    Ok(())
}

/// Cuts `text` down to what fits in one cell.
fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
