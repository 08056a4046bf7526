//! A single worksheet and its local cell cache.

use std::fmt;

use tracing::{debug, info};

use crate::{
    Error, Result, SheetsClient,
    a1::{self, CellRef, ColumnRef},
    color::{ColorSpec, TabColor},
    grid::CellGrid,
    spreadsheet::spreadsheet_id_from_url,
    types::{
        BatchUpdateRequest, Dimension, GridProperties, Request, SheetProperties,
        UpdateSheetProperties, ValueRangeInput,
    },
};

/// Row count Google Sheets gives a new sheet.
pub const DEFAULT_ROW_COUNT: u32 = 1000;

/// Column count Google Sheets gives a new sheet.
pub const DEFAULT_COLUMN_COUNT: u32 = 26;

/// One sheet (tab) of a spreadsheet.
///
/// Reads are served from the local cache, which is filled by
/// [`refresh_data`](Self::refresh_data) and kept in step with every
/// successful write made through this object. Changes made by other users
/// are only seen after a refresh.
#[derive(Debug, Clone)]
pub struct Sheet {
    client: SheetsClient,
    spreadsheet_id: String,
    id: i64,
    properties: SheetProperties,
    cells: CellGrid,
}

impl Sheet {
    pub(crate) fn new(
        client: SheetsClient,
        spreadsheet_id: impl Into<String>,
        properties: SheetProperties,
    ) -> Result<Self> {
        let id = properties.sheet_id.ok_or_else(|| {
            Error::InvalidArgument("sheet properties are missing a sheetId".to_string())
        })?;
        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            id,
            properties,
            cells: CellGrid::new(),
        })
    }

    pub(crate) fn apply_properties(&mut self, properties: SheetProperties) {
        self.properties = properties;
        self.properties.sheet_id = Some(self.id);
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn title(&self) -> &str {
        self.properties.title.as_deref().unwrap_or_default()
    }

    /// 0-based position among the spreadsheet's sheets.
    pub fn index(&self) -> u32 {
        self.properties.index.unwrap_or_default()
    }

    pub fn sheet_type(&self) -> Option<&str> {
        self.properties.sheet_type.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.properties.hidden.unwrap_or_default()
    }

    pub fn is_right_to_left(&self) -> bool {
        self.properties.right_to_left.unwrap_or_default()
    }

    pub fn tab_color(&self) -> Option<TabColor> {
        self.properties.tab_color
    }

    pub fn properties(&self) -> &SheetProperties {
        &self.properties
    }

    pub fn cells(&self) -> &CellGrid {
        &self.cells
    }

    pub fn row_count(&self) -> u32 {
        self.grid().row_count.unwrap_or(DEFAULT_ROW_COUNT)
    }

    pub fn column_count(&self) -> u32 {
        self.grid().column_count.unwrap_or(DEFAULT_COLUMN_COUNT)
    }

    pub fn frozen_row_count(&self) -> u32 {
        self.grid().frozen_row_count.unwrap_or_default()
    }

    pub fn frozen_column_count(&self) -> u32 {
        self.grid().frozen_column_count.unwrap_or_default()
    }

    pub fn hide_gridlines(&self) -> bool {
        self.grid().hide_gridlines.unwrap_or_default()
    }

    pub fn row_group_control_after(&self) -> bool {
        self.grid().row_group_control_after.unwrap_or_default()
    }

    pub fn column_group_control_after(&self) -> bool {
        self.grid().column_group_control_after.unwrap_or_default()
    }

    fn grid(&self) -> GridProperties {
        self.properties.grid_properties.unwrap_or_default()
    }

    /// Every grid property with defaults filled in, as uploaded by the
    /// grid setters.
    fn full_grid(&self) -> GridProperties {
        GridProperties {
            row_count: Some(self.row_count()),
            column_count: Some(self.column_count()),
            frozen_row_count: Some(self.frozen_row_count()),
            frozen_column_count: Some(self.frozen_column_count()),
            hide_gridlines: Some(self.hide_gridlines()),
            row_group_control_after: Some(self.row_group_control_after()),
            column_group_control_after: Some(self.column_group_control_after()),
        }
    }

    fn full_range(&self) -> Result<String> {
        a1::cell_range(
            self.title(),
            (1, 1),
            (self.column_count().max(1), self.row_count().max(1)),
        )
    }

    // Reads

    /// Returns the cached value of one cell, or `""` if it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if `cell` is not a valid 1-based address.
    pub fn get(&self, cell: impl Into<CellRef>) -> Result<&str> {
        let (column, row) = cell.into().resolve()?;
        Ok(self.cells.get(column, row))
    }

    /// Returns one row, `column_count()` cells wide.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for row 0.
    pub fn get_row(&self, row: u32) -> Result<Vec<String>> {
        check_position("row", row)?;
        Ok(self.cells.row(row, self.column_count()))
    }

    /// Returns rows `start..stop`. `stop` defaults to one past the last row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either bound is 0.
    pub fn get_rows(&self, start: u32, stop: Option<u32>) -> Result<Vec<Vec<String>>> {
        check_position("start row", start)?;
        let stop = stop.unwrap_or_else(|| self.row_count().saturating_add(1));
        check_position("stop row", stop)?;
        let width = self.column_count();
        Ok((start..stop).map(|row| self.cells.row(row, width)).collect())
    }

    /// Returns one column, `row_count()` cells tall.
    ///
    /// # Errors
    ///
    /// Returns an error for column 0 or malformed column letters.
    pub fn get_column(&self, column: impl Into<ColumnRef>) -> Result<Vec<String>> {
        let column = column.into().resolve()?;
        Ok(self.cells.column(column, self.row_count()))
    }

    /// Returns columns `start..stop`. `stop` defaults to one past the last
    /// column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if either bound is 0.
    pub fn get_columns(&self, start: u32, stop: Option<u32>) -> Result<Vec<Vec<String>>> {
        check_position("start column", start)?;
        let stop = stop.unwrap_or_else(|| self.column_count().saturating_add(1));
        check_position("stop column", stop)?;
        let height = self.row_count();
        Ok((start..stop)
            .map(|column| self.cells.column(column, height))
            .collect())
    }

    /// Iterates over every row of the sheet.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let width = self.column_count();
        (1..=self.row_count()).map(move |row| self.cells.row(row, width))
    }

    // Writes

    /// Writes one cell, growing the sheet first if the cell lies outside it.
    ///
    /// The value is entered as if typed, so `"=A1*2"` becomes a formula.
    ///
    /// # Errors
    ///
    /// Returns an error if `cell` is invalid or a remote call fails.
    pub async fn update(&mut self, cell: impl Into<CellRef>, value: impl Into<String>) -> Result<()> {
        let (column, row) = cell.into().resolve()?;
        self.grow_to(column, row).await?;
        self.write_block((column, row), Dimension::Rows, vec![vec![value.into()]])
            .await
    }

    /// Replaces a whole row. Short input is padded with empty cells up to
    /// the column count; longer input widens the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error for row 0 or if a remote call fails.
    pub async fn update_row<I, S>(&mut self, row: u32, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check_position("row", row)?;
        let mut values = collect_strings(values);
        pad(&mut values, self.column_count());
        self.grow_to(count(values.len())?, row).await?;
        self.write_block((1, row), Dimension::Rows, vec![values])
            .await
    }

    /// Replaces a whole column. Short input is padded with empty cells up
    /// to the row count; longer input lengthens the sheet.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid column or if a remote call fails.
    pub async fn update_column<I, S>(&mut self, column: impl Into<ColumnRef>, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = column.into().resolve()?;
        let mut values = collect_strings(values);
        pad(&mut values, self.row_count());
        self.grow_to(column, count(values.len())?).await?;
        self.write_block((column, 1), Dimension::Columns, vec![values])
            .await
    }

    /// Replaces everything from `start_row` to the end of the sheet.
    ///
    /// Every row is padded to the widest of the input and the column count,
    /// and blank rows are appended through the last row, so rows below the
    /// input are cleared. The sheet grows to fit the input.
    ///
    /// # Errors
    ///
    /// Returns an error for `start_row` 0 or if a remote call fails.
    pub async fn update_rows<R, I, S>(&mut self, rows: R, start_row: u32) -> Result<()>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check_position("start row", start_row)?;
        let rows: Vec<Vec<String>> = rows.into_iter().map(collect_strings).collect();
        let through_end = self.row_count().saturating_add(1).saturating_sub(start_row);
        let block = rectangular(rows, self.column_count(), through_end);
        let Some(first) = block.first() else {
            return Ok(());
        };

        let width = count(first.len())?;
        let last_row = last_position(start_row, block.len())?;
        self.grow_to(width, last_row).await?;
        self.write_block((1, start_row), Dimension::Rows, block)
            .await
    }

    /// Replaces everything from `start_column` to the right edge of the
    /// sheet. The column counterpart of [`update_rows`](Self::update_rows).
    ///
    /// # Errors
    ///
    /// Returns an error for `start_column` 0 or if a remote call fails.
    pub async fn update_columns<C, I, S>(&mut self, columns: C, start_column: u32) -> Result<()>
    where
        C: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check_position("start column", start_column)?;
        let columns: Vec<Vec<String>> = columns.into_iter().map(collect_strings).collect();
        let through_end = self
            .column_count()
            .saturating_add(1)
            .saturating_sub(start_column);
        let block = rectangular(columns, self.row_count(), through_end);
        let Some(first) = block.first() else {
            return Ok(());
        };

        let height = count(first.len())?;
        let last_column = last_position(start_column, block.len())?;
        self.grow_to(last_column, height).await?;
        self.write_block((start_column, 1), Dimension::Columns, block)
            .await
    }

    /// Clears every value on the sheet, keeping its size and formatting.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn clear(&mut self) -> Result<()> {
        let range = self.full_range()?;
        self.client
            .clear_values(&self.spreadsheet_id, &range)
            .await?;
        self.cells.clear();
        Ok(())
    }

    async fn write_block(
        &mut self,
        origin: (u32, u32),
        dimension: Dimension,
        values: Vec<Vec<String>>,
    ) -> Result<()> {
        let outer = count(values.len())?;
        let inner = count(values.iter().map(Vec::len).max().unwrap_or_default())?;
        if outer == 0 || inner == 0 {
            return Ok(());
        }
        let (left, top) = origin;
        let end = match dimension {
            Dimension::Rows => (left + inner - 1, top + outer - 1),
            Dimension::Columns => (left + outer - 1, top + inner - 1),
        };

        let input = ValueRangeInput {
            range: a1::cell_range(self.title(), origin, end)?,
            major_dimension: dimension,
            values,
        };
        self.client
            .update_values(&self.spreadsheet_id, &input)
            .await?;
        self.cells.write_block(origin, dimension, &input.values);
        Ok(())
    }

    async fn grow_to(&mut self, columns: u32, rows: u32) -> Result<()> {
        if columns <= self.column_count() && rows <= self.row_count() {
            return Ok(());
        }
        self.resize(
            Some(columns.max(self.column_count())),
            Some(rows.max(self.row_count())),
        )
        .await
    }

    // Sheet properties

    /// Changes the row and column counts in one request. `None` keeps the
    /// current value. Cached cells outside the new bounds are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if a count is 0 or would leave every row or column
    /// frozen, or if the remote call fails.
    pub async fn resize(&mut self, columns: Option<u32>, rows: Option<u32>) -> Result<()> {
        let columns = columns.unwrap_or_else(|| self.column_count());
        let rows = rows.unwrap_or_else(|| self.row_count());
        if columns == self.column_count() && rows == self.row_count() {
            return Ok(());
        }
        self.check_column_count(columns)?;
        self.check_row_count(rows)?;

        let size = GridProperties {
            row_count: Some(rows),
            column_count: Some(columns),
            ..GridProperties::default()
        };
        self.update_properties(
            SheetProperties {
                grid_properties: Some(size),
                ..SheetProperties::default()
            },
            "gridProperties.rowCount,gridProperties.columnCount",
        )
        .await?;

        let mut grid = self.grid();
        grid.row_count = Some(rows);
        grid.column_count = Some(columns);
        self.properties.grid_properties = Some(grid);
        self.cells.truncate(columns, rows);
        debug!(sheet = self.title(), columns, rows, "resized sheet");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `rows` is 0 or not above the frozen row count, or
    /// if a remote call fails.
    pub async fn set_row_count(&mut self, rows: u32) -> Result<()> {
        self.check_row_count(rows)?;
        self.update_grid(|grid| grid.row_count = Some(rows)).await
    }

    /// # Errors
    ///
    /// Returns an error if `columns` is 0 or not above the frozen column
    /// count, or if a remote call fails.
    pub async fn set_column_count(&mut self, columns: u32) -> Result<()> {
        self.check_column_count(columns)?;
        self.update_grid(|grid| grid.column_count = Some(columns))
            .await
    }

    /// Freezes the top `rows` rows. Zero unfreezes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without any remote call when
    /// `rows` is not below the row count.
    pub async fn set_frozen_row_count(&mut self, rows: u32) -> Result<()> {
        if rows >= self.row_count() {
            return Err(Error::InvalidArgument(format!(
                "cannot freeze all rows of sheet {:?}, which has {} rows",
                self.title(),
                self.row_count()
            )));
        }
        self.update_grid(|grid| grid.frozen_row_count = Some(rows))
            .await
    }

    /// Freezes the leftmost `columns` columns. Zero unfreezes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without any remote call when
    /// `columns` is not below the column count.
    pub async fn set_frozen_column_count(&mut self, columns: u32) -> Result<()> {
        if columns >= self.column_count() {
            return Err(Error::InvalidArgument(format!(
                "cannot freeze all columns of sheet {:?}, which has {} columns",
                self.title(),
                self.column_count()
            )));
        }
        self.update_grid(|grid| grid.frozen_column_count = Some(columns))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if a remote call fails.
    pub async fn set_hide_gridlines(&mut self, hide: bool) -> Result<()> {
        self.update_grid(|grid| grid.hide_gridlines = Some(hide))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if a remote call fails.
    pub async fn set_row_group_control_after(&mut self, after: bool) -> Result<()> {
        self.update_grid(|grid| grid.row_group_control_after = Some(after))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if a remote call fails.
    pub async fn set_column_group_control_after(&mut self, after: bool) -> Result<()> {
        self.update_grid(|grid| grid.column_group_control_after = Some(after))
            .await
    }

    /// Re-reads the grid properties so a concurrent change to another
    /// property is not overwritten, applies `change`, and uploads the result.
    async fn update_grid(&mut self, change: impl FnOnce(&mut GridProperties)) -> Result<()> {
        self.refresh_properties().await?;
        let mut grid = self.full_grid();
        change(&mut grid);

        self.update_properties(
            SheetProperties {
                grid_properties: Some(grid),
                ..SheetProperties::default()
            },
            "gridProperties",
        )
        .await?;

        self.properties.grid_properties = Some(grid);
        self.cells.truncate(self.column_count(), self.row_count());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        self.update_properties(
            SheetProperties {
                title: Some(title.clone()),
                ..SheetProperties::default()
            },
            "title",
        )
        .await?;
        self.properties.title = Some(title);
        Ok(())
    }

    /// Sets the tab color from a color name, an RGB or RGBA tuple, or a raw
    /// color object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] without any remote call when the color
    /// is not recognized, or an error if the remote call fails.
    pub async fn set_tab_color(&mut self, color: impl Into<ColorSpec>) -> Result<()> {
        let color = color.into().resolve()?;
        self.update_properties(
            SheetProperties {
                tab_color: Some(color),
                ..SheetProperties::default()
            },
            "tabColor",
        )
        .await?;
        self.properties.tab_color = Some(color);
        Ok(())
    }

    async fn update_properties(&self, properties: SheetProperties, fields: &str) -> Result<()> {
        let request = BatchUpdateRequest::single(Request::UpdateSheetProperties(
            UpdateSheetProperties {
                properties: SheetProperties {
                    sheet_id: Some(self.id),
                    ..properties
                },
                fields: fields.to_string(),
            },
        ));
        self.client
            .batch_update(&self.spreadsheet_id, &request)
            .await?;
        Ok(())
    }

    /// Copies this sheet into another spreadsheet, given by id or URL.
    /// Returns the properties of the new sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is malformed or the remote call
    /// fails.
    pub async fn copy_to(&self, destination: &str) -> Result<SheetProperties> {
        let destination = spreadsheet_id_from_url(destination)?;
        let copied = self
            .client
            .copy_sheet(&self.spreadsheet_id, self.id, &destination)
            .await?;
        info!(
            sheet = self.title(),
            destination = %destination,
            "copied sheet"
        );
        Ok(copied)
    }

    // Refresh

    /// Re-reads both the properties and the cell values of this sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote call fails or the sheet no longer
    /// exists.
    pub async fn refresh(&mut self) -> Result<()> {
        self.refresh_properties().await?;
        self.refresh_data().await
    }

    /// Re-reads this sheet's properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SheetNotFound`] if the sheet has been deleted, or an
    /// error if the remote call fails.
    pub async fn refresh_properties(&mut self) -> Result<()> {
        let resource = self.client.get_spreadsheet(&self.spreadsheet_id).await?;
        let properties = resource
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.sheet_id == Some(self.id))
            .ok_or_else(|| {
                Error::SheetNotFound(format!(
                    "sheet id {} in spreadsheet {}",
                    self.id, self.spreadsheet_id
                ))
            })?;
        self.apply_properties(properties);
        Ok(())
    }

    /// Replaces the cell cache with the sheet's current values.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn refresh_data(&mut self) -> Result<()> {
        let range = self.full_range()?;
        let values = self.client.get_values(&self.spreadsheet_id, &range).await?;
        self.cells.load(&values);
        debug!(sheet = self.title(), cells = self.cells.len(), "loaded sheet data");
        Ok(())
    }

    fn check_row_count(&self, rows: u32) -> Result<()> {
        if rows < 1 {
            return Err(Error::OutOfRange(
                "row count must be at least 1".to_string(),
            ));
        }
        if rows <= self.frozen_row_count() {
            return Err(Error::InvalidArgument(format!(
                "cannot have all rows frozen: sheet {:?} has {} frozen rows",
                self.title(),
                self.frozen_row_count()
            )));
        }
        Ok(())
    }

    fn check_column_count(&self, columns: u32) -> Result<()> {
        if columns < 1 {
            return Err(Error::OutOfRange(
                "column count must be at least 1".to_string(),
            ));
        }
        if columns <= self.frozen_column_count() {
            return Err(Error::InvalidArgument(format!(
                "cannot have all columns frozen: sheet {:?} has {} frozen columns",
                self.title(),
                self.frozen_column_count()
            )));
        }
        Ok(())
    }
}

impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.spreadsheet_id == other.spreadsheet_id
    }
}

impl Eq for Sheet {}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Sheet title={:?}, sheetId={}, rowCount={}, columnCount={}>",
            self.title(),
            self.id,
            self.row_count(),
            self.column_count()
        )
    }
}

fn check_position(what: &str, position: u32) -> Result<()> {
    if position < 1 {
        return Err(Error::OutOfRange(format!(
            "{what} 0 does not exist; rows and columns are 1-based, use 1 for the first"
        )));
    }
    Ok(())
}

fn count(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::OutOfRange(format!("{len} cells exceeds the size of a sheet")))
}

fn last_position(start: u32, len: usize) -> Result<u32> {
    count(len)?
        .checked_add(start - 1)
        .ok_or_else(|| Error::OutOfRange(format!("{len} cells from {start} exceeds a sheet")))
}

fn collect_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

fn pad(values: &mut Vec<String>, len: u32) {
    let len = len as usize;
    if values.len() < len {
        values.resize(len, String::new());
    }
}

/// Pads `lines` into a rectangle: each line to at least `min_len` cells and
/// to the longest line, and the block to at least `min_lines` lines.
fn rectangular(mut lines: Vec<Vec<String>>, min_len: u32, min_lines: u32) -> Vec<Vec<String>> {
    let longest = lines.iter().map(Vec::len).max().unwrap_or_default();
    let width = longest.max(min_len as usize);
    if lines.len() < min_lines as usize {
        lines.resize_with(min_lines as usize, Vec::new);
    }
    for line in &mut lines {
        line.resize(width, String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method, path},
    };

    use super::*;
    use crate::testing::{
        SPREADSHEET_ID, bodies, client, forbid_writes, mount_batch_update, mount_metadata,
        mount_values, sheet_json, sheet_properties,
    };

    fn sheet(server: &MockServer, columns: u32, rows: u32) -> Sheet {
        Sheet::new(
            client(server),
            SPREADSHEET_ID,
            sheet_properties(0, "Sheet1", 0, columns, rows),
        )
        .unwrap()
    }

    async fn accept_value_writes(server: &MockServer) {
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": SPREADSHEET_ID
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_by_coordinates_and_reference() {
        let server = MockServer::start().await;
        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(2, 5, "hello");

        assert_eq!(sheet.get((2, 5)).unwrap(), "hello");
        assert_eq!(sheet.get("B5").unwrap(), "hello");
        assert_eq!(sheet.get("C1").unwrap(), "");
        assert!(matches!(sheet.get((0, 1)), Err(Error::OutOfRange(_))));
        assert!(matches!(
            sheet.get("5B"),
            Err(Error::InvalidCellReference(_))
        ));
    }

    #[tokio::test]
    async fn test_update_changes_only_that_cell() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!(
                "/spreadsheets/{SPREADSHEET_ID}/values/'Sheet1'!B2:B2"
            )))
            .and(body_json(json!({
                "range": "'Sheet1'!B2:B2",
                "majorDimension": "ROWS",
                "values": [["new"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(1, 1, "a");
        sheet.cells.set(2, 2, "old");
        sheet.cells.set(3, 3, "c");

        sheet.update("B2", "new").await.unwrap();

        assert_eq!(sheet.get((2, 2)).unwrap(), "new");
        assert_eq!(sheet.get((1, 1)).unwrap(), "a");
        assert_eq!(sheet.get((3, 3)).unwrap(), "c");
        assert_eq!(sheet.cells().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(1, 1, "kept");

        let err = sheet.update((1, 1), "lost").await.unwrap_err();

        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(sheet.get((1, 1)).unwrap(), "kept");
    }

    #[tokio::test]
    async fn test_update_outside_bounds_grows_sheet_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/spreadsheets/{SPREADSHEET_ID}:batchUpdate")))
            .and(body_json(json!({
                "requests": [{
                    "updateSheetProperties": {
                        "properties": {
                            "sheetId": 0,
                            "gridProperties": {"rowCount": 10, "columnCount": 5}
                        },
                        "fields": "gridProperties.rowCount,gridProperties.columnCount"
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"replies": [{}]})))
            .expect(1)
            .mount(&server)
            .await;
        accept_value_writes(&server).await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.update((5, 10), "far").await.unwrap();

        assert_eq!(sheet.column_count(), 5);
        assert_eq!(sheet.row_count(), 10);
        assert_eq!(sheet.get("E10").unwrap(), "far");
    }

    #[tokio::test]
    async fn test_refresh_data_replaces_entire_cache() {
        let server = MockServer::start().await;
        mount_values(&server, "'Sheet1'!A1:C3", json!([["x"], ["", "y"]])).await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(3, 3, "stale");

        sheet.refresh_data().await.unwrap();

        assert_eq!(sheet.get((1, 1)).unwrap(), "x");
        assert_eq!(sheet.get((2, 2)).unwrap(), "y");
        assert_eq!(sheet.get((3, 3)).unwrap(), "");
        assert_eq!(sheet.cells().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_remote_property_changes() {
        let server = MockServer::start().await;
        mount_metadata(&server, "Book", &[sheet_json(0, "Renamed", 0, 2, 2)], None).await;
        mount_values(&server, "'Renamed'!A1:B2", json!([["a", "b"]])).await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.refresh().await.unwrap();

        assert_eq!(sheet.title(), "Renamed");
        assert_eq!(sheet.column_count(), 2);
        assert_eq!(sheet.get_row(1).unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_refresh_of_deleted_sheet_is_not_found() {
        let server = MockServer::start().await;
        mount_metadata(&server, "Book", &[sheet_json(9, "Other", 0, 2, 2)], None).await;

        let mut sheet = sheet(&server, 3, 3);
        let err = sheet.refresh().await.unwrap_err();

        assert!(matches!(err, Error::SheetNotFound(_)));
    }

    #[tokio::test]
    async fn test_dense_reads_are_bounded_by_sheet_size() {
        let server = MockServer::start().await;
        let mut sheet = sheet(&server, 3, 4);
        sheet.cells.set(1, 1, "a1");
        sheet.cells.set(3, 2, "c2");

        assert_eq!(sheet.get_row(2).unwrap(), ["", "", "c2"]);
        assert_eq!(sheet.get_column("A").unwrap(), ["a1", "", "", ""]);
        assert_eq!(sheet.get_rows(1, None).unwrap().len(), 4);
        assert_eq!(sheet.get_rows(2, Some(3)).unwrap(), [["", "", "c2"]]);
        assert_eq!(sheet.get_columns(1, None).unwrap().len(), 3);
        assert_eq!(sheet.rows().count(), 4);
        assert!(sheet.get_row(0).is_err());
        assert!(sheet.get_columns(0, None).is_err());
    }

    #[tokio::test]
    async fn test_update_row_pads_to_column_count() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!(
                "/spreadsheets/{SPREADSHEET_ID}/values/'Sheet1'!A2:D2"
            )))
            .and(body_json(json!({
                "range": "'Sheet1'!A2:D2",
                "majorDimension": "ROWS",
                "values": [["a", "b", "", ""]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 4, 5);
        sheet.cells.set(4, 2, "old");

        sheet.update_row(2, ["a", "b"]).await.unwrap();

        assert_eq!(sheet.get_row(2).unwrap(), ["a", "b", "", ""]);
    }

    #[tokio::test]
    async fn test_update_column_longer_than_sheet_grows_rows() {
        let server = MockServer::start().await;
        mount_batch_update(&server).await;
        accept_value_writes(&server).await;

        let mut sheet = sheet(&server, 2, 2);
        sheet
            .update_column("B", ["1", "2", "3"])
            .await
            .unwrap();

        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.get_column(2).unwrap(), ["1", "2", "3"]);

        let writes = bodies(&server, "PUT").await;
        assert_eq!(writes[0]["range"], "'Sheet1'!B1:B3");
        assert_eq!(writes[0]["majorDimension"], "COLUMNS");
    }

    #[tokio::test]
    async fn test_update_rows_replaces_through_end_of_sheet() {
        let server = MockServer::start().await;
        mount_batch_update(&server).await;
        Mock::given(method("PUT"))
            .and(path(format!(
                "/spreadsheets/{SPREADSHEET_ID}/values/'Sheet1'!A2:C4"
            )))
            .and(body_json(json!({
                "range": "'Sheet1'!A2:C4",
                "majorDimension": "ROWS",
                "values": [["a", "", ""], ["b", "c", "d"], ["", "", ""]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 2, 4);
        sheet.cells.set(1, 1, "header");
        sheet.cells.set(1, 4, "stale");

        sheet
            .update_rows(vec![vec!["a"], vec!["b", "c", "d"]], 2)
            .await
            .unwrap();

        assert_eq!(sheet.column_count(), 3);
        assert_eq!(sheet.get((1, 1)).unwrap(), "header");
        assert_eq!(sheet.get((3, 3)).unwrap(), "d");
        assert_eq!(sheet.get((1, 4)).unwrap(), "");
    }

    #[tokio::test]
    async fn test_update_rows_past_the_end_grows_the_sheet() {
        let server = MockServer::start().await;
        mount_batch_update(&server).await;
        accept_value_writes(&server).await;

        let mut sheet = sheet(&server, 2, 2);
        sheet
            .update_rows([["x", "y"]], 4)
            .await
            .unwrap();

        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.get_row(4).unwrap(), ["x", "y"]);
        assert_eq!(bodies(&server, "PUT").await[0]["range"], "'Sheet1'!A4:B4");
    }

    #[tokio::test]
    async fn test_update_columns_pads_to_row_count_and_right_edge() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!(
                "/spreadsheets/{SPREADSHEET_ID}/values/'Sheet1'!B1:C3"
            )))
            .and(body_json(json!({
                "range": "'Sheet1'!B1:C3",
                "majorDimension": "COLUMNS",
                "values": [["1", "2", ""], ["", "", ""]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        forbid_writes(&server).await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(3, 1, "cleared");

        sheet.update_columns([vec!["1", "2"]], 2).await.unwrap();

        assert_eq!(sheet.get_column("B").unwrap(), ["1", "2", ""]);
        assert_eq!(sheet.get("C1").unwrap(), "");
    }

    #[tokio::test]
    async fn test_clear_empties_remote_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/spreadsheets/{SPREADSHEET_ID}/values/'Sheet1'!A1:C3:clear"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clearedRange": "Sheet1!A1:C3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.cells.set(1, 1, "x");
        sheet.clear().await.unwrap();

        assert!(sheet.cells().is_empty());
    }

    #[tokio::test]
    async fn test_frozen_row_count_must_stay_below_row_count() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 3, 5);

        let err = sheet.set_frozen_row_count(5).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = sheet.set_frozen_column_count(7).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(sheet.frozen_row_count(), 0);
    }

    #[tokio::test]
    async fn test_grid_setter_rereads_then_uploads_all_grid_properties() {
        let server = MockServer::start().await;
        mount_metadata(
            &server,
            "Book",
            &[json!({
                "properties": {
                    "sheetId": 0,
                    "title": "Sheet1",
                    "index": 0,
                    "gridProperties": {"rowCount": 8, "columnCount": 3, "hideGridlines": true}
                }
            })],
            None,
        )
        .await;
        Mock::given(method("POST"))
            .and(path(format!("/spreadsheets/{SPREADSHEET_ID}:batchUpdate")))
            .and(body_json(json!({
                "requests": [{
                    "updateSheetProperties": {
                        "properties": {
                            "sheetId": 0,
                            "gridProperties": {
                                "rowCount": 8,
                                "columnCount": 3,
                                "frozenRowCount": 2,
                                "frozenColumnCount": 0,
                                "hideGridlines": true,
                                "rowGroupControlAfter": false,
                                "columnGroupControlAfter": false
                            }
                        },
                        "fields": "gridProperties"
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"replies": [{}]})))
            .expect(1)
            .mount(&server)
            .await;

        let mut sheet = sheet(&server, 3, 5);
        sheet.set_frozen_row_count(2).await.unwrap();

        assert_eq!(sheet.frozen_row_count(), 2);
        assert_eq!(sheet.row_count(), 8);
        assert!(sheet.hide_gridlines());
    }

    #[tokio::test]
    async fn test_row_count_cannot_drop_to_frozen_rows() {
        let server = MockServer::start().await;
        forbid_writes(&server).await;

        let mut sheet = Sheet::new(
            client(&server),
            SPREADSHEET_ID,
            serde_json::from_value(json!({
                "sheetId": 0,
                "title": "Sheet1",
                "gridProperties": {"rowCount": 10, "columnCount": 4, "frozenRowCount": 3}
            }))
            .unwrap(),
        )
        .unwrap();

        assert!(matches!(
            sheet.set_row_count(3).await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            sheet.resize(None, Some(2)).await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            sheet.resize(Some(0), None).await,
            Err(Error::OutOfRange(_))
        ));
    }

    #[tokio::test]
    async fn test_shrinking_drops_cached_cells_outside_bounds() {
        let server = MockServer::start().await;
        mount_batch_update(&server).await;

        let mut sheet = sheet(&server, 5, 5);
        sheet.cells.set(1, 1, "inside");
        sheet.cells.set(5, 1, "right");
        sheet.cells.set(1, 5, "below");

        sheet.resize(Some(3), Some(3)).await.unwrap();

        assert_eq!(sheet.cells().len(), 1);
        assert_eq!(sheet.get_row(1).unwrap(), ["inside", "", ""]);
    }

    #[tokio::test]
    async fn test_resize_to_current_size_is_a_no_op() {
        let server = MockServer::start().await;
        forbid_writes(&server).await;

        let mut sheet = sheet(&server, 5, 5);
        sheet.resize(None, None).await.unwrap();
        sheet.resize(Some(5), Some(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_title_and_tab_color() {
        let server = MockServer::start().await;
        mount_batch_update(&server).await;

        let mut sheet = sheet(&server, 3, 3);
        sheet.set_title("Totals").await.unwrap();
        sheet.set_tab_color("red").await.unwrap();

        assert_eq!(sheet.title(), "Totals");
        assert_eq!(sheet.tab_color(), Some(TabColor::rgb(1.0, 0.0, 0.0)));

        let posts = bodies(&server, "POST").await;
        assert_eq!(
            posts[0]["requests"][0]["updateSheetProperties"],
            json!({"properties": {"sheetId": 0, "title": "Totals"}, "fields": "title"})
        );
        assert_eq!(
            posts[1]["requests"][0]["updateSheetProperties"],
            json!({
                "properties": {
                    "sheetId": 0,
                    "tabColor": {"red": 1.0, "green": 0.0, "blue": 0.0, "alpha": 1.0}
                },
                "fields": "tabColor"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_tab_color_is_rejected_locally() {
        let server = MockServer::start().await;
        forbid_writes(&server).await;

        let mut sheet = sheet(&server, 3, 3);
        let err = sheet.set_tab_color((2.0, 0.0, 0.0)).await.unwrap_err();

        assert!(matches!(err, Error::InvalidColor(_)));
        assert_eq!(sheet.tab_color(), None);
    }

    #[tokio::test]
    async fn test_copy_to_accepts_destination_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/spreadsheets/{SPREADSHEET_ID}/sheets/0:copyTo")))
            .and(body_json(json!({"destinationSpreadsheetId": "dest_ID-9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheetId": 42,
                "title": "Copy of Sheet1",
                "index": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sheet = sheet(&server, 3, 3);
        let copied = sheet
            .copy_to("https://docs.google.com/spreadsheets/d/dest_ID-9/edit#gid=0")
            .await
            .unwrap();

        assert_eq!(copied.sheet_id, Some(42));
    }

    #[tokio::test]
    async fn test_sheets_compare_by_id() {
        let server = MockServer::start().await;
        let a = sheet(&server, 3, 3);
        let mut b = sheet(&server, 9, 9);
        b.properties.title = Some("Different".to_string());

        assert_eq!(a, b);
        assert_eq!(
            a.to_string(),
            "<Sheet title=\"Sheet1\", sheetId=0, rowCount=3, columnCount=3>"
        );
    }
}
