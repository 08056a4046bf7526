//! Spreadsheets and the registry of their sheets.

use std::{
    collections::HashMap,
    fmt,
    ops::{Bound, RangeBounds},
};

use tracing::{debug, info};

use crate::{
    Error, Result, SheetsClient,
    sheet::{DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT, Sheet},
    types::{
        AddSheet, BatchUpdateRequest, DeleteSheet, GridProperties, Request, SheetProperties,
        SpreadsheetProperties, SpreadsheetResource, UpdateSheetProperties,
        UpdateSpreadsheetProperties,
    },
};

const URL_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";

/// Extracts the spreadsheet id from a bare id or a
/// `https://docs.google.com/spreadsheets/d/<id>/...` URL.
///
/// # Errors
///
/// Returns [`Error::InvalidSpreadsheetId`] unless the id is made of ASCII
/// letters, digits, `_` and `-`.
pub fn spreadsheet_id_from_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let id = match trimmed.strip_prefix(URL_PREFIX) {
        Some(rest) => rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default(),
        None => trimmed,
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(id.to_string())
    } else {
        Err(Error::InvalidSpreadsheetId(input.to_string()))
    }
}

/// Selects a sheet by position or by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetKey {
    /// 0-based position; negative values count back from the last sheet.
    Index(i64),
    Title(String),
}

impl From<i64> for SheetKey {
    fn from(index: i64) -> Self {
        SheetKey::Index(index)
    }
}

impl From<i32> for SheetKey {
    fn from(index: i32) -> Self {
        SheetKey::Index(i64::from(index))
    }
}

impl From<usize> for SheetKey {
    fn from(index: usize) -> Self {
        SheetKey::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<&str> for SheetKey {
    fn from(title: &str) -> Self {
        SheetKey::Title(title.to_string())
    }
}

impl From<String> for SheetKey {
    fn from(title: String) -> Self {
        SheetKey::Title(title)
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKey::Index(index) => write!(f, "index {index}"),
            SheetKey::Title(title) => write!(f, "{title:?}"),
        }
    }
}

/// A Google Sheets spreadsheet and its sheets, in display order.
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    client: SheetsClient,
    id: String,
    title: String,
    sheets: Vec<Sheet>,
}

impl Spreadsheet {
    /// Opens an existing spreadsheet by id or URL and loads every sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is malformed or a remote call fails.
    pub async fn open(client: &SheetsClient, id_or_url: &str) -> Result<Self> {
        let mut spreadsheet = Self {
            client: client.clone(),
            id: spreadsheet_id_from_url(id_or_url)?,
            title: String::new(),
            sheets: Vec::new(),
        };
        spreadsheet.refresh().await?;
        info!(
            id = %spreadsheet.id,
            title = %spreadsheet.title,
            sheets = spreadsheet.sheets.len(),
            "opened spreadsheet"
        );
        Ok(spreadsheet)
    }

    /// Creates a new spreadsheet with a single empty sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote call fails.
    pub async fn create(client: &SheetsClient, title: &str) -> Result<Self> {
        let resource = client.create_spreadsheet(title).await?;
        let mut spreadsheet = Self {
            client: client.clone(),
            id: resource.spreadsheet_id.clone(),
            title: String::new(),
            sheets: Vec::new(),
        };
        spreadsheet.reconcile(resource).await?;
        info!(id = %spreadsheet.id, title = %spreadsheet.title, "created spreadsheet");
        Ok(spreadsheet)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Browser URL of this spreadsheet.
    pub fn url(&self) -> String {
        format!("{URL_PREFIX}{}/", self.id)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_titles(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::title).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sheet> {
        self.sheets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sheet> {
        self.sheets.iter_mut()
    }

    /// Looks up a sheet by index or title.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for an index outside the sheet list and
    /// [`Error::SheetNotFound`] for an unknown title.
    pub fn sheet(&self, key: impl Into<SheetKey>) -> Result<&Sheet> {
        let position = self.position(&key.into())?;
        Ok(&self.sheets[position])
    }

    /// Mutable counterpart of [`sheet`](Self::sheet).
    ///
    /// # Errors
    ///
    /// Same as [`sheet`](Self::sheet).
    pub fn sheet_mut(&mut self, key: impl Into<SheetKey>) -> Result<&mut Sheet> {
        let position = self.position(&key.into())?;
        Ok(&mut self.sheets[position])
    }

    fn position(&self, key: &SheetKey) -> Result<usize> {
        match key {
            SheetKey::Title(title) => self
                .sheets
                .iter()
                .position(|sheet| sheet.title() == title)
                .ok_or_else(|| {
                    Error::SheetNotFound(format!(
                        "{title:?}; sheet titles are {:?}",
                        self.sheet_titles()
                    ))
                }),
            SheetKey::Index(index) => self.normalize_index(*index),
        }
    }

    fn normalize_index(&self, index: i64) -> Result<usize> {
        let len = i64::try_from(self.sheets.len()).unwrap_or(i64::MAX);
        let resolved = if index < 0 { index + len } else { index };
        if (0..len).contains(&resolved) {
            usize::try_from(resolved).map_err(|_| Error::OutOfRange(index.to_string()))
        } else {
            Err(Error::OutOfRange(format!(
                "sheet index {index} is out of range ({} to {})",
                -len,
                len - 1
            )))
        }
    }

    /// Re-reads the spreadsheet, reconciling sheets by id: surviving sheets
    /// are updated in place, new sheets are added and deleted sheets are
    /// dropped. Every sheet's data is then reloaded.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote call fails.
    pub async fn refresh(&mut self) -> Result<()> {
        let resource = self.client.get_spreadsheet(&self.id).await?;
        self.reconcile(resource).await
    }

    async fn reconcile(&mut self, resource: SpreadsheetResource) -> Result<()> {
        let properties: Vec<SheetProperties> = resource
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .collect();
        if let Some(missing) = properties.iter().find(|p| p.sheet_id.is_none()) {
            return Err(Error::InvalidArgument(format!(
                "sheet {:?} has no sheetId",
                missing.title
            )));
        }

        let mut known: HashMap<i64, Sheet> = std::mem::take(&mut self.sheets)
            .into_iter()
            .map(|sheet| (sheet.id(), sheet))
            .collect();
        let mut sheets = Vec::with_capacity(properties.len());
        for props in properties {
            let existing = props.sheet_id.and_then(|id| known.remove(&id));
            let sheet = match existing {
                Some(mut sheet) => {
                    sheet.apply_properties(props);
                    sheet
                }
                None => Sheet::new(self.client.clone(), self.id.clone(), props)?,
            };
            sheets.push(sheet);
        }
        if !known.is_empty() {
            debug!(removed = ?known.keys().collect::<Vec<_>>(), "dropping deleted sheets");
        }

        self.title = resource.properties.title;
        self.sheets = sheets;
        for sheet in &mut self.sheets {
            sheet.refresh_data().await?;
        }
        Ok(())
    }

    /// Renames the spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails.
    pub async fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        let request = BatchUpdateRequest::single(Request::UpdateSpreadsheetProperties(
            UpdateSpreadsheetProperties {
                properties: SpreadsheetProperties {
                    title: title.clone(),
                },
                fields: "title".to_string(),
            },
        ));
        self.client.batch_update(&self.id, &request).await?;
        self.title = title;
        Ok(())
    }

    /// Adds a sheet of `columns` x `rows` at `index`, or at the end when
    /// `index` is `None`. An empty title lets Google pick one.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the end, a size is 0, or a remote
    /// call fails.
    pub async fn add_sheet(
        &mut self,
        title: &str,
        index: Option<usize>,
        columns: u32,
        rows: u32,
    ) -> Result<&mut Sheet> {
        let index = index.unwrap_or(self.sheets.len());
        if index > self.sheets.len() {
            return Err(Error::OutOfRange(format!(
                "cannot insert a sheet at index {index}; there are only {} sheets",
                self.sheets.len()
            )));
        }
        if columns < 1 || rows < 1 {
            return Err(Error::OutOfRange(
                "a new sheet needs at least one row and one column".to_string(),
            ));
        }

        let request = BatchUpdateRequest::single(Request::AddSheet(AddSheet {
            properties: SheetProperties {
                title: (!title.is_empty()).then(|| title.to_string()),
                index: Some(u32::try_from(index).map_err(|_| {
                    Error::OutOfRange(format!("sheet index {index} is too large"))
                })?),
                grid_properties: Some(GridProperties {
                    row_count: Some(rows),
                    column_count: Some(columns),
                    ..GridProperties::default()
                }),
                ..SheetProperties::default()
            },
        }));
        let response = self.client.batch_update(&self.id, &request).await?;
        let new_id = response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
            .and_then(|reply| reply.properties.sheet_id);

        self.refresh().await?;
        let position = match new_id {
            Some(id) => self.sheets.iter().position(|sheet| sheet.id() == id),
            None => (index < self.sheets.len()).then_some(index),
        }
        .ok_or_else(|| Error::SheetNotFound(format!("newly added sheet at index {index}")))?;

        info!(title = self.sheets[position].title(), index = position, "added sheet");
        Ok(&mut self.sheets[position])
    }

    /// Adds a sheet with Google's default size at the end.
    ///
    /// # Errors
    ///
    /// Same as [`add_sheet`](Self::add_sheet).
    pub async fn add_default_sheet(&mut self, title: &str) -> Result<&mut Sheet> {
        self.add_sheet(title, None, DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT)
            .await
    }

    /// Deletes one sheet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LastSheet`] without any remote call if it is the only
    /// sheet, or an error if the key is unknown or a remote call fails.
    pub async fn delete_sheet(&mut self, key: impl Into<SheetKey>) -> Result<()> {
        let position = self.position(&key.into())?;
        if self.sheets.len() == 1 {
            return Err(Error::LastSheet);
        }
        let id = self.sheets[position].id();
        self.delete_ids(&[id]).await
    }

    /// Deletes every sheet whose index falls in `range`. Indices past the end
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LastSheet`] without any remote call if the range
    /// covers every sheet, or an error if a remote call fails.
    pub async fn delete_sheets(&mut self, range: impl RangeBounds<usize>) -> Result<()> {
        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => n.saturating_add(1),
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.sheets.len(),
        }
        .min(self.sheets.len());

        let ids: Vec<i64> = self
            .sheets
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(Sheet::id)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        if ids.len() == self.sheets.len() {
            return Err(Error::LastSheet);
        }
        self.delete_ids(&ids).await
    }

    async fn delete_ids(&mut self, ids: &[i64]) -> Result<()> {
        let request = BatchUpdateRequest {
            requests: ids
                .iter()
                .map(|&sheet_id| Request::DeleteSheet(DeleteSheet { sheet_id }))
                .collect(),
        };
        self.client.batch_update(&self.id, &request).await?;
        info!(spreadsheet = %self.id, sheets = ?ids, "deleted sheets");
        self.refresh().await
    }

    /// Moves a sheet to `index`, where negative values count from the end.
    /// After the move the sheet is at `index` in [`sheets`](Self::sheets).
    ///
    /// # Errors
    ///
    /// Returns an error if the key or index is out of range or a remote call
    /// fails.
    pub async fn move_sheet(&mut self, key: impl Into<SheetKey>, index: i64) -> Result<()> {
        let from = self.position(&key.into())?;
        let to = self.normalize_index(index)?;
        if from == to {
            return Ok(());
        }

        // The API takes the index the sheet should occupy before it is
        // removed from its old position.
        let remote_index = if to > from { to + 1 } else { to };
        let sheet_id = self.sheets[from].id();
        let request = BatchUpdateRequest::single(Request::UpdateSheetProperties(
            UpdateSheetProperties {
                properties: SheetProperties {
                    sheet_id: Some(sheet_id),
                    index: Some(u32::try_from(remote_index).map_err(|_| {
                        Error::OutOfRange(format!("sheet index {remote_index} is too large"))
                    })?),
                    ..SheetProperties::default()
                },
                fields: "index".to_string(),
            },
        ));
        self.client.batch_update(&self.id, &request).await?;
        debug!(sheet_id, from, to, "moved sheet");
        self.refresh().await
    }
}

impl<'a> IntoIterator for &'a Spreadsheet {
    type Item = &'a Sheet;
    type IntoIter = std::slice::Iter<'a, Sheet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Spreadsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Spreadsheet title={:?}, {} sheets>",
            self.title,
            self.sheets.len()
        )
    }
}
