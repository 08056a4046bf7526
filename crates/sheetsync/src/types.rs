//! Type definitions for the Google Sheets v4 API.

use serde::{Deserialize, Serialize};

use crate::color::TabColor;

// Resources returned by `GET spreadsheets/{id}`

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetResource {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<SheetResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResource {
    pub properties: SheetProperties,
}

/// Sheet properties as sent and received. Unset fields are omitted on the
/// wire so the same type serves as a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_to_left: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<TabColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_column_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_gridlines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group_control_after: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_group_control_after: Option<bool>,
}

// Values

/// Which way a two-dimensional `values` array is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    /// Each inner array is a row.
    #[default]
    #[serde(alias = "DIMENSION_UNSPECIFIED")]
    Rows,
    /// Each inner array is a column.
    Columns,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Dimension,
    /// Absent entirely when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeInput {
    pub range: String,
    pub major_dimension: Dimension,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_cells: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    #[serde(default)]
    pub cleared_range: Option<String>,
}

// Batch updates

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

impl BatchUpdateRequest {
    pub fn single(request: Request) -> Self {
        Self {
            requests: vec![request],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    UpdateSpreadsheetProperties(UpdateSpreadsheetProperties),
    UpdateSheetProperties(UpdateSheetProperties),
    AddSheet(AddSheet),
    DeleteSheet(DeleteSheet),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpreadsheetProperties {
    pub properties: SpreadsheetProperties,
    /// Field mask naming the properties to overwrite.
    pub fields: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSheetProperties {
    pub properties: SheetProperties,
    pub fields: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheet {
    pub sheet_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

// Spreadsheet creation and sheet copies

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpreadsheetRequest {
    pub properties: SpreadsheetProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySheetRequest {
    pub destination_spreadsheet_id: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_spreadsheet_resource_deserializes_sheet_properties() {
        let resource: SpreadsheetResource = serde_json::from_value(json!({
            "spreadsheetId": "abc",
            "properties": {"title": "Budget", "locale": "en_US"},
            "sheets": [{
                "properties": {
                    "sheetId": 0,
                    "title": "Sheet1",
                    "index": 0,
                    "sheetType": "GRID",
                    "gridProperties": {"rowCount": 1000, "columnCount": 26, "frozenRowCount": 1}
                }
            }]
        }))
        .unwrap();

        assert_eq!(resource.properties.title, "Budget");
        let props = &resource.sheets[0].properties;
        assert_eq!(props.sheet_id, Some(0));
        assert_eq!(props.sheet_type.as_deref(), Some("GRID"));
        let grid = props.grid_properties.unwrap();
        assert_eq!(grid.row_count, Some(1000));
        assert_eq!(grid.frozen_row_count, Some(1));
        assert_eq!(grid.hide_gridlines, None);
    }

    #[test]
    fn test_value_range_without_values_is_empty() {
        let range: ValueRange =
            serde_json::from_value(json!({"range": "Sheet1!A1:Z1000", "majorDimension": "ROWS"}))
                .unwrap();
        assert!(range.values.is_empty());
        assert_eq!(range.major_dimension, Dimension::Rows);
    }

    #[test]
    fn test_dimension_accepts_columns_and_unspecified() {
        let columns: Dimension = serde_json::from_str(r#""COLUMNS""#).unwrap();
        let unspecified: Dimension = serde_json::from_str(r#""DIMENSION_UNSPECIFIED""#).unwrap();
        assert_eq!(columns, Dimension::Columns);
        assert_eq!(unspecified, Dimension::Rows);
    }

    #[test]
    fn test_partial_sheet_properties_omit_unset_fields() {
        let properties = SheetProperties {
            sheet_id: Some(7),
            title: Some("Renamed".to_string()),
            ..SheetProperties::default()
        };

        assert_eq!(
            serde_json::to_value(properties).unwrap(),
            json!({"sheetId": 7, "title": "Renamed"})
        );
    }

    #[test]
    fn test_batch_update_request_uses_camel_case_tags() {
        let request = BatchUpdateRequest::single(Request::DeleteSheet(DeleteSheet { sheet_id: 3 }));
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"requests": [{"deleteSheet": {"sheetId": 3}}]})
        );
    }

    #[test]
    fn test_value_range_input_serializes_dimension() {
        let input = ValueRangeInput {
            range: "'Sheet1'!A1:A2".to_string(),
            major_dimension: Dimension::Columns,
            values: vec![vec!["a".to_string(), "b".to_string()]],
        };
        assert_eq!(
            serde_json::to_value(input).unwrap(),
            json!({"range": "'Sheet1'!A1:A2", "majorDimension": "COLUMNS", "values": [["a", "b"]]})
        );
    }
}
